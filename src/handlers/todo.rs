use actix_web::web;

use crate::{
    errors::ServerError,
    models::todo::Todo,
    store::{Store, StoreConnection},
};

pub mod mutate;
pub mod query;

/// Runs `work` on the blocking pool with a connection scoped to this request.
async fn with_connection<S, T, F>(store: web::Data<S>, work: F) -> Result<T, ServerError>
where
    S: Store,
    T: Send + 'static,
    F: FnOnce(&mut S::Connection) -> Result<T, ServerError> + Send + 'static,
{
    web::block(move || {
        let mut connection = store.connect()?;
        work(&mut connection)
    })
    .await?
}

fn find_todo<C: StoreConnection>(
    connection: &mut C,
    todo_id: i32,
) -> Result<Option<Todo>, ServerError> {
    let rows = connection
        .fetch(&Todo::select_one(todo_id))
        .map_err(ServerError::store("retrieve todo"))?;
    Ok(Todo::from_rows(rows))
}
