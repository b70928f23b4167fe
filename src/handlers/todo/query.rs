use actix_web::{web, HttpResponse};

use super::{find_todo, with_connection};
use crate::{
    errors::ServerError,
    models::todo::Todo,
    store::{Store, StoreConnection},
};

pub async fn list<S: Store>(store: web::Data<S>) -> Result<HttpResponse, ServerError> {
    let todos = with_connection(store, |connection| {
        let rows = connection
            .fetch(&Todo::select_all())
            .map_err(ServerError::store("retrieve todos"))?;
        Ok(rows.into_iter().map(Todo::from).collect::<Vec<_>>())
    })
    .await?;

    Ok(HttpResponse::Ok().json(todos))
}

pub async fn get<S: Store>(
    todo_id: web::Path<i32>,
    store: web::Data<S>,
) -> Result<HttpResponse, ServerError> {
    let todo_id = todo_id.into_inner();

    match with_connection(store, move |connection| find_todo(connection, todo_id)).await? {
        Some(todo) => Ok(HttpResponse::Ok().json(todo)),
        None => Err(ServerError::NotFound),
    }
}
