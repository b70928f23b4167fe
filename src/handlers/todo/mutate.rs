use actix_web::{web, HttpResponse};
use serde_json::json;

use super::{find_todo, with_connection};
use crate::{
    errors::ServerError,
    models::todo::{NewTodo, Todo, TodoChanges},
    store::{Store, StoreConnection},
};

pub async fn create<S: Store>(
    input: web::Json<NewTodo>,
    store: web::Data<S>,
) -> Result<HttpResponse, ServerError> {
    let statement = input.into_inner().insert_statement()?;

    let created = with_connection(store, move |connection| {
        connection
            .execute(&statement)
            .map_err(ServerError::store("add todo"))?;
        let new_id = connection
            .last_insert_id()
            .map_err(ServerError::store("add todo"))?;
        find_todo(connection, new_id)
    })
    .await?;

    match created {
        Some(todo) => Ok(HttpResponse::Created().json(todo)),
        // deleted by someone else before the read-back
        None => Err(ServerError::NotFound),
    }
}

pub async fn update<S: Store>(
    todo_id: web::Path<i32>,
    body: web::Bytes,
    store: web::Data<S>,
) -> Result<HttpResponse, ServerError> {
    let todo_id = todo_id.into_inner();
    let statement = TodoChanges::from_body(&body)?.update_statement(todo_id);

    let updated = with_connection(store, move |connection| {
        let matched = connection
            .execute(&statement)
            .map_err(ServerError::store("update todo"))?;
        if matched == 0 {
            return Ok(None);
        }
        find_todo(connection, todo_id)
    })
    .await?;

    match updated {
        Some(todo) => Ok(HttpResponse::Ok().json(todo)),
        None => Err(ServerError::NotFound),
    }
}

pub async fn delete<S: Store>(
    todo_id: web::Path<i32>,
    store: web::Data<S>,
) -> Result<HttpResponse, ServerError> {
    let todo_id = todo_id.into_inner();

    let removed = with_connection(store, move |connection| {
        connection
            .execute(&Todo::delete(todo_id))
            .map_err(ServerError::store("delete todo"))
    })
    .await?;

    if removed == 0 {
        return Err(ServerError::NotFound);
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Todo with ID {} deleted successfully", todo_id),
    })))
}
