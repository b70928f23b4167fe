use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use crate::{errors::ServerError, store::Store};

pub mod todo;

pub async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Welcome to the To-Do API! Use /todos for tasks.",
    }))
}

pub async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(json!({ "message": "Resource not found" }))
}

pub fn routes<S: Store>(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| {
        log::debug!("rejected request body: {err}");
        ServerError::UserError("Request body must be a valid JSON object").into()
    }))
    .app_data(
        web::PathConfig::default()
            .error_handler(|_, _| ServerError::UserError("id must be an integer").into()),
    )
    .route("/", web::get().to(index))
    .service(
        web::scope("/todos")
            .route("", web::get().to(todo::query::list::<S>))
            .route("", web::post().to(todo::mutate::create::<S>))
            .route("/{id}", web::get().to(todo::query::get::<S>))
            .route("/{id}", web::put().to(todo::mutate::update::<S>))
            .route("/{id}", web::delete().to(todo::mutate::delete::<S>)),
    );
}
