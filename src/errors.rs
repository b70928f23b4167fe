use actix_web::{error::BlockingError, http::StatusCode, HttpResponse};
use derive_more::Display;
use serde_json::json;

#[derive(Debug, Display)]
pub enum ServerError {
    #[display(fmt = "Database connection failed")]
    ConnectionFailed,
    #[display(fmt = "{}", _0)]
    UserError(&'static str),
    #[display(fmt = "Todo not found")]
    NotFound,
    #[display(fmt = "Failed to {}: {}", action, detail)]
    StoreError {
        action: &'static str,
        detail: String,
    },
    #[display(fmt = "Server Error: Blocking task failed.")]
    BlockingError,
    #[display(fmt = "Server Error: {}", _0)]
    EnvironmentError(String),
}

impl ServerError {
    /// Wraps a failed statement, keeping the store's own text for the response body.
    pub fn store(action: &'static str) -> impl FnOnce(diesel::result::Error) -> ServerError {
        move |err| {
            log::error!("failed to {action}: {err}");
            ServerError::StoreError {
                action,
                detail: err.to_string(),
            }
        }
    }
}

impl From<r2d2::Error> for ServerError {
    fn from(err: r2d2::Error) -> ServerError {
        log::error!("error connecting to the database: {err}");
        ServerError::ConnectionFailed
    }
}

impl From<BlockingError> for ServerError {
    fn from(_: BlockingError) -> ServerError {
        ServerError::BlockingError
    }
}

impl actix_web::error::ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::UserError(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::ConnectionFailed
            | ServerError::StoreError { .. }
            | ServerError::BlockingError
            | ServerError::EnvironmentError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ServerError::NotFound => {
                HttpResponse::NotFound().json(json!({ "message": self.to_string() }))
            }
            _ => HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() })),
        }
    }
}
