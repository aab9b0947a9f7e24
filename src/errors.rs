use axum::{http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::db;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("not_found")]
    NotFound(String),
    #[error("forbidden")]
    Forbidden,
    #[error(transparent)]
    DB(db::Error),
    #[error("unexpected")]
    Unexpected(String),
}

impl From<db::Error> for Error {
    fn from(error: db::Error) -> Self {
        match error {
            db::Error::NotFound(msg) => Self::NotFound(msg),
            error => Self::DB(error),
        }
    }
}

/// crate::Error <--> tokio_rusqlite::Error, so handlers can raise app errors
/// (not-found, forbidden) from inside a `conn.call` closure and get them back
/// out intact.
pub mod db_mappers {
    use super::*;

    impl From<tokio_rusqlite::Error> for Error {
        fn from(error: tokio_rusqlite::Error) -> Self {
            match error {
                tokio_rusqlite::Error::Other(err) => {
                    if err.is::<Error>() {
                        return *err.downcast::<Error>().unwrap();
                    }
                    Error::from(db::Error::from(tokio_rusqlite::Error::Other(err)))
                }
                _ => Error::from(db::Error::from(error)),
            }
        }
    }

    impl From<Error> for tokio_rusqlite::Error {
        fn from(error: Error) -> Self {
            tokio_rusqlite::Error::Other(error.into())
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum ErrorResponse {
    Unexpected { message: String },
    NotFound { message: String },
    Forbidden { message: String },
}

impl From<Error> for ErrorResponse {
    fn from(error: Error) -> Self {
        tracing::error!("{:?}", error);
        match error {
            Error::DB(_) => Self::Unexpected {
                message: "Unexpected error".into(),
            },
            Error::Unexpected(message) => Self::Unexpected { message },
            Error::NotFound(message) => Self::NotFound { message },
            Error::Forbidden => Self::Forbidden {
                message: "Forbidden".into(),
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let mut res = axum::Json(ErrorResponse::from(self)).into_response();
        *res.status_mut() = status;
        res
    }
}
