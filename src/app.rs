use axum::{Extension, Router};
use tower::ServiceBuilder;

use crate::db::DB;
use crate::{notes, templates};

pub fn create(db: DB) -> Router {
    Router::new()
        .merge(notes::router())
        .merge(templates::router())
        .layer(ServiceBuilder::new().layer(Extension(db)))
}
