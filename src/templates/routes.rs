use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::ctx::BaseParams;

use super::handlers;
use super::CreateTemplate;

#[derive(Debug, Deserialize)]
struct TemplateIdPath {
    template_id: Uuid,
}

pub fn router() -> Router {
    Router::new()
        .route("/api/v1/templates", get(find_templates).post(create_template))
        .route("/api/v1/templates/{template_id}", get(get_template))
        .route("/api/v1/templates/{template_id}/instantiate", post(instantiate_template))
}

async fn find_templates(base: BaseParams) -> impl IntoResponse {
    handlers::find_templates(base).await.map(Json)
}

async fn get_template(Path(TemplateIdPath { template_id }): Path<TemplateIdPath>, base: BaseParams) -> impl IntoResponse {
    handlers::get_template(template_id, base).await.map(Json)
}

async fn create_template(base: BaseParams, Json(args): Json<CreateTemplate>) -> impl IntoResponse {
    handlers::create_template_from_note(args, base)
        .await
        .map(|r| (StatusCode::CREATED, Json(r)))
}

async fn instantiate_template(
    Path(TemplateIdPath { template_id }): Path<TemplateIdPath>,
    base: BaseParams,
) -> impl IntoResponse {
    handlers::instantiate_template(template_id, base)
        .await
        .map(|r| (StatusCode::CREATED, Json(r)))
}
