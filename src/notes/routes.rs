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
use super::{SaveNote, ToggleChecked};

#[derive(Debug, Deserialize)]
struct NoteIdPath {
    note_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct BlockPath {
    note_id: Uuid,
    block_uid: String,
}

pub fn router() -> Router {
    Router::new()
        .route("/api/v1/notes", get(find_notes).post(create_note))
        .route(
            "/api/v1/notes/{note_id}",
            get(get_note).patch(update_note).delete(delete_note),
        )
        .route(
            "/api/v1/notes/{note_id}/blocks/{block_uid}/checked",
            post(toggle_block_checked),
        )
}

async fn find_notes(base: BaseParams) -> impl IntoResponse {
    handlers::find_notes(base).await.map(Json)
}

async fn create_note(base: BaseParams, Json(args): Json<SaveNote>) -> impl IntoResponse {
    handlers::create_note(args, base)
        .await
        .map(|r| (StatusCode::CREATED, Json(r)))
}

async fn get_note(Path(NoteIdPath { note_id }): Path<NoteIdPath>, base: BaseParams) -> impl IntoResponse {
    handlers::get_note(note_id, base).await.map(Json)
}

async fn update_note(
    Path(NoteIdPath { note_id }): Path<NoteIdPath>,
    base: BaseParams,
    Json(args): Json<SaveNote>,
) -> impl IntoResponse {
    handlers::update_note(note_id, args, base).await.map(Json)
}

async fn delete_note(Path(NoteIdPath { note_id }): Path<NoteIdPath>, base: BaseParams) -> impl IntoResponse {
    handlers::delete_note(note_id, base).await.map(Json)
}

async fn toggle_block_checked(
    Path(BlockPath { note_id, block_uid }): Path<BlockPath>,
    base: BaseParams,
    Json(args): Json<ToggleChecked>,
) -> impl IntoResponse {
    handlers::toggle_block_checked(note_id, block_uid, args.checked, base)
        .await
        .map(Json)
}

#[cfg(test)]
mod tests {
    use crate::{
        db::init_test_db,
        errors::Result,
        notes::{FindNotesResponse, Note, ToggleResponse},
    };
    use serde_json::json;

    #[tokio::test]
    async fn create_note_normalizes_the_blocks_payload() -> Result<()> {
        let db = init_test_db().await?;
        let server = crate::tests::test_server(db).await?;

        let payload = json!([
            {"type": "heading1", "text": "Site visit"},
            {"type": "todo", "text": "Check panel"},
            {"type": "todo", "text": "   "},
            {"type": "bulleted", "items": ["Item A", "Item B"]},
        ]);
        let response = server
            .post("/api/v1/notes")
            .json(&json!({
                "title": "Visit",
                "status": "In Progress",
                "blocks": payload.to_string(),
                "tags": [{"label": "Solar"}],
            }))
            .await;

        assert_eq!(response.status_code(), 201);
        let note: Note = response.json();
        assert_eq!(note.title, "Visit");
        assert_eq!(note.status.as_str(), "in_progress");
        // the empty todo is gone, order preserved
        assert_eq!(
            note.blocks.iter().map(|b| b.kind()).collect::<Vec<_>>(),
            ["heading1", "todo", "bulleted"]
        );
        assert!(note.blocks.iter().all(|b| !b.uid.is_empty()));
        assert_eq!(note.body, "Site visit\n\nCheck panel\n\n• Item A\n• Item B");
        assert_eq!(note.tags[0].label, "Solar");
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_block_uids_still_save() -> Result<()> {
        let db = init_test_db().await?;
        let server = crate::tests::test_server(db).await?;

        let response = server
            .post("/api/v1/notes")
            .json(&json!({
                "title": "t",
                "blocks": json!([
                    {"uid": "samesamesame", "type": "paragraph", "text": "one"},
                    {"uid": "samesamesame", "type": "paragraph", "text": "two"},
                ])
                .to_string(),
            }))
            .await;

        assert_eq!(response.status_code(), 201);
        let note: Note = response.json();
        assert_eq!(note.blocks.len(), 2);
        assert_ne!(note.blocks[0].uid, note.blocks[1].uid);
        assert_eq!(note.blocks[1].text(), "two");
        Ok(())
    }

    #[tokio::test]
    async fn blank_payload_falls_back_to_a_single_paragraph() -> Result<()> {
        let db = init_test_db().await?;
        let server = crate::tests::test_server(db).await?;

        let response = server
            .post("/api/v1/notes")
            .json(&json!({"title": "t", "blocks": "not json", "text": "Hello world"}))
            .await;

        let note: Note = response.json();
        assert_eq!(note.blocks.len(), 1);
        assert_eq!(note.blocks[0].kind(), "paragraph");
        assert_eq!(note.blocks[0].text(), "Hello world");
        assert_eq!(note.body, "Hello world");
        Ok(())
    }

    #[tokio::test]
    async fn update_replaces_the_block_list_wholesale() -> Result<()> {
        let db = init_test_db().await?;
        let server = crate::tests::test_server(db).await?;

        let created: Note = server
            .post("/api/v1/notes")
            .json(&json!({
                "title": "t",
                "blocks": json!([{"type": "paragraph", "text": "old"}]).to_string(),
            }))
            .await
            .json();

        let updated: Note = server
            .patch(&format!("/api/v1/notes/{}", created.id))
            .json(&json!({
                "title": "t",
                "blocks": json!([
                    {"type": "quote", "text": "new"},
                    {"type": "divider"},
                ])
                .to_string(),
            }))
            .await
            .json();

        assert_eq!(
            updated.blocks.iter().map(|b| b.kind()).collect::<Vec<_>>(),
            ["quote", "divider"]
        );
        assert!(!updated.blocks.iter().any(|b| b.text() == "old"));

        // an empty array clears the stored list entirely
        let cleared: Note = server
            .patch(&format!("/api/v1/notes/{}", created.id))
            .json(&json!({"title": "t", "blocks": "[]"}))
            .await
            .json();
        assert!(cleared.blocks.is_empty());
        assert_eq!(cleared.body, "");
        Ok(())
    }

    #[tokio::test]
    async fn toggle_only_touches_the_addressed_todo() -> Result<()> {
        let db = init_test_db().await?;
        let server = crate::tests::test_server(db).await?;

        let note: Note = server
            .post("/api/v1/notes")
            .json(&json!({
                "title": "t",
                "blocks": json!([
                    {"type": "todo", "text": "Check panel"},
                    {"type": "paragraph", "text": "notes"},
                ])
                .to_string(),
            }))
            .await
            .json();
        let todo_uid = &note.blocks[0].uid;
        let sibling_before = serde_json::to_value(&note.blocks[1]).unwrap();

        let toggle: ToggleResponse = server
            .post(&format!("/api/v1/notes/{}/blocks/{}/checked", note.id, todo_uid))
            .json(&json!({"checked": true}))
            .await
            .json();
        assert!(toggle.ok);

        let after: Note = server.get(&format!("/api/v1/notes/{}", note.id)).await.json();
        assert_eq!(after.blocks.len(), 2);
        assert_eq!(after.blocks[0].uid, *todo_uid);
        assert_eq!(after.blocks[0].text(), "Check panel");
        assert_eq!(
            serde_json::to_value(&after.blocks[0]).unwrap()["checked"],
            serde_json::Value::Bool(true)
        );
        assert_eq!(serde_json::to_value(&after.blocks[1]).unwrap(), sibling_before);
        Ok(())
    }

    #[tokio::test]
    async fn toggle_misses_report_ok_false() -> Result<()> {
        let db = init_test_db().await?;
        let server = crate::tests::test_server(db).await?;

        let note: Note = server
            .post("/api/v1/notes")
            .json(&json!({
                "title": "t",
                "blocks": json!([{"type": "paragraph", "text": "not a todo"}]).to_string(),
            }))
            .await
            .json();

        // not a todo
        let toggle: ToggleResponse = server
            .post(&format!(
                "/api/v1/notes/{}/blocks/{}/checked",
                note.id, note.blocks[0].uid
            ))
            .json(&json!({"checked": true}))
            .await
            .json();
        assert!(!toggle.ok);

        // unknown uid
        let toggle: ToggleResponse = server
            .post(&format!("/api/v1/notes/{}/blocks/doesnotexist/checked", note.id))
            .json(&json!({"checked": true}))
            .await
            .json();
        assert!(!toggle.ok);
        Ok(())
    }

    #[tokio::test]
    async fn missing_note_is_a_404() -> Result<()> {
        let db = init_test_db().await?;
        let server = crate::tests::test_server(db).await?;

        let response = server
            .get("/api/v1/notes/018f6138-5b4f-722d-97c5-29b927cedbd4")
            .expect_failure()
            .await;
        assert_eq!(response.status_code(), 404);
        Ok(())
    }

    #[tokio::test]
    async fn find_notes_lists_the_callers_notes() -> Result<()> {
        let db = init_test_db().await?;
        let server = crate::tests::test_server(db).await?;

        for title in ["first", "second"] {
            server
                .post("/api/v1/notes")
                .json(&json!({"title": title, "text": "body"}))
                .await;
        }

        let response: FindNotesResponse = server.get("/api/v1/notes").await.json();
        assert_eq!(response.results.len(), 2);
        Ok(())
    }
}
