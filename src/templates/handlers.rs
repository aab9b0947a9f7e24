use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::ctx::BaseParams;
use crate::notes::handlers::{insert_note, load_note};
use crate::notes::{Note, NoteDraft};
use crate::{Error, Result};

use super::{apply_template, CreateTemplate, FindTemplatesResponse, Template, TemplateSnapshot, TemplateSummary};

impl<'a> TryFrom<&Row<'a>> for Template {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'a>) -> std::result::Result<Self, Self::Error> {
        let snapshot: String = row.get(3)?;
        let snapshot = serde_json::from_str(&snapshot)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e)))?;
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            name: row.get(2)?,
            snapshot,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

pub async fn find_templates(BaseParams { db, ctx }: BaseParams) -> Result<FindTemplatesResponse> {
    db.call(move |conn| {
        let results = conn
            .prepare("SELECT id, name, created_at, updated_at FROM templates WHERE owner_id = ? ORDER BY name")?
            .query_map(params![ctx.get_user_id()], |row| {
                Ok(TemplateSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: row.get(2)?,
                    updated_at: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(FindTemplatesResponse { results })
    })
    .await
    .map_err(Error::from)
}

pub async fn get_template(template_id: Uuid, BaseParams { db, ctx }: BaseParams) -> Result<Template> {
    let user_id = ctx.get_user_id();
    db.call(move |conn| {
        let template = load_template(conn, template_id)?.ok_or_else(template_not_found)?;
        if Some(template.owner_id) != user_id {
            return Err(Error::Forbidden.into());
        }
        Ok(template)
    })
    .await
    .map_err(Error::from)
}

/// Captures a note's metadata, tags and block list into a template, upserted
/// by `(owner, name)`: re-saving under the same name replaces the snapshot
/// but keeps the template's id (and with it any existing share grants).
pub async fn create_template_from_note(args: CreateTemplate, BaseParams { db, ctx }: BaseParams) -> Result<Template> {
    let user_id = ctx.get_user_id();
    let name = args.name.trim().to_string();
    db.call(move |conn| {
        let Some(owner_id) = user_id else {
            return Err(Error::Forbidden.into());
        };
        let note = load_note(conn, args.note_id)?
            .ok_or_else(|| tokio_rusqlite::Error::from(Error::NotFound("Note not found".into())))?;
        if note.created_by.is_some() && note.created_by != user_id {
            return Err(Error::Forbidden.into());
        }

        let snapshot = TemplateSnapshot::from_note(&note);
        let snapshot_json = serde_json::to_string(&snapshot)
            .map_err(|e| tokio_rusqlite::Error::from(Error::Unexpected(e.to_string())))?;

        let template_id: Uuid = conn.query_row(
            "INSERT INTO templates (owner_id, name, snapshot) VALUES (?, ?, ?) \
             ON CONFLICT (owner_id, name) DO UPDATE \
             SET snapshot = excluded.snapshot, updated_at = CURRENT_TIMESTAMP \
             RETURNING id",
            params![owner_id, name, snapshot_json],
            |row| row.get(0),
        )?;
        let template = load_template(conn, template_id)?.ok_or_else(template_not_found)?;
        Ok(template)
    })
    .await
    .map_err(Error::from)
}

/// Clones a template into a brand-new note via the normal save path, so the
/// tag catalog upsert and block persistence rules apply unchanged.
pub async fn instantiate_template(template_id: Uuid, BaseParams { db, ctx }: BaseParams) -> Result<Note> {
    let user_id = ctx.get_user_id();
    db.call(move |conn| {
        let template = load_template(conn, template_id)?.ok_or_else(template_not_found)?;
        if Some(template.owner_id) != user_id {
            return Err(Error::Forbidden.into());
        }

        let draft = apply_template(NoteDraft::default(), &template.snapshot);
        let tx = conn.transaction()?;
        let note_id = insert_note(&tx, &draft, user_id)?;
        tx.commit()?;

        let note = load_note(conn, note_id)?
            .ok_or_else(|| tokio_rusqlite::Error::from(Error::NotFound("Note not found".into())))?;
        Ok(note)
    })
    .await
    .map_err(Error::from)
}

fn template_not_found() -> tokio_rusqlite::Error {
    Error::NotFound("Template not found".into()).into()
}

fn load_template(conn: &rusqlite::Connection, template_id: Uuid) -> rusqlite::Result<Option<Template>> {
    conn.query_row(
        "SELECT id, owner_id, name, snapshot, created_at, updated_at FROM templates WHERE id = ?",
        params![template_id],
        |row| Template::try_from(row),
    )
    .optional()
}
