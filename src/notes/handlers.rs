use rusqlite::{params, OptionalExtension, Row, Transaction};
use serde_json::Value;
use uuid::Uuid;

use crate::blocks::{normalize_block, Block};
use crate::ctx::BaseParams;
use crate::tags::Tag;
use crate::{Error, Result};

use super::{FindNotesResponse, Note, NoteDraft, NoteSummary, Priority, Properties, SaveNote, Status, ToggleResponse};

const NOTE_COLUMNS: &str = "id, title, body, date, status, icon, cover_url, \
     project, location, due_date, priority, created_at, created_by, updated_at, updated_by";

impl<'a> TryFrom<&Row<'a>> for Note {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'a>) -> std::result::Result<Self, Self::Error> {
        let status: String = row.get(4)?;
        let priority: String = row.get(10)?;
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            body: row.get(2)?,
            date: row.get(3)?,
            status: Status::coerce(&status),
            icon: row.get(5)?,
            cover_url: row.get(6)?,
            properties: Properties {
                project: row.get(7)?,
                location: row.get(8)?,
                due_date: row.get(9)?,
                priority: Priority::coerce(&priority),
            },
            tags: Vec::new(),
            blocks: Vec::new(),
            created_at: row.get(11)?,
            created_by: row.get(12)?,
            updated_at: row.get(13)?,
            updated_by: row.get(14)?,
        })
    }
}

impl<'a> TryFrom<&Row<'a>> for NoteSummary {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'a>) -> std::result::Result<Self, Self::Error> {
        let status: String = row.get(4)?;
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            body: row.get(2)?,
            date: row.get(3)?,
            status: Status::coerce(&status),
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

pub async fn find_notes(BaseParams { db, ctx }: BaseParams) -> Result<FindNotesResponse> {
    db.call(move |conn| {
        let results = conn
            .prepare(
                "SELECT id, title, body, date, status, created_at, updated_at FROM notes \
                 WHERE created_by = ? ORDER BY created_at DESC",
            )?
            .query_map(params![ctx.get_user_id()], |row| NoteSummary::try_from(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(FindNotesResponse { results })
    })
    .await
    .map_err(Error::from)
}

pub async fn create_note(form: SaveNote, BaseParams { db, ctx }: BaseParams) -> Result<Note> {
    let draft = NoteDraft::from_form(form);
    let user_id = ctx.get_user_id();
    db.call(move |conn| {
        let tx = conn.transaction()?;
        let note_id = insert_note(&tx, &draft, user_id)?;
        tx.commit()?;
        let note = load_note(conn, note_id)?.ok_or_else(note_not_found)?;
        Ok(note)
    })
    .await
    .map_err(Error::from)
}

pub async fn get_note(note_id: Uuid, BaseParams { db, ctx }: BaseParams) -> Result<Note> {
    let user_id = ctx.get_user_id();
    db.call(move |conn| {
        let note = load_note(conn, note_id)?.ok_or_else(note_not_found)?;
        if !can_access(note.created_by, user_id) {
            return Err(Error::Forbidden.into());
        }
        Ok(note)
    })
    .await
    .map_err(Error::from)
}

/// Full update: scalar fields, tag assignment and the block list are replaced
/// wholesale inside one transaction. The stored blocks end up as exactly the
/// normalized image of the submitted payload, never a merge.
pub async fn update_note(note_id: Uuid, form: SaveNote, BaseParams { db, ctx }: BaseParams) -> Result<Note> {
    let draft = NoteDraft::from_form(form);
    let user_id = ctx.get_user_id();
    db.call(move |conn| {
        let tx = conn.transaction()?;
        let created_by = note_owner(&tx, note_id)?.ok_or_else(note_not_found)?;
        if !can_access(created_by, user_id) {
            return Err(Error::Forbidden.into());
        }
        tx.execute(
            "UPDATE notes SET title = ?, body = ?, date = ?, status = ?, icon = ?, cover_url = ?, \
             project = ?, location = ?, due_date = ?, priority = ?, updated_at = ?, updated_by = ? \
             WHERE id = ?",
            params![
                draft.title,
                draft.body,
                draft.date,
                draft.status.as_str(),
                draft.icon,
                draft.cover_url,
                draft.properties.project,
                draft.properties.location,
                draft.properties.due_date,
                draft.properties.priority.as_str(),
                chrono::Utc::now(),
                user_id,
                note_id,
            ],
        )?;
        replace_blocks(&tx, note_id, &draft.blocks)?;
        replace_tags(&tx, note_id, &draft.tags)?;
        tx.commit()?;
        let note = load_note(conn, note_id)?.ok_or_else(note_not_found)?;
        Ok(note)
    })
    .await
    .map_err(Error::from)
}

pub async fn delete_note(note_id: Uuid, BaseParams { db, ctx }: BaseParams) -> Result<Note> {
    let user_id = ctx.get_user_id();
    db.call(move |conn| {
        let tx = conn.transaction()?;
        let note = load_note(&tx, note_id)?.ok_or_else(note_not_found)?;
        if !can_access(note.created_by, user_id) {
            return Err(Error::Forbidden.into());
        }
        // block and tag rows go with the note via ON DELETE CASCADE
        tx.execute("DELETE FROM notes WHERE id = ?", params![note_id])?;
        tx.commit()?;
        Ok(note)
    })
    .await
    .map_err(Error::from)
}

/// Narrow single-row update addressed by `(note_id, uid)`: rewrites only the
/// payload's `checked` flag, leaving siblings and positions untouched.
/// Misses (unknown block, foreign note's block, non-todo) report `ok: false`.
pub async fn toggle_block_checked(
    note_id: Uuid,
    block_uid: String,
    checked: bool,
    BaseParams { db, ctx }: BaseParams,
) -> Result<ToggleResponse> {
    let user_id = ctx.get_user_id();
    db.call(move |conn| {
        let Some(created_by) = note_owner(conn, note_id)? else {
            return Ok(ToggleResponse { ok: false });
        };
        if !can_access(created_by, user_id) {
            return Err(Error::Forbidden.into());
        }

        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM note_blocks WHERE note_id = ? AND uid = ?",
                params![note_id, block_uid],
                |row| row.get(0),
            )
            .optional()?;
        let Some(payload) = payload else {
            return Ok(ToggleResponse { ok: false });
        };
        let Ok(mut value) = serde_json::from_str::<Value>(&payload) else {
            return Ok(ToggleResponse { ok: false });
        };
        if value.get("type").and_then(Value::as_str) != Some("todo") {
            return Ok(ToggleResponse { ok: false });
        }

        value["checked"] = checked.into();
        conn.execute(
            "UPDATE note_blocks SET payload = ? WHERE note_id = ? AND uid = ?",
            params![value.to_string(), note_id, block_uid],
        )?;
        Ok(ToggleResponse { ok: true })
    })
    .await
    .map_err(Error::from)
}

// Stand-in for the external sharing service's per-note capability check.
fn can_access(created_by: Option<Uuid>, user_id: Option<Uuid>) -> bool {
    created_by.is_none() || created_by == user_id
}

fn note_not_found() -> tokio_rusqlite::Error {
    Error::NotFound("Note not found".into()).into()
}

fn note_owner(conn: &rusqlite::Connection, note_id: Uuid) -> rusqlite::Result<Option<Option<Uuid>>> {
    conn.query_row("SELECT created_by FROM notes WHERE id = ?", params![note_id], |row| {
        row.get(0)
    })
    .optional()
}

pub(crate) fn load_note(conn: &rusqlite::Connection, note_id: Uuid) -> rusqlite::Result<Option<Note>> {
    let note = conn
        .query_row(
            &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?"),
            params![note_id],
            |row| Note::try_from(row),
        )
        .optional()?;
    let Some(mut note) = note else {
        return Ok(None);
    };
    note.blocks = load_blocks(conn, note_id)?;
    note.tags = load_tags(conn, note_id)?;
    Ok(Some(note))
}

fn load_blocks(conn: &rusqlite::Connection, note_id: Uuid) -> rusqlite::Result<Vec<Block>> {
    let payloads = conn
        .prepare("SELECT payload FROM note_blocks WHERE note_id = ? ORDER BY position")?
        .query_map(params![note_id], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    // Stored payloads are already normalized; re-normalizing shields readers
    // from rows written by older schema revisions.
    Ok(payloads
        .iter()
        .filter_map(|payload| serde_json::from_str::<Value>(payload).ok())
        .filter_map(|value| normalize_block(&value))
        .collect())
}

fn load_tags(conn: &rusqlite::Connection, note_id: Uuid) -> rusqlite::Result<Vec<Tag>> {
    conn.prepare(
        "SELECT t.label, t.color FROM note_tags nt \
         JOIN tags t ON t.label = nt.label \
         WHERE nt.note_id = ? ORDER BY t.label",
    )?
    .query_map(params![note_id], |row| {
        Ok(Tag {
            label: row.get(0)?,
            color: row.get(1)?,
        })
    })?
    .collect()
}

/// Inserts a fresh note row plus its blocks and tag assignment. Must run
/// inside the caller's transaction.
pub(crate) fn insert_note(tx: &Transaction<'_>, draft: &NoteDraft, created_by: Option<Uuid>) -> rusqlite::Result<Uuid> {
    let note_id: Uuid = tx.query_row(
        "INSERT INTO notes (title, body, date, status, icon, cover_url, \
         project, location, due_date, priority, created_by) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
        params![
            draft.title,
            draft.body,
            draft.date,
            draft.status.as_str(),
            draft.icon,
            draft.cover_url,
            draft.properties.project,
            draft.properties.location,
            draft.properties.due_date,
            draft.properties.priority.as_str(),
            created_by,
        ],
        |row| row.get(0),
    )?;
    replace_blocks(tx, note_id, &draft.blocks)?;
    replace_tags(tx, note_id, &draft.tags)?;
    Ok(note_id)
}

/// Delete-all + reinsert. Position is purely the 1-based insertion order;
/// it never survives a write.
fn replace_blocks(tx: &Transaction<'_>, note_id: Uuid, blocks: &[Block]) -> rusqlite::Result<()> {
    tx.execute("DELETE FROM note_blocks WHERE note_id = ?", params![note_id])?;
    let mut insert = tx.prepare("INSERT INTO note_blocks (note_id, uid, position, payload) VALUES (?, ?, ?, ?)")?;
    for (index, block) in blocks.iter().enumerate() {
        let payload =
            serde_json::to_string(block).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        insert.execute(params![note_id, block.uid, (index + 1) as i64, payload])?;
    }
    Ok(())
}

fn replace_tags(tx: &Transaction<'_>, note_id: Uuid, tags: &[Tag]) -> rusqlite::Result<()> {
    tx.execute("DELETE FROM note_tags WHERE note_id = ?", params![note_id])?;
    for tag in tags {
        // first writer of a label owns its color; the catalog key is NOCASE
        tx.execute(
            "INSERT OR IGNORE INTO tags (label, color) VALUES (?, ?)",
            params![tag.label, tag.color],
        )?;
        tx.execute(
            "INSERT INTO note_tags (note_id, label) VALUES (?, ?)",
            params![note_id, tag.label],
        )?;
    }
    Ok(())
}
