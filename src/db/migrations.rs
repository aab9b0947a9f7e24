use lazy_static::lazy_static;
use rusqlite_migration::{Migrations, M};

lazy_static! {
    static ref DEV_FIXTURES: String = _dev_fixtures();
    pub static ref MIGRATIONS: Migrations<'static> = Migrations::new(vec![
        M::up(
            r#"
            CREATE TABLE users (
                id BLOB PRIMARY KEY CHECK(length(id) = 16) NOT NULL UNIQUE DEFAULT (uuid7_now()),
                email TEXT NOT NULL UNIQUE,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
        "#
        ),
        M::up(
            r#"
            CREATE TABLE notes (
                id BLOB PRIMARY KEY CHECK(length(id) = 16) NOT NULL UNIQUE DEFAULT (uuid7_now()),

                title TEXT NOT NULL DEFAULT '',
                -- flat plaintext projection of the block list, kept in sync on every save
                body TEXT NOT NULL DEFAULT '',
                date TEXT,
                status TEXT NOT NULL DEFAULT 'idea', -- idea | in_progress | review | blocked | complete | archived
                icon TEXT,
                cover_url TEXT,

                project TEXT NOT NULL DEFAULT '',
                location TEXT NOT NULL DEFAULT '',
                due_date TEXT,
                priority TEXT NOT NULL DEFAULT 'Medium', -- High | Medium | Low

                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                created_by BLOB CHECK(length(created_by) = 16),
                updated_at DATETIME,
                updated_by BLOB CHECK(length(updated_by) = 16),

                FOREIGN KEY (created_by) REFERENCES users (id),
                FOREIGN KEY (updated_by) REFERENCES users (id)
            );
        "#
        ),
        M::up(
            r#"
            CREATE TABLE note_blocks (
                note_id BLOB NOT NULL CHECK(length(note_id) = 16),
                uid TEXT NOT NULL,
                position INTEGER NOT NULL,
                payload TEXT NOT NULL, -- normalized wire JSON, position excluded

                PRIMARY KEY (note_id, uid),
                FOREIGN KEY (note_id) REFERENCES notes (id) ON DELETE CASCADE
            );
            CREATE INDEX idx_note_blocks_order ON note_blocks (note_id, position);
        "#
        ),
        M::up(
            r#"
            CREATE TABLE tags (
                label TEXT PRIMARY KEY COLLATE NOCASE,
                color TEXT NOT NULL
            );
            CREATE TABLE note_tags (
                note_id BLOB NOT NULL CHECK(length(note_id) = 16),
                label TEXT NOT NULL COLLATE NOCASE,

                PRIMARY KEY (note_id, label),
                FOREIGN KEY (note_id) REFERENCES notes (id) ON DELETE CASCADE,
                FOREIGN KEY (label) REFERENCES tags (label)
            );
        "#
        ),
        M::up(
            r#"
            CREATE TABLE templates (
                id BLOB PRIMARY KEY CHECK(length(id) = 16) NOT NULL UNIQUE DEFAULT (uuid7_now()),
                owner_id BLOB NOT NULL CHECK(length(owner_id) = 16),
                name TEXT NOT NULL,
                snapshot TEXT NOT NULL, -- JSON: title, icon, cover_url, status, properties, tags, blocks

                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME,

                UNIQUE (owner_id, name),
                FOREIGN KEY (owner_id) REFERENCES users (id)
            );
        "#
        ),
        M::up(&DEV_FIXTURES),
    ]);
}

fn _dev_fixtures() -> String {
    let user_id = "018f6146-32f4-7948-8289-cfb5cdb2b2af";
    format!(
        r#"
        INSERT INTO users (id, email) VALUES (uuid_blob('{user_id}'), 'fake@mail.com');
        "#
    )
}
