//! Database schema and migrations for the gallery.
//!
//! Migrations are applied in order on open; `schema_version` records
//! which ones already ran.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: folders and images
    r#"
CREATE TABLE folders (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL CHECK (length(trim(name)) > 0),
    description TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
);

CREATE INDEX idx_folders_created_at ON folders(created_at);

CREATE TABLE images (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    folder_id   INTEGER NOT NULL REFERENCES folders(id) ON DELETE CASCADE,
    title       TEXT NOT NULL,
    image_url   TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
);

CREATE INDEX idx_images_folder_created ON images(folder_id, created_at);
"#,
];
