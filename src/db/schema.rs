pub const SCHEMA: &str = r#"
-- bookmarks table
CREATE TABLE IF NOT EXISTS bookmarks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    title TEXT NOT NULL,
    summary TEXT NOT NULL,
    stored_date TEXT NOT NULL,
    due_date TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_bookmarks_due_date ON bookmarks(due_date);
CREATE INDEX IF NOT EXISTS idx_bookmarks_stored_date ON bookmarks(stored_date);
"#;
