//! SQLite schema definitions.

/// Complete schema, safe to run on every open.
pub const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

-- Accounts; devices is a JSON array of {id, last_login}
CREATE TABLE IF NOT EXISTS users (
    username TEXT PRIMARY KEY,
    password_hash TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    phone TEXT NOT NULL UNIQUE,
    is_vip INTEGER NOT NULL DEFAULT 0,
    vip_expiry_date TEXT,
    devices TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL
);

-- Mastery score per user and word
CREATE TABLE IF NOT EXISTS word_progress (
    username TEXT NOT NULL,
    word TEXT NOT NULL,
    score INTEGER NOT NULL CHECK (score BETWEEN 0 AND 5),
    last_reviewed TEXT NOT NULL,
    PRIMARY KEY (username, word)
);

-- Activity history; id is a millisecond timestamp unique per user
CREATE TABLE IF NOT EXISTS activity_log (
    username TEXT NOT NULL,
    id INTEGER NOT NULL,
    kind TEXT NOT NULL,
    level INTEGER,
    lesson INTEGER,
    mode TEXT,
    word TEXT,
    score INTEGER,
    total INTEGER,
    is_correct INTEGER,
    PRIMARY KEY (username, id)
);

-- Recently opened search results; position 0 is newest
CREATE TABLE IF NOT EXISTS recent_searches (
    username TEXT NOT NULL,
    position INTEGER NOT NULL,
    word TEXT NOT NULL,
    pinyin TEXT NOT NULL,
    translation TEXT NOT NULL,
    audio_url TEXT,
    level INTEGER NOT NULL,
    searched_at TEXT NOT NULL,
    PRIMARY KEY (username, position)
);

-- Bearer sessions; only the SHA-256 of the token is stored
CREATE TABLE IF NOT EXISTS sessions (
    token_hash TEXT PRIMARY KEY,
    username TEXT NOT NULL REFERENCES users(username) ON UPDATE CASCADE ON DELETE CASCADE,
    device_id TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_user_device ON sessions(username, device_id);
"#;
