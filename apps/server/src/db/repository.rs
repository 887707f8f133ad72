//! SQLite implementation of the core store traits, plus bearer sessions.

use crate::db::error::DbError;
use crate::db::schema::SCHEMA;
use chrono::{DateTime, NaiveDate, Utc};
use hsk_core::{
    ActivityKind, ActivityLogEntry, ActivityLogStore, Device, HskLevel, LeveledWord, PracticeMode,
    ProgressData, ProgressStore, RecentSearch, RecentSearchStore, UserRecord, UserStore,
    VocabularyWord, WordProgress,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

type DbResult<T> = std::result::Result<T, DbError>;

const DATE_FORMAT: &str = "%Y-%m-%d";

const USER_COLUMNS: &str =
    "username, password_hash, email, phone, is_vip, vip_expiry_date, devices, created_at";

/// Tables keyed by username that follow an account rename or delete.
/// Sessions follow through their foreign key.
const USER_DATA_TABLES: [&str; 3] = ["word_progress", "activity_log", "recent_searches"];

const ACTIVITY_COLUMNS: &str = "id, kind, level, lesson, mode, word, score, total, is_correct";

/// A logged-in device session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub device_id: String,
    pub created_at: DateTime<Utc>,
}

/// SQLite-backed storage.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open database at path, creating if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn run<T>(&self, f: impl FnOnce(&Connection) -> DbResult<T>) -> hsk_core::Result<T> {
        f(&self.conn).map_err(Into::into)
    }

    // === Sessions ===

    pub fn create_session(
        &self,
        token_hash: &str,
        username: &str,
        device_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO sessions (token_hash, username, device_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![token_hash, username, device_id, now.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn get_session(&self, token_hash: &str) -> DbResult<Option<Session>> {
        let row = self
            .conn
            .query_row(
                "SELECT username, device_id, created_at FROM sessions WHERE token_hash = ?1",
                params![token_hash],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(username, device_id, created_at)| {
            Ok(Session {
                username,
                device_id,
                created_at: parse_time(&created_at)?,
            })
        })
        .transpose()
    }

    pub fn delete_session(&self, token_hash: &str) -> DbResult<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM sessions WHERE token_hash = ?1", params![token_hash])?;
        Ok(deleted > 0)
    }

    /// Revoke every session of one device.
    pub fn delete_device_sessions(&self, username: &str, device_id: &str) -> DbResult<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM sessions WHERE username = ?1 AND device_id = ?2",
            params![username, device_id],
        )?;
        Ok(deleted)
    }
}

fn parse_time(s: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::InvalidData(format!("timestamp {s}: {e}")))
}

fn parse_level(value: i64) -> DbResult<HskLevel> {
    u8::try_from(value)
        .ok()
        .and_then(HskLevel::new)
        .ok_or_else(|| DbError::InvalidData(format!("HSK level {value}")))
}

fn to_u32(value: Option<i64>, column: &str) -> DbResult<Option<u32>> {
    value
        .map(|v| u32::try_from(v).map_err(|_| DbError::InvalidData(format!("{column} {v}"))))
        .transpose()
}

// === Users ===

struct UserRow {
    username: String,
    password_hash: String,
    email: String,
    phone: String,
    is_vip: bool,
    vip_expiry_date: Option<String>,
    devices: String,
    created_at: String,
}

impl UserRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            username: row.get(0)?,
            password_hash: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            is_vip: row.get(4)?,
            vip_expiry_date: row.get(5)?,
            devices: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    fn into_record(self) -> DbResult<UserRecord> {
        let vip_expiry_date = self
            .vip_expiry_date
            .map(|d| {
                NaiveDate::parse_from_str(&d, DATE_FORMAT)
                    .map_err(|e| DbError::InvalidData(format!("vip_expiry_date {d}: {e}")))
            })
            .transpose()?;
        let devices: Vec<Device> = serde_json::from_str(&self.devices)?;

        Ok(UserRecord {
            username: self.username,
            password_hash: self.password_hash,
            email: self.email,
            phone: self.phone,
            is_vip: self.is_vip,
            vip_expiry_date,
            devices,
            created_at: parse_time(&self.created_at)?,
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> DbResult<Option<UserRecord>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1");
    conn.query_row(&sql, params![value], UserRow::from_row)
        .optional()?
        .map(UserRow::into_record)
        .transpose()
}

fn expiry_column(user: &UserRecord) -> Option<String> {
    user.vip_expiry_date.map(|d| d.format(DATE_FORMAT).to_string())
}

impl UserStore for SqliteRepository {
    fn get_user(&self, username: &str) -> hsk_core::Result<Option<UserRecord>> {
        self.run(|conn| query_user(conn, "username", username))
    }

    fn find_user_by_email(&self, email: &str) -> hsk_core::Result<Option<UserRecord>> {
        self.run(|conn| query_user(conn, "email", email))
    }

    fn find_user_by_phone(&self, phone: &str) -> hsk_core::Result<Option<UserRecord>> {
        self.run(|conn| query_user(conn, "phone", phone))
    }

    fn list_users(&self) -> hsk_core::Result<Vec<UserRecord>> {
        self.run(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY username");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], UserRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows.into_iter().map(UserRow::into_record).collect()
        })
    }

    fn insert_user(&self, user: &UserRecord) -> hsk_core::Result<()> {
        self.run(|conn| {
            conn.execute(
                &format!("INSERT INTO users ({USER_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
                params![
                    user.username,
                    user.password_hash,
                    user.email,
                    user.phone,
                    user.is_vip,
                    expiry_column(user),
                    serde_json::to_string(&user.devices)?,
                    user.created_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
    }

    fn replace_user(&self, username: &str, user: &UserRecord) -> hsk_core::Result<()> {
        self.run(|conn| {
            let tx = conn.unchecked_transaction()?;
            let devices = serde_json::to_string(&user.devices)?;

            // Sessions follow a rename through ON UPDATE CASCADE.
            let updated = tx.execute(
                "UPDATE users SET username = ?1, password_hash = ?2, email = ?3, phone = ?4,
                 is_vip = ?5, vip_expiry_date = ?6, devices = ?7, created_at = ?8
                 WHERE username = ?9",
                params![
                    user.username,
                    user.password_hash,
                    user.email,
                    user.phone,
                    user.is_vip,
                    expiry_column(user),
                    devices,
                    user.created_at.to_rfc3339(),
                    username,
                ],
            )?;
            if updated == 0 {
                tx.execute(
                    &format!("INSERT INTO users ({USER_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
                    params![
                        user.username,
                        user.password_hash,
                        user.email,
                        user.phone,
                        user.is_vip,
                        expiry_column(user),
                        devices,
                        user.created_at.to_rfc3339(),
                    ],
                )?;
            }

            if username != user.username {
                for table in USER_DATA_TABLES {
                    tx.execute(
                        &format!("DELETE FROM {table} WHERE username = ?1"),
                        params![user.username],
                    )?;
                    tx.execute(
                        &format!("UPDATE {table} SET username = ?1 WHERE username = ?2"),
                        params![user.username, username],
                    )?;
                }
            }

            tx.commit()?;
            Ok(())
        })
    }

    fn delete_user(&self, username: &str) -> hsk_core::Result<bool> {
        self.run(|conn| {
            let tx = conn.unchecked_transaction()?;
            let deleted = tx.execute("DELETE FROM users WHERE username = ?1", params![username])?;
            for table in USER_DATA_TABLES {
                tx.execute(
                    &format!("DELETE FROM {table} WHERE username = ?1"),
                    params![username],
                )?;
            }
            tx.commit()?;
            Ok(deleted > 0)
        })
    }
}

// === Progress ===

impl ProgressStore for SqliteRepository {
    fn load_progress(&self, username: &str) -> hsk_core::Result<ProgressData> {
        self.run(|conn| {
            let mut stmt = conn.prepare(
                "SELECT word, score, last_reviewed FROM word_progress WHERE username = ?1",
            )?;
            let rows = stmt
                .query_map(params![username], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            let mut progress = ProgressData::new();
            for (word, score, last_reviewed) in rows {
                let score = u8::try_from(score)
                    .map_err(|_| DbError::InvalidData(format!("score {score} for {word}")))?;
                progress.insert(
                    word,
                    WordProgress {
                        score,
                        last_reviewed: parse_time(&last_reviewed)?,
                    },
                );
            }
            Ok(progress)
        })
    }

    fn save_progress(&self, username: &str, progress: &ProgressData) -> hsk_core::Result<()> {
        self.run(|conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute("DELETE FROM word_progress WHERE username = ?1", params![username])?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO word_progress (username, word, score, last_reviewed) VALUES (?1, ?2, ?3, ?4)",
                )?;
                for (word, p) in progress {
                    stmt.execute(params![username, word, p.score, p.last_reviewed.to_rfc3339()])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
    }
}

// === Activity ===

struct ActivityRow {
    id: i64,
    kind: String,
    level: Option<i64>,
    lesson: Option<i64>,
    mode: Option<String>,
    word: Option<String>,
    score: Option<i64>,
    total: Option<i64>,
    is_correct: Option<bool>,
}

impl ActivityRow {
    /// Reads [`ACTIVITY_COLUMNS`] starting at column `offset`.
    fn from_row(row: &Row, offset: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(offset)?,
            kind: row.get(offset + 1)?,
            level: row.get(offset + 2)?,
            lesson: row.get(offset + 3)?,
            mode: row.get(offset + 4)?,
            word: row.get(offset + 5)?,
            score: row.get(offset + 6)?,
            total: row.get(offset + 7)?,
            is_correct: row.get(offset + 8)?,
        })
    }

    fn into_entry(self) -> DbResult<ActivityLogEntry> {
        let kind = ActivityKind::from_str(&self.kind)
            .ok_or_else(|| DbError::InvalidData(format!("activity kind {}", self.kind)))?;
        let mode = self
            .mode
            .map(|m| PracticeMode::from_str(&m).ok_or_else(|| DbError::InvalidData(format!("mode {m}"))))
            .transpose()?;

        Ok(ActivityLogEntry {
            id: self.id,
            kind,
            level: self.level.map(parse_level).transpose()?,
            lesson: to_u32(self.lesson, "lesson")?,
            mode,
            word: self.word,
            score: to_u32(self.score, "score")?,
            total: to_u32(self.total, "total")?,
            is_correct: self.is_correct,
            username: None,
        })
    }
}

impl ActivityLogStore for SqliteRepository {
    fn load_activity(&self, username: &str) -> hsk_core::Result<Vec<ActivityLogEntry>> {
        self.run(|conn| {
            let sql = format!(
                "SELECT {ACTIVITY_COLUMNS} FROM activity_log WHERE username = ?1 ORDER BY id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![username], |row| ActivityRow::from_row(row, 0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows.into_iter().map(ActivityRow::into_entry).collect()
        })
    }

    fn save_activity(&self, username: &str, entries: &[ActivityLogEntry]) -> hsk_core::Result<()> {
        self.run(|conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute("DELETE FROM activity_log WHERE username = ?1", params![username])?;
            {
                let mut stmt = tx.prepare(&format!(
                    "INSERT INTO activity_log (username, {ACTIVITY_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
                ))?;
                for e in entries {
                    stmt.execute(params![
                        username,
                        e.id,
                        e.kind.as_str(),
                        e.level.map(HskLevel::value),
                        e.lesson,
                        e.mode.map(|m| m.as_str()),
                        e.word,
                        e.score,
                        e.total,
                        e.is_correct,
                    ])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
    }

    fn load_all_activity(&self) -> hsk_core::Result<Vec<(String, Vec<ActivityLogEntry>)>> {
        self.run(|conn| {
            let sql = format!(
                "SELECT username, {ACTIVITY_COLUMNS} FROM activity_log ORDER BY username, id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, ActivityRow::from_row(row, 1)?)))?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            let mut grouped: Vec<(String, Vec<ActivityLogEntry>)> = Vec::new();
            for (username, row) in rows {
                let entry = row.into_entry()?;
                match grouped.last_mut() {
                    Some((last, entries)) if *last == username => entries.push(entry),
                    _ => grouped.push((username, vec![entry])),
                }
            }
            Ok(grouped)
        })
    }
}

// === Recent searches ===

impl RecentSearchStore for SqliteRepository {
    fn load_recent_searches(&self, username: &str) -> hsk_core::Result<Vec<RecentSearch>> {
        self.run(|conn| {
            let mut stmt = conn.prepare(
                "SELECT word, pinyin, translation, audio_url, level, searched_at
                 FROM recent_searches WHERE username = ?1 ORDER BY position",
            )?;
            let rows = stmt
                .query_map(params![username], |row| {
                    Ok((
                        VocabularyWord {
                            character: row.get(0)?,
                            pinyin: row.get(1)?,
                            translation: row.get(2)?,
                            audio_url: row.get(3)?,
                        },
                        row.get::<_, i64>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            rows.into_iter()
                .map(|(word, level, searched_at)| {
                    Ok(RecentSearch {
                        word: LeveledWord {
                            word,
                            level: parse_level(level)?,
                        },
                        searched_at: parse_time(&searched_at)?,
                    })
                })
                .collect()
        })
    }

    fn save_recent_searches(&self, username: &str, recent: &[RecentSearch]) -> hsk_core::Result<()> {
        self.run(|conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute("DELETE FROM recent_searches WHERE username = ?1", params![username])?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO recent_searches
                     (username, position, word, pinyin, translation, audio_url, level, searched_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )?;
                for (position, r) in recent.iter().enumerate() {
                    let w = &r.word.word;
                    stmt.execute(params![
                        username,
                        position as i64,
                        w.character,
                        w.pinyin,
                        w.translation,
                        w.audio_url,
                        r.word.level.value(),
                        r.searched_at.to_rfc3339(),
                    ])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
    }
}
