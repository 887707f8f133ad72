//! Storage traits and an in-memory implementation.
//!
//! The core logic never touches a concrete backend. The server provides a
//! SQLite implementation; [`MemoryStore`] backs unit tests.

use crate::accounts::UserRecord;
use crate::error::{Result, StoreError};
use crate::types::{ActivityLogEntry, ProgressData, RecentSearch};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Per-user mastery progress.
pub trait ProgressStore {
    fn load_progress(&self, username: &str) -> Result<ProgressData>;
    fn save_progress(&self, username: &str, progress: &ProgressData) -> Result<()>;
}

/// Per-user activity log, newest entry first.
pub trait ActivityLogStore {
    fn load_activity(&self, username: &str) -> Result<Vec<ActivityLogEntry>>;
    fn save_activity(&self, username: &str, entries: &[ActivityLogEntry]) -> Result<()>;
    /// All users' logs as `(username, entries)` pairs.
    fn load_all_activity(&self) -> Result<Vec<(String, Vec<ActivityLogEntry>)>>;
}

/// User directory.
///
/// Progress, activity and recent searches are keyed by username, so the
/// directory owns their lifecycle: a rename or delete moves or drops them
/// in the same atomic step as the account row.
pub trait UserStore {
    fn get_user(&self, username: &str) -> Result<Option<UserRecord>>;
    fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>>;
    fn find_user_by_phone(&self, phone: &str) -> Result<Option<UserRecord>>;
    fn list_users(&self) -> Result<Vec<UserRecord>>;
    fn insert_user(&self, user: &UserRecord) -> Result<()>;
    /// Replace the record stored under `username` (which may differ from
    /// `user.username`). On a rename, every per-user record moves to the new
    /// name, replacing anything already stored under it.
    fn replace_user(&self, username: &str, user: &UserRecord) -> Result<()>;
    /// Remove the account and every per-user record. Returns whether it existed.
    fn delete_user(&self, username: &str) -> Result<bool>;
}

/// Per-user recently opened search results.
pub trait RecentSearchStore {
    fn load_recent_searches(&self, username: &str) -> Result<Vec<RecentSearch>>;
    fn save_recent_searches(&self, username: &str, recent: &[RecentSearch]) -> Result<()>;
}

#[derive(Default)]
struct Tables {
    users: HashMap<String, UserRecord>,
    progress: HashMap<String, ProgressData>,
    activity: HashMap<String, Vec<ActivityLogEntry>>,
    recent: HashMap<String, Vec<RecentSearch>>,
}

/// In-memory store for tests and ephemeral use.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

fn move_entry<V>(map: &mut HashMap<String, V>, from: &str, to: &str) {
    map.remove(to);
    if let Some(value) = map.remove(from) {
        map.insert(to.to_string(), value);
    }
}

impl ProgressStore for MemoryStore {
    fn load_progress(&self, username: &str) -> Result<ProgressData> {
        Ok(self.tables()?.progress.get(username).cloned().unwrap_or_default())
    }

    fn save_progress(&self, username: &str, progress: &ProgressData) -> Result<()> {
        self.tables()?
            .progress
            .insert(username.to_string(), progress.clone());
        Ok(())
    }

}

impl ActivityLogStore for MemoryStore {
    fn load_activity(&self, username: &str) -> Result<Vec<ActivityLogEntry>> {
        Ok(self.tables()?.activity.get(username).cloned().unwrap_or_default())
    }

    fn save_activity(&self, username: &str, entries: &[ActivityLogEntry]) -> Result<()> {
        self.tables()?
            .activity
            .insert(username.to_string(), entries.to_vec());
        Ok(())
    }

    fn load_all_activity(&self) -> Result<Vec<(String, Vec<ActivityLogEntry>)>> {
        Ok(self
            .tables()?
            .activity
            .iter()
            .map(|(username, entries)| (username.clone(), entries.clone()))
            .collect())
    }
}

impl UserStore for MemoryStore {
    fn get_user(&self, username: &str) -> Result<Option<UserRecord>> {
        Ok(self.tables()?.users.get(username).cloned())
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        Ok(self
            .tables()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    fn find_user_by_phone(&self, phone: &str) -> Result<Option<UserRecord>> {
        Ok(self
            .tables()?
            .users
            .values()
            .find(|u| u.phone == phone)
            .cloned())
    }

    fn list_users(&self) -> Result<Vec<UserRecord>> {
        let mut users: Vec<_> = self.tables()?.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    fn insert_user(&self, user: &UserRecord) -> Result<()> {
        let mut tables = self.tables()?;
        if tables.users.contains_key(&user.username) {
            return Err(StoreError::Backend(format!(
                "user already exists: {}",
                user.username
            )));
        }
        tables.users.insert(user.username.clone(), user.clone());
        Ok(())
    }

    fn replace_user(&self, username: &str, user: &UserRecord) -> Result<()> {
        let mut tables = self.tables()?;
        tables.users.remove(username);
        tables.users.insert(user.username.clone(), user.clone());

        if username != user.username {
            let to = user.username.clone();
            move_entry(&mut tables.progress, username, &to);
            move_entry(&mut tables.activity, username, &to);
            move_entry(&mut tables.recent, username, &to);
        }
        Ok(())
    }

    fn delete_user(&self, username: &str) -> Result<bool> {
        let mut tables = self.tables()?;
        tables.progress.remove(username);
        tables.activity.remove(username);
        tables.recent.remove(username);
        Ok(tables.users.remove(username).is_some())
    }
}

impl RecentSearchStore for MemoryStore {
    fn load_recent_searches(&self, username: &str) -> Result<Vec<RecentSearch>> {
        Ok(self.tables()?.recent.get(username).cloned().unwrap_or_default())
    }

    fn save_recent_searches(&self, username: &str, recent: &[RecentSearch]) -> Result<()> {
        self.tables()?
            .recent
            .insert(username.to_string(), recent.to_vec());
        Ok(())
    }
}
