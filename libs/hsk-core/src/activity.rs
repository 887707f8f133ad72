//! Per-user activity history.

use crate::error::Result;
use crate::store::ActivityLogStore;
use crate::types::{ActivityLogEntry, NewActivity};
use chrono::{DateTime, Utc};

/// Entries kept per user.
pub const MAX_HISTORY_LENGTH: usize = 100;

/// Prepend an entry to the user's history, trim to [`MAX_HISTORY_LENGTH`] and return it.
///
/// Ids are millisecond timestamps. An entry logged in the same millisecond
/// as the newest one gets the next id instead.
pub fn log_activity<S: ActivityLogStore + ?Sized>(
    store: &S,
    username: &str,
    activity: NewActivity,
    now: DateTime<Utc>,
) -> Result<Vec<ActivityLogEntry>> {
    if username.is_empty() {
        return Ok(Vec::new());
    }

    let mut entries = store.load_activity(username)?;
    let mut id = now.timestamp_millis();
    if let Some(newest) = entries.first() {
        id = id.max(newest.id + 1);
    }

    entries.insert(
        0,
        ActivityLogEntry {
            id,
            kind: activity.kind,
            level: activity.level,
            lesson: activity.lesson,
            mode: activity.mode,
            word: activity.word,
            score: activity.score,
            total: activity.total,
            is_correct: activity.is_correct,
            username: None,
        },
    );
    entries.truncate(MAX_HISTORY_LENGTH);

    store.save_activity(username, &entries)?;
    Ok(entries)
}

pub fn activity_history<S: ActivityLogStore + ?Sized>(store: &S, username: &str) -> Result<Vec<ActivityLogEntry>> {
    if username.is_empty() {
        return Ok(Vec::new());
    }
    store.load_activity(username)
}

/// Every user's entries tagged with the username, newest first. The admin's own log is left out.
pub fn all_activity<S: ActivityLogStore + ?Sized>(store: &S, admin_username: &str) -> Result<Vec<ActivityLogEntry>> {
    let mut all: Vec<_> = store
        .load_all_activity()?
        .into_iter()
        .filter(|(username, _)| username != admin_username)
        .flat_map(|(username, entries)| {
            entries.into_iter().map(move |mut entry| {
                entry.username = Some(username.clone());
                entry
            })
        })
        .collect();

    all.sort_by(|a, b| b.id.cmp(&a.id).then_with(|| a.username.cmp(&b.username)));
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::{ActivityKind, HskLevel};
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn lesson_start(lesson: u32) -> NewActivity {
        NewActivity {
            level: HskLevel::new(1),
            lesson: Some(lesson),
            ..NewActivity::new(ActivityKind::LessonStart)
        }
    }

    #[test]
    fn test_newest_first_and_capped() {
        let store = MemoryStore::new();
        let start = Utc::now();
        for i in 0..120 {
            log_activity(&store, "mali", lesson_start(i), start + Duration::seconds(i as i64)).unwrap();
        }

        let history = activity_history(&store, "mali").unwrap();
        assert_eq!(history.len(), MAX_HISTORY_LENGTH);
        assert_eq!(history[0].lesson, Some(119));
        assert!(history.windows(2).all(|w| w[0].id > w[1].id));
    }

    #[test]
    fn test_same_millisecond_gets_unique_ids() {
        let store = MemoryStore::new();
        let now = Utc::now();
        log_activity(&store, "mali", lesson_start(1), now).unwrap();
        let history = log_activity(&store, "mali", lesson_start(2), now).unwrap();
        assert_eq!(history[0].id, history[1].id + 1);
    }

    #[test]
    fn test_empty_username_logs_nothing() {
        let store = MemoryStore::new();
        assert!(log_activity(&store, "", lesson_start(1), Utc::now()).unwrap().is_empty());
        assert!(store.load_all_activity().unwrap().is_empty());
    }

    #[test]
    fn test_all_activity_skips_admin() {
        let store = MemoryStore::new();
        let now = Utc::now();
        log_activity(&store, "mali", lesson_start(1), now).unwrap();
        log_activity(&store, "admin", lesson_start(2), now + Duration::seconds(1)).unwrap();
        log_activity(&store, "nok", lesson_start(3), now + Duration::seconds(2)).unwrap();

        let all = all_activity(&store, "admin").unwrap();
        let users: Vec<_> = all.iter().map(|e| e.username.as_deref().unwrap()).collect();
        assert_eq!(users, vec!["nok", "mali"]);
    }
}
