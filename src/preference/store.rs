use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;

use super::model::{Theme, ThemePreference};

/// One theme preference per user, held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, ThemePreference>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the user's record, creating an `auto` one on first access.
    pub fn get_or_create(&self, user: &str) -> ThemePreference {
        if let Some(existing) = self.records.read().get(user) {
            return existing.clone();
        }
        self.records
            .write()
            .entry(user.to_string())
            .or_insert_with(|| fresh(Theme::default()))
            .clone()
    }

    pub fn update(&self, user: &str, theme: Theme) -> ThemePreference {
        let mut records = self.records.write();
        let record = records
            .entry(user.to_string())
            .or_insert_with(|| fresh(theme));
        record.theme = theme;
        record.updated_at = Some(Utc::now());
        record.clone()
    }

    pub fn get(&self, user: &str) -> Option<ThemePreference> {
        self.records.read().get(user).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

fn fresh(theme: Theme) -> ThemePreference {
    let now = Utc::now();
    ThemePreference {
        theme,
        created_at: Some(now),
        updated_at: Some(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_access_creates_auto() {
        let store = MemoryStore::new();
        assert!(store.get("u1").is_none());

        let pref = store.get_or_create("u1");
        assert_eq!(pref.theme, Theme::Auto);
        assert!(pref.created_at.is_some());
        assert_eq!(store.get("u1"), Some(pref.clone()));
        assert_eq!(store.get_or_create("u1"), pref);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_keeps_created_at() {
        let store = MemoryStore::new();
        let created = store.get_or_create("u1");

        let updated = store.update("u1", Theme::Dark);
        assert_eq!(updated.theme, Theme::Dark);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn test_users_are_isolated() {
        let store = MemoryStore::new();
        store.update("u1", Theme::Light);
        assert_eq!(store.get_or_create("u2").theme, Theme::Auto);
        assert_eq!(store.get("u1").unwrap().theme, Theme::Light);
    }
}
