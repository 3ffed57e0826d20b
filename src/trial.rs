//! Free-trial and subscription bookkeeping for one browser profile.
//!
//! State is a single JSON record kept in a key-value store under
//! [`STORAGE_KEY`]. The functions here are pure over [`UserRecord`];
//! [`TrialTracker`] adds loading and saving.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{AppError, Result};

pub const STORAGE_KEY: &str = "hookUserData";
pub const FREE_GENERATIONS_LIMIT: u32 = 5;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
    fn remove(&mut self, key: &str);
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subscription {
    Free,
    Pro,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "subscriptionType")]
    pub subscription: Subscription,
    pub generations_today: u32,
    pub generations_total: u32,
    pub last_used: NaiveDate,
    pub trial_started: DateTime<Utc>,
    #[serde(default = "default_limit")]
    pub free_generations_limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_date: Option<DateTime<Utc>>,
}

fn default_limit() -> u32 {
    FREE_GENERATIONS_LIMIT
}

impl UserRecord {
    pub fn is_subscribed(&self) -> bool {
        self.subscription == Subscription::Pro
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Subscribed,
    FreeTrial { remaining: u32 },
    LimitReached { limit: u32 },
}

impl Access {
    pub fn allowed(&self) -> bool {
        !matches!(self, Access::LimitReached { .. })
    }
}

pub fn new_trial_user(now: DateTime<Utc>) -> UserRecord {
    UserRecord {
        user_id: format!("user_{}", Uuid::new_v4().simple()),
        email: String::new(),
        subscription: Subscription::Free,
        generations_today: 0,
        generations_total: 0,
        last_used: now.date_naive(),
        trial_started: now,
        free_generations_limit: FREE_GENERATIONS_LIMIT,
        subscription_date: None,
    }
}

/// Resets the daily counter when `today` differs from the last use.
/// Returns whether anything changed.
pub fn roll_over_day(record: &mut UserRecord, today: NaiveDate) -> bool {
    if record.last_used == today {
        return false;
    }
    record.generations_today = 0;
    record.last_used = today;
    true
}

pub fn can_generate(record: &UserRecord) -> Access {
    if record.is_subscribed() {
        return Access::Subscribed;
    }
    match record.free_generations_limit.checked_sub(record.generations_today) {
        Some(remaining) if remaining > 0 => Access::FreeTrial { remaining },
        _ => Access::LimitReached { limit: record.free_generations_limit },
    }
}

pub fn record_generation(record: &mut UserRecord) {
    record.generations_today = record.generations_today.saturating_add(1);
    record.generations_total = record.generations_total.saturating_add(1);
}

pub fn upgrade_to_pro(record: &mut UserRecord, now: DateTime<Utc>) {
    record.subscription = Subscription::Pro;
    record.subscription_date = Some(now);
}

pub struct TrialTracker<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> TrialTracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Current record for the profile, creating a trial user when none is
    /// stored or the stored one cannot be read.
    pub fn load(&mut self, now: DateTime<Utc>) -> Result<UserRecord> {
        let stored = self.store.get(STORAGE_KEY).and_then(|raw| {
            serde_json::from_str::<UserRecord>(&raw)
                .map_err(|e| warn!(error = %e, "discarding unreadable user record"))
                .ok()
        });

        match stored {
            Some(mut record) => {
                if roll_over_day(&mut record, now.date_naive()) {
                    debug!(user_id = %record.user_id, "daily counter reset");
                    self.save(&record)?;
                }
                Ok(record)
            }
            None => {
                let record = new_trial_user(now);
                debug!(user_id = %record.user_id, "trial user created");
                self.save(&record)?;
                Ok(record)
            }
        }
    }

    pub fn check(&mut self, now: DateTime<Utc>) -> Result<Access> {
        Ok(can_generate(&self.load(now)?))
    }

    pub fn record(&mut self, now: DateTime<Utc>) -> Result<UserRecord> {
        let mut record = self.load(now)?;
        record_generation(&mut record);
        self.save(&record)?;
        Ok(record)
    }

    pub fn upgrade(&mut self, now: DateTime<Utc>) -> Result<UserRecord> {
        let mut record = self.load(now)?;
        upgrade_to_pro(&mut record, now);
        self.save(&record)?;
        Ok(record)
    }

    pub fn reset(&mut self) {
        self.store.remove(STORAGE_KEY);
    }

    fn save(&mut self, record: &UserRecord) -> Result<()> {
        let raw = serde_json::to_string(record).map_err(|e| AppError::Other(e.into()))?;
        self.store.set(STORAGE_KEY, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn noon(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn new_user_starts_on_free_trial() {
        let user = new_trial_user(noon(1));
        assert!(user.user_id.starts_with("user_"));
        assert_eq!(can_generate(&user), Access::FreeTrial { remaining: 5 });
        assert_ne!(new_trial_user(noon(1)).user_id, user.user_id);
    }

    #[test]
    fn limit_is_reached_after_five_generations() {
        let mut user = new_trial_user(noon(1));
        for _ in 0..4 {
            record_generation(&mut user);
        }
        assert_eq!(can_generate(&user), Access::FreeTrial { remaining: 1 });
        record_generation(&mut user);
        let access = can_generate(&user);
        assert_eq!(access, Access::LimitReached { limit: 5 });
        assert!(!access.allowed());
    }

    #[test]
    fn pro_users_are_never_limited() {
        let mut user = new_trial_user(noon(1));
        user.generations_today = 50;
        upgrade_to_pro(&mut user, noon(2));
        assert_eq!(can_generate(&user), Access::Subscribed);
        assert_eq!(user.subscription_date, Some(noon(2)));
    }

    #[test]
    fn daily_counter_rolls_over() {
        let mut user = new_trial_user(noon(1));
        user.generations_today = 5;
        user.generations_total = 9;
        assert!(!roll_over_day(&mut user, noon(1).date_naive()));
        assert!(roll_over_day(&mut user, noon(2).date_naive()));
        assert_eq!(user.generations_today, 0);
        assert_eq!(user.generations_total, 9);
    }

    #[test]
    fn tracker_persists_under_storage_key() {
        let mut tracker = TrialTracker::new(MemoryStore::default());
        let first = tracker.record(noon(1)).unwrap();
        assert_eq!(first.generations_today, 1);
        let again = tracker.load(noon(1) + Duration::hours(3)).unwrap();
        assert_eq!(again.user_id, first.user_id);
        assert_eq!(again.generations_today, 1);

        let store = tracker.into_store();
        let raw = store.get(STORAGE_KEY).unwrap();
        assert!(raw.contains("\"subscriptionType\":\"free\""));
        assert!(raw.contains("\"generationsToday\":1"));
    }

    #[test]
    fn tracker_resets_counter_on_a_new_day() {
        let mut tracker = TrialTracker::new(MemoryStore::default());
        for _ in 0..5 {
            tracker.record(noon(1)).unwrap();
        }
        assert_eq!(tracker.check(noon(1)).unwrap(), Access::LimitReached { limit: 5 });
        assert_eq!(tracker.check(noon(2)).unwrap(), Access::FreeTrial { remaining: 5 });
    }

    #[test]
    fn corrupt_record_is_replaced() {
        let mut store = MemoryStore::default();
        store.set(STORAGE_KEY, "{not json".into()).unwrap();
        let mut tracker = TrialTracker::new(store);
        let user = tracker.load(noon(1)).unwrap();
        assert_eq!(user.generations_total, 0);
        assert_eq!(tracker.check(noon(1)).unwrap(), Access::FreeTrial { remaining: 5 });
    }

    #[test]
    fn upgrade_and_reset() {
        let mut tracker = TrialTracker::new(MemoryStore::default());
        let before = tracker.load(noon(1)).unwrap();
        let pro = tracker.upgrade(noon(1)).unwrap();
        assert_eq!(pro.user_id, before.user_id);
        assert_eq!(tracker.check(noon(3)).unwrap(), Access::Subscribed);
        tracker.reset();
        assert_ne!(tracker.load(noon(3)).unwrap().user_id, before.user_id);
    }
}
