//! High score submission
//!
//! Scores from finished sessions are queued locally, keyed by the game-over
//! timestamp, and only removed once the remote service confirms them. The
//! service is best-effort: nothing here can fail a play session.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Name shown when the service can't tell us who the player is
pub const GUEST_NAME: &str = "Guest";

/// Scores awaiting submission, timestamp (ms) -> score
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnsubmittedScores {
    entries: BTreeMap<u64, u64>,
}

impl UnsubmittedScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a score. Returns the key actually used; a taken timestamp is
    /// bumped forward so two sessions never share a slot.
    pub fn record(&mut self, timestamp_ms: u64, score: u64) -> u64 {
        let mut key = timestamp_ms;
        while self.entries.contains_key(&key) {
            key += 1;
        }
        self.entries.insert(key, score);
        key
    }

    pub fn remove(&mut self, timestamp_ms: u64) -> Option<u64> {
        self.entries.remove(&timestamp_ms)
    }

    pub fn get(&self, timestamp_ms: u64) -> Option<u64> {
        self.entries.get(&timestamp_ms).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.entries.iter().map(|(&t, &s)| (t, s))
    }

    /// Best queued score
    pub fn best(&self) -> Option<u64> {
        self.entries.values().copied().max()
    }
}

/// Remote service failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("not logged in")]
    NotLoggedIn,
}

/// Logged-in account details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
}

/// Requested account changes; `None` fields stay as they are
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Remote leaderboard and account backend
pub trait ScoreService {
    /// Submit one finished session
    fn submit_score(&mut self, timestamp_ms: u64, score: u64) -> Result<(), ServiceError>;

    /// Name of the current user, `None` when anonymous
    fn fetch_username(&mut self) -> Result<Option<String>, ServiceError>;

    fn login(&mut self, username: &str, password: &str) -> Result<Account, ServiceError>;

    fn update_account(&mut self, update: &AccountUpdate) -> Result<Account, ServiceError>;
}

/// Backend used when no network is configured; every call fails so that
/// queued scores are kept for a later run
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineService;

impl ScoreService for OfflineService {
    fn submit_score(&mut self, _timestamp_ms: u64, _score: u64) -> Result<(), ServiceError> {
        Err(ServiceError::Network("offline".to_string()))
    }

    fn fetch_username(&mut self) -> Result<Option<String>, ServiceError> {
        Err(ServiceError::Network("offline".to_string()))
    }

    fn login(&mut self, _username: &str, _password: &str) -> Result<Account, ServiceError> {
        Err(ServiceError::Network("offline".to_string()))
    }

    fn update_account(&mut self, _update: &AccountUpdate) -> Result<Account, ServiceError> {
        Err(ServiceError::Network("offline".to_string()))
    }
}

/// Outcome of a flush attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub submitted: usize,
    pub failed: usize,
}

/// Try to submit every queued score. Confirmed entries leave the queue;
/// failures are logged and stay queued.
pub fn flush_unsubmitted<S: ScoreService + ?Sized>(
    queue: &mut UnsubmittedScores,
    service: &mut S,
) -> FlushReport {
    let mut report = FlushReport::default();
    let pending: Vec<(u64, u64)> = queue.iter().collect();
    for (timestamp, score) in pending {
        match service.submit_score(timestamp, score) {
            Ok(()) => {
                queue.remove(timestamp);
                report.submitted += 1;
            }
            Err(e) => {
                log::warn!("Score {} from {} not submitted: {}", score, timestamp, e);
                report.failed += 1;
            }
        }
    }
    if report.submitted > 0 {
        log::info!("Submitted {} queued scores", report.submitted);
    }
    report
}

/// Username for display, falling back to [`GUEST_NAME`] on any failure
pub fn display_name<S: ScoreService + ?Sized>(service: &mut S) -> String {
    match service.fetch_username() {
        Ok(Some(name)) => name,
        Ok(None) => GUEST_NAME.to_string(),
        Err(e) => {
            log::debug!("Username lookup failed: {}", e);
            GUEST_NAME.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts scores at or above a threshold, rejects the rest
    #[derive(Default)]
    struct PickyService {
        min_score: u64,
        accepted: Vec<(u64, u64)>,
        user: Option<String>,
    }

    impl ScoreService for PickyService {
        fn submit_score(&mut self, timestamp_ms: u64, score: u64) -> Result<(), ServiceError> {
            if score < self.min_score {
                return Err(ServiceError::Rejected {
                    status: 400,
                    message: "too low".to_string(),
                });
            }
            self.accepted.push((timestamp_ms, score));
            Ok(())
        }

        fn fetch_username(&mut self) -> Result<Option<String>, ServiceError> {
            Ok(self.user.clone())
        }

        fn login(&mut self, username: &str, _password: &str) -> Result<Account, ServiceError> {
            self.user = Some(username.to_string());
            Ok(Account {
                username: username.to_string(),
            })
        }

        fn update_account(&mut self, update: &AccountUpdate) -> Result<Account, ServiceError> {
            let current = self.user.clone().ok_or(ServiceError::NotLoggedIn)?;
            let username = update.username.clone().unwrap_or(current);
            self.user = Some(username.clone());
            Ok(Account { username })
        }
    }

    #[test]
    fn test_record_bumps_taken_timestamp() {
        let mut queue = UnsubmittedScores::new();
        assert_eq!(queue.record(1000, 5), 1000);
        assert_eq!(queue.record(1000, 7), 1001);
        assert_eq!(queue.get(1000), Some(5));
        assert_eq!(queue.get(1001), Some(7));
        assert_eq!(queue.best(), Some(7));
    }

    #[test]
    fn test_flush_keeps_failures() {
        let mut queue = UnsubmittedScores::new();
        queue.record(1, 3);
        queue.record(2, 12);
        queue.record(3, 20);
        let mut service = PickyService {
            min_score: 10,
            ..Default::default()
        };

        let report = flush_unsubmitted(&mut queue, &mut service);
        assert_eq!(report, FlushReport { submitted: 2, failed: 1 });
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.get(1), Some(3));
        assert_eq!(service.accepted, vec![(2, 12), (3, 20)]);
    }

    #[test]
    fn test_offline_keeps_everything() {
        let mut queue = UnsubmittedScores::new();
        queue.record(10, 1);
        let report = flush_unsubmitted(&mut queue, &mut OfflineService);
        assert_eq!(report.failed, 1);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_display_name_defaults() {
        assert_eq!(display_name(&mut OfflineService), GUEST_NAME);

        let mut service = PickyService::default();
        assert_eq!(display_name(&mut service), GUEST_NAME);
        service.login("postie", "hunter2").unwrap();
        assert_eq!(display_name(&mut service), "postie");

        let renamed = service
            .update_account(&AccountUpdate {
                username: Some("parcelpro".to_string()),
                password: None,
            })
            .unwrap();
        assert_eq!(renamed.username, "parcelpro");
    }

    #[test]
    fn test_queue_serializes_as_map() {
        let mut queue = UnsubmittedScores::new();
        queue.record(1700000000000, 9);
        let json = serde_json::to_string(&queue).unwrap();
        assert_eq!(json, r#"{"1700000000000":9}"#);
        let back: UnsubmittedScores = serde_json::from_str(&json).unwrap();
        assert_eq!(back, queue);
    }
}
