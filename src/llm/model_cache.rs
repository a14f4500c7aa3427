use std::time::{Duration, Instant};

/// How long a fetched model list is trusted.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Known model ids from a provider's listing endpoint.
#[derive(Debug, Clone)]
pub struct ModelCache {
    entries: Vec<String>,
    fetched_at: Option<Instant>,
    ttl: Duration,
}

impl ModelCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Vec::new(),
            fetched_at: None,
            ttl,
        }
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Instant::now())
    }

    fn is_fresh_at(&self, now: Instant) -> bool {
        self.fetched_at
            .is_some_and(|at| now.saturating_duration_since(at) < self.ttl)
    }

    /// `Some(known)` while fresh and non-empty; `None` when a refresh is due.
    pub fn lookup(&self, model: &str) -> Option<bool> {
        if !self.is_fresh() || self.entries.is_empty() {
            return None;
        }
        Some(self.entries.iter().any(|m| m == model))
    }

    pub fn refresh(&mut self, entries: Vec<String>) {
        self.entries = entries;
        self.fetched_at = Some(Instant::now());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
