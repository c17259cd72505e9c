//! Visited Set: concurrency-safe map from normalized URL to a terminal
//! outcome. Used for cycle suppression and for status reporting. The
//! check-and-insert-`InProgress` step lives behind one `Mutex<HashMap>`
//! so it stays a single critical section even under concurrent fetches.

use std::collections::HashMap;
use std::sync::Mutex;

/// The terminal (or in-flight) outcome recorded for a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    InProgress,
    Ok,
    Offsite,
    Error(String),
}

#[derive(Default)]
pub struct VisitedSet {
    inner: Mutex<HashMap<String, Outcome>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites any prior outcome for `url`.
    pub fn mark(&self, url: &str, outcome: Outcome) {
        self.inner
            .lock()
            .expect("visited set mutex poisoned")
            .insert(url.to_string(), outcome);
    }

    /// Returns the current outcome for `url`, if any.
    pub fn check(&self, url: &str) -> Option<Outcome> {
        self.inner
            .lock()
            .expect("visited set mutex poisoned")
            .get(url)
            .cloned()
    }

    /// Atomically checks whether `url` is already present and, if not,
    /// marks it `InProgress`. Returns `true` iff this call claimed the
    /// URL (i.e. the caller should go on to fetch it), guaranteeing
    /// at-most-one concurrent fetch per URL.
    pub fn claim(&self, url: &str) -> bool {
        let mut guard = self.inner.lock().expect("visited set mutex poisoned");
        if guard.contains_key(url) {
            false
        } else {
            guard.insert(url.to_string(), Outcome::InProgress);
            true
        }
    }

    pub fn clear(&self) {
        self.inner.lock().expect("visited set mutex poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("visited set mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_is_at_most_once() {
        let visited = VisitedSet::new();
        assert!(visited.claim("http://x/"));
        assert!(!visited.claim("http://x/"));
        assert_eq!(visited.check("http://x/"), Some(Outcome::InProgress));
    }

    #[test]
    fn mark_overwrites_in_progress() {
        let visited = VisitedSet::new();
        visited.claim("http://x/");
        visited.mark("http://x/", Outcome::Ok);
        assert_eq!(visited.check("http://x/"), Some(Outcome::Ok));
    }

    #[test]
    fn clear_empties_the_set() {
        let visited = VisitedSet::new();
        visited.mark("http://x/", Outcome::Ok);
        visited.clear();
        assert!(visited.is_empty());
    }
}
