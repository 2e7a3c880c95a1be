use std::collections::HashMap;
use crate::models::{MarkerKey, StopRecord};

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Loaded(StopRecord),
}

/// Proof that a fetch was started; handed back to `finish`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    key: MarkerKey,
    epoch: u64,
}

impl LoadTicket {
    #[must_use]
    pub fn key(&self) -> MarkerKey {
        self.key
    }
}

/// Guards lazy popup fetches: one request per marker at a time, results
/// cached once loaded, failures leave the marker retryable.
#[derive(Debug, Default)]
pub struct PopupLoader {
    states: HashMap<MarkerKey, LoadState>,
    epoch: u64,
}

impl PopupLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self, key: MarkerKey) -> &LoadState {
        self.states.get(&key).unwrap_or(&LoadState::NotLoaded)
    }

    #[must_use]
    pub fn cached(&self, key: MarkerKey) -> Option<&StopRecord> {
        match self.states.get(&key) {
            Some(LoadState::Loaded(record)) => Some(record),
            _ => None,
        }
    }

    /// Starts a fetch unless one is already running or the content is cached
    pub fn begin(&mut self, key: MarkerKey) -> Option<LoadTicket> {
        match self.state(key) {
            LoadState::NotLoaded => {
                self.states.insert(key, LoadState::Loading);
                Some(LoadTicket { key, epoch: self.epoch })
            }
            LoadState::Loading | LoadState::Loaded(_) => None,
        }
    }

    /// Applies a fetch result. Returns the record on success; stale tickets
    /// and failures yield `None`.
    pub fn finish(&mut self, ticket: LoadTicket, result: Result<StopRecord, String>) -> Option<&StopRecord> {
        if ticket.epoch != self.epoch {
            return None;
        }
        match result {
            Ok(record) => {
                self.states.insert(ticket.key, LoadState::Loaded(record));
                self.cached(ticket.key)
            }
            Err(e) => {
                leptos::logging::warn!("Popup content for {:?} {} failed: {e}", ticket.key.side, ticket.key.stop_id);
                self.states.remove(&ticket.key);
                None
            }
        }
    }

    /// Forgets everything, e.g. after the marker set was reloaded
    pub fn reset(&mut self) {
        self.states.clear();
        self.epoch += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StopSide;

    fn key() -> MarkerKey {
        MarkerKey { side: StopSide::Osm, stop_id: 9 }
    }

    fn record() -> StopRecord {
        StopRecord { id: 9, ..StopRecord::default() }
    }

    #[test]
    fn test_duplicate_fetch_is_suppressed() {
        let mut loader = PopupLoader::new();
        let ticket = loader.begin(key()).expect("first click starts a fetch");
        assert_eq!(loader.begin(key()), None);
        assert_eq!(loader.state(key()), &LoadState::Loading);

        assert!(loader.finish(ticket, Ok(record())).is_some());
        assert_eq!(loader.begin(key()), None);
        assert_eq!(loader.cached(key()).map(|r| r.id), Some(9));
    }

    #[test]
    fn test_failure_allows_retry() {
        let mut loader = PopupLoader::new();
        let ticket = loader.begin(key()).expect("fetch");
        assert!(loader.finish(ticket, Err("offline".to_string())).is_none());
        assert_eq!(loader.state(key()), &LoadState::NotLoaded);
        assert!(loader.begin(key()).is_some());
    }

    #[test]
    fn test_reset_discards_in_flight_results() {
        let mut loader = PopupLoader::new();
        let stale = loader.begin(key()).expect("fetch");
        loader.reset();
        assert!(loader.finish(stale, Ok(record())).is_none());
        assert_eq!(loader.cached(key()), None);
        assert!(loader.begin(key()).is_some());
    }
}
