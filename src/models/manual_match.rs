use serde::{Deserialize, Serialize};
use super::stop::StopSide;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingMatch {
    pub from: StopSide,
    pub stop_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualMatchRequest {
    pub atlas_stop_id: i64,
    pub osm_stop_id: i64,
    pub make_persistent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManualMatchResponse {
    #[serde(default)]
    pub is_persistent: bool,
}

/// What a "Match to" click did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStep {
    /// First half of a pairing selected
    Started(PendingMatch),
    /// Click on the same dataset while a selection is pending
    Unchanged,
    /// Opposite dataset clicked; the pairing must be submitted
    Submit(ManualMatchRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched { is_persistent: bool },
    /// Submission failed; the selection is kept for a retry
    Failed(String),
    /// The selection changed while the request was in flight
    Superseded,
}

/// Two-click pairing of an ATLAS entry with an OSM entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ManualMatch {
    pending: Option<PendingMatch>,
    make_persistent: bool,
}

impl ManualMatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pending(&self) -> Option<PendingMatch> {
        self.pending
    }

    #[must_use]
    pub fn make_persistent(&self) -> bool {
        self.make_persistent
    }

    pub fn set_make_persistent(&mut self, value: bool) {
        self.make_persistent = value;
    }

    pub fn click(&mut self, side: StopSide, stop_id: i64) -> MatchStep {
        match self.pending {
            None => {
                let pending = PendingMatch { from: side, stop_id };
                self.pending = Some(pending);
                MatchStep::Started(pending)
            }
            Some(pending) if pending.from == side => MatchStep::Unchanged,
            Some(pending) => {
                let (atlas_stop_id, osm_stop_id) = match pending.from {
                    StopSide::Atlas => (pending.stop_id, stop_id),
                    StopSide::Osm => (stop_id, pending.stop_id),
                };
                MatchStep::Submit(ManualMatchRequest { atlas_stop_id, osm_stop_id, make_persistent: self.make_persistent })
            }
        }
    }

    /// Applies the backend answer for `request`. Results for a selection that
    /// was cancelled or replaced in the meantime are ignored.
    pub fn complete(&mut self, request: &ManualMatchRequest, result: Result<ManualMatchResponse, String>) -> MatchOutcome {
        let still_pending = self.pending.is_some_and(|p| match p.from {
            StopSide::Atlas => p.stop_id == request.atlas_stop_id,
            StopSide::Osm => p.stop_id == request.osm_stop_id,
        });
        if !still_pending {
            return MatchOutcome::Superseded;
        }
        match result {
            Ok(response) => {
                self.pending = None;
                MatchOutcome::Matched { is_persistent: response.is_persistent }
            }
            Err(e) => MatchOutcome::Failed(e),
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Label of the match button in a bubble of the given dataset
    #[must_use]
    pub fn button_label(&self, side: StopSide) -> &'static str {
        match self.pending {
            Some(p) if p.from != side => "Match to this entry",
            Some(_) => "Selected for matching",
            None => "Match to",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atlas_then_osm_submits_and_clears() {
        let mut mm = ManualMatch::new();
        assert_eq!(mm.click(StopSide::Atlas, 11), MatchStep::Started(PendingMatch { from: StopSide::Atlas, stop_id: 11 }));

        let MatchStep::Submit(request) = mm.click(StopSide::Osm, 42) else {
            panic!("second click on the other dataset should submit");
        };
        assert_eq!(request, ManualMatchRequest { atlas_stop_id: 11, osm_stop_id: 42, make_persistent: false });
        assert!(mm.pending().is_some());

        let outcome = mm.complete(&request, Ok(ManualMatchResponse { is_persistent: false }));
        assert_eq!(outcome, MatchOutcome::Matched { is_persistent: false });
        assert_eq!(mm.pending(), None);
    }

    #[test]
    fn test_osm_first_orders_ids() {
        let mut mm = ManualMatch::new();
        mm.set_make_persistent(true);
        mm.click(StopSide::Osm, 5);
        assert_eq!(mm.click(StopSide::Atlas, 9), MatchStep::Submit(ManualMatchRequest { atlas_stop_id: 9, osm_stop_id: 5, make_persistent: true }));
    }

    #[test]
    fn test_same_side_click_is_noop() {
        let mut mm = ManualMatch::new();
        mm.click(StopSide::Atlas, 1);
        assert_eq!(mm.click(StopSide::Atlas, 2), MatchStep::Unchanged);
        assert_eq!(mm.pending(), Some(PendingMatch { from: StopSide::Atlas, stop_id: 1 }));
    }

    #[test]
    fn test_failure_keeps_selection() {
        let mut mm = ManualMatch::new();
        mm.click(StopSide::Atlas, 1);
        let MatchStep::Submit(request) = mm.click(StopSide::Osm, 2) else { panic!("expected submit") };
        let outcome = mm.complete(&request, Err("500".to_string()));
        assert_eq!(outcome, MatchOutcome::Failed("500".to_string()));
        assert_eq!(mm.pending().map(|p| p.stop_id), Some(1));
    }

    #[test]
    fn test_result_after_cancel_is_ignored() {
        let mut mm = ManualMatch::new();
        mm.click(StopSide::Atlas, 1);
        let MatchStep::Submit(request) = mm.click(StopSide::Osm, 2) else { panic!("expected submit") };
        mm.cancel();
        mm.click(StopSide::Atlas, 3);
        assert_eq!(mm.complete(&request, Ok(ManualMatchResponse::default())), MatchOutcome::Superseded);
        assert_eq!(mm.pending().map(|p| p.stop_id), Some(3));
    }

    #[test]
    fn test_button_labels_follow_state() {
        let mut mm = ManualMatch::new();
        assert_eq!(mm.button_label(StopSide::Osm), "Match to");
        mm.click(StopSide::Atlas, 1);
        assert_eq!(mm.button_label(StopSide::Osm), "Match to this entry");
        assert_eq!(mm.button_label(StopSide::Atlas), "Selected for matching");
        mm.cancel();
        assert_eq!(mm.button_label(StopSide::Atlas), "Match to");
    }
}
