//! Client-visible, per-slide summary state.
//!
//! One [`SlideSummarySlot`] exists per page of the active run. Slots are
//! created `InFlight` when a run begins and settle to `Done` or `Failed`
//! exactly once per run, unless a slide is explicitly retried or the whole
//! set is regenerated.

use serde::{Deserialize, Serialize};

use crate::SlideSummary;

/// Lifecycle status of one slide's summary within the active run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    /// No run has touched this slide yet.
    Pending,
    /// A request for this slide is outstanding. At most one at a time.
    InFlight,
    Done,
    Failed,
}

/// One slide's slot in the client-visible summary state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideSummarySlot {
    pub slide_number: u32,
    pub status: SlotStatus,
    pub summary: Option<SlideSummary>,
    pub error: Option<String>,
}

impl SlideSummarySlot {
    pub fn pending(slide_number: u32) -> Self {
        Self {
            slide_number,
            status: SlotStatus::Pending,
            summary: None,
            error: None,
        }
    }

    pub fn in_flight(slide_number: u32) -> Self {
        Self {
            slide_number,
            status: SlotStatus::InFlight,
            summary: None,
            error: None,
        }
    }

    /// Whether this slot has reached a terminal state for the current run.
    pub fn is_settled(&self) -> bool {
        matches!(self.status, SlotStatus::Done | SlotStatus::Failed)
    }
}

/// Settled-versus-total progress of the active run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub settled: usize,
    pub total: usize,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.settled == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_settles_on_done_and_failed_only() {
        let mut slot = SlideSummarySlot::in_flight(3);
        assert!(!slot.is_settled());

        slot.status = SlotStatus::Done;
        assert!(slot.is_settled());

        slot.status = SlotStatus::Failed;
        assert!(slot.is_settled());

        slot.status = SlotStatus::Pending;
        assert!(!slot.is_settled());
    }
}
