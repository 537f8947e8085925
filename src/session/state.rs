//! Session state machine
//!
//! Tracks the lifecycle of a relay session from signaling accept to
//! teardown. The phase lives in a lock-free atomic cell: the signaling
//! loop, the frame pipeline, and shutdown may all observe it concurrently,
//! and reads never block.

use std::sync::atomic::{AtomicU8, Ordering};

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Signaling connection accepted, no remote description yet
    Idle,
    /// Offer received, applying descriptions
    Negotiating,
    /// Answer sent, media path live
    Connected,
    /// Teardown in progress
    Closing,
    /// Terminal; resources released
    Closed,
}

impl SessionPhase {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => SessionPhase::Idle,
            1 => SessionPhase::Negotiating,
            2 => SessionPhase::Connected,
            3 => SessionPhase::Closing,
            _ => SessionPhase::Closed,
        }
    }
}

/// Atomic holder for a [`SessionPhase`]
///
/// Invalid transitions are no-ops; entering teardown is gated so exactly
/// one caller wins the transition into `Closing`.
#[derive(Debug)]
pub struct PhaseCell(AtomicU8);

impl PhaseCell {
    /// Create a cell in the `Idle` phase
    pub fn new() -> Self {
        Self(AtomicU8::new(SessionPhase::Idle as u8))
    }

    /// Current phase
    pub fn get(&self) -> SessionPhase {
        SessionPhase::from_u8(self.0.load(Ordering::Relaxed))
    }

    /// `Idle -> Negotiating`; returns whether the transition happened
    pub fn start_negotiation(&self) -> bool {
        self.0
            .compare_exchange(
                SessionPhase::Idle as u8,
                SessionPhase::Negotiating as u8,
                Ordering::Relaxed,
                Ordering::Relaxed,
            )
            .is_ok()
    }

    /// `Negotiating -> Connected`; returns whether the transition happened
    pub fn connect(&self) -> bool {
        self.0
            .compare_exchange(
                SessionPhase::Negotiating as u8,
                SessionPhase::Connected as u8,
                Ordering::Relaxed,
                Ordering::Relaxed,
            )
            .is_ok()
    }

    /// Enter teardown from any live phase
    ///
    /// Returns `false` if the session is already `Closing` or `Closed`,
    /// so teardown runs at most once.
    pub fn begin_close(&self) -> bool {
        self.0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                match SessionPhase::from_u8(current) {
                    SessionPhase::Closing | SessionPhase::Closed => None,
                    _ => Some(SessionPhase::Closing as u8),
                }
            })
            .is_ok()
    }

    /// `-> Closed`, terminal
    pub fn finish_close(&self) {
        self.0.store(SessionPhase::Closed as u8, Ordering::Relaxed);
    }
}

impl Default for PhaseCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_lifecycle() {
        let phase = PhaseCell::new();
        assert_eq!(phase.get(), SessionPhase::Idle);

        assert!(phase.start_negotiation());
        assert_eq!(phase.get(), SessionPhase::Negotiating);

        assert!(phase.connect());
        assert_eq!(phase.get(), SessionPhase::Connected);

        assert!(phase.begin_close());
        assert_eq!(phase.get(), SessionPhase::Closing);

        phase.finish_close();
        assert_eq!(phase.get(), SessionPhase::Closed);
    }

    #[test]
    fn test_second_negotiation_rejected() {
        let phase = PhaseCell::new();

        assert!(phase.start_negotiation());
        assert!(!phase.start_negotiation());

        assert!(phase.connect());
        assert!(!phase.start_negotiation());
        assert_eq!(phase.get(), SessionPhase::Connected);
    }

    #[test]
    fn test_connect_requires_negotiation() {
        let phase = PhaseCell::new();

        assert!(!phase.connect());
        assert_eq!(phase.get(), SessionPhase::Idle);
    }

    #[test]
    fn test_close_from_any_live_phase() {
        for setup in 0..3 {
            let phase = PhaseCell::new();
            if setup >= 1 {
                phase.start_negotiation();
            }
            if setup >= 2 {
                phase.connect();
            }

            assert!(phase.begin_close());
            assert_eq!(phase.get(), SessionPhase::Closing);
        }
    }

    #[test]
    fn test_close_runs_at_most_once() {
        let phase = PhaseCell::new();

        assert!(phase.begin_close());
        assert!(!phase.begin_close());

        phase.finish_close();
        assert!(!phase.begin_close());
        assert_eq!(phase.get(), SessionPhase::Closed);
    }
}
