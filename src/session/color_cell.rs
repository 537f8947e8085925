//! Marker color hand-off cell
//!
//! The one resource shared between a session's control handler and its
//! frame pipeline. Writes validate first, then store the whole 3-tuple in
//! a single atomic word, so a reader never observes a partial color. The
//! only ordering guarantee is eventual visibility: a frame may pick up a
//! color update on the next read, never mid-frame.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::overlay::MarkerColor;

const SET_BIT: u32 = 1 << 24;

/// Single-slot atomic cell holding the current marker color, or unset
#[derive(Debug)]
pub struct MarkerColorCell {
    slot: AtomicU32,
}

impl MarkerColorCell {
    /// Create an unset cell
    pub fn new() -> Self {
        Self {
            slot: AtomicU32::new(0),
        }
    }

    /// Validate a raw control payload and store it as the new color
    ///
    /// Malformed input (wrong arity or out-of-range component) is a logged
    /// no-op: the previous color is retained and the session keeps running.
    /// Returns whether the payload was accepted.
    pub fn set(&self, raw: &[i64]) -> bool {
        match MarkerColor::try_from_raw(raw) {
            Ok(color) => {
                self.slot.store(SET_BIT | color.pack(), Ordering::Relaxed);
                true
            }
            Err(reason) => {
                tracing::debug!(%reason, "control payload rejected, keeping previous color");
                false
            }
        }
    }

    /// Latest stored color; never blocks
    pub fn get(&self) -> Option<MarkerColor> {
        let word = self.slot.load(Ordering::Relaxed);
        if word & SET_BIT != 0 {
            Some(MarkerColor::unpack(word))
        } else {
            None
        }
    }
}

impl Default for MarkerColorCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unset() {
        let cell = MarkerColorCell::new();
        assert_eq!(cell.get(), None);
    }

    #[test]
    fn test_set_valid_color() {
        let cell = MarkerColorCell::new();

        assert!(cell.set(&[10, 20, 30]));
        assert_eq!(cell.get(), Some(MarkerColor::new(10, 20, 30)));
    }

    #[test]
    fn test_black_is_distinct_from_unset() {
        let cell = MarkerColorCell::new();

        assert!(cell.set(&[0, 0, 0]));
        assert_eq!(cell.get(), Some(MarkerColor::new(0, 0, 0)));
    }

    #[test]
    fn test_invalid_payload_keeps_previous_value() {
        let cell = MarkerColorCell::new();

        // Out of range while unset: stays unset
        assert!(!cell.set(&[10, 20, 300]));
        assert_eq!(cell.get(), None);

        cell.set(&[1, 2, 3]);

        // Wrong arity and out of range: previous color retained
        assert!(!cell.set(&[4, 5]));
        assert!(!cell.set(&[4, 5, 6, 7]));
        assert!(!cell.set(&[-1, 0, 0]));
        assert_eq!(cell.get(), Some(MarkerColor::new(1, 2, 3)));
    }

    #[test]
    fn test_last_write_wins() {
        let cell = MarkerColorCell::new();

        cell.set(&[1, 1, 1]);
        cell.set(&[2, 2, 2]);

        assert_eq!(cell.get(), Some(MarkerColor::new(2, 2, 2)));
    }

    #[test]
    fn test_concurrent_reads_see_whole_tuples() {
        use std::sync::Arc;

        let cell = Arc::new(MarkerColorCell::new());
        let writer_cell = Arc::clone(&cell);

        let writer = std::thread::spawn(move || {
            for _ in 0..1000 {
                writer_cell.set(&[10, 20, 30]);
                writer_cell.set(&[40, 50, 60]);
            }
        });

        for _ in 0..1000 {
            match cell.get() {
                None => {}
                Some(color) => assert!(
                    color == MarkerColor::new(10, 20, 30) || color == MarkerColor::new(40, 50, 60),
                    "torn read: {}",
                    color
                ),
            }
        }

        writer.join().unwrap();
    }
}
