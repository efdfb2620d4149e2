//! Grid resize reconciliation.
//!
//! # Responsibility
//! - Apply a new `GridConfig` and drop seat entries that fall outside it.
//! - Offer a side-effect-free preview so callers can confirm destructive
//!   shrinks first.
//!
//! # Invariants
//! - In-bounds seat entries are never renamed, shifted or reassigned.
//! - Growing a dimension never drops entries.

use crate::model::seat::{GridConfig, SeatKey};
use crate::model::state::SeatMap;
use crate::service::seating_service::{SeatingResult, SeatingService};
use log::{info, warn};

/// What a resize would do, computed without mutating state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizePreview {
    pub current: GridConfig,
    pub requested: GridConfig,
    /// Occupied seats that would be dropped, row-major.
    pub dropped_seats: Vec<SeatKey>,
    /// Roster or seat map is non-empty and the size changes.
    pub needs_confirmation: bool,
}

impl ResizePreview {
    pub fn is_noop(&self) -> bool {
        self.current == self.requested
    }
}

/// Outcome of an applied resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeReport {
    pub previous: GridConfig,
    pub applied: GridConfig,
    pub dropped: usize,
}

/// Drops every entry outside `config`; returns the dropped count.
pub fn reconcile_seat_map(seat_map: &mut SeatMap, config: GridConfig) -> usize {
    let before = seat_map.len();
    seat_map.retain(|seat, _| config.contains(*seat));
    before - seat_map.len()
}

impl SeatingService {
    /// Describes the effect of resizing to `rows x cols`.
    pub fn preview_resize(&self, rows: u32, cols: u32) -> SeatingResult<ResizePreview> {
        let requested = GridConfig::new(rows, cols)?;
        let current = self.state.grid;
        let dropped_seats = self
            .state
            .seat_map
            .keys()
            .copied()
            .filter(|seat| !requested.contains(*seat))
            .collect();
        let has_data = !self.state.students.is_empty() || !self.state.seat_map.is_empty();
        Ok(ResizePreview {
            current,
            requested,
            dropped_seats,
            needs_confirmation: has_data && current != requested,
        })
    }

    /// Applies a new grid size and drops out-of-bounds seat entries.
    ///
    /// Lossy by construction; callers confirm shrinks via
    /// [`Self::preview_resize`] before calling this.
    pub fn resize(&mut self, rows: u32, cols: u32) -> SeatingResult<ResizeReport> {
        let applied = GridConfig::new(rows, cols)?;
        let previous = self.state.grid;
        self.state.grid = applied;
        let dropped = reconcile_seat_map(&mut self.state.seat_map, applied);

        let shrink = applied.shrinks(&previous);
        if dropped > 0 {
            warn!(
                "event=resize module=service status=ok rows={} cols={} shrink={} dropped={}",
                rows, cols, shrink, dropped
            );
        } else {
            info!(
                "event=resize module=service status=ok rows={} cols={} shrink={} dropped=0",
                rows, cols, shrink
            );
        }

        Ok(ResizeReport {
            previous,
            applied,
            dropped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::reconcile_seat_map;
    use crate::model::seat::{GridConfig, SeatKey};
    use crate::model::state::SeatMap;

    #[test]
    fn reconcile_keeps_in_bounds_keys_verbatim() {
        let mut map = SeatMap::new();
        map.insert(SeatKey::new(3, 5), "a".to_string());
        map.insert(SeatKey::new(5, 1), "b".to_string());
        map.insert(SeatKey::new(2, 7), "c".to_string());

        let dropped = reconcile_seat_map(&mut map, GridConfig::new(4, 6).unwrap());
        assert_eq!(dropped, 2);
        assert_eq!(map.get(&SeatKey::new(3, 5)).map(String::as_str), Some("a"));
    }
}
