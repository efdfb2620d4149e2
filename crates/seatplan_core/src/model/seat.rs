//! Seat coordinates, grid configuration and adjacency geometry.
//!
//! # Responsibility
//! - Define the `row-col` seat key and its canonical string form.
//! - Bound the coordinate space through `GridConfig`.
//! - Compute 8-connected neighborhoods used by the constraint gate.
//!
//! # Invariants
//! - Rows and columns are 1-based.
//! - `GridConfig` values produced by `GridConfig::new` are always in range.
//! - `neighbors` never returns the seat itself or an out-of-grid seat.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const DEFAULT_ROWS: u32 = 4;
pub const DEFAULT_COLS: u32 = 6;
pub const MAX_ROWS: u32 = 10;
pub const MAX_COLS: u32 = 8;

/// One grid cell, rendered as `"row-col"`.
///
/// Ordering is row-major; callers must not rely on it for semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeatKey {
    pub row: u32,
    pub col: u32,
}

impl SeatKey {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl Display for SeatKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

/// Seat key text that is not `row-col` with positive integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatKeyParseError(pub String);

impl Display for SeatKeyParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid seat key `{}`; expected `row-col`", self.0)
    }
}

impl Error for SeatKeyParseError {}

impl FromStr for SeatKey {
    type Err = SeatKeyParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || SeatKeyParseError(value.to_string());
        let (row, col) = value.trim().split_once('-').ok_or_else(invalid)?;
        let row = row.parse::<u32>().map_err(|_| invalid())?;
        let col = col.parse::<u32>().map_err(|_| invalid())?;
        if row == 0 || col == 0 {
            return Err(invalid());
        }
        Ok(Self { row, col })
    }
}

impl Serialize for SeatKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SeatKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

/// Grid bounds failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridConfigError {
    RowsOutOfRange(u32),
    ColsOutOfRange(u32),
}

impl Display for GridConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RowsOutOfRange(rows) => {
                write!(f, "rows must be within 1..={MAX_ROWS}, got {rows}")
            }
            Self::ColsOutOfRange(cols) => {
                write!(f, "cols must be within 1..={MAX_COLS}, got {cols}")
            }
        }
    }
}

impl Error for GridConfigError {}

/// Classroom grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    pub rows: u32,
    pub cols: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
        }
    }
}

impl GridConfig {
    /// Builds a validated configuration.
    pub fn new(rows: u32, cols: u32) -> Result<Self, GridConfigError> {
        let config = Self { rows, cols };
        config.validate()?;
        Ok(config)
    }

    /// Checks bounds; needed for configurations that arrive via deserialization.
    pub fn validate(&self) -> Result<(), GridConfigError> {
        if !(1..=MAX_ROWS).contains(&self.rows) {
            return Err(GridConfigError::RowsOutOfRange(self.rows));
        }
        if !(1..=MAX_COLS).contains(&self.cols) {
            return Err(GridConfigError::ColsOutOfRange(self.cols));
        }
        Ok(())
    }

    pub fn contains(&self, seat: SeatKey) -> bool {
        (1..=self.rows).contains(&seat.row) && (1..=self.cols).contains(&seat.col)
    }

    pub fn seat_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Every seat in row-major order.
    pub fn all_seat_keys(&self) -> Vec<SeatKey> {
        let mut seats = Vec::with_capacity(self.seat_count());
        for row in 1..=self.rows {
            for col in 1..=self.cols {
                seats.push(SeatKey::new(row, col));
            }
        }
        seats
    }

    /// True when either dimension is smaller than in `previous`.
    pub fn shrinks(&self, previous: &GridConfig) -> bool {
        self.rows < previous.rows || self.cols < previous.cols
    }
}

/// Returns the in-grid Moore neighborhood of `seat` (up to 8 seats).
pub fn neighbors(seat: SeatKey, config: GridConfig) -> Vec<SeatKey> {
    let mut keys = Vec::with_capacity(8);
    for dr in -1i32..=1 {
        for dc in -1i32..=1 {
            if dr == 0 && dc == 0 {
                continue;
            }
            let (Some(row), Some(col)) = (
                seat.row.checked_add_signed(dr),
                seat.col.checked_add_signed(dc),
            ) else {
                continue;
            };
            let candidate = SeatKey::new(row, col);
            if config.contains(candidate) {
                keys.push(candidate);
            }
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::{neighbors, GridConfig, GridConfigError, SeatKey};

    #[test]
    fn seat_key_text_roundtrip() {
        let key: SeatKey = "3-5".parse().unwrap();
        assert_eq!(key, SeatKey::new(3, 5));
        assert_eq!(key.to_string(), "3-5");
    }

    #[test]
    fn seat_key_rejects_zero_and_garbage() {
        assert!("0-1".parse::<SeatKey>().is_err());
        assert!("1".parse::<SeatKey>().is_err());
        assert!("a-b".parse::<SeatKey>().is_err());
        assert!("1--2".parse::<SeatKey>().is_err());
    }

    #[test]
    fn grid_bounds_are_enforced() {
        assert_eq!(
            GridConfig::new(0, 3).unwrap_err(),
            GridConfigError::RowsOutOfRange(0)
        );
        assert_eq!(
            GridConfig::new(10, 9).unwrap_err(),
            GridConfigError::ColsOutOfRange(9)
        );
        assert!(GridConfig::new(10, 8).is_ok());
    }

    #[test]
    fn corner_has_three_neighbors() {
        let config = GridConfig::new(4, 6).unwrap();
        assert_eq!(neighbors(SeatKey::new(1, 1), config).len(), 3);
        assert_eq!(neighbors(SeatKey::new(4, 6), config).len(), 3);
    }

    #[test]
    fn single_seat_grid_has_no_neighbors() {
        let config = GridConfig::new(1, 1).unwrap();
        assert!(neighbors(SeatKey::new(1, 1), config).is_empty());
    }
}
