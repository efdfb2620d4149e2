//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `seatplan_core` linkage without the Flutter/FFI runtime.
//! - Print a reproducible auto-arrangement of the default roster.

use rand::rngs::StdRng;
use rand::SeedableRng;
use seatplan_core::{AppState, DisplayPrefs, SeatKey, SeatingService};

const SMOKE_SEED: u64 = 20_240_901;

fn main() {
    println!("seatplan_core version={}", seatplan_core::core_version());

    let mut service = SeatingService::new(AppState::seeded(), DisplayPrefs::default());
    let mut rng = StdRng::seed_from_u64(SMOKE_SEED);
    let report = match service.auto_arrange(&mut rng) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("auto_arrange failed: {err}");
            std::process::exit(1);
        }
    };
    println!(
        "auto_arrange placed={} unplaced={}",
        report.placed,
        report.unplaced_count()
    );

    let state = service.state();
    for row in 1..=state.grid.rows {
        let cells = (1..=state.grid.cols)
            .map(|col| {
                state
                    .occupant(SeatKey::new(row, col))
                    .and_then(|id| state.student(id))
                    .map(|student| student.name.as_str())
                    .unwrap_or("--")
            })
            .collect::<Vec<_>>();
        println!("{}", cells.join("\t"));
    }
}
