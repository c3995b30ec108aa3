//! # Farm Metrics
//!
//! Pure projection engine behind the AgroSense ROI calculator.  It turns the
//! parameters a grower types into the calculator into yearly savings and a
//! return on the monitoring system's fixed investment.
//!
//! | Step      | Item                                   |
//! |-----------|----------------------------------------|
//! | Intake    | [`RawFarmInputs`] → [`FarmInputs`]     |
//! | Modifiers | [`ProjectionModifiers`]                |
//! | Compute   | [`compute_projection`]                 |
//! | Output    | [`ProjectionResult`]                   |
//!
//! The crate does no I/O and holds no state: the same inputs always give the
//! same result, so callers may recompute on every keystroke.

mod modifiers;
mod projection;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_projection;

pub use modifiers::ProjectionModifiers;
pub use projection::{
    compute_projection, payback_months, roi_percentage, INITIAL_INVESTMENT,
    LABOR_SAVINGS_RATE, WATER_SAVINGS_RATE, YIELD_UPLIFT_RATE,
};
pub use types::{CropType, FarmInputs, ProjectionResult, RawFarmInputs, RawNumber, Region};
