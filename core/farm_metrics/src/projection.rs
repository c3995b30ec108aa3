//! The savings / ROI projection.
//!
//! ```text
//! yield_increase = round(yield/acre × acres × 0.25 × crop × region)
//! water_savings  = round(water cost × 0.30 × region)
//! labor_savings  = round(labor cost × 0.15)
//! total_savings  = yield_increase + water_savings + labor_savings
//! roi_percentage = round(total / 15 000 × 100)
//! payback_months = round(15 000 / total × 12)   (None when total ≤ 0)
//! ```

use crate::modifiers::ProjectionModifiers;
use crate::types::{FarmInputs, ProjectionResult};

/// Up-front cost of the monitoring system the ROI is measured against.
pub const INITIAL_INVESTMENT: f64 = 15_000.0;

/// Share of current yield value gained through monitoring.
pub const YIELD_UPLIFT_RATE: f64 = 0.25;
/// Share of the annual water bill saved by smart irrigation.
pub const WATER_SAVINGS_RATE: f64 = 0.30;
/// Share of the annual labor bill saved by automation.
pub const LABOR_SAVINGS_RATE: f64 = 0.15;

/// Compute the projection for one set of inputs.
///
/// Pure and deterministic; never panics on any [`FarmInputs`] value.
pub fn compute_projection(inputs: &FarmInputs) -> ProjectionResult {
    let crop_multiplier = ProjectionModifiers::crop_multiplier(inputs.crop_type);
    let region_factor = ProjectionModifiers::region_factor(inputs.region);

    let yield_increase = round(
        inputs.current_yield_per_acre
            * inputs.farm_size_acres
            * YIELD_UPLIFT_RATE
            * crop_multiplier
            * region_factor,
    );
    let water_savings = round(inputs.annual_water_cost * WATER_SAVINGS_RATE * region_factor);
    let labor_savings = round(inputs.annual_labor_cost * LABOR_SAVINGS_RATE);
    let total_savings = yield_increase
        .saturating_add(water_savings)
        .saturating_add(labor_savings);

    ProjectionResult {
        yield_increase,
        water_savings,
        labor_savings,
        total_savings,
        roi_percentage: roi_percentage(total_savings),
        payback_months: payback_months(total_savings),
    }
}

pub fn roi_percentage(total_savings: i64) -> i64 {
    round(total_savings as f64 / INITIAL_INVESTMENT * 100.0)
}

/// Months until `total_savings` per year recovers the investment.
pub fn payback_months(total_savings: i64) -> Option<i64> {
    if total_savings <= 0 {
        return None;
    }
    Some(round(INITIAL_INVESTMENT / total_savings as f64 * 12.0))
}

// Inputs are sanitised to be finite and non-negative, so plain f64::round
// agrees with half-up rounding here; `as` saturates on overflow.
fn round(value: f64) -> i64 {
    value.round() as i64
}
