#![allow(dead_code)]

use crate::projection::INITIAL_INVESTMENT;
use crate::types::ProjectionResult;

/// Total savings are exactly the sum of the three components.
pub fn assert_total_is_sum(result: &ProjectionResult) {
    assert_eq!(
        result.total_savings,
        result.yield_increase + result.water_savings + result.labor_savings,
        "total savings {} is not the sum of its parts ({} + {} + {})",
        result.total_savings,
        result.yield_increase,
        result.water_savings,
        result.labor_savings
    );
}

/// ROI is the total savings as a rounded percentage of the investment.
pub fn assert_roi_consistent(result: &ProjectionResult) {
    let expected = (result.total_savings as f64 / INITIAL_INVESTMENT * 100.0).round() as i64;
    assert_eq!(
        result.roi_percentage, expected,
        "roi {}% does not match total savings {}",
        result.roi_percentage, result.total_savings
    );
}

/// Payback is defined exactly when there are positive savings.
pub fn assert_payback_consistent(result: &ProjectionResult) {
    match result.payback_months {
        None => assert!(
            result.total_savings <= 0,
            "payback missing although savings are {}",
            result.total_savings
        ),
        Some(months) => {
            assert!(result.total_savings > 0, "payback defined for zero savings");
            let expected = (INITIAL_INVESTMENT / result.total_savings as f64 * 12.0).round() as i64;
            assert_eq!(months, expected);
        }
    }
}

/// All components are non-negative for sanitised inputs.
pub fn assert_components_non_negative(result: &ProjectionResult) {
    assert!(result.yield_increase >= 0, "negative yield increase");
    assert!(result.water_savings >= 0, "negative water savings");
    assert!(result.labor_savings >= 0, "negative labor savings");
}

/// Run every stateless projection invariant.
pub fn assert_all_projection_invariants(result: &ProjectionResult) {
    assert_total_is_sum(result);
    assert_roi_consistent(result);
    assert_payback_consistent(result);
    assert_components_non_negative(result);
}
