use crate::invariants::assert_all_projection_invariants;
use crate::{
    compute_projection, CropType, FarmInputs, ProjectionResult, RawFarmInputs, RawNumber, Region,
};

fn midwest_corn_farm() -> FarmInputs {
    FarmInputs::new(
        500.0,
        800.0,
        10_000.0,
        25_000.0,
        Some(CropType::Corn),
        Some(Region::Midwest),
    )
}

fn text(value: &str) -> Option<RawNumber> {
    Some(RawNumber::Text(value.to_string()))
}

#[test]
fn test_reference_midwest_corn_farm() {
    let result = compute_projection(&midwest_corn_farm());

    assert_eq!(
        result,
        ProjectionResult {
            yield_increase: 100_000,
            water_savings: 3_000,
            labor_savings: 3_750,
            total_savings: 106_750,
            roi_percentage: 712,
            payback_months: Some(2),
        }
    );
    assert_all_projection_invariants(&result);
}

#[test]
fn test_crop_and_region_modifiers_apply() {
    let inputs = FarmInputs::new(
        100.0,
        400.0,
        2_000.0,
        10_000.0,
        Some(CropType::Vegetables),
        Some(Region::Southwest),
    );
    let result = compute_projection(&inputs);

    // 400 * 100 * 0.25 * 1.5 * 1.2
    assert_eq!(result.yield_increase, 18_000);
    // 2000 * 0.30 * 1.2
    assert_eq!(result.water_savings, 720);
    // labor is not region-adjusted
    assert_eq!(result.labor_savings, 1_500);
    assert_eq!(result.total_savings, 20_220);
    assert_eq!(result.roi_percentage, 135);
    assert_eq!(result.payback_months, Some(9));
    assert_all_projection_invariants(&result);
}

#[test]
fn test_unknown_crop_and_region_default_to_neutral() {
    let raw = RawFarmInputs {
        farm_size: text("500"),
        current_yield: text("800"),
        water_cost: text("10000"),
        labor_cost: text("25000"),
        crop_type: Some("rice".to_string()),
        region: Some("pacific".to_string()),
    };
    let result = compute_projection(&FarmInputs::from_raw(&raw));

    assert_eq!(result, compute_projection(&midwest_corn_farm()));
}

#[test]
fn test_zero_savings_has_no_payback() {
    let result = compute_projection(&FarmInputs::new(0.0, 0.0, 0.0, 0.0, None, None));

    assert_eq!(result.total_savings, 0);
    assert_eq!(result.roi_percentage, 0);
    assert_eq!(result.payback_months, None);
    assert_all_projection_invariants(&result);

    let json = serde_json::to_value(result).unwrap();
    assert!(json["paybackMonths"].is_null());
}

#[test]
fn test_malformed_and_negative_inputs_become_zero() {
    let raw = RawFarmInputs {
        farm_size: text("lots"),
        current_yield: Some(RawNumber::Number(-800.0)),
        water_cost: text(""),
        labor_cost: text("-25000"),
        crop_type: None,
        region: None,
    };
    let inputs = FarmInputs::from_raw(&raw);

    assert_eq!(inputs, FarmInputs::new(0.0, 0.0, 0.0, 0.0, None, None));
    assert_eq!(compute_projection(&inputs).payback_months, None);
}

#[test]
fn test_empty_submission_never_panics() {
    let result = compute_projection(&FarmInputs::from_raw(&RawFarmInputs::default()));
    assert_eq!(result, ProjectionResult::default());
}

#[test]
fn test_projection_is_deterministic() {
    let inputs = midwest_corn_farm();
    let first = compute_projection(&inputs);
    for _ in 0..10 {
        assert_eq!(compute_projection(&inputs), first);
    }
}

#[test]
fn test_invariants_hold_across_crops_and_regions() {
    for crop in CropType::ALL {
        for region in Region::ALL {
            for acres in [0.0, 1.0, 37.5, 640.0, 12_000.0] {
                let inputs = FarmInputs::new(
                    acres,
                    612.0,
                    8_250.0,
                    19_999.0,
                    Some(crop),
                    Some(region),
                );
                assert_all_projection_invariants(&compute_projection(&inputs));
            }
        }
    }
}

#[test]
fn test_small_savings_round_payback_up() {
    // Only labor: 1000 * 0.15 = 150 per year -> 15000 / 150 * 12 = 1200 months.
    let inputs = FarmInputs::new(0.0, 0.0, 0.0, 1_000.0, None, None);
    let result = compute_projection(&inputs);

    assert_eq!(result.total_savings, 150);
    assert_eq!(result.roi_percentage, 1);
    assert_eq!(result.payback_months, Some(1_200));
}

#[test]
fn test_result_serializes_in_camel_case() {
    let json = serde_json::to_value(compute_projection(&midwest_corn_farm())).unwrap();
    assert_eq!(json["yieldIncrease"], 100_000);
    assert_eq!(json["totalSavings"], 106_750);
    assert_eq!(json["roiPercentage"], 712);
    assert_eq!(json["paybackMonths"], 2);
}
