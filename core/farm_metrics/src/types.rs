//! # Types
//!
//! Inputs and outputs of the projection engine.
//!
//! ## Raw vs. sanitised inputs
//!
//! Form submissions arrive as [`RawFarmInputs`]: every numeric field may be
//! missing, a JSON number, or free text typed by a visitor.  They are turned
//! into [`FarmInputs`] exactly once, and that conversion never fails:
//!
//! * text is read the way a lenient number parser would (leading numeric
//!   prefix, surrounding whitespace ignored),
//! * anything missing, unparseable, non-finite or negative becomes `0`,
//! * an unknown crop or region becomes `None`, which the modifiers treat as a
//!   neutral `1.0`.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Crop grown on the farm.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropType {
    Corn,
    Soybeans,
    Wheat,
    Cotton,
    Vegetables,
}

impl CropType {
    pub const ALL: [CropType; 5] = [
        Self::Corn,
        Self::Soybeans,
        Self::Wheat,
        Self::Cotton,
        Self::Vegetables,
    ];

    /// Case-insensitive lookup by the form value (`"corn"`, `"soybeans"`, ...).
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(value))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Corn => "corn",
            Self::Soybeans => "soybeans",
            Self::Wheat => "wheat",
            Self::Cotton => "cotton",
            Self::Vegetables => "vegetables",
        }
    }
}

/// US growing region of the farm.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Midwest,
    Southwest,
    Southeast,
    Northwest,
    Northeast,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Self::Midwest,
        Self::Southwest,
        Self::Southeast,
        Self::Northwest,
        Self::Northeast,
    ];

    /// Case-insensitive lookup by the form value (`"midwest"`, ...).
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(value))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Midwest => "midwest",
            Self::Southwest => "southwest",
            Self::Southeast => "southeast",
            Self::Northwest => "northwest",
            Self::Northeast => "northeast",
        }
    }
}

/// A numeric form field as submitted: a JSON number, text, or anything else.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
    /// Booleans, arrays, objects: read as `0`.
    Unreadable(IgnoredAny),
}

impl RawNumber {
    /// Coerce to a non-negative finite number, `0.0` when that is impossible.
    pub fn coerce(&self) -> f64 {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => parse_leading_number(s).unwrap_or(0.0),
            Self::Unreadable(_) => 0.0,
        };
        sanitize(value)
    }
}

/// Farm parameters exactly as the ROI form submitted them.
///
/// Accepts both the short form field names (`farmSize`, `currentYield`, ...)
/// and the long ones (`farmSizeAcres`, `currentYieldPerAcre`, ...).
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawFarmInputs {
    #[serde(alias = "farmSizeAcres")]
    pub farm_size: Option<RawNumber>,
    #[serde(alias = "currentYieldPerAcre")]
    pub current_yield: Option<RawNumber>,
    #[serde(alias = "annualWaterCost")]
    pub water_cost: Option<RawNumber>,
    #[serde(alias = "annualLaborCost")]
    pub labor_cost: Option<RawNumber>,
    #[serde(deserialize_with = "text_or_none")]
    pub crop_type: Option<String>,
    #[serde(deserialize_with = "text_or_none")]
    pub region: Option<String>,
}

/// A choice field: its text, or `None` for anything that is not a string.
fn text_or_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawChoice {
        Text(String),
        Unreadable(IgnoredAny),
    }

    Ok(match RawChoice::deserialize(deserializer)? {
        RawChoice::Text(text) => Some(text),
        RawChoice::Unreadable(_) => None,
    })
}

/// Sanitised farm parameters for one calculation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmInputs {
    pub farm_size_acres: f64,
    /// Currency per acre.
    pub current_yield_per_acre: f64,
    pub annual_water_cost: f64,
    pub annual_labor_cost: f64,
    pub crop_type: Option<CropType>,
    pub region: Option<Region>,
}

impl FarmInputs {
    pub fn new(
        farm_size_acres: f64,
        current_yield_per_acre: f64,
        annual_water_cost: f64,
        annual_labor_cost: f64,
        crop_type: Option<CropType>,
        region: Option<Region>,
    ) -> Self {
        Self {
            farm_size_acres: sanitize(farm_size_acres),
            current_yield_per_acre: sanitize(current_yield_per_acre),
            annual_water_cost: sanitize(annual_water_cost),
            annual_labor_cost: sanitize(annual_labor_cost),
            crop_type,
            region,
        }
    }

    pub fn from_raw(raw: &RawFarmInputs) -> Self {
        let number = |field: &Option<RawNumber>| field.as_ref().map_or(0.0, RawNumber::coerce);
        Self::new(
            number(&raw.farm_size),
            number(&raw.current_yield),
            number(&raw.water_cost),
            number(&raw.labor_cost),
            raw.crop_type.as_deref().and_then(CropType::parse),
            raw.region.as_deref().and_then(Region::parse),
        )
    }
}

impl From<&RawFarmInputs> for FarmInputs {
    fn from(raw: &RawFarmInputs) -> Self {
        Self::from_raw(raw)
    }
}

/// Savings and ROI estimate derived from [`FarmInputs`].
///
/// All amounts are whole currency units per year.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub yield_increase: i64,
    pub water_savings: i64,
    pub labor_savings: i64,
    pub total_savings: i64,
    pub roi_percentage: i64,
    /// `None` when the savings never recover the investment (serialised as `null`).
    pub payback_months: Option<i64>,
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Read the longest numeric prefix of `text`, e.g. `"1200 acres"` → `1200`.
fn parse_leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut seen_exp = false;
    let mut best = None;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => {
                seen_digit = true;
                end += 1;
                best = Some(end);
            }
            b'.' if !seen_dot && !seen_exp => {
                seen_dot = true;
                end += 1;
            }
            b'e' | b'E' if seen_digit && !seen_exp => {
                seen_exp = true;
                end += 1;
                if matches!(bytes.get(end), Some(b'+') | Some(b'-')) {
                    end += 1;
                }
            }
            _ => break,
        }
    }
    best.and_then(|end| text[..end].parse().ok())
}
