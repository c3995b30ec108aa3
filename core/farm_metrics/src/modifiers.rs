//! Static crop and region modifiers applied by the projection engine.

use crate::types::{CropType, Region};

/// Read-only lookup tables for crop multipliers and region factors.
pub struct ProjectionModifiers;

impl ProjectionModifiers {
    /// Multiplier applied to the yield uplift. Unknown crops are neutral.
    pub fn crop_multiplier(crop: Option<CropType>) -> f64 {
        match crop {
            Some(CropType::Corn) => 1.0,
            Some(CropType::Soybeans) => 0.8,
            Some(CropType::Wheat) => 0.9,
            Some(CropType::Cotton) => 1.2,
            Some(CropType::Vegetables) => 1.5,
            None => 1.0,
        }
    }

    /// Factor applied to yield uplift and water savings. Unknown regions are neutral.
    pub fn region_factor(region: Option<Region>) -> f64 {
        match region {
            Some(Region::Midwest) => 1.0,
            Some(Region::Southwest) => 1.2,
            Some(Region::Southeast) => 0.9,
            Some(Region::Northwest) => 0.8,
            Some(Region::Northeast) => 0.85,
            None => 1.0,
        }
    }
}
