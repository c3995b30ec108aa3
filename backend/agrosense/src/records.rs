//! Typed records for every collection in the hosted store.
//!
//! Field names follow the store's schema (`Name`, `email_c`, ...), so the
//! same structs decode store responses and encode API responses.  Each
//! record has a `Draft` used for creation and a `Patch` whose `None` fields
//! are never sent on update.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Raw record fields as exchanged with a [`crate::store::RecordStore`].
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Name of the record identifier field in every collection.
pub const ID_FIELD: &str = "Id";

/// The named collections of the hosted store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Product,
    Testimonial,
    Resource,
    ContactLead,
    WeatherData,
}

impl Collection {
    /// Short identifier used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Testimonial => "testimonial",
            Self::Resource => "resource",
            Self::ContactLead => "contact_lead",
            Self::WeatherData => "weather_data",
        }
    }

    /// Table name on the hosted store.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Product => "product_c",
            Self::Testimonial => "testimonial_c",
            Self::Resource => "resource_c",
            Self::ContactLead => "contact_lead_c",
            Self::WeatherData => "weather_data_c",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A record type bound to one collection.
pub trait CollectionRecord: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: Collection;

    type Draft: Serialize + DeserializeOwned + Send + Sync + 'static;
    type Patch: Serialize + DeserializeOwned + Send + Sync + 'static;
}

// ─────────────────────────────────────────────────────────
// Field helpers
// ─────────────────────────────────────────────────────────

/// Stores send `null` for unset fields; read those as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Product feature bullets; a comma-joined string on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureList(pub Vec<String>);

impl Serialize for FeatureList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.join(","))
    }
}

impl<'de> Deserialize<'de> for FeatureList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Joined(String),
            List(Vec<String>),
        }

        let items = match Option::<Wire>::deserialize(deserializer)? {
            None => Vec::new(),
            Some(Wire::Joined(s)) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            Some(Wire::List(items)) => items,
        };
        Ok(FeatureList(items))
    }
}

// ─────────────────────────────────────────────────────────
// Product
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name", default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub description_c: Option<String>,
    #[serde(default)]
    pub features_c: FeatureList,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price_c: f64,
    #[serde(default)]
    pub image_c: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(rename = "Name")]
    pub name: String,
    pub description_c: Option<String>,
    #[serde(default)]
    pub features_c: FeatureList,
    #[serde(default)]
    pub price_c: f64,
    pub image_c: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features_c: Option<FeatureList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_c: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_c: Option<String>,
}

impl CollectionRecord for Product {
    const COLLECTION: Collection = Collection::Product;
    type Draft = ProductDraft;
    type Patch = ProductPatch;
}

// ─────────────────────────────────────────────────────────
// Testimonial
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name", default, deserialize_with = "null_as_default")]
    pub name: String,
    pub farmer_name_c: String,
    #[serde(default)]
    pub farm_location_c: Option<String>,
    #[serde(default)]
    pub crop_type_c: Option<String>,
    #[serde(default)]
    pub results_c: Option<String>,
    #[serde(default)]
    pub image_c: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestimonialDraft {
    #[serde(rename = "Name", default)]
    pub name: String,
    pub farmer_name_c: String,
    pub farm_location_c: Option<String>,
    pub crop_type_c: Option<String>,
    pub results_c: Option<String>,
    pub image_c: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestimonialPatch {
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farmer_name_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farm_location_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_type_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_c: Option<String>,
}

impl CollectionRecord for Testimonial {
    const COLLECTION: Collection = Collection::Testimonial;
    type Draft = TestimonialDraft;
    type Patch = TestimonialPatch;
}

// ─────────────────────────────────────────────────────────
// Resource
// ─────────────────────────────────────────────────────────

/// An article, guide or case study listed on the resources page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name", default, deserialize_with = "null_as_default")]
    pub name: String,
    pub title_c: String,
    #[serde(default)]
    pub description_c: Option<String>,
    #[serde(default)]
    pub category_c: Option<String>,
    #[serde(default)]
    pub type_c: Option<String>,
    #[serde(default)]
    pub read_time_c: Option<String>,
    #[serde(default)]
    pub date_c: Option<String>,
    #[serde(default)]
    pub author_c: Option<String>,
    #[serde(default)]
    pub author_image_c: Option<String>,
    #[serde(default)]
    pub image_c: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceDraft {
    #[serde(rename = "Name", default)]
    pub name: String,
    pub title_c: String,
    pub description_c: Option<String>,
    pub category_c: Option<String>,
    pub type_c: Option<String>,
    pub read_time_c: Option<String>,
    pub date_c: Option<String>,
    pub author_c: Option<String>,
    pub author_image_c: Option<String>,
    pub image_c: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourcePatch {
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_time_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_image_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_c: Option<String>,
}

impl CollectionRecord for Resource {
    const COLLECTION: Collection = Collection::Resource;
    type Draft = ResourceDraft;
    type Patch = ResourcePatch;
}

// ─────────────────────────────────────────────────────────
// Contact lead
// ─────────────────────────────────────────────────────────

/// Follow-up state of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Contacted,
    Closed,
}

impl LeadStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "new" => Some(Self::New),
            "contacted" => Some(Self::Contacted),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Closed => "closed",
        }
    }
}

/// A prospective customer's contact submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    pub email_c: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone_c: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub farm_size_c: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub region_c: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message_c: String,
    pub submitted_at_c: DateTime<Utc>,
    pub status_c: LeadStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadDraft {
    #[serde(rename = "Name")]
    pub name: String,
    pub email_c: String,
    pub phone_c: String,
    pub farm_size_c: i64,
    pub region_c: String,
    pub message_c: String,
    pub submitted_at_c: DateTime<Utc>,
    pub status_c: LeadStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_c: Option<LeadStatus>,
}

impl CollectionRecord for Lead {
    const COLLECTION: Collection = Collection::ContactLead;
    type Draft = LeadDraft;
    type Patch = LeadPatch;
}

// ─────────────────────────────────────────────────────────
// Weather reading
// ─────────────────────────────────────────────────────────

/// A stored on-farm weather station reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name", default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub temperature_c: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub humidity_c: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rainfall_c: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub wind_speed_c: f64,
    pub timestamp_c: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecordDraft {
    #[serde(rename = "Name")]
    pub name: String,
    pub temperature_c: f64,
    pub humidity_c: f64,
    pub rainfall_c: f64,
    pub wind_speed_c: f64,
    pub timestamp_c: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecordPatch {
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity_c: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rainfall_c: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_speed_c: Option<f64>,
}

impl CollectionRecord for WeatherRecord {
    const COLLECTION: Collection = Collection::WeatherData;
    type Draft = WeatherRecordDraft;
    type Patch = WeatherRecordPatch;
}
