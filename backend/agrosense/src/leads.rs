//! Contact-form lead intake and administration.
//!
//! A submission is validated in full before anything is sent to the store:
//! every failing field is reported at once, and an invalid submission never
//! reaches the network.

use std::sync::Arc;

use chrono::Utc;
use farm_metrics::Region;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use tracing::{info, warn};

use crate::accessor::CollectionAccessor;
use crate::errors::{AppError, FieldError, Result};
use crate::records::{Lead, LeadDraft, LeadPatch, LeadStatus};
use crate::store::RecordStore;

/// The contact form as submitted.
///
/// Every field decodes leniently so that malformed input is reported by
/// [`validate`] rather than rejected as a whole body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadSubmission {
    #[serde(deserialize_with = "form_text")]
    pub name: String,
    #[serde(deserialize_with = "form_text")]
    pub email: String,
    #[serde(deserialize_with = "form_text")]
    pub phone: String,
    #[serde(deserialize_with = "form_text")]
    pub farm_size: String,
    #[serde(deserialize_with = "form_text")]
    pub region: String,
    #[serde(deserialize_with = "form_text")]
    pub message: String,
}

/// Text as typed, a number as its decimal text, anything else (`null`
/// included) as an empty field.
fn form_text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FormValue {
        Text(String),
        Number(serde_json::Number),
        Other(IgnoredAny),
    }

    Ok(match FormValue::deserialize(deserializer)? {
        FormValue::Text(text) => text,
        FormValue::Number(n) => n.to_string(),
        FormValue::Other(_) => String::new(),
    })
}

/// Check every field, in form order, collecting all failures.
pub fn validate(submission: &LeadSubmission) -> std::result::Result<Region, Vec<FieldError>> {
    let mut errors = Vec::new();

    if submission.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    if submission.email.trim().is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !looks_like_email(submission.email.trim()) {
        errors.push(FieldError::new("email", "Email is invalid"));
    }
    if submission.phone.trim().is_empty() {
        errors.push(FieldError::new("phone", "Phone number is required"));
    }
    if submission.farm_size.trim().is_empty() {
        errors.push(FieldError::new("farmSize", "Farm size is required"));
    }
    let region = Region::parse(&submission.region);
    if submission.region.trim().is_empty() {
        errors.push(FieldError::new("region", "Region is required"));
    } else if region.is_none() {
        errors.push(FieldError::new("region", "Region is invalid"));
    }
    if submission.message.trim().is_empty() {
        errors.push(FieldError::new("message", "Message is required"));
    }

    match region {
        Some(region) if errors.is_empty() => Ok(region),
        _ => Err(errors),
    }
}

/// `local@domain.tld` with no whitespace anywhere.
fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain
            .rsplit_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

/// Leading whole number of a free-text farm size (`"1,200 acres"` → 1).
fn parse_farm_size(text: &str) -> i64 {
    let digits: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

pub struct LeadIntake {
    leads: CollectionAccessor<Lead>,
}

impl LeadIntake {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            leads: CollectionAccessor::new(store),
        }
    }

    /// Validate and persist a submission as a `new` lead.
    pub async fn submit_lead(&self, submission: &LeadSubmission) -> Result<Lead> {
        let region = validate(submission).map_err(|fields| {
            warn!(
                "Rejected lead submission: {} invalid field(s)",
                fields.len()
            );
            AppError::Validation(fields)
        })?;

        let draft = LeadDraft {
            name: submission.name.trim().to_string(),
            email_c: submission.email.trim().to_string(),
            phone_c: submission.phone.trim().to_string(),
            farm_size_c: parse_farm_size(&submission.farm_size),
            region_c: region.as_str().to_string(),
            message_c: submission.message.trim().to_string(),
            submitted_at_c: Utc::now(),
            status_c: LeadStatus::New,
        };
        let lead = self.leads.create(&draft).await?;
        info!("Recorded lead {} from {} region", lead.id, lead.region_c);
        Ok(lead)
    }

    /// Newest first.
    pub async fn list(&self) -> Vec<Lead> {
        self.leads.list().await
    }

    pub async fn get(&self, id: i64) -> Result<Lead> {
        self.leads.get_by_id(id).await
    }

    pub async fn update_status(&self, id: i64, status: &str) -> Result<Lead> {
        let status = LeadStatus::parse(status).ok_or_else(|| {
            AppError::invalid_field("status", "Status must be one of new, contacted, closed")
        })?;
        let lead = self
            .leads
            .update(
                id,
                &LeadPatch {
                    status_c: Some(status),
                },
            )
            .await?;
        info!("Lead {id} marked {}", status.as_str());
        Ok(lead)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        self.leads.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::memory::MemoryStore;
    use crate::records::{Collection, Fields};
    use crate::store::Query;

    fn complete() -> LeadSubmission {
        LeadSubmission {
            name: "Jordan Reyes".into(),
            email: "jordan@reyesfarms.com".into(),
            phone: "(555) 010-2233".into(),
            farm_size: "640 acres".into(),
            region: "southwest".into(),
            message: "Interested in soil moisture monitoring.".into(),
        }
    }

    /// Counts calls so tests can prove nothing reached the store.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RecordStore for CountingStore {
        fn backend(&self) -> &'static str {
            "counting"
        }
        async fn query(&self, c: Collection, q: &Query) -> Result<Vec<Fields>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.query(c, q).await
        }
        async fn get(&self, c: Collection, id: i64) -> Result<Option<Fields>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.get(c, id).await
        }
        async fn create(&self, c: Collection, f: Fields) -> Result<Fields> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.create(c, f).await
        }
        async fn update(&self, c: Collection, id: i64, f: Fields) -> Result<Fields> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.update(c, id, f).await
        }
        async fn delete(&self, c: Collection, id: i64) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.delete(c, id).await
        }
    }

    fn failing_fields(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation(fields) => fields.into_iter().map(|f| f.field).collect(),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn email_shape() {
        assert!(looks_like_email("a@b.co"));
        assert!(looks_like_email("first.last+tag@sub.farm.org"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("@b.co"));
        assert!(!looks_like_email("a@.co"));
        assert!(!looks_like_email("a@b."));
        assert!(!looks_like_email("a b@c.d"));
        assert!(!looks_like_email("plainaddress"));
    }

    #[test]
    fn farm_size_reads_leading_digits() {
        assert_eq!(parse_farm_size("640 acres"), 640);
        assert_eq!(parse_farm_size(" 12"), 12);
        assert_eq!(parse_farm_size("about 300"), 0);
    }

    #[test]
    fn all_failing_fields_are_reported_in_form_order() {
        let err = validate(&LeadSubmission::default()).unwrap_err();
        let fields: Vec<_> = err.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["name", "email", "phone", "farmSize", "region", "message"]
        );
    }

    #[test]
    fn malformed_email_is_invalid_not_missing() {
        let err = validate(&LeadSubmission {
            email: "jordan-at-farm".into(),
            ..complete()
        })
        .unwrap_err();
        assert_eq!(err, vec![FieldError::new("email", "Email is invalid")]);
    }

    #[test]
    fn unknown_region_is_rejected() {
        let err = validate(&LeadSubmission {
            region: "pacific".into(),
            ..complete()
        })
        .unwrap_err();
        assert_eq!(err, vec![FieldError::new("region", "Region is invalid")]);

        let err = validate(&LeadSubmission {
            region: "  ".into(),
            ..complete()
        })
        .unwrap_err();
        assert_eq!(err, vec![FieldError::new("region", "Region is required")]);
    }

    #[test]
    fn form_decodes_numbers_and_nulls_as_text() {
        let submission: LeadSubmission = serde_json::from_value(serde_json::json!({
            "name": "Jordan Reyes",
            "email": null,
            "phone": 5550102,
            "farmSize": 640,
            "region": "midwest",
            "message": null
        }))
        .unwrap();
        assert_eq!(submission.phone, "5550102");
        assert_eq!(submission.farm_size, "640");
        assert_eq!(submission.email, "");

        let err = validate(&submission).unwrap_err();
        let fields: Vec<_> = err.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "message"]);
    }

    #[tokio::test]
    async fn invalid_submission_never_reaches_the_store() {
        let store = Arc::new(CountingStore::default());
        let intake = LeadIntake::new(store.clone());

        let err = intake
            .submit_lead(&LeadSubmission {
                email: String::new(),
                message: "   ".into(),
                ..complete()
            })
            .await
            .unwrap_err();

        assert_eq!(failing_fields(err), vec!["email", "message"]);
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_submission_is_stored_as_new() {
        let store = Arc::new(CountingStore::default());
        let intake = LeadIntake::new(store.clone());

        let before = Utc::now();
        let lead = intake.submit_lead(&complete()).await.unwrap();

        assert_eq!(lead.id, 1);
        assert_eq!(lead.name, "Jordan Reyes");
        assert_eq!(lead.farm_size_c, 640);
        assert_eq!(lead.region_c, "southwest");
        assert_eq!(lead.status_c, LeadStatus::New);
        assert!(lead.submitted_at_c >= before);
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn status_updates_and_deletes() {
        let intake = LeadIntake::new(Arc::new(MemoryStore::new()));
        let lead = intake.submit_lead(&complete()).await.unwrap();

        let updated = intake.update_status(lead.id, "Contacted").await.unwrap();
        assert_eq!(updated.status_c, LeadStatus::Contacted);
        assert_eq!(updated.email_c, lead.email_c);

        let err = intake.update_status(lead.id, "archived").await.unwrap_err();
        assert_eq!(failing_fields(err), vec!["status"]);

        assert!(intake.delete(lead.id).await.unwrap());
        assert!(intake.list().await.is_empty());
        assert!(matches!(
            intake.get(lead.id).await.unwrap_err(),
            AppError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn leads_list_newest_first() {
        let intake = LeadIntake::new(Arc::new(MemoryStore::new()));
        intake.submit_lead(&complete()).await.unwrap();
        intake
            .submit_lead(&LeadSubmission {
                name: "Casey Lin".into(),
                ..complete()
            })
            .await
            .unwrap();

        let names: Vec<_> = intake.list().await.into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["Casey Lin", "Jordan Reyes"]);
    }
}
