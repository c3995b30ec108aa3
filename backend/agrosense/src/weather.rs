//! Current conditions, forecast and history for the weather widget.
//!
//! The provider never fails.  Stored station readings are used when the
//! store has them; otherwise values are synthesised from fixed baselines and
//! tagged `simulated`.  Forecasts are always synthesised since no upstream
//! forecast source is integrated.
//!
//! Randomness comes from a [`SyntheticSource`] so tests can pin it.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::accessor::CollectionAccessor;
use crate::errors::Result;
use crate::records::{WeatherRecord, WeatherRecordDraft};
use crate::store::{FilterOp, Query, RecordStore};

const TIMESTAMP_FIELD: &str = "timestamp_c";

/// Supplies uniformly distributed samples in `[0, 1)`.
pub trait SyntheticSource: Send + Sync {
    fn sample(&self) -> f64;
}

/// Thread-local RNG backed source used in production.
pub struct RandomSource;

impl SyntheticSource for RandomSource {
    fn sample(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    /// °F
    pub temperature: f64,
    /// Relative humidity, percent
    pub humidity: f64,
    /// Inches
    pub rainfall: f64,
    /// mph
    pub wind_speed: f64,
    pub timestamp: DateTime<Utc>,
    pub simulated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    Sunny,
    Cloudy,
    Rainy,
    PartlyCloudy,
}

impl Condition {
    const ALL: [Condition; 4] = [Self::Sunny, Self::Cloudy, Self::Rainy, Self::PartlyCloudy];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub high: i64,
    pub low: i64,
    pub humidity: i64,
    pub precip_chance: i64,
    pub condition: Condition,
    pub simulated: bool,
}

/// One day of history: temperature, humidity and wind are daily means,
/// rainfall is the daily total.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalDay {
    pub date: NaiveDate,
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
    pub wind_speed: f64,
    pub simulated: bool,
}

/// A reading submitted for storage.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeatherReading {
    pub name: Option<String>,
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
    pub wind_speed: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

// ─────────────────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────────────────

pub struct WeatherProvider {
    records: CollectionAccessor<WeatherRecord>,
    source: Arc<dyn SyntheticSource>,
}

impl WeatherProvider {
    pub fn new(store: Arc<dyn RecordStore>, source: Arc<dyn SyntheticSource>) -> Self {
        Self {
            records: CollectionAccessor::new(store),
            source,
        }
    }

    /// The most recent stored reading, or a simulated one.
    pub async fn get_current_snapshot(&self) -> WeatherSnapshot {
        let query = Query::new().order_by(TIMESTAMP_FIELD, true).limit(1);
        match self.records.list_where(query).await.into_iter().next() {
            Some(record) => WeatherSnapshot {
                temperature: record.temperature_c,
                humidity: record.humidity_c,
                rainfall: record.rainfall_c,
                wind_speed: record.wind_speed_c,
                timestamp: record.timestamp_c,
                simulated: false,
            },
            None => {
                debug!("No stored weather reading; simulating current conditions");
                synthesize_snapshot(self.source.as_ref(), Utc::now())
            }
        }
    }

    /// One entry per day for the `days` days after today.
    pub fn get_forecast(&self, days: u32) -> Vec<ForecastDay> {
        synthesize_forecast(self.source.as_ref(), Utc::now().date_naive(), days)
    }

    /// Daily aggregates covering `[today - days, today]`, oldest first.
    pub async fn get_historical_data(&self, days: u32) -> Vec<HistoricalDay> {
        let now = Utc::now();
        let start = now - Duration::days(i64::from(days));
        let query = Query::new()
            .filter(
                TIMESTAMP_FIELD,
                FilterOp::GreaterThanOrEqualTo,
                start.to_rfc3339_opts(SecondsFormat::Millis, true),
            )
            .filter(
                TIMESTAMP_FIELD,
                FilterOp::LessThanOrEqualTo,
                now.to_rfc3339_opts(SecondsFormat::Millis, true),
            )
            .order_by(TIMESTAMP_FIELD, false);

        let records = self.records.list_where(query).await;
        if records.is_empty() {
            debug!("No stored weather history; simulating {days} days");
            return synthesize_history(self.source.as_ref(), now.date_naive(), days);
        }
        aggregate_daily(&records)
    }

    /// Persist a station reading.
    pub async fn record_snapshot(&self, reading: WeatherReading) -> Result<WeatherRecord> {
        let timestamp = reading.timestamp.unwrap_or_else(Utc::now);
        let draft = WeatherRecordDraft {
            name: reading
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| format!("Weather {}", timestamp.format("%Y-%m-%d"))),
            temperature_c: reading.temperature,
            humidity_c: reading.humidity,
            rainfall_c: reading.rainfall,
            wind_speed_c: reading.wind_speed,
            timestamp_c: timestamp,
        };
        let record = self.records.create(&draft).await?;
        info!("Stored weather reading {} ({})", record.id, record.name);
        Ok(record)
    }
}

// ─────────────────────────────────────────────────────────
// Synthesis
// ─────────────────────────────────────────────────────────

/// `round((sample - 0.5) * spread)`: an integer offset within ±spread/2.
fn jitter(source: &dyn SyntheticSource, spread: f64) -> f64 {
    ((source.sample() - 0.5) * spread).round()
}

/// `base + round(sample * span)`.
fn bounded(source: &dyn SyntheticSource, base: i64, span: f64) -> i64 {
    base + (source.sample() * span).round() as i64
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn synthesize_snapshot(source: &dyn SyntheticSource, now: DateTime<Utc>) -> WeatherSnapshot {
    WeatherSnapshot {
        temperature: 72.0 + jitter(source, 10.0),
        humidity: (65.0 + jitter(source, 20.0)).clamp(30.0, 95.0),
        rainfall: round_hundredths(0.2 + jitter(source, 50.0) / 100.0).max(0.0),
        wind_speed: (8.0 + jitter(source, 8.0)).max(0.0),
        timestamp: now,
        simulated: true,
    }
}

pub fn synthesize_forecast(
    source: &dyn SyntheticSource,
    today: NaiveDate,
    days: u32,
) -> Vec<ForecastDay> {
    (1..=days)
        .map(|offset| {
            let index = ((source.sample() * 4.0).floor() as usize).min(Condition::ALL.len() - 1);
            ForecastDay {
                date: today + Duration::days(i64::from(offset)),
                high: bounded(source, 70, 15.0),
                low: bounded(source, 50, 15.0),
                humidity: bounded(source, 45, 30.0),
                precip_chance: bounded(source, 0, 100.0),
                condition: Condition::ALL[index],
                simulated: true,
            }
        })
        .collect()
}

pub fn synthesize_history(
    source: &dyn SyntheticSource,
    today: NaiveDate,
    days: u32,
) -> Vec<HistoricalDay> {
    (0..=days)
        .rev()
        .map(|back| HistoricalDay {
            date: today - Duration::days(i64::from(back)),
            temperature: bounded(source, 65, 20.0) as f64,
            humidity: bounded(source, 40, 40.0) as f64,
            rainfall: round_hundredths(source.sample()),
            wind_speed: bounded(source, 0, 15.0) as f64,
            simulated: true,
        })
        .collect()
}

fn aggregate_daily(records: &[WeatherRecord]) -> Vec<HistoricalDay> {
    let mut days: BTreeMap<NaiveDate, Vec<&WeatherRecord>> = BTreeMap::new();
    for record in records {
        days.entry(record.timestamp_c.date_naive())
            .or_default()
            .push(record);
    }

    days.into_iter()
        .map(|(date, readings)| {
            let n = readings.len() as f64;
            let mean = |f: fn(&WeatherRecord) -> f64| {
                round_hundredths(readings.iter().map(|r| f(r)).sum::<f64>() / n)
            };
            HistoricalDay {
                date,
                temperature: mean(|r| r.temperature_c),
                humidity: mean(|r| r.humidity_c),
                rainfall: round_hundredths(readings.iter().map(|r| r.rainfall_c).sum()),
                wind_speed: mean(|r| r.wind_speed_c),
                simulated: false,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::memory::MemoryStore;
    use crate::records::Collection;

    struct FixedSource(f64);

    impl SyntheticSource for FixedSource {
        fn sample(&self) -> f64 {
            self.0
        }
    }

    /// Cycles through the given samples.
    struct SequenceSource {
        values: Vec<f64>,
        next: AtomicUsize,
    }

    impl SyntheticSource for SequenceSource {
        fn sample(&self) -> f64 {
            let i = self.next.fetch_add(1, Ordering::Relaxed);
            self.values[i % self.values.len()]
        }
    }

    fn provider(store: MemoryStore, sample: f64) -> WeatherProvider {
        WeatherProvider::new(Arc::new(store), Arc::new(FixedSource(sample)))
    }

    #[test]
    fn midpoint_sample_yields_baselines() {
        let snap = synthesize_snapshot(&FixedSource(0.5), Utc::now());
        assert_eq!(snap.temperature, 72.0);
        assert_eq!(snap.humidity, 65.0);
        assert_eq!(snap.rainfall, 0.2);
        assert_eq!(snap.wind_speed, 8.0);
        assert!(snap.simulated);
    }

    #[test]
    fn extreme_samples_stay_within_bounds() {
        let low = synthesize_snapshot(&FixedSource(0.0), Utc::now());
        assert_eq!(low.temperature, 67.0);
        assert_eq!(low.humidity, 55.0);
        assert_eq!(low.rainfall, 0.0);
        assert_eq!(low.wind_speed, 4.0);

        let high = synthesize_snapshot(&FixedSource(0.999), Utc::now());
        assert_eq!(high.temperature, 77.0);
        assert_eq!(high.humidity, 75.0);
        assert_eq!(high.rainfall, 0.45);
        assert_eq!(high.wind_speed, 12.0);
    }

    #[test]
    fn forecast_covers_days_after_today() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let source = SequenceSource {
            values: vec![0.0, 0.3, 0.6, 0.9],
            next: AtomicUsize::new(0),
        };
        let forecast = synthesize_forecast(&source, today, 7);

        assert_eq!(forecast.len(), 7);
        assert_eq!(forecast[0].date, NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        assert_eq!(forecast[6].date, NaiveDate::from_ymd_opt(2026, 10, 24).unwrap());
        for day in &forecast {
            assert!((70..=85).contains(&day.high));
            assert!((50..=65).contains(&day.low));
            assert!((45..=75).contains(&day.humidity));
            assert!((0..=100).contains(&day.precip_chance));
            assert!(day.simulated);
        }
        assert!(synthesize_forecast(&source, today, 0).is_empty());
    }

    #[test]
    fn forecast_condition_never_overflows() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let forecast = synthesize_forecast(&FixedSource(0.9999), today, 1);
        assert_eq!(forecast[0].condition, Condition::PartlyCloudy);
        assert_eq!(
            serde_json::to_value(forecast[0].condition).unwrap(),
            json!("partly-cloudy")
        );
    }

    #[test]
    fn history_spans_today_back_to_start() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let history = synthesize_history(&FixedSource(1.0), today, 7);

        assert_eq!(history.len(), 8);
        assert_eq!(history[0].date, NaiveDate::from_ymd_opt(2026, 10, 10).unwrap());
        assert_eq!(history[7].date, today);
        assert_eq!(history[0].temperature, 85.0);
        assert_eq!(history[0].humidity, 80.0);
        assert_eq!(history[0].rainfall, 1.0);
        assert_eq!(history[0].wind_speed, 15.0);
    }

    #[tokio::test]
    async fn current_snapshot_prefers_latest_stored_reading() {
        let store = MemoryStore::new();
        store
            .seed(
                Collection::WeatherData,
                [
                    json!({"Id": 1, "temperature_c": 61, "humidity_c": 80, "rainfall_c": 0.4,
                           "wind_speed_c": 3, "timestamp_c": "2026-10-16T06:00:00Z"}),
                    json!({"Id": 2, "temperature_c": 68, "humidity_c": 70, "rainfall_c": 0.0,
                           "wind_speed_c": 5, "timestamp_c": "2026-10-17T06:00:00Z"}),
                ]
                .into_iter()
                .filter_map(|v| v.as_object().cloned()),
            )
            .await;

        let snap = provider(store, 0.5).get_current_snapshot().await;
        assert!(!snap.simulated);
        assert_eq!(snap.temperature, 68.0);
        assert_eq!(snap.wind_speed, 5.0);
    }

    #[tokio::test]
    async fn current_snapshot_is_simulated_when_store_is_empty() {
        let snap = provider(MemoryStore::new(), 0.5).get_current_snapshot().await;
        assert!(snap.simulated);
        assert_eq!(snap.temperature, 72.0);
    }

    #[tokio::test]
    async fn history_aggregates_stored_readings_per_day() {
        let now = Utc::now();
        let yesterday = now - Duration::days(1);
        let store = MemoryStore::new();
        store
            .seed(
                Collection::WeatherData,
                [
                    (yesterday - Duration::minutes(30), 60.0, 0.25),
                    (yesterday, 70.0, 0.5),
                    (now - Duration::days(30), 10.0, 9.0),
                ]
                .into_iter()
                .filter_map(|(ts, temp, rain)| {
                    json!({"temperature_c": temp, "humidity_c": 50, "rainfall_c": rain,
                           "wind_speed_c": 4, "timestamp_c": ts})
                    .as_object()
                    .cloned()
                }),
            )
            .await;

        let history = provider(store, 0.5).get_historical_data(7).await;
        assert!(history.iter().all(|d| !d.simulated));
        let total_rain: f64 = history.iter().map(|d| d.rainfall).sum();
        assert_eq!(total_rain, 0.75);
        assert!(history
            .iter()
            .all(|d| d.temperature >= 60.0 && d.temperature <= 70.0));
    }

    #[tokio::test]
    async fn recording_a_snapshot_names_it_by_date() {
        let store = Arc::new(MemoryStore::new());
        let weather = WeatherProvider::new(store.clone(), Arc::new(FixedSource(0.5)));
        let ts = DateTime::parse_from_rfc3339("2026-10-17T07:15:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let record = weather
            .record_snapshot(WeatherReading {
                temperature: 66.0,
                humidity: 72.0,
                rainfall: 0.1,
                wind_speed: 6.0,
                timestamp: Some(ts),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(record.id, 1);
        assert_eq!(record.name, "Weather 2026-10-17");

        let snap = weather.get_current_snapshot().await;
        assert!(!snap.simulated);
        assert_eq!(snap.timestamp, ts);
    }
}
