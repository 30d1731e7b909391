//! # Event catalog client
//!
//! Passes and occultations are published by a mission operations web service as JSON arrays of
//! flat records. A query names the mission and the event type in the URL path and bounds the
//! time range with two parameters:
//!
//! ```text
//! GET <url>?time_start=ge:2020-01-01T00:00:00Z&time_end=le:2025-01-01T23:59:59Z
//! ```
//!
//! The endpoint is configured as a template with `{mission}` and `{event_type}` placeholders,
//! e.g. `https://ops.example.org/api/{mission}/{event_type}`.
//!
//! ## Failures
//!
//! A request that cannot be sent or that answers with a non-2xx status is logged and treated
//! as "no events": callers receive an empty list. Records that fail validation are skipped
//! with a warning. Only a missing or malformed endpoint and an undecodable body are errors.
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::coverage::{OccultationWindow, Pass};
use crate::radiocc_errors::RadioccError;

pub mod records;

pub use records::{RawOccultation, RawPass};

/// Kind of record served by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Passes,
    Occultations,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Passes => "passes",
            EventType::Occultations => "occultations",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time range query parameters, `ge:` on the start and `le:` on the end.
pub fn query_params(start: &DateTime<Utc>, end: &DateTime<Utc>) -> [(&'static str, String); 2] {
    [
        ("time_start", start.format("ge:%Y-%m-%dT%H:%M:%SZ").to_string()),
        ("time_end", end.format("le:%Y-%m-%dT%H:%M:%SZ").to_string()),
    ]
}

/// HTTP client bound to one catalog endpoint template.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    url_template: String,
    mission: String,
}

impl CatalogClient {
    /// Build a client.
    ///
    /// Arguments
    /// -----------------
    /// * `url_template`: Endpoint with optional `{mission}` and `{event_type}` placeholders.
    /// * `mission`: Mission name used by [`Self::fetch_passes`] and
    ///   [`Self::fetch_occultations`].
    /// * `timeout`: Whole-request timeout.
    ///
    /// Return
    /// ----------
    /// * The client, or [`RadioccError::InvalidUrl`] if the template is empty.
    pub fn new(
        url_template: impl Into<String>,
        mission: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RadioccError> {
        let url_template = url_template.into();
        if url_template.trim().is_empty() {
            return Err(RadioccError::InvalidUrl(
                "no catalog endpoint configured".into(),
            ));
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(CatalogClient {
            http,
            url_template,
            mission: mission.into(),
        })
    }

    pub fn mission(&self) -> &str {
        &self.mission
    }

    /// Resolve the endpoint of `event_type` for `mission`.
    pub fn endpoint(&self, event_type: EventType, mission: &str) -> Result<Url, RadioccError> {
        let url = self
            .url_template
            .replace("{mission}", mission)
            .replace("{event_type}", event_type.as_str());
        Url::parse(&url).map_err(|e| RadioccError::InvalidUrl(format!("{url}: {e}")))
    }

    /// Fetch raw records of `event_type` between `start` and `end`.
    ///
    /// Return
    /// ----------
    /// * The decoded records. Transport failures and non-2xx answers give an empty list.
    /// * [`RadioccError::InvalidUrl`] for an unusable endpoint, [`RadioccError::JsonError`]
    ///   if a successful answer is not a JSON array of the expected records.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        event_type: EventType,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
        mission: &str,
    ) -> Result<Vec<T>, RadioccError> {
        let url = self.endpoint(event_type, mission)?;

        let response = match self
            .http
            .get(url.clone())
            .query(&query_params(start, end))
            .send()
            .await
        {
            Ok(r) => r,
            Err(err) => {
                warn!(%url, "catalog request failed: {err}");
                return Ok(Vec::new());
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "catalog request failed");
            return Ok(Vec::new());
        }

        let body = match response.text().await {
            Ok(b) => b,
            Err(err) => {
                warn!(%url, "catalog response unreadable: {err}");
                return Ok(Vec::new());
            }
        };

        let records: Vec<T> = if body.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str::<Option<Vec<T>>>(&body)?.unwrap_or_default()
        };

        if records.is_empty() {
            info!(%event_type, "no events found in catalog");
        } else {
            info!(%event_type, n = records.len(), "catalog request successful");
        }
        Ok(records)
    }

    /// Passes of the configured mission, invalid records skipped.
    pub async fn fetch_passes(
        &self,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Result<Vec<Pass>, RadioccError> {
        let raw: Vec<RawPass> = self
            .fetch(EventType::Passes, start, end, &self.mission)
            .await?;
        Ok(validate(raw, EventType::Passes))
    }

    /// Occultations of the configured mission lying entirely inside `[start, end]`.
    pub async fn fetch_occultations(
        &self,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Result<Vec<OccultationWindow>, RadioccError> {
        let raw: Vec<RawOccultation> = self
            .fetch(EventType::Occultations, start, end, &self.mission)
            .await?;
        Ok(validate::<_, OccultationWindow>(raw, EventType::Occultations)
            .into_iter()
            .filter(|w| w.ingress >= *start && w.egress <= *end)
            .collect())
    }
}

fn validate<R, T>(raw: Vec<R>, event_type: EventType) -> Vec<T>
where
    T: TryFrom<R, Error = RadioccError>,
{
    raw.into_iter()
        .enumerate()
        .filter_map(|(i, r)| {
            T::try_from(r)
                .map_err(|err| warn!(%event_type, record = i, "record skipped: {err}"))
                .ok()
        })
        .collect()
}
