//! # Run configuration
//!
//! A single TOML file drives the three runs of the command line tool. Every key has a
//! default, an empty file is a valid configuration (the catalog endpoint and the metakernel
//! excepted, they are only required by the runs that use them).
//!
//! ```toml
//! [catalog]
//! url = "https://ops.example.org/api/{mission}/{event_type}"
//! mission = "tgo"
//!
//! [coverage]
//! margin_min = 10
//! excluded_stations = ["KLZ", "BLK"]
//!
//! [scan]
//! metakernel = "kernels/mk/em16_ops.tm"
//! step_s = 1.0
//! parallelism = 8
//!
//! [alignment]
//! tolerance_s = 60
//! scope_start = "2023-01-01T00:00:00Z"
//!
//! [output]
//! dir = "out"
//! ```
use std::fs;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::alignment::AlignmentScope;
use crate::catalog::CatalogClient;
use crate::constants::{
    Kilometer, Seconds, ALIGNMENT_TOLERANCE_S, COVERAGE_MARGIN_MIN, DEFAULT_PARALLELISM,
    DEFAULT_STEP, EARTH_ID, EXCLUDED_STATIONS, MARS_FRAME, MARS_ID, MARS_RADIUS, TGO_HGA_ID,
};
use crate::coverage::CoverageParams;
use crate::crossing::{OccultationGeometry, ScanParams};
use crate::ephemeris::KernelSet;
use crate::radiocc_errors::RadioccError;
use crate::time::{parse_utc, utc_to_et};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioccConfig {
    pub catalog: CatalogConfig,
    pub coverage: CoverageConfig,
    pub scan: ScanConfig,
    pub alignment: AlignmentConfig,
    pub output: OutputConfig,
}

impl RadioccConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Utf8Path) -> Result<Self, RadioccError> {
        let content = fs::read_to_string(path).map_err(|e| {
            RadioccError::ConfigError(format!("failed to read config file '{path}': {e}"))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, RadioccError> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Endpoint template with `{mission}` and `{event_type}` placeholders
    pub url: Option<String>,
    pub mission: String,
    pub timeout_s: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            url: None,
            mission: "tgo".to_string(),
            timeout_s: 30,
        }
    }
}

impl CatalogConfig {
    pub fn client(&self) -> Result<CatalogClient, RadioccError> {
        let url = self
            .url
            .as_deref()
            .ok_or_else(|| RadioccError::InvalidUrl("[catalog] url is not set".into()))?;
        CatalogClient::new(url, &self.mission, Duration::from_secs(self.timeout_s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    pub margin_min: i64,
    pub excluded_stations: Vec<String>,
    pub exclude_mspa: bool,
    pub start: String,
    pub end: String,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        CoverageConfig {
            margin_min: COVERAGE_MARGIN_MIN,
            excluded_stations: EXCLUDED_STATIONS.iter().map(|s| s.to_string()).collect(),
            exclude_mspa: true,
            start: "2020-01-01T00:00:00Z".to_string(),
            end: "2025-01-01T23:59:59Z".to_string(),
        }
    }
}

impl CoverageConfig {
    pub fn params(&self) -> Result<CoverageParams, RadioccError> {
        let margin = TimeDelta::try_minutes(self.margin_min).ok_or_else(|| {
            RadioccError::ConfigError(format!(
                "[coverage] margin_min = {} is out of range",
                self.margin_min
            ))
        })?;
        CoverageParams::builder()
            .margin(margin)
            .excluded_stations(self.excluded_stations.iter().cloned())
            .exclude_mspa(self.exclude_mspa)
            .build()
    }

    /// Catalog query range.
    pub fn range(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), RadioccError> {
        let (start, end) = (parse_utc(&self.start)?, parse_utc(&self.end)?);
        if start >= end {
            return Err(RadioccError::ConfigError(format!(
                "[coverage] start {start} is not before end {end}"
            )));
        }
        Ok((start, end))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub metakernel: Option<Utf8PathBuf>,
    pub observer: String,
    pub antenna: String,
    pub body: String,
    pub body_frame: String,
    pub radius_km: Kilometer,
    pub abcorr: String,
    pub step_s: Seconds,
    pub parallelism: usize,
    pub chunk_len: Option<usize>,
    /// UTC calendar string
    pub start: String,
    /// UTC calendar string
    pub end: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            metakernel: None,
            observer: EARTH_ID.to_string(),
            antenna: TGO_HGA_ID.to_string(),
            body: MARS_ID.to_string(),
            body_frame: MARS_FRAME.to_string(),
            radius_km: MARS_RADIUS,
            abcorr: "CN+S".to_string(),
            step_s: DEFAULT_STEP,
            parallelism: DEFAULT_PARALLELISM,
            chunk_len: None,
            start: "2020-01-01T00:00:00.000".to_string(),
            end: "2024-12-31T23:59:59.000".to_string(),
        }
    }
}

impl ScanConfig {
    pub fn kernels(&self) -> Result<KernelSet, RadioccError> {
        self.metakernel
            .as_ref()
            .map(|mk| KernelSet::new(mk.clone()))
            .ok_or_else(|| RadioccError::ConfigError("[scan] metakernel is not set".into()))
    }

    pub fn geometry(&self) -> OccultationGeometry {
        OccultationGeometry {
            body: self.body.clone(),
            body_frame: self.body_frame.clone(),
            antenna: self.antenna.clone(),
            abcorr: self.abcorr.clone(),
            radius: self.radius_km,
            ..OccultationGeometry::default()
        }
    }

    /// Scan parameters, the UTC bounds converted to ephemeris time.
    pub fn params(&self) -> Result<ScanParams, RadioccError> {
        let mut builder = ScanParams::builder()
            .start(utc_to_et(&parse_utc(&self.start)?))
            .end(utc_to_et(&parse_utc(&self.end)?))
            .step(self.step_s)
            .parallelism(self.parallelism);
        if let Some(n) = self.chunk_len {
            builder = builder.chunk_len(n);
        }
        builder.build()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    pub tolerance_s: i64,
    pub scope_start: Option<String>,
    pub scope_end: Option<String>,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        AlignmentConfig {
            tolerance_s: ALIGNMENT_TOLERANCE_S,
            scope_start: Some("2023-01-01T00:00:00Z".to_string()),
            scope_end: Some("2025-01-01T00:00:00Z".to_string()),
        }
    }
}

impl AlignmentConfig {
    pub fn tolerance(&self) -> Result<TimeDelta, RadioccError> {
        if self.tolerance_s < 0 {
            return Err(RadioccError::ConfigError(
                "[alignment] tolerance_s must be non-negative".into(),
            ));
        }
        TimeDelta::try_seconds(self.tolerance_s).ok_or_else(|| {
            RadioccError::ConfigError(format!(
                "[alignment] tolerance_s = {} is out of range",
                self.tolerance_s
            ))
        })
    }

    pub fn scope(&self) -> Result<AlignmentScope, RadioccError> {
        Ok(AlignmentScope {
            start: self.scope_start.as_deref().map(parse_utc).transpose()?,
            end: self.scope_end.as_deref().map(parse_utc).transpose()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: Utf8PathBuf,
    pub log_level: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            dir: Utf8PathBuf::from("."),
            log_level: "info".to_string(),
        }
    }
}
