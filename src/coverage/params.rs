use chrono::TimeDelta;

use crate::constants::{StationId, COVERAGE_MARGIN_MIN, EXCLUDED_STATIONS};
use crate::radiocc_errors::RadioccError;

/// Settings of a coverage run.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageParams {
    /// Time required before ingress and after egress
    pub margin: TimeDelta,
    /// Ground stations whose passes are never used
    pub excluded_stations: Vec<StationId>,
    /// Drop passes flagged as multiple spacecraft per aperture
    pub exclude_mspa: bool,
}

impl Default for CoverageParams {
    fn default() -> Self {
        CoverageParams {
            margin: TimeDelta::minutes(COVERAGE_MARGIN_MIN),
            excluded_stations: EXCLUDED_STATIONS.iter().map(|s| s.to_string()).collect(),
            exclude_mspa: true,
        }
    }
}

impl CoverageParams {
    pub fn builder() -> CoverageParamsBuilder {
        CoverageParamsBuilder::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CoverageParamsBuilder {
    params: CoverageParams,
}

impl CoverageParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: CoverageParams::default(),
        }
    }

    pub fn margin(mut self, v: TimeDelta) -> Self {
        self.params.margin = v;
        self
    }
    pub fn excluded_stations<I, S>(mut self, v: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StationId>,
    {
        self.params.excluded_stations = v.into_iter().map(Into::into).collect();
        self
    }
    pub fn exclude_mspa(mut self, v: bool) -> Self {
        self.params.exclude_mspa = v;
        self
    }

    /// Validate and return the parameters. The margin must be non-negative.
    pub fn build(self) -> Result<CoverageParams, RadioccError> {
        if self.params.margin < TimeDelta::zero() {
            return Err(RadioccError::InvalidCoverageParameter(
                "margin must be non-negative".into(),
            ));
        }
        Ok(self.params)
    }
}

#[cfg(test)]
mod coverage_params_test {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = CoverageParams::default();
        assert_eq!(p.margin, TimeDelta::minutes(10));
        assert_eq!(p.excluded_stations, vec!["KLZ".to_string(), "BLK".to_string()]);
        assert!(p.exclude_mspa);
    }

    #[test]
    fn test_negative_margin_rejected() {
        let err = CoverageParams::builder()
            .margin(TimeDelta::minutes(-1))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RadioccError::InvalidCoverageParameter("margin must be non-negative".into())
        );
    }

    #[test]
    fn test_builder_overrides() {
        let p = CoverageParams::builder()
            .margin(TimeDelta::minutes(5))
            .excluded_stations(["CEB"])
            .exclude_mspa(false)
            .build()
            .unwrap();
        assert_eq!(p.margin, TimeDelta::minutes(5));
        assert_eq!(p.excluded_stations, vec!["CEB".to_string()]);
        assert!(!p.exclude_mspa);
    }
}
