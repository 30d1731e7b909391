use std::collections::HashSet;

use super::{CoverageParams, Pass};
use crate::constants::StationId;

/// Candidate pass predicate: rejects denylisted ground stations and, optionally, MSPA passes.
#[derive(Debug, Clone, Default)]
pub struct PassFilter {
    excluded_stations: HashSet<StationId>,
    exclude_mspa: bool,
}

impl PassFilter {
    pub fn new<I, S>(excluded_stations: I, exclude_mspa: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StationId>,
    {
        PassFilter {
            excluded_stations: excluded_stations.into_iter().map(Into::into).collect(),
            exclude_mspa,
        }
    }

    pub fn accepts(&self, pass: &Pass) -> bool {
        !(self.excluded_stations.contains(&pass.groundstation) || (self.exclude_mspa && pass.mspa))
    }
}

impl From<&CoverageParams> for PassFilter {
    fn from(params: &CoverageParams) -> Self {
        PassFilter::new(params.excluded_stations.iter().cloned(), params.exclude_mspa)
    }
}
