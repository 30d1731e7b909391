//! # Ground station coverage of occultations
//!
//! An occultation is **fully covered** when telemetry can be expected on both sides of it: one
//! tracking pass must span the `margin` before ingress and one (possibly different) pass must
//! span the `margin` after egress.
//!
//! ## Time tags
//!
//! Occultation windows are spacecraft-time events while passes are tagged in ground station
//! time. Every comparison uses the **light-time corrected** pass interval
//! `[start - owlt, end - owlt]` ([`Pass::corrected`]).
//!
//! ## Exclusions
//!
//! Before any matching, passes of denylisted ground stations and MSPA (multiple spacecraft per
//! aperture) passes are removed, see [`PassFilter`]. They never cover anything.
//!
//! ## Example
//!
//! ```rust,ignore
//! use radiocc::coverage::{CoverageMatcher, CoverageParams};
//!
//! let matcher = CoverageMatcher::new(passes, &CoverageParams::default());
//! let report = matcher.evaluate(windows);
//! println!("{} / {} occultations covered", report.covered.len(), report.windows.len());
//! ```
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::StationId;
use crate::radiocc_errors::RadioccError;

pub mod filter;
pub mod params;

pub use filter::PassFilter;
pub use params::{CoverageParams, CoverageParamsBuilder};

/// Closed time interval `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub lo: DateTime<Utc>,
    pub hi: DateTime<Utc>,
}

impl TimeInterval {
    pub fn new(lo: DateTime<Utc>, hi: DateTime<Utc>) -> Self {
        TimeInterval { lo, hi }
    }

    /// `true` if `other` lies entirely inside `self` (bounds included).
    pub fn contains(&self, other: &TimeInterval) -> bool {
        self.lo <= other.lo && self.hi >= other.hi
    }
}

/// A tracking pass, tagged in ground station time.
#[derive(Debug, Clone, PartialEq)]
pub struct Pass {
    pub groundstation: StationId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// One-way light time between spacecraft and ground station
    pub owlt: TimeDelta,
    /// Multiple spacecraft per aperture
    pub mspa: bool,
}

impl Pass {
    pub fn new(
        groundstation: impl Into<StationId>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        owlt: TimeDelta,
        mspa: bool,
    ) -> Result<Self, RadioccError> {
        let groundstation = groundstation.into();
        if end < start {
            return Err(RadioccError::InvalidPassRecord(format!(
                "{groundstation}: end {end} before start {start}"
            )));
        }
        Ok(Pass {
            groundstation,
            start,
            end,
            owlt,
            mspa,
        })
    }

    /// Light-time corrected pass, comparable with spacecraft-time events.
    pub fn corrected(&self) -> CorrectedPass {
        CorrectedPass {
            interval: TimeInterval::new(self.start - self.owlt, self.end - self.owlt),
            pass: self.clone(),
        }
    }
}

/// A pass with its interval shifted to spacecraft time.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectedPass {
    pub pass: Pass,
    pub interval: TimeInterval,
}

impl CorrectedPass {
    pub fn start_corr(&self) -> DateTime<Utc> {
        self.interval.lo
    }

    pub fn end_corr(&self) -> DateTime<Utc> {
        self.interval.hi
    }
}

/// An occultation as reported by the event catalog, in spacecraft time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccultationWindow {
    pub ingress: DateTime<Utc>,
    pub egress: DateTime<Utc>,
}

impl OccultationWindow {
    pub fn new(ingress: DateTime<Utc>, egress: DateTime<Utc>) -> Result<Self, RadioccError> {
        if ingress >= egress {
            return Err(RadioccError::InvalidOccultationWindow(format!(
                "ingress {ingress} is not before egress {egress}"
            )));
        }
        Ok(OccultationWindow { ingress, egress })
    }

    pub fn duration(&self) -> TimeDelta {
        self.egress - self.ingress
    }

    /// `[ingress - margin, ingress]`
    pub fn ingress_margin(&self, margin: TimeDelta) -> TimeInterval {
        TimeInterval::new(self.ingress - margin, self.ingress)
    }

    /// `[egress, egress + margin]`
    pub fn egress_margin(&self, margin: TimeDelta) -> TimeInterval {
        TimeInterval::new(self.egress, self.egress + margin)
    }
}

/// `true` if some pass contains `interval`.
fn any_contains(passes: &[CorrectedPass], interval: &TimeInterval) -> bool {
    passes.iter().any(|p| p.interval.contains(interval))
}

/// Decide full coverage of `window` by an already filtered set of corrected passes.
///
/// Arguments
/// -----------------
/// * `window`: The occultation to test.
/// * `passes`: Candidate passes, exclusions already applied. Order does not matter.
/// * `margin`: Time required before ingress and after egress.
///
/// Return
/// ----------
/// * `true` iff a pass contains `[ingress - margin, ingress]` **and** a pass contains
///   `[egress, egress + margin]`. An empty pass set gives `false`.
pub fn is_covered(
    window: &OccultationWindow,
    passes: &[CorrectedPass],
    margin: TimeDelta,
) -> bool {
    any_contains(passes, &window.ingress_margin(margin))
        && any_contains(passes, &window.egress_margin(margin))
}

/// Outcome of a coverage run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageReport {
    /// Passes kept after exclusions, sorted by (end, start)
    pub accepted_passes: Vec<CorrectedPass>,
    /// Every occultation window, sorted by (egress, ingress)
    pub windows: Vec<OccultationWindow>,
    /// Covered windows, in the order of `windows`
    pub covered: Vec<OccultationWindow>,
}

/// Coverage evaluator over a fixed pass set.
#[derive(Debug, Clone)]
pub struct CoverageMatcher {
    passes: Vec<CorrectedPass>,
    margin: TimeDelta,
}

impl CoverageMatcher {
    /// Sort `passes` by (end, start), drop excluded ones and apply the light-time correction.
    pub fn new(mut passes: Vec<Pass>, params: &CoverageParams) -> Self {
        passes.sort_by(|a, b| a.end.cmp(&b.end).then(a.start.cmp(&b.start)));
        let filter = PassFilter::from(params);
        let passes = passes
            .iter()
            .filter(|p| filter.accepts(p))
            .map(Pass::corrected)
            .collect();

        CoverageMatcher {
            passes,
            margin: params.margin,
        }
    }

    pub fn passes(&self) -> &[CorrectedPass] {
        &self.passes
    }

    pub fn margin(&self) -> TimeDelta {
        self.margin
    }

    pub fn is_covered(&self, window: &OccultationWindow) -> bool {
        is_covered(window, &self.passes, self.margin)
    }

    /// Evaluate every window and collect the covered ones.
    pub fn evaluate(&self, mut windows: Vec<OccultationWindow>) -> CoverageReport {
        windows.sort_by(|a, b| a.egress.cmp(&b.egress).then(a.ingress.cmp(&b.ingress)));
        let covered = windows
            .iter()
            .filter(|w| self.is_covered(w))
            .copied()
            .collect();

        CoverageReport {
            accepted_passes: self.passes.clone(),
            windows,
            covered,
        }
    }
}
