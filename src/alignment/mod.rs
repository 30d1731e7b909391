//! # Alignment of derived and reported occultations
//!
//! Geometry-derived occultations (from a scan) and catalog-reported ones are produced
//! independently and never agree to the second. [`align`] pairs every derived occultation
//! with the reported window whose **ingress** is nearest in absolute time, and keeps the pair
//! only when that distance is within a tolerance.
//!
//! ## Rules
//!
//! - Only derived occultations whose ingress lies in the [`AlignmentScope`] take part, the
//!   restriction is applied before matching and counting.
//! - The tolerance bound is inclusive: `|Δt| == tolerance` matches.
//! - On equal distance the earlier reported window wins (lowest index once the reported list
//!   is stably sorted by ingress).
//! - Unmatched derived occultations are dropped from the output. Several derived
//!   occultations may match the same reported window.
//!
//! The ratio `matched / in_scope` is exposed by [`AlignmentStats::fraction`], defined as `0.0`
//! for an empty scope.
use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::coverage::OccultationWindow;
use crate::crossing::OccultationPair;

/// Anything carrying an ingress epoch in UTC.
pub trait IngressTime {
    fn ingress_time(&self) -> DateTime<Utc>;
}

impl IngressTime for OccultationWindow {
    fn ingress_time(&self) -> DateTime<Utc> {
        self.ingress
    }
}

impl IngressTime for OccultationPair {
    fn ingress_time(&self) -> DateTime<Utc> {
        self.ingress.utc
    }
}

/// Half-open time range `[start, end)` on the derived ingress. `None` leaves a side unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignmentScope {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl AlignmentScope {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        AlignmentScope {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| s <= t) && self.end.map_or(true, |e| t < e)
    }
}

/// A derived occultation and the reported window it was matched with.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRecord<D> {
    pub derived: D,
    pub reported: OccultationWindow,
    /// Derived ingress minus reported ingress
    pub offset: TimeDelta,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignmentStats {
    /// Derived occultations inside the scope
    pub in_scope: usize,
    /// Of those, the ones matched with a reported window
    pub matched: usize,
}

impl AlignmentStats {
    /// `matched / in_scope`, `0.0` when nothing is in scope.
    pub fn fraction(&self) -> f64 {
        if self.in_scope == 0 {
            0.0
        } else {
            self.matched as f64 / self.in_scope as f64
        }
    }

    pub fn percent(&self) -> f64 {
        100.0 * self.fraction()
    }
}

impl fmt::Display for AlignmentStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Occultations in derived set: {}", self.in_scope)?;
        writeln!(f, "Occultations covered: {}", self.matched)?;
        write!(f, "Percent: {:.1}%", self.percent())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alignment<D> {
    /// Matched records, ordered by derived ingress
    pub records: Vec<AlignedRecord<D>>,
    pub stats: AlignmentStats,
}

/// Index of the window nearest to `t` in `sorted` (ascending ingress), earliest on ties.
fn nearest(sorted: &[OccultationWindow], t: DateTime<Utc>) -> Option<usize> {
    let next = sorted.partition_point(|w| w.ingress < t);
    let prev = next.checked_sub(1).map(|i| {
        // first of a run of equal ingress epochs
        let key = sorted[i].ingress;
        sorted[..=i].partition_point(|w| w.ingress < key)
    });

    match (prev, sorted.get(next)) {
        (None, None) => None,
        (Some(p), None) => Some(p),
        (None, Some(_)) => Some(next),
        (Some(p), Some(n)) => {
            let d_prev = t - sorted[p].ingress;
            let d_next = n.ingress - t;
            Some(if d_prev <= d_next { p } else { next })
        }
    }
}

/// Match derived occultations against reported windows.
///
/// Arguments
/// -----------------
/// * `derived`: Geometry-derived occultations, any order.
/// * `reported`: Catalog windows, any order.
/// * `tolerance`: Largest accepted `|derived ingress - reported ingress|`, inclusive.
/// * `scope`: Range restricting the derived occultations before matching.
///
/// Return
/// ----------
/// * An [`Alignment`] with the matched records sorted by derived ingress and the counts.
///
/// See also
/// ------------
/// * [`AlignmentStats::fraction`] – Coverage ratio of the run.
pub fn align<D>(
    derived: &[D],
    reported: &[OccultationWindow],
    tolerance: TimeDelta,
    scope: &AlignmentScope,
) -> Alignment<D>
where
    D: IngressTime + Clone,
{
    let mut reported = reported.to_vec();
    reported.sort_by_key(|w| w.ingress);

    let mut in_scope: Vec<&D> = derived
        .iter()
        .filter(|d| scope.contains(d.ingress_time()))
        .collect();
    in_scope.sort_by_key(|d| d.ingress_time());

    let records: Vec<AlignedRecord<D>> = in_scope
        .iter()
        .filter_map(|d| {
            let t = d.ingress_time();
            let window = reported[nearest(&reported, t)?];
            let offset = t - window.ingress;
            (offset.abs() <= tolerance).then(|| AlignedRecord {
                derived: (*d).clone(),
                reported: window,
                offset,
            })
        })
        .collect();

    let stats = AlignmentStats {
        in_scope: in_scope.len(),
        matched: records.len(),
    };
    debug!(
        in_scope = stats.in_scope,
        matched = stats.matched,
        "alignment complete"
    );

    Alignment { records, stats }
}

#[cfg(test)]
mod alignment_test {
    use super::*;
    use chrono::TimeZone;

    fn t(s: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + TimeDelta::seconds(s)
    }

    fn w(ingress: i64) -> OccultationWindow {
        OccultationWindow::new(t(ingress), t(ingress + 600)).unwrap()
    }

    #[test]
    fn test_tolerance_is_inclusive() {
        let tol = TimeDelta::seconds(60);
        let scope = AlignmentScope::unbounded();

        let at_bound = align(&[w(60)], &[w(0)], tol, &scope);
        assert_eq!(at_bound.stats.matched, 1);
        assert_eq!(at_bound.records[0].offset, TimeDelta::seconds(60));

        let exact = align(&[w(0)], &[w(0)], tol, &scope);
        assert_eq!(exact.records[0].offset, TimeDelta::zero());

        let past = OccultationWindow::new(t(60) + TimeDelta::milliseconds(1), t(700)).unwrap();
        let missed = align(&[past], &[w(0)], tol, &scope);
        assert_eq!(missed.stats, AlignmentStats { in_scope: 1, matched: 0 });
        assert!(missed.records.is_empty());
    }

    #[test]
    fn test_nearest_wins() {
        let reported = [w(1000), w(-40), w(30)];
        let out = align(&[w(0)], &reported, TimeDelta::seconds(60), &AlignmentScope::unbounded());
        assert_eq!(out.records[0].reported, w(30));
        assert_eq!(out.records[0].offset, TimeDelta::seconds(-30));
    }

    #[test]
    fn test_tie_goes_to_earlier_window() {
        let reported = [w(20), w(-20)];
        let out = align(&[w(0)], &reported, TimeDelta::seconds(60), &AlignmentScope::unbounded());
        assert_eq!(out.records[0].reported, w(-20));
    }

    #[test]
    fn test_tie_between_equal_ingress_keeps_first() {
        let first = OccultationWindow::new(t(10), t(100)).unwrap();
        let second = OccultationWindow::new(t(10), t(200)).unwrap();
        let out = align(
            &[w(0), w(20)],
            &[first, second],
            TimeDelta::seconds(60),
            &AlignmentScope::unbounded(),
        );
        assert!(out.records.iter().all(|r| r.reported == first));
    }

    #[test]
    fn test_scope_restricts_before_counting() {
        let derived = [w(-100), w(0), w(100), w(5000)];
        let scope = AlignmentScope::new(t(0), t(5000));
        let out = align(&derived, &[w(0)], TimeDelta::seconds(60), &scope);

        assert_eq!(out.stats, AlignmentStats { in_scope: 2, matched: 1 });
        assert_eq!(out.stats.fraction(), 0.5);
        assert_eq!(out.stats.percent(), 50.0);
    }

    #[test]
    fn test_empty_scope_gives_zero_fraction() {
        let out = align::<OccultationWindow>(
            &[],
            &[w(0)],
            TimeDelta::seconds(60),
            &AlignmentScope::unbounded(),
        );
        assert_eq!(out.stats.in_scope, 0);
        assert_eq!(out.stats.fraction(), 0.0);
    }

    #[test]
    fn test_no_reported_windows() {
        let out = align(&[w(0)], &[], TimeDelta::seconds(60), &AlignmentScope::unbounded());
        assert_eq!(out.stats, AlignmentStats { in_scope: 1, matched: 0 });
    }

    #[test]
    fn test_records_sorted_by_derived_ingress() {
        let derived = [w(3000), w(0), w(1500)];
        let reported = [w(0), w(1500), w(3000)];
        let out = align(&derived, &reported, TimeDelta::seconds(1), &AlignmentScope::unbounded());
        let ingress: Vec<_> = out.records.iter().map(|r| r.derived.ingress).collect();
        assert_eq!(ingress, vec![t(0), t(1500), t(3000)]);
    }
}
