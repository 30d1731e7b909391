//! # Crossing detection
//!
//! Geometric occultation events are found by sampling the **impact parameter** of the
//! spacecraft–observer line of sight (norm of its tangent point on the occulting body) on a
//! fixed time grid and reporting where it crosses the body radius.
//!
//! ## Pipeline
//!
//! 1. Split the epoch grid `start, start + step, …` (`end` excluded) into contiguous index
//!    ranges, see [`ScanParams::chunk_ranges`]. Epochs are computed from their index on the fly.
//! 2. Evaluate the chunks on a dedicated [`rayon`] pool of `parallelism` threads. Every chunk
//!    builds its **own** [`EphemerisProvider`] through the scanner factory and initializes it
//!    before the first epoch: kernel pools are never shared.
//! 3. Drop epochs whose geometry fails (body not in view, missing coverage…). A chunk whose
//!    provider cannot be initialized contributes nothing; the scan goes on with a gap.
//! 4. Reduce each chunk as it is sampled: sign changes of `impact - radius` are kept with the
//!    chunk's first and last valid samples, everything else is discarded. Neighbouring chunks
//!    are then stitched in epoch order ([`reduction::merge_chunks`]).
//! 5. Annotate each transition with tangent-point latitude/longitude, solar zenith angle and
//!    solar longitude, using a provider initialized in the calling context. A failure to
//!    initialize that one aborts the scan.
//!
//! ## Resolution
//!
//! Event epochs are grid epochs: the first sample on the new side of the radius. Their accuracy
//! is bounded by `step`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use radiocc::crossing::{OccultationScanner, OccultationGeometry, ScanParams};
//! use radiocc::ephemeris::{KernelSet, spice::SpiceProvider};
//!
//! let scanner = OccultationScanner::new(
//!     SpiceProvider::new,
//!     KernelSet::new("kernels/mk/em16_ops.tm"),
//!     OccultationGeometry::default(),
//! );
//! let params = ScanParams::builder().start(et0).end(et1).step(1.0).parallelism(8).build()?;
//! let occultations = scanner.detect("399", &params)?;
//! for pair in occultations.pairs() {
//!     println!("{} -> {}", pair.ingress.utc, pair.egress.utc);
//! }
//! ```
use std::ops::Range;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use nalgebra::Vector3;
use rayon::prelude::*;
use tracing::{debug, info, trace, warn};

use crate::constants::{Degree, Et, Kilometer};
use crate::coverage::OccultationWindow;
use crate::ephemeris::{normalize_degrees, EphemerisProvider, KernelSet};
use crate::radiocc_errors::RadioccError;
use crate::time::parse_utc;

pub mod geometry;
pub mod params;
pub mod reduction;

pub use geometry::OccultationGeometry;
pub use params::{ScanParams, ScanParamsBuilder};

/// Largest grid [`OccultationScanner::sample_range`] accepts.
pub const MAX_RETAINED_SAMPLES: usize = 1_000_000;

/// One evaluated epoch of the scan.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSample {
    pub et: Et,
    /// Norm of the tangent point vector (km)
    pub impact_parameter: Kilometer,
    /// Tangent point in the body-fixed frame (km)
    pub tangent_point: Vector3<f64>,
    /// Solar zenith angle at the tangent point
    pub sza: Degree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrossingKind {
    Ingress,
    Egress,
}

impl std::fmt::Display for CrossingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrossingKind::Ingress => write!(f, "Ingress"),
            CrossingKind::Egress => write!(f, "Egress"),
        }
    }
}

/// An ingress or egress, with the geometry of the tangent point at that epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossingEvent {
    pub et: Et,
    pub kind: CrossingKind,
    pub latitude: Degree,
    pub longitude: Degree,
    pub sza: Degree,
    /// Solar longitude Ls in `[0, 360)`
    pub solar_longitude: Degree,
    pub utc: DateTime<Utc>,
}

/// An ingress followed by its egress.
#[derive(Debug, Clone, PartialEq)]
pub struct OccultationPair {
    pub ingress: CrossingEvent,
    pub egress: CrossingEvent,
}

impl OccultationPair {
    /// UTC window spanned by the pair.
    pub fn window(&self) -> Result<OccultationWindow, RadioccError> {
        OccultationWindow::new(self.ingress.utc, self.egress.utc)
    }
}

/// Output of a scan: ingress and egress events, each ordered by epoch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Occultations {
    pub ingress: Vec<CrossingEvent>,
    pub egress: Vec<CrossingEvent>,
}

impl Occultations {
    /// All events merged in epoch order.
    pub fn events(&self) -> Vec<&CrossingEvent> {
        self.ingress
            .iter()
            .merge_by(self.egress.iter(), |a, b| a.et <= b.et)
            .collect()
    }

    /// Ingress/egress pairs, see [`reduction::pair_events`].
    pub fn pairs(&self) -> Vec<OccultationPair> {
        reduction::pair_events(&self.ingress, &self.egress)
    }

    pub fn is_empty(&self) -> bool {
        self.ingress.is_empty() && self.egress.is_empty()
    }
}

/// Evaluate the geometry of a single epoch.
///
/// Arguments
/// -----------------
/// * `provider`: An initialized ephemeris handle.
/// * `geometry`: Body, antenna and aberration settings.
/// * `observer`: Ground observer at the other end of the line of sight (e.g. `"399"`).
/// * `et`: Epoch to evaluate.
///
/// Return
/// ----------
/// * The [`TimeSample`] or the provider error (usually [`RadioccError::Geometry`]).
pub fn sample_epoch<P: EphemerisProvider>(
    provider: &mut P,
    geometry: &OccultationGeometry,
    observer: &str,
    et: Et,
) -> Result<TimeSample, RadioccError> {
    let ray = provider.relative_position(
        observer,
        et,
        &geometry.body_frame,
        &geometry.abcorr,
        &geometry.antenna,
    )?;
    let tangent = provider.tangent_point(&geometry.tangent_query(), et, &ray)?;
    let sun = provider.relative_position(
        &geometry.sun,
        et,
        &geometry.body_frame,
        &geometry.sun_abcorr,
        &geometry.body,
    )?;
    let sza = provider.angle_between(&sun, &tangent.point).to_degrees();

    Ok(TimeSample {
        et,
        impact_parameter: tangent.point.norm(),
        tangent_point: tangent.point,
        sza,
    })
}

/// Parallel occultation scanner.
///
/// `factory` builds a fresh, uninitialized provider; it is called once in the calling context
/// and once per chunk.
pub struct OccultationScanner<F> {
    factory: F,
    kernels: KernelSet,
    geometry: OccultationGeometry,
}

impl<F, P> OccultationScanner<F>
where
    F: Fn() -> P + Sync,
    P: EphemerisProvider,
{
    pub fn new(factory: F, kernels: KernelSet, geometry: OccultationGeometry) -> Self {
        OccultationScanner {
            factory,
            kernels,
            geometry,
        }
    }

    pub fn geometry(&self) -> &OccultationGeometry {
        &self.geometry
    }

    /// Detect ingress and egress events of `observer` over the domain of `params`.
    ///
    /// Samples are reduced inside their chunk as they are produced; only crossing samples and
    /// the two outermost samples of each chunk outlive the chunk evaluation.
    ///
    /// Return
    /// ----------
    /// * [`Occultations`] with both event lists in epoch order.
    /// * [`RadioccError::KernelLoad`] if the kernel set cannot be loaded in the calling context.
    /// * Any error of the per-event annotation queries (solar longitude, calendar conversion).
    pub fn detect(
        &self,
        observer: &str,
        params: &ScanParams,
    ) -> Result<Occultations, RadioccError> {
        let mut primary = (self.factory)();
        primary.initialize(&self.kernels)?;

        let radius = self.geometry.radius;
        let chunks = self.run_chunks(params, |k, range| {
            let mut reduced = reduction::ChunkCrossings::new(radius);
            self.evaluate_chunk(k, range, params, observer, |sample| reduced.push(sample));
            reduced
        })?;

        let n_valid: usize = chunks.iter().map(|c| c.n_valid).sum();
        let dropped = params.n_epochs() - n_valid;
        if dropped > 0 {
            debug!(dropped, "epochs without valid geometry");
        }

        let transitions = reduction::merge_chunks(chunks, radius);
        debug!(n_transitions = transitions.len(), "crossings located");

        let mut occultations = Occultations::default();
        for (kind, sample) in transitions {
            let event = self.annotate(&mut primary, &sample, kind)?;
            match kind {
                CrossingKind::Ingress => occultations.ingress.push(event),
                CrossingKind::Egress => occultations.egress.push(event),
            }
        }

        info!(
            ingress = occultations.ingress.len(),
            egress = occultations.egress.len(),
            "occultation scan complete"
        );
        Ok(occultations)
    }

    /// Evaluate every epoch of the grid in parallel and return the valid samples, sorted by
    /// epoch.
    ///
    /// Every sample is retained, so the grid may not exceed [`MAX_RETAINED_SAMPLES`] epochs;
    /// use [`OccultationScanner::detect`] for full-length scans.
    pub fn sample_range(
        &self,
        observer: &str,
        params: &ScanParams,
    ) -> Result<Vec<TimeSample>, RadioccError> {
        let n = params.n_epochs();
        if n > MAX_RETAINED_SAMPLES {
            return Err(RadioccError::InvalidScanParameter(format!(
                "{n} epochs exceed the {MAX_RETAINED_SAMPLES} samples a retained scan may hold"
            )));
        }

        let chunks = self.run_chunks(params, |k, range| {
            let mut samples = Vec::with_capacity(range.len());
            self.evaluate_chunk(k, range, params, observer, |sample| samples.push(sample));
            samples
        })?;
        Ok(chunks.into_iter().flatten().collect())
    }

    /// Run `eval` over the chunks of the grid on a dedicated pool, results in epoch order.
    fn run_chunks<T, E>(&self, params: &ScanParams, eval: E) -> Result<Vec<T>, RadioccError>
    where
        T: Send,
        E: Fn(usize, Range<usize>) -> T + Sync,
    {
        let ranges = params.chunk_ranges();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(params.parallelism)
            .build()
            .map_err(|e| RadioccError::WorkerPool(e.to_string()))?;

        info!(
            n_epochs = params.n_epochs(),
            n_chunks = ranges.len(),
            parallelism = params.parallelism,
            "starting occultation scan"
        );

        Ok(pool.install(|| {
            ranges
                .into_par_iter()
                .enumerate()
                .map(|(k, range)| eval(k, range))
                .collect()
        }))
    }

    /// Evaluate one chunk in its own ephemeris context, handing valid samples to `sink` in
    /// epoch order.
    fn evaluate_chunk(
        &self,
        k: usize,
        range: Range<usize>,
        params: &ScanParams,
        observer: &str,
        mut sink: impl FnMut(TimeSample),
    ) {
        let mut provider = (self.factory)();
        if let Err(err) = provider.initialize(&self.kernels) {
            warn!(
                chunk = k,
                first_et = params.epoch_at(range.start),
                n_epochs = range.len(),
                "chunk dropped: {err}"
            );
            return;
        }

        let total = range.len();
        let mut valid = 0usize;
        for et in range.map(|i| params.epoch_at(i)) {
            match sample_epoch(&mut provider, &self.geometry, observer, et) {
                Ok(sample) => {
                    valid += 1;
                    sink(sample);
                }
                Err(err) if err.is_transient() => trace!(et, "sample dropped: {err}"),
                Err(err) => debug!(et, "sample dropped: {err}"),
            }
        }

        debug!(chunk = k, valid, total, "chunk evaluated");
    }

    fn annotate(
        &self,
        provider: &mut P,
        sample: &TimeSample,
        kind: CrossingKind,
    ) -> Result<CrossingEvent, RadioccError> {
        let coords = provider.body_fixed_coordinates(&sample.tangent_point);
        let ls =
            provider.solar_longitude(&self.geometry.body, sample.et, &self.geometry.ls_abcorr)?;
        let calendar = provider.time_to_calendar(sample.et, "ISOC", 3)?;

        Ok(CrossingEvent {
            et: sample.et,
            kind,
            latitude: coords.latitude.to_degrees(),
            longitude: coords.longitude.to_degrees(),
            sza: sample.sza,
            solar_longitude: normalize_degrees(ls.to_degrees()),
            utc: parse_utc(&calendar)?,
        })
    }
}
