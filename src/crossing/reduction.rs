use itertools::Itertools;
use tracing::debug;

use super::{CrossingEvent, CrossingKind, OccultationPair, TimeSample};
use crate::constants::Kilometer;

/// Kind of crossing between two consecutive impact parameters, if any.
///
/// Going from `> radius` to `≤ radius` is an ingress, the reverse an egress.
pub fn crossing_between(
    before: Kilometer,
    after: Kilometer,
    radius: Kilometer,
) -> Option<CrossingKind> {
    match (before > radius, after > radius) {
        (true, false) => Some(CrossingKind::Ingress),
        (false, true) => Some(CrossingKind::Egress),
        _ => None,
    }
}

/// Locate the sign changes of `impact - radius` in an epoch-ordered series.
///
/// A transition between `i` and `i + 1` is reported at `i + 1`. The returned list is ordered by
/// index. No interpolation between samples is attempted, so the detected epoch lags the true
/// crossing by less than one step.
pub fn find_transitions(impact: &[Kilometer], radius: Kilometer) -> Vec<(usize, CrossingKind)> {
    impact
        .windows(2)
        .enumerate()
        .filter_map(|(i, w)| crossing_between(w[0], w[1], radius).map(|kind| (i + 1, kind)))
        .collect()
}

/// Crossings found inside one chunk of a scan.
///
/// Samples are pushed in epoch order. Only the sample on the far side of each crossing is kept,
/// together with the first and last valid samples needed to stitch neighbouring chunks.
#[derive(Debug, Clone)]
pub struct ChunkCrossings {
    radius: Kilometer,
    pub first: Option<TimeSample>,
    pub last: Option<TimeSample>,
    pub crossings: Vec<(CrossingKind, TimeSample)>,
    pub n_valid: usize,
}

impl ChunkCrossings {
    pub fn new(radius: Kilometer) -> Self {
        ChunkCrossings {
            radius,
            first: None,
            last: None,
            crossings: Vec::new(),
            n_valid: 0,
        }
    }

    pub fn push(&mut self, sample: TimeSample) {
        let kind = self.last.as_ref().and_then(|prev| {
            crossing_between(prev.impact_parameter, sample.impact_parameter, self.radius)
        });
        if let Some(kind) = kind {
            self.crossings.push((kind, sample.clone()));
        }
        if self.first.is_none() {
            self.first = Some(sample.clone());
        }
        self.last = Some(sample);
        self.n_valid += 1;
    }
}

/// Join epoch-ordered chunks into one crossing list.
///
/// Chunks without valid samples are skipped. A crossing between the last sample of a chunk and
/// the first sample of the next non-empty one is reported on the latter, so the result equals
/// [`find_transitions`] over the concatenated samples.
pub fn merge_chunks(
    chunks: Vec<ChunkCrossings>,
    radius: Kilometer,
) -> Vec<(CrossingKind, TimeSample)> {
    let mut merged = Vec::new();
    let mut last: Option<TimeSample> = None;

    for chunk in chunks {
        let Some(first) = chunk.first else {
            continue;
        };
        let boundary = last.as_ref().and_then(|prev| {
            crossing_between(prev.impact_parameter, first.impact_parameter, radius)
        });
        if let Some(kind) = boundary {
            merged.push((kind, first));
        }
        merged.extend(chunk.crossings);
        last = chunk.last;
    }
    merged
}

/// Pair every ingress with the first egress that follows it before the next ingress.
///
/// Both inputs are expected in epoch order, as returned by a scan. Edges left without a
/// partner (scan starting inside an occultation, scan ending before the egress, a sampling gap
/// swallowing one edge) are dropped.
pub fn pair_events(ingress: &[CrossingEvent], egress: &[CrossingEvent]) -> Vec<OccultationPair> {
    let merged = ingress.iter().merge_by(egress.iter(), |a, b| a.et <= b.et);

    let mut pairs = Vec::with_capacity(ingress.len().min(egress.len()));
    let mut pending: Option<&CrossingEvent> = None;

    for event in merged {
        match event.kind {
            CrossingKind::Ingress => {
                if let Some(orphan) = pending.replace(event) {
                    debug!(et = orphan.et, "ingress without egress dropped");
                }
            }
            CrossingKind::Egress => match pending.take() {
                Some(ing) => pairs.push(OccultationPair {
                    ingress: ing.clone(),
                    egress: event.clone(),
                }),
                None => debug!(et = event.et, "egress without ingress dropped"),
            },
        }
    }
    if let Some(orphan) = pending {
        debug!(et = orphan.et, "ingress without egress dropped");
    }

    pairs
}
