use std::cmp::Ordering::{Greater, Less};
use std::ops::Range;

use crate::constants::{Et, Seconds, DEFAULT_PARALLELISM, DEFAULT_STEP};
use crate::radiocc_errors::RadioccError;

/// Time domain and execution layout of a crossing scan.
///
/// Build it with [`ScanParams::builder`]; [`ScanParamsBuilder::build`] enforces
/// `start < end`, `step > 0`, `parallelism ≥ 1` and `chunk_len ≥ 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanParams {
    /// First sampled epoch (inclusive)
    pub start: Et,
    /// Upper bound of the sampled epochs (exclusive)
    pub end: Et,
    /// Sampling step in seconds
    pub step: Seconds,
    /// Number of worker threads evaluating chunks
    pub parallelism: usize,
    /// Number of epochs per chunk. `None` splits the grid into `parallelism` chunks.
    pub chunk_len: Option<usize>,
}

impl ScanParams {
    pub fn builder() -> ScanParamsBuilder {
        ScanParamsBuilder::new()
    }

    /// Number of epochs on the grid, `ceil((end - start) / step)`.
    pub fn n_epochs(&self) -> usize {
        ((self.end - self.start) / self.step).ceil() as usize
    }

    /// Epoch of grid index `i`.
    ///
    /// Computed from the index rather than accumulated, so multi-year scans do not drift.
    pub fn epoch_at(&self, i: usize) -> Et {
        self.start + i as f64 * self.step
    }

    /// Sampled epochs `start, start + step, …` strictly below `end`, generated lazily.
    pub fn epochs(&self) -> impl Iterator<Item = Et> + '_ {
        (0..self.n_epochs()).map(|i| self.epoch_at(i))
    }

    /// Effective chunk length for `n` epochs.
    pub fn effective_chunk_len(&self, n: usize) -> usize {
        self.chunk_len
            .unwrap_or_else(|| n.div_ceil(self.parallelism))
            .max(1)
    }

    /// Contiguous grid index ranges, one per chunk, in epoch order.
    pub fn chunk_ranges(&self) -> Vec<Range<usize>> {
        let n = self.n_epochs();
        let len = self.effective_chunk_len(n);
        (0..n)
            .step_by(len)
            .map(|lo| lo..(lo + len).min(n))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct ScanParamsBuilder {
    params: ScanParams,
}

impl Default for ScanParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: ScanParams {
                start: 0.0,
                end: 0.0,
                step: DEFAULT_STEP,
                parallelism: DEFAULT_PARALLELISM,
                chunk_len: None,
            },
        }
    }

    pub fn start(mut self, v: Et) -> Self {
        self.params.start = v;
        self
    }
    pub fn end(mut self, v: Et) -> Self {
        self.params.end = v;
        self
    }
    pub fn step(mut self, v: Seconds) -> Self {
        self.params.step = v;
        self
    }
    pub fn parallelism(mut self, v: usize) -> Self {
        self.params.parallelism = v;
        self
    }
    pub fn chunk_len(mut self, v: usize) -> Self {
        self.params.chunk_len = Some(v);
        self
    }

    /// Validate and return the parameters.
    ///
    /// NaN bounds or steps are rejected since they do not compare.
    pub fn build(self) -> Result<ScanParams, RadioccError> {
        let p = &self.params;

        if p.start.partial_cmp(&p.end) != Some(Less) {
            return Err(RadioccError::InvalidScanParameter(
                "start must be strictly before end".into(),
            ));
        }
        if p.step.partial_cmp(&0.0) != Some(Greater) || !p.step.is_finite() {
            return Err(RadioccError::InvalidScanParameter(
                "step must be > 0".into(),
            ));
        }
        if p.parallelism == 0 {
            return Err(RadioccError::InvalidScanParameter(
                "parallelism must be >= 1".into(),
            ));
        }
        if p.chunk_len == Some(0) {
            return Err(RadioccError::InvalidScanParameter(
                "chunk_len must be >= 1".into(),
            ));
        }
        if !p.start.is_finite() || !p.end.is_finite() {
            return Err(RadioccError::InvalidScanParameter(
                "start and end must be finite".into(),
            ));
        }

        Ok(self.params)
    }
}
