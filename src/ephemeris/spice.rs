//! SPICE-backed [`EphemerisProvider`] built on the pure Rust `rsspice` port.
//!
//! Each [`SpiceProvider`] owns its own `SpiceContext`, hence its own kernel pool: handles built
//! in different threads never observe each other's state.
use nalgebra::Vector3;
use rsspice::SpiceContext;

use super::{EphemerisProvider, KernelSet, TangentPoint, TangentPointQuery};
use crate::constants::{Et, Radian};
use crate::radiocc_errors::RadioccError;

fn geometry(err: rsspice::Error) -> RadioccError {
    RadioccError::Geometry(err.to_string())
}

pub struct SpiceProvider {
    spice: SpiceContext<'static>,
}

impl Default for SpiceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SpiceProvider {
    pub fn new() -> Self {
        SpiceProvider {
            spice: SpiceContext::new(),
        }
    }

    /// Build a handle and load `kernels` into it.
    pub fn with_kernels(kernels: &KernelSet) -> Result<Self, RadioccError> {
        let mut provider = Self::new();
        provider.initialize(kernels)?;
        Ok(provider)
    }
}

impl EphemerisProvider for SpiceProvider {
    fn initialize(&mut self, kernels: &KernelSet) -> Result<(), RadioccError> {
        // The kernel pool keeps every furnished file, reloading does not replace it
        self.spice
            .kclear()
            .map_err(|e| RadioccError::KernelLoad(e.to_string()))?;
        self.spice
            .furnsh(kernels.metakernel().as_str())
            .map_err(|e| RadioccError::KernelLoad(format!("{}: {e}", kernels.metakernel())))
    }

    fn relative_position(
        &mut self,
        target: &str,
        et: Et,
        frame: &str,
        abcorr: &str,
        observer: &str,
    ) -> Result<Vector3<f64>, RadioccError> {
        let (pos, _lt) = self
            .spice
            .spkpos(target, et, frame, abcorr, observer)
            .map_err(geometry)?;
        Ok(Vector3::from(pos))
    }

    fn tangent_point(
        &mut self,
        query: &TangentPointQuery<'_>,
        et: Et,
        ray: &Vector3<f64>,
    ) -> Result<TangentPoint, RadioccError> {
        let ray: [f64; 3] = (*ray).into();
        let (tanpt, alt, ..) = self
            .spice
            .tangpt(
                query.shape_model,
                query.body,
                et,
                query.body_frame,
                query.abcorr,
                query.method,
                query.observer,
                query.ray_frame,
                &ray,
            )
            .map_err(geometry)?;
        Ok(TangentPoint {
            point: Vector3::from(tanpt),
            altitude: alt,
        })
    }

    fn solar_longitude(
        &mut self,
        body: &str,
        et: Et,
        abcorr: &str,
    ) -> Result<Radian, RadioccError> {
        self.spice.lspcn(body, et, abcorr).map_err(geometry)
    }

    fn time_to_calendar(
        &mut self,
        et: Et,
        format: &str,
        precision: usize,
    ) -> Result<String, RadioccError> {
        self.spice
            .et2utc(et, format, precision as i32)
            .map_err(|e| RadioccError::InvalidTimeFormat(e.to_string()))
    }

    fn calendar_to_time(&mut self, calendar: &str) -> Result<Et, RadioccError> {
        self.spice
            .str2et(calendar)
            .map_err(|e| RadioccError::InvalidTimeFormat(format!("{calendar}: {e}")))
    }
}
