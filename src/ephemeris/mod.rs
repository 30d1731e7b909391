//! # Ephemeris access layer
//!
//! The crossing scan only needs a handful of geometric queries. They are expressed by the
//! [`EphemerisProvider`] trait so that the scan can run against a SPICE kernel pool
//! ([`spice::SpiceProvider`], cargo feature `spice`) or against any tabulated source.
//!
//! ## Execution contexts
//!
//! A provider is a **stateful handle**: it owns a loaded kernel set. Handles are never shared
//! between threads. Every parallel context of the scan builds its own handle through a
//! factory closure and calls [`EphemerisProvider::initialize`] once before its first query.
//! Re-initializing a handle must clear the previously loaded kernels before loading the new
//! set.
//!
//! ## Units
//!
//! Positions are in kilometers, angles in radians. Conversion to degrees happens at the
//! result boundary (see [`crate::crossing`]).
use camino::{Utf8Path, Utf8PathBuf};
use nalgebra::Vector3;

use crate::constants::{Degree, Et, Kilometer, Radian};
use crate::radiocc_errors::RadioccError;

#[cfg(feature = "spice")]
pub mod spice;

/// Kernel set to load into a provider, described by its metakernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelSet {
    metakernel: Utf8PathBuf,
}

impl KernelSet {
    pub fn new(metakernel: impl Into<Utf8PathBuf>) -> Self {
        KernelSet {
            metakernel: metakernel.into(),
        }
    }

    pub fn metakernel(&self) -> &Utf8Path {
        &self.metakernel
    }
}

/// Parameters of a tangent point computation along a ray emanating from an observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentPointQuery<'a> {
    /// Shape model of the target (`"ELLIPSOID"`)
    pub shape_model: &'a str,
    /// Occulting body (`"MARS"`)
    pub body: &'a str,
    /// Body-fixed frame in which the tangent point is expressed
    pub body_frame: &'a str,
    /// Aberration correction (`"CN+S"`)
    pub abcorr: &'a str,
    /// Aberration correction locus (`"TANGENT POINT"`)
    pub method: &'a str,
    /// Origin of the ray
    pub observer: &'a str,
    /// Frame in which the ray direction is given
    pub ray_frame: &'a str,
}

/// Result of a tangent point computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentPoint {
    /// Tangent point, body-centred, in the body-fixed frame (km)
    pub point: Vector3<f64>,
    /// Altitude of the tangent point above the surface (km)
    pub altitude: Kilometer,
}

/// Latitudinal coordinates of a body-fixed vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatitudinalCoords {
    pub radius: Kilometer,
    pub longitude: Radian,
    pub latitude: Radian,
}

/// Geometric queries needed by the occultation scan.
///
/// Implementations signal per-epoch geometry failures with [`RadioccError::Geometry`];
/// kernel loading failures with [`RadioccError::KernelLoad`].
pub trait EphemerisProvider {
    /// Clear any loaded kernels, then load `kernels`.
    fn initialize(&mut self, kernels: &KernelSet) -> Result<(), RadioccError>;

    /// Position of `target` relative to `observer` at `et`, in `frame` (km).
    fn relative_position(
        &mut self,
        target: &str,
        et: Et,
        frame: &str,
        abcorr: &str,
        observer: &str,
    ) -> Result<Vector3<f64>, RadioccError>;

    /// Tangent point of the ray `ray` on the shape described by `query`.
    fn tangent_point(
        &mut self,
        query: &TangentPointQuery<'_>,
        et: Et,
        ray: &Vector3<f64>,
    ) -> Result<TangentPoint, RadioccError>;

    /// Planetocentric solar longitude Ls of `body` at `et` (radians).
    fn solar_longitude(&mut self, body: &str, et: Et, abcorr: &str)
        -> Result<Radian, RadioccError>;

    /// Render `et` as a calendar string (`format` e.g. `"ISOC"`, `precision` fractional digits).
    fn time_to_calendar(
        &mut self,
        et: Et,
        format: &str,
        precision: usize,
    ) -> Result<String, RadioccError>;

    /// Parse a calendar string into ephemeris time.
    fn calendar_to_time(&mut self, calendar: &str) -> Result<Et, RadioccError>;

    /// Rectangular to latitudinal coordinates.
    fn body_fixed_coordinates(&self, v: &Vector3<f64>) -> LatitudinalCoords {
        rectangular_to_latitudinal(v)
    }

    /// Separation angle between two vectors (radians).
    fn angle_between(&self, a: &Vector3<f64>, b: &Vector3<f64>) -> Radian {
        vector_separation(a, b)
    }
}

/// Rectangular to latitudinal coordinates; the zero vector maps to all zeros.
pub fn rectangular_to_latitudinal(v: &Vector3<f64>) -> LatitudinalCoords {
    let radius = v.norm();
    if radius == 0.0 {
        return LatitudinalCoords {
            radius: 0.0,
            longitude: 0.0,
            latitude: 0.0,
        };
    }
    let longitude = if v.x == 0.0 && v.y == 0.0 {
        0.0
    } else {
        v.y.atan2(v.x)
    };
    let latitude = v.z.atan2(v.x.hypot(v.y));
    LatitudinalCoords {
        radius,
        longitude,
        latitude,
    }
}

/// Angular separation of two vectors in `[0, π]`; zero if either vector is null.
///
/// Uses the half-chord formulation, which stays accurate for nearly (anti)parallel vectors.
pub fn vector_separation(a: &Vector3<f64>, b: &Vector3<f64>) -> Radian {
    let (na, nb) = (a.norm(), b.norm());
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    let (ua, ub) = (a / na, b / nb);
    let dot = ua.dot(&ub);
    if dot > 0.0 {
        2.0 * (0.5 * (ua - ub).norm()).asin()
    } else if dot < 0.0 {
        std::f64::consts::PI - 2.0 * (0.5 * (ua + ub).norm()).asin()
    } else {
        std::f64::consts::FRAC_PI_2
    }
}

/// Wrap an angle into `[0, 360)`.
///
/// `rem_euclid` rounds tiny negative inputs up to exactly `360.0`, which is folded back to 0.
pub fn normalize_degrees(angle: Degree) -> Degree {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
