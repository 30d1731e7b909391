//! # Constants and type definitions for radiocc
//!
//! This module centralizes the **physical constants**, **default identifiers**, and **common
//! type aliases** used throughout the crate.
//!
//! ## Overview
//!
//! - Body radius
//! - NAIF identifiers and frames of the default TGO–Earth occultation geometry
//! - Core type aliases (angles, distances, ephemeris time)
//! - Defaults of the coverage and alignment runs

// -------------------------------------------------------------------------------------------------
// Physical constants
// -------------------------------------------------------------------------------------------------

/// Mean radius of Mars in kilometers, used as the crossing threshold
pub const MARS_RADIUS: f64 = 3397.515;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Ephemeris time (TDB seconds past J2000)
pub type Et = f64;
/// Duration in seconds
pub type Seconds = f64;
/// Ground station identifier as reported by the event catalog (e.g. `"NNO"`)
pub type StationId = String;

// -------------------------------------------------------------------------------------------------
// Default occultation geometry (ExoMars TGO high gain antenna seen from Earth)
// -------------------------------------------------------------------------------------------------

/// Occulting body name
pub const MARS_ID: &str = "MARS";
/// Body-fixed frame of the occulting body
pub const MARS_FRAME: &str = "IAU_MARS";
/// NAIF id of the TGO high gain antenna reference point
pub const TGO_HGA_ID: &str = "-143025";
/// NAIF id of the Earth
pub const EARTH_ID: &str = "399";
/// NAIF name of the Sun
pub const SUN_ID: &str = "SUN";

// -------------------------------------------------------------------------------------------------
// Run defaults
// -------------------------------------------------------------------------------------------------

/// Ground stations never considered for coverage
pub const EXCLUDED_STATIONS: [&str; 2] = ["KLZ", "BLK"];

/// Time margin required before ingress and after egress (minutes)
pub const COVERAGE_MARGIN_MIN: i64 = 10;

/// Tolerated offset between catalog and geometry ingress times (seconds)
pub const ALIGNMENT_TOLERANCE_S: i64 = 60;

/// Sampling step of the crossing scan (seconds)
pub const DEFAULT_STEP: Seconds = 1.0;

/// Number of parallel scan contexts
pub const DEFAULT_PARALLELISM: usize = 4;
