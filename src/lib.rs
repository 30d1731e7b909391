//! # radiocc
//!
//! Radio occultation detection and ground station coverage for a spacecraft orbiting a
//! planetary body (by default ExoMars TGO around Mars, observed from Earth).
//!
//! ## Workflow
//!
//! 1. [`crossing`] scans the spacecraft–Earth line of sight on a fixed time grid and reports
//!    where it enters ([`crossing::CrossingKind::Ingress`]) and leaves
//!    ([`crossing::CrossingKind::Egress`]) the occulting body.
//! 2. [`catalog`] fetches tracking passes and reported occultations from the mission operations
//!    web service.
//! 3. [`coverage`] keeps the reported occultations that are fully bracketed by light-time
//!    corrected passes.
//! 4. [`alignment`] matches the derived occultations against the covered ones and computes the
//!    coverage ratio.
//! 5. [`report`] writes plain-text tables and CSV sidecars for each step.
//!
//! Ephemeris queries go through the [`ephemeris::EphemerisProvider`] trait; the SPICE toolkit
//! implementation lives behind the `spice` cargo feature.
pub mod alignment;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod coverage;
pub mod crossing;
pub mod ephemeris;
pub mod logging;
pub mod radiocc_errors;
pub mod report;
pub mod time;

pub use radiocc_errors::RadioccError;
