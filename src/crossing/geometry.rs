use crate::constants::{Kilometer, MARS_FRAME, MARS_ID, MARS_RADIUS, SUN_ID, TGO_HGA_ID};
use crate::ephemeris::TangentPointQuery;

/// Fixed geometry of an occultation scan: who occults, which antenna, which corrections.
///
/// The defaults describe the ExoMars TGO high gain antenna occulted by Mars.
#[derive(Debug, Clone, PartialEq)]
pub struct OccultationGeometry {
    /// Occulting body
    pub body: String,
    /// Body-fixed frame of the occulting body, also used for the ray and Sun vectors
    pub body_frame: String,
    /// Spacecraft antenna reference point the line of sight starts from
    pub antenna: String,
    /// Sun name used for the solar zenith angle
    pub sun: String,
    /// Shape model used for the tangent point
    pub shape_model: String,
    /// Aberration correction locus of the tangent point
    pub tangent_method: String,
    /// Aberration correction for the line of sight and the tangent point
    pub abcorr: String,
    /// Aberration correction for the body-centred Sun vector
    pub sun_abcorr: String,
    /// Aberration correction for the solar longitude
    pub ls_abcorr: String,
    /// Radius the impact parameter is compared against
    pub radius: Kilometer,
}

impl Default for OccultationGeometry {
    fn default() -> Self {
        OccultationGeometry {
            body: MARS_ID.into(),
            body_frame: MARS_FRAME.into(),
            antenna: TGO_HGA_ID.into(),
            sun: SUN_ID.into(),
            shape_model: "ELLIPSOID".into(),
            tangent_method: "TANGENT POINT".into(),
            abcorr: "CN+S".into(),
            sun_abcorr: "NONE".into(),
            ls_abcorr: "LT+S".into(),
            radius: MARS_RADIUS,
        }
    }
}

impl OccultationGeometry {
    /// Tangent point request for a ray leaving the antenna.
    pub fn tangent_query(&self) -> TangentPointQuery<'_> {
        TangentPointQuery {
            shape_model: &self.shape_model,
            body: &self.body,
            body_frame: &self.body_frame,
            abcorr: &self.abcorr,
            method: &self.tangent_method,
            observer: &self.antenna,
            ray_frame: &self.body_frame,
        }
    }
}
