use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alignment::{AlignedRecord, IngressTime};
use crate::constants::Degree;
use crate::coverage::OccultationWindow;
use crate::crossing::OccultationPair;
use crate::radiocc_errors::RadioccError;

/// One geometry-derived occultation, ingress and egress side by side.
///
/// Field names are the column names of the wide table and of its CSV sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccultationRow {
    #[serde(rename = "Ingress UTC")]
    pub ingress_utc: DateTime<Utc>,
    #[serde(rename = "Ingress Lat (deg)")]
    pub ingress_lat: Degree,
    #[serde(rename = "Ingress Lon (deg)")]
    pub ingress_lon: Degree,
    #[serde(rename = "Ingress SZA (deg)")]
    pub ingress_sza: Degree,
    #[serde(rename = "Ingress Ls (deg)")]
    pub ingress_ls: Degree,
    #[serde(rename = "Egress UTC")]
    pub egress_utc: DateTime<Utc>,
    #[serde(rename = "Egress Lat (deg)")]
    pub egress_lat: Degree,
    #[serde(rename = "Egress Lon (deg)")]
    pub egress_lon: Degree,
    #[serde(rename = "Egress SZA (deg)")]
    pub egress_sza: Degree,
    #[serde(rename = "Egress Ls (deg)")]
    pub egress_ls: Degree,
}

impl OccultationRow {
    pub const HEADER: [&'static str; 10] = [
        "Ingress UTC",
        "Ingress Lat (deg)",
        "Ingress Lon (deg)",
        "Ingress SZA (deg)",
        "Ingress Ls (deg)",
        "Egress UTC",
        "Egress Lat (deg)",
        "Egress Lon (deg)",
        "Egress SZA (deg)",
        "Egress Ls (deg)",
    ];

    pub fn window(&self) -> Result<OccultationWindow, RadioccError> {
        OccultationWindow::new(self.ingress_utc, self.egress_utc)
    }
}

impl From<&OccultationPair> for OccultationRow {
    fn from(pair: &OccultationPair) -> Self {
        let (i, e) = (&pair.ingress, &pair.egress);
        OccultationRow {
            ingress_utc: i.utc,
            ingress_lat: i.latitude,
            ingress_lon: i.longitude,
            ingress_sza: i.sza,
            ingress_ls: i.solar_longitude,
            egress_utc: e.utc,
            egress_lat: e.latitude,
            egress_lon: e.longitude,
            egress_sza: e.sza,
            egress_ls: e.solar_longitude,
        }
    }
}

impl IngressTime for OccultationRow {
    fn ingress_time(&self) -> DateTime<Utc> {
        self.ingress_utc
    }
}

/// Which side of the occultation a scatter point belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Series {
    Ingress,
    Egress,
}

/// Whether the point comes from every derived occultation or only from the aligned ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subset {
    All,
    Covered,
}

/// A point of the latitude/time and latitude/SZA scatter plots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub series: Series,
    pub subset: Subset,
    pub utc: DateTime<Utc>,
    pub latitude_deg: Degree,
    pub sza_deg: Degree,
}

fn points_of(row: &OccultationRow, subset: Subset) -> [ScatterPoint; 2] {
    [
        ScatterPoint {
            series: Series::Ingress,
            subset,
            utc: row.ingress_utc,
            latitude_deg: row.ingress_lat,
            sza_deg: row.ingress_sza,
        },
        ScatterPoint {
            series: Series::Egress,
            subset,
            utc: row.egress_utc,
            latitude_deg: row.egress_lat,
            sza_deg: row.egress_sza,
        },
    ]
}

/// Scatter series of `all` derived occultations followed by the `covered` (aligned) ones.
pub fn scatter_points(
    all: &[OccultationRow],
    covered: &[AlignedRecord<OccultationRow>],
) -> Vec<ScatterPoint> {
    all.iter()
        .flat_map(|r| points_of(r, Subset::All))
        .chain(covered.iter().flat_map(|r| points_of(&r.derived, Subset::Covered)))
        .collect()
}
