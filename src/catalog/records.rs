use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::coverage::{OccultationWindow, Pass};
use crate::radiocc_errors::RadioccError;
use crate::time::{parse_owlt, parse_utc};

/// Pass record as returned by the catalog, before any validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawPass {
    pub groundstation: String,
    pub time_start: String,
    pub time_end: String,
    #[serde(default)]
    pub owlt: Option<String>,
    #[serde(default, deserialize_with = "mspa_flag")]
    pub mspa: bool,
}

/// Occultation record as returned by the catalog, in spacecraft time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawOccultation {
    pub time_start: String,
    pub time_end: String,
}

/// The MSPA flag comes as `"true"`/`"false"`, a JSON bool or `null`. Only a true value counts.
fn mspa_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

impl TryFrom<RawPass> for Pass {
    type Error = RadioccError;

    fn try_from(raw: RawPass) -> Result<Self, Self::Error> {
        let owlt = raw.owlt.as_deref().ok_or_else(|| {
            RadioccError::InvalidPassRecord(format!("{}: missing owlt", raw.groundstation))
        })?;
        Pass::new(
            raw.groundstation.trim(),
            parse_utc(&raw.time_start)?,
            parse_utc(&raw.time_end)?,
            parse_owlt(owlt)?,
            raw.mspa,
        )
    }
}

impl TryFrom<RawOccultation> for OccultationWindow {
    type Error = RadioccError;

    fn try_from(raw: RawOccultation) -> Result<Self, Self::Error> {
        OccultationWindow::new(parse_utc(&raw.time_start)?, parse_utc(&raw.time_end)?)
    }
}
