//! # Output artifacts
//!
//! Every run leaves plain-text tables behind, one file per table, each starting with a
//! generation line:
//!
//! ```text
//! Covered occultations (UTC): 2025-06-03 09:12:44 UTC
//!
//!  ingress              egress
//!  2024-01-01 00:10:00  2024-01-01 00:20:00
//! ```
//!
//! Columns are separated by at least two spaces, left aligned, without borders. Tables are
//! built with [`comfy-table`], which also renders the boxed variant printed on the terminal
//! ([`TableArtifact::render_terminal`]).
//!
//! Tables meant to be read back by a later run (the covered windows and the derived wide
//! table) also get a CSV sidecar, see [`write_csv`] / [`read_csv`].
//!
//! [`comfy-table`]: https://crates.io/crates/comfy-table
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, TimeDelta, Utc};
use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Row, Table};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::alignment::{AlignedRecord, AlignmentStats};
use crate::coverage::{CorrectedPass, OccultationWindow};
use crate::radiocc_errors::RadioccError;
use crate::time::{fmt_isoc, fmt_table, generation_stamp};

pub mod rows;

pub use rows::{scatter_points, OccultationRow, ScatterPoint, Series, Subset};

pub const PASSES_FILE: &str = "opsweb_passes.txt";
pub const OCCULTATIONS_FILE: &str = "opsweb_occultations.txt";
pub const COVERED_FILE: &str = "opsweb_covered.txt";
pub const SPICE_FILE: &str = "occultations_spice.txt";
pub const ALIGNED_FILE: &str = "aligned_occultations.txt";
pub const COVERED_CSV: &str = "covered.csv";
pub const SPICE_CSV: &str = "occultations_spice.csv";
pub const SCATTER_CSV: &str = "scatter_points.csv";

/// A titled table of preformatted cells.
#[derive(Debug, Clone, PartialEq)]
pub struct TableArtifact {
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableArtifact {
    pub fn new<S, I>(title: impl Into<String>, header: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        TableArtifact {
            title: title.into(),
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Borderless table followed by the generation line, as written to disk.
    pub fn render_plain(&self, generated: &DateTime<Utc>) -> String {
        let mut table = Table::new();
        table.load_preset(presets::NOTHING);
        table.set_header(self.header.iter().map(Cell::new));
        for r in &self.rows {
            table.add_row(r.iter().map(Cell::new));
        }

        let mut out = format!("{}: {}\n\n", self.title, generation_stamp(generated));
        for line in table.to_string().lines() {
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }

    /// Boxed table for the terminal.
    pub fn render_terminal(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(self.header.iter().map(Cell::new));
        for r in &self.rows {
            table.add_row(Row::from(
                r.iter()
                    .map(|c| Cell::new(c).set_alignment(CellAlignment::Right))
                    .collect::<Vec<_>>(),
            ));
        }
        format!("{} (n={})\n{table}", self.title, self.len())
    }

    /// Write [`Self::render_plain`] to `dir/file_name` and return the path.
    pub fn write_to(
        &self,
        dir: &Utf8Path,
        file_name: &str,
        generated: &DateTime<Utc>,
    ) -> Result<Utf8PathBuf, RadioccError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(file_name);
        fs::write(&path, self.render_plain(generated))?;
        info!(%path, rows = self.len(), "artifact written");
        Ok(path)
    }
}

fn deg(v: f64) -> String {
    format!("{v:.6}")
}

fn secs(d: TimeDelta) -> String {
    format!("{:.3}", d.num_milliseconds() as f64 / 1000.0)
}

/// Passes kept after exclusions, with their light-time corrected bounds.
pub fn passes_table(passes: &[CorrectedPass]) -> TableArtifact {
    let mut t = TableArtifact::new(
        "Valid passes (UTC)",
        [
            "groundstation",
            "time_start",
            "time_end",
            "owlt (s)",
            "mspa",
            "time_start_corr",
            "time_end_corr",
        ],
    );
    for p in passes {
        t.push_row(vec![
            p.pass.groundstation.clone(),
            fmt_table(&p.pass.start),
            fmt_table(&p.pass.end),
            secs(p.pass.owlt),
            p.pass.mspa.to_string(),
            fmt_table(&p.start_corr()),
            fmt_table(&p.end_corr()),
        ]);
    }
    t
}

/// Every reported occultation.
pub fn occultations_table(windows: &[OccultationWindow]) -> TableArtifact {
    let mut t = TableArtifact::new("All occultations (UTC)", ["time_start", "time_end"]);
    for w in windows {
        t.push_row(vec![fmt_table(&w.ingress), fmt_table(&w.egress)]);
    }
    t
}

/// Occultations fully covered by passes.
pub fn covered_table(windows: &[OccultationWindow]) -> TableArtifact {
    let mut t = TableArtifact::new("Covered occultations (UTC)", ["ingress", "egress"]);
    for w in windows {
        t.push_row(vec![fmt_table(&w.ingress), fmt_table(&w.egress)]);
    }
    t
}

/// Wide table of geometry-derived occultations.
pub fn wide_table(rows: &[OccultationRow]) -> TableArtifact {
    let mut t = TableArtifact::new("Created on (UTC)", OccultationRow::HEADER);
    for r in rows {
        t.push_row(vec![
            fmt_isoc(&r.ingress_utc, 3),
            deg(r.ingress_lat),
            deg(r.ingress_lon),
            deg(r.ingress_sza),
            deg(r.ingress_ls),
            fmt_isoc(&r.egress_utc, 3),
            deg(r.egress_lat),
            deg(r.egress_lon),
            deg(r.egress_sza),
            deg(r.egress_ls),
        ]);
    }
    t
}

/// Column set of [`aligned_table`].
pub const ALIGNED_HEADER: [&str; 10] = [
    "Ingress UTC",
    "Ingress Lat (deg)",
    "Ingress SZA (deg)",
    "Ingress Ls (deg)",
    "Egress UTC",
    "Egress Lat (deg)",
    "Egress SZA (deg)",
    "Egress Ls (deg)",
    "Reported ingress",
    "Offset (s)",
];

/// Derived occultations matched with a reported window.
pub fn aligned_table(records: &[AlignedRecord<OccultationRow>]) -> TableArtifact {
    let mut t = TableArtifact::new("Aligned occultations (UTC)", ALIGNED_HEADER);
    for rec in records {
        let r = &rec.derived;
        t.push_row(vec![
            fmt_isoc(&r.ingress_utc, 3),
            deg(r.ingress_lat),
            deg(r.ingress_sza),
            deg(r.ingress_ls),
            fmt_isoc(&r.egress_utc, 3),
            deg(r.egress_lat),
            deg(r.egress_sza),
            deg(r.egress_ls),
            fmt_table(&rec.reported.ingress),
            secs(rec.offset),
        ]);
    }
    t
}

/// Terminal summary of an alignment run.
pub fn stats_table(stats: &AlignmentStats) -> String {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.set_header(vec!["Occultations in derived set", "Occultations covered", "Percent"]);
    table.add_row(vec![
        Cell::new(stats.in_scope).set_alignment(CellAlignment::Right),
        Cell::new(stats.matched).set_alignment(CellAlignment::Right),
        Cell::new(format!("{:.1}%", stats.percent())).set_alignment(CellAlignment::Right),
    ]);
    table.to_string()
}

/// Serialize `rows` to a CSV file with a header line.
pub fn write_csv<T: Serialize>(path: &Utf8Path, rows: &[T]) -> Result<(), RadioccError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for r in rows {
        writer.serialize(r)?;
    }
    writer.flush()?;
    info!(%path, rows = rows.len(), "csv written");
    Ok(())
}

/// Read back a CSV file written by [`write_csv`].
pub fn read_csv<T: DeserializeOwned>(path: &Utf8Path) -> Result<Vec<T>, RadioccError> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<Result<Vec<T>, csv::Error>>()?;
    Ok(rows)
}
