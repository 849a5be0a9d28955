use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use twiss_core::errors::TwissError;
use twiss_core::provenance::{RunProvenance, SchemaVersion};
use twiss_core::Plane;

use crate::hash::stable_hash_string;
use crate::optics::{OpticalQuantity, PlaneOptics, PlaneStatus};
use crate::serde::{from_json_slice, to_pretty_json};

/// Optics of all three planes at one sampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerOptics {
    /// Sampler name.
    pub sampler: String,
    /// Horizontal, vertical and longitudinal results.
    pub planes: Vec<PlaneOptics>,
}

impl SamplerOptics {
    /// Returns the result of one plane.
    pub fn plane(&self, plane: Plane) -> Option<&PlaneOptics> {
        self.planes.iter().find(|optics| optics.plane == plane)
    }

    /// True when every plane finished without a degenerate status.
    pub fn is_ok(&self) -> bool {
        self.planes
            .iter()
            .all(|optics| optics.status == PlaneStatus::Ok)
    }
}

/// Aggregate result of an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpticsReport {
    /// Schema of this payload.
    pub schema_version: SchemaVersion,
    /// Inputs and settings the report was derived from.
    pub provenance: RunProvenance,
    /// Per-sampler results in source order.
    pub samplers: Vec<SamplerOptics>,
    /// Hash over the canonical JSON of every other field.
    pub report_hash: String,
}

impl OpticsReport {
    /// Builds a report and stamps its hash.
    pub fn new(provenance: RunProvenance, samplers: Vec<SamplerOptics>) -> Result<Self, TwissError> {
        let mut report = Self {
            schema_version: SchemaVersion::default(),
            provenance,
            samplers,
            report_hash: String::new(),
        };
        report.report_hash = report.compute_hash()?;
        Ok(report)
    }

    /// Recomputes the hash with `report_hash` blanked.
    pub fn compute_hash(&self) -> Result<String, TwissError> {
        let mut unstamped = self.clone();
        unstamped.report_hash.clear();
        stable_hash_string(&unstamped)
    }

    /// Looks up the optics of one sampler.
    pub fn sampler(&self, name: &str) -> Option<&SamplerOptics> {
        self.samplers.iter().find(|optics| optics.sampler == name)
    }

    /// Pretty JSON; non-finite numbers are written as `null`.
    pub fn to_json_string(&self) -> Result<String, TwissError> {
        to_pretty_json(self)
    }

    /// Parses a report previously written with [`OpticsReport::to_json_string`].
    pub fn from_json_slice(data: &[u8]) -> Result<Self, TwissError> {
        from_json_slice(data)
    }

    /// Writes one CSV row per sampler and plane: values first, then errors.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), TwissError> {
        let mut wtr = csv::Writer::from_writer(writer);
        let mut header = vec!["sampler".to_string(), "plane".to_string()];
        header.extend(OpticalQuantity::ALL.iter().map(|q| q.label().to_string()));
        header.extend(
            OpticalQuantity::ALL
                .iter()
                .map(|q| format!("sigma_{}", q.label())),
        );
        header.push("xy_correlation".to_string());
        header.push("status".to_string());
        wtr.write_record(&header)
            .map_err(|err| TwissError::serde("report_csv", err.to_string()))?;

        for sampler in &self.samplers {
            for optics in &sampler.planes {
                let mut row = vec![sampler.sampler.clone(), optics.plane.label().to_string()];
                row.extend(optics.values.to_array().iter().map(f64::to_string));
                row.extend(optics.errors.to_array().iter().map(f64::to_string));
                row.push(optics.xy_correlation.to_string());
                row.push(status_label(optics.status).to_string());
                wtr.write_record(&row)
                    .map_err(|err| TwissError::serde("report_csv", err.to_string()))?;
            }
        }
        wtr.flush().map_err(|err| TwissError::serde("report_csv", err.to_string()))
    }

    /// Writes the report to `path`; a `.csv` extension selects the table form.
    pub fn save(&self, path: &Path) -> Result<(), TwissError> {
        let with_path = |err: std::io::Error| {
            TwissError::serde("report_write", err.to_string())
                .with_context("path", path.display().to_string())
        };
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if is_csv {
            let file = fs::File::create(path).map_err(with_path)?;
            self.write_csv(file)
        } else {
            fs::write(path, self.to_json_string()?).map_err(with_path)
        }
    }
}

fn status_label(status: PlaneStatus) -> &'static str {
    match status {
        PlaneStatus::Ok => "ok",
        PlaneStatus::InsufficientStatistics => "insufficient-statistics",
        PlaneStatus::IllConditioned => "ill-conditioned",
    }
}
