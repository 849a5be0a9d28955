//! In-memory particle tables and their JSON/CSV encodings.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use twiss_core::errors::TwissError;
use twiss_core::{ParticleRecord, ParticleSource};

use crate::serde::{from_json_slice, to_pretty_json};

/// Particle records grouped by fill pass and sampler.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParticleTable {
    samplers: Vec<String>,
    passes: Vec<BTreeMap<String, Vec<ParticleRecord>>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TableFile {
    #[serde(default)]
    samplers: Vec<String>,
    passes: Vec<BTreeMap<String, Vec<ParticleRecord>>>,
}

/// One CSV line: the pass and sampler followed by the record columns.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    pass: u64,
    sampler: String,
    parent_id: i32,
    turn: i32,
    zp: f64,
    x: f64,
    xp: f64,
    y: f64,
    yp: f64,
    energy: f64,
    t: f64,
    s: f64,
}

impl ParticleTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends records observed by `sampler` during `pass`.
    ///
    /// `pass` may name an existing pass or open the next one; skipping ahead is
    /// an input error. Samplers keep their first-seen order.
    pub fn extend<I>(&mut self, pass: usize, sampler: &str, records: I) -> Result<(), TwissError>
    where
        I: IntoIterator<Item = ParticleRecord>,
    {
        if pass > self.passes.len() {
            return Err(
                TwissError::input("pass-out-of-range", "fill passes must be added in order")
                    .with_context("pass", pass.to_string())
                    .with_context("passes", self.passes.len().to_string()),
            );
        }
        if pass == self.passes.len() {
            self.passes.push(BTreeMap::new());
        }
        if !self.samplers.iter().any(|name| name == sampler) {
            self.samplers.push(sampler.to_string());
        }
        self.passes[pass]
            .entry(sampler.to_string())
            .or_default()
            .extend(records);
        Ok(())
    }

    /// Appends a single record.
    pub fn push(
        &mut self,
        pass: usize,
        sampler: &str,
        record: ParticleRecord,
    ) -> Result<(), TwissError> {
        self.extend(pass, sampler, std::iter::once(record))
    }

    /// Total number of stored records.
    pub fn len(&self) -> usize {
        self.passes
            .iter()
            .flat_map(|pass| pass.values())
            .map(Vec::len)
            .sum()
    }

    /// Returns true when no record is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes the JSON layout `{"samplers": [...], "passes": [{"name": [records]}]}`.
    ///
    /// Samplers missing from the `samplers` list are appended in order of first appearance.
    pub fn from_json_slice(data: &[u8]) -> Result<Self, TwissError> {
        let file: TableFile = from_json_slice(data)?;
        let mut samplers = file.samplers;
        for pass in &file.passes {
            for name in pass.keys() {
                if !samplers.contains(name) {
                    samplers.push(name.clone());
                }
            }
        }
        Ok(Self {
            samplers,
            passes: file.passes,
        })
    }

    /// Encodes the table as pretty JSON.
    pub fn to_json_string(&self) -> Result<String, TwissError> {
        to_pretty_json(&TableFile {
            samplers: self.samplers.clone(),
            passes: self.passes.clone(),
        })
    }

    /// Reads CSV with a header row `pass,sampler,parent_id,turn,zp,x,xp,y,yp,energy,t,s`.
    ///
    /// Pass labels are arbitrary unsigned integers; the distinct labels, sorted,
    /// become passes `0..k`, so unused labels in between do not create empty passes.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, TwissError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut rows = Vec::new();
        for (line, row) in csv_reader.deserialize::<CsvRow>().enumerate() {
            let row = row.map_err(|err| {
                TwissError::input("csv_row", err.to_string())
                    .with_context("row", (line + 1).to_string())
            })?;
            rows.push(row);
        }
        let labels: BTreeSet<u64> = rows.iter().map(|row| row.pass).collect();
        let dense: BTreeMap<u64, usize> = labels
            .into_iter()
            .enumerate()
            .map(|(index, label)| (label, index))
            .collect();

        let mut table = Self::new();
        table.passes.resize_with(dense.len(), BTreeMap::new);
        for row in rows {
            let pass = dense[&row.pass];
            let record = ParticleRecord {
                parent_id: row.parent_id,
                turn: row.turn,
                zp: row.zp,
                x: row.x,
                xp: row.xp,
                y: row.y,
                yp: row.yp,
                energy: row.energy,
                t: row.t,
                s: row.s,
            };
            table.push(pass, &row.sampler, record)?;
        }
        Ok(table)
    }

    /// Writes the table as CSV, pass by pass and sampler by sampler.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), TwissError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for (pass, records) in self.passes.iter().enumerate() {
            for sampler in &self.samplers {
                for record in records.get(sampler).into_iter().flatten() {
                    csv_writer
                        .serialize(CsvRow {
                            pass: pass as u64,
                            sampler: sampler.clone(),
                            parent_id: record.parent_id,
                            turn: record.turn,
                            zp: record.zp,
                            x: record.x,
                            xp: record.xp,
                            y: record.y,
                            yp: record.yp,
                            energy: record.energy,
                            t: record.t,
                            s: record.s,
                        })
                        .map_err(|err| TwissError::input("csv_write", err.to_string()))?;
                }
            }
        }
        csv_writer
            .flush()
            .map_err(|err| TwissError::input("csv_flush", err.to_string()))
    }

    /// Loads a table from disk; `.csv` files are read as CSV, everything else as JSON.
    pub fn load(path: &Path) -> Result<Self, TwissError> {
        let bytes = fs::read(path).map_err(|err| {
            TwissError::input("particle_read", err.to_string())
                .with_context("path", path.display().to_string())
        })?;
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if is_csv {
            Self::from_csv_reader(bytes.as_slice())
        } else {
            Self::from_json_slice(&bytes)
        }
    }

    /// Writes the table to disk, choosing the encoding from the extension.
    pub fn save(&self, path: &Path) -> Result<(), TwissError> {
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        let write_error = |err: std::io::Error| {
            TwissError::input("particle_write", err.to_string())
                .with_context("path", path.display().to_string())
        };
        if is_csv {
            let file = fs::File::create(path).map_err(write_error)?;
            self.write_csv(file)
        } else {
            fs::write(path, self.to_json_string()?).map_err(write_error)
        }
    }
}

impl ParticleSource for ParticleTable {
    fn samplers(&self) -> Box<dyn ExactSizeIterator<Item = &str> + '_> {
        Box::new(self.samplers.iter().map(String::as_str))
    }

    fn pass_count(&self) -> usize {
        self.passes.len()
    }

    fn records(&self, sampler: &str, pass: usize) -> Result<&[ParticleRecord], TwissError> {
        if !self.samplers.iter().any(|name| name == sampler) {
            return Err(
                TwissError::sampler("unknown-sampler", "no such sampler in the particle table")
                    .with_context("sampler", sampler),
            );
        }
        let records = self.passes.get(pass).ok_or_else(|| {
            TwissError::input("pass-out-of-range", "fill pass does not exist")
                .with_context("pass", pass.to_string())
                .with_context("passes", self.passes.len().to_string())
        })?;
        Ok(records.get(sampler).map(Vec::as_slice).unwrap_or(&[]))
    }
}
