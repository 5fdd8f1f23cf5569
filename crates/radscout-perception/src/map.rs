//! [`RadiationMap`] – spatially binned sample accumulator.
//!
//! Every collected [`Sample`] is appended in collection order, its CPM is
//! filed under the grid cell nearest its pose, and the running maximum is
//! tracked with the pose it was seen at.  Cells only ever grow; nothing is
//! removed.

use std::collections::BTreeMap;

use tracing::info;

use radscout_types::{MaxRecord, Sample, SampleRecord};

/// Default cell edge length in centimetres.
pub const DEFAULT_BIN_SIZE_CM: f64 = 10.0;

/// Integer cell key: each coordinate rounded to the nearest bin edge.
pub type CellKey = (i64, i64);

/// Accumulates all samples, bins them spatially, and tracks the running
/// maximum with its pose.
#[derive(Debug, Clone)]
pub struct RadiationMap {
    bin_size_cm: f64,
    samples: Vec<Sample>,
    cells: BTreeMap<CellKey, Vec<f64>>,
    max: Option<MaxRecord>,
}

impl Default for RadiationMap {
    fn default() -> Self {
        Self::new(DEFAULT_BIN_SIZE_CM)
    }
}

impl RadiationMap {
    /// Create an empty map with the given cell size.
    pub fn new(bin_size_cm: f64) -> Self {
        Self {
            bin_size_cm,
            samples: Vec::new(),
            cells: BTreeMap::new(),
            max: None,
        }
    }

    /// Append `sample`, file its CPM under the nearest cell, and update the
    /// running maximum when the CPM strictly exceeds the stored value.
    pub fn add(&mut self, sample: Sample) {
        let key = self.cell_key(sample.pose.x, sample.pose.y);
        self.cells.entry(key).or_default().push(sample.cpm);

        let improved = match &self.max {
            Some(record) => sample.cpm > record.cpm,
            None => true,
        };
        if improved {
            info!(cpm = sample.cpm, x = sample.pose.x, y = sample.pose.y, "new radiation maximum");
            self.max = Some(MaxRecord {
                cpm: sample.cpm,
                pose: sample.pose,
            });
        }

        self.samples.push(sample);
    }

    /// The cell key for a position: each coordinate rounded to the nearest
    /// multiple of the bin size.
    pub fn cell_key(&self, x: f64, y: f64) -> CellKey {
        (
            (x / self.bin_size_cm).round() as i64,
            (y / self.bin_size_cm).round() as i64,
        )
    }

    /// Centre of a cell in world coordinates (centimetres).
    pub fn cell_center(&self, key: CellKey) -> (f64, f64) {
        (key.0 as f64 * self.bin_size_cm, key.1 as f64 * self.bin_size_cm)
    }

    /// Flat export of every sample in collection order, ready for JSON
    /// serialisation or heatmap rendering.  Read-only.
    pub fn export(&self) -> Vec<SampleRecord> {
        self.samples.iter().map(SampleRecord::from).collect()
    }

    /// The running maximum, if any sample has been collected.
    pub fn max(&self) -> Option<&MaxRecord> {
        self.max.as_ref()
    }

    /// The binned cells and their CPM readings, in key order.
    pub fn cells(&self) -> &BTreeMap<CellKey, Vec<f64>> {
        &self.cells
    }

    /// All stored samples in collection order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
