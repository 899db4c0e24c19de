//! Layout loading.
//!
//! # CSV format
//!
//! One row per segment.  `kind` may be empty, in which case it is inferred
//! from the name once at load time.
//!
//! ```csv
//! name,kind,x,y,heading_deg,length_back,length_front,width_near,width_far,surface_height
//! Pathway Area,pathway,0,0,0,2000,2000,1000,1000,0
//! Pathway Area #2,,6000,0,90,2000,2000,1000,1000,0
//! Conveyor Input,input_conveyor,12000,0,0,1000,1000,600,600,700
//! ```
//!
//! # Location lists
//!
//! The external controller publishes spawn lists as JSON arrays of
//! `{"Name", "X", "Y", "Z", "Rz", ...}` objects.  A list that fails to
//! parse is treated as "no data yet" and yields an empty `Vec`.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use amr_core::{DEFAULT_WIDTH, Footprint, SegmentId, SegmentKind, Vec3};

use crate::{Layout, LayoutBuilder, Segment, SpatialError, SpatialResult};

/// Length of a pathway or idle area whose record omits `AreaLength`.
const DEFAULT_AREA_LENGTH: f64 = 4_000.0;
const DEFAULT_CONVEYOR_LENGTH: f64 = 2_000.0;
const DEFAULT_CONVEYOR_WIDTH: f64 = 600.0;
const DEFAULT_CONVEYOR_HEIGHT: f64 = 700.0;

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SegmentRecord {
    name:           String,
    #[serde(default)]
    kind:           String,
    x:              f64,
    y:              f64,
    heading_deg:    f64,
    length_back:    f64,
    length_front:   f64,
    width_near:     f64,
    width_far:      f64,
    surface_height: Option<f64>,
}

// ── Public API ────────────────────────────────────────────────────────────────

pub fn load_layout_csv(path: &Path) -> SpatialResult<Layout> {
    let file = std::fs::File::open(path)?;
    load_layout_reader(file)
}

/// Like [`load_layout_csv`] but accepts any `Read` source.
pub fn load_layout_reader<R: Read>(reader: R) -> SpatialResult<Layout> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut builder = LayoutBuilder::new();

    for result in csv_reader.deserialize::<SegmentRecord>() {
        let row = result.map_err(|e| SpatialError::Parse(e.to_string()))?;
        let kind = if row.kind.trim().is_empty() {
            SegmentKind::infer_from_name(&row.name)
        } else {
            row.kind.parse().map_err(SpatialError::Parse)?
        };
        let footprint = Footprint::new(
            Vec3::planar(row.x, row.y),
            Vec3::from_heading_deg(row.heading_deg),
            row.length_back,
            row.length_front,
            row.width_near,
            row.width_far,
        );
        builder.add_segment(Segment {
            name: row.name,
            kind,
            footprint,
            surface_height: row.surface_height.unwrap_or(0.0),
        })?;
    }

    Ok(builder.build())
}

// ── Location lists ────────────────────────────────────────────────────────────

/// One entry of an externally supplied spawn list.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocationRecord {
    pub name:            String,
    #[serde(default)]
    pub x:               f64,
    #[serde(default)]
    pub y:               f64,
    #[serde(default)]
    pub z:               f64,
    /// Rotation about Z in degrees.
    #[serde(default)]
    pub rz:              f64,
    pub area_length:     Option<f64>,
    pub area_width:      Option<f64>,
    pub conveyor_length: Option<f64>,
    pub conveyor_width:  Option<f64>,
    pub conveyor_height: Option<f64>,
}

impl LocationRecord {
    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Parse a JSON location list.  Malformed input yields an empty list.
pub fn parse_location_list(raw: &str) -> Vec<LocationRecord> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "[]" {
        return Vec::new();
    }
    match serde_json::from_str(trimmed) {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed location list");
            Vec::new()
        }
    }
}

impl LayoutBuilder {
    /// Spawn one segment of `kind` from a location-list entry.
    pub fn add_location(&mut self, rec: &LocationRecord, kind: SegmentKind) -> SpatialResult<SegmentId> {
        if kind.is_conveyor() {
            self.add_conveyor(
                &rec.name,
                kind,
                rec.position(),
                rec.rz,
                rec.conveyor_length.unwrap_or(DEFAULT_CONVEYOR_LENGTH),
                rec.conveyor_width.unwrap_or(DEFAULT_CONVEYOR_WIDTH),
                rec.conveyor_height.unwrap_or(DEFAULT_CONVEYOR_HEIGHT),
            )
        } else {
            let length = rec.area_length.unwrap_or(DEFAULT_AREA_LENGTH);
            let width = rec.area_width.unwrap_or(DEFAULT_WIDTH);
            match kind {
                SegmentKind::IdleLocation => {
                    self.add_idle_location(&rec.name, rec.position(), rec.rz, length, width)
                }
                _ => self.add_pathway(&rec.name, rec.position(), rec.rz, length, width),
            }
        }
    }

    /// Spawn every entry of a location list as `kind`.  Returns the new ids.
    pub fn add_location_list(&mut self, raw: &str, kind: SegmentKind) -> SpatialResult<Vec<SegmentId>> {
        parse_location_list(raw).iter().map(|rec| self.add_location(rec, kind)).collect()
    }
}
