//! Synthetic two-aisle warehouse floor.
//!
//! Segments are published the way the host controller does it: one JSON
//! location list per segment kind.

use amr_core::{SegmentKind, Vec3};
use amr_spatial::{Layout, LayoutBuilder, SpatialResult};

/// Two parallel aisles of five 10 m pathways, 10 m apart.
const PATHWAYS: &str = r#"[
    {"Name": "Pathway Area",     "X": 0,     "Y": 0,     "AreaLength": 10000, "AreaWidth": 1500},
    {"Name": "Pathway Area #2",  "X": 10000, "Y": 0,     "AreaLength": 10000, "AreaWidth": 1500},
    {"Name": "Pathway Area #3",  "X": 20000, "Y": 0,     "AreaLength": 10000, "AreaWidth": 1500},
    {"Name": "Pathway Area #4",  "X": 30000, "Y": 0,     "AreaLength": 10000, "AreaWidth": 1500},
    {"Name": "Pathway Area #5",  "X": 40000, "Y": 0,     "AreaLength": 10000, "AreaWidth": 1500},
    {"Name": "Pathway Area #6",  "X": 0,     "Y": 10000, "AreaLength": 10000, "AreaWidth": 1500},
    {"Name": "Pathway Area #7",  "X": 10000, "Y": 10000, "AreaLength": 10000, "AreaWidth": 1500},
    {"Name": "Pathway Area #8",  "X": 20000, "Y": 10000, "AreaLength": 10000, "AreaWidth": 1500},
    {"Name": "Pathway Area #9",  "X": 30000, "Y": 10000, "AreaLength": 10000, "AreaWidth": 1500},
    {"Name": "Pathway Area #10", "X": 40000, "Y": 10000, "AreaLength": 10000, "AreaWidth": 1500}
]"#;

const IDLE_LOCATIONS: &str = r#"[
    {"Name": "Idle Location",    "X": 0,     "Y": 19000, "AreaLength": 3000, "AreaWidth": 1500},
    {"Name": "Idle Location #2", "X": 6000,  "Y": 19000, "AreaLength": 3000, "AreaWidth": 1500},
    {"Name": "Idle Location #3", "X": 12000, "Y": 19000, "AreaLength": 3000, "AreaWidth": 1500},
    {"Name": "Idle Location #4", "X": 18000, "Y": 19000, "AreaLength": 3000, "AreaWidth": 1500}
]"#;

const INPUT_CONVEYORS: &str = r#"[
    {"Name": "InputConveyor",    "X": -8000, "Y": 0,     "ConveyorHeight": 700},
    {"Name": "InputConveyor #2", "X": -8000, "Y": 10000, "ConveyorHeight": 700}
]"#;

const OUTPUT_CONVEYORS: &str = r#"[
    {"Name": "OutputConveyor",    "X": 48000, "Y": 0,     "ConveyorHeight": 500},
    {"Name": "OutputConveyor #2", "X": 48000, "Y": 10000, "ConveyorHeight": 500}
]"#;

/// Spawn poses, one per idle location, facing the aisles.
pub const ROBOT_SPAWNS: &str = r#"[
    {"Name": "Mobile Robot Resource",    "X": 0,     "Y": 19000, "Rz": -90},
    {"Name": "Mobile Robot Resource #2", "X": 6000,  "Y": 19000, "Rz": -90},
    {"Name": "Mobile Robot Resource #3", "X": 12000, "Y": 19000, "Rz": -90},
    {"Name": "Mobile Robot Resource #4", "X": 18000, "Y": 19000, "Rz": -90}
]"#;

/// Fallback spawn origin for robots missing from [`ROBOT_SPAWNS`].
pub const SPAWN_ORIGIN: Vec3 = Vec3::planar(0.0, 22_000.0);

pub fn build_layout() -> SpatialResult<Layout> {
    let mut b = LayoutBuilder::new();
    b.add_location_list(PATHWAYS, SegmentKind::Pathway)?;
    b.add_location_list(IDLE_LOCATIONS, SegmentKind::IdleLocation)?;
    b.add_location_list(INPUT_CONVEYORS, SegmentKind::InputConveyor)?;
    b.add_location_list(OUTPUT_CONVEYORS, SegmentKind::OutputConveyor)?;
    Ok(b.build())
}
