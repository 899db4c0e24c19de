//! Segment classification, assigned once when a segment is spawned.

/// What a layout segment is.  Only pathways and idle locations can be
/// traversed; conveyors are terminal destinations.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SegmentKind {
    #[default]
    Pathway,
    /// Parking footprint for robots without a job.
    IdleLocation,
    /// Conveyor end where produced items are picked up.
    InputConveyor,
    /// Conveyor end where carried items are dropped off.
    OutputConveyor,
}

impl SegmentKind {
    /// `true` for segments a robot can drive across and reserve.
    #[inline]
    pub fn is_traversable(self) -> bool {
        matches!(self, SegmentKind::Pathway | SegmentKind::IdleLocation)
    }

    #[inline]
    pub fn is_conveyor(self) -> bool {
        matches!(self, SegmentKind::InputConveyor | SegmentKind::OutputConveyor)
    }

    /// Classify a host entity name.
    ///
    /// Used only by loaders that ingest legacy name-tagged layouts; the result
    /// is stored on the segment so nothing downstream inspects names again.
    pub fn infer_from_name(name: &str) -> SegmentKind {
        let lower = name.to_ascii_lowercase();
        if lower.contains("conveyor") {
            if lower.contains("output") {
                SegmentKind::OutputConveyor
            } else {
                SegmentKind::InputConveyor
            }
        } else if lower.contains("idle") {
            SegmentKind::IdleLocation
        } else {
            SegmentKind::Pathway
        }
    }

    /// Human-readable label, used for CSV column values.
    pub fn as_str(self) -> &'static str {
        match self {
            SegmentKind::Pathway        => "pathway",
            SegmentKind::IdleLocation   => "idle",
            SegmentKind::InputConveyor  => "input_conveyor",
            SegmentKind::OutputConveyor => "output_conveyor",
        }
    }
}

impl std::str::FromStr for SegmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pathway"         => Ok(SegmentKind::Pathway),
            "idle"            => Ok(SegmentKind::IdleLocation),
            "input_conveyor"  => Ok(SegmentKind::InputConveyor),
            "output_conveyor" => Ok(SegmentKind::OutputConveyor),
            other             => Err(format!("unknown segment kind `{other}`")),
        }
    }
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
