//! Factory layout: the fixed set of segments robots drive on and dock at.
//!
//! # Data layout
//!
//! Segments are stored in a dense `Vec` indexed by `SegmentId`, with a
//! name → id map for resolving externally supplied targets.  Segments are
//! immutable once the layout is built.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over segment centers answers the "which footprints
//! are near this point" queries used by the planner, intersection detection,
//! and the collision pass.

use std::collections::HashMap;

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use amr_core::{Footprint, SegmentId, SegmentKind, Vec3};

use crate::{SpatialError, SpatialResult};

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone)]
struct SegmentEntry {
    point: [f64; 2],
    id:    SegmentId,
}

impl RTreeObject for SegmentEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for SegmentEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── Segment ───────────────────────────────────────────────────────────────────

/// One named footprint in the layout.
#[derive(Clone, Debug)]
pub struct Segment {
    pub name:           String,
    pub kind:           SegmentKind,
    pub footprint:      Footprint,
    /// Height of the conveyor surface above the floor.  Zero for pathways.
    pub surface_height: f64,
}

impl Segment {
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.footprint.center
    }
}

// ── Layout ────────────────────────────────────────────────────────────────────

/// All segments plus lookup structures.  Build with [`LayoutBuilder`].
pub struct Layout {
    pub segments: Vec<Segment>,
    by_name:      HashMap<String, SegmentId>,
    spatial_idx:  RTree<SegmentEntry>,
}

impl Layout {
    pub fn empty() -> Self {
        LayoutBuilder::new().build()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = SegmentId> + '_ {
        (0..self.segments.len()).map(|i| SegmentId(i as u32))
    }

    // ── Per-segment accessors ─────────────────────────────────────────────

    #[inline]
    pub fn segment(&self, id: SegmentId) -> &Segment {
        &self.segments[id.index()]
    }

    #[inline]
    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.index())
    }

    #[inline]
    pub fn footprint(&self, id: SegmentId) -> &Footprint {
        &self.segments[id.index()].footprint
    }

    #[inline]
    pub fn position(&self, id: SegmentId) -> Vec3 {
        self.segments[id.index()].footprint.center
    }

    #[inline]
    pub fn kind(&self, id: SegmentId) -> SegmentKind {
        self.segments[id.index()].kind
    }

    #[inline]
    pub fn name(&self, id: SegmentId) -> &str {
        &self.segments[id.index()].name
    }

    /// Resolve an externally supplied segment name.
    pub fn lookup(&self, name: &str) -> Option<SegmentId> {
        self.by_name.get(name.trim()).copied()
    }

    /// Like [`lookup`](Self::lookup) but an error for unknown names.
    pub fn require(&self, name: &str) -> SpatialResult<SegmentId> {
        self.lookup(name).ok_or_else(|| SpatialError::UnknownSegment(name.to_string()))
    }

    // ── Kind filters ──────────────────────────────────────────────────────

    pub fn traversable(&self) -> impl Iterator<Item = SegmentId> + '_ {
        self.ids().filter(|&id| self.kind(id).is_traversable())
    }

    pub fn of_kind(&self, kind: SegmentKind) -> impl Iterator<Item = SegmentId> + '_ {
        self.ids().filter(move |&id| self.kind(id) == kind)
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Segments whose center lies strictly within `radius` of `pos`, in
    /// ascending id order.
    pub fn within(&self, pos: Vec3, radius: f64) -> Vec<SegmentId> {
        let mut out: Vec<SegmentId> = self
            .spatial_idx
            .locate_within_distance([pos.x, pos.y], radius * radius)
            .filter(|e| e.distance_2(&[pos.x, pos.y]) < radius * radius)
            .map(|e| e.id)
            .collect();
        out.sort_unstable();
        out
    }

    /// Count of pathway and idle footprints centered within `radius` of `pos`.
    pub fn count_traversable_within(&self, pos: Vec3, radius: f64) -> usize {
        self.within(pos, radius)
            .into_iter()
            .filter(|&id| self.kind(id).is_traversable())
            .count()
    }

    /// `true` when more than `threshold` traversable footprints cluster around
    /// `pos`, i.e. the point sits at a junction of several pathways.
    pub fn is_intersection(&self, pos: Vec3, radius: f64, threshold: usize) -> bool {
        self.count_traversable_within(pos, radius) > threshold
    }

    /// The first traversable segment whose footprint contains `pos`.
    pub fn containing(&self, pos: Vec3) -> Option<SegmentId> {
        self.traversable().find(|&id| self.footprint(id).contains(pos))
    }

    /// Segment with the center nearest to `pos`.
    pub fn nearest(&self, pos: Vec3) -> Option<SegmentId> {
        self.spatial_idx.nearest_neighbor(&[pos.x, pos.y]).map(|e| e.id)
    }
}

// ── LayoutBuilder ─────────────────────────────────────────────────────────────

/// Construct a [`Layout`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use amr_core::{SegmentKind, Vec3};
/// use amr_spatial::LayoutBuilder;
///
/// let mut b = LayoutBuilder::new();
/// b.add_pathway("Pathway Area", Vec3::planar(0.0, 0.0), 0.0, 4000.0, 1000.0).unwrap();
/// b.add_conveyor("Conveyor Input", SegmentKind::InputConveyor,
///                Vec3::planar(6000.0, 0.0), 0.0, 2000.0, 600.0, 700.0).unwrap();
/// let layout = b.build();
/// assert_eq!(layout.len(), 2);
/// assert!(layout.lookup("Conveyor Input").is_some());
/// ```
pub struct LayoutBuilder {
    segments: Vec<Segment>,
    by_name:  HashMap<String, SegmentId>,
}

impl LayoutBuilder {
    pub fn new() -> Self {
        Self { segments: Vec::new(), by_name: HashMap::new() }
    }

    /// Add a fully specified segment.  Names must be unique.
    pub fn add_segment(&mut self, segment: Segment) -> SpatialResult<SegmentId> {
        if self.by_name.contains_key(&segment.name) {
            return Err(SpatialError::DuplicateSegment(segment.name));
        }
        let id = SegmentId(self.segments.len() as u32);
        self.by_name.insert(segment.name.clone(), id);
        self.segments.push(segment);
        Ok(id)
    }

    /// Add a symmetric pathway `length` long and `width` wide, centered at
    /// `center` and rotated `heading_deg` about Z.
    pub fn add_pathway(
        &mut self,
        name: &str,
        center: Vec3,
        heading_deg: f64,
        length: f64,
        width: f64,
    ) -> SpatialResult<SegmentId> {
        self.add_area(name, SegmentKind::Pathway, center, heading_deg, length, width)
    }

    pub fn add_idle_location(
        &mut self,
        name: &str,
        center: Vec3,
        heading_deg: f64,
        length: f64,
        width: f64,
    ) -> SpatialResult<SegmentId> {
        self.add_area(name, SegmentKind::IdleLocation, center, heading_deg, length, width)
    }

    /// Add a conveyor end.  Its footprint spans `length / 2` either side of
    /// `center`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_conveyor(
        &mut self,
        name: &str,
        kind: SegmentKind,
        center: Vec3,
        heading_deg: f64,
        length: f64,
        width: f64,
        height: f64,
    ) -> SpatialResult<SegmentId> {
        let footprint = Footprint::new(
            center,
            Vec3::from_heading_deg(heading_deg),
            length / 2.0,
            length / 2.0,
            width,
            width,
        );
        self.add_segment(Segment { name: name.to_string(), kind, footprint, surface_height: height })
    }

    fn add_area(
        &mut self,
        name: &str,
        kind: SegmentKind,
        center: Vec3,
        heading_deg: f64,
        length: f64,
        width: f64,
    ) -> SpatialResult<SegmentId> {
        let footprint = Footprint::new(
            center,
            Vec3::from_heading_deg(heading_deg),
            length / 2.0,
            length / 2.0,
            width,
            width,
        );
        self.add_segment(Segment { name: name.to_string(), kind, footprint, surface_height: 0.0 })
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Consume the builder and bulk-load the spatial index.
    pub fn build(self) -> Layout {
        let entries: Vec<SegmentEntry> = self
            .segments
            .iter()
            .enumerate()
            .map(|(i, s)| SegmentEntry {
                point: [s.footprint.center.x, s.footprint.center.y],
                id:    SegmentId(i as u32),
            })
            .collect();
        Layout {
            segments:    self.segments,
            by_name:     self.by_name,
            spatial_idx: RTree::bulk_load(entries),
        }
    }
}

impl Default for LayoutBuilder {
    fn default() -> Self {
        Self::new()
    }
}
