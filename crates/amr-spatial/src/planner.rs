//! Planning trait and the default reservation-aware A* planner.
//!
//! # Pluggability
//!
//! `amr-sim` plans through the [`Planner`] trait, and planners query lease
//! state through the [`Availability`] seam, so the reservation service can
//! be swapped or mocked without touching the search.
//!
//! # Search graph
//!
//! Nodes are the robot's current position (a zero-size start node), every
//! traversable segment, and the goal segment (which may be a conveyor).  Any
//! two nodes whose centers lie within `max_adjacency` are connected; there
//! are no explicit edges.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use amr_core::{PlannerConfig, RobotId, SegmentId, SimTime, Vec3};

use crate::Layout;

// ── Seams ─────────────────────────────────────────────────────────────────────

/// Lease lookup used while planning.  Takes `&mut self` because lookups
/// purge expired leases.
pub trait Availability {
    fn is_available(&mut self, segment: SegmentId, robot: RobotId, now: SimTime) -> bool;
}

/// What the planner needs to know about another robot.
#[derive(Clone, Copy, Debug)]
pub struct FleetPeer<'a> {
    pub robot:         RobotId,
    pub position:      Vec3,
    /// Segments this robot is committed to traverse.
    pub planned:       &'a [SegmentId],
    pub next_location: Option<SegmentId>,
}

#[derive(Clone, Copy, Debug)]
pub struct PlanRequest<'a> {
    pub robot: RobotId,
    pub start: Vec3,
    pub goal:  SegmentId,
    pub now:   SimTime,
    pub peers: &'a [FleetPeer<'a>],
}

// ── Route ─────────────────────────────────────────────────────────────────────

/// Segments from the first hop after the start position through the goal.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub segments: Vec<SegmentId>,
    pub cost:     f64,
}

impl Route {
    /// Split into the traversable prefix and a trailing conveyor destination.
    ///
    /// Conveyors are never driven across, so any conveyor in the route is
    /// dropped from the traversable list; the goal is returned separately
    /// when it is one.
    pub fn into_legs(self, layout: &Layout) -> (Vec<SegmentId>, Option<SegmentId>) {
        let conveyor = self
            .segments
            .last()
            .copied()
            .filter(|&s| layout.kind(s).is_conveyor());
        let pathways = self
            .segments
            .into_iter()
            .filter(|&s| layout.kind(s).is_traversable())
            .collect();
        (pathways, conveyor)
    }
}

// ── Planner trait ─────────────────────────────────────────────────────────────

/// Pluggable route planner.
///
/// Implementations must be deterministic: identical layout, lease state,
/// and request yield the same route.
pub trait Planner: Send + Sync {
    /// Returns `None` when the goal is unreachable under current leases.
    fn plan(
        &self,
        layout: &Layout,
        request: &PlanRequest<'_>,
        availability: &mut dyn Availability,
    ) -> Option<Route>;
}

// ── ReservationAwarePlanner ───────────────────────────────────────────────────

/// Best-first search with a straight-line heuristic.  Neighbors that are
/// leased to another robot, or that lie on another robot's committed route
/// while that robot is nearby, are skipped.  Edge cost is center distance
/// plus density and contention penalties.
pub struct ReservationAwarePlanner {
    pub config: PlannerConfig,
}

impl ReservationAwarePlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }
}

impl Default for ReservationAwarePlanner {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

impl Planner for ReservationAwarePlanner {
    fn plan(
        &self,
        layout: &Layout,
        request: &PlanRequest<'_>,
        availability: &mut dyn Availability,
    ) -> Option<Route> {
        let route = a_star(&self.config, layout, request, availability);
        if route.is_none() {
            tracing::debug!(robot = %request.robot, goal = %request.goal, "no route");
        }
        route
    }
}

// ── A* internals ──────────────────────────────────────────────────────────────

/// Heap entry ordered by ascending `f`, then ascending insertion sequence.
struct Open {
    f:    f64,
    seq:  u64,
    node: usize,
}

impl PartialEq for Open {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Open {}

impl PartialOrd for Open {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Open {
    // Reversed so `BinaryHeap` (a max-heap) pops the smallest `f` first.
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.total_cmp(&self.f).then_with(|| other.seq.cmp(&self.seq))
    }
}

fn a_star(
    config: &PlannerConfig,
    layout: &Layout,
    request: &PlanRequest<'_>,
    availability: &mut dyn Availability,
) -> Option<Route> {
    if layout.get(request.goal).is_none() {
        return None;
    }

    // Node `i < n` is `SegmentId(i)`; node `n` is the start position.
    let n = layout.len();
    let start = n;
    let goal = request.goal.index();
    let goal_pos = layout.position(request.goal);
    let pos = |node: usize| if node == start { request.start } else { layout.position(SegmentId(node as u32)) };

    let candidates: Vec<SegmentId> = layout
        .ids()
        .filter(|&s| s == request.goal || layout.kind(s).is_traversable())
        .collect();
    let peers: Vec<&FleetPeer<'_>> =
        request.peers.iter().filter(|p| p.robot != request.robot).collect();

    let mut g = vec![f64::INFINITY; n + 1];
    let mut prev = vec![usize::MAX; n + 1];
    let mut heap = BinaryHeap::new();
    let mut seq = 0u64;

    g[start] = 0.0;
    heap.push(Open { f: pos(start).planar_distance(goal_pos), seq, node: start });

    while let Some(Open { f, node, .. }) = heap.pop() {
        if node == goal {
            return Some(reconstruct(&prev, start, goal, g[goal]));
        }

        let here = pos(node);
        // Skip stale heap entries.
        if f > g[node] + here.planar_distance(goal_pos) {
            continue;
        }

        for &cand in &candidates {
            let c = cand.index();
            if c == node {
                continue;
            }
            let there = layout.position(cand);
            let step = here.planar_distance(there);
            if step > config.max_adjacency {
                continue;
            }
            if !availability.is_available(cand, request.robot, request.now) {
                continue;
            }
            if is_predicted_conflict(config, cand, there, &peers) {
                continue;
            }

            let tentative = g[node] + step + penalty(config, cand, there, &peers);
            if tentative < g[c] {
                g[c] = tentative;
                prev[c] = node;
                seq += 1;
                heap.push(Open { f: tentative + there.planar_distance(goal_pos), seq, node: c });
            }
        }
    }

    None
}

/// Another robot is committed to `cand` and already close to it.
fn is_predicted_conflict(
    config: &PlannerConfig,
    cand: SegmentId,
    at: Vec3,
    peers: &[&FleetPeer<'_>],
) -> bool {
    peers.iter().any(|p| p.planned.contains(&cand) && p.position.planar_distance(at) < config.conflict_radius)
}

fn penalty(config: &PlannerConfig, cand: SegmentId, at: Vec3, peers: &[&FleetPeer<'_>]) -> f64 {
    let crowd = peers.iter().filter(|p| p.position.planar_distance(at) < config.density_radius).count();
    let contention = peers.iter().filter(|p| p.next_location == Some(cand)).count();
    crowd as f64 * config.density_penalty + contention as f64 * config.contention_penalty
}

fn reconstruct(prev: &[usize], start: usize, goal: usize, cost: f64) -> Route {
    let mut segments = Vec::new();
    let mut cur = goal;
    while cur != start {
        segments.push(SegmentId(cur as u32));
        cur = prev[cur];
    }
    segments.reverse();
    Route { segments, cost }
}
