#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Colony Fleet engine.
//!
//! This crate defines the message surface that connects the protocol adapter,
//! the validated per-turn world, and the pure decision systems. The adapter
//! decodes a [`TurnSnapshot`], the world validates it, and systems respond
//! exclusively with [`Assignment`] and [`Command`] batches collected in
//! [`Orders`]. Nothing defined here survives beyond a single turn.

pub mod geometry;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Collision radius shared by every mobile unit.
pub const UNIT_RADIUS: f64 = 0.5;

/// Identifier of a player taking part in the match.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier assigned to a mobile unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier assigned to a resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(u32);

impl ResourceId {
    /// Creates a new resource identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Point in the continuous arena measured in map units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f64,
    y: f64,
}

impl Position {
    /// Creates a new position from its coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// Vertical coordinate. The arena's y axis points down.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// Reports whether both coordinates are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Anything occupying a circular footprint in the arena.
pub trait Body {
    /// Centre of the footprint.
    fn position(&self) -> Position;

    /// Radius of the footprint.
    fn radius(&self) -> f64;
}

/// Docking lifecycle of a mobile unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DockingStatus {
    /// Free to move.
    Undocked,
    /// Attaching to a resource.
    Docking,
    /// Attached to a resource and producing.
    Docked,
    /// Detaching from a resource.
    Undocking,
}

impl DockingStatus {
    /// Reports whether the unit can receive thrust commands.
    #[must_use]
    pub const fn is_undocked(self) -> bool {
        matches!(self, Self::Undocked)
    }
}

/// Immutable representation of a single mobile unit for the current turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Player controlling the unit.
    pub owner: PlayerId,
    /// Current centre of the unit.
    pub position: Position,
    /// Collision radius of the unit.
    pub radius: f64,
    /// Remaining hit points.
    pub health: u32,
    /// Docking lifecycle state.
    pub docking: DockingStatus,
    /// Resource the unit is attached to while not undocked.
    pub docked_resource: Option<ResourceId>,
}

impl Body for UnitSnapshot {
    fn position(&self) -> Position {
        self.position
    }

    fn radius(&self) -> f64 {
        self.radius
    }
}

/// Immutable representation of a single resource for the current turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    /// Unique identifier assigned to the resource.
    pub id: ResourceId,
    /// Centre of the resource.
    pub position: Position,
    /// Collision radius, also used as the threat radius.
    pub radius: f64,
    /// Remaining hit points.
    pub health: u32,
    /// Player owning the resource, if any.
    pub owner: Option<PlayerId>,
    /// Total number of docking slots.
    pub docking_spots: u32,
    /// Units currently occupying docking slots.
    pub docked_units: Vec<UnitId>,
}

impl ResourceSnapshot {
    /// Number of docking slots that are still free.
    #[must_use]
    pub fn free_slots(&self) -> u32 {
        let occupied = u32::try_from(self.docked_units.len()).unwrap_or(u32::MAX);
        self.docking_spots.saturating_sub(occupied)
    }

    /// Reports whether every docking slot is occupied.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.free_slots() == 0
    }

    /// Reports whether the resource belongs to the provided player.
    #[must_use]
    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == Some(player)
    }
}

impl Body for ResourceSnapshot {
    fn position(&self) -> Position {
        self.position
    }

    fn radius(&self) -> f64 {
        self.radius
    }
}

/// Authoritative state of the arena delivered at the start of a turn.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnSnapshot {
    /// Player controlled by this engine.
    pub me: PlayerId,
    /// Width of the arena in map units.
    pub width: f64,
    /// Height of the arena in map units.
    pub height: f64,
    /// Players taking part in the match.
    pub players: Vec<PlayerId>,
    /// Every mobile unit of every player.
    pub units: Vec<UnitSnapshot>,
    /// Every resource in the arena.
    pub resources: Vec<ResourceSnapshot>,
}

/// Commands submitted to the engine at the end of a turn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Moves a unit along a bearing.
    Thrust {
        /// Unit receiving the command.
        unit: UnitId,
        /// Travel distance for the turn, never above the configured max speed.
        speed: f64,
        /// Travel bearing in degrees within `[0, 360)`.
        bearing: f64,
    },
    /// Attaches a unit to a resource within docking range.
    Dock {
        /// Unit receiving the command.
        unit: UnitId,
        /// Resource to dock with.
        resource: ResourceId,
    },
}

impl Command {
    /// Unit addressed by the command.
    #[must_use]
    pub const fn unit(&self) -> UnitId {
        match self {
            Self::Thrust { unit, .. } | Self::Dock { unit, .. } => *unit,
        }
    }
}

/// Purpose behind an assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Intent {
    /// Intercept an enemy unit threatening a controlled resource.
    Defend,
    /// Colonize an open docking slot.
    Dock,
    /// Attack an enemy unit that is docked or (un)docking.
    AttackShip,
    /// Attack an enemy-owned resource.
    AttackResource,
}

/// Entity an assignment points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    /// A mobile unit.
    Unit(UnitId),
    /// A resource.
    Resource(ResourceId),
}

/// Destination chosen for a unit during the current turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Assignment {
    /// Unit that received the assignment.
    pub unit: UnitId,
    /// Entity the unit heads for.
    pub target: Target,
    /// Reason for the assignment.
    pub intent: Intent,
}

/// Assignments and commands produced for a single turn.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Orders {
    /// Assignments in the order they were made.
    pub assignments: Vec<Assignment>,
    /// Commands in submission order.
    pub commands: Vec<Command>,
}

impl Orders {
    /// Creates an empty order bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an assignment and the command it produced, if any.
    pub fn record(&mut self, assignment: Assignment, command: Option<Command>) {
        self.assignments.push(assignment);
        if let Some(command) = command {
            self.commands.push(command);
        }
    }

    /// Number of assignments recorded with the provided intent.
    #[must_use]
    pub fn count(&self, intent: Intent) -> usize {
        self.assignments
            .iter()
            .filter(|assignment| assignment.intent == intent)
            .count()
    }
}

/// Correction budget handed to the navigator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchBudget {
    /// Maximum number of angular deflections.
    pub corrections: u32,
    /// Size of a single deflection in degrees.
    pub angular_step: f64,
}

impl SearchBudget {
    /// Creates a new budget.
    #[must_use]
    pub const fn new(corrections: u32, angular_step: f64) -> Self {
        Self {
            corrections,
            angular_step,
        }
    }
}

/// Direction policy of the navigator's deflection search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchMode {
    /// Searches both directions and keeps the one that clears sooner.
    Spin,
    /// Deflects in a single direction only.
    Sweep,
}

/// How a resource radius is turned into a threat threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatRange {
    /// Compares distances against the squared radius.
    Squared,
    /// Compares distances against the radius itself.
    Linear,
}

impl ThreatRange {
    /// Distance below which an enemy or defender counts for a resource of
    /// the provided radius.
    #[must_use]
    pub fn threshold(self, radius: f64) -> f64 {
        match self {
            Self::Squared => radius * radius,
            Self::Linear => radius,
        }
    }
}

/// Tuning knobs consumed by every system.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tuning {
    /// Maximum distance a unit travels in one turn.
    pub max_speed: f64,
    /// Clearance added to obstacle radii during path checks.
    pub path_fudge: f64,
    /// Slack added to the reachability bound of the obstacle index.
    pub obstacle_slack: f64,
    /// Clearance added to the unit radius during direct long-range travel.
    pub travel_margin: f64,
    /// Distance from a resource surface at which docking is allowed.
    pub dock_radius: f64,
    /// Distance kept from a target's surface when approaching it.
    pub approach_distance: f64,
    /// Fleet size above which the crowded budget applies.
    pub crowded_threshold: usize,
    /// Budget used for fleets larger than `crowded_threshold`.
    pub crowded_budget: SearchBudget,
    /// Budget used otherwise.
    pub default_budget: SearchBudget,
    /// Threat threshold policy of the defense system.
    pub threat_range: ThreatRange,
}

impl Tuning {
    /// Selects the search budget for a fleet of the provided size.
    #[must_use]
    pub fn budget_for(&self, friendly_units: usize) -> SearchBudget {
        if friendly_units > self.crowded_threshold {
            self.crowded_budget
        } else {
            self.default_budget
        }
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_speed: 7.0,
            path_fudge: 0.6,
            obstacle_slack: 0.1,
            travel_margin: 0.1,
            dock_radius: 4.0,
            approach_distance: 3.0,
            crowded_threshold: 160,
            crowded_budget: SearchBudget::new(22, 8.0),
            default_budget: SearchBudget::new(44, 4.0),
            threat_range: ThreatRange::Squared,
        }
    }
}
