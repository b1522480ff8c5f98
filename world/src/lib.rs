#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative per-turn world state for Colony Fleet.
//!
//! A [`World`] is rebuilt from every [`TurnSnapshot`] the engine delivers.
//! Construction validates the snapshot so that downstream systems can assume
//! finite coordinates, positive radii and unique identifiers; a snapshot that
//! breaks those rules is rejected with a [`SnapshotError`] and the turn is
//! abandoned.

pub mod obstacles;

use std::collections::BTreeSet;

use colony_fleet_core::{
    PlayerId, ResourceId, ResourceSnapshot, TurnSnapshot, UnitId, UnitSnapshot,
};
use thiserror::Error;

pub use obstacles::{Obstacle, ObstacleEntry, ObstacleIndex, ObstacleSource};

/// Reasons a turn snapshot may be rejected.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SnapshotError {
    /// The arena dimensions are not finite positive numbers.
    #[error("arena dimensions {width}x{height} are invalid")]
    InvalidDimensions {
        /// Reported arena width.
        width: f64,
        /// Reported arena height.
        height: f64,
    },
    /// The controlling player is not listed among the match players.
    #[error("controlling player {0} is not part of the match")]
    UnknownPlayer(PlayerId),
    /// A unit position contains a non-finite coordinate.
    #[error("unit {0} has a non-finite position")]
    NonFiniteUnit(UnitId),
    /// A unit radius is not a finite positive number.
    #[error("unit {unit} has invalid radius {radius}")]
    InvalidUnitRadius {
        /// Offending unit.
        unit: UnitId,
        /// Reported radius.
        radius: f64,
    },
    /// A unit identifier appears more than once.
    #[error("unit {0} appears more than once")]
    DuplicateUnit(UnitId),
    /// A unit belongs to a player that is not part of the match.
    #[error("unit {unit} belongs to unknown player {owner}")]
    UnknownUnitOwner {
        /// Offending unit.
        unit: UnitId,
        /// Reported owner.
        owner: PlayerId,
    },
    /// A resource position contains a non-finite coordinate.
    #[error("resource {0} has a non-finite position")]
    NonFiniteResource(ResourceId),
    /// A resource radius is not a finite positive number.
    #[error("resource {resource} has invalid radius {radius}")]
    InvalidResourceRadius {
        /// Offending resource.
        resource: ResourceId,
        /// Reported radius.
        radius: f64,
    },
    /// A resource identifier appears more than once.
    #[error("resource {0} appears more than once")]
    DuplicateResource(ResourceId),
    /// A resource belongs to a player that is not part of the match.
    #[error("resource {resource} belongs to unknown player {owner}")]
    UnknownResourceOwner {
        /// Offending resource.
        resource: ResourceId,
        /// Reported owner.
        owner: PlayerId,
    },
    /// A resource reports more docked units than it has docking spots.
    #[error("resource {resource} holds {docked} units but has {spots} spots")]
    OverfullResource {
        /// Offending resource.
        resource: ResourceId,
        /// Number of docked units reported.
        docked: usize,
        /// Number of docking spots reported.
        spots: u32,
    },
}

/// Represents the validated arena state for a single turn.
#[derive(Clone, Debug)]
pub struct World {
    me: PlayerId,
    width: f64,
    height: f64,
    units: Vec<UnitSnapshot>,
    resources: Vec<ResourceSnapshot>,
}

impl World {
    /// Validates the snapshot and captures it as the state of the turn.
    ///
    /// Units and resources are stored in ascending identifier order so every
    /// system iterates them deterministically.
    pub fn from_snapshot(snapshot: TurnSnapshot) -> Result<Self, SnapshotError> {
        let TurnSnapshot {
            me,
            width,
            height,
            players,
            mut units,
            mut resources,
        } = snapshot;

        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(SnapshotError::InvalidDimensions { width, height });
        }

        let players: BTreeSet<PlayerId> = players.into_iter().collect();
        if !players.contains(&me) {
            return Err(SnapshotError::UnknownPlayer(me));
        }

        units.sort_by_key(|unit| unit.id);
        for (index, unit) in units.iter().enumerate() {
            validate_unit(unit, &players)?;
            if index > 0 && units[index - 1].id == unit.id {
                return Err(SnapshotError::DuplicateUnit(unit.id));
            }
        }

        resources.sort_by_key(|resource| resource.id);
        for (index, resource) in resources.iter().enumerate() {
            validate_resource(resource, &players)?;
            if index > 0 && resources[index - 1].id == resource.id {
                return Err(SnapshotError::DuplicateResource(resource.id));
            }
        }

        Ok(Self {
            me,
            width,
            height,
            units,
            resources,
        })
    }
}

fn validate_unit(unit: &UnitSnapshot, players: &BTreeSet<PlayerId>) -> Result<(), SnapshotError> {
    if !unit.position.is_finite() {
        return Err(SnapshotError::NonFiniteUnit(unit.id));
    }
    if !(unit.radius.is_finite() && unit.radius > 0.0) {
        return Err(SnapshotError::InvalidUnitRadius {
            unit: unit.id,
            radius: unit.radius,
        });
    }
    if !players.contains(&unit.owner) {
        return Err(SnapshotError::UnknownUnitOwner {
            unit: unit.id,
            owner: unit.owner,
        });
    }
    Ok(())
}

fn validate_resource(
    resource: &ResourceSnapshot,
    players: &BTreeSet<PlayerId>,
) -> Result<(), SnapshotError> {
    if !resource.position.is_finite() {
        return Err(SnapshotError::NonFiniteResource(resource.id));
    }
    if !(resource.radius.is_finite() && resource.radius > 0.0) {
        return Err(SnapshotError::InvalidResourceRadius {
            resource: resource.id,
            radius: resource.radius,
        });
    }
    if let Some(owner) = resource.owner {
        if !players.contains(&owner) {
            return Err(SnapshotError::UnknownResourceOwner {
                resource: resource.id,
                owner,
            });
        }
    }
    let docked = resource.docked_units.len();
    if u32::try_from(docked).map_or(true, |docked| docked > resource.docking_spots) {
        return Err(SnapshotError::OverfullResource {
            resource: resource.id,
            docked,
            spots: resource.docking_spots,
        });
    }
    Ok(())
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use colony_fleet_core::{
        geometry, PlayerId, Position, ResourceId, ResourceSnapshot, UnitId, UnitSnapshot,
    };

    /// Player controlled by the engine.
    #[must_use]
    pub fn me(world: &World) -> PlayerId {
        world.me
    }

    /// Arena width and height in map units.
    #[must_use]
    pub fn dimensions(world: &World) -> (f64, f64) {
        (world.width, world.height)
    }

    /// Every unit in ascending identifier order.
    #[must_use]
    pub fn units(world: &World) -> &[UnitSnapshot] {
        &world.units
    }

    /// Every resource in ascending identifier order.
    #[must_use]
    pub fn resources(world: &World) -> &[ResourceSnapshot] {
        &world.resources
    }

    /// Looks up a unit by identifier.
    #[must_use]
    pub fn unit(world: &World, id: UnitId) -> Option<&UnitSnapshot> {
        world
            .units
            .binary_search_by_key(&id, |unit| unit.id)
            .ok()
            .map(|index| &world.units[index])
    }

    /// Looks up a resource by identifier.
    #[must_use]
    pub fn resource(world: &World, id: ResourceId) -> Option<&ResourceSnapshot> {
        world
            .resources
            .binary_search_by_key(&id, |resource| resource.id)
            .ok()
            .map(|index| &world.resources[index])
    }

    /// Units controlled by the engine, in every docking state.
    pub fn friendly_units(world: &World) -> impl Iterator<Item = &UnitSnapshot> {
        let me = world.me;
        world.units.iter().filter(move |unit| unit.owner == me)
    }

    /// Units controlled by the engine that are free to move.
    #[must_use]
    pub fn undocked_friendly_units(world: &World) -> Vec<&UnitSnapshot> {
        friendly_units(world)
            .filter(|unit| unit.docking.is_undocked())
            .collect()
    }

    /// Number of units controlled by the engine, docked or not.
    #[must_use]
    pub fn friendly_unit_count(world: &World) -> usize {
        friendly_units(world).count()
    }

    /// Units owned by every other player.
    pub fn enemy_units(world: &World) -> impl Iterator<Item = &UnitSnapshot> {
        let me = world.me;
        world.units.iter().filter(move |unit| unit.owner != me)
    }

    /// Resources owned by another player.
    pub fn enemy_resources(world: &World) -> impl Iterator<Item = &ResourceSnapshot> {
        let me = world.me;
        world
            .resources
            .iter()
            .filter(move |resource| resource.owner.map_or(false, |owner| owner != me))
    }

    /// Resources whose footprint, widened by `fudge`, meets the segment.
    pub fn resources_on_segment(
        world: &World,
        start: Position,
        end: Position,
        fudge: f64,
    ) -> impl Iterator<Item = &ResourceSnapshot> {
        world.resources.iter().filter(move |resource| {
            geometry::segment_intersects_circle(
                start,
                end,
                resource.position,
                resource.radius,
                fudge,
            )
        })
    }

    /// Units other than `mover` whose footprint, widened by `fudge`, meets the
    /// segment. Units of every player are considered.
    pub fn units_on_segment(
        world: &World,
        mover: UnitId,
        start: Position,
        end: Position,
        fudge: f64,
    ) -> impl Iterator<Item = &UnitSnapshot> {
        world.units.iter().filter(move |unit| {
            unit.id != mover
                && geometry::segment_intersects_circle(
                    start,
                    end,
                    unit.position,
                    unit.radius,
                    fudge,
                )
        })
    }
}
