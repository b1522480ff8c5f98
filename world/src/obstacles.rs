//! Per-turn obstacle index consumed by the navigator.

use std::collections::BTreeMap;

use colony_fleet_core::{geometry, Body, Position, ResourceId, UnitId};

use crate::{query, World};

/// Origin of an obstacle stored in the index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObstacleSource {
    /// A friendly unit at its current position.
    Unit(UnitId),
    /// A resource.
    Resource(ResourceId),
    /// Forecast position of a move already committed this turn.
    Reservation(UnitId),
}

/// Circular footprint the navigator must steer around.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    /// Entity the footprint belongs to.
    pub source: ObstacleSource,
    /// Centre of the footprint.
    pub position: Position,
    /// Radius of the footprint.
    pub radius: f64,
}

impl Body for Obstacle {
    fn position(&self) -> Position {
        self.position
    }

    fn radius(&self) -> f64 {
        self.radius
    }
}

/// Candidate obstacle paired with its distance from the lane owner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObstacleEntry {
    /// Obstacle footprint.
    pub obstacle: Obstacle,
    /// Distance between the lane owner and the obstacle centre.
    pub distance: f64,
}

/// Obstacles that may matter to each undocked friendly unit this turn.
///
/// Every lane keeps the entities within
/// `unit.radius + max_speed + obstacle.radius + slack` of the unit, nearest
/// first. The only mutation after construction is [`ObstacleIndex::reserve`],
/// which appends forecast positions of committed moves, so units processed
/// later in the turn steer around space already claimed. The index is built
/// fresh every turn and discarded afterwards.
#[derive(Clone, Debug, Default)]
pub struct ObstacleIndex {
    lanes: BTreeMap<UnitId, Lane>,
    max_speed: f64,
    slack: f64,
}

#[derive(Clone, Debug)]
struct Lane {
    origin: Position,
    radius: f64,
    entries: Vec<ObstacleEntry>,
}

impl Lane {
    fn reaches(&self, center: Position, radius: f64, max_speed: f64, slack: f64) -> Option<f64> {
        let distance = geometry::distance(self.origin, center);
        (distance <= self.radius + max_speed + radius + slack).then_some(distance)
    }
}

impl ObstacleIndex {
    /// Builds the index for every undocked friendly unit in the world.
    ///
    /// Candidates are all resources plus every friendly unit regardless of
    /// docking state. Enemy units are never indexed.
    #[must_use]
    pub fn build(world: &World, max_speed: f64, slack: f64) -> Self {
        let mut candidates: Vec<Obstacle> = query::resources(world)
            .iter()
            .map(|resource| Obstacle {
                source: ObstacleSource::Resource(resource.id),
                position: resource.position,
                radius: resource.radius,
            })
            .collect();
        candidates.extend(query::friendly_units(world).map(|unit| Obstacle {
            source: ObstacleSource::Unit(unit.id),
            position: unit.position,
            radius: unit.radius,
        }));

        let mut lanes = BTreeMap::new();
        for unit in query::undocked_friendly_units(world) {
            let mut lane = Lane {
                origin: unit.position,
                radius: unit.radius,
                entries: Vec::new(),
            };

            for candidate in &candidates {
                if candidate.source == ObstacleSource::Unit(unit.id) {
                    continue;
                }
                if let Some(distance) =
                    lane.reaches(candidate.position, candidate.radius, max_speed, slack)
                {
                    lane.entries.push(ObstacleEntry {
                        obstacle: *candidate,
                        distance,
                    });
                }
            }

            lane.entries
                .sort_by(|left, right| left.distance.total_cmp(&right.distance));
            let _ = lanes.insert(unit.id, lane);
        }

        Self {
            lanes,
            max_speed,
            slack,
        }
    }

    /// Obstacles recorded for the provided unit, nearest first, followed by
    /// reservations in commit order. Units without a lane have no obstacles.
    #[must_use]
    pub fn lane(&self, unit: UnitId) -> &[ObstacleEntry] {
        match self.lanes.get(&unit) {
            Some(lane) => &lane.entries,
            None => &[],
        }
    }

    /// Registers the forecast position of a committed move for every other
    /// unit that could reach it this turn.
    ///
    /// Returns the number of lanes that received the reservation.
    pub fn reserve(&mut self, mover: UnitId, forecast: Position, radius: f64) -> usize {
        let mut touched = 0;
        for (unit, lane) in &mut self.lanes {
            if *unit == mover {
                continue;
            }
            let Some(distance) = lane.reaches(forecast, radius, self.max_speed, self.slack) else {
                continue;
            };
            lane.entries.push(ObstacleEntry {
                obstacle: Obstacle {
                    source: ObstacleSource::Reservation(mover),
                    position: forecast,
                    radius,
                },
                distance,
            });
            touched += 1;
        }
        touched
    }

    /// Number of units with a lane.
    #[must_use]
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{ObstacleIndex, ObstacleSource};
    use crate::World;
    use colony_fleet_core::{
        DockingStatus, PlayerId, Position, ResourceId, ResourceSnapshot, TurnSnapshot, UnitId,
        UnitSnapshot, UNIT_RADIUS,
    };

    const MAX_SPEED: f64 = 7.0;
    const SLACK: f64 = 0.1;

    fn unit(id: u32, owner: u32, x: f64, docking: DockingStatus) -> UnitSnapshot {
        UnitSnapshot {
            id: UnitId::new(id),
            owner: PlayerId::new(owner),
            position: Position::new(x, 50.0),
            radius: UNIT_RADIUS,
            health: 255,
            docking,
            docked_resource: None,
        }
    }

    fn world(units: Vec<UnitSnapshot>, resources: Vec<ResourceSnapshot>) -> World {
        World::from_snapshot(TurnSnapshot {
            me: PlayerId::new(0),
            width: 200.0,
            height: 100.0,
            players: vec![PlayerId::new(0), PlayerId::new(1)],
            units,
            resources,
        })
        .expect("valid snapshot")
    }

    fn sources(index: &ObstacleIndex, unit: u32) -> Vec<ObstacleSource> {
        index
            .lane(UnitId::new(unit))
            .iter()
            .map(|entry| entry.obstacle.source)
            .collect()
    }

    #[test]
    fn lanes_exist_only_for_undocked_friendly_units() {
        let index = ObstacleIndex::build(
            &world(
                vec![
                    unit(1, 0, 10.0, DockingStatus::Undocked),
                    unit(2, 0, 12.0, DockingStatus::Docked),
                    unit(3, 1, 14.0, DockingStatus::Undocked),
                ],
                Vec::new(),
            ),
            MAX_SPEED,
            SLACK,
        );

        assert_eq!(index.lane_count(), 1);
        assert_eq!(sources(&index, 1), vec![ObstacleSource::Unit(UnitId::new(2))]);
        assert!(index.lane(UnitId::new(3)).is_empty());
    }

    #[test]
    fn reachability_bound_includes_both_radii_and_slack() {
        // 0.5 + 7 + 0.5 + 0.1 = 8.1
        let index = ObstacleIndex::build(
            &world(
                vec![
                    unit(1, 0, 10.0, DockingStatus::Undocked),
                    unit(2, 0, 18.05, DockingStatus::Undocked),
                    unit(3, 0, 1.8, DockingStatus::Undocked),
                ],
                Vec::new(),
            ),
            MAX_SPEED,
            SLACK,
        );

        assert_eq!(sources(&index, 1), vec![ObstacleSource::Unit(UnitId::new(2))]);
    }

    #[test]
    fn entries_are_nearest_first_and_distances_symmetric() {
        let resource = ResourceSnapshot {
            id: ResourceId::new(4),
            position: Position::new(16.0, 50.0),
            radius: 3.0,
            health: 1000,
            owner: None,
            docking_spots: 2,
            docked_units: Vec::new(),
        };
        let index = ObstacleIndex::build(
            &world(
                vec![
                    unit(1, 0, 10.0, DockingStatus::Undocked),
                    unit(2, 0, 12.0, DockingStatus::Undocked),
                ],
                vec![resource],
            ),
            MAX_SPEED,
            SLACK,
        );

        assert_eq!(
            sources(&index, 1),
            vec![
                ObstacleSource::Unit(UnitId::new(2)),
                ObstacleSource::Resource(ResourceId::new(4)),
            ]
        );
        let forward = index.lane(UnitId::new(1))[0].distance;
        let backward = index.lane(UnitId::new(2))[0].distance;
        assert!((forward - backward).abs() < f64::EPSILON);
    }

    #[test]
    fn reservations_reach_other_units_only() {
        let mut index = ObstacleIndex::build(
            &world(
                vec![
                    unit(1, 0, 10.0, DockingStatus::Undocked),
                    unit(2, 0, 30.0, DockingStatus::Undocked),
                    unit(3, 0, 90.0, DockingStatus::Undocked),
                ],
                Vec::new(),
            ),
            MAX_SPEED,
            SLACK,
        );

        let touched = index.reserve(UnitId::new(1), Position::new(24.0, 50.0), UNIT_RADIUS);

        assert_eq!(touched, 1);
        assert_eq!(
            sources(&index, 2),
            vec![ObstacleSource::Reservation(UnitId::new(1))]
        );
        assert!(index.lane(UnitId::new(1)).is_empty());
        assert!(index.lane(UnitId::new(3)).is_empty());
    }
}
