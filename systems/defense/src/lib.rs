#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that pairs enemy raiders with the nearest available defenders.

use colony_fleet_core::{
    geometry, Assignment, Body, Intent, Orders, Position, ResourceId, ResourceSnapshot,
    SearchBudget, SearchMode, Target, ThreatRange, Tuning, UnitId, UnitSnapshot,
};
use colony_fleet_system_navigation::Navigator;
use colony_fleet_world::{query, ObstacleIndex, World};
use log::{debug, warn};

/// Threat assessor that reuses its attacker buffer between turns.
#[derive(Debug)]
pub struct ThreatAssessor {
    range: ThreatRange,
    approach_distance: f64,
    threats: Vec<Threat>,
}

impl ThreatAssessor {
    /// Creates a new assessor configured from the provided tuning.
    #[must_use]
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            range: tuning.threat_range,
            approach_distance: tuning.approach_distance,
            threats: Vec::new(),
        }
    }

    /// Claims defenders out of `pool` for every enemy threatening a controlled
    /// resource and returns the units that remain available.
    ///
    /// An undocked enemy is a threat when the resource nearest to it, among
    /// all resources, belongs to the controlling player and lies closer than
    /// the threat threshold of that resource. Threats are served nearest
    /// first; each takes the closest pooled unit within the same threshold.
    /// A defender without a route stays in the pool for later threats and
    /// the passes that follow.
    pub fn handle<'w>(
        &mut self,
        world: &'w World,
        mut pool: Vec<&'w UnitSnapshot>,
        navigator: &Navigator,
        budget: SearchBudget,
        obstacles: &mut ObstacleIndex,
        orders: &mut Orders,
    ) -> Vec<&'w UnitSnapshot> {
        self.collect_threats(world);

        for threat in &self.threats {
            if pool.is_empty() {
                break;
            }

            let mut best: Option<(usize, f64)> = None;
            for (index, candidate) in pool.iter().enumerate() {
                let distance = geometry::distance(candidate.position, threat.position);
                if distance >= best.map_or(threat.threshold, |(_, closest)| closest) {
                    continue;
                }
                best = Some((index, distance));
            }

            let Some((index, distance)) = best else {
                debug!(
                    "no defender within {:.2} of unit {} raiding resource {}",
                    threat.threshold, threat.attacker, threat.resource
                );
                continue;
            };

            let defender = pool[index];
            let destination =
                geometry::closest_point_to(defender.position, threat, self.approach_distance);
            let Some(command) =
                navigator.navigate(defender, destination, obstacles, budget, SearchMode::Spin)
            else {
                warn!(
                    "defender {} has no route toward unit {}; it stays available",
                    defender.id, threat.attacker
                );
                continue;
            };
            let _ = pool.remove(index);
            debug!(
                "unit {} defends resource {} against unit {} at {:.2}",
                defender.id, threat.resource, threat.attacker, distance
            );

            orders.record(
                Assignment {
                    unit: defender.id,
                    target: Target::Unit(threat.attacker),
                    intent: Intent::Defend,
                },
                Some(command),
            );
        }

        pool
    }

    fn collect_threats(&mut self, world: &World) {
        self.threats.clear();
        let me = query::me(world);

        for enemy in query::enemy_units(world) {
            if !enemy.docking.is_undocked() {
                continue;
            }

            let mut nearest: Option<(&ResourceSnapshot, f64)> = None;
            for resource in query::resources(world) {
                let distance = geometry::distance(enemy.position, resource.position);
                if nearest.map_or(true, |(_, closest)| distance < closest) {
                    nearest = Some((resource, distance));
                }
            }

            let Some((resource, distance)) = nearest else {
                continue;
            };
            let threshold = self.range.threshold(resource.radius);
            if !resource.is_owned_by(me) || distance >= threshold {
                continue;
            }

            self.threats.push(Threat {
                attacker: enemy.id,
                position: enemy.position,
                radius: enemy.radius,
                resource: resource.id,
                distance,
                threshold,
            });
        }

        self.threats
            .sort_by(|left, right| left.distance.total_cmp(&right.distance));
    }
}

/// Enemy unit raiding a controlled resource.
#[derive(Clone, Copy, Debug)]
struct Threat {
    attacker: UnitId,
    position: Position,
    radius: f64,
    resource: ResourceId,
    distance: f64,
    threshold: f64,
}

impl Body for Threat {
    fn position(&self) -> Position {
        self.position
    }

    fn radius(&self) -> f64 {
        self.radius
    }
}
