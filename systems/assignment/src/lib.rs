#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Greedy destination assignment for units left over after defense.
//!
//! Assignment runs in two passes over an owned pool of units. The colonize
//! pass matches units to free docking slots globally, nearest pair first, and
//! returns the units it did not claim. The attack pass then sends every
//! remaining unit after its own nearest enemy target. Draining the pool pass
//! by pass is what keeps every unit to a single assignment per turn.

use colony_fleet_core::{
    geometry, Assignment, Command, Intent, Orders, Position, ResourceSnapshot, SearchBudget,
    SearchMode, Target, Tuning, UnitSnapshot,
};
use colony_fleet_system_navigation::Navigator;
use colony_fleet_world::{query, ObstacleIndex, World};
use log::{debug, trace, warn};

/// Assignment system that reuses its pairing buffers to avoid repeated allocations.
#[derive(Debug)]
pub struct AssignmentEngine {
    approach_distance: f64,
    dock_radius: f64,
    travel_margin: f64,
    tickets: Vec<usize>,
    pairs: Vec<Pairing>,
    claimed_units: Vec<bool>,
    claimed_tickets: Vec<bool>,
}

#[derive(Clone, Copy, Debug)]
struct Pairing {
    unit: usize,
    ticket: usize,
    distance: f64,
}

impl AssignmentEngine {
    /// Creates a new assignment engine configured from the provided tuning.
    #[must_use]
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            approach_distance: tuning.approach_distance,
            dock_radius: tuning.dock_radius,
            travel_margin: tuning.travel_margin,
            tickets: Vec::new(),
            pairs: Vec::new(),
            claimed_units: Vec::new(),
            claimed_tickets: Vec::new(),
        }
    }

    /// Matches pooled units with free docking slots and returns the units
    /// left unclaimed, in their original order.
    ///
    /// Every free slot on a resource that is unowned, or owned by the
    /// controlling player and not full, is one ticket. All unit and ticket
    /// pairs are ranked by the distance between the unit and the resource
    /// centre and taken nearest first, skipping pairs whose unit or ticket is
    /// already claimed. A unit within docking range docks; any other unit
    /// heads for the point `approach_distance` outside the resource surface.
    /// Both sides of a taken pair are claimed even when navigation fails.
    pub fn colonize<'w>(
        &mut self,
        world: &'w World,
        pool: Vec<&'w UnitSnapshot>,
        navigator: &Navigator,
        budget: SearchBudget,
        obstacles: &mut ObstacleIndex,
        orders: &mut Orders,
    ) -> Vec<&'w UnitSnapshot> {
        let resources = query::resources(world);
        self.prepare_tickets(world);
        if self.tickets.is_empty() || pool.is_empty() {
            return pool;
        }
        self.prepare_pairs(&pool, resources);

        self.claimed_units.clear();
        self.claimed_units.resize(pool.len(), false);
        self.claimed_tickets.clear();
        self.claimed_tickets.resize(self.tickets.len(), false);

        let mut open_units = pool.len();
        let mut open_tickets = self.tickets.len();

        for pairing in &self.pairs {
            if open_units == 0 || open_tickets == 0 {
                break;
            }
            if self.claimed_units[pairing.unit] || self.claimed_tickets[pairing.ticket] {
                continue;
            }
            self.claimed_units[pairing.unit] = true;
            self.claimed_tickets[pairing.ticket] = true;
            open_units -= 1;
            open_tickets -= 1;

            let unit = pool[pairing.unit];
            let resource = &resources[self.tickets[pairing.ticket]];
            let command = if geometry::can_dock(unit, resource, self.dock_radius) {
                Some(Command::Dock {
                    unit: unit.id,
                    resource: resource.id,
                })
            } else {
                let destination =
                    geometry::closest_point_to(unit.position, resource, self.approach_distance);
                navigator.navigate(unit, destination, obstacles, budget, SearchMode::Spin)
            };

            if command.is_none() {
                warn!("unit {} has no route toward resource {}", unit.id, resource.id);
            }
            debug!(
                "unit {} colonizes resource {} from {:.2}",
                unit.id, resource.id, pairing.distance
            );

            orders.record(
                Assignment {
                    unit: unit.id,
                    target: Target::Resource(resource.id),
                    intent: Intent::Dock,
                },
                command,
            );
        }

        pool.into_iter()
            .zip(&self.claimed_units)
            .filter_map(|(unit, claimed)| (!claimed).then_some(unit))
            .collect()
    }

    /// Sends every pooled unit after its nearest enemy target.
    ///
    /// Enemy units that are docked, docking or undocking take priority over
    /// enemy resources. A unit whose straight line to its target resource
    /// crosses no resource other than the target travels directly, ignoring
    /// resource collisions; otherwise it navigates around them toward the
    /// resource centre. Units with no enemy target left stay idle.
    pub fn attack(
        &self,
        world: &World,
        pool: Vec<&UnitSnapshot>,
        navigator: &Navigator,
        budget: SearchBudget,
        obstacles: &mut ObstacleIndex,
        orders: &mut Orders,
    ) {
        for unit in pool {
            if let Some(enemy) = nearest(
                unit,
                query::enemy_units(world).filter(|enemy| !enemy.docking.is_undocked()),
                |enemy| enemy.position,
            ) {
                let destination =
                    geometry::closest_point_to(unit.position, enemy, self.approach_distance);
                let command =
                    navigator.navigate(unit, destination, obstacles, budget, SearchMode::Spin);
                if command.is_none() {
                    warn!("unit {} has no route toward unit {}", unit.id, enemy.id);
                }
                debug!("unit {} attacks docked unit {}", unit.id, enemy.id);

                orders.record(
                    Assignment {
                        unit: unit.id,
                        target: Target::Unit(enemy.id),
                        intent: Intent::AttackShip,
                    },
                    command,
                );
                continue;
            }

            let Some(resource) = nearest(unit, query::enemy_resources(world), |resource| {
                resource.position
            }) else {
                debug!("unit {} has no enemy target left", unit.id);
                continue;
            };

            let fudge = unit.radius + self.travel_margin;
            let crossing =
                query::resources_on_segment(world, unit.position, resource.position, fudge)
                    .count();
            let command = if crossing == 1 {
                trace!("unit {} has a clear line to resource {}", unit.id, resource.id);
                navigator.travel_direct(unit, resource.position, world, obstacles, budget)
            } else {
                navigator.navigate(unit, resource.position, obstacles, budget, SearchMode::Spin)
            };
            if command.is_none() {
                warn!("unit {} has no route toward resource {}", unit.id, resource.id);
            }
            debug!(
                "unit {} attacks resource {} crossing {} resources",
                unit.id, resource.id, crossing
            );

            orders.record(
                Assignment {
                    unit: unit.id,
                    target: Target::Resource(resource.id),
                    intent: Intent::AttackResource,
                },
                command,
            );
        }
    }

    fn prepare_tickets(&mut self, world: &World) {
        self.tickets.clear();
        let me = query::me(world);
        for (index, resource) in query::resources(world).iter().enumerate() {
            let colonizable = match resource.owner {
                None => true,
                Some(owner) => owner == me && !resource.is_full(),
            };
            if !colonizable {
                continue;
            }
            for _ in 0..resource.free_slots() {
                self.tickets.push(index);
            }
        }
    }

    fn prepare_pairs(&mut self, pool: &[&UnitSnapshot], resources: &[ResourceSnapshot]) {
        self.pairs.clear();
        for (unit_index, unit) in pool.iter().enumerate() {
            for (ticket, &resource) in self.tickets.iter().enumerate() {
                self.pairs.push(Pairing {
                    unit: unit_index,
                    ticket,
                    distance: geometry::distance(unit.position, resources[resource].position),
                });
            }
        }
        self.pairs
            .sort_by(|left, right| left.distance.total_cmp(&right.distance));
    }
}

fn nearest<'w, T, I, F>(unit: &UnitSnapshot, candidates: I, position: F) -> Option<&'w T>
where
    I: Iterator<Item = &'w T>,
    F: Fn(&T) -> Position,
{
    let mut best: Option<(&'w T, f64)> = None;
    for candidate in candidates {
        let distance = geometry::distance(unit.position, position(candidate));
        if best.map_or(true, |(_, closest)| distance < closest) {
            best = Some((candidate, distance));
        }
    }
    best.map(|(candidate, _)| candidate)
}
