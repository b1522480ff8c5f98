#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Orchestrates a single decision turn of the fleet.
//!
//! The controller selects the correction budget for the fleet size, builds
//! the obstacle index, and then runs defense, colonization and attack over a
//! shared pool of undocked friendly units. Each stage consumes the pool and
//! hands the unclaimed remainder to the next, so units are assigned at most
//! once per turn. Stage order is significant: reservations made by earlier
//! units constrain the navigation of later ones.

use colony_fleet_core::{Intent, Orders, Tuning};
use colony_fleet_system_assignment::AssignmentEngine;
use colony_fleet_system_defense::ThreatAssessor;
use colony_fleet_system_navigation::Navigator;
use colony_fleet_world::{query, ObstacleIndex, World};
use log::{debug, info};

/// Per-turn decision pipeline that keeps its systems' scratch buffers alive
/// between turns.
#[derive(Debug)]
pub struct TurnController {
    tuning: Tuning,
    navigator: Navigator,
    defense: ThreatAssessor,
    assignment: AssignmentEngine,
}

impl TurnController {
    /// Creates a controller configured with the provided tuning.
    #[must_use]
    pub fn new(tuning: Tuning) -> Self {
        Self {
            navigator: Navigator::new(&tuning),
            defense: ThreatAssessor::new(&tuning),
            assignment: AssignmentEngine::new(&tuning),
            tuning,
        }
    }

    /// Produces the assignments and commands for the provided turn.
    pub fn handle(&mut self, world: &World) -> Orders {
        let fleet = query::friendly_unit_count(world);
        let budget = self.tuning.budget_for(fleet);
        let mut obstacles =
            ObstacleIndex::build(world, self.tuning.max_speed, self.tuning.obstacle_slack);
        let pool = query::undocked_friendly_units(world);
        let available = pool.len();
        let (width, height) = query::dimensions(world);
        debug!(
            "{}x{} arena, fleet of {} with {} free units and {} lanes, {} corrections of {} degrees",
            width,
            height,
            fleet,
            available,
            obstacles.lane_count(),
            budget.corrections,
            budget.angular_step
        );

        let mut orders = Orders::new();
        let pool = self.defense.handle(
            world,
            pool,
            &self.navigator,
            budget,
            &mut obstacles,
            &mut orders,
        );
        let pool = self.assignment.colonize(
            world,
            pool,
            &self.navigator,
            budget,
            &mut obstacles,
            &mut orders,
        );
        self.assignment.attack(
            world,
            pool,
            &self.navigator,
            budget,
            &mut obstacles,
            &mut orders,
        );

        info!(
            "turn orders: {} defend, {} dock, {} attack unit, {} attack resource; {} commands, {} idle",
            orders.count(Intent::Defend),
            orders.count(Intent::Dock),
            orders.count(Intent::AttackShip),
            orders.count(Intent::AttackResource),
            orders.commands.len(),
            available.saturating_sub(orders.assignments.len())
        );

        orders
    }
}

impl Default for TurnController {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}
