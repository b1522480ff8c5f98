#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Budgeted obstacle-avoiding motion planner.
//!
//! The navigator turns a destination into a single-turn [`Command::Thrust`].
//! When the straight forecast segment toward the destination is blocked it
//! searches over angular deflections, spending one correction per deflection.
//! Running out of corrections is an ordinary outcome: the unit stays put this
//! turn and is planned again from scratch on the next one.

use colony_fleet_core::{
    geometry, Command, Position, SearchBudget, SearchMode, Tuning, UnitSnapshot,
};
use colony_fleet_world::{query, ObstacleEntry, ObstacleIndex, World};
use log::{debug, trace};

/// Pure planner that converts destinations into thrust commands.
#[derive(Clone, Copy, Debug)]
pub struct Navigator {
    max_speed: f64,
    path_fudge: f64,
    travel_margin: f64,
}

impl Navigator {
    /// Creates a navigator using the supplied tuning.
    #[must_use]
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            max_speed: tuning.max_speed,
            path_fudge: tuning.path_fudge,
            travel_margin: tuning.travel_margin,
        }
    }

    /// Plans a move toward `target` around the unit's indexed obstacles.
    ///
    /// The forecast segment looks up to twice the max speed ahead while the
    /// emitted speed never exceeds the max speed. In [`SearchMode::Sweep`]
    /// the bearing is deflected clockwise one `angular_step` at a time. In
    /// [`SearchMode::Spin`] a blocked direct path starts two sweeps, one per
    /// direction, each allowed half the budget minus one; the sweep that
    /// clears with more budget left wins and clockwise wins ties.
    ///
    /// A successful plan reserves its forecast position in `obstacles` before
    /// the command is returned.
    pub fn navigate(
        &self,
        unit: &UnitSnapshot,
        target: Position,
        obstacles: &mut ObstacleIndex,
        budget: SearchBudget,
        mode: SearchMode,
    ) -> Option<Command> {
        if budget.corrections == 0 {
            return None;
        }

        let heading = self.heading(unit.position, target);
        let lane = obstacles.lane(unit.id);
        let clear = |bearing: f64| self.lane_is_clear(lane, unit.position, bearing, heading.lookahead);

        let deflection = match mode {
            SearchMode::Sweep => sweep(
                heading.bearing,
                budget.corrections,
                budget.angular_step,
                clear,
            ),
            SearchMode::Spin => {
                if clear(heading.bearing) {
                    Some(Deflection {
                        bearing: heading.bearing,
                        remaining: budget.corrections,
                    })
                } else {
                    self.spin(unit, &heading, budget, clear)
                }
            }
        };

        let Some(deflection) = deflection else {
            debug!(
                "unit {} found no clear bearing toward ({:.2}, {:.2}) within {} corrections",
                unit.id,
                target.x(),
                target.y(),
                budget.corrections
            );
            return None;
        };

        Some(self.commit(unit, &heading, deflection.bearing, obstacles))
    }

    /// Travels straight at `target`, steering only around other units.
    ///
    /// Resources are ignored entirely, which lets a unit cross open space
    /// toward a distant resource in one long leg. Every unit on the map other
    /// than the mover counts as an obstacle, with a clearance of the mover's
    /// radius plus the travel margin along the full-length segment. Blocked
    /// bearings are swept clockwise.
    pub fn travel_direct(
        &self,
        unit: &UnitSnapshot,
        target: Position,
        world: &World,
        obstacles: &mut ObstacleIndex,
        budget: SearchBudget,
    ) -> Option<Command> {
        if budget.corrections == 0 {
            return None;
        }

        let heading = self.heading(unit.position, target);
        let fudge = unit.radius + self.travel_margin;
        let deflection = sweep(
            heading.bearing,
            budget.corrections,
            budget.angular_step,
            |bearing| {
                let end = geometry::offset(unit.position, bearing, heading.range);
                query::units_on_segment(world, unit.id, unit.position, end, fudge)
                    .next()
                    .is_none()
            },
        );

        let Some(deflection) = deflection else {
            debug!(
                "unit {} could not find a clear direct leg within {} corrections",
                unit.id, budget.corrections
            );
            return None;
        };

        Some(self.commit(unit, &heading, deflection.bearing, obstacles))
    }

    fn heading(&self, origin: Position, target: Position) -> Heading {
        let range = geometry::distance(origin, target);
        let lookahead = range.min(2.0 * self.max_speed);
        Heading {
            bearing: geometry::bearing(origin, target),
            range,
            lookahead,
            speed: lookahead.min(self.max_speed),
        }
    }

    fn spin<F>(
        &self,
        unit: &UnitSnapshot,
        heading: &Heading,
        budget: SearchBudget,
        clear: F,
    ) -> Option<Deflection>
    where
        F: Fn(f64) -> bool,
    {
        let half = budget.corrections / 2;
        let branch = half.saturating_sub(1);
        let step = budget.angular_step;

        let counter_clockwise = sweep(heading.bearing - step, branch, -step, &clear);
        let clockwise = sweep(heading.bearing + step, branch, step, &clear);

        trace!(
            "unit {} spin from {:.1}: ccw {:?}, cw {:?}",
            unit.id,
            heading.bearing,
            counter_clockwise.map(|found| found.remaining),
            clockwise.map(|found| found.remaining)
        );

        match (counter_clockwise, clockwise) {
            (Some(ccw), Some(cw)) if ccw.remaining > cw.remaining => Some(ccw),
            (_, Some(cw)) => Some(cw),
            (ccw, None) => ccw,
        }
    }

    fn commit(
        &self,
        unit: &UnitSnapshot,
        heading: &Heading,
        bearing: f64,
        obstacles: &mut ObstacleIndex,
    ) -> Command {
        let forecast = geometry::offset(unit.position, bearing, heading.lookahead);
        let reserved = obstacles.reserve(unit.id, forecast, unit.radius);
        let bearing = geometry::normalize_bearing(bearing);
        trace!(
            "unit {} thrust {:.2} at {:.1}, reservation shared with {} units",
            unit.id,
            heading.speed,
            bearing,
            reserved
        );

        Command::Thrust {
            unit: unit.id,
            speed: heading.speed,
            bearing,
        }
    }

    fn lane_is_clear(
        &self,
        lane: &[ObstacleEntry],
        origin: Position,
        bearing: f64,
        lookahead: f64,
    ) -> bool {
        let forecast = geometry::offset(origin, bearing, lookahead);
        !lane.iter().any(|entry| {
            geometry::segment_intersects_circle(
                origin,
                forecast,
                entry.obstacle.position,
                entry.obstacle.radius,
                self.path_fudge,
            )
        })
    }
}

#[derive(Clone, Copy, Debug)]
struct Heading {
    bearing: f64,
    range: f64,
    lookahead: f64,
    speed: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Deflection {
    bearing: f64,
    remaining: u32,
}

/// Tries `start`, `start + step`, `start + 2 * step`, ... spending one
/// correction per bearing. Reports the first clear bearing together with the
/// corrections left when it was tried.
fn sweep<F>(start: f64, budget: u32, step: f64, clear: F) -> Option<Deflection>
where
    F: Fn(f64) -> bool,
{
    (0..budget).find_map(|spent| {
        let bearing = start + f64::from(spent) * step;
        clear(bearing).then_some(Deflection {
            bearing,
            remaining: budget - spent,
        })
    })
}
