use std::collections::BTreeSet;

use colony_fleet_core::{
    Assignment, Command, DockingStatus, Intent, PlayerId, Position, ResourceId, ResourceSnapshot,
    SearchBudget, Target, TurnSnapshot, Tuning, UnitId, UnitSnapshot, UNIT_RADIUS,
};
use colony_fleet_system_turn::TurnController;
use colony_fleet_world::World;

fn unit(id: u32, owner: u32, x: f64, y: f64, docking: DockingStatus) -> UnitSnapshot {
    UnitSnapshot {
        id: UnitId::new(id),
        owner: PlayerId::new(owner),
        position: Position::new(x, y),
        radius: UNIT_RADIUS,
        health: 255,
        docking,
        docked_resource: None,
    }
}

fn resource(
    id: u32,
    owner: Option<u32>,
    position: (f64, f64),
    radius: f64,
    spots: u32,
    docked: &[u32],
) -> ResourceSnapshot {
    ResourceSnapshot {
        id: ResourceId::new(id),
        position: Position::new(position.0, position.1),
        radius,
        health: 1000,
        owner: owner.map(PlayerId::new),
        docking_spots: spots,
        docked_units: docked.iter().copied().map(UnitId::new).collect(),
    }
}

fn contested_arena() -> World {
    World::from_snapshot(TurnSnapshot {
        me: PlayerId::new(0),
        width: 240.0,
        height: 160.0,
        players: vec![PlayerId::new(0), PlayerId::new(1)],
        units: vec![
            unit(1, 0, 50.0, 54.5, DockingStatus::Docked),
            unit(2, 0, 50.0, 62.0, DockingStatus::Undocked),
            unit(3, 0, 70.0, 50.0, DockingStatus::Undocked),
            unit(4, 0, 90.0, 90.0, DockingStatus::Undocked),
            unit(20, 1, 50.0, 55.0, DockingStatus::Undocked),
            unit(21, 1, 150.0, 106.0, DockingStatus::Docked),
        ],
        resources: vec![
            resource(1, Some(0), (50.0, 50.0), 4.0, 3, &[1]),
            resource(2, None, (80.0, 50.0), 3.0, 1, &[]),
            resource(3, Some(1), (150.0, 100.0), 5.0, 2, &[21]),
        ],
    })
    .expect("valid snapshot")
}

#[test]
fn stages_run_defense_then_colonize() {
    let orders = TurnController::default().handle(&contested_arena());

    let summary: Vec<(u32, Target, Intent)> = orders
        .assignments
        .iter()
        .map(|assignment| (assignment.unit.get(), assignment.target, assignment.intent))
        .collect();
    assert_eq!(
        summary,
        vec![
            (2, Target::Unit(UnitId::new(20)), Intent::Defend),
            (3, Target::Resource(ResourceId::new(2)), Intent::Dock),
            (4, Target::Resource(ResourceId::new(1)), Intent::Dock),
        ]
    );
}

#[test]
fn every_unit_is_assigned_and_commanded_at_most_once() {
    let world = contested_arena();
    let orders = TurnController::default().handle(&world);

    let mut assigned = BTreeSet::new();
    for assignment in &orders.assignments {
        assert!(
            assigned.insert(assignment.unit),
            "unit {} assigned twice",
            assignment.unit
        );
    }

    let mut commanded = BTreeSet::new();
    for command in &orders.commands {
        assert!(assigned.contains(&command.unit()));
        assert!(
            commanded.insert(command.unit()),
            "unit {} commanded twice",
            command.unit()
        );
        if let Command::Thrust { speed, bearing, .. } = *command {
            assert!((0.0..=7.0).contains(&speed), "speed {speed}");
            assert!((0.0..360.0).contains(&bearing), "bearing {bearing}");
        }
    }
    assert!(!commanded.contains(&UnitId::new(1)));
}

#[test]
fn large_fleets_still_receive_orders() {
    let mut units = Vec::new();
    for id in 0..170 {
        let column = f64::from(id % 17);
        let row = f64::from(id / 17);
        units.push(unit(id, 0, 10.0 + 12.0 * column, 10.0 + 12.0 * row, DockingStatus::Undocked));
    }
    units.push(unit(500, 1, 230.0, 150.0, DockingStatus::Docked));
    let world = World::from_snapshot(TurnSnapshot {
        me: PlayerId::new(0),
        width: 240.0,
        height: 160.0,
        players: vec![PlayerId::new(0), PlayerId::new(1)],
        units,
        resources: vec![resource(1, Some(1), (225.0, 145.0), 4.0, 2, &[500])],
    })
    .expect("valid snapshot");

    let orders = TurnController::default().handle(&world);

    assert_eq!(orders.count(Intent::AttackShip), 170);
    assert!(!orders.commands.is_empty());
}

#[test]
fn stranded_defender_falls_through_to_colonize() {
    let world = World::from_snapshot(TurnSnapshot {
        me: PlayerId::new(0),
        width: 240.0,
        height: 160.0,
        players: vec![PlayerId::new(0), PlayerId::new(1)],
        units: vec![
            unit(1, 0, 50.0, 56.0, DockingStatus::Undocked),
            unit(20, 1, 50.0, 44.0, DockingStatus::Undocked),
        ],
        resources: vec![resource(1, Some(0), (50.0, 50.0), 4.0, 3, &[])],
    })
    .expect("valid snapshot");
    let stalled = SearchBudget::new(0, 8.0);
    let mut controller = TurnController::new(Tuning {
        default_budget: stalled,
        crowded_budget: stalled,
        ..Tuning::default()
    });

    let orders = controller.handle(&world);

    assert_eq!(
        orders.assignments,
        vec![Assignment {
            unit: UnitId::new(1),
            target: Target::Resource(ResourceId::new(1)),
            intent: Intent::Dock,
        }]
    );
    assert_eq!(
        orders.commands,
        vec![Command::Dock {
            unit: UnitId::new(1),
            resource: ResourceId::new(1),
        }]
    );
}
