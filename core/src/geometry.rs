//! Pure geometry primitives shared by the planner and the assignment systems.
//!
//! Bearings are expressed in degrees, measured with `atan2` in arena
//! coordinates (y axis pointing down), so increasing bearings turn clockwise
//! on screen. Callers are responsible for feeding finite input; the world
//! crate rejects snapshots that would violate that contract.

use glam::DVec2;

use crate::{Body, Position, ResourceSnapshot, UnitSnapshot};

/// Euclidean distance between two positions.
#[must_use]
pub fn distance(a: Position, b: Position) -> f64 {
    to_vec(a).distance(to_vec(b))
}

/// Bearing from `from` toward `to` in degrees within `[0, 360)`.
#[must_use]
pub fn bearing(from: Position, to: Position) -> f64 {
    let delta = to_vec(to) - to_vec(from);
    normalize_bearing(delta.y.atan2(delta.x).to_degrees())
}

/// Wraps an arbitrary angle in degrees into `[0, 360)`.
#[must_use]
pub fn normalize_bearing(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Point reached by travelling `distance` along `bearing` from `origin`.
#[must_use]
pub fn offset(origin: Position, bearing: f64, distance: f64) -> Position {
    let radians = bearing.to_radians();
    let reached = to_vec(origin) + DVec2::new(radians.cos(), radians.sin()) * distance;
    Position::new(reached.x, reached.y)
}

/// Tests whether the segment `start..end` passes within `radius + fudge` of
/// `center`.
///
/// The closest approach is found by projecting the centre onto the segment
/// and clamping the projection to the far end. A circle lying entirely behind
/// `start` never intersects. A zero-length segment degrades to a
/// point-in-circle test.
#[must_use]
pub fn segment_intersects_circle(
    start: Position,
    end: Position,
    center: Position,
    radius: f64,
    fudge: f64,
) -> bool {
    let start = to_vec(start);
    let center = to_vec(center);
    let delta = to_vec(end) - start;
    let reach = radius + fudge;

    let length_sq = delta.length_squared();
    if length_sq == 0.0 {
        return start.distance(center) <= reach;
    }

    let t = (delta.dot(center - start) / length_sq).min(1.0);
    if t < 0.0 {
        return false;
    }

    (start + delta * t).distance(center) <= reach
}

/// Point `min_distance` beyond the surface of `body` on the line toward
/// `from`.
#[must_use]
pub fn closest_point_to(from: Position, body: &impl Body, min_distance: f64) -> Position {
    let center = body.position();
    offset(
        center,
        bearing(center, from),
        body.radius() + min_distance,
    )
}

/// Reports whether `unit` is close enough to `resource` to dock with it.
#[must_use]
pub fn can_dock(unit: &UnitSnapshot, resource: &ResourceSnapshot, dock_radius: f64) -> bool {
    distance(unit.position, resource.position) <= resource.radius + dock_radius + unit.radius
}

fn to_vec(position: Position) -> DVec2 {
    DVec2::new(position.x(), position.y())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DockingStatus, PlayerId, ResourceId, UnitId, UNIT_RADIUS};

    const EPSILON: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn bearing_covers_all_quadrants() {
        let origin = Position::new(10.0, 10.0);
        assert_close(bearing(origin, Position::new(20.0, 10.0)), 0.0);
        assert_close(bearing(origin, Position::new(10.0, 20.0)), 90.0);
        assert_close(bearing(origin, Position::new(0.0, 10.0)), 180.0);
        assert_close(bearing(origin, Position::new(10.0, 0.0)), 270.0);
    }

    #[test]
    fn normalize_wraps_into_range() {
        assert_close(normalize_bearing(-90.0), 270.0);
        assert_close(normalize_bearing(725.0), 5.0);
        assert_close(normalize_bearing(-1e-18), 0.0);
    }

    #[test]
    fn offset_travels_along_bearing() {
        let reached = offset(Position::new(1.0, 1.0), 90.0, 5.0);
        assert_close(reached.x(), 1.0);
        assert_close(reached.y(), 6.0);
        assert_close(distance(Position::new(0.0, 0.0), Position::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn segment_through_circle_intersects() {
        assert!(segment_intersects_circle(
            Position::new(0.0, 0.0),
            Position::new(10.0, 0.0),
            Position::new(5.0, 1.0),
            0.5,
            0.6,
        ));
    }

    #[test]
    fn fudge_widens_the_footprint() {
        let start = Position::new(0.0, 0.0);
        let end = Position::new(10.0, 0.0);
        let center = Position::new(5.0, 1.5);
        assert!(!segment_intersects_circle(start, end, center, 1.0, 0.0));
        assert!(segment_intersects_circle(start, end, center, 1.0, 0.6));
    }

    #[test]
    fn circle_behind_start_is_ignored() {
        assert!(!segment_intersects_circle(
            Position::new(0.0, 0.0),
            Position::new(10.0, 0.0),
            Position::new(-0.5, 0.0),
            1.0,
            0.6,
        ));
    }

    #[test]
    fn circle_past_the_end_uses_the_endpoint() {
        let start = Position::new(0.0, 0.0);
        let end = Position::new(10.0, 0.0);
        assert!(segment_intersects_circle(start, end, Position::new(11.0, 0.0), 0.5, 0.6));
        assert!(!segment_intersects_circle(start, end, Position::new(12.0, 0.0), 0.5, 0.6));
    }

    #[test]
    fn zero_length_segment_is_a_point_test() {
        let point = Position::new(3.0, 3.0);
        assert!(segment_intersects_circle(point, point, Position::new(3.0, 4.0), 0.5, 0.6));
        assert!(!segment_intersects_circle(point, point, Position::new(3.0, 5.0), 0.5, 0.6));
    }

    #[test]
    fn closest_point_stops_short_of_the_surface() {
        let center = Position::new(10.0, 10.0);
        let point = closest_point_to(Position::new(30.0, 10.0), &PositionBody(center, 2.0), 3.0);
        assert_close(point.x(), 15.0);
        assert_close(point.y(), 10.0);
    }

    #[test]
    fn docking_range_includes_both_radii() {
        let resource = ResourceSnapshot {
            id: ResourceId::new(0),
            position: Position::new(0.0, 0.0),
            radius: 5.0,
            health: 100,
            owner: None,
            docking_spots: 2,
            docked_units: Vec::new(),
        };
        let mut unit = UnitSnapshot {
            id: UnitId::new(0),
            owner: PlayerId::new(0),
            position: Position::new(9.5, 0.0),
            radius: UNIT_RADIUS,
            health: 255,
            docking: DockingStatus::Undocked,
            docked_resource: None,
        };
        assert!(can_dock(&unit, &resource, 4.0));

        unit.position = Position::new(9.6, 0.0);
        assert!(!can_dock(&unit, &resource, 4.0));
    }

    struct PositionBody(Position, f64);

    impl Body for PositionBody {
        fn position(&self) -> Position {
            self.0
        }

        fn radius(&self) -> f64 {
            self.1
        }
    }
}
