//! # Tests for Config Constants
//!
//! Unit tests verifying the relationships between configuration constants.

use crate::constants::*;

// =============================================================================
// JOINT GEOMETRY TESTS
// =============================================================================

#[test]
fn test_print_angle_has_unit_slope() {
    // Chamfer derivations divide by tan(PRINT_ANGLE)
    assert!((PRINT_ANGLE.tan() - 1.0).abs() < 1e-12);
}

#[test]
fn test_socket_clearance_bounds_are_ordered() {
    assert!(SOCKET_V_CLEARANCE > 0.0);
    assert!(SOCKET_V_CLEARANCE_MAX > SOCKET_V_CLEARANCE);
}

#[test]
fn test_complement_angle_is_tiny_but_positive() {
    assert!(MIN_COMPLEMENT_ANGLE > 0.0);
    assert!(MIN_COMPLEMENT_ANGLE < PRINT_ANGLE / 10.0);
}

// =============================================================================
// INPUT BOUND TESTS
// =============================================================================

#[test]
fn test_defaults_satisfy_bounds() {
    assert!(DEFAULT_SIZE >= MIN_SIZE);
    assert!(DEFAULT_CLEARANCE >= MIN_CLEARANCE);
    assert!(DEFAULT_RESOLUTION >= MIN_RESOLUTION);
    assert_eq!(DEFAULT_RESOLUTION % 2, 0);
    for angle in [DEFAULT_UP_ANGLE, DEFAULT_DOWN_ANGLE, DEFAULT_HORIZONTAL_ANGLE] {
        assert!((0.0..=MAX_BEND_ANGLE).contains(&angle));
    }
}

#[test]
fn test_max_bend_angle_matches_print_angle() {
    assert_eq!(MAX_BEND_ANGLE, PRINT_ANGLE);
}

// =============================================================================
// TOLERANCE TESTS
// =============================================================================

#[test]
fn test_cleanup_threshold_exceeds_solver_tolerances() {
    assert!(CLEANUP_THRESHOLD > BSP_EPSILON);
    assert!(CLEANUP_THRESHOLD > WELD_EPSILON);
}

#[test]
fn test_cleanup_threshold_below_clearance() {
    // Cleanup must never close the printed gap between moving parts
    assert!(CLEANUP_THRESHOLD < MIN_CLEARANCE / 10.0);
}

#[test]
fn test_tjunction_epsilon_between_weld_and_cleanup() {
    // Wide enough for welded split points, narrow enough to leave real
    // features apart
    assert!(TJUNCTION_EPSILON > WELD_EPSILON);
    assert!(TJUNCTION_EPSILON > BSP_EPSILON);
    assert!(TJUNCTION_EPSILON < CLEANUP_THRESHOLD);
}
