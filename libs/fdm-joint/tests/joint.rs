use std::f64::consts::FRAC_PI_2;

use fdm_joint::{build_joint, build_joint_mesh, CsgSink, JointError, JointInputs, JointVariant, Placement};
use glam::DVec3;

fn small(variant: JointVariant) -> JointInputs {
    JointInputs {
        variant,
        resolution: 16,
        ..JointInputs::default()
    }
}

#[test]
fn one_sided_default_builds_single_solid() {
    let mut sink = CsgSink::new();
    let handle = build_joint(&mut sink, &JointInputs::default(), &Placement::identity()).unwrap();
    assert_eq!(sink.live_count(), 1);

    let mesh = sink.take(handle).unwrap();
    assert!(!mesh.is_empty());
    assert!(mesh.validate().is_ok());
    assert!(mesh.is_manifold(), "{:?}", mesh.edge_report());
    assert!(mesh.signed_volume() > 0.0);

    // The floor cut leaves the part resting on z = -1.
    let (min, max) = mesh.bounding_box();
    assert!(min.z >= -1.0 - 1e-3, "part pokes through the bed cut at {}", min.z);
    assert!(max.z > 0.0);
}

#[test]
fn two_sided_smallest_joint_builds() {
    let inputs = JointInputs {
        variant: JointVariant::TwoSided,
        size: 2.9,
        clearance: 0.1,
        resolution: 8,
        ..JointInputs::default()
    };
    let mesh = build_joint_mesh(&inputs, &Placement::identity()).unwrap();
    assert!(!mesh.is_empty());
    assert!(mesh.is_manifold(), "{:?}", mesh.edge_report());
    assert!(mesh.signed_volume() > 0.0);
}

#[test]
fn two_sided_low_resolution_is_closed() {
    let mesh = build_joint_mesh(&small(JointVariant::TwoSided), &Placement::identity()).unwrap();
    assert!(mesh.is_manifold(), "{:?}", mesh.edge_report());
}

#[test]
fn two_sided_spans_both_halves() {
    let one = build_joint_mesh(&small(JointVariant::OneSided), &Placement::identity()).unwrap();
    let two = build_joint_mesh(&small(JointVariant::TwoSided), &Placement::identity()).unwrap();
    let (one_min, one_max) = one.bounding_box();
    let (two_min, two_max) = two.bounding_box();
    assert!(two_max.y - two_min.y > one_max.y - one_min.y);
}

#[test]
fn rejected_inputs_generate_nothing() {
    let mut sink = CsgSink::new();
    let too_small = JointInputs {
        size: 2.0,
        ..JointInputs::default()
    };
    let err = build_joint(&mut sink, &too_small, &Placement::identity()).unwrap_err();
    assert!(matches!(err, JointError::Constraint(_)));

    let tight = JointInputs {
        size: 2.9,
        clearance: 0.3,
        ..JointInputs::default()
    };
    let err = build_joint(&mut sink, &tight, &Placement::identity()).unwrap_err();
    assert!(err.to_string().contains("clearance"));
    assert_eq!(sink.live_count(), 0);
}

#[test]
fn placement_moves_finished_joint() {
    let inputs = small(JointVariant::OneSided);
    let (min, max) = build_joint_mesh(&inputs, &Placement::identity())
        .unwrap()
        .bounding_box();

    let shift = DVec3::new(10.0, -3.0, 2.0);
    let (moved_min, moved_max) = build_joint_mesh(&inputs, &Placement::translation(shift))
        .unwrap()
        .bounding_box();
    assert!(moved_min.abs_diff_eq(min + shift, 1e-9));
    assert!(moved_max.abs_diff_eq(max + shift, 1e-9));
}

#[test]
fn rotation_pivots_about_axle() {
    let inputs = small(JointVariant::OneSided);
    let (min, max) = build_joint_mesh(&inputs, &Placement::identity())
        .unwrap()
        .bounding_box();

    let quarter_turn = Placement::from_location_euler(DVec3::ZERO, DVec3::new(0.0, 0.0, FRAC_PI_2));
    let (turned_min, turned_max) = build_joint_mesh(&inputs, &quarter_turn)
        .unwrap()
        .bounding_box();

    // A quarter turn about Z maps (x, y) to (-y, x) and leaves heights alone.
    assert!((turned_min.x + max.y).abs() < 1e-9);
    assert!((turned_max.x + min.y).abs() < 1e-9);
    assert!((turned_min.y - min.x).abs() < 1e-9);
    assert!((turned_min.z - min.z).abs() < 1e-9);
    assert!((turned_max.z - max.z).abs() < 1e-9);
}

#[test]
fn request_parses_from_json() {
    let inputs: JointInputs =
        serde_json::from_str(r#"{ "variant": "one_sided", "size": 5.0, "resolution": 16 }"#).unwrap();
    let mesh = build_joint_mesh(&inputs, &Placement::identity()).unwrap();
    assert!(mesh.signed_volume() > 0.0);
}
