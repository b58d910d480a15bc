use std::path::Path;

use raybox::error::SceneError;
use raybox::json_parser::{parse_scene_json, parse_scene_str};
use raybox::numeric::Vector3;
use raybox::ray::COST_INTERSECTION;

fn sample_scene_path() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("inputs").join("boxes.json")
}

#[test]
fn sample_scene_queries() {
    let mut root = parse_scene_json(&sample_scene_path()).expect("sample scene should parse");
    root.scene.setup().expect("sample scene should set up");
    assert_eq!(root.scene.objects.len(), 4);

    let results = root.scene.run_queries();
    assert_eq!(results.len(), 4);
    // Order of the rays in the file is kept
    let ids: Vec<usize> = results.iter().map(|r| r.ray_id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    for r in &results {
        assert_eq!(r.traversal_cost, 4.0 * COST_INTERSECTION);
    }

    // +x: translated unit box, entry face at x = 4
    let hit = results[0].intersection.unwrap();
    assert_eq!(results[0].box_id, Some(1));
    assert_eq!(hit.t, 4.0);
    assert_eq!(hit.normal, Some(-Vector3::X));

    // -z: scaled, rotated and translated box, its corner points at the origin
    let hit = results[1].intersection.unwrap();
    assert_eq!(results[1].box_id, Some(2));
    let expected = 8.0 - 0.5 * 2.0_f64.sqrt();
    assert!((hit.t - expected).abs() < 1e-9, "t = {}", hit.t);
    assert!(hit.point.abs_diff_eq(Vector3::new(0.0, 0.0, -expected), 1e-9));

    // +z: wide slab given with array syntax
    let hit = results[2].intersection.unwrap();
    assert_eq!(results[2].box_id, Some(4));
    assert_eq!(hit.t, 5.0);
    assert_eq!(hit.normal, Some(-Vector3::Z));

    // +y: parallel to every slab it is outside of
    assert!(results[3].box_id.is_none());
    assert!(results[3].intersection.is_none());
}

#[test]
fn sample_scene_bvh() {
    let mut root = parse_scene_json(&sample_scene_path()).unwrap();
    root.scene.setup().unwrap();
    assert_eq!(root.scene.max_leaf_size, 2);

    let stats = root.scene.bvh.stats();
    assert_eq!(stats.leaf_count, 2);
    assert_eq!(stats.node_count, 3);
    assert!(stats.max_leaf_size <= 2);

    let world = root.scene.bvh.root_bbox().unwrap();
    assert_eq!(world.min.x, -20.0);
    assert_eq!(world.max.x, 20.0);
    assert!(world.min.z < -8.0);
    assert_eq!(world.max.z, 6.0);
}

#[test]
fn report_serializes() {
    let mut root = parse_scene_json(&sample_scene_path()).unwrap();
    root.scene.setup().unwrap();
    let json = serde_json::to_value(root.scene.report()).unwrap();
    assert_eq!(json["results"].as_array().unwrap().len(), 4);
    assert_eq!(json["results"][0]["box_id"], 1);
    assert!(json["results"][3]["intersection"].is_null());
    assert_eq!(json["bvh"]["leaf_count"], 2);
}

#[test]
fn unknown_transformation_fails_setup() {
    let mut root = parse_scene_str(r#"{ "Scene": {
        "Boxes": { "Box": { "_id": "1", "Min": "0 0 0", "Max": "1 1 1", "Transformations": "t3" } }
    } }"#).unwrap();
    let err = root.scene.setup().unwrap_err();
    assert!(matches!(err, SceneError::UnknownTransform(_)));
    assert!(err.to_string().contains("t3"));
}

#[test]
fn missing_file_is_io_error() {
    let err = parse_scene_json(Path::new("./does/not/exist.json")).unwrap_err();
    assert!(matches!(err, SceneError::Io(_)));
}

#[test]
fn broken_json_is_json_error() {
    assert!(matches!(parse_scene_str("{ \"Scene\": "), Err(SceneError::Json(_))));
    assert!(matches!(
        parse_scene_str(r#"{ "Scene": { "Rays": { "Ray": { "_id": "1", "Origin": "0 0", "Direction": "1 0 0" } } } }"#),
        Err(SceneError::Json(_))
    ));
}
