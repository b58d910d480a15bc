/*

    Provide utilities to parse scene JSON files.

    This format assumes:
        - Numbers may be given as is or in quotes (e.g. "6")
        - Vector3 data fields are in format "<a> <a> <a>" or [a, a, a]
          where <a> is integer or float
        - Transformation expressions are whitespace separated tokens
          like "s1 r2 t1", applied left to right

    e.g. In JSON file both
    "MaxLeafSize": "2" and "MaxLeafSize": 2
    works as max_leaf_size: usize in source code

    @date: 2 Oct, 2025
    @author: bartu
*/

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::SceneError;
use crate::json_structs::{TransformKind, TransformRecord, Transformations};
use crate::prelude::*;
use crate::scene::RootScene;
use crate::transform::Transform;

pub fn parse_scene_json(path: &Path) -> Result<RootScene, SceneError> {

    let span = tracing::span!(tracing::Level::INFO, "load_scene");
    let _enter = span.enter();

    // Open file
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    debug!("Reading file from {}", path.display());

    // Parse JSON into Scene
    let root: RootScene = serde_json::from_reader(reader)?;
    Ok(root)
}

pub fn parse_scene_str(json: &str) -> Result<RootScene, SceneError> {
    Ok(serde_json::from_str(json)?)
}


pub(crate) fn deser_usize<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    /*
        Deserialize usize type given as either string or number in JSON
    */
    let s: serde_json::Value = Deserialize::deserialize(deserializer)?;
    match s {
        serde_json::Value::Number(n) => n.as_u64()
            .map(|v| v as usize)
            .ok_or_else(|| de::Error::custom("Invalid unsigned integer")),
        serde_json::Value::String(s) => s.trim().parse::<usize>()
            .map_err(|_| de::Error::custom(format!("Failed to parse integer from string '{s}'"))),
        t => Err(de::Error::custom(format!("Expected int or string, found {t}"))),
    }
}

fn value_to_float<E: de::Error>(v: &serde_json::Value) -> Result<Float, E> {
    match v {
        serde_json::Value::Number(n) => n.as_f64()
            .ok_or_else(|| de::Error::custom("Invalid float")),
        serde_json::Value::String(s) => s.trim().parse::<Float>()
            .map_err(|_| de::Error::custom(format!("Failed to parse float from string '{s}'"))),
        t => Err(de::Error::custom(format!("Expected float or string, found {t}"))),
    }
}

pub(crate) fn deser_vec3<'de, D>(deserializer: D) -> Result<Vector3, D::Error>
where
    D: Deserializer<'de>,
{
    let v = deser_float_vec(deserializer)?;
    match v.as_slice() {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        other => Err(de::Error::custom(format!("Expected 3 values for a Vec3, got {}", other.len()))),
    }
}

pub(crate) fn deser_float_vec<'de, D>(deserializer: D) -> Result<Vec<Float>, D::Error>
where
    D: Deserializer<'de>,
{
    // Deserialize numbers given either as a single string "0 2.5 3"
    // or as an array whose entries are numbers or numeric strings.
    struct FloatVecVisitor;

    impl<'de> Visitor<'de> for FloatVecVisitor {
        type Value = Vec<Float>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string of whitespace separated numbers or an array of numbers")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            parse_float_list(value).map_err(de::Error::custom)
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![v as Float])
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![v as Float])
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![v as Float])
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut out = Vec::new();
            while let Some(elem) = seq.next_element::<serde_json::Value>()? {
                out.push(value_to_float::<A::Error>(&elem)?);
            }
            Ok(out)
        }
    }

    deserializer.deserialize_any(FloatVecVisitor)
}

/// Helper function: parse a string like "25 25 25" into floats
pub fn parse_float_list(s: &str) -> Result<Vec<Float>, String> {
    s.split_whitespace()
        .map(|x| x.parse::<Float>().map_err(|e| format!("'{x}': {e}")))
        .collect()
}


fn record_to_transform(kind: TransformKind, record: &TransformRecord) -> Result<Transform, SceneError> {
    let bad_len = |expected: usize| {
        SceneError::MalformedTransform(format!(
            "{:?} {} expects {} values, got {}", kind, record.id, expected, record.data.len()
        ))
    };
    let d = &record.data;
    match kind {
        TransformKind::Translation => match d.as_slice() {
            [x, y, z] => Ok(Transform::translation(Vector3::new(*x, *y, *z))),
            _ => Err(bad_len(3)),
        },
        TransformKind::Scaling => match d.as_slice() {
            [x, y, z] => Transform::scaling(Vector3::new(*x, *y, *z)),
            _ => Err(bad_len(3)),
        },
        TransformKind::Rotation => match d.as_slice() {
            // angle in degrees, then axis
            [angle, x, y, z] => Transform::rotation(Vector3::new(*x, *y, *z), *angle),
            _ => Err(bad_len(4)),
        },
        TransformKind::Composite => {
            if d.len() != 16 {
                return Err(bad_len(16));
            }
            // Given row by row in the file
            let mut rows = [0.0; 16];
            rows.copy_from_slice(d);
            Transform::from_matrix(Matrix4::from_cols_array(&rows).transpose())
        }
    }
}

/// Resolve an expression like "s1 r1 t2" against the declared transformations.
///
/// Tokens are applied left to right, so "s1 t1" scales first and then
/// translates. Unknown ids are errors, malformed tokens are skipped.
pub fn parse_transform_expression(
    expr: &str,
    global_transforms: &Transformations
) -> Result<Transform, SceneError> {

    let mut out = Transform::IDENTITY;

    for token in expr.split_whitespace() {
        debug!("Parsing token {}", token);
        if token.len() < 2 || !token.is_char_boundary(1) {
            warn!("Found malformed token '{}', skipping...", token);
            continue;
        }

        let (kind, id_str) = token.split_at(1);
        let id: usize = match id_str.parse() {
            Ok(n) => n,
            Err(_) => {
                warn!("Invalid transformation id in '{}'", token);
                continue;
            }
        };
        let kind = match kind {
            "t" | "T" => TransformKind::Translation,
            "s" | "S" => TransformKind::Scaling,
            "r" | "R" => TransformKind::Rotation,
            "c" | "C" => TransformKind::Composite,
            _ => {
                warn!("Unknown transform token '{}'", kind);
                continue;
            }
        };

        let record = global_transforms
            .find(kind, id)
            .ok_or_else(|| SceneError::UnknownTransform(token.to_string()))?;
        debug!("Found {:?}: {:?}", kind, record);
        out = out.then(&record_to_transform(kind, record)?);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_structs::SingleOrVec;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "deser_vec3")]
        v: Vector3,
        #[serde(deserialize_with = "deser_usize")]
        n: usize,
    }

    fn record(id: usize, data: &[Float]) -> TransformRecord {
        TransformRecord { id, data: data.to_vec() }
    }

    fn transforms() -> Transformations {
        Transformations {
            translations: SingleOrVec::Multiple(vec![record(1, &[5.0, 0.0, 0.0]), record(2, &[0.0, 1.0, 0.0])]),
            scalings: SingleOrVec::Single(record(1, &[2.0, 2.0, 2.0])),
            rotations: SingleOrVec::Single(record(1, &[90.0, 0.0, 0.0, 1.0])),
            composites: SingleOrVec::Single(record(1, &[
                1.0, 0.0, 0.0, 3.0,
                0.0, 1.0, 0.0, 0.0,
                0.0, 0.0, 1.0, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ])),
        }
    }

    #[test]
    fn vec3_from_string_or_array() {
        let p: Probe = serde_json::from_str(r#"{"v": "1 2.5 -3", "n": "7"}"#).unwrap();
        assert_eq!(p.v, Vector3::new(1.0, 2.5, -3.0));
        assert_eq!(p.n, 7);

        let p: Probe = serde_json::from_str(r#"{"v": [1, "2", 3.5], "n": 7}"#).unwrap();
        assert_eq!(p.v, Vector3::new(1.0, 2.0, 3.5));

        assert!(serde_json::from_str::<Probe>(r#"{"v": "1 2", "n": 1}"#).is_err());
        assert!(serde_json::from_str::<Probe>(r#"{"v": "1 a 2", "n": 1}"#).is_err());
    }

    #[test]
    fn expression_order_is_left_to_right() {
        let t = parse_transform_expression("s1 t1", &transforms()).unwrap();
        assert_eq!(t.point_to_world(&Vector3::X), Vector3::new(7.0, 0.0, 0.0));

        let t = parse_transform_expression("t1 s1", &transforms()).unwrap();
        assert_eq!(t.point_to_world(&Vector3::X), Vector3::new(12.0, 0.0, 0.0));
    }

    #[test]
    fn rotation_and_composite_records() {
        let t = parse_transform_expression("r1", &transforms()).unwrap();
        assert!(t.point_to_world(&Vector3::X).abs_diff_eq(Vector3::Y, 1e-12));

        let t = parse_transform_expression("c1", &transforms()).unwrap();
        assert_eq!(t.point_to_world(&Vector3::ZERO), Vector3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn empty_and_malformed_expressions() {
        assert!(parse_transform_expression("", &transforms()).unwrap().is_identity());
        // Malformed tokens are skipped with a warning
        let t = parse_transform_expression("x t tq t2", &transforms()).unwrap();
        assert_eq!(t.point_to_world(&Vector3::ZERO), Vector3::Y);
    }

    #[test]
    fn unknown_id_is_an_error() {
        let err = parse_transform_expression("t9", &transforms()).unwrap_err();
        assert!(matches!(err, SceneError::UnknownTransform(ref tok) if tok == "t9"));
    }

    #[test]
    fn wrong_record_length_is_an_error() {
        let mut tf = transforms();
        tf.rotations = SingleOrVec::Single(record(1, &[90.0, 0.0, 1.0]));
        assert!(matches!(
            parse_transform_expression("r1", &tf),
            Err(SceneError::MalformedTransform(_))
        ));
    }

    #[test]
    fn small_scale_composite_matches_scaling() {
        let mut tf = transforms();
        tf.scalings = SingleOrVec::Single(record(1, &[0.001, 0.001, 0.001]));
        tf.composites = SingleOrVec::Single(record(1, &[
            0.001, 0.0, 0.0, 0.0,
            0.0, 0.001, 0.0, 0.0,
            0.0, 0.0, 0.001, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ]));
        let s = parse_transform_expression("s1", &tf).unwrap();
        let c = parse_transform_expression("c1", &tf).unwrap();
        let p = Vector3::new(1000.0, -2000.0, 500.0);
        assert!(c.point_to_world(&p).abs_diff_eq(s.point_to_world(&p), 1e-12));
        assert!(c.point_to_local(&Vector3::ONE).abs_diff_eq(Vector3::splat(1000.0), 1e-9));
    }

    #[test]
    fn singular_scaling_is_an_error() {
        let mut tf = transforms();
        tf.scalings = SingleOrVec::Single(record(1, &[1.0, 0.0, 1.0]));
        assert!(matches!(
            parse_transform_expression("s1", &tf),
            Err(SceneError::SingularTransform(_))
        ));
    }
}
