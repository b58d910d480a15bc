/*

    Declare data structs needed to parse JSON.

    - SingleOrVec: a single <object> or an array of them
    - Transformations: named translation / scaling /
      rotation / composite records referenced by id
    - BoxJSON, RayJSON: raw scene entries

    @date: 13 Oct, 2025
    @author: Bartu
*/

use crate::json_parser::{deser_float_vec, deser_usize, deser_vec3};
use crate::prelude::*;


// To handle JSON file having a single <object>
// or an array of <object>s
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum SingleOrVec<T> {
    Empty,
    Single(T),
    Multiple(Vec<T>),
}

impl<T> SingleOrVec<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            SingleOrVec::Empty => &[],
            SingleOrVec::Single(t) => std::slice::from_ref(t),
            SingleOrVec::Multiple(vec) => vec.as_slice(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for SingleOrVec<T> {
    fn default() -> Self {
        SingleOrVec::Empty
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    Translation,
    Scaling,
    Rotation,
    Composite,
}

/// One entry of the Transformations block, `_data` is kept raw
/// because its length depends on the kind.
#[derive(Debug, Clone, Deserialize)]
pub struct TransformRecord {
    #[serde(rename = "_id", deserialize_with = "deser_usize")]
    pub id: usize,
    #[serde(rename = "_data", deserialize_with = "deser_float_vec")]
    pub data: Vec<Float>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Transformations {
    #[serde(rename = "Translation")]
    pub translations: SingleOrVec<TransformRecord>,
    #[serde(rename = "Scaling")]
    pub scalings: SingleOrVec<TransformRecord>,
    #[serde(rename = "Rotation")]
    pub rotations: SingleOrVec<TransformRecord>,
    #[serde(rename = "Composite")]
    pub composites: SingleOrVec<TransformRecord>,
}

impl Transformations {
    pub fn find(&self, kind: TransformKind, id: usize) -> Option<&TransformRecord> {
        let records = match kind {
            TransformKind::Translation => &self.translations,
            TransformKind::Scaling => &self.scalings,
            TransformKind::Rotation => &self.rotations,
            TransformKind::Composite => &self.composites,
        };
        records.iter().find(|r| r.id == id)
    }
}


#[derive(Debug, Clone, Deserialize)]
pub struct BoxJSON {
    #[serde(rename = "_id", deserialize_with = "deser_usize")]
    pub id: usize,
    #[serde(rename = "Min", deserialize_with = "deser_vec3")]
    pub min: Vector3,
    #[serde(rename = "Max", deserialize_with = "deser_vec3")]
    pub max: Vector3,
    #[serde(rename = "Transformations", default)]
    pub transformations: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RayJSON {
    #[serde(rename = "_id", deserialize_with = "deser_usize")]
    pub id: usize,
    #[serde(rename = "Origin", deserialize_with = "deser_vec3")]
    pub origin: Vector3,
    #[serde(rename = "Direction", deserialize_with = "deser_vec3")]
    pub direction: Vector3,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BoxesJSON {
    #[serde(rename = "Box")]
    pub boxes: SingleOrVec<BoxJSON>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RaysJSON {
    #[serde(rename = "Ray")]
    pub rays: SingleOrVec<RayJSON>,
}
