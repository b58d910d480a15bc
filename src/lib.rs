pub mod ray;
pub mod acceleration;
pub mod bbox;
pub mod error;
pub mod scene;
pub mod numeric;
pub mod interval;
pub mod geometry;
pub mod transform;
pub mod json_structs;
pub mod json_parser;

pub mod prelude;
