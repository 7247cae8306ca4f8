//! I/O operations for reading and writing vector data
//!
//! GeoJSON is the only supported format. Reading and writing from strings is
//! always available alongside the file-based functions.

mod geojson;

pub use geojson::{read_geojson, read_geojson_from_str, write_geojson, write_geojson_to_string};
