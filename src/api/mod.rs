pub mod geocode;

pub use geocode::{Coordinates, GeocodeClient};
