//! Build analysis: running cargo-bloat and decoding its output

pub mod bloat;
pub mod collector;

pub use bloat::{parse_bloat_json, BloatEntry, BloatOutput, Breakdown};
pub use collector::{locate_cargo, BloatCollector, MeasurementSource};
