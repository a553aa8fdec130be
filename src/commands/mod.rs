//! Flows return result structs instead of printing their closing text
//! directly; the entry point formats them with the matching `format_*_human`.
mod clean;
mod setup;
mod steps;

pub use clean::*;
pub use setup::*;
pub use steps::*;
