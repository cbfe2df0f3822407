pub mod config;
pub mod math;

pub use config::*;
pub use math::*;
