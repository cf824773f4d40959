//! 전압강하·열적 보정·보호장치·Zs 적합성 판정.

pub mod engine;
pub mod error;
pub mod voltage_drop;

pub use engine::*;
pub use error::*;
pub use voltage_drop::{UsageCategory, VoltageDropCheck};
