//! 케이블 참조 데이터와 보정계수 모듈 모음.

pub mod cable_table;
pub mod derating;

pub use cable_table::*;
pub use derating::*;
