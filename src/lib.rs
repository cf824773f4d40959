//! BS7671 케이블 적합성 계산 라이브러리. CLI와 GUI가 같은 엔진을 공유한다.

pub mod app;
pub mod cable;
pub mod compliance;
pub mod config;
pub mod logging;
pub mod protection;
pub mod reference;
pub mod report;
pub mod ui_cli;
