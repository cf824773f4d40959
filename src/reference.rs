//! 시작 시 한 번 읽어 들이는 참조 테이블 묶음.

use crate::cable::cable_table::{CableDataError, CableTable};
use crate::config::Config;
use crate::protection::zs_limits::ZsLimitTable;

/// 프로세스 전체에서 읽기 전용으로 공유하는 참조 데이터.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub cables: CableTable,
    pub zs_limits: ZsLimitTable,
}

impl ReferenceData {
    /// 설정에 케이블 테이블 경로가 있으면 그 파일을, 없으면 내장 테이블을 쓴다.
    /// 파일 누락/형식 오류는 입력을 받기 전에 실패로 돌려준다.
    pub fn load(cfg: &Config) -> Result<Self, CableDataError> {
        let cables = match &cfg.data.cable_data {
            Some(path) => CableTable::load(path, cfg.data.rx_convention)?,
            None => {
                tracing::info!("using built-in cable table");
                CableTable::builtin()
            }
        };
        Ok(Self {
            cables,
            zs_limits: ZsLimitTable::builtin(),
        })
    }

    pub fn builtin() -> Self {
        Self {
            cables: CableTable::builtin(),
            zs_limits: ZsLimitTable::builtin(),
        }
    }
}
