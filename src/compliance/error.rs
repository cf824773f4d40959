use std::fmt;

use crate::cable::cable_table::{CableType, CrossSection};
use crate::protection::device::DeviceKind;

/// 참조 테이블에서 찾지 못한 항목.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissingData {
    Cable {
        cable_type: CableType,
        size: CrossSection,
    },
    /// 케이블은 있으나 R1+R2 값이 없어 Zs를 계산할 수 없음
    CpcResistance {
        cable_type: CableType,
        size: CrossSection,
    },
    ZsLimit {
        device: DeviceKind,
        rating_a: f64,
    },
}

impl fmt::Display for MissingData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingData::Cable { cable_type, size } => {
                write!(f, "no cable data for {cable_type} {size} mm²")
            }
            MissingData::CpcResistance { cable_type, size } => {
                write!(f, "no R1+R2 data for {cable_type} {size} mm²")
            }
            MissingData::ZsLimit { device, rating_a } => {
                write!(f, "no Zs limit for {device} {rating_a} A")
            }
        }
    }
}

/// 계산 전 입력 검증 오류. 사용자가 입력을 고쳐 다시 시도할 수 있다.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing reference data: {0}")]
    MissingReferenceData(MissingData),
    #[error("{quantity} out of range: {value} (expected {expected})")]
    OutOfRange {
        quantity: &'static str,
        value: f64,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    MissingReferenceData,
    OutOfRange,
}

impl ValidationError {
    pub fn kind(&self) -> ValidationKind {
        match self {
            ValidationError::MissingReferenceData(_) => ValidationKind::MissingReferenceData,
            ValidationError::OutOfRange { .. } => ValidationKind::OutOfRange,
        }
    }
}
