use serde::{Deserialize, Serialize};
use std::fmt;

/// MCB 트립 곡선.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum McbCurve {
    B,
    C,
    D,
}

/// 퓨즈 규격.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FuseStandard {
    #[serde(rename = "BS88-2")]
    Bs88_2,
    #[serde(rename = "BS88-3")]
    Bs88_3,
    #[serde(rename = "BS1361")]
    Bs1361,
    /// 반밀폐형(rewireable) 퓨즈
    #[serde(rename = "BS3036")]
    Bs3036,
}

/// 보호장치 종류. 정격 카탈로그와 Zs 테이블의 키가 된다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Mcb(McbCurve),
    Fuse(FuseStandard),
}

impl DeviceKind {
    pub const ALL: [DeviceKind; 7] = [
        DeviceKind::Mcb(McbCurve::B),
        DeviceKind::Mcb(McbCurve::C),
        DeviceKind::Mcb(McbCurve::D),
        DeviceKind::Fuse(FuseStandard::Bs88_2),
        DeviceKind::Fuse(FuseStandard::Bs88_3),
        DeviceKind::Fuse(FuseStandard::Bs1361),
        DeviceKind::Fuse(FuseStandard::Bs3036),
    ];

    pub fn label(self) -> &'static str {
        match self {
            DeviceKind::Mcb(McbCurve::B) => "MCB Type B",
            DeviceKind::Mcb(McbCurve::C) => "MCB Type C",
            DeviceKind::Mcb(McbCurve::D) => "MCB Type D",
            DeviceKind::Fuse(FuseStandard::Bs88_2) => "Fuse BS88-2",
            DeviceKind::Fuse(FuseStandard::Bs88_3) => "Fuse BS88-3",
            DeviceKind::Fuse(FuseStandard::Bs1361) => "Fuse BS1361",
            DeviceKind::Fuse(FuseStandard::Bs3036) => "Fuse BS3036 (semi-enclosed)",
        }
    }

    /// 표준 정격 목록(A, 오름차순, 비어 있지 않음).
    pub fn catalog(self) -> &'static [f64] {
        match self {
            DeviceKind::Mcb(_) => MCB_RATINGS,
            DeviceKind::Fuse(FuseStandard::Bs88_2) => BS88_2_RATINGS,
            DeviceKind::Fuse(FuseStandard::Bs88_3) => BS88_3_RATINGS,
            DeviceKind::Fuse(FuseStandard::Bs1361) => BS1361_RATINGS,
            DeviceKind::Fuse(FuseStandard::Bs3036) => BS3036_RATINGS,
        }
    }

    /// 규격별 유효 정격 배수. 반밀폐형 퓨즈만 0.725를 적용한다.
    pub fn effective_rating_multiplier(self) -> f64 {
        match self {
            DeviceKind::Fuse(FuseStandard::Bs3036) => 0.725,
            _ => 1.0,
        }
    }

    /// Ib 이상인 가장 작은 정격을 고른다. 없으면 카탈로그 최대값(정격 부족으로 판정되도록).
    pub fn select_rating(self, design_current_a: f64) -> f64 {
        let catalog = self.catalog();
        catalog
            .iter()
            .copied()
            .find(|&rating| rating >= design_current_a)
            .unwrap_or_else(|| catalog.iter().copied().fold(f64::MIN, f64::max))
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 선정된 보호장치.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProtectiveDevice {
    pub kind: DeviceKind,
    pub nominal_rating_a: f64,
    pub effective_rating_a: f64,
}

impl ProtectiveDevice {
    pub fn select(kind: DeviceKind, design_current_a: f64) -> Self {
        let nominal_rating_a = kind.select_rating(design_current_a);
        Self {
            kind,
            nominal_rating_a,
            effective_rating_a: nominal_rating_a * kind.effective_rating_multiplier(),
        }
    }

    /// 카탈로그 최대 정격으로도 Ib를 감당하지 못하는 경우.
    pub fn is_undersized(&self, design_current_a: f64) -> bool {
        self.nominal_rating_a < design_current_a
    }
}

const MCB_RATINGS: &[f64] = &[
    6.0, 10.0, 16.0, 20.0, 25.0, 32.0, 40.0, 50.0, 63.0, 80.0, 100.0, 125.0,
];
const BS88_2_RATINGS: &[f64] = &[
    2.0, 4.0, 6.0, 10.0, 16.0, 20.0, 25.0, 32.0, 40.0, 50.0, 63.0, 80.0, 100.0, 125.0, 160.0,
    200.0,
];
const BS88_3_RATINGS: &[f64] = &[5.0, 16.0, 20.0, 32.0, 45.0, 63.0, 80.0, 100.0];
const BS1361_RATINGS: &[f64] = &[5.0, 15.0, 20.0, 30.0, 45.0, 60.0, 80.0, 100.0];
const BS3036_RATINGS: &[f64] = &[5.0, 15.0, 20.0, 30.0, 45.0, 60.0, 100.0];
