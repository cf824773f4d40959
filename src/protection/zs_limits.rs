//! 최대 지락 루프 임피던스(Zs) 한계값.
//! 0.4 s 차단 시간(Cmin = 0.95) 기준 참고치이며 설계 시 현행 규격표로 검증해야 한다.

use std::collections::BTreeMap;

use crate::compliance::error::{MissingData, ValidationError};
use crate::protection::device::{DeviceKind, FuseStandard, McbCurve};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZsPoint {
    pub rating_a: f64,
    pub limit_ohm: f64,
}

impl ZsPoint {
    pub const fn new(rating_a: f64, limit_ohm: f64) -> Self {
        Self {
            rating_a,
            limit_ohm,
        }
    }
}

/// 장치 종류 → 정격 → 한계 Ω 테이블. 초기화 후 읽기 전용.
#[derive(Debug, Clone, Default)]
pub struct ZsLimitTable {
    limits: BTreeMap<DeviceKind, Vec<ZsPoint>>,
}

impl ZsLimitTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, kind: DeviceKind, rating_a: f64, limit_ohm: f64) -> Self {
        let points = self.limits.entry(kind).or_default();
        points.retain(|p| p.rating_a != rating_a);
        points.push(ZsPoint::new(rating_a, limit_ohm));
        points.sort_by(|a, b| a.rating_a.total_cmp(&b.rating_a));
        self
    }

    pub fn get(&self, kind: DeviceKind, rating_a: f64) -> Option<f64> {
        self.limits
            .get(&kind)?
            .iter()
            .find(|p| (p.rating_a - rating_a).abs() < 1e-9)
            .map(|p| p.limit_ohm)
    }

    pub fn limit(&self, kind: DeviceKind, rating_a: f64) -> Result<f64, ValidationError> {
        self.get(kind, rating_a)
            .ok_or(ValidationError::MissingReferenceData(MissingData::ZsLimit {
                device: kind,
                rating_a,
            }))
    }

    pub fn points(&self, kind: DeviceKind) -> &[ZsPoint] {
        self.limits.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn builtin() -> Self {
        let mut table = Self::new();
        for (kind, points) in BUILTIN {
            for p in points.iter() {
                table = table.with_limit(*kind, p.rating_a, p.limit_ohm);
            }
        }
        table
    }
}

const fn zp(rating_a: f64, limit_ohm: f64) -> ZsPoint {
    ZsPoint::new(rating_a, limit_ohm)
}

const BUILTIN: &[(DeviceKind, &[ZsPoint])] = &[
    (
        DeviceKind::Mcb(McbCurve::B),
        &[
            zp(6.0, 7.28),
            zp(10.0, 4.37),
            zp(16.0, 2.73),
            zp(20.0, 2.19),
            zp(25.0, 1.75),
            zp(32.0, 1.37),
            zp(40.0, 1.09),
            zp(50.0, 0.87),
            zp(63.0, 0.69),
            zp(80.0, 0.55),
            zp(100.0, 0.44),
            zp(125.0, 0.35),
        ],
    ),
    (
        DeviceKind::Mcb(McbCurve::C),
        &[
            zp(6.0, 3.64),
            zp(10.0, 2.19),
            zp(16.0, 1.37),
            zp(20.0, 1.09),
            zp(25.0, 0.87),
            zp(32.0, 0.68),
            zp(40.0, 0.55),
            zp(50.0, 0.44),
            zp(63.0, 0.35),
            zp(80.0, 0.27),
            zp(100.0, 0.22),
            zp(125.0, 0.17),
        ],
    ),
    (
        DeviceKind::Mcb(McbCurve::D),
        &[
            zp(6.0, 1.82),
            zp(10.0, 1.09),
            zp(16.0, 0.68),
            zp(20.0, 0.55),
            zp(25.0, 0.44),
            zp(32.0, 0.34),
            zp(40.0, 0.27),
            zp(50.0, 0.22),
            zp(63.0, 0.17),
            zp(80.0, 0.14),
            zp(100.0, 0.11),
            zp(125.0, 0.09),
        ],
    ),
    (
        DeviceKind::Fuse(FuseStandard::Bs88_2),
        &[
            zp(2.0, 33.1),
            zp(4.0, 15.6),
            zp(6.0, 7.80),
            zp(10.0, 4.65),
            zp(16.0, 2.43),
            zp(20.0, 1.68),
            zp(25.0, 1.29),
            zp(32.0, 0.99),
            zp(40.0, 0.75),
            zp(50.0, 0.57),
            zp(63.0, 0.44),
            zp(80.0, 0.28),
            zp(100.0, 0.20),
            zp(125.0, 0.16),
            zp(160.0, 0.12),
            zp(200.0, 0.09),
        ],
    ),
    (
        DeviceKind::Fuse(FuseStandard::Bs88_3),
        &[
            zp(5.0, 9.93),
            zp(16.0, 2.30),
            zp(20.0, 1.93),
            zp(32.0, 0.91),
            zp(45.0, 0.57),
            zp(63.0, 0.36),
            zp(80.0, 0.25),
            zp(100.0, 0.19),
        ],
    ),
    (
        DeviceKind::Fuse(FuseStandard::Bs1361),
        &[
            zp(5.0, 10.45),
            zp(15.0, 3.28),
            zp(20.0, 1.70),
            zp(30.0, 1.15),
            zp(45.0, 0.57),
            zp(60.0, 0.35),
            zp(80.0, 0.24),
            zp(100.0, 0.17),
        ],
    ),
    (
        DeviceKind::Fuse(FuseStandard::Bs3036),
        &[
            zp(5.0, 9.10),
            zp(15.0, 2.43),
            zp(20.0, 1.68),
            zp(30.0, 1.04),
            zp(45.0, 0.56),
            zp(60.0, 0.40),
            zp(100.0, 0.18),
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_every_catalog_rating() {
        let table = ZsLimitTable::builtin();
        for kind in DeviceKind::ALL {
            for &rating in kind.catalog() {
                assert!(table.get(kind, rating).is_some(), "{kind} {rating}A");
            }
        }
    }

    #[test]
    fn unknown_rating_is_missing_reference_data() {
        let table = ZsLimitTable::new().with_limit(DeviceKind::Mcb(McbCurve::B), 32.0, 1.37);
        assert_eq!(table.limit(DeviceKind::Mcb(McbCurve::B), 32.0).unwrap(), 1.37);
        assert!(matches!(
            table.limit(DeviceKind::Mcb(McbCurve::B), 40.0),
            Err(ValidationError::MissingReferenceData(MissingData::ZsLimit { .. }))
        ));
    }
}
