//! 케이블 저항/리액턴스 참조 테이블.
//!
//! 테이블 파일은 mΩ/m 단위로 값을 담고, 내부에서는 모두 Ω/m로 정규화해 보관한다.
//! R/X가 도체 1가닥 값인지 왕복(루프) 값인지는 테이블이 반드시 명시해야 한다.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::compliance::error::{MissingData, ValidationError};

/// 테이블 로드 중 발생 가능한 오류. 모두 시작 시점의 치명적 오류로 취급한다.
#[derive(Debug, thiserror::Error)]
pub enum CableDataError {
    #[error("cable data file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cable data parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cable table does not declare its R/X convention (loop or per_conductor)")]
    UndeclaredConvention,
    #[error("unknown cable type '{0}'")]
    UnknownCableType(String),
    #[error("invalid cross-section '{0}'")]
    InvalidSize(String),
    #[error("invalid {field} for {cable_type} {size} mm²: {value}")]
    InvalidValue {
        cable_type: CableType,
        size: CrossSection,
        field: &'static str,
        value: f64,
    },
}

/// 케이블 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CableType {
    #[serde(rename = "PVC Twin & Earth")]
    PvcTwinAndEarth,
    #[serde(rename = "SWA")]
    Swa,
    #[serde(rename = "XLPE SWA Multi-core")]
    XlpeSwaMultiCore,
    #[serde(rename = "XLPE SWA Single-core")]
    XlpeSwaSingleCore,
}

impl CableType {
    pub const ALL: [CableType; 4] = [
        CableType::PvcTwinAndEarth,
        CableType::Swa,
        CableType::XlpeSwaMultiCore,
        CableType::XlpeSwaSingleCore,
    ];

    /// 테이블 파일 키와 화면 표시에 같이 쓰는 이름.
    pub fn label(self) -> &'static str {
        match self {
            CableType::PvcTwinAndEarth => "PVC Twin & Earth",
            CableType::Swa => "SWA",
            CableType::XlpeSwaMultiCore => "XLPE SWA Multi-core",
            CableType::XlpeSwaSingleCore => "XLPE SWA Single-core",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for CableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 도체 공칭 단면적. 0.01 mm² 단위 정수로 보관하여 테이블 키로 사용한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "SizeRepr", into = "f64")]
pub struct CrossSection(u32);

#[derive(Deserialize)]
#[serde(untagged)]
enum SizeRepr {
    Number(f64),
    Text(String),
}

impl CrossSection {
    pub const fn from_hundredths(hundredths: u32) -> Self {
        Self(hundredths)
    }

    /// mm² 값으로부터 생성한다. 0 이하/비유한 값은 None.
    pub fn from_mm2(mm2: f64) -> Option<Self> {
        if !mm2.is_finite() || mm2 <= 0.0 {
            return None;
        }
        let hundredths = (mm2 * 100.0).round();
        if hundredths < 1.0 || hundredths > u32::MAX as f64 {
            return None;
        }
        Some(Self(hundredths as u32))
    }

    pub fn mm2(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for CrossSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}", self.0 / 100)
        } else if self.0 % 10 == 0 {
            write!(f, "{:.1}", self.mm2())
        } else {
            write!(f, "{:.2}", self.mm2())
        }
    }
}

impl FromStr for CrossSection {
    type Err = CableDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches("mm²").trim_end_matches("mm2").trim();
        trimmed
            .parse::<f64>()
            .ok()
            .and_then(Self::from_mm2)
            .ok_or_else(|| CableDataError::InvalidSize(s.to_string()))
    }
}

impl TryFrom<SizeRepr> for CrossSection {
    type Error = CableDataError;

    fn try_from(value: SizeRepr) -> Result<Self, Self::Error> {
        match value {
            SizeRepr::Number(v) => {
                Self::from_mm2(v).ok_or_else(|| CableDataError::InvalidSize(v.to_string()))
            }
            SizeRepr::Text(s) => s.parse(),
        }
    }
}

impl From<CrossSection> for f64 {
    fn from(value: CrossSection) -> Self {
        value.mm2()
    }
}

/// 테이블 R/X 값의 기준. 전압강하 식의 배수 k를 결정한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RxConvention {
    /// 값이 이미 왕복(go-and-return) 루프 값이다. k = 1
    Loop,
    /// 값이 도체 1가닥 값이다. 2선 회로는 왕복분을 위해 k = 2
    PerConductor,
}

impl RxConvention {
    pub fn multiplier(self) -> f64 {
        match self {
            RxConvention::Loop => 1.0,
            RxConvention::PerConductor => 2.0,
        }
    }
}

impl fmt::Display for RxConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RxConvention::Loop => f.write_str("loop (k = 1)"),
            RxConvention::PerConductor => f.write_str("per conductor (k = 2)"),
        }
    }
}

/// 한 케이블 제품의 참조 데이터. 값은 Ω/m.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CableSpec {
    pub cable_type: CableType,
    pub cross_section: CrossSection,
    pub resistance_ohm_per_m: f64,
    pub reactance_ohm_per_m: f64,
    /// 상도체 + 보호도체(cpc) 합성 저항. Zs 계산에 사용한다.
    pub r1_plus_r2_ohm_per_m: Option<f64>,
}

impl CableSpec {
    /// mΩ/m 값으로부터 생성한다.
    pub fn from_milliohms(
        cable_type: CableType,
        cross_section: CrossSection,
        r_mohm: f64,
        x_mohm: f64,
        r1r2_mohm: Option<f64>,
    ) -> Self {
        Self {
            cable_type,
            cross_section,
            resistance_ohm_per_m: r_mohm / 1000.0,
            reactance_ohm_per_m: x_mohm / 1000.0,
            r1_plus_r2_ohm_per_m: r1r2_mohm.map(|v| v / 1000.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawEntry {
    #[serde(rename = "R")]
    r: f64,
    #[serde(rename = "X")]
    x: f64,
    #[serde(rename = "R1R2", default, skip_serializing_if = "Option::is_none")]
    r1r2: Option<f64>,
}

type RawCables = BTreeMap<String, BTreeMap<String, RawEntry>>;

/// 케이블 참조 테이블. 초기화 후에는 읽기 전용으로 공유한다.
#[derive(Debug, Clone)]
pub struct CableTable {
    convention: RxConvention,
    entries: BTreeMap<(CableType, CrossSection), CableSpec>,
}

impl CableTable {
    pub fn new(convention: RxConvention) -> Self {
        Self {
            convention,
            entries: BTreeMap::new(),
        }
    }

    /// 항목을 추가한 테이블을 반환한다. 대체 테이블 구성용.
    pub fn with_entry(mut self, spec: CableSpec) -> Self {
        self.entries.insert((spec.cable_type, spec.cross_section), spec);
        self
    }

    pub fn convention(&self) -> RxConvention {
        self.convention
    }

    pub fn get(&self, cable_type: CableType, size: CrossSection) -> Option<&CableSpec> {
        self.entries.get(&(cable_type, size))
    }

    /// 테이블에 없는 조합은 기본값 없이 `MissingReferenceData`로 실패한다.
    pub fn lookup(
        &self,
        cable_type: CableType,
        size: CrossSection,
    ) -> Result<&CableSpec, ValidationError> {
        self.get(cable_type, size)
            .ok_or(ValidationError::MissingReferenceData(MissingData::Cable {
                cable_type,
                size,
            }))
    }

    pub fn cable_types(&self) -> Vec<CableType> {
        let mut types: Vec<CableType> = self.entries.keys().map(|(t, _)| *t).collect();
        types.dedup();
        types
    }

    /// 해당 케이블 종류의 단면적 목록(오름차순).
    pub fn sizes(&self, cable_type: CableType) -> Vec<CrossSection> {
        self.entries
            .keys()
            .filter(|(t, _)| *t == cable_type)
            .map(|(_, s)| *s)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CableSpec> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// JSON 파일에서 테이블을 읽는다.
    ///
    /// 파일이 `convention`을 선언하면 그 값을, 아니면 `fallback`을 사용한다.
    /// 둘 다 없으면 `UndeclaredConvention`.
    pub fn load(path: &Path, fallback: Option<RxConvention>) -> Result<Self, CableDataError> {
        let content = fs::read_to_string(path)?;
        let table = Self::from_json_str(&content, fallback)?;
        tracing::info!(
            path = %path.display(),
            entries = table.len(),
            convention = ?table.convention,
            "cable table loaded"
        );
        Ok(table)
    }

    /// 두 형식을 받는다:
    /// - `{"convention": "...", "cables": {type: {size: {"R","X","R1R2"?}}}}`
    /// - `{type: {size: {"R","X"}}}` (convention은 `fallback`에서)
    pub fn from_json_str(src: &str, fallback: Option<RxConvention>) -> Result<Self, CableDataError> {
        let value: serde_json::Value = serde_json::from_str(src)?;
        let (declared, raw): (Option<RxConvention>, RawCables) = match value {
            serde_json::Value::Object(mut obj) if obj.contains_key("cables") => {
                let declared = obj
                    .remove("convention")
                    .map(serde_json::from_value::<RxConvention>)
                    .transpose()?;
                let cables = obj.remove("cables").unwrap_or_default();
                (declared, serde_json::from_value(cables)?)
            }
            other => (None, serde_json::from_value(other)?),
        };
        let convention = declared
            .or(fallback)
            .ok_or(CableDataError::UndeclaredConvention)?;

        let mut table = Self::new(convention);
        for (type_key, sizes) in raw {
            let cable_type = CableType::from_label(&type_key)
                .ok_or_else(|| CableDataError::UnknownCableType(type_key.clone()))?;
            for (size_key, entry) in sizes {
                let size: CrossSection = size_key.parse()?;
                validate_entry(cable_type, size, &entry)?;
                table = table.with_entry(CableSpec::from_milliohms(
                    cable_type, size, entry.r, entry.x, entry.r1r2,
                ));
            }
        }
        Ok(table)
    }

    /// 내장 테이블. 구리 도체 20 °C 기준, 도체 1가닥 값(k = 2).
    pub fn builtin() -> Self {
        let mut table = Self::new(RxConvention::PerConductor);
        for (cable_type, rows) in BUILTIN {
            for row in rows.iter() {
                table = table.with_entry(CableSpec::from_milliohms(
                    *cable_type,
                    CrossSection::from_hundredths(row.size),
                    row.r,
                    row.x,
                    row.r1r2,
                ));
            }
        }
        table
    }
}

fn validate_entry(
    cable_type: CableType,
    size: CrossSection,
    entry: &RawEntry,
) -> Result<(), CableDataError> {
    let invalid = |field: &'static str, value: f64| CableDataError::InvalidValue {
        cable_type,
        size,
        field,
        value,
    };
    if !entry.r.is_finite() || entry.r <= 0.0 {
        return Err(invalid("R", entry.r));
    }
    if !entry.x.is_finite() || entry.x < 0.0 {
        return Err(invalid("X", entry.x));
    }
    if let Some(r1r2) = entry.r1r2 {
        if !r1r2.is_finite() || r1r2 <= 0.0 {
            return Err(invalid("R1R2", r1r2));
        }
    }
    Ok(())
}

struct Row {
    size: u32,
    r: f64,
    x: f64,
    r1r2: Option<f64>,
}

const fn row(size: u32, r: f64, x: f64, r1r2: Option<f64>) -> Row {
    Row { size, r, x, r1r2 }
}

const BUILTIN: &[(CableType, &[Row])] = &[
    (CableType::PvcTwinAndEarth, PVC_TWIN_EARTH),
    (CableType::Swa, SWA_MULTICORE),
    (CableType::XlpeSwaMultiCore, SWA_MULTICORE),
    (CableType::XlpeSwaSingleCore, XLPE_SWA_SINGLE),
];

// R1R2는 상도체 + cpc(Twin & Earth는 감소 단면 cpc, SWA는 외장 철선) 합성 저항.
const PVC_TWIN_EARTH: &[Row] = &[
    row(100, 18.10, 0.08, Some(36.20)),
    row(150, 12.10, 0.08, Some(30.20)),
    row(250, 7.41, 0.08, Some(19.51)),
    row(400, 4.61, 0.08, Some(16.71)),
    row(600, 3.08, 0.08, Some(10.49)),
    row(1000, 1.83, 0.08, Some(6.44)),
    row(1600, 1.15, 0.08, Some(4.23)),
];

const SWA_MULTICORE: &[Row] = &[
    row(150, 12.10, 0.08, Some(22.30)),
    row(250, 7.41, 0.08, Some(16.21)),
    row(400, 4.61, 0.08, Some(12.51)),
    row(600, 3.08, 0.08, Some(10.08)),
    row(1000, 1.83, 0.08, Some(7.73)),
    row(1600, 1.15, 0.08, Some(5.25)),
    row(2500, 0.727, 0.078, Some(4.427)),
    row(3500, 0.524, 0.077, Some(3.124)),
    row(5000, 0.387, 0.077, Some(2.787)),
    row(7000, 0.268, 0.075, Some(2.268)),
    row(9500, 0.193, 0.075, Some(1.593)),
    row(12000, 0.153, 0.074, Some(1.453)),
    row(15000, 0.124, 0.074, Some(1.224)),
    row(18500, 0.0991, 0.074, Some(1.0991)),
    row(24000, 0.0754, 0.073, Some(0.9754)),
    row(30000, 0.0601, 0.073, Some(0.8601)),
];

// 단심 케이블은 별도 cpc를 쓰므로 R1R2를 두지 않는다.
const XLPE_SWA_SINGLE: &[Row] = &[
    row(5000, 0.387, 0.110, None),
    row(7000, 0.268, 0.105, None),
    row(9500, 0.193, 0.100, None),
    row(12000, 0.153, 0.100, None),
    row(15000, 0.124, 0.100, None),
    row(18500, 0.0991, 0.100, None),
    row(24000, 0.0754, 0.098, None),
    row(30000, 0.0601, 0.097, None),
];

// NOTE:
// - Conductor resistances are copper at 20 °C (BS EN 60228 class 2 maxima).
// - Armour resistances behind the SWA R1R2 figures are typical manufacturer values; check the
//   product data sheet before relying on a Zs result for armoured cable.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_section_parses_common_keys() {
        assert_eq!("2.5".parse::<CrossSection>().unwrap(), CrossSection::from_hundredths(250));
        assert_eq!("1.0".parse::<CrossSection>().unwrap(), "1".parse::<CrossSection>().unwrap());
        assert_eq!("16mm²".parse::<CrossSection>().unwrap().to_string(), "16");
        assert!("abc".parse::<CrossSection>().is_err());
        assert!("-4".parse::<CrossSection>().is_err());
    }

    #[test]
    fn declared_convention_wins_over_fallback() {
        let src = r#"{"convention": "loop", "cables": {"SWA": {"4": {"R": 9.22, "X": 0.16}}}}"#;
        let table = CableTable::from_json_str(src, Some(RxConvention::PerConductor)).unwrap();
        assert_eq!(table.convention(), RxConvention::Loop);
        let spec = table
            .lookup(CableType::Swa, CrossSection::from_hundredths(400))
            .unwrap();
        assert!((spec.resistance_ohm_per_m - 0.00922).abs() < 1e-12);
        assert!(spec.r1_plus_r2_ohm_per_m.is_none());
    }

    #[test]
    fn bare_mapping_needs_configured_convention() {
        let src = r#"{"PVC Twin & Earth": {"2.5": {"R": 7.41, "X": 0.08}}}"#;
        assert!(matches!(
            CableTable::from_json_str(src, None),
            Err(CableDataError::UndeclaredConvention)
        ));
        let table = CableTable::from_json_str(src, Some(RxConvention::PerConductor)).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn rejects_unknown_type_and_bad_values() {
        let unknown = r#"{"convention": "loop", "cables": {"Flex": {"1.5": {"R": 12.1, "X": 0.0}}}}"#;
        assert!(matches!(
            CableTable::from_json_str(unknown, None),
            Err(CableDataError::UnknownCableType(_))
        ));
        let negative = r#"{"convention": "loop", "cables": {"SWA": {"1.5": {"R": -1.0, "X": 0.0}}}}"#;
        assert!(matches!(
            CableTable::from_json_str(negative, None),
            Err(CableDataError::InvalidValue { field: "R", .. })
        ));
    }

    #[test]
    fn builtin_table_is_per_conductor_and_sorted() {
        let table = CableTable::builtin();
        assert_eq!(table.convention(), RxConvention::PerConductor);
        let sizes = table.sizes(CableType::PvcTwinAndEarth);
        assert_eq!(sizes.first().map(|s| s.to_string()), Some("1".to_string()));
        assert!(sizes.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(table.cable_types(), CableType::ALL.to_vec());
    }
}
