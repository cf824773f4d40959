//! 케이블 회로 적합성 판정 엔진.
//!
//! 입력 레코드와 읽기 전용 참조 테이블만으로 결과를 계산한다. 입출력·상태 변경이 없고
//! 같은 입력에는 항상 같은 결과를 돌려준다. 검증이 끝나기 전에는 어떤 계산도 하지 않는다.
//!
//! 1. R/X 결정 (수동 입력 우선, 없으면 테이블)
//! 2. 보정: Iz' = Iz × Cd, Ib ≤ Iz'
//! 3. 전압강하: 용도별 3 % / 5 %
//! 4. 보호장치: Ib ≤ In(유효) ≤ Iz'
//! 5. Zs = Ze + (R1+R2)·L ≤ Zs 한계
//! 6. 종합 = 수행한 판정들의 논리곱

use serde::{Deserialize, Serialize};

use crate::cable::cable_table::{CableTable, CableType, CrossSection};
use crate::cable::derating::DeratingFactors;
use crate::compliance::error::{MissingData, ValidationError};
use crate::compliance::voltage_drop::{self, UsageCategory, VoltageDropCheck};
use crate::protection::device::{DeviceKind, ProtectiveDevice};
use crate::protection::zs_limits::ZsLimitTable;

/// 설비 상류 외부 루프 임피던스 기본값 [Ω].
pub const DEFAULT_ZE_OHM: f64 = 0.35;

fn default_ze() -> f64 {
    DEFAULT_ZE_OHM
}

/// 수행할 판정 항목.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecksEnabled {
    pub thermal: bool,
    pub voltage_drop: bool,
    pub device: bool,
    pub zs: bool,
}

impl Default for ChecksEnabled {
    fn default() -> Self {
        Self {
            thermal: true,
            voltage_drop: true,
            device: true,
            zs: true,
        }
    }
}

/// 테이블 값을 대신하는 수동 입력 R/X [mΩ/m].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImpedanceOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resistance_mohm_per_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reactance_mohm_per_m: Option<f64>,
}

/// 사용자 입력 회로 정보.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitInput {
    /// 설계 전류 Ib [A]
    pub design_current_a: f64,
    /// 표 허용전류 Iz(보정 전) [A]
    pub tabulated_capacity_a: f64,
    pub supply_voltage_v: f64,
    pub length_m: f64,
    pub power_factor: f64,
    #[serde(default)]
    pub usage: UsageCategory,
    pub cable_type: CableType,
    pub cross_section: CrossSection,
    #[serde(default)]
    pub derating: DeratingFactors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impedance_override: Option<ImpedanceOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceKind>,
    #[serde(default = "default_ze")]
    pub ze_ohm: f64,
}

/// R/X 값의 출처.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpedanceSource {
    Table,
    Override,
    /// R/X 중 하나만 수동 입력
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedImpedance {
    pub resistance_ohm_per_m: f64,
    pub reactance_ohm_per_m: f64,
    pub source: ImpedanceSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeratingOutcome {
    pub total_derating_factor: f64,
    /// Iz × Cd
    pub corrected_capacity_a: f64,
    /// 필요한 표 허용전류 It = Ib / Cd
    pub required_tabulated_capacity_a: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThermalCheck {
    pub corrected_capacity_iz_cd: f64,
    pub thermal_pass: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeviceCheck {
    pub device: ProtectiveDevice,
    pub device_effective_rating: f64,
    pub device_pass: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZsCheck {
    pub ze_ohm: f64,
    pub zs_calculated: f64,
    pub zs_limit: f64,
    pub zs_pass: bool,
}

/// 계산 결과. 수행하지 않은 판정은 None.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComplianceResult {
    pub impedance: ResolvedImpedance,
    /// 전압강하 식의 배수 k
    pub convention_multiplier: f64,
    pub derating: DeratingOutcome,
    pub thermal: Option<ThermalCheck>,
    pub voltage_drop: Option<VoltageDropCheck>,
    pub device: Option<DeviceCheck>,
    pub zs: Option<ZsCheck>,
    pub overall_pass: bool,
}

impl ComplianceResult {
    /// 수행한 판정 결과를 이름과 함께 나열한다.
    pub fn verdicts(&self) -> Vec<(&'static str, bool)> {
        let mut out = Vec::with_capacity(4);
        if let Some(t) = &self.thermal {
            out.push(("thermal", t.thermal_pass));
        }
        if let Some(v) = &self.voltage_drop {
            out.push(("voltage_drop", v.voltage_drop_pass));
        }
        if let Some(d) = &self.device {
            out.push(("device", d.device_pass));
        }
        if let Some(z) = &self.zs {
            out.push(("zs", z.zs_pass));
        }
        out
    }
}

/// 화면/보고서 표시용 소수 둘째 자리 반올림. 판정에는 쓰지 않는다.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 판정 결과의 논리곱. 수행한 판정이 없으면 true.
pub fn aggregate(verdicts: &[bool]) -> bool {
    verdicts.iter().all(|&v| v)
}

/// 검증을 통과한 뒤 계산에 필요한 참조 값들.
struct Resolved {
    impedance: ResolvedImpedance,
    device: Option<ProtectiveDevice>,
    zs: Option<(f64, f64)>,
}

/// 회로 입력을 평가한다.
///
/// 입력 범위 오류는 `OutOfRange`, 테이블 누락은 `MissingReferenceData`로 실패하며
/// 부분 결과는 만들지 않는다.
pub fn evaluate(
    input: &CircuitInput,
    cables: &CableTable,
    zs_limits: &ZsLimitTable,
    checks: ChecksEnabled,
) -> Result<ComplianceResult, ValidationError> {
    validate_ranges(input)?;
    let resolved = resolve_references(input, cables, zs_limits, checks)?;

    let ib = input.design_current_a;
    let k = cables.convention().multiplier();

    let cd = input.derating.total();
    let iz_corrected = input.tabulated_capacity_a * cd;
    let derating = DeratingOutcome {
        total_derating_factor: cd,
        corrected_capacity_a: iz_corrected,
        required_tabulated_capacity_a: ib / cd,
    };

    let thermal = checks.thermal.then(|| ThermalCheck {
        corrected_capacity_iz_cd: iz_corrected,
        thermal_pass: ib <= iz_corrected,
    });

    let voltage_drop = checks.voltage_drop.then(|| {
        let vd = voltage_drop::voltage_drop_volts(
            ib,
            resolved.impedance.resistance_ohm_per_m,
            resolved.impedance.reactance_ohm_per_m,
            input.length_m,
            input.power_factor,
            k,
        );
        voltage_drop::check(vd, input.supply_voltage_v, input.usage)
    });

    let device = match (checks.device, resolved.device) {
        (true, Some(dev)) => Some(DeviceCheck {
            device: dev,
            device_effective_rating: dev.effective_rating_a,
            device_pass: ib <= dev.effective_rating_a && dev.effective_rating_a <= iz_corrected,
        }),
        _ => None,
    };

    let zs = resolved.zs.map(|(r1r2, limit)| {
        let zs_calculated = input.ze_ohm + r1r2 * input.length_m;
        ZsCheck {
            ze_ohm: input.ze_ohm,
            zs_calculated,
            zs_limit: limit,
            zs_pass: zs_calculated <= limit,
        }
    });

    let mut result = ComplianceResult {
        impedance: resolved.impedance,
        convention_multiplier: k,
        derating,
        thermal,
        voltage_drop,
        device,
        zs,
        overall_pass: false,
    };
    let verdicts: Vec<bool> = result.verdicts().into_iter().map(|(_, v)| v).collect();
    result.overall_pass = aggregate(&verdicts);

    tracing::debug!(
        cable = %input.cable_type,
        size = %input.cross_section,
        cd,
        iz_corrected,
        vd_percent = result.voltage_drop.map(|v| v.voltage_drop_percent),
        zs = result.zs.map(|z| z.zs_calculated),
        overall = result.overall_pass,
        "circuit evaluated"
    );
    for (name, pass) in result.verdicts() {
        if !pass {
            tracing::warn!(check = name, "compliance check failed");
        }
    }
    Ok(result)
}

fn validate_ranges(input: &CircuitInput) -> Result<(), ValidationError> {
    positive("design current Ib", input.design_current_a)?;
    positive("tabulated capacity Iz", input.tabulated_capacity_a)?;
    positive("supply voltage", input.supply_voltage_v)?;
    positive("length", input.length_m)?;
    if !(input.power_factor > 0.0 && input.power_factor <= 1.0) {
        return Err(ValidationError::OutOfRange {
            quantity: "power factor",
            value: input.power_factor,
            expected: "0 < pf <= 1",
        });
    }
    if !(input.ze_ohm.is_finite() && input.ze_ohm >= 0.0) {
        return Err(ValidationError::OutOfRange {
            quantity: "Ze",
            value: input.ze_ohm,
            expected: ">= 0",
        });
    }
    input.derating.validate()?;
    if let Some(ov) = &input.impedance_override {
        if let Some(r) = ov.resistance_mohm_per_m {
            positive("override resistance", r)?;
        }
        if let Some(x) = ov.reactance_mohm_per_m {
            if !(x.is_finite() && x >= 0.0) {
                return Err(ValidationError::OutOfRange {
                    quantity: "override reactance",
                    value: x,
                    expected: ">= 0",
                });
            }
        }
    }
    Ok(())
}

fn positive(quantity: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            quantity,
            value,
            expected: "> 0",
        })
    }
}

fn resolve_references(
    input: &CircuitInput,
    cables: &CableTable,
    zs_limits: &ZsLimitTable,
    checks: ChecksEnabled,
) -> Result<Resolved, ValidationError> {
    let ov = input.impedance_override.unwrap_or_default();
    let device = input
        .device
        .filter(|_| checks.device || checks.zs)
        .map(|kind| ProtectiveDevice::select(kind, input.design_current_a));
    let zs_requested = checks.zs && device.is_some();

    let fully_overridden =
        ov.resistance_mohm_per_m.is_some() && ov.reactance_mohm_per_m.is_some();
    let spec = if fully_overridden && !zs_requested {
        None
    } else {
        Some(cables.lookup(input.cable_type, input.cross_section)?)
    };

    let table_r = spec.map(|s| s.resistance_ohm_per_m);
    let table_x = spec.map(|s| s.reactance_ohm_per_m);
    let (r, x) = match (
        ov.resistance_mohm_per_m.map(|v| v / 1000.0).or(table_r),
        ov.reactance_mohm_per_m.map(|v| v / 1000.0).or(table_x),
    ) {
        (Some(r), Some(x)) => (r, x),
        _ => {
            return Err(ValidationError::MissingReferenceData(MissingData::Cable {
                cable_type: input.cable_type,
                size: input.cross_section,
            }))
        }
    };
    let source = match (ov.resistance_mohm_per_m, ov.reactance_mohm_per_m) {
        (None, None) => ImpedanceSource::Table,
        (Some(_), Some(_)) => ImpedanceSource::Override,
        _ => ImpedanceSource::Mixed,
    };

    let zs = match (zs_requested, device, spec) {
        (true, Some(dev), Some(spec)) => {
            let r1r2 = spec.r1_plus_r2_ohm_per_m.ok_or(ValidationError::MissingReferenceData(
                MissingData::CpcResistance {
                    cable_type: input.cable_type,
                    size: input.cross_section,
                },
            ))?;
            let limit = zs_limits.limit(dev.kind, dev.nominal_rating_a)?;
            Some((r1r2, limit))
        }
        _ => None,
    };

    Ok(Resolved {
        impedance: ResolvedImpedance {
            resistance_ohm_per_m: r,
            reactance_ohm_per_m: x,
            source,
        },
        device: device.filter(|_| checks.device),
        zs,
    })
}
