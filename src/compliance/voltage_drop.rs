use serde::{Deserialize, Serialize};
use std::fmt;

/// 회로 용도. 전압강하 허용치를 결정한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UsageCategory {
    Lighting,
    #[default]
    General,
}

impl UsageCategory {
    pub const ALL: [UsageCategory; 2] = [UsageCategory::Lighting, UsageCategory::General];

    /// 허용 전압강하 [%].
    pub fn limit_percent(self) -> f64 {
        match self {
            UsageCategory::Lighting => 3.0,
            UsageCategory::General => 5.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UsageCategory::Lighting => "Lighting (3%)",
            UsageCategory::General => "General Use (5%)",
        }
    }
}

impl fmt::Display for UsageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 전압강하 판정 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoltageDropCheck {
    pub voltage_drop_v: f64,
    pub voltage_drop_percent: f64,
    pub voltage_drop_limit_percent: f64,
    pub voltage_drop_pass: bool,
}

/// Vd = Ib·(r·cosθ + x·sinθ)·L·k, θ = acos(pf)
///
/// - r, x: Ω/m
/// - k: 테이블 기준에 따른 왕복 배수 (1 또는 2)
pub fn voltage_drop_volts(
    design_current_a: f64,
    resistance_ohm_per_m: f64,
    reactance_ohm_per_m: f64,
    length_m: f64,
    power_factor: f64,
    multiplier: f64,
) -> f64 {
    let theta = power_factor.acos();
    design_current_a
        * (resistance_ohm_per_m * theta.cos() + reactance_ohm_per_m * theta.sin())
        * length_m
        * multiplier
}

pub fn voltage_drop_percent(voltage_drop_v: f64, supply_voltage_v: f64) -> f64 {
    100.0 * voltage_drop_v / supply_voltage_v
}

/// 계산한 전압강하를 용도별 허용치와 비교한다. 비교는 반올림 전 값으로 한다.
pub fn check(voltage_drop_v: f64, supply_voltage_v: f64, usage: UsageCategory) -> VoltageDropCheck {
    let percent = voltage_drop_percent(voltage_drop_v, supply_voltage_v);
    let limit = usage.limit_percent();
    VoltageDropCheck {
        voltage_drop_v,
        voltage_drop_percent: percent,
        voltage_drop_limit_percent: limit,
        voltage_drop_pass: percent <= limit,
    }
}
