//! 허용전류 보정계수(Ca, Cg, Ci, 포설방법 계수).
//!
//! 선택지는 화면 표시 문자열과 계수 값을 분리한 enum으로 표현한다.
//! 계수는 모두 (0, 1] 범위이며 곱으로 합성한다: Cd = Ca·Cg·Ci(·Cm).

use serde::{Deserialize, Serialize};

use crate::compliance::error::ValidationError;

/// 주위 온도 보정계수 Ca (70 °C PVC 절연, 기준 30 °C).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AmbientTemperature {
    #[default]
    C30,
    C35,
    C40,
    C45,
    C50,
    C55,
    C60,
}

impl AmbientTemperature {
    pub const ALL: [AmbientTemperature; 7] = [
        AmbientTemperature::C30,
        AmbientTemperature::C35,
        AmbientTemperature::C40,
        AmbientTemperature::C45,
        AmbientTemperature::C50,
        AmbientTemperature::C55,
        AmbientTemperature::C60,
    ];

    pub fn factor(self) -> f64 {
        match self {
            AmbientTemperature::C30 => 1.00,
            AmbientTemperature::C35 => 0.94,
            AmbientTemperature::C40 => 0.87,
            AmbientTemperature::C45 => 0.79,
            AmbientTemperature::C50 => 0.71,
            AmbientTemperature::C55 => 0.61,
            AmbientTemperature::C60 => 0.50,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AmbientTemperature::C30 => "30°C",
            AmbientTemperature::C35 => "35°C",
            AmbientTemperature::C40 => "40°C",
            AmbientTemperature::C45 => "45°C",
            AmbientTemperature::C50 => "50°C",
            AmbientTemperature::C55 => "55°C",
            AmbientTemperature::C60 => "60°C",
        }
    }
}

/// 묶음 보정계수 Cg (벽면 단층 밀착 포설 기준 회로 수).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Grouping {
    #[default]
    One,
    Two,
    Three,
    Four,
    Five,
    SixOrMore,
}

impl Grouping {
    pub const ALL: [Grouping; 6] = [
        Grouping::One,
        Grouping::Two,
        Grouping::Three,
        Grouping::Four,
        Grouping::Five,
        Grouping::SixOrMore,
    ];

    pub fn factor(self) -> f64 {
        match self {
            Grouping::One => 1.00,
            Grouping::Two => 0.85,
            Grouping::Three => 0.79,
            Grouping::Four => 0.75,
            Grouping::Five => 0.73,
            Grouping::SixOrMore => 0.72,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Grouping::One => "1 circuit",
            Grouping::Two => "2 circuits",
            Grouping::Three => "3 circuits",
            Grouping::Four => "4 circuits",
            Grouping::Five => "5 circuits",
            Grouping::SixOrMore => "6+ circuits",
        }
    }
}

/// 단열재 보정계수 Ci (단열재 내 통과 길이).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ThermalInsulation {
    #[default]
    NotInsulated,
    Length50mm,
    Length100mm,
    Length200mm,
    Length400mm,
    /// 0.5 m 이상 완전히 둘러싸인 경우
    Surrounded,
}

impl ThermalInsulation {
    pub const ALL: [ThermalInsulation; 6] = [
        ThermalInsulation::NotInsulated,
        ThermalInsulation::Length50mm,
        ThermalInsulation::Length100mm,
        ThermalInsulation::Length200mm,
        ThermalInsulation::Length400mm,
        ThermalInsulation::Surrounded,
    ];

    pub fn factor(self) -> f64 {
        match self {
            ThermalInsulation::NotInsulated => 1.00,
            ThermalInsulation::Length50mm => 0.88,
            ThermalInsulation::Length100mm => 0.78,
            ThermalInsulation::Length200mm => 0.63,
            ThermalInsulation::Length400mm => 0.51,
            ThermalInsulation::Surrounded => 0.50,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ThermalInsulation::NotInsulated => "Not in insulation",
            ThermalInsulation::Length50mm => "50mm in insulation",
            ThermalInsulation::Length100mm => "100mm in insulation",
            ThermalInsulation::Length200mm => "200mm in insulation",
            ThermalInsulation::Length400mm => "400mm in insulation",
            ThermalInsulation::Surrounded => "Totally surrounded (>0.5m)",
        }
    }
}

/// 포설방법 단일 계수. Ca/Cg/Ci 대신 사용하는 간이 선택지.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InstallationMethod {
    #[default]
    ClippedDirect,
    CableTrayOpenAir,
    ConduitInWall,
    ThermalInsulation100mm,
    SurroundedByInsulation,
    BuriedDirect,
}

impl InstallationMethod {
    pub const ALL: [InstallationMethod; 6] = [
        InstallationMethod::ClippedDirect,
        InstallationMethod::CableTrayOpenAir,
        InstallationMethod::ConduitInWall,
        InstallationMethod::ThermalInsulation100mm,
        InstallationMethod::SurroundedByInsulation,
        InstallationMethod::BuriedDirect,
    ];

    pub fn factor(self) -> f64 {
        match self {
            InstallationMethod::ClippedDirect => 1.00,
            InstallationMethod::CableTrayOpenAir => 0.95,
            InstallationMethod::ConduitInWall => 0.87,
            InstallationMethod::ThermalInsulation100mm => 0.70,
            InstallationMethod::SurroundedByInsulation => 0.50,
            InstallationMethod::BuriedDirect => 0.90,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InstallationMethod::ClippedDirect => "Clipped Direct",
            InstallationMethod::CableTrayOpenAir => "On Cable Tray / Open Air",
            InstallationMethod::ConduitInWall => "In Conduit in Wall",
            InstallationMethod::ThermalInsulation100mm => "In Thermal Insulation (100mm)",
            InstallationMethod::SurroundedByInsulation => "Completely Surrounded by Insulation",
            InstallationMethod::BuriedDirect => "Buried Direct",
        }
    }
}

fn unity() -> f64 {
    1.0
}

/// 회로에 적용되는 보정계수 묶음.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeratingFactors {
    #[serde(default = "unity")]
    pub ambient: f64,
    #[serde(default = "unity")]
    pub grouping: f64,
    #[serde(default = "unity")]
    pub thermal_insulation: f64,
    /// 포설방법 계수. 있으면 Ca·Cg·Ci에 추가로 곱한다.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installation_method: Option<f64>,
}

impl Default for DeratingFactors {
    fn default() -> Self {
        Self {
            ambient: 1.0,
            grouping: 1.0,
            thermal_insulation: 1.0,
            installation_method: None,
        }
    }
}

impl DeratingFactors {
    pub fn new(ambient: f64, grouping: f64, thermal_insulation: f64) -> Self {
        Self {
            ambient,
            grouping,
            thermal_insulation,
            installation_method: None,
        }
    }

    pub fn from_selection(
        ambient: AmbientTemperature,
        grouping: Grouping,
        insulation: ThermalInsulation,
    ) -> Self {
        Self::new(ambient.factor(), grouping.factor(), insulation.factor())
    }

    /// 포설방법 계수만 사용하는 경우 (Ca/Cg/Ci = 1).
    pub fn from_installation_method(method: InstallationMethod) -> Self {
        Self {
            installation_method: Some(method.factor()),
            ..Self::default()
        }
    }

    /// 합성 보정계수 Cd.
    pub fn total(&self) -> f64 {
        self.ambient
            * self.grouping
            * self.thermal_insulation
            * self.installation_method.unwrap_or(1.0)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_factor("Ca", self.ambient)?;
        check_factor("Cg", self.grouping)?;
        check_factor("Ci", self.thermal_insulation)?;
        if let Some(cm) = self.installation_method {
            check_factor("installation method factor", cm)?;
        }
        Ok(())
    }
}

fn check_factor(quantity: &'static str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            quantity,
            value,
            expected: "0 < factor <= 1",
        })
    }
}
