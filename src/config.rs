use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cable::cable_table::RxConvention;
use crate::compliance::engine::{ChecksEnabled, DEFAULT_ZE_OHM};
use crate::compliance::voltage_drop::UsageCategory;
use crate::report::DEFAULT_FOOTER;

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// 참조 데이터 위치.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// JSON 케이블 테이블. 없으면 내장 테이블을 사용한다.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cable_data: Option<PathBuf>,
    /// 테이블 파일이 R/X 기준을 선언하지 않을 때만 사용한다.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_convention: Option<RxConvention>,
}

/// 입력 화면/CLI 기본값.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputDefaults {
    pub supply_voltage_v: f64,
    pub power_factor: f64,
    pub ze_ohm: f64,
    pub usage: UsageCategory,
    pub tabulated_capacity_a: f64,
}

impl Default for InputDefaults {
    fn default() -> Self {
        Self {
            supply_voltage_v: 230.0,
            power_factor: 0.9,
            ze_ohm: DEFAULT_ZE_OHM,
            usage: UsageCategory::General,
            tabulated_capacity_a: 27.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub footer: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            footer: DEFAULT_FOOTER.to_string(),
        }
    }
}

/// 애플리케이션 설정을 표현한다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub data: DataConfig,
    pub defaults: InputDefaults,
    pub checks: ChecksEnabled,
    pub report: ReportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            data: DataConfig::default(),
            defaults: InputDefaults::default(),
            checks: ChecksEnabled::default(),
            report: ReportConfig::default(),
        }
    }
}

/// 설정 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// config.toml을 로드하거나 없으면 기본 설정을 생성한다.
pub fn load_or_default() -> Result<Config, ConfigError> {
    load_or_create(Path::new(DEFAULT_CONFIG_FILE))
}

/// 지정한 경로의 설정을 로드한다. 파일이 없으면 기본값으로 만들어 저장한다.
pub fn load_or_create(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        let content = fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&content)?;
        Ok(cfg)
    } else {
        let cfg = Config::default();
        cfg.save_to(path)?;
        Ok(cfg)
    }
}

impl Config {
    /// 설정을 config.toml에 저장한다.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Path::new(DEFAULT_CONFIG_FILE))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
