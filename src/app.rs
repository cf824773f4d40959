use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cable::cable_table::CableDataError;
use crate::compliance::engine::{self, CircuitInput, ComplianceResult};
use crate::compliance::error::ValidationError;
use crate::config::{Config, ConfigError};
use crate::reference::ReferenceData;
use crate::report::{self, ProjectInfo, Report, ReportError};
use crate::ui_cli;
use crate::ui_cli::MenuChoice;

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    CableData(#[from] CableDataError),
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("circuit file parse error: {0}")]
    CircuitFile(#[from] toml::de::Error),
    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 일괄 처리용 회로 파일(TOML).
#[derive(Debug, Clone, Deserialize)]
pub struct CircuitFile {
    #[serde(default)]
    pub project: ProjectInfo,
    pub circuit: CircuitInput,
}

impl CircuitFile {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

/// 일괄 처리 옵션.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub json: bool,
    pub report: Option<PathBuf>,
    pub logo: Option<PathBuf>,
}

/// 회로 파일 하나를 평가하고 결과를 출력한다. 종합 판정을 반환한다.
pub fn run_batch(
    config: &Config,
    refs: &ReferenceData,
    input_path: &Path,
    opts: &BatchOptions,
) -> Result<bool, AppError> {
    let file = CircuitFile::load(input_path)?;
    let result = engine::evaluate(&file.circuit, &refs.cables, &refs.zs_limits, config.checks)?;
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        ui_cli::print_result(&file.circuit, &result);
    }
    if let Some(target) = &opts.report {
        export_report(config, &file.project, &file.circuit, &result, target, opts.logo.as_deref())?;
    }
    Ok(result.overall_pass)
}

/// 결과를 PDF 보고서로 저장하고 실제 경로를 반환한다.
pub fn export_report(
    config: &Config,
    project: &ProjectInfo,
    input: &CircuitInput,
    result: &ComplianceResult,
    target: &Path,
    logo: Option<&Path>,
) -> Result<PathBuf, AppError> {
    let today = chrono::Local::now().date_naive();
    let report = Report::build(project.clone(), today, input, result)
        .with_footer(config.report.footer.clone());
    Ok(report::pdf::write(target, &report, logo)?)
}

/// CLI 애플리케이션의 메인 루프를 실행한다.
pub fn run(config: &mut Config, config_path: &Path, refs: &ReferenceData) -> Result<(), AppError> {
    loop {
        match ui_cli::main_menu()? {
            MenuChoice::Calculate => {
                // 검증 오류는 메뉴로 돌아간다.
                match ui_cli::handle_calculation(config, refs) {
                    Err(AppError::Validation(e)) => println!("Input rejected: {e}"),
                    other => other?,
                }
            }
            MenuChoice::CableTable => ui_cli::handle_cable_table(refs),
            MenuChoice::Settings => {
                ui_cli::handle_settings(config)?;
                config.save_to(config_path)?;
            }
            MenuChoice::Exit => {
                println!("Bye.");
                break;
            }
        }
    }
    Ok(())
}
