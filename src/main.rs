use bs7671_calc::app::{self, AppError, BatchOptions};
use bs7671_calc::config::{self, DEFAULT_CONFIG_FILE};
use bs7671_calc::logging;
use bs7671_calc::reference::ReferenceData;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// BS7671 voltage drop & compliance calculator (CLI).
#[derive(Debug, Parser)]
#[command(name = "bs7671_calc_cli", version, about)]
struct Cli {
    /// Configuration file (created with defaults when missing)
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Evaluate a circuit TOML file instead of the interactive menu
    #[arg(long)]
    input: Option<PathBuf>,
    /// Print the result as JSON (batch mode)
    #[arg(long, requires = "input")]
    json: bool,
    /// Write a PDF report to this file, or into this directory if it has no extension (batch mode)
    #[arg(long, requires = "input")]
    report: Option<PathBuf>,
    /// Logo image for the PDF report
    #[arg(long, requires = "report")]
    logo: Option<PathBuf>,
    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

/// 프로그램의 엔트리 포인트. 설정과 참조 데이터를 로드한 뒤 일괄/대화형 모드를 실행한다.
fn main() -> ExitCode {
    let cli = Cli::parse();
    match try_run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        // 일괄 모드에서 부적합 판정
        Ok(false) => ExitCode::from(2),
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn try_run(cli: Cli) -> Result<bool, AppError> {
    let mut cfg = config::load_or_create(&cli.config)?;
    let level = if cli.verbose { "debug" } else { cfg.log_level.as_str() };
    logging::init(level);

    // 참조 데이터 오류는 입력을 받기 전에 종료한다.
    let refs = ReferenceData::load(&cfg)?;
    tracing::info!(
        cables = refs.cables.len(),
        convention = %refs.cables.convention(),
        "reference data loaded"
    );

    match cli.input {
        Some(input) => {
            let opts = BatchOptions {
                json: cli.json,
                report: cli.report,
                logo: cli.logo,
            };
            app::run_batch(&cfg, &refs, &input, &opts)
        }
        None => {
            app::run(&mut cfg, &cli.config, &refs)?;
            Ok(true)
        }
    }
}
