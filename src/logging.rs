//! tracing 구독자 초기화.

use tracing::Level;

/// 설정 문자열(trace/debug/info/warn/error)로 전역 구독자를 설치한다.
/// 알 수 없는 값은 info로 처리하고, 이미 설치돼 있으면 그대로 둔다.
pub fn init(level: &str) {
    let level = level.trim().parse::<Level>().unwrap_or(Level::INFO);
    let result = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
    if let Err(e) = result {
        eprintln!("logging already initialised: {e}");
    }
}
