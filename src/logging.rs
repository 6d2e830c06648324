// ==========================================
// 日志初始化
// ==========================================
// tracing + tracing-subscriber, 级别由 RUST_LOG 控制 (默认 info)
// 输出到 stderr; stdout 只留给报告路径与控制台摘要
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// 初始化文本格式日志
///
/// ```no_run
/// site_resource_ops::logging::init();
/// ```
pub fn init() {
    init_with_format(false);
}

/// 初始化日志
///
/// # 参数
/// - json: true 时每条事件输出一行 JSON, 便于日志采集
///
/// 重复调用时保留首次安装的订阅者。
pub fn init_with_format(json: bool) {
    let builder = fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if installed.is_err() {
        tracing::debug!("日志订阅者已存在, 跳过初始化");
    }
}

/// 测试环境日志 (debug 级别, 输出交给测试框架捕获)
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
