//! 日志系统
//!
//! 提供统一的日志记录功能

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 默认级别：库代码 info，本 crate debug
const DEFAULT_FILTER: &str = "info,wallsource=debug";

/// 初始化日志系统
///
/// # Arguments
/// * `log_level` - 日志级别 (trace, debug, info, warn, error)，如果为 None 则使用环境变量 RUST_LOG
/// * `log_file` - 日志文件路径，如果为 None 则只输出到标准错误
///
/// # Examples
/// ```no_run
/// use wallsource::utils::logger::init_logger;
///
/// // 使用默认配置（从环境变量读取）
/// init_logger(None, None).unwrap();
///
/// // 同时写入文件
/// use std::path::PathBuf;
/// init_logger(Some("debug"), Some(PathBuf::from("wallsource.log"))).unwrap();
/// ```
pub fn init_logger(log_level: Option<&str>, log_file: Option<PathBuf>) -> Result<()> {
    let env_filter = build_filter(log_level)?;

    // 标准错误输出，保持 stdout 只用于搜索结果
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(true)
        .compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if let Some(log_path) = log_file {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(std::sync::Arc::new(file))
            .with_target(true)
            .with_ansi(false) // 文件中不使用 ANSI 颜色
            .with_level(true);

        registry.with(file_layer).try_init()?;
    } else {
        registry.try_init()?;
    }

    tracing::debug!("Logger initialized");
    Ok(())
}

/// 参数优先，其次 RUST_LOG，最后默认值
fn build_filter(log_level: Option<&str>) -> Result<EnvFilter> {
    Ok(match log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
        }
    })
}
