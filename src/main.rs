use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;
use wallsource::commands::{Cli, CommandContext};
use wallsource::config::ConfigStore;
use wallsource::error::{ErrorCategory, ProviderError};
use wallsource::utils::logger::init_logger;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // 初始化日志系统
    if let Err(err) = init_logger(cli.log_level.as_deref(), None) {
        eprintln!("{} {:#}", "warning:".yellow(), err);
    }

    match main_impl(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            exit_code_for(&err)
        }
    }
}

async fn main_impl(cli: Cli) -> anyhow::Result<()> {
    let store = match cli.config {
        Some(path) => ConfigStore::with_path(path),
        None => ConfigStore::new()?,
    };
    let mut context = CommandContext::load(store)?;
    context.execute(cli.command).await
}

/// 配置类错误返回 2，其余返回 1
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<ProviderError>().map(ProviderError::category) {
        Some(ErrorCategory::Configuration) => ExitCode::from(2),
        _ => ExitCode::from(1),
    }
}
