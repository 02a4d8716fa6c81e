//! CLI 命令行参数解析
//!
//! 使用 clap 定义命令行接口并进行参数解析

use crate::merge::MergePolicy;
use crate::types::Orientation;
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "wallsource",
    about = "Search wallpapers across NASA, Openverse, Pexels and SM.MS",
    version
)]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，默认读取 RUST_LOG
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// 配置文件路径（默认 ~/.wallsource/providers.json）
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// 列出所有图片来源及其能力
    Providers {
        /// 以 JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 搜索图片
    Search {
        /// 搜索关键词
        keywords: Vec<String>,
        /// 指定来源，可多次使用（默认所有已启用且支持搜索的来源）
        #[arg(short, long = "provider", value_name = "ID")]
        providers: Vec<String>,
        /// 起始页（从 1 开始）
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// 每页数量
        #[arg(long, default_value_t = 20)]
        page_size: u32,
        /// 方向过滤 (landscape|portrait)
        #[arg(long)]
        orientation: Option<Orientation>,
        /// 多来源结果合并方式 (concat|round-robin|quality)
        #[arg(long, default_value = "concat")]
        merge: MergePolicy,
        /// 临时使用的密钥（覆盖已保存的密钥）
        #[arg(long)]
        secret_key: Option<String>,
        /// 以 JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 配置图片来源
    Configure {
        /// 来源 ID
        id: String,
        /// 启用该来源
        #[arg(long, conflicts_with = "disable")]
        enable: bool,
        /// 停用该来源
        #[arg(long)]
        disable: bool,
        /// 设置密钥（传空字符串清除）
        #[arg(long)]
        secret_key: Option<String>,
    },
}

impl Cli {
    /// 尝试解析命令行参数（用于测试或自定义 argv）
    pub fn try_parse_args_from<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Cli::try_parse_from(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_args_from([
            "wallsource",
            "search",
            "northern",
            "lights",
            "-p",
            "nasa",
            "--provider",
            "openverse",
            "--orientation",
            "portrait",
            "--merge",
            "round-robin",
        ])
        .unwrap();

        match cli.command {
            Commands::Search {
                keywords,
                providers,
                page,
                page_size,
                orientation,
                merge,
                ..
            } => {
                assert_eq!(keywords, vec!["northern", "lights"]);
                assert_eq!(providers, vec!["nasa", "openverse"]);
                assert_eq!((page, page_size), (1, 20));
                assert_eq!(orientation, Some(Orientation::Portrait));
                assert_eq!(merge, MergePolicy::RoundRobin);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_enable_and_disable_conflict() {
        let result =
            Cli::try_parse_args_from(["wallsource", "configure", "pexels", "--enable", "--disable"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_args_from([
            "wallsource",
            "providers",
            "--config",
            "/tmp/providers.json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/providers.json")));
    }
}
