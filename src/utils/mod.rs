//! 工具模块
//!
//! 提供日志初始化等辅助功能

pub mod logger;
