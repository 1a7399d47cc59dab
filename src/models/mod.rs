//! # 数据模型模块
//!
//! 定义格式化配置、输入源与工作单元。
//!
//! ## 依赖关系
//! - 被 `cli/`, `batch/` 和 `beautify/` 使用
//! - 子模块: config, source

pub mod config;
pub mod source;

pub use config::{BraceStyle, Configuration};
pub use source::{InputSource, Unit, UnitState};
