//! # 批量处理模块
//!
//! 从命令行参数到最终退出码的完整流程。
//!
//! ## 功能
//! - `collector`: 决定输入源并展开文件列表
//! - `transform`: 对单个单元调用格式化函数
//! - `runner`: 并发处理所有单元，按输入顺序汇总
//! - `sink`: 写出结果并确定退出码
//!
//! ## 依赖关系
//! - 被 `commands/beautify.rs` 使用
//! - 使用 `tokio` 进行单线程并发
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;
pub mod sink;
pub mod transform;

pub use runner::BatchRunner;
pub use transform::JsBeautifier;
