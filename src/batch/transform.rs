//! # 格式化调用
//!
//! 对单个单元调用外部格式化函数，把失败（包括 panic）转换为带单元标识的
//! `TransformError`，保证一个单元的失败不会终止整个批次。
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 调用
//! - 默认实现使用 `beautify/`

use crate::beautify::{self, FormatError};
use crate::error::TransformError;
use crate::models::{Configuration, Unit};

use std::panic::{self, AssertUnwindSafe};

/// 文本格式化函数
///
/// 实现必须可在多个单元之间共享，且不持有可变状态。
pub trait Transform: Send + Sync {
    fn transform(&self, text: &str, config: &Configuration) -> Result<String, FormatError>;
}

/// 内置 JavaScript 美化器
#[derive(Debug, Clone, Copy, Default)]
pub struct JsBeautifier;

impl Transform for JsBeautifier {
    fn transform(&self, text: &str, config: &Configuration) -> Result<String, FormatError> {
        beautify::beautify(text, config)
    }
}

/// 对一个单元执行格式化
pub fn run<T>(
    transformer: &T,
    unit: &Unit,
    text: &str,
    config: &Configuration,
) -> Result<String, TransformError>
where
    T: Transform + ?Sized,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| transformer.transform(text, config)))
        .unwrap_or_else(|payload| Err(FormatError::Panicked(panic_message(payload.as_ref()))));

    outcome.map_err(|e| TransformError {
        unit: unit.label(),
        reason: e.to_string(),
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
