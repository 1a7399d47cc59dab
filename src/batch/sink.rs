//! # 结果输出
//!
//! 把汇总结果写到标准输出并确定退出码。写入后显式 flush，
//! flush 迟迟不完成时超时放弃，保证进程总能退出。
//!
//! ## 依赖关系
//! - 被 `commands/beautify.rs` 调用
//! - 使用 `utils/output.rs` 报告失败单元

use super::runner::BatchOutcome;
use crate::error::BeautError;
use crate::utils::output;

use std::io;
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// 等待 flush 完成的最长时间
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// 退出码：成功且有输出为 0，否则为 1
pub fn exit_code(outcome: &BatchOutcome) -> u8 {
    if outcome.is_success() && !outcome.text.is_empty() {
        0
    } else {
        1
    }
}

/// 输出到标准输出
pub async fn emit(outcome: &BatchOutcome) -> ExitCode {
    let mut stdout = tokio::io::stdout();
    ExitCode::from(emit_to(outcome, &mut stdout).await)
}

/// 输出到任意写端，返回退出码
pub async fn emit_to<W>(outcome: &BatchOutcome, out: &mut W) -> u8
where
    W: AsyncWrite + Unpin,
{
    tracing::debug!(
        mode = ?outcome.mode,
        failures = outcome.failures.len(),
        "emitting batch outcome"
    );
    for failure in &outcome.failures {
        output::print_error(&failure.to_string());
    }

    let mut code = exit_code(outcome);
    if !outcome.text.is_empty() {
        if let Err(e) = write_flushed(out, &outcome.text).await {
            output::print_error(&output::describe(&BeautError::StdoutWriteError(e)));
            code = 1;
        }
    }
    code
}

async fn write_flushed<W>(out: &mut W, text: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(text.as_bytes()).await?;
    out.write_all(b"\n").await?;
    match tokio::time::timeout(FLUSH_TIMEOUT, out.flush()).await {
        Ok(flushed) => flushed,
        Err(_) => {
            tracing::warn!("stdout flush did not complete in time; exiting anyway");
            Ok(())
        }
    }
}
