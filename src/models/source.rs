//! # 输入源与工作单元
//!
//! ## 依赖关系
//! - 被 `batch/` 使用
//! - 使用 `tracing` 记录单元状态迁移

use std::path::{Path, PathBuf};

/// 一次调用唯一的输入源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// 标准输入（完整读入后格式化）
    Stream,
    /// 按匹配顺序排列的文件列表（交给批处理时非空）
    FileSet(Vec<PathBuf>),
}

/// 单元生命周期
///
/// `Pending -> Reading -> Transforming -> {WritingInPlace | Buffered} -> Done`，
/// 读、格式化、写回三个阶段都可以进入 `Failed`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Pending,
    Reading,
    Transforming,
    WritingInPlace,
    Buffered,
    Done,
    Failed,
}

impl UnitState {
    /// 检查迁移是否合法
    pub fn can_advance_to(self, next: UnitState) -> bool {
        use UnitState::*;
        matches!(
            (self, next),
            (Pending, Reading)
                | (Reading, Transforming)
                | (Transforming, WritingInPlace)
                | (Transforming, Buffered)
                | (WritingInPlace, Done)
                | (Buffered, Done)
                | (Reading, Failed)
                | (Transforming, Failed)
                | (WritingInPlace, Failed)
        )
    }
}

/// 一个调度单元：一个文件或唯一的标准输入流
#[derive(Debug, Clone)]
pub struct Unit {
    /// 在原始文件列表中的位置，用于保持输出顺序
    pub index: usize,
    /// 源路径（标准输入为 `None`）
    pub path: Option<PathBuf>,
    state: UnitState,
}

impl Unit {
    /// 文件单元
    pub fn file(index: usize, path: PathBuf) -> Self {
        Unit {
            index,
            path: Some(path),
            state: UnitState::Pending,
        }
    }

    /// 标准输入单元
    pub fn stream() -> Self {
        Unit {
            index: 0,
            path: None,
            state: UnitState::Pending,
        }
    }

    pub fn state(&self) -> UnitState {
        self.state
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// 用于消息的单元标识
    pub fn label(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => "stream".to_string(),
        }
    }

    /// 推进状态；非法迁移被忽略并记录
    pub fn advance(&mut self, next: UnitState) {
        if self.state.can_advance_to(next) {
            tracing::trace!(unit = %self.label(), from = ?self.state, to = ?next, "unit state");
            self.state = next;
        } else {
            tracing::warn!(
                unit = %self.label(),
                from = ?self.state,
                to = ?next,
                "ignored invalid unit state transition"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_happy_paths() {
        let mut unit = Unit::file(2, PathBuf::from("a.js"));
        assert_eq!(unit.state(), UnitState::Pending);
        for next in [
            UnitState::Reading,
            UnitState::Transforming,
            UnitState::WritingInPlace,
            UnitState::Done,
        ] {
            unit.advance(next);
            assert_eq!(unit.state(), next);
        }
        assert_eq!(unit.label(), "a.js");
    }

    #[test]
    fn test_unit_rejects_skipped_states() {
        let mut unit = Unit::stream();
        unit.advance(UnitState::Transforming);
        assert_eq!(unit.state(), UnitState::Pending);
        unit.advance(UnitState::Failed);
        assert_eq!(unit.state(), UnitState::Pending);
        assert_eq!(unit.label(), "stream");
    }

    #[test]
    fn test_failed_reachable_from_active_states() {
        for from in [
            UnitState::Reading,
            UnitState::Transforming,
            UnitState::WritingInPlace,
        ] {
            assert!(from.can_advance_to(UnitState::Failed));
        }
        assert!(!UnitState::Buffered.can_advance_to(UnitState::Failed));
        assert!(!UnitState::Done.can_advance_to(UnitState::Failed));
    }
}
