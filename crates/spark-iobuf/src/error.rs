//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 缓冲子系统只有两类失败：调用方可感知的“资源耗尽”，以及实现缺陷导致的“不变量破坏”；
//! - 本模块只承载前者。后者通过断言立即终止，绝不降级为可恢复错误。
//!
//! ## 设计要求（What）
//! - 短读、短写不是错误：`read`/`write`/`commit`/`discard` 以返回的计数表达“满”与“空”；
//! - 每个变体都提供稳定错误码（`<领域>.<语义>`），便于日志检索与告警聚合。

use alloc::collections::TryReserveError;

use thiserror::Error;

/// 缓冲子系统的稳定错误码集合。
pub mod codes {
    /// 分段缓冲申请新 extent 失败。
    pub const BUFFER_ALLOC_FAILED: &str = "buffer.alloc_failed";
    /// 分段缓冲的 extent 长度配置为 0。
    pub const BUFFER_ZERO_EXTENT: &str = "buffer.zero_extent";
    /// 分段缓冲单次区间查询的跨度上限配置为 0。
    pub const BUFFER_ZERO_RANGE_LIMIT: &str = "buffer.zero_range_limit";
}

/// 缓冲子系统的可恢复错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：只有分段缓冲在增长时会向分配器申请内存，因此也只有它会“正常地”失败；
///   将该失败显式化为 [`BufferError::AllocationFailed`]，与断言类的实现缺陷区分开。
/// - **契约 (What)**：
///   - 所有变体实现 `Send + Sync + 'static`，可安全跨线程传播；
///   - `AllocationFailed::written` 记录失败前本次 `write` 已经落入缓冲的元素数，
///     这些元素仍然可读，调用方无需重放；
///   - [`code`](BufferError::code) 返回的错误码在版本间保持稳定。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum BufferError {
    /// 无法为新的 extent 申请 `requested` 个元素的存储。
    #[error("failed to allocate an extent of {requested} elements after writing {written}")]
    AllocationFailed {
        requested: usize,
        written: usize,
        #[source]
        source: TryReserveError,
    },

    /// extent 长度为 0 的分段缓冲无法承载任何数据。
    #[error("segmented buffer extent length must be non-zero")]
    ZeroSizedExtent,

    /// 跨度上限为 0 时区间查询恒为空，零拷贝读写与 `bytes::Buf::chunk` 都无法推进。
    #[error("segmented buffer range limit must be non-zero")]
    ZeroRangeLimit,
}

impl BufferError {
    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            BufferError::AllocationFailed { .. } => codes::BUFFER_ALLOC_FAILED,
            BufferError::ZeroSizedExtent => codes::BUFFER_ZERO_EXTENT,
            BufferError::ZeroRangeLimit => codes::BUFFER_ZERO_RANGE_LIMIT,
        }
    }

    /// 返回失败前已写入的元素数；与分配无关的错误恒为 0。
    pub fn written(&self) -> usize {
        match self {
            BufferError::AllocationFailed { written, .. } => *written,
            BufferError::ZeroSizedExtent | BufferError::ZeroRangeLimit => 0,
        }
    }

    /// 以新的已写入计数重建错误，供逐层累加写入进度的调用点使用。
    pub(crate) fn with_written(self, total: usize) -> Self {
        match self {
            BufferError::AllocationFailed {
                requested, source, ..
            } => BufferError::AllocationFailed {
                requested,
                written: total,
                source,
            },
            other => other,
        }
    }
}

/// 缓冲子系统统一使用的结果类型。
pub type Result<T, E = BufferError> = core::result::Result<T, E>;
