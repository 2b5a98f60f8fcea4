//! 只依赖能力契约的通用缓冲算法。
//!
//! # 模块定位（Why）
//! - 编解码层与传输层需要在不同缓冲实现之间搬运数据，却不应关心对端是固定、环形还是分段缓冲；
//! - 这里的函数只通过 [`ReadableBuffer`]/[`WritableBuffer`]/[`ClearableBuffer`] 访问缓冲，
//!   因此对现有及未来的任意实现（包括 [`AnyBuffer`](crate::AnyBuffer) 这样的类型擦除包装）都原样可用。

use crate::{
    Result,
    contract::{ClearableBuffer, ReadableBuffer, WritableBuffer},
};

/// 把整段切片交给 `buf.write`，返回实际写入数。
///
/// # Errors
/// 透传目标缓冲的写入错误（仅分段缓冲会因分配失败而出错）。
pub fn buffer_write<B>(buf: &mut B, src: &[B::Item]) -> Result<usize>
where
    B: WritableBuffer + ?Sized,
{
    buf.write(src)
}

/// 用 `buf.read` 填充整段切片，返回实际读取数。
pub fn buffer_read<B>(buf: &mut B, dst: &mut [B::Item]) -> usize
where
    B: ReadableBuffer + ?Sized,
{
    buf.read(dst)
}

/// 把 `from` 的全部可读数据复制到 `to`，不改变 `from`。
///
/// # 教案式说明
/// - **执行 (How)**：按读取顺序逐段调用 `to.write`；某一段只被部分接受时说明目标已满，立即停止；
/// - **契约 (What)**：
///   - 返回写入 `to` 的元素总数，小于 `from.readable_len()` 表示目标空间不足；
///   - 两侧元素类型必须一致，由 `W: WritableBuffer<Item = R::Item>` 在编译期约束；
///   - 分段源缓冲的全部 extent 都会被访问，不受单次区间查询的跨度上限影响。
///
/// # Errors
/// 目标写入失败时返回其错误，`written` 字段被改写为本次复制的累计写入数。
pub fn buffer_copy<R, W>(from: &R, to: &mut W) -> Result<usize>
where
    R: ReadableBuffer + ?Sized,
    W: WritableBuffer<Item = R::Item> + ?Sized,
{
    let mut copied = 0;
    let mut failure = None;
    from.visit_readable(&mut |range: &[R::Item]| match to.write(range) {
        Ok(n) => {
            copied += n;
            n == range.len()
        }
        Err(err) => {
            copied += err.written();
            failure = Some(err);
            false
        }
    });
    match failure {
        Some(err) => Err(err.with_written(copied)),
        None => Ok(copied),
    }
}

/// 先 [`buffer_copy`]，再清空 `from`。
///
/// # 契约说明（What）
/// - 成功返回后 `from` 不再持有可读数据；
/// - 目标容量不足时，未被接受的数据随 `from.clear()` 一并丢弃，调用方应先确认
///   `to.writable_len()` 足够，或改用 [`buffer_copy`] 加 `discard`；
/// - 复制失败时 `from` 保持原样，不会被清空。
///
/// # Errors
/// 同 [`buffer_copy`]。
pub fn buffer_move<R, W>(from: &mut R, to: &mut W) -> Result<usize>
where
    R: ReadableBuffer + ClearableBuffer + ?Sized,
    W: WritableBuffer<Item = R::Item> + ?Sized,
{
    let moved = buffer_copy(from, to)?;
    from.clear();
    Ok(moved)
}
