use core::fmt;

use crate::{
    ClearableBuffer, Result,
    contract::{Buffer, Ranges, RangesMut, ReadableBuffer, WritableBuffer},
};

/// `FixedBuffer` 是单块内联存储上的“碰撞式”缓冲：写游标只向前推进，读游标追随其后。
///
/// # 设计动机（Why）
/// - 解码一帧、拼装一个报文这类“一次写满、一次读完”的场景不需要环绕逻辑，
///   两个单调游标即可给出最简单、最快的读写路径；
/// - 存储是 `[T; N]` 内联数组，构造后不再触碰分配器。
///
/// # 状态模型（How）
/// - `read ≤ write ≤ N`；可读区间 `[read, write)`，可写区间 `[write, N)`；
/// - 读取不会释放写空间：一旦 `write == N`，缓冲在 [`reset`](Self::reset) 之前都无法再写入；
/// - `read == write == N` 称为“耗尽”，类型本身从不自动复位，由持有者决定何时复用。
///
/// # 契约说明（What）
/// - 所有操作都是饱和的：满与空通过返回的计数表达，没有错误路径；
/// - `readable_ranges`/`writable_ranges` 至多返回一段跨度。
pub struct FixedBuffer<T, const N: usize> {
    data: [T; N],
    read: usize,
    write: usize,
}

impl<T: Copy + Default, const N: usize> FixedBuffer<T, N> {
    /// 创建空缓冲，两个游标都位于起点。
    pub fn new() -> Self {
        Self {
            data: [T::default(); N],
            read: 0,
            write: 0,
        }
    }
}

impl<T: Copy + Default, const N: usize> Default for FixedBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy, const N: usize> FixedBuffer<T, N> {
    /// 存储容量。
    pub const fn capacity(&self) -> usize {
        N
    }

    /// 读写游标都已抵达末尾，必须 [`reset`](Self::reset) 才能继续使用。
    pub fn is_exhausted(&self) -> bool {
        self.read == N && self.write == N
    }

    /// 把两个游标拨回起点，丢弃尚未读取的数据。
    pub fn reset(&mut self) {
        self.read = 0;
        self.write = 0;
    }

    /// 写入 `src` 的前缀，返回实际写入数。
    fn push(&mut self, src: &[T]) -> usize {
        let n = src.len().min(N - self.write);
        self.data[self.write..self.write + n].copy_from_slice(&src[..n]);
        self.write += n;
        n
    }

    /// 读取到 `dst` 的前缀，返回实际读取数。
    fn pop(&mut self, dst: &mut [T]) -> usize {
        let n = dst.len().min(self.write - self.read);
        dst[..n].copy_from_slice(&self.data[self.read..self.read + n]);
        self.read += n;
        n
    }

    fn debug_check(&self) {
        debug_assert!(
            self.read <= self.write && self.write <= N,
            "FixedBuffer cursor order violated: read={} write={} capacity={N}",
            self.read,
            self.write,
        );
    }
}

impl<T: Copy, const N: usize> Buffer for FixedBuffer<T, N> {
    type Item = T;
}

impl<T: Copy, const N: usize> ReadableBuffer for FixedBuffer<T, N> {
    fn readable_len(&self) -> usize {
        self.write - self.read
    }

    fn read(&mut self, dst: &mut [T]) -> usize {
        let n = self.pop(dst);
        self.debug_check();
        n
    }

    fn discard(&mut self, n: usize) -> usize {
        let n = n.min(self.readable_len());
        self.read += n;
        self.debug_check();
        n
    }

    fn readable_ranges(&self) -> Ranges<'_, T> {
        let mut ranges = Ranges::new();
        if self.read < self.write {
            ranges.push(&self.data[self.read..self.write]);
        }
        ranges
    }
}

impl<T: Copy, const N: usize> WritableBuffer for FixedBuffer<T, N> {
    fn writable_len(&self) -> usize {
        N - self.write
    }

    fn write(&mut self, src: &[T]) -> Result<usize> {
        let n = self.push(src);
        self.debug_check();
        Ok(n)
    }

    fn commit(&mut self, n: usize) -> usize {
        let n = n.min(self.writable_len());
        self.write += n;
        self.debug_check();
        n
    }

    fn writable_ranges(&mut self) -> RangesMut<'_, T> {
        let mut ranges = RangesMut::new();
        if self.write < N {
            ranges.push(&mut self.data[self.write..]);
        }
        ranges
    }
}

impl<T: Copy, const N: usize> ClearableBuffer for FixedBuffer<T, N> {
    fn clear(&mut self) {
        self.reset();
    }
}

impl<T: Copy, const N: usize> fmt::Debug for FixedBuffer<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedBuffer")
            .field("capacity", &N)
            .field("read", &self.read)
            .field("write", &self.write)
            .finish()
    }
}
