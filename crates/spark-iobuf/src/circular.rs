use alloc::{boxed::Box, vec};
use core::fmt;

use crate::{
    ClearableBuffer, Result,
    contract::{Buffer, Ranges, RangesMut, ReadableBuffer, WritableBuffer},
};

/// `CircularBuffer` 是容量恒为 `N` 的环形缓冲，读写游标在存储末尾绕回起点，可无限期复用。
///
/// # 设计动机（Why）
/// - 流式场景中生产与消费交替进行，固定缓冲需要频繁复位，而环形缓冲在读取后立即释放写空间；
/// - 存储在构造时一次性分配 `N + 1` 个槽位，此后读写都不再触碰分配器。
///
/// # 状态模型（How）
/// - 游标取值范围 `[0, N + 1)`，推进到末尾时回绕到 0；
/// - `read == write` 表示空；写游标永远不会追上读游标，二者之间至少空出一个槽位，
///   从而与“满”区分开，任意时刻最多有 `N` 个有效元素；
/// - 可读区间是从 `read` 开始、长度为 `readable_len()` 的环形区间，可写区间是从 `write`
///   开始、长度为 `writable_len()` 的环形区间；二者各自至多跨越一次末尾，因此至多两段。
///
/// # 契约说明（What）
/// - 写满后 `writable_ranges()` 为空，`write`/`commit` 返回 0；
/// - 游标越界属于实现缺陷，由调试断言捕获；所有元素访问都经过切片边界检查。
///
/// # 设计取舍（Trade-offs）
/// - 稳定版 Rust 无法在类型中书写 `[T; N + 1]`，存储因此放在堆上的 `Box<[T]>`，
///   分配只发生在构造阶段。
pub struct CircularBuffer<T, const N: usize> {
    data: Box<[T]>,
    read: usize,
    write: usize,
}

impl<T: Copy + Default, const N: usize> CircularBuffer<T, N> {
    /// 创建空缓冲，两个游标都位于起点。
    pub fn new() -> Self {
        Self {
            data: vec![T::default(); N + 1].into_boxed_slice(),
            read: 0,
            write: 0,
        }
    }
}

impl<T: Copy + Default, const N: usize> Default for CircularBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy, const N: usize> CircularBuffer<T, N> {
    const SLOTS: usize = N + 1;

    /// 最多可容纳的有效元素数。
    pub const fn capacity(&self) -> usize {
        N
    }

    /// 是否已写满。
    pub fn is_full(&self) -> bool {
        self.writable_len() == 0
    }

    /// 写入 `src` 的前缀，至多两段拷贝，返回实际写入数。
    fn push(&mut self, src: &[T]) -> usize {
        let n = src.len().min(self.writable_len());
        let (first, second) = self.split_at_wrap(self.write, n);
        self.data[self.write..self.write + first].copy_from_slice(&src[..first]);
        self.data[..second].copy_from_slice(&src[first..n]);
        self.write = Self::wrap(self.write + n);
        self.debug_check();
        n
    }

    /// 读取到 `dst` 的前缀，至多两段拷贝，返回实际读取数。
    fn pop(&mut self, dst: &mut [T]) -> usize {
        let n = dst.len().min(self.readable_len());
        let (first, second) = self.split_at_wrap(self.read, n);
        dst[..first].copy_from_slice(&self.data[self.read..self.read + first]);
        dst[first..n].copy_from_slice(&self.data[..second]);
        self.read = Self::wrap(self.read + n);
        self.debug_check();
        n
    }

    /// 把从 `start` 开始、长度为 `len` 的环形区间拆成“到末尾”与“回绕后”两段长度。
    fn split_at_wrap(&self, start: usize, len: usize) -> (usize, usize) {
        let first = len.min(Self::SLOTS - start);
        (first, len - first)
    }

    fn wrap(cursor: usize) -> usize {
        if cursor >= Self::SLOTS {
            cursor - Self::SLOTS
        } else {
            cursor
        }
    }

    fn debug_check(&self) {
        debug_assert!(
            self.read < Self::SLOTS && self.write < Self::SLOTS,
            "CircularBuffer cursor escaped storage: read={} write={} slots={}",
            self.read,
            self.write,
            Self::SLOTS,
        );
        debug_assert!(
            self.readable_len() <= N,
            "CircularBuffer holds more than its capacity: {} > {N}",
            self.readable_len(),
        );
    }
}

impl<T: Copy, const N: usize> Buffer for CircularBuffer<T, N> {
    type Item = T;
}

impl<T: Copy, const N: usize> ReadableBuffer for CircularBuffer<T, N> {
    fn readable_len(&self) -> usize {
        if self.write >= self.read {
            self.write - self.read
        } else {
            Self::SLOTS - self.read + self.write
        }
    }

    fn read(&mut self, dst: &mut [T]) -> usize {
        self.pop(dst)
    }

    fn discard(&mut self, n: usize) -> usize {
        let n = n.min(self.readable_len());
        self.read = Self::wrap(self.read + n);
        self.debug_check();
        n
    }

    fn readable_ranges(&self) -> Ranges<'_, T> {
        let (first, second) = self.split_at_wrap(self.read, self.readable_len());
        let mut ranges = Ranges::new();
        if first > 0 {
            ranges.push(&self.data[self.read..self.read + first]);
        }
        if second > 0 {
            ranges.push(&self.data[..second]);
        }
        ranges
    }
}

impl<T: Copy, const N: usize> WritableBuffer for CircularBuffer<T, N> {
    fn writable_len(&self) -> usize {
        N - self.readable_len()
    }

    fn write(&mut self, src: &[T]) -> Result<usize> {
        Ok(self.push(src))
    }

    fn commit(&mut self, n: usize) -> usize {
        let n = n.min(self.writable_len());
        self.write = Self::wrap(self.write + n);
        self.debug_check();
        n
    }

    fn writable_ranges(&mut self) -> RangesMut<'_, T> {
        let (first, second) = self.split_at_wrap(self.write, self.writable_len());
        let write = self.write;
        let mut ranges = RangesMut::new();
        // 回绕段位于写游标之前，先切开再按写入顺序入队。
        let (head, tail) = self.data.split_at_mut(write);
        if first > 0 {
            ranges.push(&mut tail[..first]);
        }
        if second > 0 {
            ranges.push(&mut head[..second]);
        }
        ranges
    }
}

impl<T: Copy, const N: usize> ClearableBuffer for CircularBuffer<T, N> {
    fn clear(&mut self) {
        self.read = 0;
        self.write = 0;
    }
}

impl<T: Copy, const N: usize> fmt::Debug for CircularBuffer<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircularBuffer")
            .field("capacity", &N)
            .field("read", &self.read)
            .field("write", &self.write)
            .finish()
    }
}
