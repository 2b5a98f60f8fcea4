use crate::{
    Result,
    contract::{Buffer, ClearableBuffer, Ranges, RangesMut, ReadableBuffer, WritableBuffer},
};

/// 把调用方持有的只读切片包装成 [`ReadableBuffer`]。
///
/// # 设计动机（Why）
/// - 让外部内存（例如一次系统调用读出的报文、静态常量表）直接作为 `buffer_copy` 的源，
///   无需先拷进中间缓冲。
///
/// # 契约说明（What）
/// - 不拥有任何内存，生命周期 `'a` 约束包装器不得长于被借用的切片；
/// - `read`/`discard` 从前端收缩剩余视图，`readable_ranges` 恒为剩余视图本身（非空时）。
#[derive(Clone, Copy, Debug)]
pub struct ReadableRangeBuffer<'a, T> {
    range: &'a [T],
}

impl<'a, T: Copy> ReadableRangeBuffer<'a, T> {
    /// 包装整段切片。
    pub fn new(range: &'a [T]) -> Self {
        Self { range }
    }

    /// 尚未消费的剩余视图。
    pub fn as_slice(&self) -> &'a [T] {
        self.range
    }
}

impl<T: Copy> Buffer for ReadableRangeBuffer<'_, T> {
    type Item = T;
}

impl<T: Copy> ReadableBuffer for ReadableRangeBuffer<'_, T> {
    fn readable_len(&self) -> usize {
        self.range.len()
    }

    fn read(&mut self, dst: &mut [T]) -> usize {
        let n = dst.len().min(self.range.len());
        let (head, rest) = self.range.split_at(n);
        dst[..n].copy_from_slice(head);
        self.range = rest;
        n
    }

    fn discard(&mut self, n: usize) -> usize {
        let n = n.min(self.range.len());
        self.range = &self.range[n..];
        n
    }

    fn readable_ranges(&self) -> Ranges<'_, T> {
        let mut ranges = Ranges::new();
        if !self.range.is_empty() {
            ranges.push(self.range);
        }
        ranges
    }
}

impl<T: Copy> ClearableBuffer for ReadableRangeBuffer<'_, T> {
    fn clear(&mut self) {
        self.range = &self.range[self.range.len()..];
    }
}

/// 把调用方持有的可写切片包装成 [`WritableBuffer`]。
///
/// - `write`/`commit` 从前端收缩空闲视图，已填充的前缀可通过 [`filled`](Self::filled) 取回；
/// - 典型用法是把固定缓冲的数据直接 `buffer_copy` 进一个预先分配好的目标数组。
#[derive(Debug)]
pub struct WritableRangeBuffer<'a, T> {
    range: &'a mut [T],
    filled: usize,
}

impl<'a, T: Copy> WritableRangeBuffer<'a, T> {
    /// 包装整段切片，初始时全部为空闲空间。
    pub fn new(range: &'a mut [T]) -> Self {
        Self { range, filled: 0 }
    }

    /// 已写入（或已提交）的前缀。
    pub fn filled(&self) -> &[T] {
        &self.range[..self.filled]
    }

    /// 消耗包装器，返回借用期为 `'a` 的已填充前缀。
    pub fn into_filled(self) -> &'a mut [T] {
        let Self { range, filled } = self;
        &mut range[..filled]
    }
}

impl<T: Copy> Buffer for WritableRangeBuffer<'_, T> {
    type Item = T;
}

impl<T: Copy> WritableBuffer for WritableRangeBuffer<'_, T> {
    fn writable_len(&self) -> usize {
        self.range.len() - self.filled
    }

    fn write(&mut self, src: &[T]) -> Result<usize> {
        let n = src.len().min(self.writable_len());
        self.range[self.filled..self.filled + n].copy_from_slice(&src[..n]);
        self.filled += n;
        Ok(n)
    }

    fn commit(&mut self, n: usize) -> usize {
        let n = n.min(self.writable_len());
        self.filled += n;
        n
    }

    fn writable_ranges(&mut self) -> RangesMut<'_, T> {
        let mut ranges = RangesMut::new();
        if self.filled < self.range.len() {
            ranges.push(&mut self.range[self.filled..]);
        }
        ranges
    }
}

impl<T: Copy> ClearableBuffer for WritableRangeBuffer<'_, T> {
    /// 放弃已填充的前缀，整段切片重新成为空闲空间。
    fn clear(&mut self) {
        self.filled = 0;
    }
}

impl<'a, T: Copy> From<&'a [T]> for ReadableRangeBuffer<'a, T> {
    fn from(range: &'a [T]) -> Self {
        Self::new(range)
    }
}

impl<'a, T: Copy> From<&'a mut [T]> for WritableRangeBuffer<'a, T> {
    fn from(range: &'a mut [T]) -> Self {
        Self::new(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writable_range_reports_filled_prefix() {
        let mut storage = [0u8; 6];
        let mut buf = WritableRangeBuffer::new(&mut storage);
        assert_eq!(buf.write(b"abcd").expect("区间写入不会失败"), 4);
        assert_eq!(buf.filled(), b"abcd");
        assert_eq!(buf.write(b"efgh").expect("区间写入不会失败"), 2);
        assert_eq!(buf.writable_len(), 0);
        assert!(buf.writable_ranges().is_empty());
        assert_eq!(buf.into_filled(), b"abcdef");
    }

    #[test]
    fn readable_range_clear_drops_remainder() {
        let data = [1u16, 2, 3];
        let mut buf = ReadableRangeBuffer::new(&data);
        assert_eq!(buf.discard(1), 1);
        buf.clear();
        assert!(buf.is_empty());
        assert!(buf.as_slice().is_empty());
    }
}
