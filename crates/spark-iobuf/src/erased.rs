use alloc::boxed::Box;
use core::fmt;

use crate::{
    Result,
    contract::{Buffer, ClearableBuffer, Ranges, RangesMut, ReadableBuffer, WritableBuffer},
};

/// 同时具备读、写、清空三项能力的对象安全缓冲契约。
///
/// 所有满足三项能力的缓冲都通过 blanket impl 自动实现本 trait，调用方无需手写适配。
pub trait DynBuffer<T: Copy>:
    Buffer<Item = T> + ReadableBuffer + WritableBuffer + ClearableBuffer
{
}

impl<T, B> DynBuffer<T> for B
where
    T: Copy,
    B: Buffer<Item = T> + ReadableBuffer + WritableBuffer + ClearableBuffer,
{
}

/// `AnyBuffer` 在运行期隐藏具体缓冲变体，面向无法对缓冲类型泛型化的调用点。
///
/// # 设计背景（Why）
/// - 配置驱动的通道可能在运行期才决定使用固定、环形还是分段缓冲，而上层持有者的类型必须在编译期确定；
/// - 动态分发的成本只落在这一层，具体缓冲内部依旧是单态化代码。
///
/// # 契约说明（What）
/// - 六项核心操作与 `clear` 原样转发，语义与被包装的缓冲完全一致；
/// - `AnyBuffer` 自身也实现全部契约，可直接参与 [`buffer_copy`](crate::buffer_copy)/[`buffer_move`](crate::buffer_move)。
pub struct AnyBuffer<'a, T: Copy> {
    inner: Box<dyn DynBuffer<T> + 'a>,
}

impl<'a, T: Copy> AnyBuffer<'a, T> {
    /// 擦除具体类型并装箱。
    pub fn new<B>(buffer: B) -> Self
    where
        B: DynBuffer<T> + 'a,
    {
        Self {
            inner: Box::new(buffer),
        }
    }

    /// 复用已经装箱的缓冲。
    pub fn from_box(inner: Box<dyn DynBuffer<T> + 'a>) -> Self {
        Self { inner }
    }

    /// 取回内部的 trait 对象。
    pub fn into_inner(self) -> Box<dyn DynBuffer<T> + 'a> {
        self.inner
    }
}

impl<T: Copy> Buffer for AnyBuffer<'_, T> {
    type Item = T;
}

impl<T: Copy> ReadableBuffer for AnyBuffer<'_, T> {
    fn readable_len(&self) -> usize {
        self.inner.readable_len()
    }

    fn read(&mut self, dst: &mut [T]) -> usize {
        self.inner.read(dst)
    }

    fn discard(&mut self, n: usize) -> usize {
        self.inner.discard(n)
    }

    fn readable_ranges(&self) -> Ranges<'_, T> {
        self.inner.readable_ranges()
    }

    fn visit_readable(&self, visit: &mut dyn FnMut(&[T]) -> bool) {
        self.inner.visit_readable(visit);
    }
}

impl<T: Copy> WritableBuffer for AnyBuffer<'_, T> {
    fn writable_len(&self) -> usize {
        self.inner.writable_len()
    }

    fn write(&mut self, src: &[T]) -> Result<usize> {
        self.inner.write(src)
    }

    fn commit(&mut self, n: usize) -> usize {
        self.inner.commit(n)
    }

    fn writable_ranges(&mut self) -> RangesMut<'_, T> {
        self.inner.writable_ranges()
    }
}

impl<T: Copy> ClearableBuffer for AnyBuffer<'_, T> {
    fn clear(&mut self) {
        self.inner.clear();
    }
}

impl<T: Copy> fmt::Debug for AnyBuffer<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyBuffer")
            .field("readable", &self.inner.readable_len())
            .field("writable", &self.inner.writable_len())
            .finish()
    }
}
