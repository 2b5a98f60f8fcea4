//! 字节缓冲与 `bytes::Buf` 的互操作。
//!
//! 生态中的编解码器（`prost`、`tokio-util` 的 `Decoder` 等）普遍以 `bytes::Buf` 为输入；
//! 为每个字节缓冲实现该 trait 后，它们可以直接消费本 crate 的缓冲而无需先拷成 `Bytes`。
//!
//! - `remaining` 对应 `readable_len`，`chunk` 对应第一段可读跨度，`advance` 对应 `discard`；
//! - `advance` 越界按 `Buf` 的约定 panic；
//! - `chunks_vectored` 依赖 `std::io::IoSlice`，仅在 `std` 特性下覆盖默认实现。

use bytes::Buf;

use crate::{
    AnyBuffer, CircularBuffer, FixedBuffer, ReadableRangeBuffer, SegmentedBuffer,
    contract::ReadableBuffer,
};

fn advance_exact<B: ReadableBuffer + ?Sized>(buf: &mut B, cnt: usize) {
    let remaining = buf.readable_len();
    assert!(
        cnt <= remaining,
        "cannot advance past `remaining`: {cnt} > {remaining}"
    );
    buf.discard(cnt);
}

#[cfg(feature = "std")]
fn fill_io_slices<'a, B>(buf: &'a B, dst: &mut [std::io::IoSlice<'a>]) -> usize
where
    B: ReadableBuffer<Item = u8> + ?Sized,
{
    let mut filled = 0;
    for (slot, range) in dst.iter_mut().zip(buf.readable_ranges()) {
        *slot = std::io::IoSlice::new(range);
        filled += 1;
    }
    filled
}

macro_rules! impl_bytes_buf {
    ([$($generics:tt)*] $ty:ty) => {
        impl<$($generics)*> Buf for $ty {
            fn remaining(&self) -> usize {
                ReadableBuffer::readable_len(self)
            }

            fn chunk(&self) -> &[u8] {
                ReadableBuffer::readable_front(self)
            }

            fn advance(&mut self, cnt: usize) {
                advance_exact(self, cnt);
            }

            #[cfg(feature = "std")]
            fn chunks_vectored<'a>(&'a self, dst: &mut [std::io::IoSlice<'a>]) -> usize {
                fill_io_slices(self, dst)
            }
        }
    };
}

impl_bytes_buf!([const N: usize] FixedBuffer<u8, N>);
impl_bytes_buf!([const N: usize] CircularBuffer<u8, N>);
impl_bytes_buf!([const EXTENT: usize, const MAX_RANGES: usize] SegmentedBuffer<u8, EXTENT, MAX_RANGES>);
impl_bytes_buf!(['r] ReadableRangeBuffer<'r, u8>);
impl_bytes_buf!(['r] AnyBuffer<'r, u8>);
