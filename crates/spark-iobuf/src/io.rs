//! 基于“预留、外部填充、提交”模式的 `std::io` 桥接。
//!
//! # 模块定位（Why）
//! - 文件、套接字等通道与缓冲之间最常见的交互是：拿到空闲内存交给一次系统调用，再按实际传输量推进游标；
//! - 这里的两个函数正是该模式的参考实现：数据直接在缓冲存储与内核之间流动，不经过临时 `Vec<u8>`。
//!
//! # 契约说明（What）
//! - 每次调用只发起一次成功的向量化 I/O，返回实际传输的字节数；
//! - `ErrorKind::Interrupted` 会被透明重试，其余错误原样返回，缓冲状态保持不变。

use std::io::{self, IoSlice, IoSliceMut, Read, Write};

use smallvec::SmallVec;

use crate::{
    constants::INLINE_RANGES,
    contract::{ReadableBuffer, WritableBuffer},
};

/// 从 `reader` 读取一次，数据直接落入 `buf` 的空闲跨度并提交。
///
/// 返回 0 表示到达 EOF，或缓冲当前没有空闲空间（可通过 `writable_len()` 区分）。
///
/// # Errors
/// 透传 `reader` 的非 `Interrupted` 错误。
pub fn fill_from<B, R>(buf: &mut B, reader: &mut R) -> io::Result<usize>
where
    B: WritableBuffer<Item = u8> + ?Sized,
    R: Read + ?Sized,
{
    loop {
        let received = {
            let mut slices: SmallVec<[IoSliceMut<'_>; INLINE_RANGES]> = buf
                .writable_ranges()
                .into_iter()
                .map(IoSliceMut::new)
                .collect();
            if slices.is_empty() {
                return Ok(0);
            }
            match reader.read_vectored(&mut slices) {
                Ok(n) => n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        };
        return Ok(buf.commit(received));
    }
}

/// 把 `buf` 的可读跨度向量化写入 `writer` 一次，并丢弃已写出的部分。
///
/// 返回 0 表示缓冲已空，或 `writer` 本次未接受任何数据。
///
/// # Errors
/// 透传 `writer` 的非 `Interrupted` 错误。
pub fn drain_into<B, W>(buf: &mut B, writer: &mut W) -> io::Result<usize>
where
    B: ReadableBuffer<Item = u8> + ?Sized,
    W: Write + ?Sized,
{
    loop {
        let sent = {
            let slices: SmallVec<[IoSlice<'_>; INLINE_RANGES]> = buf
                .readable_ranges()
                .into_iter()
                .map(IoSlice::new)
                .collect();
            if slices.is_empty() {
                return Ok(0);
            }
            match writer.write_vectored(&slices) {
                Ok(n) => n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        };
        return Ok(buf.discard(sent));
    }
}

/// 反复调用 [`drain_into`] 直到缓冲读空。
///
/// # Errors
/// `writer` 在仍有数据时接受 0 字节会返回 `ErrorKind::WriteZero`；其余错误透传。
pub fn drain_all_into<B, W>(buf: &mut B, writer: &mut W) -> io::Result<usize>
where
    B: ReadableBuffer<Item = u8> + ?Sized,
    W: Write + ?Sized,
{
    let mut total = 0;
    while !buf.is_empty() {
        match drain_into(buf, writer)? {
            0 => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "writer accepted no bytes while buffer still holds data",
                ));
            }
            n => total += n,
        }
    }
    Ok(total)
}
