#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

//! `spark-iobuf` 提供三种可互换的 I/O 缓冲实现及其共享能力契约。
//!
//! # 模块定位（Why）
//! - 编解码层与传输层在生产者与消费者之间搬运字节（或字符单元）时，需要一种既能零拷贝暴露内存、
//!   又能在不同容量策略之间自由替换的缓冲抽象；
//! - 三种实现覆盖了典型的容量模型：
//!   - [`FixedBuffer`]：内联定长存储，单向游标，读完后显式复位；
//!   - [`CircularBuffer`]：`N + 1` 槽位环形存储，读出即释放空间，可无限期复用；
//!   - [`SegmentedBuffer`]：定长 extent 串联，按需增长并回收读空的 extent。
//!
//! # 设计概要（How）
//! - [`ReadableBuffer`]/[`WritableBuffer`] 以 `read`/`discard`/`readable_ranges` 与
//!   `write`/`commit`/`writable_ranges` 描述读写两侧，[`ClearableBuffer`] 描述整体复位；
//! - [`buffer_copy`]、[`buffer_move`] 等算法只依赖上述契约，对任意实现原样可用；
//! - [`ReadableRangeBuffer`]/[`WritableRangeBuffer`] 让调用方持有的内存参与同一套契约，
//!   [`AnyBuffer`] 则在运行期擦除具体变体；
//! - 游标一律以整数偏移表达，所有元素访问都经过切片边界检查，crate 内不含 `unsafe`。
//!
//! # 契约约定（What）
//! - 满与空通过返回的计数表达，不是错误；只有分段缓冲会因分配失败返回 [`BufferError`]；
//! - 内部不变量被破坏属于实现缺陷，由调试断言立即终止；
//! - 所有缓冲都是单一所有者的同步数据结构，不含任何内部锁。跨线程共享需调用方自行加锁。
//!
//! # 快速上手
//! ```
//! use spark_iobuf::{CircularBuffer, ReadableBuffer, WritableBuffer};
//!
//! let mut ring = CircularBuffer::<u8, 4>::new();
//! assert_eq!(ring.write(b"ABCD").unwrap(), 4);
//! let mut head = [0u8; 2];
//! assert_eq!(ring.read(&mut head), 2);
//! assert_eq!(ring.write(b"EF").unwrap(), 2);
//!
//! let mut out = [0u8; 4];
//! assert_eq!(ring.read(&mut out), 4);
//! assert_eq!(&out, b"CDEF");
//! ```

extern crate alloc;

mod algorithms;
mod bytes_buf;
mod circular;
mod contract;
mod erased;
mod fixed;
mod range;
mod segmented;

pub mod constants;
pub mod error;
#[cfg(feature = "std")]
pub mod io;

pub use algorithms::{buffer_copy, buffer_move, buffer_read, buffer_write};
pub use circular::CircularBuffer;
pub use contract::{Buffer, ClearableBuffer, Ranges, RangesMut, ReadableBuffer, WritableBuffer};
pub use erased::{AnyBuffer, DynBuffer};
pub use error::{BufferError, Result};
pub use fixed::FixedBuffer;
pub use range::{ReadableRangeBuffer, WritableRangeBuffer};
pub use segmented::SegmentedBuffer;
