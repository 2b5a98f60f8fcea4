use smallvec::SmallVec;

use crate::{Result, constants::INLINE_RANGES};

/// 按读取顺序排列的只读跨度序列。
pub type Ranges<'a, T> = SmallVec<[&'a [T]; INLINE_RANGES]>;

/// 按写入顺序排列的可写跨度序列。
pub type RangesMut<'a, T> = SmallVec<[&'a mut [T]; INLINE_RANGES]>;

/// `Buffer` 声明缓冲承载的元素类型，是读写两侧契约的公共根。
///
/// # 设计背景（Why）
/// - 读写能力拆分为 [`ReadableBuffer`] 与 [`WritableBuffer`] 两个 trait，区间适配器只具备其中一侧；
/// - 若两侧各自声明关联类型，同时实现二者的缓冲会出现 `Self::Item` 歧义，因此元素类型上提到此处。
///
/// # 契约说明（What）
/// - `Item` 必须是 `Copy`：所有搬运都是逐元素按位复制，缓冲从不运行元素的析构逻辑；
/// - 字节流使用 `u8`，字符流可使用 `u16`/`u32`/`char` 等类型。
pub trait Buffer {
    /// 缓冲中存储的元素类型。
    type Item: Copy;
}

/// `ReadableBuffer` 定义消费侧契约：拷贝读取、零拷贝观察与丢弃。
///
/// # 逻辑解析（How）
/// - 拷贝路径：[`read`](Self::read) 把数据复制到调用方切片并推进读游标；
/// - 零拷贝路径：[`readable_ranges`](Self::readable_ranges) 暴露仍未读取的连续内存，
///   调用方处理完毕后以 [`discard`](Self::discard) 宣告消费量。
///
/// # 契约说明（What）
/// - **饱和语义**：`read(dst)` 返回 `min(dst.len(), readable_len())`，`discard(n)` 返回
///   `min(n, readable_len())`；返回值小于请求量表示数据不足，而非错误；
/// - **顺序性**：跨度按读取顺序排列，拼接后恰为接下来会被 `read` 取出的数据；
/// - **有效期**：跨度借用 `&self`，下一次可变调用之前始终有效；
/// - `discard(0)` 与零长度 `read` 不改变任何状态。
pub trait ReadableBuffer: Buffer {
    /// 当前可读元素总数。
    fn readable_len(&self) -> usize;

    /// 把至多 `dst.len()` 个元素复制到 `dst`，返回实际复制数。
    fn read(&mut self, dst: &mut [Self::Item]) -> usize;

    /// 丢弃至多 `n` 个位于读端的元素，返回实际丢弃数。
    fn discard(&mut self, n: usize) -> usize;

    /// 按读取顺序返回承载未读数据的跨度，不含空跨度。
    fn readable_ranges(&self) -> Ranges<'_, Self::Item>;

    /// 判断缓冲是否已读空。
    fn is_empty(&self) -> bool {
        self.readable_len() == 0
    }

    /// 返回第一段可读跨度，无数据时为空切片。
    fn readable_front(&self) -> &[Self::Item] {
        self.readable_ranges().into_iter().next().unwrap_or(&[])
    }

    /// 按读取顺序逐段访问全部可读数据，`visit` 返回 `false` 时提前停止。
    ///
    /// 与 [`readable_ranges`](Self::readable_ranges) 不同，这里不受单次查询跨度上限的约束；
    /// 对跨度数有上限的实现必须覆盖默认实现。
    fn visit_readable(&self, visit: &mut dyn FnMut(&[Self::Item]) -> bool) {
        for range in self.readable_ranges() {
            if !visit(range) {
                break;
            }
        }
    }
}

/// `WritableBuffer` 定义生产侧契约：拷贝写入，以及“预留、外部填充、提交”的零拷贝写入。
///
/// # 逻辑解析（How）
/// - 拷贝路径：[`write`](Self::write) 把调用方切片复制进空闲空间；
/// - 零拷贝路径：[`writable_ranges`](Self::writable_ranges) 暴露空闲内存，调用方（例如一次系统
///   `read` 调用）直接填充后以 [`commit`](Self::commit) 宣告实际写入量。
///
/// # 契约说明（What）
/// - **饱和语义**：容量受限的实现返回 `Ok(min(src.len(), writable_len()))`；
/// - **失败语义**：只有需要向分配器申请内存的实现（分段缓冲）会返回 `Err`，
///   错误中携带失败前已接受的元素数；
/// - `commit(n)` 返回 `min(n, writable_len())`，且只会把已经通过 `writable_ranges`
///   暴露过的空间标记为可读，从不分配；
/// - `commit(0)` 与空切片 `write` 不改变任何状态。
pub trait WritableBuffer: Buffer {
    /// 当前无需分配即可写入的元素总数。
    fn writable_len(&self) -> usize;

    /// 复制 `src` 中尽可能多的元素，返回实际写入数。
    fn write(&mut self, src: &[Self::Item]) -> Result<usize>;

    /// 将至多 `n` 个已在外部写入的元素标记为可读，返回实际提交数。
    fn commit(&mut self, n: usize) -> usize;

    /// 按写入顺序返回空闲跨度，不含空跨度。
    fn writable_ranges(&mut self) -> RangesMut<'_, Self::Item>;
}

/// 可被整体清空的缓冲；`buffer_move` 依赖该能力在搬运后重置源缓冲。
pub trait ClearableBuffer {
    /// 丢弃全部可读数据并把游标重置到初始位置，保留已拥有的存储。
    fn clear(&mut self);
}
