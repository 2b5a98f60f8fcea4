use alloc::{boxed::Box, collections::TryReserveError, collections::VecDeque, vec::Vec};
use core::fmt;

use tracing::{debug, trace, warn};

use crate::{
    BufferError, ClearableBuffer, Result,
    constants::{DEFAULT_EXTENT_LEN, DEFAULT_MAX_RANGES},
    contract::{Buffer, Ranges, RangesMut, ReadableBuffer, WritableBuffer},
};

/// 分段缓冲中的单个定长存储块。
///
/// - `read ≤ write ≤ data.len()`；
/// - `write == data.len()` 称为“写满”，在此基础上 `read == write` 称为“死亡”，可被回收。
struct Extent<T> {
    data: Box<[T]>,
    read: usize,
    write: usize,
}

impl<T: Copy + Default> Extent<T> {
    fn allocate(len: usize) -> core::result::Result<Self, TryReserveError> {
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, T::default());
        Ok(Self {
            data: data.into_boxed_slice(),
            read: 0,
            write: 0,
        })
    }
}

impl<T: Copy> Extent<T> {
    fn readable(&self) -> &[T] {
        &self.data[self.read..self.write]
    }

    fn writable(&mut self) -> &mut [T] {
        &mut self.data[self.write..]
    }

    fn readable_len(&self) -> usize {
        self.write - self.read
    }

    fn writable_len(&self) -> usize {
        self.data.len() - self.write
    }

    fn is_full(&self) -> bool {
        self.write == self.data.len()
    }

    fn is_dead(&self) -> bool {
        self.is_full() && self.read == self.write
    }

    fn is_pristine(&self) -> bool {
        self.read == 0 && self.write == 0
    }

    fn push(&mut self, src: &[T]) -> usize {
        let n = src.len().min(self.writable_len());
        self.data[self.write..self.write + n].copy_from_slice(&src[..n]);
        self.write += n;
        n
    }

    fn pop(&mut self, dst: &mut [T]) -> usize {
        let n = dst.len().min(self.readable_len());
        dst[..n].copy_from_slice(&self.data[self.read..self.read + n]);
        self.read += n;
        n
    }

    fn advance_write(&mut self, n: usize) -> usize {
        let n = n.min(self.writable_len());
        self.write += n;
        n
    }

    fn advance_read(&mut self, n: usize) -> usize {
        let n = n.min(self.readable_len());
        self.read += n;
        n
    }

    fn clear(&mut self) {
        self.read = 0;
        self.write = 0;
    }
}

/// `SegmentedBuffer` 是由定长 extent 串联而成、容量随写入增长的缓冲。
///
/// # 设计动机（Why）
/// - 输入规模不可预知时，固定或环形缓冲要么浪费内存要么频繁截断；分段缓冲按 extent 粒度增长，
///   追加数据时从不搬移已写入的数据，尚未读取的跨度在后续写入期间保持原位；
/// - 持续的“写入-读出-再写入”会不断产生读空的 extent。它们不会被释放，而是被移到队尾复用，
///   把分配成本摊薄到零。
///
/// # 结构设计（How）
/// - `extents` 按逻辑顺序保存全部 extent：下标 `0` 是 head（最老的、仍持有或即将持有可读数据的块），
///   下标 `tail` 是当前接收写入的块，`tail` 之后都是空闲块；
/// - `tail` 之前的块全部写满，`tail` 之后的块全部空白；
/// - head 死亡且不是 tail 时，从队首弹出、清空后压入队尾（回收）；head 就是 tail 时原地清空；
/// - 写满 tail 后保证其后至少还有一个空闲块（`ensure_minfree`），使 `writable_ranges`
///   在写入恰好填满 tail 之后仍有空间可报告。
///
/// # 契约说明（What）
/// - `write` 只在分配 extent 失败时返回 [`BufferError::AllocationFailed`]，错误携带失败前已写入的元素数；
/// - `read`/`discard`/`commit` 饱和且从不分配；
/// - `readable_ranges`/`writable_ranges` 每次至多返回 `MAX_RANGES` 段，需要更多时先
///   `discard`/`commit` 再重新查询；
/// - 不实现 `Clone`：复制整条 extent 链几乎从来不是调用方想要的；移动则只转移所有权。
///
/// # 风险与取舍（Trade-offs）
/// - extent 只增不减，峰值内存会一直被持有；需要归还时调用 [`shrink_to_fit`](Self::shrink_to_fit)。
pub struct SegmentedBuffer<
    T,
    const EXTENT: usize = { DEFAULT_EXTENT_LEN },
    const MAX_RANGES: usize = { DEFAULT_MAX_RANGES },
> {
    extents: VecDeque<Extent<T>>,
    tail: usize,
    readable: usize,
    allocated: usize,
}

impl<T: Copy + Default, const EXTENT: usize, const MAX_RANGES: usize>
    SegmentedBuffer<T, EXTENT, MAX_RANGES>
{
    /// 创建只含一个 extent 的空缓冲（head 与 tail 指向同一块）。
    ///
    /// # Errors
    /// - `EXTENT == 0` 时返回 [`BufferError::ZeroSizedExtent`]；
    /// - `MAX_RANGES == 0` 时返回 [`BufferError::ZeroRangeLimit`]；
    /// - 首个 extent 分配失败时返回 [`BufferError::AllocationFailed`]。
    pub fn new() -> Result<Self> {
        Self::with_spare_extents(0)
    }

    /// 创建缓冲，并额外预分配 `spare` 个空闲 extent。
    ///
    /// # Errors
    /// 同 [`new`](Self::new)。
    pub fn with_spare_extents(spare: usize) -> Result<Self> {
        if EXTENT == 0 {
            return Err(BufferError::ZeroSizedExtent);
        }
        if MAX_RANGES == 0 {
            return Err(BufferError::ZeroRangeLimit);
        }
        let mut buffer = Self {
            extents: VecDeque::new(),
            tail: 0,
            readable: 0,
            allocated: 0,
        };
        buffer.allocate_extents(1 + spare)?;
        Ok(buffer)
    }

    /// 确保无需再分配即可写入至少 `additional` 个元素。
    ///
    /// # 教案式说明
    /// - **意图 (Why)**：零拷贝写入路径只通过 `writable_ranges` 拿空间，而 `commit` 从不分配；
    ///   调用方在发起一次大块的外部填充前可借此一次性预留。
    /// - **契约 (What)**：成功后 `writable_len() >= additional`；失败时已分配的 extent 保留在缓冲中。
    ///
    /// # Errors
    /// extent 分配失败时返回 [`BufferError::AllocationFailed`]。
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        let missing = additional.saturating_sub(self.writable_len());
        if missing == 0 {
            return Ok(());
        }
        self.allocate_extents(missing.div_ceil(EXTENT))
    }

    fn allocate_extents(&mut self, count: usize) -> Result<()> {
        self.extents
            .try_reserve(count)
            .map_err(Self::allocation_failed)?;
        for _ in 0..count {
            let extent = Extent::allocate(EXTENT).map_err(Self::allocation_failed)?;
            self.extents.push_back(extent);
            self.allocated += 1;
            trace!(
                extent_len = EXTENT,
                extents = self.extents.len(),
                allocated = self.allocated,
                "segmented buffer allocated extent"
            );
        }
        Ok(())
    }

    fn allocation_failed(source: TryReserveError) -> BufferError {
        warn!(
            extent_len = EXTENT,
            error = %source,
            "segmented buffer failed to allocate extent"
        );
        BufferError::AllocationFailed {
            requested: EXTENT,
            written: 0,
            source,
        }
    }

    /// tail 写满时切换到下一个空闲块，没有空闲块则新分配一个。
    fn make_tail(&mut self) -> Result<()> {
        debug_assert!(self.extents[self.tail].is_full(), "make_tail on a non-full tail");
        if self.tail + 1 == self.extents.len() {
            self.allocate_extents(1)?;
        }
        self.advance_tail();
        Ok(())
    }

    /// tail 恰好写满且其后没有空闲块时补充一个。
    fn ensure_minfree(&mut self) -> Result<()> {
        if self.extents[self.tail].is_full() && self.tail + 1 == self.extents.len() {
            self.allocate_extents(1)?;
        }
        Ok(())
    }

    fn refill_spare(&mut self) {
        // 写入本身已经成功；补充失败时由下一次 write 在 make_tail 中重试并上报。
        if let Err(err) = self.ensure_minfree() {
            debug!(code = err.code(), "segmented buffer deferred spare extent");
        }
    }
}

impl<T: Copy, const EXTENT: usize, const MAX_RANGES: usize> SegmentedBuffer<T, EXTENT, MAX_RANGES> {
    /// 当前持有的全部元素槽位数（含空闲 extent）。
    pub fn capacity(&self) -> usize {
        self.extents.len() * EXTENT
    }

    /// 当前持有的 extent 数。
    pub fn extent_count(&self) -> usize {
        self.extents.len()
    }

    /// 自创建以来累计分配过的 extent 数，回收复用不计入。
    pub fn allocated_extents(&self) -> usize {
        self.allocated
    }

    /// 释放 tail 之后多余的空闲 extent，只保留维持 `ensure_minfree` 所需的那一个。
    pub fn shrink_to_fit(&mut self) {
        let keep = self.tail + 1 + usize::from(self.extents[self.tail].is_full());
        let released = self.extents.len().saturating_sub(keep);
        if released == 0 {
            return;
        }
        self.extents.truncate(keep);
        self.extents.shrink_to_fit();
        trace!(
            released,
            extents = self.extents.len(),
            "segmented buffer released spare extents"
        );
    }

    fn exposed_writable_len(&self) -> usize {
        self.extents
            .iter()
            .skip(self.tail)
            .map(Extent::writable_len)
            .filter(|&len| len > 0)
            .take(MAX_RANGES)
            .sum()
    }

    fn advance_tail(&mut self) {
        self.tail += 1;
        debug_assert!(
            self.extents[self.tail].is_pristine(),
            "extent ahead of tail holds data"
        );
    }

    /// head 死亡时回收或原地清空，返回是否发生了处理。
    fn retire_dead_head(&mut self) -> bool {
        if !self.extents[0].is_dead() {
            return false;
        }
        if self.tail == 0 {
            self.extents[0].clear();
            return true;
        }
        if let Some(mut dead) = self.extents.pop_front() {
            dead.clear();
            self.extents.push_back(dead);
            self.tail -= 1;
            trace!(
                tail = self.tail,
                extents = self.extents.len(),
                "segmented buffer recycled drained extent"
            );
        }
        true
    }

    fn debug_check(&self) {
        debug_assert!(self.tail < self.extents.len(), "tail escaped extent chain");
        debug_assert!(
            self.extents.iter().take(self.tail).all(Extent::is_full),
            "extent before tail is not full"
        );
        debug_assert!(
            self.extents.iter().skip(self.tail + 1).all(Extent::is_pristine),
            "extent after tail holds data"
        );
        debug_assert_eq!(
            self.readable,
            self.extents
                .iter()
                .take(self.tail + 1)
                .map(Extent::readable_len)
                .sum::<usize>(),
            "cached readable length drifted"
        );
    }
}

impl<T: Copy, const EXTENT: usize, const MAX_RANGES: usize> Buffer
    for SegmentedBuffer<T, EXTENT, MAX_RANGES>
{
    type Item = T;
}

impl<T: Copy, const EXTENT: usize, const MAX_RANGES: usize> ReadableBuffer
    for SegmentedBuffer<T, EXTENT, MAX_RANGES>
{
    fn readable_len(&self) -> usize {
        self.readable
    }

    fn read(&mut self, dst: &mut [T]) -> usize {
        let mut read = 0;
        while read < dst.len() {
            let n = self.extents[0].pop(&mut dst[read..]);
            read += n;
            self.readable -= n;
            if !self.retire_dead_head() && n == 0 {
                break;
            }
        }
        self.debug_check();
        read
    }

    fn discard(&mut self, n: usize) -> usize {
        let mut discarded = 0;
        while discarded < n {
            let step = self.extents[0].advance_read(n - discarded);
            discarded += step;
            self.readable -= step;
            if !self.retire_dead_head() && step == 0 {
                break;
            }
        }
        self.debug_check();
        discarded
    }

    fn readable_ranges(&self) -> Ranges<'_, T> {
        self.extents
            .iter()
            .take(self.tail + 1)
            .map(Extent::readable)
            .filter(|range| !range.is_empty())
            .take(MAX_RANGES)
            .collect()
    }

    fn visit_readable(&self, visit: &mut dyn FnMut(&[T]) -> bool) {
        for extent in self.extents.iter().take(self.tail + 1) {
            let range = extent.readable();
            if !range.is_empty() && !visit(range) {
                break;
            }
        }
    }
}

impl<T: Copy + Default, const EXTENT: usize, const MAX_RANGES: usize> WritableBuffer
    for SegmentedBuffer<T, EXTENT, MAX_RANGES>
{
    /// 已持有的空闲空间；`write` 会在此之外继续增长。
    fn writable_len(&self) -> usize {
        self.extents
            .iter()
            .skip(self.tail)
            .map(Extent::writable_len)
            .sum()
    }

    fn write(&mut self, src: &[T]) -> Result<usize> {
        let mut written = 0;
        while written < src.len() {
            if self.extents[self.tail].is_full()
                && let Err(err) = self.make_tail()
            {
                self.debug_check();
                return Err(err.with_written(written));
            }
            let n = self.extents[self.tail].push(&src[written..]);
            written += n;
            self.readable += n;
        }
        if written > 0 {
            self.refill_spare();
        }
        self.debug_check();
        Ok(written)
    }

    /// 至多提交最近一次 `writable_ranges` 能够暴露的空间，即 tail 起前 `MAX_RANGES` 段。
    fn commit(&mut self, n: usize) -> usize {
        let n = n.min(self.exposed_writable_len());
        let mut left = n;
        while left > 0 {
            if self.extents[self.tail].is_full() {
                self.advance_tail();
            }
            left -= self.extents[self.tail].advance_write(left);
        }
        self.readable += n;
        if n > 0 {
            self.refill_spare();
        }
        self.debug_check();
        n
    }

    fn writable_ranges(&mut self) -> RangesMut<'_, T> {
        self.extents
            .iter_mut()
            .skip(self.tail)
            .map(Extent::writable)
            .filter(|range| !range.is_empty())
            .take(MAX_RANGES)
            .collect()
    }
}

impl<T: Copy, const EXTENT: usize, const MAX_RANGES: usize> ClearableBuffer
    for SegmentedBuffer<T, EXTENT, MAX_RANGES>
{
    fn clear(&mut self) {
        self.extents.iter_mut().for_each(Extent::clear);
        self.tail = 0;
        self.readable = 0;
    }
}

impl<T: Copy, const EXTENT: usize, const MAX_RANGES: usize> fmt::Debug
    for SegmentedBuffer<T, EXTENT, MAX_RANGES>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentedBuffer")
            .field("extent_len", &EXTENT)
            .field("extents", &self.extents.len())
            .field("tail", &self.tail)
            .field("readable", &self.readable)
            .field("allocated", &self.allocated)
            .finish()
    }
}
