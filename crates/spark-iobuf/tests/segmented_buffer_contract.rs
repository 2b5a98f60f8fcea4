//! `segmented_buffer_contract` 集成测试：验证分段缓冲的按需增长、extent 回收与零拷贝预留。
//!
//! # 测试总览（Why）
//! - 分段缓冲是唯一会触碰分配器的实现，回归通常表现为内存随循环次数线性增长；
//! - 用例以 `allocated_extents()` 观察分配次数，确认稳态下的读写循环不再分配。
//!
//! # 运行方式（How）
//! - 使用很小的 extent（4 或 8 个元素），让少量数据就能跨越多个 extent。

use spark_iobuf::{
    BufferError, ClearableBuffer, ReadableBuffer, SegmentedBuffer, WritableBuffer,
    constants::DEFAULT_EXTENT_LEN,
};

type Tiny = SegmentedBuffer<u8, 4, 8>;

fn drain(buf: &mut impl ReadableBuffer<Item = u8>) -> Vec<u8> {
    let mut out = vec![0u8; buf.readable_len()];
    let n = buf.read(&mut out);
    out.truncate(n);
    out
}

/// 单次写入远超一个 extent 时整段接受，并按顺序串起多个 extent。
#[test]
fn write_grows_across_extents() {
    let mut buf = Tiny::new().expect("分配首个 extent");
    let payload: Vec<u8> = (0..=25).collect();
    assert_eq!(buf.write(&payload).expect("写入"), payload.len());
    assert_eq!(buf.readable_len(), payload.len());
    assert!(buf.extent_count() >= 7, "26 字节至少需要 7 个 4 字节 extent");

    {
        let ranges = buf.readable_ranges();
        assert_eq!(ranges[0], &payload[..4]);
        assert!(ranges.iter().all(|range| range.len() <= 4));
    }
    assert_eq!(drain(&mut buf), payload);
}

/// 稳态的“写入-读出”循环复用读空的 extent，分配次数保持有界。
#[test]
fn steady_state_cycles_reuse_extents() {
    let mut buf = Tiny::new().expect("分配首个 extent");
    for round in 0..64u8 {
        let chunk = [round; 10];
        assert_eq!(buf.write(&chunk).expect("写入"), 10);
        assert_eq!(drain(&mut buf), chunk);
    }
    assert!(
        buf.allocated_extents() <= 5,
        "回收后不应持续分配，实际分配 {} 次",
        buf.allocated_extents()
    );
    assert!(buf.is_empty());
}

/// 读取只消费部分数据时，剩余数据在后续写入期间保持原位且顺序不变。
#[test]
fn partial_reads_interleave_with_writes() {
    let mut buf = Tiny::new().expect("分配首个 extent");
    buf.write(b"hello, ").expect("写入");
    let mut head = [0u8; 5];
    assert_eq!(buf.read(&mut head), 5);
    assert_eq!(&head, b"hello");

    buf.write(b"segmented world").expect("写入");
    assert_eq!(buf.discard(2), 2);
    assert_eq!(drain(&mut buf), b"segmented world");
}

/// `try_reserve` 后通过可写跨度外部填充，`commit` 不分配也能跨越多个 extent。
#[test]
fn reserve_then_commit_spans_multiple_extents() {
    let mut buf = Tiny::new().expect("分配首个 extent");
    buf.try_reserve(11).expect("预留");
    assert!(buf.writable_len() >= 11);
    let allocated = buf.allocated_extents();

    let mut next = b'a';
    for range in buf.writable_ranges() {
        for slot in range.iter_mut() {
            *slot = next;
            next += 1;
        }
    }
    assert_eq!(buf.commit(11), 11);
    assert_eq!(buf.allocated_extents(), allocated, "提交从不分配");
    assert_eq!(drain(&mut buf), b"abcdefghijk");
}

/// 提交量超过已持有的空闲空间时饱和，从不为提交分配。
#[test]
fn commit_saturates_at_held_space() {
    let mut buf = Tiny::new().expect("分配首个 extent");
    let held = buf.writable_len();
    assert_eq!(held, 4);
    assert_eq!(buf.commit(100), held);
    assert_eq!(buf.readable_len(), held);
}

/// 写入恰好填满 tail 后，下一次查询依旧能拿到空闲跨度。
#[test]
fn exact_fill_still_exposes_writable_space() {
    let mut buf = Tiny::new().expect("分配首个 extent");
    assert_eq!(buf.write(b"abcd").expect("写入"), 4);
    let ranges = buf.writable_ranges();
    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0].len(), 4);
}

/// 可读跨度数量受 `MAX_RANGES` 约束，分批丢弃后可继续读取剩余跨度。
#[test]
fn ranges_are_returned_in_batches() {
    let mut buf = SegmentedBuffer::<u8, 2, 2>::new().expect("分配首个 extent");
    buf.write(b"abcdefgh").expect("写入");

    let mut seen = Vec::new();
    while !buf.is_empty() {
        let batch: usize = {
            let ranges = buf.readable_ranges();
            assert!(ranges.len() <= 2);
            for range in &ranges {
                seen.extend_from_slice(range);
            }
            ranges.iter().map(|range| range.len()).sum()
        };
        assert_eq!(buf.discard(batch), batch);
    }
    assert_eq!(seen, b"abcdefgh");
}

/// `clear` 保留全部 extent，只重置游标；`shrink_to_fit` 再把空闲块归还分配器。
#[test]
fn clear_keeps_storage_and_shrink_releases_it() {
    let mut buf = Tiny::new().expect("分配首个 extent");
    buf.write(&[1u8; 20]).expect("写入");
    let extents = buf.extent_count();

    buf.clear();
    assert!(buf.is_empty());
    assert_eq!(buf.extent_count(), extents);
    assert_eq!(buf.writable_len(), buf.capacity());

    buf.shrink_to_fit();
    assert_eq!(buf.extent_count(), 1);
    assert_eq!(buf.write(b"again").expect("写入"), 5);
    assert_eq!(drain(&mut buf), b"again");
}

/// 默认参数使用 4 KiB extent，容量以 extent 为粒度增长。
#[test]
fn default_parameters_use_page_sized_extents() {
    let mut buf: SegmentedBuffer<u8> = SegmentedBuffer::new().expect("分配首个 extent");
    assert_eq!(buf.capacity(), DEFAULT_EXTENT_LEN);
    buf.write(&vec![0u8; DEFAULT_EXTENT_LEN + 1]).expect("写入");
    assert_eq!(buf.capacity(), 2 * DEFAULT_EXTENT_LEN);
}

/// 跨度上限为 0 的实例化同样在构造时被拒绝，避免区间查询恒为空。
#[test]
fn zero_range_limit_reports_stable_code() {
    let err = SegmentedBuffer::<u8, 4, 0>::new().expect_err("跨度上限为 0 应失败");
    assert_eq!(err, BufferError::ZeroRangeLimit);
    assert_eq!(err.code(), "buffer.zero_range_limit");
    assert_eq!(err.written(), 0);
}

/// 首个 extent 无法分配时构造返回可恢复的分配失败，而不是中止进程。
#[test]
fn oversized_extent_fails_allocation_at_construction() {
    let err = SegmentedBuffer::<u8, { isize::MAX as usize }>::new()
        .expect_err("isize::MAX 字节的 extent 不可能分配成功");
    assert!(matches!(err, BufferError::AllocationFailed { .. }));
    assert_eq!(err.code(), "buffer.alloc_failed");
    assert_eq!(err.written(), 0);
}

/// 预留失败返回分配错误，缓冲保持原状并可继续读写。
#[test]
fn failed_reserve_leaves_buffer_usable() {
    let mut buf = Tiny::new().expect("分配首个 extent");
    buf.write(b"keep").expect("写入");
    let extents = buf.extent_count();

    let err = buf.try_reserve(usize::MAX).expect_err("无法预留 usize::MAX 个元素");
    assert!(matches!(err, BufferError::AllocationFailed { .. }));
    assert_eq!(err.code(), "buffer.alloc_failed");
    assert_eq!(err.written(), 0);
    assert_eq!(buf.extent_count(), extents, "失败的预留不应改变 extent 链");

    assert_eq!(buf.write(b"-more").expect("写入"), 5);
    assert_eq!(drain(&mut buf), b"keep-more");
}

/// extent 长度为 0 的实例化在构造时被拒绝，错误码稳定。
#[test]
fn zero_extent_reports_stable_code() {
    let err = SegmentedBuffer::<u32, 0>::new().expect_err("extent 长度为 0 应失败");
    assert_eq!(err, BufferError::ZeroSizedExtent);
    assert_eq!(err.code(), "buffer.zero_extent");
    assert_eq!(err.written(), 0);
}
