//! 三种缓冲实现的模型化性质测试。
//!
//! # 教案级注释概览
//!
//! - **核心目标 (Why)**：以 `VecDeque<u8>` 作为影子模型，对任意操作序列验证缓冲始终满足
//!   “先进先出、计数饱和、可读跨度拼接后等于模型内容”三条性质。
//! - **设计手法 (How)**：Proptest 生成 `Op` 序列，每个操作同时施加到缓冲与模型，
//!   随后比对二者的可读内容；各变体的容量规则由 `Capacity` 描述。
//!
//! # 合同与边界 (What)
//!
//! - 固定缓冲：读取不释放写空间，只有 `clear` 恢复容量；
//! - 环形缓冲：`writable_len + readable_len` 恒等于容量；
//! - 分段缓冲：`write` 总是整段接受，`commit` 不超过可写跨度实际暴露的空间。

use std::collections::VecDeque;

use proptest::prelude::*;
use spark_iobuf::{
    CircularBuffer, ClearableBuffer, FixedBuffer, ReadableBuffer, SegmentedBuffer, WritableBuffer,
};

#[derive(Clone, Debug)]
enum Op {
    Write(Vec<u8>),
    Read(usize),
    Discard(usize),
    /// 通过可写跨度填充 `seed` 起始的递增序列，再提交 `n` 个元素。
    Commit { n: usize, seed: u8 },
    Clear,
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        4 => prop::collection::vec(any::<u8>(), 0..24).prop_map(Op::Write),
        3 => (0usize..24).prop_map(Op::Read),
        2 => (0usize..24).prop_map(Op::Discard),
        2 => (0usize..24, any::<u8>()).prop_map(|(n, seed)| Op::Commit { n, seed }),
        1 => Just(Op::Clear),
    ];
    prop::collection::vec(op, 1..64)
}

/// 各变体在写入侧的容量规则。
#[derive(Clone, Copy, Debug)]
enum Capacity {
    Fixed(usize),
    Circular(usize),
    Growable,
}

fn readable_contents<B: ReadableBuffer<Item = u8>>(buf: &B) -> Vec<u8> {
    let mut out = Vec::new();
    buf.visit_readable(&mut |range: &[u8]| {
        out.extend_from_slice(range);
        true
    });
    out
}

fn run_model<B>(buf: &mut B, capacity: Capacity, ops: &[Op]) -> Result<(), TestCaseError>
where
    B: ReadableBuffer<Item = u8> + WritableBuffer<Item = u8> + ClearableBuffer,
{
    let mut model = VecDeque::new();
    for op in ops {
        let writable_before = buf.writable_len();
        match op {
            Op::Write(src) => {
                let accepted = buf.write(src).map_err(|err| TestCaseError::fail(err.to_string()))?;
                if let Capacity::Growable = capacity {
                    prop_assert_eq!(accepted, src.len());
                } else {
                    prop_assert_eq!(accepted, src.len().min(writable_before));
                }
                model.extend(&src[..accepted]);
            }
            Op::Read(len) => {
                let mut dst = vec![0u8; *len];
                let n = buf.read(&mut dst);
                prop_assert_eq!(n, (*len).min(model.len()));
                let expected: Vec<u8> = model.drain(..n).collect();
                prop_assert_eq!(&dst[..n], &expected[..]);
            }
            Op::Discard(len) => {
                let n = buf.discard(*len);
                prop_assert_eq!(n, (*len).min(model.len()));
                model.drain(..n);
            }
            Op::Commit { n, seed } => {
                let mut filled = Vec::new();
                for range in buf.writable_ranges() {
                    for slot in range.iter_mut() {
                        *slot = seed.wrapping_add(filled.len() as u8);
                        filled.push(*slot);
                    }
                }
                if !matches!(capacity, Capacity::Growable) {
                    prop_assert_eq!(filled.len(), writable_before);
                }
                let committed = buf.commit(*n);
                prop_assert_eq!(committed, (*n).min(filled.len()));
                model.extend(&filled[..committed]);
            }
            Op::Clear => {
                buf.clear();
                model.clear();
            }
        }

        prop_assert_eq!(buf.readable_len(), model.len());
        prop_assert_eq!(buf.is_empty(), model.is_empty());
        prop_assert_eq!(readable_contents(buf), model.iter().copied().collect::<Vec<u8>>());

        let front: Vec<u8> = buf.readable_front().to_vec();
        prop_assert!(model.iter().take(front.len()).eq(front.iter()));

        match capacity {
            Capacity::Fixed(n) => {
                prop_assert!(buf.readable_len() + buf.writable_len() <= n);
            }
            Capacity::Circular(n) => {
                prop_assert_eq!(buf.readable_len() + buf.writable_len(), n);
            }
            Capacity::Growable => {}
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_fixed_buffer_matches_model(ops in ops()) {
        let mut buf = FixedBuffer::<u8, 32>::new();
        run_model(&mut buf, Capacity::Fixed(32), &ops)?;
    }

    #[test]
    fn prop_circular_buffer_matches_model(ops in ops()) {
        let mut buf = CircularBuffer::<u8, 17>::new();
        run_model(&mut buf, Capacity::Circular(17), &ops)?;
    }

    #[test]
    fn prop_segmented_buffer_matches_model(ops in ops()) {
        let mut buf = SegmentedBuffer::<u8, 5, 3>::new()
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        run_model(&mut buf, Capacity::Growable, &ops)?;
        prop_assert!(buf.allocated_extents() >= buf.extent_count());
    }
}
