//! 编译期配置的默认值。
//!
//! 缓冲子系统没有运行时配置面：容量、extent 长度、单次区间查询的跨度上限全部以 const 泛型表达，
//! 这里集中给出它们的默认取值。

/// 分段缓冲单个 extent 的默认元素数。
pub const DEFAULT_EXTENT_LEN: usize = 4096;

/// 分段缓冲单次 `readable_ranges`/`writable_ranges` 返回的默认跨度上限。
pub const DEFAULT_MAX_RANGES: usize = 16;

/// 区间容器在溢出到堆之前可内联保存的跨度数。
///
/// 固定缓冲与区间适配器最多返回 1 段，环形缓冲最多 2 段；分段缓冲在跨度数超过该值时才会分配。
pub const INLINE_RANGES: usize = 4;
