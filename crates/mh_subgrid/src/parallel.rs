// crates/mh_subgrid/src/parallel.rs

//! 元素级并行分发
//!
//! 查找是纯函数，输出数组按元素分行（每行 `n_vert_levels` 个值），
//! 行与行之间互不依赖，可直接用 `par_chunks_mut` 切分。
//! 小规模问题串行执行以避免线程调度开销。

use rayon::prelude::*;

/// 并行策略
///
/// - `Sequential`: 完全串行
/// - `Parallel`: 总是使用 rayon
/// - `Auto`: 元素数达到 `min_parallel_size` 时并行
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParallelStrategy {
    /// 串行执行
    Sequential,
    /// 并行执行
    Parallel,
    /// 按问题规模自动选择
    #[default]
    Auto,
}

/// 并行分发配置
#[derive(Debug, Clone, Copy)]
pub struct ParallelConfig {
    /// 并行策略
    pub strategy: ParallelStrategy,
    /// 最小并行元素数（`Auto` 时低于此值串行）
    pub min_parallel_size: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            strategy: ParallelStrategy::Auto,
            min_parallel_size: 1000,
        }
    }
}

impl ParallelConfig {
    /// 按最小并行元素数创建 `Auto` 配置
    pub fn auto(min_parallel_size: usize) -> Self {
        Self {
            strategy: ParallelStrategy::Auto,
            min_parallel_size,
        }
    }

    /// 串行配置
    pub fn sequential() -> Self {
        Self {
            strategy: ParallelStrategy::Sequential,
            ..Default::default()
        }
    }

    /// 给定元素数时是否并行
    #[inline]
    pub fn is_parallel(&self, n_elements: usize) -> bool {
        match self.strategy {
            ParallelStrategy::Sequential => false,
            ParallelStrategy::Parallel => true,
            ParallelStrategy::Auto => n_elements >= self.min_parallel_size,
        }
    }

    /// 对每个元素行执行 `f(element, row)`
    pub fn for_each_row<T, F>(&self, out: &mut [T], row_len: usize, f: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync + Send,
    {
        if row_len == 0 {
            return;
        }
        let n_elements = out.len() / row_len;

        if self.is_parallel(n_elements) {
            tracing::debug!("并行分发 {} 个元素", n_elements);
            out.par_chunks_mut(row_len)
                .enumerate()
                .for_each(|(e, row)| f(e, row));
        } else {
            out.chunks_mut(row_len)
                .enumerate()
                .for_each(|(e, row)| f(e, row));
        }
    }

    /// 对两组等长输出的元素行同时执行 `f(element, row_a, row_b)`
    pub fn for_each_row_pair<T, F>(&self, out_a: &mut [T], out_b: &mut [T], row_len: usize, f: F)
    where
        T: Send,
        F: Fn(usize, &mut [T], &mut [T]) + Sync + Send,
    {
        if row_len == 0 {
            return;
        }
        let n_elements = out_a.len() / row_len;

        if self.is_parallel(n_elements) {
            tracing::debug!("并行分发 {} 个元素（双输出）", n_elements);
            out_a
                .par_chunks_mut(row_len)
                .zip(out_b.par_chunks_mut(row_len))
                .enumerate()
                .for_each(|(e, (a, b))| f(e, a, b));
        } else {
            out_a
                .chunks_mut(row_len)
                .zip(out_b.chunks_mut(row_len))
                .enumerate()
                .for_each(|(e, (a, b))| f(e, a, b));
        }
    }
}
