// crates/mh_core/src/scalar.rs

//! 统一标量类型抽象
//!
//! 查找表、网格权重和宿主状态数组共用同一个标量类型 `S`。
//! 一次运行只单态化一种精度：区间边界上的相等比较（`zeta == zeta0`）
//! 会让 f32/f64 的差异直接体现在结果上，因此精度不可混用。
//!
//! # 使用示例
//!
//! ```
//! use mh_core::Scalar;
//!
//! fn mean<S: Scalar>(a: S, b: S) -> S {
//!     (a + b) * S::HALF
//! }
//!
//! assert_eq!(mean(1.0f32, 2.0f32), 1.5);
//! assert_eq!(mean(1.0f64, 2.0f64), 1.5);
//! ```

use std::fmt::{Debug, Display};
use std::iter::Sum;

use num_traits::{Float, FromPrimitive, NumAssign};

// 密封trait，禁止外部实现
mod private {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// 统一标量类型约束
///
/// - **必须**: 作为泛型约束使用，如 `<S: Scalar>`
/// - **禁止**: 作为trait对象使用
pub trait Scalar:
    private::Sealed
    + Float
    + FromPrimitive
    + NumAssign
    + Debug
    + Display
    + Send
    + Sync
    + Sum
    + Default
    + Into<f64>
    + 'static
{
    /// 零值
    const ZERO: Self;

    /// 单位值
    const ONE: Self;

    /// 一半
    const HALF: Self;

    /// 从配置层 f64 转换（f32 目标会丢失精度）
    fn from_f64_lossless(v: f64) -> Self;

    /// 转换回 f64（用于日志、验证报告）
    fn to_f64(self) -> f64;

    /// 从计数/层号转换
    #[inline]
    fn from_index(i: usize) -> Self {
        Self::from_usize(i).unwrap_or_else(Self::nan)
    }

    /// 线性插值 `a + t * (b - a)`
    #[inline]
    fn lerp(a: Self, b: Self, t: Self) -> Self {
        a + t * (b - a)
    }
}

impl Scalar for f32 {
    const ZERO: f32 = 0.0;
    const ONE: f32 = 1.0;
    const HALF: f32 = 0.5;

    #[inline]
    fn from_f64_lossless(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Scalar for f64 {
    const ZERO: f64 = 0.0;
    const ONE: f64 = 1.0;
    const HALF: f64 = 0.5;

    #[inline]
    fn from_f64_lossless(v: f64) -> Self {
        v
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}
