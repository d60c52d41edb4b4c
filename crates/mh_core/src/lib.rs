// crates/mh_core/src/lib.rs

//! MariHydro 核心抽象层
//!
//! 提供整个项目的基础抽象，包括：
//! - [`precision`]: 运行时精度选择（F32/F64）
//! - [`scalar`]: 统一标量trait
//! - [`indices`]: 单元强类型索引
//!
//! # 层级架构
//!
//! ```text
//! Layer 4: mh_cli       (无泛型，Precision 枚举分发)
//! Layer 3: mh_subgrid   (全泛型 <S: Scalar>)
//! Layer 2: mh_config    (全 f64 配置)
//! Layer 1: mh_core      (本层)
//! Layer 0: mh_foundation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod indices;
pub mod precision;
pub mod scalar;

// 统一导出
pub use indices::{CellIndex, INVALID_INDEX};
pub use precision::Precision;
pub use scalar::Scalar;

/// 编译期断言宏
#[macro_export]
macro_rules! assert_scalar {
    ($t:ty) => {
        const _: () = {
            fn _assert_scalar<T: $crate::Scalar>() {}
            fn _check() {
                _assert_scalar::<$t>();
            }
        };
    };
}

assert_scalar!(f32);
assert_scalar!(f64);
