// crates/mh_core/src/indices.rs

//! 统一索引类型定义
//!
//! 网格连接中保存的单元号使用强类型索引，边界顶点上缺失的邻接单元
//! 以 `CellIndex::INVALID` 标记，取值前必须经 `to_option` 判断。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 无效索引标记（边界顶点上缺失的邻接单元）
pub const INVALID_INDEX: usize = usize::MAX;

macro_rules! define_index {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(pub usize);

        impl $name {
            /// 无效索引常量
            pub const INVALID: Self = Self(INVALID_INDEX);

            /// 创建新索引
            #[inline]
            pub const fn new(idx: usize) -> Self {
                Self(idx)
            }

            /// 获取索引值
            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }

            /// 检查是否有效
            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != INVALID_INDEX
            }

            /// 转换为Option
            #[inline]
            pub fn to_option(self) -> Option<usize> {
                if self.is_valid() {
                    Some(self.0)
                } else {
                    None
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", stringify!($name), self.0)
                } else {
                    write!(f, "{}(INVALID)", stringify!($name))
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}", self.0)
                } else {
                    write!(f, "INVALID")
                }
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(idx: usize) -> Self {
                Self(idx)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(idx: $name) -> usize {
                idx.0
            }
        }
    };
}

define_index! {
    /// 单元索引（主网格多边形）
    CellIndex
}

/// 创建单元索引
#[inline]
pub const fn cell(idx: usize) -> CellIndex {
    CellIndex::new(idx)
}
