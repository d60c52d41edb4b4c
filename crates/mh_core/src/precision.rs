// crates/mh_core/src/precision.rs

//! 运行时精度选择
//!
//! 配置层只接触 `Precision` 枚举，由 CLI 根据它选择单态化的
//! `SubgridTables<f32>` 或 `SubgridTables<f64>`。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 运行时精度选择
///
/// 子网格查找在区间边界上做相等比较，结果与精度逐位相关，
/// 因此一次运行中精度必须保持不变。默认 F64。
///
/// # 示例
///
/// ```
/// use mh_core::Precision;
///
/// assert_eq!(Precision::default(), Precision::F64);
///
/// let precision: Precision = "f32".parse().unwrap();
/// assert_eq!(precision, Precision::F32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// 单精度浮点（32位）
    F32,
    /// 双精度浮点（64位）
    #[default]
    F64,
}

impl Precision {
    /// 获取精度名称
    pub fn name(&self) -> &'static str {
        match self {
            Precision::F32 => "f32",
            Precision::F64 => "f64",
        }
    }

    /// 获取字节大小
    pub fn size_bytes(&self) -> usize {
        match self {
            Precision::F32 => 4,
            Precision::F64 => 8,
        }
    }

    /// 获取机器epsilon
    pub fn epsilon(&self) -> f64 {
        match self {
            Precision::F32 => f32::EPSILON as f64,
            Precision::F64 => f64::EPSILON,
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Precision {
    type Err = PrecisionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "f32" | "float" | "single" => Ok(Precision::F32),
            "f64" | "double" => Ok(Precision::F64),
            _ => Err(PrecisionParseError(s.to_string())),
        }
    }
}

/// 精度解析错误
#[derive(Debug, Clone)]
pub struct PrecisionParseError(pub String);

impl fmt::Display for PrecisionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "无效的精度值: '{}', 期望 'f32' 或 'f64'", self.0)
    }
}

impl std::error::Error for PrecisionParseError {}
