// crates/mh_foundation/src/validation.rs

//! 运行时验证工具
//!
//! 提供验证报告和错误/警告类型，用于绑定子网格查找表时的数据检查。
//! 报告会收集全部问题后一次性返回，而不是在第一个错误处中止。
//!
//! # 示例
//!
//! ```
//! use mh_foundation::validation::{check_non_decreasing, ValidationReport};
//!
//! let mut report = ValidationReport::new();
//! check_non_decreasing(&mut report, "cell.wet_volume", 0, &[0.0, 2.0, 1.0]);
//!
//! assert!(report.has_errors());
//! ```

use std::fmt;

/// 验证报告
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// 错误列表
    pub errors: Vec<ValidationError>,
    /// 警告列表
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// 创建空的验证报告
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加错误
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// 是否有错误
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// 是否有警告
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// 错误数量
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// 警告数量
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// 是否通过（无错误）
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// 合并另一个报告
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "验证报告:")?;
        writeln!(f, "  错误: {} 个", self.error_count())?;
        writeln!(f, "  警告: {} 个", self.warning_count())?;

        if self.has_errors() {
            writeln!(f, "\n错误详情:")?;
            for (i, err) in self.errors.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, err)?;
            }
        }

        if self.has_warnings() {
            writeln!(f, "\n警告详情:")?;
            for (i, warn) in self.warnings.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, warn)?;
            }
        }

        Ok(())
    }
}

/// 验证错误类型
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// 非有限值
    NonFinite {
        /// 表名称，如 `cell.wet_volume`
        table: &'static str,
        /// 元素 ID
        element: usize,
        /// 表内层号
        level: usize,
        /// 非有限的数值
        value: f64,
    },
    /// 表值沿层号递减
    NonMonotonic {
        /// 表名称
        table: &'static str,
        /// 元素 ID
        element: usize,
        /// 递减发生处的层号（与 level-1 比较）
        level: usize,
        /// 前一层值
        previous: f64,
        /// 当前层值
        current: f64,
    },
    /// 水位范围退化（max <= min 或非有限）
    InvalidRange {
        /// 表名称
        table: &'static str,
        /// 元素 ID
        element: usize,
        /// 下界
        min: f64,
        /// 上界
        max: f64,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite {
                table,
                element,
                level,
                value,
            } => {
                write!(f, "{}[{}][{}]={} (非有限值)", table, element, level, value)
            }
            Self::NonMonotonic {
                table,
                element,
                level,
                previous,
                current,
            } => {
                write!(
                    f,
                    "{}[{}]: 第{}层值 {} 小于前一层值 {}",
                    table, element, level, current, previous
                )
            }
            Self::InvalidRange {
                table,
                element,
                min,
                max,
            } => {
                write!(f, "{}[{}]: 水位范围 [{}, {}] 无效", table, element, min, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// 验证警告类型
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationWarning {
    /// 数值超出物理区间（如湿润比例不在 [0, 1]）
    OutsidePhysical {
        /// 表名称
        table: &'static str,
        /// 元素 ID
        element: usize,
        /// 实际值
        value: f64,
        /// 下界
        min: f64,
        /// 上界
        max: f64,
    },
    /// 外推边界不连续
    Discontinuity {
        /// 表名称
        table: &'static str,
        /// 元素 ID
        element: usize,
        /// 表内末值
        table_value: f64,
        /// 外推公式在边界处的值
        extrapolated: f64,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutsidePhysical {
                table,
                element,
                value,
                min,
                max,
            } => {
                write!(
                    f,
                    "{}[{}]: 值{} 超出物理区间[{}, {}]",
                    table, element, value, min, max
                )
            }
            Self::Discontinuity {
                table,
                element,
                table_value,
                extrapolated,
            } => {
                write!(
                    f,
                    "{}[{}]: 表末值{} 与外推值{} 不连续",
                    table, element, table_value, extrapolated
                )
            }
        }
    }
}

// ============================================================================
// 验证辅助函数
// ============================================================================

/// 检查一行表值全部有限
///
/// `T` 可为 f32 或 f64，报告中统一记为 f64。
pub fn check_finite_row<T: Copy + Into<f64>>(
    report: &mut ValidationReport,
    table: &'static str,
    element: usize,
    row: &[T],
) -> bool {
    let mut ok = true;
    for (level, &value) in row.iter().enumerate() {
        let value: f64 = value.into();
        if !value.is_finite() {
            report.add_error(ValidationError::NonFinite {
                table,
                element,
                level,
                value,
            });
            ok = false;
        }
    }
    ok
}

/// 检查一行表值单调不减
///
/// 只记录第一处递减，避免单个坏元素刷屏。
pub fn check_non_decreasing<T: Copy + Into<f64>>(
    report: &mut ValidationReport,
    table: &'static str,
    element: usize,
    row: &[T],
) -> bool {
    for level in 1..row.len() {
        let previous: f64 = row[level - 1].into();
        let current: f64 = row[level].into();
        if current < previous {
            report.add_error(ValidationError::NonMonotonic {
                table,
                element,
                level,
                previous,
                current,
            });
            return false;
        }
    }
    true
}

/// 检查水位范围 `max > min` 且均有限
pub fn check_ssh_range(
    report: &mut ValidationReport,
    table: &'static str,
    element: usize,
    min: f64,
    max: f64,
) -> bool {
    if !(min.is_finite() && max.is_finite()) || max <= min {
        report.add_error(ValidationError::InvalidRange {
            table,
            element,
            min,
            max,
        });
        false
    } else {
        true
    }
}

/// 数值超出物理区间时添加警告
pub fn warn_if_outside(
    report: &mut ValidationReport,
    table: &'static str,
    element: usize,
    value: f64,
    min: f64,
    max: f64,
) -> bool {
    if value < min || value > max {
        report.add_warning(ValidationWarning::OutsidePhysical {
            table,
            element,
            value,
            min,
            max,
        });
        true
    } else {
        false
    }
}

/// 两值相差超过容差时添加不连续警告
pub fn warn_if_discontinuous(
    report: &mut ValidationReport,
    table: &'static str,
    element: usize,
    table_value: f64,
    extrapolated: f64,
    tolerance: f64,
) -> bool {
    if (table_value - extrapolated).abs() > tolerance {
        report.add_warning(ValidationWarning::Discontinuity {
            table,
            element,
            table_value,
            extrapolated,
        });
        true
    } else {
        false
    }
}

// ============================================================================
// 测试
// ============================================================================
