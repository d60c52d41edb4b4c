// crates/mh_foundation/src/lib.rs

//! MariHydro Foundation Layer
//!
//! 基础层，提供整个项目共用的错误与验证抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型
//! - [`validation`]: 运行时验证工具（查找表绑定检查）
//!
//! # 示例
//!
//! ```
//! use mh_foundation::{MhError, MhResult};
//!
//! fn check(n: usize) -> MhResult<()> {
//!     MhError::check_size("ssh", 4, n)
//! }
//!
//! assert!(check(4).is_ok());
//! assert!(check(3).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod validation;

// 重导出常用类型
pub use error::{MhError, MhResult};
pub use validation::{ValidationError, ValidationReport, ValidationWarning};
