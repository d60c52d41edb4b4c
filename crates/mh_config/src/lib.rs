// crates/mh_config/src/lib.rs

//! MariHydro Config Layer (Layer 2)
//!
//! 配置层，提供子网格干湿开关、运行模式和数值参数。
//! 本层完全无泛型，使用 `Precision` 枚举进行运行时精度分发。
//!
//! # 模块概览
//!
//! - [`subgrid_config`]: SubgridConfig 子网格配置（全 f64）
//! - [`error`]: 配置错误类型
//!
//! # 示例
//!
//! ```
//! use mh_config::{RunMode, SubgridConfig};
//!
//! let config = SubgridConfig::enabled(11).with_run_mode(RunMode::Forward);
//! assert!(config.validate().is_ok());
//! assert!(config.requires_single_layer());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod subgrid_config;

// 重导出核心类型
pub use error::ConfigError;
pub use mh_core::Precision;
pub use subgrid_config::{EdgeFluxScheme, RunMode, SubgridConfig, DEFAULT_DRY_EDGE_TOLERANCE};
