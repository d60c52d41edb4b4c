// crates/mh_subgrid/src/lib.rs

//! 子网格干湿查找表引擎
//!
//! 对部分淹没的控制体（单元、边、顶点），用离线由高分辨率地形预计算的
//! 分段线性查找表替代线性的水位-层厚关系。
//!
//! - [`table`]: 查找表存储与绑定期验证
//! - [`lookup`]: 正向层厚、湿润比例、水位反查三个纯函数
//! - [`edge`]: 边厚度通量重构（中心/迎风，干边回退）
//! - [`vorticity`]: 顶点涡度归一化
//! - [`diagnostics`]: 批量查找与初始化期水位反查
//! - [`init`]: 初始化闸门与运行上下文
//!
//! # 示例
//!
//! ```
//! use mh_subgrid::lookup::forward_thickness;
//! use mh_subgrid::SshRange;
//!
//! let table = [0.0, 2.0, 4.0];
//! let range = SshRange::new(-2.0, 2.0);
//!
//! assert_eq!(forward_thickness(1.0, &table, range, 2.0), 3.0);
//! assert_eq!(forward_thickness(3.0, &table, range, 2.0), 5.0);
//! assert_eq!(forward_thickness(-5.0, &table, range, 2.0), 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod diagnostics;
pub mod edge;
pub mod init;
pub mod lookup;
pub mod mesh;
pub mod parallel;
pub mod table;
pub mod vorticity;

// 重导出常用类型
pub use diagnostics::{InverseReport, SubgridDiagnostics};
pub use edge::{EdgeFluxReconstructor, EdgeFluxState, Upstream};
pub use init::{check_config, initialize, SubgridContext, SubgridTableInputs};
pub use lookup::{forward_thickness, inverse_ssh, wet_fraction, InverseBranch};
pub use mesh::SubgridMesh;
pub use parallel::{ParallelConfig, ParallelStrategy};
pub use table::{ElementKind, ElementTable, ElementTableInput, ElementTables, SshRange, SubgridTables};
pub use vorticity::{VorticityNormalizer, VorticityOutput, VorticityState};
