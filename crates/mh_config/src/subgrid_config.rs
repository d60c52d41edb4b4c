// crates/mh_config/src/subgrid_config.rs

//! SubgridConfig - 子网格干湿配置（全 f64）
//!
//! 所有数值以 f64 存储以便 JSON 序列化，构建查找表时再按 `precision`
//! 转换到运行精度。

use mh_core::Precision;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::ConfigError;

/// 干边判定阈值默认值
pub const DEFAULT_DRY_EDGE_TOLERANCE: f64 = 1e-10;

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// 正向时间积分
    #[default]
    Forward,
    /// 初始场生成
    Init,
    /// 只读分析
    Analysis,
}

impl RunMode {
    /// 模式名称
    pub fn name(&self) -> &'static str {
        match self {
            RunMode::Forward => "forward",
            RunMode::Init => "init",
            RunMode::Analysis => "analysis",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 边厚度通量格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeFluxScheme {
    /// 中心格式：两侧水位平均后查表
    #[default]
    Centered,
    /// 迎风格式：按法向速度符号取上游单元水位
    Upwind,
}

impl fmt::Display for EdgeFluxScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeFluxScheme::Centered => f.write_str("centered"),
            EdgeFluxScheme::Upwind => f.write_str("upwind"),
        }
    }
}

/// 子网格干湿配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubgridConfig {
    /// 计算精度
    #[serde(default)]
    pub precision: Precision,

    /// 是否启用子网格干湿
    #[serde(default)]
    pub use_subgrid_wetting_drying: bool,

    /// 运行模式
    #[serde(default)]
    pub run_mode: RunMode,

    /// 垂向层数
    #[serde(default = "default_n_vert_levels")]
    pub n_vert_levels: usize,

    /// 查找表采样点数 N（所有元素、所有表共用）
    #[serde(default = "default_n_subgrid_table_levels")]
    pub n_subgrid_table_levels: usize,

    /// 边厚度通量格式
    #[serde(default)]
    pub edge_flux_scheme: EdgeFluxScheme,

    /// 干边判定阈值 [m]
    #[serde(default = "default_dry_edge_tolerance")]
    pub dry_edge_tolerance: f64,

    /// 绑定时检查表的单调性与有限性（尺寸始终检查）
    #[serde(default = "default_validate_tables")]
    pub validate_tables: bool,

    /// 最小并行元素数（低于此值串行）
    #[serde(default = "default_min_parallel_size")]
    pub min_parallel_size: usize,
}

fn default_n_vert_levels() -> usize { 1 }
fn default_n_subgrid_table_levels() -> usize { 11 }
fn default_dry_edge_tolerance() -> f64 { DEFAULT_DRY_EDGE_TOLERANCE }
fn default_validate_tables() -> bool { true }
fn default_min_parallel_size() -> usize { 1000 }

impl Default for SubgridConfig {
    fn default() -> Self {
        Self {
            precision: Precision::default(),
            use_subgrid_wetting_drying: false,
            run_mode: RunMode::default(),
            n_vert_levels: default_n_vert_levels(),
            n_subgrid_table_levels: default_n_subgrid_table_levels(),
            edge_flux_scheme: EdgeFluxScheme::default(),
            dry_edge_tolerance: default_dry_edge_tolerance(),
            validate_tables: default_validate_tables(),
            min_parallel_size: default_min_parallel_size(),
        }
    }
}

impl SubgridConfig {
    /// 启用子网格干湿的配置
    pub fn enabled(n_subgrid_table_levels: usize) -> Self {
        Self {
            use_subgrid_wetting_drying: true,
            n_subgrid_table_levels,
            ..Default::default()
        }
    }

    /// 设置运行模式
    pub fn with_run_mode(mut self, run_mode: RunMode) -> Self {
        self.run_mode = run_mode;
        self
    }

    /// 设置垂向层数
    pub fn with_vert_levels(mut self, n_vert_levels: usize) -> Self {
        self.n_vert_levels = n_vert_levels;
        self
    }

    /// 设置边通量格式
    pub fn with_edge_flux_scheme(mut self, scheme: EdgeFluxScheme) -> Self {
        self.edge_flux_scheme = scheme;
        self
    }

    /// 当前配置是否受单层限制
    ///
    /// 子网格修正目前只支持单层正向积分。
    pub fn requires_single_layer(&self) -> bool {
        self.use_subgrid_wetting_drying && self.run_mode == RunMode::Forward
    }

    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: SubgridConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// 验证配置有效性
    ///
    /// 只检查字段自身的取值；单层约束属于初始化闸门，见 `mh_subgrid::init`。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_subgrid_table_levels < 2 {
            return Err(ConfigError::invalid(
                "n_subgrid_table_levels",
                self.n_subgrid_table_levels,
                "查找表至少需要 2 个采样点",
            ));
        }

        if self.n_vert_levels == 0 {
            return Err(ConfigError::invalid(
                "n_vert_levels",
                self.n_vert_levels,
                "垂向层数必须为正",
            ));
        }

        if !self.dry_edge_tolerance.is_finite() || self.dry_edge_tolerance < 0.0 {
            return Err(ConfigError::invalid(
                "dry_edge_tolerance",
                self.dry_edge_tolerance,
                "干边阈值必须为有限非负数",
            ));
        }

        Ok(())
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
