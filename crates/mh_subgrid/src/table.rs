// crates/mh_subgrid/src/table.rs

//! 子网格查找表存储
//!
//! 每类控制体（单元/边/顶点）一组并行数组：
//!
//! - 湿体积表 `wet_volume`、湿润比例表 `wet_fraction`，按元素行优先存放，
//!   每行 N 个值，对应 `[ssh_min, ssh_max]` 上等距的 N 个水位采样点
//! - 水位范围 `(ssh_min, ssh_max)`
//! - 底床统计量 `bathymetry_mean`，单元与顶点另有 `bathymetry_min`
//!
//! 表在时间推进前由外部一次性提供，绑定后只读。

use mh_core::Scalar;
use mh_foundation::validation::{
    check_finite_row, check_non_decreasing, check_ssh_range, warn_if_discontinuous,
    warn_if_outside,
};
use mh_foundation::{MhError, MhResult, ValidationReport};

use crate::lookup::{self, InverseBranch};

/// 控制体类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// 主网格单元
    Cell,
    /// 单元间的边
    Edge,
    /// 对偶网格顶点
    Vertex,
}

impl ElementKind {
    /// 类别名称
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Cell => "cell",
            ElementKind::Edge => "edge",
            ElementKind::Vertex => "vertex",
        }
    }

    fn wet_volume_label(&self) -> &'static str {
        match self {
            ElementKind::Cell => "cell.wet_volume",
            ElementKind::Edge => "edge.wet_volume",
            ElementKind::Vertex => "vertex.wet_volume",
        }
    }

    fn wet_fraction_label(&self) -> &'static str {
        match self {
            ElementKind::Cell => "cell.wet_fraction",
            ElementKind::Edge => "edge.wet_fraction",
            ElementKind::Vertex => "vertex.wet_fraction",
        }
    }

    fn range_label(&self) -> &'static str {
        match self {
            ElementKind::Cell => "cell.ssh_range",
            ElementKind::Edge => "edge.ssh_range",
            ElementKind::Vertex => "vertex.ssh_range",
        }
    }

    /// 该类别是否需要 `bathymetry_min`（反查干极限用）
    pub fn needs_bathymetry_min(&self) -> bool {
        !matches!(self, ElementKind::Edge)
    }
}

/// 查找表的水位范围
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SshRange<S: Scalar> {
    /// 下界：低于此值完全干
    pub min: S,
    /// 上界：高于此值完全湿
    pub max: S,
}

impl<S: Scalar> SshRange<S> {
    /// 创建水位范围
    #[inline]
    pub fn new(min: S, max: S) -> Self {
        Self { min, max }
    }

    /// N 个采样点的区间宽度 `(max - min) / (N - 1)`
    #[inline]
    pub fn bin_width(&self, n_levels: usize) -> S {
        (self.max - self.min) / S::from_index(n_levels - 1)
    }

    /// 第 `i` 个采样点的水位 `min + i * dz`
    #[inline]
    pub fn level(&self, i: usize, dz: S) -> S {
        self.min + S::from_index(i) * dz
    }
}

/// 外部提供的一类元素的原始数组
///
/// 表数组按元素行优先：`wet_volume[e * N + l]`。
#[derive(Debug, Clone, Default)]
pub struct ElementTableInput<S: Scalar> {
    /// 湿体积表（单位面积），长度 n_elements * N
    pub wet_volume: Vec<S>,
    /// 湿润比例表，长度 n_elements * N
    pub wet_fraction: Vec<S>,
    /// 水位范围下界
    pub ssh_min: Vec<S>,
    /// 水位范围上界
    pub ssh_max: Vec<S>,
    /// 平均底床深度
    pub bathymetry_mean: Vec<S>,
    /// 最小底床深度（边不需要）
    pub bathymetry_min: Option<Vec<S>>,
}

/// 单个元素的查找表视图
#[derive(Debug, Clone, Copy)]
pub struct ElementTable<'a, S: Scalar> {
    /// 湿体积表，长度 N
    pub wet_volume: &'a [S],
    /// 湿润比例表，长度 N
    pub wet_fraction: &'a [S],
    /// 水位范围
    pub range: SshRange<S>,
    /// 平均底床深度
    pub bathymetry_mean: S,
    /// 最小底床深度
    pub bathymetry_min: Option<S>,
}

impl<'a, S: Scalar> ElementTable<'a, S> {
    /// 水位 → 层厚
    #[inline]
    pub fn thickness(&self, zeta: S) -> S {
        lookup::forward_thickness(zeta, self.wet_volume, self.range, self.bathymetry_mean)
    }

    /// 水位 → 湿润比例
    #[inline]
    pub fn wet_fraction(&self, zeta: S) -> S {
        lookup::wet_fraction(zeta, self.wet_fraction, self.range)
    }

    /// 层厚 → 水位；无 `bathymetry_min` 的元素（边）返回 None
    #[inline]
    pub fn ssh(&self, thickness: S) -> Option<S> {
        self.ssh_classified(thickness).map(|(zeta, _)| zeta)
    }

    /// 层厚 → 水位，同时返回命中的分支
    #[inline]
    pub fn ssh_classified(&self, thickness: S) -> Option<(S, InverseBranch)> {
        let bathymetry_min = self.bathymetry_min?;
        Some(lookup::inverse_ssh_classified(
            thickness,
            self.wet_volume,
            self.range,
            self.bathymetry_mean,
            bathymetry_min,
        ))
    }
}

/// 一类元素的全部查找表
#[derive(Debug, Clone)]
pub struct ElementTables<S: Scalar> {
    kind: ElementKind,
    n_elements: usize,
    n_levels: usize,
    wet_volume: Vec<S>,
    wet_fraction: Vec<S>,
    ssh_min: Vec<S>,
    ssh_max: Vec<S>,
    bathymetry_mean: Vec<S>,
    bathymetry_min: Option<Vec<S>>,
}

impl<S: Scalar> ElementTables<S> {
    /// 绑定外部数组
    ///
    /// 元素数取自 `bathymetry_mean` 的长度。尺寸总是检查；
    /// `validate` 为真时还检查有限性、范围和单调性，任一元素不合格即整体失败。
    pub fn bind(
        kind: ElementKind,
        n_levels: usize,
        input: ElementTableInput<S>,
        validate: bool,
    ) -> MhResult<Self> {
        if n_levels < 2 {
            return Err(MhError::invalid_config(
                "n_subgrid_table_levels",
                n_levels.to_string(),
                "查找表至少需要 2 个采样点",
            ));
        }

        let n_elements = input.bathymetry_mean.len();
        MhError::check_size(kind.wet_volume_label(), n_elements * n_levels, input.wet_volume.len())?;
        MhError::check_size(kind.wet_fraction_label(), n_elements * n_levels, input.wet_fraction.len())?;
        MhError::check_size("ssh_min", n_elements, input.ssh_min.len())?;
        MhError::check_size("ssh_max", n_elements, input.ssh_max.len())?;

        let bathymetry_min = match (kind.needs_bathymetry_min(), input.bathymetry_min) {
            (true, None) => {
                return Err(MhError::invalid_input(format!(
                    "{} 查找表缺少 bathymetry_min",
                    kind.name()
                )));
            }
            (true, Some(values)) => {
                MhError::check_size("bathymetry_min", n_elements, values.len())?;
                Some(values)
            }
            (false, values) => values,
        };

        let tables = Self {
            kind,
            n_elements,
            n_levels,
            wet_volume: input.wet_volume,
            wet_fraction: input.wet_fraction,
            ssh_min: input.ssh_min,
            ssh_max: input.ssh_max,
            bathymetry_mean: input.bathymetry_mean,
            bathymetry_min,
        };

        if validate {
            let report = tables.validate();
            if report.has_errors() {
                tracing::error!(
                    "{} 查找表验证失败: {} 个错误",
                    kind.name(),
                    report.error_count()
                );
                return Err(MhError::malformed_table(&report));
            }
            if report.has_warnings() {
                tracing::warn!(
                    "{} 查找表存在 {} 个警告（首个: {}）",
                    kind.name(),
                    report.warning_count(),
                    report.warnings[0]
                );
            }
        }

        Ok(tables)
    }

    /// 检查全部元素的表
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        let continuity_tol = S::epsilon().to_f64().sqrt();

        for e in 0..self.n_elements {
            let min = self.ssh_min[e].to_f64();
            let max = self.ssh_max[e].to_f64();
            check_ssh_range(&mut report, self.kind.range_label(), e, min, max);

            let volume = self.wet_volume_row(e);
            let fraction = self.wet_fraction_row(e);
            let volume_finite = check_finite_row(&mut report, self.kind.wet_volume_label(), e, volume);
            let fraction_finite =
                check_finite_row(&mut report, self.kind.wet_fraction_label(), e, fraction);

            if volume_finite {
                check_non_decreasing(&mut report, self.kind.wet_volume_label(), e, volume);

                let last = volume[self.n_levels - 1].to_f64();
                let extrapolated = max + self.bathymetry_mean[e].to_f64();
                let scale = extrapolated.abs().max(1.0);
                warn_if_discontinuous(
                    &mut report,
                    self.kind.wet_volume_label(),
                    e,
                    last,
                    extrapolated,
                    continuity_tol * scale,
                );
            }

            if fraction_finite {
                check_non_decreasing(&mut report, self.kind.wet_fraction_label(), e, fraction);
                for &value in fraction {
                    if warn_if_outside(
                        &mut report,
                        self.kind.wet_fraction_label(),
                        e,
                        value.to_f64(),
                        0.0,
                        1.0,
                    ) {
                        break;
                    }
                }
            }
        }

        report
    }

    /// 控制体类别
    #[inline]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// 元素数量
    #[inline]
    pub fn n_elements(&self) -> usize {
        self.n_elements
    }

    /// 每张表的采样点数 N
    #[inline]
    pub fn n_levels(&self) -> usize {
        self.n_levels
    }

    /// 第 `e` 个元素的湿体积表
    #[inline]
    pub fn wet_volume_row(&self, e: usize) -> &[S] {
        &self.wet_volume[e * self.n_levels..(e + 1) * self.n_levels]
    }

    /// 第 `e` 个元素的湿润比例表
    #[inline]
    pub fn wet_fraction_row(&self, e: usize) -> &[S] {
        &self.wet_fraction[e * self.n_levels..(e + 1) * self.n_levels]
    }

    /// 第 `e` 个元素的水位范围
    #[inline]
    pub fn range(&self, e: usize) -> SshRange<S> {
        SshRange::new(self.ssh_min[e], self.ssh_max[e])
    }

    /// 第 `e` 个元素的平均底床深度
    #[inline]
    pub fn bathymetry_mean(&self, e: usize) -> S {
        self.bathymetry_mean[e]
    }

    /// 第 `e` 个元素的最小底床深度
    #[inline]
    pub fn bathymetry_min(&self, e: usize) -> Option<S> {
        self.bathymetry_min.as_ref().map(|values| values[e])
    }

    /// 第 `e` 个元素的表视图
    #[inline]
    pub fn element(&self, e: usize) -> ElementTable<'_, S> {
        ElementTable {
            wet_volume: self.wet_volume_row(e),
            wet_fraction: self.wet_fraction_row(e),
            range: self.range(e),
            bathymetry_mean: self.bathymetry_mean[e],
            bathymetry_min: self.bathymetry_min(e),
        }
    }
}

/// 整个网格的子网格查找表集合
///
/// 由初始化闸门构建后以共享引用注入各消费者，不存在模块级全局状态。
#[derive(Debug, Clone)]
pub struct SubgridTables<S: Scalar> {
    /// 单元表
    pub cells: ElementTables<S>,
    /// 边表
    pub edges: ElementTables<S>,
    /// 顶点表
    pub vertices: ElementTables<S>,
}

impl<S: Scalar> SubgridTables<S> {
    /// 按类别取表
    pub fn get(&self, kind: ElementKind) -> &ElementTables<S> {
        match kind {
            ElementKind::Cell => &self.cells,
            ElementKind::Edge => &self.edges,
            ElementKind::Vertex => &self.vertices,
        }
    }

    /// 共享的采样点数 N
    pub fn n_levels(&self) -> usize {
        self.cells.n_levels()
    }

    /// 检查三类表，合并为一份报告
    pub fn validate(&self) -> ValidationReport {
        let mut report = self.cells.validate();
        report.merge(self.edges.validate());
        report.merge(self.vertices.validate());
        report
    }
}
