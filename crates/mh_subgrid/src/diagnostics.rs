// crates/mh_subgrid/src/diagnostics.rs

//! 批量查找与初始化期水位反查
//!
//! - 单元层厚：单元水位 → 单元表正向查找
//! - 湿润比例：单元取自身水位，边取两侧平均，顶点取面积加权水位
//! - 水位反查：由初始层厚反推单元水位，统计落在干极限分支的单元

use mh_core::Scalar;
use mh_foundation::{MhError, MhResult};

use crate::lookup::InverseBranch;
use crate::mesh::SubgridMesh;
use crate::parallel::ParallelConfig;
use crate::table::{ElementKind, SubgridTables};

/// 水位反查统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InverseReport {
    /// 按完全湿外推的单元数
    pub extrapolated: usize,
    /// 表内插值的单元数
    pub interpolated: usize,
    /// 落在干极限 `-bathymetry_min` 的单元
    pub dry_limit_cells: Vec<usize>,
}

impl InverseReport {
    /// 是否有单元落在干极限
    pub fn has_dry_limit(&self) -> bool {
        !self.dry_limit_cells.is_empty()
    }

    /// 参与统计的单元总数
    pub fn total(&self) -> usize {
        self.extrapolated + self.interpolated + self.dry_limit_cells.len()
    }

    fn record(&mut self, cell: usize, branch: InverseBranch) {
        match branch {
            InverseBranch::Extrapolated => self.extrapolated += 1,
            InverseBranch::Interpolated => self.interpolated += 1,
            InverseBranch::DryLimit => self.dry_limit_cells.push(cell),
        }
    }
}

/// 批量查找
#[derive(Debug, Clone, Copy)]
pub struct SubgridDiagnostics<'a, S: Scalar> {
    tables: &'a SubgridTables<S>,
    mesh: &'a SubgridMesh<S>,
    n_vert_levels: usize,
    parallel: ParallelConfig,
}

impl<'a, S: Scalar> SubgridDiagnostics<'a, S> {
    /// 创建批量查找器，三类表的元素数必须与网格一致
    pub fn new(
        tables: &'a SubgridTables<S>,
        mesh: &'a SubgridMesh<S>,
        n_vert_levels: usize,
    ) -> MhResult<Self> {
        MhError::check_size("cell tables", mesh.n_cells(), tables.cells.n_elements())?;
        MhError::check_size("edge tables", mesh.n_edges(), tables.edges.n_elements())?;
        MhError::check_size("vertex tables", mesh.n_vertices(), tables.vertices.n_elements())?;
        Ok(Self {
            tables,
            mesh,
            n_vert_levels,
            parallel: ParallelConfig::default(),
        })
    }

    /// 设置并行配置
    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// 单元层厚，`out` 长度 n_cells * n_vert_levels
    pub fn cell_thickness(&self, ssh: &[S], out: &mut [S]) -> MhResult<()> {
        MhError::check_size("ssh", self.mesh.n_cells(), ssh.len())?;
        MhError::check_size("layer_thickness", self.mesh.n_cells() * self.n_vert_levels, out.len())?;

        let cells = &self.tables.cells;
        self.parallel.for_each_row(out, self.n_vert_levels, |c, row| {
            row.fill(cells.element(c).thickness(ssh[c]));
        });
        Ok(())
    }

    /// 某类元素的湿润比例，`out` 长度为该类元素数
    pub fn wet_fraction(&self, kind: ElementKind, ssh: &[S], out: &mut [S]) -> MhResult<()> {
        let tables = self.tables.get(kind);
        MhError::check_size("ssh", self.mesh.n_cells(), ssh.len())?;
        MhError::check_size("wet_fraction", tables.n_elements(), out.len())?;

        let mesh = self.mesh;
        self.parallel.for_each_row(out, 1, |e, row| {
            let zeta = match kind {
                ElementKind::Cell => ssh[e],
                ElementKind::Edge => mesh.edge_mean(e, ssh),
                ElementKind::Vertex => mesh.vertex_weighted(e, ssh),
            };
            row[0] = tables.element(e).wet_fraction(zeta);
        });
        Ok(())
    }

    /// 由单元层厚反查水位
    ///
    /// 反查使用整柱层厚（各层之和）。落在干极限分支的单元水位为
    /// `-bathymetry_min`，可能使下游水深为负；此处只统计并告警，不修正。
    pub fn ssh_from_thickness(&self, layer_thickness: &[S], ssh: &mut [S]) -> MhResult<InverseReport> {
        let n_levels = self.n_vert_levels;
        MhError::check_size("layer_thickness", self.mesh.n_cells() * n_levels, layer_thickness.len())?;
        MhError::check_size("ssh", self.mesh.n_cells(), ssh.len())?;

        let cells = &self.tables.cells;
        let mut report = InverseReport::default();
        for (c, (zeta, column)) in ssh
            .iter_mut()
            .zip(layer_thickness.chunks(n_levels.max(1)))
            .enumerate()
        {
            let total: S = column.iter().copied().sum();
            let (value, branch) = cells
                .element(c)
                .ssh_classified(total)
                .ok_or_else(|| MhError::internal("单元查找表缺少 bathymetry_min"))?;
            *zeta = value;
            report.record(c, branch);
        }

        if report.has_dry_limit() {
            tracing::warn!(
                "{} 个单元的水位反查落在干极限分支（首个: 单元 {}）",
                report.dry_limit_cells.len(),
                report.dry_limit_cells[0]
            );
        }
        Ok(report)
    }
}
