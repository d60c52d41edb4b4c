// crates/mh_subgrid/src/edge.rs

//! 边厚度通量重构
//!
//! 通量计算需要边上的层厚。两种格式均在边表上做正向查找：
//!
//! - **中心格式**: 两侧单元水位平均
//! - **迎风格式**: 按法向速度符号取上游单元水位，速度为零时取平均
//!
//! 查得层厚低于干边阈值时退回宿主提供的厚度：中心格式用边平均层厚场
//! `layer_thick_edge_mean`，迎风格式用两侧单元当前层厚的平均。
//!
//! 所有宿主数组按 `element * n_vert_levels + k` 存放，每条边只写
//! 前 `edge_levels(e)` 层，其余层保持原值。

use mh_config::{EdgeFluxScheme, DEFAULT_DRY_EDGE_TOLERANCE};
use mh_core::Scalar;
use mh_foundation::{MhError, MhResult};

use crate::mesh::SubgridMesh;
use crate::parallel::ParallelConfig;
use crate::table::{ElementTables, SubgridTables};

/// 上游方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    /// 法向速度为正，取 cell1
    Cell1,
    /// 法向速度为负，取 cell2
    Cell2,
    /// 法向速度为零，取两侧平均
    Both,
}

impl Upstream {
    /// 按法向速度符号判定上游
    #[inline]
    pub fn from_velocity<S: Scalar>(normal_velocity: S) -> Self {
        if normal_velocity > S::ZERO {
            Upstream::Cell1
        } else if normal_velocity < S::ZERO {
            Upstream::Cell2
        } else {
            Upstream::Both
        }
    }

    /// 上游水位
    #[inline]
    pub fn ssh<S: Scalar>(self, ssh1: S, ssh2: S) -> S {
        match self {
            Upstream::Cell1 => ssh1,
            Upstream::Cell2 => ssh2,
            Upstream::Both => (ssh1 + ssh2) * S::HALF,
        }
    }
}

/// 边通量重构所需的宿主状态
#[derive(Debug, Clone, Copy)]
pub struct EdgeFluxState<'a, S: Scalar> {
    /// 单元水位，长度 n_cells
    pub ssh: &'a [S],
    /// 单元层厚，长度 n_cells * n_vert_levels（迎风回退）
    pub layer_thickness: &'a [S],
    /// 边法向速度，长度 n_edges * n_vert_levels（迎风方向）
    pub normal_velocity: &'a [S],
    /// 边平均层厚，长度 n_edges * n_vert_levels（中心回退）
    pub layer_thick_edge_mean: &'a [S],
}

/// 边厚度通量重构器
#[derive(Debug, Clone, Copy)]
pub struct EdgeFluxReconstructor<'a, S: Scalar> {
    edges: &'a ElementTables<S>,
    mesh: &'a SubgridMesh<S>,
    n_vert_levels: usize,
    dry_edge_tolerance: S,
    parallel: ParallelConfig,
}

impl<'a, S: Scalar> EdgeFluxReconstructor<'a, S> {
    /// 创建重构器
    ///
    /// 边表元素数必须等于网格边数。
    pub fn new(
        tables: &'a SubgridTables<S>,
        mesh: &'a SubgridMesh<S>,
        n_vert_levels: usize,
    ) -> MhResult<Self> {
        MhError::check_size("edge tables", mesh.n_edges(), tables.edges.n_elements())?;
        Ok(Self {
            edges: &tables.edges,
            mesh,
            n_vert_levels,
            dry_edge_tolerance: S::from_f64_lossless(DEFAULT_DRY_EDGE_TOLERANCE),
            parallel: ParallelConfig::default(),
        })
    }

    /// 设置干边阈值
    pub fn with_dry_edge_tolerance(mut self, tolerance: S) -> Self {
        self.dry_edge_tolerance = tolerance;
        self
    }

    /// 设置并行配置
    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// 干边阈值
    #[inline]
    pub fn dry_edge_tolerance(&self) -> S {
        self.dry_edge_tolerance
    }

    /// 单条边的中心格式层厚（未做干边回退）
    #[inline]
    pub fn centered_thickness(&self, edge: usize, ssh: &[S]) -> S {
        let zeta = self.mesh.edge_mean(edge, ssh);
        self.edges.element(edge).thickness(zeta)
    }

    /// 单条边在给定法向速度下的迎风层厚（未做干边回退）
    #[inline]
    pub fn upwind_thickness(&self, edge: usize, ssh: &[S], normal_velocity: S) -> S {
        let (c1, c2) = self.mesh.edge_cells(edge);
        let zeta = Upstream::from_velocity(normal_velocity).ssh(ssh[c1], ssh[c2]);
        self.edges.element(edge).thickness(zeta)
    }

    /// 中心格式
    ///
    /// # Arguments
    /// * `ssh` - 单元水位，长度 n_cells
    /// * `layer_thick_edge_mean` - 边平均层厚，干边回退值
    /// * `out` - 边层厚，长度 n_edges * n_vert_levels
    pub fn centered(&self, ssh: &[S], layer_thick_edge_mean: &[S], out: &mut [S]) -> MhResult<()> {
        let n_levels = self.n_vert_levels;
        let n_edge_values = self.mesh.n_edges() * n_levels;
        MhError::check_size("ssh", self.mesh.n_cells(), ssh.len())?;
        MhError::check_size("layer_thick_edge_mean", n_edge_values, layer_thick_edge_mean.len())?;
        MhError::check_size("layer_thick_edge", n_edge_values, out.len())?;

        let tol = self.dry_edge_tolerance;
        self.parallel.for_each_row(out, n_levels, |e, row| {
            let thickness = self.centered_thickness(e, ssh);
            let active = self.mesh.edge_levels(e, n_levels);
            let fallback = &layer_thick_edge_mean[e * n_levels..(e + 1) * n_levels];
            for k in 0..active {
                row[k] = if thickness < tol { fallback[k] } else { thickness };
            }
        });
        Ok(())
    }

    /// 迎风格式
    ///
    /// # Arguments
    /// * `ssh` - 单元水位，长度 n_cells
    /// * `layer_thickness` - 单元层厚，长度 n_cells * n_vert_levels
    /// * `normal_velocity` - 边法向速度，长度 n_edges * n_vert_levels
    /// * `out` - 边层厚，长度 n_edges * n_vert_levels
    pub fn upwind(
        &self,
        ssh: &[S],
        layer_thickness: &[S],
        normal_velocity: &[S],
        out: &mut [S],
    ) -> MhResult<()> {
        let n_levels = self.n_vert_levels;
        let n_edge_values = self.mesh.n_edges() * n_levels;
        MhError::check_size("ssh", self.mesh.n_cells(), ssh.len())?;
        MhError::check_size("layer_thickness", self.mesh.n_cells() * n_levels, layer_thickness.len())?;
        MhError::check_size("normal_velocity", n_edge_values, normal_velocity.len())?;
        MhError::check_size("layer_thick_edge", n_edge_values, out.len())?;

        let tol = self.dry_edge_tolerance;
        self.parallel.for_each_row(out, n_levels, |e, row| {
            let (c1, c2) = self.mesh.edge_cells(e);
            let active = self.mesh.edge_levels(e, n_levels);
            for k in 0..active {
                let thickness = self.upwind_thickness(e, ssh, normal_velocity[e * n_levels + k]);
                row[k] = if thickness < tol {
                    (layer_thickness[c1 * n_levels + k] + layer_thickness[c2 * n_levels + k]) * S::HALF
                } else {
                    thickness
                };
            }
        });
        Ok(())
    }

    /// 按配置的格式分发
    pub fn reconstruct(
        &self,
        scheme: EdgeFluxScheme,
        state: &EdgeFluxState<'_, S>,
        out: &mut [S],
    ) -> MhResult<()> {
        match scheme {
            EdgeFluxScheme::Centered => self.centered(state.ssh, state.layer_thick_edge_mean, out),
            EdgeFluxScheme::Upwind => {
                self.upwind(state.ssh, state.layer_thickness, state.normal_velocity, out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ElementKind, ElementTableInput};
    use mh_core::indices::cell;

    /// 三个单元、两条边；边表 ssh ∈ [-2, 2]，h = zeta + 2
    fn fixture() -> (SubgridTables<f64>, SubgridMesh<f64>) {
        let input = |n: usize| {
            let mut input = ElementTableInput::default();
            for _ in 0..n {
                input.wet_volume.extend([0.0, 2.0, 4.0]);
                input.wet_fraction.extend([0.0, 0.5, 1.0]);
                input.ssh_min.push(-2.0);
                input.ssh_max.push(2.0);
                input.bathymetry_mean.push(2.0);
            }
            input.bathymetry_min = Some(vec![1.0; n]);
            input
        };
        let tables = SubgridTables {
            cells: ElementTables::bind(ElementKind::Cell, 3, input(3), true).unwrap(),
            edges: ElementTables::bind(ElementKind::Edge, 3, input(2), true).unwrap(),
            vertices: ElementTables::bind(ElementKind::Vertex, 3, input(1), true).unwrap(),
        };
        let mesh = SubgridMesh::new(
            3,
            vec![[cell(0), cell(1)], [cell(1), cell(2)]],
            3,
            vec![cell(0), cell(1), cell(2)],
            vec![1.0, 1.0, 1.0],
            vec![3.0],
        )
        .unwrap();
        (tables, mesh)
    }

    #[test]
    fn test_upstream_direction() {
        assert_eq!(Upstream::from_velocity(0.5), Upstream::Cell1);
        assert_eq!(Upstream::from_velocity(-0.5), Upstream::Cell2);
        assert_eq!(Upstream::from_velocity(0.0), Upstream::Both);
        assert_eq!(Upstream::Both.ssh(1.0, 2.0), 1.5);
    }

    #[test]
    fn test_centered_averages_cells() {
        let (tables, mesh) = fixture();
        let recon = EdgeFluxReconstructor::new(&tables, &mesh, 1).unwrap();
        let mut out = vec![0.0; 2];
        recon.centered(&[0.0, 1.0, -1.0], &[9.0, 9.0], &mut out).unwrap();
        assert_eq!(out, vec![2.5, 2.0]);
    }

    #[test]
    fn test_centered_dry_edge_uses_mean_field() {
        let (tables, mesh) = fixture();
        let recon = EdgeFluxReconstructor::new(&tables, &mesh, 1).unwrap();
        let mut out = vec![0.0; 2];
        recon.centered(&[-3.0, -3.0, 0.0], &[0.7, 0.8], &mut out).unwrap();
        assert_eq!(out[0], 0.7);
        assert_eq!(out[1], 0.5);
    }

    #[test]
    fn test_upwind_picks_upstream_cell() {
        let (tables, mesh) = fixture();
        let recon = EdgeFluxReconstructor::new(&tables, &mesh, 1).unwrap();
        let ssh = [1.0, -1.0, 0.0];
        let h = [3.0, 1.0, 2.0];
        let mut out = vec![0.0; 2];

        recon.upwind(&ssh, &h, &[1.0, -1.0], &mut out).unwrap();
        assert_eq!(out, vec![3.0, 2.0]);

        recon.upwind(&ssh, &h, &[-1.0, 1.0], &mut out).unwrap();
        assert_eq!(out, vec![1.0, 1.0]);

        recon.upwind(&ssh, &h, &[0.0, 0.0], &mut out).unwrap();
        assert_eq!(out, vec![2.0, 1.5]);
    }

    #[test]
    fn test_upwind_dry_edge_uses_cell_mean() {
        let (tables, mesh) = fixture();
        let recon = EdgeFluxReconstructor::new(&tables, &mesh, 1).unwrap();
        let mut out = vec![0.0; 2];
        recon
            .upwind(&[-5.0, -5.0, -5.0], &[0.2, 0.4, 0.0], &[1.0, -1.0], &mut out)
            .unwrap();
        assert!((out[0] - 0.3).abs() < 1e-15);
        assert!((out[1] - 0.2).abs() < 1e-15);
    }

    #[test]
    fn test_inactive_levels_untouched() {
        let (tables, mesh) = fixture();
        let mesh = mesh.with_max_level_edge(vec![1, 0]).unwrap();
        let recon = EdgeFluxReconstructor::new(&tables, &mesh, 2).unwrap();
        let mut out = vec![-1.0; 4];
        recon.centered(&[0.0, 0.0, 0.0], &[0.0; 4], &mut out).unwrap();
        assert_eq!(out, vec![2.0, -1.0, -1.0, -1.0]);
    }

    #[test]
    fn test_size_mismatch_writes_nothing() {
        let (tables, mesh) = fixture();
        let recon = EdgeFluxReconstructor::new(&tables, &mesh, 1).unwrap();
        let mut out = vec![-1.0; 2];
        let err = recon.centered(&[0.0, 0.0, 0.0], &[0.0], &mut out).unwrap_err();
        assert!(matches!(err, MhError::SizeMismatch { name: "layer_thick_edge_mean", .. }));
        assert_eq!(out, vec![-1.0, -1.0]);
    }

    #[test]
    fn test_reconstruct_dispatch() {
        let (tables, mesh) = fixture();
        let recon = EdgeFluxReconstructor::new(&tables, &mesh, 1).unwrap();
        let state = EdgeFluxState {
            ssh: &[1.0, -1.0, 0.0],
            layer_thickness: &[3.0, 1.0, 2.0],
            normal_velocity: &[-1.0, -1.0],
            layer_thick_edge_mean: &[0.0, 0.0],
        };
        let mut centered = vec![0.0; 2];
        recon.reconstruct(EdgeFluxScheme::Centered, &state, &mut centered).unwrap();
        let mut upwind = vec![0.0; 2];
        recon.reconstruct(EdgeFluxScheme::Upwind, &state, &mut upwind).unwrap();
        assert_eq!(centered, vec![2.0, 1.5]);
        assert_eq!(upwind, vec![1.0, 2.0]);
    }
}
