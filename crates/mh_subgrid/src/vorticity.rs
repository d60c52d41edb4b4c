// crates/mh_subgrid/src/vorticity.rs

//! 顶点涡度归一化
//!
//! 对每个顶点：
//!
//! ```text
//! ssh_v = sum_j(kite_area_j * ssh_j) / area_triangle
//! h_v   = forward_thickness(ssh_v, vertex_table)
//! q_rel = zeta_rel / h_v
//! q_pla = f_v / h_v
//! ```
//!
//! `h_v == 0` 的顶点层不写归一化涡度，保留宿主原值。

use mh_core::Scalar;
use mh_foundation::{MhError, MhResult};

use crate::mesh::SubgridMesh;
use crate::parallel::ParallelConfig;
use crate::table::{ElementTables, SubgridTables};

/// 涡度归一化所需的宿主状态
#[derive(Debug, Clone, Copy)]
pub struct VorticityState<'a, S: Scalar> {
    /// 单元水位，长度 n_cells
    pub ssh: &'a [S],
    /// 顶点相对涡度，长度 n_vertices * n_vert_levels
    pub relative_vorticity: &'a [S],
    /// 顶点科氏参数，长度 n_vertices
    pub f_vertex: &'a [S],
}

/// 涡度归一化输出（宿主持有）
#[derive(Debug)]
pub struct VorticityOutput<'a, S: Scalar> {
    /// 顶点层厚，长度 n_vertices * n_vert_levels
    pub layer_thickness_vertex: &'a mut [S],
    /// 归一化相对涡度
    pub normalized_relative_vorticity: &'a mut [S],
    /// 归一化行星涡度
    pub normalized_planetary_vorticity: &'a mut [S],
}

/// 顶点涡度归一化器
#[derive(Debug, Clone, Copy)]
pub struct VorticityNormalizer<'a, S: Scalar> {
    vertices: &'a ElementTables<S>,
    mesh: &'a SubgridMesh<S>,
    n_vert_levels: usize,
    parallel: ParallelConfig,
}

impl<'a, S: Scalar> VorticityNormalizer<'a, S> {
    /// 创建归一化器，顶点表元素数必须等于网格顶点数
    pub fn new(
        tables: &'a SubgridTables<S>,
        mesh: &'a SubgridMesh<S>,
        n_vert_levels: usize,
    ) -> MhResult<Self> {
        MhError::check_size("vertex tables", mesh.n_vertices(), tables.vertices.n_elements())?;
        Ok(Self {
            vertices: &tables.vertices,
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

    /// 顶点面积加权水位
    #[inline]
    pub fn vertex_ssh(&self, vertex: usize, ssh: &[S]) -> S {
        self.mesh.vertex_weighted(vertex, ssh)
    }

    /// 顶点层厚
    #[inline]
    pub fn vertex_thickness(&self, vertex: usize, ssh: &[S]) -> S {
        self.vertices.element(vertex).thickness(self.vertex_ssh(vertex, ssh))
    }

    /// 计算顶点层厚与归一化涡度
    pub fn normalize(&self, state: &VorticityState<'_, S>, out: VorticityOutput<'_, S>) -> MhResult<()> {
        let VorticityOutput {
            layer_thickness_vertex,
            normalized_relative_vorticity,
            normalized_planetary_vorticity,
        } = out;

        let n_levels = self.n_vert_levels;
        let n_vertices = self.mesh.n_vertices();
        let n_vertex_values = n_vertices * n_levels;
        MhError::check_size("ssh", self.mesh.n_cells(), state.ssh.len())?;
        MhError::check_size("relative_vorticity", n_vertex_values, state.relative_vorticity.len())?;
        MhError::check_size("f_vertex", n_vertices, state.f_vertex.len())?;
        MhError::check_size("layer_thickness_vertex", n_vertex_values, layer_thickness_vertex.len())?;
        MhError::check_size(
            "normalized_relative_vorticity",
            n_vertex_values,
            normalized_relative_vorticity.len(),
        )?;
        MhError::check_size(
            "normalized_planetary_vorticity",
            n_vertex_values,
            normalized_planetary_vorticity.len(),
        )?;

        let ssh = state.ssh;
        self.parallel.for_each_row(&mut *layer_thickness_vertex, n_levels, |v, row| {
            let thickness = self.vertex_thickness(v, ssh);
            let active = self.mesh.vertex_levels(v, n_levels);
            row[..active].fill(thickness);
        });

        let thickness: &[S] = layer_thickness_vertex;
        self.parallel.for_each_row_pair(
            normalized_relative_vorticity,
            normalized_planetary_vorticity,
            n_levels,
            |v, q_rel, q_pla| {
                let active = self.mesh.vertex_levels(v, n_levels);
                for k in 0..active {
                    let h = thickness[v * n_levels + k];
                    if h == S::ZERO {
                        continue;
                    }
                    q_rel[k] = state.relative_vorticity[v * n_levels + k] / h;
                    q_pla[k] = state.f_vertex[v] / h;
                }
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ElementKind, ElementTableInput};
    use mh_core::indices::cell;
    use mh_core::CellIndex;

    /// 两个顶点共享三个单元；顶点表 ssh ∈ [-2, 2]，表 [0, 2, 4]
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
            edges: ElementTables::bind(ElementKind::Edge, 3, input(0), true).unwrap(),
            vertices: ElementTables::bind(ElementKind::Vertex, 3, input(2), true).unwrap(),
        };
        let mesh = SubgridMesh::new(
            3,
            vec![],
            3,
            vec![cell(0), cell(1), cell(2), cell(0), cell(2), CellIndex::INVALID],
            vec![1.0, 1.0, 2.0, 1.0, 1.0, 0.0],
            vec![4.0, 2.0],
        )
        .unwrap();
        (tables, mesh)
    }

    #[test]
    fn test_vertex_ssh_area_weighted() {
        let (tables, mesh) = fixture();
        let normalizer = VorticityNormalizer::new(&tables, &mesh, 1).unwrap();
        // (1*0 + 1*2 + 2*1) / 4
        assert_eq!(normalizer.vertex_ssh(0, &[0.0, 2.0, 1.0]), 1.0);
        // (1*0 + 1*1) / 2，第三个邻接单元无效
        assert_eq!(normalizer.vertex_ssh(1, &[0.0, 2.0, 1.0]), 0.5);
    }

    #[test]
    fn test_normalize() {
        let (tables, mesh) = fixture();
        let normalizer = VorticityNormalizer::new(&tables, &mesh, 1).unwrap();
        let state = VorticityState {
            ssh: &[0.0, 2.0, 1.0],
            relative_vorticity: &[6.0, 5.0],
            f_vertex: &[1.5, 1e-4],
        };
        let mut h = vec![0.0; 2];
        let mut q_rel = vec![0.0; 2];
        let mut q_pla = vec![0.0; 2];
        normalizer
            .normalize(
                &state,
                VorticityOutput {
                    layer_thickness_vertex: &mut h,
                    normalized_relative_vorticity: &mut q_rel,
                    normalized_planetary_vorticity: &mut q_pla,
                },
            )
            .unwrap();

        assert_eq!(h, vec![3.0, 2.5]);
        assert_eq!(q_rel, vec![2.0, 2.0]);
        assert_eq!(q_pla[0], 0.5);
        assert!((q_pla[1] - 4e-5).abs() < 1e-18);
    }

    #[test]
    fn test_dry_vertex_untouched() {
        let (tables, mesh) = fixture();
        let normalizer = VorticityNormalizer::new(&tables, &mesh, 1).unwrap();
        let state = VorticityState {
            ssh: &[-3.0, -3.0, -3.0],
            relative_vorticity: &[1.0, 1.0],
            f_vertex: &[1.0, 1.0],
        };
        let mut h = vec![9.0; 2];
        let mut q_rel = vec![-7.0; 2];
        let mut q_pla = vec![-8.0; 2];
        normalizer
            .normalize(
                &state,
                VorticityOutput {
                    layer_thickness_vertex: &mut h,
                    normalized_relative_vorticity: &mut q_rel,
                    normalized_planetary_vorticity: &mut q_pla,
                },
            )
            .unwrap();

        assert_eq!(h, vec![0.0, 0.0]);
        assert_eq!(q_rel, vec![-7.0, -7.0]);
        assert_eq!(q_pla, vec![-8.0, -8.0]);
    }

    #[test]
    fn test_rejects_mismatched_tables() {
        let (tables, _) = fixture();
        let mesh = SubgridMesh::new(3, vec![], 1, vec![cell(0)], vec![1.0], vec![1.0]).unwrap();
        assert!(VorticityNormalizer::new(&tables, &mesh, 1).is_err());
    }
}
