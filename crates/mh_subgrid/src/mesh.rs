// crates/mh_subgrid/src/mesh.rs

//! 子网格消费者所需的只读网格连接关系
//!
//! 只保存边界单元对、顶点邻接单元及风筝面积、对偶三角形面积，
//! 以及可选的每元素活动层数。网格剖分与并行通信不在本模块范围内。

use mh_core::{CellIndex, Scalar};
use mh_foundation::{MhError, MhResult};

/// 子网格网格连接
#[derive(Debug, Clone)]
pub struct SubgridMesh<S: Scalar> {
    n_cells: usize,
    vertex_degree: usize,
    /// 每条边两侧的单元 `[cell1, cell2]`
    cells_on_edge: Vec<[CellIndex; 2]>,
    /// 顶点邻接单元，行优先 `v * vertex_degree + j`
    cells_on_vertex: Vec<CellIndex>,
    /// 与 `cells_on_vertex` 对应的风筝面积
    kite_areas_on_vertex: Vec<S>,
    /// 对偶三角形面积
    area_triangle: Vec<S>,
    max_level_edge: Option<Vec<usize>>,
    max_level_vertex: Option<Vec<usize>>,
}

impl<S: Scalar> SubgridMesh<S> {
    /// 创建网格连接
    ///
    /// 顶点数取自 `area_triangle` 的长度。边两侧单元必须有效；
    /// 顶点邻接单元可为 `CellIndex::INVALID`（边界顶点）。
    pub fn new(
        n_cells: usize,
        cells_on_edge: Vec<[CellIndex; 2]>,
        vertex_degree: usize,
        cells_on_vertex: Vec<CellIndex>,
        kite_areas_on_vertex: Vec<S>,
        area_triangle: Vec<S>,
    ) -> MhResult<Self> {
        if vertex_degree == 0 {
            return Err(MhError::invalid_mesh("顶点度数必须为正"));
        }

        let n_vertices = area_triangle.len();
        MhError::check_size("cells_on_vertex", n_vertices * vertex_degree, cells_on_vertex.len())?;
        MhError::check_size(
            "kite_areas_on_vertex",
            n_vertices * vertex_degree,
            kite_areas_on_vertex.len(),
        )?;

        for (e, cells) in cells_on_edge.iter().enumerate() {
            for cell in cells {
                if !cell.is_valid() || cell.get() >= n_cells {
                    return Err(MhError::invalid_mesh(format!(
                        "边 {} 的邻接单元 {} 无效 (n_cells={})",
                        e, cell, n_cells
                    )));
                }
            }
        }

        for (slot, cell) in cells_on_vertex.iter().enumerate() {
            if let Some(c) = cell.to_option() {
                MhError::check_index("Cell", c, n_cells)?;
            }
            if !(kite_areas_on_vertex[slot] >= S::ZERO) {
                return Err(MhError::invalid_mesh(format!(
                    "顶点 {} 的风筝面积 {} 无效",
                    slot / vertex_degree,
                    kite_areas_on_vertex[slot]
                )));
            }
        }

        if let Some(v) = area_triangle.iter().position(|&a| !(a > S::ZERO)) {
            return Err(MhError::invalid_mesh(format!(
                "顶点 {} 的三角形面积 {} 必须为正",
                v, area_triangle[v]
            )));
        }

        Ok(Self {
            n_cells,
            vertex_degree,
            cells_on_edge,
            cells_on_vertex,
            kite_areas_on_vertex,
            area_triangle,
            max_level_edge: None,
            max_level_vertex: None,
        })
    }

    /// 设置每条边的活动层数
    pub fn with_max_level_edge(mut self, levels: Vec<usize>) -> MhResult<Self> {
        MhError::check_size("max_level_edge", self.n_edges(), levels.len())?;
        self.max_level_edge = Some(levels);
        Ok(self)
    }

    /// 设置每个顶点的活动层数
    pub fn with_max_level_vertex(mut self, levels: Vec<usize>) -> MhResult<Self> {
        MhError::check_size("max_level_vertex", self.n_vertices(), levels.len())?;
        self.max_level_vertex = Some(levels);
        Ok(self)
    }

    // =========================================================================
    // 基本统计
    // =========================================================================

    /// 单元数量
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// 边数量
    #[inline]
    pub fn n_edges(&self) -> usize {
        self.cells_on_edge.len()
    }

    /// 顶点数量
    #[inline]
    pub fn n_vertices(&self) -> usize {
        self.area_triangle.len()
    }

    /// 顶点度数
    #[inline]
    pub fn vertex_degree(&self) -> usize {
        self.vertex_degree
    }

    // =========================================================================
    // 连接访问
    // =========================================================================

    /// 边两侧单元 `(cell1, cell2)`
    #[inline]
    pub fn edge_cells(&self, edge: usize) -> (usize, usize) {
        let [c1, c2] = self.cells_on_edge[edge];
        (c1.get(), c2.get())
    }

    /// 顶点的 `(邻接单元, 风筝面积)` 列表
    #[inline]
    pub fn vertex_cells(&self, vertex: usize) -> impl Iterator<Item = (CellIndex, S)> + '_ {
        let start = vertex * self.vertex_degree;
        let end = start + self.vertex_degree;
        self.cells_on_vertex[start..end]
            .iter()
            .copied()
            .zip(self.kite_areas_on_vertex[start..end].iter().copied())
    }

    /// 对偶三角形面积
    #[inline]
    pub fn area_triangle(&self, vertex: usize) -> S {
        self.area_triangle[vertex]
    }

    /// 边的活动层数（未设置时为全部层）
    #[inline]
    pub fn edge_levels(&self, edge: usize, n_vert_levels: usize) -> usize {
        self.max_level_edge
            .as_ref()
            .map_or(n_vert_levels, |levels| levels[edge].min(n_vert_levels))
    }

    /// 顶点的活动层数（未设置时为全部层）
    #[inline]
    pub fn vertex_levels(&self, vertex: usize, n_vert_levels: usize) -> usize {
        self.max_level_vertex
            .as_ref()
            .map_or(n_vert_levels, |levels| levels[vertex].min(n_vert_levels))
    }

    // =========================================================================
    // 插值
    // =========================================================================

    /// 边上的中心水位：两侧单元水位平均
    #[inline]
    pub fn edge_mean(&self, edge: usize, cell_field: &[S]) -> S {
        let (c1, c2) = self.edge_cells(edge);
        (cell_field[c1] + cell_field[c2]) * S::HALF
    }

    /// 顶点上的面积加权水位
    ///
    /// `sum(kite_area_j * ssh_j) / area_triangle`，无效邻接单元不计入。
    #[inline]
    pub fn vertex_weighted(&self, vertex: usize, cell_field: &[S]) -> S {
        let weighted: S = self
            .vertex_cells(vertex)
            .filter_map(|(cell, kite)| cell.to_option().map(|c| kite * cell_field[c]))
            .sum();
        weighted / self.area_triangle[vertex]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mh_core::indices::cell;

    /// 两个单元、一条边、一个边界顶点
    fn two_cell_mesh() -> SubgridMesh<f64> {
        SubgridMesh::new(
            2,
            vec![[cell(0), cell(1)]],
            3,
            vec![cell(0), cell(1), CellIndex::INVALID],
            vec![1.0, 3.0, 2.0],
            vec![6.0],
        )
        .unwrap()
    }

    #[test]
    fn test_counts() {
        let mesh = two_cell_mesh();
        assert_eq!(mesh.n_cells(), 2);
        assert_eq!(mesh.n_edges(), 1);
        assert_eq!(mesh.n_vertices(), 1);
        assert_eq!(mesh.edge_cells(0), (0, 1));
    }

    #[test]
    fn test_edge_mean() {
        let mesh = two_cell_mesh();
        assert_eq!(mesh.edge_mean(0, &[1.0, 2.0]), 1.5);
    }

    #[test]
    fn test_vertex_weighted_skips_invalid_cell() {
        let mesh = two_cell_mesh();
        // (1*2 + 3*4) / 6
        let ssh = mesh.vertex_weighted(0, &[2.0, 4.0]);
        assert!((ssh - 14.0 / 6.0).abs() < 1e-14);
    }

    #[test]
    fn test_active_levels() {
        let mesh = two_cell_mesh()
            .with_max_level_edge(vec![0])
            .unwrap()
            .with_max_level_vertex(vec![5])
            .unwrap();
        assert_eq!(mesh.edge_levels(0, 1), 0);
        assert_eq!(mesh.vertex_levels(0, 1), 1);
        assert!(two_cell_mesh().with_max_level_edge(vec![1, 1]).is_err());
    }

    #[test]
    fn test_rejects_invalid_edge_cell() {
        let err = SubgridMesh::<f64>::new(
            2,
            vec![[cell(0), CellIndex::INVALID]],
            1,
            vec![],
            vec![],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, MhError::InvalidMesh { .. }));
    }

    #[test]
    fn test_rejects_bad_areas() {
        let zero_area = SubgridMesh::<f64>::new(1, vec![], 1, vec![cell(0)], vec![1.0], vec![0.0]);
        assert!(zero_area.is_err());

        let negative_kite = SubgridMesh::<f64>::new(1, vec![], 1, vec![cell(0)], vec![-1.0], vec![1.0]);
        assert!(negative_kite.is_err());

        let out_of_range = SubgridMesh::<f64>::new(1, vec![], 1, vec![cell(3)], vec![1.0], vec![1.0]);
        assert!(matches!(out_of_range, Err(MhError::IndexOutOfBounds { .. })));
    }
}
