// crates/mh_subgrid/src/init.rs

//! 初始化闸门
//!
//! 时间推进前调用一次：
//!
//! 1. 未启用子网格干湿时直接返回 `None`，不读取任何表
//! 2. 检查配置；正向积分模式下垂向层数必须为 1，否则记录错误并失败
//! 3. 绑定单元/边/顶点三类查找表
//!
//! 除绑定与验证外不做任何数值计算。

use mh_config::SubgridConfig;
use mh_core::Scalar;
use mh_foundation::{MhError, MhResult};

use crate::diagnostics::SubgridDiagnostics;
use crate::edge::{EdgeFluxReconstructor, EdgeFluxState};
use crate::mesh::SubgridMesh;
use crate::parallel::ParallelConfig;
use crate::table::{ElementKind, ElementTableInput, ElementTables, SubgridTables};
use crate::vorticity::VorticityNormalizer;

/// 三类元素的原始表数组
#[derive(Debug, Clone, Default)]
pub struct SubgridTableInputs<S: Scalar> {
    /// 单元表
    pub cells: ElementTableInput<S>,
    /// 边表
    pub edges: ElementTableInput<S>,
    /// 顶点表
    pub vertices: ElementTableInput<S>,
}

/// 检查子网格相关配置
///
/// 未启用时总是通过。
pub fn check_config(config: &SubgridConfig) -> MhResult<()> {
    if !config.use_subgrid_wetting_drying {
        return Ok(());
    }

    config.validate().map_err(|e| {
        tracing::error!("子网格配置无效: {}", e);
        MhError::config(e.to_string())
    })?;

    if config.requires_single_layer() && config.n_vert_levels != 1 {
        tracing::error!(
            "子网格干湿正向积分只支持单层，当前 n_vert_levels = {}",
            config.n_vert_levels
        );
        return Err(MhError::invalid_config(
            "n_vert_levels",
            config.n_vert_levels.to_string(),
            "子网格干湿正向积分要求垂向层数为 1",
        ));
    }

    Ok(())
}

/// 初始化闸门：检查配置并绑定查找表
///
/// 未启用子网格干湿时返回 `Ok(None)`。
pub fn initialize<S: Scalar>(
    config: &SubgridConfig,
    inputs: SubgridTableInputs<S>,
) -> MhResult<Option<SubgridTables<S>>> {
    if !config.use_subgrid_wetting_drying {
        tracing::debug!("子网格干湿未启用，跳过查找表绑定");
        return Ok(None);
    }

    check_config(config)?;

    let n_levels = config.n_subgrid_table_levels;
    let validate = config.validate_tables;
    let tables = SubgridTables {
        cells: ElementTables::bind(ElementKind::Cell, n_levels, inputs.cells, validate)?,
        edges: ElementTables::bind(ElementKind::Edge, n_levels, inputs.edges, validate)?,
        vertices: ElementTables::bind(ElementKind::Vertex, n_levels, inputs.vertices, validate)?,
    };

    tracing::info!(
        "子网格查找表已绑定: {} 单元, {} 边, {} 顶点, N = {}",
        tables.cells.n_elements(),
        tables.edges.n_elements(),
        tables.vertices.n_elements(),
        n_levels
    );

    Ok(Some(tables))
}

/// 子网格运行上下文
///
/// 持有配置、已绑定的表和网格连接，按配置构造各消费者。
#[derive(Debug, Clone)]
pub struct SubgridContext<S: Scalar> {
    config: SubgridConfig,
    tables: SubgridTables<S>,
    mesh: SubgridMesh<S>,
}

impl<S: Scalar> SubgridContext<S> {
    /// 运行初始化闸门并检查表与网格的一致性
    ///
    /// 未启用子网格干湿时返回 `Ok(None)`。
    pub fn initialize(
        config: SubgridConfig,
        inputs: SubgridTableInputs<S>,
        mesh: SubgridMesh<S>,
    ) -> MhResult<Option<Self>> {
        let Some(tables) = initialize(&config, inputs)? else {
            return Ok(None);
        };

        let context = Self { config, tables, mesh };
        context.diagnostics()?;
        Ok(Some(context))
    }

    /// 配置
    pub fn config(&self) -> &SubgridConfig {
        &self.config
    }

    /// 查找表
    pub fn tables(&self) -> &SubgridTables<S> {
        &self.tables
    }

    /// 网格连接
    pub fn mesh(&self) -> &SubgridMesh<S> {
        &self.mesh
    }

    fn parallel(&self) -> ParallelConfig {
        ParallelConfig::auto(self.config.min_parallel_size)
    }

    /// 边通量重构器
    pub fn edge_flux(&self) -> MhResult<EdgeFluxReconstructor<'_, S>> {
        Ok(EdgeFluxReconstructor::new(&self.tables, &self.mesh, self.config.n_vert_levels)?
            .with_dry_edge_tolerance(S::from_f64_lossless(self.config.dry_edge_tolerance))
            .with_parallel(self.parallel()))
    }

    /// 顶点涡度归一化器
    pub fn vorticity(&self) -> MhResult<VorticityNormalizer<'_, S>> {
        Ok(VorticityNormalizer::new(&self.tables, &self.mesh, self.config.n_vert_levels)?
            .with_parallel(self.parallel()))
    }

    /// 批量查找器
    pub fn diagnostics(&self) -> MhResult<SubgridDiagnostics<'_, S>> {
        Ok(SubgridDiagnostics::new(&self.tables, &self.mesh, self.config.n_vert_levels)?
            .with_parallel(self.parallel()))
    }

    /// 按配置的格式重构边层厚
    pub fn reconstruct_edges(&self, state: &EdgeFluxState<'_, S>, out: &mut [S]) -> MhResult<()> {
        self.edge_flux()?
            .reconstruct(self.config.edge_flux_scheme, state, out)
    }
}
