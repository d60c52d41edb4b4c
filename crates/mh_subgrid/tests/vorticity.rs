// crates/mh_subgrid/tests/vorticity.rs
//!
//! 顶点涡度归一化集成测试

use mh_config::SubgridConfig;
use mh_core::indices::cell;
use mh_core::CellIndex;
use mh_subgrid::{
    ElementTableInput, SubgridContext, SubgridMesh, SubgridTableInputs, VorticityOutput,
    VorticityState,
};

fn element(wet_volume: &[[f64; 3]], b_mean: f64) -> ElementTableInput<f64> {
    let n = wet_volume.len();
    ElementTableInput {
        wet_volume: wet_volume.iter().flatten().copied().collect(),
        wet_fraction: [0.0, 0.5, 1.0].repeat(n),
        ssh_min: vec![-1.0; n],
        ssh_max: vec![1.0; n],
        bathymetry_mean: vec![b_mean; n],
        bathymetry_min: Some(vec![b_mean; n]),
    }
}

/// 三个单元围绕一个内部顶点，另有一个只挂两个单元的边界顶点
fn context() -> SubgridContext<f64> {
    let mesh = SubgridMesh::new(
        3,
        vec![[cell(0), cell(1)], [cell(1), cell(2)], [cell(2), cell(0)]],
        3,
        vec![cell(0), cell(1), cell(2), cell(0), cell(1), CellIndex::INVALID],
        vec![0.5, 0.25, 0.25, 0.5, 0.5, 0.0],
        vec![1.0, 1.0],
    )
    .unwrap();

    let inputs = SubgridTableInputs {
        cells: element(&[[0.0, 1.0, 3.0]; 3], 2.0),
        edges: element(&[[0.0, 1.0, 3.0]; 3], 2.0),
        // 顶点 1 的表更浅
        vertices: element(&[[0.0, 1.0, 3.0], [0.0, 0.5, 2.0]], 2.0),
    };

    SubgridContext::initialize(SubgridConfig::enabled(3), inputs, mesh)
        .unwrap()
        .unwrap()
}

#[test]
fn normalizes_by_vertex_thickness() {
    let ctx = context();
    let state = VorticityState {
        ssh: &[0.4, 0.0, -0.4],
        relative_vorticity: &[1e-5, -2e-5],
        f_vertex: &[1e-4, 1e-4],
    };
    let mut h = vec![0.0; 2];
    let mut q_rel = vec![0.0; 2];
    let mut q_pla = vec![0.0; 2];
    ctx.vorticity()
        .unwrap()
        .normalize(
            &state,
            VorticityOutput {
                layer_thickness_vertex: &mut h,
                normalized_relative_vorticity: &mut q_rel,
                normalized_planetary_vorticity: &mut q_pla,
            },
        )
        .unwrap();

    // 顶点 0: ssh = 0.5*0.4 + 0.25*0 + 0.25*(-0.4) = 0.1 → h = 1 + 0.1*2 = 1.2
    // 顶点 1: ssh = 0.5*0.4 + 0.5*0 = 0.2 → h = 0.5 + 0.2*1.5 = 0.8
    assert!((h[0] - 1.2).abs() < 1e-12);
    assert!((h[1] - 0.8).abs() < 1e-12);
    assert!((q_rel[0] - 1e-5 / 1.2).abs() < 1e-18);
    assert!((q_rel[1] + 2e-5 / 0.8).abs() < 1e-18);
    assert!((q_pla[0] - 1e-4 / 1.2).abs() < 1e-17);
    assert!((q_pla[1] - 1e-4 / 0.8).abs() < 1e-17);
}

#[test]
fn dry_vertex_keeps_host_values() {
    let ctx = context();
    let state = VorticityState {
        ssh: &[-1.5, -1.5, 0.8],
        relative_vorticity: &[1.0, 1.0],
        f_vertex: &[1.0, 1.0],
    };
    let mut h = vec![0.0; 2];
    let mut q_rel = vec![42.0; 2];
    let mut q_pla = vec![43.0; 2];
    ctx.vorticity()
        .unwrap()
        .normalize(
            &state,
            VorticityOutput {
                layer_thickness_vertex: &mut h,
                normalized_relative_vorticity: &mut q_rel,
                normalized_planetary_vorticity: &mut q_pla,
            },
        )
        .unwrap();

    // 顶点 1 只看到两个干单元
    assert_eq!(h[1], 0.0);
    assert_eq!(q_rel[1], 42.0);
    assert_eq!(q_pla[1], 43.0);

    // 顶点 0: ssh = -0.75 - 0.375 + 0.2 = -0.925 → 湿
    assert!(h[0] > 0.0);
    assert!((q_rel[0] - 1.0 / h[0]).abs() < 1e-12);
}

#[test]
fn wrong_output_length_is_rejected() {
    let ctx = context();
    let state = VorticityState {
        ssh: &[0.0, 0.0, 0.0],
        relative_vorticity: &[0.0, 0.0],
        f_vertex: &[0.0, 0.0],
    };
    let mut h = vec![0.0; 2];
    let mut q_rel = vec![0.0; 1];
    let mut q_pla = vec![0.0; 2];
    let result = ctx.vorticity().unwrap().normalize(
        &state,
        VorticityOutput {
            layer_thickness_vertex: &mut h,
            normalized_relative_vorticity: &mut q_rel,
            normalized_planetary_vorticity: &mut q_pla,
        },
    );
    assert!(result.is_err());
}
