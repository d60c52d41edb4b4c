// apps/mh_cli/src/commands/lookup.rs

//! 单表求值命令
//!
//! 在命令行给出的一张查找表上做正向、湿润比例或反查求值，
//! 用于离线检查预计算表的形状。精度通过 `Precision` 枚举分发。

use anyhow::{bail, Context, Result};
use clap::Args;
use mh_config::Precision;
use mh_core::Scalar;
use mh_subgrid::{ElementKind, ElementTableInput, ElementTables, InverseBranch};
use tracing::{info, warn};

/// 单表求值参数
#[derive(Args)]
pub struct LookupArgs {
    /// 湿体积表（逗号分隔，N 个值）
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    pub table: Vec<f64>,

    /// 湿润比例表（逗号分隔，缺省时取线性 0..1）
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub fraction: Vec<f64>,

    /// 水位范围下界
    #[arg(long, allow_hyphen_values = true)]
    pub min: f64,

    /// 水位范围上界
    #[arg(long, allow_hyphen_values = true)]
    pub max: f64,

    /// 平均底床深度
    #[arg(long, allow_hyphen_values = true)]
    pub bathymetry_mean: f64,

    /// 最小底床深度（缺省取平均值）
    #[arg(long, allow_hyphen_values = true)]
    pub bathymetry_min: Option<f64>,

    /// 待求值的水位（逗号分隔）
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub ssh: Vec<f64>,

    /// 待反查的层厚（逗号分隔）
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub thickness: Vec<f64>,

    /// 计算精度
    #[arg(long, default_value = "f64")]
    pub precision: Precision,
}

/// 执行求值命令
pub fn execute(args: LookupArgs) -> Result<()> {
    info!("=== 子网格查找表求值 ({}) ===", args.precision);

    if args.ssh.is_empty() && args.thickness.is_empty() {
        bail!("至少需要 --ssh 或 --thickness 之一");
    }

    let lines = match args.precision {
        Precision::F32 => evaluate::<f32>(&args)?,
        Precision::F64 => evaluate::<f64>(&args)?,
    };
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

/// 绑定单张表并逐个求值，返回输出行
fn evaluate<S: Scalar>(args: &LookupArgs) -> Result<Vec<String>> {
    let n = args.table.len();
    let fraction = if args.fraction.is_empty() {
        (0..n)
            .map(|i| i as f64 / (n.max(2) - 1) as f64)
            .collect()
    } else {
        args.fraction.clone()
    };

    let convert = |values: &[f64]| -> Vec<S> {
        values.iter().map(|&v| S::from_f64_lossless(v)).collect()
    };

    let input = ElementTableInput {
        wet_volume: convert(&args.table),
        wet_fraction: convert(&fraction),
        ssh_min: vec![S::from_f64_lossless(args.min)],
        ssh_max: vec![S::from_f64_lossless(args.max)],
        bathymetry_mean: vec![S::from_f64_lossless(args.bathymetry_mean)],
        bathymetry_min: Some(vec![S::from_f64_lossless(
            args.bathymetry_min.unwrap_or(args.bathymetry_mean),
        )]),
    };
    let tables = ElementTables::bind(ElementKind::Cell, n, input, true)
        .context("查找表无效")?;
    let table = tables.element(0);

    let mut lines = Vec::with_capacity(args.ssh.len() + args.thickness.len());
    for &zeta in &args.ssh {
        let zeta = S::from_f64_lossless(zeta);
        lines.push(format!(
            "ssh = {:>12} -> thickness = {:>12}, wet_fraction = {:>8}",
            zeta,
            table.thickness(zeta),
            table.wet_fraction(zeta)
        ));
    }

    for &h in &args.thickness {
        let h = S::from_f64_lossless(h);
        let Some((zeta, branch)) = table.ssh_classified(h) else {
            bail!("单元表缺少 bathymetry_min");
        };
        if branch == InverseBranch::DryLimit {
            warn!("层厚 {} 落在干极限分支，水位取 -bathymetry_min", h);
        }
        lines.push(format!(
            "thickness = {:>12} -> ssh = {:>12} ({:?})",
            h, zeta, branch
        ));
    }

    Ok(lines)
}
