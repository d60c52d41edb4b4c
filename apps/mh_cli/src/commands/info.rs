// apps/mh_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示版本、默认配置或给定配置文件的摘要。

use anyhow::{Context, Result};
use clap::Args;
use mh_config::SubgridConfig;
use std::path::PathBuf;
use tracing::info;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 显示系统信息
    #[arg(long)]
    pub system: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== MariHydro 信息 ===");

    if args.system {
        print_system_info();
        println!();
    }

    match &args.config {
        Some(path) => {
            let config = SubgridConfig::from_file(path)
                .with_context(|| format!("无法加载配置文件: {}", path.display()))?;
            println!("=== 配置: {} ===", path.display());
            print_config(&config);
        }
        None => {
            println!("=== 默认配置 ===");
            print_config(&SubgridConfig::default());
        }
    }

    Ok(())
}

fn print_system_info() {
    println!("=== 系统信息 ===");
    println!("MariHydro CLI 版本: {}", env!("CARGO_PKG_VERSION"));
    println!("目标平台: {}", std::env::consts::ARCH);
    println!("操作系统: {}", std::env::consts::OS);
    println!("rayon 线程数: {}", rayon::current_num_threads());

    println!("\n可用精度:");
    println!("  - f32 (单精度): ✓");
    println!("  - f64 (双精度): ✓");
}

fn print_config(config: &SubgridConfig) {
    println!("子网格干湿: {}", if config.use_subgrid_wetting_drying { "启用" } else { "未启用" });
    println!("精度: {} ({} 字节)", config.precision, config.precision.size_bytes());
    println!("运行模式: {}", config.run_mode);
    println!("垂向层数: {}", config.n_vert_levels);
    println!("查找表采样点数: {}", config.n_subgrid_table_levels);
    println!("边通量格式: {}", config.edge_flux_scheme);
    println!("干边阈值: {} m", config.dry_edge_tolerance);
    println!("绑定期表检查: {}", if config.validate_tables { "完整" } else { "仅尺寸" });
    println!("最小并行元素数: {}", config.min_parallel_size);

    if config.requires_single_layer() {
        println!("\n约束: 正向积分要求 n_vert_levels = 1");
    }
}
