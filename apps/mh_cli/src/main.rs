// apps/mh_cli/src/main.rs

//! MariHydro 子网格干湿命令行工具
//!
//! # 架构层级
//!
//! 本模块属于 **Layer 4: Application**：
//! - 零泛型语法：只接触 `SubgridConfig` 和 `Precision` 枚举
//! - 需要数值计算时按 `Precision` 分发到 `f32` / `f64` 单态化实现

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// MariHydro 子网格干湿命令行工具
#[derive(Parser)]
#[command(name = "mh_cli")]
#[command(author = "MariHydro Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MariHydro subgrid wetting/drying lookup tools", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 验证配置并运行初始化检查
    Validate(commands::validate::ValidateArgs),
    /// 显示配置信息
    Info(commands::info::InfoArgs),
    /// 在单张查找表上求值
    Lookup(commands::lookup::LookupArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Validate(args) => commands::validate::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Lookup(args) => commands::lookup::execute(args),
    }
}
