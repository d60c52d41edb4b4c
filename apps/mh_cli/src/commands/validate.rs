// apps/mh_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 加载子网格配置并运行初始化闸门的配置检查；存在致命错误时以非零状态退出。

use anyhow::{bail, Result};
use clap::Args;
use mh_config::{Precision, SubgridConfig};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 验证结果
#[derive(Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn is_ok_strict(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== MariHydro 子网格配置验证 ===");

    let Some(config_path) = &args.config else {
        println!("用法: mh_cli validate --config <配置文件> [--strict]");
        return Ok(());
    };

    let mut result = ValidationResult::default();
    validate_config(config_path, &mut result);
    print_validation_result(&result, args.strict)
}

fn validate_config(path: &Path, result: &mut ValidationResult) {
    println!("\n检查配置文件: {}", path.display());

    if !path.exists() {
        result.add_error(format!("配置文件不存在: {}", path.display()));
        return;
    }

    let config = match SubgridConfig::from_file(path) {
        Ok(config) => config,
        Err(e) => {
            result.add_error(format!("配置无效: {}", e));
            return;
        }
    };
    println!("  ✓ 配置文件格式有效");

    if let Err(e) = mh_subgrid::check_config(&config) {
        result.add_error(e.to_string());
        return;
    }
    println!("  ✓ 初始化检查通过");

    collect_warnings(&config, result);
}

fn collect_warnings(config: &SubgridConfig, result: &mut ValidationResult) {
    if !config.use_subgrid_wetting_drying {
        result.add_warning("子网格干湿未启用，查找表不会被绑定");
        return;
    }

    if !config.validate_tables {
        result.add_warning("validate_tables = false：绑定时只检查数组尺寸");
    }

    if config.precision == Precision::F32 && config.dry_edge_tolerance < config.precision.epsilon() {
        result.add_warning(format!(
            "f32 精度下干边阈值 {} 小于机器精度，干边判定实际只对零层厚生效",
            config.dry_edge_tolerance
        ));
    }

    if config.n_subgrid_table_levels == 2 {
        result.add_warning("查找表只有 2 个采样点，子网格修正退化为单段线性");
    }
}

fn print_validation_result(result: &ValidationResult, strict: bool) -> Result<()> {
    println!("\n=== 验证结果 ===");

    for err in &result.errors {
        error!("{}", err);
        println!("  ✗ {}", err);
    }
    for w in &result.warnings {
        warn!("{}", w);
        println!("  ! {}", w);
    }

    let ok = if strict {
        result.is_ok_strict()
    } else {
        result.is_ok()
    };

    if ok {
        println!("\n✓ 验证通过 ({} 个警告)", result.warnings.len());
        Ok(())
    } else {
        bail!(
            "验证失败: {} 个错误, {} 个警告",
            result.errors.len(),
            result.warnings.len()
        )
    }
}
