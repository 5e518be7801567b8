//! 发布前的数据校验：`validate_data [文件]`，有问题时逐条输出并以 1 退出

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use sinco_explorer::model::validate::validate_document;
use sinco_explorer::utils::fs::read_json_file;
use sinco_explorer::AppConfig;
use tracing_subscriber::fmt::SubscriberBuilder;

fn main() -> anyhow::Result<ExitCode> {
    let _ = SubscriberBuilder::default()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .try_init();

    let cfg = AppConfig::load().context("读取配置失败")?;
    let path: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or(cfg.data_path);

    let document = read_json_file(&path).with_context(|| format!("无法读取 {}", path.display()))?;
    let problems = validate_document(&document);

    if problems.is_empty() {
        println!("数据校验通过: {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    eprintln!("数据校验失败（{} 个问题）:", problems.len());
    for p in &problems {
        eprintln!("  {}", p);
    }
    tracing::error!("{} 未通过校验", path.display());
    Ok(ExitCode::FAILURE)
}
