//! 运行配置：全部字段都有默认值，配置文件只需写需要覆盖的部分

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::model::data_core::AppError;
use crate::model::pagination::DEFAULT_PAGE_SIZE;
use crate::utils::fs::read_json_file;
use crate::vm::bridge::{FOCUS_DELAY_MS, LOADER_MIN_DISPLAY_MS, SEARCH_DEBOUNCE_MS};

/// 指定配置文件路径的环境变量
pub const CONFIG_ENV: &str = "SINCO_CONFIG";
/// 未指定时在当前目录查找的配置文件
pub const DEFAULT_CONFIG_FILE: &str = "sinco.config.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub page_size: usize,
    pub search_debounce_ms: u64,
    pub loader_min_display_ms: u64,
    pub focus_delay_ms: u64,
    /// 固定界面语言；为空时按偏好与系统语言解析
    pub default_language: Option<String>,
    pub preferences_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("public/sincoData.json"),
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce_ms: SEARCH_DEBOUNCE_MS,
            loader_min_display_ms: LOADER_MIN_DISPLAY_MS,
            focus_delay_ms: FOCUS_DELAY_MS,
            default_language: None,
            preferences_path: PathBuf::from("sinco.prefs.json"),
        }
    }
}

impl AppConfig {
    pub fn from_file(p: &Path) -> Result<Self, AppError> {
        let v = read_json_file(p)?;
        let mut cfg: Self = serde_json::from_value(v)?;
        if cfg.page_size == 0 {
            tracing::warn!("pageSize 不能为 0，使用默认值 {}", DEFAULT_PAGE_SIZE);
            cfg.page_size = DEFAULT_PAGE_SIZE;
        }
        Ok(cfg)
    }

    /// 依次查找 `SINCO_CONFIG` 与当前目录下的默认文件；都不存在时使用默认配置
    pub fn load() -> Result<Self, AppError> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(p) => PathBuf::from(p),
            None => {
                let p = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !p.exists() {
                    return Ok(Self::default());
                }
                p
            }
        };
        tracing::info!("读取配置: {}", path.display());
        Self::from_file(&path)
    }

    /// 命令行第一个参数覆盖数据文件路径
    pub fn with_args(mut self, mut args: impl Iterator<Item = String>) -> Self {
        if let Some(p) = args.next() {
            self.data_path = PathBuf::from(p);
        }
        self
    }
}
