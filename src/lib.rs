//! SINCO 职业分类浏览器
//!
//! 同一份层级数据在树、表格、卡片三个视图之间保持同步：
//! 搜索、分页、展开/折叠以及跨视图跳转都由 [`AppState`] 统一处理，
//! 界面层只实现 [`vm::bridge::Renderer`]。

pub mod config;
pub mod model;
pub mod utils;
pub mod vm;

// 重新导出主要类型
pub use config::AppConfig;
pub use model::data_core::{AppError, AppState, LoadPhase};
pub use model::hierarchy::{Hierarchy, NodeId, ROOT};
pub use model::view_switch::ActiveView;
pub use vm::bridge::{Renderer, UiEvent};
