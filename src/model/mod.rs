pub mod data_core;
pub mod hierarchy;
pub mod navigation;
pub mod pagination;
pub mod query;
pub mod record;
pub mod stats;
pub mod validate;
pub mod view_switch;
