//! VM桥接层：核心状态与渲染层之间的契约
//!
//! 具体的 Slint 实现在 main.rs 中，因为依赖于 Slint 生成的类型；
//! 这里定义渲染接口、界面事件以及公共常量。

use crate::model::hierarchy::{Hierarchy, NodeId};
use crate::model::view_switch::{ActiveView, TabKey};

// === 常量定义（消除魔法值） ===
/// 语言偏好的存储键
pub const LANG_STORAGE_KEY: &str = "sinco-lang";
/// 跨视图跳转后等待树视图布局的时间
pub const FOCUS_DELAY_MS: u64 = 100;
/// 搜索输入防抖
pub const SEARCH_DEBOUNCE_MS: u64 = 300;
/// 加载提示最短显示时间
pub const LOADER_MIN_DISPLAY_MS: u64 = 500;

/// 一页列表数据（表格或卡片）
#[derive(Debug, Clone, Copy)]
pub struct PageView<'a> {
    pub view: ActiveView,
    pub items: &'a [NodeId],
    pub page: usize,
    pub total_pages: usize,
}

impl PageView<'_> {
    pub fn label(&self) -> String {
        format!("{}/{}", self.page, self.total_pages)
    }

    /// 只有一页时卡片分页器隐藏
    pub fn has_multiple_pages(&self) -> bool {
        self.total_pages > 1
    }
}

/// 渲染层契约：核心只发出指令，屏幕坐标完全由渲染层掌握
pub trait Renderer {
    /// 只显示指定视图的容器
    fn show_view(&mut self, view: ActiveView);
    /// 重绘树：可见节点（先序）与父子连线
    fn render_tree(&mut self, tree: &Hierarchy, nodes: &[NodeId], links: &[(NodeId, NodeId)]);
    /// 重绘表格或卡片的当前页
    fn render_page(&mut self, tree: &Hierarchy, page: &PageView<'_>);
    /// 请求把节点居中
    fn center_on(&mut self, tree: &Hierarchy, id: NodeId);
    fn highlight(&mut self, tree: &Hierarchy, id: NodeId, on: bool);
}

/// 树节点上的键盘操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKey {
    /// Enter / 空格：切换
    Activate,
    /// 右方向键：展开折叠的节点
    Expand,
    /// 左方向键：折叠展开的节点
    Collapse,
}

/// 界面事件，由 `AppState::dispatch` 统一分发
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    NodeClicked(NodeId),
    NodeKey { id: NodeId, key: NodeKey },
    RowClicked(String),
    CardClicked(String),
    TabChanged(ActiveView),
    TabKey(TabKey),
    /// 已经过防抖的搜索词
    SearchChanged(String),
    PageChanged { view: ActiveView, delta: i64 },
    ExpandAll,
    CollapseAll,
    /// 树视图完成布局，可以执行延迟的定位
    LayoutReady,
}
