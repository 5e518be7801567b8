//! AppState：应用核心状态，负责三个视图之间的同步
//!
//! 所有界面事件都经由 [`AppState::dispatch`] 进入；层级模型的展开/折叠只在这里被修改，
//! 其余组件只读取。

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::model::hierarchy::{Hierarchy, NodeId, ROOT};
use crate::model::navigation::{self, FocusRequest, Navigator};
use crate::model::pagination::Pager;
use crate::model::query::{self, SearchScope};
use crate::model::stats::DatasetStats;
use crate::model::view_switch::{ActiveView, ViewSwitch};
use crate::utils::fs::read_json_file;
use crate::vm::bridge::{NodeKey, PageView, Renderer, UiEvent};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON解析失败: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("数据结构错误: {0}")]
    MalformedData(String),
    #[error("未找到编码: {0}")]
    NotFound(String),
    #[error("状态错误: {0}")]
    State(String),
}

impl AppError {
    /// 数据无法取得或无法使用：整个会话失败，界面显示错误页
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Parse(_) | Self::MalformedData(_))
    }
}

/// 数据加载阶段
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Default)]
pub struct AppState {
    pub source_path: Option<PathBuf>,
    pub tree: Option<Hierarchy>,
    pub stats: Option<DatasetStats>,
    phase: LoadPhase,
    view: ViewSwitch,
    search_term: String,
    table_pager: Pager,
    cards_pager: Pager,
    /// 表格当前的过滤结果（不含根节点）
    table_items: Vec<NodeId>,
    /// 卡片当前的过滤结果（大类节点）
    card_items: Vec<NodeId>,
    highlighted: BTreeSet<NodeId>,
    navigator: Navigator,
}

impl AppState {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            table_pager: Pager::new(page_size),
            cards_pager: Pager::new(page_size),
            ..Self::default()
        }
    }

    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    pub fn begin_loading(&mut self) {
        self.phase = LoadPhase::Loading;
    }

    /// 加载JSON文件并构建层级模型
    pub fn load_file(&mut self, p: &Path) -> Result<(), AppError> {
        self.begin_loading();
        let dom = match read_json_file(p) {
            Ok(dom) => dom,
            Err(e) => {
                self.fail(&e);
                return Err(e);
            }
        };
        self.load_document(&dom)?;
        self.source_path = Some(p.to_path_buf());
        Ok(())
    }

    /// 由已解析的文档构建层级模型与统计；失败时不保留任何部分结果
    pub fn load_document(&mut self, dom: &Value) -> Result<(), AppError> {
        let tree = match Hierarchy::build(dom) {
            Ok(tree) => tree,
            Err(e) => {
                self.fail(&e);
                return Err(e);
            }
        };
        self.stats = Some(DatasetStats::compute(&tree));
        self.table_items = list_nodes(&tree);
        self.card_items = tree.divisions().to_vec();
        self.highlighted.clear();
        self.table_pager.reset();
        self.cards_pager.reset();
        tracing::info!("层级模型构建完成: {} 个节点", tree.len());
        self.tree = Some(tree);
        self.phase = LoadPhase::Ready;
        Ok(())
    }

    /// 记录致命错误；已有的数据一并丢弃
    pub fn fail(&mut self, e: &AppError) {
        tracing::error!("数据加载失败: {}", e);
        self.tree = None;
        self.stats = None;
        self.table_items.clear();
        self.card_items.clear();
        self.phase = LoadPhase::Failed(e.to_string());
    }

    pub fn hierarchy(&self) -> Result<&Hierarchy, AppError> {
        self.tree
            .as_ref()
            .ok_or_else(|| AppError::State("数据尚未加载".into()))
    }

    pub fn active_view(&self) -> ActiveView {
        self.view.active()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn table_items(&self) -> &[NodeId] {
        &self.table_items
    }

    pub fn card_items(&self) -> &[NodeId] {
        &self.card_items
    }

    pub fn table_pager(&self) -> &Pager {
        &self.table_pager
    }

    pub fn cards_pager(&self) -> &Pager {
        &self.cards_pager
    }

    pub fn highlighted(&self) -> &BTreeSet<NodeId> {
        &self.highlighted
    }

    pub fn pending_focus(&self) -> Option<NodeId> {
        self.navigator.pending()
    }

    /// 统一的事件分发表
    pub fn dispatch(&mut self, event: UiEvent, r: &mut dyn Renderer) {
        if self.tree.is_none() {
            tracing::warn!("数据未就绪，忽略事件: {:?}", event);
            return;
        }
        match event {
            UiEvent::NodeClicked(id) => self.toggle_node(id, r),
            UiEvent::NodeKey { id, key } => self.handle_node_key(id, key, r),
            UiEvent::RowClicked(code) | UiEvent::CardClicked(code) => {
                self.switch_view_and_focus(&code, r);
            }
            UiEvent::TabChanged(view) => self.switch_view(view, r),
            UiEvent::TabKey(key) => {
                let target = self.view.target_for_key(key);
                self.switch_view(target, r);
            }
            UiEvent::SearchChanged(term) => self.set_search(&term, r),
            UiEvent::PageChanged { view, delta } => self.change_page(view, delta, r),
            UiEvent::ExpandAll => self.expand_all(r),
            UiEvent::CollapseAll => self.collapse_all(r),
            UiEvent::LayoutReady => self.layout_ready(r),
        }
    }

    /// 首次绘制：显示当前视图并绘制其内容
    pub fn render_all(&mut self, r: &mut dyn Renderer) {
        r.show_view(self.view.active());
        self.render_tree(r);
        match self.view.active() {
            ActiveView::Tree => {}
            ActiveView::Table => self.render_table(r),
            ActiveView::Cards => self.render_cards(r),
        }
    }

    fn render_tree(&self, r: &mut dyn Renderer) {
        let Some(tree) = self.tree.as_ref() else {
            return;
        };
        let nodes = tree.visible_nodes();
        let links = tree.visible_links();
        r.render_tree(tree, &nodes, &links);
    }

    fn render_table(&mut self, r: &mut dyn Renderer) {
        let Some(tree) = self.tree.as_ref() else {
            return;
        };
        let items = self.table_pager.current(&self.table_items);
        r.render_page(
            tree,
            &PageView {
                view: ActiveView::Table,
                items,
                page: self.table_pager.page(),
                total_pages: self.table_pager.total_pages(),
            },
        );
    }

    fn render_cards(&mut self, r: &mut dyn Renderer) {
        let Some(tree) = self.tree.as_ref() else {
            return;
        };
        let items = self.cards_pager.current(&self.card_items);
        r.render_page(
            tree,
            &PageView {
                view: ActiveView::Cards,
                items,
                page: self.cards_pager.page(),
                total_pages: self.cards_pager.total_pages(),
            },
        );
    }

    /// 点击节点：单层切换
    pub fn toggle_node(&mut self, id: NodeId, r: &mut dyn Renderer) {
        if let Some(tree) = self.tree.as_mut() {
            tree.toggle(id);
        }
        self.render_tree(r);
    }

    fn handle_node_key(&mut self, id: NodeId, key: NodeKey, r: &mut dyn Renderer) {
        let Some(node) = self.tree.as_ref().and_then(|t| t.node(id)) else {
            return;
        };
        let should_toggle = match key {
            NodeKey::Activate => true,
            NodeKey::Expand => node.is_collapsed(),
            NodeKey::Collapse => node.is_expanded(),
        };
        if should_toggle {
            self.toggle_node(id, r);
        }
    }

    pub fn expand_all(&mut self, r: &mut dyn Renderer) {
        if let Some(tree) = self.tree.as_mut() {
            tree.expand_all();
        }
        self.render_tree(r);
    }

    pub fn collapse_all(&mut self, r: &mut dyn Renderer) {
        if let Some(tree) = self.tree.as_mut() {
            tree.collapse_all();
        }
        self.render_tree(r);
    }

    /// 更新搜索词并在当前视图上重新应用
    pub fn set_search(&mut self, term: &str, r: &mut dyn Renderer) {
        self.search_term = term.to_string();
        self.apply_search(r);
    }

    fn clear_highlights(&mut self, r: &mut dyn Renderer) {
        let Some(tree) = self.tree.as_ref() else {
            return;
        };
        for id in std::mem::take(&mut self.highlighted) {
            r.highlight(tree, id, false);
        }
    }

    fn mark_highlight(&mut self, id: NodeId, r: &mut dyn Renderer) {
        let Some(tree) = self.tree.as_ref() else {
            return;
        };
        self.highlighted.insert(id);
        r.highlight(tree, id, true);
    }

    /// 按当前视图执行搜索：树视图高亮并定位首个命中，列表视图过滤并回到第一页
    pub fn apply_search(&mut self, r: &mut dyn Renderer) {
        self.run_search(true, r);
    }

    /// `reveal` 为 false 时树视图只标记高亮，不展开、不居中
    fn run_search(&mut self, reveal: bool, r: &mut dyn Renderer) {
        self.clear_highlights(r);
        let Some(tree) = self.tree.as_ref() else {
            return;
        };
        let term = self.search_term.clone();

        match self.view.active() {
            ActiveView::Tree => {
                if query::Query::parse(&term).is_none() {
                    return;
                }
                let all = tree.descendants(ROOT);
                let matches = query::search(&term, tree, &all, SearchScope::Tree);
                tracing::info!("树视图搜索: {} (命中 {} 个节点)", term, matches.len());
                if !reveal {
                    for id in matches {
                        self.mark_highlight(id, r);
                    }
                    return;
                }
                let Some(&first) = matches.first() else {
                    return;
                };
                if let Some(tree) = self.tree.as_mut() {
                    navigation::expand_path_to(tree, first);
                }
                self.render_tree(r);
                if let Some(tree) = self.tree.as_ref() {
                    r.center_on(tree, first);
                }
                for id in matches {
                    self.mark_highlight(id, r);
                }
            }
            ActiveView::Table => {
                self.table_items = filter_list(tree, &term);
                tracing::info!("表格搜索: {:?} (显示 {} 行)", term, self.table_items.len());
                self.table_pager.reset();
                self.render_table(r);
            }
            ActiveView::Cards => {
                let results = filter_list(tree, &term);
                // 没有命中时不回退到全部大类，空页面本身就是"无结果"
                let owners: BTreeSet<NodeId> = results
                    .iter()
                    .filter_map(|&id| tree.division_of(id))
                    .collect();
                self.card_items = tree
                    .divisions()
                    .iter()
                    .copied()
                    .filter(|d| owners.contains(d))
                    .collect();
                tracing::info!("卡片搜索: {:?} (显示 {} 个大类)", term, self.card_items.len());
                self.cards_pager.reset();
                self.render_cards(r);
            }
        }
    }

    /// 列表视图翻页：先请求，再在渲染时钳制
    pub fn change_page(&mut self, view: ActiveView, delta: i64, r: &mut dyn Renderer) {
        match view {
            ActiveView::Table => {
                self.table_pager.change_page(delta);
                self.render_table(r);
            }
            ActiveView::Cards => {
                self.cards_pager.change_page(delta);
                self.render_cards(r);
            }
            ActiveView::Tree => {}
        }
    }

    /// 切换视图；目标为当前视图时不做任何事
    pub fn switch_view(&mut self, view: ActiveView, r: &mut dyn Renderer) {
        self.enter_view(view, true, r);
    }

    fn enter_view(&mut self, view: ActiveView, reveal: bool, r: &mut dyn Renderer) {
        if !self.view.switch_to(view) {
            return;
        }
        r.show_view(view);
        if view == ActiveView::Tree && !reveal {
            self.render_tree(r);
        }
        self.run_search(reveal, r);
    }

    /// 从表格或卡片跳转到树中的对应节点；未知编码直接忽略
    pub fn switch_view_and_focus(&mut self, code: &str, r: &mut dyn Renderer) -> Option<FocusRequest> {
        let found = match self.hierarchy() {
            Ok(tree) => navigation::find_by_code(tree, code),
            Err(e) => Err(e),
        };
        let id = match found {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!("忽略跳转请求: {}", e);
                return None;
            }
        };

        if self.view.active() != ActiveView::Tree {
            // 展开只属于目标节点的祖先链，搜索词的其他命中不得展开别的分支
            self.enter_view(ActiveView::Tree, false, r);
            self.navigator.defer(id);
            return Some(FocusRequest::Deferred(id));
        }
        self.complete_focus(id, r);
        Some(FocusRequest::Immediate(id))
    }

    /// 树视图布局完成：执行挂起的定位
    pub fn layout_ready(&mut self, r: &mut dyn Renderer) {
        if self.view.active() != ActiveView::Tree {
            return;
        }
        if let Some(id) = self.navigator.take_pending() {
            self.complete_focus(id, r);
        }
    }

    fn complete_focus(&mut self, id: NodeId, r: &mut dyn Renderer) {
        if let Some(tree) = self.tree.as_mut() {
            navigation::expand_path_to(tree, id);
        }
        self.render_tree(r);
        if let Some(tree) = self.tree.as_ref() {
            r.center_on(tree, id);
        }
        self.clear_highlights(r);
        self.mark_highlight(id, r);
    }
}

/// 列表视图的候选节点：除根节点外的全部节点
fn list_nodes(tree: &Hierarchy) -> Vec<NodeId> {
    tree.descendants(ROOT)
        .into_iter()
        .filter(|&id| tree.node(id).map(|n| n.depth > 0).unwrap_or(false))
        .collect()
}

/// 列表视图的过滤结果；空白搜索词返回全部
fn filter_list(tree: &Hierarchy, term: &str) -> Vec<NodeId> {
    let all = list_nodes(tree);
    if query::Query::parse(term).is_none() {
        return all;
    }
    query::search(term, tree, &all, SearchScope::List)
}
