//! 程序入口：初始化日志与配置，后台加载数据，并把 Slint 界面绑定到核心状态

use std::{
    cell::RefCell,
    collections::BTreeSet,
    rc::Rc,
    sync::mpsc,
    time::{Duration, Instant},
};

use anyhow::Context;
use serde_json::Value;
use slint::{ComponentHandle, Model, ModelRc, SharedString, Timer, TimerMode, VecModel};
use tracing_subscriber::fmt::SubscriberBuilder;

use sinco_explorer::config::AppConfig;
use sinco_explorer::model::data_core::{AppError, AppState, LoadPhase};
use sinco_explorer::model::hierarchy::{Hierarchy, NodeId};
use sinco_explorer::model::stats::{DatasetStats, DivisionCard, NodeDetails, TableRow};
use sinco_explorer::model::view_switch::{ActiveView, TabKey};
use sinco_explorer::utils::debounce::Debouncer;
use sinco_explorer::utils::fs::{read_json_file, PreferenceStore};
use sinco_explorer::utils::i18n::{Locale, Translations};
use sinco_explorer::vm::bridge::{NodeKey, PageView, Renderer, UiEvent};

slint::include_modules!();

/// 当前语言的界面文本
fn ui_text(t: &Translations) -> UiText {
    let s = |key: &str| SharedString::from(t.get(key));
    UiText {
        app_title: s("app.title"),
        search_placeholder: s("search.placeholder"),
        stats_total_occupations: s("stats.totalOccupations"),
        stats_divisions: s("stats.divisions"),
        stats_total_employees: s("stats.totalEmployees"),
        stats_avg_salary: s("stats.avgSalary"),
        stats_show: s("stats.show"),
        stats_hide: s("stats.hide"),
        view_tree: s("views.tree"),
        view_table: s("views.table"),
        view_cards: s("views.cards"),
        expand_all: s("actions.expandAll"),
        collapse_all: s("actions.collapseAll"),
        pager_prev: s("pager.prev"),
        pager_next: s("pager.next"),
        table_code: s("table.code"),
        table_name: s("table.name"),
        table_parent: s("table.parent"),
        table_salary: s("table.salary"),
        table_formality: s("table.formality"),
        table_employees: s("table.employees"),
        cards_occupations: s("cards.occupations"),
        cards_salary: s("cards.salary"),
        cards_employees: s("cards.employees"),
        cards_formality: s("cards.formality"),
        loading: s("loader.loading"),
        error_load: s("error.load"),
    }
}

impl From<TableRow> for TableRowData {
    fn from(row: TableRow) -> Self {
        Self {
            code: row.code.into(),
            name: row.name.into(),
            breadcrumb: row.breadcrumb.into(),
            parent: row.parent.into(),
            salary: row.salary.into(),
            salary_class: row.salary_class.as_str().into(),
            formality: row.formality.into(),
            employees: row.employees.into(),
        }
    }
}

impl From<DivisionCard> for CardData {
    fn from(card: DivisionCard) -> Self {
        Self {
            code: card.code.into(),
            title: card.title.into(),
            occupations: card.occupations.to_string().into(),
            salary: card.salary.into(),
            employees: card.employees.into(),
            formality: card.formality.into(),
        }
    }
}

/// Slint 渲染器：把核心发出的渲染指令写入界面模型
struct SlintRenderer {
    window: slint::Weak<AppWindow>,
    translations: Translations,
    tree_rows: Rc<VecModel<TreeRowData>>,
    table_rows: Rc<VecModel<TableRowData>>,
    cards: Rc<VecModel<CardData>>,
    /// 重绘后仍需保持的高亮
    lit: BTreeSet<NodeId>,
}

impl SlintRenderer {
    fn new(app: &AppWindow, translations: Translations) -> Self {
        let tree_rows = Rc::new(VecModel::default());
        let table_rows = Rc::new(VecModel::default());
        let cards = Rc::new(VecModel::default());
        app.set_tree_rows(ModelRc::from(tree_rows.clone()));
        app.set_table_rows(ModelRc::from(table_rows.clone()));
        app.set_cards(ModelRc::from(cards.clone()));
        app.set_texts(ui_text(&translations));
        Self {
            window: app.as_weak(),
            translations,
            tree_rows,
            table_rows,
            cards,
            lit: BTreeSet::new(),
        }
    }

    fn set_translations(&mut self, translations: Translations) {
        if let Some(app) = self.window.upgrade() {
            app.set_texts(ui_text(&translations));
        }
        self.translations = translations;
    }

    fn details_text(&self, d: &NodeDetails) -> String {
        let t = &self.translations;
        format!(
            "{}\n{}: {} | {}: {}\n{}: {} | {}: {} | {}: {}",
            d.name,
            t.get("tooltip.code"),
            d.code,
            t.get("tooltip.level"),
            t.get(d.level.resource_key()),
            t.get("table.salary"),
            d.salary,
            t.get("table.formality"),
            d.formality,
            t.get("table.employees"),
            d.employees,
        )
    }

    fn tree_row(&self, tree: &Hierarchy, id: NodeId) -> Option<TreeRowData> {
        let node = tree.node(id)?;
        let details = NodeDetails::of(tree, id)
            .map(|d| self.details_text(&d))
            .unwrap_or_default();
        Some(TreeRowData {
            id: id as i32,
            label: node.record.tree_label().into(),
            depth: node.depth as i32,
            has_children: !node.is_leaf(),
            expanded: node.is_expanded(),
            highlighted: self.lit.contains(&id),
            details: details.into(),
        })
    }

    fn row_index(&self, id: NodeId) -> Option<usize> {
        self.tree_rows.iter().position(|row| row.id as usize == id)
    }
}

impl Renderer for SlintRenderer {
    fn show_view(&mut self, view: ActiveView) {
        if let Some(app) = self.window.upgrade() {
            app.set_active_view(view.index() as i32);
        }
    }

    fn render_tree(&mut self, tree: &Hierarchy, nodes: &[NodeId], links: &[(NodeId, NodeId)]) {
        let rows: Vec<TreeRowData> = nodes.iter().filter_map(|&id| self.tree_row(tree, id)).collect();
        tracing::debug!("树重绘: {} 个节点, {} 条连线", rows.len(), links.len());
        self.tree_rows.set_vec(rows);
    }

    fn render_page(&mut self, tree: &Hierarchy, page: &PageView<'_>) {
        let Some(app) = self.window.upgrade() else {
            return;
        };
        match page.view {
            ActiveView::Table => {
                let rows: Vec<TableRowData> = page
                    .items
                    .iter()
                    .filter_map(|&id| TableRow::from_node(tree, id))
                    .map(TableRowData::from)
                    .collect();
                self.table_rows.set_vec(rows);
                app.set_table_page_label(page.label().into());
            }
            ActiveView::Cards => {
                let cards: Vec<CardData> = page
                    .items
                    .iter()
                    .filter_map(|&id| DivisionCard::summarize(tree, id))
                    .map(CardData::from)
                    .collect();
                self.cards.set_vec(cards);
                app.set_cards_page_label(page.label().into());
                app.set_cards_pager_visible(page.has_multiple_pages());
            }
            ActiveView::Tree => {}
        }
    }

    fn center_on(&mut self, _tree: &Hierarchy, id: NodeId) {
        let (Some(app), Some(idx)) = (self.window.upgrade(), self.row_index(id)) else {
            return;
        };
        let row_h = app.get_tree_row_height();
        let visible = app.get_tree_visible_height();
        let offset = (idx as f32 * row_h - (visible - row_h) / 2.0).max(0.0);
        app.set_tree_viewport_y(-offset);
        app.set_focused_row(idx as i32);
    }

    fn highlight(&mut self, _tree: &Hierarchy, id: NodeId, on: bool) {
        if on {
            self.lit.insert(id);
        } else {
            self.lit.remove(&id);
        }
        if let Some(idx) = self.row_index(id) {
            if let Some(mut row) = self.tree_rows.row_data(idx) {
                row.highlighted = on;
                self.tree_rows.set_row_data(idx, row);
            }
        }
    }
}

/// VM桥接器：管理UI与核心状态的交互
#[derive(Clone)]
struct ViewModelBridge {
    app_state: Rc<RefCell<AppState>>,
    renderer: Rc<RefCell<SlintRenderer>>,
    prefs: Rc<RefCell<PreferenceStore>>,
    search: Rc<RefCell<Debouncer<String>>>,
    /// 搜索防抖定时器；每次输入都重启它，之前未触发的调用随之作废
    search_timer: Rc<Timer>,
    config: Rc<AppConfig>,
}

impl ViewModelBridge {
    /// 创建新的VM桥接器并绑定所有回调
    fn new(app_window: &AppWindow, config: AppConfig, mut prefs: PreferenceStore) -> anyhow::Result<Self> {
        let translations = Translations::from_preferences(&mut prefs, config.default_language.as_deref())
            .context("加载语言资源失败")?;
        let locale_index = Locale::ALL
            .iter()
            .position(|l| *l == translations.locale())
            .unwrap_or(0);
        app_window.set_language_index(locale_index as i32);

        let bridge = Self {
            app_state: Rc::new(RefCell::new(AppState::with_page_size(config.page_size))),
            renderer: Rc::new(RefCell::new(SlintRenderer::new(app_window, translations))),
            prefs: Rc::new(RefCell::new(prefs)),
            search: Rc::new(RefCell::new(Debouncer::new(Duration::from_millis(
                config.search_debounce_ms,
            )))),
            search_timer: Rc::new(Timer::default()),
            config: Rc::new(config),
        };
        bridge.setup_callbacks(app_window);
        Ok(bridge)
    }

    /// 把事件交给核心状态处理
    fn dispatch(&self, event: UiEvent) {
        Self::dispatch_to(&self.app_state, &self.renderer, event);
    }

    fn dispatch_to(app_state: &RefCell<AppState>, renderer: &RefCell<SlintRenderer>, event: UiEvent) {
        let mut renderer = renderer.borrow_mut();
        app_state.borrow_mut().dispatch(event, &mut *renderer);
    }

    /// 跨视图跳转：视图切换后等待一帧布局再执行定位
    fn dispatch_with_focus(&self, event: UiEvent) {
        self.dispatch(event);
        if self.app_state.borrow().pending_focus().is_some() {
            let bridge = self.clone();
            Timer::single_shot(Duration::from_millis(self.config.focus_delay_ms), move || {
                bridge.dispatch(UiEvent::LayoutReady);
            });
        }
    }

    /// 设置所有UI回调函数
    fn setup_callbacks(&self, app_window: &AppWindow) {
        // === 树节点 ===
        {
            let bridge = self.clone();
            app_window.on_node_clicked(move |id| {
                if let Ok(id) = usize::try_from(id) {
                    bridge.dispatch(UiEvent::NodeClicked(id));
                }
            });
        }
        {
            let bridge = self.clone();
            app_window.on_node_key(move |id, key| {
                let key = match key.as_str() {
                    "activate" => NodeKey::Activate,
                    "expand" => NodeKey::Expand,
                    "collapse" => NodeKey::Collapse,
                    _ => return,
                };
                if let Ok(id) = usize::try_from(id) {
                    bridge.dispatch(UiEvent::NodeKey { id, key });
                }
            });
        }
        {
            let bridge = self.clone();
            app_window.on_expand_all(move || bridge.dispatch(UiEvent::ExpandAll));
        }
        {
            let bridge = self.clone();
            app_window.on_collapse_all(move || bridge.dispatch(UiEvent::CollapseAll));
        }

        // === 表格行 / 卡片点击：跳转到树 ===
        {
            let bridge = self.clone();
            app_window.on_row_clicked(move |code| {
                bridge.dispatch_with_focus(UiEvent::RowClicked(code.to_string()));
            });
        }
        {
            let bridge = self.clone();
            app_window.on_card_clicked(move |code| {
                bridge.dispatch_with_focus(UiEvent::CardClicked(code.to_string()));
            });
        }

        // === 标签页 ===
        {
            let bridge = self.clone();
            app_window.on_tab_changed(move |index| {
                if let Some(view) = usize::try_from(index).ok().and_then(ActiveView::from_index) {
                    bridge.dispatch(UiEvent::TabChanged(view));
                }
            });
        }
        {
            let bridge = self.clone();
            app_window.on_tab_key(move |key| {
                let key = match key.as_str() {
                    "next" => TabKey::Next,
                    "previous" => TabKey::Previous,
                    "first" => TabKey::First,
                    "last" => TabKey::Last,
                    _ => return,
                };
                bridge.dispatch(UiEvent::TabKey(key));
            });
        }

        // === 搜索（防抖） ===
        {
            let bridge = self.clone();
            app_window.on_search_edited(move |text| bridge.schedule_search(text.to_string()));
        }

        // === 分页 ===
        {
            let bridge = self.clone();
            app_window.on_page_changed(move |view, delta| {
                if let Some(view) = usize::try_from(view).ok().and_then(ActiveView::from_index) {
                    bridge.dispatch(UiEvent::PageChanged { view, delta: i64::from(delta) });
                }
            });
        }

        // === 语言 ===
        {
            let bridge = self.clone();
            app_window.on_language_selected(move |index| bridge.handle_language_selected(index));
        }
    }

    fn schedule_search(&self, term: String) {
        self.search.borrow_mut().schedule(term);
        let delay = self.search.borrow().delay();
        // 定时器自身由 bridge 持有，回调里只捕获状态，避免引用环
        let app_state = self.app_state.clone();
        let renderer = self.renderer.clone();
        let search = self.search.clone();
        self.search_timer.start(TimerMode::SingleShot, delay, move || {
            let term = search.borrow_mut().fire();
            if let Some(term) = term {
                Self::dispatch_to(&app_state, &renderer, UiEvent::SearchChanged(term));
            }
        });
    }

    fn handle_language_selected(&self, index: i32) {
        let Some(locale) = usize::try_from(index).ok().and_then(|i| Locale::ALL.get(i).copied()) else {
            return;
        };
        let result = Translations::from_preferences(&mut self.prefs.borrow_mut(), Some(locale.code()));
        match result {
            Ok(t) => {
                self.renderer.borrow_mut().set_translations(t);
                // 悬停提示中的层级名称随语言变化
                if self.app_state.borrow().phase() == &LoadPhase::Ready {
                    let mut renderer = self.renderer.borrow_mut();
                    self.app_state.borrow_mut().render_all(&mut *renderer);
                }
            }
            Err(e) => tracing::warn!("语言切换失败: {}", e),
        }
    }

    /// 后台线程读取数据文件，完成后回到事件循环构建层级模型
    fn start_loading(&self, app_window: &AppWindow) {
        let path = self.config.data_path.clone();
        self.app_state.borrow_mut().begin_loading();
        app_window.set_loading(true);
        tracing::info!("开始加载数据: {}", path.display());

        let started = Instant::now();
        let min_display = Duration::from_millis(self.config.loader_min_display_ms);
        let (tx, rx) = mpsc::channel::<Result<Value, AppError>>();
        {
            let bridge = self.clone();
            let app_window_weak = app_window.as_weak();
            app_window.on_data_ready(move || {
                let Ok(result) = rx.try_recv() else {
                    return;
                };
                // 加载提示至少显示 min_display
                let remaining = min_display.saturating_sub(started.elapsed());
                let bridge = bridge.clone();
                let app_window_weak = app_window_weak.clone();
                Timer::single_shot(remaining, move || {
                    if let Some(app_window) = app_window_weak.upgrade() {
                        bridge.finish_loading(&app_window, result, started);
                    }
                });
            });
        }

        let app_window_weak = app_window.as_weak();
        let worker_path = path.clone();
        std::thread::spawn(move || {
            let result = read_json_file(&worker_path);
            if tx.send(result).is_err() {
                return;
            }
            // 使用invoke_from_event_loop安全地通知UI线程
            let _ = slint::invoke_from_event_loop(move || {
                if let Some(app_window) = app_window_weak.upgrade() {
                    app_window.invoke_data_ready();
                }
            });
        });
        self.app_state.borrow_mut().source_path = Some(path);
    }

    fn finish_loading(&self, app_window: &AppWindow, result: Result<Value, AppError>, started: Instant) {
        let outcome = match result {
            Ok(dom) => self.app_state.borrow_mut().load_document(&dom),
            Err(e) => {
                self.app_state.borrow_mut().fail(&e);
                Err(e)
            }
        };
        app_window.set_loading(false);

        // 错误详情只进日志（AppState::fail 已记录），界面只显示本地化提示
        if outcome.is_err() {
            app_window.set_load_failed(true);
            return;
        }

        let stats = self.app_state.borrow().stats.clone();
        if let Some(stats) = stats {
            Self::show_stats(app_window, &stats);
        }
        let mut renderer = self.renderer.borrow_mut();
        self.app_state.borrow_mut().render_all(&mut *renderer);
        tracing::info!("数据加载完成，耗时: {:.2}ms", started.elapsed().as_secs_f64() * 1000.0);
    }

    fn show_stats(app_window: &AppWindow, stats: &DatasetStats) {
        app_window.set_stat_occupations(stats.occupations_text().into());
        app_window.set_stat_divisions(stats.divisions_text().into());
        app_window.set_stat_employees(stats.employees_text().into());
        app_window.set_stat_salary(stats.avg_salary_text().into());
    }
}

fn main() -> anyhow::Result<()> {
    // 初始化日志输出
    let _ = SubscriberBuilder::default()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    let config = AppConfig::load()
        .context("读取配置失败")?
        .with_args(std::env::args().skip(1));
    let prefs = PreferenceStore::open(&config.preferences_path).context("读取偏好设置失败")?;

    let app = AppWindow::new().map_err(|e| anyhow::anyhow!("UI 初始化失败: {}", e))?;
    let bridge = ViewModelBridge::new(&app, config, prefs)?;
    bridge.start_loading(&app);

    tracing::info!("应用启动成功，UI已初始化");
    app.run().map_err(|e| anyhow::anyhow!("事件循环异常退出: {}", e))?;
    Ok(())
}
