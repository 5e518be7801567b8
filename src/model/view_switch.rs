//! 视图切换控制器：树、表格、卡片三者同一时刻只有一个处于激活状态

/// 三种视图
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Tree,
    Table,
    Cards,
}

impl ActiveView {
    /// 标签页顺序
    pub const ALL: [Self; 3] = [Self::Tree, Self::Table, Self::Cards];

    pub fn key(self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::Table => "table",
            Self::Cards => "cards",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Tree => 0,
            Self::Table => 1,
            Self::Cards => 2,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }
}

/// 标签页上的键盘操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabKey {
    Next,
    Previous,
    First,
    Last,
}

#[derive(Debug, Default)]
pub struct ViewSwitch {
    active: ActiveView,
}

impl ViewSwitch {
    pub fn active(&self) -> ActiveView {
        self.active
    }

    /// 切换到目标视图；目标即当前视图时返回 false 且不做任何事
    pub fn switch_to(&mut self, view: ActiveView) -> bool {
        if self.active == view {
            return false;
        }
        tracing::info!("视图切换: {} -> {}", self.active.key(), view.key());
        self.active = view;
        true
    }

    /// 键盘导航的目标标签（循环）
    pub fn target_for_key(&self, key: TabKey) -> ActiveView {
        let n = ActiveView::ALL.len();
        let cur = self.active.index();
        let next = match key {
            TabKey::Next => (cur + 1) % n,
            TabKey::Previous => (cur + n - 1) % n,
            TabKey::First => 0,
            TabKey::Last => n - 1,
        };
        ActiveView::ALL[next]
    }
}
