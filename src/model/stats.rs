//! 数据集统计与各视图的行/卡片展示数据

use crate::model::hierarchy::{Hierarchy, NodeId, ROOT};
use crate::model::record::{decimal_text, format_amount, format_count, OccupationLevel, SalaryClass};

pub const NOT_AVAILABLE: &str = "N/A";

/// 顶部统计栏，基于结构叶子节点计算
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetStats {
    pub total_occupations: usize,
    pub divisions: usize,
    pub total_employees: u64,
    /// 按就业人数加权的平均薪资（四舍五入）
    pub avg_salary: u64,
}

impl DatasetStats {
    pub fn compute(tree: &Hierarchy) -> Self {
        let leaves = tree.leaves(ROOT);
        let mut total_employees = 0u64;
        let mut weighted = 0f64;
        for id in &leaves {
            let Some(node) = tree.node(*id) else {
                continue;
            };
            let employees = node.record.employees.unwrap_or(0);
            total_employees += employees;
            weighted += node.record.avg_salary.unwrap_or(0.0) * employees as f64;
        }
        let avg_salary = if total_employees > 0 {
            (weighted / total_employees as f64).round() as u64
        } else {
            0
        };
        Self {
            total_occupations: leaves.len(),
            divisions: tree.divisions().len(),
            total_employees,
            avg_salary,
        }
    }

    pub fn occupations_text(&self) -> String {
        format_count(self.total_occupations as u64)
    }

    pub fn divisions_text(&self) -> String {
        self.divisions.to_string()
    }

    pub fn employees_text(&self) -> String {
        format_count(self.total_employees)
    }

    pub fn avg_salary_text(&self) -> String {
        format!("${} MXN", format_count(self.avg_salary))
    }
}

fn salary_text(v: Option<f64>) -> String {
    format!(
        "{} MXN",
        v.map(format_amount).unwrap_or_else(|| NOT_AVAILABLE.to_string())
    )
}

fn formality_text(v: Option<f64>) -> String {
    v.map(|f| format!("{}%", decimal_text(f)))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn employees_text(v: Option<u64>) -> String {
    v.map(format_count)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// 表格视图中的一行
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub code: String,
    pub name: String,
    /// 根到节点的完整名称路径，用作悬停提示
    pub breadcrumb: String,
    pub parent: String,
    pub salary: String,
    pub salary_class: SalaryClass,
    pub formality: String,
    pub employees: String,
}

impl TableRow {
    pub fn from_node(tree: &Hierarchy, id: NodeId) -> Option<Self> {
        let node = tree.node(id)?;
        let rec = &node.record;
        let parent = node
            .parent
            .and_then(|p| tree.node(p))
            .map(|p| p.record.short_name().to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        Some(Self {
            code: rec.code.clone(),
            name: rec.name.clone(),
            breadcrumb: tree.breadcrumb(id),
            parent,
            salary: salary_text(rec.avg_salary),
            salary_class: SalaryClass::of(rec.avg_salary),
            formality: formality_text(rec.formality),
            employees: employees_text(rec.employees),
        })
    }
}

/// 卡片视图中的大类卡片
#[derive(Debug, Clone, PartialEq)]
pub struct DivisionCard {
    pub code: String,
    pub title: String,
    /// 该大类下的结构叶子数
    pub occupations: usize,
    pub salary: String,
    pub employees: String,
    pub formality: String,
}

impl DivisionCard {
    pub fn summarize(tree: &Hierarchy, id: NodeId) -> Option<Self> {
        let node = tree.node(id)?;
        let leaves = tree.leaves(id);
        let total: u64 = leaves
            .iter()
            .filter_map(|&l| tree.node(l))
            .map(|n| n.record.employees.unwrap_or(0))
            .sum();
        Some(Self {
            code: node.record.code.clone(),
            title: node.record.name.clone(),
            occupations: leaves.len(),
            salary: salary_text(node.record.avg_salary),
            employees: format_count(total),
            formality: formality_text(node.record.formality),
        })
    }
}

/// 树节点悬停提示
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDetails {
    pub name: String,
    pub code: String,
    pub level: OccupationLevel,
    pub salary: String,
    pub formality: String,
    pub employees: String,
}

impl NodeDetails {
    pub fn of(tree: &Hierarchy, id: NodeId) -> Option<Self> {
        let rec = &tree.node(id)?.record;
        Some(Self {
            name: rec.name.clone(),
            code: rec.code.clone(),
            level: rec.level(),
            salary: salary_text(rec.avg_salary),
            formality: formality_text(rec.formality),
            employees: employees_text(rec.employees),
        })
    }
}
