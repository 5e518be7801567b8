//! 查询引擎：大小写不敏感的子串匹配，与结果的展示方式无关

use crate::model::hierarchy::{Hierarchy, NodeId};

/// 搜索范围：树视图只比对名称与编码，列表视图（表格/卡片）额外比对薪资
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Tree,
    List,
}

/// 规范化后的搜索词（已去除首尾空白并转为小写，且非空）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    /// 空白搜索词返回 None，表示"不过滤"
    pub fn parse(term: &str) -> Option<Self> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            None
        } else {
            Some(Self(term))
        }
    }

    pub fn matches(&self, tree: &Hierarchy, id: NodeId, scope: SearchScope) -> bool {
        let Some(node) = tree.node(id) else {
            return false;
        };
        let rec = &node.record;
        if rec.name.to_lowercase().contains(&self.0) || rec.code.to_lowercase().contains(&self.0) {
            return true;
        }
        scope == SearchScope::List
            && rec
                .salary_text()
                .map(|s| s.contains(&self.0))
                .unwrap_or(false)
    }
}

/// 按输入顺序返回命中的节点；空白搜索词返回空集合
pub fn search(term: &str, tree: &Hierarchy, nodes: &[NodeId], scope: SearchScope) -> Vec<NodeId> {
    match Query::parse(term) {
        Some(q) => nodes
            .iter()
            .copied()
            .filter(|&id| q.matches(tree, id, scope))
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::hierarchy::ROOT;
    use serde_json::json;

    fn tree() -> Hierarchy {
        Hierarchy::build(&json!({
            "code": "0",
            "name": "Raíz",
            "children": [
                {"code": "1", "name": "División: Funcionarios", "children": [
                    {"code": "11", "name": "Legisladores", "avgSalary": 45500}
                ]},
                {"code": "2", "name": "División: Profesionistas", "children": [
                    {"code": "21", "name": "Médicos", "avgSalary": 12000.5}
                ]}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_search_is_case_insensitive_and_trimmed() {
        let t = tree();
        let all = t.descendants(ROOT);
        let hits = search("  LEGIS ", &t, &all, SearchScope::Tree);
        assert_eq!(hits, vec![t.find_by_code("11").unwrap()]);
    }

    #[test]
    fn test_search_matches_code_substring() {
        let t = tree();
        let all = t.descendants(ROOT);
        let hits = search("2", &t, &all, SearchScope::Tree);
        let codes: Vec<&str> = hits.iter().map(|&id| t.node(id).unwrap().record.code.as_str()).collect();
        assert_eq!(codes, vec!["2", "21"]);
    }

    #[test]
    fn test_salary_only_searched_in_list_scope() {
        let t = tree();
        let all = t.descendants(ROOT);
        assert!(search("45500", &t, &all, SearchScope::Tree).is_empty());
        assert_eq!(search("45500", &t, &all, SearchScope::List).len(), 1);
        assert_eq!(search("12000.5", &t, &all, SearchScope::List).len(), 1);
    }

    #[test]
    fn test_blank_term_matches_nothing() {
        let t = tree();
        let all = t.descendants(ROOT);
        assert!(search("", &t, &all, SearchScope::List).is_empty());
        assert!(search("   ", &t, &all, SearchScope::Tree).is_empty());
        assert!(Query::parse("\t").is_none());
    }

    #[test]
    fn test_results_keep_input_order() {
        let t = tree();
        let mut all = t.descendants(ROOT);
        all.reverse();
        let hits = search("división", &t, &all, SearchScope::Tree);
        assert_eq!(hits, vec![t.find_by_code("2").unwrap(), t.find_by_code("1").unwrap()]);
    }
}
