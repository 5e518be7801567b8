//! 层级模型：由源文档一次性构建的节点树，记录每个节点的展开/折叠状态
//!
//! 节点存放在按先序遍历编号的数组中，`NodeId` 即数组下标，构建后永不变化，
//! 渲染层用它作为跨重绘的身份键。

use std::collections::HashMap;

use serde_json::Value;

use crate::model::data_core::AppError;
use crate::model::record::OccupationRecord;

/// 节点身份（构建时按遍历顺序分配）
pub type NodeId = usize;

/// 根节点总是第一个被访问
pub const ROOT: NodeId = 0;

/// 子节点的可见性划分：真实子节点只存在于其中一侧
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildState {
    Leaf,
    Expanded(Vec<NodeId>),
    Collapsed(Vec<NodeId>),
}

#[derive(Debug, Clone)]
pub struct HierarchyNode {
    pub id: NodeId,
    pub record: OccupationRecord,
    /// 父节点下标（根节点为 None）
    pub parent: Option<NodeId>,
    /// 根为 0
    pub depth: u32,
    pub children: ChildState,
}

impl HierarchyNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self.children, ChildState::Leaf)
    }

    pub fn is_expanded(&self) -> bool {
        matches!(self.children, ChildState::Expanded(_))
    }

    pub fn is_collapsed(&self) -> bool {
        matches!(self.children, ChildState::Collapsed(_))
    }

    pub fn visible_children(&self) -> &[NodeId] {
        match &self.children {
            ChildState::Expanded(c) => c,
            _ => &[],
        }
    }

    pub fn hidden_children(&self) -> &[NodeId] {
        match &self.children {
            ChildState::Collapsed(c) => c,
            _ => &[],
        }
    }

    /// 不论当前展开状态的全部子节点
    pub fn all_children(&self) -> &[NodeId] {
        match &self.children {
            ChildState::Expanded(c) | ChildState::Collapsed(c) => c,
            ChildState::Leaf => &[],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Hierarchy {
    nodes: Vec<HierarchyNode>,
    by_code: HashMap<String, NodeId>,
}

impl Hierarchy {
    /// 从源文档构建节点树；结构不合法或编码重复时立即失败
    ///
    /// 构建完成后根节点展开，其余非叶子节点全部折叠，初始只显示顶层大类。
    pub fn build(document: &Value) -> Result<Self, AppError> {
        let mut out = Self {
            nodes: Vec::with_capacity(1024),
            by_code: HashMap::new(),
        };
        // 下标与 nodes 对齐，遍历结束后再写入 ChildState
        let mut child_ids: Vec<Vec<NodeId>> = Vec::with_capacity(1024);
        // 子节点逆序压栈，弹出顺序即先序
        let mut stack: Vec<(&Value, String, Option<NodeId>, u32)> = vec![(document, "$".to_string(), None, 0)];

        while let Some((v, path, parent, depth)) = stack.pop() {
            let record = OccupationRecord::from_value(v, &path).map_err(AppError::MalformedData)?;
            let id = out.nodes.len();
            if let Some(prev) = out.by_code.insert(record.code.clone(), id) {
                return Err(AppError::MalformedData(format!(
                    "{}: 编码 {} 重复（首次出现于节点 {}）",
                    path, record.code, prev
                )));
            }
            out.nodes.push(HierarchyNode {
                id,
                record,
                parent,
                depth,
                children: ChildState::Leaf,
            });
            child_ids.push(Vec::new());
            if let Some(p) = parent {
                child_ids[p].push(id);
            }

            let children = match v.get("children") {
                None | Some(Value::Null) => continue,
                Some(Value::Array(arr)) => arr,
                Some(_) => {
                    return Err(AppError::MalformedData(format!(
                        "{}: children 必须是数组",
                        path
                    )))
                }
            };
            for (idx, child) in children.iter().enumerate().rev() {
                let child_path = format!("{}.children[{}]", path, idx);
                stack.push((child, child_path, Some(id), depth + 1));
            }
        }

        for (id, ids) in child_ids.into_iter().enumerate() {
            if ids.is_empty() {
                continue;
            }
            out.nodes[id].children = if id == ROOT {
                ChildState::Expanded(ids)
            } else {
                ChildState::Collapsed(ids)
            };
        }
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> &HierarchyNode {
        &self.nodes[ROOT]
    }

    pub fn node(&self, id: NodeId) -> Option<&HierarchyNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[HierarchyNode] {
        &self.nodes
    }

    /// 按编码精确查找（包含折叠子树中的节点）
    pub fn find_by_code(&self, code: &str) -> Option<NodeId> {
        self.by_code.get(code).copied()
    }

    /// 顶层大类（根节点的子节点）
    pub fn divisions(&self) -> &[NodeId] {
        self.root().all_children()
    }

    /// 折叠整支：若已展开则收起，并逐层收起刚被隐藏的子节点
    pub fn collapse(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let Some(node) = self.nodes.get_mut(cur) else {
                continue;
            };
            let ChildState::Expanded(children) = &mut node.children else {
                continue;
            };
            let children = std::mem::take(children);
            stack.extend(children.iter().copied());
            node.children = ChildState::Collapsed(children);
        }
    }

    /// 单层展开：只恢复直接子节点，孙节点保持原状态
    pub fn expand(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if let ChildState::Collapsed(children) = &mut node.children {
            let children = std::mem::take(children);
            node.children = ChildState::Expanded(children);
        }
    }

    /// 展开整棵子树（"全部展开"）
    pub fn expand_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            self.expand(cur);
            if let Some(node) = self.nodes.get(cur) {
                stack.extend(node.visible_children().iter().rev());
            }
        }
    }

    /// 单层切换：展开⇄折叠，不递归
    pub fn toggle(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.children = match std::mem::replace(&mut node.children, ChildState::Leaf) {
            ChildState::Expanded(c) => ChildState::Collapsed(c),
            ChildState::Collapsed(c) => ChildState::Expanded(c),
            ChildState::Leaf => ChildState::Leaf,
        };
    }

    pub fn expand_all(&mut self) {
        self.expand_subtree(ROOT);
    }

    /// 折叠根以下所有分支，根本身保持展开
    pub fn collapse_all(&mut self) {
        let divisions = self.divisions().to_vec();
        for id in divisions {
            self.collapse(id);
        }
    }

    /// 节点自身及其全部后代（不论展开状态），先序
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let Some(node) = self.nodes.get(cur) else {
                continue;
            };
            out.push(cur);
            stack.extend(node.all_children().iter().rev());
        }
        out
    }

    /// 结构上的叶子节点（与展开状态无关）
    pub fn leaves(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&n| self.nodes[n].is_leaf())
            .collect()
    }

    /// 节点自身到根的祖先链
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.nodes.get(id).map(|n| n.id);
        while let Some(c) = cur {
            out.push(c);
            cur = self.nodes[c].parent;
        }
        out
    }

    /// 节点所属的顶层大类（深度为 1 的祖先）；根节点没有
    pub fn division_of(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .into_iter()
            .find(|&a| self.nodes[a].depth == 1)
    }

    /// 当前可见的节点（只经过展开的子节点），先序；供树视图绘制
    pub fn visible_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![ROOT];
        while let Some(cur) = stack.pop() {
            let Some(node) = self.nodes.get(cur) else {
                continue;
            };
            out.push(cur);
            stack.extend(node.visible_children().iter().rev());
        }
        out
    }

    /// 可见的父子连线
    pub fn visible_links(&self) -> Vec<(NodeId, NodeId)> {
        self.visible_nodes()
            .into_iter()
            .flat_map(|p| self.nodes[p].visible_children().iter().map(move |&c| (p, c)))
            .collect()
    }

    /// 祖先节点名称（根→节点）以 " > " 连接
    pub fn breadcrumb(&self, id: NodeId) -> String {
        let mut names: Vec<&str> = self
            .ancestors(id)
            .into_iter()
            .map(|a| self.nodes[a].record.name.as_str())
            .collect();
        names.reverse();
        names.join(" > ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// 两个大类，第一个大类下有两层
    fn sample() -> Value {
        json!({
            "code": "0",
            "name": "SINCO",
            "children": [
                {
                    "code": "1",
                    "name": "División 1: Directores",
                    "children": [
                        {
                            "code": "11",
                            "name": "Grupo: Legisladores",
                            "children": [
                                {"code": "111", "name": "Subgrupo: Funcionarios", "children": [
                                    {"code": "1111", "name": "Senadores", "employees": 128, "avgSalary": 95000}
                                ]},
                                {"code": "112", "name": "Subgrupo: Directores", "employees": 40}
                            ]
                        }
                    ]
                },
                {
                    "code": "2",
                    "name": "División 2: Profesionistas",
                    "children": [
                        {"code": "21", "name": "Grupo: Investigadores", "employees": 10}
                    ]
                }
            ]
        })
    }

    fn count_records(v: &Value) -> usize {
        1 + v
            .get("children")
            .and_then(|c| c.as_array())
            .map(|arr| arr.iter().map(count_records).sum())
            .unwrap_or(0)
    }

    #[test]
    fn test_build_assigns_distinct_sequential_ids() {
        let doc = sample();
        let tree = Hierarchy::build(&doc).unwrap();

        assert_eq!(tree.len(), count_records(&doc));
        let mut ids: Vec<NodeId> = tree.nodes().iter().map(|n| n.id).collect();
        ids.dedup();
        assert_eq!(ids, (0..tree.len()).collect::<Vec<_>>(), "编号应按先序连续分配");

        // 先序遍历顺序
        let codes: Vec<&str> = tree.nodes().iter().map(|n| n.record.code.as_str()).collect();
        assert_eq!(codes, vec!["0", "1", "11", "111", "1111", "112", "2", "21"]);
        assert_eq!(tree.node(4).unwrap().depth, 4);
        assert_eq!(tree.node(4).unwrap().parent, Some(3));
    }

    #[test]
    fn test_initial_state_shows_only_divisions() {
        let tree = Hierarchy::build(&sample()).unwrap();

        assert!(tree.root().is_expanded());
        for node in tree.nodes().iter().filter(|n| n.depth >= 1) {
            assert!(node.visible_children().is_empty(), "节点 {} 初始应折叠", node.record.code);
            if !node.is_leaf() {
                assert!(!node.hidden_children().is_empty());
            }
        }
        let visible: Vec<&str> = tree
            .visible_nodes()
            .into_iter()
            .map(|id| tree.node(id).unwrap().record.code.as_str())
            .collect();
        assert_eq!(visible, vec!["0", "1", "2"]);
        assert_eq!(tree.visible_links(), vec![(0, 1), (0, 6)]);
    }

    #[test]
    fn test_toggle_flips_one_level_only() {
        let mut tree = Hierarchy::build(&sample()).unwrap();
        let div = tree.find_by_code("1").unwrap();
        let group = tree.find_by_code("11").unwrap();

        tree.toggle(div);
        assert!(tree.node(div).unwrap().is_expanded());
        assert!(tree.node(group).unwrap().is_collapsed(), "孙节点不受影响");

        tree.toggle(group);
        tree.toggle(div);
        assert!(tree.node(div).unwrap().is_collapsed());
        assert!(tree.node(group).unwrap().is_expanded(), "单层折叠不递归");

        // 叶子节点切换无效果
        let leaf = tree.find_by_code("1111").unwrap();
        tree.toggle(leaf);
        assert!(tree.node(leaf).unwrap().is_leaf());
    }

    #[test]
    fn test_collapse_closes_whole_branch() {
        let mut tree = Hierarchy::build(&sample()).unwrap();
        tree.expand_all();
        assert!(tree.nodes().iter().all(|n| !n.is_collapsed()));
        assert_eq!(tree.visible_nodes().len(), tree.len());

        let div = tree.find_by_code("1").unwrap();
        tree.collapse(div);
        for id in tree.descendants(div) {
            let node = tree.node(id).unwrap();
            assert!(node.visible_children().is_empty());
        }
        // 另一大类保持展开
        assert!(tree.node(tree.find_by_code("2").unwrap()).unwrap().is_expanded());
    }

    #[test]
    fn test_collapse_all_keeps_root_expanded() {
        let mut tree = Hierarchy::build(&sample()).unwrap();
        tree.expand_all();
        tree.collapse_all();
        assert!(tree.root().is_expanded());
        assert_eq!(tree.visible_nodes().len(), 3);
    }

    #[test]
    fn test_descendants_ignore_expand_state() {
        let tree = Hierarchy::build(&sample()).unwrap();
        assert_eq!(tree.descendants(ROOT).len(), tree.len());
        let div = tree.find_by_code("1").unwrap();
        assert_eq!(tree.descendants(div), vec![1, 2, 3, 4, 5]);
        let leaves: Vec<&str> = tree
            .leaves(ROOT)
            .into_iter()
            .map(|id| tree.node(id).unwrap().record.code.as_str())
            .collect();
        assert_eq!(leaves, vec!["1111", "112", "21"]);
    }

    #[test]
    fn test_ancestors_and_breadcrumb() {
        let tree = Hierarchy::build(&sample()).unwrap();
        let leaf = tree.find_by_code("1111").unwrap();
        assert_eq!(tree.ancestors(leaf), vec![4, 3, 2, 1, 0]);
        assert_eq!(tree.division_of(leaf), Some(1));
        assert_eq!(tree.division_of(ROOT), None);
        assert_eq!(
            tree.breadcrumb(2),
            "SINCO > División 1: Directores > Grupo: Legisladores"
        );
    }

    #[test]
    fn test_build_rejects_malformed_children() {
        let doc = json!({"code": "0", "name": "root", "children": {"code": "1"}});
        let err = Hierarchy::build(&doc).unwrap_err();
        assert!(matches!(err, AppError::MalformedData(_)));
    }

    #[test]
    fn test_build_rejects_duplicate_codes() {
        let doc = json!({"code": "0", "name": "root", "children": [
            {"code": "1", "name": "a"},
            {"code": "1", "name": "b"}
        ]});
        let err = Hierarchy::build(&doc).unwrap_err();
        match err {
            AppError::MalformedData(msg) => assert!(msg.contains("重复")),
            other => panic!("意外的错误类型: {:?}", other),
        }
    }

    #[test]
    fn test_deep_chain_builds_and_collapses() {
        let depth = 2000;
        let mut doc = json!({"code": format!("n{}", depth), "name": "hoja"});
        for i in (1..depth).rev() {
            doc = json!({"code": format!("n{}", i), "name": format!("nivel {}", i), "children": [doc]});
        }
        let doc = json!({"code": "0", "name": "SINCO", "children": [doc]});

        let mut tree = Hierarchy::build(&doc).unwrap();
        assert_eq!(tree.len(), depth + 1);
        let last = tree.find_by_code(&format!("n{}", depth)).unwrap();
        assert_eq!(last, depth, "先序编号");
        assert_eq!(tree.node(last).unwrap().depth as usize, depth);
        assert_eq!(tree.visible_nodes().len(), 2);

        tree.expand_all();
        assert_eq!(tree.visible_nodes().len(), depth + 1);

        tree.collapse_all();
        assert_eq!(tree.visible_nodes().len(), 2);
        assert!(tree.nodes().iter().skip(1).all(|n| !n.is_expanded()));
    }

    #[test]
    fn test_build_rejects_empty_code() {
        let doc = json!({"code": "0", "name": "root", "children": [{"code": " ", "name": "x"}]});
        assert!(matches!(Hierarchy::build(&doc), Err(AppError::MalformedData(_))));
    }
}
