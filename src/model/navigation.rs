//! 导航协调器：按编码定位节点，只展开通往它的祖先链，并请求渲染层居中
//!
//! 跨视图跳转需要等树视图完成布局后才能定位，因此把"定位"暂存为待办，
//! 由渲染层报告布局完成时再执行。

use crate::model::data_core::AppError;
use crate::model::hierarchy::{Hierarchy, NodeId};

/// 按编码精确查找
pub fn find_by_code(tree: &Hierarchy, code: &str) -> Result<NodeId, AppError> {
    tree.find_by_code(code)
        .ok_or_else(|| AppError::NotFound(code.to_string()))
}

/// 展开节点自身及其到根之间所有处于折叠状态的祖先（仅单层提升），其他分支不变
///
/// 返回实际被展开的节点。
pub fn expand_path_to(tree: &mut Hierarchy, id: NodeId) -> Vec<NodeId> {
    let mut opened = Vec::new();
    for ancestor in tree.ancestors(id) {
        let collapsed = tree
            .node(ancestor)
            .map(|n| !n.hidden_children().is_empty())
            .unwrap_or(false);
        if collapsed {
            tree.expand(ancestor);
            opened.push(ancestor);
        }
    }
    opened
}

/// 定位请求的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusRequest {
    /// 已在树视图，可立即定位
    Immediate(NodeId),
    /// 需要先切换到树视图，等布局完成
    Deferred(NodeId),
}

/// 保存尚未完成的定位（单槽，新请求覆盖旧请求）
#[derive(Debug, Default)]
pub struct Navigator {
    pending: Option<NodeId>,
}

impl Navigator {
    pub fn defer(&mut self, id: NodeId) {
        if let Some(prev) = self.pending.replace(id) {
            tracing::debug!("丢弃未完成的定位请求: 节点 {}", prev);
        }
    }

    pub fn pending(&self) -> Option<NodeId> {
        self.pending
    }

    /// 布局完成后取出待定位节点
    pub fn take_pending(&mut self) -> Option<NodeId> {
        self.pending.take()
    }
}
