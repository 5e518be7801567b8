//! 数据文档校验：与构建层级模型使用相同的规则，但收集全部问题而不是遇错即停

use std::collections::HashMap;

use serde_json::Value;

use crate::model::record::OccupationRecord;

/// 校验整份文档，返回全部问题（为空表示通过）
pub fn validate_document(document: &Value) -> Vec<String> {
    let mut problems = Vec::new();
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut stack = vec![(document, "$".to_string())];

    while let Some((v, path)) = stack.pop() {
        match OccupationRecord::from_value(v, &path) {
            Ok(record) => {
                if let Some(first) = seen.get(&record.code) {
                    problems.push(format!("{}: 编码 {} 重复（首次出现于 {}）", path, record.code, first));
                } else {
                    seen.insert(record.code, path.clone());
                }
            }
            Err(msg) => problems.push(msg),
        }

        match v.get("children") {
            None | Some(Value::Null) => {}
            Some(Value::Array(children)) => {
                // 逆序入栈，保证按文档顺序报告
                for (idx, child) in children.iter().enumerate().rev() {
                    stack.push((child, format!("{}.children[{}]", path, idx)));
                }
            }
            Some(_) => problems.push(format!("{}: children 必须是数组", path)),
        }
    }
    problems
}
