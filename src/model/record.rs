//! 职业记录：源文档中的单条分类项及其展示辅助

use serde_json::Value;

/// 分类层级（由编码长度决定）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupationLevel {
    Division,
    GroupPrincipal,
    Subgroup,
    UnitGroup,
}

impl OccupationLevel {
    /// 按编码字符数推断层级：1 位为大类，2 位为主组，3 位为子组，4 位及以上为单元组
    pub fn from_code(code: &str) -> Self {
        match code.chars().count() {
            0 | 1 => Self::Division,
            2 => Self::GroupPrincipal,
            3 => Self::Subgroup,
            _ => Self::UnitGroup,
        }
    }

    /// 对应的本地化资源键
    pub fn resource_key(self) -> &'static str {
        match self {
            Self::Division => "level.division",
            Self::GroupPrincipal => "level.groupPrincipal",
            Self::Subgroup => "level.subgroup",
            Self::UnitGroup => "level.unitGroup",
        }
    }
}

/// 薪资档位（表格徽章颜色）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalaryClass {
    Low,
    Medium,
    High,
}

impl SalaryClass {
    pub fn of(salary: Option<f64>) -> Self {
        match salary {
            Some(s) if s >= 20_000.0 => Self::High,
            Some(s) if s >= 10_000.0 => Self::Medium,
            _ => Self::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// 单个节点携带的数据（不含子节点，子节点由层级模型持有）
#[derive(Debug, Clone, PartialEq)]
pub struct OccupationRecord {
    pub code: String,
    pub name: String,
    pub avg_salary: Option<f64>,
    pub formality: Option<f64>,
    pub employees: Option<u64>,
}

impl OccupationRecord {
    /// 从 JSON 对象读取标量字段；`path` 仅用于错误信息
    pub fn from_value(v: &Value, path: &str) -> Result<Self, String> {
        let obj = v
            .as_object()
            .ok_or_else(|| format!("{}: 节点必须是对象", path))?;

        let code = match obj.get("code") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::String(_)) => return Err(format!("{}: code 不能为空", path)),
            Some(_) => return Err(format!("{}: code 必须是字符串", path)),
            None => return Err(format!("{}: 缺少 code", path)),
        };
        let name = match obj.get("name") {
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(format!("{}: name 必须是字符串", path)),
            None => return Err(format!("{}: 缺少 name", path)),
        };

        let avg_salary = optional_number(obj.get("avgSalary"), path, "avgSalary")?;
        if matches!(avg_salary, Some(s) if s < 0.0) {
            return Err(format!("{}: avgSalary 不能为负数", path));
        }
        let formality = optional_number(obj.get("formality"), path, "formality")?;
        if matches!(formality, Some(f) if !(0.0..=100.0).contains(&f)) {
            return Err(format!("{}: formality 必须在 0 到 100 之间", path));
        }
        let employees = match obj.get("employees") {
            None | Some(Value::Null) => None,
            Some(n) => Some(
                n.as_u64()
                    .ok_or_else(|| format!("{}: employees 必须是非负整数", path))?,
            ),
        };

        Ok(Self {
            code,
            name,
            avg_salary,
            formality,
            employees,
        })
    }

    pub fn level(&self) -> OccupationLevel {
        OccupationLevel::from_code(&self.code)
    }

    /// 展示名：只取最后一个冒号之后的部分
    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }

    /// 树节点标签，超过 25 个字符时截断
    pub fn tree_label(&self) -> String {
        let name = self.short_name();
        if name.chars().count() > 25 {
            let truncated: String = name.chars().take(25).collect();
            format!("{}...", truncated)
        } else {
            name.to_string()
        }
    }

    /// 薪资的十进制文本（搜索用，不带千分位）
    pub fn salary_text(&self) -> Option<String> {
        self.avg_salary.map(decimal_text)
    }
}

/// 取 `"前缀: 标签"` 中最后一个冒号之后的标签
pub fn short_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name).trim()
}

fn optional_number(v: Option<&Value>, path: &str, field: &str) -> Result<Option<f64>, String> {
    match v {
        None | Some(Value::Null) => Ok(None),
        Some(n) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| format!("{}: {} 必须是数字", path, field)),
    }
}

/// 数字的最短十进制表示：整数不带小数点
pub fn decimal_text(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

/// 千分位整数格式，如 `10000 -> "10,000"`
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// 千分位金额格式，最多保留三位小数
pub fn format_amount(v: f64) -> String {
    let rounded = (v * 1000.0).round() / 1000.0;
    let sign = if rounded < 0.0 { "-" } else { "" };
    let abs = rounded.abs();
    let int_part = abs.trunc() as u64;
    let frac = format!("{:.3}", abs.fract());
    let frac = frac.trim_start_matches('0').trim_end_matches('0');
    let frac = if frac == "." { "" } else { frac };
    format!("{}{}{}", sign, format_count(int_part), frac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_level_from_code_length() {
        assert_eq!(OccupationLevel::from_code("1"), OccupationLevel::Division);
        assert_eq!(OccupationLevel::from_code("12"), OccupationLevel::GroupPrincipal);
        assert_eq!(OccupationLevel::from_code("123"), OccupationLevel::Subgroup);
        assert_eq!(OccupationLevel::from_code("1234"), OccupationLevel::UnitGroup);
        assert_eq!(OccupationLevel::from_code("123456"), OccupationLevel::UnitGroup);
    }

    #[test]
    fn test_short_name_uses_suffix_after_last_colon() {
        assert_eq!(short_name("División 1: Funcionarios: Directores"), "Directores");
        assert_eq!(short_name("Sin prefijo"), "Sin prefijo");
    }

    #[test]
    fn test_tree_label_truncation() {
        let rec = OccupationRecord {
            code: "1".into(),
            name: "Grupo: Trabajadores en actividades agrícolas".into(),
            avg_salary: None,
            formality: None,
            employees: None,
        };
        let label = rec.tree_label();
        assert!(label.ends_with("..."));
        assert_eq!(label.chars().count(), 28);
    }

    #[test]
    fn test_from_value_reads_metrics() {
        let v = json!({"code": "11", "name": "A1", "employees": 100, "avgSalary": 10000, "formality": 55.5});
        let rec = OccupationRecord::from_value(&v, "$").unwrap();
        assert_eq!(rec.employees, Some(100));
        assert_eq!(rec.avg_salary, Some(10000.0));
        assert_eq!(rec.formality, Some(55.5));
        assert_eq!(rec.salary_text().as_deref(), Some("10000"));
    }

    #[test]
    fn test_from_value_rejects_bad_fields() {
        assert!(OccupationRecord::from_value(&json!({"code": "", "name": "x"}), "$").is_err());
        assert!(OccupationRecord::from_value(&json!({"code": 1, "name": "x"}), "$").is_err());
        assert!(OccupationRecord::from_value(&json!({"code": "1"}), "$").is_err());
        assert!(OccupationRecord::from_value(&json!({"code": "1", "name": "x", "employees": -3}), "$").is_err());
        assert!(OccupationRecord::from_value(&json!({"code": "1", "name": "x", "formality": 140}), "$").is_err());
        // null 视为缺省
        assert!(OccupationRecord::from_value(&json!({"code": "1", "name": "x", "avgSalary": null}), "$").is_ok());
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(100), "100");
        assert_eq!(format_count(10000), "10,000");
        assert_eq!(format_count(1234567), "1,234,567");
        assert_eq!(format_amount(10000.0), "10,000");
        assert_eq!(format_amount(12345.5), "12,345.5");
        assert_eq!(decimal_text(12345.5), "12345.5");
    }

    #[test]
    fn test_salary_class_thresholds() {
        assert_eq!(SalaryClass::of(None), SalaryClass::Low);
        assert_eq!(SalaryClass::of(Some(9_999.0)), SalaryClass::Low);
        assert_eq!(SalaryClass::of(Some(10_000.0)), SalaryClass::Medium);
        assert_eq!(SalaryClass::of(Some(20_000.0)), SalaryClass::High);
    }
}
