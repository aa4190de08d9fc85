//! 响应字段别名表
//!
//! 模型输出存在两种历史格式：
//! - 顶层 `breakdown` + `criterion_name / points_awarded / max_points`
//! - `final_grade` 包装 + `criterion / score / max_score`
//!
//! 每个规范字段对应一组可接受的键名，按顺序查找，取第一个有内容的值
//! （null 和空数组都视为缺失）

use phf::phf_map;
use serde_json::{Map, Value};

/// 规范字段名 -> 可接受的键名（优先级从高到低）
static FIELD_ALIASES: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    "criterion_name" => &["criterion_name", "criterion"],
    "points_awarded" => &["points_awarded", "score"],
    "max_points" => &["max_points", "max_score"],
    "feedback" => &["feedback"],
    "analysis" => &["analysis"],
    "breakdown" => &["breakdown", "criterion_evaluations"],
    "total_score" => &["total_score"],
    "total_possible" => &["total_possible"],
    "percentage" => &["percentage"],
    "overall_feedback" => &["overall_feedback"],
};

/// 响应级字段的包装层（顶层之后依次查找）
pub const RESPONSE_WRAPPERS: [&str; 2] = ["final_grade", "reasoning"];

/// 在单个对象中按别名查找字段
pub fn field<'a>(object: &'a Map<String, Value>, canonical: &str) -> Option<&'a Value> {
    let aliases: &[&str] = FIELD_ALIASES
        .get(canonical)
        .copied()
        .unwrap_or(std::slice::from_ref(&canonical));

    aliases
        .iter()
        .filter_map(|key| object.get(*key))
        .find(|value| is_present(value))
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// 在整个响应中查找字段：先顶层，再 `final_grade`，最后 `reasoning`
pub fn response_field<'a>(root: &'a Map<String, Value>, canonical: &str) -> Option<&'a Value> {
    field(root, canonical).or_else(|| {
        RESPONSE_WRAPPERS
            .iter()
            .filter_map(|wrapper| root.get(*wrapper).and_then(Value::as_object))
            .find_map(|nested| field(nested, canonical))
    })
}

/// 读取数值，兼容 `"4.5"` 这样的字符串
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// 读取非空文本
pub fn as_text(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}
