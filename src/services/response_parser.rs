//! LLM 响应解析
//!
//! 从任意文本中恢复 JSON 对象，依次尝试：
//! 1. 整段文本直接解析
//! 2. markdown 代码块（可带 `json` 标记）中的内容
//! 3. 按花括号深度扫描，每回到深度 0 时尝试解析，失败则继续向后扫描

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::services::field_aliases::{field, response_field};
use crate::utils::logging::truncate_text;

/// 错误信息中保留的响应预览长度
const PREVIEW_CHARS: usize = 200;

fn fenced_block_regex() -> Option<&'static Regex> {
    static FENCED_BLOCK: OnceLock<Option<Regex>> = OnceLock::new();
    FENCED_BLOCK
        .get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*\n(.*?)\n```").ok())
        .as_ref()
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// 从 LLM 响应文本中提取 JSON 对象
pub fn extract_json(text: &str) -> Result<Map<String, Value>, ParseError> {
    // 1. 直接解析
    if let Some(map) = parse_object(text) {
        return Ok(map);
    }

    // 2. 代码块
    if let Some(re) = fenced_block_regex() {
        for captures in re.captures_iter(text) {
            if let Some(map) = captures.get(1).and_then(|m| parse_object(m.as_str())) {
                debug!("从代码块中提取到 JSON");
                return Ok(map);
            }
        }
    }

    // 3. 花括号扫描
    let mut depth = 0usize;
    let mut start = None;
    for (i, ch) in text.char_indices() {
        match ch {
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(map) = start.take().and_then(|s| parse_object(&text[s..=i])) {
                        debug!("通过花括号扫描提取到 JSON");
                        return Ok(map);
                    }
                }
            }
            _ => {}
        }
    }

    Err(ParseError::UnparsableResponse {
        preview: truncate_text(text, PREVIEW_CHARS),
    })
}

/// 检查评分响应是否具备最基本的结构
///
/// 需要 `breakdown`（非空数组）、`overall_feedback`、`total_score`，
/// 且每个评分项都包含名称、得分、满分、反馈（接受别名和 `final_grade` 包装）
pub fn validate_grading_response(response: &Map<String, Value>) -> bool {
    if response_field(response, "overall_feedback").is_none()
        || response_field(response, "total_score").is_none()
    {
        return false;
    }

    let Some(breakdown) = response_field(response, "breakdown").and_then(Value::as_array) else {
        return false;
    };
    if breakdown.is_empty() {
        return false;
    }

    breakdown.iter().all(|item| {
        item.as_object().is_some_and(|item| {
            ["criterion_name", "points_awarded", "max_points", "feedback"]
                .iter()
                .all(|key| field(item, key).is_some())
        })
    })
}

/// 提取并校验评分响应
///
/// 结构不完整只记录警告，后续由结果构建器补齐默认值
pub fn parse_grading_response(text: &str) -> Result<Map<String, Value>, ParseError> {
    let parsed = extract_json(text).inspect_err(|e| warn!("⚠️ 解析 LLM 响应失败: {}", e))?;

    if !validate_grading_response(&parsed) {
        warn!("⚠️ LLM 响应缺少必要字段，将使用默认值补齐");
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn expected() -> Map<String, Value> {
        json!({"a": 1}).as_object().cloned().unwrap()
    }

    #[test]
    fn test_plain_json() {
        assert_eq!(extract_json(r#"{"a":1}"#).unwrap(), expected());
    }

    #[test]
    fn test_fenced_json() {
        assert_eq!(extract_json("```json\n{\"a\":1}\n```").unwrap(), expected());
        assert_eq!(extract_json("Result:\n```\n{\"a\":1}\n```\nDone").unwrap(), expected());
    }

    #[test]
    fn test_embedded_json() {
        assert_eq!(extract_json(r#"noise {"a":1} noise"#).unwrap(), expected());
    }

    #[test]
    fn test_scan_continues_past_bad_object() {
        let text = r#"see {not valid} then {"a":1}"#;
        assert_eq!(extract_json(text).unwrap(), expected());
    }

    #[test]
    fn test_nested_object() {
        let text = r#"Here: {"a": {"b": [1, 2]}} thanks"#;
        let parsed = extract_json(text).unwrap();
        assert_eq!(parsed["a"]["b"], json!([1, 2]));
    }

    #[test]
    fn test_unparsable() {
        let err = extract_json("not json at all").unwrap_err();
        assert!(err.to_string().contains("not json at all"));
    }

    #[test]
    fn test_array_is_not_a_grade() {
        assert!(extract_json("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_validate_shapes() {
        let canonical = json!({
            "breakdown": [{"criterion_name": "A", "points_awarded": 1, "max_points": 2, "feedback": "ok"}],
            "overall_feedback": "fine",
            "total_score": 1
        });
        assert!(validate_grading_response(canonical.as_object().unwrap()));

        let wrapped = json!({
            "final_grade": {
                "breakdown": [{"criterion": "A", "score": 1, "max_score": 2, "feedback": "ok"}],
                "overall_feedback": "fine",
                "total_score": 1
            }
        });
        assert!(validate_grading_response(wrapped.as_object().unwrap()));

        let empty = json!({"breakdown": [], "overall_feedback": "x", "total_score": 0});
        assert!(!validate_grading_response(empty.as_object().unwrap()));

        let missing_feedback = json!({
            "breakdown": [{"criterion_name": "A", "points_awarded": 1, "max_points": 2}],
            "overall_feedback": "fine",
            "total_score": 1
        });
        assert!(!validate_grading_response(missing_feedback.as_object().unwrap()));
    }
}
