//! 提示词组装
//!
//! 纯函数：评分标准序列化、代码块格式化、模板填充

use serde::Serialize;

use crate::error::TemplateError;
use crate::models::{GradingRequest, GradingRubric};

/// 学生代码与参考答案的默认语言
pub const DEFAULT_LANGUAGE: &str = "cpp";

#[derive(Serialize)]
struct RubricView<'a> {
    total_points: f64,
    criteria: Vec<CriterionView<'a>>,
}

#[derive(Serialize)]
struct CriterionView<'a> {
    name: &'a str,
    description: &'a str,
    max_points: f64,
    guidelines: Option<&'a str>,
}

/// 把评分标准序列化为 JSON（两空格缩进，字段顺序固定）
pub fn format_rubric_json(rubric: &GradingRubric) -> String {
    let view = RubricView {
        total_points: rubric.total_points,
        criteria: rubric
            .criteria
            .iter()
            .map(|c| CriterionView {
                name: &c.name,
                description: &c.description,
                max_points: c.max_points,
                guidelines: c.evaluation_guidelines.as_deref(),
            })
            .collect(),
    };
    // 只包含字符串和有限数值，序列化不会失败
    serde_json::to_string_pretty(&view).unwrap_or_default()
}

/// 格式化为 markdown 代码块
pub fn format_code_block(code: &str, language: &str) -> String {
    format!("```{}\n{}\n```", language, code)
}

/// 渲染模板
///
/// `{name}` 替换为同名字段的值，`{{` 和 `}}` 输出字面花括号
///
/// # 错误
/// - 模板引用了 `fields` 中没有的字段：[`TemplateError::MissingField`]
/// - 花括号没有闭合或单独出现 `}`：[`TemplateError::UnbalancedBrace`]
pub fn render_template(template: &str, fields: &[(&str, &str)]) -> Result<String, TemplateError> {
    let extra: usize = fields.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut chars = template.char_indices().peekable();

    while let Some((position, ch)) = chars.next() {
        match ch {
            '{' => {
                if chars.next_if(|&(_, c)| c == '{').is_some() {
                    out.push('{');
                    continue;
                }

                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, c)) if c != '{' => name.push(c),
                        _ => return Err(TemplateError::UnbalancedBrace { position }),
                    }
                }

                match fields.iter().find(|(key, _)| *key == name) {
                    Some((_, value)) => out.push_str(value),
                    None => return Err(TemplateError::MissingField { field: name }),
                }
            }
            '}' => {
                if chars.next_if(|&(_, c)| c == '}').is_none() {
                    return Err(TemplateError::UnbalancedBrace { position });
                }
                out.push('}');
            }
            _ => out.push(ch),
        }
    }

    Ok(out)
}

/// 用请求填充模板的四个标准字段
///
/// `problem_description`、`reference_solution`（代码块）、`rubric_json`、`student_code`（代码块）
pub fn build_prompt(request: &GradingRequest, template: &str) -> Result<String, TemplateError> {
    build_prompt_with(request, template, &[])
}

/// 标准字段之外再追加额外字段（示例、当前评分、审查意见等）
pub fn build_prompt_with(
    request: &GradingRequest,
    template: &str,
    extra: &[(&str, &str)],
) -> Result<String, TemplateError> {
    let reference = format_code_block(&request.reference_solution, DEFAULT_LANGUAGE);
    let rubric_json = format_rubric_json(&request.rubric);
    let student = format_code_block(&request.student_code, DEFAULT_LANGUAGE);

    let mut fields = vec![
        ("problem_description", request.problem_description.as_str()),
        ("reference_solution", reference.as_str()),
        ("rubric_json", rubric_json.as_str()),
        ("student_code", student.as_str()),
    ];
    fields.extend_from_slice(extra);

    render_template(template, &fields)
}
