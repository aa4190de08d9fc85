pub mod builder;
pub mod examples;
pub mod templates;

pub use builder::{
    build_prompt, build_prompt_with, format_code_block, format_rubric_json, render_template,
    DEFAULT_LANGUAGE,
};
pub use examples::{format_few_shot_examples, FEW_SHOT_EXAMPLES};
