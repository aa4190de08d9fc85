//! 带示例评分使用的固定示例
//!
//! 示例内容与题目无关，每次调用都注入同样的三个示例（满分 / 部分得分 / 零分）

use crate::models::result::percentage_of;

/// 示例中的单项得分
#[derive(Debug, Clone, Copy)]
pub struct ExampleScore {
    pub criterion_name: &'static str,
    pub points_awarded: f64,
    pub max_points: f64,
    pub feedback: &'static str,
}

/// 一个完整的评分示例
#[derive(Debug, Clone, Copy)]
pub struct FewShotExample {
    pub problem: &'static str,
    pub reference: &'static str,
    /// (评分项, 满分)
    pub rubric: &'static [(&'static str, f64)],
    pub student_code: &'static str,
    pub reasoning: &'static str,
    pub breakdown: &'static [ExampleScore],
    pub total_score: f64,
    pub total_possible: f64,
    pub overall_feedback: &'static str,
}

impl FewShotExample {
    pub fn percentage(&self) -> f64 {
        percentage_of(self.total_score, self.total_possible)
    }
}

pub static FEW_SHOT_EXAMPLES: [FewShotExample; 3] = [
    FewShotExample {
        problem: "Write a function that returns the maximum of two integers.",
        reference: "int findMax(int a, int b) {\n    return a > b ? a : b;\n}",
        rubric: &[("Correctness", 5.0), ("Code Quality", 3.0), ("Efficiency", 2.0)],
        student_code: "int findMax(int a, int b) {\n    return a > b ? a : b;\n}",
        reasoning: "## Problem Understanding\nThe task is to write a function that compares two integers and returns the larger one. The reference solution uses the ternary operator which is idiomatic and efficient.\n\n## Reference Solution Analysis\nThe reference uses: `a > b ? a : b` - a clean ternary operator approach that directly returns the maximum in O(1) time with O(1) space.\n\n## Student Code Analysis\nThe student's code is identical to the reference solution. It correctly uses the ternary operator and will work for all integer pairs.\n\n## Criterion-by-Criterion Evaluation\n\n### Correctness (5/5)\nThe implementation is perfectly correct. It handles all cases (positive, negative, equal values) correctly. No edge cases are missed.\n\n### Code Quality (3/3)\nThe code is clean, readable, and uses standard C++ idioms (ternary operator). Variable names are clear and the formatting is consistent.\n\n### Efficiency (2/2)\nOptimal time complexity O(1) and space complexity O(1). No unnecessary operations.\n\n## Overall Assessment\nExcellent solution demonstrating mastery of the problem.",
        breakdown: &[
            ExampleScore { criterion_name: "Correctness", points_awarded: 5.0, max_points: 5.0, feedback: "Perfect solution." },
            ExampleScore { criterion_name: "Code Quality", points_awarded: 3.0, max_points: 3.0, feedback: "Clean code." },
            ExampleScore { criterion_name: "Efficiency", points_awarded: 2.0, max_points: 2.0, feedback: "Optimal." },
        ],
        total_score: 10.0,
        total_possible: 10.0,
        overall_feedback: "Perfect solution. Your understanding of C++ idioms and ability to write clean, efficient code is excellent.",
    },
    FewShotExample {
        problem: "Implement a function to reverse an array in-place.",
        reference: "void reverseArray(int arr[], int size) {\n    int left = 0, right = size - 1;\n    while (left < right) {\n        int temp = arr[left];\n        arr[left] = arr[right];\n        arr[right] = temp;\n        left++;\n        right--;\n    }\n}",
        rubric: &[("Correctness", 5.0), ("Code Quality", 3.0), ("Efficiency", 2.0)],
        student_code: "void reverseArray(int arr[], int size) {\n    int temp[100];\n    for (int i = 0; i < size; i++) {\n        temp[i] = arr[size - 1 - i];\n    }\n    for (int i = 0; i < size; i++) {\n        arr[i] = temp[i];\n    }\n}",
        reasoning: "## Problem Understanding\nThe requirement is to reverse an array IN-PLACE, meaning we should modify the original array without using extra space.\n\n## Reference Solution Analysis\nThe reference uses a two-pointer swap technique:\n- Start with left at 0, right at size-1\n- Swap elements and move pointers toward center\n- This achieves true in-place reversal: O(1) extra space, O(n) time\n\n## Student Code Analysis\nThe student's solution creates a temporary array `temp[100]`, copies reversed elements into it, then copies back to original array. While this works functionally, it:\n1. Uses O(n) extra space (violates in-place requirement)\n2. Uses hardcoded array size (not flexible)\n3. Has more complex logic than needed\n\n## Criterion-by-Criterion Evaluation\n\n### Correctness (3/5)\nThe code works correctly for arrays up to size 100, but:\n- Violates the in-place requirement stated in the problem\n- Hardcoded size 100 means it fails for larger arrays\n- Score: 3/5 (functional but doesn't meet requirements)\n\n### Code Quality (2/3)\nThe logic is understandable but more complex than needed:\n- Extra variable declarations\n- Two separate loops\n- Hardcoded magic number (100)\n- Could be clearer with comments explaining the reversal\n- Score: 2/3 (readable but overcomplicated)\n\n### Efficiency (0/2)\nSpace complexity is O(n) instead of O(1) as required for in-place operations:\n- Temp array allocation uses extra memory\n- Time complexity is O(n) which is acceptable\n- Score: 0/2 (does not meet in-place requirement)\n\n## Overall Assessment\nPartial solution that works functionally but fails to meet the key requirement of reversing in-place. Demonstrates understanding of array manipulation but not optimal algorithm design.",
        breakdown: &[
            ExampleScore { criterion_name: "Correctness", points_awarded: 3.0, max_points: 5.0, feedback: "Violates in-place requirement." },
            ExampleScore { criterion_name: "Code Quality", points_awarded: 2.0, max_points: 3.0, feedback: "Overcomplicated logic." },
            ExampleScore { criterion_name: "Efficiency", points_awarded: 0.0, max_points: 2.0, feedback: "O(n) space used." },
        ],
        total_score: 5.0,
        total_possible: 10.0,
        overall_feedback: "Your solution works for reversing arrays, but it doesn't meet the in-place requirement. The use of a temporary array violates the constraint. Study two-pointer techniques for in-place array manipulation. Also, avoid hardcoding array sizes.",
    },
    FewShotExample {
        problem: "Implement a Stack class with push, pop, and peek operations.",
        reference: "class Stack {\nprivate:\n    int arr[100];\n    int top;\npublic:\n    Stack() : top(-1) {}\n    void push(int x) { if (top < 99) arr[++top] = x; }\n    int pop() { return top >= 0 ? arr[top--] : -1; }\n    int peek() { return top >= 0 ? arr[top] : -1; }\n    bool isEmpty() { return top == -1; }\n};",
        rubric: &[("Correctness", 4.0), ("Design", 3.0), ("Error Handling", 3.0)],
        student_code: "class Stack {}; // Empty implementation",
        reasoning: "## Problem Understanding\nNeed to implement a Stack with basic operations: push (add), pop (remove), peek (view top), isEmpty check.\n\n## Reference Solution Analysis\nThe reference provides a working stack using:\n- Private array for storage\n- Top pointer tracking the stack position\n- Basic operations returning -1 for errors\n\n## Student Code Analysis\nThe student provided only an empty class declaration with no implementation.\n\n## Criterion-by-Criterion Evaluation\n\n### Correctness (0/4)\nNo implementation present. Code does not compile or function. Cannot push, pop, or peek.\n\n### Design (0/3)\nNo class members or methods implemented. No consideration for data structure design.\n\n### Error Handling (0/3)\nNo error handling whatsoever. Empty class cannot handle any operations.\n\n## Overall Assessment\nIncomplete submission with no implementation. Requires full rewrite to meet requirements.",
        breakdown: &[
            ExampleScore { criterion_name: "Correctness", points_awarded: 0.0, max_points: 4.0, feedback: "No implementation." },
            ExampleScore { criterion_name: "Design", points_awarded: 0.0, max_points: 3.0, feedback: "Empty class." },
            ExampleScore { criterion_name: "Error Handling", points_awarded: 0.0, max_points: 3.0, feedback: "None." },
        ],
        total_score: 0.0,
        total_possible: 10.0,
        overall_feedback: "No implementation provided. Please implement all required methods: constructor, push, pop, peek, and isEmpty. Study the reference solution and understand how to manage the stack's internal state.",
    },
];

/// 把全部示例格式化为可以填入 `{examples}` 的文本
pub fn format_few_shot_examples() -> String {
    let mut parts = Vec::with_capacity(FEW_SHOT_EXAMPLES.len() * 12);

    for (i, example) in FEW_SHOT_EXAMPLES.iter().enumerate() {
        parts.push(format!("## EXAMPLE {}\n", i + 1));
        parts.push(format!("**Problem:** {}\n", example.problem));
        parts.push(format!(
            "**Reference Solution:**\n```cpp\n{}\n```\n",
            example.reference
        ));
        parts.push(format!("**Student Code:**\n```cpp\n{}\n```\n", example.student_code));
        parts.push(format!("**Grading Reasoning:**\n{}\n", example.reasoning));
        parts.push(format!(
            "**Assigned Grade:** {:.1}/{:.1}",
            example.total_score, example.total_possible
        ));
        parts.push(format!("({:.0}%)\n", example.percentage()));
        parts.push("**Score Breakdown:**".to_string());
        for score in example.breakdown {
            parts.push(format!(
                "- {}: {:.1}/{:.1} - {}",
                score.criterion_name, score.points_awarded, score.max_points, score.feedback
            ));
        }
        parts.push(format!("\n**Overall Feedback:** {}\n", example.overall_feedback));
        parts.push("---\n\n".to_string());
    }

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_examples_are_self_consistent() {
        for example in &FEW_SHOT_EXAMPLES {
            let awarded: f64 = example.breakdown.iter().map(|s| s.points_awarded).sum();
            let possible: f64 = example.rubric.iter().map(|(_, p)| p).sum();
            assert!((awarded - example.total_score).abs() < 0.01);
            assert!((possible - example.total_possible).abs() < 0.01);
        }
    }

    #[test]
    fn test_format_is_static() {
        let first = format_few_shot_examples();
        assert_eq!(first, format_few_shot_examples());
        assert!(first.contains("## EXAMPLE 1\n"));
        assert!(first.contains("## EXAMPLE 3\n"));
        assert!(first.contains("**Assigned Grade:** 5.0/10.0\n(50%)"));
        assert!(first.contains("class Stack {}; // Empty implementation"));
        assert!(first.contains("- Correctness: 3.0/5.0 - Violates in-place requirement."));
        assert!(first.contains("- Error Handling: 0.0/3.0 - None."));
        assert!(first.contains("**Overall Feedback:** No implementation provided."));
        assert!(!first.contains("{{"));
    }
}
