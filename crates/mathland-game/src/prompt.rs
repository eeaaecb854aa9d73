//! Prompt and schema construction for problem generation.

use mathland_genai::GenerationRequest;
use serde_json::{json, Value};

use crate::catalog::{ClassLevel, GameConfig};
use crate::problem::OPTION_COUNT;

/// Describes what problems at a class level should look like.
#[must_use]
pub const fn difficulty_description(level: ClassLevel) -> &'static str {
    match level {
        ClassLevel::P1 => "very simple single-digit addition and subtraction (e.g., 2 + 3, 5 - 1). The total should not exceed 10.",
        ClassLevel::P2 => "single and double-digit addition/subtraction (e.g., 15 + 4, 20 - 8). No carrying or borrowing needed.",
        ClassLevel::P3 => "double-digit addition/subtraction with carrying/borrowing, and simple single-digit multiplication/division (e.g., 2x3, 10÷2).",
        ClassLevel::P4 => "multi-digit addition/subtraction, and multiplication/division facts up to 12x12.",
        ClassLevel::P5 => "complex multi-digit multiplication and division, and problems involving mixed operations.",
        ClassLevel::P6 => "all operations, including problems with simple fractions, decimals, or multi-step word problems.",
    }
}

/// Builds the system-role instruction.
#[must_use]
pub fn system_instruction(config: &GameConfig) -> String {
    format!(
        "You are an expert curriculum designer for primary school mathematics. \
         Your task is to generate {rounds} age-appropriate math problems for a Primary Level {level} student. \
         The difficulty should be: {difficulty} \
         The problems must strictly be about {operation}. \
         Ensure the answers are always integers.",
        rounds = config.rounds,
        level = config.level.number(),
        difficulty = difficulty_description(config.level),
        operation = config.operation.prompt_name(),
    )
}

/// Builds the user-role prompt.
#[must_use]
pub fn user_prompt(config: &GameConfig) -> String {
    if config.needs_options() {
        "Generate the problems now. For each problem, provide one correct answer and three \
         plausible but incorrect integer options. All four options must be distinct. \
         Ensure the correct answer is one of the options."
            .to_string()
    } else {
        "Generate the problems now. Just provide the question and the integer answer.".to_string()
    }
}

/// Builds the JSON schema for the expected response.
#[must_use]
pub fn response_schema(needs_options: bool) -> Value {
    let mut properties = json!({
        "question": {
            "type": "string",
            "description": "The math problem or question to be asked. e.g., '5 + 3 = ?' or 'If you have 8 apples and eat 2, how many are left?'"
        },
        "answer": {
            "type": "integer",
            "description": "The single, correct integer answer to the question."
        }
    });
    let mut required = vec!["question", "answer"];

    if needs_options {
        properties["options"] = json!({
            "type": "array",
            "description": "An array of 4 distinct integers: one correct answer and three incorrect distractors.",
            "items": { "type": "integer" },
            "minItems": OPTION_COUNT,
            "maxItems": OPTION_COUNT
        });
        required.push("options");
    }

    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": properties,
            "required": required
        }
    })
}

/// Builds the complete request for one batch.
#[must_use]
pub fn build_request(config: &GameConfig, temperature: f32) -> GenerationRequest {
    GenerationRequest {
        system_instruction: system_instruction(config),
        user_prompt: user_prompt(config),
        response_schema: response_schema(config.needs_options()),
        temperature,
    }
}
