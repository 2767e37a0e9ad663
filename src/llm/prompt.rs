use std::collections::HashSet;
use std::fmt::Write;

use super::{ChatMessage, PlanRequest};
use crate::error::{AppError, Result};
use crate::models::TrainingPlan;

const SYSTEM_PROMPT: &str = "You are an experienced physiotherapist writing home exercise \
programs. You only recommend gentle, evidence-based rehabilitation exercises, you respect \
reported pain levels, and you never diagnose. Reply with a single JSON object and nothing else.";

/// Pain at or above this level is flagged to the model as severe.
pub const SEVERE_PAIN_LEVEL: u8 = 7;

pub fn build_messages(request: &PlanRequest) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_user_prompt(request)),
    ]
}

fn build_user_prompt(request: &PlanRequest) -> String {
    let mut prompt = String::new();
    let part = &request.body_part;

    // Writing into a String cannot fail.
    let _ = writeln!(prompt, "Body part: {} ({})", part.name, part.description);
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Muscle test results (pain 0 = none, 10 = worst imaginable):");
    for test in &request.tests {
        let flag = if test.pain_level >= SEVERE_PAIN_LEVEL {
            " [severe]"
        } else {
            ""
        };
        let _ = writeln!(
            prompt,
            "- {}: pain {}/10{} ({})",
            test.muscle_test.name, test.pain_level, flag, test.muscle_test.description
        );
    }

    let _ = writeln!(prompt);
    if request.exercises.is_empty() {
        let _ = writeln!(prompt, "No catalog exercises are available; suggest your own.");
    } else {
        let _ = writeln!(prompt, "Candidate exercises (prefer these, cite their id):");
        for exercise in &request.exercises {
            let _ = writeln!(
                prompt,
                "- id={} | {} | {} | {}",
                exercise.id,
                exercise.name,
                exercise.difficulty.as_str(),
                exercise.description
            );
        }
    }

    let _ = writeln!(prompt);
    prompt.push_str(
        "Write a training plan as JSON with this shape:\n\
         {\"title\": string, \"summary\": string, \
         \"exercises\": [{\"exercise_id\": string|null, \"name\": string, \"sets\": integer, \
         \"reps\": string, \"frequency\": string, \"notes\": string}], \
         \"precautions\": [string]}\n\
         Avoid loading movements that scored severe pain. Keep it to at most 6 exercises.",
    );
    prompt
}

/// Strip an optional Markdown code fence around the model's JSON.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the first newline.
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parse and sanity-check the model's answer.
///
/// Exercise IDs that are not among the candidates are cleared, the entry
/// itself is kept.
pub fn parse_plan(content: &str, request: &PlanRequest) -> Result<TrainingPlan> {
    let json = strip_code_fence(content);
    let mut plan: TrainingPlan = serde_json::from_str(json)
        .map_err(|e| AppError::Upstream(format!("Model returned invalid plan JSON: {}", e)))?;

    plan.title = plan.title.trim().to_string();
    if plan.title.is_empty() {
        return Err(AppError::Upstream("Model returned a plan without a title".to_string()));
    }
    plan.exercises.retain(|e| !e.name.trim().is_empty());
    if plan.exercises.is_empty() {
        return Err(AppError::Upstream(
            "Model returned a plan without exercises".to_string(),
        ));
    }

    let known: HashSet<&str> = request.exercises.iter().map(|e| e.id.as_str()).collect();
    for exercise in &mut plan.exercises {
        if let Some(id) = &exercise.exercise_id {
            if !known.contains(id.as_str()) {
                tracing::debug!(exercise_id = %id, "Dropping unknown exercise id from plan");
                exercise.exercise_id = None;
            }
        }
    }

    Ok(plan)
}
