//! Classification instruction and message framing.
//!
//! The external model does the linguistic work; this module only fixes the
//! rules and the response shape it is asked to follow.

use super::backend::CompletionRequest;
use crate::model::tag::palette_prompt_line;
use chrono::{DateTime, SecondsFormat, Utc};

const INSTRUCTION_HEAD: &str = r##"You are a smart personal assistant that organizes input text.
Return only a valid JSON object with no markdown formatting or code blocks.

Type Classification Rules:
1. EVENT if:
   - Contains a specific date or time
   - Mentions meeting, appointment, call, sync
   - Uses words like "at", "on", "during" to anchor a time

2. TASK if:
   - Starts with an action verb
   - Contains words like "need to", "must", "should"
   - Represents something that needs completion

3. NOTE if:
   - General information or thoughts
   - No specific action or time

Return format:
{
  "mainNote": {
    "type": "event" | "task" | "note",
    "title": "Clear, concise title",
    "content": "Original content",
    "tags": [{ "label": "work", "color": "#3b82f6" }],
    "dueDate": "2024-01-25T15:00:00.000Z" | null,
    "hasTime": boolean,
    "priority": "high" | "medium" | "low" | null,
    "recurrence": "daily" | "weekly" | null
  },
  "status": "success"
}
"##;

/// Fixed system instruction, including the tag palette.
pub fn system_instruction() -> String {
    format!("{INSTRUCTION_HEAD}\nAvailable tags: {}", palette_prompt_line())
}

/// User turn carrying the current time and the already-sanitized text.
pub fn user_message(now: DateTime<Utc>, sanitized: &str) -> String {
    format!(
        "Current datetime: {}\nProcess this text: \"{}\"",
        now.to_rfc3339_opts(SecondsFormat::Millis, true),
        sanitized
    )
}

pub fn build_request(now: DateTime<Utc>, sanitized: &str) -> CompletionRequest {
    CompletionRequest {
        system: system_instruction(),
        user: user_message(now, sanitized),
    }
}
