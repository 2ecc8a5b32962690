//! Output formatting: attach identity and metadata to a parsed question.

use crate::output::{Difficulty, OutputRecord, QuestionType, RecordMeta, SCHEMA_VERSION};
use crate::pipeline::fields::ParsedFields;
use chrono::Utc;
use uuid::Uuid;

/// Build the final record.
///
/// The id is a fresh random UUID, so formatting the same fields twice
/// yields two distinct records. `meta.length` counts the words of the
/// question as extracted, before whitespace is collapsed.
pub fn format_record(
    fields: ParsedFields,
    question_type: QuestionType,
    difficulty: Difficulty,
    source: &str,
) -> OutputRecord {
    let length = fields.question.split_whitespace().count();
    OutputRecord {
        id: Uuid::new_v4().to_string(),
        question: collapse_whitespace(&fields.question),
        question_type,
        difficulty,
        options: fields.options,
        answer: fields.answer,
        source: source.to_string(),
        meta: RecordMeta {
            length,
            created_at: Utc::now(),
            version: SCHEMA_VERSION.to_string(),
        },
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
