//! Study Assistant
//!
//! Answers students' study questions from their attendance, grades, fees
//! and schedule.

mod engine;

pub use engine::{AssistantError, AssistantReply, StudyAssistant, Topic, MAX_QUESTION_LEN};
