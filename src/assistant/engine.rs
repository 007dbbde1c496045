//! Study Assistant
//!
//! Answers a student's free-text question from their own portal data.
//! Rule-based: the question is matched against topic keywords and each
//! matched topic contributes a paragraph, numbers and suggestions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use crate::analytics::{self, AttendanceBreakdown, AttendancePolicy, CourseGradeSummary, FeeSummary};
use crate::domain::{Course, Exam, PortalStore, Role, User};

/// Longest accepted question
pub const MAX_QUESTION_LEN: usize = 500;

#[derive(Error, Debug, PartialEq)]
pub enum AssistantError {
    #[error("question cannot be empty")]
    EmptyQuestion,

    #[error("question exceeds 500 characters")]
    QuestionTooLong,

    #[error("the study assistant is only available to students")]
    NotAStudent,
}

/// Reply to one question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantReply {
    pub answer: String,
    pub topics: Vec<Topic>,
    pub supporting_data: BTreeMap<String, f64>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Attendance,
    Grades,
    Fees,
    Schedule,
}

impl Topic {
    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Topic::Attendance => &["attendance", "attend", "absent", "absence", "miss", "present", "class"],
            Topic::Grades => &["grade", "exam", "mark", "score", "test", "quiz", "study", "gpa"],
            Topic::Fees => &["fee", "pay", "paid", "payment", "due", "tuition", "balance"],
            Topic::Schedule => &["schedule", "timetable", "course", "enroll", "meet"],
        }
    }

    fn detect(question: &str) -> Vec<Topic> {
        let lower = question.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        [Topic::Attendance, Topic::Grades, Topic::Fees, Topic::Schedule]
            .into_iter()
            .filter(|t| {
                t.keywords()
                    .iter()
                    .any(|k| words.iter().any(|w| is_inflection_of(w, k)))
            })
            .collect()
    }
}

/// Whole-word match allowing plural and verb endings ("classes", "missing")
fn is_inflection_of(word: &str, keyword: &str) -> bool {
    match word.strip_prefix(keyword) {
        Some(rest) => matches!(rest, "" | "s" | "es" | "ed" | "ing" | "ings" | "ment" | "ments"),
        None => {
            // "study" -> "studies", "studied"
            keyword
                .strip_suffix('y')
                .and_then(|stem| word.strip_prefix(stem))
                .map(|rest| matches!(rest, "ies" | "ied"))
                .unwrap_or(false)
        }
    }
}

/// Everything the rules look at, gathered once per question
struct StudentContext {
    attendance: AttendanceBreakdown,
    grades: Vec<CourseGradeSummary>,
    upcoming: Vec<Exam>,
    fees: FeeSummary,
    courses: Vec<Course>,
}

/// Accumulates reply parts while rules run
#[derive(Default)]
struct ReplyBuilder {
    parts: Vec<String>,
    data: BTreeMap<String, f64>,
    suggestions: Vec<String>,
}

pub struct StudyAssistant {
    store: Arc<PortalStore>,
    policy: AttendancePolicy,
}

impl StudyAssistant {
    pub fn new(store: Arc<PortalStore>, policy: AttendancePolicy) -> Self {
        Self { store, policy }
    }

    /// Answer `question` for `student` as of today
    pub async fn ask(&self, student: &User, question: &str) -> Result<AssistantReply, AssistantError> {
        self.ask_on(student, question, chrono::Utc::now().date_naive())
            .await
    }

    /// Answer `question` for `student` as of `today`
    pub async fn ask_on(
        &self,
        student: &User,
        question: &str,
        today: NaiveDate,
    ) -> Result<AssistantReply, AssistantError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AssistantError::EmptyQuestion);
        }
        if question.chars().count() > MAX_QUESTION_LEN {
            return Err(AssistantError::QuestionTooLong);
        }
        if !student.is(Role::Student) {
            return Err(AssistantError::NotAStudent);
        }

        let ctx = self.gather(student, today).await;
        let topics = Topic::detect(question);
        tracing::debug!(student_id = %student.id, ?topics, "Answering study question");

        let mut reply = ReplyBuilder::default();
        if topics.is_empty() {
            self.overview(&ctx, &mut reply);
        }
        for topic in &topics {
            match topic {
                Topic::Attendance => self.attendance(&ctx, &mut reply),
                Topic::Grades => self.grades(&ctx, &mut reply),
                Topic::Fees => fees(&ctx, &mut reply, today),
                Topic::Schedule => schedule(&ctx, &mut reply),
            }
        }

        if reply.suggestions.is_empty() {
            reply.suggestions.push(
                "Review each lecture's notes within a day and keep a short list of open questions for office hours."
                    .to_string(),
            );
        }

        Ok(AssistantReply {
            answer: reply.parts.join(" "),
            topics,
            supporting_data: reply.data,
            suggestions: reply.suggestions,
        })
    }

    async fn gather(&self, student: &User, today: NaiveDate) -> StudentContext {
        let records = self.store.attendance_for(&student.id, None).await;
        let attendance = analytics::by_course(&records, &self.policy);

        let enrolled = self.store.enrollment_view(&student.id).await.map(|v| v.enrolled).unwrap_or_default();

        let mut exams = Vec::new();
        for course in &enrolled {
            exams.extend(self.store.exams(Some(&course.code)).await);
        }
        let grades = self.store.grades_for_student(&student.id).await;
        let results = analytics::grades::exam_results(&exams, &grades);
        let grade_summaries = analytics::grades::course_summaries(&results, &self.policy);

        let mut upcoming: Vec<Exam> = exams.into_iter().filter(|e| e.date >= today).collect();
        upcoming.sort_by_key(|e| e.date);

        let fees = analytics::fees::summarize(&self.store.fees_for(&student.id).await, today);

        StudentContext {
            attendance,
            grades: grade_summaries,
            upcoming,
            fees,
            courses: enrolled,
        }
    }

    fn overview(&self, ctx: &StudentContext, reply: &mut ReplyBuilder) {
        reply.parts.push(format!(
            "You are enrolled in {} course(s) with {}% overall attendance.",
            ctx.courses.len(),
            ctx.attendance.overall.percentage
        ));
        reply
            .data
            .insert("overall_attendance".to_string(), ctx.attendance.overall.percentage as f64);

        if ctx.attendance.at_risk().next().is_some() {
            self.attendance(ctx, reply);
        }
        if let Some(weakest) = weakest_course(&ctx.grades) {
            if weakest.standing.is_at_risk() {
                self.grades(ctx, reply);
            }
        }
        reply.parts.push(
            "Ask about attendance, grades, fees or your schedule for more detail.".to_string(),
        );
    }

    fn attendance(&self, ctx: &StudentContext, reply: &mut ReplyBuilder) {
        let overall = &ctx.attendance.overall;
        reply
            .data
            .insert("overall_attendance".to_string(), overall.percentage as f64);

        let at_risk: Vec<_> = ctx.attendance.at_risk().collect();
        if at_risk.is_empty() {
            reply.parts.push(format!(
                "Your attendance is {}% overall and every course is at or above the {}% requirement.",
                overall.percentage, self.policy.threshold
            ));
            return;
        }

        for course in at_risk {
            reply.parts.push(format!(
                "{} attendance is {}%, below the {}% requirement.",
                course.course_code, course.summary.percentage, self.policy.threshold
            ));
            reply.data.insert(
                format!("{}_attendance", course.course_code.to_lowercase()),
                course.summary.percentage as f64,
            );
            match course.summary.sessions_needed {
                Some(needed) => reply.suggestions.push(format!(
                    "Attend the next {} {} session(s) in a row to get back to {}%.",
                    needed, course.course_code, self.policy.threshold
                )),
                None => reply.suggestions.push(format!(
                    "{} can no longer reach {}% this term; talk to your instructor.",
                    course.course_code, self.policy.threshold
                )),
            }
        }
    }

    fn grades(&self, ctx: &StudentContext, reply: &mut ReplyBuilder) {
        if ctx.grades.is_empty() {
            reply.parts.push("No graded exams are recorded yet.".to_string());
        } else {
            let average = ctx.grades.iter().map(|g| g.percentage as f64).sum::<f64>()
                / ctx.grades.len() as f64;
            reply.data.insert("average_grade".to_string(), average.round());

            if let Some(weakest) = weakest_course(&ctx.grades) {
                reply.parts.push(format!(
                    "Your weakest course is {} at {}% ({}).",
                    weakest.course_code, weakest.percentage, weakest.letter
                ));
                reply.data.insert(
                    format!("{}_grade", weakest.course_code.to_lowercase()),
                    weakest.percentage as f64,
                );
                if weakest.percentage < self.policy.threshold {
                    reply.suggestions.push(format!(
                        "Schedule two focused review sessions a week for {} and work past exam questions.",
                        weakest.course_code
                    ));
                }
            }
        }

        if let Some(next) = ctx.upcoming.first() {
            reply.parts.push(format!(
                "Your next exam is {} {} on {}.",
                next.course_code,
                next.title,
                next.date.format("%Y-%m-%d")
            ));
            reply.suggestions.push(format!(
                "Start revising for {} {} at least a week ahead.",
                next.course_code, next.title
            ));
        }
    }
}

fn fees(ctx: &StudentContext, reply: &mut ReplyBuilder, today: NaiveDate) {
    reply.data.insert("fees_pending".to_string(), ctx.fees.pending);
    reply.data.insert("fees_paid".to_string(), ctx.fees.paid);

    if ctx.fees.pending <= f64::EPSILON {
        reply.parts.push("All of your fees are paid.".to_string());
        return;
    }

    let due = ctx
        .fees
        .next_due
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "soon".to_string());
    reply.parts.push(format!(
        "You have {:.2} in pending fees, next due {}.",
        ctx.fees.pending, due
    ));
    if ctx.fees.overdue {
        reply.suggestions.push(
            "A fee payment is overdue; contact the accounts office to avoid a registration hold."
                .to_string(),
        );
    } else if let Some(next_due) = ctx.fees.next_due {
        let days = (next_due - today).num_days();
        reply.data.insert("days_until_due".to_string(), days as f64);
    }
}

fn schedule(ctx: &StudentContext, reply: &mut ReplyBuilder) {
    if ctx.courses.is_empty() {
        reply
            .parts
            .push("You are not enrolled in any courses yet.".to_string());
        reply
            .suggestions
            .push("Browse the course catalogue and enroll before registration closes.".to_string());
        return;
    }

    let lines: Vec<String> = ctx
        .courses
        .iter()
        .map(|c| format!("{} ({})", c.code, c.schedule))
        .collect();
    reply
        .parts
        .push(format!("Your courses meet as follows: {}.", lines.join(", ")));

    let credits: u32 = ctx.courses.iter().map(|c| c.credits as u32).sum();
    reply.data.insert("enrolled_credits".to_string(), credits as f64);
}

fn weakest_course(grades: &[CourseGradeSummary]) -> Option<&CourseGradeSummary> {
    grades.iter().min_by_key(|g| g.percentage)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assistant() -> StudyAssistant {
        StudyAssistant::new(Arc::new(PortalStore::seeded()), AttendancePolicy::default())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, 1).unwrap()
    }

    async fn student(assistant: &StudyAssistant, id: &str) -> User {
        assistant.store.user(id).await.unwrap()
    }

    #[tokio::test]
    async fn test_rejects_empty_and_long_questions() {
        let a = assistant();
        let alex = student(&a, "STU001").await;
        assert_eq!(a.ask_on(&alex, "   ", today()).await, Err(AssistantError::EmptyQuestion));
        assert_eq!(
            a.ask_on(&alex, &"x".repeat(MAX_QUESTION_LEN + 1), today()).await,
            Err(AssistantError::QuestionTooLong)
        );
    }

    #[tokio::test]
    async fn test_rejects_non_students() {
        let a = assistant();
        let admin = student(&a, "ADM001").await;
        assert_eq!(
            a.ask_on(&admin, "How is my attendance?", today()).await,
            Err(AssistantError::NotAStudent)
        );
    }

    #[tokio::test]
    async fn test_attendance_question_flags_at_risk_course() {
        let a = assistant();
        let alex = student(&a, "STU001").await;
        let reply = a.ask_on(&alex, "Am I missing too many classes?", today()).await.unwrap();

        assert!(reply.topics.contains(&Topic::Attendance));
        assert!(reply.answer.contains("MA201"));
        assert_eq!(reply.supporting_data.get("ma201_attendance"), Some(&70.0));
        assert!(reply.suggestions.iter().any(|s| s.contains("MA201")));
    }

    #[tokio::test]
    async fn test_grades_question_mentions_upcoming_exam() {
        let a = assistant();
        let alex = student(&a, "STU001").await;
        let reply = a.ask_on(&alex, "How should I study for my exams?", today()).await.unwrap();

        assert_eq!(reply.topics, vec![Topic::Grades]);
        assert!(reply.answer.contains("Midterm Exam"));
        assert!(reply.supporting_data.contains_key("average_grade"));
    }

    #[tokio::test]
    async fn test_fee_question() {
        let a = assistant();
        let alex = student(&a, "STU001").await;
        let reply = a.ask_on(&alex, "What fees are due?", today()).await.unwrap();
        assert_eq!(reply.supporting_data.get("fees_pending"), Some(&4050.0));

        let maria = student(&a, "STU002").await;
        let reply = a.ask_on(&maria, "any fees to pay?", today()).await.unwrap();
        assert!(reply.answer.contains("All of your fees are paid"));
    }

    #[test]
    fn test_topic_keywords_match_whole_words() {
        assert_eq!(Topic::detect("Am I missing too many classes?"), vec![Topic::Attendance]);
        assert_eq!(Topic::detect("When do my courses meet?"), vec![Topic::Schedule]);
        assert_eq!(Topic::detect("Which exams should I be studying for?"), vec![Topic::Grades]);
        assert_eq!(Topic::detect("Has my tuition been paid?"), vec![Topic::Fees]);

        assert!(Topic::detect("What is the latest news on the mission?").is_empty());
        assert!(Topic::detect("When is the campus open?").is_empty());
        assert!(Topic::detect("Is there a presentation about the library?").is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_threshold_has_no_session_count() {
        let a = StudyAssistant::new(Arc::new(PortalStore::seeded()), AttendancePolicy::new(100, 100));
        let alex = student(&a, "STU001").await;
        let reply = a.ask_on(&alex, "How is my attendance?", today()).await.unwrap();

        assert!(reply.suggestions.iter().any(|s| s.contains("can no longer reach 100%")));
        assert!(!reply.suggestions.iter().any(|s| s.contains(&u32::MAX.to_string())));
    }

    #[tokio::test]
    async fn test_unrecognized_question_gets_overview() {
        let a = assistant();
        let maria = student(&a, "STU002").await;
        let reply = a.ask_on(&maria, "hello there", today()).await.unwrap();
        assert!(reply.topics.is_empty());
        assert!(reply.answer.contains("2 course(s)"));
        assert!(!reply.suggestions.is_empty());
    }
}
