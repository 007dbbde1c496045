//! Grade aggregation
//!
//! Percentages, letter grades and per-course summaries over exam scores.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::analytics::attendance::{percentage, AttendancePolicy, Standing};
use crate::domain::{Exam, Grade};

/// Letter grade bands: A >= 90, B >= 80, C >= 70, D >= 60, otherwise F
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

impl LetterGrade {
    pub fn from_percentage(pct: u32) -> Self {
        match pct {
            90.. => LetterGrade::A,
            80..=89 => LetterGrade::B,
            70..=79 => LetterGrade::C,
            60..=69 => LetterGrade::D,
            _ => LetterGrade::F,
        }
    }
}

impl std::fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// One exam result for one student
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExamResult {
    pub exam_id: u64,
    pub course_code: String,
    pub title: String,
    pub date: chrono::NaiveDate,
    pub score: f64,
    pub total_marks: f64,
    pub percentage: u32,
    pub letter: LetterGrade,
    pub feedback: String,
}

/// Aggregate of a student's results within one course
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseGradeSummary {
    pub course_code: String,
    pub exams_taken: usize,
    pub score: f64,
    pub total_marks: f64,
    pub percentage: u32,
    pub letter: LetterGrade,
    pub standing: Standing,
}

/// Class-wide statistics for one exam
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExamStatistics {
    pub exam_id: u64,
    pub graded: usize,
    pub average_percentage: u32,
    pub highest_percentage: u32,
    pub lowest_percentage: u32,
    pub letter_distribution: BTreeMap<String, usize>,
}

/// Join a student's grades with their exams, ordered by exam date
pub fn exam_results(exams: &[Exam], grades: &[Grade]) -> Vec<ExamResult> {
    let by_id: HashMap<u64, &Exam> = exams.iter().map(|e| (e.id, e)).collect();

    let mut results: Vec<ExamResult> = grades
        .iter()
        .filter_map(|g| {
            let exam = by_id.get(&g.exam_id)?;
            let pct = percentage(g.score, exam.total_marks);
            Some(ExamResult {
                exam_id: exam.id,
                course_code: exam.course_code.clone(),
                title: exam.title.clone(),
                date: exam.date,
                score: g.score,
                total_marks: exam.total_marks,
                percentage: pct,
                letter: LetterGrade::from_percentage(pct),
                feedback: g.feedback.clone(),
            })
        })
        .collect();

    results.sort_by(|a, b| a.date.cmp(&b.date).then(a.exam_id.cmp(&b.exam_id)));
    results
}

/// Summed score over summed marks per course, in course-code order
pub fn course_summaries(results: &[ExamResult], policy: &AttendancePolicy) -> Vec<CourseGradeSummary> {
    let mut grouped: BTreeMap<&str, (usize, f64, f64)> = BTreeMap::new();
    for r in results {
        let entry = grouped.entry(r.course_code.as_str()).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += r.score;
        entry.2 += r.total_marks;
    }

    grouped
        .into_iter()
        .map(|(code, (count, score, total))| {
            let pct = percentage(score, total);
            CourseGradeSummary {
                course_code: code.to_string(),
                exams_taken: count,
                score,
                total_marks: total,
                percentage: pct,
                letter: LetterGrade::from_percentage(pct),
                standing: policy.standing(pct),
            }
        })
        .collect()
}

/// Statistics for every grade recorded against `exam`
pub fn exam_statistics(exam: &Exam, grades: &[Grade]) -> ExamStatistics {
    let percentages: Vec<u32> = grades
        .iter()
        .filter(|g| g.exam_id == exam.id)
        .map(|g| percentage(g.score, exam.total_marks))
        .collect();

    let mut letter_distribution = BTreeMap::new();
    for pct in &percentages {
        *letter_distribution
            .entry(LetterGrade::from_percentage(*pct).to_string())
            .or_insert(0) += 1;
    }

    let average = if percentages.is_empty() {
        0
    } else {
        (percentages.iter().map(|&p| p as f64).sum::<f64>() / percentages.len() as f64).round() as u32
    };

    ExamStatistics {
        exam_id: exam.id,
        graded: percentages.len(),
        average_percentage: average,
        highest_percentage: percentages.iter().copied().max().unwrap_or(0),
        lowest_percentage: percentages.iter().copied().min().unwrap_or(0),
        letter_distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn exam(id: u64, code: &str, day: u32, total: f64) -> Exam {
        Exam {
            id,
            course_code: code.to_string(),
            title: format!("Exam {}", id),
            date: NaiveDate::from_ymd_opt(2024, 10, day).unwrap(),
            total_marks: total,
        }
    }

    fn grade(id: u64, student: &str, exam_id: u64, score: f64) -> Grade {
        Grade {
            id,
            student_id: student.to_string(),
            exam_id,
            score,
            feedback: String::new(),
        }
    }

    #[test]
    fn test_letter_grade_bands() {
        assert_eq!(LetterGrade::from_percentage(100), LetterGrade::A);
        assert_eq!(LetterGrade::from_percentage(90), LetterGrade::A);
        assert_eq!(LetterGrade::from_percentage(89), LetterGrade::B);
        assert_eq!(LetterGrade::from_percentage(60), LetterGrade::D);
        assert_eq!(LetterGrade::from_percentage(59), LetterGrade::F);
    }

    #[test]
    fn test_exam_results_join_and_order() {
        let exams = vec![exam(1, "CS101", 20, 50.0), exam(2, "CS101", 5, 100.0)];
        let grades = vec![grade(1, "STU001", 1, 45.0), grade(2, "STU001", 2, 72.0), grade(3, "STU001", 99, 1.0)];

        let results = exam_results(&exams, &grades);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].exam_id, 2);
        assert_eq!(results[0].percentage, 72);
        assert_eq!(results[1].percentage, 90);
        assert_eq!(results[1].letter, LetterGrade::A);
    }

    #[test]
    fn test_course_summary_uses_summed_marks() {
        let exams = vec![exam(1, "CS101", 1, 50.0), exam(2, "CS101", 2, 150.0), exam(3, "MA201", 3, 100.0)];
        let grades = vec![grade(1, "S", 1, 50.0), grade(2, "S", 2, 75.0), grade(3, "S", 3, 40.0)];
        let results = exam_results(&exams, &grades);

        let summaries = course_summaries(&results, &AttendancePolicy::default());
        assert_eq!(summaries.len(), 2);
        // 125 / 200
        assert_eq!(summaries[0].percentage, 63);
        assert_eq!(summaries[0].exams_taken, 2);
        assert_eq!(summaries[1].standing, Standing::AtRisk);
    }

    #[test]
    fn test_exam_statistics() {
        let e = exam(1, "CS101", 1, 20.0);
        let grades = vec![grade(1, "A", 1, 20.0), grade(2, "B", 1, 10.0), grade(3, "C", 1, 15.0), grade(4, "D", 2, 1.0)];

        let stats = exam_statistics(&e, &grades);
        assert_eq!(stats.graded, 3);
        assert_eq!(stats.highest_percentage, 100);
        assert_eq!(stats.lowest_percentage, 50);
        assert_eq!(stats.average_percentage, 75);
        assert_eq!(stats.letter_distribution.get("A"), Some(&1));
    }

    #[test]
    fn test_exam_statistics_empty() {
        let stats = exam_statistics(&exam(7, "CS101", 1, 10.0), &[]);
        assert_eq!(stats.graded, 0);
        assert_eq!(stats.average_percentage, 0);
    }
}
