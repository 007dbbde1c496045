//! Attendance aggregation
//!
//! Turns a sequence of per-session statuses into attended/missed counts, a
//! rounded percentage and a standing label measured against the attendance
//! policy breakpoints.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{AttendanceRecord, AttendanceStatus};

/// Percentage breakpoints used for standing labels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttendancePolicy {
    /// Minimum percentage before a course is flagged at risk
    pub threshold: u32,
    /// Percentage at or above which standing is excellent
    pub excellent: u32,
}

impl Default for AttendancePolicy {
    fn default() -> Self {
        Self {
            threshold: 75,
            excellent: 90,
        }
    }
}

impl AttendancePolicy {
    pub fn new(threshold: u32, excellent: u32) -> Self {
        Self {
            threshold,
            excellent,
        }
    }

    /// Map a percentage onto a standing. Breakpoints are inclusive.
    pub fn standing(&self, percentage: u32) -> Standing {
        if percentage >= self.excellent {
            Standing::Excellent
        } else if percentage >= self.threshold {
            Standing::Good
        } else {
            Standing::AtRisk
        }
    }
}

/// Categorical label derived from a percentage
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    Excellent,
    Good,
    AtRisk,
}

impl Standing {
    pub fn label(&self) -> &'static str {
        match self {
            Standing::Excellent => "Excellent",
            Standing::Good => "Good",
            Standing::AtRisk => "At Risk",
        }
    }

    pub fn is_at_risk(&self) -> bool {
        matches!(self, Standing::AtRisk)
    }
}

impl std::fmt::Display for Standing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// `round(part / total * 100)` clamped to `[0, 100]`; zero when `total` is zero.
pub fn percentage(part: f64, total: f64) -> u32 {
    if total <= 0.0 || !part.is_finite() || !total.is_finite() {
        return 0;
    }
    let pct = (part / total * 100.0).round();
    pct.clamp(0.0, 100.0) as u32
}

/// Aggregated attendance for one course or overall
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceSummary {
    pub attended: u32,
    pub missed: u32,
    pub total: u32,
    pub percentage: u32,
    pub standing: Standing,
    /// Consecutive sessions that must be attended to reach the threshold.
    /// `None` when no number of sessions can reach it.
    pub sessions_needed: Option<u32>,
    /// Sessions that can still be missed without dropping below the threshold.
    /// `None` when there is no limit.
    pub can_miss: Option<u32>,
}

/// Summarize an ordered sequence of session statuses
pub fn summarize<I>(statuses: I, policy: &AttendancePolicy) -> AttendanceSummary
where
    I: IntoIterator<Item = AttendanceStatus>,
{
    let (mut attended, mut missed) = (0u32, 0u32);
    for status in statuses {
        match status {
            AttendanceStatus::Present => attended += 1,
            AttendanceStatus::Absent => missed += 1,
        }
    }
    let total = attended + missed;
    let pct = percentage(attended as f64, total as f64);

    AttendanceSummary {
        attended,
        missed,
        total,
        percentage: pct,
        standing: policy.standing(pct),
        sessions_needed: sessions_needed(attended, total, policy.threshold),
        can_miss: can_miss(attended, total, policy.threshold),
    }
}

/// Smallest n with (attended + n) / (total + n) >= threshold
fn sessions_needed(attended: u32, total: u32, threshold: u32) -> Option<u32> {
    let deficit = threshold as i64 * total as i64 - 100 * attended as i64;
    if deficit <= 0 {
        return Some(0);
    }
    if threshold >= 100 {
        return None;
    }
    let step = (100 - threshold) as i64;
    u32::try_from((deficit + step - 1) / step).ok()
}

/// Largest n with attended / (total + n) >= threshold
fn can_miss(attended: u32, total: u32, threshold: u32) -> Option<u32> {
    if threshold == 0 {
        return None;
    }
    let surplus = 100 * attended as i64 - threshold as i64 * total as i64;
    if surplus <= 0 {
        return Some(0);
    }
    u32::try_from(surplus / threshold as i64).ok()
}

/// Per-course attendance plus the overall figure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceBreakdown {
    pub courses: Vec<CourseAttendance>,
    pub overall: AttendanceSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseAttendance {
    pub course_code: String,
    pub summary: AttendanceSummary,
}

impl AttendanceBreakdown {
    /// Courses whose standing is below the threshold
    pub fn at_risk(&self) -> impl Iterator<Item = &CourseAttendance> {
        self.courses.iter().filter(|c| c.summary.standing.is_at_risk())
    }
}

/// Group records by course (in course-code order) and summarize each
pub fn by_course(records: &[AttendanceRecord], policy: &AttendancePolicy) -> AttendanceBreakdown {
    let mut grouped: BTreeMap<&str, Vec<AttendanceStatus>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(record.course_code.as_str())
            .or_default()
            .push(record.status);
    }

    let courses = grouped
        .into_iter()
        .map(|(code, statuses)| CourseAttendance {
            course_code: code.to_string(),
            summary: summarize(statuses, policy),
        })
        .collect();

    AttendanceBreakdown {
        courses,
        overall: summarize(records.iter().map(|r| r.status), policy),
    }
}
