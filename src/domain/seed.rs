//! Mock records loaded into a fresh store
//!
//! Sign-in accounts:
//! - `alex.johnson@university.edu` / `student123`
//! - `maria.garcia@university.edu` / `student123`
//! - `james.chen@university.edu` / `student123`
//! - `sarah.wilson@university.edu` / `faculty123`
//! - `robert.brown@university.edu` / `faculty123`
//! - `admin@university.edu` / `admin123`

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use std::collections::HashMap;

use crate::domain::credentials::Credentials;
use crate::domain::types::*;

/// Everything a seeded store starts with
pub struct SeedData {
    pub accounts: Vec<(User, Credentials)>,
    pub courses: Vec<Course>,
    pub enrollments: HashMap<String, Vec<String>>,
    pub attendance: Vec<AttendanceRecord>,
    pub exams: Vec<Exam>,
    pub grades: Vec<Grade>,
    pub announcements: Vec<Announcement>,
    pub fees: Vec<FeeRecord>,
    pub faculty: Vec<FacultyMember>,
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default()
}

fn posted(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0)
        .single()
        .unwrap_or_default()
}

pub fn mock_data() -> SeedData {
    let mut next_id = 1u64;
    let mut id = || {
        let v = next_id;
        next_id += 1;
        v
    };

    let accounts = vec![
        (
            User::new("STU001", "Alex Johnson", "alex.johnson@university.edu", Role::Student)
                .avatar("avatars/alex.png")
                .department("Computer Science"),
            Credentials::new("student123"),
        ),
        (
            User::new("STU002", "Maria Garcia", "maria.garcia@university.edu", Role::Student)
                .department("Mathematics"),
            Credentials::new("student123"),
        ),
        (
            User::new("STU003", "James Chen", "james.chen@university.edu", Role::Student)
                .department("Computer Science"),
            Credentials::new("student123"),
        ),
        (
            User::new("FAC001", "Dr. Sarah Wilson", "sarah.wilson@university.edu", Role::Faculty)
                .department("Computer Science"),
            Credentials::new("faculty123"),
        ),
        (
            User::new("FAC002", "Dr. Robert Brown", "robert.brown@university.edu", Role::Faculty)
                .department("Mathematics"),
            Credentials::new("faculty123"),
        ),
        (
            User::new("ADM001", "Registrar Office", "admin@university.edu", Role::Admin),
            Credentials::new("admin123"),
        ),
    ];

    let courses = vec![
        Course::new("CS101", "Introduction to Programming", 4)
            .department("Computer Science")
            .instructor("Dr. Sarah Wilson")
            .schedule("Mon, Wed 09:00-10:30")
            .description("Fundamentals of programming: variables, control flow, functions and testing."),
        Course::new("CS201", "Data Structures", 4)
            .department("Computer Science")
            .instructor("Dr. Sarah Wilson")
            .schedule("Tue, Thu 11:00-12:30")
            .description("Lists, trees, hash tables and graphs with complexity analysis."),
        Course::new("CS301", "Database Systems", 3)
            .department("Computer Science")
            .instructor("Dr. Sarah Wilson")
            .schedule("Fri 13:00-16:00")
            .description("Relational modelling, SQL, transactions and indexing."),
        Course::new("MA101", "Calculus I", 4)
            .department("Mathematics")
            .instructor("Dr. Robert Brown")
            .schedule("Mon, Wed, Fri 08:00-09:00")
            .description("Limits, derivatives and integrals of single-variable functions."),
        Course::new("MA201", "Linear Algebra", 3)
            .department("Mathematics")
            .instructor("Dr. Robert Brown")
            .schedule("Tue, Thu 14:00-15:30")
            .description("Vector spaces, linear maps, eigenvalues and matrix decompositions."),
        Course::new("PH101", "Physics I", 4)
            .department("Physics")
            .instructor("Dr. Emily Davis")
            .schedule("Mon, Thu 10:00-11:30")
            .description("Classical mechanics: kinematics, Newton's laws, energy and momentum."),
    ];

    let enrollments: HashMap<String, Vec<String>> = [
        ("STU001", vec!["CS101", "MA201", "PH101"]),
        ("STU002", vec!["CS101", "MA101"]),
        ("STU003", vec!["CS201", "MA201"]),
    ]
    .into_iter()
    .map(|(s, codes)| (s.to_string(), codes.into_iter().map(String::from).collect()))
    .collect();

    // P = present, A = absent, M = absent with medical reason
    let sessions = [
        ("STU001", "CS101", "PPPPPPPPPA", "Lab 2", (9, 0), (10, 30)),
        ("STU001", "MA201", "PPAPMPPAPP", "Room 204", (14, 0), (15, 30)),
        ("STU001", "PH101", "PPPPMPPPPP", "Hall B", (10, 0), (11, 30)),
        ("STU002", "CS101", "PPPPPPPPPP", "Lab 2", (9, 0), (10, 30)),
        ("STU002", "MA101", "PAPPPAPPPP", "Room 101", (8, 0), (9, 0)),
        ("STU003", "CS201", "PPPPPPPPAP", "Lab 3", (11, 0), (12, 30)),
        ("STU003", "MA201", "APAPPMPPAP", "Room 204", (14, 0), (15, 30)),
    ];

    let first_session = day(2024, 9, 2);
    let mut attendance = Vec::new();
    for (student, course, pattern, location, start, end) in sessions {
        for (week, mark) in pattern.chars().enumerate() {
            let (status, reason) = match mark {
                'P' => (AttendanceStatus::Present, None),
                'M' => (AttendanceStatus::Absent, Some("Medical leave".to_string())),
                _ => (AttendanceStatus::Absent, None),
            };
            attendance.push(AttendanceRecord {
                id: id(),
                student_id: student.to_string(),
                course_code: course.to_string(),
                date: first_session + Duration::weeks(week as i64),
                start_time: at(start.0, start.1),
                end_time: at(end.0, end.1),
                location: location.to_string(),
                status,
                reason,
            });
        }
    }

    let mut exams = Vec::new();
    for (course, offset) in [("CS101", 0), ("CS201", 1), ("MA101", 2), ("MA201", 3), ("PH101", 4)] {
        exams.push(Exam {
            id: id(),
            course_code: course.to_string(),
            title: "Quiz 1".to_string(),
            date: day(2024, 9, 20) + Duration::days(offset),
            total_marks: 20.0,
        });
        exams.push(Exam {
            id: id(),
            course_code: course.to_string(),
            title: "Midterm Exam".to_string(),
            date: day(2024, 10, 14) + Duration::days(offset),
            total_marks: 50.0,
        });
    }

    let scores: [(&str, &str, f64, f64, &str); 7] = [
        ("STU001", "CS101", 18.0, 44.0, "Strong grasp of control flow."),
        ("STU001", "MA201", 12.0, 31.0, "Review eigenvector computations."),
        ("STU001", "PH101", 16.0, 38.0, "Good problem setup, watch units."),
        ("STU002", "CS101", 19.0, 47.0, "Excellent work."),
        ("STU002", "MA101", 15.0, 36.0, "Practice chain rule problems."),
        ("STU003", "CS201", 17.0, 41.0, "Clear complexity analysis."),
        ("STU003", "MA201", 11.0, 27.0, "Attend office hours for row reduction."),
    ];
    let mut grades = Vec::new();
    for (student, course, quiz, midterm, feedback) in scores {
        for exam in exams.iter().filter(|e| e.course_code == course) {
            let score = if exam.total_marks <= 20.0 { quiz } else { midterm };
            grades.push(Grade {
                id: id(),
                student_id: student.to_string(),
                exam_id: exam.id,
                score,
                feedback: feedback.to_string(),
            });
        }
    }

    let announcements = vec![
        Announcement {
            id: id(),
            title: "Fall semester registration closes Friday".to_string(),
            body: "Add/drop for all courses closes this Friday at 17:00.".to_string(),
            author: "Registrar Office".to_string(),
            kind: AnnouncementType::Administrative,
            audience: Audience::Global,
            important: true,
            posted_at: posted(2024, 9, 3, 9),
        },
        Announcement {
            id: id(),
            title: "CS101 midterm room change".to_string(),
            body: "The CS101 midterm will be held in Hall A instead of Lab 2.".to_string(),
            author: "Dr. Sarah Wilson".to_string(),
            kind: AnnouncementType::Exam,
            audience: Audience::Course("CS101".to_string()),
            important: true,
            posted_at: posted(2024, 10, 7, 14),
        },
        Announcement {
            id: id(),
            title: "Linear Algebra problem set 3 released".to_string(),
            body: "Problem set 3 covering determinants is due next Thursday.".to_string(),
            author: "Dr. Robert Brown".to_string(),
            kind: AnnouncementType::Academic,
            audience: Audience::Course("MA201".to_string()),
            important: false,
            posted_at: posted(2024, 9, 24, 11),
        },
        Announcement {
            id: id(),
            title: "Career fair on campus".to_string(),
            body: "Over forty employers will attend the career fair in the main hall.".to_string(),
            author: "Student Affairs".to_string(),
            kind: AnnouncementType::Event,
            audience: Audience::Global,
            important: false,
            posted_at: posted(2024, 9, 28, 10),
        },
        Announcement {
            id: id(),
            title: "Library hours extended during exams".to_string(),
            body: "The library will stay open until midnight during the exam period.".to_string(),
            author: "Library Services".to_string(),
            kind: AnnouncementType::General,
            audience: Audience::Global,
            important: false,
            posted_at: posted(2024, 10, 1, 8),
        },
        Announcement {
            id: id(),
            title: "Data Structures lab moved online".to_string(),
            body: "This week's CS201 lab runs online; the link is on the course page.".to_string(),
            author: "Dr. Sarah Wilson".to_string(),
            kind: AnnouncementType::Academic,
            audience: Audience::Course("CS201".to_string()),
            important: false,
            posted_at: posted(2024, 10, 2, 16),
        },
    ];

    let mut fees = Vec::new();
    for (student, hostel, fall_paid) in [("STU001", 1200.0, 2500.0), ("STU002", 0.0, 5350.0), ("STU003", 1200.0, 0.0)] {
        fees.push(FeeRecord {
            id: id(),
            student_id: student.to_string(),
            term: "Spring 2024".to_string(),
            due_date: day(2024, 1, 31),
            items: vec![
                FeeItem { category: FeeCategory::Tuition, amount: 4500.0 },
                FeeItem { category: FeeCategory::Library, amount: 150.0 },
            ],
            paid: 4650.0,
        });
        let mut items = vec![
            FeeItem { category: FeeCategory::Tuition, amount: 4500.0 },
            FeeItem { category: FeeCategory::Laboratory, amount: 350.0 },
            FeeItem { category: FeeCategory::Library, amount: 150.0 },
            FeeItem { category: FeeCategory::Examination, amount: 350.0 },
        ];
        if hostel > 0.0 {
            items.push(FeeItem { category: FeeCategory::Hostel, amount: hostel });
        }
        fees.push(FeeRecord {
            id: id(),
            student_id: student.to_string(),
            term: "Fall 2024".to_string(),
            due_date: day(2024, 10, 31),
            items,
            paid: fall_paid,
        });
    }

    let faculty = vec![
        FacultyMember {
            id: "FAC001".to_string(),
            name: "Dr. Sarah Wilson".to_string(),
            email: "sarah.wilson@university.edu".to_string(),
            department: "Computer Science".to_string(),
            designation: "Associate Professor".to_string(),
            courses: vec!["CS101".to_string(), "CS201".to_string(), "CS301".to_string()],
        },
        FacultyMember {
            id: "FAC002".to_string(),
            name: "Dr. Robert Brown".to_string(),
            email: "robert.brown@university.edu".to_string(),
            department: "Mathematics".to_string(),
            designation: "Professor".to_string(),
            courses: vec!["MA101".to_string(), "MA201".to_string()],
        },
        FacultyMember {
            id: "FAC003".to_string(),
            name: "Dr. Emily Davis".to_string(),
            email: "emily.davis@university.edu".to_string(),
            department: "Physics".to_string(),
            designation: "Assistant Professor".to_string(),
            courses: vec!["PH101".to_string()],
        },
        FacultyMember {
            id: "FAC004".to_string(),
            name: "Dr. Michael Lee".to_string(),
            email: "michael.lee@university.edu".to_string(),
            department: "Computer Science".to_string(),
            designation: "Lecturer".to_string(),
            courses: Vec::new(),
        },
    ];

    SeedData {
        accounts,
        courses,
        enrollments,
        attendance,
        exams,
        grades,
        announcements,
        fees,
        faculty,
    }
}

/// Profiles served when no hosted backend is configured
pub fn mock_profiles() -> Vec<StudentProfile> {
    let rows = [
        ("STU001", "Alex Johnson", "alex.johnson@university.edu", "Computer Science", 2, Some("555-0101")),
        ("STU002", "Maria Garcia", "maria.garcia@university.edu", "Mathematics", 1, None),
        ("STU003", "James Chen", "james.chen@university.edu", "Computer Science", 3, Some("555-0103")),
        ("STU004", "Priya Patel", "priya.patel@university.edu", "Physics", 2, None),
        ("STU005", "Daniel Okafor", "daniel.okafor@university.edu", "Mathematics", 4, Some("555-0105")),
        ("STU006", "Sofia Rossi", "sofia.rossi@university.edu", "Computer Science", 1, None),
    ];

    rows.into_iter()
        .map(|(id, name, email, program, year, phone)| StudentProfile {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            program: program.to_string(),
            year,
            phone: phone.map(String::from),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_ids_are_unique() {
        let seed = mock_data();
        let mut ids: Vec<u64> = seed.attendance.iter().map(|r| r.id).collect();
        ids.extend(seed.exams.iter().map(|e| e.id));
        ids.extend(seed.grades.iter().map(|g| g.id));
        ids.extend(seed.announcements.iter().map(|a| a.id));
        ids.extend(seed.fees.iter().map(|f| f.id));
        let count = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), count);
    }

    #[test]
    fn test_seed_enrollments_reference_courses() {
        let seed = mock_data();
        for codes in seed.enrollments.values() {
            for code in codes {
                assert!(seed.courses.iter().any(|c| c.has_code(code)), "{}", code);
            }
        }
    }

    #[test]
    fn test_seed_accounts_verify() {
        let seed = mock_data();
        let (user, creds) = &seed.accounts[0];
        assert_eq!(user.role, Role::Student);
        assert!(creds.verify("student123"));
    }
}
