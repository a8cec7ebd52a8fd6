use chrono::NaiveDate;
use serde::Serialize;

/// Semester index reserved for credits recognised before the program started.
pub const CREDITED_SEMESTER: u32 = 0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseAttempt {
    pub name: String,
    pub ects: u32,
    pub grade: Option<f64>,
    pub passed: bool,
    pub attempt_number: u32,
    pub occurred_on: Option<NaiveDate>,
}

impl CourseAttempt {
    pub fn is_graded(&self) -> bool {
        self.grade.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemesterBucket {
    pub semester: u32,
    pub courses: Vec<CourseAttempt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StudyWeek {
    /// Always the Monday of the ISO week.
    pub week_start: NaiveDate,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramConfig {
    pub ects_required: u32,
    pub planned_duration_months: u32,
    pub start_date: NaiveDate,
}

/// Traffic-light tier, declared worst to best so `Ord` follows quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Red,
    Orange,
    Green,
    LightGreen,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::LightGreen => "light_green",
            Status::Green => "green",
            Status::Orange => "orange",
            Status::Red => "red",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RepeatRatio {
    /// Neither failed courses nor successful retakes.
    Undefined,
    Value(f64),
    /// Failed courses outstanding with no successful retake yet.
    Unbounded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub forecast_end: NaiveDate,
    pub planned_end: NaiveDate,
    pub remaining_ects: u32,
    pub avg_semester_ects: f64,
    pub months_needed: u32,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemesterSummary {
    pub semester: u32,
    pub ects: u32,
    pub average_grade: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub today: NaiveDate,
    pub forecast: Forecast,
    pub weighted_average: Option<f64>,
    pub grade_status: Status,
    pub current_semester: Option<u32>,
    pub semester_ects: u32,
    pub semester_ects_status: Status,
    pub month_ects: u32,
    pub month_ects_status: Status,
    pub pass_rate: Option<f64>,
    pub repeat_ratio: RepeatRatio,
    pub weekly_hours: Option<f64>,
    pub weekly_hours_status: Status,
    pub backlog_modules: u32,
    pub backlog_status: Status,
    pub semesters: Vec<SemesterSummary>,
}
