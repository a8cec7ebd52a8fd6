use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use chrono::{Datelike, Duration, NaiveDate};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::error::{ConfigError, DataFormatError, EntryError};
use crate::models::{CourseAttempt, ProgramConfig, SemesterBucket, StudyWeek};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DEFAULT_PLANNED_MONTHS: u32 = 36;
const FAILING_GRADE: f64 = 5.0;

pub fn load_document(path: &Path) -> anyhow::Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read data file {}", path.display()))?;
    let doc: Value = serde_json::from_str(&raw)
        .with_context(|| format!("data file {} is not valid JSON", path.display()))?;
    info!(path = %path.display(), "loaded study data");
    Ok(doc)
}

pub fn save_document(path: &Path, doc: &Value) -> anyhow::Result<()> {
    let mut body = serde_json::to_string_pretty(doc)?;
    body.push('\n');
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, body)
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to replace data file {}", path.display()))?;
    info!(path = %path.display(), "saved study data");
    Ok(())
}

/// Everything a computation pass needs, decoded once from the document.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub config: ProgramConfig,
    pub buckets: Vec<SemesterBucket>,
    pub weeks: Vec<StudyWeek>,
}

impl Snapshot {
    pub fn from_document(doc: &Value) -> anyhow::Result<Self> {
        Ok(Self {
            config: resolve_program_config(doc)?,
            buckets: semester_buckets(doc)?,
            weeks: study_weeks(doc)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Record normalization
// ---------------------------------------------------------------------------

/// The two persisted layouts for exam results.
enum RecordShape<'a> {
    /// `grades: [{semester, courses: [...]}]`
    Grouped(&'a Value),
    /// `exams: [{semester, prüfungsname, ects, note, versuch, datum}]`
    Flat(&'a Value),
    Empty,
}

fn detect_shape(doc: &Value) -> RecordShape<'_> {
    if let Some(grades) = doc.get("grades") {
        RecordShape::Grouped(grades)
    } else if let Some(exams) = doc.get("exams") {
        RecordShape::Flat(exams)
    } else {
        RecordShape::Empty
    }
}

pub fn semester_buckets(doc: &Value) -> Result<Vec<SemesterBucket>, DataFormatError> {
    let buckets = match detect_shape(doc) {
        RecordShape::Grouped(grades) => decode_grouped(grades)?,
        RecordShape::Flat(exams) => decode_flat(exams)?,
        RecordShape::Empty => Vec::new(),
    };
    debug!(
        semesters = buckets.len(),
        attempts = buckets.iter().map(|b| b.courses.len()).sum::<usize>(),
        "normalized exam records"
    );
    Ok(buckets)
}

#[derive(Deserialize)]
struct RawSemester {
    semester: Option<u32>,
    #[serde(default)]
    courses: Vec<Value>,
}

#[derive(Deserialize)]
struct RawCourse {
    name: Option<String>,
    ects: Option<u32>,
    grade: Option<f64>,
    #[serde(default = "passed_by_default")]
    passed: Value,
    attempt: Option<u32>,
    date: Option<String>,
}

fn passed_by_default() -> Value {
    Value::Bool(true)
}

#[derive(Deserialize)]
struct RawExam {
    semester: Option<u32>,
    #[serde(rename = "prüfungsname")]
    exam_name: Option<String>,
    name: Option<String>,
    ects: Option<u32>,
    note: Option<f64>,
    versuch: Option<u32>,
    datum: Option<String>,
}

fn decode_grouped(grades: &Value) -> Result<Vec<SemesterBucket>, DataFormatError> {
    let entries = as_list(grades, "grades", "grades")?;
    let mut buckets = Vec::with_capacity(entries.len());

    for (i, entry) in entries.iter().enumerate() {
        let record = format!("grades[{i}]");
        let raw: RawSemester = decode(entry, &record)?;
        let semester = raw.semester.ok_or_else(|| missing(&record, "semester"))?;

        let mut courses = Vec::with_capacity(raw.courses.len());
        for (j, value) in raw.courses.iter().enumerate() {
            let record = format!("grades[{i}].courses[{j}]");
            let course: RawCourse = decode(value, &record)?;
            courses.push(CourseAttempt {
                name: course.name.ok_or_else(|| missing(&record, "name"))?,
                ects: course.ects.ok_or_else(|| missing(&record, "ects"))?,
                grade: course.grade,
                passed: truthy(&course.passed),
                attempt_number: course.attempt.unwrap_or(1),
                occurred_on: parse_optional_date(course.date.as_deref(), &record)?,
            });
        }
        buckets.push(SemesterBucket { semester, courses });
    }

    Ok(buckets)
}

fn decode_flat(exams: &Value) -> Result<Vec<SemesterBucket>, DataFormatError> {
    let entries = as_list(exams, "exams", "exams")?;
    let mut by_semester: BTreeMap<u32, Vec<CourseAttempt>> = BTreeMap::new();

    for (i, entry) in entries.iter().enumerate() {
        let record = format!("exams[{i}]");
        let exam: RawExam = decode(entry, &record)?;
        let semester = exam.semester.ok_or_else(|| missing(&record, "semester"))?;
        let name = non_empty(exam.exam_name)
            .or_else(|| non_empty(exam.name))
            .ok_or_else(|| missing(&record, "prüfungsname"))?;

        by_semester.entry(semester).or_default().push(CourseAttempt {
            name,
            ects: exam.ects.ok_or_else(|| missing(&record, "ects"))?,
            grade: exam.note,
            passed: passed_for_grade(exam.note),
            attempt_number: exam.versuch.unwrap_or(1),
            occurred_on: parse_optional_date(exam.datum.as_deref(), &record)?,
        });
    }

    Ok(by_semester
        .into_iter()
        .map(|(semester, courses)| SemesterBucket { semester, courses })
        .collect())
}

/// A 5.0 fails the attempt; anything better, or no grade yet, counts as passed.
pub fn passed_for_grade(grade: Option<f64>) -> bool {
    !matches!(grade, Some(g) if g >= FAILING_GRADE)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Number(n) => n.as_u64() == Some(1),
        Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "1" | "ja" | "yes" | "y"
        ),
        _ => false,
    }
}

fn decode<T: DeserializeOwned>(value: &Value, record: &str) -> Result<T, DataFormatError> {
    T::deserialize(value).map_err(|source| DataFormatError::Malformed {
        record: record.to_string(),
        source,
    })
}

fn as_list<'a>(
    value: &'a Value,
    record: &str,
    section: &'static str,
) -> Result<&'a Vec<Value>, DataFormatError> {
    value.as_array().ok_or_else(|| DataFormatError::NotAList {
        record: record.to_string(),
        section,
    })
}

fn missing(record: &str, field: &'static str) -> DataFormatError {
    DataFormatError::MissingField {
        record: record.to_string(),
        field,
    }
}

fn parse_date(value: &str, record: &str) -> Result<NaiveDate, DataFormatError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|source| DataFormatError::InvalidDate {
        record: record.to_string(),
        value: value.to_string(),
        source,
    })
}

fn parse_optional_date(
    value: Option<&str>,
    record: &str,
) -> Result<Option<NaiveDate>, DataFormatError> {
    match value {
        Some(text) if !text.is_empty() => parse_date(text, record).map(Some),
        _ => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Program configuration
// ---------------------------------------------------------------------------

#[derive(Deserialize, Default)]
struct RawGeneral {
    ects_required: Option<u32>,
    total_ects: Option<u32>,
    planned_duration_months: Option<u32>,
    ziel_monate: Option<u32>,
    start_date: Option<String>,
    startdatum: Option<String>,
}

/// Resolves the program settings from `general` or the older `studieninfo`
/// section. Only the planned duration has a default.
pub fn resolve_program_config(doc: &Value) -> Result<ProgramConfig, ConfigError> {
    let (ects_required, planned_months, start_date) = if let Some(section) = doc.get("general") {
        let raw = decode_section(section, "general")?;
        (
            raw.ects_required.or(raw.total_ects),
            raw.planned_duration_months.or(raw.ziel_monate),
            non_empty(raw.start_date).or_else(|| non_empty(raw.startdatum)),
        )
    } else if let Some(section) = doc.get("studieninfo") {
        let raw = decode_section(section, "studieninfo")?;
        (raw.total_ects, raw.ziel_monate, non_empty(raw.startdatum))
    } else {
        (None, None, None)
    };

    let ects_required = ects_required.ok_or(ConfigError::MissingKey("ects_required"))?;
    let start_text = start_date.ok_or(ConfigError::MissingKey("start_date"))?;
    let start_date = NaiveDate::parse_from_str(&start_text, DATE_FORMAT).map_err(|_| {
        ConfigError::InvalidValue {
            key: "start_date",
            value: start_text.clone(),
        }
    })?;

    Ok(ProgramConfig {
        ects_required,
        planned_duration_months: planned_months.unwrap_or(DEFAULT_PLANNED_MONTHS),
        start_date,
    })
}

fn decode_section(section: &Value, key: &'static str) -> Result<RawGeneral, ConfigError> {
    RawGeneral::deserialize(section).map_err(|err| ConfigError::InvalidValue {
        key,
        value: err.to_string(),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Study time
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RawWeek {
    week_start: Option<String>,
    hours: Option<f64>,
}

pub fn week_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

pub fn study_weeks(doc: &Value) -> Result<Vec<StudyWeek>, DataFormatError> {
    let Some(section) = doc.get("study_time") else {
        return Ok(Vec::new());
    };
    let entries = as_list(section, "study_time", "study_time")?;
    let mut weeks = Vec::with_capacity(entries.len());

    for (i, entry) in entries.iter().enumerate() {
        let record = format!("study_time[{i}]");
        let raw: RawWeek = decode(entry, &record)?;
        let start = raw.week_start.ok_or_else(|| missing(&record, "week_start"))?;
        let hours = raw.hours.ok_or_else(|| missing(&record, "hours"))?;
        if !hours.is_finite() || hours < 0.0 {
            return Err(DataFormatError::InvalidValue {
                record,
                field: "hours",
                value: hours.to_string(),
            });
        }
        weeks.push(StudyWeek {
            week_start: week_monday(parse_date(&start, &record)?),
            hours,
        });
    }

    Ok(weeks)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekChange {
    Inserted,
    Updated,
    Removed,
}

/// Upserts the hours for the week containing `date`. Zero hours removes the week.
pub fn record_study_week(
    doc: &mut Value,
    date: NaiveDate,
    hours: f64,
) -> Result<(NaiveDate, WeekChange), EntryError> {
    if !hours.is_finite() {
        return Err(EntryError::InvalidHours(hours));
    }
    if hours < 0.0 {
        return Err(EntryError::NegativeHours(hours));
    }
    let monday = week_monday(date);
    let week_iso = monday.format(DATE_FORMAT).to_string();
    let weeks = list_section(doc, "study_time")?;

    let existing = weeks.iter().position(|w| {
        w.get("week_start")
            .and_then(Value::as_str)
            .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
            .map(week_monday)
            == Some(monday)
    });

    let change = match (existing, hours == 0.0) {
        (Some(index), true) => {
            weeks.remove(index);
            WeekChange::Removed
        }
        (None, true) => return Err(EntryError::NothingToDelete(monday)),
        (Some(index), false) => {
            weeks[index]["hours"] = json!(hours);
            WeekChange::Updated
        }
        (None, false) => {
            weeks.push(json!({ "week_start": week_iso, "hours": hours }));
            weeks.sort_by(|a, b| {
                let key = |w: &Value| {
                    w.get("week_start")
                        .and_then(Value::as_str)
                        .map(str::to_owned)
                };
                key(a).cmp(&key(b))
            });
            WeekChange::Inserted
        }
    };

    debug!(week = %monday, hours, ?change, "recorded study week");
    Ok((monday, change))
}

// ---------------------------------------------------------------------------
// Exam entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct NewExam {
    pub semester: u32,
    pub name: String,
    pub ects: u32,
    pub date: NaiveDate,
    pub grade: Option<f64>,
    pub attempt: u32,
}

#[derive(Deserialize)]
struct CsvExam {
    semester: u32,
    name: String,
    ects: u32,
    date: NaiveDate,
    grade: Option<f64>,
    attempt: Option<u32>,
}

impl From<CsvExam> for NewExam {
    fn from(row: CsvExam) -> Self {
        Self {
            semester: row.semester,
            name: row.name,
            ects: row.ects,
            date: row.date,
            grade: row.grade,
            attempt: row.attempt.unwrap_or(1),
        }
    }
}

impl NewExam {
    pub fn validate(&self) -> Result<(), EntryError> {
        if self.semester < 1 {
            return Err(EntryError::InvalidSemester(self.semester));
        }
        if self.ects == 0 {
            return Err(EntryError::ZeroEcts);
        }
        if self.attempt < 1 {
            return Err(EntryError::InvalidAttempt(self.attempt));
        }
        if let Some(grade) = self.grade {
            if !(1.0..=5.0).contains(&grade) {
                return Err(EntryError::GradeOutOfRange(grade));
            }
        }
        Ok(())
    }
}

/// Appends an exam result in whichever layout the document already uses.
pub fn add_exam(doc: &mut Value, exam: &NewExam) -> Result<(), EntryError> {
    exam.validate()?;
    let date = exam.date.format(DATE_FORMAT).to_string();

    if doc.get("grades").is_some() {
        let mut course = Map::new();
        course.insert("name".into(), json!(exam.name));
        course.insert("ects".into(), json!(exam.ects));
        if let Some(grade) = exam.grade {
            course.insert("grade".into(), json!(grade));
        }
        course.insert("passed".into(), json!(passed_for_grade(exam.grade)));
        course.insert("attempt".into(), json!(exam.attempt));
        course.insert("date".into(), json!(date));

        let semesters = list_section(doc, "grades")?;
        let position = semesters.iter().position(|s| {
            s.get("semester").and_then(Value::as_u64) == Some(u64::from(exam.semester))
        });
        let bucket = match position {
            Some(index) => &mut semesters[index],
            None => {
                semesters.push(json!({ "semester": exam.semester, "courses": [] }));
                let last = semesters.len() - 1;
                &mut semesters[last]
            }
        };
        let courses = bucket
            .as_object_mut()
            .ok_or(EntryError::NotAnObject)?
            .entry("courses")
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
            .ok_or(EntryError::NotAList("courses"))?;
        courses.push(Value::Object(course));
    } else {
        let mut entry = Map::new();
        entry.insert("semester".into(), json!(exam.semester));
        entry.insert("prüfungsname".into(), json!(exam.name));
        entry.insert("ects".into(), json!(exam.ects));
        entry.insert("versuch".into(), json!(exam.attempt));
        entry.insert("datum".into(), json!(date));
        if let Some(grade) = exam.grade {
            entry.insert("note".into(), json!(grade));
        }
        list_section(doc, "exams")?.push(Value::Object(entry));
    }

    debug!(name = %exam.name, semester = exam.semester, attempt = exam.attempt, "added exam");
    Ok(())
}

/// Adds every row of a `semester,name,ects,date,grade,attempt` CSV.
/// The document is left untouched when any row is rejected.
pub fn import_exams_csv<R: std::io::Read>(doc: &mut Value, reader: R) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut staged = doc.clone();
    let mut added = 0usize;

    for (line, result) in reader.deserialize::<CsvExam>().enumerate() {
        let exam: NewExam = result
            .with_context(|| format!("invalid CSV row {}", line + 1))?
            .into();
        add_exam(&mut staged, &exam).with_context(|| format!("rejected CSV row {}", line + 1))?;
        added += 1;
    }

    *doc = staged;
    Ok(added)
}

fn list_section<'a>(
    doc: &'a mut Value,
    key: &'static str,
) -> Result<&'a mut Vec<Value>, EntryError> {
    doc.as_object_mut()
        .ok_or(EntryError::NotAnObject)?
        .entry(key)
        .or_insert_with(|| Value::Array(Vec::new()))
        .as_array_mut()
        .ok_or(EntryError::NotAList(key))
}
