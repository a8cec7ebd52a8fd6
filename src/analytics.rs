use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use tracing::debug;

use crate::models::{
    CourseAttempt, Dashboard, Forecast, ProgramConfig, RepeatRatio, SemesterBucket,
    SemesterSummary, StudyWeek, CREDITED_SEMESTER,
};
use crate::status;

/// Credits a student is expected to earn per month of study.
const EXPECTED_ECTS_PER_MONTH: u32 = 5;
/// Credit size of a typical module, used to express backlog in modules.
const ECTS_PER_MODULE: u32 = 5;
const MONTHS_PER_SEMESTER: f64 = 6.0;
const DAYS_PER_MONTH: u64 = 30;
const DEFAULT_SEMESTER_ECTS: f64 = 30.0;

#[derive(Debug, Clone, Copy)]
pub struct ResolvedAttempt<'a> {
    pub attempt: &'a CourseAttempt,
    pub semester: u32,
}

/// The authoritative attempt per course name, resolved once per pass.
#[derive(Debug, Clone, Default)]
pub struct LatestAttempts<'a> {
    by_name: BTreeMap<&'a str, ResolvedAttempt<'a>>,
}

impl<'a> LatestAttempts<'a> {
    /// A higher attempt number wins; on equal attempts the later date wins,
    /// with an undated attempt sorting before any dated one.
    pub fn resolve(buckets: &'a [SemesterBucket]) -> Self {
        let mut by_name: BTreeMap<&'a str, ResolvedAttempt<'a>> = BTreeMap::new();

        for bucket in buckets {
            for attempt in &bucket.courses {
                let candidate = ResolvedAttempt {
                    attempt,
                    semester: bucket.semester,
                };
                match by_name.entry(attempt.name.as_str()) {
                    Entry::Vacant(slot) => {
                        slot.insert(candidate);
                    }
                    Entry::Occupied(mut slot) => {
                        if attempt_key(attempt) > attempt_key(slot.get().attempt) {
                            slot.insert(candidate);
                        }
                    }
                }
            }
        }

        debug!(courses = by_name.len(), "resolved latest attempts");
        Self { by_name }
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedAttempt<'a>> {
        self.by_name.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedAttempt<'a>> + '_ {
        self.by_name.values()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }
}

fn attempt_key(attempt: &CourseAttempt) -> (u32, NaiveDate) {
    (
        attempt.attempt_number,
        attempt.occurred_on.unwrap_or(NaiveDate::MIN),
    )
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// ECTS-weighted grade per semester, semester 0 excluded.
pub fn semester_average_grades(latest: &LatestAttempts<'_>) -> BTreeMap<u32, f64> {
    let mut acc: BTreeMap<u32, (f64, u32)> = BTreeMap::new();

    for resolved in latest.iter() {
        if resolved.semester == CREDITED_SEMESTER {
            continue;
        }
        let Some(grade) = resolved.attempt.grade else {
            continue;
        };
        let entry = acc.entry(resolved.semester).or_insert((0.0, 0));
        entry.0 += grade * f64::from(resolved.attempt.ects);
        entry.1 += resolved.attempt.ects;
    }

    acc.into_iter()
        .map(|(semester, (total, ects))| {
            let avg = if ects == 0 {
                0.0
            } else {
                round_to(total / f64::from(ects), 2)
            };
            (semester, avg)
        })
        .collect()
}

/// ECTS-weighted grade across every semester, including recognised credits.
pub fn weighted_average_grade(latest: &LatestAttempts<'_>) -> Option<f64> {
    let (weighted, ects) = latest
        .iter()
        .filter_map(|r| r.attempt.grade.map(|g| (g, r.attempt.ects)))
        .fold((0.0, 0u32), |(sum, total), (grade, ects)| {
            (sum + grade * f64::from(ects), total + ects)
        });

    if ects == 0 {
        None
    } else {
        Some(round_to(weighted / f64::from(ects), 2))
    }
}

/// Passed credits per semester, semester 0 excluded.
pub fn ects_by_semester(latest: &LatestAttempts<'_>) -> BTreeMap<u32, u32> {
    let mut result = BTreeMap::new();
    for resolved in latest.iter() {
        if resolved.semester == CREDITED_SEMESTER || !resolved.attempt.passed {
            continue;
        }
        *result.entry(resolved.semester).or_insert(0) += resolved.attempt.ects;
    }
    result
}

/// Highest semester above 0, falling back to the highest overall.
pub fn current_semester(latest: &LatestAttempts<'_>) -> Option<u32> {
    let semesters = || latest.iter().map(|r| r.semester);
    semesters()
        .filter(|&s| s > CREDITED_SEMESTER)
        .max()
        .or_else(|| semesters().max())
}

/// Passed credits in the current semester, and the part of them dated in
/// the calendar month of `today`.
pub fn ects_current_semester_month(latest: &LatestAttempts<'_>, today: NaiveDate) -> (u32, u32) {
    let Some(current) = current_semester(latest) else {
        return (0, 0);
    };

    let mut semester_ects = 0;
    let mut month_ects = 0;
    for resolved in latest.iter() {
        if resolved.semester != current || !resolved.attempt.passed {
            continue;
        }
        semester_ects += resolved.attempt.ects;
        if let Some(on) = resolved.attempt.occurred_on {
            if on.year() == today.year() && on.month() == today.month() {
                month_ects += resolved.attempt.ects;
            }
        }
    }
    (semester_ects, month_ects)
}

pub fn pass_rate(latest: &LatestAttempts<'_>) -> Option<f64> {
    let graded: Vec<_> = latest.iter().filter(|r| r.attempt.is_graded()).collect();
    if graded.is_empty() {
        return None;
    }
    let passed = graded.iter().filter(|r| r.attempt.passed).count();
    Some(round_to(passed as f64 / graded.len() as f64, 2))
}

/// Outstanding failures per course passed on a retake.
pub fn repeat_ratio(latest: &LatestAttempts<'_>) -> RepeatRatio {
    let mut failed = 0u32;
    let mut success_after_repeat = 0u32;

    for resolved in latest.iter().filter(|r| r.attempt.is_graded()) {
        if !resolved.attempt.passed {
            failed += 1;
        } else if resolved.attempt.attempt_number > 1 {
            success_after_repeat += 1;
        }
    }

    match (failed, success_after_repeat) {
        (0, 0) => RepeatRatio::Undefined,
        (_, 0) => RepeatRatio::Unbounded,
        (f, s) => RepeatRatio::Value(round_to(f64::from(f) / f64::from(s), 2)),
    }
}

/// Hours of the most recent recorded week.
pub fn weekly_learning_hours(weeks: &[StudyWeek]) -> Option<f64> {
    weeks
        .iter()
        .max_by_key(|w| w.week_start)
        .map(|w| round_to(w.hours, 1))
}

/// Whole calendar months between the start month and the current month.
pub fn months_since_start(start: NaiveDate, today: NaiveDate) -> u32 {
    let months = (today.year() - start.year()) * 12 + today.month() as i32 - start.month() as i32;
    u32::try_from(months).unwrap_or(0)
}

/// Modules the student is behind a pace of five credits per month.
pub fn backlog_modules(latest: &LatestAttempts<'_>, months_since_start: u32) -> u32 {
    let completed: u32 = latest
        .iter()
        .filter(|r| r.attempt.passed)
        .map(|r| r.attempt.ects)
        .sum();
    let expected = EXPECTED_ECTS_PER_MONTH.saturating_mul(months_since_start);
    expected.saturating_sub(completed) / ECTS_PER_MODULE
}

/// Saturates at the last representable date.
fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(months) * DAYS_PER_MONTH))
        .unwrap_or(NaiveDate::MAX)
}

/// Planned end date, counting every month as 30 days.
pub fn planned_end(config: &ProgramConfig) -> NaiveDate {
    add_months(config.start_date, config.planned_duration_months)
}

/// Projects the completion date from the average credits earned per semester.
pub fn study_end_forecast(
    latest: &LatestAttempts<'_>,
    config: &ProgramConfig,
    today: NaiveDate,
) -> Forecast {
    let mut credited = 0u32;
    let mut completed = 0u32;
    for resolved in latest.iter().filter(|r| r.attempt.passed) {
        if resolved.semester == CREDITED_SEMESTER {
            credited += resolved.attempt.ects;
        } else {
            completed += resolved.attempt.ects;
        }
    }
    let remaining = config
        .ects_required
        .saturating_sub(credited)
        .saturating_sub(completed);

    let per_semester: Vec<u32> = ects_by_semester(latest).into_values().collect();
    let avg_semester_ects = if per_semester.is_empty() {
        DEFAULT_SEMESTER_ECTS
    } else {
        let total: u32 = per_semester.iter().sum();
        (f64::from(total) / per_semester.len() as f64).max(1.0)
    };
    let monthly_rate = avg_semester_ects / MONTHS_PER_SEMESTER;
    let months_needed = if monthly_rate > 0.0 {
        (f64::from(remaining) / monthly_rate).floor() as u32
    } else {
        0
    };

    let forecast_end = add_months(today, months_needed);
    let planned_end = planned_end(config);
    debug!(
        remaining,
        avg_semester_ects,
        months_needed,
        %forecast_end,
        %planned_end,
        "computed study end forecast"
    );

    Forecast {
        forecast_end,
        planned_end,
        remaining_ects: remaining,
        avg_semester_ects,
        months_needed,
        status: status::forecast_status(forecast_end, planned_end),
    }
}

/// Non-zero semesters with their passed credits and average grade.
pub fn semester_summaries(latest: &LatestAttempts<'_>) -> Vec<SemesterSummary> {
    let ects = ects_by_semester(latest);
    let averages = semester_average_grades(latest);
    let mut semesters: Vec<u32> = ects.keys().chain(averages.keys()).copied().collect();
    semesters.sort_unstable();
    semesters.dedup();

    semesters
        .into_iter()
        .map(|semester| SemesterSummary {
            semester,
            ects: ects.get(&semester).copied().unwrap_or(0),
            average_grade: averages.get(&semester).copied(),
        })
        .collect()
}

impl Dashboard {
    /// Derives every KPI from one snapshot, resolving latest attempts once.
    pub fn compute(
        config: &ProgramConfig,
        buckets: &[SemesterBucket],
        weeks: &[StudyWeek],
        today: NaiveDate,
    ) -> Self {
        let latest = LatestAttempts::resolve(buckets);

        let weighted_average = weighted_average_grade(&latest);
        let (semester_ects, month_ects) = ects_current_semester_month(&latest, today);
        let (semester_ects_status, month_ects_status) =
            status::ects_status(semester_ects, month_ects);
        let weekly_hours = weekly_learning_hours(weeks);
        let backlog = backlog_modules(&latest, months_since_start(config.start_date, today));

        Self {
            today,
            forecast: study_end_forecast(&latest, config, today),
            weighted_average,
            grade_status: status::grade_status(weighted_average),
            current_semester: current_semester(&latest),
            semester_ects,
            semester_ects_status,
            month_ects,
            month_ects_status,
            pass_rate: pass_rate(&latest),
            repeat_ratio: repeat_ratio(&latest),
            weekly_hours,
            weekly_hours_status: status::learning_hours_status(weekly_hours),
            backlog_modules: backlog,
            backlog_status: status::backlog_status(backlog),
            semesters: semester_summaries(&latest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn course(
        name: &str,
        ects: u32,
        grade: Option<f64>,
        passed: bool,
        attempt: u32,
    ) -> CourseAttempt {
        CourseAttempt {
            name: name.to_string(),
            ects,
            grade,
            passed,
            attempt_number: attempt,
            occurred_on: None,
        }
    }

    fn dated(mut attempt: CourseAttempt, on: NaiveDate) -> CourseAttempt {
        attempt.occurred_on = Some(on);
        attempt
    }

    fn bucket(semester: u32, courses: Vec<CourseAttempt>) -> SemesterBucket {
        SemesterBucket { semester, courses }
    }

    fn config(ects_required: u32) -> ProgramConfig {
        ProgramConfig {
            ects_required,
            planned_duration_months: 36,
            start_date: date(2024, 10, 1),
        }
    }

    #[test]
    fn single_graded_course() {
        let buckets = vec![bucket(1, vec![course("Math", 5, Some(2.3), true, 1)])];
        let latest = LatestAttempts::resolve(&buckets);
        assert_eq!(weighted_average_grade(&latest), Some(2.3));
        assert_eq!(ects_by_semester(&latest), BTreeMap::from([(1, 5)]));
    }

    #[test]
    fn retake_supersedes_earlier_semester() {
        let buckets = vec![
            bucket(1, vec![course("Math", 5, Some(4.0), false, 1)]),
            bucket(2, vec![course("Math", 5, Some(2.0), true, 2)]),
        ];
        let latest = LatestAttempts::resolve(&buckets);
        assert_eq!(latest.len(), 1);
        let math = latest.get("Math").unwrap();
        assert_eq!(math.attempt.attempt_number, 2);
        assert_eq!(math.semester, 2);
        assert_eq!(ects_by_semester(&latest), BTreeMap::from([(2, 5)]));
    }

    #[test]
    fn retake_wins_even_when_listed_first() {
        let buckets = vec![
            bucket(3, vec![course("Math", 5, Some(1.7), true, 2)]),
            bucket(1, vec![course("Math", 5, Some(5.0), false, 1)]),
        ];
        let latest = LatestAttempts::resolve(&buckets);
        assert_eq!(latest.get("Math").unwrap().semester, 3);
    }

    #[test]
    fn equal_attempts_fall_back_to_latest_date() {
        let buckets = vec![bucket(
            1,
            vec![
                dated(course("Stats", 5, Some(3.0), true, 1), date(2025, 3, 1)),
                course("Stats", 5, Some(1.0), true, 1),
                dated(course("Stats", 5, Some(2.0), true, 1), date(2025, 7, 1)),
                dated(course("Stats", 5, Some(2.7), true, 1), date(2025, 5, 1)),
            ],
        )];
        let latest = LatestAttempts::resolve(&buckets);
        assert_eq!(latest.get("Stats").unwrap().attempt.grade, Some(2.0));
    }

    #[test]
    fn dated_attempt_beats_undated_on_tie() {
        let buckets = vec![bucket(
            1,
            vec![
                course("Stats", 5, Some(1.0), true, 1),
                dated(course("Stats", 5, Some(2.0), true, 1), date(2020, 1, 1)),
            ],
        )];
        let latest = LatestAttempts::resolve(&buckets);
        assert_eq!(latest.get("Stats").unwrap().attempt.grade, Some(2.0));
    }

    #[test]
    fn credited_semester_only_counts_where_expected() {
        let buckets = vec![
            bucket(0, vec![course("Prior", 10, Some(1.0), true, 1)]),
            bucket(1, vec![course("Math", 10, Some(3.0), true, 1)]),
        ];
        let latest = LatestAttempts::resolve(&buckets);
        assert_eq!(ects_by_semester(&latest), BTreeMap::from([(1, 10)]));
        assert_eq!(semester_average_grades(&latest), BTreeMap::from([(1, 3.0)]));
        assert_eq!(weighted_average_grade(&latest), Some(2.0));
        // 4 months expect 20 ECTS, 20 completed including credited ones.
        assert_eq!(backlog_modules(&latest, 4), 0);
    }

    #[test]
    fn uniform_grades_average_to_the_grade() {
        let buckets = vec![
            bucket(0, vec![course("A", 6, Some(2.7), true, 1)]),
            bucket(
                1,
                vec![
                    course("B", 6, Some(2.7), true, 1),
                    course("C", 6, Some(2.7), true, 1),
                ],
            ),
            bucket(4, vec![course("D", 6, Some(2.7), true, 3)]),
        ];
        let latest = LatestAttempts::resolve(&buckets);
        assert_eq!(weighted_average_grade(&latest), Some(2.7));
    }

    #[test]
    fn semester_averages_are_weighted_and_rounded() {
        let buckets = vec![bucket(
            2,
            vec![
                course("A", 5, Some(1.3), true, 1),
                course("B", 10, Some(2.0), true, 1),
                course("C", 5, None, true, 1),
            ],
        )];
        let latest = LatestAttempts::resolve(&buckets);
        // (6.5 + 20) / 15 = 1.7666..
        assert_eq!(semester_average_grades(&latest), BTreeMap::from([(2, 1.77)]));
    }

    #[test]
    fn no_grades_means_undefined() {
        let buckets = vec![bucket(1, vec![course("A", 5, None, true, 1)])];
        let latest = LatestAttempts::resolve(&buckets);
        assert_eq!(weighted_average_grade(&latest), None);
        assert_eq!(pass_rate(&latest), None);
        assert_eq!(repeat_ratio(&latest), RepeatRatio::Undefined);
        assert!(semester_average_grades(&latest).is_empty());
    }

    #[test]
    fn pass_rate_counts_graded_latest_attempts() {
        let buckets = vec![bucket(
            1,
            vec![
                course("A", 5, Some(2.0), true, 1),
                course("B", 5, Some(5.0), false, 1),
                course("C", 5, Some(1.0), true, 1),
                course("D", 5, None, true, 1),
            ],
        )];
        let latest = LatestAttempts::resolve(&buckets);
        assert_eq!(pass_rate(&latest), Some(0.67));
    }

    #[test]
    fn repeat_ratio_variants() {
        let failed_only = vec![bucket(1, vec![course("A", 5, Some(5.0), false, 1)])];
        assert_eq!(
            repeat_ratio(&LatestAttempts::resolve(&failed_only)),
            RepeatRatio::Unbounded
        );

        let mixed = vec![bucket(
            1,
            vec![
                course("A", 5, Some(5.0), false, 1),
                course("B", 5, Some(2.3), true, 2),
            ],
        )];
        assert_eq!(
            repeat_ratio(&LatestAttempts::resolve(&mixed)),
            RepeatRatio::Value(1.0)
        );

        let clean = vec![bucket(1, vec![course("A", 5, Some(1.3), true, 1)])];
        assert_eq!(
            repeat_ratio(&LatestAttempts::resolve(&clean)),
            RepeatRatio::Undefined
        );
    }

    #[test]
    fn current_semester_prefers_positive_semesters() {
        let buckets = vec![
            bucket(0, vec![course("Prior", 30, None, true, 1)]),
            bucket(2, vec![course("A", 5, None, true, 1)]),
            bucket(1, vec![course("B", 5, None, true, 1)]),
        ];
        assert_eq!(current_semester(&LatestAttempts::resolve(&buckets)), Some(2));

        let credited_only = vec![bucket(0, vec![course("Prior", 30, None, true, 1)])];
        assert_eq!(
            current_semester(&LatestAttempts::resolve(&credited_only)),
            Some(0)
        );
        assert_eq!(current_semester(&LatestAttempts::resolve(&[])), None);
    }

    #[test]
    fn month_ects_only_counts_current_calendar_month() {
        let today = date(2025, 11, 20);
        let buckets = vec![bucket(
            3,
            vec![
                dated(course("A", 5, Some(2.0), true, 1), date(2025, 11, 3)),
                dated(course("B", 6, Some(2.0), true, 1), date(2025, 10, 28)),
                dated(course("C", 4, Some(5.0), false, 1), date(2025, 11, 5)),
                dated(course("D", 5, Some(1.7), true, 1), date(2024, 11, 5)),
            ],
        )];
        let latest = LatestAttempts::resolve(&buckets);
        assert_eq!(ects_current_semester_month(&latest, today), (16, 5));
        assert_eq!(ects_current_semester_month(&LatestAttempts::resolve(&[]), today), (0, 0));
    }

    #[test]
    fn weekly_hours_use_most_recent_week() {
        let weeks = vec![
            StudyWeek {
                week_start: date(2025, 10, 13),
                hours: 12.26,
            },
            StudyWeek {
                week_start: date(2025, 9, 29),
                hours: 30.0,
            },
        ];
        assert_eq!(weekly_learning_hours(&weeks), Some(12.3));
        assert_eq!(weekly_learning_hours(&[]), None);
    }

    #[test]
    fn months_since_start_ignores_day_of_month() {
        assert_eq!(months_since_start(date(2024, 10, 31), date(2025, 1, 1)), 3);
        assert_eq!(months_since_start(date(2024, 10, 1), date(2024, 10, 31)), 0);
        assert_eq!(months_since_start(date(2025, 10, 1), date(2024, 10, 31)), 0);
    }

    #[test]
    fn backlog_counts_whole_modules_behind() {
        let buckets = vec![bucket(
            1,
            vec![
                course("A", 5, Some(2.0), true, 1),
                course("B", 5, Some(5.0), false, 1),
            ],
        )];
        let latest = LatestAttempts::resolve(&buckets);
        // 5 ECTS completed against 5 per month
        assert_eq!(backlog_modules(&latest, 0), 0);
        assert_eq!(backlog_modules(&latest, 2), 1);
        assert_eq!(backlog_modules(&latest, 3), 2);
        assert_eq!(status::backlog_status(backlog_modules(&latest, 3)), Status::Red);
    }

    #[test]
    fn forecast_without_history_assumes_full_semesters() {
        let today = date(2025, 1, 1);
        let forecast = study_end_forecast(&LatestAttempts::resolve(&[]), &config(180), today);
        // 180 ECTS at 5 per month
        assert_eq!(forecast.months_needed, 36);
        assert_eq!(forecast.remaining_ects, 180);
        assert_eq!(forecast.forecast_end, today + Duration::days(36 * 30));
        assert_eq!(forecast.planned_end, date(2024, 10, 1) + Duration::days(36 * 30));
        assert_eq!(forecast.status, Status::Red);
    }

    #[test]
    fn forecast_subtracts_credited_and_completed_credits() {
        let buckets = vec![
            bucket(0, vec![course("Prior", 30, None, true, 1)]),
            bucket(1, vec![course("A", 12, Some(2.0), true, 1)]),
            bucket(
                2,
                vec![
                    course("B", 6, Some(2.0), true, 1),
                    course("C", 5, Some(5.0), false, 1),
                ],
            ),
        ];
        let latest = LatestAttempts::resolve(&buckets);
        let today = date(2025, 6, 1);
        let forecast = study_end_forecast(&latest, &config(90), today);
        assert_eq!(forecast.remaining_ects, 42);
        assert_eq!(forecast.avg_semester_ects, 9.0);
        // 9 per semester = 1.5 per month, 42 / 1.5 = 28
        assert_eq!(forecast.months_needed, 28);
        assert_eq!(forecast.forecast_end, today + Duration::days(28 * 30));
    }

    #[test]
    fn forecast_is_done_once_everything_is_earned() {
        let buckets = vec![bucket(1, vec![course("All", 200, Some(1.0), true, 1)])];
        let today = date(2025, 6, 1);
        let forecast = study_end_forecast(&LatestAttempts::resolve(&buckets), &config(180), today);
        assert_eq!(forecast.remaining_ects, 0);
        assert_eq!(forecast.forecast_end, today);
        assert_eq!(forecast.status, Status::LightGreen);
    }

    #[test]
    fn forecast_saturates_instead_of_overflowing() {
        let buckets = vec![bucket(1, vec![course("A", 1, Some(2.0), true, 1)])];
        let latest = LatestAttempts::resolve(&buckets);
        let today = date(2025, 1, 1);
        let forecast = study_end_forecast(&latest, &config(1_000_000), today);
        assert!(forecast.months_needed > 5_999_000);
        assert_eq!(forecast.forecast_end, NaiveDate::MAX);
        assert_eq!(forecast.status, Status::Red);

        let mut long_plan = config(180);
        long_plan.planned_duration_months = u32::MAX;
        assert_eq!(planned_end(&long_plan), NaiveDate::MAX);
    }

    #[test]
    fn forecast_moves_later_as_requirement_grows() {
        let buckets = vec![bucket(1, vec![course("A", 20, Some(2.0), true, 1)])];
        let latest = LatestAttempts::resolve(&buckets);
        let today = date(2025, 6, 1);
        let mut previous = today;
        for required in (0..=300).step_by(7) {
            let end = study_end_forecast(&latest, &config(required), today).forecast_end;
            assert!(end >= previous);
            previous = end;
        }
    }

    #[test]
    fn dashboard_combines_every_kpi() {
        let today = date(2025, 11, 20);
        let buckets = vec![
            bucket(1, vec![
                dated(course("Math", 5, Some(5.0), false, 1), date(2025, 2, 1)),
                dated(course("Intro", 5, Some(1.3), true, 1), date(2025, 2, 3)),
            ]),
            bucket(2, vec![
                dated(course("Math", 5, Some(2.0), true, 2), date(2025, 11, 4)),
                dated(course("Algo", 5, None, true, 1), date(2025, 11, 10)),
            ]),
        ];
        let weeks = vec![StudyWeek {
            week_start: date(2025, 11, 17),
            hours: 27.0,
        }];
        let dashboard = Dashboard::compute(&config(180), &buckets, &weeks, today);

        assert_eq!(dashboard.weighted_average, Some(1.65));
        assert_eq!(dashboard.grade_status, Status::LightGreen);
        assert_eq!(dashboard.current_semester, Some(2));
        assert_eq!((dashboard.semester_ects, dashboard.month_ects), (10, 10));
        assert_eq!(dashboard.month_ects_status, Status::LightGreen);
        assert_eq!(dashboard.semester_ects_status, Status::Red);
        assert_eq!(dashboard.pass_rate, Some(1.0));
        assert_eq!(dashboard.repeat_ratio, RepeatRatio::Value(0.0));
        assert_eq!(dashboard.weekly_hours_status, Status::Green);
        // 13 months since October 2024: 65 expected, 15 completed
        assert_eq!(dashboard.backlog_modules, 10);
        assert_eq!(dashboard.backlog_status, Status::Red);
        assert_eq!(
            dashboard.semesters,
            vec![
                SemesterSummary { semester: 1, ects: 5, average_grade: Some(1.3) },
                SemesterSummary { semester: 2, ects: 10, average_grade: Some(2.0) },
            ]
        );
    }
}
