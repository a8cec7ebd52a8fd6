use std::fmt::Write;

use crate::models::{CourseAttempt, Dashboard, ProgramConfig, RepeatRatio, SemesterBucket, Status};

fn or_dash(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.decimals$}"))
}

fn format_percent(rate: Option<f64>) -> String {
    rate.map_or_else(|| "-".to_string(), |r| format!("{:.0}%", r * 100.0))
}

pub fn format_repeat_ratio(ratio: RepeatRatio) -> String {
    match ratio {
        RepeatRatio::Undefined => "-".to_string(),
        RepeatRatio::Value(v) => format!("{v:.2}"),
        RepeatRatio::Unbounded => "open failures, no successful retake yet".to_string(),
    }
}

fn status_marker(status: Status) -> &'static str {
    match status {
        Status::LightGreen => "[++]",
        Status::Green => "[+]",
        Status::Orange => "[~]",
        Status::Red => "[!]",
    }
}

/// Plain-text KPI overview for the terminal.
pub fn render_dashboard(dashboard: &Dashboard) -> String {
    let mut output = String::new();
    let forecast = &dashboard.forecast;

    let _ = writeln!(output, "Study dashboard ({})", dashboard.today);
    let _ = writeln!(
        output,
        "{} Forecast end: {} (planned {}, {} ECTS remaining) {}",
        status_marker(forecast.status),
        forecast.forecast_end,
        forecast.planned_end,
        forecast.remaining_ects,
        forecast.status
    );
    let _ = writeln!(
        output,
        "{} Average grade: {} {}",
        status_marker(dashboard.grade_status),
        or_dash(dashboard.weighted_average, 2),
        dashboard.grade_status
    );
    let semester_label = dashboard
        .current_semester
        .map_or_else(|| "-".to_string(), |s| s.to_string());
    let _ = writeln!(
        output,
        "{} Semester {} ECTS: {} {}",
        status_marker(dashboard.semester_ects_status),
        semester_label,
        dashboard.semester_ects,
        dashboard.semester_ects_status
    );
    let _ = writeln!(
        output,
        "{} ECTS this month: {} {}",
        status_marker(dashboard.month_ects_status),
        dashboard.month_ects,
        dashboard.month_ects_status
    );
    let _ = writeln!(output, "    Pass rate: {}", format_percent(dashboard.pass_rate));
    let _ = writeln!(
        output,
        "    Repeat ratio: {}",
        format_repeat_ratio(dashboard.repeat_ratio)
    );
    let hours = dashboard
        .weekly_hours
        .map_or_else(|| "-".to_string(), |h| format!("{h:.1} h"));
    let _ = writeln!(
        output,
        "{} Last study week: {} {}",
        status_marker(dashboard.weekly_hours_status),
        hours,
        dashboard.weekly_hours_status
    );
    let _ = writeln!(
        output,
        "{} Modules behind: {} {}",
        status_marker(dashboard.backlog_status),
        dashboard.backlog_modules,
        dashboard.backlog_status
    );

    output
}

pub fn render_semesters(dashboard: &Dashboard) -> String {
    let mut output = String::new();
    if dashboard.semesters.is_empty() {
        let _ = writeln!(output, "No semester results recorded yet.");
        return output;
    }

    let _ = writeln!(output, "| Semester | ECTS | Average grade |");
    let _ = writeln!(output, "|---|---|---|");
    for summary in &dashboard.semesters {
        let _ = writeln!(
            output,
            "| S{} | {} | {} |",
            summary.semester,
            summary.ects,
            or_dash(summary.average_grade, 2)
        );
    }
    output
}

pub fn describe_attempt(semester: u32, attempt: &CourseAttempt) -> String {
    let date = attempt
        .occurred_on
        .map_or_else(|| "?".to_string(), |d| d.to_string());
    let grade = attempt
        .grade
        .map_or_else(|| "not graded yet".to_string(), |g| format!("grade {g:.1}"));
    let outcome = if attempt.passed { "passed" } else { "failed" };
    format!(
        "S{} | {} | {} ECTS | {} | attempt {} | {} ({})",
        semester, attempt.name, attempt.ects, date, attempt.attempt_number, grade, outcome
    )
}

pub fn build_report(
    config: &ProgramConfig,
    dashboard: &Dashboard,
    buckets: &[SemesterBucket],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Study Progress Report");
    let _ = writeln!(
        output,
        "Generated on {} for a {} ECTS program started {} ({} months planned)",
        dashboard.today, config.ects_required, config.start_date, config.planned_duration_months
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Key Indicators");
    let _ = writeln!(output);
    let _ = writeln!(output, "| Indicator | Value | Status |");
    let _ = writeln!(output, "|---|---|---|");

    let forecast = &dashboard.forecast;
    let rows = [
        (
            "Forecast end".to_string(),
            format!("{} (planned {})", forecast.forecast_end, forecast.planned_end),
            Some(forecast.status),
        ),
        (
            "Average grade".to_string(),
            or_dash(dashboard.weighted_average, 2),
            Some(dashboard.grade_status),
        ),
        (
            "ECTS current semester".to_string(),
            dashboard.semester_ects.to_string(),
            Some(dashboard.semester_ects_status),
        ),
        (
            "ECTS this month".to_string(),
            dashboard.month_ects.to_string(),
            Some(dashboard.month_ects_status),
        ),
        ("Pass rate".to_string(), format_percent(dashboard.pass_rate), None),
        (
            "Repeat ratio".to_string(),
            format_repeat_ratio(dashboard.repeat_ratio),
            None,
        ),
        (
            "Last study week".to_string(),
            dashboard
                .weekly_hours
                .map_or_else(|| "-".to_string(), |h| format!("{h:.1} h")),
            Some(dashboard.weekly_hours_status),
        ),
        (
            "Modules behind".to_string(),
            dashboard.backlog_modules.to_string(),
            Some(dashboard.backlog_status),
        ),
    ];
    for (label, value, status) in rows {
        let status = status.map_or("-", Status::as_str);
        let _ = writeln!(output, "| {label} | {value} | {status} |");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Semesters");
    let _ = writeln!(output);
    output.push_str(&render_semesters(dashboard));

    let mut recent: Vec<(u32, &CourseAttempt)> = buckets
        .iter()
        .flat_map(|b| b.courses.iter().map(move |c| (b.semester, c)))
        .filter(|(_, c)| c.occurred_on.is_some())
        .collect();
    recent.sort_by(|a, b| b.1.occurred_on.cmp(&a.1.occurred_on));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Results");
    let _ = writeln!(output);
    if recent.is_empty() {
        let _ = writeln!(output, "No dated exam results recorded.");
    } else {
        for (semester, attempt) in recent.iter().take(5) {
            let _ = writeln!(output, "- {}", describe_attempt(*semester, attempt));
        }
    }

    output
}
