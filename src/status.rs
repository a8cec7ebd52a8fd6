use chrono::{Days, NaiveDate};

use crate::models::Status;

/// Grace period after the planned end before the forecast turns red.
const FORECAST_GRACE_DAYS: u64 = 30;

pub fn forecast_status(forecast_end: NaiveDate, planned_end: NaiveDate) -> Status {
    if forecast_end < planned_end {
        Status::LightGreen
    } else if forecast_end == planned_end {
        Status::Green
    } else if planned_end
        .checked_add_days(Days::new(FORECAST_GRACE_DAYS))
        .map_or(true, |limit| forecast_end <= limit)
    {
        Status::Orange
    } else {
        Status::Red
    }
}

/// Lower grades are better.
pub fn grade_status(average: Option<f64>) -> Status {
    match average {
        None => Status::Orange,
        Some(avg) if avg < 1.8 => Status::LightGreen,
        Some(avg) if avg < 2.0 => Status::Green,
        Some(avg) if avg < 2.5 => Status::Orange,
        Some(_) => Status::Red,
    }
}

pub fn month_ects_status(month_ects: u32) -> Status {
    match month_ects {
        0 => Status::Red,
        1..=4 => Status::Orange,
        5..=9 => Status::Green,
        _ => Status::LightGreen,
    }
}

pub fn semester_ects_status(semester_ects: u32) -> Status {
    match semester_ects {
        0..=24 => Status::Red,
        25..=29 => Status::Orange,
        30 => Status::Green,
        _ => Status::LightGreen,
    }
}

/// Returns `(semester, month)` tiers.
pub fn ects_status(semester_ects: u32, month_ects: u32) -> (Status, Status) {
    (
        semester_ects_status(semester_ects),
        month_ects_status(month_ects),
    )
}

pub fn learning_hours_status(hours: Option<f64>) -> Status {
    match hours {
        None => Status::Red,
        Some(h) if h > 30.0 => Status::LightGreen,
        Some(h) if (25.0..=30.0).contains(&h) => Status::Green,
        Some(_) => Status::Orange,
    }
}

pub fn backlog_status(modules_behind: u32) -> Status {
    match modules_behind {
        0 => Status::Green,
        1 => Status::Orange,
        _ => Status::Red,
    }
}
