use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;

mod analytics;
mod error;
mod models;
mod report;
mod status;
mod store;
mod telemetry;

use crate::models::Dashboard;
use crate::store::{NewExam, Snapshot, WeekChange};

#[derive(Parser)]
#[command(name = "study-dashboard")]
#[command(
    about = "Progress dashboard for part-time studies: ECTS, grades, study time",
    long_about = None
)]
struct Cli {
    /// JSON document holding program settings, exam results and study time
    #[arg(long, global = true, env = "STUDY_DATA_FILE", default_value = "data.json")]
    data: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every KPI with its status
    Dashboard {
        /// Print the KPIs as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show ECTS and average grade per semester
    Semesters,
    /// Write a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Record an exam result
    AddExam {
        #[arg(short, long)]
        semester: u32,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        ects: u32,
        /// Exam date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,
        /// Grade between 1.0 and 5.0, omitted when not graded yet
        #[arg(short, long)]
        grade: Option<f64>,
        #[arg(short, long, default_value_t = 1)]
        attempt: u32,
    },
    /// List every recorded exam attempt
    ListExams,
    /// Record study hours for a week; 0 hours removes the week
    LogWeek {
        /// Any day of the week, defaults to today
        #[arg(long)]
        week: Option<NaiveDate>,
        #[arg(long)]
        hours: f64,
    },
    /// Import exam results from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn compute_dashboard(data: &Path) -> anyhow::Result<(Snapshot, Dashboard)> {
    let doc = store::load_document(data)?;
    let snapshot = Snapshot::from_document(&doc)
        .with_context(|| format!("cannot evaluate {}", data.display()))?;
    let dashboard = Dashboard::compute(
        &snapshot.config,
        &snapshot.buckets,
        &snapshot.weeks,
        today(),
    );
    Ok((snapshot, dashboard))
}

fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Dashboard { json } => {
            let (_, dashboard) = compute_dashboard(&cli.data)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
            } else {
                print!("{}", report::render_dashboard(&dashboard));
            }
        }
        Commands::Semesters => {
            let (_, dashboard) = compute_dashboard(&cli.data)?;
            print!("{}", report::render_semesters(&dashboard));
        }
        Commands::Report { out } => {
            let (snapshot, dashboard) = compute_dashboard(&cli.data)?;
            let report = report::build_report(&snapshot.config, &dashboard, &snapshot.buckets);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write report {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::AddExam {
            semester,
            name,
            ects,
            date,
            grade,
            attempt,
        } => {
            let mut doc = store::load_document(&cli.data)?;
            let exam = NewExam {
                semester,
                name,
                ects,
                date,
                grade,
                attempt,
            };
            store::add_exam(&mut doc, &exam)?;
            store::save_document(&cli.data, &doc)?;
            info!(name = %exam.name, semester, "exam recorded");
            let grade = exam
                .grade
                .map_or_else(|| "not graded yet".to_string(), |g| format!("{g:.1}"));
            println!(
                "Added {} (S{}, {} ECTS, attempt {}, {}): {}",
                exam.name, exam.semester, exam.ects, exam.attempt, exam.date, grade
            );
        }
        Commands::ListExams => {
            let doc = store::load_document(&cli.data)?;
            let buckets = store::semester_buckets(&doc)?;
            let attempts: usize = buckets.iter().map(|b| b.courses.len()).sum();
            if attempts == 0 {
                println!("No exams recorded.");
                return Ok(());
            }
            let latest = analytics::LatestAttempts::resolve(&buckets);
            println!(
                "Recorded exams ({attempts} attempts, {} courses, * = counted):",
                latest.len()
            );
            for bucket in &buckets {
                for attempt in &bucket.courses {
                    let counted = latest
                        .get(&attempt.name)
                        .is_some_and(|r| std::ptr::eq(r.attempt, attempt));
                    let marker = if counted { "*" } else { "-" };
                    println!(
                        "{marker} {}",
                        report::describe_attempt(bucket.semester, attempt)
                    );
                }
            }
        }
        Commands::LogWeek { week, hours } => {
            let mut doc = store::load_document(&cli.data)?;
            let (monday, change) =
                store::record_study_week(&mut doc, week.unwrap_or_else(today), hours)?;
            store::save_document(&cli.data, &doc)?;
            match change {
                WeekChange::Inserted | WeekChange::Updated => {
                    println!("Study time for week {monday} saved: {hours:.1} h.")
                }
                WeekChange::Removed => println!("Study time for week {monday} removed."),
            }
        }
        Commands::Import { csv } => {
            let mut doc = store::load_document(&cli.data)?;
            let file = std::fs::File::open(&csv)
                .with_context(|| format!("failed to open {}", csv.display()))?;
            let added = store::import_exams_csv(&mut doc, file)?;
            store::save_document(&cli.data, &doc)?;
            println!("Imported {added} exams from {}.", csv.display());
        }
    }

    Ok(())
}
