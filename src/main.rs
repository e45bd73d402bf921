// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use std::env;

use grade_calculator::{format_number, logging, AppConfig, Session, SqliteStore, SessionStore};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let config = AppConfig::from_env().context("Failed to resolve application directories")?;
    if let Err(e) = logging::init(&config) {
        eprintln!("⚠️  Logging disabled: {}", e);
    }

    match args.get(1).map(String::as_str) {
        None => run_ui_mode(&config)?,
        Some("summary") => run_summary(&config)?,
        Some("reset") => run_reset(&config)?,
        Some("--version") | Some("-V") => println!("grade-calculator {}", grade_calculator::VERSION),
        Some("--help") | Some("-h") => print_usage(),
        Some(other) => {
            eprintln!("❌ Unknown command: {}", other);
            print_usage();
            std::process::exit(2);
        }
    }

    Ok(())
}

fn print_usage() {
    println!("Usage: grade-calculator [COMMAND]");
    println!();
    println!("Commands:");
    println!("  (none)    Open the interactive calculator");
    println!("  summary   Print saved subjects with SGPA and percentage");
    println!("  reset     Delete the saved subjects");
}

fn open_store(config: &AppConfig) -> Result<SqliteStore> {
    config.ensure_dirs()?;
    SqliteStore::open(&config.db_path)
        .with_context(|| format!("Failed to open database at {}", config.db_path.display()))
}

fn run_summary(config: &AppConfig) -> Result<()> {
    let store = open_store(config)?;
    let session = Session::restore(&store);
    let summary = session.summary();

    println!("🎓 Grade Calculator - Semester Summary");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{:<30} {:>8} {:>8} {:>6}", "Subject", "Credits", "Marks", "Grade");

    for subject in session.subjects() {
        let name = if subject.name.is_empty() { "(unnamed)" } else { subject.name.as_str() };
        let marks = subject.marks.map(format_number).unwrap_or_else(|| "-".to_string());
        let grade = subject
            .grade()
            .map(|g| g.letter.as_str())
            .unwrap_or("-");
        println!(
            "{:<30} {:>8} {:>8} {:>6}",
            name,
            format_number(subject.credits),
            marks,
            grade
        );
    }

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("SGPA:          {}", summary.sgpa_display());
    println!("Percentage:    {}", summary.percentage_display());
    println!("Total Credits: {}", format_number(summary.total_credits));

    match store.saved_at() {
        Ok(Some(at)) => println!(
            "Last saved:    {}",
            at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
        ),
        Ok(None) => println!("Last saved:    never"),
        Err(e) => tracing::warn!("Could not read save timestamp: {}", e),
    }

    Ok(())
}

fn run_reset(config: &AppConfig) -> Result<()> {
    let store = open_store(config)?;
    store.clear().context("Failed to delete saved subjects")?;
    println!("✓ Saved subjects deleted");
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &AppConfig) -> Result<()> {
    let store = open_store(config)?;

    let mut app = ui::App::new(Box::new(store));
    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &AppConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or print the saved session: grade-calculator summary");
    std::process::exit(1);
}
