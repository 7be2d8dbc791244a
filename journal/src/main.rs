use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use log::warn;

use journal::{Dashboard, Journal};
use llm::{BackendKind, GenerationParams, HttpBackend, ModelId, RetryPolicy, SuggestionClient};
use prompt::Task;
use records::{ClassFilter, ClassRecord, Database, Energy, NewClass, SequenceNotes, VibeRating};
use stats::{Dimension, GroupSummary};

#[derive(Parser)]
#[command(author, version, about = "Log yoga classes and get teaching ideas from your own numbers")]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "JOURNAL_DB", default_value = "yoga_journal.sqlite3", global = true)]
    db: PathBuf,
    #[command(flatten)]
    llm: LlmArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct LlmArgs {
    /// Suggestion backend: hosted or ollama
    #[arg(long = "llm-backend", env = "LLM_BACKEND", default_value = "hosted", global = true)]
    backend: BackendKind,
    /// Base URL of the suggestion service
    #[arg(long = "llm-url", env = "LLM_URL", global = true)]
    url: Option<String>,
    /// Bearer token for the hosted service
    #[arg(long = "llm-api-key", env = "LLM_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,
    /// Model to request, defaulting to the backend's usual model
    #[arg(long = "llm-model", env = "LLM_MODEL", global = true)]
    model: Option<String>,
    /// Seconds to wait for each attempt
    #[arg(long = "llm-timeout-secs", env = "LLM_TIMEOUT_SECS", default_value_t = 30, global = true)]
    timeout_secs: u64,
    #[arg(long = "llm-max-attempts", env = "LLM_MAX_ATTEMPTS", default_value_t = 3, global = true)]
    max_attempts: u32,
    #[arg(long = "llm-temperature", env = "LLM_TEMPERATURE", default_value_t = GenerationParams::DEFAULT_TEMPERATURE, global = true)]
    temperature: f32,
    #[arg(long = "llm-max-tokens", env = "LLM_MAX_TOKENS", default_value_t = GenerationParams::DEFAULT_MAX_TOKENS, global = true)]
    max_tokens: u32,
    /// Maximum prompt length in characters
    #[arg(long = "prompt-budget", env = "PROMPT_BUDGET", default_value_t = prompt::DEFAULT_BUDGET, global = true)]
    prompt_budget: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Create the database and list the reference data it holds
    Init,
    /// Insert the sample classes, dated relative to today
    SeedSamples {
        /// Insert even when classes are already logged
        #[arg(long)]
        force: bool,
    },
    /// Log a class you taught
    Log(LogArgs),
    /// Change fields of a logged class
    Edit(EditArgs),
    /// Delete a logged class
    Delete { id: i64 },
    /// List logged classes, newest first
    History {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Totals, attendance by studio and class type, top themes and the student trend
    Dashboard {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Count, average students and average vibe per group
    Stats {
        /// theme, location, pose or class-type
        #[arg(long, default_value = "theme")]
        by: Dimension,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Ask for a theme, a sequence or a coaching tip
    Suggest {
        /// theme, sequence or tip
        task: Task,
        #[command(flatten)]
        filter: FilterArgs,
        /// Print the prompt instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
    /// List studios, class types and themes
    References,
}

#[derive(Args)]
struct FilterArgs {
    /// Only classes from the last N days
    #[arg(long, conflicts_with = "since")]
    days: Option<i64>,
    /// First date to include (YYYY-MM-DD)
    #[arg(long)]
    since: Option<NaiveDate>,
    /// Last date to include (YYYY-MM-DD)
    #[arg(long)]
    until: Option<NaiveDate>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long = "class-type")]
    class_type: Option<String>,
    #[arg(long)]
    theme: Option<String>,
    /// Search theme, notes and peak pose
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    min_students: Option<u32>,
}

impl FilterArgs {
    fn to_filter(&self) -> ClassFilter {
        let mut filter = ClassFilter::new();
        if let Some(days) = self.days {
            filter = filter.last_days(days, Local::now().date_naive());
        }
        filter.since = self.since.or(filter.since);
        filter.until = self.until;
        filter.location = self.location.clone();
        filter.class_type = self.class_type.clone();
        filter.theme = self.theme.clone();
        filter.search = self.search.clone();
        filter.min_students = self.min_students;
        filter
    }
}

#[derive(Args)]
struct LogArgs {
    /// Class date (YYYY-MM-DD), today when omitted
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Start time (HH:MM)
    #[arg(long, value_parser = parse_time)]
    time: Option<NaiveTime>,
    /// Studio name as listed by `references`
    #[arg(long)]
    location: String,
    /// Class type display name as listed by `references`
    #[arg(long = "class-type")]
    class_type: String,
    #[arg(long)]
    students: u32,
    /// How the class felt, 1 to 5
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..=5))]
    vibe: i64,
    #[command(flatten)]
    details: DetailArgs,
}

#[derive(Args)]
struct EditArgs {
    id: i64,
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long, value_parser = parse_time)]
    time: Option<NaiveTime>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long = "class-type")]
    class_type: Option<String>,
    #[arg(long)]
    students: Option<u32>,
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..=5))]
    vibe: Option<i64>,
    #[command(flatten)]
    details: DetailArgs,
}

#[derive(Args)]
struct DetailArgs {
    #[arg(long)]
    theme: Option<String>,
    #[arg(long)]
    intention: Option<String>,
    #[arg(long)]
    peak_pose: Option<String>,
    /// Low, Medium, High or "Very High"
    #[arg(long)]
    energy: Option<Energy>,
    #[arg(long)]
    notes: Option<String>,
    /// Sequence notes as JSON, e.g. '{"warmup":"Sun A x3","peak":"Crow"}'
    #[arg(long, value_parser = parse_sequence)]
    sequence: Option<SequenceNotes>,
}

impl DetailArgs {
    fn apply(self, class: &mut NewClass) {
        if let Some(theme) = self.theme {
            class.theme = Some(theme);
        }
        if let Some(intention) = self.intention {
            class.intention = Some(intention);
        }
        if let Some(pose) = self.peak_pose {
            class.peak_pose = Some(pose);
        }
        if let Some(energy) = self.energy {
            class.energy = Some(energy);
        }
        if let Some(notes) = self.notes {
            class.notes = Some(notes);
        }
        if let Some(sequence) = self.sequence {
            class.sequence = Some(sequence);
        }
    }
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| format!("'{s}' is not a time like 09:30"))
}

fn parse_sequence(s: &str) -> Result<SequenceNotes, String> {
    serde_json::from_str(s).map_err(|e| format!("invalid sequence JSON: {e}"))
}

/// Model replies sometimes carry escaped newlines and tabs.
fn display_text(text: &str) -> String {
    text.replace("\\n", "\n").replace("\\t", "\t")
}

fn cell(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        format!("{text:<width$}")
    } else {
        let clipped: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{clipped}…")
    }
}

fn print_classes(classes: &[ClassRecord]) {
    println!(
        "{:>5}  {:<10}  {:<5}  {:<22}  {:<20}  {:<18}  {:<14}  {:>8}  {:>4}",
        "id", "date", "time", "location", "type", "theme", "peak pose", "students", "vibe"
    );
    for class in classes {
        let time = class
            .time
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_default();
        println!(
            "{:>5}  {}  {:<5}  {}  {}  {}  {}  {:>8}  {:>4}",
            class.id,
            class.date.format("%Y-%m-%d"),
            time,
            cell(class.location.as_deref().unwrap_or("-"), 22),
            cell(class.class_type.as_deref().unwrap_or("-"), 20),
            cell(class.theme.as_deref().unwrap_or("-"), 18),
            cell(class.peak_pose.as_deref().unwrap_or("-"), 14),
            class.student_count,
            class.vibe_rating.get(),
        );
    }
}

fn print_class_detail(class: &ClassRecord) {
    println!("Class {} on {} ({})", class.id, class.date, class.day_of_week);
    let fields = [
        ("location", class.location.clone()),
        ("type", class.class_type.clone()),
        ("theme", class.theme.clone()),
        ("intention", class.intention.clone()),
        ("peak pose", class.peak_pose.clone()),
        ("energy", class.energy.map(|e| e.to_string())),
        ("students", Some(class.student_count.to_string())),
        ("vibe", Some(class.vibe_rating.to_string())),
        ("notes", class.notes.clone()),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("  {label:<10} {value}");
        }
    }
    if let Some(sequence) = &class.sequence {
        for (key, value) in sequence.entries() {
            println!("  {key:<10} {value}");
        }
    }
}

fn print_groups(heading: &str, groups: &[GroupSummary]) {
    println!("{heading}");
    println!(
        "  {:<28}  {:>5}  {:>12}  {:>8}",
        "group", "count", "avg students", "avg vibe"
    );
    for group in groups {
        println!(
            "  {}  {:>5}  {:>12.1}  {:>8.1}",
            cell(&group.key, 28),
            group.count,
            group.avg_students,
            group.avg_vibe
        );
    }
}

fn print_dashboard(dashboard: &Dashboard) {
    let overview = &dashboard.overview;
    println!("Total classes     {}", overview.total_classes);
    println!("Total students    {}", overview.total_students);
    match overview.avg_vibe {
        Some(vibe) => println!("Average vibe      {vibe:.1}/5"),
        None => println!("Average vibe      -"),
    }
    println!("Locations taught  {}", overview.locations_taught);
    println!("Unique themes     {}", overview.unique_themes);
    if overview.total_classes == 0 {
        return;
    }

    println!();
    print_groups("Attendance by location", &dashboard.by_location);
    println!();
    print_groups("By class type", &dashboard.by_class_type);
    println!();
    print_groups("Top themes", &dashboard.top_themes);

    println!();
    println!("Student trend");
    for point in &dashboard.trend {
        println!(
            "  {}  {:>4}  rolling {:>5.1}  {}",
            point.date,
            point.students,
            point.rolling_avg,
            point.location.as_deref().unwrap_or("")
        );
    }
    if let Some(range) = &dashboard.range {
        println!(
            "  average {:.1}, max {}, min {}",
            range.average, range.max, range.min
        );
    }
}

fn build_journal(db: Database, args: &LlmArgs) -> Result<Journal<Database, HttpBackend>> {
    let backend = HttpBackend::connect(args.backend, args.url.as_deref(), args.api_key.as_deref());
    let policy = RetryPolicy::default()
        .with_max_attempts(args.max_attempts)
        .with_timeout(Duration::from_secs(args.timeout_secs));
    let client = SuggestionClient::new(backend, args.backend.catalog()).with_policy(policy);
    let model: ModelId = args
        .model
        .as_deref()
        .unwrap_or(args.backend.default_model())
        .parse()?;
    let params = GenerationParams::new(args.max_tokens, args.temperature)?;
    Ok(Journal::new(db, client, model)
        .with_params(params)
        .with_budget(args.prompt_budget))
}

async fn run(command: Command, journal: &mut Journal<Database, HttpBackend>, llm: &LlmArgs) -> Result<()> {
    match command {
        Command::Init => {
            let (locations, class_types, themes) = journal.references().await?;
            println!(
                "Journal ready with {} locations, {} class types and {} themes.",
                locations.len(),
                class_types.len(),
                themes.len()
            );
        }
        Command::SeedSamples { force } => {
            let existing = journal.history(&ClassFilter::new()).await?.len();
            if existing > 0 && !force {
                bail!("the journal already has {existing} classes; pass --force to add the samples anyway");
            }
            let count = journal.seed_samples().await?;
            println!("Inserted {count} sample classes.");
        }
        Command::Log(args) => {
            let mut class = NewClass {
                date: args.date.unwrap_or_else(|| Local::now().date_naive()),
                time: args.time,
                location: args.location,
                class_type: args.class_type,
                theme: None,
                intention: None,
                peak_pose: None,
                energy: None,
                student_count: args.students,
                vibe_rating: VibeRating::new(args.vibe)?,
                notes: None,
                sequence: None,
            };
            args.details.apply(&mut class);
            let id = journal.log_class(&class).await?;
            println!("Logged class {id}.");
        }
        Command::Edit(args) => {
            let vibe = args.vibe.map(VibeRating::new).transpose()?;
            let EditArgs {
                id,
                date,
                time,
                location,
                class_type,
                students,
                details,
                ..
            } = args;
            let updated = journal
                .edit_class(id, |class| {
                    if let Some(date) = date {
                        class.date = date;
                    }
                    if time.is_some() {
                        class.time = time;
                    }
                    if let Some(location) = location {
                        class.location = location;
                    }
                    if let Some(class_type) = class_type {
                        class.class_type = class_type;
                    }
                    if let Some(students) = students {
                        class.student_count = students;
                    }
                    if let Some(vibe) = vibe {
                        class.vibe_rating = vibe;
                    }
                    details.apply(class);
                })
                .await?;
            print_class_detail(&updated);
        }
        Command::Delete { id } => {
            journal.delete_class(id).await?;
            println!("Deleted class {id}.");
        }
        Command::History { filter, limit } => {
            let classes = journal.history(&filter.to_filter()).await?;
            if classes.is_empty() {
                println!("No classes match.");
            } else {
                let shown = classes.len().min(limit);
                print_classes(&classes[..shown]);
                if classes.len() > shown {
                    println!("... {} more", classes.len() - shown);
                }
            }
        }
        Command::Dashboard { filter } => {
            let dashboard = journal.dashboard(&filter.to_filter()).await?;
            print_dashboard(&dashboard);
        }
        Command::Stats { by, filter } => {
            let groups = journal.summarize(&filter.to_filter(), by).await?;
            if groups.is_empty() {
                println!("No classes match.");
            } else {
                print_groups(&format!("By {by}"), &groups);
            }
        }
        Command::Suggest {
            task,
            filter,
            dry_run,
        } => {
            let filter = filter.to_filter();
            if dry_run {
                println!("{}", journal.prepare(task, &filter).await?);
                return Ok(());
            }
            if llm.backend == BackendKind::Hosted && llm.api_key.is_none() {
                warn!("LLM_API_KEY is not set; the hosted service will probably refuse the request");
            }
            let suggestion = journal.inspire(task, &filter).await?;
            println!("{}", display_text(&suggestion.raw_response_text));
            println!();
            println!(
                "({} via {}, {} attempt(s))",
                suggestion.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                suggestion.model_identifier,
                suggestion.attempts
            );
        }
        Command::References => {
            let (locations, class_types, themes) = journal.references().await?;
            println!("Locations");
            for location in locations {
                println!(
                    "  {:<24} {}",
                    location.name,
                    location.neighborhood.unwrap_or_default()
                );
            }
            println!("Class types");
            for class_type in class_types {
                println!(
                    "  {:<24} {} min{}",
                    class_type.display_name,
                    class_type.duration_minutes,
                    if class_type.is_heated { ", heated" } else { "" }
                );
            }
            println!("Themes");
            for theme in themes {
                println!(
                    "  {:<24} {}",
                    theme.name,
                    theme.category.unwrap_or_default()
                );
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let db = Database::open(cli.db.clone())
        .with_context(|| format!("opening {}", cli.db.display()))?;
    let mut journal = build_journal(db, &cli.llm)?;
    run(cli.command, &mut journal, &cli.llm).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_text_unescapes_newlines_and_tabs() {
        assert_eq!(
            display_text("THEME: Calm\\nSEQUENCE:\\n\\t- Warmup"),
            "THEME: Calm\nSEQUENCE:\n\t- Warmup"
        );
        assert_eq!(display_text("plain"), "plain");
    }
}
