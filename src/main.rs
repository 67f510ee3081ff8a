use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use jobdigest::catalog::Catalog;
use jobdigest::config::{Config, DayBoundary};
use jobdigest::db::{DIGEST_KEY_PREFIX, Database};
use jobdigest::digest;
use jobdigest::filter::{self, FilterCriteria, SortMode};
use jobdigest::models::{ApplicationStatus, JobMode, Preferences, PreferencesUpdate, ScoredJob};
use jobdigest::{prefs, scoring, tracker};

#[derive(Parser)]
#[command(name = "jobdigest")]
#[command(about = "Match job postings against your preferences and keep a daily digest")]
struct Cli {
    /// Path to the store database (overrides JOBDIGEST_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Path to the job catalog JSON (overrides JOBDIGEST_CATALOG)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Use UTC instead of local time to decide "today"
    #[arg(long, global = true)]
    utc: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Browse scored jobs
    Dashboard {
        /// Substring of title or company
        #[arg(short, long)]
        keyword: Option<String>,

        /// Substring of location
        #[arg(short, long)]
        location: Option<String>,

        /// Work mode (remote, hybrid, onsite)
        #[arg(short, long)]
        mode: Option<JobMode>,

        /// Exact experience label, e.g. "1-3"
        #[arg(short, long)]
        experience: Option<String>,

        /// Substring of source
        #[arg(long)]
        source: Option<String>,

        /// Application status (not-applied, applied, rejected, selected)
        #[arg(long)]
        status: Option<ApplicationStatus>,

        /// Only show jobs at or above your minimum match score
        #[arg(short = 't', long)]
        above_threshold: bool,

        /// Sort order (latest, oldest, match)
        #[arg(short, long, default_value = "latest")]
        sort: SortMode,
    },

    /// Show job details
    Show {
        /// Job ID
        id: String,
    },

    /// Save or unsave a job
    Save {
        /// Job ID
        id: String,
    },

    /// List saved jobs
    Saved,

    /// Set the application status of a job
    Status {
        /// Job ID
        id: String,

        /// New status (not-applied, applied, rejected, selected)
        status: ApplicationStatus,
    },

    /// Show recent status changes
    Log {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show the daily digest
    Digest {
        /// Generate (or regenerate) the digest instead of reading the cache
        #[arg(short, long)]
        generate: bool,

        /// Date to read (YYYY-MM-DD); defaults to today
        #[arg(short, long)]
        date: Option<String>,

        /// List dates that have a cached digest
        #[arg(long, conflicts_with_all = ["generate", "date"])]
        list: bool,
    },

    /// View or change matching preferences
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommands>,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show current preferences
    Show,

    /// Update preferences
    Set {
        /// Comma-separated role keywords
        #[arg(long)]
        role_keywords: Option<String>,

        /// Comma-separated skills
        #[arg(long)]
        skills: Option<String>,

        /// Comma-separated preferred locations
        #[arg(long)]
        locations: Option<String>,

        /// Preferred work mode; repeat for several (any, remote, hybrid, onsite)
        #[arg(long = "mode")]
        modes: Vec<String>,

        /// Experience level, e.g. "1-3"
        #[arg(long)]
        experience: Option<String>,

        /// Minimum match score, 0-100
        #[arg(long, allow_negative_numbers = true)]
        min_score: Option<i64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("jobdigest={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(catalog) = cli.catalog {
        config.catalog_path = catalog;
    }
    if cli.utc {
        config.day_boundary = DayBoundary::Utc;
    }

    let db = Database::open_at(&config.db_path)?;
    let load_catalog = || Catalog::from_json_file(&config.catalog_path);

    match cli.command {
        Commands::Init => {
            db.init()?;
            println!("Database initialized at {}", db.path().display());
        }

        Commands::Dashboard {
            keyword,
            location,
            mode,
            experience,
            source,
            status,
            above_threshold,
            sort,
        } => {
            db.ensure_initialized()?;
            let catalog = load_catalog()?;
            let prefs = prefs::load(&db)?;
            if !prefs.is_configured() {
                println!("Scoring is off until you set role keywords or skills (jobdigest settings set).");
            }
            let criteria = FilterCriteria {
                keyword,
                location,
                mode,
                experience,
                source,
                status,
                above_threshold,
            };
            let statuses = tracker::status_map(&db)?;
            let saved = tracker::saved_ids(&db)?;
            let jobs = filter::browse(&catalog, &prefs, &criteria, &statuses, sort);

            if jobs.is_empty() {
                println!("No jobs match your filters.");
            } else {
                println!(
                    "{:<10} {:>5} {:<28} {:<18} {:<16} {:<7} {:>4} {:<12}",
                    "ID", "SCORE", "TITLE", "COMPANY", "LOCATION", "MODE", "AGE", "STATUS"
                );
                println!("{}", "-".repeat(108));
                for scored in &jobs {
                    let job = &scored.job;
                    let status = statuses.get(&job.id).copied().unwrap_or_default();
                    let marker = if saved.contains(&job.id) { "*" } else { "" };
                    println!(
                        "{:<10} {:>5} {:<28} {:<18} {:<16} {:<7} {:>4} {:<12}",
                        format!("{}{}", job.id, marker),
                        scored.score,
                        truncate(&job.title, 26),
                        truncate(&job.company, 16),
                        truncate(&job.location, 14),
                        job.mode,
                        format!("{}d", job.posted_days_ago),
                        status
                    );
                }
                println!("\n{} job(s); * = saved", jobs.len());
            }
        }

        Commands::Show { id } => {
            db.ensure_initialized()?;
            let catalog = load_catalog()?;
            match catalog.find(&id) {
                Some(job) => {
                    let prefs = prefs::load(&db)?;
                    println!("Job {}", job.id);
                    println!("Title: {}", job.title);
                    println!("Company: {}", job.company);
                    println!("Location: {} ({})", job.location, job.mode);
                    println!("Experience: {}", job.experience);
                    if !job.salary_range.is_empty() {
                        println!("Salary: {}", job.salary_range);
                    }
                    if !job.skills.is_empty() {
                        println!("Skills: {}", job.skills.join(", "));
                    }
                    println!("Posted: {} day(s) ago via {}", job.posted_days_ago, job.source);
                    println!("Match score: {}", scoring::score(job, &prefs));
                    println!("Status: {}", tracker::status_of(&db, &job.id)?);
                    println!("Saved: {}", if tracker::is_saved(&db, &job.id)? { "yes" } else { "no" });
                    if !job.apply_url.is_empty() {
                        println!("Apply: {}", job.apply_url);
                    }
                    if !job.description.is_empty() {
                        println!("\n--- Description ---\n{}", job.description);
                    }
                }
                None => {
                    println!("Job {} not found.", id);
                }
            }
        }

        Commands::Save { id } => {
            db.ensure_initialized()?;
            let known = load_catalog().ok().map(|catalog| catalog.find(&id).is_some());
            if known == Some(false) {
                println!("Note: job {} is not in the catalog.", id);
            }
            if tracker::toggle_save(&db, &id)? {
                println!("Saved job {}.", id);
            } else {
                println!("Removed job {} from saved.", id);
            }
        }

        Commands::Saved => {
            db.ensure_initialized()?;
            let catalog = load_catalog()?;
            let prefs = prefs::load(&db)?;
            let jobs = tracker::saved_jobs(&db, &catalog)?;
            if jobs.is_empty() {
                println!("No saved jobs.");
            } else {
                println!("{:<10} {:>5} {:<30} {:<20} {:<12}", "ID", "SCORE", "TITLE", "COMPANY", "STATUS");
                println!("{}", "-".repeat(81));
                for job in jobs {
                    println!(
                        "{:<10} {:>5} {:<30} {:<20} {:<12}",
                        job.id,
                        scoring::score(job, &prefs),
                        truncate(&job.title, 28),
                        truncate(&job.company, 18),
                        tracker::status_of(&db, &job.id)?
                    );
                }
            }
        }

        Commands::Status { id, status } => {
            db.ensure_initialized()?;
            let catalog = load_catalog()?;
            tracker::set_status(&db, &catalog, &id, status)?;
            if catalog.find(&id).is_some() {
                println!("Marked job {} as {}.", id, status);
            } else {
                println!("Marked job {} as {} (not in catalog, not logged).", id, status);
            }
        }

        Commands::Log { limit } => {
            db.ensure_initialized()?;
            let log = tracker::status_log(&db)?;
            if log.is_empty() {
                println!("No status changes yet.");
            } else {
                println!("{:<20} {:<10} {:<12} {:<28} {:<18}", "WHEN", "ID", "STATUS", "TITLE", "COMPANY");
                println!("{}", "-".repeat(92));
                for entry in log.iter().take(limit) {
                    println!(
                        "{:<20} {:<10} {:<12} {:<28} {:<18}",
                        entry.timestamp.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M"),
                        entry.job_id,
                        entry.status,
                        truncate(&entry.title, 26),
                        truncate(&entry.company, 16)
                    );
                }
            }
        }

        Commands::Digest { generate, date, list } => {
            db.ensure_initialized()?;
            if list {
                let keys = db.keys_with_prefix(DIGEST_KEY_PREFIX)?;
                if keys.is_empty() {
                    println!("No cached digests.");
                }
                for key in keys {
                    println!("{}", key.trim_start_matches(DIGEST_KEY_PREFIX));
                }
                return Ok(());
            }
            let date = match date {
                Some(raw) => digest::parse_date(&raw)?,
                None => config.day_boundary.today(),
            };

            let result = if generate {
                let catalog = load_catalog()?;
                let prefs = prefs::load(&db)?;
                if !prefs.is_configured() {
                    println!("Scoring is off until you set role keywords or skills (jobdigest settings set).");
                }
                digest::generate(&db, &catalog, &prefs, date)?
            } else {
                digest::retrieve(&db, date)?
            };

            match result {
                Some(digest) => print_digest(&digest.jobs, &date.to_string()),
                None if generate => {
                    println!("No jobs reached your minimum match score today. Try lowering it.");
                }
                None => {
                    println!("No digest for {} yet. Run 'jobdigest digest --generate'.", date);
                }
            }
        }

        Commands::Settings { command } => {
            db.ensure_initialized()?;
            match command.unwrap_or(SettingsCommands::Show) {
                SettingsCommands::Show => print_preferences(&prefs::load(&db)?),
                SettingsCommands::Set {
                    role_keywords,
                    skills,
                    locations,
                    modes,
                    experience,
                    min_score,
                } => {
                    let update = PreferencesUpdate {
                        role_keywords,
                        skills,
                        preferred_locations: locations,
                        preferred_mode: (!modes.is_empty()).then_some(modes),
                        experience_level: experience,
                        min_match_score: min_score,
                    };
                    let saved = prefs::update(&db, update)?;
                    println!("Preferences saved.");
                    print_preferences(&saved);
                }
            }
        }
    }

    Ok(())
}

fn print_digest(jobs: &[ScoredJob], date: &str) {
    println!("Top {} match(es) for {}", jobs.len(), date);
    println!("{}", "-".repeat(80));
    for (i, scored) in jobs.iter().enumerate() {
        let job = &scored.job;
        println!(
            "{:>2}. [{:>3}] {} - {} ({}, {}) {}d ago",
            i + 1,
            scored.score,
            truncate(&job.title, 30),
            truncate(&job.company, 18),
            truncate(&job.location, 14),
            job.mode,
            job.posted_days_ago
        );
    }
}

fn print_preferences(prefs: &Preferences) {
    println!("Role keywords:  {}", prefs.role_keywords);
    println!("Skills:         {}", prefs.skills);
    println!("Locations:      {}", prefs.preferred_locations);
    println!("Work mode:      {}", prefs.preferred_mode.join(", "));
    println!("Experience:     {}", prefs.experience_level);
    println!("Min score:      {}", prefs.min_match_score);
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
