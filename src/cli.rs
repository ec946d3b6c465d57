use crate::coordinator::ViewCoordinator;
use crate::errors::{AppError, AppResult};
use crate::jar;
use crate::models::MemoryStar;
use crate::DATA_DIR_ENV;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "star-jar", author, version, about = "One small memory a day, folded into a star", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the jar database and logs
    #[arg(long, short = 'd', env = DATA_DIR_ENV, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show whether today already has a star
    Today,

    /// Fold a memory into the jar (today unless --date is given)
    Add {
        content: String,

        /// Date to backfill, YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Rewrite the content of an existing star
    Edit { id: String, content: String },

    /// Print one star
    Show { id: String },

    /// List this year's stars by date
    List,

    /// List this year's days without a star
    Dates,

    /// Pull a random star out of the jar
    Shake,

    /// Month-by-month recap of this year
    Recap,

    /// List archived years, or print one archived jar
    Archives { year: Option<i32> },

    /// Print a share link for a star
    Share { id: String },

    /// Resolve a share link
    Open { link: String },

    /// Print settings, or merge a JSON patch into them
    Settings { patch: Option<String> },
}

pub fn run() -> AppResult<()> {
    let cli = Cli::parse();
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => crate::default_data_dir()?,
    };
    crate::init_tracing(&data_dir.join("logs"))?;
    let store = crate::open_store(&data_dir)?;

    let link = match &cli.command {
        Commands::Open { link } => Some(link.clone()),
        _ => None,
    };
    let mut coordinator = ViewCoordinator::start(store, link.as_deref())?;
    match cli.command {
        Commands::Today => {
            let today = coordinator.store().clock().today();
            if coordinator.has_star_today() {
                println!("{} already has a star.", jar::format_date(today));
            } else {
                println!("Nothing folded yet for {}.", jar::format_date(today));
            }
        }
        Commands::Add { content, date } => {
            coordinator.begin_write();
            let star = coordinator.submit_memory(&content, date)?;
            coordinator.finish_folding();
            println!("★ folded into the {} jar", coordinator.jar().year);
            print_star(&star);
        }
        Commands::Edit { id, content } => {
            if !coordinator.edit_memory(&id, &content)? {
                return Err(AppError::NotFound(format!("No star with id {id}")));
            }
            if let Some(star) = coordinator.store().star_by_id(coordinator.jar(), &id) {
                print_star(&star);
            }
        }
        Commands::Show { id } => {
            let star = coordinator
                .store()
                .star_by_id(coordinator.jar(), &id)
                .ok_or_else(|| AppError::NotFound(format!("No star with id {id}")))?;
            print_star(&star);
        }
        Commands::List => {
            for star in jar::stars_by_date(coordinator.jar()) {
                print_star(&star);
            }
        }
        Commands::Dates => {
            for date in coordinator.available_past_dates() {
                println!("{date}");
            }
        }
        Commands::Shake => match coordinator.shake() {
            Some(star) => print_star(&star),
            None => println!("The jar is empty."),
        },
        Commands::Recap => {
            coordinator.view_recap();
            let stats = coordinator.stats();
            println!(
                "{} memories: {} stars, {} days to go",
                stats.year, stats.star_count, stats.days_to_go
            );
            for group in coordinator.recap() {
                println!();
                println!("{}", group.month);
                for star in &group.stars {
                    print_star(star);
                }
            }
        }
        Commands::Archives { year: None } => {
            for year in coordinator.store().archived_years()? {
                println!("{year}");
            }
        }
        Commands::Archives { year: Some(year) } => {
            let archived = coordinator
                .store()
                .archived_jar(year)?
                .ok_or_else(|| AppError::NotFound(format!("No archived jar for {year}")))?;
            for star in jar::stars_by_date(&archived) {
                print_star(&star);
            }
        }
        Commands::Share { id } => {
            let star = coordinator
                .store()
                .star_by_id(coordinator.jar(), &id)
                .ok_or_else(|| AppError::NotFound(format!("No star with id {id}")))?;
            println!("{}", coordinator.share_link(&star)?);
        }
        Commands::Settings { patch } => {
            let settings = match patch {
                Some(raw) => {
                    let update: serde_json::Value = serde_json::from_str(&raw)
                        .map_err(|error| AppError::InvalidInput(error.to_string()))?;
                    coordinator.store().update_settings(update)?
                }
                None => coordinator.store().settings()?,
            };
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Commands::Open { link } => {
            let star = coordinator
                .shared_star()
                .ok_or_else(|| AppError::NotFound(format!("No star behind {link}")))?;
            print_star(star);
        }
    }

    Ok(())
}

fn print_star(star: &MemoryStar) {
    println!("{}  {}", jar::format_date(star.date), star.content);
    println!("    id: {}", star.id);
}
