use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;
use url::Url;

use podshelf::{
    CatalogConfig, CatalogController, CatalogStatus, DEFAULT_API_BASE, DEFAULT_THRESHOLD,
    EpisodeRef, FavoritesStore, FileStorage, FilterMode, GenreDirectory, NoopReporter,
    ProgressEvent, ProgressReporter, ReqwestClient, SharedProgressReporter, Show, ShowDetail,
};

// Emoji with fallback for terminals without Unicode support
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[i] ");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static STAR: Emoji<'_, '_> = Emoji("⭐ ", "[*] ");
static SPARKLES: Emoji<'_, '_> = Emoji("✨ ", "[+] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static CALENDAR: Emoji<'_, '_> = Emoji("📅 ", "");

/// Browse, search and favorite podcast shows
#[derive(Parser, Debug)]
#[command(name = "podshelf")]
#[command(about = "Browse, search and favorite podcast shows")]
#[command(version)]
struct Args {
    /// Root URL of the catalog API
    #[arg(long, global = true, env = "PODSHELF_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: Url,

    /// Search looseness between 0 (exact) and 1 (anything)
    #[arg(
        short = 't',
        long,
        global = true,
        env = "PODSHELF_THRESHOLD",
        default_value_t = DEFAULT_THRESHOLD
    )]
    threshold: f64,

    /// Directory holding persisted favorites
    #[arg(long, global = true, env = "PODSHELF_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Seed for the featured-shows sampler
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Quiet mode - suppress the loading indicator
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List shows, optionally searched and filtered
    Browse {
        /// Fuzzy title search
        #[arg(short = 's', long, default_value = "")]
        search: String,

        /// A-Z, Z-A, Newest, Oldest, Genres, or a genre title
        #[arg(short, long, default_value = "Genres")]
        mode: FilterMode,
    },

    /// Show a random selection of featured shows
    Sample {
        #[arg(default_value = "5")]
        count: usize,
    },

    /// List known genres
    Genres,

    /// Show seasons and episodes of one show
    Show { id: String },

    /// Manage favorites
    Fav {
        #[command(subcommand)]
        action: FavAction,
    },
}

#[derive(Subcommand, Debug)]
enum FavAction {
    /// Mark a show or episode as favorite
    Add(FavTarget),

    /// Remove a favorite
    Remove(FavTarget),

    /// List favorites
    List {
        /// A-Z, Z-A, Newest, Oldest, Genres, or a genre title
        #[arg(short, long)]
        mode: Option<FilterMode>,
    },
}

#[derive(clap::Args, Debug)]
struct FavTarget {
    show_id: String,

    #[arg(long, requires = "episode")]
    season: Option<u32>,

    #[arg(long, requires = "season")]
    episode: Option<u32>,
}

impl FavTarget {
    fn episode_ref(&self) -> Option<EpisodeRef> {
        self.season
            .zip(self.episode)
            .map(|(season, episode)| EpisodeRef::new(season, episode))
    }
}

/// Loading indicator driven by catalog progress events
struct SpinnerReporter {
    spinner: ProgressBar,
}

impl SpinnerReporter {
    fn new() -> Self {
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);

        Self { spinner }
    }
}

impl ProgressReporter for SpinnerReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::FetchingCatalog { url } => {
                self.spinner
                    .enable_steady_tick(std::time::Duration::from_millis(100));
                self.spinner
                    .set_message(format!("{SEARCH}Fetching catalog: {}", url.cyan()));
            }
            ProgressEvent::FetchingShow { show_id } => {
                self.spinner
                    .enable_steady_tick(std::time::Duration::from_millis(100));
                self.spinner
                    .set_message(format!("{SEARCH}Fetching show {}", show_id.cyan()));
            }
            ProgressEvent::CatalogReady { .. } | ProgressEvent::ShowLoaded { .. } => {
                self.spinner.finish_and_clear();
            }
            ProgressEvent::CatalogFailed { error } => {
                self.spinner
                    .abandon_with_message(format!("{FAILURE}{}", error.red()));
            }
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn favorites_dir(args: &Args) -> PathBuf {
    args.data_dir
        .clone()
        .or_else(FileStorage::default_dir)
        .unwrap_or_else(|| PathBuf::from(".podshelf"))
}

fn print_show(show: &Show, favorite: bool) {
    let marker = if favorite { STAR.to_string() } else { "   ".to_string() };
    let genres: Vec<&str> = show.genres.iter().map(|g| g.title.as_str()).collect();

    println!(
        "{}{} {} {}",
        marker,
        show.title.bold(),
        format!("({})", show.id).dimmed(),
        format!("{} seasons", show.seasons).cyan()
    );
    println!(
        "     {}{}  {}",
        CALENDAR,
        show.updated_display.dimmed(),
        genres.join(", ").yellow()
    );
}

fn print_detail(detail: &ShowDetail, favorites: &FavoritesStore<FileStorage>) {
    let description = html_escape::decode_html_entities(&detail.description).into_owned();

    println!("\n{HEADPHONES}{}", detail.title.bold().green());
    println!("   {}", description.dimmed());
    println!("   {}{}\n", CALENDAR, detail.updated_display);

    for season in &detail.seasons {
        println!(
            "{} {}",
            season.title.bold(),
            format!("({} episodes)", season.episodes.len()).dimmed()
        );
        for episode in &season.episodes {
            let episode_ref = EpisodeRef::new(season.number, episode.number);
            let marker = if favorites.is_favorite(&detail.id, Some(episode_ref)) {
                STAR.to_string()
            } else {
                "   ".to_string()
            };
            println!("  {}{} {}", marker, episode_ref.to_string().cyan(), episode.title);
        }
    }
}

fn print_favorites_header(count: usize) {
    println!("\n{STAR}{}\n", format!("{count} favorites").bold().yellow());
}

/// Load the catalog, printing why if it could not be loaded
async fn load_catalog(controller: &mut CatalogController, client: &ReqwestClient) -> bool {
    if controller.load(client).await == CatalogStatus::Ready {
        return true;
    }

    if let Some(error) = controller.error() {
        eprintln!("\n{FAILURE}{} {}", "Could not load catalog:".red().bold(), error);
    }
    false
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let mut config = CatalogConfig::new(args.api_base.clone()).with_threshold(args.threshold);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let reporter: SharedProgressReporter = if args.quiet {
        NoopReporter::shared()
    } else {
        Arc::new(SpinnerReporter::new())
    };

    let client = ReqwestClient::new();
    let mut controller = CatalogController::new(config, reporter);
    let mut favorites = FavoritesStore::load(FileStorage::new(favorites_dir(&args)));

    match &args.command {
        Command::Genres => {
            for genre in GenreDirectory::standard().all() {
                println!("{:>3}  {}", genre.id.to_string().dimmed(), genre.title);
            }
        }

        Command::Browse { search, mode } => {
            if !load_catalog(&mut controller, &client).await {
                std::process::exit(1);
            }

            controller.set_query(search.as_str());
            controller.set_mode(mode.clone());
            let view = controller.view_state();

            println!(
                "\n{HEADPHONES}{} {}\n",
                format!("{} shows", view.shows.len()).bold().green(),
                format!("[{}]", controller.mode()).dimmed()
            );
            for show in view.shows {
                print_show(show, favorites.is_favorite(&show.id, None));
            }
        }

        Command::Sample { count } => {
            if !load_catalog(&mut controller, &client).await {
                std::process::exit(1);
            }

            println!("\n{SPARKLES}{}\n", "Featured shows".bold().magenta());
            for show in controller.promotional_sample(*count) {
                print_show(&show, favorites.is_favorite(&show.id, None));
            }
        }

        Command::Show { id } => {
            let detail = controller
                .show_detail(&client, id)
                .await
                .with_context(|| format!("Failed to load show {id}"))?;
            print_detail(&detail, &favorites);
        }

        Command::Fav { action } => match action {
            FavAction::Add(target) | FavAction::Remove(target) => {
                let episode_ref = target.episode_ref();
                let result = if matches!(action, FavAction::Add(_)) {
                    favorites.add(&target.show_id, episode_ref)
                } else {
                    favorites.remove(&target.show_id, episode_ref)
                };

                let label = match episode_ref {
                    Some(episode_ref) => format!("{} {}", target.show_id, episode_ref),
                    None => target.show_id.clone(),
                };

                match result {
                    Ok(true) => println!("{STAR}{}", label.green()),
                    Ok(false) => println!("{}", format!("{label}: nothing changed").dimmed()),
                    Err(e) => {
                        // The favorite did not stick; say so without failing the run
                        eprintln!("{FAILURE}{} {}", "Favorite not saved:".yellow().bold(), e);
                    }
                }
            }

            FavAction::List { mode } => {
                let loaded = load_catalog(&mut controller, &client).await;
                let by_catalog = matches!(
                    mode,
                    Some(
                        FilterMode::TitleAscending
                            | FilterMode::TitleDescending
                            | FilterMode::Genre(_)
                    )
                );
                if loaded && by_catalog && let Some(mode) = mode {
                    let shows = controller.favorite_shows(&favorites, mode);
                    print_favorites_header(shows.len());
                    for show in shows {
                        print_show(show, true);
                    }
                    return Ok(());
                }

                let entries = favorites.list(mode.as_ref());
                print_favorites_header(entries.len());
                for entry in entries {
                    let title = controller
                        .snapshot()
                        .and_then(|snapshot| snapshot.get(&entry.show_id))
                        .map(|show| show.title.clone())
                        .unwrap_or_else(|| entry.show_id.clone());
                    let episode = entry
                        .episode_ref
                        .map(|e| e.to_string())
                        .unwrap_or_default();

                    println!(
                        "  {} {} {}",
                        title.bold(),
                        episode.cyan(),
                        entry.added_at.format("%Y-%m-%d").to_string().dimmed()
                    );
                }
            }
        },
    }

    Ok(())
}
