use clap::{Parser, ValueEnum};
use source_sleuth::catalog::Site;
use source_sleuth::config::ResolverConfig;
use source_sleuth::metadata::{JsonTitleStore, MemoryTitleStore, TitleStore};
use source_sleuth::{CanonicalTitle, ProgressEvent, SourceRecord, find_sources};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Show id used for titles given on the command line
const INLINE_SHOW_ID: &str = "inline";

#[derive(Parser)]
#[command(name = "source-sleuth")]
#[command(author, version, about = "Resolve playable episode links from anime catalog sites")]
struct Cli {
    /// Catalog site to search
    #[arg(long, value_enum, default_value_t = SiteArg::Animesdigital)]
    site: SiteArg,

    /// Show id to look up in the titles file
    #[arg(long, requires = "titles")]
    show_id: Option<String>,

    /// JSON file mapping show ids to canonical titles
    #[arg(long, requires = "show_id")]
    titles: Option<PathBuf>,

    /// Primary show name
    #[arg(long, conflicts_with = "show_id")]
    name: Option<String>,

    /// Alternate (usually romanized) show name
    #[arg(long, conflicts_with = "show_id")]
    alt_name: Option<String>,

    /// Season number
    #[arg(long, default_value_t = 1, conflicts_with = "show_id")]
    season: u32,

    /// Episode number
    #[arg(short, long)]
    episode: u32,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bypass the page cache
    #[arg(long)]
    no_cache: bool,

    /// Print the sources as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SiteArg {
    Animefhd,
    Animesdigital,
}

impl From<SiteArg> for Site {
    fn from(arg: SiteArg) -> Self {
        match arg {
            SiteArg::Animefhd => Site::AnimeFhd,
            SiteArg::Animesdigital => Site::AnimesDigital,
        }
    }
}

/// Handles progress events and prints formatted output to stderr
fn handle_progress_event(event: ProgressEvent) {
    match event {
        ProgressEvent::Started { title, episode } => {
            eprintln!("SourceSleuth: looking for '{}' episode {}...", title, episode);
        }
        ProgressEvent::Searching { query } => {
            eprintln!("Searching for '{}'...", query);
        }
        ProgressEvent::CandidatesFound { count, .. } => {
            eprintln!("  {} result(s)", count);
        }
        ProgressEvent::CandidatesRanked { count } => {
            eprintln!("{} result(s) worth checking\n", count);
        }
        ProgressEvent::ProcessingCandidate {
            index,
            total,
            title,
            score,
        } => {
            eprintln!("[{}/{}] {} (score {:.2})", index + 1, total, title, score);
        }
        ProgressEvent::SourceFound { reference } => {
            eprintln!("  Found: {}", reference);
        }
        ProgressEvent::Complete { source_count } => {
            eprintln!("\nDone! Found {} source(s).", source_count);
        }
    }
}

fn print_sources(sources: &[SourceRecord], json: bool) {
    if json {
        match serde_json::to_string_pretty(sources) {
            Ok(output) => println!("{}", output),
            Err(e) => {
                eprintln!("Error: Failed to serialize sources: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    if sources.is_empty() {
        println!("No sources found.");
        return;
    }

    for (index, source) in sources.iter().enumerate() {
        println!("Source #{}", index + 1);
        println!("  Title: {}", source.release_title);
        let languages: Vec<String> = source.language_flags.iter().map(|l| l.to_string()).collect();
        println!("  Language: {}", languages.join(", "));
        println!("  Link: {}", source.media_reference);
        println!();
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("source_sleuth=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match ResolverConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => ResolverConfig::default(),
    };
    if cli.no_cache {
        config.use_cache = false;
    }

    let (store, show_id): (Box<dyn TitleStore>, String) = match (&cli.show_id, &cli.titles) {
        (Some(show_id), Some(path)) => match JsonTitleStore::open(path) {
            Ok(store) => (Box::new(store), show_id.clone()),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        _ => {
            if cli.name.is_none() && cli.alt_name.is_none() {
                eprintln!("Error: Either --show-id with --titles, or --name/--alt-name is required");
                process::exit(1);
            }

            let mut store = MemoryTitleStore::new();
            store.insert(
                INLINE_SHOW_ID,
                CanonicalTitle::new(cli.name.clone(), cli.alt_name.clone(), cli.season),
            );
            (Box::new(store), INLINE_SHOW_ID.to_string())
        }
    };

    match find_sources(
        store.as_ref(),
        &show_id,
        cli.episode,
        cli.site.into(),
        &config,
        handle_progress_event,
    ) {
        Ok(sources) => print_sources(&sources, cli.json),
        Err(e) => {
            eprintln!("\nError while resolving sources: {}", e);
            process::exit(1);
        }
    }
}
