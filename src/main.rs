use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use guessr::config::{Config, FileConfigStore};
use guessr::host::{FileClueSource, Host, TerminalSink, forward_clues, spawn_stdin_reader};
use guessr::session::Session;
use guessr::session::ports::{ConfigStore, SuggestionSink};
use guessr::source::{BankLoader, BankSources};

#[derive(Parser)]
#[command(name = "guessr", version, about = "Word suggestions for drawing-and-guessing games")]
struct Cli {
    #[arg(long, global = true, help = "Config file (defaults to the user config dir)")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Never fetch word banks over the network")]
    offline: bool,

    #[arg(short, long, global = true, help = "Word bank JSON file to use as the official list")]
    bank: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print suggestions for a single clue, e.g. `guessr match "c_t"`
    Match {
        clue: String,

        #[arg(short, long, help = "0 alphabetical, 1 popularity, 2 difficulty, 3 popularity then difficulty")]
        sort: Option<i64>,

        #[arg(short, long, help = "Comma-separated custom words")]
        custom: Option<String>,

        #[arg(short = 'n', long, help = "Show at most this many suggestions")]
        limit: Option<usize>,
    },
    /// Interactive session driven by commands on stdin
    Play {
        #[arg(long, help = "File holding the current clue, polled for changes")]
        clue_file: Option<PathBuf>,
    },
}

fn sources(config: &Config, bank: Option<&PathBuf>, offline: bool) -> BankSources {
    let mut config = config.clone();
    if let Some(path) = bank {
        let location = path.to_string_lossy().to_string();
        config.word_bank_urls.clear();
        config
            .word_bank_urls
            .insert(config.language.clone(), location.clone());
        config.word_bank_url = location;
    }
    let sources = BankSources::from_config(&config);
    if offline { sources.offline() } else { sources }
}

fn run_match(
    config: Config,
    sources: &BankSources,
    clue: &str,
    sort: Option<i64>,
    custom: Option<String>,
    limit: Option<usize>,
) -> Result<()> {
    let mut config = config;
    if let Some(custom) = custom {
        config.custom_word_list = custom;
    }
    if let Some(limit) = limit {
        config.max_suggestions = limit;
    }

    let mut session = Session::new(&config);
    if let Some(sort) = sort
        && !session.set_sort_mode(sort)
    {
        bail!("unknown sorting mode {sort}, expected 0-3");
    }

    let request = session.begin_rebuild();
    let bank = sources.build(&request)?;
    session.publish_bank(request.generation, bank);
    session.observe_clue(clue);

    TerminalSink::stdout().render(&session.suggestions());
    Ok(())
}

fn run_play(store: FileConfigStore, sources: BankSources, clue_file: Option<PathBuf>) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    spawn_stdin_reader(tx.clone());
    if let Some(path) = clue_file {
        let mut source = FileClueSource::new(path, Duration::from_millis(250));
        forward_clues(&mut source, tx.clone());
    }

    let mut sink = TerminalSink::stdout();
    sink.notice("guessr: type `help` for commands");
    let mut host = Host::new(store, sink, BankLoader::new(sources), tx);
    host.run(&rx)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let store = match &cli.config {
        Some(path) => FileConfigStore::open_at(path.clone())?,
        None => FileConfigStore::open()?,
    };
    let config = store.get();
    let sources = sources(&config, cli.bank.as_ref(), cli.offline);

    match cli.command {
        Commands::Match {
            clue,
            sort,
            custom,
            limit,
        } => run_match(config, &sources, &clue, sort, custom, limit),
        Commands::Play { clue_file } => run_play(store, sources, clue_file),
    }
}
