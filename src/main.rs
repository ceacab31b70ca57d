// moodtunes - command line front end
// Talks to the playlist API, deals quote cards, and drives a simulated player session

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use moodtunes::config::{Config, LoggingConfig};
use moodtunes::player::{Container, MediaId, PlayerSession, PlayerState, SimulatedFactory};
use moodtunes::quotes::{MoodEntry, MoodJournal, QuoteDeck};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[cfg(feature = "api")]
use moodtunes::{api::PlaylistClient, library::Song};

#[derive(Parser)]
#[command(name = "moodtunes")]
#[command(about = "Playlists, quotes and an embeddable player session from the terminal")]
struct Args {
    /// Config file to use instead of the one in the user config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable developer logging (stderr + debug output)
    #[arg(long, global = true)]
    dev: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the playlists of an owner
    #[cfg(feature = "api")]
    Playlists { owner: String },

    /// Show one playlist with its songs
    #[cfg(feature = "api")]
    Playlist { id: String },

    /// Video ids across all of an owner's playlists
    #[cfg(feature = "api")]
    SongIds { owner: String },

    /// Add a song to a playlist
    #[cfg(feature = "api")]
    AddSong {
        playlist: String,
        video_id: String,
        title: String,
        #[arg(long, default_value = "")]
        thumbnail: String,
    },

    /// Search for songs
    #[cfg(feature = "api")]
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },

    /// Play a video through a simulated embedded player
    Play {
        video_id: String,
        /// Resume at this percentage once the player is ready
        #[arg(long)]
        resume: Option<f64>,
        /// Simulated video length in seconds
        #[arg(long, default_value_t = 30.0)]
        duration: f64,
        /// Simulated seconds played per tick
        #[arg(long, default_value_t = 5.0)]
        step: f64,
    },

    /// Deal a random quote card from a JSON file
    Quote { file: PathBuf },

    /// Print a mood journal from a JSON file of entries
    Moods { file: PathBuf },
}

fn init_logging(logging: &LoggingConfig, dev: bool) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&logging.directory)?;

    // Daily rotating file appender
    let file_appender = tracing_appender::rolling::daily(&logging.directory, "moodtunes.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false);

    // Dev mode mirrors everything to stderr
    let stderr_layer = dev.then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Keep the guard alive so buffered log lines get flushed on exit
    let _guard = init_logging(&config.logging, args.dev)?;
    debug!("Loaded config: {:?}", config);

    match args.command {
        #[cfg(feature = "api")]
        Command::Playlists { owner } => {
            let client = PlaylistClient::from_config(&config.api)?;
            for playlist in client.playlists(&owner).await? {
                println!("{}  {} ({} songs)", playlist.id, playlist.title, playlist.len());
            }
        }
        #[cfg(feature = "api")]
        Command::Playlist { id } => {
            let client = PlaylistClient::from_config(&config.api)?;
            let playlist = client.playlist(&id).await?;
            println!("{} by {}", playlist.title, playlist.creator_pub_key);
            for (i, song) in playlist.songs.iter().enumerate() {
                println!("{:3}. {} [{}]", i + 1, song.title, song.video_id);
            }
        }
        #[cfg(feature = "api")]
        Command::SongIds { owner } => {
            let client = PlaylistClient::from_config(&config.api)?;
            for id in client.all_song_ids(&owner).await? {
                println!("{}", id);
            }
        }
        #[cfg(feature = "api")]
        Command::AddSong {
            playlist,
            video_id,
            title,
            thumbnail,
        } => {
            let client = PlaylistClient::from_config(&config.api)?;
            let song = Song::new(video_id, title, thumbnail);
            let updated = client.add_song(&playlist, &song).await?;
            info!("Added '{}' to '{}'", song.title, updated.title);
            println!("{} now has {} songs", updated.title, updated.len());
        }
        #[cfg(feature = "api")]
        Command::Search { query, pages } => {
            let client = PlaylistClient::from_config(&config.api)?;
            let songs = client.search_pager(query).take_pages(pages).await?;
            for song in songs {
                println!("{}  {}", song.video_id, song.title);
            }
        }
        Command::Play {
            video_id,
            resume,
            duration,
            step,
        } => play_simulated(&config, video_id, resume, duration, step).await?,
        Command::Quote { file } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let mut deck = QuoteDeck::from_json(&json)?;
            match deck.deal() {
                Some(quote) => println!("{}", quote),
                None => println!("No quotes in {}", file.display()),
            }
        }
        Command::Moods { file } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let entries: Vec<MoodEntry> = serde_json::from_str(&json)?;
            for entry in MoodJournal::from_entries(entries).entries() {
                println!("{}  {}", entry.date, entry.mood);
            }
        }
    }

    Ok(())
}

fn check_play_args(duration: f64, step: f64) -> Result<()> {
    anyhow::ensure!(
        duration.is_finite() && duration >= 0.0,
        "--duration must be a finite, non-negative number of seconds"
    );
    anyhow::ensure!(step.is_finite() && step > 0.0, "--step must be positive");
    Ok(())
}

async fn play_simulated(
    config: &Config,
    video_id: String,
    resume: Option<f64>,
    duration: f64,
    step: f64,
) -> Result<()> {
    check_play_args(duration, step)?;

    let factory = Arc::new(SimulatedFactory::new(duration).auto_ready());
    let session = PlayerSession::new(factory.clone());
    let (changes_tx, mut changes) = mpsc::unbounded_channel();

    session
        .init_and_wait(
            Container::new(config.player.container.clone()),
            MediaId::new(video_id),
            move |change| {
                let _ = changes_tx.send(change);
            },
            resume,
            config.player.ready_timeout(),
        )
        .await?;

    let player = factory.last().context("simulated player was not created")?;
    session.play();

    let mut ticker = tokio::time::interval(Duration::from_millis(250));
    loop {
        ticker.tick().await;

        let mut ended = false;
        while let Ok(change) = changes.try_recv() {
            println!("state: {:?}", change.state);
            ended |= change.state == PlayerState::Ended;
        }
        if ended {
            break;
        }

        player.advance(step);
        println!("progress: {:5.1}%", session.progress());
    }

    session.destroy();
    Ok(())
}
