// TuneDeck - Terminal Music Player
// Scans one folder, lets you build playlists from it, and plays them back in order

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use tunedeck::{config::Config, state::PlayerSession, ui::App};

#[derive(Parser)]
#[command(name = "tunedeck")]
#[command(about = "A terminal music player with saved playlists and a play queue")]
struct Args {
    /// Enable developer logging (keeps stderr alive for debug output)
    #[arg(long)]
    dev: bool,

    /// Folder to scan for songs (overrides the config file)
    #[arg(long, value_name = "DIR")]
    music_dir: Option<PathBuf>,

    /// Playlist file to load on start and save on exit
    #[arg(long, value_name = "FILE")]
    playlists: Option<PathBuf>,
}

fn init_logging(log_dir: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    // Daily rotating file; the TUI owns the terminal so nothing goes to stdout
    let file_appender = tracing_appender::rolling::daily(log_dir, "tunedeck.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tunedeck=debug"));

    let subscriber = tracing_subscriber::fmt()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(filter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load()?.with_overrides(args.music_dir, args.playlists);
    let _log_guard = init_logging(&config.log_directory)?;

    info!("TuneDeck starting up");

    let stderr_guard = if args.dev {
        eprintln!("Dev mode: logging to {}", config.log_directory.display());
        None
    } else {
        debug!("Redirecting stderr to suppress audio backend noise");
        Some(redirect_stderr_to_null()?)
    };

    let outcome = run_player(&config).await;

    // The terminal is already restored; give stderr back before reporting
    drop(stderr_guard);

    match outcome {
        Ok(None) => {
            println!("Playlists saved to {}", config.playlists_file.display());
            Ok(())
        }
        Ok(Some(save_error)) => {
            eprintln!("Could not save playlists: {}", save_error);
            Ok(())
        }
        Err(e) => {
            error!("Fatal: {:#}", e);
            Err(e)
        }
    }
}

/// Run the player to completion. Returns the save error from quitting, if any.
async fn run_player(config: &Config) -> Result<Option<String>> {
    let state = tunedeck::load_state(config);

    #[cfg(feature = "audio")]
    let backend = tunedeck::audio::AudioPlayer::new(config.into())
        .context("opening the audio output device")?;
    #[cfg(not(feature = "audio"))]
    let backend = tunedeck::audio::SilentBackend::new();

    let session = PlayerSession::new(state, backend, &config.playlists_file);
    let mut app = App::new(session, config.ui.clone())?;
    let result = app.run().await;

    let session = app.into_session();
    result?;
    Ok(session.save_error().map(str::to_string))
}

/// Puts the real stderr back when dropped.
#[cfg(unix)]
struct StderrGuard {
    backup: libc::c_int,
}

#[cfg(unix)]
impl Drop for StderrGuard {
    fn drop(&mut self) {
        // SAFETY: `backup` is a descriptor we duplicated and still own
        unsafe {
            libc::dup2(self.backup, libc::STDERR_FILENO);
            libc::close(self.backup);
        }
    }
}

/// Send stderr to /dev/null so ALSA chatter does not scribble over the TUI.
/// The real stderr comes back when the returned guard is dropped.
#[cfg(unix)]
fn redirect_stderr_to_null() -> Result<StderrGuard> {
    // SAFETY: plain fd juggling on descriptors this process owns
    unsafe {
        let null_fd = libc::open(
            b"/dev/null\0".as_ptr() as *const libc::c_char,
            libc::O_WRONLY,
        );
        if null_fd == -1 {
            return Err(anyhow::anyhow!("Failed to open /dev/null"));
        }

        // Keep a copy of the real stderr
        let backup = libc::dup(libc::STDERR_FILENO);
        if backup == -1 {
            libc::close(null_fd);
            return Err(anyhow::anyhow!("Failed to backup stderr"));
        }

        if libc::dup2(null_fd, libc::STDERR_FILENO) == -1 {
            libc::close(null_fd);
            libc::close(backup);
            return Err(anyhow::anyhow!("Failed to redirect stderr"));
        }

        libc::close(null_fd);
        Ok(StderrGuard { backup })
    }
}

#[cfg(not(unix))]
struct StderrGuard;

#[cfg(not(unix))]
fn redirect_stderr_to_null() -> Result<StderrGuard> {
    Ok(StderrGuard)
}
