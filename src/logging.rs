use crate::config::settings::{DebugLogRotation, LogSettings};
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_NAME: &str = "bunyang-debug.log";

/// Keeps the background log writer alive; flushes on drop
pub struct LogGuard(#[allow(dead_code)] WorkerGuard);

/// Initialize debug logging.
///
/// When `settings.debug` is enabled, logs go to `bunyang-debug.log` next to
/// the config file unless `debug_log_path` says otherwise. When it is
/// disabled, this is a no-op; the TUI owns the terminal so nothing is ever
/// logged to stdout.
pub fn init(settings: &LogSettings) -> Result<Option<LogGuard>> {
    if !settings.debug {
        return Ok(None);
    }

    let rotation = settings
        .debug_log_rotation
        .unwrap_or(DebugLogRotation::Session);
    let base = resolve_base_log_path(settings.debug_log_path.as_deref())?;

    let (writer, log_file, guard) = open_writer(&base, rotation, settings.debug_log_keep)?;

    // Default: debug our crate, warn for everything else. RUST_LOG wins if set.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("bunyang=debug,warn"))
        .unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .try_init()
        .ok(); // Already initialized (tests) is fine.

    tracing::info!(log_file = %log_file.display(), rotation = ?rotation, "debug logging enabled");

    Ok(Some(LogGuard(guard)))
}

fn open_writer(
    base: &Path,
    rotation: DebugLogRotation,
    keep: Option<usize>,
) -> Result<(NonBlocking, PathBuf, WorkerGuard)> {
    let (dir, base_name) = split_dir_and_name(base)?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    match rotation {
        DebugLogRotation::None => {
            let file = open_append(base)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            Ok((writer, base.to_path_buf(), guard))
        }
        DebugLogRotation::Daily => {
            prune_rotated_logs(&dir, &format!("{base_name}."), keep.unwrap_or(7))?;
            let appender = tracing_appender::rolling::daily(&dir, &base_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            Ok((writer, base.to_path_buf(), guard))
        }
        DebugLogRotation::Session => {
            prune_rotated_logs(&dir, &format!("{base_name}.session-"), keep.unwrap_or(20))?;
            let session_path = session_log_path(&dir, &base_name);
            let file = open_append(&session_path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            Ok((writer, session_path, guard))
        }
    }
}

fn open_append(path: &Path) -> Result<std::fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))
}

fn resolve_base_log_path(configured: Option<&str>) -> Result<PathBuf> {
    let Some(raw) = configured.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(crate::config::config_dir()?.join(DEFAULT_LOG_NAME));
    };

    let path = PathBuf::from(expand_tilde(raw));

    // Trailing separator or an existing directory means "put the log in here".
    if raw.ends_with(std::path::MAIN_SEPARATOR) || raw.ends_with('/') || path.is_dir() {
        return Ok(path.join(DEFAULT_LOG_NAME));
    }

    Ok(path)
}

fn expand_tilde(raw: &str) -> String {
    if raw == "~" || raw.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            let suffix = raw.strip_prefix('~').unwrap_or("");
            return format!("{}{}", home.display(), suffix);
        }
    }
    raw.to_string()
}

fn split_dir_and_name(path: &Path) -> Result<(PathBuf, String)> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .context("Invalid debug_log_path: not valid UTF-8")?
        .to_string();
    Ok((dir, name))
}

fn session_log_path(dir: &Path, base_name: &str) -> PathBuf {
    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
    dir.join(format!("{base_name}.session-{ts}"))
}

/// Delete all but the newest `keep` files starting with `prefix`
///
/// Rotated names sort chronologically. `keep == 0` disables pruning.
fn prune_rotated_logs(dir: &Path, prefix: &str, keep: usize) -> Result<usize> {
    if keep == 0 {
        return Ok(0);
    }

    let mut candidates: Vec<String> = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read log directory: {}", dir.display()))?
    {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else { continue };
        if name.starts_with(prefix) {
            candidates.push(name.to_string());
        }
    }

    candidates.sort_unstable_by(|a, b| b.cmp(a)); // newest first

    let mut removed = 0;
    for name in candidates.iter().skip(keep) {
        let path = dir.join(name);
        match std::fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) => {
                tracing::debug!(error = %e, file = %path.display(), "failed to remove old log file")
            }
        }
    }

    Ok(removed)
}

/// Mask the local part of an e-mail address for logs (`ab***@example.com`)
pub fn mask_email(email: &str) -> String {
    let Some((local, domain)) = email.split_once('@') else {
        return "***".to_string();
    };
    let visible: String = local.chars().take(2).collect();
    format!("{visible}***@{domain}")
}
