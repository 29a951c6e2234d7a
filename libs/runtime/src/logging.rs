use crate::config::{LoggingConfig, Section};
use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    filter::{FilterFn, Targets},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer, Registry,
};

use file_rotate::{
    compression::Compression,
    suffix::AppendCount,
    ContentLimit, FileRotate,
};

const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 3;

fn parse_level(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

/// Returns true if target == prefix or target starts with "prefix::".
fn matches_target(target: &str, prefix: &str) -> bool {
    target == prefix
        || target
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with("::"))
}

type SharedRotate = Arc<Mutex<FileRotate<AppendCount>>>;

#[derive(Clone)]
struct RotHandle(SharedRotate);

impl Write for RotHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.0.lock() {
            Ok(mut f) => f.write(buf),
            // A poisoned writer drops the record rather than the process.
            Err(_) => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.0.lock() {
            Ok(mut f) => f.flush(),
            Err(_) => Ok(()),
        }
    }
}

/// Writer that may have nowhere to go; writes are then discarded.
struct MaybeHandle(Option<RotHandle>);

impl Write for MaybeHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.0 {
            Some(w) => w.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.0 {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

/// Routes JSON records to per-target files, falling back to the default file.
#[derive(Clone, Default)]
struct FileRouter {
    default: Option<SharedRotate>,
    by_target: Vec<(String, SharedRotate)>,
}

impl FileRouter {
    fn resolve(&self, target: &str) -> Option<RotHandle> {
        self.by_target
            .iter()
            .find(|(prefix, _)| matches_target(target, prefix))
            .map(|(_, w)| RotHandle(w.clone()))
            .or_else(|| self.default.clone().map(RotHandle))
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_target.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = MaybeHandle;

    fn make_writer(&'a self) -> Self::Writer {
        MaybeHandle(self.default.clone().map(RotHandle))
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        MaybeHandle(self.resolve(meta.target()))
    }
}

/// Relative log paths live under `base_dir` (the server home).
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn open_rotating(section: &Section, base_dir: &Path) -> std::io::Result<Option<SharedRotate>> {
    if section.file.trim().is_empty() {
        return Ok(None);
    }
    let path = resolve_log_path(&section.file, base_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let backups = section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS);

    let rot = FileRotate::new(
        &path,
        AppendCount::new(backups),
        ContentLimit::BytesSurpassed(max_bytes as usize),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    Ok(Some(Arc::new(Mutex::new(rot))))
}

/// Per-target console and file filters. Targets without their own section
/// fall through to the "default" section's levels.
struct Filters {
    console: Targets,
    file: Targets,
}

fn build_filters(cfg: &LoggingConfig) -> Filters {
    let default = cfg.get("default");
    let console_default = default
        .map(|s| parse_level(&s.console_level))
        .unwrap_or(LevelFilter::INFO);
    let file_default = default
        .filter(|s| !s.file.trim().is_empty())
        .map(|s| parse_level(&s.file_level))
        .unwrap_or(LevelFilter::OFF);

    let mut console = Targets::new().with_default(console_default);
    let mut file = Targets::new().with_default(file_default);

    for (target, section) in cfg.iter().filter(|(k, _)| k.as_str() != "default") {
        console = console.with_target(target.clone(), parse_level(&section.console_level));
        let level = if section.file.trim().is_empty() {
            file_default
        } else {
            parse_level(&section.file_level)
        };
        file = file.with_target(target.clone(), level);
    }

    Filters { console, file }
}

fn build_router(cfg: &LoggingConfig, base_dir: &Path) -> FileRouter {
    let mut router = FileRouter::default();
    for (target, section) in cfg {
        match open_rotating(section, base_dir) {
            Ok(Some(writer)) if target == "default" => router.default = Some(writer),
            Ok(Some(writer)) => router.by_target.push((target.clone(), writer)),
            Ok(None) => {}
            Err(e) => eprintln!(
                "failed to open log file '{}' for '{}': {}",
                section.file, target, e
            ),
        }
    }
    // Longest prefix wins when targets nest (e.g. "shifts" vs "shifts::api").
    router
        .by_target
        .sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));
    router
}

/// Install the global subscriber.
///
/// `base_dir` resolves relative log file paths (usually `server.home_dir`).
/// Records from the `log` crate are bridged into `tracing`. Calling this more
/// than once is harmless; later calls keep the first subscriber.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    let _ = tracing_log::LogTracer::init();

    let filters = build_filters(cfg);
    let router = build_router(cfg, base_dir);
    let ansi = atty::is(atty::Stream::Stdout);

    let console = fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(filters.console);

    let file = (!router.is_empty()).then(|| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(true)
            .with_level(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(router)
            .with_filter(filters.file)
    });

    let _ = Registry::default().with(console).with(file).try_init();
}

/// Console-only subscriber filtered to `level`, used before config is loaded.
pub fn init_console(level: &str) {
    let _ = tracing_log::LogTracer::init();
    let filter = parse_level(level);
    let _ = Registry::default()
        .with(
            fmt::layer()
                .with_ansi(atty::is(atty::Stream::Stdout))
                .with_target(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_filter(FilterFn::new(move |meta: &tracing::Metadata<'_>| {
                    filter >= *meta.level()
                })),
        )
        .try_init();
}
