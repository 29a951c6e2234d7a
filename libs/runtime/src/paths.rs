use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

/// Resolve the server home directory.
///
/// - `None` (or blank) → `<platform home>/<default_subdir>`
/// - `~` / `~/...` → expanded against the platform home
/// - relative paths → made absolute against the current working directory
///
/// When `create` is set the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let platform_home = || {
        dirs::home_dir().ok_or_else(|| anyhow!("cannot determine the user home directory"))
    };

    let raw = configured
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let path = match raw {
        None => platform_home()?.join(default_subdir),
        Some(s) if s == "~" => platform_home()?,
        Some(s) => match s.strip_prefix("~/").or_else(|| s.strip_prefix("~\\")) {
            Some(rest) => platform_home()?.join(rest),
            None => PathBuf::from(s),
        },
    };

    let path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .context("cannot read the current working directory")?
            .join(path)
    };

    if create {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("failed to create home dir {}", path.display()))?;
    }

    Ok(path)
}
