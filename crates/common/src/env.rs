//! Environment/runtime helpers
//!
//! Sanity checks run once at startup, before the listener is bound.

use std::path::Path;

use tracing::warn;

/// Warn when the configured static asset directory is missing; requests for
/// assets will 404 in that case but the API keeps working.
pub async fn ensure_static_dir(dir: &str) -> bool {
    if tokio::fs::metadata(dir).await.is_err() {
        warn!(static_dir = %dir, "static assets directory not found; assets will 404");
        return false;
    }
    true
}

/// Create the parent directory of a file-backed SQLite database so the driver
/// can create the file itself. No-op for in-memory and non-SQLite URLs.
pub async fn ensure_sqlite_parent(url: &str) -> anyhow::Result<()> {
    let Some(path) = sqlite_file_path(url) else {
        return Ok(());
    };
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}

fn sqlite_file_path(url: &str) -> Option<&str> {
    let rest = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(path)
}
