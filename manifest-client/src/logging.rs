//! Logging Infrastructure
//!
//! Console logging plus optional daily rotating files:
//! - `app/app.YYYY-MM-DD`: everything except audit events (pruned after 14 days)
//! - `audit/audit.YYYY-MM-DD`: manifest commits and imports (never pruned)

use chrono::{Local, NaiveDate};
use std::fs;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// Days an application log file is kept
pub const APP_LOG_RETENTION_DAYS: i64 = 14;

/// Initialize the logging system
///
/// `RUST_LOG` overrides `level` when set. Returns an error if a global
/// subscriber is already installed.
///
/// # Examples
/// ```no_run
/// // Development (console only)
/// manifest_client::logging::init_logger("debug", false, None)?;
///
/// // Production (JSON console + files)
/// manifest_client::logging::init_logger("info", true, Some(std::path::Path::new("./logs")))?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger(level: &str, json_format: bool, log_dir: Option<&Path>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let json_console = json_format.then(|| {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
    });
    let pretty_console = (!json_format).then(|| {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
    });

    let (app_layer, audit_layer) = match log_dir {
        Some(dir) => {
            let app_dir = dir.join("app");
            let audit_dir = dir.join("audit");
            fs::create_dir_all(&app_dir)?;
            fs::create_dir_all(&audit_dir)?;

            if let Err(e) = cleanup_old_logs(dir, Local::now().date_naive()) {
                eprintln!("Failed to clean up old logs: {e}");
            }

            let app_log = RollingFileAppender::new(Rotation::DAILY, app_dir, "app");
            let app_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_writer(std::sync::Mutex::new(app_log))
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    meta.target() != "audit"
                }));

            let audit_log = RollingFileAppender::new(Rotation::DAILY, audit_dir, "audit");
            let audit_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_writer(std::sync::Mutex::new(audit_log))
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    meta.target() == "audit"
                }));

            (Some(app_layer), Some(audit_layer))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_console)
        .with(pretty_console)
        .with(app_layer)
        .with(audit_layer)
        .try_init()?;

    Ok(())
}

/// Delete application logs older than [`APP_LOG_RETENTION_DAYS`].
/// Audit logs are never touched. Returns the number of files removed.
pub fn cleanup_old_logs(log_dir: &Path, today: NaiveDate) -> anyhow::Result<usize> {
    let app_log_dir = log_dir.join("app");
    if !app_log_dir.exists() {
        return Ok(0);
    }
    let cutoff = today - chrono::Duration::days(APP_LOG_RETENTION_DAYS);

    let mut removed = 0;
    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        // app.YYYY-MM-DD
        if let Some(name) = path.file_name().and_then(|n| n.to_str())
            && let Some(date_part) = name.strip_prefix("app.")
            && let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            && date < cutoff
        {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Audit log helper for business operations on the manifest pool
///
/// ```no_run
/// manifest_client::audit_log!(7, "commit", "manifest:42", "3 records");
/// ```
#[macro_export]
macro_rules! audit_log {
    ($user_id:expr, $action:expr, $resource:expr) => {
        tracing::info!(
            target: "audit",
            user_id = $user_id,
            action = $action,
            resource = %$resource,
            "AUDIT"
        );
    };
    ($user_id:expr, $action:expr, $resource:expr, $details:expr) => {
        tracing::info!(
            target: "audit",
            user_id = $user_id,
            action = $action,
            resource = %$resource,
            details = %$details,
            "AUDIT"
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_old_logs() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("app");
        let audit = dir.path().join("audit");
        fs::create_dir_all(&app).unwrap();
        fs::create_dir_all(&audit).unwrap();

        fs::write(app.join("app.2024-01-01"), "old").unwrap();
        fs::write(app.join("app.2024-05-09"), "recent").unwrap();
        fs::write(app.join("notes.txt"), "other").unwrap();
        fs::write(audit.join("audit.2023-01-01"), "keep").unwrap();

        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let removed = cleanup_old_logs(dir.path(), today).unwrap();

        assert_eq!(removed, 1);
        assert!(!app.join("app.2024-01-01").exists());
        assert!(app.join("app.2024-05-09").exists());
        assert!(app.join("notes.txt").exists());
        assert!(audit.join("audit.2023-01-01").exists());
    }

    #[test]
    fn test_cleanup_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        assert_eq!(cleanup_old_logs(dir.path(), today).unwrap(), 0);
    }
}
