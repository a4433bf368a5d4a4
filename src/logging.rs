use std::sync::Mutex;

use color_eyre::Result;
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

lazy_static::lazy_static! {
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

/// Initialize file logging. `None` path logs to `<package>.log` in the
/// working directory; `None` level means WARN unless `RUST_LOG` says otherwise.
pub fn init_with(
    custom_log_path: Option<std::path::PathBuf>,
    level: Option<tracing::Level>,
) -> Result<()> {
    let log_path = if let Some(path) = custom_log_path {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        path
    } else {
        let cwd = std::env::current_dir()?;
        cwd.join(LOG_FILE.clone())
    };

    // CLI level overrides env; otherwise WARN
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.unwrap_or(tracing::Level::WARN).into())
        .from_env_lossy();

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;
    let file_subscriber = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(Mutex::new(log_file))
        .with_target(false)
        .with_ansi(false)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_subscriber)
        .with(ErrorLayer::default())
        .try_init()?;

    Ok(())
}
