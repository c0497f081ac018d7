use crate::error::DecodeError;
use crate::util::{env_flag, env_non_empty};
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_PATH: &str = "/tmp/wardline.log";
const DEBUG_PAYLOAD_ENV: &str = "WARDLINE_DEBUG_PAYLOAD";
const LOG_PATH_ENV: &str = "WARDLINE_LOG_PATH";
const LOG_FILTER_ENV: &str = "WARDLINE_LOG";
const DEFAULT_FILTER: &str = "info";

static TRACING_INIT: OnceLock<()> = OnceLock::new();

pub fn debug_payload_enabled() -> bool {
    env_flag(DEBUG_PAYLOAD_ENV).unwrap_or(false)
}

pub fn emit_debug_payload(request_url: &str, payload: &Value) {
    let formatted = serde_json::to_string_pretty(payload)
        .unwrap_or_else(|_| "<payload serialization error>".to_string());
    tracing::debug!(url = request_url, payload = %formatted, "agent run request");
}

pub fn emit_frame_decode_error(error: &DecodeError, data: &str) {
    tracing::warn!(event = error.event(), %error, data, "sse frame decode failed");
}

/// Installs the global tracing subscriber once per process.
///
/// The terminal UI owns stdout, so records go to `WARDLINE_LOG_PATH`, to
/// `/tmp/wardline.log` when stderr is a terminal, or to stderr otherwise.
/// The filter comes from `WARDLINE_LOG`, then `RUST_LOG`, then `info`.
pub fn init_tracing() {
    TRACING_INIT.get_or_init(|| {
        let writer = match resolve_log_path().map(|path| open_log_file(&path)) {
            Some(Ok(file)) => BoxMakeWriter::new(Mutex::new(file)),
            Some(Err(_)) | None => BoxMakeWriter::new(std::io::stderr),
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(resolve_env_filter())
            .with_writer(writer)
            .with_ansi(false)
            .with_target(false)
            .try_init();
    });
}

fn resolve_env_filter() -> EnvFilter {
    env_non_empty(LOG_FILTER_ENV)
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

fn resolve_log_path() -> Option<PathBuf> {
    env_non_empty(LOG_PATH_ENV).map(PathBuf::from).or_else(|| {
        if std::io::stderr().is_terminal() {
            Some(PathBuf::from(DEFAULT_LOG_PATH))
        } else {
            None
        }
    })
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
