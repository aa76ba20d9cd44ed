//! Logger module
//!
//! Provides logging utilities for the gateway and router including:
//! - Server lifecycle logging
//! - Per-operation dispatch logging
//! - Access logging with multiple formats
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::LogLevel;

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup. An unknown level falls
/// back to `info` with a warning.
pub fn init(config: &Config) -> std::io::Result<()> {
    let (level, unknown) = match config.logging.level.parse::<LogLevel>() {
        Ok(level) => (level, None),
        Err(e) => (LogLevel::Info, Some(e)),
    };
    writer::init(
        level,
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )?;
    if let Some(e) = unknown {
        log_warning(&format!("{e}, using info"));
    }
    Ok(())
}

/// Initialize for one-shot commands whose stdout carries the result:
/// only warnings and errors are written, to stderr or the error log file.
pub fn init_quiet(config: &Config) -> std::io::Result<()> {
    writer::init(
        LogLevel::Warn,
        None,
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

fn write_debug(message: &str) {
    if let Some(w) = writer::get() {
        w.write_debug(message);
    }
}

fn write_warning(message: &str) {
    match writer::get() {
        Some(w) => w.write_warning(message),
        None => eprintln!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, operations: &[&str]) {
    write_info("======================================");
    write_info(&format!("{} started successfully", config.app.name));
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Endpoint: {}", config.gateway.endpoint_path));
    write_info(&format!(
        "Environment: {} ({})",
        config.app.environment, config.app.region
    ));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info(&format!("Operations: {}", operations.join(", ")));
    write_info("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_rejected(peer_addr: &SocketAddr, limit: u64) {
    write_warning(&format!(
        "[WARN] Connection from {peer_addr} dropped: limit of {limit} reached"
    ));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_warning(&format!("[WARN] {message}"));
}

pub fn log_headers_count(count: usize, show: bool) {
    if show {
        write_debug(&format!("[Headers] Count: {count}"));
    }
}

/// One line per dispatched operation
pub fn log_operation(operation: &str, method: &str, status: u16, elapsed_us: u64) {
    write_info(&format!(
        "[Operation] {operation} {method} - {status} ({elapsed_us}us)"
    ));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}
