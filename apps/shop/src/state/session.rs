//! # Session State
//!
//! The shopper's session id is generated on first use and kept in
//! `<data_dir>/session_id`, so the same cart is found on every run.

use std::io;
use std::path::Path;

use chrono::Utc;
use tracing::{info, warn};

use okaybruh_core::SessionId;

const SESSION_FILE: &str = "session_id";

/// Reads the stored session id, or creates and stores a new one.
///
/// An unreadable or malformed file is replaced rather than failing the
/// command: a lost session only means a fresh, empty cart.
pub fn load_or_create(data_dir: &Path) -> io::Result<SessionId> {
    let path = data_dir.join(SESSION_FILE);

    match std::fs::read_to_string(&path) {
        Ok(raw) => match SessionId::parse(&raw) {
            Ok(session) => return Ok(session),
            Err(e) => warn!(?path, error = %e, "Discarding malformed session file"),
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(?path, error = %e, "Session file unreadable, starting a new session"),
    }

    let session = SessionId::generate(Utc::now());
    std::fs::create_dir_all(data_dir)?;
    std::fs::write(&path, session.as_str())?;
    info!(session = %session, "Started new shopping session");
    Ok(session)
}

/// Forgets the stored session; the next run starts a new one.
pub fn reset(data_dir: &Path) -> io::Result<()> {
    match std::fs::remove_file(data_dir.join(SESSION_FILE)) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
