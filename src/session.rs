use anyhow::{Context, Result};
use chrono::Utc;
use std::env;
use std::fs;
use std::path::Path;

/// Environment variable carrying the current shell session id.
pub const SESSION_ENV: &str = "HISTREE_SESSION_ID";

const SESSION_FILE: &str = "current_session";

/// The session id for the invoking shell.
///
/// Prefers the environment variable set by the shell hook; falls back to a
/// pid + tty identity so recording still works without the hook installed.
/// Callers treat the result as an opaque string.
pub fn current_session_id() -> String {
    if let Ok(id) = env::var(SESSION_ENV) {
        if !id.is_empty() {
            return id;
        }
    }

    let tty = env::var("TTY")
        .unwrap_or_else(|_| "unknown".to_string())
        .replace('/', "-");
    format!("{}_{}", std::process::id(), tty)
}

/// Mint a fresh session id and persist it under the data directory so the
/// shell hook can export it for child processes.
pub fn initialize_session(data_dir: &Path) -> Result<String> {
    let host = env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
    let id = format!("{}_{}_{}", host, std::process::id(), Utc::now().timestamp());

    fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory {:?}", data_dir))?;
    fs::write(data_dir.join(SESSION_FILE), &id).context("failed to write session file")?;

    env::set_var(SESSION_ENV, &id);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_session_id_is_filesystem_safe() {
        // Without the env var the id is pid-based and contains no slashes.
        env::remove_var(SESSION_ENV);
        let id = current_session_id();
        assert!(!id.is_empty());
        assert!(!id.contains('/'));
    }

    #[test]
    fn initialize_writes_the_session_file() {
        let dir = tempfile::tempdir().unwrap();
        let id = initialize_session(dir.path()).unwrap();
        let stored = fs::read_to_string(dir.path().join(SESSION_FILE)).unwrap();
        assert_eq!(id, stored);
    }
}
