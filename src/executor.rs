use anyhow::{Context, Result};
use std::process::{Command, ExitStatus};

/// Re-execute a recorded command in its original working directory.
///
/// Runs through `sh -c` with stdio inherited so interactive commands behave
/// as they did originally. The directory is single-quote escaped; the
/// command itself is replayed verbatim, exactly as the shell hook saw it.
pub fn execute_in_dir(cwd: &str, command: &str) -> Result<ExitStatus> {
    let shell_command = format!("cd {} && {}", shell_escape(cwd), command);

    Command::new("sh")
        .arg("-c")
        .arg(&shell_command)
        .status()
        .context("failed to launch shell")
}

/// Single-quote a string for safe interpolation into a shell command.
pub fn shell_escape(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\"'\"'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_plain_paths() {
        assert_eq!(shell_escape("/home/user"), "'/home/user'");
    }

    #[test]
    fn escapes_embedded_single_quotes() {
        assert_eq!(shell_escape("/tmp/it's"), r#"'/tmp/it'"'"'s'"#);
    }

    #[test]
    fn runs_in_the_requested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let status = execute_in_dir(dir.path().to_str().unwrap(), "test -d .").unwrap();
        assert!(status.success());
    }

    #[test]
    fn propagates_command_failure() {
        let dir = tempfile::tempdir().unwrap();
        let status = execute_in_dir(dir.path().to_str().unwrap(), "false").unwrap();
        assert!(!status.success());
    }
}
