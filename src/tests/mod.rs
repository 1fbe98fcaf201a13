use crate::history::Entry;

mod integration;

// Test utilities and helpers
pub(crate) struct TestUtils;

impl TestUtils {
    pub fn entry(session: &str, cwd: &str, command: &str) -> Entry {
        Entry::new(session.to_string(), cwd.to_string(), command.to_string())
    }
}
