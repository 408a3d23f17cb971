// ABOUTME: SSH transport for remote cluster hosts.
// ABOUTME: Key-based authentication with known_hosts verification, command execution and upload.

mod client;
mod error;

pub use client::{CommandOutput, Session, SessionConfig};
pub use error::{Error, Result};

/// Quote a value for safe interpolation into a POSIX shell command.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_wraps_plain_values() {
        assert_eq!(quote("/data/tikv-20160"), "'/data/tikv-20160'");
    }

    #[test]
    fn quote_escapes_single_quotes() {
        assert_eq!(quote("it's"), "'it'\\''s'");
    }
}
