//! `--version` output.

use std::fmt;

/// Versions of this binary and of the library it was built against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionInfo {
    pub binary: &'static str,
    pub library: &'static str,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            binary: clap::crate_version!(),
            library: libgcrclean::version(),
        }
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "gcr-clean {}", self.binary)?;
        write!(f, "libgcrclean {}", self.library)
    }
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
