//! Version extraction and comparison for "dodgy" version strings.
//!
//! Tools report their versions in all sorts of shapes
//! (`ninja 1.7.2`, `meson 0.41.2`, `v1.7`, `OpenSSL 3.0.2 15 Mar 2022`).
//! [`Version::parse`] finds the first dotted numeric run and turns it into
//! an ordered tuple so that versions compare numerically per component.
//!
//! # Example
//!
//! ```
//! use irequire::version::Version;
//!
//! let installed = Version::parse("ninja version 1.10.2").unwrap();
//! let minimum = Version::parse("1.7.2").unwrap();
//! assert!(installed >= minimum);
//! assert_eq!(Version::parse("1.7.0").unwrap(), Version::parse("v1.7").unwrap());
//! ```

use crate::error::{IrequireError, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// A normalized version: numeric components with trailing zeros dropped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    components: Vec<u64>,
}

// First run of digits and dots, wherever it starts.
static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d[\d.]*").unwrap());

impl Version {
    /// Parse the first digit-and-dot run found anywhere in `raw`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidVersion` if `raw` contains no digits or the run has
    /// an empty (`1..2`) or oversized component.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || IrequireError::InvalidVersion {
            raw: raw.trim().to_string(),
        };

        let run = VERSION_PATTERN.find(raw).ok_or_else(invalid)?;
        let run = run.as_str().trim_end_matches('.');

        let mut components = run
            .split('.')
            .map(|group| group.parse::<u64>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;

        while components.len() > 1 && components.last() == Some(&0) {
            components.pop();
        }

        Ok(Self { components })
    }

    /// Find a version in the output of a `--version` invocation.
    ///
    /// Standard output is searched first; some tools print their banner
    /// on standard error instead.
    pub fn extract(stdout: &str, stderr: &str) -> Result<Self> {
        if VERSION_PATTERN.is_match(stdout) {
            Self::parse(stdout)
        } else if VERSION_PATTERN.is_match(stderr) {
            Self::parse(stderr)
        } else {
            Self::parse(stdout)
        }
    }

    /// The normalized numeric components.
    pub fn components(&self) -> &[u64] {
        &self.components
    }
}

impl FromStr for Version {
    type Err = IrequireError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.components.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}
