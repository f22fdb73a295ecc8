//! Host platform identifiers and the facts conditional variables may query.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform identifier used to gate templates.
///
/// Serialized with the classic short identifiers (`linux`, `darwin`,
/// `win32`, `freebsd`); `macos` and `windows` are accepted as aliases.
/// Hosts outside that set are [`Platform::Other`], which configuration
/// cannot name, so no template is active there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Platform {
    #[serde(rename = "linux")]
    Linux,
    #[serde(rename = "darwin", alias = "macos")]
    Darwin,
    #[serde(rename = "win32", alias = "windows")]
    Windows,
    #[serde(rename = "freebsd")]
    FreeBsd,
    /// Any other host OS.
    #[serde(skip)]
    Other,
}

impl Platform {
    /// Detect the current platform.
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value.
    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" => Platform::Linux,
            "macos" => Platform::Darwin,
            "windows" => Platform::Windows,
            "freebsd" => Platform::FreeBsd,
            _ => Platform::Other,
        }
    }

    /// The identifier used in configuration files.
    pub fn id(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Darwin => "darwin",
            Platform::Windows => "win32",
            Platform::FreeBsd => "freebsd",
            Platform::Other => "unsupported",
        }
    }

    /// `unix` or `windows`.
    pub fn family(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Other => std::env::consts::FAMILY,
            _ => "unix",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Other => write!(f, "unsupported ({})", std::env::consts::OS),
            _ => f.write_str(self.id()),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linux" => Ok(Platform::Linux),
            "darwin" | "macos" => Ok(Platform::Darwin),
            "win32" | "windows" => Ok(Platform::Windows),
            "freebsd" => Ok(Platform::FreeBsd),
            _ => Err(format!("unknown platform: {}", s)),
        }
    }
}

/// A host fact a conditional variable can be computed from.
///
/// This is a closed set: configuration can only ask for these facts and
/// map their values through a lookup table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlatformFact {
    /// Platform identifier (`linux`, `darwin`, ...).
    #[default]
    #[serde(alias = "sys.platform")]
    CurrentPlatform,
    /// CPU architecture (`x86_64`, `aarch64`, ...).
    Arch,
    /// `unix` or `windows`.
    Family,
}

/// Facts about the host, captured once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostFacts {
    pub platform: Platform,
    pub arch: String,
}

impl HostFacts {
    /// Facts for the machine we are running on.
    pub fn detect() -> Self {
        Self::for_platform(Platform::current())
    }

    /// Facts for a chosen platform, keeping the real architecture.
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            platform,
            arch: std::env::consts::ARCH.to_string(),
        }
    }

    /// Evaluate a fact.
    pub fn resolve(&self, fact: PlatformFact) -> String {
        match fact {
            PlatformFact::CurrentPlatform => self.platform.id().to_string(),
            PlatformFact::Arch => self.arch.clone(),
            PlatformFact::Family => self.platform.family().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_ids_round_trip_through_from_str() {
        for platform in [
            Platform::Linux,
            Platform::Darwin,
            Platform::Windows,
            Platform::FreeBsd,
        ] {
            assert_eq!(platform.id().parse::<Platform>().unwrap(), platform);
        }
    }

    #[test]
    fn from_str_accepts_aliases() {
        assert_eq!("macos".parse::<Platform>().unwrap(), Platform::Darwin);
        assert_eq!("Windows".parse::<Platform>().unwrap(), Platform::Windows);
        assert!("beos".parse::<Platform>().is_err());
    }

    #[test]
    fn deserializes_short_identifiers_and_aliases() {
        let platforms: Vec<Platform> =
            serde_yaml::from_str("[linux, darwin, macos, win32]").unwrap();
        assert_eq!(
            platforms,
            vec![
                Platform::Linux,
                Platform::Darwin,
                Platform::Darwin,
                Platform::Windows
            ]
        );
    }

    #[test]
    fn unknown_platform_fails_to_deserialize() {
        let result: Result<Vec<Platform>, _> = serde_yaml::from_str("[amiga]");
        assert!(result.is_err());
    }

    #[test]
    fn os_names_map_to_platforms() {
        assert_eq!(Platform::from_os("linux"), Platform::Linux);
        assert_eq!(Platform::from_os("macos"), Platform::Darwin);
        assert_eq!(Platform::from_os("windows"), Platform::Windows);
        assert_eq!(Platform::from_os("freebsd"), Platform::FreeBsd);
        assert_eq!(Platform::from_os("openbsd"), Platform::Other);
        assert_eq!(Platform::from_os("netbsd"), Platform::Other);
    }

    #[test]
    fn other_platform_cannot_be_named() {
        assert!("unsupported".parse::<Platform>().is_err());
        let result: Result<Vec<Platform>, _> = serde_yaml::from_str("[other]");
        assert!(result.is_err());
        assert!(Platform::Other.to_string().starts_with("unsupported"));
    }

    #[test]
    fn current_platform_matches_cfg() {
        let current = Platform::current();
        if cfg!(target_os = "linux") {
            assert_eq!(current, Platform::Linux);
        } else if cfg!(target_os = "macos") {
            assert_eq!(current, Platform::Darwin);
        }
    }

    #[test]
    fn facts_resolve_per_platform() {
        let facts = HostFacts::for_platform(Platform::Darwin);
        assert_eq!(facts.resolve(PlatformFact::CurrentPlatform), "darwin");
        assert_eq!(facts.resolve(PlatformFact::Family), "unix");
        assert_eq!(facts.resolve(PlatformFact::Arch), std::env::consts::ARCH);

        let windows = HostFacts::for_platform(Platform::Windows);
        assert_eq!(windows.resolve(PlatformFact::Family), "windows");
    }

    #[test]
    fn fact_names_are_snake_case() {
        let fact: PlatformFact = serde_yaml::from_str("current_platform").unwrap();
        assert_eq!(fact, PlatformFact::CurrentPlatform);
        let legacy: PlatformFact = serde_yaml::from_str("sys.platform").unwrap();
        assert_eq!(legacy, PlatformFact::CurrentPlatform);
    }
}
