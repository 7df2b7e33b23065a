//! Performance-layer toggles.
//!
//! Every fast path can be switched off independently without changing what
//! a script computes or prints. Hosts build a [`PerfConfig`] in code, parse
//! one from a named-option string, or read the `QUILL_PERF` environment
//! variable:
//!
//! ```text
//! QUILL_PERF="methodCache=off,scopePool=on,maxCallDepth=512"
//! ```

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

bitflags! {
    /// Individually switchable fast paths.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PerfFlags: u8 {
        const METHOD_CACHE = 1 << 0;
        const FIELD_CACHE = 1 << 1;
        const INDEX_CACHE = 1 << 2;
        const SCOPE_POOL = 1 << 3;
        const ADAPTIVE_GROWTH = 1 << 4;
    }
}

/// Environment variable read by [`PerfConfig::from_env`].
pub const PERF_ENV_VAR: &str = "QUILL_PERF";

/// Default limit on nested script calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 4096;

const OPTION_NAMES: [(&str, PerfFlags); 5] = [
    ("methodCache", PerfFlags::METHOD_CACHE),
    ("fieldCache", PerfFlags::FIELD_CACHE),
    ("indexCache", PerfFlags::INDEX_CACHE),
    ("scopePool", PerfFlags::SCOPE_POOL),
    ("adaptiveGrowth", PerfFlags::ADAPTIVE_GROWTH),
];

/// Runtime configuration of the performance layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PerfConfig {
    pub flags: PerfFlags,
    /// Nested script calls beyond this raise `IllegalStateException`.
    pub max_call_depth: usize,
}

impl Default for PerfConfig {
    fn default() -> Self {
        PerfConfig {
            flags: PerfFlags::all(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl PerfConfig {
    /// Every fast path disabled.
    pub fn baseline() -> Self {
        PerfConfig {
            flags: PerfFlags::empty(),
            ..PerfConfig::default()
        }
    }

    pub fn with_flags(flags: PerfFlags) -> Self {
        PerfConfig {
            flags,
            ..PerfConfig::default()
        }
    }

    /// Return a copy with `flag` switched `on` or off.
    #[must_use]
    pub fn with(mut self, flag: PerfFlags, on: bool) -> Self {
        self.flags.set(flag, on);
        self
    }

    #[inline]
    pub fn method_cache(&self) -> bool {
        self.flags.contains(PerfFlags::METHOD_CACHE)
    }

    #[inline]
    pub fn field_cache(&self) -> bool {
        self.flags.contains(PerfFlags::FIELD_CACHE)
    }

    #[inline]
    pub fn index_cache(&self) -> bool {
        self.flags.contains(PerfFlags::INDEX_CACHE)
    }

    #[inline]
    pub fn scope_pool(&self) -> bool {
        self.flags.contains(PerfFlags::SCOPE_POOL)
    }

    #[inline]
    pub fn adaptive_growth(&self) -> bool {
        self.flags.contains(PerfFlags::ADAPTIVE_GROWTH)
    }

    /// Parse named options on top of the defaults.
    ///
    /// Options are separated by commas or whitespace; each is `name=value`.
    /// Boolean values accept `on/off/true/false/1/0`.
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        let mut config = PerfConfig::default();
        for option in spec
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
        {
            let Some((name, value)) = option.split_once('=') else {
                return Err(ConfigError::Malformed(option.to_owned()));
            };
            let (name, value) = (name.trim(), value.trim());
            if name == "maxCallDepth" {
                config.max_call_depth = value.parse().map_err(|_| ConfigError::InvalidValue {
                    option: name.to_owned(),
                    value: value.to_owned(),
                })?;
                continue;
            }
            let flag = OPTION_NAMES
                .iter()
                .find(|(known, _)| *known == name)
                .map(|(_, flag)| *flag)
                .ok_or_else(|| ConfigError::UnknownOption(name.to_owned()))?;
            let on = parse_switch(value).ok_or_else(|| ConfigError::InvalidValue {
                option: name.to_owned(),
                value: value.to_owned(),
            })?;
            config.flags.set(flag, on);
        }
        Ok(config)
    }

    /// Read [`PERF_ENV_VAR`]; defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(PERF_ENV_VAR) {
            Ok(spec) => Self::parse(&spec),
            Err(_) => Ok(PerfConfig::default()),
        }
    }
}

impl FromStr for PerfConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PerfConfig::parse(s)
    }
}

impl fmt::Display for PerfConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, flag) in OPTION_NAMES {
            let state = if self.flags.contains(flag) { "on" } else { "off" };
            write!(f, "{name}={state},")?;
        }
        write!(f, "maxCallDepth={}", self.max_call_depth)
    }
}

fn parse_switch(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => Some(true),
        "off" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Invalid performance configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    UnknownOption(String),
    InvalidValue { option: String, value: String },
    Malformed(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownOption(name) => write!(f, "unknown performance option '{name}'"),
            ConfigError::InvalidValue { option, value } => {
                write!(f, "invalid value '{value}' for option '{option}'")
            }
            ConfigError::Malformed(text) => write!(f, "expected name=value, found '{text}'"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "test assertions use unwrap for clarity")]
mod tests;
