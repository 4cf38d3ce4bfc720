//! Typed access to the flags and arguments of the selected command.
//!
//! Every flag is captured by clap as raw text. The accessors here convert it to
//! the type a command needs and report failures as [`CliError::InvalidFlag`]
//! carrying the flag name, the raw value and a one-line reason.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::net::IpAddr;
use std::str::FromStr;

use clap::{parser::ValueSource, ArgMatches};
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::error::CliError;

/// Id of the positional arguments of a leaf command.
pub const ARGS: &str = "args";

/// Typed view over the parsed matches of one command.
#[derive(Debug, Clone, Copy)]
pub struct Flags<'a> {
    matches: &'a ArgMatches,
}

impl<'a> Flags<'a> {
    pub fn new(matches: &'a ArgMatches) -> Self {
        Self { matches }
    }

    fn known(&self, name: &str) -> bool {
        self.matches.try_contains_id(name).is_ok()
    }

    fn raw(&self, name: &str) -> Option<&'a str> {
        self.matches
            .try_get_one::<String>(name)
            .ok()
            .flatten()
            .map(String::as_str)
    }

    fn raw_all(&self, name: &str) -> Vec<&'a str> {
        self.matches
            .try_get_many::<String>(name)
            .ok()
            .flatten()
            .map(|values| values.map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// True if the user set the flag on the command line or through its
    /// environment variable. Built-in defaults do not count.
    pub fn is_set(&self, name: &str) -> bool {
        self.known(name)
            && matches!(
                self.matches.value_source(name),
                Some(ValueSource::CommandLine | ValueSource::EnvVariable)
            )
    }

    /// True only if the flag was given on the command line.
    pub fn is_set_on_command_line(&self, name: &str) -> bool {
        self.known(name) && self.matches.value_source(name) == Some(ValueSource::CommandLine)
    }

    /// Positional arguments in the order given.
    pub fn args(&self) -> Vec<String> {
        self.raw_all(ARGS).into_iter().map(str::to_string).collect()
    }

    /// The raw value, or an empty string.
    pub fn string(&self, name: &str) -> String {
        self.raw(name).unwrap_or_default().to_string()
    }

    /// The raw value if the user set the flag.
    pub fn optional_string(&self, name: &str) -> Option<String> {
        if self.is_set(name) {
            self.raw(name).map(str::to_string)
        } else {
            None
        }
    }

    /// The parsed value, its default, or the type's zero value.
    pub fn value<T>(&self, name: &str) -> Result<T, CliError>
    where
        T: FromStr + Default,
        T::Err: Display,
    {
        match self.raw(name) {
            Some(raw) => parse(name, raw),
            None => Ok(T::default()),
        }
    }

    /// The parsed value if the user set the flag.
    pub fn optional<T>(&self, name: &str) -> Result<Option<T>, CliError>
    where
        T: FromStr,
        T::Err: Display,
    {
        if !self.is_set(name) {
            return Ok(None);
        }
        self.raw(name).map(|raw| parse(name, raw)).transpose()
    }

    /// A boolean flag: `--flag` and `--flag=true` are true.
    pub fn bool(&self, name: &str) -> Result<bool, CliError> {
        match self.raw(name) {
            Some(raw) => parse_bool(name, raw),
            None => Ok(false),
        }
    }

    /// A boolean flag if the user set it.
    pub fn optional_bool(&self, name: &str) -> Result<Option<bool>, CliError> {
        if !self.is_set(name) {
            return Ok(None);
        }
        self.raw(name).map(|raw| parse_bool(name, raw)).transpose()
    }

    /// An integer that must be at least 1, if the user set it.
    pub fn positive(&self, name: &str) -> Result<Option<i64>, CliError> {
        match self.optional::<i64>(name)? {
            Some(value) if value < 1 => Err(CliError::invalid_flag(
                name,
                value.to_string(),
                "must be greater than 0",
            )),
            value => Ok(value),
        }
    }

    /// A repeated flag. `--x a --x b` and `--x a,b` give the same sequence.
    pub fn slice<T>(&self, name: &str) -> Result<Vec<T>, CliError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.raw_all(name)
            .into_iter()
            .map(|raw| parse(name, raw))
            .collect()
    }

    /// A repeated flag if the user set it.
    pub fn optional_slice<T>(&self, name: &str) -> Result<Option<Vec<T>>, CliError>
    where
        T: FromStr,
        T::Err: Display,
    {
        if !self.is_set(name) {
            return Ok(None);
        }
        self.slice(name).map(Some)
    }

    /// `k=v` pairs from every occurrence of the flag. Later keys win.
    pub fn string_map(&self, name: &str) -> Result<Option<BTreeMap<String, String>>, CliError> {
        if !self.is_set(name) {
            return Ok(None);
        }
        let mut map = BTreeMap::new();
        for raw in self.raw_all(name) {
            let (key, value) = raw
                .split_once('=')
                .filter(|(key, _)| !key.trim().is_empty())
                .ok_or_else(|| {
                    CliError::invalid_flag(name, raw, "expected comma-separated key=value pairs")
                })?;
            map.insert(key.trim().to_string(), value.to_string());
        }
        Ok(Some(map))
    }

    /// A UUID if the user set the flag.
    pub fn uuid(&self, name: &str) -> Result<Option<Uuid>, CliError> {
        if !self.is_set(name) {
            return Ok(None);
        }
        self.raw(name)
            .map(|raw| {
                Uuid::parse_str(raw.trim())
                    .map_err(|_| CliError::invalid_flag(name, raw, "must be a valid UUID"))
            })
            .transpose()
    }

    /// CIDR blocks if the user set the flag.
    pub fn cidr_slice(&self, name: &str) -> Result<Option<Vec<Cidr>>, CliError> {
        self.optional_slice::<Cidr>(name)
    }

    /// A value that may reference a file: `@path` is replaced by the content
    /// of `path`.
    pub fn file_string(&self, name: &str) -> Result<Option<String>, CliError> {
        let Some(raw) = self.optional_string(name) else {
            return Ok(None);
        };
        match raw.strip_prefix('@') {
            Some(path) => std::fs::read_to_string(path).map(Some).map_err(|e| {
                CliError::invalid_flag(name, raw.as_str(), format!("could not read file: {e}"))
            }),
            None => Ok(Some(raw)),
        }
    }
}

fn parse<T>(name: &str, raw: &str) -> Result<T, CliError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| CliError::invalid_flag(name, raw, e.to_string()))
}

fn parse_bool(name: &str, raw: &str) -> Result<bool, CliError> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(CliError::invalid_flag(name, raw, "must be true or false")),
    }
}

/// Validator for positional arguments that must be UUIDs.
pub fn uuid_arg(value: &str) -> Result<(), String> {
    Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| "must be a valid UUID".to_string())
}

/// An IP network in CIDR notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cidr {
    pub address: IpAddr,
    pub prefix: u8,
}

impl FromStr for Cidr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("\"{s}\" is not a valid CIDR block, expected e.g. 10.0.0.0/24");
        let (address, prefix) = s.trim().split_once('/').ok_or_else(invalid)?;
        let address: IpAddr = address.parse().map_err(|_| invalid())?;
        let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
        let max = if address.is_ipv4() { 32 } else { 128 };
        if prefix > max {
            return Err(invalid());
        }
        Ok(Cidr { address, prefix })
    }
}

impl Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix)
    }
}

impl Serialize for Cidr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
