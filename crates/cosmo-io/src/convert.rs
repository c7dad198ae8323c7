//! Format registry
//!
//! Readers, writers and identifiers keyed by `(format, family)`. A reader
//! turns a [`Payload`] into a cosmology, a writer does the reverse, and an
//! identifier says whether a payload looks like its format so
//! [`FormatRegistry::read`] can pick one when the caller does not.
//!
//! Builtin formats for the `Cosmology` family:
//!
//! | format    | payload                  | identified by            |
//! |-----------|--------------------------|--------------------------|
//! | `mapping` | [`Payload::Mapping`]     | any mapping payload      |
//! | `yaml`    | [`Payload::Text`]        | text starting with `!`   |

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use cosmo_core::{from_mapping, to_mapping, ClassRegistry, Cosmology};
use cosmo_units::UnitRegistry;
use serde_yaml::{Mapping, Value};
use tracing::{debug, trace, warn};

use crate::config::{DuplicatePolicy, IoConfig};
use crate::error::IoError;
use crate::yaml::{from_yaml, to_yaml, YamlRegistry};

/// Family name of cosmology converters.
pub const COSMOLOGY_FAMILY: &str = "Cosmology";

pub const MAPPING_FORMAT: &str = "mapping";
pub const YAML_FORMAT: &str = "yaml";

/// Data handed to a reader or returned by a writer.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Mapping(Mapping),
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Mapping(_) => "mapping",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            Self::Mapping(_) => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(t) => Some(t),
            Self::Mapping(_) => None,
        }
    }

    pub fn into_mapping(self) -> Option<Mapping> {
        match self {
            Self::Mapping(m) => Some(m),
            Self::Text(_) => None,
        }
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Mapping> for Payload {
    fn from(map: Mapping) -> Self {
        Self::Mapping(map)
    }
}

/// Everything a reader or writer may consult.
#[derive(Clone, Copy)]
pub struct ConvertContext<'a> {
    pub classes: &'a ClassRegistry,
    pub units: &'a UnitRegistry,
    pub yaml: &'a YamlRegistry,
    pub config: &'a IoConfig,
}

pub type ReaderFn = fn(Payload, &ConvertContext<'_>) -> Result<Cosmology, IoError>;
/// Trailing `&[Value]` carries format-specific writer arguments.
pub type WriterFn = fn(&Cosmology, &ConvertContext<'_>, &[Value]) -> Result<Payload, IoError>;
pub type IdentifierFn = fn(&Payload) -> bool;

type FormatKey = (String, String);

fn key(format: &str, family: &str) -> FormatKey {
    (format.to_string(), family.to_string())
}

/// One row of [`FormatRegistry::formats`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FormatInfo {
    pub format: String,
    pub family: String,
    pub read: bool,
    pub write: bool,
    pub identify: bool,
}

pub struct FormatRegistry {
    policy: DuplicatePolicy,
    readers: HashMap<FormatKey, ReaderFn>,
    writers: HashMap<FormatKey, WriterFn>,
    identifiers: HashMap<FormatKey, IdentifierFn>,
}

impl FormatRegistry {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            readers: HashMap::new(),
            writers: HashMap::new(),
            identifiers: HashMap::new(),
        }
    }

    pub fn register_reader(
        &mut self,
        format: &str,
        family: &str,
        reader: ReaderFn,
    ) -> Result<(), IoError> {
        let policy = self.policy;
        insert(&mut self.readers, policy, "reader", format, family, reader)
    }

    pub fn register_writer(
        &mut self,
        format: &str,
        family: &str,
        writer: WriterFn,
    ) -> Result<(), IoError> {
        let policy = self.policy;
        insert(&mut self.writers, policy, "writer", format, family, writer)
    }

    pub fn register_identifier(
        &mut self,
        format: &str,
        family: &str,
        identifier: IdentifierFn,
    ) -> Result<(), IoError> {
        let policy = self.policy;
        insert(&mut self.identifiers, policy, "identifier", format, family, identifier)
    }

    /// Read `payload` with the reader for `format`, or with the one format
    /// whose identifier accepts the payload when `format` is `None`.
    pub fn read(
        &self,
        format: Option<&str>,
        family: &str,
        payload: Payload,
        ctx: &ConvertContext<'_>,
    ) -> Result<Cosmology, IoError> {
        let format = match format {
            Some(f) => f.to_string(),
            None => self.identify(family, &payload)?,
        };
        let reader = self
            .readers
            .get(&key(&format, family))
            .ok_or_else(|| IoError::UnknownFormat {
                direction: "reader",
                format: format.clone(),
                family: family.to_string(),
            })?;
        trace!(format = %format, family, payload = payload.kind(), "reading");
        reader(payload, ctx)
    }

    pub fn write(
        &self,
        format: &str,
        family: &str,
        cosmology: &Cosmology,
        ctx: &ConvertContext<'_>,
        args: &[Value],
    ) -> Result<Payload, IoError> {
        let writer = self
            .writers
            .get(&key(format, family))
            .ok_or_else(|| IoError::UnknownFormat {
                direction: "writer",
                format: format.to_string(),
                family: family.to_string(),
            })?;
        trace!(format, family, "writing");
        writer(cosmology, ctx, args)
    }

    /// The single format whose identifier accepts `payload`.
    pub fn identify(&self, family: &str, payload: &Payload) -> Result<String, IoError> {
        let mut matches: Vec<String> = self
            .identifiers
            .iter()
            .filter(|((_, fam), identify)| fam == family && identify(payload))
            .map(|((format, _), _)| format.clone())
            .collect();
        matches.sort();
        match matches.len() {
            0 => Err(IoError::NoFormatIdentified),
            1 => Ok(matches.remove(0)),
            _ => Err(IoError::AmbiguousFormat(matches)),
        }
    }

    /// Registered formats, sorted by format then family.
    pub fn formats(&self) -> Vec<FormatInfo> {
        let keys: BTreeSet<&FormatKey> = self
            .readers
            .keys()
            .chain(self.writers.keys())
            .chain(self.identifiers.keys())
            .collect();
        keys.into_iter()
            .map(|k| FormatInfo {
                format: k.0.clone(),
                family: k.1.clone(),
                read: self.readers.contains_key(k),
                write: self.writers.contains_key(k),
                identify: self.identifiers.contains_key(k),
            })
            .collect()
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new(DuplicatePolicy::default())
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("policy", &self.policy)
            .field("formats", &self.formats())
            .finish()
    }
}

fn insert<F>(
    table: &mut HashMap<FormatKey, F>,
    policy: DuplicatePolicy,
    direction: &'static str,
    format: &str,
    family: &str,
    f: F,
) -> Result<(), IoError> {
    let k = key(format, family);
    if table.contains_key(&k) {
        match policy {
            DuplicatePolicy::Reject => {
                return Err(IoError::DuplicateFormat {
                    direction,
                    format: format.to_string(),
                    family: family.to_string(),
                })
            }
            DuplicatePolicy::Overwrite => {
                warn!(format, family, direction, "overwriting existing format binding")
            }
        }
    }
    debug!(format, family, direction, "registered format");
    table.insert(k, f);
    Ok(())
}

// =============================================================================
// BUILTIN FORMATS
// =============================================================================

/// Register the `mapping` and `yaml` formats for the `Cosmology` family.
pub fn register_builtin_formats(registry: &mut FormatRegistry) -> Result<(), IoError> {
    registry.register_reader(MAPPING_FORMAT, COSMOLOGY_FAMILY, read_mapping)?;
    registry.register_writer(MAPPING_FORMAT, COSMOLOGY_FAMILY, write_mapping)?;
    registry.register_identifier(MAPPING_FORMAT, COSMOLOGY_FAMILY, identify_mapping)?;

    registry.register_reader(YAML_FORMAT, COSMOLOGY_FAMILY, read_yaml)?;
    registry.register_writer(YAML_FORMAT, COSMOLOGY_FAMILY, write_yaml)?;
    registry.register_identifier(YAML_FORMAT, COSMOLOGY_FAMILY, identify_yaml)?;
    Ok(())
}

fn read_mapping(payload: Payload, ctx: &ConvertContext<'_>) -> Result<Cosmology, IoError> {
    let map = payload.into_mapping().ok_or(IoError::PayloadMismatch {
        format: MAPPING_FORMAT.to_string(),
        expected: "mapping",
    })?;
    Ok(from_mapping(
        map,
        ctx.config.mapping_move_to_meta,
        None,
        ctx.classes,
        ctx.units,
    )?)
}

fn write_mapping(
    cosmology: &Cosmology,
    _ctx: &ConvertContext<'_>,
    _args: &[Value],
) -> Result<Payload, IoError> {
    Ok(Payload::Mapping(to_mapping(cosmology)))
}

fn identify_mapping(payload: &Payload) -> bool {
    matches!(payload, Payload::Mapping(_))
}

fn read_yaml(payload: Payload, ctx: &ConvertContext<'_>) -> Result<Cosmology, IoError> {
    let text = payload.into_text().ok_or(IoError::PayloadMismatch {
        format: YAML_FORMAT.to_string(),
        expected: "text",
    })?;
    from_yaml(ctx.yaml, ctx.classes, ctx.units, &text)
}

fn write_yaml(
    cosmology: &Cosmology,
    ctx: &ConvertContext<'_>,
    args: &[Value],
) -> Result<Payload, IoError> {
    Ok(Payload::Text(to_yaml(ctx.yaml, cosmology, args)?))
}

fn identify_yaml(payload: &Payload) -> bool {
    payload
        .as_text()
        .map(|t| t.trim_start().starts_with('!'))
        .unwrap_or(false)
}
