//! cosmo-io: YAML and format conversion for cosmologies
//!
//! - [`yaml`] - representer / constructor per class, dispatch tables,
//!   [`to_yaml`] and [`from_yaml`]
//! - [`convert`] - readers, writers and identifiers keyed by
//!   `(format, family)`, with builtin `mapping` and `yaml` formats
//! - [`CosmologyIo`] - the initialized set of registries
//! - [`IoConfig`] - duplicate-registration policy and mapping options
//!
//! ```
//! use cosmo_core::{Cosmology, FLAT_LAMBDA_CDM};
//! use cosmo_io::{CosmologyIo, FromFormat, Payload, ToFormat};
//!
//! let io = CosmologyIo::standard()?;
//! let c = Cosmology::builder(&FLAT_LAMBDA_CDM)
//!     .name("test")
//!     .param("H0", 70.0)
//!     .param("Om0", 0.3)
//!     .build(io.units())?;
//!
//! let text = c.to_format(&io, "yaml", &[])?;
//! assert!(matches!(&text, Payload::Text(t) if t.starts_with("!cosmology.flrw.FlatLambdaCDM")));
//! assert_eq!(Cosmology::from_format(&io, text, Some("yaml"))?, c);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod convert;
mod error;
mod io;
pub mod yaml;

pub use config::{DuplicatePolicy, IoConfig};
pub use convert::{
    register_builtin_formats, ConvertContext, FormatInfo, FormatRegistry, Payload,
    COSMOLOGY_FAMILY,
};
pub use error::IoError;
pub use io::{CosmologyIo, FromFormat, ToFormat};
pub use yaml::{
    from_yaml, make_constructor, make_representer, register_cosmology_yaml, to_yaml, Construct,
    ConstructContext, Constructor, Represent, Representer, YamlRegistry,
};
