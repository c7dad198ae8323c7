//! cosmo-core: cosmology classes, instances and the mapping transform
//!
//! - [`CosmologyClass`] - static subtype descriptor (name, module, parameters)
//! - [`ClassRegistry`] - the set of known classes
//! - [`Cosmology`] / [`CosmologyBuilder`] - immutable instances and how to make them
//! - [`Meta`] - ordered free-form metadata
//! - [`mapping`] - `Cosmology` ⇄ ordered `serde_yaml::Mapping`
//!
//! Parameter values carry units from `cosmo-units`; a builder needs a
//! [`UnitResolver`](cosmo_units::UnitResolver) to convert supplied quantities
//! into each parameter's declared unit.

pub mod class;
mod cosmology;
mod error;
pub mod mapping;
mod meta;
mod parameter;
mod registry;

pub use class::{
    builtin_classes, CosmologyClass, Flatness, FLAT_LAMBDA_CDM, FLAT_W_CDM, LAMBDA_CDM, W_CDM,
};
pub use cosmology::{Cosmology, CosmologyBuilder};
pub use error::CoreError;
pub use mapping::{from_mapping, from_mapping_for_class, to_mapping, CLASS_KEY, META_KEY, NAME_KEY};
pub use meta::Meta;
pub use parameter::{ParamDefault, ParamValue, ParameterDef};
pub use registry::ClassRegistry;
