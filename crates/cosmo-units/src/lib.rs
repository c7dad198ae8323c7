//! cosmo-units: symbolic units and quantities for cosmology parameters
//!
//! - [`Unit`] - parse/print composite unit expressions (`km / (Mpc s)`)
//! - [`UnitRegistry`] - base unit table, resolves symbols to scale + dimension
//! - [`UnitSet`] / [`UnitScope`] - extra units enabled for a bounded scope
//! - [`Quantity`] - value with unit, conversion, `!units.Quantity` YAML form
//!
//! # Example
//!
//! ```
//! use cosmo_units::{cosmology_units, Quantity, UnitRegistry, UnitResolver};
//!
//! let units = UnitRegistry::standard();
//! let extra = cosmology_units();
//! let scope = units.enable(&extra);
//!
//! let d = Quantity::parse(100.0, "Mpc / littleh").unwrap();
//! assert!(scope.resolve(&d.unit).is_ok());
//! assert!(units.resolve(&d.unit).is_err());
//! ```

mod error;
mod quantity;
mod registry;
mod unit;

pub use error::UnitError;
pub use quantity::{Quantity, QUANTITY_TAG};
pub use registry::{
    cosmology_units, Dimension, Resolved, UnitDef, UnitRegistry, UnitResolver, UnitScope, UnitSet,
};
pub use unit::Unit;
