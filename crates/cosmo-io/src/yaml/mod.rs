//! Cosmology ⇄ YAML
//!
//! Each cosmology class is written as a mapping tagged with
//! `"!" + qualified class name`. The body holds `name`, one entry per
//! parameter (unit-bearing values as `!units.Quantity` nodes) and `meta` as a
//! sequence of `[key, value]` pairs so metadata order survives the text form:
//!
//! ```yaml
//! !cosmology.flrw.FlatLambdaCDM
//! name: test
//! H0: !units.Quantity
//!   value: 70.0
//!   unit: km / (Mpc s)
//! Om0: 0.3
//! Tcmb0: !units.Quantity
//!   value: 0.0
//!   unit: K
//! Neff: 3.04
//! m_nu: !units.Quantity
//!   value: 0.0
//!   unit: eV
//! Ob0: null
//! meta:
//! - - name
//!   - test
//! ```

mod constructor;
mod registry;
mod representer;

pub use constructor::{make_constructor, Construct, ConstructContext, Constructor};
pub use registry::YamlRegistry;
pub use representer::{make_representer, Represent, Representer};

use cosmo_core::{ClassRegistry, Cosmology, CosmologyClass};
use cosmo_units::{cosmology_units, UnitRegistry};
use serde_yaml::Value;

use crate::error::IoError;

/// Bind `class` in `registry` under its tag.
pub fn register_cosmology_yaml(
    registry: &mut YamlRegistry,
    class: &'static CosmologyClass,
) -> Result<(), IoError> {
    registry.register_class(class)
}

/// Emit `cosmology` as YAML text.
///
/// `_args` is accepted for signature compatibility with format writers and
/// is ignored.
pub fn to_yaml(
    registry: &YamlRegistry,
    cosmology: &Cosmology,
    _args: &[Value],
) -> Result<String, IoError> {
    registry.dump(cosmology)
}

/// Parse YAML text into a cosmology.
///
/// Cosmology units (`littleh`, `redshift`) are enabled on top of `units` for
/// this call only; the scope is released on return, including on error.
pub fn from_yaml(
    registry: &YamlRegistry,
    classes: &ClassRegistry,
    units: &UnitRegistry,
    text: &str,
) -> Result<Cosmology, IoError> {
    let extra = cosmology_units();
    let scope = units.enable(&extra);
    let ctx = ConstructContext {
        classes,
        units: &scope,
    };
    registry.load(text, &ctx)
}
