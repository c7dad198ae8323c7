//! Unit definitions, registries and scoped enablement
//!
//! A [`UnitRegistry`] knows the base units every decode may use. Domain units
//! such as `littleh` live in separate [`UnitSet`]s and only resolve inside a
//! [`UnitScope`] obtained from [`UnitRegistry::enable`]. The scope borrows the
//! registry, so the extra units disappear when the scope is dropped, on every
//! exit path, and nothing global is touched.

use std::collections::HashMap;

use tracing::trace;

use crate::error::UnitError;
use crate::unit::Unit;

// =============================================================================
// DIMENSIONS
// =============================================================================

/// Exponents over the base dimensions.
///
/// Index order: length, time, mass, temperature, littleh, redshift. The last
/// two are pseudo-dimensions so that `Mpc / littleh` never silently converts
/// to `Mpc`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Dimension([i8; 6]);

impl Dimension {
    pub const NONE: Dimension = Dimension([0, 0, 0, 0, 0, 0]);
    pub const LENGTH: Dimension = Dimension([1, 0, 0, 0, 0, 0]);
    pub const TIME: Dimension = Dimension([0, 1, 0, 0, 0, 0]);
    pub const MASS: Dimension = Dimension([0, 0, 1, 0, 0, 0]);
    pub const TEMPERATURE: Dimension = Dimension([0, 0, 0, 1, 0, 0]);
    pub const LITTLEH: Dimension = Dimension([0, 0, 0, 0, 1, 0]);
    pub const REDSHIFT: Dimension = Dimension([0, 0, 0, 0, 0, 1]);
    pub const ENERGY: Dimension = Dimension([2, -2, 1, 0, 0, 0]);

    /// `None` when an exponent leaves the `i8` range.
    pub fn checked_powi(self, n: i32) -> Option<Dimension> {
        let mut out = self.0;
        for e in out.iter_mut() {
            *e = i8::try_from(i32::from(*e).checked_mul(n)?).ok()?;
        }
        Some(Dimension(out))
    }

    /// `None` when an exponent leaves the `i8` range.
    pub fn checked_add(self, rhs: Dimension) -> Option<Dimension> {
        let mut out = self.0;
        for (e, r) in out.iter_mut().zip(rhs.0) {
            *e = e.checked_add(r)?;
        }
        Some(Dimension(out))
    }

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

// =============================================================================
// DEFINITIONS
// =============================================================================

/// A named unit: `scale` SI base units of `dimension`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDef {
    pub symbol: String,
    pub scale: f64,
    pub dimension: Dimension,
}

impl UnitDef {
    pub fn new(symbol: impl Into<String>, scale: f64, dimension: Dimension) -> Self {
        Self {
            symbol: symbol.into(),
            scale,
            dimension,
        }
    }
}

/// Scale and dimension of a composite unit after resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    pub scale: f64,
    pub dimension: Dimension,
}

impl Resolved {
    /// `None` when the combined dimension overflows.
    pub fn checked_mul(self, rhs: Resolved) -> Option<Resolved> {
        Some(Resolved {
            scale: self.scale * rhs.scale,
            dimension: self.dimension.checked_add(rhs.dimension)?,
        })
    }
}

/// A named group of unit definitions, enabled together.
#[derive(Debug, Clone, Default)]
pub struct UnitSet {
    name: String,
    defs: Vec<UnitDef>,
}

impl UnitSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            defs: Vec::new(),
        }
    }

    pub fn with(mut self, def: UnitDef) -> Self {
        self.defs.push(def);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, symbol: &str) -> Option<&UnitDef> {
        self.defs.iter().find(|d| d.symbol == symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitDef> {
        self.defs.iter()
    }
}

/// Units specific to cosmology: the reduced Hubble constant and redshift.
pub fn cosmology_units() -> UnitSet {
    UnitSet::new("cosmology")
        .with(UnitDef::new("littleh", 1.0, Dimension::LITTLEH))
        .with(UnitDef::new("redshift", 1.0, Dimension::REDSHIFT))
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Anything that can map unit symbols to definitions.
pub trait UnitResolver {
    fn lookup(&self, symbol: &str) -> Option<&UnitDef>;

    /// Resolve every term of `unit`; fails on the first unknown symbol or
    /// when a dimension exponent overflows.
    fn resolve(&self, unit: &Unit) -> Result<Resolved, UnitError> {
        unit.terms().iter().try_fold(
            Resolved {
                scale: 1.0,
                dimension: Dimension::NONE,
            },
            |acc, (symbol, power)| {
                let def = self
                    .lookup(symbol)
                    .ok_or_else(|| UnitError::UnknownUnit(symbol.clone()))?;
                def.dimension
                    .checked_powi(*power)
                    .and_then(|dimension| {
                        acc.checked_mul(Resolved {
                            scale: def.scale.powi(*power),
                            dimension,
                        })
                    })
                    .ok_or_else(|| UnitError::ExponentOverflow(unit.to_string()))
            },
        )
    }
}

/// Base unit table.
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    defs: HashMap<String, UnitDef>,
}

impl UnitRegistry {
    /// Empty registry. See [`UnitRegistry::standard`] for the usual one.
    pub fn new() -> Self {
        Self::default()
    }

    /// SI and astronomical units used by cosmology parameters.
    pub fn standard() -> Self {
        const PARSEC: f64 = 3.085_677_581_491_367_3e16;
        const JULIAN_YEAR: f64 = 3.155_76e7;
        const ELECTRON_VOLT: f64 = 1.602_176_634e-19;

        let mut registry = Self::new();
        for def in [
            UnitDef::new("m", 1.0, Dimension::LENGTH),
            UnitDef::new("cm", 1e-2, Dimension::LENGTH),
            UnitDef::new("km", 1e3, Dimension::LENGTH),
            UnitDef::new("pc", PARSEC, Dimension::LENGTH),
            UnitDef::new("kpc", PARSEC * 1e3, Dimension::LENGTH),
            UnitDef::new("Mpc", PARSEC * 1e6, Dimension::LENGTH),
            UnitDef::new("Gpc", PARSEC * 1e9, Dimension::LENGTH),
            UnitDef::new("s", 1.0, Dimension::TIME),
            UnitDef::new("yr", JULIAN_YEAR, Dimension::TIME),
            UnitDef::new("Myr", JULIAN_YEAR * 1e6, Dimension::TIME),
            UnitDef::new("Gyr", JULIAN_YEAR * 1e9, Dimension::TIME),
            UnitDef::new("g", 1e-3, Dimension::MASS),
            UnitDef::new("kg", 1.0, Dimension::MASS),
            UnitDef::new("solMass", 1.988_409_870_698_051e30, Dimension::MASS),
            UnitDef::new("K", 1.0, Dimension::TEMPERATURE),
            UnitDef::new("J", 1.0, Dimension::ENERGY),
            UnitDef::new("eV", ELECTRON_VOLT, Dimension::ENERGY),
            UnitDef::new("meV", ELECTRON_VOLT * 1e-3, Dimension::ENERGY),
            UnitDef::new("keV", ELECTRON_VOLT * 1e3, Dimension::ENERGY),
        ] {
            registry.add(def);
        }
        registry
    }

    /// Add or replace a definition.
    pub fn add(&mut self, def: UnitDef) {
        self.defs.insert(def.symbol.clone(), def);
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Enable `extra` on top of this registry until the returned scope drops.
    pub fn enable<'a>(&'a self, extra: &'a UnitSet) -> UnitScope<'a> {
        trace!(set = extra.name(), "unit scope enabled");
        UnitScope { base: self, extra }
    }
}

impl UnitResolver for UnitRegistry {
    fn lookup(&self, symbol: &str) -> Option<&UnitDef> {
        self.defs.get(symbol)
    }
}

/// A registry with an extra unit set layered on top. Base definitions win.
#[derive(Debug)]
pub struct UnitScope<'a> {
    base: &'a UnitRegistry,
    extra: &'a UnitSet,
}

impl UnitResolver for UnitScope<'_> {
    fn lookup(&self, symbol: &str) -> Option<&UnitDef> {
        self.base.lookup(symbol).or_else(|| self.extra.get(symbol))
    }
}

impl Drop for UnitScope<'_> {
    fn drop(&mut self) {
        trace!(set = self.extra.name(), "unit scope released");
    }
}
