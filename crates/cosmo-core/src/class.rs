//! Cosmology class descriptors
//!
//! A class is plain data: a name, the module it lives in, its parameters in
//! constructor order, and whether it is flat by construction. The builtin
//! classes cover the FLRW family with a cosmological constant or constant
//! dark-energy equation of state.

use std::fmt;

use crate::parameter::{ParamDefault, ParameterDef};

/// How flatness is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flatness {
    /// Flat for every parameter set.
    Always,
    /// Flat when `1 - Om0 - Ode0` vanishes.
    FromCurvature,
}

/// Static description of a cosmology subtype.
#[derive(Debug)]
pub struct CosmologyClass {
    pub name: &'static str,
    pub module: &'static str,
    /// Parameters in constructor order.
    pub params: &'static [ParameterDef],
    pub flatness: Flatness,
    pub doc: &'static str,
}

impl CosmologyClass {
    /// `module.Name`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.module, self.name)
    }

    /// `!module.Name`
    pub fn tag(&self) -> String {
        format!("!{}", self.qualified_name())
    }

    pub fn param(&self, name: &str) -> Option<&'static ParameterDef> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }
}

impl PartialEq for CosmologyClass {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.module == other.module
    }
}

impl Eq for CosmologyClass {}

impl fmt::Display for CosmologyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.name)
    }
}

// =============================================================================
// BUILTIN CLASSES
// =============================================================================

pub const FLRW_MODULE: &str = "cosmology.flrw";

const H0: ParameterDef = ParameterDef {
    name: "H0",
    unit: Some("km / (Mpc s)"),
    default: ParamDefault::Required,
    doc: "Hubble constant at z=0.",
};

const OM0: ParameterDef = ParameterDef {
    name: "Om0",
    unit: None,
    default: ParamDefault::Required,
    doc: "Omega matter: density of non-relativistic matter in units of the critical density at z=0.",
};

const ODE0: ParameterDef = ParameterDef {
    name: "Ode0",
    unit: None,
    default: ParamDefault::Required,
    doc: "Omega dark energy: density of dark energy in units of the critical density at z=0.",
};

const W0: ParameterDef = ParameterDef {
    name: "w0",
    unit: None,
    default: ParamDefault::Float(-1.0),
    doc: "Dark energy equation of state.",
};

const TCMB0: ParameterDef = ParameterDef {
    name: "Tcmb0",
    unit: Some("K"),
    default: ParamDefault::Quantity(0.0, "K"),
    doc: "Temperature of the CMB at z=0.",
};

const NEFF: ParameterDef = ParameterDef {
    name: "Neff",
    unit: None,
    default: ParamDefault::Float(3.04),
    doc: "Number of effective neutrino species.",
};

const M_NU: ParameterDef = ParameterDef {
    name: "m_nu",
    unit: Some("eV"),
    default: ParamDefault::Quantity(0.0, "eV"),
    doc: "Mass of each neutrino species.",
};

const OB0: ParameterDef = ParameterDef {
    name: "Ob0",
    unit: None,
    default: ParamDefault::Null,
    doc: "Omega baryon: density of baryonic matter in units of the critical density at z=0.",
};

static LAMBDA_CDM_PARAMS: [ParameterDef; 7] = [H0, OM0, ODE0, TCMB0, NEFF, M_NU, OB0];
static FLAT_LAMBDA_CDM_PARAMS: [ParameterDef; 6] = [H0, OM0, TCMB0, NEFF, M_NU, OB0];
static W_CDM_PARAMS: [ParameterDef; 8] = [H0, OM0, ODE0, W0, TCMB0, NEFF, M_NU, OB0];
static FLAT_W_CDM_PARAMS: [ParameterDef; 7] = [H0, OM0, W0, TCMB0, NEFF, M_NU, OB0];

pub static LAMBDA_CDM: CosmologyClass = CosmologyClass {
    name: "LambdaCDM",
    module: FLRW_MODULE,
    params: &LAMBDA_CDM_PARAMS,
    flatness: Flatness::FromCurvature,
    doc: "FLRW cosmology with a cosmological constant and curvature.",
};

pub static FLAT_LAMBDA_CDM: CosmologyClass = CosmologyClass {
    name: "FlatLambdaCDM",
    module: FLRW_MODULE,
    params: &FLAT_LAMBDA_CDM_PARAMS,
    flatness: Flatness::Always,
    doc: "FLRW cosmology with a cosmological constant and no curvature.",
};

pub static W_CDM: CosmologyClass = CosmologyClass {
    name: "wCDM",
    module: FLRW_MODULE,
    params: &W_CDM_PARAMS,
    flatness: Flatness::FromCurvature,
    doc: "FLRW cosmology with a constant dark energy equation of state and curvature.",
};

pub static FLAT_W_CDM: CosmologyClass = CosmologyClass {
    name: "FlatwCDM",
    module: FLRW_MODULE,
    params: &FLAT_W_CDM_PARAMS,
    flatness: Flatness::Always,
    doc: "FLRW cosmology with a constant dark energy equation of state and no curvature.",
};

/// Every builtin class, in registration order.
pub fn builtin_classes() -> [&'static CosmologyClass; 4] {
    [&LAMBDA_CDM, &FLAT_LAMBDA_CDM, &W_CDM, &FLAT_W_CDM]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_is_bang_qualified_name() {
        assert_eq!(FLAT_LAMBDA_CDM.qualified_name(), "cosmology.flrw.FlatLambdaCDM");
        assert_eq!(FLAT_LAMBDA_CDM.tag(), "!cosmology.flrw.FlatLambdaCDM");
    }

    #[test]
    fn test_parameter_order_follows_constructor() {
        let names: Vec<_> = W_CDM.params.iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            ["H0", "Om0", "Ode0", "w0", "Tcmb0", "Neff", "m_nu", "Ob0"]
        );
        assert!(FLAT_W_CDM.param("Ode0").is_none());
    }

    #[test]
    fn test_builtin_names_are_unique() {
        let classes = builtin_classes();
        for (i, a) in classes.iter().enumerate() {
            for b in &classes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
