//! Initialized I/O facade
//!
//! [`CosmologyIo::init`] builds every registry once: builtin classes, base
//! units, one YAML tag per class and the builtin formats. The result is a
//! plain value; share it by reference.

use cosmo_core::{ClassRegistry, CoreError, Cosmology, CosmologyClass};
use cosmo_units::UnitRegistry;
use serde_yaml::Value;
use tracing::info;

use crate::config::{DuplicatePolicy, IoConfig};
use crate::convert::{
    register_builtin_formats, ConvertContext, FormatRegistry, Payload, COSMOLOGY_FAMILY,
};
use crate::error::IoError;
use crate::yaml::{register_cosmology_yaml, YamlRegistry};

#[derive(Debug)]
pub struct CosmologyIo {
    config: IoConfig,
    classes: ClassRegistry,
    units: UnitRegistry,
    yaml: YamlRegistry,
    formats: FormatRegistry,
}

impl CosmologyIo {
    pub fn init(config: IoConfig) -> Result<Self, IoError> {
        let mut io = Self {
            classes: ClassRegistry::new(),
            units: UnitRegistry::standard(),
            yaml: YamlRegistry::new(config.duplicate_policy),
            formats: FormatRegistry::new(config.duplicate_policy),
            config,
        };
        for class in ClassRegistry::builtin().iter() {
            io.register_class(class)?;
        }
        register_builtin_formats(&mut io.formats)?;

        info!(
            classes = io.classes.len(),
            tags = io.yaml.tags().len(),
            formats = io.formats.formats().len(),
            policy = ?io.config.duplicate_policy,
            "cosmology I/O initialized"
        );
        Ok(io)
    }

    /// Default configuration.
    pub fn standard() -> Result<Self, IoError> {
        Self::init(IoConfig::default())
    }

    /// Add a class and bind its YAML tag.
    ///
    /// Fails without touching either registry when the tag is already taken
    /// under the `reject` policy, or when a different class already holds
    /// the short name under any policy.
    pub fn register_class(&mut self, class: &'static CosmologyClass) -> Result<(), IoError> {
        if self.config.duplicate_policy == DuplicatePolicy::Reject
            && self.yaml.contains_tag(&class.tag())
        {
            return Err(IoError::DuplicateTag(class.tag()));
        }
        match self.classes.get(class.name) {
            None => self.classes.register(class)?,
            Some(existing) if existing == class => {}
            Some(_) => return Err(CoreError::DuplicateClass(class.name.to_string()).into()),
        }
        register_cosmology_yaml(&mut self.yaml, class)
    }

    pub fn config(&self) -> &IoConfig {
        &self.config
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    pub fn units(&self) -> &UnitRegistry {
        &self.units
    }

    pub fn yaml(&self) -> &YamlRegistry {
        &self.yaml
    }

    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    /// Mutable access for registering further readers, writers or identifiers.
    pub fn formats_mut(&mut self) -> &mut FormatRegistry {
        &mut self.formats
    }

    pub fn context(&self) -> ConvertContext<'_> {
        ConvertContext {
            classes: &self.classes,
            units: &self.units,
            yaml: &self.yaml,
            config: &self.config,
        }
    }

    pub fn to_format(
        &self,
        cosmology: &Cosmology,
        format: &str,
        args: &[Value],
    ) -> Result<Payload, IoError> {
        self.formats
            .write(format, COSMOLOGY_FAMILY, cosmology, &self.context(), args)
    }

    /// Read `payload`; `format = None` picks it by identification.
    pub fn from_format(
        &self,
        payload: impl Into<Payload>,
        format: Option<&str>,
    ) -> Result<Cosmology, IoError> {
        self.formats
            .read(format, COSMOLOGY_FAMILY, payload.into(), &self.context())
    }
}

/// `cosmology.to_format(&io, "yaml", &[])`
pub trait ToFormat {
    fn to_format(&self, io: &CosmologyIo, format: &str, args: &[Value]) -> Result<Payload, IoError>;
}

/// `Cosmology::from_format(&io, text, Some("yaml"))`
pub trait FromFormat: Sized {
    fn from_format(
        io: &CosmologyIo,
        payload: impl Into<Payload>,
        format: Option<&str>,
    ) -> Result<Self, IoError>;
}

impl ToFormat for Cosmology {
    fn to_format(&self, io: &CosmologyIo, format: &str, args: &[Value]) -> Result<Payload, IoError> {
        io.to_format(self, format, args)
    }
}

impl FromFormat for Cosmology {
    fn from_format(
        io: &CosmologyIo,
        payload: impl Into<Payload>,
        format: Option<&str>,
    ) -> Result<Self, IoError> {
        io.from_format(payload, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmo_core::{Flatness, ParamDefault, ParameterDef, FLAT_LAMBDA_CDM, LAMBDA_CDM};

    static TOY_PARAMS: [ParameterDef; 1] = [ParameterDef {
        name: "H0",
        unit: Some("km / (Mpc s)"),
        default: ParamDefault::Required,
        doc: "Hubble constant",
    }];

    static TOY: CosmologyClass = CosmologyClass {
        name: "Toy",
        module: "cosmology.toy",
        params: &TOY_PARAMS,
        flatness: Flatness::Always,
        doc: "Test-only class with a single parameter.",
    };

    static OTHER_LAMBDA_CDM: CosmologyClass = CosmologyClass {
        name: "LambdaCDM",
        module: "cosmology.other",
        params: &TOY_PARAMS,
        flatness: Flatness::Always,
        doc: "Shares its short name with the builtin.",
    };

    #[test]
    fn test_init_registers_builtins() {
        let io = CosmologyIo::standard().unwrap();
        assert_eq!(io.classes().len(), 4);
        assert_eq!(
            io.yaml().tags(),
            [
                "!cosmology.flrw.FlatLambdaCDM",
                "!cosmology.flrw.FlatwCDM",
                "!cosmology.flrw.LambdaCDM",
                "!cosmology.flrw.wCDM",
            ]
        );
        assert_eq!(io.formats().formats().len(), 2);
    }

    #[test]
    fn test_register_custom_class() {
        let mut io = CosmologyIo::standard().unwrap();
        io.register_class(&TOY).unwrap();
        assert!(io.yaml().contains_tag("!cosmology.toy.Toy"));

        let c = Cosmology::builder(&TOY)
            .param("H0", 70.0)
            .build(io.units())
            .unwrap();
        let text = c.to_format(&io, "yaml", &[]).unwrap();
        assert_eq!(Cosmology::from_format(&io, text, None).unwrap(), c);
    }

    #[test]
    fn test_register_builtin_twice_rejected() {
        let mut io = CosmologyIo::standard().unwrap();
        let err = io.register_class(&LAMBDA_CDM).unwrap_err();
        assert!(matches!(err, IoError::DuplicateTag(ref t) if t == "!cosmology.flrw.LambdaCDM"));
    }

    #[test]
    fn test_short_name_clash_rejected_under_both_policies() {
        for policy in [DuplicatePolicy::Reject, DuplicatePolicy::Overwrite] {
            let mut io = CosmologyIo::init(IoConfig {
                duplicate_policy: policy,
                ..IoConfig::default()
            })
            .unwrap();
            let err = io.register_class(&OTHER_LAMBDA_CDM).unwrap_err();
            assert!(
                matches!(err, IoError::Core(CoreError::DuplicateClass(ref n)) if n == "LambdaCDM"),
                "{:?}",
                policy
            );
            assert!(!io.yaml().contains_tag("!cosmology.other.LambdaCDM"));

            // builtin YAML still decodes to the builtin class
            let c = Cosmology::builder(&LAMBDA_CDM)
                .param("H0", 70.0)
                .param("Om0", 0.3)
                .param("Ode0", 0.7)
                .build(io.units())
                .unwrap();
            let text = c.to_format(&io, "yaml", &[]).unwrap();
            assert_eq!(Cosmology::from_format(&io, text, None).unwrap().class(), &LAMBDA_CDM);
        }
    }

    #[test]
    fn test_register_builtin_twice_overwrites() {
        let mut io = CosmologyIo::init(IoConfig {
            duplicate_policy: DuplicatePolicy::Overwrite,
            ..IoConfig::default()
        })
        .unwrap();
        io.register_class(&LAMBDA_CDM).unwrap();
        assert_eq!(io.yaml().tags().len(), 4);
        assert_eq!(io.classes().len(), 4);
    }

    #[test]
    fn test_unknown_format() {
        let io = CosmologyIo::standard().unwrap();
        let c = Cosmology::builder(&FLAT_LAMBDA_CDM)
            .param("H0", 70.0)
            .param("Om0", 0.3)
            .build(io.units())
            .unwrap();
        assert!(matches!(
            io.to_format(&c, "latex", &[]),
            Err(IoError::UnknownFormat { direction: "writer", .. })
        ));
        assert!(matches!(
            io.from_format("anything", Some("latex")),
            Err(IoError::UnknownFormat { direction: "reader", .. })
        ));
    }

    #[test]
    fn test_mapping_without_class_key() {
        let io = CosmologyIo::standard().unwrap();
        let mut map = serde_yaml::Mapping::new();
        map.insert("H0".into(), 70.0.into());
        let err = io.from_format(map, Some("mapping")).unwrap_err();
        assert!(matches!(err, IoError::Core(CoreError::MissingClass)));
    }
}
