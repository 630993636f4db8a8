//! Options recognized by `define_struct`

use crate::assign::Update;

/// Configuration for declaring a struct type
#[derive(Debug, Clone, Default)]
pub struct StructOptions {
    /// Display name of the type
    pub name: Option<String>,
    /// Whether views may be mapped onto external memory
    pub transparent: bool,
    /// Default field values for self-allocated instances
    pub defaults: Option<Update>,
}

impl StructOptions {
    /// Options for a transparent struct, the only kind that can be declared
    pub fn transparent() -> Self {
        Self {
            transparent: true,
            ..Default::default()
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set transparency
    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    /// Set default field values
    pub fn with_defaults(mut self, defaults: Update) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Validate the options
    pub fn validate(&self) -> crate::Result<()> {
        use crate::error::ViewError;

        if self.defaults.is_some() {
            return Err(ViewError::unsupported("struct defaults"));
        }

        if !self.transparent {
            return Err(ViewError::NotTransparent);
        }

        if matches!(&self.name, Some(name) if name.is_empty()) {
            return Err(ViewError::invalid_parameter(
                "name",
                "Struct name cannot be empty",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViewError;

    #[test]
    fn test_options_builder() {
        let options = StructOptions::transparent().with_name("Point");
        assert!(options.transparent);
        assert_eq!(options.name.as_deref(), Some("Point"));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_options_validation() {
        let err = StructOptions::default().validate().unwrap_err();
        assert!(matches!(err, ViewError::NotTransparent));

        let err = StructOptions::transparent()
            .with_defaults(Update::new().set("x", 1))
            .validate()
            .unwrap_err();
        assert!(matches!(err, ViewError::Unsupported { .. }));

        assert!(StructOptions::transparent().with_name("").validate().is_err());
    }
}
