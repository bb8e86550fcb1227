//! Framework version detection

use super::version::ApiVersion;
use crate::decl::MetaValue;
use crate::model::Environment;

/// One link of the version detection chain. The first provider that
/// returns a version wins.
pub trait ApiVersionProvider: Send + Sync {
    fn name(&self) -> &str;

    fn detect(&self, env: &Environment) -> Option<ApiVersion>;
}

/// Always reports the same version
#[derive(Debug, Clone)]
pub struct FixedVersionProvider {
    version: ApiVersion,
}

impl FixedVersionProvider {
    pub fn new(version: ApiVersion) -> Self {
        Self { version }
    }
}

impl ApiVersionProvider for FixedVersionProvider {
    fn name(&self) -> &str {
        "fixed"
    }

    fn detect(&self, _env: &Environment) -> Option<ApiVersion> {
        Some(self.version.clone())
    }
}

/// Reads the constant initializer of a field declared by the framework,
/// e.g. `public static final String VERSION = "22.0.3";`
#[derive(Debug, Clone)]
pub struct ConstantFieldVersionProvider {
    type_name: String,
    field_name: String,
}

impl ConstantFieldVersionProvider {
    pub fn new(type_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            field_name: field_name.into(),
        }
    }
}

impl ApiVersionProvider for ConstantFieldVersionProvider {
    fn name(&self) -> &str {
        &self.type_name
    }

    fn detect(&self, env: &Environment) -> Option<ApiVersion> {
        let ty = env.resolve(&self.type_name)?;
        let field = ty.field(&self.field_name)?;
        match field.constant.as_ref()? {
            MetaValue::String(text) => ApiVersion::extract(text),
            MetaValue::Int(major) => u32::try_from(*major).ok().map(ApiVersion::from),
            other => {
                tracing::warn!(
                    r#type = %self.type_name,
                    field = %self.field_name,
                    kind = other.kind_name(),
                    "version constant is neither a string nor an int"
                );
                None
            }
        }
    }
}

type DetectFn = dyn Fn(&Environment) -> Option<ApiVersion> + Send + Sync;

/// Detection by closure
pub struct FnVersionProvider {
    name: String,
    detect: Box<DetectFn>,
}

impl FnVersionProvider {
    pub fn new<F>(name: impl Into<String>, detect: F) -> Self
    where
        F: Fn(&Environment) -> Option<ApiVersion> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            detect: Box::new(detect),
        }
    }
}

impl ApiVersionProvider for FnVersionProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, env: &Environment) -> Option<ApiVersion> {
        (self.detect)(env)
    }
}
