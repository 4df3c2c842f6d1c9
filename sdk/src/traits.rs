use crate::error::LoadError;

/// Implemented by generated code for every configuration message.
///
/// `prefix` is the accumulated environment-variable namespace (for example
/// `"APP_SERVER_"`). `defaults` is a fallback source and is never mutated.
pub trait LoadFromEnv: Sized {
    fn load_from_env(&mut self, prefix: &str, defaults: Option<&Self>) -> Result<(), LoadError>;

    /// Builds a fresh value and populates it.
    fn from_env(prefix: &str, defaults: Option<&Self>) -> Result<Self, LoadError>
    where
        Self: Default,
    {
        let mut value = Self::default();
        value.load_from_env(prefix, defaults)?;
        Ok(value)
    }
}
