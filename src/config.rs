/// Provider options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Name reported through the provider metadata.
    pub name: String,
}

impl ProviderConfig {
    pub const DEFAULT_NAME: &'static str = "flag-provider-bridge";

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_string(),
        }
    }
}
