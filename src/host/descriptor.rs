/// Identity of the running build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDescriptor {
    pub name: String,
    /// Version without a `v` prefix, e.g. `1.3.0` or `1.3.0-SNAPSHOT+1a2b3c4`
    pub version: String,
}

impl PluginDescriptor {
    pub const DISPLAY_NAME: &'static str = "Announcer";

    /// Descriptor baked in at build time.
    pub fn current() -> Self {
        Self {
            name: Self::DISPLAY_NAME.to_string(),
            version: env!("ANNOUNCER_VERSION").to_string(),
        }
    }

    pub fn user_agent(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_descriptor_uses_package_version() {
        let descriptor = PluginDescriptor::current();
        assert_eq!(descriptor.name, "Announcer");
        assert!(descriptor.version.starts_with(env!("CARGO_PKG_VERSION")));
        assert_eq!(
            descriptor.user_agent(),
            format!("Announcer/{}", descriptor.version)
        );
    }
}
