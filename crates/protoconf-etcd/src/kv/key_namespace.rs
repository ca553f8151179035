//! Key composition for environment-scoped configuration.

use std::fmt;

/// Namespace under which all per-application configuration keys live.
///
/// Every derivation uses the same concatenation rule, so keys composed for
/// batch reads, watches, and prefix stripping always agree:
/// `/<envkey>/<app>/<key>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyNamespace {
    envkey: String,
}

impl KeyNamespace {
    /// Create a namespace from an envkey segment.
    ///
    /// Stray slashes are normalized away so `"prod"`, `"/prod"`, and
    /// `"prod/"` all produce the `/prod` namespace.
    pub fn new(envkey: impl AsRef<str>) -> Self {
        Self {
            envkey: format!("/{}", envkey.as_ref().trim_matches('/')),
        }
    }

    /// Returns the normalized envkey, including its leading slash.
    pub fn envkey(&self) -> &str {
        &self.envkey
    }

    /// Full storage path for an application key: `/<envkey>/<app>/<key>`.
    pub fn key_path(&self, app_name: &str, key: &str) -> String {
        format!("{}/{}/{}", self.envkey, app_name, key)
    }

    /// Prefix covering all keys of one application: `/<envkey>/<app>/`.
    ///
    /// Used both as the watch range and to strip full paths back to bare
    /// key names.
    pub fn app_prefix(&self, app_name: &str) -> String {
        format!("{}/{}/", self.envkey, app_name)
    }
}

impl fmt::Display for KeyNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.envkey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_path_composition() {
        let namespace = KeyNamespace::new("prod");
        assert_eq!(namespace.key_path("svc1", "timeout"), "/prod/svc1/timeout");
    }

    #[test]
    fn test_envkey_normalization() {
        assert_eq!(KeyNamespace::new("prod").envkey(), "/prod");
        assert_eq!(KeyNamespace::new("/prod").envkey(), "/prod");
        assert_eq!(KeyNamespace::new("prod/").envkey(), "/prod");
    }

    #[test]
    fn test_app_prefix_strips_back_to_bare_key() {
        let namespace = KeyNamespace::new("prod");
        let prefix = namespace.app_prefix("svc1");
        let full = namespace.key_path("svc1", "timeout");

        assert_eq!(prefix, "/prod/svc1/");
        assert_eq!(full.strip_prefix(prefix.as_str()), Some("timeout"));
    }

    #[test]
    fn test_display() {
        assert_eq!(KeyNamespace::new("staging").to_string(), "/staging");
    }
}
