//! Runtime feature checks.
//!
//! Providers are gated twice: at compile time through cargo features of the
//! backend (`gcal`, `mail`, `openapi`) and at runtime through the `use_*`
//! flags plus the presence of their config section.

/// A provider is enabled when its `use_*` flag is set and its config section exists.
pub fn is_feature_enabled<T>(use_feature: bool, feature_config: Option<&T>) -> bool {
    use_feature && feature_config.is_some()
}
