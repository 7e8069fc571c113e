//! Environment helpers used by the configuration layers

/// Read an environment variable, treating unset and blank the same
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
