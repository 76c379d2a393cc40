//! Version information.

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// `User-Agent` sent by the RSS fetcher: `trendfeed/{version}`.
pub fn user_agent() -> String {
    format!("trendfeed/{PKG_VERSION}")
}
