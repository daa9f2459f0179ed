//! Version information

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn get_version() -> &'static str {
    VERSION
}

/// User-Agent value for tooling that identifies itself (the debug sink)
pub fn user_agent() -> String {
    format!("superbed-uploader/{}", VERSION)
}
