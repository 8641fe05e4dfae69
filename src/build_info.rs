//! Build information captured at compile time.

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Short git commit hash, or `unknown` outside a checkout.
pub const BUILD_HASH: &str = env!("BUILD_HASH");

const BUILD_DIRTY: &str = env!("BUILD_DIRTY");

/// Version string shown in the TUI footer.
///
/// Format: `v0.1.0 · abc1234`, with a trailing `*` for dirty builds.
#[must_use]
pub fn version_string() -> String {
    let dirty = if BUILD_DIRTY == "true" { "*" } else { "" };
    format!("v{VERSION} · {BUILD_HASH}{dirty}")
}
