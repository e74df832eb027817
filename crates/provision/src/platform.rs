//! Platform family identifiers.
//!
//! Policies are keyed by platform *family* rather than by OS name, so the
//! identifiers here follow the family names used in policy documents
//! (`mac_os_x`, not `macos`).
//!
//! # Example
//!
//! ```
//! use provision::platform;
//!
//! let family = platform::detect();
//! println!("Resolving for: {family}");
//! ```

/// Windows desktops
pub const WINDOWS: &str = "windows";

/// macOS
pub const MAC_OS_X: &str = "mac_os_x";

/// Linux distributions
pub const LINUX: &str = "linux";

/// Map an OS name (as reported by `std::env::consts::OS`) to its family.
///
/// | OS        | Family     |
/// |-----------|------------|
/// | `windows` | `windows`  |
/// | `macos`   | `mac_os_x` |
/// | `linux`   | `linux`    |
///
/// Anything else maps to itself. Unknown families are not an error: they
/// simply have no override and resolve to the base policy.
#[must_use]
pub fn family_for_os(os: &str) -> &str {
    match os {
        "windows" => WINDOWS,
        "macos" | "darwin" | "mac_os_x" => MAC_OS_X,
        "linux" => LINUX,
        other => other,
    }
}

/// Detect the platform family of the running host.
#[must_use]
pub fn detect() -> &'static str {
    family_for_os(std::env::consts::OS)
}

/// Normalize a user-supplied platform identifier.
///
/// Accepts common spellings (`macos`, `darwin`, `Windows`) and returns the
/// family name used in policy documents.
#[must_use]
pub fn normalize(input: &str) -> String {
    let lowered = input.trim().to_ascii_lowercase();
    family_for_os(&lowered).to_string()
}
