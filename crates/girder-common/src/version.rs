//! ---
//! girder_section: "01-core-functionality"
//! girder_subsection: "module"
//! girder_type: "source"
//! girder_scope: "code"
//! girder_description: "Version metadata helpers."
//! girder_version: "v0.0.0-prealpha"
//! girder_owner: "tbd"
//! ---
use serde::Serialize;

/// Compile-time version metadata for the kernel.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    /// Workspace semantic version.
    pub semver: String,
    /// Cargo package name of the reporting binary.
    pub package: String,
}

impl VersionInfo {
    /// Construct a new [`VersionInfo`] instance using environment metadata.
    #[must_use]
    pub fn current() -> Self {
        Self {
            semver: env!("CARGO_PKG_VERSION").to_owned(),
            package: env!("CARGO_PKG_NAME").to_owned(),
        }
    }

    /// Human readable banner used in logging surfaces.
    #[must_use]
    pub fn banner(&self) -> String {
        format!("Girder v{}", self.semver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_contains_semver() {
        let info = VersionInfo::current();
        assert!(info.banner().contains(&info.semver));
    }
}
