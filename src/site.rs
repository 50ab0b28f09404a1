//! Site Identifiers
//!
//! A `Site` is a monitored campus. Sites are validated against a closed
//! registry at construction; detection code never deals in free-form
//! strings, so a typo cannot silently produce a site with no baseline.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{DetectionError, DetectionResult};

/// Validated site identifier.
///
/// Obtained through [`SiteRegistry::resolve`]; cheap to clone and usable
/// as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Site(String);

impl Site {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// SITE REGISTRY
// ============================================================================

/// Closed registry of monitored campuses.
///
/// Built once at startup from deployment configuration; lookups validate
/// incoming site names before they enter the detection pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteRegistry {
    sites: Vec<Site>,
}

/// The four campuses of the reference deployment.
pub static DEFAULT_CAMPUSES: Lazy<SiteRegistry> =
    Lazy::new(|| SiteRegistry::new(["Tunja", "Duitama", "Sogamoso", "Chiquinquira"]));

impl SiteRegistry {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sites: Vec<Site> = names.into_iter().map(|n| Site(n.into())).collect();
        sites.sort();
        sites.dedup();
        Self { sites }
    }

    /// Validate a raw site name against the registry.
    pub fn resolve(&self, name: &str) -> DetectionResult<Site> {
        self.sites
            .iter()
            .find(|s| s.0 == name)
            .cloned()
            .ok_or_else(|| DetectionError::UnknownSite(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sites.iter().any(|s| s.0 == name)
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_site() {
        let site = DEFAULT_CAMPUSES.resolve("Tunja").unwrap();
        assert_eq!(site.name(), "Tunja");
    }

    #[test]
    fn test_resolve_unknown_site() {
        let err = DEFAULT_CAMPUSES.resolve("Bogota").unwrap_err();
        assert_eq!(err, DetectionError::UnknownSite("Bogota".to_string()));
    }

    #[test]
    fn test_registry_dedups() {
        let registry = SiteRegistry::new(["A", "B", "A"]);
        assert_eq!(registry.len(), 2);
    }
}
