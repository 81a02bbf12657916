//! Audience profile registry.

use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::types::AudienceProfile;

/// Built-in audiences used when no `audiences.json` is present.
pub const DEFAULT_AUDIENCES: &[(&str, &str)] = &[
    (
        "Digital Engagement",
        "Focus on chatbots, AI assistants, and social platforms",
    ),
    (
        "Digital Product",
        "Responsible for self-service help centers and deflection funnels",
    ),
    (
        "NextGen Products",
        "Incubator for upcoming trends, technologies, and next-gen services",
    ),
    (
        "Product Insights",
        "Works with data analysis, Adobe analytics, and Salesforce CRM analytics",
    ),
    (
        "Product Testing",
        "Handles user acceptance testing (UAT) and validation",
    ),
    (
        "Service Technology",
        "Works with Salesforce Service Cloud, agent tooling, live chat, translation tools, and telephony",
    ),
];

/// Read-only list of audiences with unique, non-empty ids.
#[derive(Debug, Clone)]
pub struct AudienceRegistry {
    profiles: Vec<AudienceProfile>,
}

impl AudienceRegistry {
    pub fn new(profiles: Vec<AudienceProfile>) -> Result<Self> {
        let mut seen = HashSet::new();
        for profile in &profiles {
            if profile.id.trim().is_empty() {
                return Err(Error::Config("audience id must not be empty".into()));
            }
            if !seen.insert(profile.id.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate audience id: {}",
                    profile.id
                )));
            }
        }
        Ok(Self { profiles })
    }

    /// Load from a JSON array of profiles; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(data) => {
                let profiles: Vec<AudienceProfile> = serde_json::from_str(&data)?;
                let registry = Self::new(profiles)?;
                info!(
                    "Loaded {} audiences from {}",
                    registry.len(),
                    path.display()
                );
                Ok(registry)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => {
                warn!("Cannot read {}: {}", path.display(), e);
                Err(Error::Io(e))
            }
        }
    }

    pub fn profiles(&self) -> &[AudienceProfile] {
        &self.profiles
    }

    pub fn get(&self, id: &str) -> Option<&AudienceProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for AudienceRegistry {
    fn default() -> Self {
        Self {
            profiles: DEFAULT_AUDIENCES
                .iter()
                .map(|(id, ctx)| AudienceProfile::new(*id, *ctx))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let registry = AudienceRegistry::default();
        assert_eq!(registry.len(), 6);
        assert!(registry.get("Product Testing").is_some());
    }

    #[test]
    fn test_rejects_duplicates() {
        let result = AudienceRegistry::new(vec![
            AudienceProfile::new("Ops", "runs things"),
            AudienceProfile::new("Ops", "runs other things"),
        ]);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_blank_id() {
        let result = AudienceRegistry::new(vec![AudienceProfile::new("  ", "nobody")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let registry = AudienceRegistry::load(&dir.path().join("audiences.json")).unwrap();
        assert_eq!(registry.len(), DEFAULT_AUDIENCES.len());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audiences.json");
        std::fs::write(
            &path,
            r#"[{"id": "Ops", "context_description": "Keeps the lights on"}]"#,
        )
        .unwrap();
        let registry = AudienceRegistry::load(&path).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.profiles()[0].id, "Ops");
    }
}
