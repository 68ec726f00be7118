//! User profile (name + gender) and its durable store.
//!
//! The profile lives in a single JSON file, e.g. `~/.yaddoo/profile.v1.json`. Reads are lenient:
//! a missing, unreadable or malformed file is the same as "no profile".

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Gender selected on the gate. Any stored value other than "male" reads back as female.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Male,
    #[default]
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// Parse a gate selection. Unlike the lenient `From<String>`, an unknown or empty value is None.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" | "boy" => Some(Gender::Male),
            "female" | "f" | "girl" => Some(Gender::Female),
            _ => None,
        }
    }
}

impl From<String> for Gender {
    fn from(s: String) -> Self {
        if s == "male" {
            Gender::Male
        } else {
            Gender::Female
        }
    }
}

impl From<Gender> for String {
    fn from(g: Gender) -> Self {
        g.as_str().to_string()
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The active user. Name is non-empty for every profile handed out by the store or the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub gender: Gender,
}

impl Profile {
    /// Build a profile from raw gate input. Returns None when the trimmed name is empty.
    pub fn new(name: &str, gender: Gender) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            gender,
        })
    }
}

/// File-backed store for the single active profile.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the profile, replacing any previous one. Creates parent dirs if needed.
    /// Storage is assumed available: failures are logged and dropped.
    pub fn save(&self, profile: &Profile) {
        if let Err(e) = self.try_save(profile) {
            log::warn!("profile: could not save to {}: {}", self.path.display(), e);
        }
    }

    fn try_save(&self, profile: &Profile) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let s = serde_json::to_string(profile)?;
        std::fs::write(&self.path, s)?;
        Ok(())
    }

    /// Load the stored profile. Returns None if the file is missing, invalid, or has an empty name.
    pub fn load(&self) -> Option<Profile> {
        let s = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<Profile>(&s) {
            Ok(p) => Profile::new(&p.name, p.gender),
            Err(e) => {
                log::debug!("profile: ignoring malformed {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Remove the stored profile. A missing file is fine.
    pub fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("profile: could not remove {}: {}", self.path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_serializes_as_lowercase_tag() {
        let p = Profile::new("Sara", Gender::Female).unwrap();
        assert_eq!(
            serde_json::to_string(&p).unwrap(),
            r#"{"name":"Sara","gender":"female"}"#
        );
    }

    #[test]
    fn unknown_stored_gender_reads_as_female() {
        let p: Profile = serde_json::from_str(r#"{"name":"Sam","gender":"other"}"#).unwrap();
        assert_eq!(p.gender, Gender::Female);
        let p: Profile = serde_json::from_str(r#"{"name":"Ali","gender":"male"}"#).unwrap();
        assert_eq!(p.gender, Gender::Male);
    }

    #[test]
    fn missing_stored_gender_reads_as_female() {
        let p: Profile = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert_eq!(p, Profile::new("x", Gender::Female).unwrap());
    }

    #[test]
    fn gate_gender_parse_requires_a_choice() {
        assert_eq!(Gender::parse("male"), Some(Gender::Male));
        assert_eq!(Gender::parse(" F "), Some(Gender::Female));
        assert_eq!(Gender::parse(""), None);
        assert_eq!(Gender::parse("x"), None);
    }

    #[test]
    fn profile_name_is_trimmed_and_required() {
        assert!(Profile::new("   ", Gender::Male).is_none());
        assert_eq!(Profile::new("  Ali ", Gender::Male).unwrap().name, "Ali");
    }
}
