use serde::{Deserialize, Serialize};

/// Profile shipped with the binary; `PROFILE_DATA_PATH` replaces it at startup.
const EMBEDDED_PROFILE: &str = include_str!("../data/profile.json");

/// Static portfolio dataset. Loaded once, then shared read-only.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user: ProfileUser,
    pub skills: Skills,
    pub projects: Vec<Project>,
    pub experience: Vec<Experience>,
    pub coding_profiles: Vec<CodingProfile>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUser {
    pub id: String,
    pub name: String,
    pub bio: String,
    pub location: String,
    /// Follower count in thousands.
    #[serde(default)]
    pub followers: f64,
    #[serde(default)]
    pub following: u64,
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
}

/// Skills grouped by category.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Skills {
    pub languages: Vec<Skill>,
    pub frontend: Vec<Skill>,
    pub backend: Vec<Skill>,
    pub ml_ai: Vec<Skill>,
    pub tools_devops: Vec<Skill>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Skill {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub tech: Vec<String>,
    pub desc: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub dates: String,
    pub desc: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CodingProfile {
    pub name: String,
    pub rank: String,
    pub link: String,
}

impl Profile {
    /// The dataset compiled into the binary.
    pub fn embedded() -> anyhow::Result<Self> {
        serde_json::from_str(EMBEDDED_PROFILE)
            .map_err(|e| anyhow::anyhow!("Embedded profile data is invalid: {}", e))
    }

    /// Loads the profile from `path` when given, otherwise the embedded dataset.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Self::embedded();
        };

        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read profile data from {}: {}", path, e))?;
        let profile: Self = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Profile data in {} is invalid: {}", path, e))?;

        tracing::info!(
            "Loaded profile for {} from {} ({} projects)",
            profile.user.name,
            path,
            profile.projects.len()
        );
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_profile_parses() {
        let profile = Profile::embedded().unwrap();
        assert_eq!(profile.user.name, "Riddhi Jain");
        assert_eq!(profile.skills.languages.len(), 7);
        assert_eq!(profile.projects.len(), 3);
        assert_eq!(profile.experience.len(), 2);
        assert_eq!(profile.coding_profiles.len(), 4);
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(Profile::load(Some("/definitely/not/here.json")).is_err());
    }

    #[test]
    fn test_profile_serializes_camel_case() {
        let profile = Profile::embedded().unwrap();
        let value = serde_json::to_value(&profile).unwrap();
        assert!(value.get("codingProfiles").is_some());
        assert!(value["user"].get("githubUrl").is_some());
        assert!(value["skills"].get("tools_devops").is_some());
    }
}
