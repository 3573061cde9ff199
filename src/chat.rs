//! Grounded chat: prompt construction over the static profile and reply
//! extraction from Gemini responses.
//!
//! Chat calls are never retried. A completion is metered per call, so a
//! failure goes straight back to the caller.
use crate::errors::AppError;
use crate::gemini_client::{GeminiClient, GenerationConfig};
use crate::profile::{Profile, Skill};
use serde_json::Value;

/// Reply used when no candidate carries usable text.
pub const NO_RESPONSE_REPLY: &str = "No response from AI";

fn names(skills: &[Skill]) -> String {
    skills
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders the profile into the text block injected into every prompt.
pub fn build_grounding_text(profile: &Profile) -> String {
    let user = &profile.user;
    let skills = &profile.skills;

    let languages = skills
        .languages
        .iter()
        .map(|s| format!("{} ({})", s.name, s.description))
        .collect::<Vec<_>>()
        .join(", ");

    let projects = profile
        .projects
        .iter()
        .map(|p| format!("  - {}: {}", p.name, p.desc))
        .collect::<Vec<_>>()
        .join("\n");

    let experience = profile
        .experience
        .iter()
        .map(|e| format!("  - {} at {} ({}): {}", e.title, e.company, e.dates, e.desc))
        .collect::<Vec<_>>()
        .join("\n");

    let coding_profiles = profile
        .coding_profiles
        .iter()
        .map(|c| format!("  - {}: {}, {}", c.name, c.rank, c.link))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Name: {name}\n\
         Bio: {bio}\n\
         Location: {location}\n\
         Email: {email}\n\
         \n\
         Skills:\n\
         \x20 - Languages: {languages}\n\
         \x20 - Frontend: {frontend}\n\
         \x20 - Backend: {backend}\n\
         \x20 - ML/AI: {ml_ai}\n\
         \x20 - Tools/DevOps: {tools}\n\
         \n\
         Projects:\n{projects}\n\
         \n\
         Experience:\n{experience}\n\
         \n\
         Coding Profiles:\n{coding_profiles}\n",
        name = user.name,
        bio = user.bio,
        location = user.location,
        email = user.email,
        languages = languages,
        frontend = names(&skills.frontend),
        backend = names(&skills.backend),
        ml_ai = names(&skills.ml_ai),
        tools = names(&skills.tools_devops),
        projects = projects,
        experience = experience,
        coding_profiles = coding_profiles,
    )
}

/// Wraps the user's question with the fixed instruction and grounding data.
pub fn build_prompt(owner: &str, grounding: &str, question: &str) -> String {
    format!(
        "You are {owner}'s AI assistant. Answer user questions using ONLY the profile data below.\n\
         Do NOT make up information. Be friendly and informative.\n\
         \n\
         Profile Data:\n\
         {grounding}\n\
         User Question: {question}\n\
         \n\
         Answer concisely.\n"
    )
}

/// Pulls a flat reply out of the first candidate of a completion response.
///
/// Accepts `content.parts[].text` (joined with spaces), a string `content`,
/// or `content.text`; anything else yields [`NO_RESPONSE_REPLY`].
pub fn extract_reply(response: &Value) -> String {
    let Some(content) = response
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
    else {
        return NO_RESPONSE_REPLY.to_string();
    };

    if let Some(parts) = content.get("parts").and_then(Value::as_array) {
        return parts
            .iter()
            .map(|p| p.get("text").and_then(Value::as_str).unwrap_or(""))
            .collect::<Vec<_>>()
            .join(" ");
    }

    if let Some(text) = content.as_str().filter(|text| !text.is_empty()) {
        return text.to_string();
    }

    match content.get("text").and_then(Value::as_str) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => NO_RESPONSE_REPLY.to_string(),
    }
}

/// Answers questions about one profile through a single completion call.
#[derive(Clone)]
pub struct ChatService {
    client: GeminiClient,
    owner: String,
    grounding: String,
    generation: GenerationConfig,
}

impl ChatService {
    pub fn new(client: GeminiClient, profile: &Profile) -> Self {
        let owner = profile
            .user
            .name
            .split_whitespace()
            .next()
            .unwrap_or("the profile owner")
            .to_string();

        Self {
            client,
            owner,
            grounding: build_grounding_text(profile),
            generation: GenerationConfig::default(),
        }
    }

    pub fn grounding(&self) -> &str {
        &self.grounding
    }

    /// Answers `question`. Empty or whitespace-only input is a `BadRequest`
    /// and never reaches the upstream.
    pub async fn answer(&self, question: &str) -> Result<String, AppError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::BadRequest("Prompt is required".to_string()));
        }

        let prompt = build_prompt(&self.owner, &self.grounding, question);
        let response = self
            .client
            .generate_content(&prompt, self.generation)
            .await?;

        let reply = extract_reply(&response);
        tracing::info!("Chat reply ready ({} chars)", reply.len());
        Ok(reply)
    }
}
