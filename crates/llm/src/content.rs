//! AI content tool for travel ideas.

use tripdesk_core::{IdeaContent, TravelIdea, strip_markdown_json, truncate};

use crate::ai_types::{ChatRequest, Message, ResponseFormat};
use crate::client::LlmClient;
use crate::error::LlmError;

const MAX_DESCRIPTION_LEN: usize = 3000;
const MAX_HIGHLIGHTS: usize = 6;

fn idea_prompt(idea: &TravelIdea) -> String {
    let destination = idea.destination.as_deref().unwrap_or("not specified");
    let themes = if idea.themes.is_empty() { "none".to_owned() } else { idea.themes.join(", ") };
    let price = match (idea.price_from, idea.currency.as_deref()) {
        (Some(price), Some(currency)) => format!("from {price:.0} {currency} per person"),
        (Some(price), None) => format!("from {price:.0} per person"),
        _ => "not published".to_owned(),
    };
    let description = idea.description.as_deref().map_or("", |d| truncate(d, MAX_DESCRIPTION_LEN));

    format!(
        r#"Write marketing copy for this travel idea.

Title: {title}
Destination: {destination}
Themes: {themes}
Price: {price}
Existing description: {description}

Return JSON with these fields:
- headline: catchy title (max 80 chars)
- description: 2-3 paragraph sales description, no prices unless given above
- highlights: array of 3-6 short bullet points"#,
        title = idea.title,
    )
}

/// Parse and validate the model's JSON answer.
pub(crate) fn parse_idea_content(raw: &str) -> Result<IdeaContent, LlmError> {
    let json = strip_markdown_json(raw);
    let mut content: IdeaContent = serde_json::from_str(json).map_err(|e| LlmError::JsonParse {
        context: format!("idea content (content: {})", truncate(json, 300)),
        source: e,
    })?;
    content.headline = content.headline.trim().to_owned();
    content.description = content.description.trim().to_owned();
    if content.headline.is_empty() {
        return Err(LlmError::InvalidContent("empty headline".to_owned()));
    }
    if content.description.is_empty() {
        return Err(LlmError::InvalidContent("empty description".to_owned()));
    }
    content.highlights = content
        .highlights
        .into_iter()
        .map(|h| h.trim().to_owned())
        .filter(|h| !h.is_empty())
        .take(MAX_HIGHLIGHTS)
        .collect();
    Ok(content)
}

impl LlmClient {
    /// Generate headline, description and highlights for a travel idea.
    ///
    /// # Errors
    /// Returns an error if the completion fails or the answer is not valid content JSON.
    pub async fn generate_idea_content(&self, idea: &TravelIdea) -> Result<IdeaContent, LlmError> {
        let request = ChatRequest {
            model: self.model().to_owned(),
            messages: vec![
                Message::new("system", "You are a travel copywriter. Answer with JSON only."),
                Message::new("user", idea_prompt(idea)),
            ],
            response_format: Some(ResponseFormat::json_object()),
            temperature: Some(0.7),
        };
        let raw = self.chat_completion(&request).await?;
        let content = parse_idea_content(&raw)?;
        tracing::info!(idea = %idea.id, microsite = %idea.microsite_id, highlights = content.highlights.len(), "generated idea content");
        Ok(content)
    }
}
