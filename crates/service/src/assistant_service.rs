use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tripdesk_llm::{ChatMessage, LlmClient, describe_booking};

use crate::{BookingService, ServiceError};

#[derive(Debug, Clone, Deserialize)]
pub struct ChatInput {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub booking_reference: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub reply: String,
    /// Normalized reference of the booking used as context, if one was found.
    pub booking_reference: Option<String>,
}

pub struct AssistantService {
    llm: Option<Arc<LlmClient>>,
    bookings: Arc<BookingService>,
}

impl AssistantService {
    #[must_use]
    pub fn new(llm: Option<Arc<LlmClient>>, bookings: Arc<BookingService>) -> Self {
        Self { llm, bookings }
    }

    pub async fn chat(&self, input: ChatInput) -> Result<ChatReply, ServiceError> {
        let llm = self
            .llm
            .as_ref()
            .ok_or_else(|| ServiceError::NotConfigured("OPENAI_API_KEY is not set".to_owned()))?;
        if input.messages.is_empty() {
            return Err(ServiceError::InvalidInput("messages must not be empty".to_owned()));
        }

        let (context, booking_reference) = match input.booking_reference.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => self.booking_context(raw).await?,
            _ => (None, None),
        };
        let reply = llm.assistant_reply(&input.messages, context.as_deref()).await?;
        Ok(ChatReply { reply, booking_reference })
    }

    /// A malformed reference is the caller's error; an unreachable upstream
    /// only costs the conversation its booking context.
    async fn booking_context(
        &self,
        raw: &str,
    ) -> Result<(Option<String>, Option<String>), ServiceError> {
        match self.bookings.find_booking(raw, false).await {
            Ok(Some(found)) => Ok((
                Some(describe_booking(&found.booking)),
                Some(found.booking.booking_reference),
            )),
            Ok(None) => Ok((Some(format!("No booking was found for reference {raw}.")), None)),
            Err(e) if e.is_invalid_input() => Err(e),
            Err(e) => {
                tracing::warn!(reference = %raw, error = %e, "booking lookup for chat failed");
                Ok((None, None))
            },
        }
    }
}
