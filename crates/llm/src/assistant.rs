//! Agency chat assistant.

use tripdesk_core::{Booking, truncate};

use crate::ai_types::{ChatMessage, ChatRequest, Message};
use crate::client::LlmClient;
use crate::error::LlmError;

/// Oldest turns beyond this are dropped before sending.
pub const MAX_HISTORY_MESSAGES: usize = 20;
const MAX_MESSAGE_LEN: usize = 4000;

const SYSTEM_PROMPT: &str = "You are the assistant of a travel agency back office. \
You help agents and their clients with questions about trips, bookings, destinations \
and travel documents. Answer in the language of the last user message. \
Be concise and practical. When booking details are provided, rely on them and never \
invent prices, dates or confirmation numbers. If something is not in the booking \
details, say so and suggest contacting the agency.";

/// Render booking facts for the system prompt. Raw upstream payloads are left out.
#[must_use]
pub fn describe_booking(booking: &Booking) -> String {
    let mut lines = vec![
        format!("Reference: {}", booking.booking_reference),
        format!("Status: {}", booking.status.as_str()),
    ];
    if let Some(name) = &booking.client_name {
        lines.push(format!("Client: {name}"));
    }
    if let Some(destination) = &booking.destination {
        lines.push(format!("Destination: {destination}"));
    }
    match (booking.start_date, booking.end_date) {
        (Some(start), Some(end)) => {
            let nights = booking.nights().map(|n| format!(" ({n} nights)")).unwrap_or_default();
            lines.push(format!("Travel dates: {start} to {end}{nights}"));
        },
        (Some(start), None) => lines.push(format!("Departure: {start}")),
        _ => {},
    }
    if let Some(total) = booking.total_price {
        let currency = booking.currency.as_deref().unwrap_or("");
        lines.push(format!("Total price: {total:.2} {currency}").trim_end().to_owned());
    }
    for (label, services) in [
        ("Accommodations", &booking.accommodations),
        ("Activities", &booking.activities),
        ("Transports", &booking.transports),
    ] {
        let count = services.as_array().map_or(0, Vec::len);
        if count > 0 {
            lines.push(format!("{label}: {count}"));
        }
    }
    lines.join("\n")
}

impl LlmClient {
    /// Reply to the last user turn of `history`.
    ///
    /// `booking_context` is appended to the system prompt when present.
    ///
    /// # Errors
    /// Returns [`LlmError::InvalidContent`] when `history` has no user turn,
    /// or any error from the completion call.
    pub async fn assistant_reply(
        &self,
        history: &[ChatMessage],
        booking_context: Option<&str>,
    ) -> Result<String, LlmError> {
        if !history.iter().any(|m| m.role == crate::ChatRole::User && !m.content.trim().is_empty()) {
            return Err(LlmError::InvalidContent("conversation has no user message".to_owned()));
        }

        let system = match booking_context {
            Some(facts) if !facts.trim().is_empty() => {
                format!("{SYSTEM_PROMPT}\n\nBooking details:\n{facts}")
            },
            _ => SYSTEM_PROMPT.to_owned(),
        };

        let skip = history.len().saturating_sub(MAX_HISTORY_MESSAGES);
        let mut messages = Vec::with_capacity(history.len().min(MAX_HISTORY_MESSAGES) + 1);
        messages.push(Message::new("system", system));
        messages.extend(
            history
                .iter()
                .skip(skip)
                .map(|m| Message::new(m.role.as_str(), truncate(&m.content, MAX_MESSAGE_LEN))),
        );

        let request = ChatRequest {
            model: self.model().to_owned(),
            messages,
            response_format: None,
            temperature: Some(0.4),
        };
        let reply = self.chat_completion(&request).await?;
        let reply = reply.trim();
        if reply.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(reply.to_owned())
    }
}
