use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub microsite_id: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub expiration_in_seconds: Option<u64>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Pagination {
    #[serde(default)]
    pub first_result: Option<u32>,
    #[serde(default)]
    pub page_results: Option<u32>,
    #[serde(default)]
    pub total_results: Option<u32>,
}

/// One page from an upstream list endpoint.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<Value>,
    /// Offset of the first item, as echoed by the upstream.
    pub first: u32,
    /// Items on this page, as reported by the upstream or counted locally.
    pub page_results: u32,
    /// Total items across all pages, when the upstream reports it.
    pub total: Option<u32>,
}

impl Page {
    /// Parse a list response. Items may sit under any of `keys` or be a bare array.
    pub(crate) fn from_value(value: Value, keys: &[&str], requested_first: u32) -> Self {
        let pagination: Pagination = value
            .get("pagination")
            .and_then(|p| serde_json::from_value(p.clone()).ok())
            .unwrap_or_default();
        let items = match value {
            Value::Array(items) => items,
            Value::Object(mut map) => keys
                .iter()
                .find_map(|key| match map.remove(*key) {
                    Some(Value::Array(items)) => Some(items),
                    _ => None,
                })
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        let counted = u32::try_from(items.len()).unwrap_or(u32::MAX);
        Self {
            items,
            first: pagination.first_result.unwrap_or(requested_first),
            page_results: pagination.page_results.unwrap_or(counted),
            total: pagination.total_results,
        }
    }

    /// Number of pages of `page_size` needed to cover `total`.
    #[must_use]
    pub fn page_count(&self, page_size: u32) -> u32 {
        let total = self.total.unwrap_or_else(|| {
            u32::try_from(self.items.len()).unwrap_or(u32::MAX).saturating_add(self.first)
        });
        if page_size == 0 { 0 } else { total.div_ceil(page_size) }
    }

    /// Whether this page holds a whole `page_size` of items, so more may follow.
    #[must_use]
    pub fn is_full(&self, page_size: u32) -> bool {
        page_size > 0 && self.items.len() >= page_size as usize
    }
}
