//! Service layer for tripdesk
//!
//! Centralizes business logic between HTTP/CLI handlers and storage,
//! the Travel Compositor search and the LLM client.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod assistant_service;
mod booking_service;
mod dashboard_service;
mod error;
mod feature_service;
mod idea_service;
mod import_service;
mod user_service;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use tripdesk_compositor::BookingFinder;
use tripdesk_llm::LlmClient;
use tripdesk_storage::traits::{BookingStore, FeatureStore, StatsStore, TravelIdeaStore, UserStore};

pub use assistant_service::{AssistantService, ChatInput, ChatReply};
pub use booking_service::{BookingLookup, BookingService, BookingSource};
pub use dashboard_service::{Dashboard, DashboardService};
pub use error::ServiceError;
pub use feature_service::FeatureService;
pub use idea_service::IdeaService;
pub use import_service::{ImportReport, ImportService};
pub use user_service::UserService;

/// Every service wired against one store, one finder and an optional LLM.
pub struct Services {
    pub bookings: Arc<BookingService>,
    pub imports: Arc<ImportService>,
    pub users: Arc<UserService>,
    pub features: Arc<FeatureService>,
    pub assistant: Arc<AssistantService>,
    pub ideas: Arc<IdeaService>,
    pub dashboard: Arc<DashboardService>,
}

impl Services {
    pub fn new<S>(storage: Arc<S>, finder: Arc<BookingFinder>, llm: Option<Arc<LlmClient>>) -> Self
    where
        S: BookingStore + UserStore + TravelIdeaStore + FeatureStore + StatsStore + 'static,
    {
        let booking_store: Arc<dyn BookingStore> = Arc::clone(&storage) as Arc<dyn BookingStore>;
        let bookings = Arc::new(BookingService::new(Arc::clone(&booking_store), Arc::clone(&finder)));
        Self {
            imports: Arc::new(ImportService::new(
                Arc::clone(&booking_store),
                Arc::clone(&storage) as Arc<dyn TravelIdeaStore>,
                Arc::clone(&finder),
            )),
            users: Arc::new(UserService::new(
                Arc::clone(&storage) as Arc<dyn UserStore>,
                Arc::clone(&booking_store),
            )),
            features: Arc::new(FeatureService::new(Arc::clone(&storage) as Arc<dyn FeatureStore>)),
            assistant: Arc::new(AssistantService::new(llm.clone(), Arc::clone(&bookings))),
            ideas: Arc::new(IdeaService::new(Arc::clone(&storage) as Arc<dyn TravelIdeaStore>, llm)),
            dashboard: Arc::new(DashboardService::new(storage as Arc<dyn StatsStore>, finder)),
            bookings,
        }
    }
}
