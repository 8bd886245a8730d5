//! In-memory store used by the service tests.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tripdesk_core::{
    Booking, BookingFilter, BookingReference, BookingStatus, FeatureRequest, FeatureStatus,
    IdeaContent, NewBooking, NewFeatureRequest, NewTravelIdea, NewUser, TravelIdea, User,
    UserUpdate,
};
use tripdesk_storage::traits::{BookingStore, FeatureStore, StatsStore, TravelIdeaStore, UserStore};
use tripdesk_storage::{DashboardStats, PaginatedResult, StorageError};

#[derive(Default)]
struct Tables {
    bookings: Vec<Booking>,
    users: Vec<User>,
    ideas: Vec<TravelIdea>,
    features: Vec<FeatureRequest>,
    votes: Vec<(String, String)>,
    next_id: u64,
}

impl Tables {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn owner_of(&self, email: Option<&str>) -> Option<String> {
        let email = email?.to_lowercase();
        self.users.iter().find(|u| u.email == email).map(|u| u.id.clone())
    }

    fn tally(&mut self, feature_id: &str) -> u32 {
        let count = self.votes.iter().filter(|(f, _)| f == feature_id).count();
        let count = u32::try_from(count).unwrap();
        if let Some(feature) = self.features.iter_mut().find(|f| f.id == feature_id) {
            feature.vote_count = count;
        }
        count
    }
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    pub(crate) fn booking_count(&self) -> usize {
        self.lock().bookings.len()
    }
}

fn page<T: Clone>(items: &[T], offset: usize, limit: usize) -> PaginatedResult<T> {
    PaginatedResult {
        items: items.iter().skip(offset).take(limit).cloned().collect(),
        total: items.len() as u64,
        offset: offset as u64,
        limit: limit as u64,
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn upsert_booking(&self, input: &NewBooking) -> Result<Booking, StorageError> {
        let mut tables = self.lock();
        let user_id = tables.owner_of(input.client_email.as_deref());
        let now = Utc::now();
        if let Some(existing) = tables
            .bookings
            .iter_mut()
            .find(|b| b.microsite_id == input.microsite_id && b.external_id == input.external_id)
        {
            existing.booking_reference = input.booking_reference.clone();
            existing.status = input.status;
            existing.client_email = input.client_email.clone();
            existing.user_id = user_id;
            existing.raw_data = input.raw_data.clone();
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let booking = Booking {
            id: tables.next_id("b"),
            booking_reference: input.booking_reference.clone(),
            external_id: input.external_id.clone(),
            microsite_id: input.microsite_id.clone(),
            user_id,
            agency_id: input.agency_id.clone(),
            status: input.status,
            client_email: input.client_email.clone(),
            client_name: input.client_name.clone(),
            destination: input.destination.clone(),
            start_date: input.start_date,
            end_date: input.end_date,
            total_price: input.total_price,
            currency: input.currency.clone(),
            accommodations: input.accommodations.clone(),
            activities: input.activities.clone(),
            transports: input.transports.clone(),
            vouchers: input.vouchers.clone(),
            raw_data: input.raw_data.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn get_booking(&self, id: &str) -> Result<Option<Booking>, StorageError> {
        Ok(self.lock().bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn get_booking_by_reference(
        &self,
        reference: &BookingReference,
    ) -> Result<Option<Booking>, StorageError> {
        let full = reference.to_string();
        Ok(self
            .lock()
            .bookings
            .iter()
            .find(|b| b.booking_reference == full || b.external_id == reference.numeric_id())
            .cloned())
    }

    async fn list_bookings(
        &self,
        filter: &BookingFilter,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<Booking>, StorageError> {
        let tables = self.lock();
        let matching: Vec<Booking> = tables
            .bookings
            .iter()
            .filter(|b| filter.user_id.is_none() || b.user_id == filter.user_id)
            .filter(|b| filter.status.is_none_or(|s| b.status == s))
            .cloned()
            .collect();
        Ok(page(&matching, offset, limit))
    }

    async fn bookings_for_user(&self, user_id: &str) -> Result<Vec<Booking>, StorageError> {
        Ok(self
            .lock()
            .bookings
            .iter()
            .filter(|b| b.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect())
    }

    async fn link_bookings_for_user(&self, user: &User) -> Result<u64, StorageError> {
        let mut tables = self.lock();
        let mut linked = 0;
        for booking in &mut tables.bookings {
            let matches = booking.client_email.as_deref().map(str::to_lowercase) == Some(user.email.clone());
            if matches && booking.user_id.as_deref() != Some(user.id.as_str()) {
                booking.user_id = Some(user.id.clone());
                linked += 1;
            } else if !matches && booking.user_id.as_deref() == Some(user.id.as_str()) {
                booking.user_id = None;
            }
        }
        Ok(linked)
    }

    async fn delete_booking(&self, id: &str) -> Result<bool, StorageError> {
        let mut tables = self.lock();
        let before = tables.bookings.len();
        tables.bookings.retain(|b| b.id != id);
        Ok(tables.bookings.len() < before)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, input: &NewUser) -> Result<User, StorageError> {
        let mut tables = self.lock();
        let email = input.email.to_lowercase();
        if tables.users.iter().any(|u| u.email == email) {
            return Err(StorageError::Duplicate(format!("users.email {email}")));
        }
        let now = Utc::now();
        let user = User {
            id: tables.next_id("u"),
            email,
            name: input.name.clone(),
            role: input.role,
            status: input.status,
            tc_user_id: input.tc_user_id.clone(),
            tc_microsite_id: input.tc_microsite_id.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, StorageError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let email = email.trim().to_lowercase();
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self, offset: usize, limit: usize) -> Result<PaginatedResult<User>, StorageError> {
        Ok(page(&self.lock().users, offset, limit))
    }

    async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<Option<User>, StorageError> {
        let mut tables = self.lock();
        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(email) = &update.email {
            user.email = email.to_lowercase();
        }
        if let Some(name) = &update.name {
            user.name = Some(name.clone());
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(status) = update.status {
            user.status = status;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: &str) -> Result<bool, StorageError> {
        let mut tables = self.lock();
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        let deleted = tables.users.len() < before;
        if deleted {
            for booking in &mut tables.bookings {
                if booking.user_id.as_deref() == Some(id) {
                    booking.user_id = None;
                }
            }
            tables.votes.retain(|(_, u)| u != id);
        }
        Ok(deleted)
    }
}

#[async_trait]
impl TravelIdeaStore for MemoryStore {
    async fn upsert_travel_idea(&self, input: &NewTravelIdea) -> Result<TravelIdea, StorageError> {
        let mut tables = self.lock();
        let now = Utc::now();
        let generated_content = tables
            .ideas
            .iter()
            .find(|i| i.id == input.id)
            .and_then(|i| i.generated_content.clone());
        tables.ideas.retain(|i| i.id != input.id);
        let idea = TravelIdea {
            id: input.id.clone(),
            microsite_id: input.microsite_id.clone(),
            title: input.title.clone(),
            destination: input.destination.clone(),
            themes: input.themes.clone(),
            price_from: input.price_from,
            currency: input.currency.clone(),
            image_url: input.image_url.clone(),
            description: input.description.clone(),
            generated_content,
            raw_data: input.raw_data.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.ideas.push(idea.clone());
        Ok(idea)
    }

    async fn get_travel_idea(&self, id: &str) -> Result<Option<TravelIdea>, StorageError> {
        Ok(self.lock().ideas.iter().find(|i| i.id == id).cloned())
    }

    async fn list_travel_ideas(
        &self,
        destination: Option<&str>,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<TravelIdea>, StorageError> {
        let needle = destination.map(str::to_lowercase);
        let matching: Vec<TravelIdea> = self
            .lock()
            .ideas
            .iter()
            .filter(|i| {
                needle.as_deref().is_none_or(|n| {
                    i.destination.as_deref().is_some_and(|d| d.to_lowercase().contains(n))
                })
            })
            .cloned()
            .collect();
        Ok(page(&matching, offset, limit))
    }

    async fn save_generated_content(
        &self,
        id: &str,
        content: &IdeaContent,
    ) -> Result<Option<TravelIdea>, StorageError> {
        let mut tables = self.lock();
        Ok(tables.ideas.iter_mut().find(|i| i.id == id).map(|idea| {
            idea.generated_content = Some(content.clone());
            idea.clone()
        }))
    }
}

#[async_trait]
impl FeatureStore for MemoryStore {
    async fn create_feature_request(
        &self,
        input: &NewFeatureRequest,
    ) -> Result<FeatureRequest, StorageError> {
        let mut tables = self.lock();
        let now = Utc::now();
        let feature = FeatureRequest {
            id: tables.next_id("f"),
            title: input.title.clone(),
            description: input.description.clone(),
            author_id: input.author_id.clone(),
            status: FeatureStatus::Open,
            vote_count: 0,
            created_at: now,
            updated_at: now,
        };
        tables.features.push(feature.clone());
        Ok(feature)
    }

    async fn get_feature_request(&self, id: &str) -> Result<Option<FeatureRequest>, StorageError> {
        Ok(self.lock().features.iter().find(|f| f.id == id).cloned())
    }

    async fn list_feature_requests(
        &self,
        status: Option<FeatureStatus>,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<FeatureRequest>, StorageError> {
        let mut matching: Vec<FeatureRequest> = self
            .lock()
            .features
            .iter()
            .filter(|f| status.is_none_or(|s| f.status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.vote_count.cmp(&a.vote_count));
        Ok(page(&matching, offset, limit))
    }

    async fn vote(&self, feature_id: &str, user_id: &str) -> Result<u32, StorageError> {
        let mut tables = self.lock();
        if !tables.features.iter().any(|f| f.id == feature_id) {
            return Err(StorageError::NotFound { entity: "feature_request", id: feature_id.to_owned() });
        }
        if !tables.users.iter().any(|u| u.id == user_id) {
            return Err(StorageError::NotFound { entity: "user", id: user_id.to_owned() });
        }
        let vote = (feature_id.to_owned(), user_id.to_owned());
        if !tables.votes.contains(&vote) {
            tables.votes.push(vote);
        }
        Ok(tables.tally(feature_id))
    }

    async fn unvote(&self, feature_id: &str, user_id: &str) -> Result<u32, StorageError> {
        let mut tables = self.lock();
        if !tables.features.iter().any(|f| f.id == feature_id) {
            return Err(StorageError::NotFound { entity: "feature_request", id: feature_id.to_owned() });
        }
        tables.votes.retain(|(f, u)| !(f == feature_id && u == user_id));
        Ok(tables.tally(feature_id))
    }

    async fn update_feature_status(
        &self,
        id: &str,
        status: FeatureStatus,
    ) -> Result<Option<FeatureRequest>, StorageError> {
        let mut tables = self.lock();
        Ok(tables.features.iter_mut().find(|f| f.id == id).map(|feature| {
            feature.status = status;
            feature.clone()
        }))
    }
}

#[async_trait]
impl StatsStore for MemoryStore {
    async fn dashboard_stats(&self, today: NaiveDate) -> Result<DashboardStats, StorageError> {
        let tables = self.lock();
        let upcoming = tables
            .bookings
            .iter()
            .filter(|b| b.status != BookingStatus::Cancelled)
            .filter(|b| b.start_date.is_some_and(|d| d >= today && (d - today).num_days() <= 30))
            .count();
        Ok(DashboardStats {
            total_bookings: tables.bookings.len() as u64,
            bookings_by_status: Vec::new(),
            revenue_by_currency: Vec::new(),
            upcoming_departures: upcoming as u64,
            total_users: tables.users.len() as u64,
            total_travel_ideas: tables.ideas.len() as u64,
            open_feature_requests: tables.features.iter().filter(|f| f.status.accepts_votes()).count()
                as u64,
        })
    }
}
