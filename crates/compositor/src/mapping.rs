//! Reshape upstream JSON into tripdesk write models.
//!
//! The upstream API is inconsistent across endpoints and versions, so every
//! field is read from a list of candidate paths.

use chrono::NaiveDate;
use serde_json::Value;
use tripdesk_core::json_utils::{first_array, first_f64, first_string, json_path};
use tripdesk_core::{BookingReference, BookingStatus, NewBooking, NewTravelIdea};

const BOOKING_ID_PATHS: &[&str] = &["id", "bookingId", "tripId"];
const BOOKING_REF_PATHS: &[&str] = &["bookingReference", "reference", "bookingRef", "localizer"];

/// Strip list/detail wrappers around a single booking object.
#[must_use]
pub fn unwrap_booking(value: Value) -> Option<Value> {
    match value {
        Value::Object(mut map) => {
            for key in ["bookedTrip", "booking", "bookings"] {
                match map.remove(key) {
                    Some(Value::Array(items)) => return items.into_iter().next(),
                    Some(inner @ Value::Object(_)) => return Some(inner),
                    Some(_) | None => {},
                }
            }
            if map.is_empty() { None } else { Some(Value::Object(map)) }
        },
        Value::Array(items) => items.into_iter().next(),
        _ => None,
    }
}

/// Whether an upstream booking object is the one `reference` points at.
///
/// An id match is rejected when the booking carries its own reference with a
/// different prefix or number than a prefixed `reference`.
#[must_use]
pub fn booking_matches(booking: &Value, reference: &BookingReference) -> bool {
    let own_reference = first_string(booking, BOOKING_REF_PATHS);
    if own_reference.as_deref().is_some_and(|r| reference.matches(r)) {
        return true;
    }
    let contradicted = reference.prefix().is_some()
        && own_reference.as_deref().is_some_and(|r| BookingReference::parse(r).is_ok());
    !contradicted
        && BOOKING_ID_PATHS
            .iter()
            .filter_map(|path| first_string(booking, &[*path]))
            .any(|id| reference.matches(&id))
}

/// Parse `2024-05-01`, `20240501`, `01/05/2024` or an RFC 3339 timestamp.
#[must_use]
pub fn parse_upstream_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw.get(..8).unwrap_or(raw), "%Y%m%d"))
        .or_else(|_| NaiveDate::parse_from_str(head, "%d/%m/%Y"))
        .ok()
}

fn date_at(value: &Value, paths: &[&str]) -> Option<NaiveDate> {
    first_string(value, paths).and_then(|s| parse_upstream_date(&s))
}

fn client_name(value: &Value) -> Option<String> {
    for person in ["contactPerson", "holder", "client", "customer"] {
        let (name, first_name) = (format!("{person}.name"), format!("{person}.firstName"));
        let (last_name, surname) = (format!("{person}.lastName"), format!("{person}.surname"));
        let first = first_string(value, &[name.as_str(), first_name.as_str()]);
        let last = first_string(value, &[last_name.as_str(), surname.as_str()]);
        let full = match (first, last) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(only), None) | (None, Some(only)) => only,
            (None, None) => continue,
        };
        return Some(full);
    }
    first_string(value, &["clientName", "customerName", "holderName"])
}

/// Map an upstream booking to a [`NewBooking`]. Returns `None` without an id.
#[must_use]
pub fn booking_from_upstream(microsite_id: &str, raw: &Value) -> Option<NewBooking> {
    let external_id = first_string(raw, BOOKING_ID_PATHS)?;
    let booking_reference = first_string(raw, BOOKING_REF_PATHS)
        .map(|r| BookingReference::parse(&r).map_or_else(|_| r.to_uppercase(), |p| p.to_string()))
        .unwrap_or_else(|| external_id.clone());
    let status = first_string(raw, &["status", "bookingStatus", "state"])
        .map_or(BookingStatus::Unknown, |s| BookingStatus::from_upstream(&s));
    let client_email = first_string(
        raw,
        &["contactPerson.email", "holder.email", "client.email", "customer.email", "email"],
    )
    .map(|e| e.to_lowercase());

    Some(NewBooking {
        booking_reference,
        external_id,
        microsite_id: microsite_id.to_owned(),
        agency_id: first_string(raw, &["agency.id", "agencyId", "user.agencyId"]),
        status,
        client_email,
        client_name: client_name(raw),
        destination: first_string(
            raw,
            &["destination.name", "destinationName", "destination", "destinations.0.name", "title"],
        ),
        start_date: date_at(raw, &["startDate", "departureDate", "fromDate", "checkIn"]),
        end_date: date_at(raw, &["endDate", "returnDate", "toDate", "checkOut"]),
        total_price: first_f64(
            raw,
            &["pricebreakdown.totalPrice.value", "totalPrice.value", "totalPrice", "price.amount"],
        ),
        currency: first_string(
            raw,
            &["pricebreakdown.totalPrice.currency", "totalPrice.currency", "currency", "price.currency"],
        ),
        accommodations: first_array(
            raw,
            &["hotelservice", "hotelServices", "accommodations", "hotels"],
        ),
        activities: first_array(raw, &["ticketservice", "activityServices", "activities", "tickets"]),
        transports: first_array(
            raw,
            &["transportservice", "transportServices", "transports", "flights"],
        ),
        vouchers: first_array(raw, &["vouchers", "voucherList"]),
        raw_data: raw.clone(),
    })
}

fn themes(raw: &Value) -> Vec<String> {
    ["themes", "themeList", "categories"]
        .iter()
        .find_map(|path| json_path(raw, path).and_then(Value::as_array))
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.trim().to_owned()),
                    other => first_string(other, &["name", "title", "code"]),
                })
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Map an upstream travel idea to a [`NewTravelIdea`]. Returns `None` without id or title.
#[must_use]
pub fn travel_idea_from_upstream(microsite_id: &str, raw: &Value) -> Option<NewTravelIdea> {
    let id = first_string(raw, &["id", "ideaId"])?;
    let title = first_string(raw, &["title", "name", "largeTitle"])?;
    Some(NewTravelIdea {
        id,
        microsite_id: microsite_id.to_owned(),
        title,
        destination: first_string(
            raw,
            &["destinations.0.name", "destination.name", "destination", "country"],
        ),
        themes: themes(raw),
        price_from: first_f64(raw, &["pricePerPerson.value", "price.value", "priceFrom", "minPrice"]),
        currency: first_string(raw, &["pricePerPerson.currency", "price.currency", "currency"]),
        image_url: first_string(raw, &["imageUrl", "image.url", "images.0.url"]),
        description: first_string(raw, &["description", "shortDescription", "remarks"]),
        raw_data: raw.clone(),
    })
}
