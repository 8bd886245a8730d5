#![allow(clippy::single_call_fn, reason = "HTTP handlers are called once from router")]

pub mod bookings;
pub mod chat;
pub mod dashboard;
pub mod features;
pub mod ideas;
pub mod microsites;
pub mod users;
