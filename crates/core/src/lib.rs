//! Core types and helpers for tripdesk
//!
//! This crate contains domain types shared across all other crates.

mod booking;
pub mod constants;
pub mod env_config;
mod error;
mod feature_request;
pub mod json_utils;
mod microsite;
mod text;
mod travel_idea;
mod user;

pub use booking::*;
pub use constants::*;
pub use env_config::{env_non_empty, env_or, env_parse_with_default};
pub use error::*;
pub use feature_request::*;
pub use json_utils::strip_markdown_json;
pub use microsite::*;
pub use text::truncate;
pub use travel_idea::*;
pub use user::*;
