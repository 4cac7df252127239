//! Click-to-translate for game chat.
//!
//! Outbound chat packets are normalized to plain text, checked against the
//! configured patterns, stored, and rewritten with a hover hint and a click
//! command that asks for a translation. New players get a default language
//! picked from their location.

pub mod chat_type;
pub mod component;
pub mod config;
pub mod geolocation;
pub mod i18n;
pub mod interceptor;
pub mod onboarding;
pub mod packet;
pub mod pattern;
pub mod retry;
pub mod server;
pub mod store;
