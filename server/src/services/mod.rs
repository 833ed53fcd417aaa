//! Relay services used by the websocket route.
//!
//! ARCHITECTURE
//! ============
//! Service modules own registry mutation so the route handler can stay
//! focused on protocol translation.

pub mod room;
