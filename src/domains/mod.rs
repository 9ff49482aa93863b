//! Domains module containing business logic organized by bounded contexts.
//!
//! The server exposes a single domain: logistics query tools relayed to the
//! kuaidi100 API.

pub mod tools;
