//! Outbound adapters: persistence and the external identity provider.

pub mod google;
pub mod persistence;
