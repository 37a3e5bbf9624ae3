//! Domain types and glue logic for the Bazaar classifieds marketplace.
//!
//! Everything here is transport-agnostic: wire DTOs, the category
//! catalogue, role checks, listing filters and form validation. The HTTP
//! side lives in `bazaar-client`.

pub mod categories;
pub mod error;
pub mod filters;
pub mod roles;
pub mod types;
pub mod validation;
