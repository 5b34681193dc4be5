//! # lostfound-client
//!
//! Typed client and listing pipeline for a lost-and-found reporting REST
//! service.
//!
//! The crate owns everything between the service and a rendered view: filter
//! reduction, debounced search, response normalization, client-side sorting,
//! out-of-order response protection, history diffing and admin pagination.
//! The service itself, its authentication and its image storage are remote
//! collaborators.
//!
//! ## Architecture
//!
//! ```text
//! lostfound CLI (main.rs)
//!     │
//!     ├── ListingDriver / Debouncer (service/)
//!     ├── ListingService, AdminService, history views (service/)
//!     │        │  generation tokens, ListingState (domain/)
//!     │        │
//!     │        └── ItemSource / ItemModerator / HistorySource seams
//!     │
//!     ├── ItemsApi, HistoryApi, ImageResolver (api/)
//!     │        └── normalization boundary (api/dto)
//!     │
//!     └── ApiClient (reqwest) ── REST service
//! ```

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
