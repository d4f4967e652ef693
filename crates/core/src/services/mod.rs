//! Business logic services.

#![allow(missing_docs)]

pub mod auth;
pub mod catalog;
pub mod official;
pub mod request;
pub mod seed;
pub mod stats;
pub mod upload;

pub use auth::{AuthService, LoginInput, RegisterInput, Session, TokenClaims};
pub use catalog::CatalogService;
pub use official::OfficialService;
pub use request::{
    CreateRequestInput, RequestQuery, RequestService, RequestView, UpdateRequestInput,
};
pub use seed::{SeedService, SeedSummary};
pub use stats::{CategoryCount, GlobalStats, OfficialProfile, OfficialStats, StatsService};
pub use upload::UploadService;
