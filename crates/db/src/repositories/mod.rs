//! Repositories wrapping sea-orm queries.
//!
//! Reads go through the shared pool. Writes that must share a transaction take
//! the connection (usually a `DatabaseTransaction`) as an explicit argument.

pub mod category;
pub mod neighborhood;
pub mod official;
pub mod request;
pub mod user;

pub use category::CategoryRepository;
pub use neighborhood::NeighborhoodRepository;
pub use official::OfficialRepository;
pub use request::{ClaimedRequestRow, RequestFilter, RequestRepository};
pub use user::UserRepository;
