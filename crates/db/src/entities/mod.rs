//! Database entities.

pub mod category;
pub mod neighborhood;
pub mod official;
pub mod official_area;
pub mod request;
pub mod user;

pub use category::Entity as Category;
pub use neighborhood::Entity as Neighborhood;
pub use official::Entity as Official;
pub use official_area::Entity as OfficialArea;
pub use request::Entity as Request;
pub use user::Entity as User;
