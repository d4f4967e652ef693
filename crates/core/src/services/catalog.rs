//! Reference data: categories and neighborhoods.

use cidadao_common::AppResult;
use cidadao_db::{
    entities::{category, neighborhood},
    repositories::{CategoryRepository, NeighborhoodRepository},
};

/// Catalog service.
#[derive(Clone)]
pub struct CatalogService {
    category_repo: CategoryRepository,
    neighborhood_repo: NeighborhoodRepository,
}

impl CatalogService {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(
        category_repo: CategoryRepository,
        neighborhood_repo: NeighborhoodRepository,
    ) -> Self {
        Self {
            category_repo,
            neighborhood_repo,
        }
    }

    /// All categories.
    pub async fn categories(&self) -> AppResult<Vec<category::Model>> {
        self.category_repo.find_all().await
    }

    /// All neighborhoods.
    pub async fn neighborhoods(&self) -> AppResult<Vec<neighborhood::Model>> {
        self.neighborhood_repo.find_all().await
    }
}
