//! Official profiles and rankings.

use cidadao_common::AppResult;
use cidadao_db::repositories::OfficialRepository;

use super::stats::{GlobalStats, OfficialProfile, StatsService};

/// Official service.
#[derive(Clone)]
pub struct OfficialService {
    official_repo: OfficialRepository,
    stats: StatsService,
}

impl OfficialService {
    /// Create a new official service.
    #[must_use]
    pub const fn new(official_repo: OfficialRepository, stats: StatsService) -> Self {
        Self {
            official_repo,
            stats,
        }
    }

    /// Every official with statistics, best resolution rate first.
    pub async fn ranking(&self) -> AppResult<Vec<OfficialProfile>> {
        let officials = self.official_repo.find_all().await?;
        self.stats.ranking(officials).await
    }

    /// A single official with statistics.
    pub async fn profile(&self, id: i32) -> AppResult<OfficialProfile> {
        let official = self.official_repo.get_by_id(id).await?;
        let stats = self.stats.for_official(official.id).await?;
        Ok(OfficialProfile { official, stats })
    }

    /// The profile of the official linked to a user account, if any.
    pub async fn profile_for_user(&self, user_id: i32) -> AppResult<Option<OfficialProfile>> {
        let Some(official) = self.official_repo.find_by_user_id(user_id).await? else {
            return Ok(None);
        };
        let stats = self.stats.for_official(official.id).await?;
        Ok(Some(OfficialProfile { official, stats }))
    }

    /// Statistics across all claimed requests.
    pub async fn global_stats(&self) -> AppResult<GlobalStats> {
        self.stats.global().await
    }
}
