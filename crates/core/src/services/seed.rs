//! Demonstration data for empty databases.

use chrono::{Duration, Utc};
use cidadao_common::{AppError, AppResult};
use cidadao_db::{
    entities::{
        category, official,
        request::{self, RequestStatus, encode_photos},
        user::{self, UserRole},
    },
    repositories::{
        CategoryRepository, NeighborhoodRepository, OfficialRepository, RequestRepository,
        UserRepository,
    },
};
use sea_orm::{DatabaseTransaction, Set, prelude::DateTimeWithTimeZone};
use tracing::info;

use super::auth::hash_password;

/// Password shared by every demonstration account.
pub const DEMO_PASSWORD: &str = "senha123";

const CATEGORIES: &[(&str, &str)] = &[
    ("Pavimentação", "road"),
    ("Iluminação", "lightbulb"),
    ("Saúde", "heart"),
    ("Educação", "book"),
    ("Saneamento", "droplet"),
    ("Segurança", "shield"),
    ("Transporte", "bus"),
    ("Meio Ambiente", "tree"),
];

const NEIGHBORHOODS: &[&str] = &[
    "Centro",
    "Zona Norte",
    "Zona Sul",
    "Zona Leste",
    "Zona Oeste",
    "Periferia",
];

/// (email, name, phone)
const CITIZENS: &[(&str, &str, &str)] = &[
    ("joao@email.com", "João Silva", "(11) 98765-4321"),
    ("maria@email.com", "Maria Santos", "(11) 98765-1234"),
];

/// (email, name, party)
const OFFICIALS: &[(&str, &str, &str)] = &[
    ("carlos.lima@camara.gov.br", "Carlos Lima", "PSDB"),
    ("maria.oliveira@camara.gov.br", "Maria Oliveira", "PT"),
    ("joao.santos@camara.gov.br", "João Santos", "PMDB"),
];

const OFFICIAL_PHONE: &str = "(11) 3000-0000";
const PLACEHOLDER_PHOTO: &str = "/placeholder.svg?height=300&width=400";
const PLACEHOLDER_PORTRAIT: &str = "/placeholder.svg?height=100&width=100";

/// Rows written by a seeding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub neighborhoods: usize,
    pub users: usize,
    pub officials: usize,
    pub requests: usize,
}

/// A demonstration request. Indices point into the seeded rows.
#[derive(Debug, Clone)]
struct DemoRequest {
    title: String,
    category: usize,
    description: String,
    address: String,
    neighborhood: usize,
    postal_code: Option<&'static str>,
    coordinates: Option<(f64, f64)>,
    photos: Vec<String>,
    status: RequestStatus,
    anonymous: bool,
    citizen: usize,
    official: Option<usize>,
    age_days: i64,
    resolution_time_days: Option<i32>,
}

fn demo_requests() -> Vec<DemoRequest> {
    let mut requests = vec![
        DemoRequest {
            title: "Buraco na Rua das Flores".to_string(),
            category: 0,
            description: "Grande buraco na via principal causando acidentes".to_string(),
            address: "Rua das Flores, 123".to_string(),
            neighborhood: 0,
            postal_code: Some("01234-567"),
            coordinates: Some((-23.5505, -46.6333)),
            photos: vec![PLACEHOLDER_PHOTO.to_string()],
            status: RequestStatus::Open,
            anonymous: false,
            citizen: 0,
            official: None,
            age_days: 23,
            resolution_time_days: None,
        },
        DemoRequest {
            title: "Iluminação deficiente na Praça Central".to_string(),
            category: 1,
            description: "Várias lâmpadas queimadas comprometem a segurança".to_string(),
            address: "Praça Central".to_string(),
            neighborhood: 0,
            postal_code: Some("01234-567"),
            coordinates: Some((-23.5515, -46.6343)),
            photos: vec![PLACEHOLDER_PHOTO.to_string()],
            status: RequestStatus::InProgress,
            anonymous: false,
            citizen: 1,
            official: Some(2),
            age_days: 45,
            resolution_time_days: None,
        },
        DemoRequest {
            title: "Falta de médicos no posto de saúde".to_string(),
            category: 2,
            description: "Posto de saúde do bairro está sem médicos há semanas".to_string(),
            address: "Rua da Saúde, 456".to_string(),
            neighborhood: 1,
            postal_code: Some("02345-678"),
            coordinates: Some((-23.5525, -46.6353)),
            photos: vec![],
            status: RequestStatus::Resolved,
            anonymous: false,
            citizen: 0,
            official: Some(1),
            age_days: 30,
            resolution_time_days: Some(10),
        },
    ];

    let statuses = [
        RequestStatus::Open,
        RequestStatus::InProgress,
        RequestStatus::Resolved,
    ];

    for i in 0..20_usize {
        let number = i + 4;
        let status = statuses[i % 3];
        requests.push(DemoRequest {
            title: format!("Solicitação #{number}"),
            category: i % CATEGORIES.len(),
            description: format!("Descrição da solicitação {number}"),
            address: format!("Rua Exemplo, {}", i + 100),
            neighborhood: i % NEIGHBORHOODS.len(),
            postal_code: None,
            coordinates: None,
            photos: vec![],
            status,
            anonymous: i % 3 == 0,
            citizen: i % 2,
            official: (i % 2 == 0).then_some(i % OFFICIALS.len()),
            age_days: 60 - i as i64,
            resolution_time_days: (status == RequestStatus::Resolved).then_some(10 + i as i32),
        });
    }

    requests
}

fn pick(ids: &[i32], index: usize, what: &str) -> AppResult<i32> {
    ids.get(index)
        .copied()
        .ok_or_else(|| AppError::Internal(format!("Seed {what} index {index} out of range")))
}

/// Seed service.
#[derive(Clone)]
pub struct SeedService {
    category_repo: CategoryRepository,
    neighborhood_repo: NeighborhoodRepository,
    user_repo: UserRepository,
    official_repo: OfficialRepository,
    request_repo: RequestRepository,
}

impl SeedService {
    /// Create a new seed service.
    #[must_use]
    pub const fn new(
        category_repo: CategoryRepository,
        neighborhood_repo: NeighborhoodRepository,
        user_repo: UserRepository,
        official_repo: OfficialRepository,
        request_repo: RequestRepository,
    ) -> Self {
        Self {
            category_repo,
            neighborhood_repo,
            user_repo,
            official_repo,
            request_repo,
        }
    }

    /// Populate the database unless it already holds categories.
    ///
    /// Everything is written in one transaction.
    pub async fn seed(&self) -> AppResult<Option<SeedSummary>> {
        let txn = self.request_repo.begin().await?;

        if self.category_repo.count(&txn).await? > 0 {
            info!("Database already has data, skipping seed");
            return Ok(None);
        }

        let password_hash = hash_password(DEMO_PASSWORD)?;
        let now = Utc::now();

        let mut categories = Vec::with_capacity(CATEGORIES.len());
        for (name, icon) in CATEGORIES {
            let model = category::ActiveModel {
                name: Set((*name).to_string()),
                icon: Set(Some((*icon).to_string())),
                ..Default::default()
            };
            categories.push(self.category_repo.create(&txn, model).await?);
        }

        let mut neighborhoods = Vec::with_capacity(NEIGHBORHOODS.len());
        for name in NEIGHBORHOODS {
            neighborhoods.push(self.neighborhood_repo.get_or_create(&txn, name).await?);
        }

        let mut citizens = Vec::with_capacity(CITIZENS.len());
        for (email, name, phone) in CITIZENS {
            let user = self
                .create_user(&txn, email, name, UserRole::Citizen, phone, &password_hash)
                .await?;
            citizens.push(user);
        }

        let mut officials = Vec::with_capacity(OFFICIALS.len());
        for (email, name, party) in OFFICIALS {
            let user = self
                .create_user(
                    &txn,
                    email,
                    name,
                    UserRole::Official,
                    OFFICIAL_PHONE,
                    &password_hash,
                )
                .await?;

            let model = official::ActiveModel {
                user_id: Set(Some(user.id)),
                name: Set((*name).to_string()),
                party: Set((*party).to_string()),
                photo_url: Set(Some(PLACEHOLDER_PORTRAIT.to_string())),
                created_at: Set(now.into()),
                ..Default::default()
            };
            officials.push(self.official_repo.create(&txn, model).await?);
        }

        let category_ids: Vec<i32> = categories.iter().map(|c| c.id).collect();
        let neighborhood_ids: Vec<i32> = neighborhoods.iter().map(|n| n.id).collect();
        let citizen_ids: Vec<i32> = citizens.iter().map(|u| u.id).collect();
        let official_ids: Vec<i32> = officials.iter().map(|o| o.id).collect();

        let demo = demo_requests();
        for item in &demo {
            let created_at: DateTimeWithTimeZone = (now - Duration::days(item.age_days)).into();
            let updated_at = match item.resolution_time_days {
                Some(days) => created_at + Duration::days(i64::from(days)),
                None => created_at,
            };
            let official_id = match item.official {
                Some(index) => Some(pick(&official_ids, index, "official")?),
                None => None,
            };

            let model = request::ActiveModel {
                title: Set(item.title.clone()),
                category_id: Set(pick(&category_ids, item.category, "category")?),
                description: Set(item.description.clone()),
                address: Set(Some(item.address.clone())),
                neighborhood_id: Set(Some(pick(
                    &neighborhood_ids,
                    item.neighborhood,
                    "neighborhood",
                )?)),
                postal_code: Set(item.postal_code.map(str::to_string)),
                latitude: Set(item.coordinates.map(|(lat, _)| lat)),
                longitude: Set(item.coordinates.map(|(_, lon)| lon)),
                photos: Set(Some(encode_photos(&item.photos))),
                status: Set(item.status),
                anonymous: Set(item.anonymous),
                user_id: Set(pick(&citizen_ids, item.citizen, "citizen")?),
                official_id: Set(official_id),
                created_at: Set(created_at),
                updated_at: Set(updated_at),
                resolution_time_days: Set(item.resolution_time_days),
                ..Default::default()
            };
            self.request_repo.create(&txn, model).await?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let summary = SeedSummary {
            categories: categories.len(),
            neighborhoods: neighborhoods.len(),
            users: citizens.len() + officials.len(),
            officials: officials.len(),
            requests: demo.len(),
        };
        info!(?summary, "Seeded demonstration data");

        Ok(Some(summary))
    }

    async fn create_user(
        &self,
        txn: &DatabaseTransaction,
        email: &str,
        name: &str,
        role: UserRole,
        phone: &str,
        password_hash: &str,
    ) -> AppResult<user::Model> {
        let model = user::ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            name: Set(name.to_string()),
            role: Set(role),
            phone: Set(Some(phone.to_string())),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };
        self.user_repo.create(txn, model).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[test]
    fn test_demo_requests_reference_seeded_rows() {
        let requests = demo_requests();

        assert_eq!(requests.len(), 23);
        for item in &requests {
            assert!(item.category < CATEGORIES.len());
            assert!(item.neighborhood < NEIGHBORHOODS.len());
            assert!(item.citizen < CITIZENS.len());
            assert!(item.official.is_none_or(|o| o < OFFICIALS.len()));
        }
    }

    #[test]
    fn test_only_resolved_demo_requests_have_resolution_time() {
        for item in demo_requests() {
            assert_eq!(
                item.resolution_time_days.is_some(),
                item.status == RequestStatus::Resolved,
                "{}",
                item.title
            );
            // Resolution never lies in the future.
            if let Some(days) = item.resolution_time_days {
                assert!(i64::from(days) <= item.age_days);
            }
        }
    }

    #[tokio::test]
    async fn test_seed_skipped_when_categories_exist() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(8)),
                }]])
                .into_connection(),
        );

        let service = SeedService::new(
            CategoryRepository::new(Arc::clone(&db)),
            NeighborhoodRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
            OfficialRepository::new(Arc::clone(&db)),
            RequestRepository::new(Arc::clone(&db)),
        );

        assert!(service.seed().await.unwrap().is_none());
    }
}
