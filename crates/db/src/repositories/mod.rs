use async_trait::async_trait;
use thiserror::Error;

use comparcar_core::domain::car::{Car, CarId};
use comparcar_core::domain::filter::{Page, PageRequest, Sort};
use comparcar_core::errors::ApplicationError;
use comparcar_core::query::Condition;

pub mod car;
pub mod memory;

pub use car::SqlCarRepository;
pub use memory::InMemoryCarRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::Persistence(value.to_string())
    }
}

/// Record store for catalog entries keyed by [`CarId`].
#[async_trait]
pub trait CarRepository: Send + Sync {
    async fn find_by_id(&self, id: CarId) -> Result<Option<Car>, RepositoryError>;

    async fn exists_by_id(&self, id: CarId) -> Result<bool, RepositoryError>;

    /// Inserts when `car.id` is unset and assigns a fresh id; otherwise
    /// stores the record under its existing id.
    async fn save(&self, car: Car) -> Result<Car, RepositoryError>;

    /// Returns `false` when nothing was stored under `id`.
    async fn delete_by_id(&self, id: CarId) -> Result<bool, RepositoryError>;

    /// Records matching every condition, sorted by `sort` then by id.
    async fn find_page(
        &self,
        conditions: &[Condition],
        page: PageRequest,
        sort: Sort,
    ) -> Result<Page<Car>, RepositoryError>;

    /// Every stored record in id order.
    async fn find_all(&self) -> Result<Vec<Car>, RepositoryError>;

    async fn count(&self) -> Result<u64, RepositoryError>;
}
