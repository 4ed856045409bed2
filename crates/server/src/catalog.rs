use std::sync::Arc;

use comparcar_core::domain::car::{Car, CarId, CarInsights};
use comparcar_core::domain::filter::{CarFilter, Page};
use comparcar_core::errors::{ApplicationError, DomainError};
use comparcar_core::query::translate;
use comparcar_core::validation::validate_fields;
use comparcar_db::repositories::CarRepository;
use tracing::{info, warn};

/// Orchestrates validation, filtering and persistence for catalog records.
pub struct CatalogService {
    repository: Arc<dyn CarRepository>,
}

impl CatalogService {
    pub fn new(repository: Arc<dyn CarRepository>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, car: Car) -> Result<Car, ApplicationError> {
        ensure_acceptable(&car, None)?;

        let saved = self.repository.save(Car { id: None, ..car }).await?;
        info!(
            event_name = "catalog.car.created",
            car_id = saved.id.map(|id| id.0),
            model = saved.model.as_deref().unwrap_or_default(),
            "car added to catalog"
        );
        Ok(saved)
    }

    pub async fn get_by_id(&self, id: CarId) -> Result<Option<Car>, ApplicationError> {
        let car = self.repository.find_by_id(id).await?;
        info!(
            event_name = "catalog.car.fetched",
            car_id = id.0,
            found = car.is_some(),
            "car lookup completed"
        );
        Ok(car)
    }

    /// Unknown ids fail with `NotFound` before the payload is inspected.
    pub async fn update(&self, id: CarId, car: Car) -> Result<Car, ApplicationError> {
        let Some(mut existing) = self.repository.find_by_id(id).await? else {
            return Err(ApplicationError::NotFound { id });
        };

        ensure_acceptable(&car, Some(id))?;

        existing.overwrite_attributes(car);
        let saved = self.repository.save(existing).await?;
        info!(event_name = "catalog.car.updated", car_id = id.0, "car updated");
        Ok(saved)
    }

    /// A concurrent delete of the same id leaves one caller with `NotFound`.
    pub async fn delete(&self, id: CarId) -> Result<(), ApplicationError> {
        if !self.repository.delete_by_id(id).await? {
            return Err(ApplicationError::NotFound { id });
        }

        info!(event_name = "catalog.car.deleted", car_id = id.0, "car removed from catalog");
        Ok(())
    }

    pub async fn list(&self, filter: &CarFilter) -> Result<Page<Car>, ApplicationError> {
        let page_request = filter.page_request()?;
        let sort = filter.sort()?;
        let conditions = translate(filter);

        let page = self.repository.find_page(&conditions, page_request, sort).await?;
        info!(
            event_name = "catalog.cars.listed",
            condition_count = conditions.len(),
            page = page.number,
            size = page.size,
            total_elements = page.total_elements,
            sort_by = sort.field.api_name(),
            sort_direction = sort.direction.as_str(),
            "car listing served"
        );
        Ok(page)
    }

    pub async fn list_all(&self) -> Result<Vec<Car>, ApplicationError> {
        let cars = self.repository.find_all().await?;
        info!(event_name = "catalog.cars.listed_all", count = cars.len(), "full catalog served");
        Ok(cars)
    }

    pub async fn insights(&self, id: CarId) -> Result<Option<CarInsights>, ApplicationError> {
        let car = self.repository.find_by_id(id).await?;
        Ok(car.map(|car| car.insights()))
    }
}

/// Request-level constraints first, then the catalog business rules.
fn ensure_acceptable(car: &Car, id: Option<CarId>) -> Result<(), DomainError> {
    if let Err(violations) = validate_fields(car) {
        warn!(
            event_name = "catalog.car.rejected",
            car_id = id.map(|id| id.0),
            violation_count = violations.len(),
            reason = "field_violations",
            "car payload rejected"
        );
        return Err(DomainError::FieldViolations(violations));
    }

    if !car.is_valid_for_comparison() {
        warn!(
            event_name = "catalog.car.rejected",
            car_id = id.map(|id| id.0),
            reason = "business_rules",
            "car payload rejected"
        );
        return Err(DomainError::InvalidCar);
    }

    Ok(())
}
