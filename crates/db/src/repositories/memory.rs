use std::cmp::Ordering;
use std::collections::BTreeMap;

use tokio::sync::RwLock;

use comparcar_core::domain::car::{Car, CarId};
use comparcar_core::domain::filter::{Page, PageRequest, Sort, SortDirection};
use comparcar_core::query::{field_value, Condition};

use super::{CarRepository, RepositoryError};

#[derive(Default)]
struct Store {
    cars: BTreeMap<i64, Car>,
    last_id: i64,
}

#[derive(Default)]
pub struct InMemoryCarRepository {
    store: RwLock<Store>,
}

#[async_trait::async_trait]
impl CarRepository for InMemoryCarRepository {
    async fn find_by_id(&self, id: CarId) -> Result<Option<Car>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store.cars.get(&id.0).cloned())
    }

    async fn exists_by_id(&self, id: CarId) -> Result<bool, RepositoryError> {
        let store = self.store.read().await;
        Ok(store.cars.contains_key(&id.0))
    }

    async fn save(&self, mut car: Car) -> Result<Car, RepositoryError> {
        let mut store = self.store.write().await;
        let id = match car.id {
            Some(id) => {
                store.last_id = store.last_id.max(id.0);
                id
            }
            None => {
                store.last_id += 1;
                CarId(store.last_id)
            }
        };
        car.id = Some(id);
        store.cars.insert(id.0, car.clone());
        Ok(car)
    }

    async fn delete_by_id(&self, id: CarId) -> Result<bool, RepositoryError> {
        let mut store = self.store.write().await;
        Ok(store.cars.remove(&id.0).is_some())
    }

    async fn find_page(
        &self,
        conditions: &[Condition],
        page: PageRequest,
        sort: Sort,
    ) -> Result<Page<Car>, RepositoryError> {
        let store = self.store.read().await;
        let mut matching: Vec<Car> = store
            .cars
            .values()
            .filter(|car| conditions.iter().all(|condition| condition.matches(car)))
            .cloned()
            .collect();
        drop(store);

        matching.sort_by(|left, right| compare_cars(left, right, sort));

        let total = matching.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let content =
            matching.into_iter().skip(offset).take(page.size as usize).collect::<Vec<_>>();

        Ok(Page::new(content, page, total))
    }

    async fn find_all(&self) -> Result<Vec<Car>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store.cars.values().cloned().collect())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let store = self.store.read().await;
        Ok(store.cars.len() as u64)
    }
}

/// Missing values sort first ascending, matching sqlite's NULL ordering.
fn compare_cars(left: &Car, right: &Car, sort: Sort) -> Ordering {
    let primary = match (field_value(left, sort.field), field_value(right, sort.field)) {
        (Some(a), Some(b)) => a.compare(&b).unwrap_or(Ordering::Equal),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    let primary = match sort.direction {
        SortDirection::Asc => primary,
        SortDirection::Desc => primary.reverse(),
    };
    primary.then_with(|| left.id.cmp(&right.id))
}
