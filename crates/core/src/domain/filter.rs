use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::car::{BodyType, FuelType};
use crate::errors::DomainError;
use crate::query::CarField;

pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Sparse search criteria for the catalog listing.
///
/// Absent fields impose no constraint. Range bounds are inclusive and
/// independent of each other.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CarFilter {
    pub model: Option<String>,
    pub manufacturing_year_from: Option<i32>,
    pub manufacturing_year_to: Option<i32>,
    pub engine_volume_from: Option<Decimal>,
    pub engine_volume_to: Option<Decimal>,
    pub body_type: Option<BodyType>,
    pub fuel_type: Option<FuelType>,
    pub trunk_size_from: Option<i32>,
    pub trunk_size_to: Option<i32>,
    pub fuel_consumption_from: Option<Decimal>,
    pub fuel_consumption_to: Option<Decimal>,
    pub average_service_price_from: Option<Decimal>,
    pub average_service_price_to: Option<Decimal>,
    pub price_from: Option<Decimal>,
    pub price_to: Option<Decimal>,
    pub mileage_from: Option<i32>,
    pub mileage_to: Option<i32>,
    pub page: i64,
    pub size: i64,
    pub sort_by: String,
    pub sort_direction: String,
}

impl Default for CarFilter {
    fn default() -> Self {
        Self {
            model: None,
            manufacturing_year_from: None,
            manufacturing_year_to: None,
            engine_volume_from: None,
            engine_volume_to: None,
            body_type: None,
            fuel_type: None,
            trunk_size_from: None,
            trunk_size_to: None,
            fuel_consumption_from: None,
            fuel_consumption_to: None,
            average_service_price_from: None,
            average_service_price_to: None,
            price_from: None,
            price_to: None,
            mileage_from: None,
            mileage_to: None,
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort_by: CarField::Id.api_name().to_owned(),
            sort_direction: SortDirection::Asc.as_str().to_owned(),
        }
    }
}

impl CarFilter {
    pub fn page_request(&self) -> Result<PageRequest, DomainError> {
        let page = u32::try_from(self.page).map_err(|_| {
            DomainError::InvalidQuery(format!("page must be zero or greater, got {}", self.page))
        })?;
        let size = u32::try_from(self.size)
            .ok()
            .filter(|size| *size > 0)
            .ok_or_else(|| {
                DomainError::InvalidQuery(format!("size must be one or greater, got {}", self.size))
            })?;

        Ok(PageRequest { page, size })
    }

    pub fn sort(&self) -> Result<Sort, DomainError> {
        let field = CarField::from_api_name(self.sort_by.trim()).ok_or_else(|| {
            DomainError::InvalidQuery(format!("unsupported sortBy value `{}`", self.sort_by))
        })?;
        let direction = SortDirection::parse(&self.sort_direction).ok_or_else(|| {
            DomainError::InvalidQuery(format!(
                "sortDirection must be ASC or DESC, got `{}`",
                self.sort_direction
            ))
        })?;

        Ok(Sort { field, direction })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 0, size: DEFAULT_PAGE_SIZE as u32 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            _ => None,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sort {
    pub field: CarField,
    pub direction: SortDirection,
}

impl Default for Sort {
    fn default() -> Self {
        Self { field: CarField::Id, direction: SortDirection::Asc }
    }
}

/// One page of results plus the metadata a paging client needs.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number_of_elements: usize,
    pub first: bool,
    pub last: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size.max(1));
        let total_pages = total_elements.div_ceil(size);
        let number = request.page;

        Self {
            number_of_elements: content.len(),
            content,
            number,
            size: request.size,
            total_elements,
            total_pages,
            first: number == 0,
            last: u64::from(number) + 1 >= total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CarFilter, Page, PageRequest, SortDirection};
    use crate::domain::car::BodyType;
    use crate::errors::DomainError;
    use crate::query::CarField;

    #[test]
    fn defaults_match_listing_contract() {
        let filter = CarFilter::default();

        assert_eq!(filter.page_request(), Ok(PageRequest { page: 0, size: 20 }));
        let sort = filter.sort().expect("default sort");
        assert_eq!(sort.field, CarField::Id);
        assert_eq!(sort.direction, SortDirection::Asc);
    }

    #[test]
    fn negative_page_is_rejected() {
        let filter = CarFilter { page: -1, ..CarFilter::default() };
        assert!(matches!(filter.page_request(), Err(DomainError::InvalidQuery(_))));
    }

    #[test]
    fn page_size_must_be_positive() {
        for size in [0, -5, i64::from(u32::MAX) + 1] {
            let filter = CarFilter { size, ..CarFilter::default() };
            assert!(
                matches!(filter.page_request(), Err(DomainError::InvalidQuery(_))),
                "size {size} should be rejected"
            );
        }
    }

    #[test]
    fn large_page_sizes_are_accepted() {
        let filter = CarFilter { size: 5000, page: 3, ..CarFilter::default() };
        let request = filter.page_request().expect("large size");

        assert_eq!(request, PageRequest { page: 3, size: 5000 });
        assert_eq!(request.offset(), 15_000);
    }

    #[test]
    fn sort_accepts_known_fields_and_any_case_direction() {
        let filter = CarFilter {
            sort_by: "averageServicePrice".to_owned(),
            sort_direction: "desc".to_owned(),
            ..CarFilter::default()
        };
        let sort = filter.sort().expect("valid sort");

        assert_eq!(sort.field, CarField::AverageServicePrice);
        assert_eq!(sort.direction, SortDirection::Desc);
    }

    #[test]
    fn sort_rejects_unknown_field_or_direction() {
        let unknown_field =
            CarFilter { sort_by: "color; DROP TABLE cars".to_owned(), ..CarFilter::default() };
        assert!(matches!(unknown_field.sort(), Err(DomainError::InvalidQuery(_))));

        let unknown_direction =
            CarFilter { sort_direction: "sideways".to_owned(), ..CarFilter::default() };
        assert!(matches!(unknown_direction.sort(), Err(DomainError::InvalidQuery(_))));
    }

    #[test]
    fn filter_deserializes_from_camel_case_json() {
        let filter: CarFilter = serde_json::from_value(serde_json::json!({
            "model": "golf",
            "priceFrom": 10000,
            "bodyType": "HATCHBACK",
            "size": 5
        }))
        .expect("deserialize filter");

        assert_eq!(filter.model.as_deref(), Some("golf"));
        assert_eq!(filter.price_from, Some(rust_decimal::Decimal::from(10_000)));
        assert_eq!(filter.body_type, Some(BodyType::Hatchback));
        assert_eq!(filter.size, 5);
        assert_eq!(filter.page, 0);
        assert_eq!(filter.sort_by, "id");
    }

    #[test]
    fn page_metadata_tracks_position() {
        let request = PageRequest { page: 1, size: 2 };
        let page = Page::new(vec!["c", "d"], request, 5);

        assert_eq!(page.total_pages, 3);
        assert_eq!(page.number_of_elements, 2);
        assert!(!page.first);
        assert!(!page.last);

        let final_page = Page::new(vec!["e"], PageRequest { page: 2, size: 2 }, 5);
        assert!(final_page.last);

        let empty = Page::<&str>::new(Vec::new(), PageRequest::default(), 0);
        assert_eq!(empty.total_pages, 0);
        assert!(empty.first);
        assert!(empty.last);
    }

    #[test]
    fn offset_multiplies_page_by_size() {
        assert_eq!(PageRequest { page: 3, size: 20 }.offset(), 60);
    }
}
