pub mod config;
pub mod domain;
pub mod errors;
pub mod query;
pub mod validation;

pub use domain::car::{BodyType, Car, CarId, CarInsights, FuelType};
pub use domain::filter::{CarFilter, Page, PageRequest, Sort, SortDirection};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use query::{CarField, Condition, ConditionValue, Operator};
pub use validation::FieldViolation;
