//! Translation of a [`CarFilter`] into a flat conjunction of conditions.
//!
//! The condition list is storage-neutral: the sql gateway renders it with a
//! query builder and the in-memory gateway evaluates it with
//! [`Condition::matches`].

use std::cmp::Ordering;

use rust_decimal::Decimal;

use crate::domain::car::{BodyType, Car, FuelType};
use crate::domain::filter::CarFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CarField {
    Id,
    Model,
    ManufacturingYear,
    EngineVolume,
    BodyType,
    FuelType,
    TrunkSize,
    FuelConsumption,
    AverageServicePrice,
    Price,
    Mileage,
}

impl CarField {
    pub const ALL: [CarField; 11] = [
        Self::Id,
        Self::Model,
        Self::ManufacturingYear,
        Self::EngineVolume,
        Self::BodyType,
        Self::FuelType,
        Self::TrunkSize,
        Self::FuelConsumption,
        Self::AverageServicePrice,
        Self::Price,
        Self::Mileage,
    ];

    /// Column name in the `cars` table.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Model => "model",
            Self::ManufacturingYear => "manufacturing_year",
            Self::EngineVolume => "engine_volume",
            Self::BodyType => "body_type",
            Self::FuelType => "fuel_type",
            Self::TrunkSize => "trunk_size",
            Self::FuelConsumption => "fuel_consumption",
            Self::AverageServicePrice => "average_service_price",
            Self::Price => "price",
            Self::Mileage => "mileage",
        }
    }

    /// Name used in JSON payloads and the `sortBy` parameter.
    pub fn api_name(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Model => "model",
            Self::ManufacturingYear => "manufacturingYear",
            Self::EngineVolume => "engineVolume",
            Self::BodyType => "bodyType",
            Self::FuelType => "fuelType",
            Self::TrunkSize => "trunkSize",
            Self::FuelConsumption => "fuelConsumption",
            Self::AverageServicePrice => "averageServicePrice",
            Self::Price => "price",
            Self::Mileage => "mileage",
        }
    }

    pub fn from_api_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.api_name() == name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    /// Case-insensitive substring match.
    Contains,
    Gte,
    Lte,
    Eq,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConditionValue {
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    BodyType(BodyType),
    FuelType(FuelType),
}

impl ConditionValue {
    /// Orders two values of the same kind; mixed kinds are incomparable.
    pub fn compare(&self, other: &ConditionValue) -> Option<Ordering> {
        match (self, other) {
            (Self::Text(left), Self::Text(right)) => Some(left.cmp(right)),
            (Self::Integer(left), Self::Integer(right)) => Some(left.cmp(right)),
            (Self::Decimal(left), Self::Decimal(right)) => Some(left.cmp(right)),
            (Self::BodyType(left), Self::BodyType(right)) => {
                Some(left.as_str().cmp(right.as_str()))
            }
            (Self::FuelType(left), Self::FuelType(right)) => {
                Some(left.as_str().cmp(right.as_str()))
            }
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Condition {
    pub field: CarField,
    pub op: Operator,
    pub value: ConditionValue,
}

impl Condition {
    pub fn new(field: CarField, op: Operator, value: ConditionValue) -> Self {
        Self { field, op, value }
    }

    /// Evaluates the condition against a record. A missing field never matches.
    pub fn matches(&self, car: &Car) -> bool {
        let Some(actual) = field_value(car, self.field) else {
            return false;
        };

        match self.op {
            Operator::Contains => match (&actual, &self.value) {
                (ConditionValue::Text(haystack), ConditionValue::Text(needle)) => {
                    haystack.to_lowercase().contains(&needle.to_lowercase())
                }
                _ => false,
            },
            Operator::Gte => actual.compare(&self.value).is_some_and(Ordering::is_ge),
            Operator::Lte => actual.compare(&self.value).is_some_and(Ordering::is_le),
            Operator::Eq => actual.compare(&self.value) == Some(Ordering::Equal),
        }
    }
}

pub fn field_value(car: &Car, field: CarField) -> Option<ConditionValue> {
    match field {
        CarField::Id => car.id.map(|id| ConditionValue::Integer(id.0)),
        CarField::Model => car.model.clone().map(ConditionValue::Text),
        CarField::ManufacturingYear => car.manufacturing_year.map(integer),
        CarField::EngineVolume => car.engine_volume.map(ConditionValue::Decimal),
        CarField::BodyType => car.body_type.map(ConditionValue::BodyType),
        CarField::FuelType => car.fuel_type.map(ConditionValue::FuelType),
        CarField::TrunkSize => car.trunk_size.map(integer),
        CarField::FuelConsumption => car.fuel_consumption.map(ConditionValue::Decimal),
        CarField::AverageServicePrice => car.average_service_price.map(ConditionValue::Decimal),
        CarField::Price => car.price.map(ConditionValue::Decimal),
        CarField::Mileage => car.mileage.map(integer),
    }
}

fn integer(value: i32) -> ConditionValue {
    ConditionValue::Integer(i64::from(value))
}

/// Builds one condition per populated filter field. An empty list matches
/// every record.
pub fn translate(filter: &CarFilter) -> Vec<Condition> {
    let mut conditions = Vec::new();

    // Blankness is judged on the trimmed text; the needle keeps its padding.
    if let Some(model) = filter.model.as_deref().filter(|model| !model.trim().is_empty()) {
        conditions.push(Condition::new(
            CarField::Model,
            Operator::Contains,
            ConditionValue::Text(model.to_lowercase()),
        ));
    }

    push_range(
        &mut conditions,
        CarField::ManufacturingYear,
        filter.manufacturing_year_from.map(integer),
        filter.manufacturing_year_to.map(integer),
    );
    push_range(
        &mut conditions,
        CarField::EngineVolume,
        filter.engine_volume_from.map(ConditionValue::Decimal),
        filter.engine_volume_to.map(ConditionValue::Decimal),
    );

    if let Some(body_type) = filter.body_type {
        conditions.push(Condition::new(
            CarField::BodyType,
            Operator::Eq,
            ConditionValue::BodyType(body_type),
        ));
    }
    if let Some(fuel_type) = filter.fuel_type {
        conditions.push(Condition::new(
            CarField::FuelType,
            Operator::Eq,
            ConditionValue::FuelType(fuel_type),
        ));
    }

    push_range(
        &mut conditions,
        CarField::TrunkSize,
        filter.trunk_size_from.map(integer),
        filter.trunk_size_to.map(integer),
    );
    push_range(
        &mut conditions,
        CarField::FuelConsumption,
        filter.fuel_consumption_from.map(ConditionValue::Decimal),
        filter.fuel_consumption_to.map(ConditionValue::Decimal),
    );
    push_range(
        &mut conditions,
        CarField::AverageServicePrice,
        filter.average_service_price_from.map(ConditionValue::Decimal),
        filter.average_service_price_to.map(ConditionValue::Decimal),
    );
    push_range(
        &mut conditions,
        CarField::Price,
        filter.price_from.map(ConditionValue::Decimal),
        filter.price_to.map(ConditionValue::Decimal),
    );
    push_range(
        &mut conditions,
        CarField::Mileage,
        filter.mileage_from.map(integer),
        filter.mileage_to.map(integer),
    );

    conditions
}

fn push_range(
    conditions: &mut Vec<Condition>,
    field: CarField,
    from: Option<ConditionValue>,
    to: Option<ConditionValue>,
) {
    if let Some(value) = from {
        conditions.push(Condition::new(field, Operator::Gte, value));
    }
    if let Some(value) = to {
        conditions.push(Condition::new(field, Operator::Lte, value));
    }
}

/// Escapes LIKE wildcards so a needle matches literally under `ESCAPE '\'`.
pub fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
