//! Request-level constraints applied to an incoming car payload.
//!
//! These are deliberately independent of [`Car::is_valid_for_comparison`]:
//! the year ceiling here is a fixed 2030 while the business rule uses the
//! current calendar year.

use std::ops::RangeInclusive;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::car::{
    average_service_price_bounds, engine_volume_bounds, fuel_consumption_bounds, price_bounds,
    Car, MAX_MILEAGE, MAX_TRUNK_SIZE, MIN_MANUFACTURING_YEAR, MIN_MILEAGE, MIN_TRUNK_SIZE,
};

pub const MAX_MODEL_LENGTH: usize = 100;
pub const MAX_ACCEPTED_YEAR: i32 = 2030;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

struct DecimalRule {
    field: &'static str,
    required: &'static str,
    bounds: RangeInclusive<Decimal>,
    below_min: &'static str,
    above_max: &'static str,
    integer_digits: u32,
    fraction_digits: u32,
    too_many_digits: &'static str,
}

struct IntegerRule {
    field: &'static str,
    required: &'static str,
    bounds: RangeInclusive<i32>,
    below_min: &'static str,
    above_max: &'static str,
}

/// Collects every violation in field declaration order.
pub fn validate_fields(car: &Car) -> Result<(), Vec<FieldViolation>> {
    let mut violations = Vec::new();

    validate_model(car.model.as_deref(), &mut violations);

    validate_integer(
        car.manufacturing_year,
        &IntegerRule {
            field: "manufacturingYear",
            required: "Manufacturing year is required",
            bounds: MIN_MANUFACTURING_YEAR..=MAX_ACCEPTED_YEAR,
            below_min: "Manufacturing year must be at least 1900",
            above_max: "Manufacturing year cannot be in the future",
        },
        &mut violations,
    );

    validate_decimal(
        car.engine_volume,
        &DecimalRule {
            field: "engineVolume",
            required: "Engine volume is required",
            bounds: engine_volume_bounds(),
            below_min: "Engine volume must be at least 0.5L",
            above_max: "Engine volume cannot exceed 10.0L",
            integer_digits: 2,
            fraction_digits: 1,
            too_many_digits: "Engine volume must have at most 2 digits before decimal and 1 after",
        },
        &mut violations,
    );

    if car.body_type.is_none() {
        violations.push(FieldViolation::new("bodyType", "Body type is required"));
    }
    if car.fuel_type.is_none() {
        violations.push(FieldViolation::new("fuelType", "Fuel type is required"));
    }

    validate_integer(
        car.trunk_size,
        &IntegerRule {
            field: "trunkSize",
            required: "Trunk size is required",
            bounds: MIN_TRUNK_SIZE..=MAX_TRUNK_SIZE,
            below_min: "Trunk size must be at least 100L",
            above_max: "Trunk size cannot exceed 3000L",
        },
        &mut violations,
    );

    validate_decimal(
        car.fuel_consumption,
        &DecimalRule {
            field: "fuelConsumption",
            required: "Fuel consumption is required",
            bounds: fuel_consumption_bounds(),
            below_min: "Fuel consumption must be at least 1.0L/100km",
            above_max: "Fuel consumption cannot exceed 30.0L/100km",
            integer_digits: 2,
            fraction_digits: 1,
            too_many_digits:
                "Fuel consumption must have at most 2 digits before decimal and 1 after",
        },
        &mut violations,
    );
    validate_decimal(
        car.average_service_price,
        &DecimalRule {
            field: "averageServicePrice",
            required: "Average service price is required",
            bounds: average_service_price_bounds(),
            below_min: "Average service price cannot be negative",
            above_max: "Average service price cannot exceed 10000 EUR",
            integer_digits: 5,
            fraction_digits: 2,
            too_many_digits:
                "Average service price must have at most 5 digits before decimal and 2 after",
        },
        &mut violations,
    );
    validate_decimal(
        car.price,
        &DecimalRule {
            field: "price",
            required: "Car price is required",
            bounds: price_bounds(),
            below_min: "Car price must be at least 100 EUR",
            above_max: "Car price cannot exceed 1000000 EUR",
            integer_digits: 7,
            fraction_digits: 2,
            too_many_digits: "Car price must have at most 7 digits before decimal and 2 after",
        },
        &mut violations,
    );

    validate_integer(
        car.mileage,
        &IntegerRule {
            field: "mileage",
            required: "Mileage is required",
            bounds: MIN_MILEAGE..=MAX_MILEAGE,
            below_min: "Mileage cannot be negative",
            above_max: "Mileage cannot exceed 1000000 km",
        },
        &mut violations,
    );

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// An absent model only reports "required". A present one is also checked
/// for length and charset, so `""` fails all three while whitespace-only
/// text fails just the first.
fn validate_model(model: Option<&str>, violations: &mut Vec<FieldViolation>) {
    let Some(model) = model else {
        violations.push(FieldViolation::new("model", "Car model is required"));
        return;
    };

    if model.trim().is_empty() {
        violations.push(FieldViolation::new("model", "Car model is required"));
    }

    let length = model.encode_utf16().count();
    if !(1..=MAX_MODEL_LENGTH).contains(&length) {
        violations.push(FieldViolation::new(
            "model",
            "Car model must be between 1 and 100 characters",
        ));
    }
    if model.is_empty() || !model.chars().all(is_model_char) {
        violations.push(FieldViolation::new(
            "model",
            "Car model can only contain letters, numbers, spaces, and hyphens",
        ));
    }
}

fn is_model_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

fn validate_integer(value: Option<i32>, rule: &IntegerRule, violations: &mut Vec<FieldViolation>) {
    match value {
        None => violations.push(FieldViolation::new(rule.field, rule.required)),
        Some(value) if value < *rule.bounds.start() => {
            violations.push(FieldViolation::new(rule.field, rule.below_min))
        }
        Some(value) if value > *rule.bounds.end() => {
            violations.push(FieldViolation::new(rule.field, rule.above_max))
        }
        Some(_) => {}
    }
}

fn validate_decimal(
    value: Option<Decimal>,
    rule: &DecimalRule,
    violations: &mut Vec<FieldViolation>,
) {
    let Some(value) = value else {
        violations.push(FieldViolation::new(rule.field, rule.required));
        return;
    };

    if value < *rule.bounds.start() {
        violations.push(FieldViolation::new(rule.field, rule.below_min));
    } else if value > *rule.bounds.end() {
        violations.push(FieldViolation::new(rule.field, rule.above_max));
    }

    let (integer, fraction) = digit_counts(value);
    if integer > rule.integer_digits || fraction > rule.fraction_digits {
        violations.push(FieldViolation::new(rule.field, rule.too_many_digits));
    }
}

/// Integer and fraction digit counts after dropping trailing zeros. A zero
/// integer part counts as no integer digits.
fn digit_counts(value: Decimal) -> (u32, u32) {
    let normalized = value.normalize();
    let fraction = normalized.scale();
    let mut whole = normalized.abs().trunc();
    let mut integer = 0;
    while whole >= Decimal::ONE {
        whole = (whole / Decimal::TEN).trunc();
        integer += 1;
    }
    (integer, fraction)
}
