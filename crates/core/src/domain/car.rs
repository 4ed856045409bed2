use std::fmt;
use std::ops::RangeInclusive;

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const MIN_MANUFACTURING_YEAR: i32 = 1900;
pub const MIN_TRUNK_SIZE: i32 = 100;
pub const MAX_TRUNK_SIZE: i32 = 3000;
pub const MIN_MILEAGE: i32 = 0;
pub const MAX_MILEAGE: i32 = 1_000_000;

pub fn engine_volume_bounds() -> RangeInclusive<Decimal> {
    Decimal::new(5, 1)..=Decimal::TEN
}

pub fn fuel_consumption_bounds() -> RangeInclusive<Decimal> {
    Decimal::ONE..=Decimal::from(30)
}

pub fn average_service_price_bounds() -> RangeInclusive<Decimal> {
    Decimal::ZERO..=Decimal::from(10_000)
}

pub fn price_bounds() -> RangeInclusive<Decimal> {
    Decimal::ONE_HUNDRED..=Decimal::from(1_000_000)
}

/// Calendar year used by the business rules, in UTC.
pub fn current_year() -> i32 {
    Utc::now().year()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarId(pub i64);

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BodyType {
    Sedan,
    Hatchback,
    StationWagon,
    Crossover,
    Suv,
    Coupe,
    Convertible,
    Minivan,
    Pickup,
    Van,
    Wagon,
    Liftback,
    Fastback,
    Roadster,
    Other,
}

impl BodyType {
    pub const ALL: [BodyType; 15] = [
        Self::Sedan,
        Self::Hatchback,
        Self::StationWagon,
        Self::Crossover,
        Self::Suv,
        Self::Coupe,
        Self::Convertible,
        Self::Minivan,
        Self::Pickup,
        Self::Van,
        Self::Wagon,
        Self::Liftback,
        Self::Fastback,
        Self::Roadster,
        Self::Other,
    ];

    /// Wire and storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sedan => "SEDAN",
            Self::Hatchback => "HATCHBACK",
            Self::StationWagon => "STATION_WAGON",
            Self::Crossover => "CROSSOVER",
            Self::Suv => "SUV",
            Self::Coupe => "COUPE",
            Self::Convertible => "CONVERTIBLE",
            Self::Minivan => "MINIVAN",
            Self::Pickup => "PICKUP",
            Self::Van => "VAN",
            Self::Wagon => "WAGON",
            Self::Liftback => "LIFTBACK",
            Self::Fastback => "FASTBACK",
            Self::Roadster => "ROADSTER",
            Self::Other => "OTHER",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Sedan => "Sedan",
            Self::Hatchback => "Hatchback",
            Self::StationWagon => "Station Wagon",
            Self::Crossover => "Crossover",
            Self::Suv => "SUV",
            Self::Coupe => "Coupe",
            Self::Convertible => "Convertible",
            Self::Minivan => "Minivan",
            Self::Pickup => "Pickup",
            Self::Van => "Van",
            Self::Wagon => "Wagon",
            Self::Liftback => "Liftback",
            Self::Fastback => "Fastback",
            Self::Roadster => "Roadster",
            Self::Other => "Other",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_enum_name(raw);
        Self::ALL.into_iter().find(|variant| variant.as_str() == normalized)
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FuelType {
    Gasoline,
    Diesel,
    Hybrid,
    Electric,
    PlugInHybrid,
    Hydrogen,
    Lpg,
    Cng,
    Ethanol,
    Biodiesel,
    Other,
}

impl FuelType {
    pub const ALL: [FuelType; 11] = [
        Self::Gasoline,
        Self::Diesel,
        Self::Hybrid,
        Self::Electric,
        Self::PlugInHybrid,
        Self::Hydrogen,
        Self::Lpg,
        Self::Cng,
        Self::Ethanol,
        Self::Biodiesel,
        Self::Other,
    ];

    /// Wire and storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gasoline => "GASOLINE",
            Self::Diesel => "DIESEL",
            Self::Hybrid => "HYBRID",
            Self::Electric => "ELECTRIC",
            Self::PlugInHybrid => "PLUG_IN_HYBRID",
            Self::Hydrogen => "HYDROGEN",
            Self::Lpg => "LPG",
            Self::Cng => "CNG",
            Self::Ethanol => "ETHANOL",
            Self::Biodiesel => "BIODIESEL",
            Self::Other => "OTHER",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gasoline => "Gasoline",
            Self::Diesel => "Diesel",
            Self::Hybrid => "Hybrid",
            Self::Electric => "Electric",
            Self::PlugInHybrid => "Plug-in Hybrid",
            Self::Hydrogen => "Hydrogen",
            Self::Lpg => "LPG",
            Self::Cng => "CNG",
            Self::Ethanol => "Ethanol",
            Self::Biodiesel => "Biodiesel",
            Self::Other => "Other",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_enum_name(raw);
        Self::ALL.into_iter().find(|variant| variant.as_str() == normalized)
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

fn normalize_enum_name(raw: &str) -> String {
    raw.trim().to_ascii_uppercase().replace(['-', ' '], "_")
}

/// A catalog record.
///
/// Every attribute is optional so the business rules stay total over
/// partially populated payloads; a record is only persisted once
/// [`Car::is_valid_for_comparison`] holds.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    #[serde(default)]
    pub id: Option<CarId>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub manufacturing_year: Option<i32>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub engine_volume: Option<Decimal>,
    #[serde(default)]
    pub body_type: Option<BodyType>,
    #[serde(default)]
    pub fuel_type: Option<FuelType>,
    #[serde(default)]
    pub trunk_size: Option<i32>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub fuel_consumption: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub average_service_price: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub mileage: Option<i32>,
}

/// Identity is the assigned id; unsaved records compare by attributes.
impl PartialEq for Car {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(left), Some(right)) => left == right,
            (None, None) => self.same_attributes(other),
            _ => false,
        }
    }
}

impl Car {
    /// Compares every attribute except the identifier.
    pub fn same_attributes(&self, other: &Car) -> bool {
        self.model == other.model
            && self.manufacturing_year == other.manufacturing_year
            && self.engine_volume == other.engine_volume
            && self.body_type == other.body_type
            && self.fuel_type == other.fuel_type
            && self.trunk_size == other.trunk_size
            && self.fuel_consumption == other.fuel_consumption
            && self.average_service_price == other.average_service_price
            && self.price == other.price
            && self.mileage == other.mileage
    }

    /// Copies every attribute of `source` onto `self`, keeping `self.id`.
    pub fn overwrite_attributes(&mut self, source: Car) {
        let id = self.id;
        *self = Car { id, ..source };
    }

    pub fn is_valid_for_comparison(&self) -> bool {
        self.is_valid_for_comparison_in(current_year())
    }

    /// Business-rule check. The year ceiling is `current_year`, not the
    /// request-level 2030 ceiling enforced by [`crate::validation`].
    pub fn is_valid_for_comparison_in(&self, current_year: i32) -> bool {
        self.model.as_deref().is_some_and(|model| !model.trim().is_empty())
            && self
                .manufacturing_year
                .is_some_and(|year| (MIN_MANUFACTURING_YEAR..=current_year).contains(&year))
            && within(self.engine_volume, engine_volume_bounds())
            && self.body_type.is_some()
            && self.fuel_type.is_some()
            && self.trunk_size.is_some_and(|size| (MIN_TRUNK_SIZE..=MAX_TRUNK_SIZE).contains(&size))
            && within(self.fuel_consumption, fuel_consumption_bounds())
            && within(self.average_service_price, average_service_price_bounds())
            && within(self.price, price_bounds())
            && self.mileage.is_some_and(|mileage| (MIN_MILEAGE..=MAX_MILEAGE).contains(&mileage))
    }

    pub fn is_new_car(&self) -> bool {
        self.is_new_car_in(current_year())
    }

    pub fn is_new_car_in(&self, current_year: i32) -> bool {
        self.manufacturing_year.is_some_and(|year| year >= current_year - 1)
    }

    pub fn is_electric(&self) -> bool {
        self.fuel_type == Some(FuelType::Electric)
    }

    pub fn is_hybrid(&self) -> bool {
        matches!(self.fuel_type, Some(FuelType::Hybrid | FuelType::PlugInHybrid))
    }

    pub fn is_eco_friendly(&self) -> bool {
        self.is_electric() || self.is_hybrid() || self.fuel_type == Some(FuelType::Hydrogen)
    }

    /// Purchase price plus five years of average service cost.
    pub fn total_cost_of_ownership(&self) -> Decimal {
        match (self.price, self.average_service_price) {
            (Some(price), Some(service)) => price + service * Decimal::from(5),
            _ => Decimal::ZERO,
        }
    }

    pub fn is_good_value_for_money(&self) -> bool {
        match (self.price, self.average_service_price) {
            (Some(price), Some(service)) => service < price * Decimal::new(1, 1),
            _ => false,
        }
    }

    pub fn is_fuel_efficient(&self) -> bool {
        self.fuel_consumption.is_some_and(|consumption| consumption < Decimal::from(6))
    }

    pub fn is_spacious(&self) -> bool {
        self.trunk_size.is_some_and(|size| size > 500)
    }

    pub fn is_recent_model(&self) -> bool {
        self.is_recent_model_in(current_year())
    }

    pub fn is_recent_model_in(&self, current_year: i32) -> bool {
        self.manufacturing_year.is_some_and(|year| year >= current_year - 5)
    }

    pub fn is_high_mileage(&self) -> bool {
        self.mileage.is_some_and(|mileage| mileage > 100_000)
    }

    pub fn is_low_mileage(&self) -> bool {
        self.mileage.is_some_and(|mileage| mileage < 50_000)
    }

    pub fn insights(&self) -> CarInsights {
        self.insights_in(current_year())
    }

    pub fn insights_in(&self, current_year: i32) -> CarInsights {
        CarInsights {
            id: self.id,
            new_car: self.is_new_car_in(current_year),
            electric: self.is_electric(),
            hybrid: self.is_hybrid(),
            eco_friendly: self.is_eco_friendly(),
            total_cost_of_ownership: self.total_cost_of_ownership(),
            good_value_for_money: self.is_good_value_for_money(),
            fuel_efficient: self.is_fuel_efficient(),
            spacious: self.is_spacious(),
            recent_model: self.is_recent_model_in(current_year),
            high_mileage: self.is_high_mileage(),
            low_mileage: self.is_low_mileage(),
        }
    }
}

fn within(value: Option<Decimal>, bounds: RangeInclusive<Decimal>) -> bool {
    value.is_some_and(|value| bounds.contains(&value))
}

/// Read-only classifications derived from a [`Car`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarInsights {
    pub id: Option<CarId>,
    pub new_car: bool,
    pub electric: bool,
    pub hybrid: bool,
    pub eco_friendly: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_cost_of_ownership: Decimal,
    pub good_value_for_money: bool,
    pub fuel_efficient: bool,
    pub spacious: bool,
    pub recent_model: bool,
    pub high_mileage: bool,
    pub low_mileage: bool,
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{BodyType, Car, CarId, FuelType};

    const YEAR: i32 = 2025;

    fn valid_car() -> Car {
        Car {
            id: None,
            model: Some("Octavia".to_string()),
            manufacturing_year: Some(2020),
            engine_volume: Some(Decimal::new(20, 1)),
            body_type: Some(BodyType::Liftback),
            fuel_type: Some(FuelType::Diesel),
            trunk_size: Some(600),
            fuel_consumption: Some(Decimal::new(55, 1)),
            average_service_price: Some(Decimal::new(45000, 2)),
            price: Some(Decimal::new(2_500_000, 2)),
            mileage: Some(42_000),
        }
    }

    #[test]
    fn valid_car_passes_business_rules() {
        assert!(valid_car().is_valid_for_comparison_in(YEAR));
    }

    #[test]
    fn each_single_out_of_bound_field_fails_business_rules() {
        let mutations: Vec<(&str, fn(&mut Car))> = vec![
            ("model missing", |car| car.model = None),
            ("model blank", |car| car.model = Some("   ".to_string())),
            ("year missing", |car| car.manufacturing_year = None),
            ("year too old", |car| car.manufacturing_year = Some(1899)),
            ("year after current", |car| car.manufacturing_year = Some(YEAR + 1)),
            ("engine missing", |car| car.engine_volume = None),
            ("engine too small", |car| car.engine_volume = Some(Decimal::new(4, 1))),
            ("engine too large", |car| car.engine_volume = Some(Decimal::new(101, 1))),
            ("body missing", |car| car.body_type = None),
            ("fuel missing", |car| car.fuel_type = None),
            ("trunk too small", |car| car.trunk_size = Some(99)),
            ("trunk too large", |car| car.trunk_size = Some(3001)),
            ("consumption too low", |car| car.fuel_consumption = Some(Decimal::new(9, 1))),
            ("consumption too high", |car| car.fuel_consumption = Some(Decimal::new(301, 1))),
            ("service negative", |car| car.average_service_price = Some(Decimal::new(-1, 2))),
            ("service too high", |car| {
                car.average_service_price = Some(Decimal::new(1_000_001, 2))
            }),
            ("price too low", |car| car.price = Some(Decimal::new(9999, 2))),
            ("price too high", |car| car.price = Some(Decimal::new(100_000_001, 2))),
            ("mileage negative", |car| car.mileage = Some(-1)),
            ("mileage too high", |car| car.mileage = Some(1_000_001)),
            ("mileage missing", |car| car.mileage = None),
        ];

        for (label, mutate) in mutations {
            let mut car = valid_car();
            mutate(&mut car);
            assert!(!car.is_valid_for_comparison_in(YEAR), "{label} should fail validation");
        }
    }

    #[test]
    fn inclusive_bounds_are_accepted() {
        let mut low = valid_car();
        low.manufacturing_year = Some(1900);
        low.engine_volume = Some(Decimal::new(5, 1));
        low.trunk_size = Some(100);
        low.fuel_consumption = Some(Decimal::ONE);
        low.average_service_price = Some(Decimal::ZERO);
        low.price = Some(Decimal::ONE_HUNDRED);
        low.mileage = Some(0);
        assert!(low.is_valid_for_comparison_in(YEAR));

        let mut high = valid_car();
        high.manufacturing_year = Some(YEAR);
        high.engine_volume = Some(Decimal::TEN);
        high.trunk_size = Some(3000);
        high.fuel_consumption = Some(Decimal::from(30));
        high.average_service_price = Some(Decimal::from(10_000));
        high.price = Some(Decimal::from(1_000_000));
        high.mileage = Some(1_000_000);
        assert!(high.is_valid_for_comparison_in(YEAR));
    }

    #[test]
    fn correcting_the_only_bad_field_restores_validity() {
        let mut car = valid_car();
        car.engine_volume = Some(Decimal::ZERO);
        assert!(!car.is_valid_for_comparison_in(YEAR));

        car.engine_volume = Some(Decimal::new(16, 1));
        assert!(car.is_valid_for_comparison_in(YEAR));
    }

    #[test]
    fn equality_uses_identifier_once_assigned() {
        let mut left = valid_car();
        let mut right = valid_car();
        right.price = Some(Decimal::from(99_000));
        assert_ne!(left, right);

        left.id = Some(CarId(7));
        right.id = Some(CarId(7));
        assert_eq!(left, right);

        right.id = Some(CarId(8));
        assert_ne!(left, right);
    }

    #[test]
    fn overwrite_keeps_identifier() {
        let mut stored = valid_car();
        stored.id = Some(CarId(3));
        let mut incoming = valid_car();
        incoming.id = Some(CarId(99));
        incoming.model = Some("Superb".to_string());

        stored.overwrite_attributes(incoming);

        assert_eq!(stored.id, Some(CarId(3)));
        assert_eq!(stored.model.as_deref(), Some("Superb"));
    }

    #[test]
    fn derived_classifications_follow_thresholds() {
        let car = valid_car();
        let insights = car.insights_in(YEAR);

        assert!(!insights.new_car);
        assert!(insights.recent_model);
        assert!(!insights.electric);
        assert!(!insights.hybrid);
        assert!(!insights.eco_friendly);
        assert_eq!(insights.total_cost_of_ownership, Decimal::new(2_725_000, 2));
        assert!(insights.good_value_for_money);
        assert!(insights.fuel_efficient);
        assert!(insights.spacious);
        assert!(!insights.high_mileage);
        assert!(insights.low_mileage);
    }

    #[test]
    fn threshold_comparisons_are_strict() {
        let mut car = valid_car();
        car.fuel_consumption = Some(Decimal::from(6));
        car.trunk_size = Some(500);
        car.mileage = Some(100_000);
        car.price = Some(Decimal::from(1000));
        car.average_service_price = Some(Decimal::from(100));

        assert!(!car.is_fuel_efficient());
        assert!(!car.is_spacious());
        assert!(!car.is_high_mileage());
        assert!(!car.is_low_mileage());
        assert!(!car.is_good_value_for_money());
    }

    #[test]
    fn fuel_classifications() {
        let mut car = valid_car();
        car.fuel_type = Some(FuelType::PlugInHybrid);
        assert!(car.is_hybrid());
        assert!(car.is_eco_friendly());

        car.fuel_type = Some(FuelType::Hydrogen);
        assert!(!car.is_hybrid());
        assert!(car.is_eco_friendly());

        car.fuel_type = Some(FuelType::Electric);
        assert!(car.is_electric());
    }

    #[test]
    fn year_classifications_are_relative_to_current_year() {
        let mut car = valid_car();
        car.manufacturing_year = Some(YEAR - 1);
        assert!(car.is_new_car_in(YEAR));

        car.manufacturing_year = Some(YEAR - 2);
        assert!(!car.is_new_car_in(YEAR));

        car.manufacturing_year = Some(YEAR - 5);
        assert!(car.is_recent_model_in(YEAR));

        car.manufacturing_year = Some(YEAR - 6);
        assert!(!car.is_recent_model_in(YEAR));
    }

    #[test]
    fn missing_inputs_yield_false_or_zero() {
        let car = Car::default();

        assert_eq!(car.total_cost_of_ownership(), Decimal::ZERO);
        assert!(!car.is_good_value_for_money());
        assert!(!car.is_fuel_efficient());
        assert!(!car.is_spacious());
        assert!(!car.is_new_car_in(YEAR));
        assert!(!car.is_recent_model_in(YEAR));
        assert!(!car.is_high_mileage());
        assert!(!car.is_low_mileage());
        assert!(!car.is_eco_friendly());
    }

    #[test]
    fn enums_use_screaming_snake_wire_names_and_display_names() {
        assert_eq!(
            serde_json::to_string(&BodyType::StationWagon).expect("serialize"),
            "\"STATION_WAGON\""
        );
        assert_eq!(
            serde_json::to_string(&FuelType::PlugInHybrid).expect("serialize"),
            "\"PLUG_IN_HYBRID\""
        );
        assert_eq!(BodyType::Suv.to_string(), "SUV");
        assert_eq!(FuelType::PlugInHybrid.to_string(), "Plug-in Hybrid");
        assert_eq!(BodyType::parse("station-wagon"), Some(BodyType::StationWagon));
        assert_eq!(FuelType::parse("plug in hybrid"), Some(FuelType::PlugInHybrid));
        assert_eq!(FuelType::parse("steam"), None);

        for body_type in BodyType::ALL {
            assert_eq!(BodyType::parse(body_type.as_str()), Some(body_type));
        }
        for fuel_type in FuelType::ALL {
            assert_eq!(FuelType::parse(fuel_type.as_str()), Some(fuel_type));
        }
    }

    #[test]
    fn car_json_uses_camel_case_numbers() {
        let json = serde_json::to_value(valid_car()).expect("serialize car");

        assert_eq!(json["manufacturingYear"], 2020);
        assert_eq!(json["bodyType"], "LIFTBACK");
        assert_eq!(json["engineVolume"].as_f64(), Some(2.0));
        assert_eq!(json["price"].as_f64(), Some(25_000.0));

        let decoded: Car = serde_json::from_value(json).expect("deserialize car");
        assert!(decoded.same_attributes(&valid_car()));
    }
}
