use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Deterministic demo catalog used by `comparcar seed` and local development.
const DEMO_CARS: &[SeedCar] = &[
    SeedCar {
        model: "Corolla",
        manufacturing_year: 2021,
        engine_volume: 1.8,
        body_type: "SEDAN",
        fuel_type: "HYBRID",
        trunk_size: 470,
        fuel_consumption: 4.5,
        average_service_price: 350.0,
        price: 24_500.0,
        mileage: 28_000,
    },
    SeedCar {
        model: "Golf",
        manufacturing_year: 2019,
        engine_volume: 1.5,
        body_type: "HATCHBACK",
        fuel_type: "GASOLINE",
        trunk_size: 380,
        fuel_consumption: 5.8,
        average_service_price: 420.0,
        price: 17_900.0,
        mileage: 64_000,
    },
    SeedCar {
        model: "Octavia Combi",
        manufacturing_year: 2020,
        engine_volume: 2.0,
        body_type: "STATION_WAGON",
        fuel_type: "DIESEL",
        trunk_size: 640,
        fuel_consumption: 5.1,
        average_service_price: 480.0,
        price: 21_300.0,
        mileage: 98_500,
    },
    SeedCar {
        model: "Model Y",
        manufacturing_year: 2023,
        engine_volume: 0.5,
        body_type: "CROSSOVER",
        fuel_type: "ELECTRIC",
        trunk_size: 854,
        fuel_consumption: 1.0,
        average_service_price: 210.0,
        price: 46_990.0,
        mileage: 12_000,
    },
    SeedCar {
        model: "Outlander PHEV",
        manufacturing_year: 2022,
        engine_volume: 2.4,
        body_type: "SUV",
        fuel_type: "PLUG_IN_HYBRID",
        trunk_size: 495,
        fuel_consumption: 2.1,
        average_service_price: 560.0,
        price: 39_750.0,
        mileage: 31_200,
    },
    SeedCar {
        model: "Mirai",
        manufacturing_year: 2021,
        engine_volume: 0.5,
        body_type: "SEDAN",
        fuel_type: "HYDROGEN",
        trunk_size: 273,
        fuel_consumption: 1.0,
        average_service_price: 890.0,
        price: 52_000.0,
        mileage: 22_400,
    },
    SeedCar {
        model: "Hilux",
        manufacturing_year: 2016,
        engine_volume: 2.8,
        body_type: "PICKUP",
        fuel_type: "DIESEL",
        trunk_size: 1_100,
        fuel_consumption: 8.9,
        average_service_price: 640.0,
        price: 27_400.0,
        mileage: 162_000,
    },
    SeedCar {
        model: "MX-5",
        manufacturing_year: 2018,
        engine_volume: 2.0,
        body_type: "ROADSTER",
        fuel_type: "GASOLINE",
        trunk_size: 130,
        fuel_consumption: 6.9,
        average_service_price: 390.0,
        price: 22_800.0,
        mileage: 41_000,
    },
];

pub struct DemoCatalog;

impl DemoCatalog {
    pub fn expected_count() -> usize {
        DEMO_CARS.len()
    }

    /// Inserts the demo catalog unless the `cars` table already holds rows.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM cars").fetch_one(&mut *tx).await?;
        if existing > 0 {
            tx.rollback().await?;
            return Ok(SeedResult { inserted: 0, skipped: true });
        }

        for seed in DEMO_CARS {
            sqlx::query(
                "INSERT INTO cars (
                    model, manufacturing_year, engine_volume, body_type, fuel_type,
                    trunk_size, fuel_consumption, average_service_price, price, mileage
                 ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(seed.model)
            .bind(seed.manufacturing_year)
            .bind(seed.engine_volume)
            .bind(seed.body_type)
            .bind(seed.fuel_type)
            .bind(seed.trunk_size)
            .bind(seed.fuel_consumption)
            .bind(seed.average_service_price)
            .bind(seed.price)
            .bind(seed.mileage)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(SeedResult { inserted: DEMO_CARS.len(), skipped: false })
    }

    /// Checks that every demo model is present with its seeded body and fuel type.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::with_capacity(DEMO_CARS.len());

        for seed in DEMO_CARS {
            let present: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM cars \
                 WHERE model = ?1 AND body_type = ?2 AND fuel_type = ?3)",
            )
            .bind(seed.model)
            .bind(seed.body_type)
            .bind(seed.fuel_type)
            .fetch_one(pool)
            .await?;
            checks.push((seed.model, present == 1));
        }

        let all_present = checks.iter().all(|(_, present)| *present);
        Ok(VerificationResult { all_present, checks })
    }
}

struct SeedCar {
    model: &'static str,
    manufacturing_year: i32,
    engine_volume: f64,
    body_type: &'static str,
    fuel_type: &'static str,
    trunk_size: i32,
    fuel_consumption: f64,
    average_service_price: f64,
    price: f64,
    mileage: i32,
}

#[derive(Debug)]
pub struct SeedResult {
    pub inserted: usize,
    pub skipped: bool,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
