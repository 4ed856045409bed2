use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::{QueryBuilder, Row};

use comparcar_core::domain::car::{BodyType, Car, CarId, FuelType};
use comparcar_core::domain::filter::{Page, PageRequest, Sort};
use comparcar_core::query::{escape_like, Condition, ConditionValue, Operator};

use super::{CarRepository, RepositoryError};
use crate::DbPool;

const CAR_COLUMNS: &str = "id, model, manufacturing_year, engine_volume, body_type, fuel_type,
    trunk_size, fuel_consumption, average_service_price, price, mileage";

const VOLUME_SCALE: u32 = 1;
const MONEY_SCALE: u32 = 2;

pub struct SqlCarRepository {
    pool: DbPool,
}

impl SqlCarRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CarRepository for SqlCarRepository {
    async fn find_by_id(&self, id: CarId) -> Result<Option<Car>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {CAR_COLUMNS} FROM cars WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.map(car_from_row).transpose()
    }

    async fn exists_by_id(&self, id: CarId) -> Result<bool, RepositoryError> {
        let exists: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM cars WHERE id = ?)")
            .bind(id.0)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists == 1)
    }

    async fn save(&self, car: Car) -> Result<Car, RepositoryError> {
        let values = ColumnValues::try_from(&car)?;

        let id: i64 = match car.id {
            None => {
                sqlx::query_scalar(
                    "INSERT INTO cars (
                        model, manufacturing_year, engine_volume, body_type, fuel_type,
                        trunk_size, fuel_consumption, average_service_price, price, mileage
                     ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                     RETURNING id",
                )
                .bind(values.model)
                .bind(values.manufacturing_year)
                .bind(values.engine_volume)
                .bind(values.body_type)
                .bind(values.fuel_type)
                .bind(values.trunk_size)
                .bind(values.fuel_consumption)
                .bind(values.average_service_price)
                .bind(values.price)
                .bind(values.mileage)
                .fetch_one(&self.pool)
                .await?
            }
            Some(id) => {
                sqlx::query(
                    "INSERT INTO cars (
                        id, model, manufacturing_year, engine_volume, body_type, fuel_type,
                        trunk_size, fuel_consumption, average_service_price, price, mileage
                     ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                     ON CONFLICT(id) DO UPDATE SET
                        model = excluded.model,
                        manufacturing_year = excluded.manufacturing_year,
                        engine_volume = excluded.engine_volume,
                        body_type = excluded.body_type,
                        fuel_type = excluded.fuel_type,
                        trunk_size = excluded.trunk_size,
                        fuel_consumption = excluded.fuel_consumption,
                        average_service_price = excluded.average_service_price,
                        price = excluded.price,
                        mileage = excluded.mileage",
                )
                .bind(id.0)
                .bind(values.model)
                .bind(values.manufacturing_year)
                .bind(values.engine_volume)
                .bind(values.body_type)
                .bind(values.fuel_type)
                .bind(values.trunk_size)
                .bind(values.fuel_consumption)
                .bind(values.average_service_price)
                .bind(values.price)
                .bind(values.mileage)
                .execute(&self.pool)
                .await?;
                id.0
            }
        };

        Ok(Car { id: Some(CarId(id)), ..car })
    }

    async fn delete_by_id(&self, id: CarId) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM cars WHERE id = ?").bind(id.0).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_page(
        &self,
        conditions: &[Condition],
        page: PageRequest,
        sort: Sort,
    ) -> Result<Page<Car>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM cars WHERE 1 = 1");
        push_conditions(&mut count_query, conditions)?;
        let total: i64 = count_query.build_query_scalar().fetch_one(&mut *tx).await?;

        let mut select_query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {CAR_COLUMNS} FROM cars WHERE 1 = 1"));
        push_conditions(&mut select_query, conditions)?;
        select_query.push(format!(
            " ORDER BY {} {}, id ASC LIMIT ",
            sort.field.column(),
            sort.direction.as_str()
        ));
        select_query.push_bind(i64::from(page.size));
        select_query.push(" OFFSET ");
        select_query.push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));
        let rows = select_query.build().fetch_all(&mut *tx).await?;

        tx.commit().await?;

        let content = rows.into_iter().map(car_from_row).collect::<Result<Vec<_>, _>>()?;
        let total = u64::try_from(total).unwrap_or_default();
        Ok(Page::new(content, page, total))
    }

    async fn find_all(&self) -> Result<Vec<Car>, RepositoryError> {
        let rows = sqlx::query(&format!("SELECT {CAR_COLUMNS} FROM cars ORDER BY id ASC"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(car_from_row).collect()
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM cars").fetch_one(&self.pool).await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

/// Appends ` AND <predicate>` for each condition, binding every value.
fn push_conditions(
    builder: &mut QueryBuilder<'_, Sqlite>,
    conditions: &[Condition],
) -> Result<(), RepositoryError> {
    for condition in conditions {
        let column = condition.field.column();
        match condition.op {
            Operator::Contains => {
                let ConditionValue::Text(needle) = &condition.value else {
                    return Err(RepositoryError::Decode(format!(
                        "substring match on `{column}` requires a text value"
                    )));
                };
                builder.push(format!(" AND LOWER({column}) LIKE "));
                builder.push_bind(format!("%{}%", escape_like(&needle.to_lowercase())));
                builder.push(" ESCAPE '\\'");
            }
            Operator::Gte | Operator::Lte | Operator::Eq => {
                let symbol = match condition.op {
                    Operator::Gte => ">=",
                    Operator::Lte => "<=",
                    _ => "=",
                };
                builder.push(format!(" AND {column} {symbol} "));
                push_value(builder, &condition.value)?;
            }
        }
    }
    Ok(())
}

fn push_value(
    builder: &mut QueryBuilder<'_, Sqlite>,
    value: &ConditionValue,
) -> Result<(), RepositoryError> {
    match value {
        ConditionValue::Text(text) => {
            builder.push_bind(text.clone());
        }
        ConditionValue::Integer(number) => {
            builder.push_bind(*number);
        }
        ConditionValue::Decimal(decimal) => {
            builder.push_bind(decimal_to_real(*decimal)?);
        }
        ConditionValue::BodyType(body_type) => {
            builder.push_bind(body_type.as_str());
        }
        ConditionValue::FuelType(fuel_type) => {
            builder.push_bind(fuel_type.as_str());
        }
    }
    Ok(())
}

/// Bind values for one row; every column is NOT NULL in the schema.
struct ColumnValues {
    model: String,
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

impl TryFrom<&Car> for ColumnValues {
    type Error = RepositoryError;

    fn try_from(car: &Car) -> Result<Self, Self::Error> {
        Ok(Self {
            model: required(car.model.clone(), "model")?,
            manufacturing_year: required(car.manufacturing_year, "manufacturing_year")?,
            engine_volume: decimal_to_real(required(car.engine_volume, "engine_volume")?)?,
            body_type: required(car.body_type, "body_type")?.as_str(),
            fuel_type: required(car.fuel_type, "fuel_type")?.as_str(),
            trunk_size: required(car.trunk_size, "trunk_size")?,
            fuel_consumption: decimal_to_real(required(car.fuel_consumption, "fuel_consumption")?)?,
            average_service_price: decimal_to_real(required(
                car.average_service_price,
                "average_service_price",
            )?)?,
            price: decimal_to_real(required(car.price, "price")?)?,
            mileage: required(car.mileage, "mileage")?,
        })
    }
}

fn required<T>(value: Option<T>, column: &str) -> Result<T, RepositoryError> {
    value.ok_or_else(|| RepositoryError::Decode(format!("column `{column}` cannot be null")))
}

fn decimal_to_real(value: Decimal) -> Result<f64, RepositoryError> {
    value
        .to_f64()
        .ok_or_else(|| RepositoryError::Decode(format!("decimal `{value}` is not representable")))
}

fn real_to_decimal(value: f64, scale: u32, column: &str) -> Result<Decimal, RepositoryError> {
    Decimal::from_f64(value)
        .map(|decimal| decimal.round_dp(scale))
        .ok_or_else(|| {
            RepositoryError::Decode(format!("column `{column}` holds non-finite {value}"))
        })
}

fn car_from_row(row: SqliteRow) -> Result<Car, RepositoryError> {
    let body_type: String = row.try_get("body_type")?;
    let fuel_type: String = row.try_get("fuel_type")?;

    Ok(Car {
        id: Some(CarId(row.try_get("id")?)),
        model: Some(row.try_get("model")?),
        manufacturing_year: Some(row.try_get("manufacturing_year")?),
        engine_volume: Some(real_to_decimal(
            row.try_get("engine_volume")?,
            VOLUME_SCALE,
            "engine_volume",
        )?),
        body_type: Some(BodyType::parse(&body_type).ok_or_else(|| {
            RepositoryError::Decode(format!("unknown body type `{body_type}`"))
        })?),
        fuel_type: Some(FuelType::parse(&fuel_type).ok_or_else(|| {
            RepositoryError::Decode(format!("unknown fuel type `{fuel_type}`"))
        })?),
        trunk_size: Some(row.try_get("trunk_size")?),
        fuel_consumption: Some(real_to_decimal(
            row.try_get("fuel_consumption")?,
            VOLUME_SCALE,
            "fuel_consumption",
        )?),
        average_service_price: Some(real_to_decimal(
            row.try_get("average_service_price")?,
            MONEY_SCALE,
            "average_service_price",
        )?),
        price: Some(real_to_decimal(row.try_get("price")?, MONEY_SCALE, "price")?),
        mileage: Some(row.try_get("mileage")?),
    })
}
