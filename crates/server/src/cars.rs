//! Catalog HTTP surface.
//!
//! Endpoints:
//! - `POST   /cars`                create a car
//! - `GET    /cars`                filtered, paged, sorted listing
//! - `GET    /cars/all`            every car, unpaged
//! - `GET    /cars/body-types`     body type wire names
//! - `GET    /cars/fuel-types`     fuel type wire names
//! - `GET    /cars/{id}`           one car
//! - `PUT    /cars/{id}`           replace a car's attributes
//! - `DELETE /cars/{id}`           remove a car
//! - `GET    /cars/{id}/insights`  derived classifications

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use comparcar_core::domain::car::{BodyType, Car, CarId, CarInsights, FuelType};
use comparcar_core::domain::filter::{CarFilter, Page};
use comparcar_core::errors::ApplicationError;

use crate::catalog::CatalogService;
use crate::error::ApiError;

#[derive(Clone)]
pub struct CarsState {
    catalog: Arc<CatalogService>,
}

pub fn router(catalog: Arc<CatalogService>) -> Router {
    Router::new()
        .route("/cars", get(list_cars).post(create_car))
        .route("/cars/all", get(list_all_cars))
        .route("/cars/body-types", get(body_types))
        .route("/cars/fuel-types", get(fuel_types))
        .route("/cars/{id}", get(get_car).put(update_car).delete(delete_car))
        .route("/cars/{id}/insights", get(car_insights))
        .with_state(CarsState { catalog })
}

type ApiResult<T> = Result<T, ApiError>;

async fn create_car(
    State(state): State<CarsState>,
    payload: Result<Json<Car>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Car>)> {
    let Json(car) =
        payload.map_err(|rejection| ApiError::malformed_request(rejection.body_text()))?;
    let created = state.catalog.create(car).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_car(
    State(state): State<CarsState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Car>> {
    let id = car_id(id)?;
    let car = state.catalog.get_by_id(id).await?.ok_or(ApplicationError::NotFound { id })?;
    Ok(Json(car))
}

async fn update_car(
    State(state): State<CarsState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Car>, JsonRejection>,
) -> ApiResult<Json<Car>> {
    let id = car_id(id)?;
    let Json(car) =
        payload.map_err(|rejection| ApiError::malformed_request(rejection.body_text()))?;
    let updated = state.catalog.update(id, car).await?;
    Ok(Json(updated))
}

async fn delete_car(
    State(state): State<CarsState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let id = car_id(id)?;
    state.catalog.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_cars(
    State(state): State<CarsState>,
    filter: Result<Query<CarFilter>, QueryRejection>,
) -> ApiResult<Json<Page<Car>>> {
    let Query(filter) =
        filter.map_err(|rejection| ApiError::malformed_request(rejection.body_text()))?;
    let page = state.catalog.list(&filter).await?;
    Ok(Json(page))
}

async fn list_all_cars(State(state): State<CarsState>) -> ApiResult<Json<Vec<Car>>> {
    Ok(Json(state.catalog.list_all().await?))
}

async fn car_insights(
    State(state): State<CarsState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<CarInsights>> {
    let id = car_id(id)?;
    let insights = state.catalog.insights(id).await?.ok_or(ApplicationError::NotFound { id })?;
    Ok(Json(insights))
}

async fn body_types() -> Json<Vec<BodyType>> {
    Json(BodyType::ALL.to_vec())
}

async fn fuel_types() -> Json<Vec<FuelType>> {
    Json(FuelType::ALL.to_vec())
}

fn car_id(path: Result<Path<i64>, PathRejection>) -> Result<CarId, ApiError> {
    let Path(id) = path.map_err(|rejection| ApiError::malformed_request(rejection.body_text()))?;
    Ok(CarId(id))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use comparcar_core::domain::car::current_year;
    use comparcar_db::repositories::InMemoryCarRepository;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::router;
    use crate::catalog::CatalogService;

    fn app() -> Router {
        let repository = Arc::new(InMemoryCarRepository::default());
        router(Arc::new(CatalogService::new(repository)))
    }

    fn payload(model: &str, price: f64) -> Value {
        json!({
            "model": model,
            "manufacturingYear": 2019,
            "engineVolume": 1.6,
            "bodyType": "HATCHBACK",
            "fuelType": "GASOLINE",
            "trunkSize": 380,
            "fuelConsumption": 5.9,
            "averageServicePrice": 420.5,
            "price": price,
            "mileage": 48000
        })
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    async fn create(app: &Router, model: &str, price: f64) -> i64 {
        let (status, body) = send(app, "POST", "/cars", Some(payload(model, price))).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().expect("assigned id")
    }

    #[tokio::test]
    async fn create_then_get_round_trips_every_field() {
        let app = app();
        let id = create(&app, "Golf", 18_500.0).await;

        let (status, body) = send(&app, "GET", &format!("/cars/{id}"), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id);
        assert_eq!(body["model"], "Golf");
        assert_eq!(body["bodyType"], "HATCHBACK");
        assert_eq!(body["engineVolume"].as_f64(), Some(1.6));
        assert_eq!(body["averageServicePrice"].as_f64(), Some(420.5));
        assert_eq!(body["price"].as_f64(), Some(18_500.0));
        assert_eq!(body["mileage"], 48000);
    }

    #[tokio::test]
    async fn zero_engine_volume_is_a_bad_request_with_violations() {
        let app = app();
        let mut invalid = payload("Golf", 18_500.0);
        invalid["engineVolume"] = json!(0.0);

        let (status, body) = send(&app, "POST", "/cars", Some(invalid)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
        assert_eq!(body["violations"][0]["field"], "engineVolume");
        assert!(body["correlationId"].as_str().is_some_and(|id| !id.is_empty()));

        let (_, all) = send(&app, "GET", "/cars/all", None).await;
        assert_eq!(all, json!([]));
    }

    #[tokio::test]
    async fn next_year_model_is_rejected_by_business_rules() {
        let next_year = current_year() + 1;
        if next_year > 2030 {
            return;
        }
        let app = app();
        let mut future = payload("Concept", 30_000.0);
        future["manufacturingYear"] = json!(next_year);

        let (status, body) = send(&app, "POST", "/cars", Some(future)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("violations").is_none());
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let app = app();
        let request = Request::builder()
            .method("POST")
            .uri("/cars")
            .header("content-type", "application/json")
            .body(Body::from("{\"model\": "))
            .expect("request");

        let response = app.oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn price_floor_returns_two_cars_in_id_order() {
        let app = app();
        let cheap = create(&app, "Aygo", 5_000.0).await;
        let mid = create(&app, "Corolla", 20_000.0).await;
        let premium = create(&app, "Camry", 45_000.0).await;

        let (status, body) = send(&app, "GET", "/cars?priceFrom=10000", None).await;

        assert_eq!(status, StatusCode::OK);
        let ids: Vec<_> = body["content"]
            .as_array()
            .expect("content")
            .iter()
            .map(|car| car["id"].clone())
            .collect();
        assert_eq!(ids, vec![json!(mid), json!(premium)]);
        assert_eq!(body["totalElements"], 2);
        assert_eq!(body["number"], 0);
        assert_eq!(body["size"], 20);
        assert_eq!(body["first"], true);
        assert_eq!(body["last"], true);
        assert!(!ids.contains(&json!(cheap)));
    }

    #[tokio::test]
    async fn listing_supports_sort_and_enum_filters() {
        let app = app();
        create(&app, "Aygo", 5_000.0).await;
        create(&app, "Corolla", 20_000.0).await;

        let uri = "/cars?bodyType=HATCHBACK&sortBy=price&sortDirection=desc&size=1";
        let (status, body) = send(&app, "GET", uri, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"][0]["model"], "Corolla");
        assert_eq!(body["totalPages"], 2);
        assert_eq!(body["last"], false);
    }

    #[tokio::test]
    async fn unknown_sort_field_is_a_bad_request() {
        let app = app();

        let (status, body) = send(&app, "GET", "/cars?sortBy=colour", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().is_some_and(|message| message.contains("sortBy")));
    }

    #[tokio::test]
    async fn unparseable_query_value_is_a_bad_request() {
        let app = app();

        let (status, _) = send(&app, "GET", "/cars?priceFrom=cheap", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found_even_with_invalid_body() {
        let app = app();

        let (status, body) = send(&app, "PUT", "/cars/999", Some(json!({}))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn update_replaces_attributes_and_keeps_id() {
        let app = app();
        let id = create(&app, "Golf", 18_500.0).await;

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/cars/{id}"),
            Some(payload("Golf Variant", 21_000.0)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id);
        assert_eq!(body["model"], "Golf Variant");
        assert_eq!(body["price"].as_f64(), Some(21_000.0));
    }

    #[tokio::test]
    async fn delete_twice_yields_no_content_then_not_found() {
        let app = app();
        let id = create(&app, "Golf", 18_500.0).await;

        let (first, _) = send(&app, "DELETE", &format!("/cars/{id}"), None).await;
        let (second, _) = send(&app, "DELETE", &format!("/cars/{id}"), None).await;

        assert_eq!(first, StatusCode::NO_CONTENT);
        assert_eq!(second, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn get_unknown_or_malformed_id() {
        let app = app();

        let (missing, _) = send(&app, "GET", "/cars/41", None).await;
        let (malformed, _) = send(&app, "GET", "/cars/forty-one", None).await;

        assert_eq!(missing, StatusCode::NOT_FOUND);
        assert_eq!(malformed, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn enumerations_are_listed_in_declaration_order() {
        let app = app();

        let (_, body_types) = send(&app, "GET", "/cars/body-types", None).await;
        let (_, fuel_types) = send(&app, "GET", "/cars/fuel-types", None).await;

        assert_eq!(body_types.as_array().map(Vec::len), Some(15));
        assert_eq!(body_types[0], "SEDAN");
        assert_eq!(body_types[2], "STATION_WAGON");
        assert_eq!(fuel_types.as_array().map(Vec::len), Some(11));
        assert_eq!(fuel_types[4], "PLUG_IN_HYBRID");
    }

    #[tokio::test]
    async fn insights_expose_derived_classifications() {
        let app = app();
        let id = create(&app, "Golf", 18_500.0).await;

        let (status, body) = send(&app, "GET", &format!("/cars/{id}/insights"), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fuelEfficient"], true);
        assert_eq!(body["lowMileage"], true);
        assert_eq!(body["totalCostOfOwnership"].as_f64(), Some(20_602.5));

        let (missing, _) = send(&app, "GET", "/cars/404/insights", None).await;
        assert_eq!(missing, StatusCode::NOT_FOUND);
    }
}
