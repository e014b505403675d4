//! Shared helpers for the HTTP integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use devcamper::storage::{DistanceUnit, SchemaValidationMode};
use devcamper::{bootcamp, create_router, ApiResult, AppState, GeocodeResult, Geocoder, StorageEngine};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

/// In-process geocoder answering from a fixed table of zipcodes and addresses
pub struct FakeGeocoder;

pub const BOSTON_ZIP: &str = "02118";
pub const WORCESTER_ZIP: &str = "01609";
pub const LOWELL_ZIP: &str = "01854";

impl FakeGeocoder {
    fn lookup(query: &str) -> Option<GeocodeResult> {
        let (lat, lng, city, zipcode) = if query.contains(BOSTON_ZIP) {
            (42.3389, -71.0706, "Boston", BOSTON_ZIP)
        } else if query.contains(WORCESTER_ZIP) {
            (42.2751, -71.8132, "Worcester", WORCESTER_ZIP)
        } else if query.contains(LOWELL_ZIP) {
            (42.6503, -71.3298, "Lowell", LOWELL_ZIP)
        } else {
            return None;
        };

        Some(GeocodeResult {
            latitude: lat,
            longitude: lng,
            formatted_address: Some(format!("{}, MA {}, US", city, zipcode)),
            street: None,
            city: Some(city.to_string()),
            state: Some("MA".to_string()),
            zipcode: Some(zipcode.to_string()),
            country_code: Some("US".to_string()),
        })
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, query: &str) -> ApiResult<Vec<GeocodeResult>> {
        Ok(Self::lookup(query).into_iter().collect())
    }
}

pub fn create_test_app() -> (Router, TempDir) {
    create_test_app_with_unit(DistanceUnit::Miles)
}

pub fn create_test_app_with_unit(unit: DistanceUnit) -> (Router, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = StorageEngine::open(temp_dir.path(), &[bootcamp::COLLECTION])
        .expect("Failed to open storage");
    let bootcamps = bootcamp::open_collection(&storage, SchemaValidationMode::Strict)
        .expect("Failed to open bootcamps");
    let state = AppState::new(bootcamps, Arc::new(FakeGeocoder)).with_distance_unit(unit);
    (create_router(state, None), temp_dir)
}

pub async fn send(app: &Router, method: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    let body = match body {
        Some(body) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(json!(null));
    (status, json)
}

/// Send a body as-is, with an optional content type
pub async fn send_raw(
    app: &Router,
    method: &str,
    path: &str,
    content_type: Option<&str>,
    body: &str,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(json!(null));
    (status, json)
}

pub async fn get(app: &Router, path: &str) -> (StatusCode, Value) {
    send(app, "GET", path, None).await
}

pub async fn post_json(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", path, Some(body)).await
}

pub async fn put_json(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    send(app, "PUT", path, Some(body)).await
}

pub async fn delete(app: &Router, path: &str) -> (StatusCode, Value) {
    send(app, "DELETE", path, None).await
}

/// Create a bootcamp and return its id
pub async fn create_bootcamp(app: &Router, body: Value) -> String {
    let (status, created) = post_json(app, "/bootcamps", body).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", created);
    created["_id"].as_str().unwrap().to_string()
}

pub async fn seed(app: &Router) {
    create_bootcamp(
        app,
        json!({
            "name": "Devworks Bootcamp",
            "description": "Full stack web development",
            "careers": ["Web Development", "UI/UX", "Business"],
            "averageCost": 10000,
            "housing": true,
            "address": "233 Bay State Rd Boston MA 02118"
        }),
    )
    .await;
    create_bootcamp(
        app,
        json!({
            "name": "ModernTech Bootcamp",
            "description": "Front end and mobile",
            "careers": ["Web Development", "Mobile Development"],
            "averageCost": 8000,
            "address": "220 Pawtucket St Lowell MA 01854"
        }),
    )
    .await;
    create_bootcamp(
        app,
        json!({
            "name": "Codemasters",
            "description": "Data science in Worcester",
            "careers": ["Data Science", "Business"],
            "averageCost": 12000,
            "address": "85 South Prospect Street Worcester MA 01609"
        }),
    )
    .await;
}
