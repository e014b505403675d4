use super::system::AppState;
use crate::bootcamp;
use crate::error::{ApiError, ApiResult};
use crate::query::{FindQuery, Filter, QueryDescriptor};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, RawQuery, State,
    },
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use serde_json::{json, Value};

// ==================== Responses ====================

#[derive(Debug, Serialize)]
pub struct BootcampListResponse {
    pub status: bool,
    pub count: usize,
    pub bootcamps: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct BootcampResponse {
    pub status: bool,
    pub bootcamp: Value,
}

impl BootcampResponse {
    fn success(bootcamp: Value) -> Json<Self> {
        Json(Self {
            status: true,
            bootcamp,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct RadiusSearchResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Value>,
}

// ==================== Handlers ====================

/// GET /bootcamps
pub async fn get_all_bootcamps(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<BootcampListResponse>> {
    let descriptor = QueryDescriptor::from_query_string(raw.as_deref().unwrap_or(""))?;
    let query = descriptor.into_find_query();

    tracing::debug!(filter = %query.filter.to_document(), sort = %query.sort.to_document(), "Listing bootcamps");

    let bootcamps = state.bootcamps.find(&query)?;
    Ok(Json(BootcampListResponse {
        status: true,
        count: bootcamps.len(),
        bootcamps,
    }))
}

/// GET /bootcamps/{id}
pub async fn get_bootcamp(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<BootcampResponse>> {
    let doc = state
        .bootcamps
        .find_by_id(&id)?
        .ok_or_else(|| ApiError::bootcamp_not_found(&id))?;
    Ok(BootcampResponse::success(doc.to_value()))
}

/// POST /bootcamps
pub async fn create_bootcamp(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    tracing::debug!(body = %body, "Creating bootcamp");

    let prepared = bootcamp::prepare_new(body, state.geocoder.as_ref()).await?;
    let doc = state.bootcamps.create(prepared)?;

    tracing::info!(id = %doc.id, "Bootcamp created");
    Ok((StatusCode::CREATED, Json(doc.to_value())))
}

/// PUT /bootcamps/{id}
pub async fn update_bootcamp(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<BootcampResponse>> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let doc = state
        .bootcamps
        .find_by_id_and_update(&id, body)?
        .ok_or_else(|| ApiError::bootcamp_not_found(&id))?;
    Ok(BootcampResponse::success(doc.to_value()))
}

/// DELETE /bootcamps/{id}
pub async fn delete_bootcamp(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<BootcampResponse>> {
    let doc = state
        .bootcamps
        .find_by_id_and_delete(&id)?
        .ok_or_else(|| ApiError::bootcamp_not_found(&id))?;

    tracing::info!(id = %doc.id, "Bootcamp deleted");
    Ok(BootcampResponse::success(json!({})))
}

/// GET /bootcamps/radius/{zipcode}/{distance}
pub async fn get_bootcamps_in_radius(
    State(state): State<AppState>,
    path: Result<Path<(String, f64)>, PathRejection>,
) -> ApiResult<Json<RadiusSearchResponse>> {
    let Path((zipcode, distance)) = path.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if !distance.is_finite() || distance < 0.0 {
        return Err(ApiError::BadRequest(format!(
            "Distance must be a non-negative number, got {}",
            distance
        )));
    }

    let center = state
        .geocoder
        .geocode(&zipcode)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::LocationNotFound(zipcode.clone()))?
        .point();

    let radius = state.distance_unit.angular_radius(distance);

    let filter = Filter::new().within_sphere(bootcamp::LOCATION_FIELD, center, radius);

    tracing::debug!(
        zipcode = %zipcode,
        distance,
        unit = ?state.distance_unit,
        radius,
        "Radius search"
    );

    let data = state.bootcamps.find(&FindQuery::new(filter))?;
    Ok(Json(RadiusSearchResponse {
        success: true,
        count: data.len(),
        data,
    }))
}
