//! REST API for the stowage advisor.
//!
//! Every request carries its own inventory snapshot; the service keeps no
//! state between calls apart from the engine configuration.
//! Uses Axum as the web framework and supports CORS.

use std::sync::OnceLock;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use utoipa::{OpenApi, ToSchema};

use crate::config::ApiConfig;
use crate::engine::{self, EngineConfig};
use crate::inventory::{
    ContainerUtilization, Inventory, InventoryError, InventorySummary, PriorityCounts, StatusCounts,
};
use crate::model::{
    ActionKind, ActionLogEntry, Container, Item, Priority, Status, ValidationError,
};
use crate::placement::{self, PlacementRecommendation, PlacementTarget};
use crate::rearrangement::{self, RearrangementPlan, RearrangementStep};
use crate::search;
use crate::types::MAX_SPAN_DAYS;
use crate::waste::WasteManifest;

#[derive(Clone)]
struct ApiState {
    engine: EngineConfig,
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

// SRI hashes verified against https://unpkg.com/swagger-ui-dist@5.17.14/.
const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>Stowage Advisor API Docs</title>
        <link
            rel="stylesheet"
            href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"
            integrity="sha384-wxLW6kwyHktdDGr6Pv1zgm/VGJh99lfUbzSn6HNHBENZlCN7W602k9VkGdxuFvPn"
            crossorigin="anonymous"
        />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"
            integrity="sha384-wmyclcVGX/WhUkdkATwhaK1X1JtiNrr2EoYJ+diV3vj4v6OC5yCeSu+yW13SYJep"
            crossorigin="anonymous"
        ></script>
        <script>
            window.onload = function () {
                window.ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                });
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// Item and container snapshot shared by most endpoints.
#[derive(Deserialize, Clone, ToSchema)]
#[schema(
    example = json!({
        "items": [{
            "id": "FD-001",
            "name": "Food Packet",
            "priority": "high",
            "status": "in-transit",
            "location": "Airlock",
            "weight": 2.5,
            "volume": 4.0,
            "lastModified": "2026-10-01T08:00:00Z"
        }],
        "containers": [{ "id": "C-01", "name": "Galley Bay", "capacity": 100.0, "location": "Node 1" }]
    })
)]
pub struct SnapshotRequest {
    pub items: Vec<Item>,
    pub containers: Vec<Container>,
}

impl SnapshotRequest {
    /// Validates the snapshot and derives container fill from item locations.
    fn into_validated(self) -> Result<Inventory, InventoryError> {
        Inventory::new(self.items, self.containers)
    }
}

#[derive(Deserialize, ToSchema)]
pub struct RearrangementRequest {
    pub items: Vec<Item>,
    pub containers: Vec<Container>,
    /// Items that need space; usually the unplaceable in-transit items
    pub incoming: Vec<Item>,
}

#[derive(Deserialize, ToSchema)]
pub struct ApplyPlanRequest {
    pub items: Vec<Item>,
    pub containers: Vec<Container>,
    pub plan: RearrangementPlan,
    pub user: String,
}

#[derive(Deserialize, ToSchema)]
pub struct SearchRequest {
    pub query: String,
    pub items: Vec<Item>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpiringRequest {
    pub items: Vec<Item>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub threshold_days: Option<i64>,
}

#[derive(Deserialize, ToSchema)]
pub struct SimulateRequest {
    pub items: Vec<Item>,
    /// Optional; container fill is re-derived from the advanced items
    #[serde(default)]
    pub containers: Vec<Container>,
    pub days: u32,
}

/// Snapshot plus the item an operator acts on.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemActionRequest {
    pub items: Vec<Item>,
    pub containers: Vec<Container>,
    pub item_id: String,
    pub user: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ManifestRequest {
    pub items: Vec<Item>,
}

/// Placement advice for a single in-transit item.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub item_id: String,
    pub item_name: String,
    pub target: PlacementTarget,
    /// Display label: container name or "Requires rearrangement"
    pub target_label: String,
    pub reason_code: String,
    pub reason: String,
}

impl From<&PlacementRecommendation> for RecommendationResponse {
    fn from(rec: &PlacementRecommendation) -> Self {
        Self {
            item_id: rec.item_id.clone(),
            item_name: rec.item_name.clone(),
            target: rec.target.clone(),
            target_label: rec.target.to_string(),
            reason_code: rec.reason.code().to_string(),
            reason: rec.reason.to_string(),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlacementResponse {
    pub recommendations: Vec<RecommendationResponse>,
    pub placed: usize,
    pub requires_rearrangement: usize,
}

impl PlacementResponse {
    fn from_recommendations(recommendations: &[PlacementRecommendation]) -> Self {
        let requires_rearrangement = recommendations
            .iter()
            .filter(|rec| rec.target.requires_rearrangement())
            .count();
        Self {
            recommendations: recommendations.iter().map(RecommendationResponse::from).collect(),
            placed: recommendations.len() - requires_rearrangement,
            requires_rearrangement,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub placement: PlacementResponse,
    #[schema(nullable = true)]
    pub plan: Option<RearrangementPlan>,
}

#[derive(Serialize, ToSchema)]
pub struct RearrangementResponse {
    /// Absent when there is no shortfall or it cannot be covered
    #[schema(nullable = true)]
    pub plan: Option<RearrangementPlan>,
}

/// Updated snapshot plus the action-log entries the change produced.
#[derive(Serialize, ToSchema)]
pub struct SnapshotUpdateResponse {
    pub items: Vec<Item>,
    pub containers: Vec<Container>,
    pub log: Vec<ActionLogEntry>,
}

#[derive(Serialize, ToSchema)]
pub struct ItemsResponse {
    pub items: Vec<Item>,
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    details: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    details: impl Into<String>,
) -> Response {
    (status, Json(ErrorResponse::new(error, details))).into_response()
}

fn json_deserialize_error(err: JsonRejection) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid JSON data",
        err.to_string(),
    )
}

fn validation_error(details: impl Into<String>) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid input data",
        details,
    )
}

fn inventory_error(err: InventoryError) -> Response {
    match err {
        InventoryError::Validation(inner) => validation_error(inner.to_string()),
        other => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Inventory operation refused",
            other.to_string(),
        ),
    }
}

fn parse_payload<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    payload
        .map(|Json(payload)| payload)
        .map_err(json_deserialize_error)
}

fn validate_items(items: &[Item]) -> Result<(), Response> {
    items
        .iter()
        .try_for_each(Item::validate)
        .map_err(|err: ValidationError| validation_error(err.to_string()))
}

fn require_user(user: &str) -> Result<&str, Response> {
    let user = user.trim();
    if user.is_empty() {
        return Err(validation_error("user must not be empty"));
    }
    Ok(user)
}

fn snapshot_update(inventory: Inventory, log: Vec<ActionLogEntry>) -> Response {
    let (items, containers) = inventory.into_parts();
    let response = SnapshotUpdateResponse {
        items,
        containers,
        log,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// Runs one operator action on an item of the request snapshot.
fn apply_item_action(
    payload: Result<Json<ItemActionRequest>, JsonRejection>,
    action: impl FnOnce(
        &mut Inventory,
        &str,
        &str,
        DateTime<Utc>,
    ) -> Result<ActionLogEntry, InventoryError>,
) -> Response {
    let request = match parse_payload(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let user = match require_user(&request.user) {
        Ok(user) => user.to_string(),
        Err(response) => return response,
    };

    let mut inventory = match Inventory::new(request.items, request.containers) {
        Ok(inventory) => inventory,
        Err(err) => return inventory_error(err),
    };
    match action(&mut inventory, &request.item_id, &user, Utc::now()) {
        Ok(entry) => snapshot_update(inventory, vec![entry]),
        Err(err) => inventory_error(err),
    }
}

fn parse_snapshot(
    payload: Result<Json<SnapshotRequest>, JsonRejection>,
) -> Result<Inventory, Response> {
    parse_payload(payload)?
        .into_validated()
        .map_err(inventory_error)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handle_placement,
        handle_placement_stream,
        handle_accept_placement,
        handle_analyze,
        handle_rearrangement,
        handle_apply_rearrangement,
        handle_retrieve_item,
        handle_mark_waste,
        handle_search,
        handle_expiring,
        handle_simulate,
        handle_waste_manifest,
        handle_summary
    ),
    components(
        schemas(
            SnapshotRequest,
            RearrangementRequest,
            ApplyPlanRequest,
            SearchRequest,
            ExpiringRequest,
            SimulateRequest,
            ManifestRequest,
            RecommendationResponse,
            PlacementResponse,
            AnalyzeResponse,
            RearrangementResponse,
            SnapshotUpdateResponse,
            ItemsResponse,
            ItemActionRequest,
            ErrorResponse,
            Item,
            Container,
            Priority,
            Status,
            ActionKind,
            ActionLogEntry,
            PlacementTarget,
            RearrangementPlan,
            RearrangementStep,
            WasteManifest,
            InventorySummary,
            PriorityCounts,
            StatusCounts,
            ContainerUtilization
        )
    ),
    tags(
        (name = "placement", description = "Placement advice and rearrangement planning"),
        (name = "inventory", description = "Search, expiry watch and dashboard figures"),
        (name = "lifecycle", description = "Time simulation and waste disposal")
    )
)]
struct ApiDoc;

fn router(engine: EngineConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/placement", post(handle_placement))
        .route("/placement_stream", post(handle_placement_stream))
        .route("/placement/accept", post(handle_accept_placement))
        .route("/analyze", post(handle_analyze))
        .route("/rearrangement", post(handle_rearrangement))
        .route("/rearrangement/apply", post(handle_apply_rearrangement))
        .route("/items/retrieve", post(handle_retrieve_item))
        .route("/items/waste", post(handle_mark_waste))
        .route("/search", post(handle_search))
        .route("/expiring", post(handle_expiring))
        .route("/simulate", post(handle_simulate))
        .route("/waste/manifest", post(handle_waste_manifest))
        .route("/summary", post(handle_summary))
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        .layer(cors)
        .with_state(ApiState { engine })
}

/// Starts the API server on the configured address.
///
/// Blocks until the server is terminated; fails only if the listener cannot
/// be bound or the server stops with an I/O error.
pub async fn start_api_server(config: ApiConfig, engine: EngineConfig) -> std::io::Result<()> {
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        "🚀 Server running on http://{}:{}",
        config.display_host(),
        config.port()
    );
    if config.binds_to_all_interfaces() {
        info!("💡 Local access: http://localhost:{}", config.port());
    }
    info!("📑 Documentation: GET /docs, GET /docs/openapi.json");

    axum::serve(listener, router(engine)).await
}

/// Handler for POST /placement.
///
/// Recommends a container for every in-transit item of the snapshot.
#[utoipa::path(
    post,
    path = "/placement",
    request_body = SnapshotRequest,
    responses(
        (status = 200, description = "One recommendation per in-transit item", body = PlacementResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "placement"
)]
async fn handle_placement(
    State(_state): State<ApiState>,
    payload: Result<Json<SnapshotRequest>, JsonRejection>,
) -> Response {
    let inventory = match parse_snapshot(payload) {
        Ok(inventory) => inventory,
        Err(response) => return response,
    };

    info!(
        "📥 Placement request: {} items, {} containers",
        inventory.items().len(),
        inventory.containers().len()
    );
    let recommendations = placement::recommend(inventory.items(), inventory.containers());
    let response = PlacementResponse::from_recommendations(&recommendations);
    info!(
        "📦 Result: {} placed, {} require rearrangement",
        response.placed, response.requires_rearrangement
    );

    (StatusCode::OK, Json(response)).into_response()
}

/// Handler for POST /placement_stream (SSE).
///
/// Streams one event per recommendation followed by a summary event.
#[utoipa::path(
    post,
    path = "/placement_stream",
    request_body = SnapshotRequest,
    responses(
        (
            status = 200,
            description = "Streams placement events in real-time",
            content_type = "text/event-stream",
            body = String
        ),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "placement"
)]
async fn handle_placement_stream(
    State(_state): State<ApiState>,
    payload: Result<Json<SnapshotRequest>, JsonRejection>,
) -> Response {
    let inventory = match parse_snapshot(payload) {
        Ok(inventory) => inventory,
        Err(response) => return response,
    };

    let (tx, rx) = mpsc::channel::<String>(32);

    tokio::task::spawn_blocking(move || {
        let (items, containers) = inventory.into_parts();
        let mut receiver_gone = false;
        placement::recommend_with_progress(&items, &containers, |evt| {
            if receiver_gone {
                return;
            }
            match serde_json::to_string(evt) {
                // A failed send means the client disconnected.
                Ok(json) => receiver_gone = tx.blocking_send(json).is_err(),
                Err(err) => warn!("could not serialize placement event: {}", err),
            }
        });
    });

    let stream = ReceiverStream::new(rx)
        .map(|msg| Ok::<_, std::convert::Infallible>(Event::default().data(msg)));
    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(std::time::Duration::from_secs(10))
                .text("keep-alive"),
        )
        .into_response()
}

/// Handler for POST /analyze.
///
/// Placement advice plus, when items cannot be seated, a rearrangement plan
/// using those items as the incoming set.
#[utoipa::path(
    post,
    path = "/analyze",
    request_body = SnapshotRequest,
    responses(
        (status = 200, description = "Recommendations and optional plan", body = AnalyzeResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "placement"
)]
async fn handle_analyze(
    State(state): State<ApiState>,
    payload: Result<Json<SnapshotRequest>, JsonRejection>,
) -> Response {
    let inventory = match parse_snapshot(payload) {
        Ok(inventory) => inventory,
        Err(response) => return response,
    };

    let analysis = engine::analyze(inventory.items(), inventory.containers(), &state.engine);
    let response = AnalyzeResponse {
        placement: PlacementResponse::from_recommendations(&analysis.recommendations),
        plan: analysis.plan,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// Handler for POST /rearrangement.
#[utoipa::path(
    post,
    path = "/rearrangement",
    request_body = RearrangementRequest,
    responses(
        (status = 200, description = "Eviction plan, if one is needed and possible", body = RearrangementResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "placement"
)]
async fn handle_rearrangement(
    State(state): State<ApiState>,
    payload: Result<Json<RearrangementRequest>, JsonRejection>,
) -> Response {
    let request = match parse_payload(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    if let Err(response) = validate_items(&request.incoming) {
        return response;
    }
    let inventory = match Inventory::new(request.items, request.containers) {
        Ok(inventory) => inventory,
        Err(err) => return inventory_error(err),
    };

    let plan = rearrangement::plan_with_staging(
        inventory.items(),
        inventory.containers(),
        &request.incoming,
        &state.engine.staging_location,
    );
    (StatusCode::OK, Json(RearrangementResponse { plan })).into_response()
}

/// Handler for POST /rearrangement/apply.
///
/// Applies a plan to the snapshot and returns the updated snapshot with one
/// relocate entry per step.
#[utoipa::path(
    post,
    path = "/rearrangement/apply",
    request_body = ApplyPlanRequest,
    responses(
        (status = 200, description = "Updated snapshot and log entries", body = SnapshotUpdateResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid request or stale plan", body = ErrorResponse)
    ),
    tag = "placement"
)]
async fn handle_apply_rearrangement(
    State(_state): State<ApiState>,
    payload: Result<Json<ApplyPlanRequest>, JsonRejection>,
) -> Response {
    let request = match parse_payload(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let user = match require_user(&request.user) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let mut inventory = match Inventory::new(request.items, request.containers) {
        Ok(inventory) => inventory,
        Err(err) => return inventory_error(err),
    };
    match inventory.apply_plan(&request.plan, user, Utc::now()) {
        Ok(log) => snapshot_update(inventory, log),
        Err(err) => inventory_error(err),
    }
}

/// Handler for POST /placement/accept.
///
/// Stows an in-transit item in the container the advisor recommends for the
/// submitted snapshot.
#[utoipa::path(
    post,
    path = "/placement/accept",
    request_body = ItemActionRequest,
    responses(
        (status = 200, description = "Updated snapshot and place entry", body = SnapshotUpdateResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid request or no container available", body = ErrorResponse)
    ),
    tag = "placement"
)]
async fn handle_accept_placement(
    State(_state): State<ApiState>,
    payload: Result<Json<ItemActionRequest>, JsonRejection>,
) -> Response {
    apply_item_action(payload, Inventory::accept_placement)
}

/// Handler for POST /items/retrieve.
#[utoipa::path(
    post,
    path = "/items/retrieve",
    request_body = ItemActionRequest,
    responses(
        (status = 200, description = "Updated snapshot and retrieve entry", body = SnapshotUpdateResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid request or unknown item", body = ErrorResponse)
    ),
    tag = "inventory"
)]
async fn handle_retrieve_item(
    State(_state): State<ApiState>,
    payload: Result<Json<ItemActionRequest>, JsonRejection>,
) -> Response {
    apply_item_action(payload, Inventory::retrieve)
}

/// Handler for POST /items/waste.
#[utoipa::path(
    post,
    path = "/items/waste",
    request_body = ItemActionRequest,
    responses(
        (status = 200, description = "Updated snapshot and dispose entry", body = SnapshotUpdateResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid request, unknown item or already waste", body = ErrorResponse)
    ),
    tag = "lifecycle"
)]
async fn handle_mark_waste(
    State(_state): State<ApiState>,
    payload: Result<Json<ItemActionRequest>, JsonRejection>,
) -> Response {
    apply_item_action(payload, Inventory::mark_waste)
}

/// Handler for POST /search.
#[utoipa::path(
    post,
    path = "/search",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Matching items, best first", body = ItemsResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "inventory"
)]
async fn handle_search(
    State(_state): State<ApiState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Response {
    let request = match parse_payload(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    if let Err(response) = validate_items(&request.items) {
        return response;
    }

    let items = search::rank(&request.query, &request.items);
    (StatusCode::OK, Json(ItemsResponse { items })).into_response()
}

/// Handler for POST /expiring.
///
/// Uses the configured threshold unless the request overrides it.
#[utoipa::path(
    post,
    path = "/expiring",
    request_body = ExpiringRequest,
    responses(
        (status = 200, description = "Items expiring within the window", body = ItemsResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "inventory"
)]
async fn handle_expiring(
    State(state): State<ApiState>,
    payload: Result<Json<ExpiringRequest>, JsonRejection>,
) -> Response {
    let request = match parse_payload(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    if let Err(response) = validate_items(&request.items) {
        return response;
    }

    let threshold = match request.threshold_days {
        Some(days) if !(0..=MAX_SPAN_DAYS).contains(&days) => {
            return validation_error(format!(
                "thresholdDays must be between 0 and {}",
                MAX_SPAN_DAYS
            ));
        }
        Some(days) => days,
        None => state.engine.expiring_threshold_days,
    };
    let items = search::identify_expiring(&request.items, threshold, Utc::now());
    (StatusCode::OK, Json(ItemsResponse { items })).into_response()
}

/// Handler for POST /simulate.
///
/// Advances the items by `days` and reports every item that expired.
#[utoipa::path(
    post,
    path = "/simulate",
    request_body = SimulateRequest,
    responses(
        (status = 200, description = "Advanced snapshot and expiration log", body = SnapshotUpdateResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "lifecycle"
)]
async fn handle_simulate(
    State(state): State<ApiState>,
    payload: Result<Json<SimulateRequest>, JsonRejection>,
) -> Response {
    let request = match parse_payload(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let mut inventory = match Inventory::new(request.items, request.containers) {
        Ok(inventory) => inventory,
        Err(err) => return inventory_error(err),
    };

    let now = Utc::now();
    let advanced = match engine::simulate(inventory.items(), request.days, now, &state.engine) {
        Ok(advanced) => advanced,
        Err(err) => return validation_error(err.to_string()),
    };
    let log = inventory.record_expirations(advanced, now);
    info!(
        "⏱️ Simulated {} days: {} items expired",
        request.days,
        log.len()
    );

    snapshot_update(inventory, log)
}

/// Handler for POST /waste/manifest.
///
/// Non-waste items in the request are ignored.
#[utoipa::path(
    post,
    path = "/waste/manifest",
    request_body = ManifestRequest,
    responses(
        (status = 200, description = "Disposal manifest", body = WasteManifest),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "lifecycle"
)]
async fn handle_waste_manifest(
    State(state): State<ApiState>,
    payload: Result<Json<ManifestRequest>, JsonRejection>,
) -> Response {
    let request = match parse_payload(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    if let Err(response) = validate_items(&request.items) {
        return response;
    }

    let manifest = engine::manifest(&request.items, &state.engine, Utc::now());
    (StatusCode::OK, Json(manifest)).into_response()
}

/// Handler for POST /summary.
#[utoipa::path(
    post,
    path = "/summary",
    request_body = SnapshotRequest,
    responses(
        (status = 200, description = "Dashboard figures", body = InventorySummary),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "inventory"
)]
async fn handle_summary(
    State(_state): State<ApiState>,
    payload: Result<Json<SnapshotRequest>, JsonRejection>,
) -> Response {
    match parse_snapshot(payload) {
        Ok(inventory) => (StatusCode::OK, Json(inventory.summary())).into_response(),
        Err(response) => response,
    }
}

async fn serve_openapi_json(State(_state): State<ApiState>) -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui(State(_state): State<ApiState>) -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}
