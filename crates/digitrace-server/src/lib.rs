//! HTTP surface for digitrace runs.
//!
//! Runs a session per request and returns the full snapshot as JSON, so a
//! browser can render the race, the time series and the verdict without any
//! logic of its own. `/api/v1/random` serves generator output in the ANU QRNG
//! API format for clients written against that service.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use digitrace_core::{
    BetType, Error, GeneratorInfo, NoopObserver, RunConfig, StreamController, StreamSnapshot,
    all_generator_infos, configure_base, parse_seed, sample, select_generator_with,
};

/// Largest `length` accepted by `/api/v1/random`, matching the ANU service.
const MAX_RANDOM_LENGTH: usize = 1024;

/// Shared server state.
struct AppState {
    defaults: RunConfig,
    history: Mutex<RunHistory>,
}

#[derive(Default)]
struct RunHistory {
    completed: u64,
    last: Option<StreamSnapshot>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

/// An error rendered as `{success: false, error}` with a status code.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        let bad_input = e.is_validation()
            || matches!(e, Error::Config(_) | Error::UnknownAlgorithm(_));
        if bad_input {
            Self::bad_request(e.to_string())
        } else {
            log::error!("run failed: {e}");
            Self::internal(e.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

#[derive(Deserialize, Default)]
struct RunParams {
    algorithm: Option<String>,
    base: Option<u8>,
    digits: Option<usize>,
    sample_every: Option<usize>,
    /// Integer or free-text phrase.
    seed: Option<String>,
    /// Digit label, e.g. `7` or `C`.
    guess: Option<String>,
    bet: Option<String>,
}

/// A validated run request.
struct RunRequest {
    config: RunConfig,
    guess: Option<(String, BetType)>,
}

impl RunParams {
    fn into_request(self, defaults: &RunConfig) -> Result<RunRequest, ApiError> {
        let mut config = defaults.clone();
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if let Some(base) = self.base {
            config.base = base;
        }
        if let Some(digits) = self.digits {
            config.digits = digits;
        }
        if let Some(every) = self.sample_every {
            config.sample_every = every;
        }
        if let Some(seed) = self.seed.as_deref() {
            config.seed = Some(parse_seed(seed));
        }
        config.validate()?;

        let bet = match self.bet.as_deref() {
            Some(text) => Some(text.parse::<BetType>()?),
            None => None,
        };
        let guess = match (self.guess, bet) {
            (Some(label), bet) => Some((label, bet.unwrap_or(BetType::FinalCount))),
            (None, Some(_)) => return Err(ApiError::bad_request("bet given without a guess")),
            (None, None) => None,
        };
        Ok(RunRequest { config, guess })
    }
}

/// Execute one run to completion on the calling thread.
fn execute_run(request: RunRequest) -> Result<StreamSnapshot, Error> {
    let RunRequest { config, guess } = request;
    let mut controller = StreamController::from_config(&config)?;
    if let Some((label, bet)) = guess {
        controller.submit_guess_label(&label, bet)?;
    }
    controller.start_with(config.digits, &config.algorithm, config.generator_options())?;
    controller.run_to_completion(&mut NoopObserver)?;
    Ok(controller.snapshot())
}

async fn handle_run(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RunParams>,
) -> Result<Json<StreamSnapshot>, ApiError> {
    let request = params.into_request(&state.defaults)?;
    let snapshot = tokio::task::spawn_blocking(move || execute_run(request))
        .await
        .map_err(|e| ApiError::internal(format!("run worker failed: {e}")))??;

    let mut history = state.history.lock().await;
    history.completed += 1;
    history.last = Some(snapshot.clone());
    Ok(Json(snapshot))
}

async fn handle_last(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StreamSnapshot>, ApiError> {
    let history = state.history.lock().await;
    match &history.last {
        Some(snapshot) => Ok(Json(snapshot.clone())),
        None => Err(ApiError {
            status: StatusCode::NOT_FOUND,
            message: "no run has completed yet".to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// ANU-compatible random endpoint
// ---------------------------------------------------------------------------

#[derive(Deserialize, Default)]
struct RandomParams {
    length: Option<usize>,
    #[serde(rename = "type")]
    data_type: Option<String>,
    algorithm: Option<String>,
    seed: Option<String>,
}

#[derive(Serialize)]
struct RandomResponse {
    #[serde(rename = "type")]
    data_type: String,
    length: usize,
    data: serde_json::Value,
    success: bool,
    /// Generator that produced the digits.
    algorithm: &'static str,
}

/// Encode bytes in the ANU `uint8` or `hex16` layout.
fn encode_random(bytes: &[u8], data_type: &str) -> Option<serde_json::Value> {
    match data_type {
        "uint8" => Some(serde_json::Value::Array(
            bytes.iter().map(|&b| serde_json::Value::from(b)).collect(),
        )),
        "hex16" => Some(serde_json::Value::Array(
            bytes
                .chunks_exact(2)
                .map(|c| serde_json::Value::String(format!("{:02x}{:02x}", c[0], c[1])))
                .collect(),
        )),
        _ => None,
    }
}

/// Pack pairs of base-16 digits into bytes, high nibble first.
fn pack_nibbles(nibbles: &[u8]) -> Vec<u8> {
    nibbles
        .chunks_exact(2)
        .map(|pair| (pair[0] << 4) | pair[1])
        .collect()
}

async fn handle_random(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RandomParams>,
) -> Result<(StatusCode, Json<RandomResponse>), ApiError> {
    let length = params.length.unwrap_or(MAX_RANDOM_LENGTH);
    if !(1..=MAX_RANDOM_LENGTH).contains(&length) {
        return Err(ApiError::bad_request(format!(
            "length must be within 1..={MAX_RANDOM_LENGTH}"
        )));
    }
    let data_type = params.data_type.unwrap_or_else(|| "uint8".to_string());
    if encode_random(&[], &data_type).is_none() {
        return Err(ApiError::bad_request(format!(
            "unsupported type '{data_type}', use uint8 or hex16"
        )));
    }
    let key = params
        .algorithm
        .unwrap_or_else(|| state.defaults.algorithm.clone());
    let mut options = state.defaults.generator_options();
    if let Some(seed) = params.seed.as_deref() {
        options.seed = Some(parse_seed(seed));
    }
    // hex16 elements are two bytes each.
    let byte_count = if data_type == "hex16" {
        length * 2
    } else {
        length
    };

    let (algorithm, bytes) = tokio::task::spawn_blocking(move || {
        let mut generator = select_generator_with(&key, 16, options)?;
        let nibbles = sample(&mut *generator, byte_count * 2);
        Ok::<_, Error>((generator.key(), pack_nibbles(&nibbles)))
    })
    .await
    .map_err(|e| ApiError::internal(format!("random worker failed: {e}")))??;

    if bytes.len() < byte_count {
        return Err(ApiError::internal(format!(
            "{algorithm} produced {} of {byte_count} bytes",
            bytes.len()
        )));
    }
    let data = encode_random(&bytes, &data_type)
        .ok_or_else(|| ApiError::internal("encoding failed"))?;

    Ok((
        StatusCode::OK,
        Json(RandomResponse {
            data_type,
            length,
            data,
            success: true,
            algorithm,
        }),
    ))
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct AlgorithmsResponse {
    algorithms: Vec<&'static GeneratorInfo>,
    total: usize,
}

async fn handle_algorithms() -> Json<AlgorithmsResponse> {
    let algorithms = all_generator_infos();
    let total = algorithms.len();
    Json(AlgorithmsResponse { algorithms, total })
}

async fn handle_base(Path(base): Path<u8>) -> Response {
    match configure_base(base) {
        Ok(config) => Json(config).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: &'static str,
    runs_completed: u64,
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let history = state.history.lock().await;
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: digitrace_core::VERSION,
        runs_completed: history.completed,
    })
}

async fn handle_index(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let keys: Vec<&str> = all_generator_infos().iter().map(|i| i.key).collect();
    Json(serde_json::json!({
        "name": "digitrace server",
        "version": digitrace_core::VERSION,
        "defaults": state.defaults,
        "endpoints": {
            "/": "This API index",
            "/algorithms": "Metadata for every generator",
            "/bases/{base}": "Labels, colors and name for a base (2-16)",
            "/api/v1/run": {
                "method": "GET",
                "description": "Run one session and return its snapshot",
                "params": {
                    "algorithm": format!("Generator key. Available: {}", keys.join(", ")),
                    "base": "Digit base (2-16)",
                    "digits": "Number of digits",
                    "sample_every": "Time-series cadence",
                    "seed": "Integer or phrase",
                    "guess": "Digit label to bet on",
                    "bet": "final_count (default), lead_time, ghost_score",
                }
            },
            "/api/v1/last": "Snapshot of the most recent run",
            "/api/v1/random": {
                "method": "GET",
                "description": "Generator output in the ANU QRNG format",
                "params": {
                    "length": format!("Number of values (1-{MAX_RANDOM_LENGTH}, default: {MAX_RANDOM_LENGTH})"),
                    "type": "uint8 (default) or hex16",
                    "algorithm": "Generator key",
                    "seed": "Integer or phrase",
                }
            },
            "/health": "Health check",
        },
        "examples": {
            "ghost_hunt": "/api/v1/run?algorithm=randu&base=16&digits=2000&guess=A&bet=ghost_score",
            "random_bytes": "/api/v1/random?length=32&type=uint8&algorithm=pcg",
        }
    }))
}

/// Build the axum router.
fn build_router(defaults: RunConfig) -> Router {
    let state = Arc::new(AppState {
        defaults,
        history: Mutex::new(RunHistory::default()),
    });

    Router::new()
        .route("/", get(handle_index))
        .route("/algorithms", get(handle_algorithms))
        .route("/bases/{base}", get(handle_base))
        .route("/api/v1/run", get(handle_run))
        .route("/api/v1/last", get(handle_last))
        .route("/api/v1/random", get(handle_random))
        .route("/health", get(handle_health))
        .with_state(state)
}

/// Run the HTTP server until it fails.
pub async fn run_server(defaults: RunConfig, host: &str, port: u16) -> std::io::Result<()> {
    let app = build_router(defaults);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("listening on http://{addr}");
    axum::serve(listener, app).await
}
