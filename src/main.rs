use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use price_predictor::dataset::{self, ReferenceDataset};
use price_predictor::error::StartupError;
use price_predictor::model::{format_price, PricePipeline};
use price_predictor::types::{FeatureRow, PredictionRequest};

// ---------- Pages and messages ----------

const PAGE: &str = include_str!("../static/index.html");

// Shown on every route when the artifacts could not be loaded; the form is
// never rendered in that state.
const MISSING_PAGE: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Laptop Price Predictor</title></head>
<body style="font-family: sans-serif; max-width: 40em; margin: 4em auto;">
<h1>Laptop Price Predictor</h1>
<p><strong>Model files not found.</strong></p>
<p>Ensure the pipeline and reference dataset artifacts are present
(by default <code>model/pipeline.json</code> and <code>model/laptops.json</code>),
then restart the server.</p>
</body>
</html>
"#;

// One flat message for every prediction failure, whatever the root cause.
const GENERIC_ERROR: &str = "An error occurred. Please check all input fields and try again.";

// ---------- Server state ----------

/// Everything loaded once at startup, read-only afterwards.
struct PredictContext {
    pipeline: PricePipeline,
    dataset: ReferenceDataset,
}

impl PredictContext {
    fn load(pipeline_path: &str, dataset_path: &str) -> Result<Self, StartupError> {
        let pipeline = PricePipeline::load(pipeline_path)?;
        let dataset = ReferenceDataset::load(dataset_path)?;
        Ok(Self { pipeline, dataset })
    }
}

#[derive(Clone)]
struct AppState {
    ctx: Arc<PredictContext>,
}

// ---------- Handlers ----------

async fn index() -> Html<&'static str> {
    Html(PAGE)
}

/// Option lists for all 13 form inputs. Categorical columns come from the
/// reference dataset, the rest are the fixed enumerations.
async fn options(State(state): State<AppState>) -> Json<serde_json::Value> {
    let ds = &state.ctx.dataset;
    Json(json!({
        "brand": ds.brands(),
        "type": ds.type_names(),
        "ram_gb": dataset::RAM_GB,
        "touchscreen": ["No", "Yes"],
        "ips_display": ["No", "Yes"],
        "resolution": dataset::RESOLUTIONS,
        "cpu_brand": ds.cpu_brands(),
        "hdd_gb": dataset::HDD_GB,
        "ssd_gb": dataset::SSD_GB,
        "gpu_brand": ds.gpu_brands(),
        "os": ds.oses(),
    }))
}

/// One prediction per request: derive the row, run the pipeline, format.
/// Every failure maps to the same generic message; the request is discarded
/// and the server keeps going.
async fn predict(
    State(state): State<AppState>,
    Json(req): Json<PredictionRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let price = FeatureRow::derive(&req)
        .and_then(|row| state.ctx.pipeline.predict_price(&row))
        .map_err(|e| {
            tracing::warn!("prediction failed: {e}");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": GENERIC_ERROR })),
            )
        })?;

    tracing::info!("predicted price {price:.2} for {} {}", req.brand, req.type_name);
    Ok(Json(json!({
        "price": price,
        "display": format_price(price),
    })))
}

async fn artifacts_missing() -> (StatusCode, Html<&'static str>) {
    (StatusCode::SERVICE_UNAVAILABLE, Html(MISSING_PAGE))
}

// ---------- Routers ----------

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/options", get(options))
        .route("/predict", post(predict))
        .with_state(state)
}

/// Degraded mode: no form, no prediction endpoint, just the explanation.
fn degraded_router() -> Router {
    Router::new().fallback(artifacts_missing)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let pipeline_path =
        std::env::var("PIPELINE_PATH").unwrap_or_else(|_| "model/pipeline.json".to_string());
    let dataset_path =
        std::env::var("DATASET_PATH").unwrap_or_else(|_| "model/laptops.json".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    let app = match PredictContext::load(&pipeline_path, &dataset_path) {
        Ok(ctx) => {
            tracing::info!(
                "loaded pipeline ({} columns, {} encoded features) and {} reference records",
                ctx.pipeline.n_columns(),
                ctx.pipeline.n_features(),
                ctx.dataset.len()
            );
            router(AppState { ctx: Arc::new(ctx) })
        }
        Err(e) => {
            tracing::error!("startup failed: {e}; serving files-not-found page only");
            degraded_router()
        }
    };

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_state() -> AppState {
        let ctx = PredictContext::load("model/pipeline.json", "model/laptops.json")
            .expect("shipped artifacts should load");
        AppState { ctx: Arc::new(ctx) }
    }

    fn request_json(brand: &str) -> PredictionRequest {
        serde_json::from_value(json!({
            "brand": brand,
            "type": "Notebook",
            "ram_gb": 8,
            "weight_kg": 1.5,
            "touchscreen": "No",
            "ips_display": "Yes",
            "resolution": "1366x768",
            "screen_size_in": 15.6,
            "cpu_brand": "Intel",
            "hdd_gb": 0,
            "ssd_gb": 256,
            "gpu_brand": "Intel",
            "os": "Windows"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_predict_handler_success() {
        let state = fixture_state();
        let out = predict(State(state), Json(request_json("Dell")))
            .await
            .expect("valid request should predict");
        let body = out.0;
        let price = body["price"].as_f64().unwrap();
        assert!(price > 0.0 && price.is_finite());
        let display = body["display"].as_str().unwrap();
        assert!(display.starts_with('₹'), "got {display}");
        assert_eq!(
            display.len() - display.rfind('.').unwrap(),
            3,
            "two decimal digits: {display}"
        );
    }

    #[tokio::test]
    async fn test_predict_handler_fail_soft_on_unseen_brand() {
        let state = fixture_state();
        let err = predict(State(state.clone()), Json(request_json("Commodore")))
            .await
            .expect_err("unseen brand should fail");
        assert_eq!(err.0, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.1 .0["error"], GENERIC_ERROR);

        // server state is untouched; the next valid request still works
        let ok = predict(State(state), Json(request_json("Dell"))).await;
        assert!(ok.is_ok(), "server must keep serving after an error");
    }

    #[tokio::test]
    async fn test_options_handler_lists_everything() {
        let state = fixture_state();
        let body = options(State(state)).await.0;
        assert_eq!(body["resolution"].as_array().unwrap().len(), 9);
        assert_eq!(body["ram_gb"].as_array().unwrap().len(), 9);
        assert_eq!(body["hdd_gb"].as_array().unwrap().len(), 6);
        assert_eq!(body["ssd_gb"].as_array().unwrap().len(), 6);
        assert_eq!(body["touchscreen"], json!(["No", "Yes"]));
        assert!(!body["brand"].as_array().unwrap().is_empty());
        assert!(!body["os"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_degraded_mode_shows_missing_message() {
        let (status, page) = artifacts_missing().await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(page.0.contains("Model files not found"));
        assert!(!page.0.contains("<form"), "no prediction UI in degraded mode");
    }

    #[test]
    fn test_missing_artifacts_fail_startup() {
        let result = PredictContext::load("no/such/pipeline.json", "no/such/laptops.json");
        assert!(matches!(result, Err(StartupError::Read { .. })));
    }
}
