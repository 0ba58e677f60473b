use std::sync::Arc;

use rainfall_model::LoadState;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::pages::Pages;

/// Largest accepted form body
const MAX_FORM_BYTES: u64 = 16 * 1024;

/// Every route the service exposes.
pub fn routes(
    state: Arc<LoadState>,
    pages: Arc<Pages>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    index(pages.clone()).or(predict(state, pages)).unify()
}

/// GET /
fn index(pages: Arc<Pages>) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::get()
        .and(warp::path::end())
        .map(move || warp::reply::html(pages.index.clone()).into_response())
}

/// POST /predict
fn predict(
    state: Arc<LoadState>,
    pages: Arc<Pages>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::post()
        .and(warp::path("predict"))
        .and(warp::path::end())
        .and(warp::body::content_length_limit(MAX_FORM_BYTES))
        .and(warp::body::form::<Vec<(String, String)>>())
        .map(move |fields: Vec<(String, String)>| handle_predict(&state, &pages, fields))
}

/// Result page on success, plain-text diagnostic otherwise; always 200.
fn handle_predict(state: &LoadState, pages: &Pages, fields: Vec<(String, String)>) -> Response {
    let field_count = fields.len();

    match state.predict(fields) {
        Ok(prediction) => {
            tracing::debug!(
                "Predicted label {} ({:?}) from {} fields",
                prediction.label,
                prediction.outlook,
                field_count
            );
            warp::reply::html(pages.result_page(prediction.outlook).to_string()).into_response()
        }
        Err(e) => {
            tracing::warn!("Prediction failed at {} stage: {}", e.stage(), e);
            e.response_text().into_response()
        }
    }
}
