use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::payment;
use crate::state::AppState;

/// Headroom on top of the proof size for the other multipart fields.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Payment routes, mounted at `/payment`.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/create",
            post(payment::create)
                .layer(DefaultBodyLimit::max(max_upload_bytes + FORM_OVERHEAD_BYTES)),
        )
        .route("/get", get(payment::list_managed))
        .route("/valider/{id}", put(payment::review).patch(payment::review))
        .route("/get/{inscription_id}", get(payment::get_by_registration))
}
