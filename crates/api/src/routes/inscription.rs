use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::inscription;
use crate::state::AppState;

/// Registration routes, mounted at `/inscription`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/creeinscription", post(inscription::create))
        .route("/get", get(inscription::list_managed))
        .route("/getparticipant", get(inscription::list_own))
        .route("/{id}", get(inscription::get_by_id))
        .route("/valider/{id}", put(inscription::confirm))
        .route("/annulee/{id}", put(inscription::cancel))
        .route("/annuleeinscription/{id}", delete(inscription::delete_own))
        .route("/deleteinscription/{id}", delete(inscription::remove))
}
