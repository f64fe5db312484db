use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::event;
use crate::state::AppState;

/// Event directory routes, mounted at `/event`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(event::create))
        .route("/get", get(event::list))
        .route("/mine", get(event::list_mine))
        .route("/get/{id}", get(event::get_by_id))
        .route("/update/{id}", put(event::update))
        .route("/etat/{id}", put(event::set_state))
        .route("/delete/{id}", delete(event::delete))
}
