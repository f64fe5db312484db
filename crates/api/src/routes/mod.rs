pub mod event;
pub mod health;
pub mod inscription;
pub mod payment;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /inscription/creeinscription                  create (participant)
/// /inscription/get                              list for own events (manager)
/// /inscription/getparticipant                   list own (participant)
/// /inscription/{id}                             get one
/// /inscription/valider/{id}                     confirm (PUT, manager)
/// /inscription/annulee/{id}                     cancel (PUT)
/// /inscription/annuleeinscription/{id}          self-delete (DELETE, participant)
/// /inscription/deleteinscription/{id}           remove with reason (DELETE, manager)
///
/// /payment/create                               submit, multipart (participant)
/// /payment/get                                  list for own events (manager)
/// /payment/valider/{id}                         approve / reject (PUT or PATCH)
/// /payment/get/{inscription_id}                 payment of a registration
///
/// /event/create                                 create (manager)
/// /event/get                                    list accepted (public)
/// /event/mine                                   list own (manager)
/// /event/get/{id}                               get one
/// /event/update/{id}                            edit (PUT, manager)
/// /event/etat/{id}                              set state (PUT, admin)
/// /event/delete/{id}                            delete with cascade (DELETE)
/// ```
///
/// `max_upload_bytes` bounds the multipart payment body.
pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .nest("/inscription", inscription::router())
        .nest("/payment", payment::router(max_upload_bytes))
        .nest("/event", event::router())
}
