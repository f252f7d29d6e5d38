pub mod contact;

use axum::routing::get;
use axum::Router;

use crate::state::SharedState;

pub fn view_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(contact::page))
        .route("/contact", get(contact::page).post(contact::submit))
}
