//! Customer API module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/customers", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::register))
        .route("/authenticate", post(handler::authenticate))
        .route("/{phone}/stamps", get(handler::stamps))
        .route("/{phone}/stamps/reset", post(handler::reset_stamps))
        .route("/{phone}/points", post(handler::credit_points))
        .route("/{phone}/purchases", post(handler::credit_purchase))
        .route("/{phone}/rewards", post(handler::claim_reward))
        .route(
            "/{phone}/profile-image",
            get(handler::get_profile_image).put(handler::set_profile_image),
        )
}
