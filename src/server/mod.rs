// src/server/mod.rs
use std::sync::Arc;

use rocket::{routes, Build, Rocket};

use crate::api;
use crate::brevo::BrevoClient;
use crate::campaign::CampaignEngine;
use crate::config::{AuthConfig, ServerConfig};
use crate::store::RecipientStore;
use crate::tracker::EmailTracker;

pub mod routes;

pub struct ServerState {
    pub auth: AuthConfig,
    pub engine: Arc<CampaignEngine>,
    pub brevo: Arc<BrevoClient>,
    pub store: RecipientStore,
    pub tracker: Arc<EmailTracker>,
}

pub fn build_rocket(config: &ServerConfig, state: ServerState) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("address", config.address.clone()))
        .merge(("port", config.port));

    rocket::custom(figment).manage(state).mount(
        "/api",
        routes![
            // Health and info endpoints
            routes::health::health_check,
            routes::health::index,
            // Campaign endpoints
            api::status::get_status,
            api::campaign::post_campaign,
            // Recipient endpoints
            api::recipients::get_recipients,
            api::recipients::subscribe,
            // Auth endpoints
            api::auth::login,
            api::auth::session,
            // Brevo endpoints
            api::brevo::test_configuration,
            api::brevo::account,
            api::brevo::plan,
            api::brevo::statistics,
            api::brevo::events,
            api::brevo::transactional_stats,
            api::test_email::send_test_email,
        ],
    )
}
