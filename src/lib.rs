pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    generation_service::GenerationService, result_service::ResultService,
    session_service::SessionService,
};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub generation_service: GenerationService,
    pub session_service: SessionService,
    pub result_service: ResultService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(180))
            .build()
            .expect("failed to build HTTP client");

        let generation_service = GenerationService::new(
            config.ai_gateway_url.clone(),
            config.ai_gateway_api_key.clone(),
            config.ai_model.clone(),
            http_client,
        );
        let session_service = SessionService::new();
        let result_service = ResultService::new(pool.clone());

        Self {
            pool,
            generation_service,
            session_service,
            result_service,
        }
    }
}
