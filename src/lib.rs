pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod game;
pub mod metrics;
pub mod models;
pub mod price;

use std::sync::Arc;

use crate::game::GameEngine;
use crate::price::PriceSource;

#[derive(Clone)]
pub struct AppState {
    pub engine: GameEngine,
    pub prices: Arc<dyn PriceSource>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
