//! HTTP API handlers for edna-api

pub mod health;
pub mod menu;
pub mod monitoring;

pub use health::health_routes;
pub use menu::menu_routes;
pub use monitoring::monitoring_routes;
