//! EPA methane emissions dashboard: paged fetch + CSV cache of the
//! Envirofacts GHG tables, and the aggregations behind the three charts.

pub mod app;
pub mod color;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod state;
pub mod ui;
