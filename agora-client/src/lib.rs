pub mod api;
pub mod auth;
pub mod config;
pub mod controllers;
pub mod forms;
pub mod logging;
pub mod optimistic;
pub mod pagination;
pub mod session;
pub mod store;
