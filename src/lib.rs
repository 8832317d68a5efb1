pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod model;
pub mod service;
pub mod translate;
