pub mod batch;
pub mod config;
pub mod error;
pub mod jobs;
pub mod models;
pub mod notify;
pub mod openapi;
pub mod pipeline;
pub mod resolver;
pub mod routes;
pub mod smtp;
pub mod store;
pub mod validation;
