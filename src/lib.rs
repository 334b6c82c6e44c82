#![doc = "The `taskvault` library crate."]
#![doc = ""]
#![doc = "This crate contains the core business logic of a per-user task tracking"]
#![doc = "backend: the identity/credential lifecycle, the task query engine, the"]
#![doc = "status aggregator, and the authorization guard, together with the HTTP"]
#![doc = "routing, persistence backends, and error handling around them."]
#![doc = "It is used by the main binary (`main.rs`) to construct and run the service."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
