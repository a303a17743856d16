#![doc = "The `laundry_tracker` library crate."]
#![doc = ""]
#![doc = "Domain models, authentication, persistence, workflows and routing for the laundry"]
#![doc = "tracking service. The binary (`main.rs`) wires these into an actix-web server."]

pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
