#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod action;
pub mod routes;
pub mod server;
pub mod utils;
