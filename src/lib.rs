//! Travel bucket-list backend: a seeded catalog of cities and landmarks, a
//! personal bucket list over it, and map markers for the front-end.

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
