//! Content-managed blog.
//!
//! REST endpoints over a pluggable post/settings store, a typed client for
//! those endpoints, and the client-side controller that keeps the post list,
//! site settings and admin session in step with the store.

pub mod auth;
pub mod client;
pub mod config;
pub mod constants;
pub mod controller;
pub mod db;
pub mod store;
pub mod web;
