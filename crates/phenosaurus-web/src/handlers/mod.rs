//! HTTP handlers for all web routes.

pub mod pages;
pub mod listgenes;
pub mod fishtail;
pub mod genefinder;
pub mod admin;
