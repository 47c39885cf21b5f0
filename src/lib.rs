pub mod app;
pub mod autocomplete;
pub mod config;
pub mod filmography;
pub mod tmdb;
pub mod views;
