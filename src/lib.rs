pub mod catalog;
pub mod config;
pub mod db;
pub mod digest;
pub mod error;
pub mod filter;
pub mod models;
pub mod prefs;
pub mod scoring;
pub mod tracker;
