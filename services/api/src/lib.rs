pub mod adapters;
pub mod config;
pub mod error;
pub mod generation;
pub mod web;
