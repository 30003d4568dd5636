//! Configuration-driven webhook ingestion gateway: extract fields from
//! inbound JSON payloads, render a message template, and forward the
//! result to a single monitoring sink.

pub mod app_config;
pub mod config_store;
pub mod controllers;
pub mod error;
pub mod extract;
pub mod models;
pub mod payload_log;
pub mod sink;
pub mod state;
pub mod template;
pub mod token_mint;
