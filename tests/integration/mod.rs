//! Integration tests for the usernotes engine

mod cli_parse;
mod config_loading;
mod directory_store;
mod document_scenarios;
mod store_lifecycle;
mod support;
