//! Integration tests for the usernotes engine

mod integration;
