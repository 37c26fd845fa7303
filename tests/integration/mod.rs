//! Integration tests against a mock outreach service

mod api_client;
mod commands;
mod controllers;
