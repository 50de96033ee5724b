//! Client for the reporting service's HTTP API.

pub mod client;

pub use client::{Business, BusinessesRequest, BusinessesResponse, Reply, ReportingClient};
