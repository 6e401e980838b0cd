pub mod browser;
pub mod pull_requests;
pub mod repo;
