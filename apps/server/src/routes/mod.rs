pub mod account;
pub mod activity;
pub mod admin;
pub mod auth;
pub mod practice;
pub mod progress;
pub mod quiz;
pub mod vocabulary;
