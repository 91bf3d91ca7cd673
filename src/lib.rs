//! Scribe - A small multi-user blog
//!
//! This library provides the core functionality for the Scribe blog: article
//! and comment storage, session-based authentication and server-rendered
//! pages.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod theme;
