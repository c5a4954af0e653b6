//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate directory, ledger and scorer calls into use-case APIs.
//! - Keep boundary layers decoupled from storage details.

pub mod allocation_service;
