//! Use-case services on top of the repositories.
//!
//! # Responsibility
//! - Compose repository calls into inventory-level operations.
//! - Own session startup, including demo-data seeding.

pub mod demo;
pub mod inventory_service;
pub mod session;
