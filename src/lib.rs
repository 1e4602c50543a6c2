//! Monetico Gateway - Card-payment gateway integration service
//!
//! Implements the Monetico (CM-CIC) proprietary seal/MAC scheme and the
//! notification-driven payment lifecycle built on top of it.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
