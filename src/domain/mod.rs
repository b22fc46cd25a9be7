//! Domain layer containing business entities and logic.
//!
//! The domain layer has no dependencies on infrastructure or presentation
//! layers. The order state machine lives entirely in [`entities::TableOrder`];
//! services in [`crate::application::services`] load orders, apply one
//! operation and persist the result.
//!
//! # Architecture
//!
//! - [`entities`] - Orders, lines, item references and tables
//! - [`repositories`] - Data access trait definitions
//! - [`order_error`] - Rejections raised by the state machine
//! - [`clock`] - Injected time source
//! - [`id_generator`] - Injected identifier source

pub mod clock;
pub mod entities;
pub mod id_generator;
pub mod order_error;
pub mod repositories;

pub use clock::{Clock, FixedClock, SystemClock};
pub use id_generator::{IdGenerator, RandomIdGenerator};
pub use order_error::OrderError;
