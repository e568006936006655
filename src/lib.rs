// src/lib.rs

pub mod bridge;
pub mod c_api;
pub mod config;
pub mod core;
pub mod dom;
pub mod error;
pub mod persistence;

pub use crate::core::converter::{convert, convert_optional, DigitMap};
pub use crate::core::engine::NumeralEngine;
pub use crate::core::normalizer::DigitNormalizer;
pub use crate::core::watcher::FieldWatcher;
pub use crate::error::NumeralError;
