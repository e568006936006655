// src/core/mod.rs

pub mod converter;
pub mod engine;
pub mod normalizer;
pub mod selector;
pub mod types;
pub mod watcher;
