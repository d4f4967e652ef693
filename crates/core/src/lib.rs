//! Core business logic for cidadao-ativo.

pub mod services;

pub use services::*;
