//! Infrastructure layer (adapters/implementations).
//!
//! This module contains the diff primitives, the syntax highlighter adapter,
//! hashing and configuration IO.

pub mod app_config;
pub mod diff;
pub mod hash;
pub mod highlight;
