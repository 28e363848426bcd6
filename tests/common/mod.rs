//! Common test utilities for colourscale.
//!
//! Shared by the engine and HTTP integration tests; not every test binary
//! uses every helper.
#![allow(dead_code)]

pub mod assertions;
pub mod image_utils;
