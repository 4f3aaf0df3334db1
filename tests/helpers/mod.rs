//! Shared fixtures and assertions for the integration suite.

#![allow(dead_code)]

pub mod fixtures;
pub mod trace_assertions;
