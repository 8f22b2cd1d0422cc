//! Data model shared by every stage.

pub mod config;
pub mod document;
pub mod facts;
pub mod run;
