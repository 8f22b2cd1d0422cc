//! Core trait abstractions for the pipeline.
//!
//! The delegate is the only seam: stages are plain functions over it, so any
//! model provider (or a mock) can sit behind the same contract.

pub mod delegate;
