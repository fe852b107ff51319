// src/checker/mod.rs
// =============================================================================
// This module contains the normalize-deduplicate-validate pipeline.
//
// Submodules:
// - normalize: Turns a raw href into a canonical URL (or rejects it)
// - link_set: Ordered, duplicate-free collection of canonical URLs
// - http: Probes every URL and classifies it as valid, invalid or unknown
// =============================================================================

mod http;
mod link_set;
mod normalize;

pub use http::{Checker, Classification, ValidationResult};
pub use link_set::LinkSet;
pub use normalize::RawLink;
