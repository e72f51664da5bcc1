// Copyright 2026 Urlsense Contributors
// SPDX-License-Identifier: Apache-2.0

//! Urlsense: phishing feature extraction for URLs.
//!
//! [`Extractor`] fetches a page, gathers WHOIS and reputation evidence, and
//! turns it into a fixed 30-column [`FeatureVector`] of `-1`/`0`/`1` signals
//! for a downstream classifier.

pub mod acquisition;
pub mod cli;
pub mod config;
pub mod detectors;
pub mod error;
pub mod features;
pub mod pipeline;

pub use config::ExtractorConfig;
pub use error::{AcquisitionError, DetectorFault, ExtractionError, ProbeError};
pub use features::{FeatureReport, FeatureVector, FEATURE_DIM};
pub use pipeline::Extractor;
