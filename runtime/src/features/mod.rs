//! The 30-column phishing feature vector and its assembly.

pub mod assembler;

pub use assembler::{assemble, extract};

use crate::detectors::{Family, Signal, DETECTORS};
use crate::error::{DetectorFault, ExtractionError};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};
use std::ops::Index;

/// Number of columns in a feature vector.
pub const FEATURE_DIM: usize = 30;

// ─── Column indices ───────────────────────────────────────────────────────────

// Columns 0-8: URL shape
pub const FEAT_USING_IP: usize = 0;
pub const FEAT_LONG_URL: usize = 1;
pub const FEAT_SHORT_URL: usize = 2;
pub const FEAT_AT_SYMBOL: usize = 3;
pub const FEAT_DOUBLE_SLASH_REDIRECT: usize = 4;
pub const FEAT_PREFIX_SUFFIX: usize = 5;
pub const FEAT_SUB_DOMAINS: usize = 6;
pub const FEAT_HTTPS: usize = 7;
pub const FEAT_DOMAIN_REG_LEN: usize = 8;

// Columns 9-17: page structure and authority
pub const FEAT_FAVICON: usize = 9;
pub const FEAT_NON_STD_PORT: usize = 10;
pub const FEAT_HTTPS_DOMAIN_URL: usize = 11;
pub const FEAT_REQUEST_URL: usize = 12;
pub const FEAT_ANCHOR_URL: usize = 13;
pub const FEAT_LINKS_IN_SCRIPT_TAGS: usize = 14;
pub const FEAT_SERVER_FORM_HANDLER: usize = 15;
pub const FEAT_INFO_EMAIL: usize = 16;
pub const FEAT_ABNORMAL_URL: usize = 17;

// Columns 18-22: page behaviour
pub const FEAT_WEBSITE_FORWARDING: usize = 18;
pub const FEAT_STATUS_BAR_CUST: usize = 19;
pub const FEAT_DISABLE_RIGHT_CLICK: usize = 20;
pub const FEAT_USING_POPUP_WINDOW: usize = 21;
pub const FEAT_IFRAME_REDIRECTION: usize = 22;

// Columns 23-29: registration and reputation
pub const FEAT_AGE_OF_DOMAIN: usize = 23;
pub const FEAT_DNS_RECORDING: usize = 24;
pub const FEAT_WEBSITE_TRAFFIC: usize = 25;
pub const FEAT_PAGE_RANK: usize = 26;
pub const FEAT_GOOGLE_INDEX: usize = 27;
pub const FEAT_LINKS_POINTING_TO_PAGE: usize = 28;
pub const FEAT_STATS_REPORT: usize = 29;

/// Column names in vector order.
pub fn feature_names() -> [&'static str; FEATURE_DIM] {
    std::array::from_fn(|i| DETECTORS[i].name)
}

/// Fixed-length vector of detector signals. Serialises as a JSON array of
/// integers in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector([Signal; FEATURE_DIM]);

impl FeatureVector {
    pub fn new(signals: [Signal; FEATURE_DIM]) -> Self {
        Self(signals)
    }

    pub fn len(&self) -> usize {
        FEATURE_DIM
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Raw `-1`/`0`/`1` values, the form classifiers consume.
    pub fn values(&self) -> [i8; FEATURE_DIM] {
        self.0.map(Signal::value)
    }

    pub fn iter(&self) -> impl Iterator<Item = Signal> + '_ {
        self.0.iter().copied()
    }

    /// `(name, signal)` pairs in column order.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, Signal)> + '_ {
        DETECTORS.iter().map(|d| d.name).zip(self.iter())
    }
}

impl Index<usize> for FeatureVector {
    type Output = Signal;

    fn index(&self, index: usize) -> &Signal {
        &self.0[index]
    }
}

impl From<FeatureVector> for [i8; FEATURE_DIM] {
    fn from(vector: FeatureVector) -> Self {
        vector.values()
    }
}

/// A column whose detector could not compute its real value.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFault {
    pub index: usize,
    pub name: &'static str,
    pub family: Family,
    pub fault: DetectorFault,
}

/// Feature vector plus the reasons any column fell back to the sentinel.
#[derive(Debug, Clone)]
pub struct FeatureReport {
    url: String,
    vector: FeatureVector,
    faults: Vec<ColumnFault>,
}

impl FeatureReport {
    pub(crate) fn new(url: String, vector: FeatureVector, faults: Vec<ColumnFault>) -> Self {
        Self {
            url,
            vector,
            faults,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn vector(&self) -> &FeatureVector {
        &self.vector
    }

    pub fn faults(&self) -> &[ColumnFault] {
        &self.faults
    }

    pub fn fault(&self, index: usize) -> Option<&DetectorFault> {
        self.faults
            .iter()
            .find(|f| f.index == index)
            .map(|f| &f.fault)
    }

    pub fn into_vector(self) -> FeatureVector {
        self.vector
    }

    /// Fail on the first faulted column instead of accepting the sentinel.
    pub fn into_strict(self) -> Result<FeatureVector, ExtractionError> {
        match self.faults.into_iter().next() {
            Some(ColumnFault { name, fault, .. }) => Err(ExtractionError::DetectorFault {
                feature: name,
                fault,
            }),
            None => Ok(self.vector),
        }
    }
}

struct NamedSignals<'a>(&'a FeatureVector);

impl Serialize for NamedSignals<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_DIM))?;
        for (name, signal) in self.0.named() {
            map.serialize_entry(name, &signal)?;
        }
        map.end()
    }
}

struct FaultReasons<'a>(&'a [ColumnFault]);

impl Serialize for FaultReasons<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for fault in self.0 {
            map.serialize_entry(fault.name, &fault.fault.to_string())?;
        }
        map.end()
    }
}

impl Serialize for FeatureReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FeatureReport", 4)?;
        state.serialize_field("url", &self.url)?;
        state.serialize_field("vector", &self.vector)?;
        state.serialize_field("features", &NamedSignals(&self.vector))?;
        state.serialize_field("faults", &FaultReasons(&self.faults))?;
        state.end()
    }
}
