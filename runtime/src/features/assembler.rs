//! Runs every detector in column order over one frozen context.

use super::{ColumnFault, FeatureReport, FeatureVector, FEATURE_DIM};
use crate::acquisition::ExtractionContext;
use crate::detectors::{DetectorOutcome, DetectorSpec, Signal, DETECTORS};
use crate::error::DetectorFault;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::debug;

/// Evaluate all detectors, recording why any column fell back to the sentinel.
pub fn assemble(ctx: &ExtractionContext) -> FeatureReport {
    assemble_with(&DETECTORS, ctx)
}

/// The bare vector; faults are collapsed to the sentinel.
pub fn extract(ctx: &ExtractionContext) -> FeatureVector {
    assemble(ctx).into_vector()
}

pub(crate) fn assemble_with(
    table: &[DetectorSpec; FEATURE_DIM],
    ctx: &ExtractionContext,
) -> FeatureReport {
    let mut signals = [Signal::SENTINEL; FEATURE_DIM];
    let mut faults = Vec::new();

    for (index, detector) in table.iter().enumerate() {
        match run_isolated(detector, ctx) {
            Ok(signal) => signals[index] = signal,
            Err(fault) => {
                debug!(
                    feature = detector.name,
                    family = %detector.family,
                    "detector fell back to sentinel: {fault}"
                );
                faults.push(ColumnFault {
                    index,
                    name: detector.name,
                    family: detector.family,
                    fault,
                });
            }
        }
    }

    FeatureReport::new(
        ctx.url().url().to_string(),
        FeatureVector::new(signals),
        faults,
    )
}

fn run_isolated(detector: &DetectorSpec, ctx: &ExtractionContext) -> DetectorOutcome {
    // The context is only read, so nothing is left half-updated by an unwind.
    match catch_unwind(AssertUnwindSafe(|| (detector.run)(ctx))) {
        Ok(outcome) => outcome,
        Err(panic_info) => {
            let message = if let Some(s) = panic_info.downcast_ref::<&str>() {
                (*s).to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic".to_string()
            };
            Err(DetectorFault::Panicked(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::RegistrationRecord;
    use crate::error::ProbeError;
    use crate::features::*;
    use chrono::NaiveDate;

    const PAGE: &str = r#"<html><head>
        <link rel="icon" href="https://shop.example.com/favicon.ico">
        </head><body>
        <a href="https://shop.example.com/cart">cart</a>
        <form action="/login"></form>
        </body></html>"#;

    fn registered() -> RegistrationRecord {
        RegistrationRecord {
            domain_name: Some("example.com".to_string()),
            creation_date: NaiveDate::from_ymd_opt(2015, 3, 1),
            expiration_date: NaiveDate::from_ymd_opt(2030, 3, 1),
        }
    }

    #[test]
    fn test_vector_has_every_column() {
        let ctx = ExtractionContext::builder("https://shop.example.com/", PAGE)
            .registration(registered())
            .redirect(false)
            .search_results(10)
            .build()
            .unwrap();
        let report = assemble(&ctx);
        assert_eq!(report.vector().len(), FEATURE_DIM);
        assert!(report.faults().is_empty());
        assert!(report.vector().values().iter().all(|v| (-1..=1).contains(v)));
        assert_eq!(report.vector()[FEAT_FAVICON], Signal::Legitimate);
        assert_eq!(report.vector()[FEAT_DOMAIN_REG_LEN], Signal::Legitimate);
        assert_eq!(report.vector()[FEAT_PAGE_RANK], Signal::Legitimate);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let ctx = ExtractionContext::builder("http://192.168.1.10/login", PAGE)
            .build()
            .unwrap();
        let first = extract(&ctx);
        for _ in 0..5 {
            assert_eq!(extract(&ctx), first);
        }
        assert_eq!(first[FEAT_USING_IP], Signal::Phishing);
    }

    #[test]
    fn test_missing_whois_only_degrades_whois_columns() {
        let ctx = ExtractionContext::builder("https://shop.example.com/", PAGE)
            .registration_error(ProbeError::Network("connection reset".into()))
            .redirect(false)
            .search_results(4)
            .build()
            .unwrap();
        let report = assemble(&ctx);

        let faulted: Vec<usize> = report.faults().iter().map(|f| f.index).collect();
        assert_eq!(
            faulted,
            vec![
                FEAT_DOMAIN_REG_LEN,
                FEAT_AGE_OF_DOMAIN,
                FEAT_DNS_RECORDING,
                FEAT_WEBSITE_TRAFFIC
            ]
        );
        for index in faulted {
            assert_eq!(report.vector()[index], Signal::Phishing);
        }
        assert_eq!(report.vector()[FEAT_SERVER_FORM_HANDLER], Signal::Legitimate);
        assert_eq!(report.vector()[FEAT_LINKS_POINTING_TO_PAGE], Signal::Legitimate);
    }

    #[test]
    fn test_minimal_https_url() {
        let ctx = ExtractionContext::builder("https://a.b", "").build().unwrap();
        let vector = extract(&ctx);
        assert_eq!(vector[FEAT_LONG_URL], Signal::Legitimate);
        assert_eq!(vector[FEAT_HTTPS], Signal::Legitimate);
        assert_eq!(vector[FEAT_ANCHOR_URL], Signal::Phishing);
        assert_eq!(vector[FEAT_LINKS_POINTING_TO_PAGE], Signal::Phishing);
    }

    #[test]
    fn test_panicking_detector_is_contained() {
        fn explode(_: &ExtractionContext) -> DetectorOutcome {
            panic!("boom")
        }

        let mut table = DETECTORS;
        table[FEAT_HTTPS].run = explode;

        let ctx = ExtractionContext::builder("https://a.b", "").build().unwrap();
        let report = assemble_with(&table, &ctx);
        assert_eq!(report.vector()[FEAT_HTTPS], Signal::SENTINEL);
        assert_eq!(
            report.fault(FEAT_HTTPS),
            Some(&DetectorFault::Panicked("boom".to_string()))
        );
        assert_eq!(report.vector()[FEAT_LONG_URL], Signal::Legitimate);
    }
}
