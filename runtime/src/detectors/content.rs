//! Substring checks over the raw page text.

use super::{DetectorOutcome, Signal};
use crate::acquisition::ExtractionContext;

fn mentions(ctx: &ExtractionContext, needle: &str) -> bool {
    ctx.document().raw_text().contains(needle)
}

/// #20: scripts touching the status bar.
pub fn status_bar_customization(ctx: &ExtractionContext) -> DetectorOutcome {
    Ok(Signal::flag(mentions(ctx, "status")))
}

/// #21: right-click suppression.
pub fn disable_right_click(ctx: &ExtractionContext) -> DetectorOutcome {
    Ok(Signal::flag(mentions(ctx, "oncontextmenu")))
}

/// #22: pop-up windows.
pub fn popup_window(ctx: &ExtractionContext) -> DetectorOutcome {
    Ok(Signal::flag(mentions(ctx, "window.open")))
}

/// #30: statistics-report markers.
pub fn stats_report(ctx: &ExtractionContext) -> DetectorOutcome {
    Ok(Signal::flag(mentions(ctx, "stats")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(body: &str) -> ExtractionContext {
        ExtractionContext::builder("https://example.com/", body)
            .build()
            .unwrap()
    }

    #[test]
    fn test_matches_are_case_insensitive() {
        let page = ctx("<body onContextMenu='return false'><script>Window.Open('x')</script>");
        assert_eq!(disable_right_click(&page), Ok(Signal::Phishing));
        assert_eq!(popup_window(&page), Ok(Signal::Phishing));
        assert_eq!(status_bar_customization(&page), Ok(Signal::Legitimate));
    }

    #[test]
    fn test_status_and_stats() {
        let page = ctx("<script>window.STATUS = 'Verified'; var stats = {};</script>");
        assert_eq!(status_bar_customization(&page), Ok(Signal::Phishing));
        assert_eq!(stats_report(&page), Ok(Signal::Phishing));

        let clean = ctx("<p>hello</p>");
        assert_eq!(stats_report(&clean), Ok(Signal::Legitimate));
    }
}
