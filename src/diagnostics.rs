//! Side channel for unexpected provider failures.

use crate::error::ResolveError;

/// Event reported when the gfycat lookup API fails or returns no video.
pub const GFYCAT_LOOKUP_FAILED: &str = "gfycat_lookup_failed";

/// Event reported when the gfycat transcode API fails or returns no video.
pub const GFYCAT_CONVERT_FAILED: &str = "gfycat_convert_failed";

/// Receives named failure events from providers.
///
/// Reporting is fire-and-forget and never affects the resolution result.
pub trait Diagnostics: Send + Sync {
    fn report_unexpected_event(&self, event: &str, error: &ResolveError);
}

/// Reports events as `tracing` warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report_unexpected_event(&self, event: &str, error: &ResolveError) {
        tracing::warn!(event, error = %error, "Unexpected provider failure");
    }
}
