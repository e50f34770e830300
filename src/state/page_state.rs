/// Page outcome definitions for one frontier entry
///
/// Every URL taken off the frontier ends in exactly one of these states.
use std::fmt;

/// Final state of a URL after the driver has handled it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Success States =====
    /// Rendered, extracted and written to the mirror
    Processed,

    /// Rendered and written, but no visible text was found
    Empty,

    // ===== Partial States =====
    /// Rendered and extracted, but writing the mirror files failed
    Unsaved,

    // ===== Skip States =====
    /// Out of scope or disallowed by robots.txt; never rendered
    Rejected,

    // ===== Error States =====
    /// Render exceeded its timeout
    TimedOut,

    /// Render failed for any other reason (status, transport, content type)
    Failed,
}

impl PageState {
    /// Returns true if the page was rendered
    pub fn was_rendered(&self) -> bool {
        matches!(self, Self::Processed | Self::Empty | Self::Unsaved)
    }

    /// Returns true if this represents a render error
    pub fn is_error(&self) -> bool {
        matches!(self, Self::TimedOut | Self::Failed)
    }

    /// Short label used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Empty => "empty",
            Self::Unsaved => "unsaved",
            Self::Rejected => "rejected",
            Self::TimedOut => "timed_out",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
