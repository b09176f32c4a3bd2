/// Run state definitions for the harvesting state machine
///
/// A run moves strictly forward through its phases; the coordinator checks every
/// transition so a phase can never be skipped or repeated.
use std::fmt;

/// Represents the current phase of a harvesting run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Nothing fetched yet
    Idle,

    /// The page was fetched successfully and its body is available
    PageFetched,

    /// Resource references are being extracted from the page
    Extracting,

    /// References are being resolved, fetched and written one by one
    PerResourceLoop,

    /// Every reference has been processed and the summary emitted
    Done,
}

impl RunState {
    /// Returns true if no further processing happens in this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns the only state this one may move to, if any
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::PageFetched),
            Self::PageFetched => Some(Self::Extracting),
            Self::Extracting => Some(Self::PerResourceLoop),
            Self::PerResourceLoop => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// Returns true if moving from this state to `to` is allowed
    pub fn can_transition_to(&self, to: RunState) -> bool {
        self.next() == Some(to)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PageFetched => "page_fetched",
            Self::Extracting => "extracting",
            Self::PerResourceLoop => "per_resource_loop",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
