// crates/optiface-core/src/core/clock.rs
// ============================================================================
// Module: Optiface Time Model
// Description: Clock abstraction and canonical timestamp text form.
// Purpose: Keep wall-clock reads at the host boundary and timestamps in UTC.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Rows are stamped with the time they were added. The core never reads the
//! wall clock itself; hosts pass a [`Clock`] to the components that need one.
//! Every timestamp is normalized to UTC and rendered as RFC 3339 with a `Z`
//! suffix, which is also the text form stored in results tables.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::OffsetDateTime;
use time::UtcOffset;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Clocks
// ============================================================================

/// Source of "now" for row metadata.
pub trait Clock {
    /// Returns the current instant in UTC.
    fn now(&self) -> OffsetDateTime;
}

/// Wall-clock time source.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock pinned to a single instant, for tests and replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(OffsetDateTime);

impl FixedClock {
    /// Creates a clock that always reports `instant` (normalized to UTC).
    #[must_use]
    pub fn new(instant: OffsetDateTime) -> Self {
        Self(instant.to_offset(UtcOffset::UTC))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

// ============================================================================
// SECTION: Text Form
// ============================================================================

/// Formats a timestamp as UTC RFC 3339 text.
///
/// # Errors
///
/// Returns [`time::error::Format`] when the instant cannot be represented.
pub fn format_timestamp(value: OffsetDateTime) -> Result<String, time::error::Format> {
    value.to_offset(UtcOffset::UTC).format(&Rfc3339)
}

/// Parses RFC 3339 text into a UTC timestamp.
///
/// # Errors
///
/// Returns [`time::error::Parse`] when `text` is not RFC 3339.
pub fn parse_timestamp(text: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(text, &Rfc3339).map(|value| value.to_offset(UtcOffset::UTC))
}
