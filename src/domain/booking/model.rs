//! Booking domain entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::shared::errors::{DomainError, DomainResult};

/// Half-open reservation window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<Self> {
        if start >= end {
            return Err(DomainError::Validation(format!(
                "booking window must end after it starts ({} >= {})",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && self.end > other.start
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

/// Things that can happen to a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingEvent {
    /// Staff accepts a pending booking
    Confirm,
    /// Staff closes a confirmed booking
    Complete,
    /// Driver withdraws the booking
    Cancel,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Bookings in these states hold their window on the point.
    pub fn holds_window(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Transition table. Status only moves forward.
    pub fn apply(self, event: BookingEvent) -> DomainResult<BookingStatus> {
        use BookingEvent::*;
        use BookingStatus::*;

        match (self, event) {
            (Pending, Confirm) => Ok(Confirmed),
            (Confirmed, Complete) => Ok(Completed),
            (Pending | Confirmed, Cancel) => Ok(Cancelled),
            (from, event) => Err(DomainError::InvalidState(format!(
                "booking in status {} cannot {:?}",
                from, event
            ))),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(DomainError::Storage(format!(
                "unknown booking status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Booking {
    pub id: i32,
    pub driver_id: i32,
    pub point_id: i32,
    pub window: TimeWindow,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_active(&self) -> bool {
        self.status.holds_window()
    }

    pub fn conflicts_with(&self, window: &TimeWindow) -> bool {
        self.is_active() && self.window.overlaps(window)
    }

    pub fn transition(&mut self, event: BookingEvent) -> DomainResult<()> {
        self.status = self.status.apply(event)?;
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 5, 1, hour, minute, 0).unwrap()
    }

    fn window(from: (u32, u32), to: (u32, u32)) -> TimeWindow {
        TimeWindow::new(at(from.0, from.1), at(to.0, to.1)).unwrap()
    }

    fn booking(status: BookingStatus) -> Booking {
        Booking {
            id: 1,
            driver_id: 1,
            point_id: 1,
            window: window((10, 0), (11, 0)),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn window_must_be_non_empty() {
        assert!(matches!(
            TimeWindow::new(at(10, 0), at(10, 0)),
            Err(DomainError::Validation(_))
        ));
        assert!(TimeWindow::new(at(11, 0), at(10, 0)).is_err());
    }

    #[test]
    fn overlap_matrix() {
        let base = window((10, 0), (11, 0));
        // partial overlap at either side
        assert!(base.overlaps(&window((10, 30), (11, 30))));
        assert!(base.overlaps(&window((9, 30), (10, 30))));
        // containment both ways
        assert!(base.overlaps(&window((10, 15), (10, 45))));
        assert!(base.overlaps(&window((9, 0), (12, 0))));
        // identical
        assert!(base.overlaps(&base));
        // touching boundaries
        assert!(!base.overlaps(&window((11, 0), (12, 0))));
        assert!(!base.overlaps(&window((9, 0), (10, 0))));
        // disjoint
        assert!(!base.overlaps(&window((13, 0), (14, 0))));
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = window((10, 0), (11, 0));
        let b = window((10, 59), (12, 0));
        assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }

    #[test]
    fn cancelled_and_completed_bookings_release_window() {
        let inner = window((10, 30), (10, 45));
        assert!(booking(BookingStatus::Pending).conflicts_with(&inner));
        assert!(booking(BookingStatus::Confirmed).conflicts_with(&inner));
        assert!(!booking(BookingStatus::Cancelled).conflicts_with(&inner));
        assert!(!booking(BookingStatus::Completed).conflicts_with(&inner));
    }

    #[test]
    fn forward_transitions() {
        let mut b = booking(BookingStatus::Pending);
        b.transition(BookingEvent::Confirm).unwrap();
        assert_eq!(b.status, BookingStatus::Confirmed);
        b.transition(BookingEvent::Complete).unwrap();
        assert_eq!(b.status, BookingStatus::Completed);
    }

    #[test]
    fn pending_cannot_jump_to_completed() {
        let mut b = booking(BookingStatus::Pending);
        assert!(matches!(
            b.transition(BookingEvent::Complete),
            Err(DomainError::InvalidState(_))
        ));
        assert_eq!(b.status, BookingStatus::Pending);
    }

    #[test]
    fn cancel_only_from_open_states() {
        for status in [BookingStatus::Pending, BookingStatus::Confirmed] {
            assert_eq!(status.apply(BookingEvent::Cancel).unwrap(), BookingStatus::Cancelled);
        }
        for status in [BookingStatus::Completed, BookingStatus::Cancelled] {
            assert!(status.apply(BookingEvent::Cancel).is_err());
        }
    }

    #[test]
    fn cancelled_is_terminal() {
        let s = BookingStatus::Cancelled;
        assert!(s.apply(BookingEvent::Confirm).is_err());
        assert!(s.apply(BookingEvent::Complete).is_err());
    }

    #[test]
    fn status_parses_from_storage() {
        assert_eq!("CONFIRMED".parse::<BookingStatus>().unwrap(), BookingStatus::Confirmed);
        assert!("Confirmed".parse::<BookingStatus>().is_err());
    }
}
