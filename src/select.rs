//! Picks the one event a run is about.
//!
//! Notices announce the next meeting, certificates are issued for the meeting
//! that just happened. Both look at the same calendar, so the choice is made by
//! a [`SelectionPolicy`].

use chrono::NaiveDateTime;

use crate::input::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// The closest event strictly after now.
    NextUpcoming,
    /// The latest event strictly before now, falling back to the latest of
    /// all events if none of them is in the past.
    MostRecent,
}

impl SelectionPolicy {
    #[must_use]
    pub fn select<'a>(&self, events: &'a [Event], now: NaiveDateTime) -> Option<&'a Event> {
        match self {
            Self::NextUpcoming => next_upcoming(events, now),
            Self::MostRecent => most_recent(events, now),
        }
    }
}

/// Returns the event with the smallest positive distance to `now`.
///
/// Events without a parsed date are ignored, on a tie the first one wins.
#[must_use]
pub fn next_upcoming(events: &[Event], now: NaiveDateTime) -> Option<&Event> {
    let mut closest: Option<(&Event, NaiveDateTime)> = None;

    for event in events {
        let Some(date) = event.date().parsed() else {
            continue;
        };

        if date <= now {
            continue;
        }

        if closest.map_or(true, |(_, best)| date < best) {
            closest = Some((event, date));
        }
    }

    closest.map(|(event, _)| event)
}

/// Whether `a` is listed before `b` when events are ordered newest first.
///
/// If either date could not be parsed the raw text is compared instead. This
/// is not a total order once parsed and unparsed dates are mixed.
fn newer_than(a: &Event, b: &Event) -> bool {
    match (a.date().parsed(), b.date().parsed()) {
        (Some(a), Some(b)) => a > b,
        _ => a.date().raw() > b.date().raw(),
    }
}

/// Returns the most recent past event, or the newest event overall if no
/// event lies in the past.
///
/// The first event that no later event is newer than wins, which is what a
/// stable descending sort would put first.
#[must_use]
pub fn most_recent(events: &[Event], now: NaiveDateTime) -> Option<&Event> {
    let past = events
        .iter()
        .filter(|event| event.date().parsed().is_some_and(|date| date < now))
        .collect::<Vec<_>>();

    let candidates = if past.is_empty() {
        events.iter().collect()
    } else {
        past
    };

    candidates
        .into_iter()
        .reduce(|best, event| if newer_than(event, best) { event } else { best })
}
