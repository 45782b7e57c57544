//! Yearly calendars and their dated events.
//!
//! # Invariants
//! - A calendar belongs to exactly one user; an event to exactly one calendar.
//! - An event's `end` is never earlier than its `start`.

use super::{
    require_text, CalendarId, EventId, UserId, ValidationError, YEAR_MAX, YEAR_MIN,
};
use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Calendar {
    pub id: CalendarId,
    pub user_id: UserId,
    pub year: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct NewCalendar {
    pub year: i32,
}

impl NewCalendar {
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            year: validate_year(self.year)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct CalendarPatch {
    #[serde(default)]
    pub year: Option<i32>,
}

pub fn validate_year(year: i32) -> Result<i32, ValidationError> {
    if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
        return Err(ValidationError::YearOutOfRange(year));
    }
    Ok(year)
}

impl Calendar {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_year(self.year).map(|_| ())
    }

    pub fn apply(&mut self, patch: &CalendarPatch) -> Result<(), ValidationError> {
        if let Some(year) = patch.year {
            self.year = validate_year(year)?;
        }
        Ok(())
    }
}

/// A dated time slot inside a calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub date: NaiveDateTime,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub calendar_id: CalendarId,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewEvent {
    pub name: String,
    /// Defaults to the creation time when omitted.
    #[serde(default)]
    pub date: Option<NaiveDateTime>,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl NewEvent {
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        validate_time_range(self.start, self.end)?;
        Ok(Self {
            name: require_text(&self.name, ValidationError::EmptyEventName)?,
            date: self.date,
            start: self.start,
            end: self.end,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EventPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDateTime>,
    #[serde(default)]
    pub start: Option<NaiveTime>,
    #[serde(default)]
    pub end: Option<NaiveTime>,
}

impl Event {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.name, ValidationError::EmptyEventName)?;
        validate_time_range(self.start, self.end)
    }

    /// Applies `patch` in place. The time range is checked on the merged
    /// values, so moving only `start` past the current `end` is rejected.
    pub fn apply(&mut self, patch: &EventPatch) -> Result<(), ValidationError> {
        let start = patch.start.unwrap_or(self.start);
        let end = patch.end.unwrap_or(self.end);
        validate_time_range(start, end)?;

        if let Some(name) = patch.name.as_deref() {
            self.name = require_text(name, ValidationError::EmptyEventName)?;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        self.start = start;
        self.end = end;
        Ok(())
    }
}

fn validate_time_range(start: NaiveTime, end: NaiveTime) -> Result<(), ValidationError> {
    if end < start {
        return Err(ValidationError::EventEndsBeforeStart);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_year, Event, EventPatch, NewEvent};
    use crate::model::ValidationError;
    use chrono::{NaiveDate, NaiveTime};

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn sample_event() -> Event {
        Event {
            id: 1,
            name: "standup".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            start: time(9, 0),
            end: time(9, 15),
            calendar_id: 1,
        }
    }

    #[test]
    fn year_bounds_are_enforced() {
        assert_eq!(validate_year(2024).unwrap(), 2024);
        assert_eq!(
            validate_year(0).unwrap_err(),
            ValidationError::YearOutOfRange(0)
        );
        assert!(validate_year(10_000).is_err());
    }

    #[test]
    fn new_event_rejects_inverted_range() {
        let event = NewEvent {
            name: "late".to_string(),
            date: None,
            start: time(10, 0),
            end: time(9, 0),
        };
        assert_eq!(
            event.normalized().unwrap_err(),
            ValidationError::EventEndsBeforeStart
        );
    }

    #[test]
    fn patch_checks_merged_range_and_leaves_event_untouched_on_error() {
        let mut event = sample_event();
        let patch = EventPatch {
            start: Some(time(10, 0)),
            ..EventPatch::default()
        };
        assert_eq!(
            event.apply(&patch).unwrap_err(),
            ValidationError::EventEndsBeforeStart
        );
        assert_eq!(event, sample_event());

        let patch = EventPatch {
            name: Some(" retro ".to_string()),
            end: Some(time(10, 0)),
            ..EventPatch::default()
        };
        event.apply(&patch).unwrap();
        assert_eq!(event.name, "retro");
        assert_eq!(event.end, time(10, 0));
    }
}
