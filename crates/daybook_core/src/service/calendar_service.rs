//! Calendar and event use-cases for one authenticated user.

use super::{found, ServiceResult};
use crate::model::calendar::{Calendar, CalendarPatch, Event, EventPatch, NewCalendar, NewEvent};
use crate::model::list::TaskList;
use crate::model::{CalendarId, EventId, UserId};
use crate::repo::calendar_repo::CalendarRepository;
use crate::repo::event_repo::EventRepository;
use crate::repo::now_utc;
use log::info;

pub struct CalendarService<C: CalendarRepository, E: EventRepository> {
    calendars: C,
    events: E,
}

impl<C: CalendarRepository, E: EventRepository> CalendarService<C, E> {
    pub fn new(calendars: C, events: E) -> Self {
        Self { calendars, events }
    }

    pub fn list_calendars(&self, owner: UserId) -> ServiceResult<Vec<Calendar>> {
        Ok(self.calendars.list_calendars(owner)?)
    }

    pub fn get_calendar(&self, owner: UserId, id: CalendarId) -> ServiceResult<Calendar> {
        found(self.calendars.get_calendar(owner, id)?, "calendar", id)
    }

    pub fn create_calendar(&self, owner: UserId, calendar: &NewCalendar) -> ServiceResult<Calendar> {
        let created = self.calendars.create_calendar(owner, calendar)?;
        info!(
            "event=calendar_create module=service status=ok user_id={} calendar_id={}",
            owner, created.id
        );
        Ok(created)
    }

    pub fn update_calendar(
        &self,
        owner: UserId,
        id: CalendarId,
        patch: &CalendarPatch,
    ) -> ServiceResult<Calendar> {
        let mut calendar = self.get_calendar(owner, id)?;
        calendar.apply(patch)?;
        Ok(self.calendars.update_calendar(owner, &calendar)?)
    }

    pub fn delete_calendar(&self, owner: UserId, id: CalendarId) -> ServiceResult<()> {
        self.calendars.delete_calendar(owner, id)?;
        info!(
            "event=calendar_delete module=service status=ok user_id={} calendar_id={}",
            owner, id
        );
        Ok(())
    }

    pub fn list_events(&self, owner: UserId, calendar_id: CalendarId) -> ServiceResult<Vec<Event>> {
        self.get_calendar(owner, calendar_id)?;
        Ok(self.events.list_events(owner, calendar_id)?)
    }

    pub fn get_event(&self, owner: UserId, id: EventId) -> ServiceResult<Event> {
        found(self.events.get_event(owner, id)?, "event", id)
    }

    pub fn create_event(
        &self,
        owner: UserId,
        calendar_id: CalendarId,
        event: &NewEvent,
    ) -> ServiceResult<Event> {
        let created = self
            .events
            .create_event(owner, calendar_id, event, now_utc())?;
        info!(
            "event=event_create module=service status=ok user_id={} calendar_id={} event_id={}",
            owner, calendar_id, created.id
        );
        Ok(created)
    }

    pub fn update_event(&self, owner: UserId, id: EventId, patch: &EventPatch) -> ServiceResult<Event> {
        let mut event = self.get_event(owner, id)?;
        event.apply(patch)?;
        Ok(self.events.update_event(owner, &event)?)
    }

    pub fn delete_event(&self, owner: UserId, id: EventId) -> ServiceResult<()> {
        self.events.delete_event(owner, id)?;
        info!(
            "event=event_delete module=service status=ok user_id={} event_id={}",
            owner, id
        );
        Ok(())
    }

    /// Lists the owner's lists linked to one owned event.
    pub fn event_lists(&self, owner: UserId, id: EventId) -> ServiceResult<Vec<TaskList>> {
        self.get_event(owner, id)?;
        Ok(self.events.list_linked_lists(owner, id)?)
    }
}
