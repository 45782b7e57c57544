use chrono::{NaiveDate, NaiveTime};
use daybook_core::db::open_db_in_memory;
use daybook_core::{
    CalendarPatch, CalendarService, EventPatch, ListPatch, ListService, NewCalendar, NewEvent,
    NewList, ServiceError, SqliteCalendarRepository, SqliteEventRepository,
    SqliteListRepository, SqliteTaskRepository, SqliteUserRepository, UserId, UserRepository,
    ValidationError,
};
use rusqlite::Connection;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn create_user(conn: &Connection, username: &str) -> UserId {
    SqliteUserRepository::try_new(conn)
        .unwrap()
        .create_user(username, "hash")
        .unwrap()
        .id
}

fn calendars(
    conn: &Connection,
) -> CalendarService<SqliteCalendarRepository<'_>, SqliteEventRepository<'_>> {
    CalendarService::new(
        SqliteCalendarRepository::try_new(conn).unwrap(),
        SqliteEventRepository::try_new(conn).unwrap(),
    )
}

fn lists(conn: &Connection) -> ListService<SqliteListRepository<'_>, SqliteTaskRepository<'_>> {
    ListService::new(
        SqliteListRepository::try_new(conn).unwrap(),
        SqliteTaskRepository::try_new(conn).unwrap(),
    )
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn standup(day: u32) -> NewEvent {
    NewEvent {
        name: "standup".to_string(),
        date: Some(
            NaiveDate::from_ymd_opt(2024, 3, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        ),
        start: time(9, 0),
        end: time(9, 15),
    }
}

#[test]
fn calendars_are_scoped_to_owner() {
    let conn = setup();
    let ada = create_user(&conn, "ada");
    let grace = create_user(&conn, "grace");
    let service = calendars(&conn);

    let cal = service
        .create_calendar(ada, &NewCalendar { year: 2024 })
        .unwrap();
    service
        .create_calendar(grace, &NewCalendar { year: 2024 })
        .unwrap();

    assert_eq!(service.list_calendars(ada).unwrap(), vec![cal.clone()]);
    assert!(matches!(
        service.get_calendar(grace, cal.id),
        Err(ServiceError::NotFound {
            entity: "calendar",
            ..
        })
    ));
    assert!(matches!(
        service.delete_calendar(grace, cal.id),
        Err(ServiceError::NotFound { .. })
    ));
    assert!(matches!(
        service.create_event(grace, cal.id, &standup(1)),
        Err(ServiceError::NotFound {
            entity: "calendar",
            ..
        })
    ));
}

#[test]
fn calendar_year_is_validated_on_create_and_update() {
    let conn = setup();
    let ada = create_user(&conn, "ada");
    let service = calendars(&conn);

    assert!(matches!(
        service.create_calendar(ada, &NewCalendar { year: 0 }),
        Err(ServiceError::Validation(ValidationError::YearOutOfRange(0)))
    ));

    let cal = service
        .create_calendar(ada, &NewCalendar { year: 2024 })
        .unwrap();
    let updated = service
        .update_calendar(ada, cal.id, &CalendarPatch { year: Some(2025) })
        .unwrap();
    assert_eq!(updated.year, 2025);
    assert!(service
        .update_calendar(ada, cal.id, &CalendarPatch { year: Some(12_000) })
        .is_err());
}

#[test]
fn events_are_listed_chronologically_and_validated() {
    let conn = setup();
    let ada = create_user(&conn, "ada");
    let service = calendars(&conn);
    let cal = service
        .create_calendar(ada, &NewCalendar { year: 2024 })
        .unwrap();

    let later = service.create_event(ada, cal.id, &standup(5)).unwrap();
    let earlier = service.create_event(ada, cal.id, &standup(2)).unwrap();
    assert_eq!(
        service.list_events(ada, cal.id).unwrap(),
        vec![earlier.clone(), later]
    );

    let inverted = NewEvent {
        start: time(11, 0),
        end: time(10, 0),
        ..standup(3)
    };
    assert!(matches!(
        service.create_event(ada, cal.id, &inverted),
        Err(ServiceError::Validation(ValidationError::EventEndsBeforeStart))
    ));

    let moved = service
        .update_event(
            ada,
            earlier.id,
            &EventPatch {
                name: Some("planning".to_string()),
                end: Some(time(10, 0)),
                ..EventPatch::default()
            },
        )
        .unwrap();
    assert_eq!(moved.name, "planning");
    assert_eq!(moved.start, time(9, 0));
    assert_eq!(moved.end, time(10, 0));
}

#[test]
fn event_date_defaults_to_creation_time() {
    let conn = setup();
    let ada = create_user(&conn, "ada");
    let service = calendars(&conn);
    let cal = service
        .create_calendar(ada, &NewCalendar { year: 2024 })
        .unwrap();

    let before = chrono::Utc::now().naive_utc();
    let event = service
        .create_event(
            ada,
            cal.id,
            &NewEvent {
                date: None,
                ..standup(1)
            },
        )
        .unwrap();
    assert!(event.date >= before);
}

#[test]
fn foreign_event_is_not_found() {
    let conn = setup();
    let ada = create_user(&conn, "ada");
    let grace = create_user(&conn, "grace");
    let service = calendars(&conn);
    let cal = service
        .create_calendar(ada, &NewCalendar { year: 2024 })
        .unwrap();
    let event = service.create_event(ada, cal.id, &standup(1)).unwrap();

    assert!(matches!(
        service.get_event(grace, event.id),
        Err(ServiceError::NotFound { entity: "event", .. })
    ));
    assert!(matches!(
        service.update_event(grace, event.id, &EventPatch::default()),
        Err(ServiceError::NotFound { entity: "event", .. })
    ));
    assert!(matches!(
        service.delete_event(grace, event.id),
        Err(ServiceError::NotFound { entity: "event", .. })
    ));
    assert!(matches!(
        service.event_lists(grace, event.id),
        Err(ServiceError::NotFound { entity: "event", .. })
    ));
}

#[test]
fn lists_link_only_to_own_events() {
    let conn = setup();
    let ada = create_user(&conn, "ada");
    let grace = create_user(&conn, "grace");
    let cal_service = calendars(&conn);
    let list_service = lists(&conn);

    let ada_cal = cal_service
        .create_calendar(ada, &NewCalendar { year: 2024 })
        .unwrap();
    let ada_event = cal_service
        .create_event(ada, ada_cal.id, &standup(1))
        .unwrap();

    let linked = list_service
        .create_list(
            ada,
            &NewList {
                name: "agenda".to_string(),
                event_id: Some(ada_event.id),
            },
        )
        .unwrap();
    assert_eq!(linked.event_id, Some(ada_event.id));
    assert_eq!(
        cal_service.event_lists(ada, ada_event.id).unwrap(),
        vec![linked.clone()]
    );

    assert!(matches!(
        list_service.create_list(
            grace,
            &NewList {
                name: "spy".to_string(),
                event_id: Some(ada_event.id),
            },
        ),
        Err(ServiceError::NotFound { entity: "event", .. })
    ));

    let grace_list = list_service
        .create_list(
            grace,
            &NewList {
                name: "mine".to_string(),
                event_id: None,
            },
        )
        .unwrap();
    let link = ListPatch {
        event_id: Some(Some(ada_event.id)),
        ..ListPatch::default()
    };
    assert!(matches!(
        list_service.update_list(grace, grace_list.id, &link),
        Err(ServiceError::NotFound { entity: "event", .. })
    ));

    let unlink = ListPatch {
        event_id: Some(None),
        ..ListPatch::default()
    };
    let detached = list_service.update_list(ada, linked.id, &unlink).unwrap();
    assert_eq!(detached.event_id, None);
    assert_eq!(detached.name, "agenda");
}
