use daybook_core::db::open_db_in_memory;
use daybook_core::{
    ListPatch, ListService, NewList, NewTask, ServiceError, SqliteListRepository,
    SqliteTaskRepository, SqliteUserRepository, TaskPatch, TaskStatus, UserId, UserRepository,
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

fn service(conn: &Connection) -> ListService<SqliteListRepository<'_>, SqliteTaskRepository<'_>> {
    ListService::new(
        SqliteListRepository::try_new(conn).unwrap(),
        SqliteTaskRepository::try_new(conn).unwrap(),
    )
}

fn new_list(name: &str) -> NewList {
    NewList {
        name: name.to_string(),
        event_id: None,
    }
}

#[test]
fn create_and_list_returns_only_own_lists() {
    let conn = setup();
    let ada = create_user(&conn, "ada");
    let grace = create_user(&conn, "grace");
    let lists = service(&conn);

    let groceries = lists.create_list(ada, &new_list(" groceries ")).unwrap();
    lists.create_list(grace, &new_list("errands")).unwrap();

    assert_eq!(groceries.name, "groceries");
    assert_eq!(groceries.user_id, ada);
    assert_eq!(groceries.event_id, None);

    let mine = lists.list_lists(ada).unwrap();
    assert_eq!(mine, vec![groceries]);
}

#[test]
fn foreign_list_is_not_found_for_every_operation() {
    let conn = setup();
    let ada = create_user(&conn, "ada");
    let grace = create_user(&conn, "grace");
    let lists = service(&conn);
    let list = lists.create_list(ada, &new_list("private")).unwrap();

    let rename = ListPatch {
        name: Some("stolen".to_string()),
        ..ListPatch::default()
    };
    assert!(matches!(
        lists.get_list(grace, list.id),
        Err(ServiceError::NotFound { entity: "list", .. })
    ));
    assert!(matches!(
        lists.update_list(grace, list.id, &rename),
        Err(ServiceError::NotFound { entity: "list", .. })
    ));
    assert!(matches!(
        lists.delete_list(grace, list.id),
        Err(ServiceError::NotFound { entity: "list", .. })
    ));
    assert!(matches!(
        lists.list_tasks(grace, list.id),
        Err(ServiceError::NotFound { entity: "list", .. })
    ));
    assert!(matches!(
        lists.create_task(grace, list.id, &NewTask::new("sneaky")),
        Err(ServiceError::NotFound { entity: "list", .. })
    ));

    assert_eq!(lists.get_list(ada, list.id).unwrap().name, "private");
}

#[test]
fn list_names_are_unique_per_user() {
    let conn = setup();
    let ada = create_user(&conn, "ada");
    let grace = create_user(&conn, "grace");
    let lists = service(&conn);

    lists.create_list(ada, &new_list("todo")).unwrap();
    assert!(matches!(
        lists.create_list(ada, &new_list("todo")),
        Err(ServiceError::Conflict(_))
    ));
    lists.create_list(grace, &new_list("todo")).unwrap();

    let other = lists.create_list(ada, &new_list("other")).unwrap();
    let rename = ListPatch {
        name: Some("todo".to_string()),
        ..ListPatch::default()
    };
    assert!(matches!(
        lists.update_list(ada, other.id, &rename),
        Err(ServiceError::Conflict(_))
    ));
}

#[test]
fn blank_names_and_descriptions_are_rejected() {
    let conn = setup();
    let ada = create_user(&conn, "ada");
    let lists = service(&conn);

    assert!(matches!(
        lists.create_list(ada, &new_list("   ")),
        Err(ServiceError::Validation(ValidationError::EmptyListName))
    ));

    let list = lists.create_list(ada, &new_list("todo")).unwrap();
    assert!(matches!(
        lists.create_task(ada, list.id, &NewTask::new("")),
        Err(ServiceError::Validation(
            ValidationError::EmptyTaskDescription
        ))
    ));

    let blank = ListPatch {
        name: Some(" ".to_string()),
        ..ListPatch::default()
    };
    assert!(matches!(
        lists.update_list(ada, list.id, &blank),
        Err(ServiceError::Validation(ValidationError::EmptyListName))
    ));
}

#[test]
fn task_lifecycle_tracks_status_and_updated_timestamp() {
    let conn = setup();
    let ada = create_user(&conn, "ada");
    let lists = service(&conn);
    let list = lists.create_list(ada, &new_list("todo")).unwrap();

    let task = lists
        .create_task(ada, list.id, &NewTask::new("write report"))
        .unwrap();
    assert_eq!(task.status, TaskStatus::Open);
    assert_eq!(task.updated, None);
    assert_eq!(task.list_id, list.id);

    let done = TaskPatch {
        status: Some(TaskStatus::Done),
        ..TaskPatch::default()
    };
    let updated = lists.update_task(ada, task.id, &done).unwrap();
    assert_eq!(updated.status, TaskStatus::Done);
    assert_eq!(updated.description, "write report");
    assert!(updated.updated.is_some());

    let unchanged = lists
        .update_task(ada, task.id, &TaskPatch::default())
        .unwrap();
    assert_eq!(unchanged, updated);

    assert_eq!(lists.list_tasks(ada, list.id).unwrap(), vec![updated]);

    lists.delete_task(ada, task.id).unwrap();
    assert!(lists.list_tasks(ada, list.id).unwrap().is_empty());
    assert!(matches!(
        lists.delete_task(ada, task.id),
        Err(ServiceError::NotFound { entity: "task", .. })
    ));
}

#[test]
fn foreign_task_cannot_be_read_or_changed() {
    let conn = setup();
    let ada = create_user(&conn, "ada");
    let grace = create_user(&conn, "grace");
    let lists = service(&conn);
    let list = lists.create_list(ada, &new_list("todo")).unwrap();
    let task = lists.create_task(ada, list.id, &NewTask::new("mine")).unwrap();

    let patch = TaskPatch {
        description: Some("hijacked".to_string()),
        ..TaskPatch::default()
    };
    assert!(matches!(
        lists.get_task(grace, task.id),
        Err(ServiceError::NotFound { entity: "task", .. })
    ));
    assert!(matches!(
        lists.update_task(grace, task.id, &patch),
        Err(ServiceError::NotFound { entity: "task", .. })
    ));
    assert!(matches!(
        lists.delete_task(grace, task.id),
        Err(ServiceError::NotFound { entity: "task", .. })
    ));
    assert_eq!(lists.get_task(ada, task.id).unwrap().description, "mine");
}

#[test]
fn deleting_list_cascades_to_tasks() {
    let conn = setup();
    let ada = create_user(&conn, "ada");
    let lists = service(&conn);
    let list = lists.create_list(ada, &new_list("todo")).unwrap();
    lists.create_task(ada, list.id, &NewTask::new("a")).unwrap();
    lists.create_task(ada, list.id, &NewTask::new("b")).unwrap();

    lists.delete_list(ada, list.id).unwrap();

    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM tasks;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 0);
}
