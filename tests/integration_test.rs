//! Integration tests for `todo_live`.

use todo_live::{
    BearerToken, ClientConfig, FileTokenStore, InsertPosition, Session, Status, Task, TaskId,
    TaskListStore, TokenStore, VERSION,
};

#[test]
fn test_version_exists() {
    assert!(!VERSION.is_empty());
}

#[test]
fn test_store_reconciliation_scenarios() {
    let mut store = TaskListStore::new();
    store.replace_all(vec![Task::new("1", "Water the plants"), Task::new("2", "Pay rent")]);

    // A push for a task we already hold is ignored.
    assert!(!store.apply_create(Task::new("2", "Pay rent (echo)")));
    // A new task goes on top.
    assert!(store.apply_create(Task::new("3", "Call the bank")));
    assert_eq!(store.tasks()[0].id, TaskId::from("3"));

    assert!(store.apply_update(Task::new("1", "Water the plants").with_status(Status::Completed)));
    assert!(!store.apply_update(Task::new("9", "unknown")));

    assert!(store.apply_delete(&TaskId::from("2")).is_some());
    assert!(store.apply_delete(&TaskId::from("2")).is_none());

    let titles: Vec<&str> = store.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["Call the bank", "Water the plants"]);
    assert!(store.get(&TaskId::from("1")).unwrap().is_completed());
}

#[test]
fn test_back_insertion() {
    let mut store = TaskListStore::with_insert_position(InsertPosition::Back);
    store.apply_create(Task::new("a", "first"));
    store.apply_create(Task::new("b", "second"));
    assert_eq!(store.tasks()[1].title, "second");
}

#[test]
fn test_task_wire_format() {
    let json = r#"[
        {"_id": "665f", "title": "Buy milk", "status": "In Progress", "dueDate": "2024-05-01T00:00:00.000Z"},
        {"id": 7, "title": "Legacy", "status": "done", "dueDate": ""}
    ]"#;
    let tasks: Vec<Task> = serde_json::from_str(json).unwrap();
    assert_eq!(tasks[0].status, Status::InProgress);
    assert_eq!(tasks[0].due_date.unwrap().to_string(), "2024-05-01");
    assert_eq!(tasks[1].id.as_str(), "7");
    assert_eq!(tasks[1].status, Status::Completed);
    assert!(tasks[1].due_date.is_none());

    let out = serde_json::to_value(&tasks[0]).unwrap();
    assert_eq!(out["status"], "In Progress");
    assert_eq!(out["dueDate"], "2024-05-01");
}

#[test]
fn test_session_survives_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    {
        let mut session = Session::restore(FileTokenStore::new(dir.path())).unwrap();
        session.sign_in_from("http://localhost:3000/?token=abc.def").unwrap();
    }

    let session = Session::restore(FileTokenStore::new(dir.path())).unwrap();
    assert_eq!(session.token().map(BearerToken::expose), Some("abc.def"));
    assert!(session.api(&ClientConfig::default()).is_ok());

    FileTokenStore::new(dir.path()).clear().unwrap();
    let session = Session::restore(FileTokenStore::new(dir.path())).unwrap();
    assert!(!session.is_signed_in());
}
