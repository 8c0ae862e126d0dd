use aptexam_core::db::open_db_in_memory;
use aptexam_core::{SettingsRepository, SqliteSettingsRepository};

#[test]
fn put_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSettingsRepository::new(&conn);

    repo.put_setting("questions_per_area", "5").unwrap();
    let setting = repo.get_setting("questions_per_area").unwrap().unwrap();
    assert_eq!(setting.key, "questions_per_area");
    assert_eq!(setting.value, "5");
    assert!(setting.updated_at > 0);
}

#[test]
fn put_upserts_the_existing_key() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSettingsRepository::new(&conn);

    repo.put_setting("passing_score", "6").unwrap();
    repo.put_setting("passing_score", "7").unwrap();

    let setting = repo.get_setting("passing_score").unwrap().unwrap();
    assert_eq!(setting.value, "7");
    assert_eq!(repo.list_settings().unwrap().len(), 1);
}

#[test]
fn keys_are_case_sensitive() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSettingsRepository::new(&conn);

    repo.put_setting("Theme", "dark").unwrap();
    assert!(repo.get_setting("theme").unwrap().is_none());
}

#[test]
fn list_orders_by_key() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSettingsRepository::new(&conn);

    repo.put_setting("passing_score", "6").unwrap();
    repo.put_setting("exam_open", "true").unwrap();
    repo.put_setting("questions_per_area", "5").unwrap();

    let keys: Vec<String> = repo
        .list_settings()
        .unwrap()
        .into_iter()
        .map(|s| s.key)
        .collect();
    assert_eq!(keys, vec!["exam_open", "passing_score", "questions_per_area"]);
}

#[test]
fn missing_key_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSettingsRepository::new(&conn);
    assert!(repo.get_setting("missing").unwrap().is_none());
}
