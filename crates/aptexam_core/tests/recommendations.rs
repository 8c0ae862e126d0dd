use aptexam_core::db::open_db_in_memory;
use aptexam_core::{
    JobRepository, RecommendationDraft, RecommendationRepository, RecommendationService,
    RecommendationServiceError, RecommendationValidationError, RepoError, SqliteJobRepository,
    SqliteRecommendationRepository,
};
use rusqlite::Connection;

fn seed_positions(conn: &Connection, count: usize) -> Vec<i64> {
    let jobs = SqliteJobRepository::new(conn);
    let role = jobs.insert_role("Analyst", None).unwrap();
    (0..count)
        .map(|idx| {
            jobs.insert_position(&format!("Position {idx}"), role, None, None)
                .unwrap()
        })
        .collect()
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn save_recommendation_links_positions_and_reads_back() {
    let mut conn = open_db_in_memory().unwrap();
    let positions = seed_positions(&conn, 3);

    let mut service =
        RecommendationService::new(SqliteRecommendationRepository::new(&mut conn));
    let mut draft = RecommendationDraft::new("Data Analysis Bootcamp", "UTN");
    draft.url = Some("https://example.com/bootcamp".to_string());

    let saved = service
        .save_recommendation(draft, &[positions[2], positions[0]])
        .unwrap();
    assert_eq!(saved.title, "Data Analysis Bootcamp");
    assert_eq!(saved.institution, "UTN");
    assert!(saved.is_active);
    // Links come back sorted ascending regardless of input order.
    assert_eq!(saved.position_ids, vec![positions[0], positions[2]]);

    let loaded = service.get_recommendation(saved.id).unwrap().unwrap();
    assert_eq!(loaded, saved);
    assert!(service.recent_failed_attempts(10).unwrap().is_empty());
}

#[test]
fn blank_title_is_rejected_and_audited() {
    let mut conn = open_db_in_memory().unwrap();
    let positions = seed_positions(&conn, 1);

    {
        let mut service =
            RecommendationService::new(SqliteRecommendationRepository::new(&mut conn));
        let err = service
            .save_recommendation(RecommendationDraft::new("   ", "UTN"), &positions)
            .unwrap_err();
        assert!(matches!(
            err,
            RecommendationServiceError::Rejected(RecommendationValidationError::BlankTitle)
        ));

        let attempts = service.recent_failed_attempts(10).unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].institution, "UTN");
        assert!(attempts[0].error.contains("blank"));
    }

    assert_eq!(count_rows(&conn, "study_recommendations"), 0);
}

#[test]
fn empty_position_set_is_rejected_and_audited() {
    let mut conn = open_db_in_memory().unwrap();

    {
        let mut service =
            RecommendationService::new(SqliteRecommendationRepository::new(&mut conn));
        let err = service
            .save_recommendation(RecommendationDraft::new("Course", "UTN"), &[])
            .unwrap_err();
        assert!(matches!(
            err,
            RecommendationServiceError::Rejected(RecommendationValidationError::EmptyPositionSet)
        ));
        assert_eq!(service.recent_failed_attempts(10).unwrap().len(), 1);
    }

    assert_eq!(count_rows(&conn, "study_recommendations"), 0);
}

#[test]
fn linking_a_missing_position_is_a_conflict_and_audited() {
    let mut conn = open_db_in_memory().unwrap();

    {
        let mut service =
            RecommendationService::new(SqliteRecommendationRepository::new(&mut conn));
        let err = service
            .save_recommendation(RecommendationDraft::new("Course", "UTN"), &[999])
            .unwrap_err();
        assert!(matches!(
            err,
            RecommendationServiceError::Repo(RepoError::Conflict { .. })
        ));
        assert_eq!(service.recent_failed_attempts(10).unwrap().len(), 1);
    }

    // Insert and link commit together, so the failed link also rolls back
    // the recommendation row.
    assert_eq!(count_rows(&conn, "study_recommendations"), 0);
    assert_eq!(count_rows(&conn, "recommendation_positions"), 0);
}

#[test]
fn insert_with_positions_commits_recommendation_and_links_together() {
    let mut conn = open_db_in_memory().unwrap();
    let positions = seed_positions(&conn, 2);

    {
        let mut repo = SqliteRecommendationRepository::new(&mut conn);
        let id = repo
            .insert_with_positions(&RecommendationDraft::new("Course", "UTN"), &positions)
            .unwrap();
        let loaded = repo.get_recommendation(id).unwrap().unwrap();
        assert_eq!(loaded.position_ids, positions);

        let err = repo
            .insert_with_positions(&RecommendationDraft::new("Broken", "UTN"), &[999])
            .unwrap_err();
        assert!(matches!(err, RepoError::Conflict { .. }));
    }

    assert_eq!(count_rows(&conn, "study_recommendations"), 1);
    assert_eq!(count_rows(&conn, "recommendation_positions"), 2);
}

#[test]
fn set_positions_replaces_the_whole_link_set() {
    let mut conn = open_db_in_memory().unwrap();
    let positions = seed_positions(&conn, 3);

    let mut repo = SqliteRecommendationRepository::new(&mut conn);
    let id = repo
        .insert_recommendation(&RecommendationDraft::new("Course", "UTN"))
        .unwrap();

    repo.set_positions(id, &[positions[0], positions[1]]).unwrap();
    repo.set_positions(id, &[positions[2], positions[2]]).unwrap();

    let loaded = repo.get_recommendation(id).unwrap().unwrap();
    assert_eq!(loaded.position_ids, vec![positions[2]]);

    repo.set_positions(id, &[]).unwrap();
    let loaded = repo.get_recommendation(id).unwrap().unwrap();
    assert!(loaded.position_ids.is_empty());

    let err = repo.set_positions(999, &positions).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { entity: "study recommendation", .. }
    ));
}

#[test]
fn list_for_position_returns_only_active_linked_recommendations() {
    let mut conn = open_db_in_memory().unwrap();
    let positions = seed_positions(&conn, 2);

    let (linked, retired) = {
        let mut repo = SqliteRecommendationRepository::new(&mut conn);
        let linked = repo
            .insert_recommendation(&RecommendationDraft::new("Algebra Course", "UBA"))
            .unwrap();
        let retired = repo
            .insert_recommendation(&RecommendationDraft::new("Old Course", "UBA"))
            .unwrap();
        let elsewhere = repo
            .insert_recommendation(&RecommendationDraft::new("Other Course", "UBA"))
            .unwrap();
        repo.set_positions(linked, &[positions[0]]).unwrap();
        repo.set_positions(retired, &[positions[0]]).unwrap();
        repo.set_positions(elsewhere, &[positions[1]]).unwrap();
        (linked, retired)
    };
    conn.execute(
        "UPDATE study_recommendations SET is_active = 0 WHERE id = ?1;",
        [retired],
    )
    .unwrap();

    let repo = SqliteRecommendationRepository::new(&mut conn);
    let listed = repo.list_for_position(positions[0]).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, linked);
    assert_eq!(listed[0].position_ids, vec![positions[0]]);
}

#[test]
fn failed_attempts_list_newest_first_and_honor_the_limit() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteRecommendationRepository::new(&mut conn);

    for idx in 0..3 {
        repo.record_failed_attempt(
            &RecommendationDraft::new(format!("Attempt {idx}"), "UTN"),
            "rejected",
        )
        .unwrap();
    }

    let attempts = repo.list_failed_attempts(2).unwrap();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].title, "Attempt 2");
    assert_eq!(attempts[1].title, "Attempt 1");
}
