use aptexam_core::db::open_db_in_memory;
use aptexam_core::{
    AnswerOption, Candidate, CandidateRepository, ExamRepository, ExamService, ExamServiceError,
    ExamStatus, KnowledgeArea, Question, QuestionRepository, RepoError,
    SqliteCandidateRepository, SqliteExamRepository, SqliteQuestionRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

struct SeededQuestion {
    question: Question,
    correct: AnswerOption,
    wrong: AnswerOption,
}

fn seed_candidate(conn: &Connection, email: &str, cuil: &str) -> Candidate {
    let repo = SqliteCandidateRepository::new(conn);
    let candidate = Candidate::new("Test", "Candidate", email, cuil);
    repo.create_candidate(&candidate).unwrap();
    candidate
}

fn seed_question(conn: &Connection, area: KnowledgeArea, prompt: &str) -> SeededQuestion {
    let repo = SqliteQuestionRepository::new(conn);
    let question = Question::new(area, prompt);
    repo.create_question(&question).unwrap();
    let correct = AnswerOption::new(question.uuid, "right", true, 1);
    let wrong = AnswerOption::new(question.uuid, "wrong", false, 2);
    repo.create_option(&correct).unwrap();
    repo.create_option(&wrong).unwrap();
    SeededQuestion {
        question,
        correct,
        wrong,
    }
}

#[test]
fn start_exam_samples_questions_and_opens_in_progress() {
    let conn = open_db_in_memory().unwrap();
    let candidate = seed_candidate(&conn, "ana@example.com", "20-12345678-6");
    for area in KnowledgeArea::ALL {
        seed_question(&conn, area, "seed");
        seed_question(&conn, area, "seed two");
    }

    let service = ExamService::new(
        SqliteExamRepository::new(&conn),
        SqliteQuestionRepository::new(&conn),
    );
    let session = service.start_exam(candidate.uuid, 2).unwrap();

    assert_eq!(session.exam.candidate_uuid, candidate.uuid);
    assert_eq!(session.exam.status, ExamStatus::InProgress);
    assert!(session.exam.total_score.is_none());
    assert_eq!(session.questions.len(), 8);
}

#[test]
fn second_exam_for_same_candidate_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let candidate = seed_candidate(&conn, "ana@example.com", "20-12345678-6");
    seed_question(&conn, KnowledgeArea::Logic, "seed");

    let service = ExamService::new(
        SqliteExamRepository::new(&conn),
        SqliteQuestionRepository::new(&conn),
    );
    service.start_exam(candidate.uuid, 1).unwrap();

    let err = service.start_exam(candidate.uuid, 1).unwrap_err();
    assert!(matches!(err, ExamServiceError::ExamAlreadyExists(id) if id == candidate.uuid));

    // The UNIQUE constraint also guards direct repository use.
    let repo = SqliteExamRepository::new(&conn);
    let err = repo.create_exam(candidate.uuid).unwrap_err();
    assert!(matches!(err, RepoError::Conflict { entity: "exam", .. }));
}

#[test]
fn start_exam_with_empty_bank_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let candidate = seed_candidate(&conn, "ana@example.com", "20-12345678-6");

    let service = ExamService::new(
        SqliteExamRepository::new(&conn),
        SqliteQuestionRepository::new(&conn),
    );
    let err = service.start_exam(candidate.uuid, 3).unwrap_err();
    assert!(matches!(err, ExamServiceError::EmptyQuestionBank));
}

#[test]
fn submit_counts_correct_answers_and_locks_the_exam() {
    let conn = open_db_in_memory().unwrap();
    let candidate = seed_candidate(&conn, "ana@example.com", "20-12345678-6");
    let first = seed_question(&conn, KnowledgeArea::Logic, "q1");
    let second = seed_question(&conn, KnowledgeArea::Verbal, "q2");
    let third = seed_question(&conn, KnowledgeArea::Numerical, "q3");

    let service = ExamService::new(
        SqliteExamRepository::new(&conn),
        SqliteQuestionRepository::new(&conn),
    );
    let session = service.start_exam(candidate.uuid, 1).unwrap();
    let exam_uuid = session.exam.uuid;

    service
        .answer(exam_uuid, first.question.uuid, Some(first.correct.uuid))
        .unwrap();
    service
        .answer(exam_uuid, second.question.uuid, Some(second.wrong.uuid))
        .unwrap();
    service
        .answer(exam_uuid, third.question.uuid, Some(third.correct.uuid))
        .unwrap();

    let submitted = service.submit(exam_uuid).unwrap();
    assert_eq!(submitted.status, ExamStatus::Submitted);
    assert_eq!(submitted.total_score, Some(2));
    assert!(submitted.submitted_at.is_some());

    let err = service
        .answer(exam_uuid, first.question.uuid, Some(first.wrong.uuid))
        .unwrap_err();
    assert!(matches!(err, ExamServiceError::ExamNotEditable(id) if id == exam_uuid));

    let err = service.submit(exam_uuid).unwrap_err();
    assert!(matches!(err, ExamServiceError::ExamNotEditable(_)));
}

#[test]
fn reanswering_a_question_replaces_the_previous_choice() {
    let conn = open_db_in_memory().unwrap();
    let candidate = seed_candidate(&conn, "ana@example.com", "20-12345678-6");
    let seeded = seed_question(&conn, KnowledgeArea::Technical, "q1");

    let repo = SqliteExamRepository::new(&conn);
    let exam = repo.create_exam(candidate.uuid).unwrap();

    repo.record_answer(exam.uuid, seeded.question.uuid, Some(seeded.wrong.uuid))
        .unwrap();
    repo.record_answer(exam.uuid, seeded.question.uuid, Some(seeded.correct.uuid))
        .unwrap();

    let answers = repo.answers_for_exam(exam.uuid).unwrap();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].option_uuid, Some(seeded.correct.uuid));
    assert!(answers[0].is_correct);

    assert_eq!(repo.finalize_exam(exam.uuid).unwrap(), 1);
}

#[test]
fn answer_option_must_belong_to_the_question() {
    let conn = open_db_in_memory().unwrap();
    let candidate = seed_candidate(&conn, "ana@example.com", "20-12345678-6");
    let first = seed_question(&conn, KnowledgeArea::Logic, "q1");
    let second = seed_question(&conn, KnowledgeArea::Logic, "q2");

    let repo = SqliteExamRepository::new(&conn);
    let exam = repo.create_exam(candidate.uuid).unwrap();

    let err = repo
        .record_answer(exam.uuid, first.question.uuid, Some(second.correct.uuid))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "option", .. }));
}

#[test]
fn skipped_questions_count_as_incorrect() {
    let conn = open_db_in_memory().unwrap();
    let candidate = seed_candidate(&conn, "ana@example.com", "20-12345678-6");
    let seeded = seed_question(&conn, KnowledgeArea::Verbal, "q1");

    let repo = SqliteExamRepository::new(&conn);
    let exam = repo.create_exam(candidate.uuid).unwrap();
    repo.record_answer(exam.uuid, seeded.question.uuid, None)
        .unwrap();

    assert_eq!(repo.finalize_exam(exam.uuid).unwrap(), 0);
}

#[test]
fn finalize_missing_exam_returns_not_found_and_double_finalize_conflicts() {
    let conn = open_db_in_memory().unwrap();
    let candidate = seed_candidate(&conn, "ana@example.com", "20-12345678-6");

    let repo = SqliteExamRepository::new(&conn);
    let err = repo.finalize_exam(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "exam", .. }));

    let exam = repo.create_exam(candidate.uuid).unwrap();
    repo.finalize_exam(exam.uuid).unwrap();
    let err = repo.finalize_exam(exam.uuid).unwrap_err();
    assert!(matches!(err, RepoError::Conflict { entity: "exam", .. }));
}

#[test]
fn mark_scored_requires_submitted_state() {
    let conn = open_db_in_memory().unwrap();
    let candidate = seed_candidate(&conn, "ana@example.com", "20-12345678-6");

    let repo = SqliteExamRepository::new(&conn);
    let exam = repo.create_exam(candidate.uuid).unwrap();

    let err = repo.mark_scored(exam.uuid).unwrap_err();
    assert!(matches!(err, RepoError::Conflict { entity: "exam", .. }));

    repo.finalize_exam(exam.uuid).unwrap();
    repo.mark_scored(exam.uuid).unwrap();
    let loaded = repo.get_exam(exam.uuid).unwrap().unwrap();
    assert_eq!(loaded.status, ExamStatus::Scored);
}

#[test]
fn count_by_status_groups_exam_lifecycle() {
    let conn = open_db_in_memory().unwrap();
    let first = seed_candidate(&conn, "a@example.com", "20-12345678-6");
    let second = seed_candidate(&conn, "b@example.com", "27-27123456-8");
    let third = seed_candidate(&conn, "c@example.com", "20-11111111-2");

    let repo = SqliteExamRepository::new(&conn);
    repo.create_exam(first.uuid).unwrap();
    let submitted = repo.create_exam(second.uuid).unwrap();
    repo.finalize_exam(submitted.uuid).unwrap();
    let scored = repo.create_exam(third.uuid).unwrap();
    repo.finalize_exam(scored.uuid).unwrap();
    repo.mark_scored(scored.uuid).unwrap();

    let counts = repo.count_by_status().unwrap();
    let as_pairs: Vec<(ExamStatus, i64)> =
        counts.iter().map(|row| (row.status, row.exams)).collect();
    assert!(as_pairs.contains(&(ExamStatus::InProgress, 1)));
    assert!(as_pairs.contains(&(ExamStatus::Submitted, 1)));
    assert!(as_pairs.contains(&(ExamStatus::Scored, 1)));
}
