mod common;

use chrono::Utc;

use examly_server::{
    errors::AppError,
    models::domain::{AttemptStatus, QuizAttempt, Role},
    repositories::{QuizAttemptRepository, QuizRepository, UserRepository},
};

use common::{
    make_quiz, make_user, InMemoryQuizAttemptRepository, InMemoryQuizRepository,
    InMemoryUserRepository,
};

#[tokio::test]
async fn quiz_repository_crud_and_error_paths() {
    let repo = InMemoryQuizRepository::new();

    let quiz1 = make_quiz("Quiz One", "admin-a", 3);
    let mut quiz2 = make_quiz("Quiz Two", "admin-a", 3);
    quiz2.is_active = false;

    let created1 = repo.create(quiz1.clone()).await.expect("create quiz1");
    assert_eq!(created1.id, quiz1.id);
    repo.create(quiz2.clone()).await.expect("create quiz2");

    let duplicate = repo.create(quiz1.clone()).await;
    assert!(matches!(duplicate, Err(AppError::AlreadyExists(_))));

    let mut same_slug = make_quiz("Other", "admin-b", 3);
    same_slug.url_slug = quiz1.url_slug.clone();
    assert!(matches!(
        repo.create(same_slug).await,
        Err(AppError::AlreadyExists(_))
    ));

    assert_eq!(repo.list(false).await.expect("list all").len(), 2);
    let active = repo.list(true).await.expect("list active");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, quiz1.id);

    let by_slug = repo
        .find_active_by_slug(&quiz1.url_slug)
        .await
        .expect("slug lookup should work");
    assert!(by_slug.is_some());
    let inactive_slug = repo
        .find_active_by_slug(&quiz2.url_slug)
        .await
        .expect("slug lookup should work");
    assert!(inactive_slug.is_none());

    let both = repo
        .find_by_ids(&[quiz1.id.clone(), quiz2.id.clone(), "ghost".to_string()])
        .await
        .expect("find by ids should work");
    assert_eq!(both.len(), 2);

    let mut renamed = quiz1.clone();
    renamed.title = "Quiz One Renamed".to_string();
    let updated = repo.update(renamed).await.expect("update should work");
    assert_eq!(updated.title, "Quiz One Renamed");

    let missing_update = repo.update(make_quiz("Missing", "admin-z", 1)).await;
    assert!(matches!(missing_update, Err(AppError::NotFound(_))));

    repo.delete(&quiz2.id).await.expect("delete should work");
    assert!(repo.find_by_id(&quiz2.id).await.expect("find").is_none());
    assert!(matches!(
        repo.delete(&quiz2.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn quiz_attempt_repository_open_attempt_rules() {
    let repo = InMemoryQuizAttemptRepository::new();
    let quiz = make_quiz("Attempted", "admin-a", 1);

    let first = QuizAttempt::start(&quiz, "Ada", "ada@example.com", None);
    repo.create(first.clone()).await.expect("create first attempt");

    let second_open = QuizAttempt::start(&quiz, "Ada", "ADA@example.com", None);
    assert!(matches!(
        repo.create(second_open).await,
        Err(AppError::AlreadyExists(_))
    ));

    let open = repo
        .find_open(&quiz.id, "ada@example.com")
        .await
        .expect("find open should work")
        .expect("attempt should be open");
    assert_eq!(open.id, first.id);

    let bumped = repo
        .increment_tab_switch(&first.id)
        .await
        .expect("increment should work")
        .expect("open attempt should be bumped");
    assert_eq!(bumped.tab_switch_count, 1);

    let mut submitted = bumped.clone();
    submitted.submit(4, vec![], Utc::now());
    assert!(repo.close(&submitted).await.expect("close should work"));
    assert!(!repo.close(&submitted).await.expect("second close should work"));

    let stored = repo
        .find_by_id(&first.id)
        .await
        .expect("find should work")
        .expect("attempt exists");
    assert_eq!(stored.status, AttemptStatus::Submitted);
    assert_eq!(stored.score, 4);

    let after_close = repo
        .increment_tab_switch(&first.id)
        .await
        .expect("increment should work");
    assert!(after_close.is_none());

    // Closing frees the slot for a new open attempt.
    let retake = QuizAttempt::start(&quiz, "Ada", "ada@example.com", None);
    repo.create(retake).await.expect("retake after close");
    assert_eq!(repo.count_by_quiz(&quiz.id).await.expect("count"), 2);
}

#[tokio::test]
async fn quiz_attempt_close_keeps_concurrent_writes() {
    let repo = InMemoryQuizAttemptRepository::new();
    let quiz = make_quiz("Concurrent", "admin-a", 5);

    let attempt = QuizAttempt::start(&quiz, "Ada", "ada@example.com", None);
    repo.create(attempt.clone()).await.expect("create attempt");

    // Read before the concurrent writes land.
    let mut stale = repo
        .find_by_id(&attempt.id)
        .await
        .expect("find should work")
        .expect("attempt exists");

    repo.increment_tab_switch(&attempt.id).await.expect("increment");
    repo.set_feedback(&attempt.id, "Nice quiz").await.expect("feedback");

    stale.submit(3, vec![], Utc::now());
    assert!(repo.close(&stale).await.expect("close should work"));

    let stored = repo
        .find_by_id(&attempt.id)
        .await
        .expect("find should work")
        .expect("attempt exists");
    assert_eq!(stored.status, AttemptStatus::Submitted);
    assert_eq!(stored.score, 3);
    assert_eq!(stored.tab_switch_count, 1);
    assert_eq!(stored.feedback.as_deref(), Some("Nice quiz"));
}

#[tokio::test]
async fn quiz_attempt_repository_listing_and_feedback() {
    let repo = InMemoryQuizAttemptRepository::new();
    let quiz_a = make_quiz("Quiz A", "admin-a", 1);
    let quiz_b = make_quiz("Quiz B", "admin-a", 1);

    let guest = QuizAttempt::start(&quiz_a, "Ada", "ada@example.com", None);
    let signed_in = QuizAttempt::start(&quiz_b, "Ada", "other@example.com", Some("user-ada".to_string()));
    let stranger = QuizAttempt::start(&quiz_a, "Bob", "bob@example.com", None);

    for attempt in [&guest, &signed_in, &stranger] {
        repo.create(attempt.clone()).await.expect("create attempt");
    }

    assert_eq!(repo.list_by_quiz(&quiz_a.id).await.expect("list").len(), 2);

    let mine = repo
        .list_for_student("user-ada", "ada@example.com")
        .await
        .expect("list for student should work");
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|a| a.id != stranger.id));

    let with_feedback = repo
        .set_feedback(&guest.id, "Loved it")
        .await
        .expect("feedback should work")
        .expect("attempt exists");
    assert_eq!(with_feedback.feedback.as_deref(), Some("Loved it"));

    let missing = repo.set_feedback("ghost", "hello").await.expect("feedback");
    assert!(missing.is_none());
}

#[tokio::test]
async fn user_repository_crud_and_error_paths() {
    let repo = InMemoryUserRepository::new();

    assert!(!repo.admin_exists().await.expect("admin check"));

    let alice = make_user("Alice", Role::Student);
    let root = make_user("Root", Role::Admin);
    repo.create(alice.clone()).await.expect("create alice");
    repo.create(root.clone()).await.expect("create root");

    let duplicate_email = repo.create(make_user("Alice", Role::Admin)).await;
    assert!(matches!(duplicate_email, Err(AppError::AlreadyExists(_))));

    assert!(repo.admin_exists().await.expect("admin check"));

    let by_email = repo
        .find_by_email("alice@example.com")
        .await
        .expect("find by email should work");
    assert_eq!(by_email.map(|u| u.id), Some(alice.id.clone()));

    let mut renamed = alice.clone();
    renamed.name = "Alice Liddell".to_string();
    let updated = repo.update(renamed).await.expect("update should work");
    assert_eq!(updated.name, "Alice Liddell");

    let missing_update = repo.update(make_user("Nobody", Role::Student)).await;
    assert!(matches!(missing_update, Err(AppError::NotFound(_))));
}
