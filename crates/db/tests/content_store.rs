//! Integration tests for the Content Store repositories.
//!
//! Runs against a real database provisioned by `sqlx::test`.

use genstudio_core::generation::GenerationStatus;
use genstudio_db::models::content_generation::FinishGeneration;
use genstudio_db::models::user::CreateUser;
use genstudio_db::repositories::{ContentGenerationRepo, UserLogRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_user(user_id: &str) -> CreateUser {
    CreateUser {
        user_id: user_id.to_string(),
        email: format!("{user_id}@example.com"),
        notification_time: None,
    }
}

fn paths(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{prefix}_{i}")).collect()
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn migrations_are_idempotent(pool: PgPool) {
    genstudio_db::run_migrations(&pool).await.unwrap();
    genstudio_db::run_migrations(&pool).await.unwrap();
    genstudio_db::health_check(&pool).await.unwrap();

    for table in ["users", "content_generations", "user_logs"] {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_and_find_user(pool: PgPool) {
    let input = CreateUser {
        notification_time: Some("09:00".to_string()),
        ..new_user("u1")
    };
    let user = UserRepo::create(&pool, &input).await.unwrap();
    assert_eq!(user.user_id, "u1");
    assert_eq!(user.notification_time.as_deref(), Some("09:00"));

    let found = UserRepo::find_by_id(&pool, "u1").await.unwrap().unwrap();
    assert_eq!(found.email, "u1@example.com");
    assert!(UserRepo::find_by_id(&pool, "nobody").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_user_id_is_a_unique_violation(pool: PgPool) {
    UserRepo::create(&pool, &new_user("dup")).await.unwrap();
    let err = UserRepo::create(&pool, &new_user("dup")).await.unwrap_err();
    match err {
        sqlx::Error::Database(db_err) => assert_eq!(db_err.code().as_deref(), Some("23505")),
        other => panic!("expected database error, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Generation records
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn new_record_starts_processing_without_paths(pool: PgPool) {
    let record = ContentGenerationRepo::create_processing(&pool, "u1", "a cat")
        .await
        .unwrap();
    assert_eq!(record.status().unwrap(), GenerationStatus::Processing);
    assert!(record.image_paths.is_empty());
    assert!(record.video_paths.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn generation_for_unregistered_user_is_accepted(pool: PgPool) {
    let record = ContentGenerationRepo::create_processing(&pool, "ghost", "a dog")
        .await
        .unwrap();
    assert_eq!(record.user_id, "ghost");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn finish_completed_persists_ordered_paths(pool: PgPool) {
    let record = ContentGenerationRepo::create_processing(&pool, "u1", "a cat")
        .await
        .unwrap();

    let outcome = FinishGeneration::completed(paths("img", 5), paths("vid", 5));
    let updated = ContentGenerationRepo::finish(&pool, record.id, "u1", "a cat", &outcome)
        .await
        .unwrap();
    assert_eq!(updated, 1);

    let row = ContentGenerationRepo::find_by_id(&pool, record.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status().unwrap(), GenerationStatus::Completed);
    assert_eq!(row.image_paths, paths("img", 5));
    assert_eq!(row.video_paths, paths("vid", 5));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn finish_error_persists_no_paths(pool: PgPool) {
    let record = ContentGenerationRepo::create_processing(&pool, "u1", "a cat")
        .await
        .unwrap();
    ContentGenerationRepo::finish(&pool, record.id, "u1", "a cat", &FinishGeneration::failed())
        .await
        .unwrap();

    let row = ContentGenerationRepo::find_by_id(&pool, record.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status().unwrap(), GenerationStatus::Error);
    assert!(row.image_paths.is_empty());
    assert!(row.video_paths.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn finish_leaves_other_prompts_untouched(pool: PgPool) {
    let other = ContentGenerationRepo::create_processing(&pool, "u1", "a dog")
        .await
        .unwrap();
    let cat = ContentGenerationRepo::create_processing(&pool, "u1", "a cat")
        .await
        .unwrap();

    ContentGenerationRepo::finish(&pool, cat.id, "u1", "a cat", &FinishGeneration::failed())
        .await
        .unwrap();

    let row = ContentGenerationRepo::find_by_id(&pool, other.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status().unwrap(), GenerationStatus::Processing);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn identical_prompts_share_the_last_terminal_update(pool: PgPool) {
    let first = ContentGenerationRepo::create_processing(&pool, "u1", "same")
        .await
        .unwrap();
    let second = ContentGenerationRepo::create_processing(&pool, "u1", "same")
        .await
        .unwrap();

    let a = FinishGeneration::completed(paths("a", 5), paths("va", 5));
    let b = FinishGeneration::completed(paths("b", 5), paths("vb", 5));
    assert_eq!(
        ContentGenerationRepo::finish(&pool, first.id, "u1", "same", &a)
            .await
            .unwrap(),
        2
    );
    assert_eq!(
        ContentGenerationRepo::finish(&pool, second.id, "u1", "same", &b)
            .await
            .unwrap(),
        2
    );

    for id in [first.id, second.id] {
        let row = ContentGenerationRepo::find_by_id(&pool, id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.image_paths, paths("b", 5), "row {id} should carry the last write");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn later_unit_finishing_first_is_still_overwritten(pool: PgPool) {
    let first = ContentGenerationRepo::create_processing(&pool, "u1", "same")
        .await
        .unwrap();
    let second = ContentGenerationRepo::create_processing(&pool, "u1", "same")
        .await
        .unwrap();

    let b = FinishGeneration::completed(paths("b", 5), paths("vb", 5));
    ContentGenerationRepo::finish(&pool, second.id, "u1", "same", &b)
        .await
        .unwrap();
    // The older unit finishes last and its outcome lands on both rows.
    let updated =
        ContentGenerationRepo::finish(&pool, first.id, "u1", "same", &FinishGeneration::failed())
            .await
            .unwrap();
    assert_eq!(updated, 2);

    for id in [first.id, second.id] {
        let row = ContentGenerationRepo::find_by_id(&pool, id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.status().unwrap(), GenerationStatus::Error);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn resubmission_after_completion_keeps_the_earlier_record(pool: PgPool) {
    let earlier = ContentGenerationRepo::create_processing(&pool, "u1", "a cat")
        .await
        .unwrap();
    let done = FinishGeneration::completed(paths("img", 5), paths("vid", 5));
    ContentGenerationRepo::finish(&pool, earlier.id, "u1", "a cat", &done)
        .await
        .unwrap();

    let later = ContentGenerationRepo::create_processing(&pool, "u1", "a cat")
        .await
        .unwrap();
    let updated =
        ContentGenerationRepo::finish(&pool, later.id, "u1", "a cat", &FinishGeneration::failed())
            .await
            .unwrap();
    assert_eq!(updated, 1);

    let kept = ContentGenerationRepo::find_by_id(&pool, earlier.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.status().unwrap(), GenerationStatus::Completed);
    assert_eq!(kept.image_paths, paths("img", 5));
    assert!(kept.finished_at.is_some());

    let failed = ContentGenerationRepo::find_by_id(&pool, later.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(failed.status().unwrap(), GenerationStatus::Error);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_for_user_is_newest_first_and_stable(pool: PgPool) {
    let older = ContentGenerationRepo::create_processing(&pool, "u1", "first")
        .await
        .unwrap();
    let newer = ContentGenerationRepo::create_processing(&pool, "u1", "second")
        .await
        .unwrap();
    ContentGenerationRepo::create_processing(&pool, "u2", "elsewhere")
        .await
        .unwrap();

    let listed = ContentGenerationRepo::list_for_user(&pool, "u1").await.unwrap();
    let ids: Vec<i64> = listed.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
    assert!(listed[0].generated_at >= listed[1].generated_at);

    let again = ContentGenerationRepo::list_for_user(&pool, "u1").await.unwrap();
    assert_eq!(listed, again);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_for_unknown_user_is_empty(pool: PgPool) {
    UserRepo::create(&pool, &new_user("u2")).await.unwrap();
    let listed = ContentGenerationRepo::list_for_user(&pool, "u2").await.unwrap();
    assert!(listed.is_empty());
}

// ---------------------------------------------------------------------------
// Audit log
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn user_log_appends_in_order(pool: PgPool) {
    UserLogRepo::insert(&pool, "u1", "generation.requested").await.unwrap();
    UserLogRepo::insert(&pool, "u1", "generation.completed").await.unwrap();
    UserLogRepo::insert(&pool, "u2", "user.created").await.unwrap();

    let actions: Vec<String> = UserLogRepo::list_for_user(&pool, "u1")
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.action)
        .collect();
    assert_eq!(actions, vec!["generation.requested", "generation.completed"]);
}
