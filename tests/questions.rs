mod common;

use common::test_pool;
use quiz_cms::db::queries::{categories, questions};
use quiz_cms::db::{Category, NewOption, NewQuestion, Pagination, QuestionUpdate, StoreError};
use sqlx::SqlitePool;

async fn seed_category(pool: &SqlitePool, title: &str) -> Category {
    categories::create_category(pool, title).await.unwrap()
}

fn option(text: &str, is_correct: bool) -> NewOption {
    NewOption {
        text: text.to_owned(),
        is_correct,
    }
}

#[tokio::test]
async fn create_returns_all_options_in_order() {
    let pool = test_pool().await;
    let category = seed_category(&pool, "Math").await;

    let created = questions::create_question(
        &pool,
        NewQuestion {
            text: "What is 2+2?".to_owned(),
            category_id: category.id,
            options: vec![option("3", false), option("4", true), option("5", false)],
        },
    )
    .await
    .unwrap();

    let fetched = questions::get_question(&pool, created.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.text, "What is 2+2?");
    assert_eq!(fetched.options.len(), 3);
    let texts: Vec<_> = fetched.options.iter().map(|o| o.text.as_str()).collect();
    assert_eq!(texts, vec!["3", "4", "5"]);
    let correct: Vec<_> = fetched.options.iter().map(|o| o.is_correct).collect();
    assert_eq!(correct, vec![false, true, false]);
}

#[tokio::test]
async fn question_and_option_text_are_sanitized() {
    let pool = test_pool().await;
    let category = seed_category(&pool, "Web").await;

    let created = questions::create_question(
        &pool,
        NewQuestion {
            text: "Is <script>alert(1)</script> safe?".to_owned(),
            category_id: category.id,
            options: vec![option("<b>no</b>", true)],
        },
    )
    .await
    .unwrap();
    assert_eq!(created.text, "Is alert(1) safe?");
    assert_eq!(created.options[0].text, "no");
}

#[tokio::test]
async fn create_requires_an_existing_category() {
    let pool = test_pool().await;
    let err = questions::create_question(
        &pool,
        NewQuestion {
            text: "Orphan?".to_owned(),
            category_id: 999,
            options: vec![option("yes", true)],
        },
    )
    .await
    .unwrap_err();
    assert!(
        matches!(err, StoreError::Validation { field: "category_id", .. }),
        "got {err:?}"
    );

    // the failed insert must not leave a question behind
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn text_and_option_validation() {
    let pool = test_pool().await;
    let category = seed_category(&pool, "Math").await;

    let err = questions::create_question(
        &pool,
        NewQuestion {
            text: "no".to_owned(),
            category_id: category.id,
            options: vec![],
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, StoreError::Validation { field: "text", .. }));

    let err = questions::create_question(
        &pool,
        NewQuestion {
            text: "Valid question?".to_owned(),
            category_id: category.id,
            options: vec![option("", true)],
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, StoreError::Validation { field: "options", .. }));
}

#[tokio::test]
async fn length_is_checked_after_sanitization() {
    let pool = test_pool().await;
    let category = seed_category(&pool, "Math").await;

    // sanitizes down to "no", below the 3-character minimum
    let err = questions::create_question(
        &pool,
        NewQuestion {
            text: "<i>no</i>".to_owned(),
            category_id: category.id,
            options: vec![option("4", true)],
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, StoreError::Validation { field: "text", .. }));

    // an option that is nothing but markup sanitizes to the empty string
    let err = questions::create_question(
        &pool,
        NewQuestion {
            text: "Valid question?".to_owned(),
            category_id: category.id,
            options: vec![option("<br>", true)],
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, StoreError::Validation { field: "options", .. }));
}

#[tokio::test]
async fn option_set_without_a_correct_answer_is_accepted() {
    // Nothing enforces a correct option; the permissive behavior of the
    // original design is kept deliberately.
    let pool = test_pool().await;
    let category = seed_category(&pool, "Trivia").await;
    let created = questions::create_question(
        &pool,
        NewQuestion {
            text: "No right answer?".to_owned(),
            category_id: category.id,
            options: vec![option("a", false), option("b", false)],
        },
    )
    .await
    .unwrap();
    assert!(created.options.iter().all(|o| !o.is_correct));
}

#[tokio::test]
async fn update_with_options_replaces_the_whole_set() {
    let pool = test_pool().await;
    let category = seed_category(&pool, "Math").await;
    let created = questions::create_question(
        &pool,
        NewQuestion {
            text: "Pick one".to_owned(),
            category_id: category.id,
            options: vec![option("a", true), option("b", false), option("c", false)],
        },
    )
    .await
    .unwrap();
    let old_ids: Vec<i64> = created.options.iter().map(|o| o.id).collect();

    let updated = questions::update_question(
        &pool,
        created.id,
        QuestionUpdate {
            options: Some(vec![option("x", false), option("y", true)]),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.options.len(), 2);
    assert!(updated.options.iter().all(|o| !old_ids.contains(&o.id)));
    let texts: Vec<_> = updated.options.iter().map(|o| o.text.as_str()).collect();
    assert_eq!(texts, vec!["x", "y"]);
}

#[tokio::test]
async fn update_without_options_keeps_them() {
    let pool = test_pool().await;
    let category = seed_category(&pool, "Math").await;
    let created = questions::create_question(
        &pool,
        NewQuestion {
            text: "Original text?".to_owned(),
            category_id: category.id,
            options: vec![option("a", true), option("b", false)],
        },
    )
    .await
    .unwrap();

    let updated = questions::update_question(
        &pool,
        created.id,
        QuestionUpdate {
            text: Some("Updated text?".to_owned()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.text, "Updated text?");
    assert_eq!(updated.options.len(), 2);
    assert_eq!(
        updated.options.iter().map(|o| o.id).collect::<Vec<_>>(),
        created.options.iter().map(|o| o.id).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn update_missing_id_returns_none() {
    let pool = test_pool().await;
    let result = questions::update_question(&pool, 42, QuestionUpdate::default())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn delete_removes_options_and_is_idempotent() {
    let pool = test_pool().await;
    let category = seed_category(&pool, "Math").await;
    let created = questions::create_question(
        &pool,
        NewQuestion {
            text: "Gone soon?".to_owned(),
            category_id: category.id,
            options: vec![option("yes", true)],
        },
    )
    .await
    .unwrap();

    questions::delete_question(&pool, created.id).await.unwrap();
    assert!(questions::get_question(&pool, created.id)
        .await
        .unwrap()
        .is_none());
    let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM options")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(orphans, 0);

    // deleting again is a no-op
    questions::delete_question(&pool, created.id).await.unwrap();
}

#[tokio::test]
async fn listing_filters_by_category_and_paginates() {
    let pool = test_pool().await;
    let math = seed_category(&pool, "Math").await;
    let history = seed_category(&pool, "History").await;
    for n in 1..=3 {
        questions::create_question(
            &pool,
            NewQuestion {
                text: format!("Math question {n}?"),
                category_id: math.id,
                options: vec![option("x", true)],
            },
        )
        .await
        .unwrap();
    }
    questions::create_question(
        &pool,
        NewQuestion {
            text: "History question?".to_owned(),
            category_id: history.id,
            options: vec![option("y", true)],
        },
    )
    .await
    .unwrap();

    let all = questions::list_questions(&pool, Pagination::default())
        .await
        .unwrap();
    assert_eq!(all.total, 4);
    assert_eq!(all.items.len(), 4);

    let math_page = questions::list_questions_by_category(&pool, math.id, Pagination::new(2, 2))
        .await
        .unwrap();
    assert_eq!(math_page.total, 3);
    assert_eq!(math_page.items.len(), 1);
    assert_eq!(math_page.items[0].text, "Math question 3?");
}

#[tokio::test]
async fn import_export_roundtrip_preserves_questions_and_options() {
    let pool = test_pool().await;
    let category = seed_category(&pool, "Math").await;
    questions::create_question(
        &pool,
        NewQuestion {
            text: "What is 2+2?".to_owned(),
            category_id: category.id,
            options: vec![option("3", false), option("4", true)],
        },
    )
    .await
    .unwrap();

    let categories_dump = categories::get_all_categories(&pool).await.unwrap();
    let questions_dump = questions::get_all_questions(&pool).await.unwrap();
    let options_dump = questions::get_all_options(&pool).await.unwrap();
    assert_eq!(questions_dump.len(), 1);
    assert_eq!(options_dump.len(), 2);

    let fresh = test_pool().await;
    categories::import_categories(&fresh, categories_dump)
        .await
        .unwrap();
    questions::import_questions(&fresh, questions_dump.clone(), options_dump.clone())
        .await
        .unwrap();

    let reimported = questions::get_question(&fresh, questions_dump[0].id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reimported.text, "What is 2+2?");
    assert_eq!(reimported.options.len(), 2);
    assert_eq!(
        reimported.options.iter().map(|o| o.id).collect::<Vec<_>>(),
        options_dump.iter().map(|o| o.id).collect::<Vec<_>>()
    );
    assert!(reimported.options[1].is_correct);
}

#[tokio::test]
async fn end_to_end_category_lifecycle() {
    let pool = test_pool().await;
    let category = categories::create_category(&pool, "Computer Science")
        .await
        .unwrap();
    assert_eq!(category.slug, "computer-science");

    let question = questions::create_question(
        &pool,
        NewQuestion {
            text: "What is 2+2?".to_owned(),
            category_id: category.id,
            options: vec![option("3", false), option("4", true)],
        },
    )
    .await
    .unwrap();
    assert_eq!(question.options.len(), 2);
    assert_eq!(
        question.options.iter().filter(|o| o.is_correct).count(),
        1
    );

    categories::delete_category(&pool, "computer-science")
        .await
        .unwrap()
        .unwrap();
    assert!(categories::get_category(&pool, "computer-science")
        .await
        .unwrap()
        .is_none());
    assert!(questions::get_question(&pool, question.id)
        .await
        .unwrap()
        .is_none());
}
