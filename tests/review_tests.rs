mod common;

use study_progress_backend::services::review::{
    classify_material, review_data, ReviewGroup, ReviewThresholds,
};
use study_progress_backend::services::review_session::assemble_review_session;
use study_progress_backend::services::ServiceError;

use common::{question, seeded_store, single_unit_store, stat, ts, LEARNER};

fn ids(entries: &[study_progress_backend::services::review::ReviewBucketEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.question_id.as_str()).collect()
}

#[tokio::test]
async fn low_accuracy_with_many_attempts_is_weak_only() {
    let store = single_unit_store();
    store.put_statistic(stat("q1", 5, 2, Some(ts(1, 1))));

    let result = classify_material(store.as_ref(), LEARNER, "m1", &ReviewThresholds::default())
        .await
        .unwrap();

    assert_eq!(ids(&result.groups.weak), vec!["q1"]);
    assert_eq!(result.groups.weak[0].accuracy, Some(0.4));
    assert!(result.groups.low_attempts.is_empty());
    assert_eq!(ids(&result.groups.unattempted), vec!["q2"]);
}

#[tokio::test]
async fn single_correct_attempt_is_low_attempt_only() {
    let store = single_unit_store();
    store.put_statistic(stat("q2", 1, 1, Some(ts(1, 1))));

    let result = classify_material(store.as_ref(), LEARNER, "m1", &ReviewThresholds::default())
        .await
        .unwrap();

    assert!(result.groups.weak.is_empty());
    assert_eq!(ids(&result.groups.low_attempts), vec!["q2"]);
    assert_eq!(ids(&result.groups.unattempted), vec!["q1"]);
}

#[tokio::test]
async fn weak_ties_break_on_oldest_attempt() {
    let store = single_unit_store();
    store.insert_question(question("q3", "u1", 3));
    // 3 of 10 correct on both; q2 answered earlier
    store.put_statistic(stat("q1", 10, 3, Some(ts(2, 1))));
    store.put_statistic(stat("q2", 10, 3, Some(ts(1, 1))));
    store.put_statistic(stat("q3", 10, 1, Some(ts(3, 1))));

    let result = classify_material(store.as_ref(), LEARNER, "m1", &ReviewThresholds::default())
        .await
        .unwrap();

    assert_eq!(ids(&result.groups.weak), vec!["q3", "q2", "q1"]);
}

#[tokio::test]
async fn weak_and_low_attempt_groups_overlap() {
    let store = single_unit_store();
    store.put_statistic(stat("q1", 2, 0, Some(ts(1, 1))));

    let result = classify_material(store.as_ref(), LEARNER, "m1", &ReviewThresholds::default())
        .await
        .unwrap();
    let summary = result.summary(&common::material("m1", "Basics", 1));

    assert_eq!(ids(&result.groups.weak), vec!["q1"]);
    assert_eq!(ids(&result.groups.low_attempts), vec!["q1"]);
    assert_eq!(summary.total_question_count, 2);
    assert_eq!(summary.weak_count + summary.low_attempt_count + summary.unattempted_count, 3);
}

#[tokio::test]
async fn configured_thresholds_change_membership() {
    let store = single_unit_store();
    store.put_statistic(stat("q1", 4, 3, Some(ts(1, 1))));
    let thresholds = ReviewThresholds {
        weak_accuracy: 0.8,
        low_attempt: 5,
    };

    let result = classify_material(store.as_ref(), LEARNER, "m1", &thresholds)
        .await
        .unwrap();

    assert_eq!(ids(&result.groups.weak), vec!["q1"]);
    assert_eq!(ids(&result.groups.low_attempts), vec!["q1"]);
}

#[tokio::test]
async fn unattempted_follows_hierarchy_order() {
    let store = seeded_store();

    let result = classify_material(store.as_ref(), LEARNER, "m1", &ReviewThresholds::default())
        .await
        .unwrap();

    assert_eq!(ids(&result.groups.unattempted), vec!["q1", "q2", "q3"]);
}

#[tokio::test]
async fn empty_material_yields_zero_counts() {
    let store = seeded_store();

    let result = classify_material(store.as_ref(), LEARNER, "m2", &ReviewThresholds::default())
        .await
        .unwrap();

    assert_eq!(result.total_question_count, 0);
    assert!(result.groups.weak.is_empty());
    assert!(result.groups.low_attempts.is_empty());
    assert!(result.groups.unattempted.is_empty());
}

#[tokio::test]
async fn classification_is_idempotent() {
    let store = seeded_store();
    store.put_statistic(stat("q1", 3, 1, Some(ts(1, 5))));
    store.put_statistic(stat("q3", 1, 0, Some(ts(1, 2))));
    let thresholds = ReviewThresholds::default();

    let first = review_data(store.as_ref(), Some(LEARNER), Some("m1"), &thresholds)
        .await
        .unwrap();
    let second = review_data(store.as_ref(), Some(LEARNER), Some("m1"), &thresholds)
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn review_data_selects_requested_material() {
    let store = seeded_store();
    let thresholds = ReviewThresholds::default();

    let data = review_data(store.as_ref(), Some(LEARNER), Some("m2"), &thresholds)
        .await
        .unwrap();

    assert_eq!(data.selected_material_id.as_deref(), Some("m2"));
    assert_eq!(data.materials.len(), 2);
    assert_eq!(data.materials[0].unattempted_count, 3);
    assert!(data.groups.unattempted.is_empty());
}

#[tokio::test]
async fn review_data_defaults_to_first_material() {
    let store = seeded_store();
    let thresholds = ReviewThresholds::default();

    let data = review_data(store.as_ref(), Some(LEARNER), None, &thresholds)
        .await
        .unwrap();

    assert_eq!(data.selected_material_id.as_deref(), Some("m1"));
    assert_eq!(data.groups.unattempted.len(), 3);
}

#[tokio::test]
async fn review_data_requires_account() {
    let store = seeded_store();

    let err = review_data(store.as_ref(), None, None, &ReviewThresholds::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Unauthorized(_)));
}

#[tokio::test]
async fn session_preserves_group_order_and_merges_answers() {
    let store = seeded_store();
    store.put_statistic(stat("q3", 4, 1, Some(ts(1, 1))));
    store.put_statistic(stat("q1", 4, 2, Some(ts(1, 1))));

    let session = assemble_review_session(
        store.as_ref(),
        Some(LEARNER),
        "m1",
        ReviewGroup::Weak,
        &ReviewThresholds::default(),
    )
    .await
    .unwrap();

    let order: Vec<&str> = session
        .questions
        .iter()
        .map(|q| q.entry.question_id.as_str())
        .collect();
    assert_eq!(order, vec!["q3", "q1"]);
    assert_eq!(session.questions[0].acceptable_answers, vec!["only".to_string()]);
    assert_eq!(
        session.questions[1].acceptable_answers,
        vec!["first".to_string(), "second".to_string()]
    );
    assert_eq!(session.questions[1].hint.as_deref(), Some("hint q1"));
}

#[tokio::test]
async fn session_for_empty_group_is_empty() {
    let store = seeded_store();

    let session = assemble_review_session(
        store.as_ref(),
        Some(LEARNER),
        "m1",
        ReviewGroup::Weak,
        &ReviewThresholds::default(),
    )
    .await
    .unwrap();

    assert_eq!(session.material.id, "m1");
    assert!(session.questions.is_empty());
}

#[tokio::test]
async fn session_requires_account_before_store_access() {
    let store = seeded_store();

    let err = assemble_review_session(
        store.as_ref(),
        None,
        "missing",
        ReviewGroup::Unattempted,
        &ReviewThresholds::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ServiceError::Unauthorized(_)));
}
