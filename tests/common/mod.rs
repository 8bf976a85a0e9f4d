#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;

use study_progress_backend::auth::sign_token;
use study_progress_backend::config::Config;
use study_progress_backend::create_app;
use study_progress_backend::store::{
    AcceptableAnswer, Chapter, Material, MemoryStore, Question, QuestionStatistic, Unit,
};

pub const TEST_SECRET: &str = "test-secret";
pub const LEARNER: &str = "learner-a";

pub fn ts(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, day, 0, 0, 0).unwrap()
}

pub fn material(id: &str, name: &str, order: i32) -> Material {
    Material {
        id: id.to_string(),
        name: name.to_string(),
        order,
        created_at: ts(1, 1),
        updated_at: ts(1, 1),
    }
}

pub fn chapter(id: &str, material_id: &str, order: i32) -> Chapter {
    Chapter {
        id: id.to_string(),
        material_id: material_id.to_string(),
        parent_chapter_id: None,
        name: format!("Chapter {id}"),
        order,
        level: 1,
        created_at: ts(1, 1),
    }
}

pub fn unit(id: &str, chapter_id: &str, order: i32) -> Unit {
    Unit {
        id: id.to_string(),
        chapter_id: chapter_id.to_string(),
        name: format!("Unit {id}"),
        order,
        created_at: ts(1, 1),
    }
}

pub fn question(id: &str, unit_id: &str, order: i32) -> Question {
    Question {
        id: id.to_string(),
        unit_id: unit_id.to_string(),
        japanese: format!("japanese {id}"),
        hint: Some(format!("hint {id}")),
        explanation: None,
        order,
        created_at: ts(1, 1),
    }
}

pub fn answer(id: &str, question_id: &str, text: &str, order: i32) -> AcceptableAnswer {
    AcceptableAnswer {
        id: id.to_string(),
        question_id: question_id.to_string(),
        text: text.to_string(),
        order,
    }
}

pub fn stat(
    question_id: &str,
    total_attempts: i64,
    correct_count: i64,
    last_attempted_at: Option<DateTime<Utc>>,
) -> QuestionStatistic {
    QuestionStatistic {
        user_id: LEARNER.to_string(),
        question_id: question_id.to_string(),
        total_attempts,
        correct_count,
        incorrect_count: total_attempts - correct_count,
        last_attempted_at,
    }
}

/// Material with one unit holding two questions and no statistics.
pub fn single_unit_store() -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    store.insert_material(material("m1", "Basics", 1));
    store.insert_chapter(chapter("c1", "m1", 1));
    store.insert_unit(unit("u1", "c1", 1));
    store.insert_question(question("q1", "u1", 1));
    store.insert_question(question("q2", "u1", 2));
    Arc::new(store)
}

/// Two materials:
/// - `m1`: chapter `c1` (units `u1` with q1/q2, `u2` empty), chapter `c2`
///   (unit `u3` with q3)
/// - `m2`: no chapters
pub fn seeded_store() -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    store.insert_material(material("m1", "Basics", 1));
    store.insert_material(material("m2", "Empty", 2));

    store.insert_chapter(chapter("c2", "m1", 2));
    store.insert_chapter(chapter("c1", "m1", 1));

    store.insert_unit(unit("u1", "c1", 1));
    store.insert_unit(unit("u2", "c1", 2));
    store.insert_unit(unit("u3", "c2", 1));

    store.insert_question(question("q2", "u1", 2));
    store.insert_question(question("q1", "u1", 1));
    store.insert_question(question("q3", "u3", 1));

    store.insert_answer(answer("a2", "q1", "second", 2));
    store.insert_answer(answer("a1", "q1", "first", 1));
    store.insert_answer(answer("a3", "q3", "only", 1));

    Arc::new(store)
}

pub fn test_config() -> Config {
    Config {
        jwt_secret: Some(TEST_SECRET.to_string()),
        ..Config::default()
    }
}

pub fn create_test_app() -> (Router, Arc<MemoryStore>) {
    let store = seeded_store();
    let app = create_app(Arc::clone(&store), test_config());
    (app, store)
}

pub fn bearer(user_id: &str) -> String {
    let token = sign_token(user_id, TEST_SECRET, 3600).unwrap();
    format!("Bearer {token}")
}

pub fn get(uri: &str, user_id: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(user_id) = user_id {
        builder = builder.header(header::AUTHORIZATION, bearer(user_id));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, user_id: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(user_id) = user_id {
        builder = builder.header(header::AUTHORIZATION, bearer(user_id));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
