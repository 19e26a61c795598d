//! End-to-end tests: the real client stack (ApiClient + Session) against an
//! in-process mock of the story service on an ephemeral port.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;

use snooze::api::{ApiClient, ApiError};
use snooze::session::{SavedSession, Session, SessionStore};

// ── Mock story service ────────────────────────────────────────────────────────

#[derive(Default)]
struct Db {
    /// Newest first, like the real feed.
    stories: Vec<Value>,
    users: HashMap<String, MockUser>,
    next_id: u64,
}

struct MockUser {
    password: String,
    name: String,
    token: String,
    favorite_ids: Vec<String>,
    story_ids: Vec<String>,
}

#[derive(Clone, Default)]
struct MockState(Arc<Mutex<Db>>);

type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn reject(status: StatusCode, title: &str, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({
            "error": {"status": status.as_u16(), "title": title, "message": message}
        })),
    )
}

fn user_payload(db: &Db, username: &str) -> Value {
    let user = &db.users[username];
    let resolve = |ids: &[String]| -> Vec<Value> {
        db.stories
            .iter()
            .filter(|s| ids.contains(&s["storyId"].as_str().unwrap_or_default().to_string()))
            .cloned()
            .collect()
    };
    json!({
        "username": username,
        "name": user.name,
        "createdAt": "2020-01-01T00:00:00.000Z",
        "favorites": resolve(&user.favorite_ids),
        "stories": resolve(&user.story_ids),
    })
}

fn find_username_by_token(db: &Db, token: &str) -> Option<String> {
    db.users
        .iter()
        .find(|(_, u)| u.token == token)
        .map(|(name, _)| name.clone())
}

async fn list_stories(State(state): State<MockState>) -> Json<Value> {
    let db = state.0.lock().unwrap();
    Json(json!({"stories": db.stories}))
}

async fn create_story(State(state): State<MockState>, Json(body): Json<Value>) -> Reply {
    let mut db = state.0.lock().unwrap();
    let token = body["token"].as_str().unwrap_or_default().to_string();
    let Some(username) = find_username_by_token(&db, &token) else {
        return Err(reject(StatusCode::UNAUTHORIZED, "Unauthorized", "Invalid token."));
    };

    db.next_id += 1;
    let story = json!({
        "storyId": format!("story-{}", db.next_id),
        "title": body["story"]["title"],
        "author": body["story"]["author"],
        "url": body["story"]["url"],
        "username": username,
        "createdAt": "2020-01-02T00:00:00.000Z",
    });
    db.stories.insert(0, story.clone());
    let id = story["storyId"].as_str().unwrap().to_string();
    db.users.get_mut(&username).unwrap().story_ids.push(id);

    Ok(Json(json!({"story": story})))
}

async fn delete_story(
    State(state): State<MockState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let mut db = state.0.lock().unwrap();
    let token = body["token"].as_str().unwrap_or_default().to_string();
    if find_username_by_token(&db, &token).is_none() {
        return Err(reject(StatusCode::UNAUTHORIZED, "Unauthorized", "Invalid token."));
    }

    let Some(idx) = db
        .stories
        .iter()
        .position(|s| s["storyId"].as_str() == Some(id.as_str()))
    else {
        return Err(reject(
            StatusCode::NOT_FOUND,
            "Not Found",
            &format!("No story with ID {id}."),
        ));
    };
    let removed = db.stories.remove(idx);
    for user in db.users.values_mut() {
        user.favorite_ids.retain(|f| *f != id);
        user.story_ids.retain(|s| *s != id);
    }
    Ok(Json(json!({"story": removed})))
}

async fn signup(State(state): State<MockState>, Json(body): Json<Value>) -> Reply {
    let mut db = state.0.lock().unwrap();
    let username = body["user"]["username"].as_str().unwrap_or_default().to_string();
    if db.users.contains_key(&username) {
        return Err(reject(StatusCode::CONFLICT, "Conflict", "Username taken."));
    }
    let token = format!("tok-{username}");
    db.users.insert(
        username.clone(),
        MockUser {
            password: body["user"]["password"].as_str().unwrap_or_default().to_string(),
            name: body["user"]["name"].as_str().unwrap_or_default().to_string(),
            token: token.clone(),
            favorite_ids: vec![],
            story_ids: vec![],
        },
    );
    Ok(Json(json!({"token": token, "user": user_payload(&db, &username)})))
}

async fn login(State(state): State<MockState>, Json(body): Json<Value>) -> Reply {
    let db = state.0.lock().unwrap();
    let username = body["user"]["username"].as_str().unwrap_or_default().to_string();
    let password = body["user"]["password"].as_str().unwrap_or_default();
    match db.users.get(&username) {
        Some(user) if user.password == password => {
            Ok(Json(json!({"token": user.token, "user": user_payload(&db, &username)})))
        }
        _ => Err(reject(
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            "Invalid credentials.",
        )),
    }
}

async fn get_user(
    State(state): State<MockState>,
    Path(username): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    let db = state.0.lock().unwrap();
    let token = params.get("token").cloned().unwrap_or_default();
    match db.users.get(&username) {
        Some(user) if user.token == token => Ok(Json(json!({"user": user_payload(&db, &username)}))),
        Some(_) => Err(reject(StatusCode::UNAUTHORIZED, "Unauthorized", "Invalid token.")),
        None => Err(reject(StatusCode::NOT_FOUND, "Not Found", "No such user.")),
    }
}

async fn add_favorite(
    State(state): State<MockState>,
    Path((username, story_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Reply {
    toggle_favorite(state, username, story_id, body, true)
}

async fn remove_favorite(
    State(state): State<MockState>,
    Path((username, story_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Reply {
    toggle_favorite(state, username, story_id, body, false)
}

fn toggle_favorite(
    state: MockState,
    username: String,
    story_id: String,
    body: Value,
    add: bool,
) -> Reply {
    let mut db = state.0.lock().unwrap();
    let token = body["token"].as_str().unwrap_or_default();
    match db.users.get(&username) {
        Some(user) if user.token == token => {}
        _ => return Err(reject(StatusCode::UNAUTHORIZED, "Unauthorized", "Invalid token.")),
    }
    if !db
        .stories
        .iter()
        .any(|s| s["storyId"].as_str() == Some(story_id.as_str()))
    {
        return Err(reject(
            StatusCode::NOT_FOUND,
            "Not Found",
            &format!("No story with ID {story_id}."),
        ));
    }

    let user = db.users.get_mut(&username).unwrap();
    user.favorite_ids.retain(|f| *f != story_id);
    if add {
        user.favorite_ids.push(story_id);
    }
    Ok(Json(json!({"user": user_payload(&db, &username)})))
}

async fn spawn_mock() -> String {
    let state = MockState::default();
    let app = Router::new()
        .route("/stories", get(list_stories).post(create_story))
        .route("/stories/{id}", delete(delete_story))
        .route("/login", post(login))
        .route("/signup", post(signup))
        .route("/users/{username}", get(get_user))
        .route(
            "/users/{username}/favorites/{story_id}",
            post(add_favorite).delete(remove_favorite),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base: &str) -> ApiClient {
    ApiClient::new(base, 5).unwrap()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn signup_login_and_user_fetch_round_trip() {
    let base = spawn_mock().await;
    let api = client(&base);

    let created = api.signup("alice", "hunter2", "Alice A").await.unwrap();
    assert_eq!(created.username, "alice");
    assert!(!created.token.is_empty());

    let logged_in = api.login("alice", "hunter2").await.unwrap();
    assert_eq!(logged_in.token, created.token);
    assert_eq!(logged_in.name, "Alice A");

    let fetched = api.user(&created.token, "alice").await.unwrap();
    assert_eq!(fetched.username, "alice");
    assert!(fetched.favorites.is_empty());
}

#[tokio::test]
async fn wrong_password_is_rejected_with_status() {
    let base = spawn_mock().await;
    let api = client(&base);
    api.signup("alice", "hunter2", "Alice A").await.unwrap();

    let err = api.login("alice", "wrong").await.unwrap_err();
    match err {
        ApiError::Rejected(msg) => {
            assert!(msg.contains("401"), "message was: {msg}");
            assert!(msg.contains("Invalid credentials."));
        }
        other => panic!("expected Rejected, got: {other}"),
    }
}

#[tokio::test]
async fn submitted_story_appears_on_top_exactly_once() {
    let base = spawn_mock().await;
    let dir = TempDir::new().unwrap();
    let mut session = Session::new(client(&base), dir.path());

    session.signup("alice", "pw", "Alice A").await.unwrap();
    session.submit_story("First post", "http://example.com/1").await.unwrap();
    let second = session
        .submit_story("Second post", "http://example.com/2")
        .await
        .unwrap();

    // Local mirror: newest on top, present exactly once.
    assert_eq!(session.visible()[0].story_id, second.story_id);
    let count = session
        .visible()
        .iter()
        .filter(|s| s.story_id == second.story_id)
        .count();
    assert_eq!(count, 1);
    assert!(session.user().unwrap().is_own(&second.story_id));

    // Server agrees after a wholesale re-fetch.
    session.refresh_stories().await.unwrap();
    assert_eq!(session.visible().len(), 2);
    assert_eq!(session.visible()[0].story_id, second.story_id);
}

#[tokio::test]
async fn favorite_toggle_round_trips_through_the_server() {
    let base = spawn_mock().await;
    let api = client(&base);

    // bob posts a story for alice to favorite
    let bob_dir = TempDir::new().unwrap();
    let mut bob = Session::new(api.clone(), bob_dir.path());
    bob.signup("bob", "pw", "Bob B").await.unwrap();
    let story = bob.submit_story("Bob's link", "http://example.com/b").await.unwrap();

    let alice_dir = TempDir::new().unwrap();
    let mut alice = Session::new(api.clone(), alice_dir.path());
    alice.signup("alice", "pw", "Alice A").await.unwrap();
    alice.refresh_stories().await.unwrap();

    let now_favorite = alice.toggle_favorite(&story.story_id).await.unwrap();
    assert!(now_favorite);
    assert!(alice.user().unwrap().is_favorite(&story.story_id));

    // The server kept it too.
    let fetched = api.user(&alice.user().unwrap().token, "alice").await.unwrap();
    assert!(fetched.is_favorite(&story.story_id));

    let now_favorite = alice.toggle_favorite(&story.story_id).await.unwrap();
    assert!(!now_favorite);
    let fetched = api.user(&alice.user().unwrap().token, "alice").await.unwrap();
    assert!(!fetched.is_favorite(&story.story_id));
}

#[tokio::test]
async fn deleting_an_own_story_removes_it_everywhere() {
    let base = spawn_mock().await;
    let dir = TempDir::new().unwrap();
    let mut session = Session::new(client(&base), dir.path());

    session.signup("alice", "pw", "Alice A").await.unwrap();
    let story = session.submit_story("Mine", "http://example.com/m").await.unwrap();
    session.toggle_favorite(&story.story_id).await.unwrap();

    session.delete_story(&story.story_id).await.unwrap();
    assert!(session.visible().is_empty());
    assert!(!session.user().unwrap().is_own(&story.story_id));
    assert!(!session.user().unwrap().is_favorite(&story.story_id));

    session.refresh_stories().await.unwrap();
    assert!(session.visible().is_empty());
}

#[tokio::test]
async fn deleting_a_missing_story_surfaces_the_server_error() {
    let base = spawn_mock().await;
    let api = client(&base);
    let user = api.signup("alice", "pw", "Alice A").await.unwrap();

    let err = api.delete_story(&user.token, "no-such-id").await.unwrap_err();
    match err {
        ApiError::Rejected(msg) => assert!(msg.contains("404"), "message was: {msg}"),
        other => panic!("expected Rejected, got: {other}"),
    }
}

#[tokio::test]
async fn resume_with_a_stale_token_clears_the_saved_session() {
    let base = spawn_mock().await;
    let api = client(&base);
    api.signup("alice", "pw", "Alice A").await.unwrap();

    let dir = TempDir::new().unwrap();
    let store = SessionStore::new(dir.path());
    store
        .save(&SavedSession { username: "alice".into(), token: "stale-token".into() })
        .unwrap();

    let mut session = Session::new(api, dir.path());
    let resumed = session.resume().await.unwrap();
    assert!(!resumed);
    assert!(session.user().is_none());
    assert_eq!(store.load().unwrap(), None);
}

#[tokio::test]
async fn resume_with_a_valid_token_restores_the_login() {
    let base = spawn_mock().await;
    let api = client(&base);
    let user = api.signup("alice", "pw", "Alice A").await.unwrap();

    let dir = TempDir::new().unwrap();
    SessionStore::new(dir.path())
        .save(&SavedSession { username: "alice".into(), token: user.token.clone() })
        .unwrap();

    let mut session = Session::new(api, dir.path());
    assert!(session.resume().await.unwrap());
    assert_eq!(session.user().unwrap().username, "alice");
}
