//! Database tests

use super::*;
use crate::error::AppError;
use chrono::{Duration, Utc};
use tempfile::TempDir;

/// Helper to create a test database
async fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::connect(&db_path).await.unwrap();
    (db, temp_dir)
}

fn make_user(username: &str, email: &str) -> User {
    User {
        id: EntityId::new().0,
        username: username.to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$test-hash".to_string(),
        created_at: Utc::now(),
    }
}

fn make_idea(author_id: &str, text: &str) -> Idea {
    let now = Utc::now();
    Idea {
        id: EntityId::new().0,
        author_id: author_id.to_string(),
        text: text.to_string(),
        image_url: None,
        video_url: None,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_database_connection() {
    let (_db, _temp_dir) = create_test_db().await;
    // Connection successful if we get here without panicking
}

#[tokio::test]
async fn test_user_insert_and_get() {
    let (db, _temp_dir) = create_test_db().await;

    let user = make_user("alice", "alice@example.com");
    db.insert_user(&user).await.unwrap();

    let retrieved = db.get_user(&user.id).await.unwrap();
    assert!(retrieved.is_some());
    let retrieved = retrieved.unwrap();
    assert_eq!(retrieved.username, "alice");
    assert_eq!(retrieved.email, "alice@example.com");
    assert_eq!(retrieved.password_hash, user.password_hash);
}

#[tokio::test]
async fn test_user_unique_constraints() {
    let (db, _temp_dir) = create_test_db().await;

    db.insert_user(&make_user("alice", "alice@example.com"))
        .await
        .unwrap();

    let same_email = db
        .insert_user(&make_user("bob", "alice@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(same_email, AppError::Duplicate(_)));

    let same_username = db
        .insert_user(&make_user("alice", "other@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(same_username, AppError::Duplicate(_)));
}

#[tokio::test]
async fn test_find_user_by_identifier() {
    let (db, _temp_dir) = create_test_db().await;

    let user = make_user("alice", "alice@example.com");
    db.insert_user(&user).await.unwrap();

    // By email, case-insensitively
    let by_email = db
        .find_user_by_identifier("Alice@Example.com")
        .await
        .unwrap();
    assert_eq!(by_email.unwrap().id, user.id);

    // By exact username
    let by_username = db.find_user_by_identifier("alice").await.unwrap();
    assert_eq!(by_username.unwrap().id, user.id);

    let unknown = db.find_user_by_identifier("nobody").await.unwrap();
    assert!(unknown.is_none());
}

#[tokio::test]
async fn test_find_conflicting_user() {
    let (db, _temp_dir) = create_test_db().await;

    let user = make_user("alice", "alice@example.com");
    db.insert_user(&user).await.unwrap();

    let email_conflict = db
        .find_conflicting_user("alice@example.com", "someone")
        .await
        .unwrap();
    assert_eq!(email_conflict.unwrap().id, user.id);

    let username_conflict = db
        .find_conflicting_user("new@example.com", "alice")
        .await
        .unwrap();
    assert_eq!(username_conflict.unwrap().id, user.id);

    let no_conflict = db
        .find_conflicting_user("new@example.com", "someone")
        .await
        .unwrap();
    assert!(no_conflict.is_none());
}

#[tokio::test]
async fn test_idea_crud() {
    let (db, _temp_dir) = create_test_db().await;

    let user = make_user("alice", "alice@example.com");
    db.insert_user(&user).await.unwrap();

    let idea = make_idea(&user.id, "first idea");
    db.insert_idea(&idea).await.unwrap();

    let retrieved = db.get_idea(&idea.id).await.unwrap().unwrap();
    assert_eq!(retrieved.text, "first idea");
    assert_eq!(retrieved.author_id, user.id);

    let later = Utc::now() + Duration::seconds(1);
    db.update_idea_text(&idea.id, "edited idea", later)
        .await
        .unwrap();
    let updated = db.get_idea(&idea.id).await.unwrap().unwrap();
    assert_eq!(updated.text, "edited idea");
    assert!(updated.updated_at > updated.created_at);

    db.delete_idea(&idea.id).await.unwrap();
    assert!(db.get_idea(&idea.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_ideas_newest_first() {
    let (db, _temp_dir) = create_test_db().await;

    let user = make_user("alice", "alice@example.com");
    db.insert_user(&user).await.unwrap();

    let mut older = make_idea(&user.id, "older");
    older.created_at = Utc::now() - Duration::minutes(5);
    older.updated_at = older.created_at;
    let newer = make_idea(&user.id, "newer");

    db.insert_idea(&older).await.unwrap();
    db.insert_idea(&newer).await.unwrap();

    let ideas = db.list_ideas().await.unwrap();
    assert_eq!(ideas.len(), 2);
    assert_eq!(ideas[0].text, "newer");
    assert_eq!(ideas[1].text, "older");
}

#[tokio::test]
async fn test_like_set_operations() {
    let (db, _temp_dir) = create_test_db().await;

    let alice = make_user("alice", "alice@example.com");
    let bob = make_user("bob", "bob@example.com");
    db.insert_user(&alice).await.unwrap();
    db.insert_user(&bob).await.unwrap();

    let idea = make_idea(&alice.id, "like me");
    db.insert_idea(&idea).await.unwrap();

    assert!(!db.is_liked(&idea.id, &bob.id).await.unwrap());

    let now = Utc::now();
    db.insert_like(&idea.id, &bob.id, now).await.unwrap();
    assert!(db.is_liked(&idea.id, &bob.id).await.unwrap());

    // Double insert keeps the set duplicate-free
    db.insert_like(&idea.id, &bob.id, now).await.unwrap();
    assert_eq!(db.get_likes(&idea.id).await.unwrap(), vec![bob.id.clone()]);

    db.delete_like(&idea.id, &bob.id, now).await.unwrap();
    assert!(!db.is_liked(&idea.id, &bob.id).await.unwrap());
    assert!(db.get_likes(&idea.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_comments_append_order() {
    let (db, _temp_dir) = create_test_db().await;

    let alice = make_user("alice", "alice@example.com");
    db.insert_user(&alice).await.unwrap();

    let idea = make_idea(&alice.id, "discuss");
    db.insert_idea(&idea).await.unwrap();

    for text in ["first", "second", "third"] {
        let comment = Comment {
            id: EntityId::new().0,
            idea_id: idea.id.clone(),
            author_id: alice.id.clone(),
            text: text.to_string(),
            created_at: Utc::now(),
        };
        db.insert_comment(&comment).await.unwrap();
    }

    let comments = db.get_comments(&idea.id).await.unwrap();
    let texts: Vec<_> = comments.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn test_delete_idea_cascades() {
    let (db, _temp_dir) = create_test_db().await;

    let alice = make_user("alice", "alice@example.com");
    let bob = make_user("bob", "bob@example.com");
    db.insert_user(&alice).await.unwrap();
    db.insert_user(&bob).await.unwrap();

    let idea = make_idea(&alice.id, "short-lived");
    db.insert_idea(&idea).await.unwrap();

    db.insert_like(&idea.id, &bob.id, Utc::now()).await.unwrap();
    let comment = Comment {
        id: EntityId::new().0,
        idea_id: idea.id.clone(),
        author_id: bob.id.clone(),
        text: "nice".to_string(),
        created_at: Utc::now(),
    };
    db.insert_comment(&comment).await.unwrap();

    db.delete_idea(&idea.id).await.unwrap();

    assert!(db.get_idea(&idea.id).await.unwrap().is_none());
    assert!(db.get_likes(&idea.id).await.unwrap().is_empty());
    assert!(db.get_comments(&idea.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_usernames_batch() {
    let (db, _temp_dir) = create_test_db().await;

    let alice = make_user("alice", "alice@example.com");
    let bob = make_user("bob", "bob@example.com");
    db.insert_user(&alice).await.unwrap();
    db.insert_user(&bob).await.unwrap();

    let usernames = db
        .get_usernames(&[alice.id.clone(), bob.id.clone()])
        .await
        .unwrap();
    assert_eq!(usernames.len(), 2);
    assert_eq!(usernames.get(&alice.id).map(String::as_str), Some("alice"));
    assert_eq!(usernames.get(&bob.id).map(String::as_str), Some("bob"));

    assert!(db.get_usernames(&[]).await.unwrap().is_empty());
}
