use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use time::macros::datetime;
use uuid::Uuid;

use super::*;

// =============================================================
// Helpers
// =============================================================

async fn memory_log() -> MessageLog {
    let options = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    crate::db::migrate(&pool).await.unwrap();
    MessageLog::new(pool)
}

fn unreachable_log() -> MessageLog {
    let options = SqliteConnectOptions::new().filename("/nonexistent-sketchroom-dir/nested/chat.db");
    let pool = SqlitePoolOptions::new()
        .acquire_timeout(Duration::from_millis(300))
        .connect_lazy_with(options);
    MessageLog::new(pool)
}

fn temp_db_path() -> PathBuf {
    std::env::temp_dir().join(format!("sketchroom-chat-{}.db", Uuid::new_v4()))
}

fn cleanup(path: &PathBuf) {
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.clone().into_os_string();
        file.push(suffix);
        std::fs::remove_file(PathBuf::from(file)).unwrap_or_default();
    }
}

const T0: OffsetDateTime = datetime!(2024-05-01 09:15:30 UTC);

// =============================================================
// append
// =============================================================

#[tokio::test]
async fn append_assigns_increasing_ids() {
    let log = memory_log().await;
    let a = log.append("ada", "hello", T0).await.unwrap();
    let b = log.append("bob", "hi ada", T0).await.unwrap();
    assert!(b > a);
}

#[tokio::test]
async fn append_rejects_blank_author_or_body() {
    let log = memory_log().await;
    assert!(matches!(log.append("", "hello", T0).await, Err(ChatError::EmptyAuthor)));
    assert!(matches!(log.append("   ", "hello", T0).await, Err(ChatError::EmptyAuthor)));
    assert!(matches!(log.append("ada", "", T0).await, Err(ChatError::EmptyBody)));
    assert!(matches!(log.append("ada", " \n\t", T0).await, Err(ChatError::EmptyBody)));
    assert!(log.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn rejection_codes_differ_from_persistence_codes() {
    assert_eq!(ChatError::EmptyBody.error_code(), "E_REJECTED");
    assert!(!ChatError::EmptyBody.retryable());

    let err = unreachable_log().append("ada", "hello", T0).await.unwrap_err();
    assert_eq!(err.error_code(), "E_PERSISTENCE");
    assert!(err.retryable());
}

// =============================================================
// list_all
// =============================================================

#[tokio::test]
async fn list_all_is_most_recent_first() {
    let log = memory_log().await;
    log.append("ada", "first", T0).await.unwrap();
    log.append("bob", "second", T0).await.unwrap();
    log.append("cy", "third", T0).await.unwrap();

    let bodies: Vec<String> = log.list_all().await.unwrap().into_iter().map(|m| m.body).collect();
    assert_eq!(bodies, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn list_all_reflects_append_immediately() {
    let log = memory_log().await;
    let id = log.append("ada", "ping", T0).await.unwrap();
    let messages = log.list_all().await.unwrap();
    assert_eq!(messages[0].id, id);
    assert_eq!(messages[0].sent_at, T0);
}

#[tokio::test]
async fn list_all_twice_without_append_is_identical() {
    let log = memory_log().await;
    log.append("ada", "one", T0).await.unwrap();
    log.append("bob", "two", T0).await.unwrap();
    let first = log.list_all().await.unwrap();
    let second = log.list_all().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn list_all_on_unreachable_store_is_persistence_error() {
    let err = unreachable_log().list_all().await.unwrap_err();
    assert!(matches!(err, ChatError::Persistence(_)));
}

// =============================================================
// Durability / multiple writers
// =============================================================

#[tokio::test]
async fn messages_survive_reopening_the_store() {
    let path = temp_db_path();
    let url = format!("sqlite://{}", path.display());

    let pool = crate::db::init_pool(&url, 2).await.unwrap();
    let log = MessageLog::new(pool);
    log.append("ada", "persist me", T0).await.unwrap();
    log.close().await;

    let reopened = MessageLog::new(crate::db::init_pool(&url, 2).await.unwrap());
    let messages = reopened.list_all().await.unwrap();
    reopened.close().await;
    cleanup(&path);

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].body, "persist me");
}

#[tokio::test]
async fn independent_writers_get_unique_increasing_ids() {
    let path = temp_db_path();
    let url = format!("sqlite://{}", path.display());

    let first = MessageLog::new(crate::db::init_pool(&url, 2).await.unwrap());
    let second = MessageLog::new(crate::db::init_pool(&url, 2).await.unwrap());

    let writes_a = async {
        for i in 0..10 {
            first.append("tab-a", &format!("a{i}"), T0).await.unwrap();
        }
    };
    let writes_b = async {
        for i in 0..10 {
            second.append("tab-b", &format!("b{i}"), T0).await.unwrap();
        }
    };
    tokio::join!(writes_a, writes_b);

    let ids: Vec<MessageId> = first.list_all().await.unwrap().into_iter().map(|m| m.id).collect();
    first.close().await;
    second.close().await;
    cleanup(&path);

    assert_eq!(ids.len(), 20);
    assert!(ids.windows(2).all(|w| w[0] > w[1]), "ids must be strictly decreasing in display order: {ids:?}");
}

// =============================================================
// Display
// =============================================================

#[test]
fn display_line_uses_clock_time() {
    let message = ChatMessage { id: 1, author: "ada".into(), body: "hello".into(), sent_at: T0 };
    assert_eq!(message.display_line(), "[09:15:30] ada: hello");
}
