//! PostgreSQL 存储测试
//!
//! 需要数据库：TEST_DATABASE_URL=postgresql://... cargo test -- --ignored

use account_auth::{
    error::AppError,
    models::{session::Session, user::User},
    repository::{PgTokenStore, PgUserStore, TokenStore, UserStore},
};
use chrono::Utc;
use serial_test::serial;
use uuid::Uuid;

mod common;
use common::{create_test_config, setup_test_db};

fn test_user(email: &str) -> User {
    User::new(
        email.to_string(),
        "Test".to_string(),
        "User".to_string(),
        "$argon2id$v=19$m=1024,t=1,p=1$c2FsdA$aGFzaA".to_string(),
        Utc::now(),
    )
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_user_store_insert_and_find() {
    let pool = setup_test_db(&create_test_config()).await;
    let store = PgUserStore::new(pool.clone());

    let user = test_user("test@example.com");
    store.insert(&user).await.unwrap();

    let found = store
        .find_by_email("TEST@example.com")
        .await
        .unwrap()
        .expect("User not found");
    assert_eq!(found.id, user.id);

    let found = store.find_by_id(user.id).await.unwrap().expect("User not found");
    assert_eq!(found.email, "test@example.com");
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_user_store_unique_email() {
    let pool = setup_test_db(&create_test_config()).await;
    let store = PgUserStore::new(pool.clone());

    store.insert(&test_user("dup@example.com")).await.unwrap();
    let result = store.insert(&test_user("DUP@example.com")).await;

    assert!(matches!(result, Err(AppError::EmailTaken)));
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_user_store_update_compare_and_swap() {
    let pool = setup_test_db(&create_test_config()).await;
    let store = PgUserStore::new(pool.clone());

    let user = test_user("cas@example.com");
    store.insert(&user).await.unwrap();

    let mut changed = user.clone();
    changed.password_hash = "new-hash".to_string();
    assert!(store.update(&changed).await.unwrap());

    // 旧版本写入失败
    assert!(!store.update(&user).await.unwrap());

    let stored = store.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(stored.password_hash, "new-hash");
    assert_eq!(stored.version, user.version + 1);
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_token_store_put_get_delete() {
    let pool = setup_test_db(&create_test_config()).await;
    let users = PgUserStore::new(pool.clone());
    let tokens = PgTokenStore::new(pool.clone());

    let user = test_user("session@example.com");
    users.insert(&user).await.unwrap();

    let session = Session {
        token_hash: format!("{:0>64}", Uuid::new_v4().simple()),
        user_id: user.id,
        issued_at: Utc::now(),
        expires_at: None,
    };
    tokens.put(&session).await.unwrap();

    let found = tokens.get(&session.token_hash).await.unwrap().unwrap();
    assert_eq!(found.user_id, user.id);

    assert!(tokens.delete(&session.token_hash).await.unwrap());
    assert!(!tokens.delete(&session.token_hash).await.unwrap());
    assert!(tokens.get(&session.token_hash).await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_token_store_purge_expired() {
    let pool = setup_test_db(&create_test_config()).await;
    let users = PgUserStore::new(pool.clone());
    let tokens = PgTokenStore::new(pool.clone());

    let user = test_user("purge@example.com");
    users.insert(&user).await.unwrap();

    let now = Utc::now();
    for (hash, expires_at) in [
        ("expired", Some(now - chrono::Duration::hours(1))),
        ("live", Some(now + chrono::Duration::hours(1))),
        ("forever", None),
    ] {
        let session = Session {
            token_hash: hash.to_string(),
            user_id: user.id,
            issued_at: now - chrono::Duration::hours(2),
            expires_at,
        };
        tokens.put(&session).await.unwrap();
    }

    assert_eq!(tokens.purge_expired(now).await.unwrap(), 1);
    assert!(tokens.get("expired").await.unwrap().is_none());
    assert!(tokens.get("live").await.unwrap().is_some());
    assert!(tokens.get("forever").await.unwrap().is_some());
}
