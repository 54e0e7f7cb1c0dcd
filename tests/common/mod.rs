#![allow(dead_code)]

use shortener_store::domain::entities::UrlRecord;
use sqlx::PgPool;

pub fn record(short_url: &str, original_url: &str, user_id: &str) -> UrlRecord {
    UrlRecord::new(short_url, original_url, user_id)
}

/// `count` records with distinct tokens and URLs, all owned by `user_id`.
pub fn numbered_records(count: usize, user_id: &str) -> Vec<UrlRecord> {
    (0..count)
        .map(|i| {
            UrlRecord::new(
                format!("tok{i:05}"),
                format!("https://example.com/{i}"),
                user_id,
            )
        })
        .collect()
}

pub async fn insert_url(pool: &PgPool, short_url: &str, full_url: &str, user_id: &str) {
    sqlx::query("INSERT INTO short_url (full_url, short_url, user_id) VALUES ($1, $2, $3)")
        .bind(full_url)
        .bind(short_url)
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn insert_deleted_url(pool: &PgPool, short_url: &str, full_url: &str, user_id: &str) {
    sqlx::query(
        "INSERT INTO short_url (full_url, short_url, user_id, is_deleted) VALUES ($1, $2, $3, TRUE)",
    )
    .bind(full_url)
    .bind(short_url)
    .bind(user_id)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn count_rows(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM short_url")
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn is_deleted(pool: &PgPool, short_url: &str) -> bool {
    sqlx::query_scalar("SELECT is_deleted FROM short_url WHERE short_url = $1")
        .bind(short_url)
        .fetch_one(pool)
        .await
        .unwrap()
}
