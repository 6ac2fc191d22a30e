//! Store contract checks shared by every `CommentStore` realization.
#![allow(dead_code)]

use discussion_service::models::Comment;
use discussion_service::{CommentStore, StoreError};
use std::sync::Arc;
use std::time::Duration;

pub async fn create_comments(store: &dyn CommentStore, post_id: &str, n: usize) -> Vec<Comment> {
    let mut created = Vec::with_capacity(n);
    for i in 0..n {
        let comment = store
            .create_comment(post_id, None, &format!("Comment {}", i + 1))
            .await
            .expect("create comment");
        created.push(comment);
    }
    created
}

/// Follow cursors until exhausted, returning every page
pub async fn walk_pages(
    store: &dyn CommentStore,
    post_id: &str,
    first: usize,
) -> Vec<Vec<Comment>> {
    let mut pages = Vec::new();
    let mut after: Option<String> = None;
    loop {
        let page = store
            .list_comments(post_id, first, after.as_deref())
            .await
            .expect("list comments");
        let next = page.next_cursor.clone();
        pages.push(page.items);
        match next {
            Some(cursor) => after = Some(cursor),
            None => break,
        }
    }
    pages
}

pub async fn check_posts(store: &dyn CommentStore) {
    let older = store.create_post("Older", "first").await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let newer = store.create_post("Newer", "second").await.unwrap();

    assert!(!older.id.is_empty());
    assert_eq!(older.title, "Older");
    assert!(!older.comments_disabled);

    let found = store.get_post(&older.id).await.unwrap();
    assert_eq!(found.id, older.id);
    assert_eq!(found.content, "first");

    let posts = store.list_posts().await.unwrap();
    let newer_pos = posts.iter().position(|p| p.id == newer.id).unwrap();
    let older_pos = posts.iter().position(|p| p.id == older.id).unwrap();
    assert!(newer_pos < older_pos, "posts must be newest first");

    assert!(matches!(
        store.get_post("does-not-exist").await,
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        store.toggle_comments("does-not-exist", true).await,
        Err(StoreError::NotFound)
    ));
}

pub async fn check_comment_errors(store: &dyn CommentStore) {
    let post = store.create_post("Test Post", "Test Content").await.unwrap();

    let too_long = "x".repeat(2001);
    let err = store
        .create_comment(&post.id, None, &too_long)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::TooLong { length: 2001, max: 2000 }));

    // exactly at the limit is accepted
    store
        .create_comment(&post.id, None, &"x".repeat(2000))
        .await
        .unwrap();

    assert!(matches!(
        store.create_comment("does-not-exist", None, "hi").await,
        Err(StoreError::NotFound)
    ));
    // length is checked before the post lookup
    assert!(matches!(
        store.create_comment("does-not-exist", None, &too_long).await,
        Err(StoreError::TooLong { .. })
    ));

    let toggled = store.toggle_comments(&post.id, true).await.unwrap();
    assert!(toggled.comments_disabled);
    assert!(matches!(
        store.create_comment(&post.id, None, "Should fail").await,
        Err(StoreError::Forbidden)
    ));
    // too long still wins on a disabled post
    assert!(matches!(
        store.create_comment(&post.id, None, &too_long).await,
        Err(StoreError::TooLong { .. })
    ));

    let toggled = store.toggle_comments(&post.id, false).await.unwrap();
    assert!(!toggled.comments_disabled);
    store
        .create_comment(&post.id, None, "Should succeed")
        .await
        .unwrap();

    // only the two accepted comments exist
    let page = store.list_comments(&post.id, 10, None).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[1].content, "Should succeed");
}

pub async fn check_replies(store: &dyn CommentStore) {
    let post = store.create_post("Test Post", "Test Content").await.unwrap();

    let comment = store
        .create_comment(&post.id, None, "Test Comment")
        .await
        .unwrap();
    assert!(comment.parent_id.is_none());
    assert_eq!(comment.post_id, post.id);

    let child = store
        .create_comment(&post.id, Some(&comment.id), "Child Comment")
        .await
        .unwrap();
    assert_eq!(child.parent_id.as_deref(), Some(comment.id.as_str()));

    let page = store.list_comments(&post.id, 10, None).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert!(page.next_cursor.is_none());
}

pub async fn check_pagination(store: &dyn CommentStore) {
    let post = store.create_post("Test Post", "Test Content").await.unwrap();
    let comments = create_comments(store, &post.id, 15).await;

    let page1 = store.list_comments(&post.id, 5, None).await.unwrap();
    assert_eq!(page1.items, comments[0..5].to_vec());
    assert_eq!(page1.next_cursor.as_deref(), Some(comments[4].id.as_str()));

    let page2 = store
        .list_comments(&post.id, 5, page1.next_cursor.as_deref())
        .await
        .unwrap();
    assert_eq!(page2.items, comments[5..10].to_vec());
    assert_eq!(page2.next_cursor.as_deref(), Some(comments[9].id.as_str()));

    let page3 = store
        .list_comments(&post.id, 5, page2.next_cursor.as_deref())
        .await
        .unwrap();
    assert_eq!(page3.items, comments[10..15].to_vec());
    assert!(page3.next_cursor.is_none());
}

pub async fn check_cursor_walk(store: &dyn CommentStore) {
    let post = store.create_post("Walk", "").await.unwrap();
    let comments = create_comments(store, &post.id, 7).await;

    let pages = walk_pages(store, &post.id, 3).await;
    assert_eq!(pages.len(), 3); // ceil(7 / 3)
    assert_eq!(pages[2].len(), 1);

    let flattened: Vec<Comment> = pages.into_iter().flatten().collect();
    assert_eq!(flattened, comments);
}

pub async fn check_cursor_edge_cases(store: &dyn CommentStore) {
    let post = store.create_post("Edges", "").await.unwrap();
    let other = store.create_post("Other", "").await.unwrap();
    let comments = create_comments(store, &post.id, 3).await;
    let foreign = create_comments(store, &other.id, 1).await;

    // empty post and unknown post look the same
    let empty = store.create_post("Empty", "").await.unwrap();
    let page = store.list_comments(&empty.id, 5, None).await.unwrap();
    assert!(page.items.is_empty() && page.next_cursor.is_none());
    let page = store.list_comments("does-not-exist", 5, None).await.unwrap();
    assert!(page.items.is_empty() && page.next_cursor.is_none());

    // cursor from another post restarts at the beginning
    let page = store
        .list_comments(&post.id, 2, Some(&foreign[0].id))
        .await
        .unwrap();
    assert_eq!(page.items, comments[0..2].to_vec());

    // garbage cursor restarts too
    let page = store
        .list_comments(&post.id, 2, Some("garbage"))
        .await
        .unwrap();
    assert_eq!(page.items, comments[0..2].to_vec());

    // cursor at the last comment yields an empty final page
    let page = store
        .list_comments(&post.id, 2, Some(&comments[2].id))
        .await
        .unwrap();
    assert!(page.items.is_empty());
    assert!(page.next_cursor.is_none());

    // zero-sized page
    let page = store.list_comments(&post.id, 0, None).await.unwrap();
    assert!(page.items.is_empty());
    assert!(page.next_cursor.is_none());
}

pub async fn check_concurrent_appends(store: Arc<dyn CommentStore>) {
    let post = store.create_post("Busy", "").await.unwrap();

    let mut handles = Vec::new();
    for worker in 0..8 {
        let store = store.clone();
        let post_id = post.id.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..10 {
                store
                    .create_comment(&post_id, None, &format!("w{} c{}", worker, i))
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let pages = walk_pages(store.as_ref(), &post.id, 7).await;
    let all: Vec<Comment> = pages.into_iter().flatten().collect();
    assert_eq!(all.len(), 80);

    let mut ids: Vec<&str> = all.iter().map(|c| c.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 80, "no duplicates across pages");

    // each worker's comments keep their relative order
    for worker in 0..8 {
        let prefix = format!("w{} ", worker);
        let seen: Vec<&str> = all
            .iter()
            .filter(|c| c.content.starts_with(&prefix))
            .map(|c| c.content.as_str())
            .collect();
        let expected: Vec<String> = (0..10).map(|i| format!("w{} c{}", worker, i)).collect();
        assert_eq!(seen, expected);
    }
}

/// Once a toggle to disabled returns, no further comment is admitted.
pub async fn check_toggle_gate_under_contention(store: Arc<dyn CommentStore>) {
    let post = store.create_post("Gate", "").await.unwrap();

    let mut writers = Vec::new();
    for _ in 0..4 {
        let store = store.clone();
        let post_id = post.id.clone();
        writers.push(tokio::spawn(async move {
            loop {
                match store.create_comment(&post_id, None, "spam").await {
                    Ok(_) => tokio::task::yield_now().await,
                    Err(StoreError::Forbidden) => break,
                    Err(e) => panic!("unexpected error: {}", e),
                }
            }
        }));
    }

    tokio::time::sleep(Duration::from_millis(20)).await;
    store.toggle_comments(&post.id, true).await.unwrap();

    let at_toggle = walk_pages(store.as_ref(), &post.id, 100)
        .await
        .into_iter()
        .flatten()
        .count();

    for writer in writers {
        writer.await.unwrap();
    }

    let after_writers = walk_pages(store.as_ref(), &post.id, 100)
        .await
        .into_iter()
        .flatten()
        .count();
    assert_eq!(at_toggle, after_writers);
}
