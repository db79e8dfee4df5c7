use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

use crate::container::{Container, ContainerError, Service, Token};
use crate::kernel::error::Error;

#[derive(Debug, PartialEq)]
struct Database {
    url: String,
}

impl Service for Database {}

#[derive(Debug)]
struct Repository {
    db: Arc<Database>,
}

impl Service for Repository {}

const DB_URL: Token<String> = Token::from_static("DB_URL");

#[tokio::test]
async fn test_set_and_get_eager() {
    let container = Container::new();
    container.set(&DB_URL, "postgres://localhost".to_string()).unwrap();

    let url = container.get(&DB_URL).await.unwrap();
    assert_eq!(url.as_str(), "postgres://localhost");
    assert!(container.contains(&DB_URL));
    assert_eq!(container.len(), 1);
}

#[tokio::test]
async fn test_unknown_token() {
    let container = Container::new();
    let err = container.get(&DB_URL).await.unwrap_err();
    match err {
        ContainerError::UnknownToken { token } => assert_eq!(token, "\"DB_URL\""),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_get_returns_same_instance() {
    let container = Container::new();
    container.provide(Database { url: "a".into() }).unwrap();

    let first = container.resolve::<Database>().await.unwrap();
    let second = container.resolve::<Database>().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_factory_runs_once() {
    let container = Container::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    container
        .set_factory(&Database::token(), move |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Database { url: "lazy".into() })
            }
        })
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0, "factory must not run at bind time");
    let first = container.resolve::<Database>().await.unwrap();
    let second = container.resolve::<Database>().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_factory_resolves_dependencies() {
    let container = Container::new();
    container.provide(Database { url: "dep".into() }).unwrap();
    container
        .set_factory(&Repository::token(), |c: Container| async move {
            let db = c.resolve::<Database>().await?;
            Ok(Repository { db })
        })
        .unwrap();

    let repo = container.resolve::<Repository>().await.unwrap();
    assert_eq!(repo.db.url, "dep");
}

#[tokio::test]
async fn test_factory_failure_is_wrapped() {
    let container = Container::new();
    container
        .set_factory(&Repository::token(), |c: Container| async move {
            let db = c.resolve::<Database>().await?;
            Ok(Repository { db })
        })
        .unwrap();

    let err = container.resolve::<Repository>().await.unwrap_err();
    match err {
        ContainerError::FactoryFailed { source, .. } => {
            assert!(matches!(*source, Error::Container(ContainerError::UnknownToken { .. })));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // A failed factory may be retried once its dependency shows up
    container.provide(Database { url: "late".into() }).unwrap();
    assert_eq!(container.resolve::<Repository>().await.unwrap().db.url, "late");
}

#[tokio::test]
async fn test_circular_dependency_detected() {
    let container = Container::new();
    let a: Token<u32> = Token::named("A");
    let b: Token<u32> = Token::named("B");

    let b_for_a = b.clone();
    container
        .set_factory(&a, move |c: Container| {
            let b = b_for_a.clone();
            async move { Ok(*c.get(&b).await? + 1) }
        })
        .unwrap();
    let a_for_b = a.clone();
    container
        .set_factory(&b, move |c: Container| {
            let a = a_for_b.clone();
            async move { Ok(*c.get(&a).await? + 1) }
        })
        .unwrap();

    let err = container.get(&a).await.unwrap_err();
    assert!(matches!(err, ContainerError::CircularDependency { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_self_resolution_through_captured_handle_is_a_cycle() {
    let container = Container::new();
    let token: Token<u32> = Token::named("SELF");

    let captured = container.clone();
    let inner = token.clone();
    container
        .set_factory(&token, move |_| {
            let captured = captured.clone();
            let inner = inner.clone();
            async move { Ok(*captured.get(&inner).await? + 1) }
        })
        .unwrap();

    let err = container.get(&token).await.unwrap_err();
    assert!(matches!(err, ContainerError::CircularDependency { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_concurrent_first_resolution_shares_one_instance() {
    let container = Container::new();
    let slow: Token<u32> = Token::named("SLOW");
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let calls = Arc::new(AtomicUsize::new(0));

    {
        let started = started.clone();
        let release = release.clone();
        let calls = calls.clone();
        container
            .set_factory(&slow, move |_| {
                let started = started.clone();
                let release = release.clone();
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    started.notify_one();
                    release.notified().await;
                    Ok(7)
                }
            })
            .unwrap();
    }
    container.freeze();

    let spawn_get = |container: Container, token: Token<u32>| tokio::spawn(async move { container.get(&token).await });

    let first = spawn_get(container.clone(), slow.clone());
    started.notified().await;

    // The second caller reaches the cell while the factory is still parked
    let second = spawn_get(container.clone(), slow.clone());
    tokio::task::yield_now().await;
    release.notify_one();

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();
    assert_eq!(*first, 7);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_overwrite_allowed_by_default() {
    let container = Container::new();
    container.set(&DB_URL, "one".to_string()).unwrap();
    container.set(&DB_URL, "two".to_string()).unwrap();
    assert_eq!(container.get(&DB_URL).await.unwrap().as_str(), "two");
    assert_eq!(container.len(), 1);
}

#[tokio::test]
async fn test_strict_rejects_duplicates() {
    let container = Container::with_strict(true);
    container.set(&DB_URL, "one".to_string()).unwrap();
    let err = container.set(&DB_URL, "two".to_string()).unwrap_err();
    assert!(matches!(err, ContainerError::DuplicateToken { .. }));
    assert_eq!(container.get(&DB_URL).await.unwrap().as_str(), "one");
}

#[tokio::test]
async fn test_frozen_rejects_bindings_but_resolves() {
    let container = Container::new();
    container
        .set_factory(&Database::token(), |_| async { Ok(Database { url: "frozen".into() }) })
        .unwrap();
    container.freeze();
    assert!(container.is_frozen());

    let err = container.provide(Database { url: "late".into() }).unwrap_err();
    assert!(matches!(err, ContainerError::Frozen { .. }));
    assert_eq!(container.resolve::<Database>().await.unwrap().url, "frozen");
}

#[tokio::test]
async fn test_type_mismatch() {
    let container = Container::new();
    container.set(&Token::<String>::named("PORT"), "8080".to_string()).unwrap();

    let err = container.get(&Token::<u16>::named("PORT")).await.unwrap_err();
    match err {
        ContainerError::TypeMismatch { expected, found, .. } => {
            assert_eq!(expected, "u16");
            assert_eq!(found, "alloc::string::String");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_clones_share_bindings() {
    let container = Container::new();
    let clone = container.clone();
    clone.set(&DB_URL, "shared".to_string()).unwrap();
    assert!(container.contains(&DB_URL));
    assert_eq!(container.keys(), vec!["\"DB_URL\"".to_string()]);
}
