use std::sync::Arc;

use serde_json::json;
use tempfile::tempdir;

use super::common::{ConsumerBundle, Greeter, ProviderBundle, entries, journal};
use crate::bundle::{Bundle, BundleError};
use crate::config::KernelConfig;
use crate::container::{ContainerError, Service};
use crate::kernel::bootstrap::Kernel;
use crate::kernel::error::Error;
use crate::kernel::phase::KernelPhase;

#[tokio::test]
async fn test_provider_before_consumer() {
    let journal = journal();
    let kernel = Kernel::builder()
        .bundle(Arc::new(ProviderBundle::new(&journal)))
        .bundle(Arc::new(ConsumerBundle::new(&journal)))
        .build()
        .await
        .unwrap();

    kernel.init().await.unwrap();
    assert_eq!(entries(&journal), vec!["provider:init", "consumer:init:hello"]);
    assert_eq!(kernel.phase(), KernelPhase::Running);
}

#[tokio::test]
async fn test_consumer_before_provider_fails_in_init() {
    let journal = journal();
    let kernel = Kernel::builder()
        .bundle(Arc::new(ConsumerBundle::new(&journal)))
        .bundle(Arc::new(ProviderBundle::new(&journal)))
        .build()
        .await
        .unwrap();

    let err = kernel.init().await.unwrap_err();
    match &err {
        Error::BundleLifecycle { phase, bundle, .. } => {
            assert_eq!(*phase, KernelPhase::Initialising);
            assert_eq!(bundle, "consumer");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(matches!(err.root(), Error::Container(ContainerError::UnknownToken { .. })));
    // The provider never got its turn
    assert!(entries(&journal).is_empty());
    assert_eq!(kernel.phase(), KernelPhase::Initialising);
}

#[tokio::test]
async fn test_config_setter_window() {
    let journal = journal();
    let provider = Arc::new(ProviderBundle::new(&journal));
    let kernel = Kernel::builder()
        .bundle(provider.clone())
        .bundle(Arc::new(ConsumerBundle::new(&journal)))
        .build()
        .await
        .unwrap();

    provider
        .config()
        .update(|c| c.greeting = "bonjour".into())
        .await
        .unwrap();

    kernel.init().await.unwrap();
    assert_eq!(kernel.container().resolve::<Greeter>().await.unwrap().greeting, "bonjour");

    let err = provider
        .config()
        .update(|c| c.greeting = "too late".into())
        .await
        .unwrap_err();
    assert!(matches!(err, BundleError::Stage { phase: KernelPhase::Running, .. }));
}

#[tokio::test]
async fn test_kernel_config_file_overrides() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("strata.json");
    tokio::fs::write(
        &path,
        json!({ "strict_container": true, "bundles": { "provider": { "greeting": "hola" } } }).to_string(),
    )
    .await
    .unwrap();

    let journal = journal();
    let kernel = Kernel::builder()
        .config(KernelConfig::from_path(&path).await.unwrap())
        .bundle(Arc::new(ProviderBundle::new(&journal)))
        .bundle(Arc::new(ConsumerBundle::new(&journal)))
        .build()
        .await
        .unwrap();

    assert!(kernel.container().is_strict());
    kernel.init().await.unwrap();
    assert_eq!(entries(&journal).last().map(String::as_str), Some("consumer:init:hola"));
}

#[tokio::test]
async fn test_blank_greeting_rejected() {
    let journal = journal();
    let kernel = Kernel::builder()
        .bundle_with_config(Arc::new(ProviderBundle::new(&journal)), json!({ "greeting": "  " }))
        .build()
        .await
        .unwrap();

    let err = kernel.init().await.unwrap_err();
    assert!(matches!(err, Error::Configuration { ref bundle, .. } if bundle == "provider"));
    assert!(!kernel.container().contains(&<Greeter as Service>::token()));
}

#[tokio::test]
async fn test_full_lifecycle_to_stopped() {
    let journal = journal();
    let kernel = Kernel::builder()
        .bundle(Arc::new(ProviderBundle::new(&journal)))
        .build()
        .await
        .unwrap();

    kernel.init().await.unwrap();
    kernel.shutdown().await.unwrap();
    assert_eq!(kernel.phase(), KernelPhase::Stopped);
    assert!(matches!(kernel.shutdown().await, Err(Error::NotRunning { phase: KernelPhase::Stopped })));
}
