use std::sync::{Arc, Mutex};

use super::common::{ConsumerBundle, ProviderBundle, journal};
use crate::kernel::bootstrap::Kernel;
use crate::kernel::error::Error;
use crate::router::{
    MemoryRouter, RouteDefinition, RouteGenerationProps, Router, RouterBundle, RouterBundleConfig, RouterError,
    RoutingPreparationEvent,
};

async fn running_kernel() -> Kernel {
    let journal = journal();
    let kernel = Kernel::builder()
        .bundle(Arc::new(RouterBundle::new()))
        .bundle(Arc::new(ProviderBundle::new(&journal)))
        .bundle(Arc::new(ConsumerBundle::new(&journal)))
        .build()
        .await
        .unwrap();
    kernel.init().await.unwrap();
    kernel
}

#[tokio::test]
async fn test_routes_added_by_other_bundles_are_published() {
    let journal = journal();
    let kernel = Kernel::builder()
        .bundle(Arc::new(RouterBundle::new()))
        .bundle(Arc::new(ProviderBundle::new(&journal)))
        .bundle(Arc::new(ConsumerBundle::new(&journal)))
        .build()
        .await
        .unwrap();

    let published = Arc::new(Mutex::new(None));
    let sink = published.clone();
    kernel
        .events()
        .add_sync_listener(move |e: &RoutingPreparationEvent| {
            *sink.lock().unwrap() = Some(e.routes.clone());
            Ok(())
        })
        .await;

    kernel.init().await.unwrap();
    let routes = published.lock().unwrap().clone().expect("routing preparation was not emitted");
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].name.as_deref(), Some("greet"));
}

#[tokio::test]
async fn test_render_and_navigate() {
    let kernel = running_kernel().await;
    let router = kernel.container().resolve::<MemoryRouter>().await.unwrap();

    let route = router.find("greet").unwrap();
    assert_eq!(
        router.path(&route, &RouteGenerationProps::new().param("name", "ada")).unwrap(),
        "/greet/ada"
    );
    assert!(matches!(
        router.path(&route, &RouteGenerationProps::new().param("id", 1)),
        Err(RouterError::MissingParam { .. })
    ));

    router
        .go(&route, &RouteGenerationProps::new().param("name", "ada").query("lang", "en"))
        .unwrap();
    assert_eq!(router.current().as_deref(), Some("/greet/ada?lang=en"));
}

#[tokio::test]
async fn test_conflicting_route_from_bundle_aborts_init() {
    let mut config = RouterBundleConfig::default();
    config.routes.insert("greeting".into(), RouteDefinition::new("/greet/:name"));

    let journal = journal();
    let kernel = Kernel::builder()
        .bundle(Arc::new(RouterBundle::with_config(config)))
        .bundle(Arc::new(ProviderBundle::new(&journal)))
        .bundle(Arc::new(ConsumerBundle::new(&journal)))
        .build()
        .await
        .unwrap();

    let err = kernel.init().await.unwrap_err();
    match err.root() {
        Error::Router(RouterError::RouteConflict { existing, .. }) => {
            assert!(existing.contains("\"name\":\"greeting\""), "existing route: {existing}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
