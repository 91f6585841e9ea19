use jobmesh_browser::{BrowserActions, BrowserEngine};
use jobmesh_core::BrowserConfig;
use std::time::Duration;

#[tokio::test]
#[ignore = "Requires Chrome/Chromium installed"]
async fn test_browser_engine_launch() {
    let engine = BrowserEngine::launch(&BrowserConfig::default()).await;
    assert!(engine.is_ok(), "Failed to launch browser engine");
}

#[tokio::test]
#[ignore = "Requires Chrome/Chromium installed and network access"]
async fn test_navigation_and_content() {
    let engine = BrowserEngine::launch(&BrowserConfig::default())
        .await
        .unwrap();
    let session = engine.open_page().await.unwrap();

    session
        .navigate("https://example.com", Duration::from_secs(30))
        .await
        .unwrap();
    session.wait_for_selector("h1", 5_000).await.unwrap();

    let heading = session.extract_text("h1").await.unwrap();
    assert!(heading.contains("Example"));

    let html = session.content().await.unwrap();
    assert!(html.contains("<h1>"));

    session.close().await.unwrap();
}

#[tokio::test]
#[ignore = "Requires Chrome/Chromium installed"]
async fn test_wait_for_missing_selector_times_out() {
    let engine = BrowserEngine::launch(&BrowserConfig::default())
        .await
        .unwrap();
    let session = engine.open_page().await.unwrap();

    let err = session
        .wait_for_selector("div.never-rendered", 300)
        .await
        .unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
#[ignore = "Requires Chrome/Chromium installed"]
async fn test_dropped_session_does_not_block() {
    let engine = BrowserEngine::launch(&BrowserConfig::default())
        .await
        .unwrap();
    {
        let session = engine.open_page().await.unwrap();
        assert!(session.is_open());
        // Dropped without close(); the guard schedules the close
    }
    let second = engine.open_page().await.unwrap();
    second.close().await.unwrap();
}
