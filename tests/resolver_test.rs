//! Sign resolver caching and degradation behavior.

mod helpers;

use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use helpers::{mock_resolver, video_page};
use speech2sign::models::sign::SignSource;

#[tokio::test]
async fn second_resolve_hits_cache_not_network() {
    let (server, resolver) = mock_resolver().await;

    // expect(1) makes the mock server fail verification (on drop) if the
    // resolver reaches out more than once for the same token.
    Mock::given(method("GET"))
        .and(path("/sign/zebra"))
        .respond_with(ResponseTemplate::new(200).set_body_string(video_page("/video/zebra.mp4")))
        .expect(1)
        .mount(&server)
        .await;

    let first = resolver.resolve("zebra").await;
    let second = resolver.resolve("zebra").await;

    assert_eq!(first.source, SignSource::External);
    assert_eq!(first.reference, second.reference);
}

#[tokio::test]
async fn negative_outcome_is_cached_too() {
    let (server, resolver) = mock_resolver().await;

    Mock::given(method("GET"))
        .and(path("/sign/gronk"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let first = resolver.resolve("gronk").await;
    let second = resolver.resolve("gronk").await;

    assert_eq!(first.source, SignSource::TextFallback);
    assert_eq!(second.source, SignSource::TextFallback);
    assert!(first.reference.contains("GRONK"));
    assert!(first.reference.contains("NOT FOUND"));
}

#[tokio::test]
async fn phrases_are_looked_up_hyphenated() {
    let (server, resolver) = mock_resolver().await;

    Mock::given(method("GET"))
        .and(path("/sign/thank-you"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(video_page("/video/thank-you.mp4")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let resolution = resolver.resolve("thank you").await;

    assert_eq!(resolution.source, SignSource::External);
    assert_eq!(
        resolution.reference,
        format!("{}/video/thank-you.mp4", server.uri())
    );
}

#[tokio::test]
async fn page_without_video_degrades_to_lexicon() {
    let (server, resolver) = mock_resolver().await;

    Mock::given(method("GET"))
        .and(path("/sign/hello"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>no sign</body></html>"))
        .mount(&server)
        .await;

    let resolution = resolver.resolve("hello").await;

    assert_eq!(resolution.source, SignSource::Lexicon);
}

#[tokio::test]
async fn unreachable_lookup_service_degrades_quietly() {
    let (server, resolver) = mock_resolver().await;
    // Shut the mock server down to force a connection error.
    drop(server);

    let resolution = resolver.resolve("hello").await;

    // Connection failure is swallowed, cached negative, degraded to lexicon.
    assert_eq!(resolution.source, SignSource::Lexicon);

    let again = resolver.resolve("hello").await;
    assert_eq!(again.reference, resolution.reference);
}
