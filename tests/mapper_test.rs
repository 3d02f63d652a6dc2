//! Greedy phrase mapper behavior.

mod helpers;

use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use helpers::{mock_resolver, video_page};
use speech2sign::models::sign::SignSource;
use speech2sign::services::lexicon::Lexicon;
use speech2sign::services::mapper::map_text_to_signs;

#[tokio::test]
async fn single_phrase_maps_to_single_entry() {
    let (_server, resolver) = mock_resolver().await;

    for phrase in ["hello", "good morning", "nice to meet you", "thank you very much"] {
        let sequence = map_text_to_signs(phrase, &resolver).await;
        let expected_len = phrase.split(' ').count();

        assert_eq!(sequence.len(), 1, "phrase {phrase:?} split into entries");
        assert_eq!(sequence[0].word, phrase);
        assert_eq!(sequence[0].phrase_length, expected_len);
    }
}

#[tokio::test]
async fn longest_match_wins() {
    let (_server, resolver) = mock_resolver().await;

    // Both "thank you" and "thank you very much" are lexicon keys; the
    // four-word phrase must win in a single entry.
    let sequence = map_text_to_signs("thank you very much", &resolver).await;

    assert_eq!(sequence.len(), 1);
    assert_eq!(sequence[0].word, "thank you very much");
    assert_eq!(sequence[0].phrase_length, 4);
    assert_eq!(
        sequence[0].original_words,
        vec!["thank", "you", "very", "much"]
    );
}

#[tokio::test]
async fn unknown_word_gets_text_fallback() {
    let (_server, resolver) = mock_resolver().await;

    let sequence = map_text_to_signs("xyzzy", &resolver).await;

    assert_eq!(sequence.len(), 1);
    assert_eq!(sequence[0].word, "xyzzy");
    assert_eq!(sequence[0].phrase_length, 1);
    assert_eq!(sequence[0].source, SignSource::TextFallback);
    assert!(sequence[0].image_url.contains("XYZZY"));
}

#[tokio::test]
async fn order_is_preserved_without_gaps() {
    let (_server, resolver) = mock_resolver().await;

    let text = "good morning thank you very much xyzzy hello world";
    let sequence = map_text_to_signs(text, &resolver).await;

    let reconstructed: Vec<String> = sequence
        .iter()
        .flat_map(|entry| entry.original_words.iter().cloned())
        .collect();
    let expected: Vec<String> = text.split_whitespace().map(str::to_string).collect();
    assert_eq!(reconstructed, expected);
}

#[tokio::test]
async fn empty_input_yields_empty_sequence() {
    let (_server, resolver) = mock_resolver().await;

    assert!(map_text_to_signs("", &resolver).await.is_empty());
    assert!(map_text_to_signs("   \t  ", &resolver).await.is_empty());
}

#[tokio::test]
async fn punctuation_only_word_still_resolves() {
    let (_server, resolver) = mock_resolver().await;

    // An all-punctuation word cleans to the empty string but is still
    // resolved to a placeholder entry rather than skipped.
    let sequence = map_text_to_signs("hello !!!", &resolver).await;

    assert_eq!(sequence.len(), 2);
    assert_eq!(sequence[1].word, "");
    assert_eq!(sequence[1].original_words, vec!["!!!"]);
    assert_eq!(sequence[1].phrase_length, 1);
    assert_eq!(sequence[1].source, SignSource::TextFallback);
}

#[tokio::test]
async fn punctuation_is_stripped_only_at_finalization() {
    let (_server, resolver) = mock_resolver().await;

    // "world," does not match the "hello world" phrase (matching sees the
    // raw word), and the finalized single word is cleaned.
    let sequence = map_text_to_signs("hello world,", &resolver).await;

    assert_eq!(sequence.len(), 2);
    assert_eq!(sequence[0].word, "hello");
    assert_eq!(sequence[1].word, "world");
    assert_eq!(sequence[1].original_words, vec!["world,"]);
}

#[tokio::test]
async fn external_hit_marks_entry_external() {
    let (server, resolver) = mock_resolver().await;

    Mock::given(method("GET"))
        .and(path("/sign/hello"))
        .respond_with(ResponseTemplate::new(200).set_body_string(video_page("/video/mp4/hello.mp4")))
        .mount(&server)
        .await;

    let sequence = map_text_to_signs("hello", &resolver).await;

    assert_eq!(sequence.len(), 1);
    assert_eq!(sequence[0].source, SignSource::External);
    assert_eq!(
        sequence[0].image_url,
        format!("{}/video/mp4/hello.mp4", server.uri())
    );
}

#[tokio::test]
async fn lexicon_phrase_falls_back_to_placeholder_url() {
    let (_server, resolver) = mock_resolver().await;

    let sequence = map_text_to_signs("good morning", &resolver).await;

    assert_eq!(sequence.len(), 1);
    assert_eq!(sequence[0].source, SignSource::Lexicon);
    assert_eq!(
        sequence[0].image_url,
        Lexicon::global().get("good morning").unwrap()
    );
}

#[test]
fn lexicon_orders_phrases_longest_first() {
    let phrases = Lexicon::global().phrases_by_descending_word_count();

    assert!(!phrases.is_empty());
    for pair in phrases.windows(2) {
        assert!(pair[0].words.len() >= pair[1].words.len());
    }
    // The greedy property depends on multi-word keys preceding their prefixes.
    let thank_you_very_much = phrases
        .iter()
        .position(|p| p.key == "thank you very much")
        .unwrap();
    let thank_you = phrases.iter().position(|p| p.key == "thank you").unwrap();
    assert!(thank_you_very_much < thank_you);
}
