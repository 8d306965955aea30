//! Cloud speech transcriber integration tests
//!
//! The recognize endpoint is stood in for by wiremock; no network or
//! credentials needed.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ridenote::application::ports::{SpeechTranscriber, TranscriptionError};
use ridenote::domain::audio::{AudioCodec, AudioData};
use ridenote::infrastructure::transcription::CloudSpeechTranscriber;

fn test_audio() -> AudioData {
    AudioData::new(vec![0x66, 0x4c, 0x61, 0x43, 0x00, 0x01, 0x02], AudioCodec::Flac)
}

async fn transcriber_for(server: &MockServer) -> CloudSpeechTranscriber {
    CloudSpeechTranscriber::with_endpoint(
        "test-token",
        format!("{}/v1/speech:recognize", server.uri()),
    )
}

#[tokio::test]
async fn sends_bearer_token_and_recognition_config() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/speech:recognize"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "config": {
                "encoding": "FLAC",
                "sampleRateHertz": 16000,
                "languageCode": "en-US"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"alternatives": [{"transcript": "hello"}]}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transcriber = transcriber_for(&server).await;
    let transcript = transcriber.transcribe(&test_audio(), "en-US").await.unwrap();

    assert_eq!(transcript.text(), "hello");
}

#[tokio::test]
async fn joins_result_fragments_with_single_spaces() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"alternatives": [
                    {"transcript": "check the"},
                    {"transcript": "czech the"}
                ]},
                {"alternatives": [{"transcript": " chain tension "}]},
                {"alternatives": [{"transcript": "before the pass"}]}
            ]
        })))
        .mount(&server)
        .await;

    let transcriber = transcriber_for(&server).await;
    let transcript = transcriber.transcribe(&test_audio(), "en-US").await.unwrap();

    assert_eq!(transcript.text(), "check the chain tension before the pass");
}

#[tokio::test]
async fn missing_results_is_a_blank_transcript_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let transcriber = transcriber_for(&server).await;
    let transcript = transcriber.transcribe(&test_audio(), "en-US").await.unwrap();

    assert!(transcript.is_blank());
}

#[tokio::test]
async fn unauthorized_is_an_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let transcriber = transcriber_for(&server).await;
    let result = transcriber.transcribe(&test_audio(), "en-US").await;

    assert!(matches!(result, Err(TranscriptionError::Auth)));
}

#[tokio::test]
async fn forbidden_is_an_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let transcriber = transcriber_for(&server).await;
    let result = transcriber.transcribe(&test_audio(), "en-US").await;

    assert!(matches!(result, Err(TranscriptionError::Auth)));
}

#[tokio::test]
async fn server_error_is_an_api_error_with_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&server)
        .await;

    let transcriber = transcriber_for(&server).await;
    let result = transcriber.transcribe(&test_audio(), "en-US").await;

    match result {
        Err(TranscriptionError::Api(message)) => {
            assert!(message.contains("500"));
            assert!(message.contains("backend exploded"));
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn api_errors_are_not_transient() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let transcriber = transcriber_for(&server).await;
    let err = transcriber
        .transcribe(&test_audio(), "en-US")
        .await
        .unwrap_err();

    assert!(!err.is_transient());
}

#[tokio::test]
async fn malformed_body_is_a_malformed_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let transcriber = transcriber_for(&server).await;
    let result = transcriber.transcribe(&test_audio(), "en-US").await;

    assert!(matches!(result, Err(TranscriptionError::Malformed(_))));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_network_error() {
    // Bind-then-drop leaves a port with nothing listening
    let server = MockServer::start().await;
    let endpoint = format!("{}/v1/speech:recognize", server.uri());
    drop(server);

    let transcriber = CloudSpeechTranscriber::with_endpoint("test-token", endpoint);
    let result = transcriber.transcribe(&test_audio(), "en-US").await;

    match result {
        Err(e) => assert!(e.is_transient(), "network errors should be transient: {:?}", e),
        Ok(_) => panic!("Expected a network error"),
    }
}
