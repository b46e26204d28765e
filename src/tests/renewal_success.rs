use reqwest::StatusCode;

use crate::Error;
use crate::request::RequestDescriptor;
use crate::tests::test_support::{
    ScriptedTransport, scripted_client, wait_for_queue, with_captured_logs,
};

#[tokio::test]
async fn concurrent_401s_share_one_renewal_and_all_replay() {
    let client = scripted_client(ScriptedTransport::new().gated());

    let mut handles = Vec::new();
    for i in 0..5 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client
                .request(RequestDescriptor::get(format!("/ticket/{i}")))
                .await
        }));
    }

    wait_for_queue(&client, 4).await;
    assert!(client.coordinator().is_refreshing());
    assert_eq!(client.transport().renewal_calls(), 1);

    client.transport().release_renewal();
    for (i, handle) in handles.into_iter().enumerate() {
        let resp = handle
            .await
            .expect("task panicked")
            .expect("request should succeed after renewal");
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.text(), format!("/ticket/{i}"));
    }

    assert_eq!(client.transport().renewal_calls(), 1);
    for i in 0..5 {
        assert_eq!(
            client.transport().sends(&format!("/ticket/{i}")),
            2,
            "each request goes out once and is replayed once"
        );
    }
    assert!(!client.coordinator().is_refreshing());
    assert_eq!(client.coordinator().pending_len(), 0);
}

#[tokio::test]
async fn replay_that_gets_401_again_is_final() {
    let client = scripted_client(ScriptedTransport::new().unauthorized_forever("/user/me"));

    let err = client
        .request(RequestDescriptor::get("/user/me"))
        .await
        .expect_err("second 401 must surface");

    assert!(err.is_auth_expiry(), "unexpected error: {:?}", err);
    assert_eq!(client.transport().renewal_calls(), 1);
    assert_eq!(client.transport().sends("/user/me"), 2);
    assert!(!client.coordinator().is_refreshing());
}

#[tokio::test]
async fn already_retried_descriptor_never_starts_renewal() {
    let client = scripted_client(ScriptedTransport::new());
    let mut desc = RequestDescriptor::get("/ticket");
    desc.mark_retried();

    let err = client.request(desc).await.expect_err("401 passes through");

    assert!(matches!(err, Error::Http(StatusCode::UNAUTHORIZED, _)));
    assert_eq!(client.transport().renewal_calls(), 0);
}

#[tokio::test]
async fn later_expiry_starts_a_fresh_cycle() {
    let client = scripted_client(ScriptedTransport::new());

    client
        .request(RequestDescriptor::get("/ticket"))
        .await
        .expect("first cycle renews");
    assert_eq!(client.transport().renewal_calls(), 1);

    client
        .request(RequestDescriptor::get("/ticket"))
        .await
        .expect("valid session needs no renewal");
    assert_eq!(client.transport().renewal_calls(), 1);

    client.transport().expire_session();
    client
        .request(RequestDescriptor::get("/ticket"))
        .await
        .expect("second cycle renews");
    assert_eq!(client.transport().renewal_calls(), 2);
    assert_eq!(client.coordinator().pending_len(), 0);
    assert!(!client.coordinator().is_refreshing());
}

#[tokio::test]
async fn first_401_is_logged_as_warning() {
    let client = scripted_client(ScriptedTransport::new());

    let (logs, res) =
        with_captured_logs(client.request(RequestDescriptor::get("/registrant"))).await;

    res.expect("renewal should succeed");
    assert!(
        logs.iter()
            .any(|line| line.contains("WARN") && line.contains("401")),
        "expected warning log mentioning 401, got: {:?}",
        logs
    );
    assert!(
        logs.iter().any(|line| line.contains("renewal.success")),
        "expected renewal.success event, got: {:?}",
        logs
    );
}
