use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use reqwest::StatusCode;

use crate::Error;
use crate::request::RequestDescriptor;
use crate::tests::test_support::{
    ScriptedTransport, scripted_client, wait_for_queue, with_captured_logs,
};

#[tokio::test]
async fn failed_renewal_fails_every_queued_caller_and_redirects_once() {
    let redirects = Arc::new(AtomicUsize::new(0));
    let client = scripted_client(ScriptedTransport::new().gated().renewal_fails())
        .on_unauthenticated({
            let redirects = redirects.clone();
            move || {
                redirects.fetch_add(1, Ordering::SeqCst);
            }
        });

    let mut handles = Vec::new();
    for i in 0..4 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client
                .request(RequestDescriptor::get(format!("/ticket/{i}")))
                .await
        }));
    }

    wait_for_queue(&client, 3).await;
    client.transport().release_renewal();

    for handle in handles {
        let err = handle
            .await
            .expect("task panicked")
            .expect_err("renewal failure must reach every caller");
        match err {
            Error::SessionRenewal(inner) => {
                assert!(matches!(*inner, Error::Http(StatusCode::UNAUTHORIZED, _)));
            }
            other => panic!("expected Error::SessionRenewal, got {:?}", other),
        }
    }

    assert_eq!(redirects.load(Ordering::SeqCst), 1);
    assert_eq!(client.transport().renewal_calls(), 1);
    for i in 0..4 {
        assert_eq!(
            client.transport().sends(&format!("/ticket/{i}")),
            1,
            "nothing is replayed after a failed renewal"
        );
    }
    assert!(!client.coordinator().is_refreshing());
    assert_eq!(client.coordinator().pending_len(), 0);
}

#[tokio::test]
async fn every_caller_sees_the_same_renewal_error() {
    let client = scripted_client(ScriptedTransport::new().gated().renewal_fails());

    let first = tokio::spawn({
        let client = client.clone();
        async move { client.request(RequestDescriptor::get("/ticket")).await }
    });
    let second = tokio::spawn({
        let client = client.clone();
        async move { client.request(RequestDescriptor::get("/registrant")).await }
    });
    wait_for_queue(&client, 1).await;
    client.transport().release_renewal();

    let a = first.await.unwrap().expect_err("fails");
    let b = second.await.unwrap().expect_err("fails");
    match (a, b) {
        (Error::SessionRenewal(a), Error::SessionRenewal(b)) => assert!(Arc::ptr_eq(&a, &b)),
        other => panic!("unexpected errors: {:?}", other),
    }
}

#[tokio::test]
async fn renewal_failure_is_logged_as_error() {
    let client = scripted_client(ScriptedTransport::new().renewal_fails());

    let (logs, res) = with_captured_logs(client.request(RequestDescriptor::get("/ticket"))).await;

    assert!(matches!(res, Err(Error::SessionRenewal(_))));
    assert!(
        logs.iter()
            .any(|line| line.contains("ERROR") && line.contains("renewal.failure")),
        "expected renewal.failure error log, got: {:?}",
        logs
    );
}

#[tokio::test]
async fn dropped_leader_releases_queued_callers() {
    let client = scripted_client(ScriptedTransport::new().gated());

    let leader = tokio::spawn({
        let client = client.clone();
        async move { client.request(RequestDescriptor::get("/ticket")).await }
    });
    while !client.coordinator().is_refreshing() {
        tokio::task::yield_now().await;
    }
    let follower = tokio::spawn({
        let client = client.clone();
        async move { client.request(RequestDescriptor::get("/registrant")).await }
    });
    wait_for_queue(&client, 1).await;

    leader.abort();
    let res = follower.await.expect("task panicked");
    assert!(
        matches!(res, Err(Error::RenewalAbandoned)),
        "unexpected outcome: {:?}",
        res
    );
    assert!(!client.coordinator().is_refreshing());
    assert_eq!(client.coordinator().pending_len(), 0);
}

#[tokio::test]
async fn clones_share_the_coordinator_and_its_handler() {
    let redirects = Arc::new(AtomicUsize::new(0));
    let early = scripted_client(ScriptedTransport::new().gated().renewal_fails());
    let client = early.clone().on_unauthenticated({
        let redirects = redirects.clone();
        move || {
            redirects.fetch_add(1, Ordering::SeqCst);
        }
    });
    assert!(std::ptr::eq(early.coordinator(), client.coordinator()));

    let first = tokio::spawn({
        let early = early.clone();
        async move { early.request(RequestDescriptor::get("/ticket")).await }
    });
    let second = tokio::spawn({
        let client = client.clone();
        async move { client.request(RequestDescriptor::get("/registrant")).await }
    });
    wait_for_queue(&client, 1).await;
    client.transport().release_renewal();

    assert!(matches!(first.await.unwrap(), Err(Error::SessionRenewal(_))));
    assert!(matches!(second.await.unwrap(), Err(Error::SessionRenewal(_))));
    assert_eq!(client.transport().renewal_calls(), 1);
    assert_eq!(redirects.load(Ordering::SeqCst), 1);
}
