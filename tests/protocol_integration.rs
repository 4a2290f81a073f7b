//! Wire protocol integration tests.
//!
//! Talks to a running server with raw request frames.

mod common;

use common::{test_config, TestClient, TestServer};
use textchat::protocol::NOT_LOGGED_IN;
use textchat::{digest, DeliveryOutcome, InsertOutcome, RejectReason, Request, Response};

#[tokio::test]
async fn test_lookups_without_login() {
    let server = TestServer::new().await;
    let mut client = TestClient::connect(server.addr()).await.unwrap();

    let resp = client.request(&Request::CountUsers).await;
    assert_eq!(resp, Some(Response::Count { value: 2 }));

    let resp = client
        .request(&Request::GetNickname {
            login: "missing".to_string(),
        })
        .await;
    assert_eq!(resp, Some(Response::Nickname { name: None }));

    let resp = client.request(&Request::ListNicknames).await;
    assert_eq!(
        resp,
        Some(Response::Nicknames {
            names: vec!["Ger".to_string(), "Sve".to_string()]
        })
    );
}

#[tokio::test]
async fn test_mailbox_requests_need_login() {
    let server = TestServer::new().await;
    let mut client = TestClient::connect(server.addr()).await.unwrap();

    for request in [
        Request::LoadMessages,
        Request::RemoveAccount,
        Request::Send {
            addressee: "Sve".to_string(),
            text: "spoofed".to_string(),
        },
    ] {
        let resp = client.request(&request).await;
        assert_eq!(resp, Some(Response::error(NOT_LOGGED_IN)));
    }
    assert!(server.router().load_messages("S").await.is_empty());
}

#[tokio::test]
async fn test_reserved_nickname_rejected() {
    let server = TestServer::new().await;
    let mut client = TestClient::connect(server.addr()).await.unwrap();

    let resp = client
        .request(&Request::Register {
            name: "all".to_string(),
            login: "everyone".to_string(),
            digest: digest("pw"),
        })
        .await;

    assert_eq!(
        resp,
        Some(Response::Registration {
            outcome: InsertOutcome::Rejected(RejectReason::ReservedNickname)
        })
    );
}

#[tokio::test]
async fn test_send_to_unknown_nickname() {
    let server = TestServer::new().await;
    let mut client = TestClient::connect(server.addr()).await.unwrap();
    client
        .request(&Request::IsPasswordCorrect {
            login: "G".to_string(),
            digest: digest("123"),
        })
        .await;

    let resp = client
        .request(&Request::Send {
            addressee: "Nobody".to_string(),
            text: "lost".to_string(),
        })
        .await;

    assert_eq!(
        resp,
        Some(Response::Delivery {
            outcome: DeliveryOutcome::AddresseeUnknown
        })
    );
}

#[tokio::test]
async fn test_malformed_frame_keeps_connection() {
    let server = TestServer::new().await;
    let mut client = TestClient::connect(server.addr()).await.unwrap();

    client.send_raw(b"not json\n").await.unwrap();
    let resp = client.recv().await;
    assert!(matches!(resp, Some(Response::Error { .. })));

    let resp = client.request(&Request::CountUsers).await;
    assert_eq!(resp, Some(Response::Count { value: 2 }));
}

#[tokio::test]
async fn test_oversize_frame_closes_connection() {
    let mut config = test_config();
    config.server.max_frame_bytes = 256;
    let server = TestServer::with_config(config).await;
    let mut client = TestClient::connect(server.addr()).await.unwrap();

    let big = format!("{}\n", "x".repeat(1024));
    client.send_raw(big.as_bytes()).await.unwrap();

    assert_eq!(client.recv().await, None);
}

#[tokio::test]
async fn test_concurrent_broadcasts_arrive_in_full() {
    let server = TestServer::new().await;
    let mut tasks = Vec::new();

    for (login, password) in [("G", "123"), ("S", "qwe")] {
        let addr = server.addr();
        tasks.push(tokio::spawn(async move {
            let mut client = TestClient::connect(addr).await.unwrap();
            client
                .request(&Request::IsPasswordCorrect {
                    login: login.to_string(),
                    digest: digest(password),
                })
                .await;
            for i in 0..20 {
                client
                    .request(&Request::Send {
                        addressee: "all".to_string(),
                        text: format!("{login}-{i}"),
                    })
                    .await;
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let inbox = server.router().load_messages("G").await;
    assert_eq!(inbox.len(), 40);
    let from_sve: Vec<_> = inbox
        .iter()
        .filter(|m| m.sender() == "Sve")
        .map(|m| m.text().to_string())
        .collect();
    let expected: Vec<_> = (0..20).map(|i| format!("S-{i}")).collect();
    assert_eq!(from_sve, expected);
}

#[tokio::test]
async fn test_stop_refuses_new_connections() {
    let mut server = TestServer::new().await;
    let addr = server.addr();

    server.stop().await;

    assert!(TestClient::connect(addr).await.is_err());
}
