//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener on an OS-assigned port and drive it with a
//! `tokio-tungstenite` client, so frames actually cross a socket.

#[cfg(feature = "websocket")]
mod websocket {
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use tabletop_transport::{CloseReason, Connection, Transport, WebSocketTransport};
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    /// Binds on port 0 and returns the transport plus its `ws://` base URL.
    async fn bind() -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("should have local addr");
        (transport, format!("ws://{addr}"))
    }

    /// Accepts one server-side connection while a client connects to `url`.
    async fn pair(
        mut transport: WebSocketTransport,
        url: &str,
    ) -> (tabletop_transport::WebSocketConnection, ClientWs) {
        let server = tokio::spawn(async move { transport.accept().await.expect("should accept") });
        let (client, _) = tokio_tungstenite::connect_async(url)
            .await
            .expect("client should connect");
        let conn = server.await.expect("accept task should complete");
        (conn, client)
    }

    #[tokio::test]
    async fn test_websocket_send_and_recv_both_directions() {
        let (transport, url) = bind().await;
        let (conn, mut client) = pair(transport, &url).await;
        assert!(conn.id().into_inner() > 0);

        conn.send(br#"{"type":"sync"}"#).await.expect("send should succeed");
        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_text(), "JSON should go out as a text frame");
        assert_eq!(msg.into_data().as_ref(), br#"{"type":"sync"}"#);

        client
            .send(Message::Text(r#"{"type":"update"}"#.into()))
            .await
            .unwrap();
        let received = conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, br#"{"type":"update"}"#);
    }

    #[tokio::test]
    async fn test_websocket_non_utf8_goes_out_as_binary() {
        let (transport, url) = bind().await;
        let (conn, mut client) = pair(transport, &url).await;

        conn.send(&[0xff, 0x00, 0xfe]).await.unwrap();
        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_binary());
        assert_eq!(msg.into_data().as_ref(), &[0xffu8, 0x00, 0xfe][..]);
    }

    #[tokio::test]
    async fn test_websocket_query_string_is_captured() {
        let (transport, url) = bind().await;
        let (conn, _client) = pair(transport, &format!("{url}/?lobby=L&player=P1")).await;
        assert_eq!(conn.query(), Some("lobby=L&player=P1"));
    }

    #[tokio::test]
    async fn test_websocket_no_query_string_is_none() {
        let (transport, url) = bind().await;
        let (conn, _client) = pair(transport, &url).await;
        assert_eq!(conn.query(), None);
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (transport, url) = bind().await;
        let (conn, mut client) = pair(transport, &url).await;

        client.send(Message::Close(None)).await.unwrap();
        let result = conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_websocket_close_sends_policy_code() {
        let (transport, url) = bind().await;
        let (conn, mut client) = pair(transport, &url).await;

        conn.close(CloseReason::PolicyViolation("rate limit exceeded".into()))
            .await
            .expect("close should succeed");

        match client.next().await {
            Some(Ok(Message::Close(Some(frame)))) => {
                assert_eq!(frame.code, CloseCode::Policy);
                assert_eq!(frame.reason.as_str(), "rate limit exceeded");
            }
            other => panic!("expected close frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_websocket_send_not_blocked_by_pending_recv() {
        let (transport, url) = bind().await;
        let (conn, mut client) = pair(transport, &url).await;
        let conn = std::sync::Arc::new(conn);

        // A reader parked in recv() must not hold the write half.
        let reader = {
            let conn = std::sync::Arc::clone(&conn);
            tokio::spawn(async move { conn.recv().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        tokio::time::timeout(Duration::from_secs(1), conn.send(b"ping"))
            .await
            .expect("send should not wait for recv")
            .unwrap();
        let msg = client.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"ping");

        client.send(Message::Text("pong".into())).await.unwrap();
        let got = reader.await.unwrap().unwrap();
        assert_eq!(got.as_deref(), Some(&b"pong"[..]));
    }
}
