//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener on an OS-assigned port and talk to it
//! with a `tokio-tungstenite` client.

#[cfg(feature = "websocket")]
mod websocket {
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use minehub_transport::{
        Connection, FrameReceiver, FrameSender, PendingConnection, Transport, WebSocketConnection,
        WebSocketTransport,
    };
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    /// Binds on port 0, connects one client, and returns both ends.
    async fn connected_pair() -> (WebSocketConnection, ClientWs) {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound address");

        let server = tokio::spawn(async move {
            let pending = transport.accept().await.expect("should accept");
            pending.upgrade().await.expect("should upgrade")
        });
        let (client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
        let conn = server.await.expect("task should complete");
        (conn, client)
    }

    #[tokio::test]
    async fn test_websocket_send_and_receive_through_split_halves() {
        let (conn, mut client) = connected_pair().await;
        assert!(conn.id().into_inner() > 0);
        let (mut tx, mut rx) = conn.into_split();

        // UTF-8 goes out as a text frame.
        tx.send(br#"{"hello":"client"}"#.to_vec()).await.unwrap();
        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_text());
        assert_eq!(msg.into_text().unwrap().as_str(), r#"{"hello":"client"}"#);

        client
            .send(Message::Text(r#"{"hello":"server"}"#.into()))
            .await
            .unwrap();
        let received = rx.recv().await.unwrap().expect("should have data");
        assert_eq!(received, br#"{"hello":"server"}"#);

        tx.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_non_utf8_goes_out_as_binary() {
        let (conn, mut client) = connected_pair().await;
        let (mut tx, _rx) = conn.into_split();

        tx.send(vec![0xff, 0x00, 0xfe]).await.unwrap();

        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_binary());
        assert_eq!(msg.into_data().as_ref(), &[0xff, 0x00, 0xfe]);
    }

    #[tokio::test]
    async fn test_websocket_write_while_read_pending() {
        let (conn, mut client) = connected_pair().await;
        let (mut tx, mut rx) = conn.into_split();

        // Park a read first; the write half must not be blocked by it.
        let reader = tokio::spawn(async move { rx.recv().await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        tokio::time::timeout(Duration::from_secs(1), tx.send(b"push".to_vec()))
            .await
            .expect("send should not wait on the reader")
            .unwrap();
        let msg = client.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"push");

        client.send(Message::Text("done".into())).await.unwrap();
        let got = reader.await.unwrap().unwrap();
        assert_eq!(got.as_deref(), Some(&b"done"[..]));
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (conn, mut client) = connected_pair().await;
        let (_tx, mut rx) = conn.into_split();

        client.send(Message::Close(None)).await.unwrap();

        let result = rx.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_websocket_connection_ids_are_unique() {
        let (a, _ca) = connected_pair().await;
        let (b, _cb) = connected_pair().await;
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn test_accept_returns_before_peer_sends_upgrade() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0").await.unwrap();
        let addr = transport.local_addr().unwrap();

        // A peer that connects and then says nothing.
        let _silent = tokio::net::TcpStream::connect(addr).await.unwrap();
        let pending = tokio::time::timeout(Duration::from_secs(1), transport.accept())
            .await
            .expect("accept should not wait for the upgrade")
            .unwrap();
        assert_eq!(pending.peer_addr().ip(), addr.ip());

        // The next client is still served while the first one stalls.
        let client = tokio::spawn(tokio_tungstenite::connect_async(format!("ws://{addr}")));
        let next = tokio::time::timeout(Duration::from_secs(1), transport.accept())
            .await
            .expect("second accept should not be blocked")
            .unwrap();
        let conn = next.upgrade().await.unwrap();
        client.await.unwrap().unwrap();

        let stalled = tokio::time::timeout(Duration::from_millis(100), pending.upgrade()).await;
        assert!(stalled.is_err(), "silent peer never finishes the upgrade");
        assert!(conn.id().into_inner() > 0);
    }
}
