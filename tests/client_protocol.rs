//! End-to-end exchange between the TCP client and a scripted server:
//! handshake, board setup with the sides flipped (we start as werewolves),
//! one turn, goodbye.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use nocturne::client::TcpClient;
use nocturne::players::SearchPlayer;

#[tokio::test(flavor = "multi_thread")]
async fn test_one_turn_against_a_scripted_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();

        // Handshake: the client introduces itself first.
        let mut tag = [0u8; 3];
        sock.read_exact(&mut tag).await.unwrap();
        assert_eq!(&tag, b"NME");
        let len = sock.read_u8().await.unwrap();
        let mut name = vec![0u8; usize::from(len)];
        sock.read_exact(&mut name).await.unwrap();
        assert_eq!(name, b"tester");

        // 3x3 board, humans in the middle, our home in the corner. The home
        // cell holds werewolves, so the client has to flip sides.
        sock.write_all(&[b'S', b'E', b'T', 3, 3]).await.unwrap();
        sock.write_all(&[b'H', b'U', b'M', 1, 1, 1]).await.unwrap();
        sock.write_all(&[b'H', b'M', b'E', 0, 0]).await.unwrap();
        #[rustfmt::skip]
        sock.write_all(&[
            b'M', b'A', b'P', 3,
            0, 0, 0, 0, 4, // home: 4 werewolves
            2, 2, 0, 4, 0, // opponent: 4 vampires
            1, 1, 2, 0, 0, // 2 humans
        ])
        .await
        .unwrap();

        // An empty diff starts our turn.
        sock.write_all(&[b'U', b'P', b'D', 0]).await.unwrap();

        // The client answers with its coup.
        sock.read_exact(&mut tag).await.unwrap();
        assert_eq!(&tag, b"MOV");
        let count = sock.read_u8().await.unwrap();
        let mut moves = Vec::new();
        for _ in 0..count {
            let mut mv = [0u8; 5];
            sock.read_exact(&mut mv).await.unwrap();
            moves.push(mv);
        }

        sock.write_all(b"BYE").await.unwrap();
        moves
    });

    let player = SearchPlayer::with_depth(2);
    let client = TcpClient::connect(&addr.to_string(), "tester", player).await.unwrap();
    client.run().await.unwrap();

    let moves = server.await.unwrap();
    assert!(!moves.is_empty());
    for [x1, y1, n, x2, y2] in moves {
        // All our units sit on the home cell, and every move stays on the
        // board with a sensible strength.
        assert_eq!((x1, y1), (0, 0));
        assert!(n >= 1 && n <= 4);
        assert!(x2 < 3 && y2 < 3);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejects_non_ascii_names() {
    assert!(TcpClient::connect("127.0.0.1:1", "héloïse", SearchPlayer::with_depth(1)).await.is_err());
}
