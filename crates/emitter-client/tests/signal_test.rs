//! Shutdown signals cancel a running session instead of killing the process.

#![cfg(unix)]

use std::{process::Stdio, time::Duration};

use emitter_core::HANDSHAKE;
use tokio::{net::UdpSocket, process::Command, time::timeout};

#[tokio::test]
async fn sigterm_cancels_collection() {
    // Never answers, so the client waits for datagrams until cancelled.
    let server = UdpSocket::bind("127.0.0.1:0").await.expect("bind server");
    let addr = server.local_addr().expect("server addr");

    let mut child = Command::new(env!("CARGO_BIN_EXE_emitter-client"))
        .args(["--address", &addr.to_string(), "--datagrams", "10"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn client");

    let mut buf = [0u8; 64];
    let (n, _) = timeout(Duration::from_secs(10), server.recv_from(&mut buf))
        .await
        .expect("introduction in time")
        .expect("introduction");
    assert_eq!(&buf[..n], HANDSHAKE);
    tokio::time::sleep(Duration::from_millis(200)).await;

    let pid = child.id().expect("client still running").to_string();
    let killed = std::process::Command::new("kill")
        .args(["-TERM", &pid])
        .status()
        .expect("run kill");
    assert!(killed.success());

    let output = timeout(Duration::from_secs(10), child.wait_with_output())
        .await
        .expect("client exits after SIGTERM")
        .expect("client output");

    // Exits through the normal error path: an empty batch has no SSH events.
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no SSH events"), "stderr: {stderr}");
}
