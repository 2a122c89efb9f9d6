//! The binary exits cleanly on SIGINT and stops accepting connections.

#![cfg(unix)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

#[test]
fn test_sigint_exits_zero_and_stops_listening() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("hello.txt"), "hi").unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_shelf"))
        .env("LISTEN", "127.0.0.1:0")
        .env("STATIC_ROOT", tmp.path())
        .env("RUST_LOG", "info")
        .env("NO_COLOR", "1")
        .env_remove("SHELF_CONFIG")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let mut stdout = BufReader::new(child.stdout.take().unwrap());
    let addr = read_listen_addr(&mut stdout);

    // Serving works before the signal
    let mut stream = TcpStream::connect(addr).unwrap();
    stream
        .write_all(b"GET /hello.txt HTTP/1.1\r\nConnection: close\r\n\r\n")
        .unwrap();
    let mut out = String::new();
    stream.read_to_string(&mut out).unwrap();
    assert!(out.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(out.ends_with("\r\n\r\nhi"));

    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let deadline = Instant::now() + Duration::from_secs(10);
    let exit = loop {
        if let Some(exit) = child.try_wait().unwrap() {
            break exit;
        }
        if Instant::now() > deadline {
            child.kill().ok();
            panic!("server did not exit after SIGINT");
        }
        std::thread::sleep(Duration::from_millis(20));
    };

    assert_eq!(exit.code(), Some(0));
    assert!(TcpStream::connect_timeout(&addr, Duration::from_secs(1)).is_err());
}

fn read_listen_addr(stdout: &mut impl BufRead) -> SocketAddr {
    let mut line = String::new();
    loop {
        line.clear();
        let n = stdout.read_line(&mut line).unwrap();
        assert!(n > 0, "server exited before listening");

        if let Some((_, rest)) = line.split_once("Listening on ") {
            let addr: String = rest
                .chars()
                .take_while(|c| !c.is_whitespace() && *c != '\u{1b}')
                .collect();
            return addr.parse().unwrap();
        }
    }
}
