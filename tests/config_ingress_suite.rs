use clap::Parser;
use code_splash::config::{Config, SurfaceMode};
use code_splash::ingress::{parse_request, trigger_queue, HttpIngress};
use code_splash::tuning::{EngineTuning, TuningError};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::{Duration, Instant};

#[test]
fn tuning_parses_overrides_and_keeps_defaults() {
    let text = r#"
        # slower runs
        max_run_secs = 12.5
        scroll_lines=40

        accelerate_stagger_secs = 0
        some_future_key = whatever
    "#;
    let tuning = EngineTuning::parse(text).expect("tuning parse should succeed");
    assert_eq!(tuning.max_run_secs, 12.5);
    assert_eq!(tuning.scroll_lines, 40);
    assert_eq!(tuning.accelerate_stagger_secs, 0.0);
    assert_eq!(tuning.popout_char_limit, EngineTuning::default().popout_char_limit);
}

#[test]
fn tuning_rejects_bad_lines() {
    let cases = [
        ("max_run_secs = -1", 1),
        ("scroll_lines = 0", 1),
        ("orbit_char_limit = lots", 1),
        ("popout_stagger_secs = inf", 1),
        ("# ok\nnot a pair", 2),
        ("scroll_lines=3\nscroll_lines=4", 2),
    ];
    for (text, expected_line) in cases {
        let err = EngineTuning::parse(text).expect_err("parse should fail");
        assert!(
            matches!(err, TuningError::Parse { line, .. } if line == expected_line),
            "{text:?} gave {err:?}"
        );
    }
}

#[test]
fn tuning_load_falls_back_to_defaults_and_reads_files() {
    assert_eq!(EngineTuning::load(None), Ok(EngineTuning::default()));

    let dir = std::env::temp_dir().join(format!("code_splash_tuning_{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    let missing = dir.join("missing.txt");
    assert_eq!(EngineTuning::load(Some(&missing)), Ok(EngineTuning::default()));

    let path = dir.join("tuning.txt");
    std::fs::write(&path, "orbit_char_limit=7\n").expect("write tuning file");
    let loaded = EngineTuning::load(Some(&path)).expect("load tuning file");
    assert_eq!(loaded.orbit_char_limit, 7);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn cli_defaults() {
    let cfg = Config::try_parse_from(["code_splash"]).expect("defaults parse");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.bind, "127.0.0.1");
    assert_eq!(cfg.surface, SurfaceMode::Terminal);
    assert!(cfg.sync_updates);
    assert!(!cfg.no_listen && !cfg.once);
    assert!((cfg.frame_interval_secs() - 1.0 / 60.0).abs() < 1e-6);
}

#[test]
fn cli_flags_override_defaults() {
    let cfg = Config::try_parse_from([
        "code_splash",
        "--surface",
        "headless",
        "--port",
        "9000",
        "--no-listen",
        "--style",
        "orbit",
        "--text",
        "fn main() {}",
        "--once",
        "--seed",
        "42",
        "--sync-updates",
        "false",
        "--fps",
        "1000",
    ])
    .expect("flags parse");
    assert_eq!(cfg.surface, SurfaceMode::Headless);
    assert_eq!(cfg.port, 9000);
    assert!(cfg.no_listen && cfg.once);
    assert_eq!(cfg.style.as_deref(), Some("orbit"));
    assert_eq!(cfg.text.as_deref(), Some("fn main() {}"));
    assert_eq!(cfg.seed, Some(42));
    assert!(!cfg.sync_updates);
    assert!((cfg.frame_interval_secs() - 1.0 / 240.0).abs() < 1e-6);

    assert!(Config::try_parse_from(["code_splash", "--surface", "window"]).is_err());
}

#[test]
fn effect_requests_yield_their_body() {
    let req =
        "POST /effect HTTP/1.1\r\nHost: localhost\r\nContent-Length: 14\r\n\r\nfn a() {}\r\nb();";
    assert_eq!(parse_request(req).as_deref(), Some("fn a() {}\nb();"));

    assert_eq!(parse_request("GET /effect HTTP/1.1\r\n\r\nbody"), None);
    assert_eq!(parse_request("POST /other HTTP/1.1\r\n\r\nbody"), None);
    assert_eq!(parse_request("POST /effect HTTP/1.1\r\nHost: x"), None);
}

#[test]
fn trigger_queue_crosses_threads_in_order() {
    let (tx, mut rx) = trigger_queue(8);
    let handle = std::thread::spawn(move || {
        for i in 0..5 {
            assert!(tx.send(format!("payload {i}")));
        }
    });
    handle.join().expect("producer thread");
    let got = rx.drain();
    assert_eq!(got.len(), 5);
    assert_eq!(got[0], "payload 0");
    assert_eq!(got[4], "payload 4");
    assert!(rx.try_recv().is_none());
}

#[test]
fn trigger_queue_drops_when_full() {
    let (tx, mut rx) = trigger_queue(2);
    assert!(tx.send("a".to_string()));
    assert!(tx.send("b".to_string()));
    assert!(!tx.send("c".to_string()));
    assert_eq!(rx.drain(), vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn http_ingress_queues_posted_text() {
    let (tx, mut rx) = trigger_queue(4);
    let ingress = HttpIngress::start("127.0.0.1", 0, tx).expect("bind loopback");
    let addr = ingress.local_addr();

    let body = "let x = 1;\nlet y = 2;";
    let mut stream = TcpStream::connect(addr).expect("connect");
    write!(
        stream,
        "POST /effect HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    )
    .expect("send request");
    let mut response = String::new();
    stream.read_to_string(&mut response).expect("read response");
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");

    let deadline = Instant::now() + Duration::from_secs(2);
    let received = loop {
        if let Some(text) = rx.try_recv() {
            break text;
        }
        assert!(Instant::now() < deadline, "payload never arrived");
        std::thread::sleep(Duration::from_millis(5));
    };
    assert_eq!(received, body);

    let mut stream = TcpStream::connect(addr).expect("connect");
    stream
        .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .expect("send request");
    let mut response = String::new();
    stream.read_to_string(&mut response).expect("read response");
    assert!(response.starts_with("HTTP/1.1 404"), "{response}");
}

fn post_effect(addr: std::net::SocketAddr, body: &str) -> String {
    let mut stream = TcpStream::connect(addr).expect("connect");
    write!(
        stream,
        "POST /effect HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    )
    .expect("send request");
    let mut response = String::new();
    stream.read_to_string(&mut response).expect("read response");
    response
}

#[test]
fn http_ingress_reports_a_full_queue() {
    let (tx, mut rx) = trigger_queue(1);
    assert!(tx.send("already queued".to_string()));
    let ingress = HttpIngress::start("127.0.0.1", 0, tx).expect("bind loopback");

    let response = post_effect(ingress.local_addr(), "dropped");
    assert!(response.starts_with("HTTP/1.1 503"), "{response}");
    assert_eq!(rx.drain(), vec!["already queued".to_string()]);
}

#[test]
fn silent_client_does_not_block_other_triggers() {
    let (tx, mut rx) = trigger_queue(4);
    let ingress = HttpIngress::start("127.0.0.1", 0, tx).expect("bind loopback");
    let addr = ingress.local_addr();

    let _idle = TcpStream::connect(addr).expect("connect idle client");
    std::thread::sleep(Duration::from_millis(50));

    let started = Instant::now();
    let response = post_effect(addr, "fn main() {}");
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(
        started.elapsed() < Duration::from_secs(1),
        "trigger waited {:?} behind an idle connection",
        started.elapsed()
    );

    let deadline = Instant::now() + Duration::from_secs(2);
    while rx.try_recv().is_none() {
        assert!(Instant::now() < deadline, "payload never arrived");
        std::thread::sleep(Duration::from_millis(5));
    }
}
