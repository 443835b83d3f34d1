use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::{Command, Output};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

const TOKEN: &str = "md+31zMRMVqPgR9b99kSCEWZdIIdFUREO38ok6oFX50=";

struct CapturedRequest {
    request_line: String,
    authorization: Option<String>,
    body: String,
}

fn spawn_single_response_server(response_body: &str) -> (String, mpsc::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
    let addr = listener.local_addr().expect("local addr");
    let response_body = response_body.to_string();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

        let mut request_line = String::new();
        reader
            .read_line(&mut request_line)
            .expect("read request line");

        let mut authorization = None;
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("read header line");
            if line == "\r\n" || line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.trim_end().split_once(':') {
                let name = name.trim().to_ascii_lowercase();
                if name == "content-length" {
                    content_length = value.trim().parse().expect("content length");
                } else if name == "authorization" {
                    authorization = Some(value.trim().to_string());
                }
            }
        }
        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).expect("read body");

        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            response_body.len(),
            response_body
        );
        stream
            .write_all(response.as_bytes())
            .expect("write response");
        let _ = tx.send(CapturedRequest {
            request_line: request_line.trim_end().to_string(),
            authorization,
            body: String::from_utf8(body).expect("utf8 body"),
        });
    });

    (format!("http://{addr}"), rx)
}

fn run_admin(home: &Path, args: &[&str], admin_base: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_talos"))
        .arg("admin")
        .args(args)
        .env("HOME", home)
        .env("TALOS_ADMIN_API_BASE", admin_base)
        .output()
        .expect("run talos")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn assert_ok(output: &Output) {
    assert!(
        output.status.success(),
        "stdout:\n{}\nstderr:\n{}",
        stdout(output),
        stderr(output)
    );
}

fn received(rx: &mpsc::Receiver<CapturedRequest>) -> CapturedRequest {
    rx.recv_timeout(Duration::from_secs(10))
        .expect("server received a request")
}

fn voter_card_body(private_key: &str) -> String {
    serde_json::json!({
        "private_key": private_key,
        "voter_card": {
            "validator": "ADMIN VALIDATOR",
            "address": "boa1xrval",
            "expires": "2021-11-03T02:08:14Z",
            "signature": "0xabcdef"
        }
    })
    .to_string()
}

#[test]
fn login_stores_session_and_authorizes_later_requests() {
    let temp = tempdir().expect("tempdir");

    let login_body = serde_json::json!({"status": 0, "data": TOKEN}).to_string();
    let (base, rx) = spawn_single_response_server(&login_body);
    let login = run_admin(temp.path(), &["login", "admin", "hunter2"], &base);
    assert_ok(&login);
    assert!(stdout(&login).contains("admin=logged_in"));
    let request = received(&rx);
    assert!(request.request_line.starts_with("POST /login "));
    let sent: serde_json::Value = serde_json::from_str(&request.body).expect("json body");
    assert_eq!(
        sent,
        serde_json::json!({"username": "admin", "password": "hunter2"})
    );

    let session_path = temp.path().join(".talos/session.json");
    let session: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&session_path).expect("session")).expect("json");
    assert_eq!(session["token"], TOKEN);
    assert_eq!(session["username"], "admin");

    let (base, rx) = spawn_single_response_server(&voter_card_body(
        "SBFLURYJRXVJDQRQSTSGDEKI6HDQE4R6QKYJXNULFXX4PEHVIJCAQ3IV",
    ));
    let validator = run_admin(temp.path(), &["validator"], &base);
    assert_ok(&validator);
    let out = stdout(&validator);
    assert!(out.contains("validator=ADMIN VALIDATOR"));
    assert!(out.contains("expires=2021-11-03T02:08:14+00:00"));
    let request = received(&rx);
    assert!(request.request_line.starts_with("POST /admin/validator "));
    assert_eq!(request.authorization.as_deref(), Some(TOKEN));

    let (base, rx) = spawn_single_response_server(&voter_card_body("encryption key TEST DATA"));
    let key = run_admin(temp.path(), &["encryption-key", "votera", "1200"], &base);
    assert_ok(&key);
    assert!(stdout(&key).contains("private_key=encryption key TEST DATA"));
    let request = received(&rx);
    assert!(request.request_line.starts_with("POST /admin/encryptionkey "));
    let sent: serde_json::Value = serde_json::from_str(&request.body).expect("json body");
    assert_eq!(sent, serde_json::json!({"app": "votera", "height": 1200}));

    let log = fs::read_to_string(temp.path().join(".talos/logs/talos.log")).expect("log");
    assert!(log.contains("\"event\":\"admin.login\""));
    assert!(!log.contains(TOKEN), "token leaked into log:\n{log}");

    let logout = run_admin(temp.path(), &["logout"], &base);
    assert_ok(&logout);
    assert!(stdout(&logout).contains("admin=logged_out"));
    assert!(!session_path.exists());
}

#[test]
fn login_reports_account_errors() {
    let temp = tempdir().expect("tempdir");
    for (status, message) in [
        (1, "We cannot find an account."),
        (2, "The password is incorrect."),
        (3, "Login Failed."),
    ] {
        let body = serde_json::json!({"status": status}).to_string();
        let (base, _rx) = spawn_single_response_server(&body);
        let output = run_admin(temp.path(), &["login", "admin", "wrong"], &base);
        assert!(!output.status.success());
        assert!(
            stderr(&output).contains(message),
            "stderr:\n{}",
            stderr(&output)
        );
    }
    assert!(!temp.path().join(".talos/session.json").exists());
}

#[test]
fn key_requests_require_login() {
    let temp = tempdir().expect("tempdir");
    let output = run_admin(temp.path(), &["validator"], "http://127.0.0.1:9");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("not logged in"));

    let output = run_admin(
        temp.path(),
        &["encryption-key", "votera", "tall"],
        "http://127.0.0.1:9",
    );
    assert!(stderr(&output).contains("height must be a non-negative integer"));

    let output = run_admin(temp.path(), &["logout"], "http://127.0.0.1:9");
    assert_ok(&output);
    assert!(stdout(&output).contains("admin=no_session"));
}
