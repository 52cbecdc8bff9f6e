use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

use oid_explorer::config::load_config;
use oid_explorer::{db, migrate};

fn oidx_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_oidx"))
}

/// (name, oid, parent oid)
const NODES: &[(&str, &str, Option<&str>)] = &[
    ("iso", "1", None),
    ("member-body", "1.2", Some("1")),
    ("org", "1.3", Some("1")),
    ("dod", "1.3.6", Some("1.3")),
    ("internet", "1.3.6.1", Some("1.3.6")),
    ("directory", "1.3.6.1.1", Some("1.3.6.1")),
    ("mgmt", "1.3.6.1.2", Some("1.3.6.1")),
    ("experimental", "1.3.6.1.3", Some("1.3.6.1")),
    ("private", "1.3.6.1.4", Some("1.3.6.1")),
    ("security", "1.3.6.1.10", Some("1.3.6.1")),
    ("mib-2", "1.3.6.1.2.1", Some("1.3.6.1.2")),
];

fn write_config(root: &Path, port: u16) -> PathBuf {
    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/oids.sqlite"

[server]
bind = "127.0.0.1:{}"

[search]
max_limit = 50
"#,
        root.display(),
        port
    );

    let config_path = config_dir.join("oidx.toml");
    fs::write(&config_path, config_content).unwrap();
    config_path
}

/// Creates the schema and loads a slice of the iso tree.
fn seed_database(config_path: &Path) {
    let cfg = load_config(config_path).unwrap();
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async {
        migrate::run_migrations(&cfg).await.unwrap();
        let pool = db::connect(&cfg).await.unwrap();

        for (name, oid, parent) in NODES {
            sqlx::query(
                "INSERT INTO oids (name, oid, parent_id) VALUES (?, ?, (SELECT id FROM oids WHERE oid = ?))",
            )
            .bind(*name)
            .bind(*oid)
            .bind(*parent)
            .execute(&pool)
            .await
            .unwrap();
        }

        sqlx::query("UPDATE oids SET object_type = 'OBJECT IDENTIFIER' WHERE oid = '1.3.6.1.2.1'")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO mibs (name) VALUES ('SNMPv2-SMI'), ('RFC1213-MIB')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            r#"
            INSERT INTO oid_descriptions (oid_id, mib_id, description)
            SELECT o.id, m.id, 'The MIB module for managing TCP/IP-based internets.'
            FROM oids o, mibs m
            WHERE o.oid = '1.3.6.1.2.1' AND m.name IN ('SNMPv2-SMI', 'RFC1213-MIB')
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        pool.close().await;
    });
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let config_path = write_config(tmp.path(), 9000);
    seed_database(&config_path);
    (tmp, config_path)
}

fn run_oidx(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = oidx_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run oidx binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn json_oids(stdout: &str) -> Vec<String> {
    let value: serde_json::Value = serde_json::from_str(stdout).unwrap();
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["oid"].as_str().unwrap().to_string())
        .collect()
}

// ============ CLI ============

#[test]
fn test_init_creates_database() {
    let tmp = TempDir::new().unwrap();
    let config_path = write_config(tmp.path(), 9000);

    let (stdout, stderr, success) = run_oidx(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/oids.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_oidx(&config_path, &["init"]);
    assert!(success, "second init failed: {}", stderr);

    let (stdout, _, success) = run_oidx(&config_path, &["get", "1.3.6.1", "--json"]);
    assert!(success, "data lost after re-running init");
    assert!(stdout.contains("internet"));
}

#[test]
fn test_get_record() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_oidx(&config_path, &["get", "1.3.6.1.2.1"]);
    assert!(success, "get failed: {}", stderr);
    assert!(stdout.contains("mib-2"));
    assert!(stdout.contains("mgmt (1.3.6.1.2)"));
    assert!(stdout.contains("Descriptions (2)"));
    assert!(stdout.contains("[RFC1213-MIB]"));
}

#[test]
fn test_get_record_json() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_oidx(&config_path, &["get", "1.3.6.1.2.1", "--json"]);
    assert!(success);
    let record: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(record["name"], "mib-2");
    assert_eq!(record["oid"], "1.3.6.1.2.1");
    assert_eq!(record["object_type"], "OBJECT IDENTIFIER");
    assert_eq!(record["parent"]["oid"], "1.3.6.1.2");
    // ordered by MIB name
    assert_eq!(record["descriptions"][0]["mib"], "RFC1213-MIB");
    assert_eq!(record["descriptions"][1]["mib"], "SNMPv2-SMI");
}

#[test]
fn test_get_missing_oid() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_oidx(&config_path, &["get", "9.9.9"]);
    assert!(!success);
    assert!(stderr.contains("not found"), "got: {}", stderr);
}

#[test]
fn test_get_empty_oid_rejected() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_oidx(&config_path, &["get", ""]);
    assert!(!success);
    assert!(stderr.contains("must not be empty"), "got: {}", stderr);
}

#[test]
fn test_relation_tree() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_oidx(&config_path, &["relation", "1.3.6.1"]);
    assert!(success, "relation failed: {}", stderr);
    let expected = "\
iso (1)
  org (1.3)
    dod (1.3.6)
      internet (1.3.6.1)
        directory (1.3.6.1.1)
        mgmt (1.3.6.1.2)
        experimental (1.3.6.1.3)
        private (1.3.6.1.4)
        security (1.3.6.1.10)
";
    assert_eq!(stdout, expected);
}

#[test]
fn test_relation_json_for_root() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_oidx(&config_path, &["relation", "1", "--json"]);
    assert!(success);
    let tree: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(tree["oid"]["oid"], "1");
    let children = tree["children"].as_array().unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0]["oid"]["oid"], "1.2");
    assert_eq!(children[1]["oid"]["oid"], "1.3");
    assert_eq!(children[1]["children"], serde_json::json!([]));
}

#[test]
fn test_parent_of_root_not_found() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_oidx(&config_path, &["parent", "1.3"]);
    assert!(success);
    assert!(stdout.contains("1  iso"));

    let (_, stderr, success) = run_oidx(&config_path, &["parent", "1"]);
    assert!(!success);
    assert!(stderr.contains("no parent"), "got: {}", stderr);
}

#[test]
fn test_children_ordering() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_oidx(&config_path, &["children", "1.3.6.1", "--json"]);
    assert!(success);
    assert_eq!(
        json_oids(&stdout),
        vec!["1.3.6.1.1", "1.3.6.1.2", "1.3.6.1.3", "1.3.6.1.4", "1.3.6.1.10"]
    );
}

#[test]
fn test_siblings() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_oidx(&config_path, &["siblings", "1.3.6.1.2", "--json"]);
    assert!(success);
    assert_eq!(
        json_oids(&stdout),
        vec!["1.3.6.1.1", "1.3.6.1.3", "1.3.6.1.4", "1.3.6.1.10"]
    );

    let (_, stderr, success) = run_oidx(&config_path, &["siblings", "1"]);
    assert!(!success);
    assert!(stderr.contains("no result"));
}

#[test]
fn test_search_by_oid_ties_broken_by_name() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) =
        run_oidx(&config_path, &["search", "6.1.2", "--type", "oid", "--json"]);
    assert!(success);
    assert_eq!(json_oids(&stdout), vec!["1.3.6.1.2", "1.3.6.1.2.1"]);

    let (stdout, _, success) = run_oidx(
        &config_path,
        &["search", "6.1.2", "--type", "oid", "--limit", "1", "--json"],
    );
    assert!(success);
    assert_eq!(json_oids(&stdout), vec!["1.3.6.1.2"]);
}

#[test]
fn test_search_without_keyword_lists_all() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_oidx(&config_path, &["search", "--json"]);
    assert!(success);
    let oids = json_oids(&stdout);
    assert_eq!(oids.len(), NODES.len());
    assert_eq!(oids[0], "1");
}

#[test]
fn test_search_invalid_input() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_oidx(&config_path, &["search", "mib", "--type", "label"]);
    assert!(!success);
    assert!(stderr.contains("invalid search type"));

    let (_, stderr, success) = run_oidx(&config_path, &["search", "mib", "--limit", "-1"]);
    assert!(!success);
    assert!(stderr.contains("must not be negative"));
}

#[test]
fn test_search_rejects_negative_limit_before_opening_database() {
    let tmp = TempDir::new().unwrap();
    let config_path = write_config(tmp.path(), 9000);

    let (_, stderr, success) = run_oidx(&config_path, &["search", "mib", "--limit", "-1"]);
    assert!(!success);
    assert!(stderr.contains("must not be negative"), "got: {}", stderr);
    assert!(!tmp.path().join("data").exists());
}

#[test]
fn test_env_overrides_database_path() {
    let (tmp, _) = setup_test_env();
    let seeded = tmp.path().join("data/oids.sqlite");

    let other = TempDir::new().unwrap();
    let config_path = write_config(other.path(), 9000);

    let output = Command::new(oidx_binary())
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(["get", "1.3.6.1", "--json"])
        .env("OIDX_DB_PATH", &seeded)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("internet"));
}

#[test]
fn test_lookups_deterministic() {
    let (_tmp, config_path) = setup_test_env();

    let (a, _, _) = run_oidx(&config_path, &["relation", "1.3.6.1.2.1", "--json"]);
    let (b, _, _) = run_oidx(&config_path, &["relation", "1.3.6.1.2.1", "--json"]);
    assert_eq!(a, b);
}

#[test]
fn test_lookup_without_database_fails() {
    let tmp = TempDir::new().unwrap();
    let config_path = write_config(tmp.path(), 9000);

    let (_, stderr, success) = run_oidx(&config_path, &["get", "1"]);
    assert!(!success);
    assert!(stderr.contains("failed to connect to database"), "got: {}", stderr);
}

// ============ HTTP API ============

/// Find an available port for the test server.
fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn setup_server_env(port: u16) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let config_path = write_config(tmp.path(), port);
    seed_database(&config_path);
    (tmp, config_path)
}

/// Start the server in the background, return the child process.
fn start_server(config_path: &Path) -> std::process::Child {
    Command::new(oidx_binary())
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .arg("serve")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap_or_else(|e| panic!("Failed to start server: {}", e))
}

/// Wait for the server to be ready by polling the health endpoint.
fn wait_for_server(port: u16) {
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        std::thread::sleep(std::time::Duration::from_millis(100));
        if let Ok(resp) = reqwest::blocking::get(&url) {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}

struct TestServer {
    child: std::process::Child,
    port: u16,
    _tmp: TempDir,
}

impl TestServer {
    fn start() -> Self {
        let port = find_free_port();
        let (tmp, config_path) = setup_server_env(port);
        let child = start_server(&config_path);
        wait_for_server(port);
        Self {
            child,
            port,
            _tmp: tmp,
        }
    }

    fn get(&self, path: &str) -> (u16, serde_json::Value) {
        let url = format!("http://127.0.0.1:{}{}", self.port, path);
        let resp = reqwest::blocking::get(&url).unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().unwrap())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.child.kill().ok();
        self.child.wait().ok();
    }
}

#[test]
fn test_server_health() {
    let server = TestServer::start();
    let (status, body) = server.get("/health");
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[test]
fn test_server_refuses_to_start_without_database() {
    let port = find_free_port();
    let tmp = TempDir::new().unwrap();
    let config_path = write_config(tmp.path(), port);

    let (_, stderr, success) = run_oidx(&config_path, &["serve"]);
    assert!(!success);
    assert!(stderr.contains("connecting to the database failed"), "got: {}", stderr);
}

#[test]
fn test_server_get_oid() {
    let server = TestServer::start();

    let (status, body) = server.get("/oids/1.3.6.1.2.1");
    assert_eq!(status, 200);
    assert_eq!(body["name"], "mib-2");
    assert_eq!(body["parent"]["name"], "mgmt");
    assert_eq!(body["descriptions"].as_array().unwrap().len(), 2);

    let (status, body) = server.get("/oids/1");
    assert_eq!(status, 200);
    assert!(body["parent"].is_null());
    assert!(body["object_type"].is_null());

    let (status, body) = server.get("/oids/9.9.9");
    assert_eq!(status, 404);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[test]
fn test_server_relation() {
    let server = TestServer::start();

    let (status, body) = server.get("/oids/1.3.6.1.2/relation");
    assert_eq!(status, 200);

    let mut spine = Vec::new();
    let mut node = &body;
    loop {
        spine.push(node["oid"]["oid"].as_str().unwrap().to_string());
        let children = node["children"].as_array().unwrap();
        if children.len() != 1 {
            break;
        }
        node = &children[0];
    }
    // mgmt has exactly one child, so the spine continues to mib-2
    assert_eq!(
        spine,
        vec!["1", "1.3", "1.3.6", "1.3.6.1", "1.3.6.1.2", "1.3.6.1.2.1"]
    );
}

#[test]
fn test_server_parent_siblings_children() {
    let server = TestServer::start();

    let (status, body) = server.get("/oids/1.3.6.1/parent");
    assert_eq!(status, 200);
    assert_eq!(body, serde_json::json!({"name": "dod", "oid": "1.3.6"}));

    let (status, body) = server.get("/oids/1/parent");
    assert_eq!(status, 404);
    assert!(body["error"].is_string());

    let (status, body) = server.get("/oids/1.3/siblings");
    assert_eq!(status, 200);
    assert_eq!(body, serde_json::json!([{"name": "member-body", "oid": "1.2"}]));

    let (status, body) = server.get("/oids/1.3.6.1.4/children");
    assert_eq!(status, 404);
    assert_eq!(body["error"], "no result");

    let (status, body) = server.get("/oids/1/children");
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[test]
fn test_server_search() {
    let server = TestServer::start();

    let (status, body) = server.get("/oids?keyword=MIB&type=name");
    assert_eq!(status, 200);
    assert_eq!(body, serde_json::json!([{"name": "mib-2", "oid": "1.3.6.1.2.1"}]));

    let (status, body) = server.get("/oids?keyword=6.1.2&limit=1");
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["oid"], "1.3.6.1.2");

    let (status, body) = server.get("/oids");
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), NODES.len());

    let (status, body) = server.get("/oids?keyword=nothing-matches");
    assert_eq!(status, 404);
    assert_eq!(body["error"], "no result");
}

#[test]
fn test_server_search_rejects_malformed_input() {
    let server = TestServer::start();

    let (status, body) = server.get("/oids?keyword=mib&type=label");
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("invalid search type"));

    let (status, body) = server.get("/oids?keyword=mib&limit=ten");
    assert_eq!(status, 400);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("limit is not an integer"));

    let (status, _) = server.get("/oids?keyword=mib&limit=-5");
    assert_eq!(status, 400);
}

#[test]
fn test_server_undecodable_requests_get_json_error() {
    let server = TestServer::start();

    for path in ["/oids?keyword=a&keyword=b", "/oids/%FF", "/oids/%FF/relation"] {
        let url = format!("http://127.0.0.1:{}{}", server.port, path);
        let resp = reqwest::blocking::get(&url).unwrap();
        assert_eq!(resp.status().as_u16(), 400, "{}", path);
        assert_eq!(
            resp.headers()["content-type"],
            "application/json",
            "{}",
            path
        );
        let body: serde_json::Value = resp.json().unwrap();
        assert!(body["error"].is_string(), "{}", path);
    }
}
