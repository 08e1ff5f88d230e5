use axum::http::header;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn cpwatch_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_cpwatch"))
}

fn setup_test_env(api_url: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[api]
url = "{}"
key_env = "CPWATCH_TEST_KEY"
timeout_secs = 5

[archive]
root = "{}/traffic_images"
"#,
        api_url,
        root.display()
    );

    let config_path = config_dir.join("cpwatch.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_cpwatch(
    config_path: &Path,
    args: &[&str],
    api_key: Option<&str>,
) -> (String, String, Option<i32>) {
    let binary = cpwatch_binary();
    let mut cmd = Command::new(&binary);
    cmd.arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("CPWATCH_TEST_KEY")
        .env("RUST_LOG", "warn");
    if let Some(key) = api_key {
        cmd.env("CPWATCH_TEST_KEY", key);
    }
    let output = cmd
        .output()
        .unwrap_or_else(|e| panic!("Failed to run cpwatch binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.code())
}

#[test]
fn test_capture_without_key_exits_with_config_error() {
    let (tmp, config_path) = setup_test_env("http://127.0.0.1:1/feed");

    let (stdout, stderr, code) = run_cpwatch(&config_path, &["capture"], None);
    assert_eq!(code, Some(2), "stdout={}, stderr={}", stdout, stderr);
    assert!(stderr.contains("CPWATCH_TEST_KEY environment variable not set"));
    assert!(!tmp.path().join("traffic_images").exists());
}

#[test]
fn test_capture_unreachable_api_exits_with_no_data() {
    let (tmp, config_path) = setup_test_env("http://127.0.0.1:1/feed");

    let (stdout, stderr, code) = run_cpwatch(&config_path, &["capture"], Some("k"));
    assert_eq!(code, Some(3), "stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("No camera data received from API"));
    assert!(!tmp.path().join("traffic_images").join("summary.json").exists());
}

#[test]
fn test_invalid_config_exits_with_config_error() {
    let (tmp, _) = setup_test_env("http://127.0.0.1:1/feed");
    let bad = tmp.path().join("bad.toml");
    fs::write(&bad, "[api]\ntimeout_secs = 0\n").unwrap();

    let (_, stderr, code) = run_cpwatch(&bad, &["summary"], None);
    assert_eq!(code, Some(2));
    assert!(stderr.contains("timeout_secs"));
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, code) = run_cpwatch(&tmp.path().join("nope.toml"), &["summary"], None);
    assert_eq!(code, Some(2));
    assert!(stderr.contains("Failed to read config file"));
}

#[test]
fn test_summary_command_rescans_archive() {
    let (tmp, config_path) = setup_test_env("http://127.0.0.1:1/feed");
    let day = tmp.path().join("traffic_images").join("2026-10-18");
    fs::create_dir_all(&day).unwrap();
    fs::write(day.join("metadata_2026-10-18_05-00-03.json"), "{}").unwrap();
    fs::write(day.join("camera_4713_2026-10-18_05-00-03.jpg"), b"jpeg").unwrap();
    fs::write(day.join("camera_2701_2026-10-18_05-00-03.jpg"), b"jpeg").unwrap();

    let (stdout, stderr, code) = run_cpwatch(&config_path, &["summary"], None);
    assert_eq!(code, Some(0), "stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Days monitored:   1"));
    assert!(stdout.contains("Total captures:   1"));
    assert!(stdout.contains("Total images:     2"));

    let readme = fs::read_to_string(tmp.path().join("traffic_images").join("README.md")).unwrap();
    assert!(readme.contains("**2026-10-18**: 1 capture(s), 2 image(s)"));
}

#[test]
fn test_archive_flag_overrides_config() {
    let (tmp, config_path) = setup_test_env("http://127.0.0.1:1/feed");
    let other = tmp.path().join("elsewhere");
    fs::create_dir_all(&other).unwrap();

    let (_, _, code) = run_cpwatch(
        &config_path,
        &["--archive", other.to_str().unwrap(), "summary"],
        None,
    );
    assert_eq!(code, Some(0));
    assert!(other.join("summary.json").exists());
    assert!(!tmp.path().join("traffic_images").exists());
}

#[test]
fn test_summary_on_missing_archive_is_an_error() {
    let (tmp, config_path) = setup_test_env("http://127.0.0.1:1/feed");
    let typo = tmp.path().join("trafic_images");

    let (stdout, stderr, code) = run_cpwatch(
        &config_path,
        &["--archive", typo.to_str().unwrap(), "summary"],
        None,
    );
    assert_eq!(code, Some(1), "stdout={}, stderr={}", stdout, stderr);
    assert!(stderr.contains("archive root does not exist"));
    assert!(!typo.exists());
}

#[test]
fn test_cameras_without_key_exits_with_config_error() {
    let (_tmp, config_path) = setup_test_env("http://127.0.0.1:1/feed");
    let (_, stderr, code) = run_cpwatch(&config_path, &["cameras"], None);
    assert_eq!(code, Some(2));
    assert!(stderr.contains("CPWATCH_TEST_KEY"));
}

/// Feed with camera 4713 whose image link serves an HTML error page.
async fn spawn_expired_link_upstream() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let body = json!({
        "value": [{
            "CameraID": "4713",
            "Location": "Tuas Checkpoint",
            "Latitude": 1.35,
            "Longitude": 103.63,
            "ImageLink": format!("{}/img/expired", base),
        }]
    });
    let app = Router::new()
        .route("/feed", get(move || async move { Json(body) }))
        .route(
            "/img/expired",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "text/html")],
                    "<html>link expired</html>".repeat(200),
                )
            }),
        );
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    base
}

#[tokio::test]
async fn test_capture_with_no_images_warns_and_succeeds() {
    let base = spawn_expired_link_upstream().await;
    let (tmp, config_path) = setup_test_env(&format!("{}/feed", base));

    let (stdout, stderr, code) = tokio::task::spawn_blocking(move || {
        run_cpwatch(&config_path, &["capture"], Some("k"))
    })
    .await
    .unwrap();

    assert_eq!(code, Some(0), "stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Captured 0 camera(s), 1 failed"));
    assert!(stdout.contains("Likely causes"));
    assert!(tmp.path().join("traffic_images").join("summary.json").exists());
}
