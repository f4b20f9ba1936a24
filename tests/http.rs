use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

const FIXTURE: &str = "\
dyear,group,var,daily_fare,daily_miles
2016-06-01,Cash,paytype,5,50
2020-01-01,Cash,paytype,10,100
2020-01-02,Credit,paytype,20,200
2020-01-03,Credit,paytype,30,300
2020-01-01,CMT,vendorid,15,150
2020-01-01,Curb,vendorid,25,250
2020-01-01,In-City,ratecode,11,110
2020-01-01,Suburb,ratecode,12,120
2020-01-01,JFK,ratecode,13,130
";

#[derive(Debug, Deserialize)]
struct ViewState {
    series: String,
    grouping: String,
    info_panel_visible: bool,
}

#[derive(Debug, Deserialize)]
struct ViewResponse {
    state: ViewState,
    chart_visible: bool,
    toggle_label: String,
    subhead: String,
    figure: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    rows: usize,
    charts: usize,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> std::path::PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("taxi_dashboard_http_{}_{}.csv", std::process::id(), nanos));
    path
}

fn server_command(port: u16, data_path: &std::path::Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_taxi_dashboard"));
    command
        .env("PORT", port.to_string())
        .env("TLC_DATA_PATH", data_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    command
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/healthz")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    std::fs::write(&data_path, FIXTURE).expect("write fixture");
    let child = server_command(port, &data_path)
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn post_view(client: &Client, base_url: &str, body: Value) -> ViewResponse {
    let response = client
        .post(format!("{base_url}/api/view"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    response.json().await.unwrap()
}

#[tokio::test]
async fn http_health_reports_loaded_rows() {
    let server = shared_server().await;
    let health: HealthResponse = Client::new()
        .get(format!("{}/healthz", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(health.status, "ok");
    assert_eq!(health.rows, 9);
    assert_eq!(health.charts, 6);
}

#[tokio::test]
async fn http_initial_view_shows_revenue_by_payment_type() {
    let server = shared_server().await;
    let view: ViewResponse = Client::new()
        .get(format!("{}/api/view", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(view.state.series, "revenue");
    assert_eq!(view.state.grouping, "paytype");
    assert!(!view.state.info_panel_visible);
    assert!(view.chart_visible);
    assert_eq!(view.toggle_label, "About");
    assert_eq!(view.subhead, "Manhattan Yellow Cabs,<br>2011–2024");

    let figure = view.figure.expect("figure");
    let traces = figure["data"].as_array().unwrap();
    assert_eq!(traces.len(), 2);
    assert_eq!(traces[0]["name"], "Cash");
    assert_eq!(traces[1]["name"], "Credit");
    assert_eq!(traces[1]["y"], json!([20.0, 30.0]));
}

#[tokio::test]
async fn http_selection_swaps_chart() {
    let server = shared_server().await;
    let client = Client::new();

    let view = post_view(
        &client,
        &server.base_url,
        json!({
            "state": { "series": "revenue", "grouping": "paytype", "info_panel_visible": false },
            "event": { "type": "select_grouping", "value": "ratecode" }
        }),
    )
    .await;
    assert_eq!(view.state.grouping, "ratecode");
    let figure = view.figure.expect("figure");
    assert_eq!(figure["data"].as_array().unwrap().len(), 3);
    assert_eq!(figure["layout"]["grid"]["columns"], 2);

    let view = post_view(
        &client,
        &server.base_url,
        json!({
            "state": { "series": "revenue", "grouping": "ratecode", "info_panel_visible": false },
            "event": { "type": "select_series", "value": "mileage" }
        }),
    )
    .await;
    assert_eq!(view.state.series, "mileage");
    assert_eq!(view.subhead, "Manhattan Yellow Cabs,<br>2017–2024");
    let figure = view.figure.expect("figure");
    assert_eq!(figure["data"][2]["y"], json!([130.0]));
}

#[tokio::test]
async fn http_toggle_hides_and_restores_chart() {
    let server = shared_server().await;
    let client = Client::new();

    let opened = post_view(
        &client,
        &server.base_url,
        json!({ "event": { "type": "toggle_info_panel" } }),
    )
    .await;
    assert!(opened.state.info_panel_visible);
    assert!(!opened.chart_visible);
    assert!(opened.figure.is_none());
    assert_eq!(opened.toggle_label, "Back");

    let closed = post_view(
        &client,
        &server.base_url,
        json!({
            "state": { "series": "revenue", "grouping": "paytype", "info_panel_visible": true },
            "event": { "type": "toggle_info_panel" }
        }),
    )
    .await;
    assert!(!closed.state.info_panel_visible);
    assert!(closed.chart_visible);
    assert!(closed.figure.is_some());
    assert_eq!(closed.toggle_label, "About");
}

#[tokio::test]
async fn http_mileage_spec_is_windowed_and_annotated() {
    let server = shared_server().await;
    let spec: Value = Client::new()
        .get(format!("{}/api/charts/mileage/paytype/spec", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(spec["y_axis_label"], "Miles Traveled");
    assert_eq!(spec["markers"].as_array().unwrap().len(), 1);
    assert_eq!(spec["markers"][0]["date"], "2020-03-13");
    let cash = &spec["panels"][0];
    assert_eq!(cash["group"], "Cash");
    assert_eq!(cash["points"].as_array().unwrap().len(), 1);
    assert_eq!(cash["points"][0]["date"], "2020-01-01");
}

#[tokio::test]
async fn http_rejects_unknown_selector() {
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/api/charts/revenue/borough", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    let response = client
        .post(format!("{}/api/view", server.base_url))
        .json(&json!({ "event": { "type": "select_series", "value": "tips" } }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn http_index_renders_requested_selection() {
    let server = shared_server().await;
    let html = Client::new()
        .get(format!(
            "{}/?series=mileage&grouping=vendorid&about=true",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(html.contains("Daily Revenue &amp; Mileage"));
    assert!(html.contains(r#"value="mileage" checked"#));
    assert!(html.contains(r#"<option value="vendorid" selected>"#));
    assert!(html.contains(r#"<div id="about-text" style="display: block">"#));
    assert!(html.contains("Daily Yellow Cab Mileage, 2017-2024"));
}

#[tokio::test]
async fn http_missing_data_file_prevents_startup() {
    let port = pick_free_port();
    let missing = unique_data_path();
    let mut child = server_command(port, &missing)
        .spawn()
        .expect("failed to spawn server");

    let deadline = Instant::now() + Duration::from_secs(3);
    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break status;
        }
        if Instant::now() > deadline {
            let _ = child.kill();
            panic!("server started without a data file");
        }
        sleep(Duration::from_millis(50)).await;
    };
    assert!(!status.success());
}
