use super::*;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use shared::{
    domain::{Mood, ObjectId, PackageId},
    error::ErrorCode,
    protocol::{CallArg, CallTarget, ExecuteRequest, VoteRequest},
};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{VoteController, VoteError, WalletSession};

#[derive(Clone, Default)]
struct BridgeState {
    received: Arc<Mutex<Vec<ExecuteRequest>>>,
}

async fn handle_execute(
    State(state): State<BridgeState>,
    Json(payload): Json<ExecuteRequest>,
) -> Json<ExecuteResponse> {
    state.received.lock().await.push(payload);
    Json(ExecuteResponse {
        digest: "9Lx5digest".to_string(),
    })
}

async fn handle_execute_without_gas() -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::PAYMENT_REQUIRED,
        Json(ApiError::new(
            ErrorCode::InsufficientGas,
            "no gas coins owned by sender",
        )),
    )
}

async fn handle_execute_crash() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "bridge crashed")
}

async fn spawn_bridge(router: Router) -> Url {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Url::parse(&format!("http://{addr}/bridge")).expect("bridge url")
}

fn sample_call() -> MoveCall {
    let board: ObjectId = "0xb0a2d".parse().expect("board id");
    let package: PackageId = "0xabc".parse().expect("package id");
    VoteRequest::new(&board, Mood::Good).to_move_call(&CallTarget::submit_mood(package))
}

fn bridge_executor(url: &Url) -> WalletBridgeExecutor {
    WalletBridgeExecutor::new(url, Network::Localnet, Duration::from_secs(5)).expect("executor")
}

#[test]
fn execute_endpoint_keeps_bridge_path_prefix() {
    let with_path = Url::parse("http://127.0.0.1:7000/wallet").expect("url");
    assert_eq!(
        execute_endpoint(&with_path).expect("endpoint").as_str(),
        "http://127.0.0.1:7000/wallet/execute"
    );

    let bare = Url::parse("http://127.0.0.1:7000").expect("url");
    assert_eq!(
        execute_endpoint(&bare).expect("endpoint").as_str(),
        "http://127.0.0.1:7000/execute"
    );
}

#[test]
fn rejects_non_base_bridge_url() {
    let url = Url::parse("mailto:wallet@example.com").expect("url");
    assert!(execute_endpoint(&url).is_err());
}

#[tokio::test]
async fn bridge_receives_sender_network_and_call() {
    let state = BridgeState::default();
    let router = Router::new()
        .route("/bridge/execute", post(handle_execute))
        .with_state(state.clone());
    let url = spawn_bridge(router).await;
    let executor = bridge_executor(&url);

    let outcome = executor
        .execute(&Identity::new("0xa11ce"), sample_call())
        .await
        .expect("execute");

    assert_eq!(outcome.digest, "9Lx5digest");
    let received = state.received.lock().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].sender, Identity::new("0xa11ce"));
    assert_eq!(received[0].network, Network::Localnet);
    assert_eq!(received[0].call.arguments[1], CallArg::Pure(vec![0]));
}

#[tokio::test]
async fn structured_bridge_error_is_surfaced_with_its_code() {
    let router = Router::new().route("/bridge/execute", post(handle_execute_without_gas));
    let url = spawn_bridge(router).await;
    let executor = bridge_executor(&url);

    let err = executor
        .execute(&Identity::new("0xa11ce"), sample_call())
        .await
        .expect_err("must fail");

    let exception = err.downcast_ref::<ApiException>().expect("api exception");
    assert_eq!(exception.code, ErrorCode::InsufficientGas);
    assert_eq!(exception.message, "no gas coins owned by sender");
}

#[tokio::test]
async fn plain_bridge_error_keeps_status_and_body() {
    let router = Router::new().route("/bridge/execute", post(handle_execute_crash));
    let url = spawn_bridge(router).await;
    let executor = bridge_executor(&url);

    let err = executor
        .execute(&Identity::new("0xa11ce"), sample_call())
        .await
        .expect_err("must fail");

    let text = err.to_string();
    assert!(text.contains("500"), "unexpected error: {text}");
    assert!(text.contains("bridge crashed"), "unexpected error: {text}");
}

#[tokio::test]
async fn controller_over_bridge_without_gas_keeps_tally_and_hints_at_gas() {
    let router = Router::new().route("/bridge/execute", post(handle_execute_without_gas));
    let url = spawn_bridge(router).await;
    let call = sample_call();
    let controller = VoteController::new(
        Arc::new(WalletSession::connected(Identity::new("0xa11ce"))),
        Arc::new(bridge_executor(&url)),
        call.target.clone(),
        "0xb0a2d".parse().expect("board id"),
    );
    let mut notifications = controller.subscribe_notifications();

    let err = controller
        .submit_vote(Mood::Bad)
        .await
        .expect_err("must fail");

    assert!(matches!(err, VoteError::ExecutionFailed { .. }));
    assert_eq!(controller.tally().await.counts(), [0, 0, 0]);
    assert_eq!(
        notifications.recv().await.expect("notification").message(),
        "Transaction failed. Do you have IOTA gas?"
    );
}

#[tokio::test]
async fn dry_run_numbers_its_digests() {
    let executor = DryRunExecutor::default();
    let sender = Identity::new("0xa11ce");

    let first = executor.execute(&sender, sample_call()).await.expect("first");
    let second = executor.execute(&sender, sample_call()).await.expect("second");

    assert_eq!(first.digest, "dry-run-1");
    assert_eq!(second.digest, "dry-run-2");
}
