//! End-to-end scenarios S1-S6 (spec.md §8) driven over a real gRPC connection against an
//! ephemeral TCP port, exercising the full wire path rather than calling the execution
//! core directly.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use scheduler_cache::ResultCache;
use scheduler_codec::encode_arg;
use scheduler_core::builtins::register_builtins;
use scheduler_core::ExecutionCore;
use scheduler_grpc::proto::task_results_client::TaskResultsClient;
use scheduler_grpc::proto::task_submission_client::TaskSubmissionClient;
use scheduler_grpc::proto::{ResultRequest, Status as WireStatus, TaskRequest};
use scheduler_grpc::{GrpcServer, ServerConfig};
use scheduler_registry::Registry;
use scheduler_tasks::TaskManager;
use scheduler_types::ArgValue;
use tonic::Request;

async fn start_server() -> (SocketAddr, TaskManager) {
    let manager = TaskManager::current();

    let mut builder = Registry::builder();
    register_builtins(&mut builder, manager.task_spawner()).unwrap();
    let registry = builder.build();

    let cache = ResultCache::new(64, 4);
    let core = ExecutionCore::new(registry, cache, manager.task_spawner());

    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);
    // Bind to an OS-assigned ephemeral port by letting the listener pick, then read it
    // back: tonic's `serve_with_shutdown` takes a fixed addr, so resolve the free port
    // up front via a throwaway bind.
    let listener = std::net::TcpListener::bind(addr).unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ServerConfig::new(addr);
    let handle = GrpcServer::new(config).start(core, manager.clone()).await.unwrap();
    assert_eq!(handle.addr(), addr);
    std::mem::forget(handle); // keep the server alive for the duration of the test process

    // Give the accept loop a moment to actually bind before clients connect.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    (addr, manager)
}

async fn connect(
    addr: SocketAddr,
) -> (TaskSubmissionClient<tonic::transport::Channel>, TaskResultsClient<tonic::transport::Channel>)
{
    let endpoint = format!("http://{addr}");
    let channel = tonic::transport::Endpoint::from_shared(endpoint).unwrap().connect().await.unwrap();
    (TaskSubmissionClient::new(channel.clone()), TaskResultsClient::new(channel))
}

#[tokio::test]
async fn s1_s2_add_then_get_result() {
    let (addr, _manager) = start_server().await;
    let (mut submit, mut results) = connect(addr).await;

    let args = vec![
        encode_arg(&ArgValue::Int32(10)),
        encode_arg(&ArgValue::Int32(20)),
        encode_arg(&ArgValue::Int32(30)),
        encode_arg(&ArgValue::Int32(-5)),
    ];
    let resp = submit
        .submit_task(Request::new(TaskRequest {
            task_id: "t1".into(),
            method: "add".into(),
            args,
            deps: vec![],
            is_async: false,
        }))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(resp.task_id, "t1");
    assert_eq!(resp.status, WireStatus::Success as i32);
    assert_eq!(resp.result, "55");

    let get = results
        .get_result(Request::new(ResultRequest { task_id: "t1".into() }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(get.status, WireStatus::Success as i32);
    assert_eq!(get.result, "55");
}

#[tokio::test]
async fn s3_get_result_for_never_submitted_is_pending() {
    let (addr, _manager) = start_server().await;
    let (_submit, mut results) = connect(addr).await;

    let get = results
        .get_result(Request::new(ResultRequest { task_id: "never-submitted".into() }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(get.status, WireStatus::Pending as i32);
    assert_eq!(get.result, "");
}

#[tokio::test]
async fn s4_concat() {
    let (addr, _manager) = start_server().await;
    let (mut submit, _results) = connect(addr).await;

    let args = vec![
        encode_arg(&ArgValue::String("Hello".into())),
        encode_arg(&ArgValue::String(" ".into())),
        encode_arg(&ArgValue::String("World".into())),
    ];
    let resp = submit
        .submit_task(Request::new(TaskRequest {
            task_id: "t2".into(),
            method: "concat".into(),
            args,
            deps: vec![],
            is_async: false,
        }))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(resp.status, WireStatus::Success as i32);
    assert_eq!(resp.result, "Hello World");
}

#[tokio::test]
async fn s5_missing_dependency_fails() {
    let (addr, _manager) = start_server().await;
    let (mut submit, _results) = connect(addr).await;

    let resp = submit
        .submit_task(Request::new(TaskRequest {
            task_id: "t3".into(),
            method: "add".into(),
            args: vec![encode_arg(&ArgValue::Int32(1))],
            deps: vec!["does-not-exist".into()],
            is_async: false,
        }))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(resp.status, WireStatus::Failed as i32);
    assert_eq!(resp.result, "missing dep: does-not-exist");
}

#[tokio::test]
async fn s6_fibonacci_async() {
    let (addr, _manager) = start_server().await;
    let (mut submit, _results) = connect(addr).await;

    let resp = submit
        .submit_task(Request::new(TaskRequest {
            task_id: "t4".into(),
            method: "fibonacci".into(),
            args: vec![encode_arg(&ArgValue::Int32(12))],
            deps: vec![],
            is_async: true,
        }))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(resp.status, WireStatus::Success as i32);
    assert_eq!(resp.result, "144");
}

#[tokio::test]
async fn empty_task_id_is_a_transport_error() {
    let (addr, _manager) = start_server().await;
    let (mut submit, _results) = connect(addr).await;

    let err = submit
        .submit_task(Request::new(TaskRequest {
            task_id: String::new(),
            method: "add".into(),
            args: vec![],
            deps: vec![],
            is_async: false,
        }))
        .await
        .unwrap_err();

    assert_eq!(err.code(), tonic::Code::InvalidArgument);
}
