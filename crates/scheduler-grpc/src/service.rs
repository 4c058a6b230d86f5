//! Translates gRPC frames to/from `TaskRequest`/`TaskResponse` and delegates to the
//! execution core (spec.md §4.5). Gross malformation (empty `task_id`/`method`) is
//! rejected here as a transport-layer error, distinct from a `FAILED` task result.

use scheduler_core::ExecutionCore;
use scheduler_wire::task_results_server::TaskResults;
use scheduler_wire::task_submission_server::TaskSubmission;
use scheduler_wire::{ResultRequest, ResultResponse, TaskRequest, TaskResponse};
use tonic::{Request, Response, Status};

/// The gRPC-facing handler wrapping an [`ExecutionCore`]. Implements both
/// `TaskSubmission` and `TaskResults` so the server can register a single service value
/// for each generated server trait.
#[derive(Debug, Clone)]
pub struct SchedulerService {
    core: ExecutionCore,
}

impl SchedulerService {
    pub fn new(core: ExecutionCore) -> Self {
        Self { core }
    }
}

#[tonic::async_trait]
impl TaskSubmission for SchedulerService {
    async fn submit_task(
        &self,
        request: Request<TaskRequest>,
    ) -> Result<Response<TaskResponse>, Status> {
        let req = request.into_inner();

        if req.task_id.is_empty() {
            return Err(Status::invalid_argument("task_id must not be empty"));
        }
        if req.method.is_empty() {
            return Err(Status::invalid_argument("method must not be empty"));
        }

        let response =
            self.core.submit(req.task_id, req.method, req.args, req.deps, req.is_async).await;

        Ok(Response::new(response))
    }
}

#[tonic::async_trait]
impl TaskResults for SchedulerService {
    async fn get_result(
        &self,
        request: Request<ResultRequest>,
    ) -> Result<Response<ResultResponse>, Status> {
        let req = request.into_inner();

        if req.task_id.is_empty() {
            return Err(Status::invalid_argument("task_id must not be empty"));
        }

        Ok(Response::new(self.core.get_result(&req.task_id)))
    }
}

#[cfg(test)]
mod tests {
    use scheduler_cache::ResultCache;
    use scheduler_registry::Registry;
    use scheduler_tasks::TaskManager;

    use super::*;

    fn service() -> SchedulerService {
        let mut builder = Registry::builder();
        scheduler_core::builtins::register_builtins(
            &mut builder,
            TaskManager::current().task_spawner(),
        )
        .unwrap();
        let core = ExecutionCore::new(builder.build(), ResultCache::new(64, 4), TaskManager::current().task_spawner());
        SchedulerService::new(core)
    }

    #[tokio::test]
    async fn empty_task_id_is_rejected_at_the_transport_layer() {
        let svc = service();
        let req = Request::new(TaskRequest {
            task_id: String::new(),
            method: "add".into(),
            args: vec![],
            deps: vec![],
            is_async: false,
        });
        let err = svc.submit_task(req).await.unwrap_err();
        assert_eq!(err.code(), tonic::Code::InvalidArgument);
    }

    #[tokio::test]
    async fn empty_method_is_rejected_at_the_transport_layer() {
        let svc = service();
        let req = Request::new(TaskRequest {
            task_id: "t1".into(),
            method: String::new(),
            args: vec![],
            deps: vec![],
            is_async: false,
        });
        let err = svc.submit_task(req).await.unwrap_err();
        assert_eq!(err.code(), tonic::Code::InvalidArgument);
    }

    #[tokio::test]
    async fn empty_get_result_task_id_is_rejected() {
        let svc = service();
        let req = Request::new(ResultRequest { task_id: String::new() });
        let err = svc.get_result(req).await.unwrap_err();
        assert_eq!(err.code(), tonic::Code::InvalidArgument);
    }

    #[tokio::test]
    async fn valid_submission_round_trips_through_the_service() {
        let svc = service();
        let args = vec![scheduler_codec::encode_arg(&scheduler_types::ArgValue::Int32(41)),
            scheduler_codec::encode_arg(&scheduler_types::ArgValue::Int32(1))];
        let req = Request::new(TaskRequest {
            task_id: "t1".into(),
            method: "add".into(),
            args,
            deps: vec![],
            is_async: false,
        });
        let resp = svc.submit_task(req).await.unwrap().into_inner();
        assert_eq!(resp.result, "42");

        let get_req = Request::new(ResultRequest { task_id: "t1".into() });
        let get_resp = svc.get_result(get_req).await.unwrap().into_inner();
        assert_eq!(get_resp.result, "42");
    }
}
