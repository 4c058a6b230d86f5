/// The outcome status of a task, independent of wire representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Success,
    Failed,
}

/// The recorded result of a completed task, as stored in the result cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    pub status: TaskStatus,
    pub value: String,
}

impl TaskResult {
    pub fn success(value: impl Into<String>) -> Self {
        Self { status: TaskStatus::Success, value: value.into() }
    }

    pub fn failed(value: impl Into<String>) -> Self {
        Self { status: TaskStatus::Failed, value: value.into() }
    }

    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Success
    }
}
