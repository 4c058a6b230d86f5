//! Example handlers shipped with the binary, registered through the same public
//! `register_sync` / `register_async` API as any other handler (spec.md §4.3's built-in
//! handler set, concretized in SPEC_FULL.md §4.3). These back the end-to-end scenarios
//! spec.md names directly: `add` (S1), `concat` (S4), `fibonacci` (S6).

use std::time::Duration;

use scheduler_registry::{RegistryBuilder, RegistryError};
use scheduler_tasks::TaskSpawner;
use scheduler_types::ArgValue;
use tracing::warn;

/// Registers the built-in example handlers onto `builder`.
///
/// `fibonacci` is registered as async and genuinely suspends (a `spawn_blocking` to
/// compute, wrapped in a small delay) to exercise the async dispatch path rather than
/// just wrapping a synchronous computation in an immediately-ready future.
pub fn register_builtins(
    builder: &mut RegistryBuilder,
    spawner: TaskSpawner,
) -> Result<(), RegistryError> {
    builder.register_sync("add", add)?;
    builder.register_sync("concat", concat)?;

    builder.register_async("fibonacci", move |args| {
        let spawner = spawner.clone();
        async move { fibonacci(&spawner, args).await }
    })?;

    Ok(())
}

/// Sums every `Int32`/`Int64` argument. Non-numeric arguments are reported inline in the
/// result string rather than panicking the handler, since a handler fault only becomes a
/// `FAILED` response when it panics or errors -- a deliberately malformed argument for
/// this particular handler is closer to a caller bug than an internal fault.
fn add(args: Vec<ArgValue>) -> String {
    let mut total: i64 = 0;
    for arg in &args {
        match arg {
            ArgValue::Int32(v) => total += *v as i64,
            ArgValue::Int64(v) => total += v,
            other => {
                warn!(target: "scheduler::builtins", kind = other.kind_name(), "add: ignoring non-integer arg");
            }
        }
    }
    total.to_string()
}

/// Joins every `String` argument in order. Non-string arguments are skipped with a
/// warning, same rationale as `add`.
fn concat(args: Vec<ArgValue>) -> String {
    let mut out = String::new();
    for arg in &args {
        match arg {
            ArgValue::String(s) => out.push_str(s),
            other => {
                warn!(target: "scheduler::builtins", kind = other.kind_name(), "concat: ignoring non-string arg");
            }
        }
    }
    out
}

/// Computes the `n`th Fibonacci number for the first `Int32`/`Int64` argument, offloading
/// the (potentially slow, for large `n`) computation to the manager's blocking pool and
/// yielding at an explicit await point first so the handler genuinely suspends rather
/// than running to completion synchronously inside the "async" path.
async fn fibonacci(spawner: &TaskSpawner, args: Vec<ArgValue>) -> String {
    let n = match args.first() {
        Some(ArgValue::Int32(v)) => *v as u64,
        Some(ArgValue::Int64(v)) => *v as u64,
        _ => return "internal: fibonacci expects one integer argument".to_string(),
    };

    tokio::time::sleep(Duration::from_millis(1)).await;

    match spawner.spawn_blocking(move || fibonacci_iterative(n)).await {
        Ok(value) => value.to_string(),
        Err(_) => "internal: fibonacci computation panicked".to_string(),
    }
}

fn fibonacci_iterative(n: u64) -> u64 {
    let (mut a, mut b) = (0u64, 1u64);
    for _ in 0..n {
        let next = a.checked_add(b).unwrap_or(u64::MAX);
        a = b;
        b = next;
    }
    a
}
