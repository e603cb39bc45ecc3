use anyhow::{bail, Result};
use funcstream::core::{Func, FuncError, Init};
use funcstream::funcs::builtin;
use funcstream::funcs::SimpleFunc;
use funcstream::types::{FuncType, FuncValue, Record, Type, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Duration};

const WAIT: Duration = Duration::from_secs(2);

struct Running {
    node: Arc<SimpleFunc>,
    input: Option<mpsc::Sender<Value>>,
    output: mpsc::Receiver<Value>,
    handle: JoinHandle<Result<()>>,
}

impl Running {
    async fn send(&self, record: Record) {
        self.send_value(Value::Struct(record)).await.unwrap();
    }

    async fn send_value(&self, value: Value) -> Result<()> {
        let input = self.input.as_ref().expect("input already closed");
        input.send(value).await.map_err(|_| anyhow::anyhow!("node input is gone"))
    }

    fn close_input(&mut self) {
        self.input.take();
    }

    async fn recv(&mut self) -> Option<Value> {
        timeout(WAIT, self.output.recv())
            .await
            .expect("timed out waiting for output")
    }

    async fn finish(self) -> Result<()> {
        timeout(WAIT, self.handle)
            .await
            .expect("stream did not finish")
            .unwrap()
    }
}

async fn start(name: &str, func: FuncValue, capacity: usize) -> Running {
    let mut node = SimpleFunc::new(name, Arc::new(func));
    let (input_tx, input_rx) = mpsc::channel(capacity);
    let (output_tx, output_rx) = mpsc::channel(capacity);

    node.init(Init {
        input: input_rx,
        output: output_tx,
    })
    .await
    .unwrap();

    let node = Arc::new(node);
    let stream_node = node.clone();
    let handle = tokio::spawn(async move { stream_node.stream().await });

    Running {
        node,
        input: Some(input_tx),
        output: output_rx,
        handle,
    }
}

fn ab(a: i64, b: i64) -> Record {
    Record::new().with("a", a).with("b", b)
}

#[tokio::test]
async fn test_add_scenario() {
    let mut run = start("add", builtin::add(), 8).await;

    run.send(ab(1, 2)).await;
    assert_eq!(run.recv().await, Some(Value::Int(3)));

    // identical input: nothing is emitted for it, so the next value is 4
    run.send(ab(1, 2)).await;
    run.send(ab(2, 2)).await;
    assert_eq!(run.recv().await, Some(Value::Int(4)));

    run.close_input();
    assert_eq!(run.recv().await, None);
    run.finish().await.unwrap();
}

#[tokio::test]
async fn test_repeated_input_emits_once() {
    let mut run = start("add", builtin::add(), 8).await;
    let metrics = run.node.metrics().unwrap();

    run.send(ab(5, 5)).await;
    run.send(ab(5, 5)).await;
    run.send(ab(5, 5)).await;
    assert_eq!(run.recv().await, Some(Value::Int(10)));

    run.close_input();
    assert_eq!(run.recv().await, None);
    run.finish().await.unwrap();

    assert_eq!(metrics.inputs_received(), 3);
    assert_eq!(metrics.inputs_skipped(), 2);
    assert_eq!(metrics.calls(), 1);
    assert_eq!(metrics.outputs_emitted(), 1);
}

#[tokio::test]
async fn test_equal_results_are_suppressed() {
    let mut run = start("add", builtin::add(), 8).await;
    let metrics = run.node.metrics().unwrap();

    run.send(ab(1, 3)).await;
    run.send(ab(2, 2)).await; // distinct input, same sum
    run.send(ab(3, 3)).await;

    assert_eq!(run.recv().await, Some(Value::Int(4)));
    assert_eq!(run.recv().await, Some(Value::Int(6)));

    run.node.close().unwrap();
    assert_eq!(run.recv().await, None);
    run.finish().await.unwrap();

    assert_eq!(metrics.calls(), 3);
    assert_eq!(metrics.outputs_suppressed(), 1);
    assert_eq!(metrics.outputs_emitted(), 2);
}

#[tokio::test]
async fn test_input_closed_before_any_record() {
    let mut run = start("add", builtin::add(), 8).await;
    let metrics = run.node.metrics().unwrap();

    run.close_input();

    assert_eq!(run.recv().await, None);
    run.finish().await.unwrap();
    assert_eq!(metrics.calls(), 0);
}

#[tokio::test]
async fn test_constant_emits_once_with_input_left_open() {
    let mut run = start("pi", builtin::pi(), 8).await;

    run.send(Record::new()).await;

    assert_eq!(run.recv().await, Some(Value::Float(std::f64::consts::PI)));
    // the input sender is still alive, yet the output ends
    assert_eq!(run.recv().await, None);
    run.finish().await.unwrap();
}

#[tokio::test]
async fn test_constant_primed_by_input_close() {
    let mut run = start("pi", builtin::pi(), 8).await;

    run.close_input();

    assert_eq!(run.recv().await, Some(Value::Float(std::f64::consts::PI)));
    assert_eq!(run.recv().await, None);
    run.finish().await.unwrap();
}

#[tokio::test]
async fn test_constant_ignores_spurious_inputs() {
    let mut run = start("pi", builtin::pi(), 8).await;
    let metrics = run.node.metrics().unwrap();

    run.send(Record::new()).await;
    // the node may already be gone by the time these arrive
    let _ = run.send_value(Value::Struct(Record::new().with("x", 1))).await;
    let _ = run.send_value(Value::Struct(Record::new().with("y", 2))).await;

    assert_eq!(run.recv().await, Some(Value::Float(std::f64::consts::PI)));
    assert_eq!(run.recv().await, None);
    run.finish().await.unwrap();
    assert_eq!(metrics.outputs_emitted(), 1);
}

#[tokio::test]
async fn test_zero_param_now_plumbing() {
    let sig = FuncType::new(Type::Int);
    let now = FuncValue::new(sig, |_| Ok(Value::Int(1_700_000_000)));
    let mut run = start("now", now, 1).await;

    run.send(Record::new()).await;
    assert_eq!(run.recv().await, Some(Value::Int(1_700_000_000)));
    assert_eq!(run.recv().await, None);
    run.finish().await.unwrap();
}

#[tokio::test]
async fn test_close_without_input() {
    let mut run = start("add", builtin::add(), 8).await;

    run.node.close().unwrap();

    assert_eq!(run.recv().await, None);
    run.finish().await.unwrap();
}

#[tokio::test]
async fn test_close_while_blocked_on_send() {
    let mut run = start("add", builtin::add(), 1).await;
    let metrics = run.node.metrics().unwrap();

    // first output fills the buffer, the second send blocks
    run.send(ab(1, 1)).await;
    run.send(ab(2, 2)).await;

    let waited = timeout(WAIT, async {
        while metrics.calls() < 2 {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "second call never happened");

    run.node.close().unwrap();
    let Running {
        mut output, handle, ..
    } = run;
    timeout(WAIT, handle).await.unwrap().unwrap().unwrap();

    assert_eq!(output.recv().await, Some(Value::Int(2)));
    assert_eq!(output.recv().await, None);
    assert_eq!(metrics.outputs_emitted(), 1);
}

#[tokio::test]
async fn test_call_failure_is_fatal() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = calls.clone();
    let sig = FuncType::new(Type::Int).with_param("a", Type::Int);
    let picky = FuncValue::new(sig, move |args| {
        counted.fetch_add(1, Ordering::SeqCst);
        let a = args[0].as_int()?;
        if a == 0 {
            bail!("zero is not allowed");
        }
        Ok(Value::Int(a))
    });

    let mut run = start("picky", picky, 8).await;
    let metrics = run.node.metrics().unwrap();

    run.send(Record::new().with("a", 0)).await;
    assert_eq!(run.recv().await, None);

    let err = run.finish().await.unwrap_err();
    let msg = format!("{:#}", err);
    assert!(msg.contains("simple func `picky` errored while streaming"), "{}", msg);
    assert!(msg.contains("zero is not allowed"), "{}", msg);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(metrics.call_errors(), 1);
}

#[tokio::test]
async fn test_no_call_after_failure() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = calls.clone();
    let sig = FuncType::new(Type::Int).with_param("a", Type::Int);
    let failing = FuncValue::new(sig, move |_| {
        counted.fetch_add(1, Ordering::SeqCst);
        bail!("always fails")
    });

    let mut run = start("failing", failing, 8).await;
    run.send(Record::new().with("a", 1)).await;
    assert_eq!(run.recv().await, None);

    let Running { input, handle, .. } = run;
    assert!(timeout(WAIT, handle).await.unwrap().unwrap().is_err());

    // the stream is gone, so its input is closed
    let input = input.unwrap();
    assert!(input.send(Value::Struct(Record::new().with("a", 2))).await.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_argument_is_fatal() {
    let mut run = start("add", builtin::add(), 8).await;

    run.send(Record::new().with("a", 1)).await;
    assert_eq!(run.recv().await, None);

    let err = run.finish().await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<FuncError>(),
        Some(&FuncError::MissingArgument("b".to_string()))
    );
}

#[tokio::test]
async fn test_non_record_input_is_fatal() {
    let mut run = start("add", builtin::add(), 8).await;

    run.send_value(Value::Int(7)).await.unwrap();
    assert_eq!(run.recv().await, None);

    let err = run.finish().await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<FuncError>(),
        Some(&FuncError::NotARecord("int"))
    );
}

#[tokio::test]
async fn test_close_before_stream_and_twice() {
    let mut node = SimpleFunc::new("add", Arc::new(builtin::add()));
    let (_input_tx, input_rx) = mpsc::channel(1);
    let (output_tx, mut output_rx) = mpsc::channel(1);
    node.init(Init {
        input: input_rx,
        output: output_tx,
    })
    .await
    .unwrap();

    node.close().unwrap();
    let err = node.close().unwrap_err();
    assert_eq!(err.downcast_ref::<FuncError>(), Some(&FuncError::AlreadyClosed));

    // the signal raised before the stream started is still seen
    timeout(WAIT, node.stream()).await.unwrap().unwrap();
    assert_eq!(output_rx.recv().await, None);

    let err = node.stream().await.unwrap_err();
    assert_eq!(err.downcast_ref::<FuncError>(), Some(&FuncError::AlreadyStreaming));
}

#[tokio::test]
async fn test_stream_before_init() {
    let node = SimpleFunc::new("add", Arc::new(builtin::add()));
    let err = node.stream().await.unwrap_err();
    assert_eq!(err.downcast_ref::<FuncError>(), Some(&FuncError::NotInitialized));
}

#[tokio::test]
async fn test_unbound_node_cannot_init() {
    let mut node = SimpleFunc::default();
    let (_input_tx, input_rx) = mpsc::channel(1);
    let (output_tx, _output_rx) = mpsc::channel(1);

    let err = node
        .init(Init {
            input: input_rx,
            output: output_tx,
        })
        .await
        .unwrap_err();
    assert_eq!(err.downcast_ref::<FuncError>(), Some(&FuncError::Unspecified));
}

#[test]
fn test_info_of_bound_node() {
    let node = SimpleFunc::new("add", Arc::new(builtin::add()));
    let info = node.info();

    assert!(info.pure);
    assert!(!info.memo);
    assert!(info.err.is_none());
    assert_eq!(info.sig.unwrap().to_string(), "func(a int, b int) int");
    assert_eq!(node.validate(), Ok(()));
}
