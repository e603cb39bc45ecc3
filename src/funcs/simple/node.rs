use crate::core::{Func, FuncError, Info, Init};
use crate::observability::FuncMetrics;
use crate::types::{FuncValue, Record, Value};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// What `stream` takes ownership of when it starts
struct StreamHandles {
    init: Init,
    done: broadcast::Receiver<()>,
}

/// Scaffolding that runs a simple, static, pure function as a streaming
/// node.
///
/// Each distinct input record triggers one call; repeated records and
/// repeated results are not forwarded. A function without parameters emits
/// exactly one value and stops.
pub struct SimpleFunc {
    name: String,
    func: Option<Arc<FuncValue>>,
    metrics: Arc<FuncMetrics>,

    handles: Mutex<Option<StreamHandles>>,
    done: Option<broadcast::Sender<()>>,
    closed: AtomicBool,
}

impl Default for SimpleFunc {
    /// An unbound node; `validate` fails until it wraps a function
    fn default() -> Self {
        Self {
            name: String::new(),
            func: None,
            metrics: Arc::new(FuncMetrics::new("")),
            handles: Mutex::new(None),
            done: None,
            closed: AtomicBool::new(false),
        }
    }
}

impl SimpleFunc {
    pub fn new(name: impl Into<String>, func: Arc<FuncValue>) -> Self {
        let name = name.into();
        Self {
            metrics: Arc::new(FuncMetrics::new(name.clone())),
            name,
            func: Some(func),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn take_handles(&self) -> Result<StreamHandles> {
        let mut guard = self
            .handles
            .lock()
            .map_err(|_| anyhow!("stream handles of `{}` poisoned", self.name))?;
        match guard.take() {
            Some(handles) => Ok(handles),
            None if self.done.is_some() => Err(FuncError::AlreadyStreaming.into()),
            None => Err(FuncError::NotInitialized.into()),
        }
    }
}

/// Arrange the record's fields in parameter order
fn project(record: &Record, ord: &[String]) -> Result<Vec<Value>, FuncError> {
    ord.iter()
        .map(|name| {
            record
                .get(name)
                .cloned()
                .ok_or_else(|| FuncError::MissingArgument(name.clone()))
        })
        .collect()
}

#[async_trait]
impl Func for SimpleFunc {
    fn validate(&self) -> Result<(), FuncError> {
        if self.func.is_none() {
            return Err(FuncError::Unspecified);
        }
        Ok(())
    }

    fn info(&self) -> Info {
        Info {
            pure: true,
            // the stream diffs its own inputs and outputs
            memo: false,
            sig: self.func.as_ref().map(|f| f.sig().clone()),
            err: self.validate().err(),
        }
    }

    async fn init(&mut self, init: Init) -> Result<()> {
        self.validate()?;

        let (done_tx, done_rx) = broadcast::channel(1);
        self.done = Some(done_tx);
        self.closed.store(false, Ordering::SeqCst);

        let handles = self
            .handles
            .get_mut()
            .map_err(|_| anyhow!("stream handles of `{}` poisoned", self.name))?;
        *handles = Some(StreamHandles {
            init,
            done: done_rx,
        });
        Ok(())
    }

    async fn stream(&self) -> Result<()> {
        let func = self.func.clone().ok_or(FuncError::Unspecified)?;
        let StreamHandles { init, mut done } = self.take_handles()?;
        // `output` is dropped on every return below, which closes the channel
        let Init { mut input, output } = init;

        let ord: Vec<String> = func.sig().ord().into_iter().map(String::from).collect();
        let mut last: Option<Record> = None;
        let mut result: Option<Value> = None;

        loop {
            let received = tokio::select! {
                biased;
                _ = done.recv() => {
                    log::debug!("func {} closed while waiting for input", self.name);
                    return Ok(());
                }
                received = input.recv() => received,
            };

            let args = match received {
                None if !ord.is_empty() => {
                    log::debug!("func {} input closed", self.name);
                    return Ok(()); // can't output any more
                }
                // no inputs were expected, pass through once
                None => Vec::new(),
                Some(value) => {
                    self.metrics.record_input();
                    let record = match value {
                        Value::Struct(record) => record,
                        other => {
                            return Err(FuncError::NotARecord(other.kind()))
                                .with_context(|| format!("simple func `{}` got bad input", self.name));
                        }
                    };

                    if last.as_ref().is_some_and(|prev| record.cmp(prev).is_ok()) {
                        log::trace!("func {} input unchanged, skipping", self.name);
                        self.metrics.record_input_skipped();
                        continue;
                    }

                    let args = project(&record, &ord).with_context(|| {
                        format!("simple func `{}` errored while streaming", self.name)
                    })?;
                    last = Some(record);
                    args
                }
            };

            let start = self.metrics.start_call();
            let called = func.call(&args);
            self.metrics.finish_call(start);

            let value = match called {
                Ok(value) => value,
                Err(e) => {
                    self.metrics.record_call_error();
                    log::warn!("func {} call failed: {:#}", self.name, e);
                    return Err(e.context(format!(
                        "simple func `{}` errored while streaming",
                        self.name
                    )));
                }
            };

            if result.as_ref().is_some_and(|prev| prev.cmp(&value).is_ok()) {
                log::trace!("func {} result unchanged, not sending", self.name);
                self.metrics.record_output_suppressed();
                continue;
            }
            result = Some(value.clone());

            tokio::select! {
                biased;
                _ = done.recv() => {
                    log::debug!("func {} closed while sending", self.name);
                    return Ok(());
                }
                sent = output.send(value) => {
                    if sent.is_err() {
                        log::debug!("func {} output receiver dropped", self.name);
                        return Ok(());
                    }
                    self.metrics.record_output();
                    if ord.is_empty() {
                        return Ok(()); // no more values, the func is constant
                    }
                }
            }
        }
    }

    fn close(&self) -> Result<()> {
        let done = self.done.as_ref().ok_or(FuncError::NotInitialized)?;
        if self.closed.swap(true, Ordering::SeqCst) {
            log::warn!("func {} closed twice", self.name);
            return Err(FuncError::AlreadyClosed.into());
        }
        // no receiver left once the stream has returned
        let _ = done.send(());
        Ok(())
    }

    fn metrics(&self) -> Option<Arc<FuncMetrics>> {
        Some(self.metrics.clone())
    }
}
