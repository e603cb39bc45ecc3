use anyhow::Result;
use funcstream::engine::{EngineConfig, NodeRunner};
use funcstream::funcs::SimpleRegistry;
use funcstream::observability::{MetricsCollector, NodeMonitor};
use funcstream::types::{Record, Value};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    println!("funcstream - simple func demo");
    println!("=============================\n");

    let config = EngineConfig::from_json(&serde_json::json!({
        "engine_config": {
            "channel_capacity": 4,
            "stop_timeout_ms": 500
        }
    }))?;

    let (registry, catalog) = SimpleRegistry::bootstrap();
    println!("Registered funcs: {}\n", registry.names().join(", "));

    let mut collector = MetricsCollector::new();

    // add: one output per distinct input
    let mut adder = NodeRunner::from_catalog(&catalog, "add", "adder", config.clone())?;
    if let Some(info) = adder.info() {
        if let Some(sig) = info.sig {
            println!("adder: {}", sig);
        }
    }
    adder.validate()?;
    let mut io = adder.start().await?;
    if let Some(metrics) = adder.metrics() {
        collector.register(adder.node_id(), metrics);
    }

    let inputs = [(1, 2), (1, 2), (2, 2), (3, 1)];
    for (a, b) in inputs {
        println!("  -> {{a: {}, b: {}}}", a, b);
        io.input.send(Value::Struct(Record::new().with("a", a).with("b", b))).await?;
    }
    drop(io.input);

    while let Some(value) = io.output.recv().await {
        println!("  <- {}", value);
    }
    adder.wait().await?;
    println!("adder is {}\n", adder.state().name());

    // pi: a constant emits exactly once
    let mut constant = NodeRunner::from_catalog(&catalog, "pi", "constant", config)?;
    constant.validate()?;
    let mut io = constant.start().await?;
    if let Some(metrics) = constant.metrics() {
        collector.register(constant.node_id(), metrics);
    }
    io.input.send(Value::Struct(Record::new())).await?;

    while let Some(value) = io.output.recv().await {
        println!("constant <- {}", value);
    }
    constant.wait().await?;
    println!("constant is {}\n", constant.state().name());

    let monitor = NodeMonitor::new(collector);
    println!("{}", monitor.generate_report());

    Ok(())
}
