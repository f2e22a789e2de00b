//! Greeter workflow example.
//!
//! Feeds a pre-parsed graph (as a graph parser would emit it, in JSON) into the
//! engine, binds a pattern action that prints greetings and a branching action
//! that checks the clock, then prints every lifecycle event.
//!
//! Run with: cargo run -p dotflow-core --example greeter

use anyhow::Result;
use chrono::Timelike;
use dotflow_core::{
    action_fn, sync_action, ActionSet, EdgeStatement, EngineConfig, EventType, Params,
    RunContext, WorkflowEngine,
};

const GRAPH: &str = r#"[
    {"nodes": ["Start", "Say Hello"]},
    {"nodes": ["Say Hello", "After Noon?"]},
    {"nodes": ["After Noon?", "Say Good Afternoon"], "attributes": [{"id": "label", "eq": "YES"}]},
    {"nodes": ["After Noon?", "Say Good Morning"], "attributes": [{"id": "label", "eq": "NO"}]},
    {"nodes": ["Say Good Afternoon", "Finish"]},
    {"nodes": ["Say Good Morning", "Finish"]}
]"#;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dotflow_core=info".into()),
        )
        .with_target(false)
        .init();

    let statements: Vec<EdgeStatement> = serde_json::from_str(GRAPH)?;
    let config = EngineConfig::load("dotflow.toml")?;

    let actions = ActionSet::new()
        .bind(
            "Say {message}",
            action_fn(|params: Params, context: RunContext| async move {
                let message = params.get("message").unwrap_or_default().to_string();
                println!("{}", message);
                context.insert("last_said", message).await;
                Ok::<_, anyhow::Error>(None)
            }),
        )
        .bind(
            "After Noon?",
            sync_action(|_, _| {
                let afternoon = chrono::Local::now().hour() >= 12;
                Ok(Some(if afternoon { "YES" } else { "NO" }.to_string()))
            }),
        );

    let engine = WorkflowEngine::with_config(&statements, actions, config)?;

    let mut events = engine.events().subscribe();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let done = matches!(event.event_type, EventType::Finished | EventType::Error(_));
            println!("[{}] {:?}", event.timestamp.format("%H:%M:%S%.3f"), event.event_type);
            if done {
                break;
            }
        }
    });

    let context = engine.run().await?;
    printer.await?;

    println!("Done: {:?}", context.snapshot().await);
    Ok(())
}
