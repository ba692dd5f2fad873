//! `rustedreason run`: single-question or interactive reason-act mode.

use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rustedreason_agent::react::{Controller, Dispatcher, PromptMode};
use rustedreason_agent::ReactAgent;
use rustedreason_config::AppConfig;
use rustedreason_core::memory::InMemoryConversation;
use rustedreason_core::progress::{ChannelSink, EventTally, FanoutSink, ProgressEvent};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub struct RunOptions {
    pub message: Option<String>,
    pub max_iterations: Option<usize>,
    pub mode: Option<String>,
    pub prompt_file: Option<PathBuf>,
}

pub async fn run(options: RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let mode_name = options
        .mode
        .clone()
        .unwrap_or_else(|| config.agent.mode.clone());
    let mode: PromptMode = mode_name.parse()?;
    let max_iterations = options.max_iterations.unwrap_or(config.agent.max_iterations);
    let custom_prompt = match &options.prompt_file {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {e}", path.display()))?,
        ),
        None => config.agent.custom_prompt.clone(),
    };

    let model = rustedreason_providers::build_from_config(&config)?;
    debug!(mode = %mode_name, max_iterations, "Run options resolved");

    let catalog = rustedreason_tools::default_catalog(
        config.tools.shell.allowed_commands.clone(),
        config.tools.file_read.allowed_roots.clone(),
    );
    let dispatcher = Arc::new(
        Dispatcher::new(catalog)
            .with_timeout(Duration::from_secs(config.agent.tool_timeout_secs)),
    );

    let (channel_sink, mut events) = ChannelSink::new(config.agent.event_buffer.max(1));
    let tally = Arc::new(EventTally::new());
    let sink = FanoutSink::new()
        .with(Arc::new(channel_sink))
        .with(tally.clone());

    let mut controller = Controller::new(model, dispatcher.clone())
        .with_max_iterations(max_iterations)
        .with_mode(mode)
        .with_sink(Arc::new(sink));
    if let Some(prompt) = custom_prompt {
        controller = controller.with_custom_prompt(prompt);
    }
    let mut agent =
        ReactAgent::new(controller).with_memory(Arc::new(InMemoryConversation::new()));

    if let Some(message) = options.message {
        let answer = ask(&mut agent, &message, &mut events).await?;
        println!("{answer}");
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║      RustedReason: Interactive Mode         ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:   {}", config.default_provider);
    println!("  Model:      {}", config.default_model);
    println!("  Mode:       {mode_name}");
    println!("  Iterations: {max_iterations}");
    println!("  Tools:      {}", dispatcher.names().join(", "));
    println!();
    println!("  Type your question and press Enter.");
    println!("  Ctrl+C cancels a running question. '/clear' forgets the conversation.");
    println!("  Type 'exit' or press Ctrl+C at the prompt to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let interrupt = async {
            let _ = tokio::signal::ctrl_c().await;
        };
        let Some(line) = next_input(&mut lines, interrupt).await? else {
            println!();
            break;
        };
        let input = line.trim();
        match input {
            "" => continue,
            "exit" | "quit" => break,
            "/clear" => {
                agent.clear_memory().await?;
                println!("  (conversation cleared)");
                continue;
            }
            _ => {}
        }

        match ask(&mut agent, input, &mut events).await {
            Ok(answer) => {
                println!();
                for line in answer.lines() {
                    println!("  Assistant > {line}");
                }
                println!();
            }
            Err(e) => {
                eprintln!("  [Error] {e}");
                println!();
            }
        }
    }

    let totals = tally.snapshot();
    println!();
    println!(
        "  Session: {} thoughts, {} tool calls, {} answers, {} errors",
        totals.thoughts, totals.actions, totals.answers, totals.errors
    );
    println!("  Goodbye! 👋");
    println!();
    Ok(())
}

/// Read the next prompt line. `None` on end of input, or when
/// `interrupt` resolves first.
async fn next_input<R>(
    lines: &mut Lines<R>,
    interrupt: impl Future<Output = ()>,
) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    tokio::select! {
        biased;
        _ = interrupt => Ok(None),
        line = lines.next_line() => line,
    }
}

/// Run one question, printing progress events as they arrive. Ctrl+C
/// cancels the run.
async fn ask(
    agent: &mut ReactAgent,
    input: &str,
    events: &mut mpsc::Receiver<ProgressEvent>,
) -> Result<String, rustedreason_core::Error> {
    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let run = agent.execute(input, &cancel);
    tokio::pin!(run);
    let result = loop {
        tokio::select! {
            Some(event) = events.recv() => print_event(&event),
            result = &mut run => break result,
        }
    };
    while let Ok(event) = events.try_recv() {
        print_event(&event);
    }

    watcher.abort();
    result
}

fn print_event(event: &ProgressEvent) {
    match event {
        ProgressEvent::Thought { content, .. } => eprintln!("  🤔 Thought: {content}"),
        ProgressEvent::Action { name, .. } => eprintln!("  ⚡ Action: {name}"),
        ProgressEvent::ActionInput { input, .. } => eprintln!("  📝 Input: {input}"),
        ProgressEvent::Observation { content, .. } => {
            let mut lines = content.lines();
            eprintln!("  👁️  Observation: {}", lines.next().unwrap_or(""));
            for line in lines.take(10) {
                eprintln!("      {line}");
            }
        }
        ProgressEvent::Answer { .. } => {}
        ProgressEvent::Error { message, stage, .. } => {
            eprintln!("  ❌ {stage} failed: {message}")
        }
    }
}
