use std::io::{self, BufRead, Write};

use jornada::{Engine, Inbound, JsonFileStore};
use tracing::warn;

use super::SenderArgs;

fn inbound(sender: &SenderArgs, text: String) -> Inbound {
    Inbound::new(
        sender.sender.clone(),
        sender.name.clone(),
        text,
        sender.moderator,
    )
}

pub(super) fn run_send(
    engine: &Engine<JsonFileStore>,
    sender: SenderArgs,
    text: String,
) -> Result<(), String> {
    if let Some(reply) = engine.handle(&inbound(&sender, text)) {
        println!("{}", reply);
    }
    Ok(())
}

pub(super) fn run_chat(engine: Engine<JsonFileStore>, sender: SenderArgs) -> Result<(), String> {
    println!(
        "Chatting as {} ({}){}. Ctrl-D to quit.",
        sender.name,
        sender.sender,
        if sender.moderator { " [moderator]" } else { "" }
    );

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.map_err(|e| e.to_string())?;
        if let Some(reply) = engine.handle(&inbound(&sender, line)) {
            println!("{}\n", reply);
        }
    }
    Ok(())
}

/// One JSON event per input line; one JSON reply per line that earns one.
pub(super) fn run_pipe(engine: Engine<JsonFileStore>) -> Result<(), String> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (lineno, line) in stdin.lock().lines().enumerate() {
        let line = line.map_err(|e| e.to_string())?;
        if line.trim().is_empty() {
            continue;
        }

        let msg: Inbound = match serde_json::from_str(&line) {
            Ok(msg) => msg,
            Err(err) => {
                warn!(line = lineno + 1, error = %err, "skipping malformed inbound event");
                continue;
            }
        };

        let now = chrono::Utc::now().timestamp();
        if let Some(reply) = engine.outbound(&msg, now, &mut rand::thread_rng()) {
            let json = serde_json::to_string(&reply).map_err(|e| e.to_string())?;
            writeln!(out, "{}", json).map_err(|e| e.to_string())?;
            out.flush().map_err(|e| e.to_string())?;
        }
    }
    Ok(())
}
