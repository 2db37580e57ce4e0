//! state-runner: headless host for the idle racer state core.
//!
//! Usage:
//!   state-runner --db save.db                      # print the loaded state summary
//!   state-runner --db save.db --config store.json --ipc-mode
//!
//! In IPC mode every stdin line is a JSON command and every reply is one
//! JSON line on stdout.

use anyhow::Result;
use idleracer_core::{
    action::Action,
    clock::SystemClock,
    config::StoreConfig,
    effects::GameEffects,
    engine::GameEngine,
    state::{ExpDomain, GameState},
    store::SaveStore,
};
use std::env;
use std::io::{self, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

#[derive(serde::Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Dispatch { action: serde_json::Value },
    Poll,
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = arg_value(&args, "--db").unwrap_or(":memory:");
    let config = match arg_value(&args, "--config") {
        Some(path) => StoreConfig::load(path)?,
        None => StoreConfig::default(),
    };

    if !ipc_mode {
        println!("Idle racer: state-runner");
        println!("  db:          {db}");
        println!("  key:         {}", config.storage_key);
        println!("  throttle_ms: {}", config.throttle_ms);
        println!();
    }

    let store = SaveStore::open(db)?;
    store.migrate()?;

    let (mut engine, outcome) =
        GameEngine::configure(&config, Box::new(store), Box::new(SystemClock));
    engine.run_effects(Box::new(GameEffects::new(config.race_seed)))?;
    engine.poll();

    if ipc_mode {
        let idle = Duration::from_millis(u64::try_from(config.throttle_ms.max(1)).unwrap_or(1));
        serve(&mut engine, spawn_stdin_reader(), &mut io::stdout(), idle)
    } else {
        println!("  snapshot:    {}", outcome.label());
        print_summary(engine.state());
        engine.shutdown();
        Ok(())
    }
}

/// Stdin is read on its own thread so the engine keeps polling through
/// quiet periods.
fn spawn_stdin_reader() -> Receiver<io::Result<String>> {
    let (tx, lines) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lines() {
            let failed = line.is_err();
            if tx.send(line).is_err() || failed {
                break;
            }
        }
    });
    lines
}

/// Run the IPC loop, then flush the engine however the loop ended.
fn serve(
    engine: &mut GameEngine,
    lines: Receiver<io::Result<String>>,
    out: &mut impl Write,
    idle: Duration,
) -> Result<()> {
    let result = run_ipc_loop(engine, lines, out, idle);
    engine.shutdown();
    result
}

/// A trailing write goes out within `idle` of coming due, input or not.
fn run_ipc_loop(
    engine: &mut GameEngine,
    lines: Receiver<io::Result<String>>,
    out: &mut impl Write,
    idle: Duration,
) -> Result<()> {
    loop {
        let line = match lines.recv_timeout(idle) {
            Ok(line) => line?,
            Err(RecvTimeoutError::Timeout) => {
                engine.poll();
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&line) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(out, "{err_json}")?;
                out.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {}
            IpcCommand::Poll => engine.poll(),
            IpcCommand::Dispatch { action } => {
                let action = Action::parse(action);
                if action == Action::Unknown {
                    log::warn!("unknown action ignored");
                }
                engine.dispatch(action);
                engine.poll();
            }
        }
        writeln!(out, "{}", serde_json::to_string(engine.state())?)?;
        out.flush()?;
    }
    Ok(())
}

fn print_summary(state: &GameState) {
    let exp = &state.experience;
    println!("=== STATE SUMMARY ===");
    println!("  version:        {}", state.version);
    println!("  money:          {:.0}", state.money);
    println!("  earned / spent: {:.0} / {:.0}", state.total_money_earned, state.total_money_spent);
    println!("  cars:           {}", state.garage.len());
    println!("  brands done:    {}", state.completed_brands());
    println!("  stars:          {}", state.stars.values().filter(|s| **s).count());
    for (label, domain, value) in [
        ("business", ExpDomain::Business, exp.business.exp),
        ("race", ExpDomain::Race, exp.race.exp),
        ("mechanic", ExpDomain::Mechanic, exp.mechanic.exp),
    ] {
        println!(
            "  {label:<9} exp:  {value:.0} ({} points free)",
            exp.available_points(domain)
        );
    }
    if state.warnings.store_reset {
        println!();
        println!("  NOTE: the previous save was too old and has been reset.");
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
