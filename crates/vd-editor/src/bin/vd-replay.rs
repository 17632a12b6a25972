//! Replay a scripted input session and print the final snapshot as JSON.
//!
//! ```text
//! vd-replay session.json
//! vd-replay - < session.json
//! ```
//!
//! Set `RUST_LOG=debug` to trace mode transitions and history operations.

use std::io::Read;
use std::process::ExitCode;

fn read_input(arg: Option<String>) -> std::io::Result<String> {
    match arg.as_deref() {
        None | Some("-") => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
        Some(path) => std::fs::read_to_string(path),
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let text = match read_input(std::env::args().nth(1)) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("vd-replay: {e}");
            return ExitCode::FAILURE;
        }
    };
    let snapshot = match vd_editor::replay::replay_snapshot(&text) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("vd-replay: {e}");
            return ExitCode::FAILURE;
        }
    };
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("vd-replay: {e}");
            ExitCode::FAILURE
        }
    }
}
