//! Plain-console reporting for NO_TUI runs.

use crate::app::{App, CycleOutcome};
use crate::common::progress::{Direction, StageObserver, StageResult};
use crate::region::ResolvedLocator;
use anyhow::Result;
use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};

/// One rendered stage line.
pub fn stage_line(result: &StageResult) -> String {
    let mark = if result.ok {
        style("✓").green().bold().to_string()
    } else {
        style("✗").red().bold().to_string()
    };
    match &result.detail {
        Some(detail) => format!("{mark} {}: {detail}", result.stage.label()),
        None => format!("{mark} {}", result.stage.label()),
    }
}

/// Prints each stage as the engine reports it.
struct PrintObserver;

impl StageObserver for PrintObserver {
    fn stage(&self, result: &StageResult) {
        println!("{}", stage_line(result));
    }
}

/// Line-oriented menu loop: resolve, print the menu, read a command.
pub async fn run_console(app: &App) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let locator = app.resolve().await;
        print_menu(app, &locator);

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let direction = match line.trim().to_lowercase().as_str() {
            "d" | "dump" => Direction::Dump,
            "r" | "restore" => Direction::Restore,
            "q" | "quit" | "exit" => break,
            "" => continue,
            other => {
                println!("Unknown command: {other}");
                continue;
            }
        };

        if !locator.is_resolved() {
            println!(
                "{}",
                style("No region resolved; transfer blocked.").yellow()
            );
            continue;
        }

        run_cycle(app, direction).await;
    }

    Ok(())
}

async fn run_cycle(app: &App, direction: Direction) {
    println!("Beginning theme data {}...", direction.label());

    match app.run_trigger(direction, &PrintObserver).await {
        CycleOutcome::Blocked => {
            println!(
                "{}",
                style("No region resolved; transfer blocked.").yellow()
            );
        }
        CycleOutcome::Ran(outcome) => {
            if outcome.succeeded() {
                println!(
                    "{}",
                    style(format!(
                        "Theme file {} finished successfully.",
                        outcome.direction.label()
                    ))
                    .green()
                );
            } else {
                println!(
                    "{}",
                    style(format!("Theme file {} failed.", outcome.direction.label())).red()
                );
            }
        }
    }

    println!("----------------------------------------");
    tokio::time::sleep(app.pause()).await;
}

fn print_menu(app: &App, locator: &ResolvedLocator) {
    println!();
    println!("themevault (v{})", env!("CARGO_PKG_VERSION"));
    println!("-----------------------------------------------------------");

    match locator.entry() {
        Some(entry) => {
            println!("Region detected by system menu: {}", entry.region);
            println!("Theme file: {}", entry.asset_name());
            if app.config().tui.show_hints {
                println!("Commands: [d]ump  [r]estore  [q]uit");
            }
        }
        None => {
            println!(
                "{}",
                style("Error: system menu is not correctly installed!").red()
            );
            println!("Reinstall the system menu and try again.");
            println!("Commands: [q]uit");
        }
    }
}
