use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use ftl_host::{Credential, HostConfig, PublishedEvent, Response, Runtime};
use ftl_ledger::Operation;
use ftl_store::{InMemoryKvStore, Snapshot};
use ftl_types::LedgerEvent;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let runtime = open_runtime(&cli.state, config)?;

    match cli.command {
        Command::Init(args) => {
            let response =
                runtime.instantiate(Credential::Anonymous, Operation::INIT, &[args.owner]);
            finish(&runtime, &cli.state, &cli.format, Operation::INIT, response)
        }
        Command::TotalSupply => query(&runtime, &cli.format, Operation::TOTAL_SUPPLY, &[]),
        Command::BalanceOf(args) => {
            query(&runtime, &cli.format, Operation::BALANCE_OF, &[args.account])
        }
        Command::Allowance(args) => query(
            &runtime,
            &cli.format,
            Operation::ALLOWANCE,
            &[args.owner, args.spender],
        ),
        Command::Transfer(args) => {
            let response = runtime.invoke(
                credential(&args.caller),
                Operation::TRANSFER,
                &[args.to, args.value],
            );
            finish(&runtime, &cli.state, &cli.format, Operation::TRANSFER, response)
        }
        Command::Approve(args) => {
            let response = runtime.invoke(
                credential(&args.caller),
                Operation::APPROVE,
                &[args.spender, args.value],
            );
            finish(&runtime, &cli.state, &cli.format, Operation::APPROVE, response)
        }
        Command::TransferFrom(args) => {
            let response = runtime.invoke(
                credential(&args.caller),
                Operation::TRANSFER_FROM,
                &[args.from, args.to, args.value],
            );
            finish(&runtime, &cli.state, &cli.format, Operation::TRANSFER_FROM, response)
        }
        Command::Invoke(args) => {
            let caller = credential(&args.caller);
            let response = if args.instantiate {
                runtime.instantiate(caller, &args.name, args.args.as_slice())
            } else {
                runtime.invoke(caller, &args.name, args.args.as_slice())
            };
            finish(&runtime, &cli.state, &cli.format, &args.name, response)
        }
        Command::Holders => cmd_holders(&runtime, &cli.format),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<HostConfig> {
    match path {
        Some(path) => HostConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(HostConfig::default()),
    }
}

fn open_runtime(state: &Path, config: HostConfig) -> anyhow::Result<Runtime<InMemoryKvStore>> {
    let snapshot = Snapshot::load_or_empty(state)
        .with_context(|| format!("reading ledger state {}", state.display()))?;
    debug!(path = %state.display(), entries = snapshot.entries.len(), "ledger state loaded");
    Ok(Runtime::new(snapshot.restore(), config))
}

fn credential(args: &CallerArgs) -> Credential {
    match (&args.subject, &args.caller) {
        (Some(subject), _) => Credential::certificate(subject.as_str()),
        (None, Some(caller)) => Credential::principal(caller.as_str()),
        (None, None) => Credential::Anonymous,
    }
}

fn query(
    runtime: &Runtime<InMemoryKvStore>,
    format: &OutputFormat,
    name: &str,
    args: &[String],
) -> anyhow::Result<()> {
    let response = runtime.invoke(Credential::Anonymous, name, args);
    render(format, name, &response, &[])?;
    ensure_ok(name, &response)
}

/// Print the outcome of a call and persist the ledger if it changed state.
fn finish(
    runtime: &Runtime<InMemoryKvStore>,
    state: &Path,
    format: &OutputFormat,
    name: &str,
    response: Response,
) -> anyhow::Result<()> {
    // Every state change emits at least one event.
    let events = runtime.bus().history();
    if response.is_ok() && !events.is_empty() {
        Snapshot::capture(runtime.store())
            .and_then(|snapshot| snapshot.save(state))
            .with_context(|| format!("writing ledger state {}", state.display()))?;
    }
    render(format, name, &response, &events)?;
    ensure_ok(name, &response)
}

fn ensure_ok(name: &str, response: &Response) -> anyhow::Result<()> {
    if response.is_ok() {
        return Ok(());
    }
    anyhow::bail!(
        "{name} failed: [{}] {}",
        response.code.as_deref().unwrap_or("Error"),
        response.message
    )
}

fn render(
    format: &OutputFormat,
    name: &str,
    response: &Response,
    events: &[PublishedEvent],
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let events: Vec<serde_json::Value> = events
                .iter()
                .map(|e| {
                    let payload = serde_json::from_slice(&e.payload)
                        .unwrap_or(serde_json::Value::Null);
                    serde_json::json!({ "seq": e.seq, "name": e.name, "payload": payload })
                })
                .collect();
            let out = serde_json::json!({
                "operation": name,
                "response": response,
                "events": events,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text if response.is_ok() => {
            match response.payload_str() {
                Some(value) if !value.is_empty() && value != "true" => {
                    println!("{}", value.bold())
                }
                _ => println!("{} {}", "✓".green().bold(), name.bold()),
            }
            for event in events {
                match event.decode() {
                    Ok(decoded) => print_event(event.seq, &decoded),
                    Err(_) => println!("  {} {}", "event".dimmed(), event.name.yellow()),
                }
            }
        }
        // Failures surface through the returned error.
        OutputFormat::Text => {}
    }
    Ok(())
}

fn print_event(seq: u64, event: &LedgerEvent) {
    let from = match event {
        LedgerEvent::Transfer(t) if t.from.is_mint() => "(mint)".to_string(),
        LedgerEvent::Transfer(t) => t.from.to_string(),
        LedgerEvent::Approval(a) => a.owner.to_string(),
    };
    let (to, value) = match event {
        LedgerEvent::Transfer(t) => (t.to.to_string(), t.value),
        LedgerEvent::Approval(a) => (a.spender.to_string(), a.value),
    };
    println!(
        "  {} {} {} -> {}: {}",
        format!("#{seq}").dimmed(),
        event.name().as_str().cyan(),
        from.yellow(),
        to.yellow(),
        value.to_string().bold()
    );
}

fn cmd_holders(runtime: &Runtime<InMemoryKvStore>, format: &OutputFormat) -> anyhow::Result<()> {
    let holders = runtime.holders()?;
    match format {
        OutputFormat::Json => {
            let out: Vec<serde_json::Value> = holders
                .iter()
                .map(|(account, balance)| {
                    serde_json::json!({ "account": account, "balance": balance })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            if holders.is_empty() {
                println!("No balances recorded.");
            }
            for (account, balance) in &holders {
                println!("{:<24} {}", account.as_str().yellow(), balance.to_string().bold());
            }
        }
    }
    Ok(())
}
