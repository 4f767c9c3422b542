use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use tokio_util::sync::CancellationToken;

use hoard_pin::PinMode;
use hoard_types::Cid;

use crate::cli::*;
use crate::repo::Repo;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Init => cmd_init(&cli.repo),
        Command::Add(args) => cmd_add(&Repo::open(&cli.repo)?, args).await,
        Command::Pin(args) => cmd_pin(&Repo::open(&cli.repo)?, args).await,
        Command::Gc(args) => cmd_gc(&Repo::open(&cli.repo)?, args).await,
        Command::Stat => cmd_stat(&Repo::open(&cli.repo)?),
    }
}

fn cmd_init(path: &Path) -> anyhow::Result<()> {
    Repo::init(path)?;
    println!("{} Initialized hoard repository in {}", "✓".green().bold(), path.display().to_string().bold());
    Ok(())
}

async fn cmd_add(repo: &Repo, args: AddArgs) -> anyhow::Result<()> {
    let data = fs::read(&args.path).with_context(|| format!("reading {}", args.path.display()))?;
    let pin = args.should_pin();
    let cid = repo.add(&data, pin).await?;
    let note = if pin { "pinned".green() } else { "unpinned".yellow() };
    println!("{} {} ({}, {} bytes)", "added".green(), cid.to_string().cyan(), note, data.len());
    Ok(())
}

async fn cmd_pin(repo: &Repo, args: PinArgs) -> anyhow::Result<()> {
    match args.action {
        PinAction::Add { cid, direct } => {
            let cid = parse_cid(&cid)?;
            let mode = if direct { PinMode::Direct } else { PinMode::Recursive };
            repo.pin(cid, mode).await?;
            println!("{} pinned {} ({})", "✓".green(), cid.to_string().cyan(), mode);
        }
        PinAction::Rm { cid } => {
            let cid = parse_cid(&cid)?;
            let mode = repo.unpin(&cid).await?;
            println!("{} unpinned {} (was {})", "✓".green(), cid.to_string().cyan(), mode);
        }
        PinAction::Ls => {
            let pins = repo.pins()?;
            if pins.is_empty() {
                println!("No pins.");
            }
            for (cid, mode) in pins {
                println!("{} {}", cid.to_string().cyan(), mode.to_string().dimmed());
            }
        }
    }
    Ok(())
}

async fn cmd_gc(repo: &Repo, args: GcArgs) -> anyhow::Result<()> {
    let best_effort = args
        .best_effort
        .iter()
        .map(|s| parse_cid(s))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let token = CancellationToken::new();
    let interrupt = {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        })
    };

    let mut stream = repo
        .collector()
        .collect(token.clone(), &best_effort)
        .await
        .context("garbage collection aborted before deleting anything")?;

    let mut removed = 0usize;
    let mut failure = None;
    while let Some(item) = stream.next().await {
        match item {
            Ok(key) => {
                removed += 1;
                if !args.quiet {
                    println!("removed {}", key.to_string().dimmed());
                }
            }
            Err(e) => failure = Some(e),
        }
    }
    interrupt.abort();

    if let Some(e) = failure {
        return Err(e).with_context(|| format!("garbage collection stopped after removing {removed} blocks"));
    }
    if token.is_cancelled() {
        println!("{} GC cancelled: {} blocks removed.", "!".yellow().bold(), removed);
    } else {
        println!("{} GC: {} blocks removed.", "✓".green(), removed);
    }
    Ok(())
}

fn cmd_stat(repo: &Repo) -> anyhow::Result<()> {
    let stat = repo.stat()?;
    println!("Blocks: {}", stat.blocks.to_string().bold());
    println!("Pins:   {} recursive, {} direct", stat.recursive_pins, stat.direct_pins);
    Ok(())
}

fn parse_cid(s: &str) -> anyhow::Result<Cid> {
    s.parse::<Cid>().with_context(|| format!("invalid cid '{s}'"))
}
