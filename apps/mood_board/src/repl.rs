//! Interactive prompt loop and terminal rendering.

use std::sync::Arc;

use anyhow::{Context, Result};
use client_core::{Notification, VoteController, VoteTally, WalletSession};
use shared::domain::Mood;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::broadcast::{self, error::RecvError},
    task::JoinSet,
};
use tracing::{debug, info, warn};

use crate::commands::{parse_command, Command, HELP};

/// Reads commands until EOF or `quit`, then waits for every vote still in
/// flight. Consumes the controller so the notification channel closes once
/// the last vote task has finished.
pub async fn run<R>(
    input: R,
    session: Arc<WalletSession>,
    controller: Arc<VoteController>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut votes = JoinSet::new();
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await.context("failed to read input")? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        match command {
            Command::Connect(identity) => session.connect(identity),
            Command::Disconnect => {
                if session.disconnect().is_none() {
                    println!("no wallet connected");
                }
            }
            Command::Vote(mood) => spawn_vote(&mut votes, &controller, mood),
            Command::Tally => print_tally(&controller.tally().await),
            Command::Board => print_board(&controller),
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
        }
    }

    if !votes.is_empty() {
        info!(outstanding = votes.len(), "waiting for outstanding votes");
    }
    while let Some(joined) = votes.join_next().await {
        if let Err(err) = joined {
            warn!(error = %err, "vote task did not complete");
        }
    }

    Ok(())
}

/// Votes run as their own tasks so the prompt stays usable while one is
/// outstanding.
fn spawn_vote(votes: &mut JoinSet<()>, controller: &Arc<VoteController>, mood: Mood) {
    let controller = Arc::clone(controller);
    votes.spawn(async move {
        if let Err(err) = controller.submit_vote(mood).await {
            debug!(mood = mood.label(), error = %err, "vote not applied");
        }
    });
}

pub async fn print_notifications(mut notifications: broadcast::Receiver<Notification>) {
    loop {
        match notifications.recv().await {
            Ok(notification) => {
                println!("» {}", notification.message());
                if let Notification::VoteSubmitted { tally, .. } = &notification {
                    print_tally(tally);
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "notification printer fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

pub fn print_board(controller: &VoteController) {
    println!("Contract ID: {}", controller.board().abbreviated());
    println!("Call target: {}", controller.call_target());
}

pub fn print_tally(tally: &VoteTally) {
    for (mood, count) in tally.iter() {
        println!("  {} {:<8} Count: {count}", mood.glyph(), mood.label());
    }
}

#[cfg(test)]
#[path = "tests/repl_tests.rs"]
mod tests;
