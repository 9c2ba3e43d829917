//! The countdown control loop

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, watch},
    time::{interval, sleep, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    countdown::{CloseDecision, Flow, Session, SETTLE_DELAY, TICK_INTERVAL},
    services::Confirm,
    state::{Command, Status},
};

/// Timing knobs of the loop
#[derive(Debug, Clone, Copy)]
pub struct LoopTiming {
    pub tick: Duration,
    /// Delay after which a visibility transition's close guard is released
    pub settle_delay: Duration,
}

impl Default for LoopTiming {
    fn default() -> Self {
        Self {
            tick: TICK_INTERVAL,
            settle_delay: SETTLE_DELAY,
        }
    }
}

/// Channels connecting the loop to the rest of the process
pub struct LoopChannels {
    pub commands: mpsc::Receiver<Command>,
    /// Used by the loop itself for deferred releases and prompt answers
    pub command_tx: mpsc::Sender<Command>,
    pub status_tx: watch::Sender<Status>,
}

/// Run the countdown until it reaches a terminal flow.
///
/// This task is the only owner of the session: ticks and commands are
/// handled strictly one after another, so a tick never re-enters and a
/// command never observes a half-finished tick.
pub async fn run_control_loop(
    mut session: Session,
    channels: LoopChannels,
    timing: LoopTiming,
    prompt: Arc<dyn Confirm>,
) -> Flow {
    let LoopChannels {
        mut commands,
        command_tx,
        status_tx,
    } = channels;

    info!("Starting countdown control loop");
    session.start();
    schedule_settles(&mut session, &command_tx, timing.settle_delay);
    status_tx.send_replace(session.status());

    let mut ticker = interval(timing.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let flow = tokio::select! {
            _ = ticker.tick() => session.tick(),
            Some(command) = commands.recv() => {
                handle_command(&mut session, command, &command_tx, &prompt)
            }
        };

        schedule_settles(&mut session, &command_tx, timing.settle_delay);
        status_tx.send_replace(session.status());

        if flow.is_terminal() {
            info!("Control loop finished: {:?}", flow);
            return flow;
        }
    }
}

fn handle_command(
    session: &mut Session,
    command: Command,
    command_tx: &mpsc::Sender<Command>,
    prompt: &Arc<dyn Confirm>,
) -> Flow {
    debug!("Handling command: {:?}", command);

    match command {
        Command::Hide => {
            session.hide();
            Flow::Continue
        }
        Command::Show => {
            session.show();
            Flow::Continue
        }
        Command::RestartTimer => {
            session.restart_timer();
            Flow::Continue
        }
        Command::RestartApplication => session.restart_application(),
        Command::Close { reply } => {
            let decision = session.request_close();
            if decision == CloseDecision::AskUser {
                open_prompt(session.close_question(), command_tx, prompt);
            }
            if let Some(reply) = reply {
                let _ = reply.send(decision);
            }
            Flow::Continue
        }
        Command::CloseAnswered(confirmed) => session.resolve_close(confirmed),
        Command::Settled(token) => {
            session.settle(token);
            Flow::Continue
        }
    }
}

/// Ask for confirmation without blocking the loop; the answer comes back as
/// a command
fn open_prompt(question: String, command_tx: &mpsc::Sender<Command>, prompt: &Arc<dyn Confirm>) {
    let answer = prompt.confirm(question);
    let tx = command_tx.clone();
    tokio::spawn(async move {
        let confirmed = answer.await;
        if tx.send(Command::CloseAnswered(confirmed)).await.is_err() {
            debug!("Control loop finished before the prompt was answered");
        }
    });
}

/// Release each new transition guard after the platform had time to process
/// the change
fn schedule_settles(session: &mut Session, command_tx: &mpsc::Sender<Command>, delay: Duration) {
    for token in session.take_unsettled() {
        let tx = command_tx.clone();
        tokio::spawn(async move {
            sleep(delay).await;
            if tx.send(Command::Settled(token)).await.is_err() {
                warn!("Control loop gone before transition {} settled", token.id());
            }
        });
    }
}
