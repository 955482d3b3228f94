//! Signal and timer bridge
//!
//! SIGUSR1/SIGUSR2 and the once-per-second tick are handled on a small tokio
//! runtime and forwarded into the same channel the GUI drains every frame,
//! so the loop sees them as ordinary events in arrival order.

use std::sync::mpsc::Sender;
use std::time::Duration;

use tokio::runtime::Runtime;
use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::{debug, warn};

use crate::arbiter::{ControlSignal, TerminationEvent};
use crate::error::Result;
use crate::session::LoopEvent;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

pub fn runtime() -> Result<Runtime> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(1)
        .build()?;
    Ok(rt)
}

/// Install the SIGUSR1/SIGUSR2 handlers.
///
/// Signals arriving before the window exists wait in the channel.
pub fn install_signal_handlers(rt: &Runtime, tx: Sender<LoopEvent>) -> Result<()> {
    // must be registered before returning: an unhandled SIGUSR1 kills the process
    let _guard = rt.enter();
    let usr1 = signal(SignalKind::user_defined1())?;
    let usr2 = signal(SignalKind::user_defined2())?;

    rt.spawn(forward(usr1, ControlSignal::Confirm, tx.clone()));
    rt.spawn(forward(usr2, ControlSignal::Cancel, tx));
    Ok(())
}

/// Send a [`LoopEvent::Tick`] every second, the first one a second from now
pub fn start_ticker(rt: &Runtime, tx: Sender<LoopEvent>) {
    rt.spawn(async move {
        let start = tokio::time::Instant::now() + TICK_INTERVAL;
        let mut interval = tokio::time::interval_at(start, TICK_INTERVAL);
        loop {
            interval.tick().await;
            if tx.send(LoopEvent::Tick).is_err() {
                debug!("Event loop gone, stopping tick");
                break;
            }
        }
    });
}

async fn forward(mut stream: Signal, control: ControlSignal, tx: Sender<LoopEvent>) {
    while stream.recv().await.is_some() {
        debug!("Received control signal {:?}", control);
        let event = LoopEvent::Termination(TerminationEvent::SignalReceived(control));
        if tx.send(event).is_err() {
            warn!("Event loop gone, dropping {:?}", control);
            break;
        }
    }
}
