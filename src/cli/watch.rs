use std::time::Duration;

use anyhow::Result;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    store::{checklist::Checklist, state_storage::StateStorage},
    utils::clock::Clock as _,
};

use super::render::print_checklist;

/// How often an open session re-checks whether the calendar day advanced.
const ROLLOVER_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Keeps the checklist on screen until ctrl-c, clearing the done flags and
/// re-rendering when the date rolls over mid-session.
pub async fn run_watch<S: StateStorage>(mut checklist: Checklist<S>) -> Result<()> {
    print_checklist(checklist.state(), checklist.clock().time());

    let shutdown = CancellationToken::new();
    tokio::spawn(detect_shutdown(shutdown.clone()));

    loop {
        select! {
            // Cancelation means the session is over; nothing needs flushing
            // because every mutation already persisted itself.
            _ = shutdown.cancelled() => return Ok(()),
            _ = checklist.clock().sleep(ROLLOVER_CHECK_INTERVAL) => ()
        }

        if checklist.reset_if_new_day().await {
            info!("Date rolled over, cleared done flags");
            print_checklist(checklist.state(), checklist.clock().time());
        }
    }
}

async fn detect_shutdown(cancelation: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        cancelation.cancel();
    }
}
