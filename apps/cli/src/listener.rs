//! File-dropbox intake listener.
//!
//! A background thread polls the pipeline inbox for a learning-sets payload
//! and deposits it in the controller's mailbox. The transport that places the
//! file there (REST gateway, scp, a test harness) is someone else's concern.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};
use tungsten_core::Mailbox;
use tungsten_training::LearningSets;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Spawns the listener thread. It runs for the life of the process.
pub fn spawn(mailbox: Arc<Mailbox<LearningSets>>, inbox: PathBuf) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        info!(inbox = %inbox.display(), "intake listener armed");
        loop {
            if inbox.exists() {
                match read_payload(&inbox) {
                    Ok(sets) => {
                        if let Err(e) = mailbox.deliver(sets) {
                            warn!(error = %e, "delivery rejected, dropping payload");
                        } else {
                            info!("learning sets delivered to controller");
                        }
                    }
                    Err(e) => error!(error = %e, "discarding malformed inbox payload"),
                }
                if let Err(e) = std::fs::remove_file(&inbox) {
                    error!(error = %e, "failed to clear inbox");
                }
            }
            thread::sleep(POLL_INTERVAL);
        }
    })
}

fn read_payload(path: &std::path::Path) -> anyhow::Result<LearningSets> {
    let json = std::fs::read_to_string(path)?;
    let sets: LearningSets = serde_json::from_str(&json)?;
    sets.validate()?;
    Ok(sets)
}
