use crate::handlers;
use crate::{SessionCommand, SessionUpdate};
use tcg_layout::LayoutSession;
use tokio::sync::mpsc;

/// Async worker task that owns a layout session and applies commands in order
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<SessionCommand>,
    update_tx: mpsc::UnboundedSender<SessionUpdate>,
) {
    let mut session = LayoutSession::new();

    while let Some(cmd) = command_rx.recv().await {
        process_command(cmd, &mut session, &update_tx).await;
    }

    log::debug!("Session worker stopped");
}

async fn process_command(
    cmd: SessionCommand,
    session: &mut LayoutSession,
    update_tx: &mpsc::UnboundedSender<SessionUpdate>,
) {
    match cmd {
        SessionCommand::AddImage { payload } => {
            handlers::handle_add_image(payload, session, update_tx);
        }
        SessionCommand::LoadImage { path } => {
            handlers::handle_load_image(path, session, update_tx).await;
        }
        SessionCommand::Assign {
            slot,
            library_index,
        } => {
            handlers::handle_assign(slot, library_index, session, update_tx);
        }
        SessionCommand::Clear { slot } => {
            handlers::handle_clear(slot, session, update_tx);
        }
        SessionCommand::Reset => {
            session.reset();
            let _ = update_tx.send(SessionUpdate::SessionReset);
        }
        SessionCommand::Export {
            options,
            mode,
            output_path,
            cancel,
        } => {
            // Export works on a frozen copy; later commands wait for it
            let snapshot = session.snapshot();
            handlers::handle_export(snapshot, options, mode, output_path, cancel, update_tx)
                .await;
        }
    }
}
