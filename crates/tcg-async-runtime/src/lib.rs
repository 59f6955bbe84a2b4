use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::mpsc;

mod handlers;
mod worker;

pub use worker::worker_task;

// Re-export types from library crates
pub use tcg_layout::{
    CancelFlag, ExportReport, ImagePayload, LayoutMode, LayoutOptions, LibraryIndex,
};

/// Commands sent from a front end to the worker
#[derive(Debug)]
pub enum SessionCommand {
    AddImage {
        payload: ImagePayload,
    },
    LoadImage {
        path: PathBuf,
    },
    Assign {
        slot: usize,
        library_index: LibraryIndex,
    },
    Clear {
        slot: usize,
    },
    Reset,
    Export {
        options: LayoutOptions,
        mode: LayoutMode,
        output_path: PathBuf,
        cancel: CancelFlag,
    },
}

/// Updates sent from the worker to a front end
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    ImageAdded {
        index: LibraryIndex,
    },
    SlotChanged {
        slot: usize,
        library_index: Option<LibraryIndex>,
    },
    SessionReset,
    Progress {
        operation: String,
        current: usize,
        total: usize,
    },
    ExportComplete {
        path: PathBuf,
        report: ExportReport,
    },
    Warning {
        message: String,
    },
    Error {
        message: String,
    },
}

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Session worker has shut down")]
    WorkerGone,
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Sending half of a running session worker
#[derive(Debug, Clone)]
pub struct SessionHandle {
    command_tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    pub fn new(command_tx: mpsc::UnboundedSender<SessionCommand>) -> Self {
        Self { command_tx }
    }

    pub fn send(&self, command: SessionCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| RuntimeError::WorkerGone)
    }

    pub fn add_image(&self, payload: ImagePayload) -> Result<()> {
        self.send(SessionCommand::AddImage { payload })
    }

    pub fn load_image(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.send(SessionCommand::LoadImage { path: path.into() })
    }

    pub fn assign(&self, slot: usize, library_index: LibraryIndex) -> Result<()> {
        self.send(SessionCommand::Assign {
            slot,
            library_index,
        })
    }

    pub fn clear(&self, slot: usize) -> Result<()> {
        self.send(SessionCommand::Clear { slot })
    }

    pub fn reset(&self) -> Result<()> {
        self.send(SessionCommand::Reset)
    }

    /// Queue an export and return the flag that cancels it
    pub fn export(
        &self,
        options: LayoutOptions,
        mode: LayoutMode,
        output_path: impl Into<PathBuf>,
    ) -> Result<CancelFlag> {
        let cancel = CancelFlag::new();
        self.send(SessionCommand::Export {
            options,
            mode,
            output_path: output_path.into(),
            cancel: cancel.clone(),
        })?;
        Ok(cancel)
    }
}

/// Start a worker on the current tokio runtime.
///
/// The worker runs until every `SessionHandle` clone has been dropped.
pub fn spawn_session() -> (SessionHandle, mpsc::UnboundedReceiver<SessionUpdate>) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, update_rx) = mpsc::unbounded_channel();
    tokio::spawn(worker_task(command_rx, update_tx));
    (SessionHandle::new(command_tx), update_rx)
}
