use crate::application::AppId;
use std::time::Duration;

/// Errors surfaced by the shell core.
///
/// Conditions the core can absorb (switching to the app that is already
/// active, scrolling past the first or last page) are logged and never show
/// up here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShellError {
	/// The id was never handed out by `LifecycleManager::install`.
	#[error("no application installed with id {id}")]
	UnknownApp { id: AppId },
	/// A lock could not be taken within its bounded wait. The UI thread is
	/// starved or deadlocked; the affected operation must not continue.
	#[error("timed out after {waited:?} waiting for the {resource} lock")]
	LockTimeout {
		resource: &'static str,
		waited: Duration,
	},
}

impl ShellError {
	pub fn is_fatal(&self) -> bool {
		matches!(self, ShellError::LockTimeout { .. })
	}
}

pub type Result<T, E = ShellError> = std::result::Result<T, E>;
