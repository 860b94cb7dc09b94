use crate::command::{CommandId, Status};
use crate::notebook::{reduce, Effect, Focus, Intent, NotebookState};
use crate::runner::{CompletionReceiver, RunDispatcher, ShellRunner};
use crate::store::{Store, StoreError};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("command log unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("saved command {0} missing from the reloaded log")]
    Vanished(CommandId),
}

/// Whether the event loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The main entry point for the notebook core.
/// The UI holds one instance of this and feeds it every intent, including
/// run completions read from the receiver returned by [`NotebookEngine::start`].
#[derive(Debug)]
pub struct NotebookEngine {
    store: Store,
    state: NotebookState,
    dispatcher: RunDispatcher,
}

impl NotebookEngine {
    /// Recover interrupted runs, load the log, and build the initial state.
    pub fn start(store: Store, runner: ShellRunner) -> Result<(Self, CompletionReceiver), EngineError> {
        let recovered = store.recover_interrupted()?;
        if recovered > 0 {
            tracing::warn!(recovered, "marked runs interrupted by a previous session as failed");
        }

        let commands = store.load()?;
        tracing::info!(count = commands.len(), shell = runner.program(), "notebook loaded");

        let (dispatcher, completions) = RunDispatcher::new(runner);
        let engine = Self {
            store,
            state: NotebookState::new(commands),
            dispatcher,
        };
        Ok((engine, completions))
    }

    pub fn state(&self) -> &NotebookState {
        &self.state
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Feed one intent through the reducer and carry out its effects.
    /// Runs are spawned onto the current tokio runtime.
    pub fn dispatch(&mut self, intent: Intent) -> Result<Flow, EngineError> {
        let effects = reduce(&mut self.state, intent);

        let mut flow = Flow::Continue;
        for effect in effects {
            if self.apply(effect)? == Flow::Quit {
                flow = Flow::Quit;
            }
        }
        Ok(flow)
    }

    fn apply(&mut self, effect: Effect) -> Result<Flow, EngineError> {
        match effect {
            Effect::Save { record, focus, run } => {
                let (id, commands) = self.store.save_and_reload(&record)?;
                self.state.refresh(commands, focus, id);
                tracing::info!(id, run, "command saved");

                if run {
                    self.start_run(id, focus)?;
                }
                Ok(Flow::Continue)
            }

            Effect::RecordOutcome {
                id,
                status,
                return_code,
            } => {
                let commands = self.store.set_status_and_reload(id, status, return_code)?;
                self.state.reload(commands);
                tracing::info!(id, status = status.as_str(), return_code, "run outcome recorded");
                Ok(Flow::Continue)
            }

            Effect::Quit => Ok(Flow::Quit),
        }
    }

    fn start_run(&mut self, id: CommandId, focus: Focus) -> Result<(), EngineError> {
        let commands = self.store.set_status_and_reload(id, Status::Running, 0)?;
        self.state.refresh(commands, focus, id);

        let text = self
            .state
            .position_of(id)
            .map(|idx| self.state.commands()[idx].text.clone())
            .ok_or(EngineError::Vanished(id))?;

        tracing::info!(id, "run dispatched");
        self.dispatcher.dispatch(id, text);
        Ok(())
    }
}
