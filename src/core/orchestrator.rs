/*
 * Runs the per-file state machine for a dropped file:
 *
 *   Pending -> Classified -> DestinationResolved -> (Skipped | Invoked) -> Completed
 *
 * `ConversionOrchestrator::process_file` never returns an error. Every failure,
 * including a panic inside the tool runner, is folded into the returned
 * `ConversionOutcome` so one bad file cannot abort the batch it belongs to.
 */
use super::classifier;
use super::models::{
    Action, ConversionOutcome, FileError, OptionFlags, OutcomeStatus, TextureFormats,
};
use super::path_policy::{self, DestinationLocks, OverwriteConfirmer};
use super::tool_runner::{ToolRunnerOperations, ToolSet};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/*
 * A fully built command line for one external tool run.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub executable: PathBuf,
    pub args: Vec<String>,
}

/*
 * The single place mapping an `Action` to its command line. `destination` must be
 * `Some` for the two converting actions; the orchestrator guarantees this through
 * `path_policy::resolve_destination`.
 */
pub fn build_invocation(
    action: Action,
    source: &Path,
    destination: Option<&Path>,
    tools: &ToolSet,
) -> Option<ToolInvocation> {
    let src = source.to_string_lossy().into_owned();
    let invocation = match (action, destination) {
        (Action::ConvertToTexture { add_stats }, Some(dst)) => {
            let mut args = vec![src, "-otex".to_string(), dst.to_string_lossy().into_owned()];
            if add_stats {
                args.push("--runstats".to_string());
            }
            ToolInvocation {
                executable: tools.encoder.clone(),
                args,
            }
        }
        (Action::ConvertTextureToRaster, Some(dst)) => ToolInvocation {
            executable: tools.encoder.clone(),
            args: vec![src, "-o".to_string(), dst.to_string_lossy().into_owned()],
        },
        (Action::InspectTexture, _) => ToolInvocation {
            executable: tools.inspector.clone(),
            args: vec!["-v".to_string(), src],
        },
        (_, None) => return None,
    };
    Some(invocation)
}

pub struct ConversionOrchestrator {
    tools: ToolSet,
    formats: TextureFormats,
    runner: Arc<dyn ToolRunnerOperations>,
    confirmer: Arc<dyn OverwriteConfirmer>,
}

impl ConversionOrchestrator {
    pub fn new(
        tools: ToolSet,
        formats: TextureFormats,
        runner: Arc<dyn ToolRunnerOperations>,
        confirmer: Arc<dyn OverwriteConfirmer>,
    ) -> Self {
        ConversionOrchestrator {
            tools,
            formats,
            runner,
            confirmer,
        }
    }

    /*
     * Processes one dropped file to a terminal outcome. `flags` is the snapshot taken
     * for the drop event and `locks` the destination locks shared by every file of that
     * event.
     */
    pub fn process_file(
        &self,
        source: &Path,
        flags: OptionFlags,
        locks: &DestinationLocks,
    ) -> ConversionOutcome {
        let result =
            panic::catch_unwind(AssertUnwindSafe(|| self.run_state_machine(source, flags, locks)));
        match result {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                log::error!("Orchestrator: Processing {source:?} panicked: {message}");
                ConversionOutcome::failed(source, None, FileError::Internal(message))
            }
        }
    }

    fn run_state_machine(
        &self,
        source: &Path,
        flags: OptionFlags,
        locks: &DestinationLocks,
    ) -> ConversionOutcome {
        // Pending
        if !source.exists() {
            log::warn!("Orchestrator: Dropped file {source:?} does not exist.");
            return ConversionOutcome::failed(
                source,
                None,
                FileError::NotFound(source.to_path_buf()),
            );
        }

        // Classified
        let action = classifier::classify(source, flags, &self.formats);

        // DestinationResolved
        let destination = path_policy::resolve_destination(source, action, &self.formats);
        // Held until the tool exits; a later file with the same destination is asked
        // about the file this one writes.
        let destination_lock = destination.as_deref().map(|dst| locks.lock_for(dst));
        let _held = destination_lock.as_ref().map(|lock| match lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        });
        if let Some(dst) = &destination {
            if !path_policy::should_proceed(dst, self.confirmer.as_ref()) {
                log::info!("Orchestrator: User canceled overwrite of {dst:?}.");
                return ConversionOutcome {
                    source_path: source.to_path_buf(),
                    action: Some(action),
                    destination_path: destination,
                    standard_output: String::new(),
                    standard_error: None,
                    status: OutcomeStatus::Skipped,
                };
            }
        }

        // Invoked
        let Some(invocation) =
            build_invocation(action, source, destination.as_deref(), &self.tools)
        else {
            return ConversionOutcome::failed(
                source,
                Some(action),
                FileError::Internal(format!("no destination resolved for {action:?}")),
            );
        };
        log::info!(
            "Orchestrator: {action:?} on {source:?} via {:?}",
            invocation.executable
        );

        // Completed
        match self.runner.run(&invocation.executable, &invocation.args) {
            Ok(output) => ConversionOutcome {
                source_path: source.to_path_buf(),
                action: Some(action),
                destination_path: destination,
                standard_output: output.stdout,
                standard_error: Some(output.stderr).filter(|s| !s.is_empty()),
                status: OutcomeStatus::Completed,
            },
            Err(e) => ConversionOutcome::failed(
                source,
                Some(action),
                FileError::ToolLaunch {
                    executable: invocation.executable,
                    message: e.to_string(),
                },
            ),
        }
    }
}
