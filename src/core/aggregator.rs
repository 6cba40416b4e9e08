/*
 * Folds the per-file outcomes of one drop event into a `BatchSummary`. The aggregator
 * is the only writer of the summary it builds; in the concurrent model outcomes reach
 * it through a channel drained on a single thread, so no locking happens here.
 */
use super::models::{ConversionOutcome, OutcomeStatus};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub processed_paths: Vec<String>,
    pub error_messages: Vec<String>,
    // Destinations the user chose not to overwrite. Not errors, not processed.
    pub declined_paths: Vec<String>,
    pub console_lines: Vec<String>,
    pub progress_fraction: f64,
    pub total_files: usize,
    pub completed_files: usize,
}

impl BatchSummary {
    pub fn is_complete(&self) -> bool {
        self.completed_files >= self.total_files
    }

    /*
     * Renders the status panel text shown after a drop: processed count and list (or
     * "No processed files"), then the declined and error sections when present.
     */
    pub fn status_text(&self) -> String {
        let mut text = String::new();
        if self.processed_paths.is_empty() {
            text.push_str("No processed files\n\n");
        } else {
            text.push_str(&format!(
                "Number of processed files: {}\n\n",
                self.processed_paths.len()
            ));
            text.push_str("Processed files:\n");
            text.push_str(&self.processed_paths.join("\n"));
        }

        if !self.declined_paths.is_empty() {
            text.push_str("\n\nSkipped (overwrite declined):\n");
            text.push_str(&self.declined_paths.join("\n"));
        }

        if !self.error_messages.is_empty() {
            text.push_str("\n\nErrors:\n");
            text.push_str(&self.error_messages.join("\n"));
        }
        text
    }

    pub fn console_text(&self) -> String {
        self.console_lines.join("\n")
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[derive(Debug)]
pub struct BatchAggregator {
    summary: BatchSummary,
}

impl BatchAggregator {
    pub fn new(total_files: usize) -> Self {
        BatchAggregator {
            summary: BatchSummary {
                total_files,
                ..BatchSummary::default()
            },
        }
    }

    pub fn summary(&self) -> &BatchSummary {
        &self.summary
    }

    /*
     * Records one terminal outcome and returns the updated progress fraction.
     * Declined overwrites advance progress like any other file but land in
     * `declined_paths` rather than in the processed or error lists.
     */
    pub fn fold(&mut self, outcome: &ConversionOutcome) -> f64 {
        let summary = &mut self.summary;
        match &outcome.status {
            OutcomeStatus::Completed => {
                if let Some(path) = outcome.processed_path() {
                    summary.processed_paths.push(display(path));
                }
                if let Some(stderr) = outcome.standard_error.as_deref() {
                    summary.error_messages.push(stderr.to_string());
                }
            }
            OutcomeStatus::Skipped => {
                let declined = outcome
                    .destination_path
                    .as_deref()
                    .unwrap_or(outcome.source_path.as_path());
                summary.declined_paths.push(display(declined));
            }
            OutcomeStatus::Failed(error) => {
                summary.error_messages.push(error.to_string());
            }
        }

        if !outcome.standard_output.is_empty() {
            summary.console_lines.push(outcome.standard_output.clone());
        }
        summary.console_lines.push(format!(
            "File {} has been processed.",
            outcome.source_path.display()
        ));

        summary.completed_files += 1;
        summary.progress_fraction = if summary.total_files == 0 {
            1.0
        } else {
            (summary.completed_files as f64 / summary.total_files as f64).min(1.0)
        };
        log::debug!(
            "BatchAggregator: {}/{} files accounted for.",
            summary.completed_files,
            summary.total_files
        );
        summary.progress_fraction
    }

    // Consumes the aggregator; progress is reset to zero for display.
    pub fn finalize(mut self) -> BatchSummary {
        if !self.summary.is_complete() {
            log::warn!(
                "BatchAggregator: Finalizing with {}/{} outcomes.",
                self.summary.completed_files,
                self.summary.total_files
            );
        }
        self.summary.progress_fraction = 0.0;
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Action, FileError};
    use std::path::PathBuf;

    fn completed(
        src: &str,
        dst: Option<&str>,
        stdout: &str,
        stderr: Option<&str>,
    ) -> ConversionOutcome {
        ConversionOutcome {
            source_path: PathBuf::from(src),
            action: Some(Action::InspectTexture),
            destination_path: dst.map(PathBuf::from),
            standard_output: stdout.to_string(),
            standard_error: stderr.map(str::to_string),
            status: OutcomeStatus::Completed,
        }
    }

    #[test]
    fn test_fold_completed_records_destination_and_console() {
        let mut agg = BatchAggregator::new(2);
        let progress = agg.fold(&completed("photo.png", Some("photo.tx"), "", None));
        assert_eq!(progress, 0.5);

        let summary = agg.summary();
        assert_eq!(summary.processed_paths, vec!["photo.tx"]);
        assert!(summary.error_messages.is_empty());
        assert_eq!(summary.console_lines, vec!["File photo.png has been processed."]);
    }

    #[test]
    fn test_fold_inspect_records_source_and_stdout() {
        let mut agg = BatchAggregator::new(1);
        agg.fold(&completed("tile.tx", None, "tile.tx : 512 x 512", None));
        let summary = agg.finalize();
        assert_eq!(summary.processed_paths, vec!["tile.tx"]);
        assert_eq!(
            summary.console_lines,
            vec!["tile.tx : 512 x 512", "File tile.tx has been processed."]
        );
        assert_eq!(summary.progress_fraction, 0.0);
    }

    #[test]
    fn test_tool_reported_error_is_listed_but_file_still_processed() {
        let mut agg = BatchAggregator::new(1);
        agg.fold(&completed("a.png", Some("a.tx"), "", Some("oiiotool ERROR: bad")));
        let summary = agg.finalize();
        assert_eq!(summary.processed_paths, vec!["a.tx"]);
        assert_eq!(summary.error_messages, vec!["oiiotool ERROR: bad"]);
    }

    #[test]
    fn test_skipped_is_declined_not_error() {
        let mut agg = BatchAggregator::new(1);
        let outcome = ConversionOutcome {
            status: OutcomeStatus::Skipped,
            ..completed("tile.tx", Some("tile.tif"), "", None)
        };
        assert_eq!(agg.fold(&outcome), 1.0);
        let summary = agg.finalize();
        assert!(summary.processed_paths.is_empty());
        assert!(summary.error_messages.is_empty());
        assert_eq!(summary.declined_paths, vec!["tile.tif"]);
        assert_eq!(summary.completed_files, 1);
    }

    #[test]
    fn test_failed_outcomes_only_produce_errors() {
        let mut agg = BatchAggregator::new(3);
        for name in ["a.png", "b.png", "c.tx"] {
            agg.fold(&ConversionOutcome::failed(
                Path::new(name),
                None,
                FileError::NotFound(PathBuf::from(name)),
            ));
        }
        let summary = agg.finalize();
        assert!(summary.processed_paths.is_empty());
        assert_eq!(
            summary.error_messages,
            vec![
                "File not found: a.png",
                "File not found: b.png",
                "File not found: c.tx"
            ]
        );
        assert_eq!(summary.console_lines.len(), 3);
    }

    #[test]
    fn test_status_text_layout() {
        let summary = BatchSummary {
            processed_paths: vec!["a.tx".into(), "b.tx".into()],
            error_messages: vec!["File not found: c.png".into()],
            declined_paths: vec!["d.tif".into()],
            ..BatchSummary::default()
        };
        assert_eq!(
            summary.status_text(),
            "Number of processed files: 2\n\nProcessed files:\na.tx\nb.tx\
             \n\nSkipped (overwrite declined):\nd.tif\
             \n\nErrors:\nFile not found: c.png"
        );

        let empty = BatchSummary::default();
        assert_eq!(empty.status_text(), "No processed files\n\n");
    }

    #[test]
    fn test_summary_serializes_to_json() {
        let mut agg = BatchAggregator::new(1);
        agg.fold(&completed("photo.png", Some("photo.tx"), "", None));
        let json = serde_json::to_value(agg.finalize()).unwrap();
        assert_eq!(json["processed_paths"][0], "photo.tx");
        assert_eq!(json["total_files"], 1);
        assert_eq!(json["progress_fraction"], 0.0);
    }
}
