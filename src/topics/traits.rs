// Seam between the CLI and the theme model.

use super::themes::ThemeReport;
use anyhow::Result;

/// Discovers themes in a batch of survey sentences.
///
/// Implementors do the fitting in `extract_with_progress`; the callback lets
/// the CLI drive a progress bar without knowing how many passes a model runs.
pub trait TopicExtractor {
    /// Short model name for logs and report headers.
    fn model_name(&self) -> &'static str;

    /// Number of progress ticks `extract_with_progress` will report.
    fn progress_len(&self) -> u64;

    /// Run the model, calling `on_step` with each completed step number.
    fn extract_with_progress(
        &self,
        sentences: &[String],
        on_step: &mut dyn FnMut(usize),
    ) -> Result<ThemeReport>;

    fn extract(&self, sentences: &[String]) -> Result<ThemeReport> {
        self.extract_with_progress(sentences, &mut |_| {})
    }
}
