//! Classify command implementation.

use crate::cli::CommandContext;
use crate::cli::args::MessageArgs;
use crate::core::classifier::QueryClassifier;
use crate::core::models::ClassifyReport;
use crate::error::Result;
use crate::render::human;

/// Classify `message` without touching any session.
#[must_use]
pub fn classify(classifier: &QueryClassifier, message: &str) -> ClassifyReport {
    ClassifyReport {
        message: message.to_string(),
        patterns_version: classifier.version().to_string(),
        classification: classifier.classify(message),
    }
}

/// Execute the classify command.
///
/// # Errors
///
/// Returns an error if the configured pattern file cannot be loaded.
pub fn execute(args: &MessageArgs, ctx: &CommandContext) -> Result<()> {
    let classifier = ctx.config.classifier()?;
    let report = classify(&classifier, &args.message);
    tracing::debug!(
        class = %report.classification.class.as_str(),
        version = %report.patterns_version,
        "Message classified"
    );
    ctx.emit("classify", &report, human::render_classify)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::QueryClass;

    #[test]
    fn reports_builtin_version() {
        let classifier = QueryClassifier::builtin().unwrap();
        let report = classify(&classifier, "Find me a fashion creator");
        assert_eq!(report.classification.class, QueryClass::Specific);
        assert_eq!(report.patterns_version, classifier.version());
    }
}
