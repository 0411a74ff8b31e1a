// ABOUTME: Diagnostics accumulator for non-fatal warnings during deployment.
// ABOUTME: Collects warnings that shouldn't fail a deployment but should be shown to users.

/// Collects non-fatal warnings during deployment operations.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Count warnings of one kind.
    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }
}

/// A non-fatal warning collected during deployment.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// A read failed transiently and will be attempted again.
    pub fn retried_read(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::RetriedRead,
            message: message.into(),
        }
    }

    /// The tag override variable was named but had no value.
    pub fn tag_override_unset(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::TagOverrideUnset,
            message: message.into(),
        }
    }

    /// The image went to the only container, whose name differs from the service.
    pub fn container_fallback(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ContainerFallback,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A describe or poll call failed transiently and was retried.
    RetriedRead,
    /// `--tag-env-var` named a variable that is unset or empty.
    TagOverrideUnset,
    /// No container matched the service name; the sole container was used.
    ContainerFallback,
}
