use thiserror::Error;

/// A single construct that disqualifies a document from rendering.
///
/// The display text is the operator-facing reason and is stable; tests and
/// log pipelines match on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("esm import/export is not allowed")]
    ModuleDeclaration,
    #[error("expressions are not allowed")]
    Expression,
    #[error("raw HTML is not allowed")]
    RawMarkup,
    #[error("node kind '{kind}' is not allowed")]
    UnsupportedNode { kind: String },
    #[error("component <{name}> is not allowed")]
    UnknownComponent { name: String },
    #[error("unsupported attribute syntax")]
    UnsupportedAttribute,
    #[error("event handler attributes are not allowed")]
    EventHandler { attribute: String },
    #[error("attribute '{attribute}' not allowed on <{component}>")]
    AttributeNotAllowed {
        attribute: String,
        component: String,
    },
    #[error("attribute value expressions are not allowed")]
    AttributeExpression { attribute: String },
    #[error("attribute '{attribute}' requires a string value")]
    MissingAttributeValue { attribute: String },
    #[error("document nesting is too deep")]
    NestingTooDeep { limit: usize },
}

/// Raised when untrusted content contains a construct outside the allow-list.
///
/// Safe to log; never show the detail to readers of the content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("MDX: {violation}")]
pub struct UnsafeContentError {
    violation: Violation,
}

impl UnsafeContentError {
    pub fn new(violation: Violation) -> Self {
        Self { violation }
    }

    pub fn violation(&self) -> &Violation {
        &self.violation
    }

    /// Reason string without the `MDX:` prefix.
    pub fn reason(&self) -> String {
        self.violation.to_string()
    }
}

impl From<Violation> for UnsafeContentError {
    fn from(violation: Violation) -> Self {
        Self::new(violation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_prefix_and_reason() {
        let error = UnsafeContentError::new(Violation::AttributeNotAllowed {
            attribute: "style".to_string(),
            component: "Callout".to_string(),
        });

        assert_eq!(
            error.to_string(),
            "MDX: attribute 'style' not allowed on <Callout>"
        );
        assert_eq!(error.reason(), "attribute 'style' not allowed on <Callout>");
    }

    #[test]
    fn anonymous_component_reason() {
        let error = UnsafeContentError::from(Violation::UnknownComponent {
            name: "(anonymous)".to_string(),
        });
        assert_eq!(error.reason(), "component <(anonymous)> is not allowed");
    }
}
