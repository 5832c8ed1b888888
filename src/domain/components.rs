//! The closed set of display components that authored content may reference.

use std::fmt;

/// Components an MDX document is allowed to use, with their permitted attributes.
///
/// The set is fixed at compile time; there is no way to register more at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Callout,
    Details,
    Figure,
    Tabs,
    Tab,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 5] = [
        ComponentKind::Callout,
        ComponentKind::Details,
        ComponentKind::Figure,
        ComponentKind::Tabs,
        ComponentKind::Tab,
    ];

    /// Resolves a tag name. Matching is exact; `callout` is not `Callout`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Callout => "Callout",
            ComponentKind::Details => "Details",
            ComponentKind::Figure => "Figure",
            ComponentKind::Tabs => "Tabs",
            ComponentKind::Tab => "Tab",
        }
    }

    pub fn allowed_attributes(self) -> &'static [&'static str] {
        match self {
            ComponentKind::Callout => &["type", "title"],
            ComponentKind::Details => &["summary"],
            ComponentKind::Figure => &["caption"],
            ComponentKind::Tabs => &[],
            ComponentKind::Tab => &["label"],
        }
    }

    pub fn allows_attribute(self, attribute: &str) -> bool {
        self.allowed_attributes().contains(&attribute)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
