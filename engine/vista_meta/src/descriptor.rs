//! Exposure descriptors.

use std::fmt;
use std::rc::Rc;

use vista_value::{Value, VisibleInfo};

/// Renders a value as preview text.
pub type PreviewFormatter = Rc<dyn Fn(&Value) -> String>;

/// How a member or value is presented, and whether it is presented at all.
#[derive(Clone)]
pub struct Descriptor {
    pub name: Option<String>,
    pub header: String,
    pub description: String,
    /// Exposed at all. Disabled descriptors are skipped during resolution.
    pub enabled: bool,
    /// Exposed but may be interacted with (edited, invoked).
    pub interactive: bool,
    pub preview: Option<PreviewFormatter>,
}

impl Descriptor {
    /// Enabled, interactive descriptor with the given header.
    pub fn new(header: impl Into<String>) -> Self {
        Descriptor {
            name: None,
            header: header.into(),
            description: String::new(),
            enabled: true,
            interactive: true,
            preview: None,
        }
    }

    /// A descriptor that hides its member.
    pub fn hidden() -> Self {
        Descriptor {
            enabled: false,
            ..Descriptor::new("")
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Shown, but not editable or invokable.
    #[must_use]
    pub fn inert(mut self) -> Self {
        self.interactive = false;
        self
    }

    #[must_use]
    pub fn preview(mut self, formatter: impl Fn(&Value) -> String + 'static) -> Self {
        self.preview = Some(Rc::new(formatter));
        self
    }
}

impl From<VisibleInfo> for Descriptor {
    fn from(info: VisibleInfo) -> Self {
        Descriptor {
            name: info.name,
            header: info.header,
            description: info.description,
            ..Descriptor::new("")
        }
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("name", &self.name)
            .field("header", &self.header)
            .field("description", &self.description)
            .field("enabled", &self.enabled)
            .field("interactive", &self.interactive)
            .field("preview", &self.preview.is_some())
            .finish()
    }
}
