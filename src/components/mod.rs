//! Themed UI components: the factory-method family.
//!
//! Every theme ships its own button and text input, each implementing the
//! shared capability traits independently. Client code only sees
//! `dyn ComponentFactory`, `dyn Button` and `dyn TextInput`.

mod bootstrap;
mod material;
mod tailwind;

pub use bootstrap::{BootstrapButton, BootstrapFactory, BootstrapInput};
pub use material::{MaterialButton, MaterialFactory, MaterialInput};
pub use tailwind::{TailwindButton, TailwindFactory, TailwindInput};

use crate::error::UnknownSelector;
use crate::registry::Registry;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Callback attached to a button.
pub type ClickHandler = Arc<dyn Fn() + Send + Sync>;

// =============================================================================
// Product interfaces
// =============================================================================

pub trait Button: Send + Sync {
    fn label(&self) -> &str;

    fn render(&self) -> String;

    /// Returns a copy of this button with `handler` attached.
    fn on_click(self: Box<Self>, handler: ClickHandler) -> Box<dyn Button>;

    /// Runs the attached handler, if any. Returns whether one ran.
    fn click(&self) -> bool;
}

pub trait TextInput: Send + Sync {
    fn name(&self) -> &str;

    fn render(&self) -> String;
}

// =============================================================================
// Creator interface
// =============================================================================

pub trait ComponentFactory: Send + Sync {
    fn theme(&self) -> Theme;

    fn create_button(&self, label: &str) -> Box<dyn Button>;

    fn create_text_input(&self, name: &str, placeholder: &str) -> Box<dyn TextInput>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Theme {
    Material,
    Bootstrap,
    Tailwind,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Material, Theme::Bootstrap, Theme::Tailwind];

    pub fn selector(self) -> &'static str {
        match self {
            Theme::Material => "material",
            Theme::Bootstrap => "bootstrap",
            Theme::Tailwind => "tailwind",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

impl FromStr for Theme {
    type Err = UnknownSelector;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Theme::ALL
            .into_iter()
            .find(|candidate| candidate.selector() == wanted)
            .ok_or_else(|| UnknownSelector::new("theme", s))
    }
}

/// Theme registry with every built-in theme. Unknown themes fall back to
/// Bootstrap.
pub fn theme_registry() -> Registry<dyn ComponentFactory> {
    let mut registry = Registry::<dyn ComponentFactory>::new(
        "theme",
        Theme::Bootstrap.selector(),
        || Arc::new(BootstrapFactory::new()),
    );
    registry
        .register(Theme::Material.selector(), || Arc::new(MaterialFactory::new()))
        .register(Theme::Tailwind.selector(), || Arc::new(TailwindFactory::new()));
    registry
}

fn escape_text(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

fn escape_attr(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}
