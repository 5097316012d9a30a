// Google Material Design components.

use super::{escape_attr, escape_text, Button, ClickHandler, ComponentFactory, TextInput, Theme};

pub struct MaterialButton {
    label: String,
    ripple: bool,
    elevation: u8,
    on_click: Option<ClickHandler>,
}

impl Button for MaterialButton {
    fn label(&self) -> &str {
        &self.label
    }

    fn render(&self) -> String {
        let ripple = if self.ripple {
            "\n    <span class=\"mdc-button__ripple\"></span>"
        } else {
            ""
        };
        format!(
            "<button class=\"mdc-button mdc-button--raised\" style=\"elevation: {}\">{}\n    <span class=\"mdc-button__label\">{}</span>\n</button>",
            self.elevation,
            ripple,
            escape_text(&self.label)
        )
    }

    fn on_click(self: Box<Self>, handler: ClickHandler) -> Box<dyn Button> {
        Box::new(MaterialButton {
            on_click: Some(handler),
            ..*self
        })
    }

    fn click(&self) -> bool {
        match &self.on_click {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }
}

pub struct MaterialInput {
    name: String,
    placeholder: String,
}

impl TextInput for MaterialInput {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self) -> String {
        format!(
            "<label class=\"mdc-text-field mdc-text-field--filled\">\n    <span class=\"mdc-floating-label\">{}</span>\n    <input class=\"mdc-text-field__input\" name=\"{}\" aria-label=\"{}\">\n</label>",
            escape_text(&self.placeholder),
            escape_attr(&self.name),
            escape_attr(&self.placeholder)
        )
    }
}

/// Raised buttons with ripple, elevation 2.
#[derive(Debug, Clone)]
pub struct MaterialFactory {
    ripple: bool,
    elevation: u8,
}

impl MaterialFactory {
    pub fn new() -> Self {
        Self {
            ripple: true,
            elevation: 2,
        }
    }
}

impl Default for MaterialFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentFactory for MaterialFactory {
    fn theme(&self) -> Theme {
        Theme::Material
    }

    fn create_button(&self, label: &str) -> Box<dyn Button> {
        Box::new(MaterialButton {
            label: label.to_string(),
            ripple: self.ripple,
            elevation: self.elevation,
            on_click: None,
        })
    }

    fn create_text_input(&self, name: &str, placeholder: &str) -> Box<dyn TextInput> {
        Box::new(MaterialInput {
            name: name.to_string(),
            placeholder: placeholder.to_string(),
        })
    }
}
