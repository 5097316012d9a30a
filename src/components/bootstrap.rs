// Bootstrap components. Variant and size defaults live on the factory.

use super::{escape_attr, escape_text, Button, ClickHandler, ComponentFactory, TextInput, Theme};

pub struct BootstrapButton {
    label: String,
    variant: String,
    size: String,
    on_click: Option<ClickHandler>,
}

impl Button for BootstrapButton {
    fn label(&self) -> &str {
        &self.label
    }

    fn render(&self) -> String {
        format!(
            r#"<button class="btn btn-{} btn-{}">{}</button>"#,
            self.variant,
            self.size,
            escape_text(&self.label)
        )
    }

    fn on_click(self: Box<Self>, handler: ClickHandler) -> Box<dyn Button> {
        Box::new(BootstrapButton {
            on_click: Some(handler),
            ..*self
        })
    }

    fn click(&self) -> bool {
        if let Some(handler) = &self.on_click {
            handler();
            return true;
        }
        false
    }
}

pub struct BootstrapInput {
    name: String,
    placeholder: String,
    size: String,
}

impl TextInput for BootstrapInput {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self) -> String {
        format!(
            r#"<input type="text" class="form-control form-control-{}" name="{}" placeholder="{}">"#,
            self.size,
            escape_attr(&self.name),
            escape_attr(&self.placeholder)
        )
    }
}

#[derive(Debug, Clone)]
pub struct BootstrapFactory {
    default_variant: String,
    default_size: String,
}

impl BootstrapFactory {
    /// Primary variant, medium size.
    pub fn new() -> Self {
        Self::with_defaults("primary", "md")
    }

    /// `variant` is one of Bootstrap's contextual names ("primary",
    /// "secondary", "danger", ...), `size` one of "sm", "md", "lg".
    pub fn with_defaults(variant: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            default_variant: variant.into(),
            default_size: size.into(),
        }
    }
}

impl Default for BootstrapFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentFactory for BootstrapFactory {
    fn theme(&self) -> Theme {
        Theme::Bootstrap
    }

    fn create_button(&self, label: &str) -> Box<dyn Button> {
        Box::new(BootstrapButton {
            label: label.to_string(),
            variant: self.default_variant.clone(),
            size: self.default_size.clone(),
            on_click: None,
        })
    }

    fn create_text_input(&self, name: &str, placeholder: &str) -> Box<dyn TextInput> {
        Box::new(BootstrapInput {
            name: name.to_string(),
            placeholder: placeholder.to_string(),
            size: self.default_size.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_defaults() {
        let html = BootstrapFactory::new().create_button("Cancel").render();
        assert_eq!(html, r#"<button class="btn btn-primary btn-md">Cancel</button>"#);
    }

    #[test]
    fn test_bootstrap_custom_defaults() {
        let factory = BootstrapFactory::with_defaults("danger", "lg");
        assert_eq!(
            factory.create_button("Delete").render(),
            r#"<button class="btn btn-danger btn-lg">Delete</button>"#
        );
        assert_eq!(
            factory.create_text_input("q", "Search").render(),
            r#"<input type="text" class="form-control form-control-lg" name="q" placeholder="Search">"#
        );
    }
}
