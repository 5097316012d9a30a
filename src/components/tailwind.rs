use super::{escape_attr, escape_text, Button, ClickHandler, ComponentFactory, TextInput, Theme};

const BUTTON_CLASSES: &str = "px-4 py-2 bg-blue-500 text-white rounded hover:bg-blue-600";
const INPUT_CLASSES: &str = "border border-gray-300 rounded px-3 py-2 focus:outline-none focus:ring";

pub struct TailwindButton {
    label: String,
    classes: &'static str,
    on_click: Option<ClickHandler>,
}

impl Button for TailwindButton {
    fn label(&self) -> &str {
        &self.label
    }

    fn render(&self) -> String {
        format!(r#"<button class="{}">{}</button>"#, self.classes, escape_text(&self.label))
    }

    fn on_click(self: Box<Self>, handler: ClickHandler) -> Box<dyn Button> {
        Box::new(TailwindButton {
            on_click: Some(handler),
            ..*self
        })
    }

    fn click(&self) -> bool {
        self.on_click.as_ref().map(|handler| handler()).is_some()
    }
}

pub struct TailwindInput {
    name: String,
    placeholder: String,
    classes: &'static str,
}

impl TextInput for TailwindInput {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self) -> String {
        format!(
            r#"<input class="{}" name="{}" placeholder="{}">"#,
            self.classes,
            escape_attr(&self.name),
            escape_attr(&self.placeholder)
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct TailwindFactory;

impl TailwindFactory {
    pub fn new() -> Self {
        TailwindFactory
    }
}

impl ComponentFactory for TailwindFactory {
    fn theme(&self) -> Theme {
        Theme::Tailwind
    }

    fn create_button(&self, label: &str) -> Box<dyn Button> {
        Box::new(TailwindButton {
            label: label.to_string(),
            classes: BUTTON_CLASSES,
            on_click: None,
        })
    }

    fn create_text_input(&self, name: &str, placeholder: &str) -> Box<dyn TextInput> {
        Box::new(TailwindInput {
            name: name.to_string(),
            placeholder: placeholder.to_string(),
            classes: INPUT_CLASSES,
        })
    }
}
