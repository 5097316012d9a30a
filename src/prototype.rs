//! Prototype: copy an already-loaded object instead of loading it again.

/// Produces a new value from an existing one.
pub trait Prototype {
    fn prototype(&self) -> Self;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    title: String,
    price: f32,
    content: Option<String>,
}

impl Book {
    pub fn new(title: impl Into<String>, price: f32) -> Self {
        Self {
            title: title.into(),
            price,
            content: None,
        }
    }

    /// Stands in for the expensive fetch of the book body.
    pub fn load_content(&mut self, content: impl Into<String>) -> &mut Self {
        self.content = Some(content.into());
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn price(&self) -> f32 {
        self.price
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }
}

impl Prototype for Book {
    /// Copies title and price; loaded content is reused and marked as cached.
    fn prototype(&self) -> Self {
        Self {
            title: self.title.clone(),
            price: self.price,
            content: self.content.as_ref().map(|c| format!("{c} (cached)")),
        }
    }
}
