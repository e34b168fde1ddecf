//! Render trees
//!
//! Components describe their output as an ordered sequence of frames. The
//! renderer expands child component references into nested frame runs
//! bracketed by `ComponentStart`/`ComponentEnd`.

use crate::error::BuilderError;
use crate::module::TypeHandle;
use crate::parameters::ParameterSet;

/// Value of an attribute frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Text(String),
    /// `true` renders the bare attribute name, `false` omits the attribute.
    Bool(bool),
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}

/// Reference to a child component together with its bound parameters.
#[derive(Debug, Clone)]
pub struct ComponentReference {
    pub handle: TypeHandle,
    pub parameters: ParameterSet,
}

#[derive(Debug, Clone)]
pub enum RenderFrame {
    Element { name: String },
    Attribute { name: String, value: AttributeValue },
    /// Text content, escaped on serialization.
    Text(String),
    /// Markup content, written verbatim.
    Markup(String),
    CloseElement,
    /// Child component reference, replaced during expansion.
    Component(ComponentReference),
    ComponentStart { type_name: String },
    ComponentEnd,
}

impl PartialEq for RenderFrame {
    fn eq(&self, other: &Self) -> bool {
        use RenderFrame::*;
        match (self, other) {
            (Element { name: a }, Element { name: b }) => a == b,
            (Attribute { name: a, value: va }, Attribute { name: b, value: vb }) => {
                a == b && va == vb
            }
            (Text(a), Text(b)) | (Markup(a), Markup(b)) => a == b,
            (CloseElement, CloseElement) | (ComponentEnd, ComponentEnd) => true,
            (Component(a), Component(b)) => a.handle == b.handle && a.parameters == b.parameters,
            (ComponentStart { type_name: a }, ComponentStart { type_name: b }) => a == b,
            _ => false,
        }
    }
}

/// The frames of one completed render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderTree {
    frames: Vec<RenderFrame>,
}

impl RenderTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: RenderFrame) {
        self.frames.push(frame);
    }

    pub fn frames(&self) -> &[RenderFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RenderFrame> {
        self.frames.iter()
    }
}

impl From<Vec<RenderFrame>> for RenderTree {
    fn from(frames: Vec<RenderFrame>) -> Self {
        RenderTree { frames }
    }
}

impl<'a> IntoIterator for &'a RenderTree {
    type Item = &'a RenderFrame;
    type IntoIter = std::slice::Iter<'a, RenderFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

/// Collects the frames produced by one component.
#[derive(Debug, Default)]
pub struct RenderTreeBuilder {
    frames: Vec<RenderFrame>,
    open: Vec<String>,
    attributes_allowed: bool,
}

impl RenderTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_element(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.open.push(name.clone());
        self.frames.push(RenderFrame::Element { name });
        self.attributes_allowed = true;
    }

    pub fn add_attribute(
        &mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Result<(), BuilderError> {
        let name = name.into();
        if !self.attributes_allowed {
            return Err(BuilderError::AttributeOutOfPlace { name });
        }
        self.frames.push(RenderFrame::Attribute {
            name,
            value: value.into(),
        });
        Ok(())
    }

    pub fn add_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.attributes_allowed = false;
        if !text.is_empty() {
            self.frames.push(RenderFrame::Text(text));
        }
    }

    pub fn add_markup(&mut self, markup: impl Into<String>) {
        let markup = markup.into();
        self.attributes_allowed = false;
        if !markup.is_empty() {
            self.frames.push(RenderFrame::Markup(markup));
        }
    }

    pub fn add_component(&mut self, handle: TypeHandle, parameters: ParameterSet) {
        self.attributes_allowed = false;
        self.frames
            .push(RenderFrame::Component(ComponentReference { handle, parameters }));
    }

    pub fn close_element(&mut self) -> Result<(), BuilderError> {
        self.attributes_allowed = false;
        self.open.pop().ok_or(BuilderError::UnbalancedClose)?;
        self.frames.push(RenderFrame::CloseElement);
        Ok(())
    }

    pub fn frames(&self) -> &[RenderFrame] {
        &self.frames
    }

    /// Finish building; every opened element must have been closed.
    pub fn finish(self) -> Result<Vec<RenderFrame>, BuilderError> {
        if !self.open.is_empty() {
            return Err(BuilderError::UnclosedElements { open: self.open });
        }
        Ok(self.frames)
    }
}
