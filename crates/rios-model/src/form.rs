//! Web form documents.

use serde::{Deserialize, Serialize};

use crate::instrument::InstrumentReference;
use crate::localization::LocalizedString;

/// RIOS Web Form definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub instrument: InstrumentReference,
    pub default_localization: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<LocalizedString>,
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Form {
    pub fn new(instrument: InstrumentReference, localization: impl Into<String>) -> Self {
        Self {
            instrument,
            default_localization: localization.into(),
            title: None,
            pages: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: LocalizedString) -> Self {
        self.title = Some(title);
        self
    }

    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// All questions in document order, including matrix parents.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.pages
            .iter()
            .flat_map(|page| page.elements.iter())
            .filter_map(Element::as_question)
    }
}

/// A page of elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Page {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            elements: Vec::new(),
        }
    }

    pub fn add_element(&mut self, element: Element) {
        self.elements.push(element);
    }
}

/// Options of header and text elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextOptions {
    pub text: LocalizedString,
}

/// Page element, serialized as `{"type": ..., "options": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "options", rename_all = "camelCase")]
pub enum Element {
    Header(TextOptions),
    Text(TextOptions),
    Question(Box<Question>),
}

impl Element {
    pub fn header(text: LocalizedString) -> Self {
        Self::Header(TextOptions { text })
    }

    pub fn text(text: LocalizedString) -> Self {
        Self::Text(TextOptions { text })
    }

    pub fn question(question: Question) -> Self {
        Self::Question(Box::new(question))
    }

    pub fn as_question(&self) -> Option<&Question> {
        match self {
            Self::Question(question) => Some(question),
            _ => None,
        }
    }

    pub fn as_question_mut(&mut self) -> Option<&mut Question> {
        match self {
            Self::Question(question) => Some(question),
            _ => None,
        }
    }
}

/// Question presented on a page.
///
/// `questions` and `rows` are only populated on the parent question of a
/// matrix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub field_id: String,
    pub text: LocalizedString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<LocalizedString>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enumerations: Vec<Descriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<Question>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<Descriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<Widget>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
}

impl Question {
    pub fn new(field_id: impl Into<String>, text: LocalizedString) -> Self {
        Self {
            field_id: field_id.into(),
            text,
            ..Self::default()
        }
    }

    /// Sets the help text; blank help is dropped.
    #[must_use]
    pub fn with_help(mut self, help: LocalizedString) -> Self {
        self.help = (!help.is_blank()).then_some(help);
        self
    }

    #[must_use]
    pub fn with_widget(mut self, widget: WidgetType) -> Self {
        self.widget = Some(Widget::new(widget));
        self
    }

    #[must_use]
    pub fn with_enumerations(mut self, enumerations: Vec<Descriptor>) -> Self {
        self.enumerations = enumerations;
        self
    }

    pub fn add_enumeration(&mut self, descriptor: Descriptor) {
        self.enumerations.push(descriptor);
    }

    pub fn add_question(&mut self, question: Question) {
        self.questions.push(question);
    }

    pub fn add_row(&mut self, row: Descriptor) {
        self.rows.push(row);
    }

    pub fn add_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Returns true if this question is the parent of a matrix.
    pub fn is_matrix(&self) -> bool {
        !self.questions.is_empty() && !self.rows.is_empty()
    }

    pub fn widget_type(&self) -> Option<&WidgetType> {
        self.widget.as_ref().map(|widget| &widget.widget_type)
    }
}

/// Id with display text, used for enumeration choices and matrix rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub id: String,
    pub text: LocalizedString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<LocalizedString>,
}

impl Descriptor {
    pub fn new(id: impl Into<String>, text: LocalizedString) -> Self {
        Self {
            id: id.into(),
            text,
            help: None,
        }
    }
}

/// Action taken when an event trigger is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventAction {
    Hide,
    Disable,
    HideEnumeration,
    Calculate,
    Fail,
}

/// Conditional behavior attached to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub trigger: String,
    pub action: EventAction,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,
}

impl Event {
    /// Disables the owning question while `trigger` holds.
    pub fn disable(trigger: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            action: EventAction::Disable,
            targets: Vec::new(),
        }
    }
}

/// Widget kinds emitted by the converter; anything else is kept as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WidgetType {
    InputText,
    InputNumber,
    TextArea,
    DropDown,
    RadioGroup,
    CheckGroup,
    DateTimePicker,
    #[serde(other)]
    Other,
}

/// Widget configuration of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Widget {
    #[serde(rename = "type")]
    pub widget_type: WidgetType,
}

impl Widget {
    pub fn new(widget_type: WidgetType) -> Self {
        Self { widget_type }
    }
}
