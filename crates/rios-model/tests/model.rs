use proptest::prelude::*;
use serde_json::json;

use rios_model::naming::{canonical_enumeration_key, canonical_identifier, canonical_name};
use rios_model::{
    BaseType, Calculation, CalculationSet, Column, Descriptor, Element, EnumerationCollection,
    Event, Field, FieldType, Form, Instrument, LocalizedString, Page, Question, Row, TypeObject,
    WidgetType,
};

fn en(text: &str) -> LocalizedString {
    LocalizedString::new("en", text)
}

#[test]
fn test_instrument_serializes_with_rios_member_names() {
    let mut instrument = Instrument::new("urn:demo", "1.0", "Demo");
    let mut choices = EnumerationCollection::new();
    choices.insert("b".into(), None);
    choices.insert("a".into(), None);
    instrument.add_field(Field::new("age", BaseType::Integer).with_required(true));
    instrument.add_field(Field::new("fruit", TypeObject::enumeration(choices)));

    let value = serde_json::to_value(&instrument).unwrap();
    assert_eq!(
        value,
        json!({
            "id": "urn:demo",
            "version": "1.0",
            "title": "Demo",
            "record": [
                {"id": "age", "type": "integer", "required": true},
                {"id": "fruit", "type": {"base": "enumeration", "enumerations": {"b": null, "a": null}}}
            ]
        })
    );
    let text = serde_json::to_string(&instrument).unwrap();
    assert!(text.find("\"b\"").unwrap() < text.find("\"a\"").unwrap());
}

#[test]
fn test_matrix_type_serializes_columns_and_rows() {
    let mut matrix = TypeObject::matrix();
    matrix.add_column(Column {
        id: "radio".into(),
        description: "radio".into(),
        field_type: FieldType::from(BaseType::Enumeration),
        required: false,
        identifiable: false,
    });
    matrix.add_row(Row {
        id: "q1".into(),
        description: "First".into(),
        required: true,
    });
    let value = serde_json::to_value(&matrix).unwrap();
    assert_eq!(
        value,
        json!({
            "base": "matrix",
            "columns": [{"id": "radio", "description": "radio", "type": "enumeration"}],
            "rows": [{"id": "q1", "description": "First", "required": true}]
        })
    );
}

#[test]
fn test_form_elements_are_type_and_options() {
    let instrument = Instrument::new("urn:demo", "1.0", "Demo");
    let mut form = Form::new(instrument.reference(), "en").with_title(en("Demo"));
    let mut page = Page::new("page1");
    page.add_element(Element::header(en("Section")));
    let mut question = Question::new("color", en("Color?")).with_widget(WidgetType::DropDown);
    question.add_enumeration(Descriptor::new("red", en("Red")));
    question.add_event(Event::disable("!(assessment[\"age\"]>3)"));
    page.add_element(Element::question(question));
    form.add_page(page);

    let value = serde_json::to_value(&form).unwrap();
    assert_eq!(
        value,
        json!({
            "instrument": {"id": "urn:demo", "version": "1.0"},
            "defaultLocalization": "en",
            "title": {"en": "Demo"},
            "pages": [{
                "id": "page1",
                "elements": [
                    {"type": "header", "options": {"text": {"en": "Section"}}},
                    {"type": "question", "options": {
                        "fieldId": "color",
                        "text": {"en": "Color?"},
                        "enumerations": [{"id": "red", "text": {"en": "Red"}}],
                        "widget": {"type": "dropDown"},
                        "events": [{"trigger": "!(assessment[\"age\"]>3)", "action": "disable"}]
                    }}
                ]
            }]
        })
    );

    let decoded: Form = serde_json::from_value(value).unwrap();
    assert_eq!(decoded, form);
    assert_eq!(decoded.questions().count(), 1);
}

#[test]
fn test_unknown_widget_decodes_as_other() {
    let question: Question = serde_json::from_value(json!({
        "fieldId": "x",
        "text": {"en": "X"},
        "widget": {"type": "timePicker"}
    }))
    .unwrap();
    assert_eq!(question.widget_type(), Some(&WidgetType::Other));
}

#[test]
fn test_calculation_set_shape() {
    let mut set = CalculationSet::new(rios_model::InstrumentReference::new("urn:demo", "1.0"));
    set.add(Calculation::python("total", "Total", "assessment[\"a\"]+1"));
    assert!(set.contains("total"));
    assert_eq!(
        serde_json::to_value(&set).unwrap(),
        json!({
            "instrument": {"id": "urn:demo", "version": "1.0"},
            "calculations": [{
                "id": "total",
                "description": "Total",
                "type": "float",
                "method": "python",
                "options": {"expression": "assessment[\"a\"]+1"}
            }]
        })
    );
}

#[test]
fn test_blank_help_is_dropped() {
    let question = Question::new("x", en("X")).with_help(en("   "));
    assert!(question.help.is_none());
}

proptest! {
    #[test]
    fn test_canonical_name_is_idempotent(raw in "\\PC{0,40}") {
        let once = canonical_name(&raw);
        prop_assert_eq!(canonical_name(&once), once);
    }

    #[test]
    fn test_canonical_identifier_is_idempotent(raw in "\\PC{0,40}") {
        let once = canonical_identifier(&raw);
        prop_assert_eq!(canonical_identifier(&once), once);
    }

    #[test]
    fn test_canonical_enumeration_key_is_idempotent(raw in "\\PC{0,40}") {
        let once = canonical_enumeration_key(&raw);
        prop_assert_eq!(canonical_enumeration_key(&once), once);
    }
}
