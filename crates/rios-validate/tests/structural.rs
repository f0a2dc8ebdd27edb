use rios_model::{
    BaseType, Bound, BoundConstraint, Calculation, CalculationSet, Column, Descriptor, Element,
    EnumerationCollection, Field, FieldType, Form, Instrument, InstrumentReference,
    LocalizedString, Page, Question, Row, TypeObject,
};
use rios_validate::{DocumentKind, StructuralValidator, Validator};

fn en(text: &str) -> LocalizedString {
    LocalizedString::new("en", text)
}

fn instrument() -> Instrument {
    let mut instrument = Instrument::new("urn:demo", "1.0", "Demo");
    let mut colors = EnumerationCollection::new();
    colors.insert("red".into(), None);
    colors.insert("blue".into(), None);
    instrument.add_field(Field::new("age", BaseType::Integer));
    instrument.add_field(Field::new("color", TypeObject::enumeration(colors)));
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
        required: false,
    });
    instrument.add_field(Field::new("grid", matrix));
    instrument
}

fn form(instrument: &Instrument) -> Form {
    let mut form = Form::new(instrument.reference(), "en").with_title(en("Demo"));
    let mut page = Page::new("page1");
    page.add_element(Element::question(Question::new("age", en("Age"))));
    let mut color = Question::new("color", en("Color"));
    color.add_enumeration(Descriptor::new("red", en("Red")));
    page.add_element(Element::question(color));
    let mut grid = Question::new("grid", en("Grid"));
    grid.add_question(Question::new("radio", en("Grid")));
    grid.add_row(Descriptor::new("q1", en("First")));
    page.add_element(Element::question(grid));
    form.add_page(page);
    form
}

#[test]
fn test_accepts_consistent_documents() {
    let validator = StructuralValidator::new();
    let instrument = instrument();
    validator.validate_instrument(&instrument).unwrap();
    validator.validate_form(&form(&instrument), &instrument).unwrap();

    let mut calculations = CalculationSet::new(instrument.reference());
    calculations.add(Calculation::python("total", "", "assessment[\"age\"] + 1"));
    validator
        .validate_calculation_set(&calculations, &instrument)
        .unwrap();
}

#[test]
fn test_reports_every_instrument_issue() {
    let mut instrument = instrument();
    instrument.add_field(Field::new("age", BaseType::Integer));
    instrument.add_field(Field::new("Bad Id", BaseType::Text));
    instrument.add_field(Field::new(
        "score",
        TypeObject::new(BaseType::Integer).with_range(BoundConstraint::new(
            Some(Bound::Integer(10)),
            Some(Bound::Integer(1)),
        )),
    ));
    instrument.add_field(Field::new(
        "empty_choices",
        TypeObject::enumeration(EnumerationCollection::new()),
    ));

    let err = StructuralValidator
        .validate_instrument(&instrument)
        .unwrap_err();
    assert_eq!(err.document, DocumentKind::Instrument);
    let paths: Vec<&str> = err.issues.iter().map(|issue| issue.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "record[3].id",
            "record[4].id",
            "record[5].type.range",
            "record[6].type.enumerations",
        ]
    );
    assert!(
        err.to_string()
            .starts_with("The supplied RIOS Instrument configuration is invalid")
    );
}

#[test]
fn test_form_must_match_instrument() {
    let instrument = instrument();
    let mut form = form(&instrument);
    form.instrument = InstrumentReference::new("urn:other", "1.0");
    let mut page = Page::new("page2");
    page.add_element(Element::question(Question::new("age", en("Again"))));
    page.add_element(Element::question(Question::new("missing", en("?"))));
    form.add_page(page);

    let err = StructuralValidator
        .validate_form(&form, &instrument)
        .unwrap_err();
    let messages: Vec<String> = err.issues.iter().map(ToString::to_string).collect();
    assert_eq!(messages.len(), 3);
    assert!(messages[0].starts_with("instrument: references urn:other@1.0"));
    assert!(messages[1].contains("presented more than once"));
    assert!(messages[2].contains("'missing' is not in the instrument"));
}

#[test]
fn test_calculation_ids_must_not_shadow_fields() {
    let instrument = instrument();
    let mut calculations = CalculationSet::new(instrument.reference());
    calculations.add(Calculation::python("age", "", "1"));
    calculations.add(Calculation::python("total", "", " "));
    let err = StructuralValidator
        .validate_calculation_set(&calculations, &instrument)
        .unwrap_err();
    assert_eq!(err.document, DocumentKind::CalculationSet);
    assert_eq!(err.issues.len(), 2);
}

#[test]
fn test_issues_serialize_for_reports() {
    let instrument = Instrument::new("", "1.0", "Demo");
    let err = StructuralValidator
        .validate_instrument(&instrument)
        .unwrap_err();
    let value = serde_json::to_value(&err).unwrap();
    assert_eq!(value["document"], "instrument");
    assert_eq!(value["issues"][0]["path"], "id");
}
