//! Integration tests for RIOS to REDCap conversion.

use rios_convert::{
    ConversionError, FromRiosOptions, RiosDocuments, ToRiosOptions, redcap_to_rios,
    rios_to_redcap,
};
use rios_model::{
    BaseType, Column, Descriptor, Element, Field, Form, Instrument, InstrumentReference,
    LocalizedString, Page, Question, Row, TypeObject, WidgetType,
};
use rios_validate::StructuralValidator;

const DICTIONARY: &str = r#"Variable / Field Name,Form Name,Section Header,Field Type,Field Label,"Choices, Calculations, OR Slider Labels",Field Note,Text Validation Type OR Show Slider Number,Text Validation Min,Text Validation Max,Identifier?,Branching Logic (Show field only if...),Required Field?,Custom Alignment,Question Number (surveys only),Matrix Group Name,Matrix Ranking?,Field Annotation
age,intro,About you,text,Age,,Years,integer,0,120,,,y,,,,,
fruit,intro,,radio,Favourite fruit,"1, Apple | 2, Banana",,,,,,[age] > 3,,,,,,
mood_am,feelings,Mood,radio,Morning,"1, Low | 2, High",,,,,,,,,,mood,,
mood_pm,feelings,,radio,Evening,"1, Low | 2, High",,,,,,,,,,mood,,
bmi,feelings,,calc,BMI,"round([age]/2, 1)",,,,,,,,,,,,
"#;

fn text(value: &str) -> LocalizedString {
    LocalizedString::new("en", value)
}

fn to_csv(documents: &RiosDocuments, options: &FromRiosOptions) -> (String, Vec<String>) {
    let mut out = Vec::new();
    let response = rios_to_redcap(documents, options, &StructuralValidator::new(), &mut out)
        .unwrap();
    let warnings = response
        .logs
        .warnings()
        .map(|entry| entry.message.clone())
        .collect();
    (String::from_utf8(out).unwrap(), warnings)
}

/// An instrument with one matrix field `grid` of the given column type.
fn matrix_documents(column_type: BaseType, sub_questions: usize) -> RiosDocuments {
    let mut matrix = TypeObject::matrix();
    matrix.add_column(Column {
        id: "answer".to_string(),
        description: "answer".to_string(),
        field_type: column_type.into(),
        required: false,
        identifiable: false,
    });
    for id in ["row_one", "row_two"] {
        matrix.add_row(Row {
            id: id.to_string(),
            description: id.to_string(),
            required: false,
        });
    }
    let mut instrument = Instrument::new("urn:grid", "1.0", "Grid");
    instrument.add_field(Field::new("grid", matrix));
    instrument.add_field(Field::new("note", BaseType::Text));

    let mut grid = Question::new("grid", text("Grid"));
    for _ in 0..sub_questions {
        grid.add_question(Question::new("answer", text("Answer")).with_widget(WidgetType::InputText));
    }
    grid.add_row(Descriptor::new("row_one", text("One")));
    grid.add_row(Descriptor::new("row_two", text("Two")));

    let mut page = Page::new("page_one");
    page.add_element(Element::question(grid));
    page.add_element(Element::question(Question::new("note", text("Note"))));
    let mut form = Form::new(instrument.reference(), "en");
    form.add_page(page);
    RiosDocuments::new(instrument, form)
}

#[test]
fn test_dictionary_round_trip() {
    let response = redcap_to_rios(
        DICTIONARY.as_bytes(),
        &ToRiosOptions::new("urn:round-trip", "Round trip"),
        &StructuralValidator::new(),
    )
    .unwrap();
    assert!(response.is_success());
    let documents = response.documents.unwrap();
    let (csv, warnings) = to_csv(&documents, &FromRiosOptions::new());
    assert!(warnings.is_empty(), "{warnings:?}");
    insta::assert_snapshot!(csv, @r#"
    Variable / Field Name,Form Name,Section Header,Field Type,Field Label,"Choices, Calculations, OR Slider Labels",Field Note,Text Validation Type OR Show Slider Number,Text Validation Min,Text Validation Max,Identifier?,Branching Logic (Show field only if...),Required Field?,Custom Alignment,Question Number (surveys only),Matrix Group Name,Matrix Ranking?,Field Annotation
    age,intro,About you,text,Age,,Years,integer,0,120,,,y,,,,,
    fruit,intro,,radio,Favourite fruit,"1, Apple | 2, Banana",,,,,,[age] > 3,,,,,,
    mood_am,feelings,Mood,radio,Morning,"1, Low | 2, High",,,,,,,,,,mood,y,
    mood_pm,feelings,,radio,Evening,"1, Low | 2, High",,,,,,,,,,mood,y,
    bmi,calculations,,calc,BMI,"round([age]/2, 1)",,,,,,,,,,,,
    "#);
}

#[test]
fn test_matrix_with_several_questions_is_skipped() {
    let documents = matrix_documents(BaseType::Enumeration, 2);
    let (csv, warnings) = to_csv(&documents, &FromRiosOptions::new());
    assert_eq!(
        warnings,
        vec!["REDCap matrices support only one question. Question ignored: grid".to_string()]
    );
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("note,page_one,,text,Note,"));
}

#[test]
fn test_matrix_needs_enumerated_column() {
    let documents = matrix_documents(BaseType::Text, 1);
    let (_, warnings) = to_csv(&documents, &FromRiosOptions::new());
    assert_eq!(
        warnings,
        vec!["REDCap matrix column must be an enumeration. Question ignored: grid".to_string()]
    );
}

#[test]
fn test_matrix_choices_fall_back_to_type_keys() {
    let mut documents = matrix_documents(BaseType::Enumeration, 1);
    let mut column = TypeObject::new(BaseType::Enumeration);
    column.add_enumeration("yes", None);
    column.add_enumeration("no", None);
    if let rios_model::FieldType::Inline(object) = &mut documents.instrument.record[0].field_type {
        object.columns[0].field_type = column.into();
    }
    let (csv, warnings) = to_csv(&documents, &FromRiosOptions::new());
    assert!(warnings.is_empty(), "{warnings:?}");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "row_one,page_one,,dropdown,One,\"yes, yes | no, no\",,,,,,,,,,grid,y,");
    assert_eq!(lines[2], "row_two,page_one,,dropdown,Two,\"yes, yes | no, no\",,,,,,,,,,grid,y,");
}

#[test]
fn test_mismatched_reference_is_rejected() {
    let mut documents = matrix_documents(BaseType::Enumeration, 1);
    documents.form.instrument = InstrumentReference::new("urn:other", "1.0");

    let err = rios_to_redcap(
        &documents,
        &FromRiosOptions::new(),
        &StructuralValidator::new(),
        Vec::new(),
    )
    .unwrap_err();
    assert!(matches!(err, ConversionError::Relationship { .. }));

    let response = rios_to_redcap(
        &documents,
        &FromRiosOptions::new().with_suppress(true),
        &StructuralValidator::new(),
        Vec::new(),
    )
    .unwrap();
    assert!(response.rows.is_empty());
    let failure = response.failure.unwrap();
    assert!(failure.starts_with("The supplied RIOS configurations are invalid: Form and Instrument do not match"));
}
