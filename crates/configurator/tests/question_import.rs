use std::io::Cursor;

use configurator::catalog::{
    CatalogReader, ImportMode, ImportOptions, ImportSummary, InputType, QuestionImporter,
};
use configurator::memory::InMemoryCatalog;

const HEADER: &str =
    "group_name,text,input_type,choices,is_required,is_active,affects_score,order,question_tag\n";

fn import(catalog: &InMemoryCatalog, rows: &str, options: ImportOptions) -> ImportSummary {
    let body = format!("{HEADER}{rows}");
    QuestionImporter::new(catalog, options)
        .import(Cursor::new(body))
        .expect("csv readable")
}

fn question_texts(catalog: &InMemoryCatalog, group: &str) -> Vec<String> {
    let group = catalog
        .group_by_slug(group)
        .expect("lookup")
        .expect("group exists");
    let mut questions = catalog.questions_for_group(group.id).expect("questions");
    questions.sort_by_key(|question| question.order);
    questions.into_iter().map(|question| question.text).collect()
}

#[test]
fn rows_create_groups_questions_and_choices() {
    let catalog = InMemoryCatalog::new();
    let summary = import(
        &catalog,
        "Laptops,Screen size?,single,\"label=13-inch|order=1|active=1;label=14-inch|order=2|active=1\",1,1,1,1,Screen\n\
         Laptops,Ports?,checkbox,USB-C|active=1,0,1,0,2,\n\
         ,Orphan question,single,,1,1,1,3,\n",
        ImportOptions::default(),
    );

    assert_eq!(summary.created, 2);
    assert_eq!(summary.skipped, 1);
    assert!(summary.errors.is_empty());
    assert_eq!(question_texts(&catalog, "laptops"), vec!["Screen size?", "Ports?"]);

    let group = catalog
        .group_by_slug("laptops")
        .expect("lookup")
        .expect("group");
    let questions = catalog.questions_for_group(group.id).expect("questions");
    let ports = questions
        .iter()
        .find(|question| question.text == "Ports?")
        .expect("ports");
    assert_eq!(ports.input_type, InputType::Multi);
    assert!(!ports.is_required);
    assert!(!ports.affects_score);

    let screen = questions
        .iter()
        .find(|question| question.text == "Screen size?")
        .expect("screen");
    let mut choices = catalog.choices_for_question(screen.id).expect("choices");
    choices.sort_by_key(|choice| choice.order);
    let labels: Vec<&str> = choices.iter().map(|choice| choice.text.as_str()).collect();
    assert_eq!(labels, vec!["13-inch", "14-inch"]);
    assert!(choices.iter().all(|choice| choice.is_active));
}

#[test]
fn reimport_updates_in_place_and_respects_mode() {
    let catalog = InMemoryCatalog::new();
    import(
        &catalog,
        "Laptops,Screen size?,single,13-inch|active=1,1,1,1,1,\n",
        ImportOptions::default(),
    );

    let summary = import(
        &catalog,
        "Laptops,Screen size?,single,13-inch|active=0;15-inch|active=1,0,1,1,4,\n",
        ImportOptions::default(),
    );
    assert_eq!(summary.updated, 1);
    assert_eq!(question_texts(&catalog, "laptops"), vec!["Screen size?"]);

    let group = catalog
        .group_by_slug("laptops")
        .expect("lookup")
        .expect("group");
    let question = catalog
        .questions_for_group(group.id)
        .expect("questions")
        .remove(0);
    assert!(!question.is_required);
    assert_eq!(question.order, 4);
    let choices = catalog.choices_for_question(question.id).expect("choices");
    assert_eq!(choices.len(), 2);
    let retired = choices
        .iter()
        .find(|choice| choice.text == "13-inch")
        .expect("kept choice");
    assert!(!retired.is_active);

    let create_only = ImportOptions {
        mode: ImportMode::Create,
        ..ImportOptions::default()
    };
    let summary = import(
        &catalog,
        "Laptops,Screen size?,single,,1,1,1,1,\nLaptops,Weight?,single,,1,1,1,2,\n",
        create_only,
    );
    assert_eq!((summary.created, summary.skipped), (1, 1));

    let update_only = ImportOptions {
        mode: ImportMode::Update,
        ..ImportOptions::default()
    };
    let summary = import(&catalog, "Tablets,Stylus?,single,,1,1,1,1,\n", update_only);
    assert_eq!((summary.created, summary.updated, summary.skipped), (0, 0, 1));
}

#[test]
fn clear_choices_replaces_the_stored_set() {
    let catalog = InMemoryCatalog::new();
    import(
        &catalog,
        "Laptops,Colour?,single,Silver|active=1;Black|active=1,0,1,0,1,\n",
        ImportOptions::default(),
    );

    let options = ImportOptions {
        clear_choices: true,
        choice_separator: ",".to_string(),
        ..ImportOptions::default()
    };
    let summary = import(
        &catalog,
        "Laptops,Colour?,single,\"Blue|active=1,Green|active=1\",0,1,0,1,\n",
        options,
    );
    assert_eq!(summary.updated, 1);

    let group = catalog
        .group_by_slug("laptops")
        .expect("lookup")
        .expect("group");
    let question = catalog
        .questions_for_group(group.id)
        .expect("questions")
        .remove(0);
    let mut labels: Vec<String> = catalog
        .choices_for_question(question.id)
        .expect("choices")
        .into_iter()
        .map(|choice| choice.text)
        .collect();
    labels.sort();
    assert_eq!(labels, vec!["Blue".to_string(), "Green".to_string()]);
}
