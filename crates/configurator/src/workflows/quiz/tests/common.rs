use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::catalog::domain::{
    Choice, ChoiceId, ChoiceImpact, GroupId, InputType, Item, ItemId, ProductGroup, Question,
    QuestionId,
};
use crate::catalog::repository::CatalogWriter;
use crate::config::ErpConfig;
use crate::memory::{InMemoryCatalog, InMemorySessionStore, RecordingGateway};
use crate::workflows::leads::{LeadDispatcher, Participant};
use crate::workflows::quiz::{QuizService, RawSelections};

pub(super) const SLUG: &str = "gearboxes";

pub(super) const LOAD: QuestionId = QuestionId(10);
pub(super) const STEADY: ChoiceId = ChoiceId(11);
pub(super) const SHOCK: ChoiceId = ChoiceId(12);
pub(super) const FREQUENCY: QuestionId = QuestionId(20);
pub(super) const HOURLY: ChoiceId = ChoiceId(21);
pub(super) const DAILY: ChoiceId = ChoiceId(22);
pub(super) const RETIRED: ChoiceId = ChoiceId(23);
pub(super) const MOUNTING: QuestionId = QuestionId(30);
pub(super) const FOOT: ChoiceId = ChoiceId(31);

pub(super) const GEAR_X: ItemId = ItemId(100);
pub(super) const GEAR_Y: ItemId = ItemId(101);
pub(super) const GEAR_Z: ItemId = ItemId(102);
pub(super) const DORMANT: ItemId = ItemId(103);
pub(super) const MOTOR: ItemId = ItemId(200);

pub(super) type TestService = QuizService<InMemoryCatalog, InMemorySessionStore, RecordingGateway>;

pub(super) struct Harness {
    pub(super) catalog: Arc<InMemoryCatalog>,
    pub(super) sessions: Arc<InMemorySessionStore>,
    pub(super) gateway: Arc<RecordingGateway>,
    pub(super) service: Arc<TestService>,
}

pub(super) fn harness() -> Harness {
    harness_with(RecordingGateway::accepting())
}

pub(super) fn harness_with(gateway: RecordingGateway) -> Harness {
    let catalog = Arc::new(seeded_catalog());
    let sessions = Arc::new(InMemorySessionStore::new(catalog.clone()));
    let gateway = Arc::new(gateway);
    let dispatcher = Arc::new(LeadDispatcher::new(
        Arc::clone(&gateway),
        ErpConfig::default(),
    ));
    let service = Arc::new(QuizService::new(
        Arc::clone(&catalog),
        Arc::clone(&sessions),
        dispatcher,
    ));
    Harness {
        catalog,
        sessions,
        gateway,
        service,
    }
}

/// Gearbox quiz: a load question, a frequency question revealed by "Shock",
/// and an informational mounting question that never scores.
pub(super) fn seeded_catalog() -> InMemoryCatalog {
    let catalog = InMemoryCatalog::new();
    catalog
        .save_group(ProductGroup::named(GroupId(1), "Gearboxes"))
        .expect("group");
    catalog
        .save_group(ProductGroup::named(GroupId(2), "Motors"))
        .expect("foreign group");

    for (id, group, name, active) in [
        (GEAR_X, 1, "Gear X", true),
        (GEAR_Y, 1, "Gear Y", true),
        (GEAR_Z, 1, "Gear Z", true),
        (DORMANT, 1, "Dormant Gear", false),
        (MOTOR, 2, "Motor F", true),
    ] {
        catalog
            .save_item(Item {
                is_active: active,
                ..Item::new(id, GroupId(group), name)
            })
            .expect("item");
    }

    let mut load = Question::new(LOAD, GroupId(1), "What load does the drive see?");
    load.tag = "Load".to_string();
    load.order = 1;
    catalog.save_question(load).expect("load question");
    save_choice(&catalog, STEADY, LOAD, "Steady", 1, true);
    save_choice(&catalog, SHOCK, LOAD, "Shock", 2, true);

    let mut frequency = Question::new(FREQUENCY, GroupId(1), "How often do shocks occur?");
    frequency.order = 2;
    frequency.input_type = InputType::Multi;
    frequency.depends_on = Some(LOAD);
    frequency.trigger_choices.insert(SHOCK);
    catalog.save_question(frequency).expect("frequency question");
    save_choice(&catalog, HOURLY, FREQUENCY, "Hourly", 1, true);
    save_choice(&catalog, DAILY, FREQUENCY, "Daily", 2, true);
    save_choice(&catalog, RETIRED, FREQUENCY, "Weekly", 3, false);

    let mut mounting = Question::new(MOUNTING, GroupId(1), "Mounting");
    mounting.order = 3;
    mounting.is_required = false;
    mounting.affects_score = false;
    catalog.save_question(mounting).expect("mounting question");
    save_choice(&catalog, FOOT, MOUNTING, "Foot", 1, true);

    for (choice, item, score) in [
        (STEADY, GEAR_X, 2.0),
        (STEADY, MOTOR, 5.0),
        (SHOCK, GEAR_Y, 3.0),
        (SHOCK, DORMANT, 9.0),
        (HOURLY, GEAR_Y, 1.0),
        (DAILY, GEAR_Z, 0.5),
        (FOOT, GEAR_X, 10.0),
    ] {
        catalog
            .save_impact(ChoiceImpact {
                choice_id: choice,
                item_id: item,
                score,
            })
            .expect("impact");
    }

    catalog
}

fn save_choice(
    catalog: &InMemoryCatalog,
    id: ChoiceId,
    question: QuestionId,
    text: &str,
    order: u32,
    active: bool,
) {
    catalog
        .save_choice(Choice {
            id,
            question_id: question,
            text: text.to_string(),
            order,
            is_active: active,
        })
        .expect("choice");
}

pub(super) fn field(question: QuestionId) -> String {
    format!("q_{question}")
}

pub(super) fn steady_path() -> RawSelections {
    RawSelections::new()
        .with(field(LOAD), STEADY)
        .with(field(MOUNTING), FOOT)
}

pub(super) fn shock_path() -> RawSelections {
    RawSelections::new()
        .with(field(LOAD), SHOCK)
        .with(field(FREQUENCY), HOURLY)
}

pub(super) fn participant() -> Participant {
    Participant {
        name: "Dana Buyer".to_string(),
        email: "dana@example.com".to_string(),
        phone: "+1 555 0100".to_string(),
        designation: "Plant engineer".to_string(),
        company: "Acme Mills".to_string(),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
