use std::collections::{BTreeSet, HashMap};

use super::domain::{ChoiceId, GroupId, Question, QuestionId};

/// Catalog authoring errors rejected before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogViolation {
    #[error("question {question} lists trigger choices but has no parent question")]
    TriggerWithoutParent { question: QuestionId },
    #[error("question {question} cannot depend on itself")]
    SelfDependency { question: QuestionId },
    #[error("question {question} depends on unknown question {parent}")]
    UnknownParent {
        question: QuestionId,
        parent: QuestionId,
    },
    #[error("question {question} depends on question {parent} from group {parent_group}")]
    CrossGroupParent {
        question: QuestionId,
        parent: QuestionId,
        parent_group: GroupId,
    },
    #[error(
        "trigger choice {choice} of question {question} does not belong to parent question {parent}"
    )]
    ForeignTriggerChoice {
        question: QuestionId,
        choice: ChoiceId,
        parent: QuestionId,
    },
    #[error("question {question} is part of a dependency cycle")]
    DependencyCycle { question: QuestionId },
    #[error("choice {choice} refers to unknown question {question}")]
    UnknownQuestion {
        choice: ChoiceId,
        question: QuestionId,
    },
    #[error("choice {choice} is not an option of question {question}")]
    ForeignAnswerChoice {
        question: QuestionId,
        choice: ChoiceId,
    },
}

/// Check a question's parent linkage against the rest of the catalog.
///
/// `choice_owner` resolves a choice id to the question that owns it and
/// `stored` looks up an existing question. Parents must belong to the same
/// group, since the quiz only reads selections from its own questions.
pub fn check_dependency<'q, O, S>(
    question: &Question,
    choice_owner: O,
    stored: S,
) -> Result<(), CatalogViolation>
where
    O: Fn(ChoiceId) -> Option<QuestionId>,
    S: Fn(QuestionId) -> Option<&'q Question>,
{
    let Some(parent) = question.depends_on else {
        if question.trigger_choices.is_empty() {
            return Ok(());
        }
        return Err(CatalogViolation::TriggerWithoutParent {
            question: question.id,
        });
    };

    if parent == question.id {
        return Err(CatalogViolation::SelfDependency {
            question: question.id,
        });
    }

    let Some(parent_question) = stored(parent) else {
        return Err(CatalogViolation::UnknownParent {
            question: question.id,
            parent,
        });
    };
    if parent_question.group_id != question.group_id {
        return Err(CatalogViolation::CrossGroupParent {
            question: question.id,
            parent,
            parent_group: parent_question.group_id,
        });
    }

    if let Some(choice) = question
        .trigger_choices
        .iter()
        .copied()
        .find(|choice| choice_owner(*choice) != Some(parent))
    {
        return Err(CatalogViolation::ForeignTriggerChoice {
            question: question.id,
            choice,
            parent,
        });
    }

    // Walk the ancestors of the parent; meeting this question again closes a loop.
    let mut visited = BTreeSet::from([question.id]);
    let mut cursor = Some(parent);
    while let Some(current) = cursor {
        if !visited.insert(current) {
            return Err(CatalogViolation::DependencyCycle {
                question: question.id,
            });
        }
        cursor = stored(current).and_then(|ancestor| ancestor.depends_on);
    }

    Ok(())
}

/// Find the first question whose `depends_on` chain loops back on itself.
pub fn find_cycle(parents: &HashMap<QuestionId, QuestionId>) -> Option<QuestionId> {
    let mut cleared: BTreeSet<QuestionId> = BTreeSet::new();
    let mut starts: Vec<QuestionId> = parents.keys().copied().collect();
    starts.sort();

    for start in starts {
        if cleared.contains(&start) {
            continue;
        }
        let mut path = BTreeSet::new();
        let mut cursor = Some(start);
        while let Some(current) = cursor {
            if cleared.contains(&current) {
                break;
            }
            if !path.insert(current) {
                return Some(current);
            }
            cursor = parents.get(&current).copied();
        }
        cleared.extend(path);
    }

    None
}
