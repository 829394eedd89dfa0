//! Templated synthetic commands for the statistical intent classifier

use crate::core::types::{Intent, TaskStatus};

/// Construction task names substituted into every template
pub const TRAINING_TASKS: &[&str] = &[
    "Foundation Piling",
    "Pile Caps",
    "Elevator Raft",
    "Grade Beams",
    "Grade Beams Pour #1",
    "Grade Beams Pour #4",
    "Grade Beams Pour #9",
    "Install Elevator Pits",
    "Feature Wall Pours",
    "Main Floor Glazing Installation",
    "Main Floor Drywall Installation",
    "Second Floor Door Installation",
    "Second Floor Railing",
    "Roof Door Installation",
    "Exterior Wall Installation",
    "Site Preparation",
    "Land Surveying",
    "Concrete Pouring",
    "Rebar Installation",
    "Structural Framing",
    "Bricklaying",
    "Roofing",
    "Electrical Wiring",
    "Plumbing Installation",
    "HVAC Installation",
    "Insulation Installation",
    "Tile Installation",
    "Painting and Decorating",
    "Cabinet Installation",
    "Exterior Siding",
    "Landscaping",
    "Fencing Installation",
    "Driveway Paving",
    "Final Inspection",
    "Punch List Completion",
    "Site Cleanup",
    "Waterproofing",
    "Utility Connections",
];

const STATUS_TEMPLATES: &[&str] = &[
    "Update {task} status to {status}",
    "Change {task} to {status}",
    "Set {task} as {status}",
    "Mark {task} {status}",
    "Can you update {task} to {status}",
    "Please change {task} status to {status}",
];

const CREATE_TEMPLATES: &[&str] = &[
    "Create a new task for {task}",
    "Add task {task}",
    "Set up {task}",
    "I need a new task for {task}",
    "Can you create {task}",
    "Please add {task} to the list",
];

const DATE_TEMPLATES: &[&str] = &[
    "Move {task} to {date}",
    "Reschedule {task} for {date}",
    "Push {task} back to {date}",
    "{task} should start on {date}",
    "{task} should finish by {date}",
    "Shift {task} to {date}",
];

const DELETE_TEMPLATES: &[&str] = &[
    "Delete {task}",
    "Remove {task} from the schedule",
    "Cancel {task}",
    "Get rid of {task}",
    "Take {task} off the schedule",
    "{task} is no longer needed",
];

const TRAINING_DATES: &[&str] = &["March 9", "April 4", "next Friday", "June 15", "tomorrow"];

/// Hand-written commands covering the canonical site tasks
const SPECIFIC_EXAMPLES: &[(&str, Intent)] = &[
    (
        "Update start date for door 1000 installation to March 9",
        Intent::UpdateDate,
    ),
    (
        "Update finish date for door 1000 installation to March 9",
        Intent::UpdateDate,
    ),
    (
        "Update the status for stair 1000 to in progress",
        Intent::UpdateStatus,
    ),
    ("Update the status for slab A to complete", Intent::UpdateStatus),
    ("Update the status for window B to on hold", Intent::UpdateStatus),
    ("Add painting task", Intent::CreateTask),
    ("Add railing task", Intent::CreateTask),
    ("Delete railing task", Intent::DeleteTask),
];

/// One labelled training command
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    pub text: String,
    pub intent: Intent,
}

impl TrainingExample {
    fn new(text: impl Into<String>, intent: Intent) -> Self {
        Self {
            text: text.into(),
            intent,
        }
    }
}

fn fill(template: &str, task: &str) -> String {
    template.replace("{task}", task)
}

/// The full synthetic corpus, all four intents
pub fn generate_training_data() -> Vec<TrainingExample> {
    let mut examples = Vec::new();

    for task in TRAINING_TASKS {
        for status in TaskStatus::ALL {
            for template in STATUS_TEMPLATES {
                let text = fill(template, task).replace("{status}", status.as_str());
                examples.push(TrainingExample::new(text, Intent::UpdateStatus));
            }
        }
        for template in CREATE_TEMPLATES {
            examples.push(TrainingExample::new(fill(template, task), Intent::CreateTask));
        }
        for (i, template) in DATE_TEMPLATES.iter().enumerate() {
            for date in TRAINING_DATES.iter().skip(i % 2) {
                let text = fill(template, task).replace("{date}", date);
                examples.push(TrainingExample::new(text, Intent::UpdateDate));
            }
        }
        for template in DELETE_TEMPLATES {
            examples.push(TrainingExample::new(fill(template, task), Intent::DeleteTask));
        }
    }

    examples.extend(
        SPECIFIC_EXAMPLES
            .iter()
            .map(|(text, intent)| TrainingExample::new(*text, *intent)),
    );
    examples
}
