//! Suggestion Generator: turns missing skills into résumé improvement sentences.

use serde::{Deserialize, Serialize};

/// Where a selected suggestion should land in the patched document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// Inline, as a new entry in the existing skills list.
    #[default]
    SkillsBlock,
    /// As a bullet in the appended "Added Skills / Projects" section.
    Bullet,
}

/// An improvement suggestion for one skill. `destination` is chosen by the
/// caller when it sends a selection back for patching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub skill: String,
    pub text: String,
    #[serde(default)]
    pub destination: Destination,
}

/// Canned project examples, keyed by canonical skill name.
const TEMPLATES: &[(&str, &str)] = &[
    ("python", "automated data cleaning and reporting scripts used by the team"),
    ("sql", "wrote analytical queries and views over production reporting tables"),
    ("pytorch", "trained and evaluated a neural network classifier on a custom dataset"),
    ("tensorflow", "built and trained a Keras model and exported it for serving"),
    ("scikit-learn", "built a feature pipeline and tuned a gradient-boosted baseline model"),
    ("pandas", "cleaned and reshaped tabular data for downstream analysis"),
    ("docker", "containerized a service with a reproducible multi-stage image"),
    ("kubernetes", "deployed and scaled a containerized service on a managed cluster"),
    ("fastapi", "exposed a model behind a typed REST endpoint with request validation"),
    ("react", "built an interactive dashboard front end with reusable components"),
    ("node.js", "developed a backend service handling authenticated API requests"),
    ("nlp", "built a text classification pipeline with tokenization and evaluation"),
    ("computer vision", "trained an image classification or detection model on labeled data"),
    ("ocr", "extracted structured fields from scanned documents with an OCR pipeline"),
    ("huggingface", "fine-tuned a pretrained transformer from the Hugging Face hub"),
    ("transformers", "fine-tuned a transformer model for a downstream task"),
    ("model deployment", "served a trained model behind an API with monitoring and versioning"),
    ("data engineering", "designed batch pipelines that load and validate raw data"),
    ("etl", "built an extract-transform-load job feeding a reporting warehouse"),
    ("prompt engineering", "iterated on prompts with an evaluation set to improve output quality"),
    ("langchain", "built a retrieval chain over internal documents"),
    ("rag", "built retrieval-augmented generation over a vector index of documents"),
    ("rest api", "designed and documented REST endpoints consumed by a client app"),
    ("aws", "deployed services on AWS using managed compute and storage"),
    ("google cloud", "ran workloads on Google Cloud with managed storage and compute"),
    ("git", "maintained feature branches and reviewed pull requests"),
    ("linux", "administered Linux hosts and automated setup with shell scripts"),
];

/// Returns the improvement sentence for `skill`.
///
/// Known skills get `"Implemented <skill>: <example>."`, anything else the
/// generic `"Worked with <skill>: add a project example."`.
pub fn suggest(skill: &str) -> String {
    match TEMPLATES.iter().find(|(name, _)| *name == skill) {
        Some((_, example)) => format!("Implemented {skill}: {example}."),
        None => format!("Worked with {skill}: add a project example."),
    }
}

/// One suggestion per missing skill, in the given order.
pub fn suggest_all(missing: &[String]) -> Vec<Suggestion> {
    missing
        .iter()
        .map(|skill| Suggestion {
            skill: skill.clone(),
            text: suggest(skill),
            destination: Destination::default(),
        })
        .collect()
}

/// Splits caller-selected suggestions into the two patch inputs:
/// skill names to inline into the skills block, and bullet texts to append.
/// Order of the selection is preserved in both lists.
pub fn partition_selections(selections: &[Suggestion]) -> (Vec<String>, Vec<String>) {
    let mut skills_to_inline = Vec::new();
    let mut bullets_to_append = Vec::new();

    for selection in selections {
        match selection.destination {
            Destination::SkillsBlock => skills_to_inline.push(selection.skill.clone()),
            Destination::Bullet => bullets_to_append.push(selection.text.clone()),
        }
    }

    (skills_to_inline, bullets_to_append)
}
