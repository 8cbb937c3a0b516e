//! Document Patcher: adds selected skills to the résumé's skills block and appends
//! suggestion bullets, leaving every other paragraph untouched.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::analysis::normalize::normalize_strict;
use crate::document::model::{NewParagraph, Paragraph, ResumeDocument};
use crate::document::styles::{BULLET_STYLE, HEADING_STYLE};
use crate::document::DocumentFormatError;

pub const SKILLS_HEADING: &str = "SKILLS";
pub const ADDED_SECTION_HEADER: &str = "Added Skills / Projects";
pub const SKILL_DELIMITER: &str = " | ";
const BULLET_PREFIX: &str = "• ";

static SKILLS_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)skills").expect("Invalid regex"));

static SKILLS_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[\w\s]*\bskills\s*:?\s*$").expect("Invalid regex"));

/// Default skills-block locator: the paragraph text contains "skills", any case.
/// The section header this patcher appends for bullets never counts.
pub fn is_skills_block(paragraph: &Paragraph) -> bool {
    let text = paragraph.text().trim();
    text != ADDED_SECTION_HEADER && SKILLS_WORD.is_match(text)
}

/// The located paragraph only names the section ("SKILLS", "Technical Skills:",
/// a heading-styled title); its list lives in the next non-blank paragraph.
fn is_section_title(paragraph: &Paragraph) -> bool {
    let text = paragraph.text().trim();
    if paragraph.style().is_some_and(|s| s.starts_with("Heading") || s == "Title") {
        return true;
    }
    if SKILLS_TITLE.is_match(text) {
        return true;
    }
    matches!(split_label(text), (Some(_), list) if list.trim().is_empty())
}

fn next_non_blank(document: &ResumeDocument, after: usize) -> Option<usize> {
    document
        .paragraphs()
        .iter()
        .enumerate()
        .skip(after + 1)
        .find(|(_, p)| !p.text().trim().is_empty())
        .map(|(i, _)| i)
}

/// Parses, patches and re-serializes a .docx byte stream.
pub fn patch_document(
    bytes: &[u8],
    skills_to_inline: &[String],
    bullets_to_append: &[String],
) -> Result<Vec<u8>, DocumentFormatError> {
    let document = ResumeDocument::from_bytes(bytes)?;
    patch(document, skills_to_inline, bullets_to_append).into_bytes()
}

/// Applies the edits using the default skills-block locator.
pub fn patch(
    document: ResumeDocument,
    skills_to_inline: &[String],
    bullets_to_append: &[String],
) -> ResumeDocument {
    patch_with(document, skills_to_inline, bullets_to_append, is_skills_block)
}

/// Applies the edits, locating the skills block with `locate`.
///
/// 1. Skills go into the first located paragraph, deduplicated by strict form and
///    rejoined with `" | "`. When that paragraph is only a section title the list
///    is the next non-blank paragraph. Without a located paragraph a new "SKILLS"
///    heading and list are appended.
/// 2. Bullets are appended after a blank paragraph and a section header.
pub fn patch_with<F>(
    mut document: ResumeDocument,
    skills_to_inline: &[String],
    bullets_to_append: &[String],
    locate: F,
) -> ResumeDocument
where
    F: Fn(&Paragraph) -> bool,
{
    let skills = dedup_skills(skills_to_inline);

    if !skills.is_empty() {
        match document.find_paragraph(&locate) {
            Some(found) => {
                let target = if is_section_title(&document.paragraphs()[found]) {
                    next_non_blank(&document, found)
                } else {
                    Some(found)
                };
                match target {
                    Some(index) => {
                        let existing = document.paragraphs()[index].text().to_string();
                        match merge_skill_list(&existing, &skills) {
                            Some(merged) => {
                                debug!(index, "Rewriting skills block");
                                document.replace_text(index, &merged);
                            }
                            None => debug!(index, "Skills block already lists every skill"),
                        }
                    }
                    None => {
                        debug!(found, "Skills title has no list below it; appending one");
                        document.append(NewParagraph::bold(skills.join(SKILL_DELIMITER)));
                    }
                }
            }
            None => {
                info!("No skills block found; appending a new skills section");
                document.append(heading(&document, SKILLS_HEADING));
                document.append(NewParagraph::bold(skills.join(SKILL_DELIMITER)));
            }
        }
    }

    let bullets: Vec<&str> = bullets_to_append
        .iter()
        .map(|b| b.trim())
        .filter(|b| !b.is_empty())
        .collect();

    if !bullets.is_empty() {
        document.append(NewParagraph::blank());
        document.append(heading(&document, ADDED_SECTION_HEADER));
        let has_bullet_style = document.styles().has(BULLET_STYLE);
        for bullet in bullets {
            let paragraph = if has_bullet_style {
                NewParagraph::styled(bullet, BULLET_STYLE)
            } else {
                NewParagraph::plain(format!("{BULLET_PREFIX}{bullet}"))
            };
            document.append(paragraph);
        }
    }

    document
}

fn heading(document: &ResumeDocument, text: &str) -> NewParagraph {
    if document.styles().has(HEADING_STYLE) {
        NewParagraph::styled(text, HEADING_STYLE)
    } else {
        NewParagraph::bold(text)
    }
}

/// Trimmed, non-empty skills with strict-form duplicates removed, order kept.
fn dedup_skills(skills: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| {
            let key = normalize_strict(s);
            !key.is_empty() && seen.insert(key)
        })
        .map(str::to_string)
        .collect()
}

/// Merges `new_skills` into an existing skills line.
///
/// The delimiter is detected in order `|`, `,`, whitespace; output always uses
/// `" | "`. A leading label such as `"Skills:"` is kept in front of the list.
/// Returns `None` when every new skill is already present.
pub fn merge_skill_list(existing: &str, new_skills: &[String]) -> Option<String> {
    let (label, list) = split_label(existing);
    let mut segments = split_segments(list);
    let mut seen: HashSet<String> = segments.iter().map(|s| normalize_strict(s)).collect();

    let before = segments.len();
    for skill in new_skills {
        let skill = skill.trim();
        let key = normalize_strict(skill);
        if !key.is_empty() && seen.insert(key) {
            segments.push(skill.to_string());
        }
    }
    if segments.len() == before {
        return None;
    }

    let joined = segments.join(SKILL_DELIMITER);
    Some(match label {
        Some(label) => format!("{label}: {joined}"),
        None => joined,
    })
}

fn split_label(text: &str) -> (Option<&str>, &str) {
    match text.split_once(':') {
        Some((head, rest)) if SKILLS_WORD.is_match(head) => (Some(head.trim()), rest),
        _ => (None, text),
    }
}

fn split_segments(list: &str) -> Vec<String> {
    let parts: Vec<&str> = if list.contains('|') {
        list.split('|').collect()
    } else if list.contains(',') {
        list.split(',').collect()
    } else {
        list.split_whitespace().collect()
    };
    parts
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
