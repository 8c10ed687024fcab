//! Speaker-note extraction from `.pptx` presentations.
//!
//! A `.pptx` is an Office Open XML zip package. Slide order comes from the
//! `<p:sldIdLst>` in `ppt/presentation.xml`; each entry points (through
//! `ppt/_rels/presentation.xml.rels`) at a slide part, whose own `.rels`
//! file may point at a notes-slide part. The note text is the body
//! placeholder of that notes slide; other shapes (slide image, slide
//! number) are ignored.
//!
//! Only the handful of elements needed for this walk are matched, with
//! regular expressions, which keeps the crate free of a full XML stack.

use crate::error::Deck2VideoError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};
use zip::ZipArchive;

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const NOTES_SLIDE_REL_TYPE: &str = "/notesSlide";

static RE_SLIDE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<(?:\w+:)?sldId\s[^>]*?\br:id="([^"]+)""#).unwrap());
static RE_RELATIONSHIP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<Relationship\s([^>]*?)/?>"#).unwrap());
static RE_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"([\w:]+)="([^"]*)""#).unwrap());
static RE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<p:sp\b[^>]*>(.*?)</p:sp>"#).unwrap());
static RE_BODY_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<p:ph\b[^>]*\btype="body""#).unwrap());
static RE_PARAGRAPH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<a:p(?:\s[^>]*)?/>|<a:p(?:\s[^>]*)?>(.*?)</a:p>"#).unwrap()
});
static RE_RUN_OR_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<a:t(?:\s[^>]*)?>(.*?)</a:t>|<a:br\b[^>]*/>"#).unwrap());
static RE_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"&(#x[0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos);"#).unwrap());

/// Extract speaker notes, one entry per slide in presentation order.
///
/// A slide without a notes part, without a body placeholder, or whose note
/// is empty or whitespace-only yields `None`. Returned notes are trimmed.
pub fn extract_speaker_notes(path: &Path) -> Result<Vec<Option<String>>, Deck2VideoError> {
    info!("Extracting speaker notes from: {}", path.display());
    let fail = |detail: String| Deck2VideoError::DeckParseFailed {
        path: path.to_path_buf(),
        detail,
    };

    let file = File::open(path).map_err(|e| fail(e.to_string()))?;
    let mut archive = ZipArchive::new(file).map_err(|e| fail(e.to_string()))?;

    let presentation = read_part(&mut archive, PRESENTATION_PART)
        .map_err(&fail)?
        .ok_or_else(|| fail(format!("missing {PRESENTATION_PART}")))?;
    let presentation_rels = read_part(&mut archive, &rels_path_for(PRESENTATION_PART))
        .map_err(&fail)?
        .ok_or_else(|| fail("missing presentation relationships".into()))?;
    let presentation_targets = parse_relationships(&presentation_rels);

    let mut notes = Vec::new();
    for (i, rid) in slide_relationship_ids(&presentation).iter().enumerate() {
        let slide_num = i + 1;
        let slide_part = presentation_targets
            .get(rid.as_str())
            .map(|(_, target)| resolve_target(PRESENTATION_PART, target))
            .ok_or_else(|| fail(format!("slide {slide_num}: unknown relationship {rid}")))?;

        let note = match notes_part_for_slide(&mut archive, &slide_part).map_err(&fail)? {
            Some(notes_part) => read_part(&mut archive, &notes_part)
                .map_err(&fail)?
                .and_then(|xml| notes_body_text(&xml)),
            None => None,
        };

        match &note {
            Some(text) => debug!(
                "Found speaker notes for slide {}: {} characters",
                slide_num,
                text.chars().count()
            ),
            None => debug!("No speaker notes found for slide {}", slide_num),
        }
        notes.push(note);
    }

    info!("Extracted speaker notes for {} slides", notes.len());
    Ok(notes)
}

/// Relationship ids of the slides, in presentation order.
fn slide_relationship_ids(presentation_xml: &str) -> Vec<String> {
    RE_SLIDE_ID
        .captures_iter(presentation_xml)
        .map(|c| c[1].to_string())
        .collect()
}

/// Map of relationship `Id` → (`Type`, `Target`).
fn parse_relationships(rels_xml: &str) -> HashMap<String, (String, String)> {
    RE_RELATIONSHIP
        .captures_iter(rels_xml)
        .filter_map(|c| {
            let attrs: HashMap<&str, &str> = RE_ATTRIBUTE
                .captures_iter(c.get(1)?.as_str())
                .filter_map(|a| Some((a.get(1)?.as_str(), a.get(2)?.as_str())))
                .collect();
            Some((
                attrs.get("Id")?.to_string(),
                (
                    attrs.get("Type").copied().unwrap_or_default().to_string(),
                    attrs.get("Target")?.to_string(),
                ),
            ))
        })
        .collect()
}

fn notes_part_for_slide(
    archive: &mut ZipArchive<File>,
    slide_part: &str,
) -> Result<Option<String>, String> {
    let Some(rels) = read_part(archive, &rels_path_for(slide_part))? else {
        return Ok(None);
    };
    Ok(parse_relationships(&rels)
        .into_values()
        .find(|(kind, _)| kind.ends_with(NOTES_SLIDE_REL_TYPE))
        .map(|(_, target)| resolve_target(slide_part, &target)))
}

/// Text of the body placeholder of a notes slide, paragraphs joined by `\n`.
fn notes_body_text(notes_xml: &str) -> Option<String> {
    let body = RE_SHAPE
        .captures_iter(notes_xml)
        .map(|c| c.get(1).map_or("", |m| m.as_str()))
        .find(|shape| RE_BODY_PLACEHOLDER.is_match(shape))?;

    let paragraphs: Vec<String> = RE_PARAGRAPH
        .captures_iter(body)
        .map(|p| {
            RE_RUN_OR_BREAK
                .captures_iter(p.get(1).map_or("", |m| m.as_str()))
                .map(|r| match r.get(1) {
                    Some(text) => unescape_xml(text.as_str()),
                    None => "\n".to_string(),
                })
                .collect::<String>()
        })
        .collect();

    crate::narration::decide(Some(&paragraphs.join("\n")))
}

fn unescape_xml(s: &str) -> String {
    RE_ENTITY
        .replace_all(s, |c: &regex::Captures| {
            let entity = &c[1];
            match entity {
                "amp" => "&".to_string(),
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                _ => {
                    let code = match entity.strip_prefix("#x") {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => entity[1..].parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                        .map(String::from)
                        .unwrap_or_else(|| c[0].to_string())
                }
            }
        })
        .into_owned()
}

/// `ppt/slides/slide1.xml` → `ppt/slides/_rels/slide1.xml.rels`
fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

/// Resolve a relationship target relative to the directory of `source_part`.
fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = source_part.split('/').collect();
    segments.pop();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

fn read_part(archive: &mut ZipArchive<File>, name: &str) -> Result<Option<String>, String> {
    match archive.by_name(name) {
        Ok(mut entry) => {
            let mut xml = String::new();
            entry
                .read_to_string(&mut xml)
                .map_err(|e| format!("{name}: {e}"))?;
            Ok(Some(xml))
        }
        Err(zip::result::ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(format!("{name}: {e}")),
    }
}
