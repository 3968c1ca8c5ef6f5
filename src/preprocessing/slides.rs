//! Speaker-notes extraction from `.pptx` packages.
//!
//! A presentation is a zip archive of XML parts. Slide order lives in
//! `ppt/presentation.xml`, each slide points at its notes page through its
//! relationships part, and the notes text sits in the notes page's `body`
//! placeholder.

use crate::domain::errors::AppError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;
use zip::result::ZipError;

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const NOTES_SLIDE_REL: &str = "/notesSlide";

static SLIDE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<p:sldId\b[^>]*\sr:id=(?:"([^"]+)"|'([^']+)')"#).unwrap());
static RELATIONSHIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"<Relationship\b[^>]*>").unwrap());
static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"([\w:]+)=(?:"([^"]*)"|'([^']*)')"#).unwrap());
static SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<p:sp\b[^>]*>.*?</p:sp>").unwrap());
static BODY_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<p:ph\b[^>]*\btype=["']body["']"#).unwrap());
static PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<a:p(?:\s[^>]*?)?(?:/>|>(.*?)</a:p>)").unwrap());
static RUN_OR_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<a:t(?:\s[^>]*)?>(.*?)</a:t>|<a:br\b[^>]*/?>").unwrap());
static ENTITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos);").unwrap());

/// Notes text of every slide, in presentation order. `None` marks a slide
/// with no notes page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlideDeck {
    pub notes: Vec<Option<String>>,
}

impl SlideDeck {
    pub fn from_notes(notes: Vec<Option<String>>) -> Self {
        SlideDeck { notes }
    }

    pub fn open(path: &Path) -> Result<Self, AppError> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, AppError> {
        let mut archive = ZipArchive::new(reader)?;
        let presentation = read_part(&mut archive, PRESENTATION_PART)?
            .ok_or_else(|| AppError::Presentation(format!("missing {}", PRESENTATION_PART)))?;
        let presentation_rels = read_relationships(&mut archive, PRESENTATION_PART)?;

        let mut notes = Vec::new();
        for caps in SLIDE_ID.captures_iter(&presentation) {
            let rel_id = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            let slide_part = presentation_rels
                .iter()
                .find(|rel| rel.id == rel_id)
                .map(|rel| resolve_target(PRESENTATION_PART, &rel.target))
                .ok_or_else(|| AppError::Presentation(format!("slide relationship {} has no target", rel_id)))?;
            notes.push(read_slide_notes(&mut archive, &slide_part)?);
        }
        Ok(SlideDeck { notes })
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

#[derive(Debug)]
struct Relationship {
    id: String,
    rel_type: String,
    target: String,
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>, AppError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut text = String::new();
    file.read_to_string(&mut text)?;
    Ok(Some(text))
}

/// `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`
fn rels_part(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

fn read_relationships<R: Read + Seek>(archive: &mut ZipArchive<R>, part: &str) -> Result<Vec<Relationship>, AppError> {
    let Some(xml) = read_part(archive, &rels_part(part))? else {
        return Ok(Vec::new());
    };
    let rels = RELATIONSHIP
        .find_iter(&xml)
        .filter_map(|tag| {
            let attrs: HashMap<&str, &str> = ATTRIBUTE
                .captures_iter(tag.as_str())
                .map(|c| {
                    let value = c.get(2).or_else(|| c.get(3)).map_or("", |m| m.as_str());
                    (c.get(1).map_or("", |m| m.as_str()), value)
                })
                .collect();
            Some(Relationship {
                id: attrs.get("Id")?.to_string(),
                rel_type: attrs.get("Type").copied().unwrap_or_default().to_string(),
                target: attrs.get("Target")?.to_string(),
            })
        })
        .collect();
    Ok(rels)
}

/// Resolves a relationship target against the directory of `source_part`.
fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = source_part.split('/').collect();
    segments.pop();
    for piece in target.split('/') {
        match piece {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn read_slide_notes<R: Read + Seek>(archive: &mut ZipArchive<R>, slide_part: &str) -> Result<Option<String>, AppError> {
    let notes_part = read_relationships(archive, slide_part)?
        .into_iter()
        .find(|rel| rel.rel_type.ends_with(NOTES_SLIDE_REL))
        .map(|rel| resolve_target(slide_part, &rel.target));
    let Some(notes_part) = notes_part else {
        return Ok(None);
    };
    let Some(xml) = read_part(archive, &notes_part)? else {
        log::warn!("{} references missing notes part {}", slide_part, notes_part);
        return Ok(None);
    };
    Ok(notes_body_text(&xml))
}

/// Text of the `body` placeholder: paragraphs joined by newlines.
fn notes_body_text(xml: &str) -> Option<String> {
    let shape = SHAPE.find_iter(xml).find(|s| BODY_PLACEHOLDER.is_match(s.as_str()))?;
    let paragraphs: Vec<String> = PARAGRAPH
        .captures_iter(shape.as_str())
        .map(|p| {
            let inner = p.get(1).map_or("", |m| m.as_str());
            RUN_OR_BREAK
                .captures_iter(inner)
                .map(|token| match token.get(1) {
                    Some(run) => unescape(run.as_str()),
                    None => "\n".to_string(),
                })
                .collect::<String>()
        })
        .collect();
    Some(paragraphs.join("\n"))
}

fn unescape(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => {
                    let code = match entity.strip_prefix("#x") {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => entity[1..].parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
