//! XML manifest parser for git-repo compatible manifests

use super::records::RepositoryRecord;
use crate::{RepoDepsError, Result};
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;

/// Entities XML defines without a DTD
const PREDEFINED_ENTITIES: [&[u8]; 5] = [b"lt", b"gt", b"amp", b"apos", b"quot"];

/// Parse the `project` children of a manifest's root element
///
/// Records come back in document order. `project` elements nested below the
/// root's direct children are not part of the list. Any well-formedness
/// problem is reported as [`RepoDepsError::MalformedXml`].
pub fn parse_projects(xml: &str) -> Result<Vec<RepositoryRecord>> {
    let mut reader = Reader::from_str(xml);
    let config = reader.config_mut();
    config.trim_text(true);
    config.check_comments = true;

    let mut records = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                open_element(&mut seen_root, depth, &reader)?;
                let attributes = read_element(e, &reader)?;
                if depth == 1 && e.name().as_ref() == b"project" {
                    records.push(project_record(attributes));
                }
                depth += 1;
            }
            Ok(Event::Empty(ref e)) => {
                // Self-closing tags like <project ... />
                open_element(&mut seen_root, depth, &reader)?;
                let attributes = read_element(e, &reader)?;
                if depth == 1 && e.name().as_ref() == b"project" {
                    records.push(project_record(attributes));
                }
            }
            Ok(Event::End(_)) => {
                if depth == 0 {
                    return Err(malformed(&reader, "closing tag without matching opening tag"));
                }
                depth -= 1;
            }
            Ok(Event::Text(ref t)) if depth == 0 => {
                if !t.iter().all(u8::is_ascii_whitespace) {
                    return Err(malformed(&reader, "text outside the root element"));
                }
            }
            Ok(Event::CData(_)) | Ok(Event::GeneralRef(_)) if depth == 0 => {
                return Err(malformed(&reader, "text outside the root element"));
            }
            Ok(Event::GeneralRef(ref r)) => check_reference(r, &reader)?,
            Ok(Event::Eof) => {
                if depth > 0 {
                    return Err(malformed(&reader, "unexpected end of document, unclosed element"));
                }
                if !seen_root {
                    return Err(malformed(&reader, "no root element found"));
                }
                break;
            }
            Err(e) => {
                return Err(RepoDepsError::MalformedXml(format!(
                    "{} (at byte {})",
                    e,
                    reader.error_position()
                )));
            }
            _ => {}
        }
    }

    tracing::debug!(projects = records.len(), "Parsed manifest");
    Ok(records)
}

/// Read a manifest from disk and parse it
pub fn parse_projects_from_file(path: &Path) -> Result<Vec<RepositoryRecord>> {
    let content = std::fs::read_to_string(path)?;
    parse_projects(&content)
}

/// Track the document element; a second top-level element is an error
fn open_element(seen_root: &mut bool, depth: usize, reader: &Reader<&[u8]>) -> Result<()> {
    if depth == 0 {
        if *seen_root {
            return Err(malformed(reader, "junk after document element"));
        }
        *seen_root = true;
    }
    Ok(())
}

fn malformed(reader: &Reader<&[u8]>, msg: &str) -> RepoDepsError {
    RepoDepsError::MalformedXml(format!("{} (at byte {})", msg, reader.buffer_position()))
}

/// Check an element's name and attributes, returning the unescaped attributes
///
/// Every element is checked, not just `project`, so a bad attribute anywhere
/// in the document rejects it.
fn read_element(e: &BytesStart, reader: &Reader<&[u8]>) -> Result<Vec<(Vec<u8>, String)>> {
    let name = e.name();
    if !is_xml_name(name.as_ref()) {
        return Err(malformed(
            reader,
            &format!("invalid element name '{}'", String::from_utf8_lossy(name.as_ref())),
        ));
    }

    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| malformed(reader, &format!("invalid attribute: {}", e)))?;
        let key = attr.key.as_ref();
        if !is_xml_name(key) {
            return Err(malformed(
                reader,
                &format!("invalid attribute name '{}'", String::from_utf8_lossy(key)),
            ));
        }
        if attr.value.contains(&b'<') {
            return Err(malformed(reader, "'<' not allowed in attribute value"));
        }

        let value = attr
            .unescape_value()
            .map_err(|e| malformed(reader, &format!("invalid attribute value: {}", e)))?
            .into_owned();
        attributes.push((key.to_vec(), value));
    }

    Ok(attributes)
}

/// Build a record from the attributes of a `project` element
fn project_record(attributes: Vec<(Vec<u8>, String)>) -> RepositoryRecord {
    let mut record = RepositoryRecord::default();

    for (key, value) in attributes {
        match key.as_slice() {
            b"name" => record.repository = value,
            b"path" => record.target_path = value,
            b"remote" => record.remote = value,
            b"revision" => record.branch = value,
            _ => {}
        }
    }

    record
}

/// Only character references and the predefined entities can appear in
/// content, since manifests carry no DTD
fn check_reference(r: &BytesRef, reader: &Reader<&[u8]>) -> Result<()> {
    match r.resolve_char_ref() {
        Ok(Some(_)) => Ok(()),
        Ok(None) => {
            let name: &[u8] = r;
            if PREDEFINED_ENTITIES.contains(&name) {
                Ok(())
            } else {
                Err(malformed(
                    reader,
                    &format!("undefined entity '&{};'", String::from_utf8_lossy(name)),
                ))
            }
        }
        Err(e) => Err(malformed(reader, &format!("invalid character reference: {}", e))),
    }
}

/// XML `Name` production, with any non-ASCII byte accepted as a name character
fn is_xml_name(name: &[u8]) -> bool {
    let is_start = |b: u8| b.is_ascii_alphabetic() || b == b'_' || b == b':' || b >= 0x80;

    match name.split_first() {
        Some((&first, rest)) => {
            is_start(first)
                && rest
                    .iter()
                    .all(|&b| is_start(b) || b.is_ascii_digit() || b == b'-' || b == b'.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE_MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <manifest>
            <remote name="aosp" fetch="https://android.googlesource.com" />
            <default revision="main" remote="aosp" sync-j="4" />

            <!-- platform projects -->
            <project path="src/core" name="core" remote="aosp" revision="main" />

            <project path="services/api" name="backend/api" remote="github" revision="develop">
                <annotation key="owner" value="api-team" />
            </project>

            <project path="vendor/lib" name="vendor-lib" />
        </manifest>
    "#;

    #[test]
    fn test_parse_manifest() {
        let records = parse_projects(EXAMPLE_MANIFEST).unwrap();

        assert_eq!(records.len(), 3);

        assert_eq!(
            records[0],
            RepositoryRecord::new("core", "src/core", "aosp", "main")
        );

        let api = &records[1];
        assert_eq!(api.repository, "backend/api");
        assert_eq!(api.target_path, "services/api");
        assert_eq!(api.remote, "github");
        assert_eq!(api.branch, "develop");

        // Missing attributes come back empty, not inherited from <default>
        let vendor = &records[2];
        assert_eq!(vendor.repository, "vendor-lib");
        assert_eq!(vendor.remote, "");
        assert_eq!(vendor.branch, "");
    }

    #[test]
    fn test_single_project_scenario() {
        let xml = r#"<manifest><project name="core" path="src/core" remote="aosp" revision="main"/></manifest>"#;
        let records = parse_projects(xml).unwrap();
        assert_eq!(
            records,
            vec![RepositoryRecord::new("core", "src/core", "aosp", "main")]
        );
    }

    #[test]
    fn test_document_order_preserved() {
        let xml = r#"<manifest>
            <project name="c" path="c"/>
            <project name="a" path="a"/>
            <project name="b" path="b"/>
        </manifest>"#;

        let names: Vec<_> = parse_projects(xml)
            .unwrap()
            .into_iter()
            .map(|r| r.repository)
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_empty_manifest() {
        assert!(parse_projects("<manifest/>").unwrap().is_empty());
        assert!(parse_projects("<manifest></manifest>").unwrap().is_empty());
    }

    #[test]
    fn test_missing_name_is_empty() {
        let records = parse_projects(r#"<manifest><project path="x"/></manifest>"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].repository, "");
        assert_eq!(records[0].target_path, "x");
    }

    #[test]
    fn test_only_direct_children_are_projects() {
        let xml = r#"<manifest>
            <project name="top" path="top"/>
            <group>
                <project name="nested" path="nested"/>
            </group>
        </manifest>"#;

        let records = parse_projects(xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].repository, "top");
    }

    #[test]
    fn test_attribute_entities_unescaped() {
        let xml = r#"<manifest><project name="a&amp;b" path="p" revision="refs/tags/v1&lt;2"/></manifest>"#;
        let records = parse_projects(xml).unwrap();
        assert_eq!(records[0].repository, "a&b");
        assert_eq!(records[0].branch, "refs/tags/v1<2");
    }

    #[test]
    fn test_malformed_inputs() {
        let cases = [
            "",
            "   ",
            "<manifest>",
            "<manifest><project name=\"a\"></manifest>",
            "<manifest></project></manifest>",
            "<manifest/><manifest/>",
            "<manifest/>trailing",
            "</manifest>",
            "<manifest><project name=\"a\" name=\"b\"/></manifest>",
            "<manifest><project name=a/></manifest>",
            "<manifest foo=bar><project name=\"a\"/></manifest>",
            "<manifest><remote name=\"a\" name=\"b\"/></manifest>",
            "<manifest>&undefined;<project name=\"a\"/></manifest>",
            "<manifest><project name=\"a<b\"/></manifest>",
            "<manifest><project name=\"&undefined;\"/></manifest>",
            "<manifest><1bad/></manifest>",
            "<manifest><project 1st=\"a\"/></manifest>",
            "<manifest><!-- bad -- comment --></manifest>",
        ];

        for xml in cases {
            let result = parse_projects(xml);
            assert!(
                matches!(result, Err(RepoDepsError::MalformedXml(_))),
                "expected malformed error for {:?}, got {:?}",
                xml,
                result
            );
        }
    }

    #[test]
    fn test_references_in_content() {
        let xml = r#"<manifest>&amp;&lt;&#65;&#x42;<!-- ok - comment --><project name="a" path="a"/></manifest>"#;
        let records = parse_projects(xml).unwrap();
        assert_eq!(records.len(), 1);

        let err = parse_projects("<manifest>&bogus;</manifest>").unwrap_err();
        assert!(err.to_string().contains("undefined entity '&bogus;'"));
    }

    #[test]
    fn test_xml_names() {
        assert!(is_xml_name(b"project"));
        assert!(is_xml_name(b"_x:y-z.1"));
        assert!(!is_xml_name(b""));
        assert!(!is_xml_name(b"1bad"));
        assert!(!is_xml_name(b"-bad"));
    }

    #[test]
    fn test_malformed_message_is_descriptive() {
        let err = parse_projects("<manifest>").unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Malformed XML: "));
        assert!(msg.len() > "Malformed XML: ".len());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("default.xml");
        std::fs::write(&path, EXAMPLE_MANIFEST).unwrap();

        let records = parse_projects_from_file(&path).unwrap();
        assert_eq!(records.len(), 3);

        let missing = parse_projects_from_file(&dir.path().join("missing.xml"));
        assert!(matches!(missing, Err(RepoDepsError::Io(_))));
    }
}
