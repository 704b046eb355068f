//! Saneamiento de `word/document.xml`.
//!
//! El documento se recorre como flujo de eventos con resolución de espacios de
//! nombres y se copia tal cual, omitiendo los subárboles de revisión y
//! comentarios. Así los prefijos de atributos (`w:val`, `r:id`, `xml:space`)
//! y las declaraciones de espacios de nombres llegan intactos a la salida.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use quick_xml::writer::Writer;

use super::constants::{DOCUMENT_PART, TRACKED_BODY_ELEMENTS, W_NS};
use super::error::{CleanError, Result};

/// Elimina los elementos rastreados y devuelve el XML resultante junto con la
/// cantidad de elementos eliminados. Sin eliminaciones, devuelve la entrada.
pub fn sanitize_document_body(contents: Vec<u8>) -> Result<(Vec<u8>, usize)> {
    let (output, removed) = filter_tracked_elements(&contents)?;
    if removed == 0 {
        return Ok((contents, 0));
    }
    Ok((output, removed))
}

/// Cuenta los elementos rastreados que siguen presentes en el documento.
pub fn count_tracked_elements(contents: &[u8]) -> Result<usize> {
    filter_tracked_elements(contents).map(|(_, removed)| removed)
}

fn is_tracked(resolved: &ResolveResult<'_>, local_name: &[u8]) -> bool {
    matches!(resolved, ResolveResult::Bound(Namespace(ns)) if *ns == W_NS.as_bytes())
        && TRACKED_BODY_ELEMENTS
            .iter()
            .any(|name| name.as_bytes() == local_name)
}

/// Valida los atributos: sintaxis, duplicados, entidades y prefijos declarados.
fn check_attributes(reader: &NsReader<&[u8]>, element: &BytesStart<'_>) -> Result<()> {
    for attribute in element.attributes().with_checks(true) {
        let attribute = attribute.map_err(|e| CleanError::malformed(DOCUMENT_PART, e))?;
        attribute
            .unescape_value()
            .map_err(|e| CleanError::malformed(DOCUMENT_PART, e))?;

        if attribute.key.as_namespace_binding().is_some() {
            continue;
        }
        if let (ResolveResult::Unknown(prefix), _) = reader.resolve_attribute(attribute.key) {
            return Err(CleanError::malformed(
                DOCUMENT_PART,
                format!(
                    "prefijo de atributo sin declarar '{}'",
                    String::from_utf8_lossy(&prefix)
                ),
            ));
        }
    }
    Ok(())
}

fn filter_tracked_elements(contents: &[u8]) -> Result<(Vec<u8>, usize)> {
    let mut reader = NsReader::from_reader(contents);
    let mut writer = Writer::new(Vec::with_capacity(contents.len()));

    let mut depth = 0_usize;
    // Profundidad a la que empezó el subárbol que se está omitiendo.
    let mut skipping_from: Option<usize> = None;
    let mut removed = 0_usize;
    let mut roots = 0_usize;

    loop {
        let (tracked, event) = {
            let (resolved, event) = reader
                .read_resolved_event()
                .map_err(|e| CleanError::malformed(DOCUMENT_PART, e))?;
            if let ResolveResult::Unknown(prefix) = &resolved {
                return Err(CleanError::malformed(
                    DOCUMENT_PART,
                    format!(
                        "prefijo sin declarar '{}'",
                        String::from_utf8_lossy(prefix)
                    ),
                ));
            }
            let tracked = match &event {
                Event::Start(e) | Event::Empty(e) => is_tracked(&resolved, e.local_name().as_ref()),
                _ => false,
            };
            (tracked, event)
        };

        if let Event::Start(e) | Event::Empty(e) = &event {
            check_attributes(&reader, e)?;
        }

        match event {
            Event::Eof => break,
            Event::Start(e) => {
                if skipping_from.is_none() && tracked {
                    skipping_from = Some(depth);
                    removed += 1;
                }
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
                if skipping_from.is_none() {
                    write_event(&mut writer, Event::Start(e))?;
                }
            }
            Event::End(e) => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    CleanError::malformed(DOCUMENT_PART, "etiqueta de cierre sin apertura")
                })?;
                match skipping_from {
                    Some(start) if start == depth => skipping_from = None,
                    Some(_) => {}
                    None => write_event(&mut writer, Event::End(e))?,
                }
            }
            Event::Empty(e) => {
                if depth == 0 {
                    roots += 1;
                }
                if skipping_from.is_some() {
                    continue;
                }
                if tracked {
                    removed += 1;
                    continue;
                }
                write_event(&mut writer, Event::Empty(e))?;
            }
            Event::Text(text) => {
                text.unescape()
                    .map_err(|e| CleanError::malformed(DOCUMENT_PART, e))?;
                if depth == 0 && !text.iter().all(u8::is_ascii_whitespace) {
                    return Err(CleanError::malformed(
                        DOCUMENT_PART,
                        "texto fuera del elemento raíz",
                    ));
                }
                if skipping_from.is_none() {
                    write_event(&mut writer, Event::Text(text))?;
                }
            }
            other => {
                if skipping_from.is_none() {
                    write_event(&mut writer, other)?;
                }
            }
        }
    }

    if depth != 0 {
        return Err(CleanError::malformed(
            DOCUMENT_PART,
            format!("{} elemento(s) sin cerrar al final del documento", depth),
        ));
    }
    if roots != 1 {
        return Err(CleanError::malformed(
            DOCUMENT_PART,
            format!("se esperaba un único elemento raíz y hay {}", roots),
        ));
    }

    Ok((writer.into_inner(), removed))
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| CleanError::malformed(DOCUMENT_PART, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:x="urn:ejemplo:otro">"#;
    const FOOTER: &str = "</w:document>";

    fn wrap(body: &str) -> Vec<u8> {
        format!("{}{}{}", HEADER, body, FOOTER).into_bytes()
    }

    fn sanitize_str(body: &str) -> (String, usize) {
        let (output, removed) = sanitize_document_body(wrap(body)).unwrap();
        (String::from_utf8(output).unwrap(), removed)
    }

    #[test]
    fn removes_comment_markers_and_keeps_siblings() {
        let (output, removed) = sanitize_str(
            r#"<w:body><w:p><w:commentRangeStart w:id="0"/><w:r><w:t xml:space="preserve">Hola </w:t></w:r><w:commentRangeEnd w:id="0"/><w:r><w:commentReference w:id="0"/></w:r></w:p></w:body>"#,
        );

        assert_eq!(removed, 3);
        let expected = wrap(
            r#"<w:body><w:p><w:r><w:t xml:space="preserve">Hola </w:t></w:r><w:r></w:r></w:p></w:body>"#,
        );
        assert_eq!(output.as_bytes(), expected.as_slice());
    }

    #[test]
    fn removes_nested_subtrees_once() {
        let (output, removed) = sanitize_str(
            "<w:body><w:author><w:author>Ana</w:author><w:trackRevisions/></w:author><w:p/></w:body>",
        );
        assert_eq!(removed, 1);
        assert_eq!(output.as_bytes(), wrap("<w:body><w:p/></w:body>").as_slice());
    }

    #[test]
    fn matches_by_namespace_not_prefix() {
        let body = concat!(
            r#"<w:body><x:author>Externo</x:author>"#,
            r#"<author>Sin espacio</author>"#,
            r#"<word:author xmlns:word="http://schemas.openxmlformats.org/wordprocessingml/2006/main">Oculto</word:author>"#,
            r#"</w:body>"#
        );
        let (output, removed) = sanitize_str(body);

        assert_eq!(removed, 1);
        assert!(output.contains("<x:author>Externo</x:author>"));
        assert!(output.contains("<author>Sin espacio</author>"));
        assert!(!output.contains("Oculto"));
    }

    #[test]
    fn untouched_document_is_returned_verbatim() {
        let input = wrap(r#"<w:body><w:p w:rsidR="00A1"><w:r><w:t>Texto</w:t></w:r></w:p></w:body>"#);
        let (output, removed) = sanitize_document_body(input.clone()).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(output, input);
    }

    #[test]
    fn second_pass_removes_nothing() {
        let (first, _) =
            sanitize_document_body(wrap("<w:body><w:trackRevisions/><w:p/></w:body>")).unwrap();
        let (second, removed) = sanitize_document_body(first.clone()).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_truncated_xml() {
        let input = format!("{}<w:body><w:p><w:r>", HEADER).into_bytes();
        let err = sanitize_document_body(input).unwrap_err();
        assert!(matches!(err, CleanError::MalformedXml { .. }));
    }

    #[test]
    fn rejects_mismatched_tags() {
        let err = sanitize_document_body(wrap("<w:body><w:p></w:r></w:body>")).unwrap_err();
        assert!(matches!(err, CleanError::MalformedXml { .. }));
    }

    #[test]
    fn rejects_unbound_prefix() {
        let err = sanitize_document_body(wrap("<w:body><q:p/></w:body>")).unwrap_err();
        assert!(matches!(err, CleanError::MalformedXml { .. }));
    }

    fn assert_rejected(input: Vec<u8>) {
        let err = sanitize_document_body(input).unwrap_err();
        assert!(matches!(err, CleanError::MalformedXml { ref part, .. } if part == DOCUMENT_PART));
    }

    #[test]
    fn rejects_attribute_without_value() {
        assert_rejected(wrap("<w:body><w:p w:val=></w:p></w:body>"));
    }

    #[test]
    fn rejects_duplicated_attribute() {
        assert_rejected(wrap(r#"<w:body><w:p a="1" a="2"/></w:body>"#));
    }

    #[test]
    fn rejects_undeclared_attribute_prefix() {
        assert_rejected(wrap(r#"<w:body><w:p q:x="1"/></w:body>"#));
    }

    #[test]
    fn rejects_undefined_entities() {
        assert_rejected(wrap("<w:body><w:t>&bogus;</w:t></w:body>"));
        assert_rejected(wrap(r#"<w:body><w:p w:val="&bogus;"/></w:body>"#));
    }

    #[test]
    fn rejects_invalid_utf8_text() {
        let mut input = HEADER.as_bytes().to_vec();
        input.extend_from_slice(b"<w:body><w:t>\xff\xfe</w:t></w:body>");
        input.extend_from_slice(FOOTER.as_bytes());
        assert_rejected(input);
    }

    #[test]
    fn checks_apply_inside_removed_subtrees() {
        assert_rejected(wrap("<w:body><w:author><w:t>&bogus;</w:t></w:author></w:body>"));
    }

    #[test]
    fn accepts_reserved_prefixes_and_entities() {
        let input = wrap(
            r#"<w:body><w:p><w:r><w:t xml:space="preserve">A &amp; B &#169; &lt;</w:t></w:r></w:p></w:body>"#,
        );
        let (output, removed) = sanitize_document_body(input.clone()).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(output, input);
    }

    #[test]
    fn rejects_empty_input() {
        let err = sanitize_document_body(Vec::new()).unwrap_err();
        assert!(matches!(err, CleanError::MalformedXml { .. }));
    }

    #[derive(Clone, Debug)]
    enum Node {
        Element { tag: &'static str, children: Vec<Node> },
        Text(String),
    }

    const TAGS: [&str; 10] = [
        "w:author",
        "w:trackRevisions",
        "w:commentRangeStart",
        "w:commentRangeEnd",
        "w:commentReference",
        "w:p",
        "w:r",
        "w:t",
        "x:author",
        "x:commentReference",
    ];

    fn tag_is_tracked(tag: &str) -> bool {
        tag.strip_prefix("w:")
            .is_some_and(|local| TRACKED_BODY_ELEMENTS.contains(&local))
    }

    fn render(node: &Node, prune: bool, out: &mut String) {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element { tag, children } => {
                if prune && tag_is_tracked(tag) {
                    return;
                }
                if children.is_empty() {
                    out.push_str(&format!("<{}/>", tag));
                    return;
                }
                out.push_str(&format!("<{}>", tag));
                for child in children {
                    render(child, prune, out);
                }
                out.push_str(&format!("</{}>", tag));
            }
        }
    }

    fn node_strategy() -> impl Strategy<Value = Node> {
        let leaf = prop_oneof![
            "[a-z ]{1,6}".prop_map(Node::Text),
            prop::sample::select(TAGS.to_vec()).prop_map(|tag| Node::Element {
                tag,
                children: Vec::new(),
            }),
        ];
        leaf.prop_recursive(4, 48, 5, |inner| {
            (
                prop::sample::select(TAGS.to_vec()),
                prop::collection::vec(inner, 0..5),
            )
                .prop_map(|(tag, children)| Node::Element { tag, children })
        })
    }

    proptest! {
        #[test]
        fn tracked_elements_never_survive(nodes in prop::collection::vec(node_strategy(), 0..6)) {
            let mut original = String::from("<w:body>");
            let mut expected = String::from("<w:body>");
            for node in &nodes {
                render(node, false, &mut original);
                render(node, true, &mut expected);
            }
            original.push_str("</w:body>");
            expected.push_str("</w:body>");

            let (output, _) = sanitize_document_body(wrap(&original)).unwrap();
            prop_assert_eq!(output, wrap(&expected));
            prop_assert_eq!(count_tracked_elements(&wrap(&expected)).unwrap(), 0);
        }
    }
}
