use std::io::Cursor;

use xmltree::{Element, EmitterConfig, Namespace, XMLNode};

use super::constants::{W3CDTF_TYPE, XSI_NS};
use super::error::{CleanError, Result};

/// Describe la información necesaria para localizar un nodo en el XML de propiedades.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FieldSpec<'a> {
    pub(crate) prefix: Option<&'a str>,
    pub(crate) local_name: &'a str,
    pub(crate) namespace: &'a str,
    /// Marca los campos de fecha que llevan `xsi:type="dcterms:W3CDTF"`.
    pub(crate) typed: bool,
}

impl FieldSpec<'static> {
    pub(crate) const fn prefixed(prefix: &'static str, local_name: &'static str, namespace: &'static str) -> Self {
        Self {
            prefix: Some(prefix),
            local_name,
            namespace,
            typed: false,
        }
    }

    pub(crate) const fn unprefixed(local_name: &'static str, namespace: &'static str) -> Self {
        Self {
            prefix: None,
            local_name,
            namespace,
            typed: false,
        }
    }

    pub(crate) const fn typed(self) -> Self {
        Self {
            typed: true,
            ..self
        }
    }
}

pub(crate) fn parse_part(part: &str, contents: &[u8]) -> Result<Element> {
    Element::parse(Cursor::new(contents)).map_err(|e| CleanError::malformed(part, e))
}

pub(crate) fn write_part(part: &str, root: &Element) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    let mut config = EmitterConfig::new();
    config.perform_indent = false;
    config.write_document_declaration = true;
    root.write_with_config(&mut output, config)
        .map_err(|e| CleanError::malformed(part, e))?;
    Ok(output)
}

/// Exige que la raíz de la parte sea el elemento esperado en su espacio de nombres.
pub(crate) fn ensure_root(part: &str, root: &Element, local_name: &str, namespace: &str) -> Result<()> {
    if root.name == local_name && root.namespace.as_deref() == Some(namespace) {
        return Ok(());
    }
    Err(CleanError::malformed(
        part,
        format!(
            "raíz inesperada '{}' ({}), se esperaba '{}' ({})",
            root.name,
            root.namespace.as_deref().unwrap_or("sin espacio de nombres"),
            local_name,
            namespace
        ),
    ))
}

/// Inserta o sustituye el contenido de un elemento de metadata.
///
/// Solo sobrevive la primera aparición del campo; las repetidas se eliminan.
pub(crate) fn apply_update_to_element(root: &mut Element, spec: FieldSpec<'_>, new_value: &str) -> bool {
    let before = root.children.len();
    let mut seen = false;
    root.children.retain(|node| match node {
        XMLNode::Element(child) if element_matches(child, &spec) => !std::mem::replace(&mut seen, true),
        _ => true,
    });
    let mut modified = root.children.len() != before;

    let index = root.children.iter().position(|node| {
        matches!(node, XMLNode::Element(child) if element_matches(child, &spec))
    });

    let index = match index {
        Some(index) => index,
        None => {
            if let Some(prefix) = spec.prefix {
                declare_namespace(root, prefix, spec.namespace);
            }
            let mut new_child = Element::new(spec.local_name);
            new_child.prefix = spec.prefix.map(str::to_string);
            new_child.namespace = Some(spec.namespace.to_string());
            root.children.push(XMLNode::Element(new_child));
            modified = true;
            root.children.len() - 1
        }
    };

    if spec.typed {
        declare_namespace(root, "xsi", XSI_NS);
    }

    if let XMLNode::Element(child) = &mut root.children[index] {
        modified |= set_element_text(child, new_value);
        if spec.typed {
            modified |= set_w3cdtf_type(child);
        }
    }

    modified
}

/// Vacía un elemento existente sin crearlo cuando no está presente.
pub(crate) fn clear_if_present(root: &mut Element, spec: FieldSpec<'_>) -> bool {
    let mut modified = false;
    for node in root.children.iter_mut() {
        if let XMLNode::Element(child) = node
            && element_matches(child, &spec)
        {
            modified |= set_element_text(child, "");
        }
    }
    modified
}

/// Comprueba si un elemento coincide con la especificación de búsqueda.
pub(crate) fn element_matches(element: &Element, spec: &FieldSpec<'_>) -> bool {
    element.name == spec.local_name && element.namespace.as_deref() == Some(spec.namespace)
}

/// Hijos directos de `root` que coinciden con `spec`, en orden.
pub(crate) fn matching_children<'e>(
    root: &'e Element,
    spec: FieldSpec<'e>,
) -> impl Iterator<Item = &'e Element> {
    root.children.iter().filter_map(move |node| match node {
        XMLNode::Element(child) if element_matches(child, &spec) => Some(child),
        _ => None,
    })
}


/// Sustituye el texto de un elemento si difiere del valor actual.
pub(crate) fn set_element_text(element: &mut Element, new_value: &str) -> bool {
    let has_elements = element
        .children
        .iter()
        .any(|node| matches!(node, XMLNode::Element(_)));
    if !has_elements && element_text_content(element) == new_value {
        return false;
    }

    element.children.clear();
    if !new_value.is_empty() {
        element.children.push(XMLNode::Text(new_value.to_string()));
    }

    true
}

/// Devuelve el texto plano contenido dentro de un elemento.
pub(crate) fn element_text_content(element: &Element) -> String {
    let mut content = String::new();
    for node in &element.children {
        if let XMLNode::Text(text) = node {
            content.push_str(text);
        }
    }
    content
}

// xmltree descarta el prefijo de los atributos al leer: `xsi:type` llega como `type`.
fn set_w3cdtf_type(element: &mut Element) -> bool {
    let previous = element
        .attributes
        .get("xsi:type")
        .or_else(|| element.attributes.get("type"))
        .cloned();
    rename_attributes(element, |name| match name {
        "type" => Some("xsi:type"),
        _ => None,
    });
    element
        .attributes
        .insert("xsi:type".to_string(), W3CDTF_TYPE.to_string());

    previous.as_deref() != Some(W3CDTF_TYPE)
}

/// Renombra atributos conservando su orden.
fn rename_attributes(element: &mut Element, rename: impl Fn(&str) -> Option<&'static str>) {
    if !element.attributes.keys().any(|name| rename(name.as_str()).is_some()) {
        return;
    }
    element.attributes = std::mem::take(&mut element.attributes)
        .into_iter()
        .map(|(name, value)| match rename(name.as_str()) {
            Some(prefixed) => (prefixed.to_string(), value),
            None => (name, value),
        })
        .collect();
}

/// Devuelve el prefijo perdido al leer a los atributos conocidos: `xml:lang` y
/// `xml:space` en cualquier elemento, `xsi:type` en los elementos de `typed_namespace`.
///
/// Otros atributos con prefijo en las partes de propiedades se escriben sin él.
pub(crate) fn restore_attribute_prefixes(element: &mut Element, typed_namespace: &str) {
    let typed = element.namespace.as_deref() == Some(typed_namespace);
    rename_attributes(element, |name| match name {
        "lang" => Some("xml:lang"),
        "space" => Some("xml:space"),
        "type" if typed => Some("xsi:type"),
        _ => None,
    });
    for node in element.children.iter_mut() {
        if let XMLNode::Element(child) = node {
            restore_attribute_prefixes(child, typed_namespace);
        }
    }
}

fn declare_namespace(root: &mut Element, prefix: &str, uri: &str) {
    root.namespaces
        .get_or_insert_with(Namespace::empty)
        .put(prefix, uri);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::constants::{DC_NS, DCTERMS_NS};

    const CORE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:creator>Autor Prueba</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">2020-01-01T00:00:00Z</dcterms:created></cp:coreProperties>"#;

    const CREATOR: FieldSpec<'static> = FieldSpec::prefixed("dc", "creator", DC_NS);
    const CREATED: FieldSpec<'static> = FieldSpec::prefixed("dcterms", "created", DCTERMS_NS).typed();

    #[test]
    fn update_overwrites_existing_element() {
        let mut root = parse_part("core", CORE.as_bytes()).unwrap();
        assert!(apply_update_to_element(&mut root, CREATOR, "Nuevo Autor"));

        let child = matching_children(&root, CREATOR).next().unwrap();
        assert_eq!(element_text_content(child), "Nuevo Autor");
        let creators = root
            .children
            .iter()
            .filter(|node| matches!(node, XMLNode::Element(e) if element_matches(e, &CREATOR)))
            .count();
        assert_eq!(creators, 1);
    }

    #[test]
    fn same_value_is_not_a_modification() {
        let mut root = parse_part("core", CORE.as_bytes()).unwrap();
        assert!(!apply_update_to_element(&mut root, CREATOR, "Autor Prueba"));
        assert!(!apply_update_to_element(&mut root, CREATED, "2020-01-01T00:00:00Z"));
    }

    #[test]
    fn typed_field_is_written_with_prefixed_attribute() {
        let mut root = parse_part("core", CORE.as_bytes()).unwrap();
        apply_update_to_element(&mut root, CREATED, "2024-01-01T00:00:00Z");

        let output = String::from_utf8(write_part("core", &root).unwrap()).unwrap();
        assert!(output.contains(
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">2024-01-01T00:00:00Z</dcterms:created>"#
        ));
    }

    #[test]
    fn missing_element_is_appended_to_root() {
        let mut root = parse_part("core", CORE.as_bytes()).unwrap();
        let modified = FieldSpec::prefixed("dcterms", "modified", DCTERMS_NS).typed();
        assert!(apply_update_to_element(&mut root, modified, "2024-06-01T12:00:00Z"));

        match root.children.last() {
            Some(XMLNode::Element(last)) => {
                assert_eq!(last.name, "modified");
                assert_eq!(element_text_content(last), "2024-06-01T12:00:00Z");
            }
            other => panic!("se esperaba un elemento, se obtuvo {:?}", other),
        }
    }

    #[test]
    fn repeated_fields_collapse_into_one() {
        let xml = r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:creator>Autor Real</dc:creator><dc:title>T</dc:title><dc:creator>Autor Real Dos</dc:creator></cp:coreProperties>"#;
        let mut root = parse_part("core", xml.as_bytes()).unwrap();
        assert!(apply_update_to_element(&mut root, CREATOR, "Autor Real"));

        let creators: Vec<_> = matching_children(&root, CREATOR)
            .map(element_text_content)
            .collect();
        assert_eq!(creators, vec!["Autor Real".to_string()]);
        assert!(!apply_update_to_element(&mut root, CREATOR, "Autor Real"));
    }

    #[test]
    fn attribute_order_and_reserved_prefixes_survive() {
        let xml = r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes"><HeadingPairs><vt:vector size="2" baseType="variant" x1="a" x2="b" x3="c"/></HeadingPairs><Company xml:lang="es-ES">Acme</Company></Properties>"#;
        let mut root = parse_part("app", xml.as_bytes()).unwrap();
        restore_attribute_prefixes(&mut root, DCTERMS_NS);

        let output = String::from_utf8(write_part("app", &root).unwrap()).unwrap();
        assert!(output.contains(r#"<vt:vector size="2" baseType="variant" x1="a" x2="b" x3="c""#));
        assert!(output.contains(r#"<Company xml:lang="es-ES">Acme</Company>"#));
    }

    #[test]
    fn clear_does_not_create_elements() {
        let mut root = parse_part("core", CORE.as_bytes()).unwrap();
        let subject = FieldSpec::prefixed("dc", "subject", DC_NS);
        assert!(!clear_if_present(&mut root, subject));
        assert!(matching_children(&root, subject).next().is_none());
    }

    #[test]
    fn root_check_uses_namespace() {
        let root = parse_part("core", CORE.as_bytes()).unwrap();
        assert!(ensure_root("core", &root, "coreProperties", crate::cleaner::constants::CP_NS).is_ok());
        assert!(ensure_root("core", &root, "coreProperties", DC_NS).is_err());
    }
}
