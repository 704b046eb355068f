//! Reescritura de `docProps/core.xml` y `docProps/app.xml`.
//!
//! Cada parte se describe con una tabla de campos que se aplica siempre en el
//! mismo orden con una única rutina de localizar-o-crear.

use super::constants::{APP_NS, APP_PART, CORE_PART, CP_NS, DC_NS, DCTERMS_NS};
use super::error::Result;
use super::fields::ResolvedFields;
use super::xml::{
    FieldSpec, apply_update_to_element, clear_if_present, element_text_content, ensure_root,
    matching_children, parse_part, restore_attribute_prefixes, write_part,
};

const CREATOR: FieldSpec<'static> = FieldSpec::prefixed("dc", "creator", DC_NS);
const LAST_MODIFIED_BY: FieldSpec<'static> = FieldSpec::prefixed("cp", "lastModifiedBy", CP_NS);
const TITLE: FieldSpec<'static> = FieldSpec::prefixed("dc", "title", DC_NS);
const CREATED: FieldSpec<'static> = FieldSpec::prefixed("dcterms", "created", DCTERMS_NS).typed();
const MODIFIED: FieldSpec<'static> = FieldSpec::prefixed("dcterms", "modified", DCTERMS_NS).typed();
const LAST_PRINTED: FieldSpec<'static> =
    FieldSpec::prefixed("dcterms", "lastPrinted", DCTERMS_NS).typed();

const CORE_CLEARED: [FieldSpec<'static>; 5] = [
    FieldSpec::prefixed("dc", "subject", DC_NS),
    FieldSpec::prefixed("dc", "description", DC_NS),
    FieldSpec::prefixed("cp", "keywords", CP_NS),
    FieldSpec::prefixed("cp", "category", CP_NS),
    FieldSpec::prefixed("cp", "contentStatus", CP_NS),
];

const COMPANY: FieldSpec<'static> = FieldSpec::unprefixed("Company", APP_NS);
const TOTAL_TIME: FieldSpec<'static> = FieldSpec::unprefixed("TotalTime", APP_NS);

const APP_CLEARED: [FieldSpec<'static>; 2] = [
    FieldSpec::unprefixed("Manager", APP_NS),
    FieldSpec::unprefixed("HyperlinkBase", APP_NS),
];

/// Descripción de una parte de propiedades: raíz esperada y tablas de campos.
struct PropertyTable<'v> {
    part: &'static str,
    root_name: &'static str,
    root_namespace: &'static str,
    updates: Vec<(FieldSpec<'static>, &'v str)>,
    cleared: &'static [FieldSpec<'static>],
}

fn core_table(fields: &ResolvedFields) -> PropertyTable<'_> {
    PropertyTable {
        part: CORE_PART,
        root_name: "coreProperties",
        root_namespace: CP_NS,
        updates: vec![
            (CREATOR, fields.author.as_str()),
            (LAST_MODIFIED_BY, fields.author.as_str()),
            (TITLE, fields.title.as_str()),
            (CREATED, fields.created.as_str()),
            (MODIFIED, fields.modified.as_str()),
            (LAST_PRINTED, fields.last_printed.as_str()),
        ],
        cleared: &CORE_CLEARED,
    }
}

fn app_table<'v>(fields: &'v ResolvedFields, total_time: &'v str) -> PropertyTable<'v> {
    PropertyTable {
        part: APP_PART,
        root_name: "Properties",
        root_namespace: APP_NS,
        updates: vec![(COMPANY, fields.company.as_str()), (TOTAL_TIME, total_time)],
        cleared: &APP_CLEARED,
    }
}

/// Fija autor, título y fechas en `core.xml`.
pub fn rewrite_core_properties(contents: Vec<u8>, fields: &ResolvedFields) -> Result<(Vec<u8>, bool)> {
    apply_table(contents, &core_table(fields))
}

/// Fija la empresa y el tiempo total de edición en `app.xml`.
pub fn rewrite_app_properties(contents: Vec<u8>, fields: &ResolvedFields) -> Result<(Vec<u8>, bool)> {
    let total_time = fields.total_time();
    apply_table(contents, &app_table(fields, &total_time))
}

/// Nombres de los campos de `core.xml` cuyo contenido no coincide con `fields`.
pub(crate) fn core_mismatches(contents: &[u8], fields: &ResolvedFields) -> Result<Vec<String>> {
    table_mismatches(contents, &core_table(fields))
}

pub(crate) fn app_mismatches(contents: &[u8], fields: &ResolvedFields) -> Result<Vec<String>> {
    let total_time = fields.total_time();
    table_mismatches(contents, &app_table(fields, &total_time))
}

fn apply_table(contents: Vec<u8>, table: &PropertyTable<'_>) -> Result<(Vec<u8>, bool)> {
    let mut root = parse_part(table.part, &contents)?;
    ensure_root(table.part, &root, table.root_name, table.root_namespace)?;

    let mut modified = false;
    for &(spec, value) in &table.updates {
        modified |= apply_update_to_element(&mut root, spec, value);
    }
    for &spec in table.cleared {
        modified |= clear_if_present(&mut root, spec);
    }

    if !modified {
        return Ok((contents, false));
    }

    restore_attribute_prefixes(&mut root, DCTERMS_NS);
    Ok((write_part(table.part, &root)?, true))
}

fn table_mismatches(contents: &[u8], table: &PropertyTable<'_>) -> Result<Vec<String>> {
    let root = parse_part(table.part, contents)?;
    ensure_root(table.part, &root, table.root_name, table.root_namespace)?;

    let mut mismatches = Vec::new();
    for (spec, expected) in &table.updates {
        let mut found = matching_children(&root, *spec).peekable();
        let matches = found.peek().is_some()
            && found.all(|child| element_text_content(child) == *expected);
        if !matches {
            mismatches.push(qualified_name(spec));
        }
    }
    for spec in table.cleared {
        if matching_children(&root, *spec).any(|child| !element_text_content(child).is_empty()) {
            mismatches.push(qualified_name(spec));
        }
    }

    Ok(mismatches)
}

fn qualified_name(spec: &FieldSpec<'_>) -> String {
    match spec.prefix {
        Some(prefix) => format!("{}:{}", prefix, spec.local_name),
        None => spec.local_name.to_string(),
    }
}
