//! Class stubs for record types.
//!
//! Turns record-type field metadata into a plain class declaration so it can
//! be rendered with the regular [`Generator`].

use tracing::debug;

use crate::ast::*;
use crate::generate::{GenerateError, GenerateResult, Generator};

/// Field metadata for one record type
#[derive(Debug, Clone, PartialEq)]
pub struct RecordTypeMeta {
    pub name: String,
    pub fields: Vec<RecordField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    pub name: String,
    pub type_name: String,
    /// Raw default value; empty means no initializer
    pub default: String,
}

impl RecordField {
    pub fn new(name: &str, type_name: &str, default: &str) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
            default: default.to_string(),
        }
    }
}

/// The metadata rendered by `apexgen --record-types`
pub fn demo_metadata() -> Vec<RecordTypeMeta> {
    vec![RecordTypeMeta {
        name: "Account".to_string(),
        fields: vec![RecordField::new("Name", "String", "hoge")],
    }]
}

/// Build `public class <Name> { public <Type> <Field> = <default>; ... }`
pub fn class_for(meta: &RecordTypeMeta) -> GenerateResult<ClassDeclaration> {
    let members = meta
        .fields
        .iter()
        .map(|field| {
            let initializer = default_value(field)?;
            Ok(ClassMember::Field(FieldDeclaration {
                annotations: vec![],
                modifiers: vec![Modifier::Public],
                type_ref: TypeRef::simple(&field.type_name),
                declarators: vec![VariableDeclarator {
                    name: field.name.clone(),
                    initializer,
                }],
            }))
        })
        .collect::<GenerateResult<Vec<_>>>()?;

    Ok(ClassDeclaration {
        annotations: vec![],
        modifiers: vec![Modifier::Public],
        name: meta.name.clone(),
        extends: None,
        implements: vec![],
        members,
    })
}

fn default_value(field: &RecordField) -> GenerateResult<Option<Expression>> {
    if field.default.is_empty() {
        return Ok(None);
    }
    let raw = field.default.as_str();
    let invalid = || {
        GenerateError::structural(
            "record field",
            format!("`{}` default {:?} is not a valid {}", field.name, raw, field.type_name),
        )
    };

    let value = match field.type_name.to_ascii_lowercase().as_str() {
        "string" | "id" => Expression::string(raw),
        "integer" => Expression::Integer(raw.parse().map_err(|_| invalid())?),
        "long" => Expression::Long(raw.parse().map_err(|_| invalid())?),
        "double" | "decimal" => Expression::Double(raw.parse().map_err(|_| invalid())?),
        "boolean" => match raw.to_ascii_lowercase().as_str() {
            "true" => Expression::Boolean(true),
            "false" => Expression::Boolean(false),
            _ => return Err(invalid()),
        },
        _ => Expression::name(raw),
    };
    Ok(Some(value))
}

/// Render one class per record type, separated by a blank line
pub fn render_record_types(
    metas: &[RecordTypeMeta],
    generator: &Generator,
) -> GenerateResult<String> {
    debug!(record_types = metas.len(), "rendering record type classes");
    let declarations = metas
        .iter()
        .map(|meta| class_for(meta).map(TypeDeclaration::Class))
        .collect::<GenerateResult<Vec<_>>>()?;
    generator.render(&CompilationUnit { declarations })
}
