use std::collections::HashSet;

use convert_case::{Case, Casing};
use tracing::{debug, trace};

use crate::ast::{Type, TypeKind};
use crate::error::{Error, Result};
use crate::ir::{Primitive, RecordDefinition, RecordField, Tags, TypeExpr};

/// Formats tagged on fields of a module's own record.
pub const TOP_LEVEL_TAGS: [&str; 3] = ["json", "yaml", "hcl"];
/// Formats tagged on fields of records generated for nested objects.
pub const NESTED_TAGS: [&str; 3] = ["json", "yaml", "cty"];

/// Something that owns variables, e.g. one module. Becomes one top-level record.
#[derive(Debug, Clone)]
pub struct Entity<'src> {
    pub name: String,
    pub variables: Vec<Variable<'src>>,
}

#[derive(Debug, Clone)]
pub struct Variable<'src> {
    pub name: String,
    pub description: String,
    /// Declared without a default value.
    pub required: bool,
    pub ty: Type<'src>,
}

#[derive(Debug, Clone)]
pub struct BuilderOptions {
    /// Variable names left out of top-level records, matched case-insensitively.
    pub ignore: Vec<String>,
    pub top_level_tags: Vec<String>,
    pub nested_tags: Vec<String>,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            ignore: Vec::new(),
            top_level_tags: TOP_LEVEL_TAGS.iter().map(|s| s.to_string()).collect(),
            nested_tags: NESTED_TAGS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Flatten every entity into records, in generation order.
pub fn build_records(entities: &[Entity<'_>], ignore: &[String]) -> Result<Vec<RecordDefinition>> {
    let mut builder = RecordBuilder::new(BuilderOptions {
        ignore: ignore.to_vec(),
        ..BuilderOptions::default()
    });
    for entity in entities {
        builder.add_entity(entity)?;
    }
    Ok(builder.finish())
}

pub struct RecordBuilder {
    options: BuilderOptions,
    ignore: HashSet<String>,
    records: Vec<RecordDefinition>,
    names: HashSet<String>,
}

impl RecordBuilder {
    pub fn new(options: BuilderOptions) -> Self {
        let ignore = options.ignore.iter().map(|s| s.to_lowercase()).collect();
        Self { options, ignore, records: Vec::new(), names: HashSet::new() }
    }

    fn should_ignore(&self, name: &str) -> bool {
        self.ignore.contains(&name.to_lowercase())
    }

    /// Add the records for one entity. On error nothing of this entity is kept.
    pub fn add_entity(&mut self, entity: &Entity<'_>) -> Result<()> {
        let mut out = Vec::new();
        let type_name = pascal(&entity.name);
        let index = self.open_record(&mut out, type_name.clone())?;

        for v in &entity.variables {
            if self.should_ignore(&v.name) {
                debug!(entity = %entity.name, variable = %v.name, "ignoring variable");
                continue;
            }
            let required = v.required && !v.ty.optional;
            let tags = &self.options.top_level_tags;
            let field = self.field(&mut out, &type_name, &v.description, &v.name, required, &v.ty, tags)?;
            push_field(&mut out[index], field)?;
        }

        self.names.extend(out.iter().map(|r| r.name.clone()));
        self.records.append(&mut out);
        Ok(())
    }

    pub fn records(&self) -> &[RecordDefinition] {
        &self.records
    }

    pub fn finish(self) -> Vec<RecordDefinition> {
        self.records
    }

    fn open_record(&self, out: &mut Vec<RecordDefinition>, name: String) -> Result<usize> {
        if self.names.contains(&name) || out.iter().any(|r| r.name == name) {
            return Err(Error::DuplicateRecord { name });
        }
        debug!(record = %name, "new record");
        out.push(RecordDefinition::new(name));
        Ok(out.len() - 1)
    }

    #[allow(clippy::too_many_arguments)]
    fn field(
        &self,
        out: &mut Vec<RecordDefinition>,
        prefix: &str,
        description: &str,
        name: &str,
        required: bool,
        t: &Type<'_>,
        tags: &[String],
    ) -> Result<RecordField> {
        let proper = pascal(name);
        let mut ty = self.field_type(out, &format!("{prefix}{proper}"), t)?;
        if !required {
            ty = ty.nullable();
        }
        trace!(field = %proper, ty = %ty, "field");

        let tags: Tags = tags.iter().map(|format| (format.clone(), name.to_string())).collect();
        Ok(RecordField { description: description.to_string(), name: proper, ty, tags })
    }

    /// `name` is the record name an object at this position would get.
    fn field_type(&self, out: &mut Vec<RecordDefinition>, name: &str, t: &Type<'_>) -> Result<TypeExpr> {
        check_shape(t)?;

        let base = match t.kind {
            TypeKind::String | TypeKind::Number => TypeExpr::Primitive(Primitive::String),
            TypeKind::Boolean => TypeExpr::Primitive(Primitive::Bool),
            TypeKind::Null | TypeKind::Any => TypeExpr::Primitive(Primitive::Any),
            TypeKind::Map => TypeExpr::Map(Box::new(self.field_type(out, name, elem(t)?)?)),
            TypeKind::List => TypeExpr::List(Box::new(self.field_type(out, name, elem(t)?)?)),
            TypeKind::Object => TypeExpr::Record(self.record_type(out, name, t)?),
        };

        Ok(if t.optional { base.nullable() } else { base })
    }

    fn record_type(&self, out: &mut Vec<RecordDefinition>, name: &str, t: &Type<'_>) -> Result<String> {
        let index = self.open_record(out, name.to_string())?;
        let tags = &self.options.nested_tags;

        for f in &t.fields {
            let field = self.field(out, name, "", &f.name, !f.ty.optional, &f.ty, tags)?;
            push_field(&mut out[index], field)?;
        }

        Ok(name.to_string())
    }
}

fn push_field(record: &mut RecordDefinition, field: RecordField) -> Result<()> {
    if record.field(&field.name).is_some() {
        return Err(Error::DuplicateField { record: record.name.clone(), field: field.name });
    }
    record.fields.push(field);
    Ok(())
}

fn elem<'a, 'src>(t: &'a Type<'src>) -> Result<&'a Type<'src>> {
    t.elem.as_deref().ok_or_else(|| unsupported(t))
}

// Parsed trees always pass; hand-built ones might not.
fn check_shape(t: &Type<'_>) -> Result<()> {
    let wraps = matches!(t.kind, TypeKind::List | TypeKind::Map);
    let ok = t.elem.is_some() == wraps && (t.kind == TypeKind::Object || t.fields.is_empty());
    if ok { Ok(()) } else { Err(unsupported(t)) }
}

fn unsupported(t: &Type<'_>) -> Error {
    Error::UnsupportedType {
        name: t.name.clone(),
        location: t.pos.map(|p| p.location()),
    }
}

/// `my_queue` → `MyQueue`.
pub fn pascal(name: &str) -> String {
    name.to_case(Case::Pascal)
}
