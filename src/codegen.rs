//! Go source for record definitions.

use std::fmt::{self, Write};

use crate::ir::{Primitive, RecordDefinition, RecordField, TypeExpr};

pub struct Codegen {
    package: String,
    out: String,
}

impl Codegen {
    pub fn new(package: impl Into<String>) -> Self {
        Self { package: package.into(), out: String::new() }
    }

    /// Render all records, in the order given, as one Go file.
    pub fn emit(&mut self, records: &[RecordDefinition]) -> fmt::Result {
        writeln!(self.out, "// Code generated by tfvar-gen. DO NOT EDIT.")?;
        writeln!(self.out)?;
        writeln!(self.out, "package {}", self.package)?;
        for record in records {
            writeln!(self.out)?;
            self.emit_record(record)?;
        }
        Ok(())
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn emit_record(&mut self, record: &RecordDefinition) -> fmt::Result {
        writeln!(self.out, "type {} struct {{", record.name)?;

        let width = record.fields.iter().map(|f| f.name.len()).max().unwrap_or(0);
        let rendered: Vec<String> = record.fields.iter().map(|f| go_type(&f.ty)).collect();
        let type_width = rendered.iter().map(|t| t.len()).max().unwrap_or(0);

        for (field, ty) in record.fields.iter().zip(&rendered) {
            for line in field.description.lines() {
                writeln!(self.out, "\t// {}", line.trim_end())?;
            }
            writeln!(
                self.out,
                "\t{:width$} {:type_width$} `{}`",
                field.name,
                ty,
                struct_tag(field),
            )?;
        }
        writeln!(self.out, "}}")
    }
}

pub fn go_type(ty: &TypeExpr) -> String {
    match ty {
        TypeExpr::Primitive(Primitive::String) => "string".to_string(),
        TypeExpr::Primitive(Primitive::Bool) => "bool".to_string(),
        TypeExpr::Primitive(Primitive::Any) => "interface{}".to_string(),
        TypeExpr::Map(elem) => format!("map[string]{}", go_type(elem)),
        TypeExpr::List(elem) => format!("[]{}", go_type(elem)),
        TypeExpr::Record(name) => name.clone(),
        TypeExpr::Nullable(inner) => format!("*{}", go_type(inner)),
    }
}

/// `json:"name" yaml:"name" hcl:"name"`
pub fn struct_tag(field: &RecordField) -> String {
    field
        .tags
        .iter()
        .map(|(format, key)| format!("{format}:\"{key}\""))
        .collect::<Vec<_>>()
        .join(" ")
}
