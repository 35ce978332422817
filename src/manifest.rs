//! Module manifests: the variable metadata of one module.
//!
//! Two input forms are read. A module directory's `*.tf` files are parsed as
//! HCL and their `variable` blocks collected. A `module.json` as printed by
//! `terraform-config-inspect --json` is read instead when present; only its
//! `path` and `variables` members are used.

use std::path::{Path, PathBuf};

use hcl_edit::Span;
use hcl_edit::expr::Expression;
use hcl_edit::structure::{Block, BlockLabel};
use indexmap::IndexMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::ast::Source;
use crate::error::{Error, Result};
use crate::lower::{Entity, Variable};
use crate::parser::parse_type;

/// File looked up inside a module directory.
pub const MANIFEST_FILE: &str = "module.json";
/// Extension of HCL configuration files.
pub const TF_EXTENSION: &str = "tf";

#[derive(Debug, Clone, Deserialize)]
struct RawManifest {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    variables: IndexMap<String, RawVariable>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawVariable {
    #[serde(rename = "type", default)]
    type_: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    default: Option<serde_json::Value>,
    #[serde(default)]
    required: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ModuleManifest {
    pub name: String,
    pub variables: Vec<VariableDecl>,
}

#[derive(Debug, Clone)]
pub struct VariableDecl {
    pub name: String,
    /// The type constraint, named `<module>.<variable>`.
    pub source: Source,
    pub description: String,
    pub required: bool,
}

impl ModuleManifest {
    /// Parse the manifest text of a module called `name`.
    pub fn from_json(name: &str, path: &Path, json: &str) -> Result<Self> {
        let raw: RawManifest = from_str_with_path(json).map_err(|e| Error::load(path, e))?;
        Ok(Self::from_raw(name.to_string(), raw))
    }

    /// Collect the `variable` blocks of HCL configuration `files`, in order,
    /// into a module called `name`.
    pub fn from_hcl<P, S>(name: &str, files: &[(P, S)]) -> Result<Self>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let mut variables = IndexMap::new();
        for (path, text) in files {
            let path: &Path = path.as_ref();
            let text: &str = text.as_ref();
            let body = hcl_edit::parser::parse_body(text).map_err(|e| Error::load(path, e))?;
            for block in body.iter().filter_map(|s| s.as_block()) {
                if block.ident.as_str() != "variable" {
                    continue;
                }
                let (var_name, var) = variable_block(path, text, block)?;
                if variables.insert(var_name.clone(), var).is_some() {
                    return Err(Error::load(path, format!("variable {var_name:?} declared twice")));
                }
            }
        }
        Ok(Self::from_raw(name.to_string(), RawManifest { path: None, variables }))
    }

    fn from_raw(name: String, raw: RawManifest) -> Self {
        let variables = raw
            .variables
            .into_iter()
            .map(|(var_name, v)| {
                // a missing type constraint accepts anything
                let input = v.type_.filter(|t| !t.trim().is_empty()).unwrap_or_else(|| "any".to_string());
                VariableDecl {
                    source: Source::new(format!("{name}.{var_name}"), input),
                    description: v.description,
                    required: v.required.unwrap_or(v.default.is_none()),
                    name: var_name,
                }
            })
            .collect();
        Self { name, variables }
    }

    /// Parse every variable's type; the first bad one fails the module.
    pub fn entity(&self) -> Result<Entity<'_>> {
        let variables = self
            .variables
            .iter()
            .map(|v| {
                Ok(Variable {
                    name: v.name.clone(),
                    description: v.description.clone(),
                    required: v.required,
                    ty: parse_type(&v.source)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Entity { name: self.name.clone(), variables })
    }
}

/// Load every module matched by `patterns` (paths or glob patterns of module
/// directories or manifest files), in match order.
pub fn load_modules<I>(patterns: I) -> Result<Vec<ModuleManifest>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut modules = Vec::new();
    for path in resolve_file_path_patterns(patterns)? {
        modules.push(load_module(&path)?);
    }
    Ok(modules)
}

/// Load one module: a directory (its `module.json`, else its `*.tf` files), a
/// single `.tf` file, or a JSON manifest file.
pub fn load_module(path: &Path) -> Result<ModuleManifest> {
    if path.is_dir() {
        if path.join(MANIFEST_FILE).is_file() {
            return load_json(&path.join(MANIFEST_FILE), Some(base_name(path)));
        }
        let files = tf_files(path)?;
        if files.is_empty() {
            return Err(Error::load(path, format!("no {MANIFEST_FILE} or .{TF_EXTENSION} files")));
        }
        return load_hcl(&base_name(path), &files);
    }
    if is_tf_file(path) {
        let dir = path.parent().map(base_name).filter(|n| !n.is_empty());
        let name = dir.unwrap_or_else(|| file_stem(path));
        return load_hcl(&name, &[path.to_path_buf()]);
    }
    load_json(path, None)
}

fn load_hcl(name: &str, files: &[PathBuf]) -> Result<ModuleManifest> {
    let mut sources = Vec::with_capacity(files.len());
    for file in files {
        debug!(path = %file.display(), "loading module configuration");
        let text = std::fs::read_to_string(file).map_err(|e| Error::load(file, e))?;
        sources.push((file.as_path(), text));
    }
    ModuleManifest::from_hcl(name, &sources)
}

/// `variable "name" { type = ... description = ... default = ... }`
fn variable_block(path: &Path, text: &str, block: &Block) -> Result<(String, RawVariable)> {
    let name = match block.labels.as_slice() {
        [BlockLabel::String(s)] => s.value().clone(),
        [BlockLabel::Ident(i)] => i.as_str().to_string(),
        _ => return Err(Error::load(path, "variable block needs exactly one label")),
    };

    let mut var = RawVariable { type_: None, description: String::new(), default: None, required: Some(true) };
    for attr in block.body.iter().filter_map(|s| s.as_attribute()) {
        match attr.key.as_str() {
            "type" => var.type_ = Some(source_text(text, &attr.value)),
            "description" => {
                var.description = match &attr.value {
                    Expression::String(s) => s.value().clone(),
                    other => source_text(text, other),
                }
            }
            "default" => var.required = Some(false),
            _ => {}
        }
    }
    Ok((name, var))
}

/// The expression as written, falling back to its re-encoding.
fn source_text(text: &str, expr: &Expression) -> String {
    expr.span()
        .and_then(|span| text.get(span))
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| expr.to_string().trim().to_string())
}

/// `*.tf` files directly inside `dir`, sorted by name.
fn tf_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| Error::load(dir, e))? {
        let path = entry.map_err(|e| Error::load(dir, e))?.path();
        if is_tf_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn is_tf_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == TF_EXTENSION)
}

fn is_module_dir(path: &Path) -> bool {
    path.join(MANIFEST_FILE).is_file() || tf_files(path).is_ok_and(|files| !files.is_empty())
}

fn load_json(file: &Path, dir_name: Option<String>) -> Result<ModuleManifest> {
    debug!(path = %file.display(), "loading module manifest");

    let json = std::fs::read_to_string(file).map_err(|e| Error::load(file, e))?;
    let raw: RawManifest = from_str_with_path(&json).map_err(|e| Error::load(file, e))?;

    let name = dir_name
        .or_else(|| raw.path.as_deref().map(|p| base_name(Path::new(p))).filter(|n| !n.is_empty()))
        .unwrap_or_else(|| file_stem(file));
    Ok(ModuleManifest::from_raw(name, raw))
}

fn base_name(path: &Path) -> String {
    path.file_name().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Deserialize with JSON-path context in error messages.
fn from_str_with_path<T: DeserializeOwned>(src: &str) -> std::result::Result<T, String> {
    let de = &mut serde_json::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, T>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(format!("at JSON path {path} → {}", err.into_inner()))
        }
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            let entries = glob::glob(pattern).map_err(|e| Error::load(pattern, e))?;
            for entry in entries {
                let path = entry.map_err(|e| Error::load(pattern, e))?;
                // a module pattern like `modules/*` also matches stray entries
                let is_module = if path.is_dir() {
                    is_module_dir(&path)
                } else {
                    path.extension().is_some_and(|ext| ext == "json" || ext == TF_EXTENSION)
                };
                if !is_module {
                    continue;
                }
                matched_any = true;
                out.push(path);
            }
            if !matched_any {
                return Err(Error::load(pattern, "glob pattern matched no modules"));
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
