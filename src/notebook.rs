//! Notebook documents.
//!
//! A notebook is kept as the JSON value it was read from, so every field the
//! formatter does not touch (outputs, metadata, unknown keys, key order) is
//! written back exactly as it was. Only code cells are given a typed view.

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Oldest nbformat major version with a top-level `cells` list.
const MIN_NBFORMAT: u64 = 4;

/// How a cell's `source` field was stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLayout {
    /// A single string.
    Text,
    /// A list of lines, each keeping its line terminator.
    Lines,
}

/// A code cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeCell {
    source: String,
    layout: SourceLayout,
    execution_count: Option<u64>,
    /// Set once the source is replaced; until then `raw` holds it verbatim.
    edited: bool,
    raw: Map<String, Value>,
}

impl CodeCell {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn execution_count(&self) -> Option<u64> {
        self.execution_count
    }

    /// A copy of this cell with new source. Outputs, metadata and the
    /// execution count are kept.
    pub fn with_source(&self, source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            edited: true,
            ..self.clone()
        }
    }

    fn into_value(self) -> Value {
        if !self.edited {
            return Value::Object(self.raw);
        }
        let source = match self.layout {
            SourceLayout::Text => Value::String(self.source),
            SourceLayout::Lines => Value::Array(
                self.source
                    .split_inclusive('\n')
                    .map(|line| Value::String(line.to_string()))
                    .collect(),
            ),
        };
        let mut raw = self.raw;
        raw.insert("source".to_string(), source);
        Value::Object(raw)
    }
}

/// One notebook cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Code(CodeCell),
    /// Markdown, raw, or anything else; passed through untouched.
    Other(Value),
}

impl Cell {
    fn from_value(value: Value) -> std::result::Result<Self, String> {
        let Value::Object(raw) = value else {
            return Err("cell is not an object".to_string());
        };
        if raw.get("cell_type").and_then(Value::as_str) != Some("code") {
            return Ok(Self::Other(Value::Object(raw)));
        }

        let (source, layout) = match raw.get("source") {
            None => (String::new(), SourceLayout::Text),
            Some(Value::String(s)) => (s.clone(), SourceLayout::Text),
            Some(Value::Array(lines)) => {
                let mut source = String::new();
                for line in lines {
                    let line = line.as_str().ok_or("cell source contains a non-string line")?;
                    source.push_str(line);
                }
                (source, SourceLayout::Lines)
            }
            Some(_) => return Err("cell source is neither a string nor a list".to_string()),
        };
        let execution_count = raw.get("execution_count").and_then(Value::as_u64);

        Ok(Self::Code(CodeCell {
            source,
            layout,
            execution_count,
            edited: false,
            raw,
        }))
    }

    fn into_value(self) -> Value {
        match self {
            Self::Code(cell) => cell.into_value(),
            Self::Other(value) => value,
        }
    }

    pub fn as_code(&self) -> Option<&CodeCell> {
        match self {
            Self::Code(cell) => Some(cell),
            Self::Other(_) => None,
        }
    }
}

/// An in-memory notebook.
#[derive(Debug, Clone, PartialEq)]
pub struct Notebook {
    cells: Vec<Cell>,
    /// The top-level object in its original key order. `cells` is left as a
    /// null placeholder so it keeps its position.
    document: Map<String, Value>,
}

impl Notebook {
    /// Parse a notebook from its JSON text. `path` is only used in errors.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let value: Value = serde_json::from_str(content).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_value(value).map_err(|reason| Error::InvalidNotebook {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn from_value(value: Value) -> std::result::Result<Self, String> {
        let Value::Object(mut document) = value else {
            return Err("top level is not an object".to_string());
        };

        if let Some(version) = document.get("nbformat").and_then(Value::as_u64)
            && version < MIN_NBFORMAT
        {
            return Err(format!("nbformat {version} is not supported (need {MIN_NBFORMAT} or newer)"));
        }

        let cells = match document.get_mut("cells").map(Value::take) {
            Some(Value::Array(cells)) => cells,
            Some(_) => return Err("'cells' is not a list".to_string()),
            None => return Err("missing 'cells'".to_string()),
        };
        let cells = cells
            .into_iter()
            .map(Cell::from_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { cells, document })
    }

    /// Read and parse a notebook file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&content, path)
    }

    /// Serialize in the nbformat on-disk style: one-space indent and a
    /// trailing newline.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut document = self.document.clone();
        document.insert(
            "cells".to_string(),
            Value::Array(self.cells.iter().cloned().map(Cell::into_value).collect()),
        );

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        Value::Object(document).serialize(&mut serializer)?;
        buf.push(b'\n');

        // serde_json only ever emits UTF-8.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Write the notebook to `path` by writing a sibling temporary file and
    /// renaming it over the target.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_json().map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let temp_path = temp_path_for(path);
        fs::write(&temp_path, content).map_err(|e| Error::io(&temp_path, e))?;
        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(Error::io(path, e));
        }
        Ok(())
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Replace the cell at `index`. The number and order of cells never change.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn replace_cell(&mut self, index: usize, cell: Cell) {
        self.cells[index] = cell;
    }

    /// The kernel language from `metadata.kernelspec.language`, falling
    /// back to `metadata.language_info.name`.
    pub fn kernel_language(&self) -> Option<&str> {
        let metadata = self.document.get("metadata")?;
        metadata
            .pointer("/kernelspec/language")
            .and_then(Value::as_str)
            .or_else(|| metadata.pointer("/language_info/name").and_then(Value::as_str))
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "notebook.ipynb".to_string());
    path.with_file_name(format!(".{file_name}.jupyfmt.tmp"))
}
