#![allow(dead_code)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Stand-in for Black: spaces out `1+1`, and rejects sources containing
/// `((` the way Black reports a parse error.
pub const SPACING_FORMATTER: &[&str] = &[
    "sh",
    "-c",
    r#"input=$(cat); case "$input" in *"(("*) echo "error: cannot format -: Cannot parse: 1:9" >&2; exit 123;; esac; printf '%s\n' "$input" | sed 's/1+1/1 + 1/g'"#,
];

/// A notebook whose code cells hold `sources`, for a kernel in `language`.
pub fn notebook_json(language: &str, sources: &[&str]) -> Value {
    let cells: Vec<Value> = sources
        .iter()
        .map(|source| {
            json!({
                "cell_type": "code",
                "execution_count": null,
                "metadata": {},
                "outputs": [],
                "source": source
            })
        })
        .collect();
    json!({
        "cells": cells,
        "metadata": {
            "kernelspec": {"display_name": language, "language": language, "name": language}
        },
        "nbformat": 4,
        "nbformat_minor": 5
    })
}

/// A temporary project directory with a formatter configured.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let project = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        project.formatter(SPACING_FORMATTER);
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Replace the configuration with a single primary formatter command.
    pub fn formatter(&self, command: &[&str]) {
        self.config(&format!("[formatters.python]\ncommand = {}\n", toml_list(command)));
    }

    pub fn config(&self, content: &str) {
        fs::write(self.path().join(".jupyfmt.toml"), content).unwrap();
    }

    pub fn write_value(&self, name: &str, notebook: &Value) -> PathBuf {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, serde_json::to_string_pretty(notebook).unwrap()).unwrap();
        path
    }

    pub fn write_notebook(&self, name: &str, sources: &[&str]) -> PathBuf {
        self.write_value(name, &notebook_json("python", sources))
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path().join(name)).unwrap()
    }

    /// Code cell sources of a notebook on disk.
    pub fn sources(&self, name: &str) -> Vec<String> {
        let value: Value = serde_json::from_str(&self.read(name)).unwrap();
        value["cells"]
            .as_array()
            .unwrap()
            .iter()
            .map(|cell| match &cell["source"] {
                Value::String(s) => s.clone(),
                Value::Array(lines) => lines.iter().filter_map(Value::as_str).collect(),
                other => panic!("unexpected source {other}"),
            })
            .collect()
    }

    /// The binary, run from the project directory.
    pub fn jupyfmt(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("jupyfmt");
        cmd.current_dir(self.path()).env_remove("RUST_LOG").env("NO_COLOR", "1");
        cmd
    }
}

fn toml_list(items: &[&str]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| format!("{item:?}")).collect();
    format!("[{}]", quoted.join(", "))
}
