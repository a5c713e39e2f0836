#![cfg(unix)]

mod common;

use common::{Project, notebook_json};
use predicates::prelude::*;
use serde_json::json;

#[test]
fn test_check_unchanged_notebook() {
    let project = Project::new();
    project.write_notebook("nb.ipynb", &["1 + 1"]);

    project
        .jupyfmt()
        .args(["--check", "nb.ipynb"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("1 cell(s) would be left unchanged"))
        .stdout(predicate::str::contains("1 file(s) would be left unchanged"));
}

#[test]
fn test_check_changed_notebook() {
    let project = Project::new();
    project.write_notebook("nb.ipynb", &["1+1"]);
    let before = project.read("nb.ipynb");

    project
        .jupyfmt()
        .args(["--check", "nb.ipynb"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("1 cell(s) would be changed"))
        .stdout(predicate::str::contains("1 file(s) would be changed"));

    assert_eq!(project.read("nb.ipynb"), before);
}

#[test]
fn test_check_invalid_cell() {
    let project = Project::new();
    project.write_notebook("nb.ipynb", &["x = 1", "print((1)"]);

    project
        .jupyfmt()
        .args(["--check", "nb.ipynb"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Error while formatting cell 1"))
        .stdout(predicate::str::contains("Cannot parse"))
        .stdout(predicate::str::contains("1 cell(s) raised parsing errors"))
        .stdout(predicate::str::contains("1 file(s) raised parsing errors"));
}

#[test]
fn test_check_magic_cells() {
    let project = Project::new();
    project.write_notebook("nb.ipynb", &["1 + 1", "%time 1 + 1", "%%time\n1 + 1"]);

    project
        .jupyfmt()
        .args(["--check", "nb.ipynb"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("3 cell(s) would be left unchanged"));
}

#[test]
fn test_skipped_magic_cells_are_untouched() {
    let project = Project::new();
    project.write_notebook("nb.ipynb", &["%%markdown\n1+1", "%%bash\necho 1+1", "!echo 1+1\n1+1"]);

    project.jupyfmt().arg("nb.ipynb").assert().code(1);

    assert_eq!(
        project.sources("nb.ipynb"),
        vec!["%%markdown\n1+1", "%%bash\necho 1+1", "!echo 1 + 1\n1 + 1"]
    );
}

#[test]
fn test_apply_rewrites_in_place() {
    let project = Project::new();
    let mut notebook = notebook_json("python", &["1+1", "x = 1"]);
    notebook["cells"][0]["execution_count"] = json!(1);
    notebook["cells"][0]["outputs"] = json!([{"output_type": "execute_result", "data": {"text/plain": ["2"]}, "metadata": {}, "execution_count": 1}]);
    notebook["cells"]
        .as_array_mut()
        .unwrap()
        .insert(1, json!({"cell_type": "markdown", "metadata": {}, "source": ["1+1"]}));
    project.write_value("nb.ipynb", &notebook);

    project.jupyfmt().arg("nb.ipynb").assert().code(1).stdout(predicate::str::is_empty());

    assert_eq!(project.sources("nb.ipynb"), vec!["1 + 1", "1+1", "x = 1"]);
    let written: serde_json::Value = serde_json::from_str(&project.read("nb.ipynb")).unwrap();
    assert_eq!(written["cells"][0]["outputs"], notebook["cells"][0]["outputs"]);
    assert_eq!(written["metadata"], notebook["metadata"]);
    assert!(project.read("nb.ipynb").ends_with("}\n"));

    project.jupyfmt().args(["--check", "nb.ipynb"]).assert().code(0);
}

#[test]
fn test_apply_error_leaves_file_untouched() {
    let project = Project::new();
    project.write_notebook("nb.ipynb", &["1+1", "print((1)"]);
    let before = project.read("nb.ipynb");

    project
        .jupyfmt()
        .arg("nb.ipynb")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error while formatting cell 1"));

    assert_eq!(project.read("nb.ipynb"), before);
}

#[test]
fn test_diff_does_not_write() {
    let project = Project::new();
    project.write_notebook("nb.ipynb", &["x = 1\n1+1"]);
    let before = project.read("nb.ipynb");

    project
        .jupyfmt()
        .args(["--diff", "nb.ipynb"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("  x = 1\n- 1+1\n+ 1 + 1"));

    assert_eq!(project.read("nb.ipynb"), before);
}

#[test]
fn test_compact_diff_does_not_write() {
    let project = Project::new();
    project.write_notebook("nb.ipynb", &["x = 1", "1+1"]);
    let before = project.read("nb.ipynb");

    project
        .jupyfmt()
        .args(["--compact-diff", "nb.ipynb"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("nb.ipynb - Cell 1 (original)"))
        .stdout(predicate::str::contains("nb.ipynb - Cell 1 (formatted)"))
        .stdout(predicate::str::contains("@@ -1 +1 @@\n-1+1\n+1 + 1"))
        .stdout(predicate::str::contains("Cell 0").not());

    assert_eq!(project.read("nb.ipynb"), before);
}

#[test]
fn test_execution_order_assertion() {
    let project = Project::new();
    let mut notebook = notebook_json("python", &["1 + 1", "2 + 2"]);
    notebook["cells"][0]["execution_count"] = json!(1);
    notebook["cells"][1]["execution_count"] = json!(5);
    project.write_value("nb.ipynb", &notebook);

    project.jupyfmt().args(["--check", "nb.ipynb"]).assert().code(0);

    project
        .jupyfmt()
        .args(["--check", "--assert-consistent-execution", "nb.ipynb"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains(
            "Cell 1 has inconsistent execution count (expected 2, found 5)",
        ));
}

#[test]
fn test_directory_discovery() {
    let project = Project::new();
    project.write_notebook("a.ipynb", &["1+1"]);
    project.write_notebook("sub/b.ipynb", &["1 + 1"]);
    project.write_notebook("build/c.ipynb", &["1+1"]);
    project.write_notebook(".ipynb_checkpoints/a-checkpoint.ipynb", &["1+1"]);
    project.write_value("r.ipynb", &notebook_json("R", &["x<-1"]));

    project
        .jupyfmt()
        .args(["--check", "."])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("1 file(s) would be changed"))
        .stdout(predicate::str::contains("1 file(s) would be left unchanged"))
        .stdout(predicate::str::contains("c.ipynb").not())
        .stdout(predicate::str::contains("r.ipynb").not());
}

#[test]
fn test_exclude_and_accepted_languages() {
    let project = Project::new();
    project.write_notebook("keep.ipynb", &["1 + 1"]);
    project.write_notebook("scratch/skip.ipynb", &["1+1"]);
    project.write_value("r.ipynb", &notebook_json("R", &["1 + 1"]));

    project
        .jupyfmt()
        .args(["--check", "--exclude", "/scratch/", "--accepted-languages", "python,R", "."])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("2 file(s) would be left unchanged"))
        .stdout(predicate::str::contains("skip.ipynb").not());
}

#[test]
fn test_explicit_file_ignores_filters() {
    let project = Project::new();
    project.write_notebook("build/nb.ipynb", &["1+1"]);

    project
        .jupyfmt()
        .args(["--check", "build/nb.ipynb"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("1 file(s) would be changed"));
}

#[test]
fn test_unreadable_notebook_in_check_mode() {
    let project = Project::new();
    std::fs::write(project.path().join("broken.ipynb"), "not a notebook").unwrap();
    project.write_notebook("ok.ipynb", &["1 + 1"]);

    project
        .jupyfmt()
        .args(["--check", "broken.ipynb", "ok.ipynb"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Error while formatting file \"broken.ipynb\""))
        .stdout(predicate::str::contains("1 file(s) raised parsing errors"))
        .stdout(predicate::str::contains("1 file(s) would be left unchanged"));
}

#[test]
fn test_unreadable_notebook_in_directory() {
    let project = Project::new();
    project.write_notebook("nbs/good.ipynb", &["1+1"]);
    std::fs::write(project.path().join("nbs/broken.ipynb"), "not json").unwrap();

    project
        .jupyfmt()
        .args(["--check", "nbs"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Error while formatting file \"nbs/broken.ipynb\""))
        .stdout(predicate::str::contains("1 cell(s) would be changed"))
        .stdout(predicate::str::contains("1 file(s) raised parsing errors"))
        .stdout(predicate::str::contains("1 file(s) would be changed"));
}

#[test]
fn test_missing_path() {
    let project = Project::new();

    project
        .jupyfmt()
        .args(["--check", "missing.ipynb"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("missing.ipynb"));
}

#[test]
fn test_secondary_language_from_config() {
    let project = Project::new();
    project.config(
        r#"
[formatters.python]
command = ["cat"]

[formatters.julia]
command = ["sed", "s/=/ = /"]
"#,
    );
    project.write_notebook("nb.ipynb", &["%%julia\nx=1", "y=2"]);

    project
        .jupyfmt()
        .args(["--exclude-nonkernel-languages", "nb.ipynb"])
        .assert()
        .code(0);
    assert_eq!(project.sources("nb.ipynb"), vec!["%%julia\nx=1", "y=2"]);

    project.jupyfmt().arg("nb.ipynb").assert().code(1);
    assert_eq!(project.sources("nb.ipynb"), vec!["%%julia\nx = 1", "y=2"]);
}

#[test]
fn test_skip_magics_from_config() {
    let project = Project::new();
    project.config(
        r#"
skip-magics = ["sql"]

[formatters.python]
command = ["sed", "s/1+1/1 + 1/g"]
"#,
    );
    project.write_notebook("nb.ipynb", &["%%sql\nselect 1+1"]);

    project
        .jupyfmt()
        .args(["--check", "nb.ipynb"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("1 cell(s) would be left unchanged"));
}

#[test]
fn test_pyproject_config() {
    let project = Project::new();
    std::fs::remove_file(project.path().join(".jupyfmt.toml")).unwrap();
    std::fs::write(
        project.path().join("pyproject.toml"),
        "[tool.jupyfmt]\naccepted-languages = [\"R\"]\n\n[tool.jupyfmt.formatters.python]\ncommand = [\"cat\"]\n",
    )
    .unwrap();
    project.write_notebook("py.ipynb", &["1+1"]);
    project.write_value("r.ipynb", &notebook_json("R", &["1+1"]));

    project
        .jupyfmt()
        .args(["--check", "."])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("r.ipynb"))
        .stdout(predicate::str::contains("py.ipynb").not());
}

#[test]
fn test_invalid_config_is_reported() {
    let project = Project::new();
    project.config("line_length = 100\n");
    project.write_notebook("nb.ipynb", &["1 + 1"]);

    project
        .jupyfmt()
        .args(["--check", "nb.ipynb"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains(".jupyfmt.toml"));
}

#[test]
fn test_explicit_config_file() {
    let project = Project::new();
    project.config("line_length = 100\n");
    std::fs::write(
        project.path().join("custom.toml"),
        "[formatters.python]\ncommand = [\"cat\"]\n",
    )
    .unwrap();
    project.write_notebook("nb.ipynb", &["1+1"]);

    project
        .jupyfmt()
        .args(["--check", "--config", "custom.toml", "nb.ipynb"])
        .assert()
        .code(0);
}

#[test]
fn test_style_flags_reach_configured_command() {
    let project = Project::new();
    project.formatter(&[
        "sh",
        "-c",
        r#"cat >/dev/null; printf '%s %s\n' "$0" "$1""#,
        "--line-length={line-length}",
        "{skip-string-normalization}",
    ]);
    project.write_notebook("nb.ipynb", &["1+1"]);

    project.jupyfmt().args(["-l", "100", "-S", "nb.ipynb"]).assert().code(1);
    assert_eq!(project.sources("nb.ipynb"), vec!["--line-length=100 --skip-string-normalization"]);
}

#[test]
fn test_invalid_exclude_regex() {
    let project = Project::new();

    project
        .jupyfmt()
        .args(["--check", "--exclude", "(", "."])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid exclude pattern"));
}

#[test]
fn test_no_paths() {
    Project::new().jupyfmt().assert().code(0);
}
