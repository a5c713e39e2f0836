// Property-based tests for the directive shield, the cell formatter and diffs.

use jupyfmt_lib::cell_tools::{FormatterOptions, FormatterRegistry, format_cell};
use jupyfmt_lib::diff::full_diff;
use jupyfmt_lib::error::FormatError;
use jupyfmt_lib::magic::{shield, unshield};
use proptest::prelude::*;

/// Lines mixing code, comments, line magics, cell magics and shell escapes.
fn cell_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[xyz =+()0-9]{0,12}",
        "#[ xyz]{0,8}",
        "%[xyz ]{0,8}",
        "%%[xyz]{1,6}",
        "![xyz ]{0,8}",
        "  [%!xyz]{0,6}",
    ]
}

fn cell_strategy() -> impl Strategy<Value = String> {
    (prop::collection::vec(cell_line_strategy(), 0..8), any::<bool>()).prop_map(|(lines, trailing)| {
        let mut source = lines.join("\n");
        if trailing {
            source.push('\n');
        }
        source
    })
}

fn identity(source: &str, _: &FormatterOptions) -> Result<String, FormatError> {
    Ok(source.to_string())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn shield_is_inverted_by_unshield(source in cell_strategy()) {
        prop_assert_eq!(unshield(&shield(&source)), source);
    }

    #[test]
    fn shielded_lines_never_start_with_directives(source in cell_strategy()) {
        for line in shield(&source).lines() {
            prop_assert!(!line.starts_with('%') && !line.starts_with('!'), "line {:?}", line);
        }
    }

    #[test]
    fn identity_formatter_only_drops_one_trailing_newline(source in cell_strategy()) {
        let registry = FormatterRegistry::new(Box::new(identity));
        let result = format_cell(&source, &registry, &FormatterOptions::default(), false).unwrap();
        if source.is_empty() {
            prop_assert_eq!(result, None);
        } else {
            let expected = source.strip_suffix('\n').unwrap_or(&source).to_string();
            prop_assert_eq!(result, Some(expected));
        }
    }

    #[test]
    fn full_diff_reconstructs_both_sides(
        original in prop::collection::vec("[abc]{0,2}", 0..10),
        modified in prop::collection::vec("[abc]{0,2}", 0..10),
    ) {
        let original = original.join("\n");
        let modified = modified.join("\n");
        let diff = full_diff(&original, &modified);

        let mut old_side = Vec::new();
        let mut new_side = Vec::new();
        for line in diff.lines() {
            let (marker, text) = line.split_at(2);
            match marker {
                "  " => {
                    old_side.push(text);
                    new_side.push(text);
                }
                "- " => old_side.push(text),
                "+ " => new_side.push(text),
                other => prop_assert!(false, "unexpected marker {:?}", other),
            }
        }

        prop_assert_eq!(old_side, original.lines().collect::<Vec<_>>());
        prop_assert_eq!(new_side, modified.lines().collect::<Vec<_>>());
    }
}
