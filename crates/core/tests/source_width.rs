use std::fs;
use std::path::{Path, PathBuf};

const MAX_WIDTH: usize = 100;

#[test]
fn workspace_code_lines_fit_the_formatter_width() {
    let crates_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("..");
    let mut sources = Vec::new();
    collect_rust_files(&crates_dir, &mut sources);
    assert!(!sources.is_empty(), "no sources found under {}", crates_dir.display());

    let mut too_wide = Vec::new();
    for path in &sources {
        let text = fs::read_to_string(path).expect("source should be readable");
        for (index, line) in text.lines().enumerate() {
            let wide = line.chars().count() > MAX_WIDTH;
            if wide && strip_string_literals(line).chars().count() > MAX_WIDTH {
                too_wide.push(format!("{}:{}", path.display(), index + 1));
            }
        }
    }

    assert!(too_wide.is_empty(), "lines wider than {MAX_WIDTH} columns: {too_wide:#?}");
}

#[test]
fn string_literals_are_exempt_from_the_width_check() {
    let line = format!("    let message = \"{}\";", "x".repeat(120));

    assert_eq!(strip_string_literals(&line), "    let message = \"\";");
    assert_eq!(strip_string_literals(r#"f("a\"b", 'c')"#), r#"f("", 'c')"#);
}

fn collect_rust_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if path.file_name().is_some_and(|name| name == "target") {
                continue;
            }
            collect_rust_files(&path, out);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            out.push(path);
        }
    }
}

/// Drops the contents of `"..."` literals; rustfmt never splits them.
fn strip_string_literals(line: &str) -> String {
    let mut stripped = String::with_capacity(line.len());
    let mut in_string = false;
    let mut escaped = false;

    for ch in line.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
                stripped.push(ch);
            }
            continue;
        }
        if ch == '"' {
            in_string = true;
        }
        stripped.push(ch);
    }

    stripped
}
