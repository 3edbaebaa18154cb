//! Validates every Fluent resource under `locales/` at build time.

use std::fs;
use std::path::Path;

fn visit(dir: &Path) {
    let entries = fs::read_dir(dir).unwrap_or_else(|e| panic!("Failed to read {}: {e}", dir.display()));

    for entry in entries.flatten() {
        let path = entry.path();

        if path.is_dir() {
            visit(&path);
        } else if path.extension().is_some_and(|ext| ext == "ftl") {
            println!("cargo:rerun-if-changed={}", path.display());

            let source = fs::read_to_string(&path)
                .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));

            if let Err((_, errors)) = fluent_syntax::parser::parse(source.as_str()) {
                panic!("Invalid Fluent resource {}: {errors:?}", path.display());
            }
        }
    }
}

fn main() {
    println!("cargo:rerun-if-changed=locales");
    visit(Path::new("locales"));
}
