//! Implements the command line behavior.
use std::fs;
use std::path::{Path, PathBuf};

use codespan_reporting::diagnostic::{Diagnostic, Label, LabelStyle, Severity};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term::{
    self,
    termcolor::{ColorChoice, StandardStream},
};
use log::info;

use pasc_dsl::core::FileId;
use pasc_parser::CompileResult;

/// Checks the specified file without writing any output.
pub fn check(path: &Path) -> Result<(), String> {
    let result = compile_file(path)?;
    match result.ir {
        Some(_) => {
            println!("OK");
            Ok(())
        }
        None => Err(format!("Number of errors: {}", error_count(&result))),
    }
}

/// Compiles the specified file and writes the IR text.
pub fn build(path: &Path, output: Option<&Path>) -> Result<(), String> {
    let result = compile_file(path)?;
    match result.ir {
        Some(ir) => {
            let output = output
                .map(Path::to_path_buf)
                .unwrap_or_else(|| default_output(path));
            fs::write(&output, ir).map_err(|err| {
                format!("Unable to write output file {}. {}", output.display(), err)
            })?;
            info!("Wrote {}", output.display());
            Ok(())
        }
        None => Err(format!("Number of errors: {}", error_count(&result))),
    }
}

fn default_output(path: &Path) -> PathBuf {
    path.with_extension("ll")
}

fn error_count(result: &CompileResult) -> usize {
    result
        .diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.severity == pasc_dsl::diagnostic::Severity::Error)
        .count()
}

/// Reads and compiles one source file, rendering any diagnostics to the
/// terminal.
fn compile_file(path: &Path) -> Result<CompileResult, String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("Unable to read file {}. {}", path.display(), err))?;
    let file_id = FileId::from_path(path);
    let result = pasc_parser::compile(&contents, &file_id);
    render_diagnostics(&result, path, &contents);
    Ok(result)
}

fn render_diagnostics(result: &CompileResult, path: &Path, contents: &String) {
    if result.diagnostics.is_empty() {
        return;
    }

    let writer = StandardStream::stderr(ColorChoice::Always);
    let config = term::Config::default();

    let mut files: SimpleFiles<String, &String> = SimpleFiles::new();
    let file = files.add(path.display().to_string(), contents);

    for diagnostic in result.diagnostics.iter() {
        let mapped = map_diagnostic(diagnostic, file);
        let _ = term::emit(&mut writer.lock(), &config, &files, &mapped).map_err(|err| {
            println!("Failed writing to terminal: {}", err);
        });
    }
}

fn map_diagnostic(
    diagnostic: &pasc_dsl::diagnostic::Diagnostic,
    file: usize,
) -> Diagnostic<usize> {
    let severity = match diagnostic.severity {
        pasc_dsl::diagnostic::Severity::Error => Severity::Error,
        pasc_dsl::diagnostic::Severity::Warning => Severity::Warning,
    };
    let label = Label::new(
        LabelStyle::Primary,
        file,
        diagnostic.primary.start..diagnostic.primary.end,
    )
    .with_message(diagnostic.primary.message.clone());

    Diagnostic::new(severity)
        .with_code(diagnostic.code)
        .with_message(diagnostic.description())
        .with_labels(vec![label])
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::cli::{build, check};

    fn resource_path(name: &str) -> PathBuf {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("resources");
        path.push("test");
        path.push(name);
        path
    }

    #[test]
    fn check_when_valid_source_then_ok() {
        let result = check(&resource_path("squares.pas"));
        assert!(result.is_ok());
    }

    #[test]
    fn check_when_unknown_symbol_then_err() {
        let result = check(&resource_path("unknown_symbol.pas"));
        assert!(result.is_err());
    }

    #[test]
    fn check_when_missing_file_then_err() {
        let result = check(&resource_path("does_not_exist.pas"));
        assert!(result.is_err());
    }

    #[test]
    fn build_when_valid_source_then_writes_ir() {
        let output = std::env::temp_dir().join("pascc_squares_test.ll");
        let result = build(&resource_path("squares.pas"), Some(&output));
        assert!(result.is_ok());
        let ir = std::fs::read_to_string(&output).unwrap();
        assert!(ir.contains("define i32 @main()"));
        let _ = std::fs::remove_file(&output);
    }
}
