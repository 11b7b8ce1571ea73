use std::env;
use std::process;

const HELP: &str = "\
CascadeLang interpreter

Usage:
  cascadec <file> [--json]

Options:
  --json         Emit a JSON run report instead of plain output
  -h, --help     Show this help message
  --version      Show version information
";

#[derive(Debug, PartialEq, Eq)]
struct Command {
    path: String,
    json: bool,
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|arg| matches!(arg.as_str(), "-h" | "--help")) {
        print!("{HELP}");
        return;
    }

    if args[0] == "--version" {
        println!("cascadec {}", cascade_core::VERSION);
        return;
    }

    let command = match parse_command(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!();
            eprintln!("{HELP}");
            process::exit(2);
        }
    };

    if command.json {
        let (report, ok) = run_report(&command.path);
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
        );
        if !ok {
            process::exit(1);
        }
        return;
    }

    match run(&command.path) {
        Ok(output) => print!("{output}"),
        Err(diagnostics) => {
            for diagnostic in &diagnostics {
                eprintln!("{}", render_diagnostic(diagnostic));
            }
            process::exit(1);
        }
    }
}

fn parse_command(args: &[String]) -> Result<Command, String> {
    let mut path = None;
    let mut json = false;
    for arg in args {
        match arg.as_str() {
            "--json" => json = true,
            flag if flag.starts_with('-') => {
                return Err(format!("unknown option '{flag}'"));
            }
            value => {
                if path.is_some() {
                    return Err("multiple paths provided".to_string());
                }
                path = Some(value.to_string());
            }
        }
    }
    let path = path.ok_or_else(|| "missing source file path".to_string())?;
    Ok(Command { path, json })
}

fn run(path: &str) -> Result<String, Vec<cascade_core::Diagnostic>> {
    let program = cascade_core::parse_path(path)?;
    cascade_vm::eval_with_output(&program).map_err(|err| {
        vec![cascade_core::runtime_diagnostic(
            path,
            err.code,
            err.message,
            err.span,
            err.trace,
        )]
    })
}

fn run_report(path: &str) -> (cascade_core::RunReport, bool) {
    match run(path) {
        Ok(output) => (
            cascade_core::RunReport {
                tool: cascade_core::TOOL_NAME,
                version: cascade_core::VERSION,
                ok: true,
                output: Some(output),
                diagnostics: Vec::new(),
            },
            true,
        ),
        Err(diagnostics) => (
            cascade_core::RunReport {
                tool: cascade_core::TOOL_NAME,
                version: cascade_core::VERSION,
                ok: false,
                output: None,
                diagnostics,
            },
            false,
        ),
    }
}

fn render_diagnostic(diagnostic: &cascade_core::Diagnostic) -> String {
    let mut rendered = format!(
        "{}:{}:{}: error[{}]: {}",
        diagnostic.file,
        diagnostic.span.start.line,
        diagnostic.span.start.col,
        diagnostic.code,
        diagnostic.message
    );
    for frame in &diagnostic.trace {
        rendered.push_str(&format!(
            "\n  in {} ({}:{}:{})",
            frame.function, diagnostic.file, frame.span.start.line, frame.span.start.col
        ));
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn write_temp(contents: &str, name: &str) -> PathBuf {
        let mut path = env::temp_dir();
        let file_name = format!("cascade_{name}_{}.csc", std::process::id());
        path.push(file_name);
        fs::write(&path, contents).expect("write temp file");
        path
    }

    #[test]
    fn parse_command_accepts_path_and_json() {
        let args = vec!["program.csc".to_string(), "--json".to_string()];
        let command = parse_command(&args).unwrap();
        assert_eq!(command.path, "program.csc");
        assert!(command.json);
    }

    #[test]
    fn parse_command_rejects_unknown_flag() {
        let args = vec!["program.csc".to_string(), "--fast".to_string()];
        assert!(parse_command(&args).is_err());
    }

    #[test]
    fn parse_command_requires_path() {
        let args = vec!["--json".to_string()];
        assert!(parse_command(&args).is_err());
    }

    #[test]
    fn run_collects_program_output() {
        let path = write_temp("print 1 + 2\n", "ok");
        let output = run(path.to_str().unwrap()).unwrap();
        assert_eq!(output, "3\n");
        fs::remove_file(path).ok();
    }

    #[test]
    fn run_reports_runtime_error_with_location() {
        let path = write_temp("print missing\n", "undef");
        let diagnostics = run(path.to_str().unwrap()).unwrap_err();
        assert_eq!(diagnostics[0].code, "E0400");
        assert_eq!(diagnostics[0].span.start.line, 1);
        fs::remove_file(path).ok();
    }

    #[test]
    fn run_report_marks_parse_failure() {
        let path = write_temp("struct {", "bad");
        let (report, ok) = run_report(path.to_str().unwrap());
        assert!(!ok);
        assert!(!report.ok);
        assert!(!report.diagnostics.is_empty());
        fs::remove_file(path).ok();
    }

    #[test]
    fn cascade_scenario_runs_end_to_end() {
        let source = "\
struct N { mandatory id, optional next, }
let a = new N { id: 1 }
let b = new N { id: 2 }
a.next = b
b.id = null
print a.next
assert(a.next == null)
";
        let path = write_temp(source, "cascade");
        let output = run(path.to_str().unwrap()).unwrap();
        assert_eq!(output, "null\n");
        fs::remove_file(path).ok();
    }
}
