//! The interactive read-eval-print loop.
//!
//! Everything interesting lives in the library; this binary only reads lines,
//! hands them to an [`Evaluator`], and prints whatever output accumulated.
//! Diagnostics go to stderr so they never mix with Forth output, and the
//! usual `RUST_LOG` filtering applies to the compile/execute tracing.

use forthkit::runtime::{error::ErrorHandler, evaluator::Evaluator};
use rustyline::{DefaultEditor, error::ReadlineError};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

/// Print errors to stderr as they are reported.
struct ErrorPrinter;

impl ErrorHandler for ErrorPrinter {
    fn handle_error(&mut self, message: &str) {
        eprintln!("ERROR: {}", message);
    }
}

fn main() -> rustyline::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut evaluator = Evaluator::new();
    evaluator.set_error_handler(Box::new(ErrorPrinter));

    let mut editor = DefaultEditor::new()?;

    loop {
        // Show the argument stack while idle and a bare continuation marker
        // while a multi-line definition is still open.
        let prompt = if evaluator.is_compiling() {
            "  ... ".to_string()
        } else {
            format!("[ {}] ==> ", evaluator.arg_stack())
        };

        match editor.readline(&prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                let _ = editor.add_history_entry(&line);
                let _ = evaluator.eval(&line);

                print!("{}", evaluator.read_and_reset_output());
                io::stdout().flush()?;
            }

            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,

            Err(error) => return Err(error),
        }
    }

    Ok(())
}
