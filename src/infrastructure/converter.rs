//! Document conversion via an external process
//!
//! The DOT text is written to a temporary file and handed to the converter
//! (Graphviz `dot` by default); the rendered document is read from stdout.

use std::io::{self, Write};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::config::ConverterConfig;
use crate::domain::{Direction, DocumentFormat, PageSize};
use crate::infrastructure::traits::CommandRunner;
use crate::infrastructure::{InfraError, InfraResult};

/// Turns DOT text into document bytes.
pub trait DocumentConverter: Send + Sync {
    fn convert(
        &self,
        dot: &str,
        page: PageSize,
        direction: Direction,
        format: DocumentFormat,
    ) -> InfraResult<Vec<u8>>;
}

/// Converter backed by a Graphviz-compatible command line tool.
pub struct GraphvizConverter {
    cmd: Arc<dyn CommandRunner>,
    config: ConverterConfig,
}

impl GraphvizConverter {
    pub fn new(cmd: Arc<dyn CommandRunner>, config: ConverterConfig) -> Self {
        Self { cmd, config }
    }

    /// Arguments for one invocation, input file last.
    pub fn arguments(
        &self,
        page: PageSize,
        direction: Direction,
        format: DocumentFormat,
        input: &str,
    ) -> Vec<String> {
        let (width, height) = page.inches();
        let mut args = vec![
            format!("-T{}", format.extension()),
            format!("-Gsize={},{}", width, height),
            format!("-Grankdir={}", direction.as_str()),
        ];
        args.extend(self.config.extra_args.iter().cloned());
        args.push(input.to_string());
        args
    }
}

impl DocumentConverter for GraphvizConverter {
    #[instrument(level = "debug", skip(self, dot))]
    fn convert(
        &self,
        dot: &str,
        page: PageSize,
        direction: Direction,
        format: DocumentFormat,
    ) -> InfraResult<Vec<u8>> {
        let mut input = tempfile::Builder::new()
            .prefix("famtree-")
            .suffix(".dot")
            .tempfile()
            .map_err(|e| InfraError::io("create converter input", e))?;
        input
            .write_all(dot.as_bytes())
            .and_then(|_| input.flush())
            .map_err(|e| InfraError::io("write converter input", e))?;

        let input_path = input.path().to_string_lossy().to_string();
        let args = self.arguments(page, direction, format, &input_path);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        debug!("{} {}", self.config.command, args.join(" "));

        let output = self
            .cmd
            .run(&self.config.command, &arg_refs)
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => InfraError::Converter {
                    message: format!("command not found: {}", self.config.command),
                    exit_code: None,
                },
                _ => InfraError::Converter {
                    message: format!("failed to run {}: {}", self.config.command, e),
                    exit_code: None,
                },
            })?;

        if !output.status.success() {
            return Err(InfraError::Converter {
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                exit_code: output.status.code(),
            });
        }
        if output.stdout.is_empty() {
            return Err(InfraError::Converter {
                message: format!("{} produced no output", self.config.command),
                exit_code: output.status.code(),
            });
        }

        debug!("converted {} bytes of DOT into {} bytes", dot.len(), output.stdout.len());
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::process::{ExitStatus, Output};
    use std::sync::Mutex;

    /// Records invocations and replays a canned output.
    struct MockRunner {
        calls: Mutex<Vec<(String, Vec<String>, String)>>,
        status: i32,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    }

    impl MockRunner {
        fn new(status: i32, stdout: &[u8], stderr: &[u8]) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                status,
                stdout: stdout.to_vec(),
                stderr: stderr.to_vec(),
            }
        }
    }

    impl CommandRunner for MockRunner {
        fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output> {
            // the input file only lives for the duration of the call
            let input = std::fs::read_to_string(args[args.len() - 1])?;
            self.calls.lock().unwrap().push((
                cmd.to_string(),
                args.iter().map(|a| a.to_string()).collect(),
                input,
            ));
            Ok(Output {
                status: ExitStatus::from_raw(self.status << 8),
                stdout: self.stdout.clone(),
                stderr: self.stderr.clone(),
            })
        }
    }

    fn config(extra: &[&str]) -> ConverterConfig {
        ConverterConfig {
            command: "dot".to_string(),
            extra_args: extra.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn given_request_when_converting_then_passes_parameters_and_dot_file() {
        let runner = Arc::new(MockRunner::new(0, b"%PDF-1.7", b""));
        let converter = GraphvizConverter::new(runner.clone(), config(&["-Nfontname=Arial"]));

        let bytes = converter
            .convert("digraph family {}", PageSize::A4, Direction::LR, DocumentFormat::Pdf)
            .unwrap();

        assert_eq!(bytes, b"%PDF-1.7");
        let calls = runner.calls.lock().unwrap();
        let (cmd, args, input) = &calls[0];
        assert_eq!(cmd, "dot");
        assert_eq!(&args[..4], &["-Tpdf", "-Gsize=8.3,11.7", "-Grankdir=LR", "-Nfontname=Arial"]);
        assert!(args[4].ends_with(".dot"));
        assert_eq!(input, "digraph family {}");
    }

    #[test]
    fn given_failing_command_when_converting_then_converter_error_with_exit_code() {
        let runner = Arc::new(MockRunner::new(1, b"", b"syntax error in line 1\n"));
        let converter = GraphvizConverter::new(runner, config(&[]));

        let err = converter
            .convert("digraph {", PageSize::A4, Direction::TB, DocumentFormat::Png)
            .unwrap_err();

        match err {
            InfraError::Converter { message, exit_code } => {
                assert_eq!(message, "syntax error in line 1");
                assert_eq!(exit_code, Some(1));
            }
            other => panic!("expected converter error, got {other:?}"),
        }
    }

    #[test]
    fn given_empty_output_when_converting_then_converter_error() {
        let runner = Arc::new(MockRunner::new(0, b"", b""));
        let converter = GraphvizConverter::new(runner, config(&[]));

        let result = converter.convert("digraph {}", PageSize::A4, Direction::TB, DocumentFormat::Svg);

        assert!(matches!(result, Err(InfraError::Converter { .. })));
    }
}
