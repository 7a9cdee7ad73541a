//! Graph file output
//!
//! Writes the DOT source and, unless the requested format is `dot`, runs
//! the Graphviz `dot` executable on it.

use std::path::{Path, PathBuf};
use std::process::Command;
use pgdeps_core::{DependencyGraph, OutputFormat, RenderConfig};
use crate::dot::DotGenerator;
use crate::error::RenderError;

/// Default Graphviz executable
pub const DEFAULT_GRAPHVIZ: &str = "dot";

/// Renders dependency graphs to files
pub struct Renderer {
    config: RenderConfig,
    program: String,
}

impl Renderer {
    /// Create a renderer using the `dot` executable found on `PATH`
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            program: DEFAULT_GRAPHVIZ.to_string(),
        }
    }

    /// Use another Graphviz executable
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Path of the file `render` produces for a graph named `name`
    pub fn output_path(&self, name: &str) -> PathBuf {
        self.config
            .output_dir
            .join(format!("{}.{}", file_stem(name), self.config.format.as_str()))
    }

    /// Write `graph` as `<output_dir>/<name>.<format>` and return the path
    ///
    /// The intermediate `.dot` file is removed after a successful Graphviz
    /// run unless `keep_dot` is set.
    pub fn render(&self, graph: &DependencyGraph, name: &str) -> Result<PathBuf, RenderError> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let source = DotGenerator::from_config(&self.config).generate(graph, name);
        let dot_path = self.config.output_dir.join(format!("{}.dot", file_stem(name)));
        std::fs::write(&dot_path, source)?;
        tracing::debug!(path = %dot_path.display(), "wrote DOT source");

        if self.config.format == OutputFormat::Dot {
            return Ok(dot_path);
        }

        let output_path = self.output_path(name);
        self.run_graphviz(&dot_path, &output_path)?;

        if !self.config.keep_dot {
            std::fs::remove_file(&dot_path)?;
        }

        tracing::info!(path = %output_path.display(), "rendered graph");
        Ok(output_path)
    }

    fn run_graphviz(&self, input: &Path, output: &Path) -> Result<(), RenderError> {
        let result = Command::new(&self.program)
            .arg(format!("-T{}", self.config.format.as_str()))
            .arg("-o")
            .arg(output)
            .arg(input)
            .output();

        let result = match result {
            Ok(result) => result,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RenderError::GraphvizNotFound(self.program.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        if !result.status.success() {
            return Err(RenderError::GraphvizFailed {
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

/// File name stem for a graph name
///
/// Path separators and a leading dot become `_`, so the result always names
/// a plain file directly inside the output directory.
fn file_stem(name: &str) -> String {
    let mut stem: String = name
        .chars()
        .map(|c| if std::path::is_separator(c) || c == '\0' { '_' } else { c })
        .collect();

    if stem.is_empty() || stem.starts_with('.') {
        stem.replace_range(..stem.find(|c| c != '.').unwrap_or(stem.len()), "_");
    }

    stem
}
