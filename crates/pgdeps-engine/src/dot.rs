//! Generates a Graphviz graph from a [`DependencyGraph`], in the DOT
//! language. See <https://graphviz.org/doc/info/lang.html>.

use pgdeps_core::{DependencyGraph, ObjectKind, RenderConfig};

/// Node attributes for one object kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStyle {
    pub style: &'static str,
    pub color: &'static str,
}

/// Visual attributes of a node, by kind
pub fn node_style(kind: ObjectKind) -> NodeStyle {
    match kind {
        ObjectKind::Table => NodeStyle { style: "solid", color: "black" },
        ObjectKind::View => NodeStyle { style: "filled", color: "lightgrey" },
        ObjectKind::Function => NodeStyle { style: "filled", color: "lightblue2" },
    }
}

/// Writes one `digraph` with a node per object and an edge per dependency.
pub struct DotGenerator {
    output: String,
    indent: u32,
    rankdir: String,
    size: String,
}

impl DotGenerator {
    pub fn new() -> Self {
        Self::from_config(&RenderConfig::default())
    }

    /// Take graph layout attributes from the render settings
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            output: String::new(),
            indent: 0,
            rankdir: config.rankdir.clone(),
            size: config.size.clone(),
        }
    }

    /// Generates the DOT source of `graph`, named `name`.
    ///
    /// Nodes are declared in graph order, so the root comes first.
    pub fn generate(mut self, graph: &DependencyGraph, name: &str) -> String {
        self.new_line(&format!("digraph {} {{", quote(name)));
        self.inc();
        self.new_line(&format!("rankdir={}", quote(&self.rankdir)));
        self.new_line(&format!("size={}", quote(&self.size)));

        for node in graph.nodes() {
            let style = node_style(node.kind);
            self.new_line(&format!(
                "{} [style={}, color={}]",
                quote(&node.qualified_name()),
                style.style,
                style.color
            ));
        }

        for edge in graph.edges() {
            let line = match edge.label() {
                Some(label) => format!(
                    "{} -> {} [label={}]",
                    quote(&edge.from.qualified_name()),
                    quote(&edge.to.qualified_name()),
                    quote(&label)
                ),
                None => format!(
                    "{} -> {}",
                    quote(&edge.from.qualified_name()),
                    quote(&edge.to.qualified_name())
                ),
            };
            self.new_line(&line);
        }

        self.dec();
        self.new_line("}");
        self.new_line(""); // final empty line
        self.output
    }

    fn inc(&mut self) {
        self.indent += 1;
    }

    fn dec(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    fn new_line(&mut self, s: &str) {
        if !self.output.is_empty() {
            self.output.push('\n');
            for _ in 0..self.indent * 4 {
                self.output.push(' ');
            }
        }
        self.output.push_str(s);
    }
}

impl Default for DotGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Render `graph` as DOT source with default layout
pub fn to_dot(graph: &DependencyGraph, name: &str) -> String {
    DotGenerator::new().generate(graph, name)
}

/// Double-quoted DOT identifier
fn quote(id: &str) -> String {
    let mut quoted = String::with_capacity(id.len() + 2);
    quoted.push('"');
    for c in id.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
