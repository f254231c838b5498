//! Developer tools
//!
//! Renders a [`ParserSpec`] as a Mermaid or GraphViz DOT diagram.

use super::spec::{Atom, ParserSpec};
use std::fmt::{self, Write};

/// Spec visualizer
pub struct GrammarVisualizer<'a> {
    spec: &'a ParserSpec,
}

impl<'a> GrammarVisualizer<'a> {
    /// Create a new visualizer
    pub fn new(spec: &'a ParserSpec) -> Self {
        Self { spec }
    }

    /// Generate a Mermaid diagram
    pub fn to_mermaid(&self) -> String {
        let mut output = String::new();
        // Writing to a String cannot fail
        let _ = self.write_mermaid(&mut output);
        output
    }

    /// Generate a GraphViz DOT diagram
    pub fn to_dot(&self) -> String {
        let mut output = String::new();
        let _ = self.write_dot(&mut output);
        output
    }

    /// Write a Mermaid diagram
    pub fn write_mermaid(&self, out: &mut impl Write) -> fmt::Result {
        writeln!(out, "graph TD")?;
        for (i, rule) in self.spec.rules.iter().enumerate() {
            writeln!(out, "  r{}([\"{}\"])", i, escape(&rule.name))?;
            writeln!(out, "  r{} --> a{}", i, rule.atom)?;
        }
        for (i, atom) in self.spec.atoms.iter().enumerate() {
            writeln!(out, "  a{}[\"{}: {}\"]", i, i, escape(&self.atom_label(atom)))?;
            for child in atom.children() {
                writeln!(out, "  a{} --> a{}", i, child)?;
            }
            if let Atom::Rule { rule } = atom {
                writeln!(out, "  a{} -.-> r{}", i, rule)?;
            }
        }
        Ok(())
    }

    /// Write a GraphViz DOT diagram
    pub fn write_dot(&self, out: &mut impl Write) -> fmt::Result {
        writeln!(out, "digraph Grammar {{")?;
        writeln!(out, "  rankdir=TB;")?;
        writeln!(out, "  node [shape=box];")?;

        for (i, rule) in self.spec.rules.iter().enumerate() {
            let fill = if i == self.spec.start {
                "lightblue"
            } else {
                "lightgrey"
            };
            writeln!(
                out,
                "  r{} [label=\"{}\", shape=ellipse, style=filled, fillcolor={}]",
                i,
                escape(&rule.name),
                fill
            )?;
            writeln!(out, "  r{} -> a{}", i, rule.atom)?;
        }

        for (i, atom) in self.spec.atoms.iter().enumerate() {
            writeln!(
                out,
                "  a{} [label=\"{}: {}\"]",
                i,
                i,
                escape(&self.atom_label(atom))
            )?;
            for child in atom.children() {
                writeln!(out, "  a{} -> a{}", i, child)?;
            }
            if let Atom::Rule { rule } = atom {
                writeln!(out, "  a{} -> r{} [style=dashed]", i, rule)?;
            }
        }

        writeln!(out, "}}")
    }

    fn atom_label(&self, atom: &Atom) -> String {
        match atom {
            Atom::Empty => "empty".to_string(),
            Atom::Token { text } => format!("str({:?})", text),
            Atom::Pattern { pattern } => format!("re({:?})", pattern),
            Atom::Sequence { atoms } => format!("seq({})", atoms.len()),
            Atom::Choice { atoms } => format!("alt({})", atoms.len()),
            Atom::Optional { .. } => "opt".to_string(),
            Atom::Repetition { min, .. } => format!("rep({}..)", min),
            Atom::Join { min, .. } => format!("join({}..)", min),
            Atom::Named { name, .. } => format!("named({:?})", name),
            Atom::Rule { rule } => match self.spec.rules.get(*rule) {
                Some(entry) => format!("rule({})", entry.name),
                None => format!("rule(#{})", rule),
            },
            Atom::Ignore { .. } => "ignore".to_string(),
        }
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
