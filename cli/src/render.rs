use std::path::PathBuf;

use clap::{Args, ValueEnum};
use color_eyre::eyre::Result;
use console::style;
use jsoml::{OutputNode, html, render_nodes};

use crate::{config::PolicyArgs, util};

/// Output format of `jsoml render`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// HTML markup
    #[default]
    Html,
    /// Output nodes as JSON
    Json,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Document to render (`-` for standard input)
    pub input: PathBuf,

    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Html)]
    pub format: Format,

    /// Write to this file instead of standard output
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let config = args.policy.resolve()?;
    let source = util::read_document(&args.input)?;
    let nodes = smol::block_on(render_nodes(source, &config));

    let failures: usize = nodes.iter().map(|node| node.errors().len()).sum();
    if failures > 0 {
        eprintln!(
            "{} {failures} fragment(s) rendered as error nodes; run `jsoml check` for details",
            style("warning:").yellow().bold()
        );
    }

    let rendered = serialize(&nodes, args.format)?;
    util::write_output(args.output.as_deref(), &rendered)
}

fn serialize(nodes: &[OutputNode], format: Format) -> Result<String> {
    Ok(match format {
        Format::Html => nodes.iter().map(html::to_html).collect(),
        Format::Json => serde_json::to_string_pretty(nodes)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_formats() {
        let nodes = vec![OutputNode::text("a"), OutputNode::error("Max depth reached")];

        let markup = serialize(&nodes, Format::Html).unwrap();
        assert!(markup.starts_with("a<div style="));

        let json: serde_json::Value =
            serde_json::from_str(&serialize(&nodes, Format::Json).unwrap()).unwrap();
        assert_eq!(json[0]["type"], "text");
        assert_eq!(json[1]["type"], "error");
        assert_eq!(json[1]["message"], "Max depth reached");
    }
}
