use std::path::PathBuf;

use clap::Args;
use color_eyre::eyre::{Result, bail};
use console::style;
use jsoml::{Diagnostic, OutputNode, render_nodes};

use crate::{config::PolicyArgs, util};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Document to check (`-` for standard input)
    pub input: PathBuf,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let config = args.policy.resolve()?;
    let source = util::read_document(&args.input)?;
    let nodes = smol::block_on(render_nodes(source, &config));
    let diagnostics = diagnostics(&nodes);

    if diagnostics.is_empty() {
        println!(
            "{} {} top-level node(s) rendered cleanly",
            style("[ok]").green(),
            nodes.len()
        );
        return Ok(());
    }

    for diagnostic in &diagnostics {
        println!("  {} {diagnostic}", style("[error]").red());
    }
    bail!("{} fragment(s) failed to render", diagnostics.len())
}

fn diagnostics(nodes: &[OutputNode]) -> Vec<Diagnostic> {
    nodes.iter().flat_map(OutputNode::errors).collect()
}
