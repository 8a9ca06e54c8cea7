//! pluck: find elements in HTML or XML with CSS-like selectors.
//!
//! Run with: cargo run --bin pluck -- 'a[href]' page.html
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`
//! (for example `RUST_LOG=pluck_select=trace`).

use std::collections::BTreeMap;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use pluck_common::warning::warn_once;
use pluck_dom::DomTree;
use pluck_html::{load, load_str, print_tree};
use pluck_select::{NodeRef, Query, QueryOptions};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// pluck: query markup with a compact CSS-like selector language
#[derive(Parser, Debug)]
#[command(name = "pluck")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Text of every paragraph with an id
    pluck 'p[id]' page.html

    # The last link, as its href
    pluck --index -1 --attr href 'a[href]' page.html

    # Table cells whose text mentions "total"
    pluck 'tr td[plaintext*=total]' report.html

    # Inline markup, JSON output
    pluck --json 'li.done' --html '<ul><li class="done">a</li></ul>'
"#)]
struct Cli {
    /// Selector to evaluate
    #[arg(value_name = "SELECTOR")]
    selector: String,

    /// Path to an HTML or XML file (markup text is accepted too)
    #[arg(value_name = "FILE", conflicts_with = "html")]
    source: Option<String>,

    /// Parse this markup instead of reading a file
    #[arg(long, value_name = "MARKUP")]
    html: Option<String>,

    /// Only the match at this position; negative counts from the end
    #[arg(short, long, allow_negative_numbers = true)]
    index: Option<isize>,

    /// Fail when a positional query finds nothing
    #[arg(long)]
    strict: bool,

    /// Print this attribute of each match instead of its text
    #[arg(short, long, value_name = "NAME")]
    attr: Option<String>,

    /// Print matches as JSON
    #[arg(long, conflicts_with = "attr")]
    json: bool,

    /// Print the loaded tree before querying
    #[arg(long)]
    tree: bool,
}

/// One match in `--json` output.
#[derive(Debug, Serialize)]
struct MatchRecord<'a> {
    tag: &'a str,
    attributes: BTreeMap<&'a str, &'a str>,
    text: String,
}

impl<'a> From<&NodeRef<'a>> for MatchRecord<'a> {
    fn from(node: &NodeRef<'a>) -> Self {
        let attributes = node
            .element()
            .map(|element| {
                element
                    .attrs
                    .iter()
                    .map(|attr| (attr.name.as_str(), attr.value.as_str()))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            tag: node.tag_name().unwrap_or_default(),
            attributes,
            text: node.plain_text(),
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let tree = load_tree(&cli)?;
    if cli.tree {
        println!("=== DOM Tree ===");
        print_tree(&tree, tree.root(), 0);
        println!();
    }

    let query = Query::new(&tree).with_options(QueryOptions { strict: cli.strict });
    let matches: Vec<NodeRef<'_>> = match cli.index {
        Some(index) => query.one(&cli.selector, index)?.into_iter().collect(),
        None => query.all(&cli.selector)?.collect(),
    };
    tracing::debug!("{} matches for {:?}", matches.len(), cli.selector);

    if matches.is_empty() {
        eprintln!("{}", format!("no match for {:?}", cli.selector).yellow());
        return Ok(ExitCode::FAILURE);
    }

    if cli.json {
        let records: Vec<MatchRecord<'_>> = matches.iter().map(MatchRecord::from).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for line in render_lines(&matches, cli.attr.as_deref()) {
            println!("{line}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Load the tree from `--html` or the positional source.
fn load_tree(cli: &Cli) -> anyhow::Result<DomTree> {
    if let Some(ref markup) = cli.html {
        load_str(markup).context("failed to parse --html markup")
    } else if let Some(ref source) = cli.source {
        load(source).with_context(|| format!("failed to load {source}"))
    } else {
        anyhow::bail!("a FILE or --html is required")
    }
}

/// Text of each match, or the value of `attr` where the match has one.
fn render_lines(matches: &[NodeRef<'_>], attr: Option<&str>) -> Vec<String> {
    let Some(name) = attr else {
        return matches.iter().map(NodeRef::plain_text).collect();
    };
    let lines: Vec<String> = matches.iter().filter_map(|node| node.value_of(name)).collect();
    if lines.len() < matches.len() {
        warn_once("cli", &format!("some matches have no {name:?} attribute"));
    }
    lines
}
