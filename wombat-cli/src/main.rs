//! Wombat CLI
//!
//! Opens a document with all the resources it links to and prints what the
//! document model made of it.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use wombat_common::{has_scheme, resolve_url, url_root};
use wombat_dom::{DomTree, NodeId, NodeType};
use wombat_model::{
    Document, Event, EventKind, Model, ModelConfig, Response, View, scan_document_links,
    stylesheet_links,
};

/// Wombat - open XML, HTML, SVG and CSS documents and inspect them
#[derive(Parser, Debug)]
#[command(name = "wombat")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Open a file and list its links
    wombat ./drawing.svg

    # Print the element tree
    wombat --tree https://example.com/

    # Print effective property values of every element
    wombat --style color --style fill ./drawing.svg

    # Parse inline HTML
    wombat --html '<p style="color: red">hi</p>' --style color
"#)]
struct Cli {
    /// Path or URL of the document to open
    #[arg(value_name = "FILE|URL")]
    path: Option<String>,

    /// Open this HTML string instead of a file or URL
    #[arg(long, value_name = "HTML")]
    html: Option<String>,

    /// Print the element tree
    #[arg(short, long)]
    tree: bool,

    /// Print the stylesheets that apply to the document
    #[arg(short, long)]
    css: bool,

    /// Print the effective value of a property for every element
    #[arg(short, long, value_name = "PROPERTY")]
    style: Vec<String>,

    /// Print every lifecycle event, not only warnings and errors
    #[arg(short, long)]
    events: bool,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory of the HTTP cache
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Directory searched for `chrome:` resources
    #[arg(long, value_name = "DIR")]
    chrome_dir: Option<PathBuf>,

    /// Directory `@font-face` fonts are installed into
    #[arg(long, value_name = "DIR")]
    font_dir: Option<PathBuf>,

    /// Resolution used for absolute lengths
    #[arg(long)]
    dpi: Option<f64>,

    /// More log output; repeat for more detail
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    let url = document_url(&cli)?;
    debug!(url = %url, "opening");

    let model = Model::new(config).context("cannot set up downloads")?;
    let view = model.create_view();
    let all_events = cli.events;
    view.add_handler(move |event: &Event| {
        print_event(event, all_events);
        Response::Continue
    });

    let Some(document) = model.open_document(&view, &url).await? else {
        bail!("{url} was not opened");
    };

    println!("{} {}", document.kind().to_string().bold(), url_label(&url));
    print_links(&url, &document);

    if cli.css {
        print_stylesheets(&model, &url, &document);
    }
    if let Some(tree) = document.tree() {
        if cli.tree {
            println!("\n=== Tree ===");
            print_tree(tree, NodeId::ROOT, 0);
        }
        if !cli.style.is_empty() {
            println!("\n=== Style ===");
            print_styles(&model, &view, &document, tree, &cli.style);
        }
    }
    if view.warning_count() > 0 {
        eprintln!("{} warning(s)", view.warning_count().yellow());
    }

    let _ = model.close_document(&view).await?;
    Ok(())
}

/// `RUST_LOG` wins; otherwise `-v` raises the level from `warn`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The configuration file with command line overrides applied.
fn load_config(cli: &Cli) -> anyhow::Result<ModelConfig> {
    let mut config = match &cli.config {
        Some(path) => ModelConfig::from_json_file(path)?,
        None => ModelConfig::default(),
    };
    if let Some(dir) = &cli.cache_dir {
        config.dispatcher.http_cache.dir = Some(dir.clone());
    }
    if let Some(dir) = &cli.chrome_dir {
        config.dispatcher.chrome_dir = Some(dir.clone());
    }
    if let Some(dir) = &cli.font_dir {
        config.font_dir = Some(dir.clone());
    }
    if let Some(dpi) = cli.dpi {
        config.dpi = dpi;
    }
    Ok(config)
}

/// URL of the document named on the command line; plain paths become
/// `file:` URLs.
fn document_url(cli: &Cli) -> anyhow::Result<String> {
    if let Some(html) = &cli.html {
        return Ok(format!(
            "data:text/html,{}",
            utf8_percent_encode(html, NON_ALPHANUMERIC)
        ));
    }
    let Some(path) = &cli.path else {
        bail!("give a file path, a URL or --html");
    };
    if has_scheme(path) {
        return Ok(path.clone());
    }
    let absolute = std::fs::canonicalize(path).with_context(|| format!("cannot open {path}"))?;
    Ok(format!("file://{}", absolute.display()))
}

/// Long `data:` URLs shortened for display.
fn url_label(url: &str) -> String {
    if url.starts_with("data:") && url.chars().count() > 60 {
        let prefix: String = url.chars().take(57).collect();
        format!("{prefix}...")
    } else {
        url.to_owned()
    }
}

fn print_event(event: &Event, all: bool) {
    let target = event.target.as_deref().map(url_label).unwrap_or_default();
    let detail = event.detail.as_deref().unwrap_or_default();
    match event.kind {
        EventKind::Warning => {
            eprintln!("{} {detail} {}", "warning:".yellow().bold(), target.dimmed());
        }
        EventKind::Error | EventKind::ParseError => {
            eprintln!("{} {target} {detail}", format!("{}:", event.kind).red().bold());
        }
        kind if all => eprintln!("{} {target}", format!("[{kind}]").cyan()),
        _ => {}
    }
}

fn print_links(url: &str, document: &Document) {
    let links = scan_document_links(document);
    if links.is_empty() {
        return;
    }
    println!("\n=== Links ===");
    let base = url_root(url);
    for link in links {
        println!("  {}", url_label(&resolve_url(&link, base)));
    }
}

fn print_stylesheets(model: &Model, url: &str, document: &Document) {
    println!("\n=== Stylesheets ===");
    let sheets: Vec<(String, Arc<Document>)> = match document {
        Document::Css(_) => model
            .get_document(url)
            .map(|sheet| vec![(url.to_owned(), sheet)])
            .unwrap_or_default(),
        _ => stylesheet_links(document)
            .iter()
            .map(|link| resolve_url(link, url_root(url)))
            .filter_map(|link| model.get_document(&link).ok().map(|sheet| (link, sheet)))
            .collect(),
    };
    for (link, sheet) in sheets {
        let Some(css) = sheet.as_css() else {
            println!("{} {}", url_label(&link).dimmed(), "(not loaded)".red());
            continue;
        };
        println!("{}", url_label(&link).dimmed());
        println!("{}", wombat_css::serialize(&css.stylesheet.root));
    }
}

fn print_tree(tree: &DomTree, node: NodeId, depth: usize) {
    let indent = "  ".repeat(depth);
    let Some(data) = tree.get(node) else {
        return;
    };
    match &data.node_type {
        NodeType::Document => {}
        NodeType::Element(element) => {
            let attrs: Vec<String> = element
                .attrs
                .iter()
                .map(|(name, value)| format!("{name}=\"{value}\""))
                .collect();
            println!("{indent}{} {}", element.name.cyan(), attrs.join(" ").dimmed());
        }
        NodeType::Text(text) => {
            let text = text.trim();
            if !text.is_empty() {
                println!("{indent}{text:?}");
            }
            return;
        }
        NodeType::Comment(_) => return,
        NodeType::ProcessingInstruction { target, data } => {
            println!("{indent}{}", format!("<?{target} {data}?>").dimmed());
            return;
        }
    }
    let next = if matches!(data.node_type, NodeType::Document) {
        depth
    } else {
        depth + 1
    };
    for &child in tree.children(node) {
        print_tree(tree, child, next);
    }
}

fn print_styles(
    model: &Model,
    view: &View,
    document: &Arc<Document>,
    tree: &DomTree,
    properties: &[String],
) {
    for node in tree.elements(NodeId::ROOT) {
        let Some(element) = tree.as_element(node) else {
            continue;
        };
        let values: Vec<String> = properties
            .iter()
            .map(|property| {
                let value = model.get_attribute(view, document, node, None, property);
                format!("{property}: {}", value.as_deref().unwrap_or("-"))
            })
            .collect();
        let label = element
            .id()
            .map_or_else(|| element.name.local.clone(), |id| format!("{}#{id}", element.name.local));
        println!("  {} {}", label.cyan(), values.join("; "));
    }
}
