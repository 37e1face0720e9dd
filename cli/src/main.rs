//! pdfqc CLI - review and export tool for extracted PDF content

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfqc::render::{page_to_markdown, table_to_json, JsonFormat};
use pdfqc::{
    find_documents, open_session_with_options, Document, EditField, ExportOptions, LoadOptions,
    ReviewConfig, ReviewSession, ReviewStatus, SessionOptions,
};

#[derive(Parser)]
#[command(name = "pdfqc")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Review, correct and export machine-extracted PDF content", long_about = None)]
struct Cli {
    /// Recognized portfolio tags, comma-separated (any tag if unset)
    #[arg(long, global = true, env = "PDFQC_PORTFOLIO_TAGS", value_name = "TAGS")]
    portfolio_tags: Option<String>,

    /// Parse page files one at a time
    #[arg(long, global = true)]
    sequential: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show document information
    Info {
        /// Document folder
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Show review progress
    Status {
        /// Document folder
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Show one page
    Show {
        /// Document folder
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Page number (starting at 1)
        #[arg(value_name = "PAGE")]
        page: usize,

        /// Print tables as editable JSON
        #[arg(long)]
        raw: bool,
    },

    /// Mark a page approved
    Approve {
        /// Document folder
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Page number (starting at 1)
        #[arg(value_name = "PAGE")]
        page: usize,
    },

    /// Flag a page for another look
    Flag {
        /// Document folder
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Page number (starting at 1)
        #[arg(value_name = "PAGE")]
        page: usize,
    },

    /// Reset a page to pending
    Reset {
        /// Document folder
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Page number (starting at 1)
        #[arg(value_name = "PAGE")]
        page: usize,
    },

    /// Set or clear the portfolio tag
    Portfolio {
        /// Document folder
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// New tag (clears the tag if omitted)
        #[arg(value_name = "TAG")]
        tag: Option<String>,
    },

    /// Replace a page's text content
    EditText {
        /// Document folder
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Page number (starting at 1)
        #[arg(value_name = "PAGE")]
        page: usize,

        /// File holding the new text
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
    },

    /// Replace a table's rows from JSON
    EditTable {
        /// Document folder
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Page number (starting at 1)
        #[arg(value_name = "PAGE")]
        page: usize,

        /// Table id
        #[arg(value_name = "TABLE_ID")]
        table_id: String,

        /// File holding the table JSON
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
    },

    /// Align the review state with a re-processed document
    Reconcile {
        /// Document folder
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Write the final export bundle
    Export {
        /// Document folder
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Folder bundles are written under
        #[arg(short, long, env = "PDFQC_EXPORT_DIR", value_name = "ROOT")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// List processed folders for a PDF, newest first
    Find {
        /// Folder holding processed documents
        #[arg(value_name = "ROOT")]
        root: PathBuf,

        /// PDF file name
        #[arg(value_name = "PDF")]
        pdf: String,
    },

    /// Show version information
    Version,
}

type CmdResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let options = session_options(&cli);

    let result = match cli.command {
        Commands::Info { dir } => cmd_info(&dir, options),
        Commands::Status { dir } => cmd_status(&dir, options),
        Commands::Show { dir, page, raw } => cmd_show(&dir, page, raw, options),
        Commands::Approve { dir, page } => cmd_set_status(&dir, page, ReviewStatus::Approved, options),
        Commands::Flag { dir, page } => cmd_set_status(&dir, page, ReviewStatus::Flagged, options),
        Commands::Reset { dir, page } => cmd_set_status(&dir, page, ReviewStatus::Pending, options),
        Commands::Portfolio { dir, tag } => cmd_portfolio(&dir, tag, options),
        Commands::EditText { dir, page, file } => {
            cmd_edit(&dir, page, EditField::Text, &file, options)
        }
        Commands::EditTable {
            dir,
            page,
            table_id,
            file,
        } => cmd_edit(&dir, page, EditField::table(table_id), &file, options),
        Commands::Reconcile { dir } => cmd_reconcile(&dir, options),
        Commands::Export {
            dir,
            output,
            compact,
        } => cmd_export(&dir, output, compact, options),
        Commands::Find { root, pdf } => cmd_find(&root, &pdf),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn session_options(cli: &Cli) -> SessionOptions {
    let mut review = ReviewConfig::new();
    if let Some(tags) = &cli.portfolio_tags {
        review = review.with_tag_list(tags);
    }
    SessionOptions::new()
        .with_load(LoadOptions::new().with_parallel(!cli.sequential))
        .with_review(review)
}

/// Convert a page number given on the command line to an index.
fn page_index(page: usize) -> Result<usize, String> {
    page.checked_sub(1)
        .ok_or_else(|| "page numbers start at 1".to_string())
}

fn open(dir: &Path, options: SessionOptions) -> Result<ReviewSession, Box<dyn std::error::Error>> {
    let session = open_session_with_options(dir, options)?;
    log::debug!(
        "opened {} ({} pages)",
        dir.display(),
        session.document().page_count()
    );
    if session.is_stale() {
        println!(
            "{} review state tracks {} pages but the document has {}; run `pdfqc reconcile`",
            "Warning:".yellow().bold(),
            session.state().total_pages(),
            session.document().page_count()
        );
    }
    Ok(session)
}

fn status_label(status: ReviewStatus) -> colored::ColoredString {
    match status {
        ReviewStatus::Approved => "approved".green(),
        ReviewStatus::Flagged => "flagged".yellow(),
        ReviewStatus::Pending => "pending".dimmed(),
    }
}

fn cmd_info(dir: &Path, options: SessionOptions) -> CmdResult {
    let session = open(dir, options)?;
    let doc = session.document();

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Name".bold(), doc.name);
    println!("{}: {}", "Folder".bold(), doc.root.display());
    println!("{}: {}", "Source".bold(), doc.source.path.display());
    match &doc.source.format {
        Some(format) => println!("{}: {}", "Format".bold(), format),
        None => println!("{}: {}", "Format".bold(), "not a PDF header".yellow()),
    }
    println!("{}: {}", "Processed".bold(), doc.processed_at.to_rfc3339());
    println!(
        "{}: {}",
        "Portfolio".bold(),
        session.state().portfolio().unwrap_or("-")
    );

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let words: usize = doc.pages.iter().map(|p| p.text.split_whitespace().count()).sum();
    println!("{}: {}", "Pages".bold(), doc.page_count());
    println!("{}: {}", "Tables".bold(), doc.total_tables());
    println!("{}: {}", "Words".bold(), words);
    println!("{}: {}", "Keywords".bold(), doc.keywords().join(", "));

    Ok(())
}

fn cmd_status(dir: &Path, options: SessionOptions) -> CmdResult {
    let session = open(dir, options)?;
    let doc = session.document();
    let state = session.state();

    println!("{}", "Review Status".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for (index, page) in doc.pages.iter().enumerate() {
        let status = state.status(index).unwrap_or_default();
        println!(
            "  {:>4}  {:<10} {}",
            Document::page_number(index),
            status_label(status),
            page.title
        );
    }

    let summary = session.summary();
    println!();
    println!(
        "{}: {} approved, {} flagged, {} pending ({:.1}% reviewed)",
        "Progress".bold(),
        summary.approved.to_string().green(),
        summary.flagged.to_string().yellow(),
        summary.pending,
        summary.progress_percent()
    );

    let flagged: Vec<String> = state
        .flagged_pages()
        .into_iter()
        .map(|i| Document::page_number(i).to_string())
        .collect();
    if !flagged.is_empty() {
        println!("{}: {}", "Flagged pages".bold(), flagged.join(", "));
    }

    Ok(())
}

fn cmd_show(dir: &Path, page: usize, raw: bool, options: SessionOptions) -> CmdResult {
    let index = page_index(page)?;
    let session = open(dir, options)?;
    let content = session.page(index)?;

    if raw {
        for table in &content.tables {
            println!("{} {}", "Table".cyan().bold(), table.table_id);
            println!("{}", table_to_json(table, JsonFormat::Pretty)?);
        }
    } else {
        let status = session.state().status(index).unwrap_or_default();
        println!("{} {}", "Status:".bold(), status_label(status));
        println!();
        println!("{}", page_to_markdown(content, page));
    }

    Ok(())
}

fn cmd_set_status(
    dir: &Path,
    page: usize,
    status: ReviewStatus,
    options: SessionOptions,
) -> CmdResult {
    let index = page_index(page)?;
    let mut session = open(dir, options)?;
    session.set_status(index, status)?;
    println!("Page {} {}", page, status_label(status));
    Ok(())
}

fn cmd_portfolio(dir: &Path, tag: Option<String>, options: SessionOptions) -> CmdResult {
    let mut session = open(dir, options)?;
    session.set_portfolio(tag)?;
    match session.state().portfolio() {
        Some(tag) => println!("{} {}", "Portfolio set to".green(), tag),
        None => println!("{}", "Portfolio cleared".green()),
    }
    Ok(())
}

fn cmd_edit(
    dir: &Path,
    page: usize,
    field: EditField,
    file: &Path,
    options: SessionOptions,
) -> CmdResult {
    let index = page_index(page)?;
    let new_value = fs::read_to_string(file)?;
    let mut session = open(dir, options)?;
    session.commit_edit(index, &field, &new_value)?;
    println!("{} {} of page {}", "Saved".green(), field, page);
    Ok(())
}

fn cmd_reconcile(dir: &Path, options: SessionOptions) -> CmdResult {
    let mut session = open_session_with_options(dir, options)?;
    let before = session.state().total_pages();
    if session.reconcile()? {
        println!(
            "{} {} -> {} pages",
            "Reconciled".green(),
            before,
            session.state().total_pages()
        );
    } else {
        println!("{}", "Review state already matches the document".green());
    }
    Ok(())
}

fn cmd_export(
    dir: &Path,
    output: Option<PathBuf>,
    compact: bool,
    options: SessionOptions,
) -> CmdResult {
    let session = open(dir, options)?;

    let mut export = ExportOptions::new();
    if let Some(root) = output {
        export = export.with_output_dir(root);
    }
    if compact {
        export = export.compact();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Consolidating pages...");

    let bundle = match session.export_with(export) {
        Ok(bundle) => bundle,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e.into());
        }
    };
    pb.finish_with_message("Done!");

    let report = &bundle.report;
    println!("\n{} {}", "Exported to".green().bold(), bundle.dir.display());
    println!(
        "  {} approved, {} flagged, {} pending, {} tables",
        report.approved_pages, report.flagged_pages, report.pending_pages, report.total_tables
    );

    let count = bundle.files.len();
    for (i, file) in bundle.files.iter().enumerate() {
        let branch = if i + 1 == count { "└─" } else { "├─" };
        let name = file.strip_prefix(&bundle.dir).unwrap_or(file);
        println!("  {} {}", branch.dimmed(), name.display());
    }

    Ok(())
}

fn cmd_find(root: &Path, pdf: &str) -> CmdResult {
    let found = find_documents(root, pdf)?;
    if found.is_empty() {
        println!("{} {}", "No processed folders for".yellow(), pdf);
    }
    for dir in found {
        println!("{}", dir.display());
    }
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfqc".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Review and export tool for extracted PDF content");
    println!();
    println!("License: MIT");
}
