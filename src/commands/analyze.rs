//! Analysis commands: analyze, check

use colored::Colorize;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use seocheck::config::Config;
use seocheck::document::PageDocument;
use seocheck::error::Result;
use seocheck::fetch::{validate_target, PageFetcher};
use seocheck::metrics::{Keyword, PageMetrics};
use seocheck::report::{format_percent, AnalysisReport};
use seocheck::session::{AnalysisSession, RequestToken};
use seocheck::snapshot::{MockSnapshotProvider, PendingSnapshot};

use crate::utils::{normalize_url, progress_bar, require_keyword, truncate_str};

/// Fetch a page and print its suggestions
pub fn cmd_analyze(
    url: &str,
    keyword: &str,
    json: bool,
    proxy: Option<String>,
    direct: bool,
    no_snapshot: bool,
) -> Result<()> {
    // Input errors surface before anything touches the network
    let keyword = require_keyword(keyword)?;
    let url = normalize_url(url)?;
    validate_target(&url)?;

    let config = Config::load()?;
    let proxy_base = if direct {
        None
    } else {
        proxy.or_else(|| config.fetch.proxy_url.clone())
    };
    let fetcher = PageFetcher::new(&config.fetch).with_proxy(proxy_base);

    let mut session = new_session(&config);
    let token = session.begin();

    // Started first so it runs while the page downloads
    let pending = (config.snapshot.enabled && !no_snapshot)
        .then(|| spawn_snapshot(&config, &keyword, token));

    if !json {
        println!("\n{} {}", "Analyzing".cyan().bold(), url);
        println!("  Keyword: \"{}\"", keyword);
        if let Some(base) = fetcher.proxy_base() {
            println!("  Via proxy: {}", base);
        }
    }

    let document = fetcher.fetch_document(&url)?;
    session.load(token, &url, document, keyword);

    let wait = Duration::from_secs(config.snapshot.wait_secs);

    if json {
        if let Some(pending) = &pending {
            collect_snapshot(&mut session, pending, wait);
        }
        if let Some(report) = AnalysisReport::from_session(&session) {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        return Ok(());
    }

    print_page_summary(&session);
    print_findings(&session);

    if let Some(pending) = &pending {
        println!("\n  {}", "Fetching competitive snapshot...".dimmed());
        collect_snapshot(&mut session, pending, wait);
        print_snapshot(&session);
    }

    println!();
    Ok(())
}

/// Analyze a local HTML file, or stdin when `file` is "-"
pub fn cmd_check(file: &str, keyword: &str, json: bool) -> Result<()> {
    let keyword = require_keyword(keyword)?;
    let html = read_html(file)?;

    let config = Config::load()?;
    let mut session = new_session(&config);
    let token = session.begin();
    let label = if file == "-" { "<stdin>" } else { file };
    session.load(token, label, PageDocument::parse(&html), keyword);

    if json {
        if let Some(report) = AnalysisReport::from_session(&session) {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        return Ok(());
    }

    println!("\n{} {}", "Checking".cyan().bold(), label);
    print_page_summary(&session);
    print_findings(&session);
    println!();
    Ok(())
}

pub(crate) fn new_session(config: &Config) -> AnalysisSession {
    AnalysisSession::new(config.rules.clone(), config.tracker.model)
}

/// Load a document from a local file if `source` names one, otherwise fetch it
pub(crate) fn load_document(source: &str, config: &Config) -> Result<(String, PageDocument)> {
    if Path::new(source).is_file() {
        let html = read_html(source)?;
        return Ok((source.to_string(), PageDocument::parse(&html)));
    }

    let url = normalize_url(source)?;
    let document = PageFetcher::new(&config.fetch).fetch_document(&url)?;
    Ok((url, document))
}

fn read_html(file: &str) -> Result<String> {
    let html = if file == "-" {
        let mut input = String::new();
        std::io::stdin().read_to_string(&mut input)?;
        input
    } else {
        std::fs::read_to_string(file)?
    };

    if html.trim().is_empty() {
        return Err(seocheck::SeoError::EmptyContent(format!("{} is empty", file)));
    }
    Ok(html)
}

fn spawn_snapshot(config: &Config, keyword: &Keyword, token: RequestToken) -> PendingSnapshot {
    let provider = Arc::new(MockSnapshotProvider::new(Duration::from_millis(
        config.snapshot.delay_ms,
    )));
    PendingSnapshot::spawn(provider, keyword.as_str(), token)
}

/// Wait for the snapshot and attach it if it belongs to the current request
fn collect_snapshot(session: &mut AnalysisSession, pending: &PendingSnapshot, wait: Duration) {
    match pending.wait(wait) {
        Some(Ok(snapshot)) => {
            session.attach_snapshot(pending.token(), snapshot);
        }
        Some(Err(e)) => log::warn!("Competitive snapshot failed: {}", e),
        None => log::info!("Competitive snapshot not ready after {:?}, skipping", wait),
    }
}

pub(crate) fn print_page_summary(session: &AnalysisSession) {
    let Some(page) = session.page() else {
        return;
    };
    let doc = &page.document;
    let metrics = PageMetrics::compute(doc, &page.keyword);

    let title = if doc.title.is_empty() {
        "(none)".dimmed().to_string()
    } else {
        truncate_str(&doc.title, 60)
    };
    let description = if doc.meta_description.is_empty() {
        "(none)".dimmed().to_string()
    } else {
        truncate_str(&doc.meta_description, 60)
    };

    println!();
    println!("  Title:       {} ({} chars)", title, metrics.title_length);
    println!("  Description: {} ({} chars)", description, metrics.description_length);
    println!("  H1 tags:     {}", metrics.h1_count);
    println!("  Links:       {}", metrics.link_count);
    println!(
        "  Content:     {} chars, {} words",
        metrics.content_length, metrics.word_count
    );
    match metrics.keyword_density {
        Some(density) => println!("  Density:     {}", format_percent(density)),
        None => println!("  Density:     {}", "n/a".dimmed()),
    }
}

pub(crate) fn print_findings(session: &AnalysisSession) {
    let findings = session.findings();
    println!();

    if findings.is_empty() {
        println!("  {} No suggestions - this page covers the basics.", "✓".green());
        return;
    }

    println!("  {} ({})\n", "Suggestions".bold(), findings.len());
    let tracker = session.tracker();
    for (i, finding) in findings.iter().enumerate() {
        let mark = if tracker.is_complete(i) {
            "[x]".green().to_string()
        } else {
            "[ ]".to_string()
        };
        println!("  {:>2}. {} {}", i + 1, mark, finding.title.yellow());
        println!("         {}", finding.description);
    }

    println!("\n  Progress: {}", progress_bar(session.progress_ratio()));
}

fn print_snapshot(session: &AnalysisSession) {
    let Some(snapshot) = session.snapshot() else {
        println!("  {}", "Competitive snapshot unavailable.".dimmed());
        return;
    };
    let Some(page) = session.page() else {
        return;
    };

    println!("\n  {}\n", "Competitive snapshot (estimated)".bold());
    println!("  Top keywords:      {}", snapshot.top_keywords.join(", "));
    println!(
        "  Avg title length:  {} chars (yours: {})",
        snapshot.avg_title_length,
        page.document.title.chars().count()
    );
    println!(
        "  Avg description:   {} chars (yours: {})",
        snapshot.avg_description_length,
        page.document.meta_description.chars().count()
    );
    println!(
        "  Common in titles:  {}",
        snapshot.common_title_elements.join(", ")
    );
}
