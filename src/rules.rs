//! Rule evaluator - turns page metrics into an ordered list of findings
//!
//! Rules live in a fixed declarative table ([`RULES`]). Each entry is an
//! independent check; several may fire for the same page. The table order
//! is the presentation order and the index space the tracker works in.

use serde::{Deserialize, Serialize};

use crate::document::PageDocument;
use crate::metrics::{Keyword, PageMetrics};

/// One rule-triggered SEO observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub title: String,
    pub description: String,
}

impl Finding {
    fn new(rule_id: &str, title: &str, description: String) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            title: title.to_string(),
            description,
        }
    }
}

/// Thresholds the rules compare against.
///
/// The defaults are the contract; override them only through the `[rules]`
/// section of the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleThresholds {
    pub title_min: usize,
    pub title_max: usize,
    pub description_min: usize,
    pub description_max: usize,
    pub min_links: usize,
    /// Measured in characters
    pub min_content_length: usize,
    pub density_min: f64,
    pub density_max: f64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            title_min: 30,
            title_max: 60,
            description_min: 120,
            description_max: 160,
            min_links: 2,
            min_content_length: 300,
            density_min: 0.5,
            density_max: 2.5,
        }
    }
}

/// Everything a rule may look at
pub struct RuleContext<'a> {
    pub doc: &'a PageDocument,
    pub keyword: &'a Keyword,
    pub metrics: &'a PageMetrics,
    pub thresholds: &'a RuleThresholds,
}

/// A named check producing at most one finding
pub struct Rule {
    pub id: &'static str,
    pub evaluate: fn(&RuleContext) -> Option<Finding>,
}

/// The rule table, in presentation order
pub static RULES: &[Rule] = &[
    Rule { id: "title-length", evaluate: title_length },
    Rule { id: "title-keyword", evaluate: title_keyword },
    Rule { id: "description-length", evaluate: description_length },
    Rule { id: "description-keyword", evaluate: description_keyword },
    Rule { id: "h1", evaluate: h1_heading },
    Rule { id: "link-count", evaluate: link_count },
    Rule { id: "content-length", evaluate: content_length },
    Rule { id: "keyword-density", evaluate: keyword_density },
];

/// Evaluate with the default thresholds
pub fn evaluate(doc: &PageDocument, keyword: &Keyword) -> Vec<Finding> {
    evaluate_with(doc, keyword, &RuleThresholds::default())
}

/// Evaluate every rule in table order. Never fails.
pub fn evaluate_with(
    doc: &PageDocument,
    keyword: &Keyword,
    thresholds: &RuleThresholds,
) -> Vec<Finding> {
    let metrics = PageMetrics::compute(doc, keyword);
    let ctx = RuleContext {
        doc,
        keyword,
        metrics: &metrics,
        thresholds,
    };

    let findings: Vec<Finding> = RULES.iter().filter_map(|rule| (rule.evaluate)(&ctx)).collect();
    log::debug!(
        "Evaluated {} rules for keyword {:?}: {} finding(s)",
        RULES.len(),
        keyword.as_str(),
        findings.len()
    );
    findings
}

fn title_length(ctx: &RuleContext) -> Option<Finding> {
    let len = ctx.metrics.title_length;
    let t = ctx.thresholds;
    (len < t.title_min || len > t.title_max).then(|| {
        Finding::new(
            "title-length",
            "Optimize title length",
            format!(
                "Your title is {} characters long. Aim for {}-{} characters so it displays fully in search results.",
                len, t.title_min, t.title_max
            ),
        )
    })
}

fn title_keyword(ctx: &RuleContext) -> Option<Finding> {
    (!ctx.keyword.is_empty() && !ctx.metrics.keyword_in_title).then(|| {
        Finding::new(
            "title-keyword",
            "Add keyword to title",
            format!(
                "Include \"{}\" in your page title, ideally near the beginning.",
                ctx.keyword
            ),
        )
    })
}

fn description_length(ctx: &RuleContext) -> Option<Finding> {
    let len = ctx.metrics.description_length;
    let t = ctx.thresholds;
    (len < t.description_min || len > t.description_max).then(|| {
        Finding::new(
            "description-length",
            "Optimize meta description length",
            format!(
                "Your meta description is {} characters long. Aim for {}-{} characters.",
                len, t.description_min, t.description_max
            ),
        )
    })
}

fn description_keyword(ctx: &RuleContext) -> Option<Finding> {
    (!ctx.keyword.is_empty() && !ctx.metrics.keyword_in_description).then(|| {
        Finding::new(
            "description-keyword",
            "Add keyword to meta description",
            format!(
                "Include \"{}\" in your meta description to improve click-through from search results.",
                ctx.keyword
            ),
        )
    })
}

/// At most one of: missing, multiple, keyword absent from the first H1
fn h1_heading(ctx: &RuleContext) -> Option<Finding> {
    match ctx.metrics.h1_count {
        0 => Some(Finding::new(
            "h1-missing",
            "Add an H1 heading",
            "Your page has no H1 heading. Add one that describes the main topic of the page."
                .to_string(),
        )),
        1 => (!ctx.keyword.is_empty() && !ctx.metrics.keyword_in_first_h1).then(|| {
            Finding::new(
                "h1-keyword",
                "Include keyword in H1",
                format!(
                    "Your H1 \"{}\" does not mention \"{}\".",
                    ctx.doc.h1_tags.first().map(String::as_str).unwrap_or_default(),
                    ctx.keyword
                ),
            )
        }),
        n => Some(Finding::new(
            "h1-multiple",
            "Use only one H1 heading",
            format!("Your page has {} H1 headings. Use a single H1 and demote the rest to H2.", n),
        )),
    }
}

fn link_count(ctx: &RuleContext) -> Option<Finding> {
    let count = ctx.metrics.link_count;
    (count < ctx.thresholds.min_links).then(|| {
        Finding::new(
            "link-count",
            "Add more links",
            format!(
                "Your page has {} link(s). Add relevant internal and external links to help users and crawlers.",
                count
            ),
        )
    })
}

fn content_length(ctx: &RuleContext) -> Option<Finding> {
    // Compared in characters even though the advice talks about words.
    let len = ctx.metrics.content_length;
    let min = ctx.thresholds.min_content_length;
    (len < min).then(|| {
        Finding::new(
            "content-length",
            "Increase content length",
            format!(
                "Your page content is short ({} characters). Aim for at least {} words of useful content.",
                len, min
            ),
        )
    })
}

fn keyword_density(ctx: &RuleContext) -> Option<Finding> {
    let density = ctx.metrics.keyword_density?;
    let t = ctx.thresholds;

    if density < t.density_min {
        Some(Finding::new(
            "density-low",
            "Increase keyword density",
            format!(
                "Keyword density is {:.2}%. Use \"{}\" more often; aim for {}-{}%.",
                density, ctx.keyword, t.density_min, t.density_max
            ),
        ))
    } else if density > t.density_max {
        Some(Finding::new(
            "density-high",
            "Decrease keyword density",
            format!(
                "Keyword density is {:.2}%. Using \"{}\" this often can look like keyword stuffing; aim for {}-{}%.",
                density, ctx.keyword, t.density_min, t.density_max
            ),
        ))
    } else {
        None
    }
}
