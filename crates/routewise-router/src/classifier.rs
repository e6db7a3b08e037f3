// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rule-based query classification.
//!
//! Classifies queries into fast/standard/deep routes using ordered regex
//! categories. No network, no state. Categories are evaluated in priority
//! order deep, tool-intensive, orchestration, fast, and the first matching
//! row of the decision table wins.

use regex::Regex;
use routewise_core::{ClassificationResult, ExceptionKind, Method, ResultMetadata, Route, RoutewiseError};
use strum::Display;

/// Architecture, security, multi-file, trade-off, complexity and planning work.
const DEEP_PATTERNS: &[&str] = &[
    r"\b(architect|architecture|design pattern|system design)\b",
    r"\bscalable?\b",
    r"\b(security|vulnerab|audit|penetration|exploit)\b",
    r"\b(across|multiple|all) (files?|components?|modules?)\b",
    r"\brefactor.{0,20}(codebase|project|entire)\b",
    r"\b(trade-?off|compare|pros? (and|&) cons?)\b",
    r"\b(analyze|evaluate|assess).{0,30}(option|approach|strateg)\b",
    r"\b(complex|intricate|sophisticated)\b",
    r"\boptimiz(e|ation).{0,20}(performance|speed|memory)\b",
    r"\b(multi-?phase|extraction|standalone repo|migration)\b",
];

/// Codebase-wide search, multi-file edits, builds, tests, dependency analysis.
const TOOL_INTENSIVE_PATTERNS: &[&str] = &[
    r"\b(find|search|locate) (all|every|each)",
    r"\bacross (the )?(codebase|project|repo)",
    r"\b(all|every) (file|instance|usage|reference)",
    r"\bwhere is .+ (used|called|defined)",
    r"\b(scan|explore|traverse) (the )?(codebase|project)",
    r"\b(update|change|modify|rename|replace) .{0,20}(all|every|multiple) files?",
    r"\bglobal (search|replace|rename)",
    r"\brefactor.{0,30}(across|throughout|entire)",
    r"\brun (all |the )?(tests?|specs?|suite)",
    r"\bbuild (the )?(project|app)",
    r"\bnpm (install|build|run)|yarn (install|build)|pip install",
    r"\b(dependency|import) (tree|graph|analysis)",
    r"\bwhat (depends on|imports|uses)",
];

/// Multi-step workflows and fan-out work.
const ORCHESTRATION_PATTERNS: &[&str] = &[
    r"\b(step by step|sequentially|in order)\b",
    r"\bfor each (file|component|module)\b",
    r"\bacross the (entire|whole) (codebase|project)",
    r"\bacross (multiple|several|many|all) (files?|components?|modules?|services?)",
    r"\band (also|then)\b.{0,50}\band (also|then)\b",
    r"\b(multiple|several|many) (tasks?|steps?|operations?)\b",
];

/// Simple questions, formatting, simple git, JSON/YAML, regex and syntax lookups.
const FAST_PATTERNS: &[&str] = &[
    r"^what (is|are|does) ",
    r"^how (do|does|to) ",
    r"^(show|list|get) .{0,30}$",
    r"\b(format|lint|prettify|beautify)\b",
    r"\bgit (status|log|diff|add|commit|push|pull)\b",
    r"\b(json|yaml|yml)\b.{0,20}$",
    r"\bregex\b",
    r"\bsyntax (for|of)\b",
    r"^(what|how).{0,50}\?$",
];

/// Questions about the router itself.
const ROUTER_META_PATTERNS: &[&str] = &[
    r"\brouter\b.*\b(stats?|config|setting|work)",
    r"\brouting\b",
    r"claude.?router",
    r"routewise",
    r"\bexception\b.*\b(track|detect)",
    r"\bclassif(y|ication)\b.*\b(prompt|query)",
];

/// Signal recorded when nothing matched.
pub const NO_PATTERNS_SIGNAL: &str = "no strong patterns";

/// Pattern category, in evaluation priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    Deep,
    ToolIntensive,
    Orchestration,
    Fast,
}

impl Category {
    /// Matching within a category stops after this many hits.
    fn match_limit(self) -> usize {
        match self {
            Category::Fast => 2,
            _ => 3,
        }
    }

    fn sources(self) -> &'static [&'static str] {
        match self {
            Category::Deep => DEEP_PATTERNS,
            Category::ToolIntensive => TOOL_INTENSIVE_PATTERNS,
            Category::Orchestration => ORCHESTRATION_PATTERNS,
            Category::Fast => FAST_PATTERNS,
        }
    }
}

/// An ordered list of compiled rules for one category.
#[derive(Debug, Clone)]
pub struct PatternCategory {
    category: Category,
    rules: Vec<Regex>,
}

impl PatternCategory {
    fn compile(category: Category) -> Result<Self, RoutewiseError> {
        Ok(Self {
            category,
            rules: compile_all(category.sources())?,
        })
    }

    /// First matching substring of each rule, up to the category limit.
    pub fn matches(&self, lower: &str) -> Vec<String> {
        self.rules
            .iter()
            .filter_map(|rule| rule.find(lower))
            .map(|m| m.as_str().trim().to_string())
            .take(self.category.match_limit())
            .collect()
    }

    pub fn category(&self) -> Category {
        self.category
    }
}

/// Stateless regex classifier.
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    deep: PatternCategory,
    tool_intensive: PatternCategory,
    orchestration: PatternCategory,
    fast: PatternCategory,
    router_meta: Vec<Regex>,
}

impl RuleClassifier {
    /// Compile the built-in pattern tables.
    pub fn new() -> Result<Self, RoutewiseError> {
        Ok(Self {
            deep: PatternCategory::compile(Category::Deep)?,
            tool_intensive: PatternCategory::compile(Category::ToolIntensive)?,
            orchestration: PatternCategory::compile(Category::Orchestration)?,
            fast: PatternCategory::compile(Category::Fast)?,
            router_meta: compile_all(ROUTER_META_PATTERNS)?,
        })
    }

    /// Classify a query. Always yields a result with `method = rules`.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        let lower = text.trim().to_lowercase();

        let deep = self.deep.matches(&lower);
        let tool = self.tool_intensive.matches(&lower);
        let orch = self.orchestration.matches(&lower);

        if !deep.is_empty() && (!tool.is_empty() || !orch.is_empty()) {
            let tool_intensive = !tool.is_empty();
            let signals = deep.into_iter().chain(tool).chain(orch).take(4).collect();
            return rules(Route::Deep, 0.95, signals).with_metadata(ResultMetadata {
                orchestration: true,
                tool_intensive,
                ..ResultMetadata::default()
            });
        }

        match deep.len() {
            0 => {}
            1 => return rules(Route::Deep, 0.70, deep),
            _ => return rules(Route::Deep, 0.90, first(deep, 3)),
        }

        let tool_flag = ResultMetadata {
            tool_intensive: true,
            ..ResultMetadata::default()
        };
        match tool.len() {
            0 => {}
            1 => return rules(Route::Standard, 0.70, tool).with_metadata(tool_flag),
            _ => return rules(Route::Standard, 0.85, first(tool, 3)).with_metadata(tool_flag),
        }

        if !orch.is_empty() {
            return rules(Route::Standard, 0.75, first(orch, 3)).with_metadata(ResultMetadata {
                orchestration: true,
                ..ResultMetadata::default()
            });
        }

        let fast = self.fast.matches(&lower);
        match fast.len() {
            0 => rules(Route::Fast, 0.50, vec![NO_PATTERNS_SIGNAL.to_string()]),
            1 => rules(Route::Fast, 0.70, fast),
            _ => rules(Route::Fast, 0.90, first(fast, 2)),
        }
    }

    /// Tag queries that are tracked separately in stats.
    ///
    /// Detection never changes the classification itself.
    pub fn detect_exception(&self, text: &str) -> Option<ExceptionKind> {
        let lower = text.to_lowercase();
        self.router_meta
            .iter()
            .any(|re| re.is_match(&lower))
            .then_some(ExceptionKind::RouterMeta)
    }
}

fn rules(route: Route, confidence: f64, signals: Vec<String>) -> ClassificationResult {
    ClassificationResult::new(route, confidence, signals, Method::Rules)
}

fn first(mut signals: Vec<String>, n: usize) -> Vec<String> {
    signals.truncate(n);
    signals
}

fn compile_all(sources: &[&str]) -> Result<Vec<Regex>, RoutewiseError> {
    sources
        .iter()
        .map(|src| {
            Regex::new(src)
                .map_err(|e| RoutewiseError::Internal(format!("invalid rule pattern {src:?}: {e}")))
        })
        .collect()
}
