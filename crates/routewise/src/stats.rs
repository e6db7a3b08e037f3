// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `routewise stats` and `routewise cache` command implementations.

use std::fmt::Write;

use routewise_cache::{CacheStats, CacheStore};
use routewise_config::RoutewiseConfig;
use routewise_core::RoutewiseError;
use routewise_cost::{RouterStats, StatsLedger};

/// Print the statistics ledger.
pub fn run_stats(config: &RoutewiseConfig, json: bool) -> Result<(), RoutewiseError> {
    let stats = StatsLedger::from_config(&config.stats).load()?;
    if json {
        println!("{}", to_json(&stats)?);
    } else {
        print!("{}", format_stats(&stats));
    }
    Ok(())
}

/// Clear both cache tiers.
pub fn run_cache_clear(config: &RoutewiseConfig) -> Result<(), RoutewiseError> {
    let mut store = CacheStore::from_config(&config.cache);
    store.clear()?;
    println!("cache cleared: {}", config.cache.path.display());
    Ok(())
}

/// Print persistent cache statistics.
pub fn run_cache_stats(config: &RoutewiseConfig, json: bool) -> Result<(), RoutewiseError> {
    let stats = CacheStore::from_config(&config.cache).stats()?;
    if json {
        println!("{}", to_json(&stats)?);
    } else {
        print!("{}", format_cache_stats(&stats));
    }
    Ok(())
}

fn to_json(value: &impl serde::Serialize) -> Result<String, RoutewiseError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| RoutewiseError::Internal(format!("failed to encode output: {e}")))
}

fn format_stats(stats: &RouterStats) -> String {
    let mut out = String::new();
    let pct = |n: u64| {
        if stats.total_queries == 0 {
            0.0
        } else {
            n as f64 * 100.0 / stats.total_queries as f64
        }
    };

    let _ = writeln!(out, "Routing statistics (v{})", stats.version);
    let _ = writeln!(out, "  queries:        {}", stats.total_queries);
    for (name, count) in [
        ("fast", stats.routes.fast),
        ("standard", stats.routes.standard),
        ("deep", stats.routes.deep),
        ("orchestrated", stats.routes.orchestrated),
    ] {
        let _ = writeln!(out, "  {name:<15} {count} ({:.1}%)", pct(count));
    }
    let _ = writeln!(out, "  tool-intensive: {}", stats.tool_intensive_queries);
    let _ = writeln!(out, "  cache hits:     {}", stats.cache_hits);
    let _ = writeln!(out, "  escalations:    {}", stats.escalations);
    let _ = writeln!(
        out,
        "  exceptions:     router_meta={} slash_commands={}",
        stats.exceptions.router_meta, stats.exceptions.slash_commands
    );
    let _ = writeln!(out, "  est. savings:   ${:.2}", stats.estimated_savings);
    let _ = writeln!(out, "  delegation:     ${:.2}", stats.delegation_savings);

    if !stats.sessions.is_empty() {
        let _ = writeln!(out, "Recent days:");
        for day in stats.sessions.iter().take(7) {
            let _ = writeln!(
                out,
                "  {}  {:>4} queries  fast={} standard={} deep={}  ${:.2}",
                day.date, day.queries, day.routes.fast, day.routes.standard, day.routes.deep, day.savings
            );
        }
    }
    out
}

fn format_cache_stats(stats: &CacheStats) -> String {
    format!(
        "Decision cache\n  entries:    {}/{}\n  total hits: {}\n",
        stats.entries, stats.max_entries, stats.total_hits
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use routewise_core::{ClassificationResult, Method, Route};

    #[test]
    fn empty_stats_render_without_dividing_by_zero() {
        let text = format_stats(&RouterStats::default());
        assert!(text.contains("queries:        0"));
        assert!(text.contains("fast            0 (0.0%)"));
        assert!(!text.contains("Recent days"));
    }

    #[test]
    fn stats_show_route_shares_and_days() {
        let mut stats = RouterStats::default();
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        for route in [Route::Fast, Route::Fast, Route::Fast, Route::Deep] {
            let r = ClassificationResult::new(route, 0.9, vec![], Method::Rules);
            stats.record_decision(&r, today);
        }
        let text = format_stats(&stats);
        assert!(text.contains("fast            3 (75.0%)"));
        assert!(text.contains("deep            1 (25.0%)"));
        assert!(text.contains("2026-10-18"));
    }

    #[test]
    fn cache_stats_line() {
        let text = format_cache_stats(&CacheStats {
            entries: 3,
            total_hits: 7,
            max_entries: 100,
        });
        assert!(text.contains("entries:    3/100"));
        assert!(text.contains("total hits: 7"));
    }
}
