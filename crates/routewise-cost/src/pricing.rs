// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-route pricing and savings estimates.
//!
//! Each route maps to a model tier:
//!
//! fast     (Haiku):  input=$1.00/MTok, output=$5.00/MTok
//! standard (Sonnet): input=$3.00/MTok, output=$15.00/MTok
//! deep     (Opus):   input=$5.00/MTok, output=$25.00/MTok
//!
//! Savings are estimated against always using the deep tier, for a query of
//! average size.

use routewise_core::Route;

/// Average input tokens assumed per routed query.
pub const AVG_INPUT_TOKENS: u64 = 1_000;

/// Average output tokens assumed per routed query.
pub const AVG_OUTPUT_TOKENS: u64 = 2_000;

/// Share of the deep-tier cost saved when an orchestrator delegates subtasks.
pub const DELEGATION_SAVINGS_RATE: f64 = 0.4;

/// Per-tier pricing in USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutePricing {
    /// Cost per million input tokens.
    pub input_per_mtok: f64,
    /// Cost per million output tokens.
    pub output_per_mtok: f64,
}

/// Look up pricing for a route.
pub fn get_pricing(route: Route) -> RoutePricing {
    match route {
        Route::Fast => RoutePricing {
            input_per_mtok: 1.0,
            output_per_mtok: 5.0,
        },
        Route::Standard => RoutePricing {
            input_per_mtok: 3.0,
            output_per_mtok: 15.0,
        },
        Route::Deep => RoutePricing {
            input_per_mtok: 5.0,
            output_per_mtok: 25.0,
        },
    }
}

/// Calculate cost in USD for the given token counts on `route`.
pub fn calculate_cost(route: Route, input_tokens: u64, output_tokens: u64) -> f64 {
    let pricing = get_pricing(route);
    let input = (input_tokens as f64 / 1_000_000.0) * pricing.input_per_mtok;
    let output = (output_tokens as f64 / 1_000_000.0) * pricing.output_per_mtok;
    input + output
}

/// Cost of an average query on `route`.
pub fn estimated_cost(route: Route) -> f64 {
    calculate_cost(route, AVG_INPUT_TOKENS, AVG_OUTPUT_TOKENS)
}

/// Savings of an average query on `route` compared with the deep tier.
pub fn estimated_savings(route: Route) -> f64 {
    estimated_cost(Route::Deep) - estimated_cost(route)
}

/// Savings credited to an orchestrated query.
pub fn delegation_savings() -> f64 {
    estimated_cost(Route::Deep) * DELEGATION_SAVINGS_RATE
}
