// src/prefilter/mod.rs
//! Pre-filter scoring engine. A deterministic, side-effect-free point score
//! over article text plus source credibility, in [0, MAX_SCORE]. The
//! save/submit thresholds live in `Settings`, not here, so operators can tune
//! them without re-scoring anything.

pub mod distill;
pub mod keywords;
pub mod patterns;

use serde::Serialize;

use crate::model::CredibilityLevel;
use keywords::{any_match, count_matches};

pub const MAX_SCORE: u8 = 60;

// Base topic tiers: the max matched tier counts, never the sum.
const TIER_INSTITUTIONAL: i32 = 12;
const TIER_POLITICAL: i32 = 10;
const TIER_SOCIAL: i32 = 8;
const TIER_HEALTH_SCIENCE: i32 = 8;

// Verifiable-data signals, independent and additive.
const W_PERCENTAGE: i32 = 10;
const W_CURRENCY: i32 = 10;
const W_NUMBER_WITH_UNIT: i32 = 8;

// Checkability signals.
const W_DIRECT_QUOTE: i32 = 8;
const W_ATTRIBUTION: i32 = 10;
const W_NAMED_ENTITIES: i32 = 4;

// Source risk, inverted: the point of the system is watching the sources
// most likely to originate misinformation.
const RISK_LOW: i32 = 10;
const RISK_MEDIUM: i32 = 5;
const RISK_HIGH: i32 = 3;

// Penalties (applied per occurrence where noted).
const P_SPECULATION: i32 = 15;
const P_CONDITIONAL: i32 = 12;
const P_VAGUE: i32 = 8;
const P_NOISE: i32 = 30;
const P_TOPIC_NO_EVIDENCE: i32 = 5;
const TOPIC_PENALTY_FLOOR: i32 = -40;

// Bonuses.
const B_OFFICIAL_GUIDANCE: i32 = 6;
const B_HEALTH_ADVISORY: i32 = 8;

/// Per-category breakdown kept alongside the total for the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub base: i32,
    pub verifiable_data: i32,
    pub checkability: i32,
    pub source_risk: i32,
    /// Negative or zero.
    pub penalty: i32,
    pub bonus: i32,
    /// Clamped to [0, MAX_SCORE].
    pub total: u8,
}

/// Score article text (title + body concatenated by the caller).
/// Pure and idempotent: same input, same breakdown.
pub fn score(text: &str, credibility: CredibilityLevel) -> ScoreBreakdown {
    let lower = text.to_lowercase();

    // 1. Tiered base: evaluate every tier, keep the highest match.
    let mut base = 0;
    if any_match(&lower, keywords::INSTITUTIONAL_ENTITIES) {
        base = base.max(TIER_INSTITUTIONAL);
    }
    if any_match(&lower, keywords::POLITICAL_KEYWORDS) {
        base = base.max(TIER_POLITICAL);
    }
    if any_match(&lower, keywords::SOCIAL_KEYWORDS) {
        base = base.max(TIER_SOCIAL);
    }
    if any_match(&lower, keywords::HEALTH_KEYWORDS) || any_match(&lower, keywords::SCIENCE_KEYWORDS)
    {
        base = base.max(TIER_HEALTH_SCIENCE);
    }

    // 2. Verifiable data.
    let mut verifiable_data = 0;
    if patterns::percentage().is_match(&lower) {
        verifiable_data += W_PERCENTAGE;
    }
    if patterns::currency().is_match(&lower) {
        verifiable_data += W_CURRENCY;
    }
    if patterns::number_with_unit().is_match(&lower) {
        verifiable_data += W_NUMBER_WITH_UNIT;
    }
    let has_data = verifiable_data > 0;

    // 3. Checkability.
    let mut checkability = 0;
    if patterns::direct_quote().is_match(text) {
        checkability += W_DIRECT_QUOTE;
    }
    let has_attribution = any_match(&lower, keywords::ATTRIBUTION_KEYWORDS);
    if has_attribution {
        checkability += W_ATTRIBUTION;
    }
    // Named-entity density from the original-case text.
    if patterns::proper_noun_pair().find_iter(text).count() >= 2 {
        checkability += W_NAMED_ENTITIES;
    }

    // 4. Source risk.
    let source_risk = match credibility {
        CredibilityLevel::Low => RISK_LOW,
        CredibilityLevel::Medium => RISK_MEDIUM,
        CredibilityLevel::High => RISK_HIGH,
    };

    // 5. Context-aware penalties.
    let has_guidance = any_match(&lower, keywords::OFFICIAL_GUIDANCE_KEYWORDS);
    let mut penalty = 0;
    penalty -= count_matches(&lower, keywords::SPECULATION_KEYWORDS) as i32 * P_SPECULATION;
    penalty -= patterns::conditional().find_iter(&lower).count() as i32 * P_CONDITIONAL;
    if !has_guidance {
        penalty -= count_matches(&lower, keywords::VAGUE_QUANTIFIERS) as i32 * P_VAGUE;
    }
    if any_match(&lower, keywords::NOISE_TERMS) {
        penalty -= P_NOISE;
    }
    if base > 0 && !has_data && !has_attribution {
        penalty -= P_TOPIC_NO_EVIDENCE;
    }
    penalty += topic_penalty(&lower);

    // 6. Bonuses.
    let mut bonus = 0;
    if has_guidance && base >= TIER_INSTITUTIONAL {
        bonus += B_OFFICIAL_GUIDANCE;
    }
    if any_match(&lower, keywords::HEALTH_ADVISORY_KEYWORDS) && (has_data || has_attribution) {
        bonus += B_HEALTH_ADVISORY;
    }

    let raw = base + verifiable_data + checkability + source_risk + penalty + bonus;
    let total = raw.clamp(0, MAX_SCORE as i32) as u8;

    ScoreBreakdown {
        base,
        verifiable_data,
        checkability,
        source_risk,
        penalty,
        bonus,
        total,
    }
}

/// Entertainment/sports topic penalty with two overrides: government-funding
/// context for entertainment, controversy for sports.
fn topic_penalty(lower: &str) -> i32 {
    let mut penalty = 0;

    let entertainment = count_matches(lower, keywords::ENTERTAINMENT_KEYWORDS);
    let gov_money_context = any_match(lower, &["governo", "ministério", "federal", "investimento"])
        && patterns::currency().is_match(lower);
    if !(gov_money_context && entertainment <= 2) {
        penalty -= match entertainment {
            0 => 0,
            1 => 25,
            2 => 30,
            _ => 35,
        };
    }

    let sports = count_matches(lower, keywords::SPORTS_KEYWORDS);
    if !any_match(lower, keywords::CONTROVERSY_KEYWORDS) {
        penalty -= match sports {
            0 | 1 => 0,
            2 => 15,
            _ => 25,
        };
    }

    penalty.max(TOPIC_PENALTY_FLOOR)
}

/// Downstream decision, deliberately outside the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Below the save floor: never persisted.
    Drop,
    /// Saved with its score for audit, not submitted.
    Rejected,
    /// Queued for submission.
    Pending,
}

impl Verdict {
    pub fn from_score(total: u8, minimum_save: u8, submission_threshold: u8) -> Self {
        if total < minimum_save {
            Verdict::Drop
        } else if total < submission_threshold {
            Verdict::Rejected
        } else {
            Verdict::Pending
        }
    }
}
