//! Ordered ranking policy for format variants.
//!
//! The sites encode tier and premium adjustments as bare integer bumps;
//! here each adjustment is a named rule applied in a fixed order, so every
//! increment can be tested on its own. Scores are ordinal tie-breakers
//! consumed by [`crate::descriptor::MediaDescriptor::best_format`].

/// The facts about a stream variant that ranking rules may consult.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariantFacts<'a> {
    /// Site-reported quality tier (e.g., `"hq"`, `"lq"`).
    pub quality_tier: Option<&'a str>,
    /// Premium-subscriber stream.
    pub premium: bool,
    /// Container extension, when already known.
    pub ext: Option<&'a str>,
}

/// Combined score a policy assigns to one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranking {
    pub quality: i32,
    pub preference: i32,
    /// Qualifier to surface on the variant (e.g., `"Premium"`).
    pub note: Option<&'static str>,
}

/// One named adjustment. Applied rules accumulate; a later rule's note
/// replaces an earlier one.
pub struct RankRule {
    pub name: &'static str,
    pub applies: fn(&VariantFacts) -> bool,
    pub quality: i32,
    pub preference: i32,
    pub note: Option<&'static str>,
}

/// An ordered list of [`RankRule`]s.
pub struct RankPolicy {
    rules: &'static [RankRule],
}

/// Live streams: baseline 0, low-quality tiers score below it, premium
/// streams are preferred and annotated.
static LIVE_RULES: &[RankRule] = &[
    RankRule {
        name: "low-quality-tier",
        applies: |f| f.quality_tier == Some("lq"),
        quality: -1,
        preference: 0,
        note: None,
    },
    RankRule {
        name: "premium",
        applies: |f| f.premium,
        quality: 0,
        preference: 1,
        note: Some("Premium"),
    },
];

/// Listen-again episodes: every variant sits below the live baseline, and
/// the MP3 fallback sits below the primary media URL.
static LISTEN_AGAIN_RULES: &[RankRule] = &[
    RankRule {
        name: "listen-again-baseline",
        applies: |_| true,
        quality: 0,
        preference: -1,
        note: None,
    },
    RankRule {
        name: "mp3-fallback",
        applies: |f| f.ext == Some("mp3"),
        quality: 0,
        preference: -1,
        note: None,
    },
];

impl RankPolicy {
    pub fn live() -> Self {
        Self { rules: LIVE_RULES }
    }

    pub fn listen_again() -> Self {
        Self {
            rules: LISTEN_AGAIN_RULES,
        }
    }

    /// Apply every matching rule in order and return the combined score.
    pub fn rank(&self, facts: &VariantFacts) -> Ranking {
        let mut ranking = Ranking {
            quality: 0,
            preference: 0,
            note: None,
        };
        for rule in self.rules {
            if (rule.applies)(facts) {
                ranking.quality += rule.quality;
                ranking.preference += rule.preference;
                if rule.note.is_some() {
                    ranking.note = rule.note;
                }
            }
        }
        ranking
    }

    /// Names of the rules that would fire for these facts, in order.
    pub fn matching_rules(&self, facts: &VariantFacts) -> Vec<&'static str> {
        self.rules
            .iter()
            .filter(|rule| (rule.applies)(facts))
            .map(|rule| rule.name)
            .collect()
    }
}
