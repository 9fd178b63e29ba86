//! Seeded synthetic corpus of brand posts.
//!
//! Texts are drawn from fixed per-sentiment templates filled with a brand name
//! and one of that brand's product features, so the labels are learnable.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::posts::Post;
use crate::sentiment::Sentiment;

pub const BRANDS: [&str; 4] = ["NovaPhone", "SkyWear", "FreshFizz", "QuickEats"];
pub const PLATFORMS: [&str; 5] = ["Twitter", "Instagram", "Reddit", "YouTube", "LinkedIn"];

const POSITIVE_TEMPLATES: [&str; 5] = [
    "Absolutely love {brand}! {feature} 😍",
    "{brand} just nailed it again. {feature} #happycustomer",
    "Honestly, {brand} has the best {feature}. Totally worth it.",
    "So impressed with {brand} right now – {feature} made my day.",
    "Shoutout to {brand} for amazing {feature}! ⭐⭐⭐⭐⭐",
];

const NEGATIVE_TEMPLATES: [&str; 5] = [
    "Really disappointed with {brand}. {feature} was a mess. 😡",
    "{brand} seriously needs to fix their {feature}.",
    "Worst experience with {brand} so far – {feature} is terrible.",
    "I regret choosing {brand}. {feature} completely failed.",
    "How can {brand} ship such bad {feature}? Never again.",
];

const NEUTRAL_TEMPLATES: [&str; 5] = [
    "Tried {brand} today, still forming an opinion about their {feature}.",
    "Saw a new update from {brand} about {feature}. Interesting.",
    "Anyone else using {brand} for {feature}? Curious about your thoughts.",
    "{brand} just launched something around {feature}.",
    "Reading mixed reviews about {brand}'s {feature}.",
];

/// Window, in days, over which `created_at` is spread.
const DAYS_SPAN: i64 = 90;

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticConfig {
    pub n_posts: usize,
    pub seed: u64,
    /// Earliest possible `created_at`.
    pub start: NaiveDateTime,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            n_posts: 12_000,
            seed: 42,
            start: NaiveDate::from_ymd_opt(2025, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap_or_default(),
        }
    }
}

fn brand_features(brand: &str) -> &'static [&'static str] {
    match brand {
        "NovaPhone" => &["battery life", "camera quality", "5G performance", "design"],
        "SkyWear" => &["delivery speed", "fabric quality", "return policy", "sizing"],
        "FreshFizz" => &["flavour options", "pricing", "sugar content", "packaging"],
        _ => &["delivery time", "order accuracy", "customer support", "offers"],
    }
}

fn pick<'a, T>(rng: &mut StdRng, items: &'a [T]) -> &'a T {
    &items[rng.random_range(0..items.len())]
}

/// Sentiment mix is 50% Positive, 25% Negative, 25% Neutral.
fn draw_sentiment(rng: &mut StdRng) -> Sentiment {
    let roll: f64 = rng.random();
    if roll < 0.5 {
        Sentiment::Positive
    } else if roll < 0.75 {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Generate `config.n_posts` posts with ids `POST_00001`, `POST_00002`, ...
///
/// The same config always yields the same corpus.
#[must_use]
pub fn generate_posts(config: &SyntheticConfig) -> Vec<Post> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut posts = Vec::with_capacity(config.n_posts);

    for i in 0..config.n_posts {
        let brand = *pick(&mut rng, &BRANDS);
        let platform = *pick(&mut rng, &PLATFORMS);

        let offset_days = rng.random_range(0..DAYS_SPAN);
        let offset_minutes = rng.random_range(0..24 * 60);
        let created_at =
            config.start + Duration::days(offset_days) + Duration::minutes(offset_minutes);

        let sentiment = draw_sentiment(&mut rng);
        let templates = match sentiment {
            Sentiment::Positive => &POSITIVE_TEMPLATES,
            Sentiment::Negative => &NEGATIVE_TEMPLATES,
            Sentiment::Neutral => &NEUTRAL_TEMPLATES,
        };
        let template = *pick(&mut rng, templates);
        let feature = *pick(&mut rng, brand_features(brand));

        let mut text = template
            .replace("{brand}", brand)
            .replace("{feature}", feature);
        match rng.random_range(0..5) {
            1 => text.push_str(&format!(" #{}", brand.to_lowercase())),
            2 => text.push_str(&format!(" #{}", feature.replace(' ', ""))),
            3 => text.push_str(" 😊"),
            4 => text.push_str(" 😬"),
            _ => {}
        }

        posts.push(Post {
            post_id: format!("POST_{:05}", i + 1),
            platform: platform.to_string(),
            brand: brand.to_string(),
            created_at,
            text,
            sentiment,
        });
    }

    posts
}
