//! `generate`: write a synthetic labeled corpus.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Context;
use brandpulse_core::{generate_posts, write_posts, AppConfig, Post, Sentiment, SyntheticConfig};

pub(crate) fn run_generate(
    config: &AppConfig,
    n_posts: usize,
    seed: Option<u64>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let output = output.unwrap_or_else(|| config.posts_path());
    let seed = seed.unwrap_or(config.seed);

    let posts = generate_posts(&SyntheticConfig {
        n_posts,
        seed,
        ..SyntheticConfig::default()
    });

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = std::fs::File::create(&output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    write_posts(file, &posts).with_context(|| format!("failed to write {}", output.display()))?;

    tracing::info!(posts = posts.len(), seed, path = %output.display(), "synthetic corpus written");
    println!("saved {} posts to {}", posts.len(), output.display());
    println!("sentiment distribution:");
    print!("{}", format_distribution(&posts));
    Ok(())
}

/// Share of each label, three decimals, most frequent first.
pub(crate) fn format_distribution(posts: &[Post]) -> String {
    let mut shares: Vec<(Sentiment, usize)> = Sentiment::ALL
        .iter()
        .map(|label| (*label, posts.iter().filter(|p| p.sentiment == *label).count()))
        .collect();
    shares.sort_by(|a, b| b.1.cmp(&a.1));

    let mut out = String::new();
    for (label, count) in shares {
        #[allow(clippy::cast_precision_loss)]
        let share = if posts.is_empty() {
            0.0
        } else {
            count as f64 / posts.len() as f64
        };
        let _ = writeln!(out, "  {:<9}{share:.3}", label.as_str());
    }
    out
}
