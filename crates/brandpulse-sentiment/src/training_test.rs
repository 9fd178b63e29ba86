use brandpulse_core::{generate_posts, SyntheticConfig};
use chrono::NaiveDate;

use super::*;

fn corpus(n_posts: usize) -> Vec<Post> {
    generate_posts(&SyntheticConfig {
        n_posts,
        seed: 42,
        ..SyntheticConfig::default()
    })
}

fn post(id: usize, brand: &str, text: &str, sentiment: Sentiment) -> Post {
    Post {
        post_id: format!("POST_{id:05}"),
        platform: "Twitter".to_string(),
        brand: brand.to_string(),
        created_at: NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap(),
        text: text.to_string(),
        sentiment,
    }
}

#[test]
fn evaluates_on_held_out_and_refits_on_everything() {
    let posts = corpus(600);
    let outcome = train_and_evaluate(&posts, &TrainingConfig::default()).unwrap();
    let eval = &outcome.evaluation;

    assert_eq!(eval.train_size + eval.test_size, posts.len());
    assert_eq!(eval.confusion.total(), eval.test_size);
    assert!(eval.accuracy > 0.9, "accuracy was {}", eval.accuracy);
    assert_eq!(eval.caveat, METRICS_CAVEAT);

    assert!(outcome.pipeline.is_fitted());
    assert_eq!(outcome.pipeline.fit_report(), Some(&outcome.refit));
}

#[test]
fn held_out_share_matches_test_fraction() {
    let posts = corpus(500);
    let outcome = train_and_evaluate(&posts, &TrainingConfig::default()).unwrap();

    #[allow(clippy::cast_precision_loss)]
    let share = outcome.evaluation.test_size as f64 / posts.len() as f64;
    assert!((share - 0.2).abs() < 0.01, "held-out share {share}");
}

#[test]
fn refit_pipeline_only_predicts_known_labels() {
    let posts = corpus(400);
    let outcome = train_and_evaluate(&posts, &TrainingConfig::default()).unwrap();

    let unseen = [
        "Absolutely love NovaPhone! battery life",
        "SkyWear seriously needs to fix their sizing.",
        "Reading mixed reviews about FreshFizz's pricing.",
        "",
        "completely unrelated gibberish zzz",
    ];
    let predicted = outcome.pipeline.predict(&unseen).unwrap();
    assert_eq!(predicted.len(), unseen.len());
    for label in &predicted {
        assert!(Sentiment::ALL.contains(label));
    }
    assert_eq!(predicted[0], Sentiment::Positive);
    assert_eq!(predicted[1], Sentiment::Negative);
    assert_eq!(predicted[2], Sentiment::Neutral);
}

#[test]
fn same_corpus_and_seed_give_identical_models() {
    let posts = corpus(400);
    let config = TrainingConfig::default();

    let first = train_and_evaluate(&posts, &config).unwrap();
    let second = train_and_evaluate(&posts, &config).unwrap();

    assert_eq!(
        first.pipeline.vectorizer().unwrap().vocabulary(),
        second.pipeline.vectorizer().unwrap().vocabulary()
    );
    assert_eq!(first.pipeline.classifier(), second.pipeline.classifier());
    assert_eq!(first.evaluation, second.evaluation);
}

#[test]
fn rare_class_fails_before_fitting() {
    let mut posts = Vec::new();
    for i in 0..20 {
        posts.push(post(i, "Acme", "love it a lot", Sentiment::Positive));
        posts.push(post(100 + i, "Acme", "saw an update", Sentiment::Neutral));
    }
    posts.push(post(200, "Acme", "terrible", Sentiment::Negative));
    posts.push(post(201, "Acme", "awful", Sentiment::Negative));

    let err = train_and_evaluate(&posts, &TrainingConfig::default()).unwrap_err();

    assert!(
        matches!(
            err,
            SentimentError::InsufficientData {
                label: Sentiment::Negative,
                count: 2
            }
        ),
        "got: {err:?}"
    );
}

#[test]
fn config_is_threaded_from_app_settings() {
    let app = AppConfig {
        env: brandpulse_core::Environment::Test,
        log_level: "info".to_string(),
        data_dir: "./data".into(),
        model_path: "./models/m.json".into(),
        seed: 9,
        test_fraction: 0.25,
        min_df: 3,
        max_df: 0.8,
        max_iter: 50,
        regularization_c: 2.0,
        tolerance: 1e-3,
    };

    let config = TrainingConfig::from_app_config(&app);

    assert_eq!(config.seed, 9);
    assert!((config.test_fraction - 0.25).abs() < f64::EPSILON);
    assert_eq!(config.pipeline.features.min_df, 3);
    assert!((config.pipeline.features.max_df - 0.8).abs() < f64::EPSILON);
    assert_eq!(config.pipeline.classifier.max_iter, 50);
    assert!((config.pipeline.classifier.regularization_c - 2.0).abs() < f64::EPSILON);
}
