use super::*;

fn permissive() -> FeatureConfig {
    FeatureConfig {
        min_df: 1,
        max_df: 1.0,
    }
}

#[test]
fn analyze_emits_unigrams_then_bigrams() {
    let terms = analyze("Absolutely love NovaPhone! Battery life");
    assert_eq!(
        terms,
        vec![
            "absolutely",
            "love",
            "novaphone",
            "battery",
            "life",
            "absolutely love",
            "love novaphone",
            "novaphone battery",
            "battery life",
        ]
    );
}

#[test]
fn analyze_drops_stop_words_before_pairing() {
    let terms = analyze("SkyWear seriously needs to fix their sizing.");
    assert!(terms.contains(&"fix sizing".to_string()), "got: {terms:?}");
    assert!(!terms.iter().any(|t| t == "their" || t == "to"));
}

#[test]
fn analyze_ignores_single_characters_and_symbols() {
    assert_eq!(analyze("I a b ok 😍 ⭐⭐"), vec!["ok"]);
    assert!(analyze("").is_empty());
}

#[test]
fn vocabulary_is_sorted_lexicographically() {
    let corpus = ["zebra apple", "mango apple"];
    let (vectorizer, _) = TfidfVectorizer::fit_transform(permissive(), &corpus).unwrap();

    let terms: Vec<&str> = vectorizer.vocabulary().keys().map(String::as_str).collect();
    assert_eq!(
        terms,
        vec!["apple", "mango", "mango apple", "zebra", "zebra apple"]
    );
    for (expected, index) in vectorizer.vocabulary().values().enumerate() {
        assert_eq!(*index, expected);
    }
}

#[test]
fn min_df_removes_rare_terms() {
    let corpus = ["great camera", "great battery", "great design"];
    let config = FeatureConfig {
        min_df: 2,
        max_df: 1.0,
    };
    let (vectorizer, _) = TfidfVectorizer::fit_transform(config, &corpus).unwrap();

    assert_eq!(vectorizer.n_features(), 1);
    assert!(vectorizer.vocabulary().contains_key("great"));
}

#[test]
fn max_df_removes_near_universal_terms() {
    let corpus = ["great camera", "great battery", "great camera", "great design"];
    let config = FeatureConfig {
        min_df: 1,
        max_df: 0.75,
    };
    let (vectorizer, _) = TfidfVectorizer::fit_transform(config, &corpus).unwrap();

    assert!(!vectorizer.vocabulary().contains_key("great"));
    assert!(vectorizer.vocabulary().contains_key("camera"));
}

#[test]
fn idf_is_smoothed() {
    let corpus = ["alpha beta", "alpha"];
    let (vectorizer, _) = TfidfVectorizer::fit_transform(permissive(), &corpus).unwrap();

    let alpha = vectorizer.vocabulary()["alpha"];
    let beta = vectorizer.vocabulary()["beta"];
    assert!((vectorizer.idf()[alpha] - 1.0).abs() < 1e-12);
    assert!((vectorizer.idf()[beta] - ((3.0_f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
}

#[test]
fn document_vectors_have_unit_length() {
    let corpus = ["love love camera", "hate battery", "camera battery design"];
    let (_, matrix) = TfidfVectorizer::fit_transform(permissive(), &corpus).unwrap();

    for row in &matrix {
        assert!((row.norm() - 1.0).abs() < 1e-12, "norm was {}", row.norm());
        assert!(row.entries().windows(2).all(|w| w[0].0 < w[1].0));
    }
}

#[test]
fn repeated_terms_weigh_more() {
    let corpus = ["love love camera", "camera design"];
    let (vectorizer, matrix) = TfidfVectorizer::fit_transform(permissive(), &corpus).unwrap();

    let weight_of = |term: &str| {
        let index = vectorizer.vocabulary()[term];
        matrix[0]
            .entries()
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, w)| *w)
            .unwrap()
    };
    assert!(weight_of("love") > weight_of("camera"));
}

#[test]
fn transform_drops_out_of_vocabulary_terms() {
    let corpus = ["love camera", "hate camera"];
    let (vectorizer, _) = TfidfVectorizer::fit_transform(permissive(), &corpus).unwrap();

    let rows = vectorizer.transform(&["camera spaceship", "entirely unknown words"]);
    assert_eq!(rows[0].len(), 1);
    assert!((rows[0].norm() - 1.0).abs() < 1e-12);
    assert!(rows[1].is_empty());
}

#[test]
fn fitting_is_deterministic() {
    let corpus = [
        "Absolutely love NovaPhone battery life",
        "Worst experience with SkyWear sizing",
        "Reading mixed reviews about FreshFizz pricing",
        "Shoutout to QuickEats for amazing offers",
    ];
    let (first, first_matrix) = TfidfVectorizer::fit_transform(permissive(), &corpus).unwrap();
    let (second, second_matrix) = TfidfVectorizer::fit_transform(permissive(), &corpus).unwrap();

    assert_eq!(first, second);
    assert_eq!(first_matrix, second_matrix);
}

#[test]
fn empty_corpus_is_rejected() {
    let corpus: [&str; 0] = [];
    let err = TfidfVectorizer::fit_transform(permissive(), &corpus).unwrap_err();
    assert!(matches!(err, SentimentError::Features(_)), "got: {err:?}");
}

#[test]
fn inconsistent_bounds_are_rejected() {
    let corpus = ["one", "two", "three", "four"];
    let config = FeatureConfig {
        min_df: 5,
        max_df: 0.9,
    };
    let err = TfidfVectorizer::fit_transform(config, &corpus).unwrap_err();
    assert!(
        matches!(err, SentimentError::Features(ref msg) if msg.contains("min_df")),
        "got: {err:?}"
    );
}

#[test]
fn empty_vocabulary_is_rejected() {
    let corpus = ["the and of", "a an the"];
    let err = TfidfVectorizer::fit_transform(permissive(), &corpus).unwrap_err();
    assert!(
        matches!(err, SentimentError::Features(ref msg) if msg.contains("no term")),
        "got: {err:?}"
    );
}

#[test]
fn sparse_dot_reads_one_coefficient_row() {
    let weights = ndarray::array![[1.0, 2.0, 3.0], [-1.0, 0.5, 4.0]];
    let vector = SparseVector::new(vec![(0, 0.6), (2, 0.8)]);

    assert!((vector.dot(weights.row(0)) - 3.0).abs() < 1e-12);
    assert!((vector.dot(weights.row(1)) - 2.6).abs() < 1e-12);
    assert!(SparseVector::new(vec![(7, 1.0)]).dot(weights.row(0)).abs() < f64::EPSILON);
}
