use std::io::Write as _;

use super::*;

const HEADER: &str = "post_id,platform,brand,created_at,text,sentiment\n";

fn csv_with_rows(rows: &[&str]) -> String {
    let mut out = HEADER.to_string();
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    out
}

#[test]
fn reads_valid_rows() {
    let input = csv_with_rows(&[
        "POST_00001,Twitter,NovaPhone,2025-01-03T10:15:00,Absolutely love NovaPhone!,Positive",
        "POST_00002,Reddit,SkyWear,2025-02-11T23:59:59,\"SkyWear, fix your sizing.\",Negative",
    ]);

    let posts = read_posts(input.as_bytes()).unwrap();

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].post_id, "POST_00001");
    assert_eq!(posts[0].sentiment, Sentiment::Positive);
    assert_eq!(
        posts[0].created_at.format(TIMESTAMP_FORMAT).to_string(),
        "2025-01-03T10:15:00"
    );
    assert_eq!(posts[1].text, "SkyWear, fix your sizing.");
    assert_eq!(posts[1].sentiment, Sentiment::Negative);
}

#[test]
fn columns_may_appear_in_any_order_with_extras() {
    let input = "sentiment,text,extra,brand,platform,created_at,post_id\n\
                 Neutral,Saw an update,x,FreshFizz,YouTube,2025-03-01T00:00:00,POST_1\n";

    let posts = read_posts(input.as_bytes()).unwrap();

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].brand, "FreshFizz");
    assert_eq!(posts[0].sentiment, Sentiment::Neutral);
}

#[test]
fn missing_column_is_reported_by_name() {
    let input = "post_id,platform,brand,created_at,text\n\
                 POST_1,Twitter,NovaPhone,2025-01-01T00:00:00,hello\n";

    let err = read_posts(input.as_bytes()).unwrap_err();

    assert!(
        matches!(err, CoreError::MissingColumn(ref c) if c == "sentiment"),
        "expected MissingColumn(sentiment), got: {err:?}"
    );
}

#[test]
fn unknown_sentiment_fails_the_whole_read() {
    let input = csv_with_rows(&[
        "POST_1,Twitter,NovaPhone,2025-01-01T00:00:00,ok,Positive",
        "POST_2,Twitter,NovaPhone,2025-01-01T00:00:00,meh,Mixed",
    ]);

    let err = read_posts(input.as_bytes()).unwrap_err();

    assert!(
        matches!(err, CoreError::InvalidSentiment { ref post_id, ref value } if post_id == "POST_2" && value == "Mixed"),
        "expected InvalidSentiment, got: {err:?}"
    );
}

#[test]
fn malformed_timestamp_is_rejected() {
    let input = csv_with_rows(&["POST_1,Twitter,NovaPhone,01/02/2025,ok,Positive"]);

    let err = read_posts(input.as_bytes()).unwrap_err();

    assert!(matches!(err, CoreError::InvalidTimestamp { .. }), "got: {err:?}");
}

#[test]
fn duplicate_post_id_is_rejected() {
    let input = csv_with_rows(&[
        "POST_1,Twitter,NovaPhone,2025-01-01T00:00:00,one,Positive",
        "POST_1,Reddit,SkyWear,2025-01-02T00:00:00,two,Negative",
    ]);

    let err = read_posts(input.as_bytes()).unwrap_err();

    assert!(
        matches!(err, CoreError::DuplicatePostId(ref id) if id == "POST_1"),
        "got: {err:?}"
    );
}

#[test]
fn empty_corpus_with_header_reads_as_empty() {
    let posts = read_posts(HEADER.as_bytes()).unwrap();
    assert!(posts.is_empty());
}

#[test]
fn written_posts_load_back_from_disk() {
    let input = csv_with_rows(&[
        "POST_1,Instagram,QuickEats,2025-01-05T08:30:00,\"Shoutout to QuickEats, amazing offers!\",Positive",
        "POST_2,LinkedIn,QuickEats,2025-01-06T09:00:00,Reading mixed reviews,Neutral",
    ]);
    let posts = read_posts(input.as_bytes()).unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    let mut buf = Vec::new();
    write_posts(&mut buf, &posts).unwrap();
    file.write_all(&buf).unwrap();

    let reloaded = load_posts(file.path()).unwrap();
    assert_eq!(reloaded, posts);
}

#[test]
fn load_posts_reports_missing_file() {
    let err = load_posts(Path::new("/nonexistent/posts.csv")).unwrap_err();
    assert!(matches!(err, CoreError::Io { .. }), "got: {err:?}");
}
