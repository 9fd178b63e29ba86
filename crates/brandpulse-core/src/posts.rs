use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::sentiment::Sentiment;
use crate::CoreError;

/// Columns every corpus file must carry. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "post_id",
    "platform",
    "brand",
    "created_at",
    "text",
    "sentiment",
];

/// `created_at` format: ISO-8601, seconds precision, no offset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One labeled social-media post.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub post_id: String,
    pub platform: String,
    pub brand: String,
    pub created_at: NaiveDateTime,
    pub text: String,
    pub sentiment: Sentiment,
}

/// Row shape on disk; fields stay as strings until validated.
#[derive(Debug, Serialize, Deserialize)]
struct PostRecord {
    post_id: String,
    platform: String,
    brand: String,
    created_at: String,
    text: String,
    sentiment: String,
}

impl PostRecord {
    fn validate(self) -> Result<Post, CoreError> {
        let sentiment =
            self.sentiment
                .parse::<Sentiment>()
                .map_err(|_| CoreError::InvalidSentiment {
                    post_id: self.post_id.clone(),
                    value: self.sentiment.clone(),
                })?;

        let created_at = NaiveDateTime::parse_from_str(&self.created_at, TIMESTAMP_FORMAT)
            .map_err(|e| CoreError::InvalidTimestamp {
                post_id: self.post_id.clone(),
                value: self.created_at.clone(),
                reason: e.to_string(),
            })?;

        Ok(Post {
            post_id: self.post_id,
            platform: self.platform,
            brand: self.brand,
            created_at,
            text: self.text,
            sentiment,
        })
    }
}

impl From<&Post> for PostRecord {
    fn from(post: &Post) -> Self {
        Self {
            post_id: post.post_id.clone(),
            platform: post.platform.clone(),
            brand: post.brand.clone(),
            created_at: post.created_at.format(TIMESTAMP_FORMAT).to_string(),
            text: post.text.clone(),
            sentiment: post.sentiment.as_str().to_string(),
        }
    }
}

/// Load and validate a post corpus from a CSV file.
///
/// # Errors
///
/// Returns `CoreError` if the file cannot be read or any row fails validation.
pub fn load_posts(path: &Path) -> Result<Vec<Post>, CoreError> {
    let file = std::fs::File::open(path).map_err(|e| CoreError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    read_posts(file)
}

/// Read and validate a post corpus from any CSV source with a header row.
///
/// The whole input is validated before anything is returned: a missing
/// column, an unknown sentiment label, a malformed timestamp or a repeated
/// `post_id` fails the read.
///
/// # Errors
///
/// Returns `CoreError` describing the first schema violation found.
pub fn read_posts<R: Read>(source: R) -> Result<Vec<Post>, CoreError> {
    let mut reader = csv::Reader::from_reader(source);

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(CoreError::MissingColumn(column.to_string()));
        }
    }

    let mut seen_ids = HashSet::new();
    let mut posts = Vec::new();
    for row in reader.deserialize::<PostRecord>() {
        let post = row?.validate()?;
        if !seen_ids.insert(post.post_id.clone()) {
            return Err(CoreError::DuplicatePostId(post.post_id));
        }
        posts.push(post);
    }

    Ok(posts)
}

/// Write posts as CSV with the [`REQUIRED_COLUMNS`] header.
///
/// # Errors
///
/// Returns `CoreError::Csv` if serialization or the underlying write fails.
pub fn write_posts<W: Write>(sink: W, posts: &[Post]) -> Result<(), CoreError> {
    let mut writer = csv::Writer::from_writer(sink);
    for post in posts {
        writer.serialize(PostRecord::from(post))?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

#[cfg(test)]
#[path = "posts_test.rs"]
mod tests;
