//! Content generation for new records.
//!
//! Builds the initial file set from a caller-supplied description. No
//! validation happens here; the caller runs the result through the
//! moderation filter before anything is persisted.

use crate::types::FileMap;
use chrono::{DateTime, Utc};

/// Build the default file set for a new record.
///
/// Produces exactly one `index.hsx` file embedding the description verbatim
/// and the generation timestamp. Deterministic given the description and the
/// current time.
pub fn build_files(description: &str) -> FileMap {
    build_files_at(description, Utc::now())
}

/// Deterministic core of `build_files`, exposed for tests.
pub fn build_files_at(description: &str, now: DateTime<Utc>) -> FileMap {
    let index = format!(
        "<!-- Auto-generated site -->\n\
         <!-- Description: {description} -->\n\
         <!-- Generated at {} -->\n\
         <html>\n\
         <head><title>{description}</title></head>\n\
         <body>\n\
         <h1>{description}</h1>\n\
         </body>\n\
         </html>",
        now.to_rfc3339(),
    );
    FileMap::from([("index.hsx".to_string(), index)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_produces_one_file() {
        let files = build_files("Hello World");
        assert_eq!(files.len(), 1);
        assert!(files.contains_key("index.hsx"));
    }

    #[test]
    fn test_description_embedded_verbatim() {
        let description = "My <weird> \"description\" & more";
        let files = build_files(description);
        for content in files.values() {
            assert!(content.contains(description));
        }
    }

    #[test]
    fn test_timestamp_embedded() {
        let now = Utc::now();
        let files = build_files_at("x", now);
        assert!(files["index.hsx"].contains(&now.to_rfc3339()));
    }

    #[test]
    fn test_deterministic_for_fixed_time() {
        let now = Utc::now();
        assert_eq!(build_files_at("same", now), build_files_at("same", now));
    }
}
