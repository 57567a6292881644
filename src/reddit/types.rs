//! Reddit API wire types.

use serde::Deserialize;

use crate::domain::Submission;

/// OAuth token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}

/// A listing envelope (`kind: "Listing"`).
#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Thing>,

    #[serde(default)]
    pub after: Option<String>,
}

/// One listing child; only `t3` (link) children carry submissions.
#[derive(Debug, Clone, Deserialize)]
pub struct Thing {
    pub kind: String,
    pub data: serde_json::Value,
}

impl Listing {
    /// Submissions in listing order, skipping non-link children.
    pub fn into_submissions(self) -> Result<Vec<Submission>, serde_json::Error> {
        self.data
            .children
            .into_iter()
            .filter(|thing| thing.kind == "t3")
            .map(|thing| serde_json::from_value(thing.data))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_into_submissions_keeps_order() {
        let json = r#"{
            "kind": "Listing",
            "data": {
                "after": "t3_zz",
                "children": [
                    {"kind": "t3", "data": {"id": "b", "title": "B", "author": "x", "score": 2, "url": "http://x/b.png"}},
                    {"kind": "t1", "data": {"id": "c1", "body": "a comment"}},
                    {"kind": "t3", "data": {"id": "a", "title": "A", "author": "y", "score": 1, "url": null, "is_self": true}}
                ]
            }
        }"#;
        let listing: Listing = serde_json::from_str(json).unwrap();
        let submissions = listing.into_submissions().unwrap();

        let ids: Vec<&str> = submissions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert!(submissions[1].is_self);
    }

    #[test]
    fn test_token_response_error() {
        let token: TokenResponse = serde_json::from_str(r#"{"error": "invalid_grant"}"#).unwrap();
        assert!(token.access_token.is_none());
        assert_eq!(token.error.as_deref(), Some("invalid_grant"));
    }
}
