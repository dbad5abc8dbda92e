use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical article record built from a raw news provider entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub source_name: Option<String>,
    /// Provider timestamp, kept as the provider formatted it
    pub published_at: Option<String>,
}

impl Article {
    /// Map a raw provider record into an [`Article`].
    ///
    /// Never fails: a missing field, a `null`, or a value of the wrong JSON type
    /// all degrade to an empty title/url or an absent optional field.
    pub fn normalize(raw: &Value) -> Self {
        Self {
            title: string_field(raw, "title").unwrap_or_default(),
            description: string_field(raw, "description"),
            url: string_field(raw, "url").unwrap_or_default(),
            image_url: string_field(raw, "urlToImage"),
            source_name: raw.get("source").and_then(|s| string_field(s, "name")),
            published_at: string_field(raw, "publishedAt"),
        }
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_owned)
}

/// Normalize every entry of the provider's `articles` array, preserving order.
/// A body without an `articles` array yields no articles.
pub fn normalize_all(body: &Value) -> Vec<Article> {
    body.get("articles")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(Article::normalize).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_record() {
        let raw = json!({
            "source": {"id": null, "name": "Yonhap"},
            "author": "someone",
            "title": "삼성, 차세대 HBM 개발 발표",
            "description": "HBM4 양산 계획을 공개",
            "url": "https://example.com/a",
            "urlToImage": "https://example.com/a.jpg",
            "publishedAt": "2024-05-01T09:00:00Z",
            "content": "..."
        });

        let article = Article::normalize(&raw);
        assert_eq!(article.title, "삼성, 차세대 HBM 개발 발표");
        assert_eq!(article.description.as_deref(), Some("HBM4 양산 계획을 공개"));
        assert_eq!(article.url, "https://example.com/a");
        assert_eq!(article.image_url.as_deref(), Some("https://example.com/a.jpg"));
        assert_eq!(article.source_name.as_deref(), Some("Yonhap"));
        assert_eq!(article.published_at.as_deref(), Some("2024-05-01T09:00:00Z"));
    }

    #[test]
    fn missing_optional_fields_are_absent() {
        let raw = json!({"title": "Only a title", "url": "https://example.com/b"});

        let article = Article::normalize(&raw);
        assert_eq!(article.title, "Only a title");
        assert_eq!(article.description, None);
        assert_eq!(article.image_url, None);
        assert_eq!(article.source_name, None);
        assert_eq!(article.published_at, None);
    }

    #[test]
    fn nulls_and_wrong_types_degrade() {
        let raw = json!({
            "title": null,
            "description": 42,
            "url": ["not", "a", "string"],
            "urlToImage": null,
            "source": "Reuters",
            "publishedAt": {"when": "now"}
        });

        let article = Article::normalize(&raw);
        assert_eq!(article.title, "");
        assert_eq!(article.url, "");
        assert_eq!(article.description, None);
        assert_eq!(article.source_name, None);
        assert_eq!(article.published_at, None);
    }

    #[test]
    fn non_object_record() {
        let article = Article::normalize(&json!("garbage"));
        assert_eq!(article.title, "");
        assert_eq!(article.source_name, None);
    }

    #[test]
    fn normalize_all_keeps_order() {
        let body = json!({
            "status": "ok",
            "totalResults": 3,
            "articles": [
                {"title": "one", "url": "u1"},
                {"title": "two", "url": "u2"},
                {"title": "three", "url": "u3"}
            ]
        });

        let titles: Vec<_> = normalize_all(&body).into_iter().map(|a| a.title).collect();
        assert_eq!(titles, ["one", "two", "three"]);
    }

    #[test]
    fn normalize_all_without_articles() {
        assert!(normalize_all(&json!({"status": "ok"})).is_empty());
        assert!(normalize_all(&json!({"articles": "nope"})).is_empty());
    }
}
