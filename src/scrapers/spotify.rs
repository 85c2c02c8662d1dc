//! Spotify Podcast Charts scraper.
//!
//! Uses the JSON endpoint behind podcastcharts.byspotify.com. The payload has
//! been seen both as a bare array of shows and as `{"podcasts": [...]}`, and
//! field names come with or without a `show` prefix (`showName` / `name`).
//! When the top chart is unreachable the trending chart is used instead.

use super::JsonChart;
use crate::error::{ChartError, json_kind};
use crate::models::{
    DESCRIPTION, IMAGE_URL, NOT_AVAILABLE, PODCAST_TITLE, PUBLISHER, RANK_MOVEMENT, SPOTIFY_ID,
    SourceVariant, UNKNOWN,
};
use crate::normalize::{FieldRule, Step, strip_prefix_or_keep};
use serde_json::Value;

pub const SHOW_URI_PREFIX: &str = "spotify:show:";

fn strip_show_uri(value: &str) -> String {
    strip_prefix_or_keep(value, SHOW_URI_PREFIX)
}

pub static RULES: [FieldRule; 6] = [
    FieldRule::new(
        PODCAST_TITLE,
        &[&[Step::Key("showName")], &[Step::Key("name")]],
        UNKNOWN,
    ),
    FieldRule::new(
        PUBLISHER,
        &[&[Step::Key("showPublisher")], &[Step::Key("publisher")]],
        UNKNOWN,
    ),
    FieldRule::new(
        SPOTIFY_ID,
        &[&[Step::Key("showUri")], &[Step::Key("id")]],
        NOT_AVAILABLE,
    )
    .with_transform(strip_show_uri),
    FieldRule::new(
        IMAGE_URL,
        &[&[Step::Key("showImageUrl")], &[Step::Key("imageUrl")]],
        NOT_AVAILABLE,
    ),
    FieldRule::new(
        DESCRIPTION,
        &[&[Step::Key("showDescription")], &[Step::Key("description")]],
        NOT_AVAILABLE,
    ),
    FieldRule::new(RANK_MOVEMENT, &[&[Step::Key("chartRankMove")]], NOT_AVAILABLE),
];

#[derive(Debug)]
pub struct SpotifyChart;

impl JsonChart for SpotifyChart {
    const NAME: &'static str = "spotify";
    const FILE_PREFIX: &'static str = "spotify_podcast_rankings";
    const FALLBACK_LABEL: &'static str = "trending";
    const DEFAULT_PRIMARY: &'static str =
        "https://podcastcharts.byspotify.com/api/charts/top?country=us&date=latest&limit=100";
    const DEFAULT_FALLBACK: &'static str =
        "https://podcastcharts.byspotify.com/api/charts/trending?country=us&date=latest&limit=50";
    const REFERER: Option<&'static str> = Some("https://podcastcharts.byspotify.com/");

    fn entries(raw: &Value) -> Result<Vec<&Value>, ChartError> {
        match raw {
            Value::Array(items) => Ok(items.iter().collect()),
            Value::Object(obj) => match obj.get("podcasts") {
                Some(Value::Array(items)) => Ok(items.iter().collect()),
                Some(Value::Null) | None => Ok(Vec::new()),
                Some(other) => Err(ChartError::UnexpectedShape(format!(
                    "`podcasts` is a {}",
                    json_kind(other)
                ))),
            },
            other => Err(ChartError::UnexpectedShape(format!(
                "top-level value is a {}",
                json_kind(other)
            ))),
        }
    }

    fn rules(_variant: SourceVariant) -> &'static [FieldRule] {
        &RULES
    }

    fn heading(variant: SourceVariant) -> &'static str {
        match variant {
            SourceVariant::Primary => "Spotify Podcast Rankings",
            SourceVariant::Fallback => "Spotify Trending Podcast Rankings",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::HttpSource;
    use crate::models::RANK;
    use crate::normalize::normalize_entry;
    use crate::report::testing::RecordingReporter;
    use crate::scrapers::test_support::{context, read_csv};
    use crate::scrapers::{Endpoints, run_json_chart};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn show(name: &str) -> Value {
        json!({
            "chartRankMove": "MOVED_UP",
            "showName": name,
            "showPublisher": "Spotify Studios",
            "showImageUrl": "https://i.scdn.co/image/abc",
            "showUri": "spotify:show:4rOoJ6Egrf8K2IrywzwOMk",
            "showDescription": "A show."
        })
    }

    async fn serve(primary: ResponseTemplate, fallback: ResponseTemplate, fallback_calls: u64) -> (MockServer, Endpoints) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/charts/top"))
            .and(header("referer", "https://podcastcharts.byspotify.com/"))
            .respond_with(primary)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/charts/trending"))
            .respond_with(fallback)
            .expect(fallback_calls)
            .mount(&server)
            .await;
        let endpoints = Endpoints {
            primary: format!("{}/api/charts/top?country=us&date=latest&limit=100", server.uri()),
            fallback: format!("{}/api/charts/trending?country=us&date=latest&limit=50", server.uri()),
        };
        (server, endpoints)
    }

    fn http() -> HttpSource {
        HttpSource::new(SpotifyChart::REFERER, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_show_prefixed_fields() {
        let record = normalize_entry(&RULES, &show("The Joe Rogan Experience"), 1).unwrap();
        assert_eq!(record.get(PODCAST_TITLE), Some("The Joe Rogan Experience"));
        assert_eq!(record.get(PUBLISHER), Some("Spotify Studios"));
        assert_eq!(record.get(SPOTIFY_ID), Some("4rOoJ6Egrf8K2IrywzwOMk"));
        assert_eq!(record.get(IMAGE_URL), Some("https://i.scdn.co/image/abc"));
        assert_eq!(record.get(DESCRIPTION), Some("A show."));
        assert_eq!(record.get(RANK_MOVEMENT), Some("MOVED_UP"));
    }

    #[test]
    fn test_alternate_field_names() {
        let entry = json!({
            "name": "Call Her Daddy",
            "publisher": "Alex Cooper",
            "id": "7bnjJ7Va1nM07Um4Od55dW",
            "imageUrl": "https://img/1",
            "description": "Desc"
        });
        let record = normalize_entry(&RULES, &entry, 1).unwrap();
        assert_eq!(record.get(PODCAST_TITLE), Some("Call Her Daddy"));
        assert_eq!(record.get(PUBLISHER), Some("Alex Cooper"));
        assert_eq!(record.get(SPOTIFY_ID), Some("7bnjJ7Va1nM07Um4Od55dW"));
        assert_eq!(record.get(IMAGE_URL), Some("https://img/1"));
        assert_eq!(record.get(RANK_MOVEMENT), Some(NOT_AVAILABLE));
    }

    #[test]
    fn test_missing_everything_uses_sentinels() {
        let record = normalize_entry(&RULES, &json!({"unrelated": 1}), 1).unwrap();
        assert_eq!(record.get(PODCAST_TITLE), Some(UNKNOWN));
        assert_eq!(record.get(PUBLISHER), Some(UNKNOWN));
        assert_eq!(record.get(SPOTIFY_ID), Some(NOT_AVAILABLE));
        assert_eq!(record.get(DESCRIPTION), Some(NOT_AVAILABLE));
    }

    #[test]
    fn test_entries_accepts_bare_array_and_wrapped_list() {
        let bare = json!([show("A"), show("B")]);
        assert_eq!(SpotifyChart::entries(&bare).unwrap().len(), 2);

        let wrapped = json!({"podcasts": [show("A")]});
        assert_eq!(SpotifyChart::entries(&wrapped).unwrap().len(), 1);

        let no_list = json!({"date": "2025-03-14"});
        assert!(SpotifyChart::entries(&no_list).unwrap().is_empty());

        assert!(matches!(
            SpotifyChart::entries(&json!("oops")),
            Err(ChartError::UnexpectedShape(_))
        ));
    }

    #[tokio::test]
    async fn test_bare_array_response_is_extracted() {
        let (_server, endpoints) = serve(
            ResponseTemplate::new(200).set_body_json(json!([show("First"), show("Second")])),
            ResponseTemplate::new(200),
            0,
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let reporter = RecordingReporter::default();

        let outcome = run_json_chart::<SpotifyChart>(&http(), &endpoints, &context(dir.path()), &reporter)
            .await
            .unwrap();

        assert_eq!(outcome.csv_path, dir.path().join("spotify_podcast_rankings_2025-03-14.csv"));
        let (headers, rows) = read_csv(&outcome.csv_path);
        assert_eq!(
            headers,
            vec!["Rank", "Podcast Title", "Publisher", "Spotify ID", "Image URL", "Description", "Rank Movement"]
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][1], "Second");
        assert_eq!(rows[1][3], "4rOoJ6Egrf8K2IrywzwOMk");
    }

    #[tokio::test]
    async fn test_non_object_entries_are_skipped_and_ranks_stay_contiguous() {
        let (_server, endpoints) = serve(
            ResponseTemplate::new(200).set_body_json(json!({
                "podcasts": [show("One"), "garbage", show("Two"), 17, show("Three")]
            })),
            ResponseTemplate::new(200),
            0,
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let reporter = RecordingReporter::default();

        let outcome = run_json_chart::<SpotifyChart>(&http(), &endpoints, &context(dir.path()), &reporter)
            .await
            .unwrap();

        assert_eq!(outcome.rows, 3);
        let (headers, rows) = read_csv(&outcome.csv_path);
        assert_eq!(headers[0], RANK);
        let ranks: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();
        let titles: Vec<&str> = rows.iter().map(|r| r[1].as_str()).collect();
        assert_eq!(ranks, vec!["1", "2", "3"]);
        assert_eq!(titles, vec!["One", "Two", "Three"]);
    }

    #[tokio::test]
    async fn test_all_unknown_titles_write_debug_dump() {
        let entries: Vec<Value> = (0..100).map(|i| json!({"title_v2": format!("Show {i}")})).collect();
        let body = json!({"podcasts": entries});
        let (_server, endpoints) = serve(
            ResponseTemplate::new(200).set_body_json(body.clone()),
            ResponseTemplate::new(200),
            0,
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let reporter = RecordingReporter::default();

        let outcome = run_json_chart::<SpotifyChart>(&http(), &endpoints, &context(dir.path()), &reporter)
            .await
            .unwrap();

        assert_eq!(outcome.rows, 100);
        assert!(outcome.csv_path.exists());
        let dump_path = outcome.debug_dump.expect("debug dump path");
        assert_eq!(dump_path, dir.path().join("spotify_api_response_debug.json"));
        let dumped: Value = serde_json::from_str(&std::fs::read_to_string(&dump_path).unwrap()).unwrap();
        assert_eq!(dumped, body);
        assert!(reporter.contains("warning spotify All podcast titles are 'Unknown'"));
    }

    #[tokio::test]
    async fn test_trending_fallback_on_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/charts/trending"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"podcasts": [show("Trending")]})))
            .expect(1)
            .mount(&server)
            .await;
        let endpoints = Endpoints {
            primary: "http://127.0.0.1:9/api/charts/top".to_string(),
            fallback: format!("{}/api/charts/trending", server.uri()),
        };
        let dir = tempfile::tempdir().unwrap();
        let reporter = RecordingReporter::default();

        let outcome = run_json_chart::<SpotifyChart>(&http(), &endpoints, &context(dir.path()), &reporter)
            .await
            .unwrap();

        assert_eq!(outcome.variant, SourceVariant::Fallback);
        assert_eq!(
            outcome.csv_path,
            dir.path().join("spotify_podcast_rankings_trending_2025-03-14.csv")
        );
        assert!(reporter.contains("preview Spotify Trending Podcast Rankings"));
    }

    #[tokio::test]
    async fn test_empty_list_is_not_a_fallback_trigger() {
        let (_server, endpoints) = serve(
            ResponseTemplate::new(200).set_body_json(json!([])),
            ResponseTemplate::new(200).set_body_json(json!([show("Never")])),
            0,
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let reporter = RecordingReporter::default();

        let outcome =
            run_json_chart::<SpotifyChart>(&http(), &endpoints, &context(dir.path()), &reporter).await;

        assert!(outcome.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
