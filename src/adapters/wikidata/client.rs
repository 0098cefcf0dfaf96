use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::adapters::wikidata::api_models::{
    ApiEnvelope, EntitiesResponse, RawRevision, RecentChangesQuery, RevisionsQuery,
    UserContribsQuery, continuation_params, normalize_revisions,
};
use crate::config::app_config::ApiSection;
use crate::core::errors::{Result, WikitrackError};
use crate::core::models::date_range::DateRange;
use crate::core::models::edit_record::{EditRecord, Property};
use crate::core::models::entity::{EntityDetails, EntityId};
use crate::core::traits::revision_source::RevisionSource;

/// Largest page size the API grants to anonymous clients.
const MAX_PAGE_SIZE: usize = 500;

type Params = Vec<(String, String)>;

/// Build a reqwest client with the given timeout.
fn build_client(timeout: Duration, user_agent: &str) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| WikitrackError::ApiRequest {
            reason: format!("Failed to create HTTP client: {e}"),
        })
}

fn default_user_agent() -> String {
    format!(
        "wikitrack/{} (+https://www.wikidata.org/wiki/Wikidata:Tools)",
        env!("CARGO_PKG_VERSION")
    )
}

fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Reads edit activity from a MediaWiki action API (Wikidata by default).
pub struct WikidataClient {
    http: reqwest::Client,
    base_url: String,
    max_pages: usize,
}

impl WikidataClient {
    /// Create a client for `base_url` using the `[api]` settings.
    pub fn new(base_url: &str, settings: &ApiSection) -> Result<Self> {
        let user_agent = settings
            .user_agent
            .clone()
            .unwrap_or_else(default_user_agent);
        Ok(Self {
            http: build_client(Duration::from_secs(settings.timeout_secs), &user_agent)?,
            base_url: base_url.to_string(),
            max_pages: settings.max_pages.max(1),
        })
    }

    /// Issue one GET and decode the JSON body.
    async fn get<T: DeserializeOwned>(&self, query: &Params) -> Result<T> {
        tracing::debug!(url = %self.base_url, ?query, "api request");

        let resp = self
            .http
            .get(&self.base_url)
            .query(&[("format", "json"), ("formatversion", "1")])
            .query(query)
            .send()
            .await
            .map_err(|e| WikitrackError::ApiRequest {
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(WikitrackError::ApiRequest {
                reason: format!("API returned status {}", resp.status()),
            });
        }

        resp.json::<T>()
            .await
            .map_err(|e| WikitrackError::ApiResponse {
                reason: format!("Failed to parse API response: {e}"),
            })
    }

    /// Walk a `list`/`prop` query through its continuation pages.
    ///
    /// `extract` turns one page into items; only items passing `keep` count
    /// towards `limit`. Stops at `limit`, at the last page, or after
    /// `max_pages` requests.
    async fn collect_pages<Q, T>(
        &self,
        base: Params,
        limit: usize,
        mut extract: impl FnMut(Q) -> Vec<T>,
        keep: impl Fn(&T) -> bool,
    ) -> Result<Vec<T>>
    where
        Q: DeserializeOwned,
    {
        let mut collected = Vec::new();
        let mut continuation: Params = Vec::new();

        for page in 0..self.max_pages {
            let mut query = base.clone();
            query.extend(continuation.iter().cloned());

            let envelope: ApiEnvelope<Q> = self.get(&query).await?;
            if let Some(err) = envelope.error {
                return Err(WikitrackError::ApiResponse {
                    reason: format!("{}: {}", err.code, err.info),
                });
            }

            let items = envelope.query.map(&mut extract).unwrap_or_default();
            tracing::debug!(page, received = items.len(), "api page");
            collected.extend(items.into_iter().filter(|item| keep(item)));

            if collected.len() >= limit {
                collected.truncate(limit);
                break;
            }
            match envelope.continuation {
                Some(next) => continuation = continuation_params(&next),
                None => break,
            }
        }

        Ok(collected)
    }
}

impl RevisionSource for WikidataClient {
    async fn user_contributions(
        &self,
        username: &str,
        range: &DateRange,
        properties: &[Property],
        limit: usize,
    ) -> Result<Vec<EditRecord>> {
        // A property filter discards edits client-side, so ask for full pages.
        let page_size = if properties.is_empty() {
            limit.clamp(1, MAX_PAGE_SIZE)
        } else {
            MAX_PAGE_SIZE
        };
        let query = params(&[
            ("action", "query"),
            ("list", "usercontribs"),
            ("ucuser", username),
            ("ucstart", range.end_marker().as_str()),
            ("ucend", range.start_marker().as_str()),
            ("uclimit", page_size.to_string().as_str()),
            ("ucprop", "ids|title|timestamp|comment|size|tags"),
        ]);

        let edits = self
            .collect_pages(
                query,
                limit,
                |q: UserContribsQuery| {
                    q.usercontribs
                        .into_iter()
                        .map(|raw| raw.normalize(username))
                        .collect()
                },
                |edit: &EditRecord| {
                    properties.is_empty()
                        || edit.property.is_some_and(|p| properties.contains(&p))
                },
            )
            .await?;

        tracing::info!(user = username, edits = edits.len(), "fetched user contributions");
        Ok(edits)
    }

    async fn entity_revisions(
        &self,
        entity: &EntityId,
        range: &DateRange,
        limit: usize,
    ) -> Result<Vec<EditRecord>> {
        let title = entity.page_title();
        let query = params(&[
            ("action", "query"),
            ("prop", "revisions"),
            ("titles", title.as_str()),
            ("rvprop", "ids|timestamp|user|comment|size|tags"),
            ("rvstart", range.end_marker().as_str()),
            ("rvend", range.start_marker().as_str()),
            ("rvlimit", limit.clamp(1, MAX_PAGE_SIZE).to_string().as_str()),
        ]);

        let revisions: Vec<RawRevision> = self
            .collect_pages(query, limit, RevisionsQuery::into_revisions, |_| true)
            .await?;
        let edits = normalize_revisions(entity.as_str(), revisions);

        tracing::info!(entity = %entity, edits = edits.len(), "fetched entity revisions");
        Ok(edits)
    }

    async fn entity_details(&self, entity: &EntityId) -> Result<Option<EntityDetails>> {
        let query = params(&[
            ("action", "wbgetentities"),
            ("ids", entity.as_str()),
            ("props", "labels|descriptions|claims"),
            ("languages", "en"),
        ]);

        let resp: EntitiesResponse = self.get(&query).await?;
        if let Some(err) = resp.error {
            if err.code == "no-such-entity" {
                return Ok(None);
            }
            return Err(WikitrackError::ApiResponse {
                reason: format!("{}: {}", err.code, err.info),
            });
        }

        Ok(resp
            .entities
            .into_iter()
            .find(|(id, _)| id.eq_ignore_ascii_case(entity.as_str()))
            .and_then(|(_, raw)| raw.into_details(entity.clone())))
    }

    async fn recent_changes(&self, range: &DateRange, limit: usize) -> Result<Vec<EditRecord>> {
        let query = params(&[
            ("action", "query"),
            ("list", "recentchanges"),
            ("rcstart", range.end_marker().as_str()),
            ("rcend", range.start_marker().as_str()),
            ("rclimit", limit.clamp(1, MAX_PAGE_SIZE).to_string().as_str()),
            ("rcprop", "title|ids|sizes|flags|user|timestamp|comment|tags"),
            ("rcnamespace", "0"),
        ]);

        let edits = self
            .collect_pages(
                query,
                limit,
                |q: RecentChangesQuery| {
                    q.recentchanges
                        .into_iter()
                        .map(|raw| raw.normalize())
                        .collect()
                },
                |_| true,
            )
            .await?;

        tracing::info!(edits = edits.len(), "fetched recent changes");
        Ok(edits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mockito::{Matcher, Server};

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        )
        .unwrap()
    }

    fn client(server: &Server) -> WikidataClient {
        WikidataClient::new(&format!("{}/w/api.php", server.url()), &ApiSection::default()).unwrap()
    }

    fn contrib(revid: u64, comment: &str, size: i64, diff: i64) -> serde_json::Value {
        serde_json::json!({
            "revid": revid,
            "title": format!("Q{revid}"),
            "timestamp": "2026-01-10T10:00:00Z",
            "comment": comment,
            "size": size,
            "sizediff": diff,
            "tags": []
        })
    }

    #[tokio::test]
    async fn user_contributions_sends_range_markers() {
        let mut server = Server::new_async().await;
        let body = serde_json::json!({
            "query": {"usercontribs": [contrib(1, "label", 100, 10), contrib(2, "claim", 80, -5)]}
        });
        let mock = server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("list".into(), "usercontribs".into()),
                Matcher::UrlEncoded("ucuser".into(), "Alice".into()),
                Matcher::UrlEncoded("ucstart".into(), "2026-01-31T23:59:59Z".into()),
                Matcher::UrlEncoded("ucend".into(), "2026-01-01T00:00:00Z".into()),
                Matcher::UrlEncoded("format".into(), "json".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let edits = client(&server)
            .user_contributions("Alice", &range(), &[], 100)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(edits.len(), 2);
        assert_eq!(edits[0].user, "Alice");
        assert_eq!(edits[1].property, Some(Property::Statements));
        assert!(edits.iter().all(|e| e.size.diff() == e.size.new_size() - e.size.old()));
    }

    #[tokio::test]
    async fn user_contributions_filters_by_property_then_caps() {
        let mut server = Server::new_async().await;
        let body = serde_json::json!({
            "query": {"usercontribs": [
                contrib(1, "label", 100, 10),
                contrib(2, "sitelink", 100, 10),
                contrib(3, "label", 100, 10),
                contrib(4, "label", 100, 10)
            ]}
        });
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let edits = client(&server)
            .user_contributions("Alice", &range(), &[Property::Labels], 2)
            .await
            .unwrap();

        let ids: Vec<u64> = edits.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn follows_continuation_until_exhausted() {
        let mut server = Server::new_async().await;
        let first = serde_json::json!({
            "continue": {"uccontinue": "20260105|2", "continue": "-||"},
            "query": {"usercontribs": [contrib(1, "", 10, 10)]}
        });
        let second = serde_json::json!({
            "query": {"usercontribs": [contrib(2, "", 20, 10)]}
        });
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(first.to_string())
            .expect(1)
            .create_async()
            .await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::UrlEncoded("uccontinue".into(), "20260105|2".into()))
            .with_status(200)
            .with_body(second.to_string())
            .create_async()
            .await;

        let edits = client(&server)
            .user_contributions("Alice", &range(), &[], 10)
            .await
            .unwrap();

        let ids: Vec<u64> = edits.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn missing_query_is_empty_result() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("{\"batchcomplete\": \"\"}")
            .create_async()
            .await;

        let edits = client(&server).recent_changes(&range(), 50).await.unwrap();
        assert!(edits.is_empty());
    }

    #[tokio::test]
    async fn api_error_object_is_reported() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"error": {"code": "baduser_ucuser", "info": "Invalid value"}}"#)
            .create_async()
            .await;

        let err = client(&server)
            .user_contributions("<bad>", &range(), &[], 10)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("baduser_ucuser"));
    }

    #[tokio::test]
    async fn http_failure_is_api_request_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let err = client(&server).recent_changes(&range(), 10).await.unwrap_err();
        assert!(matches!(err, WikitrackError::ApiRequest { .. }));
    }

    #[tokio::test]
    async fn malformed_body_is_api_response_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let err = client(&server).recent_changes(&range(), 10).await.unwrap_err();
        assert!(matches!(err, WikitrackError::ApiResponse { .. }));
    }

    #[tokio::test]
    async fn entity_revisions_read_first_page() {
        let mut server = Server::new_async().await;
        let body = serde_json::json!({
            "query": {"pages": {"138": {"pageid": 138, "title": "Q42", "revisions": [
                {"revid": 5, "timestamp": "2026-01-05T00:00:00Z", "user": "Eve", "comment": "alias", "size": 210},
                {"revid": 4, "timestamp": "2026-01-04T00:00:00Z", "user": "Dan", "comment": "", "size": 200}
            ]}}}
        });
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("prop".into(), "revisions".into()),
                Matcher::UrlEncoded("titles".into(), "Q42".into()),
            ]))
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let id = EntityId::parse("Q42").unwrap();
        let edits = client(&server).entity_revisions(&id, &range(), 100).await.unwrap();
        assert_eq!(edits.len(), 2);
        assert_eq!(edits[0].title, "Q42");
        assert_eq!(edits[0].size.diff(), 10);
        assert_eq!(edits[0].property, Some(Property::Aliases));
    }

    #[tokio::test]
    async fn property_revisions_use_namespaced_title() {
        let mut server = Server::new_async().await;
        let body = serde_json::json!({
            "query": {"pages": {"3918489": {"pageid": 3918489, "title": "Property:P31", "revisions": [
                {"revid": 9, "timestamp": "2026-01-09T00:00:00Z", "user": "Eve", "comment": "", "size": 120, "sizediff": 20}
            ]}}}
        });
        let mock = server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::UrlEncoded("titles".into(), "Property:P31".into()))
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let id = EntityId::parse("P31").unwrap();
        let edits = client(&server).entity_revisions(&id, &range(), 100).await.unwrap();
        mock.assert_async().await;
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].title, "P31");
    }

    #[tokio::test]
    async fn stops_after_max_pages() {
        let mut server = Server::new_async().await;
        let endless = serde_json::json!({
            "continue": {"rccontinue": "20260101|1", "continue": "-||"},
            "query": {"recentchanges": []}
        });
        let mock = server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(endless.to_string())
            .expect(3)
            .create_async()
            .await;

        let settings = ApiSection {
            max_pages: 3,
            ..ApiSection::default()
        };
        let client =
            WikidataClient::new(&format!("{}/w/api.php", server.url()), &settings).unwrap();
        let edits = client.recent_changes(&range(), 50).await.unwrap();

        assert!(edits.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn entity_details_parses_labels() {
        let mut server = Server::new_async().await;
        let body = serde_json::json!({
            "entities": {"Q42": {
                "id": "Q42",
                "labels": {"en": {"language": "en", "value": "Douglas Adams"}},
                "descriptions": {"en": {"language": "en", "value": "English writer"}},
                "claims": {"P31": [{"mainsnak": {}}]}
            }}
        });
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::UrlEncoded("action".into(), "wbgetentities".into()))
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let id = EntityId::parse("Q42").unwrap();
        let details = client(&server).entity_details(&id).await.unwrap().unwrap();
        assert_eq!(details.label("en"), Some("Douglas Adams"));
        assert_eq!(details.description("en"), Some("English writer"));
        assert_eq!(details.statement_count(), 1);
    }

    #[tokio::test]
    async fn unknown_entity_is_none() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"error": {"code": "no-such-entity", "info": "Could not find an entity"}}"#)
            .create_async()
            .await;

        let id = EntityId::parse("Q999999999").unwrap();
        assert!(client(&server).entity_details(&id).await.unwrap().is_none());
    }
}
