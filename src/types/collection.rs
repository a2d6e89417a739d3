use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::requester::{Context, QueryParams};
use crate::types::model::{Model, ModelKind, json_type_name};

const ITEMS_FIELD: &str = "items";
const BOOKMARK_FIELD: &str = "bookmark";

/// One page of a list endpoint.
///
/// A page is fully materialized on construction. Fetching the next page
/// produces a new `Collection`. Nothing is merged into this one, so callers
/// that want every item must accumulate pages themselves.
#[derive(Clone)]
pub struct Collection {
    context: Context,
    kind: ModelKind,
    path: String,
    query: QueryParams,
    items: Vec<Model>,
    bookmark: Option<String>,
}

impl Collection {
    /// Wrap a decoded list response.
    ///
    /// Accepts `{"items": [...], "bookmark": "..."}` (either field may be
    /// missing) or a bare JSON array, which has no further pages. A `null` or
    /// empty bookmark marks the last page.
    pub fn new(
        context: Context,
        path: impl Into<String>,
        query: QueryParams,
        raw: Value,
        kind: ModelKind,
    ) -> Result<Self, Error> {
        let (raw_items, bookmark) = match raw {
            Value::Null => (Vec::new(), None),
            Value::Array(items) => (items, None),
            Value::Object(mut map) => {
                let items = match map.remove(ITEMS_FIELD) {
                    None | Some(Value::Null) => Vec::new(),
                    Some(Value::Array(items)) => items,
                    Some(other) => {
                        return Err(Error::MalformedResponse(format!(
                            "expected `{ITEMS_FIELD}` to be an array, got {}",
                            json_type_name(&other)
                        )));
                    }
                };
                let bookmark = match map.remove(BOOKMARK_FIELD) {
                    None | Some(Value::Null) => None,
                    Some(Value::String(s)) => Some(s).filter(|s| !s.is_empty()),
                    Some(Value::Number(n)) => Some(n.to_string()),
                    Some(other) => {
                        return Err(Error::MalformedResponse(format!(
                            "expected `{BOOKMARK_FIELD}` to be a string, got {}",
                            json_type_name(&other)
                        )));
                    }
                };
                (items, bookmark)
            }
            other => {
                return Err(Error::MalformedResponse(format!(
                    "expected a list response, got {}",
                    json_type_name(&other)
                )));
            }
        };

        let items = raw_items
            .into_iter()
            .map(|item| kind.build(Some(context.clone()), item))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            context,
            kind,
            path: path.into(),
            query,
            items,
            bookmark,
        })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Model> {
        self.items.iter()
    }

    pub fn items(&self) -> &[Model] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Model> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `true` iff the server returned a bookmark for another page.
    pub fn has_more(&self) -> bool {
        self.bookmark.is_some()
    }

    pub fn bookmark(&self) -> Option<&str> {
        self.bookmark.as_deref()
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The query this page was fetched with.
    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    /// Fetch the page after this one.
    ///
    /// Re-issues the original request with `bookmark` set. Returns
    /// [`Error::NoMorePages`] without touching the network when this is the
    /// last page.
    pub async fn fetch_next(&self) -> Result<Collection, Error> {
        let Some(bookmark) = self.bookmark.as_deref() else {
            return Err(Error::NoMorePages);
        };

        let query = self.query.clone().with(BOOKMARK_FIELD, bookmark);
        debug!(path = %self.path, kind = %self.kind, "fetching next page");

        let raw = self.context.get(&self.path, &query).await?;
        Collection::new(self.context.clone(), self.path.clone(), query, raw, self.kind)
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("kind", &self.kind)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("items", &self.items)
            .field("bookmark", &self.bookmark)
            .finish()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Model;
    type IntoIter = std::slice::Iter<'a, Model>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for Collection {
    type Item = Model;
    type IntoIter = std::vec::IntoIter<Model>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::BoxFuture;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// Replays canned responses and records every query it receives.
    struct StubRequester {
        responses: Mutex<Vec<Value>>,
        calls: Mutex<Vec<(String, QueryParams)>>,
    }

    impl StubRequester {
        fn new(responses: Vec<Value>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl crate::requester::Requester for StubRequester {
        fn get<'a>(
            &'a self,
            path: &'a str,
            query: &'a QueryParams,
        ) -> BoxFuture<'a, Result<Value, Error>> {
            Box::pin(async move {
                self.calls
                    .lock()
                    .unwrap()
                    .push((path.to_string(), query.clone()));
                let mut responses = self.responses.lock().unwrap();
                Ok(if responses.is_empty() {
                    Value::Null
                } else {
                    responses.remove(0)
                })
            })
        }
    }

    fn collection(stub: &Arc<StubRequester>, raw: Value) -> Collection {
        Collection::new(
            stub.clone(),
            "ad_accounts/",
            QueryParams::new().with("page_size", 3),
            raw,
            ModelKind::AdAccount,
        )
        .unwrap()
    }

    #[test]
    fn test_items_and_bookmark() {
        let stub = StubRequester::new(vec![]);
        let page = collection(
            &stub,
            json!({"items": [{"id": "a"}, {"id": "b"}, {"id": "c"}], "bookmark": "x"}),
        );

        let ids: Vec<_> = page.iter().map(|m| m.id().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(page.has_more());
        assert_eq!(page.bookmark(), Some("x"));
        assert!(page.iter().all(|m| m.kind() == ModelKind::AdAccount));
        assert!(page.iter().all(|m| m.context().is_some()));

        // iteration over a fetched page is restartable
        assert_eq!(page.iter().count(), 3);
        assert_eq!((&page).into_iter().count(), 3);
    }

    #[test]
    fn test_empty_items_null_bookmark() {
        let stub = StubRequester::new(vec![]);
        let page = collection(&stub, json!({"items": [], "bookmark": null}));
        assert!(page.is_empty());
        assert!(!page.has_more());
    }

    #[test]
    fn test_missing_items_is_empty() {
        let stub = StubRequester::new(vec![]);
        let page = collection(&stub, json!({}));
        assert_eq!(page.iter().count(), 0);
        assert!(!page.has_more());

        let page = collection(&stub, Value::Null);
        assert!(page.is_empty());
    }

    #[test]
    fn test_empty_bookmark_is_last_page() {
        let stub = StubRequester::new(vec![]);
        let page = collection(&stub, json!({"items": [{"id": "a"}], "bookmark": ""}));
        assert!(!page.has_more());
        assert!(page.bookmark().is_none());
    }

    #[test]
    fn test_numeric_bookmark_is_stringified() {
        let stub = StubRequester::new(vec![]);
        let page = collection(&stub, json!({"items": [{"id": "a"}], "bookmark": 1700000000}));
        assert!(page.has_more());
        assert_eq!(page.bookmark(), Some("1700000000"));
    }

    #[test]
    fn test_non_scalar_bookmark_is_malformed() {
        let stub = StubRequester::new(vec![]);
        for bookmark in [json!(true), json!({"next": "x"}), json!(["x"])] {
            let err = Collection::new(
                stub.clone(),
                "ad_accounts/",
                QueryParams::new(),
                json!({"items": [], "bookmark": bookmark}),
                ModelKind::AdAccount,
            )
            .unwrap_err();
            assert!(matches!(err, Error::MalformedResponse(_)));
        }
    }

    #[test]
    fn test_bare_array_has_no_more_pages() {
        let stub = StubRequester::new(vec![]);
        let page = collection(
            &stub,
            json!([{"DATE": "2024-01-01", "SPEND_IN_DOLLAR": 3.5}, {"DATE": "2024-01-02"}]),
        );
        assert_eq!(page.len(), 2);
        assert!(!page.has_more());
        assert_eq!(page.items()[0].get_str("DATE"), Some("2024-01-01"));
    }

    #[test]
    fn test_malformed_shapes() {
        let stub = StubRequester::new(vec![]);
        let err = Collection::new(
            stub.clone(),
            "ad_accounts/",
            QueryParams::new(),
            json!("oops"),
            ModelKind::AdAccount,
        )
        .unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));

        let err = Collection::new(
            stub.clone(),
            "ad_accounts/",
            QueryParams::new(),
            json!({"items": {"id": "a"}}),
            ModelKind::AdAccount,
        )
        .unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));

        let err = Collection::new(
            stub,
            "ad_accounts/",
            QueryParams::new(),
            json!({"items": [1, 2]}),
            ModelKind::AdAccount,
        )
        .unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_fetch_next_sends_bookmark_and_original_query() {
        let stub = StubRequester::new(vec![json!({"items": [{"id": "d"}], "bookmark": null})]);
        let page = collection(
            &stub,
            json!({"items": [{"id": "a"}, {"id": "b"}, {"id": "c"}], "bookmark": "x"}),
        );

        let next = page.fetch_next().await.unwrap();
        assert_eq!(stub.call_count(), 1);
        let calls = stub.calls.lock().unwrap();
        assert_eq!(calls[0].0, "ad_accounts/");
        assert_eq!(calls[0].1.get("bookmark"), Some("x"));
        assert_eq!(calls[0].1.get("page_size"), Some("3"));

        assert_eq!(next.path(), "ad_accounts/");
        assert_eq!(next.query().get("bookmark"), Some("x"));
        assert!(!next.has_more());
    }

    #[tokio::test]
    async fn test_fetch_next_replaces_page() {
        let stub = StubRequester::new(vec![json!({"items": [{"id": "d"}, {"id": "e"}]})]);
        let first = collection(
            &stub,
            json!({"items": [{"id": "a"}, {"id": "b"}], "bookmark": "x"}),
        );
        let second = first.fetch_next().await.unwrap();

        let first_ids: Vec<_> = first.iter().filter_map(Model::id).collect();
        let second_ids: Vec<_> = second.iter().filter_map(Model::id).collect();
        assert_eq!(first_ids, vec!["a", "b"]);
        assert_eq!(second_ids, vec!["d", "e"]);
    }

    #[tokio::test]
    async fn test_fetch_next_replaces_caller_bookmark() {
        let stub = StubRequester::new(vec![json!({"items": [{"id": "c"}]})]);
        let page = Collection::new(
            stub.clone(),
            "ad_accounts/42/campaigns/",
            QueryParams::new().with("page_size", 2).with("bookmark", "from_caller"),
            json!({"items": [{"id": "a"}, {"id": "b"}], "bookmark": "from_server"}),
            ModelKind::Campaign,
        )
        .unwrap();

        let next = page.fetch_next().await.unwrap();

        let calls = stub.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let sent = &calls[0].1;
        assert_eq!(sent.get("bookmark"), Some("from_server"));
        assert_eq!(sent.get("page_size"), Some("2"));
        assert_eq!(sent.len(), 2);
        assert_eq!(next.query(), sent);
        assert_eq!(page.query().get("bookmark"), Some("from_caller"));
    }

    #[tokio::test]
    async fn test_fetch_next_on_last_page_makes_no_request() {
        let stub = StubRequester::new(vec![json!({"items": [{"id": "z"}]})]);
        let page = collection(&stub, json!({"items": [{"id": "a"}]}));

        let err = page.fetch_next().await.unwrap_err();
        assert!(matches!(err, Error::NoMorePages));
        assert_eq!(stub.call_count(), 0);

        // deterministic on repeat
        assert!(matches!(page.fetch_next().await, Err(Error::NoMorePages)));
        assert_eq!(stub.call_count(), 0);
    }

    struct FailingRequester;

    impl crate::requester::Requester for FailingRequester {
        fn get<'a>(
            &'a self,
            _path: &'a str,
            _query: &'a QueryParams,
        ) -> BoxFuture<'a, Result<Value, Error>> {
            Box::pin(async {
                Err(Error::Api {
                    status: 503,
                    body: crate::error::ApiErrorBody {
                        code: None,
                        message: "unavailable".to_string(),
                    },
                })
            })
        }
    }

    #[tokio::test]
    async fn test_fetch_next_propagates_transport_failure() {
        let page = Collection::new(
            Arc::new(FailingRequester),
            "ad_accounts/1/ads/",
            QueryParams::new(),
            json!({"items": [], "bookmark": "b"}),
            ModelKind::Ad,
        )
        .unwrap();

        let err = page.fetch_next().await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.status(), Some(503));
    }
}
