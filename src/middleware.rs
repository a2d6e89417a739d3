use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Error;

/// A boxed future that is Send, used for middleware and requester return types.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type Handler<'a> = dyn Fn(reqwest::Request) -> BoxFuture<'a, Result<reqwest::Response, Error>>
    + Send
    + Sync
    + 'a;

/// Represents the next handler in the middleware chain.
#[derive(Clone)]
pub struct Next<'a> {
    inner: Arc<Handler<'a>>,
}

impl<'a> Next<'a> {
    pub fn new(
        f: impl Fn(reqwest::Request) -> BoxFuture<'a, Result<reqwest::Response, Error>>
        + Send
        + Sync
        + 'a,
    ) -> Self {
        Self { inner: Arc::new(f) }
    }

    pub fn run(&self, request: reqwest::Request) -> BoxFuture<'a, Result<reqwest::Response, Error>> {
        (self.inner)(request)
    }
}

/// Intercepts outgoing requests before they reach the HTTP client.
///
/// The OAuth integration uses this to inject bearer tokens and replay
/// requests after a refresh. Users can add their own via
/// `ClientBuilder::middleware`.
pub trait Middleware: Send + Sync {
    fn handle<'a>(
        &'a self,
        request: reqwest::Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<reqwest::Response, Error>>;
}

/// Run `request` through `middlewares` in order, ending at `handler`.
pub fn execute_middleware_chain<'a>(
    middlewares: &'a [Box<dyn Middleware>],
    request: reqwest::Request,
    handler: impl Fn(reqwest::Request) -> BoxFuture<'a, Result<reqwest::Response, Error>>
    + Send
    + Sync
    + 'a,
) -> BoxFuture<'a, Result<reqwest::Response, Error>> {
    build_chain(middlewares, Next::new(handler)).run(request)
}

/// Wrap `last` with each middleware, innermost first.
fn build_chain<'a>(middlewares: &'a [Box<dyn Middleware>], last: Next<'a>) -> Next<'a> {
    middlewares.iter().rev().fold(last, |next, middleware| {
        Next::new(move |req| middleware.handle(req, next.clone()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn ok_response() -> reqwest::Response {
        reqwest::Response::from(http::Response::builder().status(200).body("").unwrap())
    }

    fn get_request() -> reqwest::Request {
        reqwest::Request::new(
            reqwest::Method::GET,
            "https://api.pinterest.com/v5/ad_accounts/".parse().unwrap(),
        )
    }

    struct RecordingMiddleware {
        label: &'static str,
        seen: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Middleware for RecordingMiddleware {
        fn handle<'a>(
            &'a self,
            mut request: reqwest::Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, Result<reqwest::Response, Error>> {
            Box::pin(async move {
                self.seen.lock().unwrap().push(self.label);
                request
                    .headers_mut()
                    .insert("x-seen-by", self.label.parse().unwrap());
                next.run(request).await
            })
        }
    }

    #[tokio::test]
    async fn test_empty_middleware_chain() {
        let middlewares: Vec<Box<dyn Middleware>> = vec![];
        let handler = |_req: reqwest::Request| -> BoxFuture<'_, Result<reqwest::Response, Error>> {
            Box::pin(async { Ok(ok_response()) })
        };

        let resp = execute_middleware_chain(&middlewares, get_request(), handler)
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn test_middlewares_run_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let middlewares: Vec<Box<dyn Middleware>> = vec![
            Box::new(RecordingMiddleware {
                label: "outer",
                seen: seen.clone(),
            }),
            Box::new(RecordingMiddleware {
                label: "inner",
                seen: seen.clone(),
            }),
        ];

        let handler = |req: reqwest::Request| -> BoxFuture<'_, Result<reqwest::Response, Error>> {
            Box::pin(async move {
                // The innermost middleware writes last
                assert_eq!(req.headers().get("x-seen-by").unwrap(), "inner");
                Ok(ok_response())
            })
        };

        let resp = execute_middleware_chain(&middlewares, get_request(), handler)
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(*seen.lock().unwrap(), vec!["outer", "inner"]);
    }
}
