//! In-process axum server for probe tests. Routes can be added after start; unknown paths get 404.

#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{Method, Response, Uri, header};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// How the body leaves the server.
#[derive(Clone, Debug)]
pub enum Delivery {
    /// Whole body at once.
    Full,
    /// Nothing at all, not even headers, for this long.
    Hang(Duration),
    /// Headers and the first `n` body bytes, then a pause, then the rest.
    Stall(usize, Duration),
    /// Headers and the body, then one padding byte per interval, never ending.
    Trickle(Duration),
}

/// Canned response for a path.
#[derive(Clone, Debug)]
pub struct Reply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub delivery: Delivery,
}

impl Reply {
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: content_type.map(str::to_string),
            body: body.into(),
            delivery: Delivery::Full,
        }
    }

    pub fn status(status: u16) -> Self {
        Self::new(status, None, Vec::new())
    }

    pub fn media(content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, Some(content_type), body)
    }

    pub fn playlist(body: &str) -> Self {
        Self::new(200, Some("application/vnd.apple.mpegurl"), body)
    }

    pub fn hanging(d: Duration) -> Self {
        Self::status(200).delivered(Delivery::Hang(d))
    }

    pub fn stalling(
        content_type: &str,
        body: impl Into<Vec<u8>>,
        sent: usize,
        d: Duration,
    ) -> Self {
        Self::media(content_type, body).delivered(Delivery::Stall(sent, d))
    }

    pub fn trickling(content_type: &str, head: impl Into<Vec<u8>>, every: Duration) -> Self {
        Self::media(content_type, head).delivered(Delivery::Trickle(every))
    }

    pub fn delivered(mut self, delivery: Delivery) -> Self {
        self.delivery = delivery;
        self
    }
}

type Routes = Arc<Mutex<HashMap<(Method, String), Reply>>>;

pub struct TestServer {
    base: String,
    routes: Routes,
}

impl TestServer {
    /// Bind on an ephemeral port and serve from a tokio runtime on a background thread.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let routes: Routes = Arc::default();
        let app = Router::new()
            .fallback(serve_route)
            .with_state(Arc::clone(&routes));

        thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });
        Self { base, routes }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Serve `reply` for GET and HEAD on `path` (HEAD responses carry no body).
    pub fn route(&self, path: &str, reply: Reply) -> String {
        let mut routes = self.routes.lock().unwrap();
        routes.insert((Method::GET, path.into()), reply.clone());
        routes.insert((Method::HEAD, path.into()), reply);
        self.url(path)
    }

    /// Override the HEAD reply for `path`.
    pub fn head_route(&self, path: &str, reply: Reply) -> String {
        self.routes
            .lock()
            .unwrap()
            .insert((Method::HEAD, path.into()), reply);
        self.url(path)
    }
}

async fn serve_route(State(routes): State<Routes>, method: Method, uri: Uri) -> Response<Body> {
    let found = routes
        .lock()
        .unwrap()
        .get(&(method, uri.path().to_string()))
        .cloned();
    let Reply {
        status,
        content_type,
        body,
        delivery,
    } = found.unwrap_or_else(|| Reply::status(404));

    let body = match delivery {
        Delivery::Full => Body::from(body),
        Delivery::Hang(d) => {
            tokio::time::sleep(d).await;
            Body::from(body)
        }
        Delivery::Stall(sent, pause) => {
            let mut first = body;
            let rest = first.split_off(sent.min(first.len()));
            let head = stream::once(async move { Ok::<_, Infallible>(Bytes::from(first)) });
            let tail = stream::once(async move {
                tokio::time::sleep(pause).await;
                Ok::<_, Infallible>(Bytes::from(rest))
            });
            Body::from_stream(head.chain(tail))
        }
        Delivery::Trickle(every) => {
            let head = stream::once(async move { Ok::<_, Infallible>(Bytes::from(body)) });
            let drip = stream::unfold((), move |()| async move {
                tokio::time::sleep(every).await;
                Some((Ok::<_, Infallible>(Bytes::from_static(b" ")), ()))
            });
            Body::from_stream(head.chain(drip))
        }
    };

    let mut builder = Response::builder().status(status);
    if let Some(ct) = content_type {
        builder = builder.header(header::CONTENT_TYPE, ct);
    }
    builder.body(body).unwrap()
}

/// An address nothing listens on: connections are refused immediately.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/live.ts")
}
