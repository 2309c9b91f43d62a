//! Routes JSON requests to one of two in-process shards by inspecting the request body.
//!
//! The balancer captures the body to read the routing key, then forwards the very same request;
//! the shard decodes the body again from the installed replay.

use bytes::BytesMut;
use http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use micro_httpbuf::{BufBody, CallError, HttpBuf};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Serialize, Deserialize)]
struct Payload {
    key: u64,
    data: String,
}

struct Shard {
    name: &'static str,
}

impl Shard {
    async fn serve(&self, request: Request<BufBody>) -> Response<BufBody> {
        let payload = match request.into_body().collect().await {
            Ok(collected) => serde_json::from_slice::<Payload>(&collected.to_bytes()),
            Err(e) => {
                error!(cause = %e, shard = self.name, "failed to read request body");
                return text(StatusCode::INTERNAL_SERVER_ERROR, "server error");
            }
        };

        match payload {
            Ok(payload) => {
                info!(shard = self.name, data = %payload.data, "{} data is handled by {} shard", payload.data, self.name);
                text(StatusCode::OK, "OK")
            }
            Err(e) => {
                error!(cause = %e, shard = self.name, "failed to decode request body");
                text(StatusCode::INTERNAL_SERVER_ERROR, "server error")
            }
        }
    }
}

struct Balancer {
    shards: Vec<Shard>,
}

impl Balancer {
    async fn serve(&self, mut request: Request<BufBody>) -> Response<BufBody> {
        let mut buf = BytesMut::new();
        if let Err(e) = HttpBuf::new(&mut buf).read_request(&mut request).await {
            error!(cause = %e, "failed to capture request body");
            return text(StatusCode::INTERNAL_SERVER_ERROR, "server error");
        }

        let payload: Payload = match serde_json::from_slice(&buf) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(cause = %e, "bad request body");
                return text(StatusCode::BAD_REQUEST, "bad request");
            }
        };

        // the shard count is never zero
        let shard = payload.key % self.shards.len() as u64;
        let shard = usize::try_from(shard).expect("shard index is below the shard count");
        self.shards[shard].serve(request).await
    }

    async fn post(&self, request: Request<BufBody>) -> Result<Response<BufBody>, Infallible> {
        Ok(self.serve(request).await)
    }
}

fn text(status: StatusCode, body: &'static str) -> Response<BufBody> {
    let mut response = Response::new(BufBody::from(body));
    *response.status_mut() = status;
    response
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let balancer = Balancer { shards: vec![Shard { name: "even" }, Shard { name: "odd" }] };

    for payload in [Payload { key: 7, data: "god".into() }, Payload { key: 666, data: "evil".into() }] {
        let json = serde_json::to_vec(&payload).expect("payload is serializable");
        let request = Request::post("/")
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(BufBody::from(json))
            .expect("request is valid");

        let mut buf = BytesMut::new();
        let result = balancer.post(request).await.map_err(CallError::request);
        let outcome = HttpBuf::new(&mut buf).read_call(result).await;
        match outcome {
            Ok(response) => println!("{} - {}", response.status().as_u16(), String::from_utf8_lossy(&buf)),
            Err(e) => {
                error!(cause = %e, "request failed");
                return;
            }
        }
    }
}
