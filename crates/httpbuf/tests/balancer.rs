//! A balancer peeks at the JSON request body to pick a shard, then forwards the same request.

use bytes::BytesMut;
use http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use micro_httpbuf::{BufBody, CallError, HttpBuf};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Mutex;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Payload {
    key: i64,
    data: String,
}

struct Shard {
    name: &'static str,
    handled: Mutex<Vec<String>>,
}

impl Shard {
    fn new(name: &'static str) -> Self {
        Self { name, handled: Mutex::new(Vec::new()) }
    }

    async fn serve(&self, request: Request<BufBody>) -> Response<BufBody> {
        let Ok(collected) = request.into_body().collect().await else {
            return error(StatusCode::INTERNAL_SERVER_ERROR, "server error");
        };
        let Ok(payload) = serde_json::from_slice::<Payload>(&collected.to_bytes()) else {
            return error(StatusCode::INTERNAL_SERVER_ERROR, "server error");
        };

        self.handled.lock().unwrap().push(format!("{} data is handled by {} shard", payload.data, self.name));
        Response::new(BufBody::from("OK"))
    }
}

struct Balancer {
    shards: Vec<Shard>,
}

impl Balancer {
    async fn serve(&self, mut request: Request<BufBody>) -> Response<BufBody> {
        let mut buf = BytesMut::new();
        if HttpBuf::new(&mut buf).read_request(&mut request).await.is_err() {
            return error(StatusCode::INTERNAL_SERVER_ERROR, "server error");
        }
        let Ok(payload) = serde_json::from_slice::<Payload>(&buf) else {
            return error(StatusCode::BAD_REQUEST, "bad request");
        };

        let shards = i64::try_from(self.shards.len()).unwrap();
        let shard = usize::try_from(payload.key.rem_euclid(shards)).unwrap();
        self.shards[shard].serve(request).await
    }

    async fn post(&self, body: Vec<u8>) -> Result<Response<BufBody>, Infallible> {
        let request = Request::post("/").header(http::header::CONTENT_TYPE, "application/json").body(BufBody::from(body)).unwrap();
        Ok(self.serve(request).await)
    }
}

fn error(status: StatusCode, message: &'static str) -> Response<BufBody> {
    Response::builder().status(status).body(BufBody::from(message)).unwrap()
}

fn balancer() -> Balancer {
    Balancer { shards: vec![Shard::new("even"), Shard::new("odd")] }
}

#[tokio::test]
async fn routes_by_key() {
    let balancer = balancer();
    let mut lines = Vec::new();

    for payload in [Payload { key: 7, data: "god".into() }, Payload { key: 666, data: "evil".into() }] {
        let mut buf = BytesMut::new();
        let result = balancer.post(serde_json::to_vec(&payload).unwrap()).await.map_err(CallError::request);
        let response = HttpBuf::new(&mut buf).read_call(result).await.unwrap();
        lines.push(format!("{} - {}", response.status().as_u16(), String::from_utf8_lossy(&buf)));
    }

    assert_eq!(lines, ["200 - OK", "200 - OK"]);
    assert_eq!(*balancer.shards[1].handled.lock().unwrap(), ["god data is handled by odd shard"]);
    assert_eq!(*balancer.shards[0].handled.lock().unwrap(), ["evil data is handled by even shard"]);
}

#[tokio::test]
async fn captured_json_is_decoded_downstream() {
    let json = br#"{"key":7,"data":"god"}"#;
    let mut request = Request::post("/").body(BufBody::from(json.to_vec())).unwrap();

    let mut buf = BytesMut::new();
    HttpBuf::new(&mut buf).read_request(&mut request).await.unwrap();
    assert_eq!(buf.len(), 22);
    assert_eq!(&buf[..], json);

    let body = request.into_body().collect().await.unwrap().to_bytes();
    let payload: Payload = serde_json::from_slice(&body).unwrap();
    assert_eq!(payload, Payload { key: 7, data: "god".into() });
}

#[tokio::test]
async fn rejects_malformed_json() {
    let balancer = balancer();

    let mut buf = BytesMut::new();
    let result = balancer.post(b"{not json".to_vec()).await.map_err(CallError::request);
    let response = HttpBuf::new(&mut buf).read_call(result).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(&buf[..], b"bad request");
    assert!(balancer.shards.iter().all(|shard| shard.handled.lock().unwrap().is_empty()));
}
