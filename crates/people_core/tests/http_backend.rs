use chrono::NaiveDate;
use people_core::{
    DirectoryStore, FixedClock, HttpPeopleBackend, NetworkError, PeopleBackend, PersonFields,
    PersonId, PersonPayload,
};
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use url::Url;

struct CapturedRequest {
    request_line: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl CapturedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body should be JSON")
    }
}

/// Serves exactly one request with the given status line and body.
fn serve_once(status: &'static str, body: &'static str) -> (Url, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let captured = read_request(&stream);
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).expect("write response");
        stream.flush().expect("flush response");
        captured
    });
    let base = Url::parse(&format!("http://{addr}")).expect("base url");
    (base, handle)
}

fn read_request(stream: &TcpStream) -> CapturedRequest {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut request_line = String::new();
    reader.read_line(&mut request_line).expect("request line");

    let mut headers = Vec::new();
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).expect("header line");
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim().to_string();
            if name == "content-length" {
                content_length = value.parse().expect("numeric content-length");
            }
            headers.push((name, value));
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).expect("request body");
    CapturedRequest {
        request_line: request_line.trim_end().to_string(),
        headers,
        body: String::from_utf8(body).expect("utf-8 body"),
    }
}

fn backend(base: &Url) -> HttpPeopleBackend {
    HttpPeopleBackend::with_timeout(base, Duration::from_secs(5)).expect("backend")
}

fn fields() -> PersonFields {
    PersonFields::new("Anna", "Lee", NaiveDate::from_ymd_opt(2000, 6, 15).unwrap())
}

#[test]
fn list_sends_one_based_page_and_decodes_records() {
    let (base, server) = serve_once(
        "200 OK",
        r#"[{"id":11,"firstName":"Anna","lastName":"Lee","dateOfBirth":"2000-06-15T00:00:00.000Z","age":24,"dateCreated":"2024-03-01T10:20:30.000Z"}]"#,
    );
    let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    let mut store = DirectoryStore::new(backend(&base), FixedClock(today));

    store.load_page(1, 25).unwrap();

    let request = server.join().unwrap();
    assert_eq!(request.request_line, "GET /api/people?page=2&limit=25 HTTP/1.1");
    assert_eq!(request.header("accept"), Some("application/json"));
    assert_eq!(store.records().len(), 1);
    assert_eq!(store.records()[0].id, PersonId::Number(11));
    assert_eq!(
        store.records()[0].date_of_birth,
        NaiveDate::from_ymd_opt(2000, 6, 15).unwrap()
    );
}

#[test]
fn create_posts_json_without_id_or_age() {
    let (base, server) = serve_once(
        "201 Created",
        r#"{"id":"abc","firstName":"Anna","lastName":"Lee","dateOfBirth":"2000-06-15"}"#,
    );

    let echoed = backend(&base)
        .create_person(&PersonPayload::for_create(&fields()))
        .unwrap();

    let request = server.join().unwrap();
    assert_eq!(request.request_line, "POST /api/people HTTP/1.1");
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(
        request.json(),
        json!({"firstName": "Anna", "lastName": "Lee", "dateOfBirth": "2000-06-15"})
    );
    assert_eq!(
        echoed.map(|record| record.id),
        Some(PersonId::Text("abc".to_string()))
    );
}

#[test]
fn update_puts_to_item_url_with_id_in_body() {
    let (base, server) = serve_once("200 OK", "");
    let id = PersonId::Number(7);

    let echoed = backend(&base)
        .update_person(&id, &PersonPayload::for_update(&id, &fields()))
        .unwrap();

    let request = server.join().unwrap();
    assert_eq!(request.request_line, "PUT /api/people/7 HTTP/1.1");
    assert_eq!(request.json()["id"], json!(7));
    assert!(request.json().get("age").is_none());
    assert_eq!(echoed, None);
}

#[test]
fn delete_targets_item_url() {
    let (base, server) = serve_once("204 No Content", "");

    backend(&base)
        .delete_person(&PersonId::Text("a-1".to_string()))
        .unwrap();

    let request = server.join().unwrap();
    assert_eq!(request.request_line, "DELETE /api/people/a-1 HTTP/1.1");
}

#[test]
fn error_status_is_reported_with_body() {
    let (base, server) = serve_once("500 Internal Server Error", r#"{"error":"kaput"}"#);

    let err = backend(&base).list_people(1, 10).unwrap_err();

    server.join().unwrap();
    assert_eq!(
        err,
        NetworkError::Status {
            code: 500,
            body: r#"{"error":"kaput"}"#.to_string(),
        }
    );
}

#[test]
fn malformed_list_body_is_a_decode_error() {
    let (base, server) = serve_once("200 OK", r#"{"items":[]}"#);

    let err = backend(&base).list_people(1, 10).unwrap_err();

    server.join().unwrap();
    assert!(matches!(err, NetworkError::Decode(_)));
}

#[test]
fn refused_connection_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    let base = Url::parse(&format!("http://{addr}")).unwrap();

    let err = backend(&base).list_people(1, 10).unwrap_err();

    assert!(matches!(err, NetworkError::Transport { .. }), "got {err:?}");
}
