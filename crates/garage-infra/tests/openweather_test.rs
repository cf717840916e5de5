//! Forecast client against a local one-shot HTTP server

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use garage_domain::repository::ForecastProvider;
use garage_infra::OpenWeatherClient;
use garage_types::{Error, LookupError};

/// Serve one response and hand back the request line that was received
fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/data/2.5/forecast", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
        }
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        request_line
    });

    (url, handle)
}

#[tokio::test]
async fn test_fetch_forecast_sends_query_and_parses() {
    let body = r#"{
        "list": [
            {"dt": 1717243200, "main": {"temp": 22.5}, "weather": [{"icon": "01d", "description": "céu limpo"}]}
        ],
        "city": {"name": "Curitiba", "timezone": -10800}
    }"#;
    let (url, server) = serve_once("200 OK", body);

    let client = OpenWeatherClient::new("secret", "pt_br").unwrap().with_base_url(url);
    let series = client.fetch_forecast("curitiba").await.unwrap();

    assert_eq!(series.city, "Curitiba");
    assert_eq!(series.samples.len(), 1);
    assert_eq!(
        series.samples[0].timestamp.unwrap().to_string(),
        "2024-06-01 09:00:00"
    );

    let request = server.join().unwrap();
    assert!(request.starts_with("GET /data/2.5/forecast?"));
    assert!(request.contains("q=curitiba"));
    assert!(request.contains("appid=secret"));
    assert!(request.contains("units=metric"));
    assert!(request.contains("lang=pt_br"));
}

#[tokio::test]
async fn test_error_status_carries_provider_message() {
    let (url, server) = serve_once(
        "404 Not Found",
        r#"{"cod": "404", "message": "city not found"}"#,
    );

    let client = OpenWeatherClient::new("secret", "pt_br").unwrap().with_base_url(url);
    let err = client.fetch_forecast("Atlantis").await.unwrap_err();
    server.join().unwrap();

    match err {
        Error::Lookup(LookupError::Status { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "city not found");
        }
        other => panic!("unexpected error: {}", other),
    }
}
