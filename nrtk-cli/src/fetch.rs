//! Feed retrieval. The bytes are returned untouched: the fingerprint covers
//! them verbatim.

use std::io::Read;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use nrtk_core::FeedSource;

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(2);

/// Read the raw feed from `source`.
pub fn fetch(source: &FeedSource) -> Result<Vec<u8>> {
    match source {
        FeedSource::Remote { url, token } => fetch_remote(url, token.as_deref()),
        FeedSource::Local { path } => {
            tracing::debug!(path = %path.display(), "reading local feed");
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
        }
    }
}

fn fetch_remote(url: &str, token: Option<&str>) -> Result<Vec<u8>> {
    let agent = ureq::AgentBuilder::new()
        .timeout(FETCH_TIMEOUT)
        .user_agent(&format!("nrtk-sync/{}", env!("CARGO_PKG_VERSION")))
        .build();

    let mut request = agent.get(url);
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        request = request.set("Authorization", &format!("Token {token}"));
    }

    tracing::debug!(%url, "fetching feed");
    let response = match request.call() {
        Ok(response) => response,
        Err(ureq::Error::Status(code, _)) => bail!("{url} answered HTTP {code}"),
        Err(err) => return Err(err).with_context(|| format!("failed to fetch {url}")),
    };
    if response.status() != 200 {
        bail!("{url} answered HTTP {}", response.status());
    }

    let mut body = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut body)
        .with_context(|| format!("failed to read response body from {url}"))?;
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    use tempfile::TempDir;

    /// Serve one canned response; the request head is sent back on the channel.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/feed", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }
            let mut stream = stream;
            write!(
                stream,
                "{status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            tx.send(head).unwrap();
        });
        (url, rx)
    }

    #[test]
    fn remote_fetch_sends_token_and_user_agent() {
        let (url, rx) = serve_once("HTTP/1.1 200 OK", "{\"stories\":[]}");
        let source = FeedSource::Remote {
            url,
            token: Some("s3cret".into()),
        };

        let body = fetch(&source).unwrap();
        assert_eq!(body, b"{\"stories\":[]}");

        let head = rx.recv().unwrap().to_ascii_lowercase();
        assert!(head.starts_with("get /feed "));
        assert!(head.contains("authorization: token s3cret"));
        assert!(head.contains("user-agent: nrtk-sync/"));
    }

    #[test]
    fn non_ok_status_is_an_error() {
        let (url, _rx) = serve_once("HTTP/1.1 503 Service Unavailable", "down");
        let err = fetch(&FeedSource::Remote { url, token: None }).unwrap_err();
        assert!(err.to_string().contains("503"), "{err}");
    }

    #[test]
    fn local_fetch_returns_bytes_verbatim() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("local.json");
        std::fs::write(&path, b"{ \"stories\": [] }\n").unwrap();
        let body = fetch(&FeedSource::Local { path }).unwrap();
        assert_eq!(body, b"{ \"stories\": [] }\n");
    }

    #[test]
    fn missing_local_file_names_the_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("absent.json");
        let err = fetch(&FeedSource::Local { path }).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }
}
