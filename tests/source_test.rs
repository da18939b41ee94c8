use std::path::PathBuf;

use rs_scrapy::{FileSource, ScrapyBuilder, Source};
use tempfile::TempDir;

/// Writes `contents` to `name` inside a fresh directory removed on drop.
fn temp_file(name: &str, contents: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir should create");
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("temp file is writable");
    (dir, path)
}

#[test]
fn file_source_reads_utf8_file() {
    let (_dir, path) = temp_file("utf8.html", "<h1>Caf\u{e9} M\u{fc}nchen</h1>".as_bytes());

    let source = FileSource::new(&path);
    let html = source.read().expect("file exists");
    assert_eq!(html, "<h1>Café München</h1>");
    assert_eq!(source.path(), path.as_path());
    assert_eq!(source.locator(), path.display().to_string());
}

#[test]
fn file_source_decodes_declared_charset() {
    let (_dir, path) = temp_file(
        "latin1.html",
        b"<html><head><meta charset=\"ISO-8859-1\"></head><body><p>Caf\xE9</p></body></html>",
    );

    let html = FileSource::new(&path).read().expect("file exists");
    assert!(html.contains("Café"));
}

#[test]
fn file_source_feeds_the_pipeline() {
    let (_dir, path) = temp_file("pipeline.html", b"<div><h1>From disk</h1></div>");

    let mut scrapy = ScrapyBuilder::make()
        .file(&path)
        .function(|crawly, mut output, _| {
            output.insert("title".into(), crawly.filter("h1").string().into());
            Ok(output)
        })
        .build();

    let output = scrapy.scrape().expect("file exists");
    assert_eq!(output["title"], "From disk");
}

#[cfg(feature = "http")]
mod url {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    use rs_scrapy::agents::{GoogleAgent, UserAgent, GOOGLEBOT};
    use rs_scrapy::{Error, ScrapyBuilder, Source, UrlSource};

    /// Serves one request with `status` and `body`, sending back the raw
    /// request head through the returned channel.
    fn serve_once(status: &'static str, content_type: &'static str, body: &'static [u8]) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind local port");
        let address = listener.local_addr().expect("bound address");
        let (sender, receiver) = mpsc::channel();

        thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut head = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(response.as_bytes()).ok();
            stream.write_all(body).ok();
            stream.flush().ok();
            sender.send(head).ok();
        });

        (format!("http://{address}/page"), receiver)
    }

    #[test]
    fn url_source_fetches_and_decodes_body() {
        let (url, _) = serve_once(
            "200 OK",
            "text/html; charset=windows-1252",
            b"<p>\x93quoted\x94</p>",
        );

        let html = UrlSource::new(url).read().expect("server responds");
        assert_eq!(html, "<p>\u{201c}quoted\u{201d}</p>");
    }

    #[test]
    fn agent_sends_its_user_agent() {
        let (url, request) = serve_once("200 OK", "text/html", b"<h1>Crawled</h1>");

        let html = GoogleAgent.source(&url).read().expect("server responds");
        assert_eq!(html, "<h1>Crawled</h1>");

        let head = request.recv().expect("request captured").to_lowercase();
        assert!(head.starts_with("get /page"));
        assert!(head.contains(&format!("user-agent: {}", GOOGLEBOT.to_lowercase())));
    }

    #[test]
    fn http_error_status_becomes_the_code() {
        let (url, _) = serve_once("404 Not Found", "text/html", b"gone");

        match UrlSource::new(&url).read() {
            Err(Error::SourceUnavailable { locator, code, .. }) => {
                assert_eq!(locator, url);
                assert_eq!(code, 404);
            }
            other => panic!("expected SourceUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn server_error_aborts_the_pipeline() {
        let (url, _) = serve_once("500 Internal Server Error", "text/html", b"oops");

        let mut scrapy = ScrapyBuilder::make()
            .agent(GoogleAgent)
            .url(url)
            .function(|_, _, _| panic!("no parser runs when the source fails"))
            .build();

        let err = scrapy.scrape().expect_err("server error");
        assert_eq!(err.code(), 500);
    }

    #[test]
    fn unreachable_host_is_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind local port");
        let address = listener.local_addr().expect("bound address");
        drop(listener);

        let err = UrlSource::new(format!("http://{address}/"))
            .read()
            .expect_err("nothing listens");
        assert!(matches!(err, Error::SourceUnavailable { code: 503, .. }));
    }
}
