//! thor - hammers an HTTP server with concurrent GET requests and reports
//! average response times.

use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use url::Url;

#[derive(Debug, Parser)]
#[command(name = "thor", version, about = "Concurrent HTTP load tester")]
struct Args {
    /// Number of concurrent clients
    #[arg(short = 'p', long = "processes", default_value_t = 1)]
    processes: usize,

    /// Number of requests per client
    #[arg(short = 'r', long = "requests", default_value_t = 1)]
    requests: usize,

    /// Print the body of successful responses
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Target URL (http only)
    url: Url,
}

struct Reply {
    status: u16,
    body: Vec<u8>,
}

/// Sends one HTTP/1.0 GET and reads the response until the server closes.
async fn fetch(url: &Url) -> Result<Reply> {
    if url.scheme() != "http" {
        bail!("unsupported scheme {}", url.scheme());
    }
    let host = url.host_str().context("URL missing host")?;
    let port = url.port_or_known_default().unwrap_or(80);

    let mut target = url.path().to_string();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }

    let mut stream = TcpStream::connect((host, port))
        .await
        .with_context(|| format!("failed to connect to {host}:{port}"))?;
    let request = format!("GET {target} HTTP/1.0\r\nHost: {host}\r\nUser-Agent: thor\r\n\r\n");
    stream.write_all(request.as_bytes()).await?;

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await?;

    parse_reply(&raw)
}

fn parse_reply(raw: &[u8]) -> Result<Reply> {
    let line_end = raw
        .iter()
        .position(|&b| b == b'\n')
        .unwrap_or(raw.len());
    let status_line = std::str::from_utf8(&raw[..line_end]).context("invalid status line")?;
    let status = status_line
        .split(' ')
        .nth(1)
        .and_then(|code| code.trim().parse().ok())
        .context("missing status code")?;

    let body = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| raw[pos + 4..].to_vec())
        .unwrap_or_default();

    Ok(Reply { status, body })
}

/// Runs `requests` sequential requests and returns the average elapsed time.
async fn hammer(id: usize, url: Url, requests: usize, verbose: bool) -> Duration {
    let mut total = Duration::ZERO;

    for count in 0..requests {
        let start = Instant::now();
        let result = fetch(&url).await;
        let elapsed = start.elapsed();
        total += elapsed;

        match result {
            Ok(reply) => {
                if reply.status == 200 && verbose {
                    println!("{}", String::from_utf8_lossy(&reply.body));
                }
                println!(
                    "Process: {id}, Request: {count}, Status: {}, Elapsed Time: {:.6}",
                    reply.status,
                    elapsed.as_secs_f64()
                );
            }
            Err(e) => {
                eprintln!("Process: {id}, Request: {count}, Error: {e:#}");
            }
        }
    }

    let average = total / requests.max(1) as u32;
    println!("Process: {id}, AVERAGE, Elapsed Time: {:.6}", average.as_secs_f64());
    average
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if args.processes == 0 || args.requests == 0 {
        bail!("processes and requests must be at least 1");
    }

    let workers: Vec<_> = (0..args.processes)
        .map(|id| tokio::spawn(hammer(id, args.url.clone(), args.requests, args.verbose)))
        .collect();

    let mut total = Duration::ZERO;
    for worker in workers {
        total += worker.await.context("client task failed")?;
    }

    let average = total / args.processes as u32;
    println!("TOTAL AVERAGE ELAPSED TIME: {:.6}", average.as_secs_f64());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_and_body() {
        let reply =
            parse_reply(b"HTTP/1.0 200 OK\r\nContent-Type: text/plain\r\n\r\nhello").unwrap();

        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, b"hello");
    }

    #[test]
    fn rejects_garbage_status_line() {
        assert!(parse_reply(b"nonsense").is_err());
    }
}
