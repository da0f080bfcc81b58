/*
 *  transport.rs
 *
 *  infocolumn - keeps the column talking
 *	(c) 2016-26 Information Column maintainers
 *
 *	Raw TCP delivery of control strings to the column controller
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
use log::{debug, info};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// The controller listens on the telnet port.
pub const CONTROLLER_PORT: u16 = 23;
/// The controller greets every connection before accepting commands.
pub const BANNER_SIZE: usize = 1024;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("could not connect to {host}: {source}")]
    Connect {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("timed out during {stage} with {host}")]
    Timeout { host: String, stage: &'static str },
    #[error("I/O error talking to {host}: {source}")]
    Io {
        host: String,
        #[source]
        source: std::io::Error,
    },
}

/// Opens one connection per frame: connect, drop the banner, write, close.
#[derive(Debug, Clone)]
pub struct TransportClient {
    port: u16,
    timeout: Duration,
}

impl Default for TransportClient {
    fn default() -> Self {
        Self::new(CONTROLLER_PORT, DEFAULT_TIMEOUT)
    }
}

impl TransportClient {
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Sends one control string to `host`. Every stage is bounded by the
    /// configured timeout.
    pub async fn send(&self, host: &str, frame: &[u8]) -> Result<(), TransportError> {
        info!("Connecting to {}:{}", host, self.port);

        let mut stream = timeout(self.timeout, TcpStream::connect((host, self.port)))
            .await
            .map_err(|_| self.timed_out(host, "connect"))?
            .map_err(|source| TransportError::Connect { host: host.to_string(), source })?;

        let mut banner = [0u8; BANNER_SIZE];
        let read = timeout(self.timeout, stream.read(&mut banner))
            .await
            .map_err(|_| self.timed_out(host, "banner read"))?
            .map_err(|source| self.io(host, source))?;
        debug!("Discarded {} byte banner: {}", read, banner[..read].escape_ascii());

        timeout(self.timeout, stream.write_all(frame))
            .await
            .map_err(|_| self.timed_out(host, "write"))?
            .map_err(|source| self.io(host, source))?;

        timeout(self.timeout, stream.shutdown())
            .await
            .map_err(|_| self.timed_out(host, "close"))?
            .map_err(|source| self.io(host, source))?;

        info!("Sent {} bytes to {}", frame.len(), host);
        Ok(())
    }

    fn timed_out(&self, host: &str, stage: &'static str) -> TransportError {
        TransportError::Timeout { host: host.to_string(), stage }
    }

    fn io(&self, host: &str, source: std::io::Error) -> TransportError {
        TransportError::Io { host: host.to_string(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_banner_is_skipped_and_frame_delivered() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let controller = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"*** mini controller ***\r\n").await.unwrap();
            let mut received = Vec::new();
            socket.read_to_end(&mut received).await.unwrap();
            received
        });

        let client = TransportClient::new(port, Duration::from_secs(2));
        client.send("127.0.0.1", b"\x01 \x1cframe\x16\r").await.unwrap();

        assert_eq!(controller.await.unwrap(), b"\x01 \x1cframe\x16\r".to_vec());
    }

    #[tokio::test]
    async fn test_refused_connection_is_reported() {
        // grab a free port, then close it again
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = TransportClient::new(port, Duration::from_secs(2));
        let err = client.send("127.0.0.1", b"x").await.unwrap_err();
        assert!(matches!(err, TransportError::Connect { .. }));
    }

    #[tokio::test]
    async fn test_silent_controller_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let _controller = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let client = TransportClient::new(port, Duration::from_millis(200));
        let err = client.send("127.0.0.1", b"x").await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout { stage: "banner read", .. }));
    }
}
