//! Minimal Source RCON client
//!
//! Packets are `length | id | type | body \0 \0`, integers little-endian,
//! where `length` counts everything after itself. Minecraft answers a login
//! with an auth response carrying the request id, or `-1` on a bad password.
//! Responses longer than one packet (4096 bytes) are not reassembled.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::core::config::RconConfig;
use crate::core::error::{BbsError, Result};
use crate::export::remote::CommandSink;

const TYPE_RESPONSE: i32 = 0;
const TYPE_COMMAND: i32 = 2;
const TYPE_AUTH_RESPONSE: i32 = 2;
const TYPE_LOGIN: i32 = 3;

/// Largest packet a server may send (body plus header)
const MAX_PACKET: i32 = 4096 + 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    pub id: i32,
    pub kind: i32,
    pub body: String,
}

/// Full wire representation including the length prefix
pub fn encode_packet(id: i32, kind: i32, body: &str) -> Vec<u8> {
    let length = (4 + 4 + body.len() + 2) as i32;
    let mut buf = Vec::with_capacity(length as usize + 4);
    buf.extend_from_slice(&length.to_le_bytes());
    buf.extend_from_slice(&id.to_le_bytes());
    buf.extend_from_slice(&kind.to_le_bytes());
    buf.extend_from_slice(body.as_bytes());
    buf.extend_from_slice(&[0, 0]);
    buf
}

/// Decode a packet payload (everything after the length prefix)
pub fn decode_packet(payload: &[u8]) -> Result<Packet> {
    if payload.len() < 10 {
        return Err(invalid("RCON packet too short").into());
    }
    let id = i32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
    let kind = i32::from_le_bytes([payload[4], payload[5], payload[6], payload[7]]);
    let body = &payload[8..payload.len() - 2];
    let body = String::from_utf8_lossy(body).into_owned();
    Ok(Packet { id, kind, body })
}

fn invalid(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.to_string())
}

/// An authenticated RCON connection
pub struct RconClient {
    stream: TcpStream,
    next_id: i32,
    timeout: Duration,
}

impl RconClient {
    /// Connect and log in
    pub async fn connect(config: &RconConfig) -> Result<Self> {
        let limit = Duration::from_secs(config.timeout_secs);
        let addr = format!("{}:{}", config.host, config.port);
        let stream = timeout(limit, TcpStream::connect(&addr))
            .await
            .map_err(|_| timed_out(&format!("connecting to {}", addr)))??;

        let mut client = Self {
            stream,
            next_id: 1,
            timeout: limit,
        };
        client.login(&config.password).await?;
        tracing::info!(%addr, "RCON connected");
        Ok(client)
    }

    async fn login(&mut self, password: &str) -> Result<()> {
        let id = self.send(TYPE_LOGIN, password).await?;
        loop {
            let packet = self.read_packet().await?;
            if packet.kind != TYPE_AUTH_RESPONSE {
                continue;
            }
            if packet.id != id {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "RCON authentication failed (check rcon.password)",
                )
                .into());
            }
            return Ok(());
        }
    }

    /// Run one command and return the server's reply
    pub async fn command(&mut self, command: &str) -> Result<String> {
        let id = self.send(TYPE_COMMAND, command).await?;
        loop {
            let packet = self.read_packet().await?;
            if packet.id == id && packet.kind == TYPE_RESPONSE {
                return Ok(packet.body);
            }
            tracing::debug!(
                id = packet.id,
                kind = packet.kind,
                "skipping stray RCON packet"
            );
        }
    }

    async fn send(&mut self, kind: i32, body: &str) -> Result<i32> {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        let buf = encode_packet(id, kind, body);
        timeout(self.timeout, self.stream.write_all(&buf))
            .await
            .map_err(|_| timed_out("sending RCON packet"))??;
        Ok(id)
    }

    async fn read_packet(&mut self) -> Result<Packet> {
        timeout(self.timeout, self.read_packet_unbounded())
            .await
            .map_err(|_| timed_out("waiting for RCON response"))?
    }

    async fn read_packet_unbounded(&mut self) -> Result<Packet> {
        let length = self.stream.read_i32_le().await?;
        if !(10..=MAX_PACKET).contains(&length) {
            return Err(invalid("RCON packet length out of range").into());
        }
        let mut payload = vec![0u8; length as usize];
        self.stream.read_exact(&mut payload).await?;
        decode_packet(&payload)
    }
}

fn timed_out(what: &str) -> BbsError {
    io::Error::new(io::ErrorKind::TimedOut, format!("timed out {}", what)).into()
}

/// Command sink that connects on first use and reconnects after errors
pub struct RconSink {
    config: RconConfig,
    client: Option<RconClient>,
}

impl RconSink {
    pub fn new(config: RconConfig) -> Self {
        Self {
            config,
            client: None,
        }
    }
}

impl CommandSink for RconSink {
    async fn execute(&mut self, command: &str) -> Result<String> {
        let mut client = match self.client.take() {
            Some(client) => client,
            None => RconClient::connect(&self.config).await?,
        };
        let result = client.command(command).await;
        if result.is_ok() {
            self.client = Some(client);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_encode_layout() {
        let bytes = encode_packet(7, TYPE_COMMAND, "time set day");
        assert_eq!(&bytes[0..4], &(22i32).to_le_bytes());
        assert_eq!(&bytes[4..8], &7i32.to_le_bytes());
        assert_eq!(&bytes[8..12], &2i32.to_le_bytes());
        assert_eq!(&bytes[12..24], b"time set day");
        assert_eq!(&bytes[24..], &[0, 0]);
    }

    #[test]
    fn test_decode_payload() {
        let bytes = encode_packet(3, TYPE_RESPONSE, "Set the time to 1000");
        let packet = decode_packet(&bytes[4..]).unwrap();
        assert_eq!(packet.id, 3);
        assert_eq!(packet.kind, TYPE_RESPONSE);
        assert_eq!(packet.body, "Set the time to 1000");
        assert!(decode_packet(&[0, 1, 2]).is_err());
    }

    async fn read_request(stream: &mut TcpStream) -> Packet {
        let length = stream.read_i32_le().await.unwrap();
        let mut payload = vec![0u8; length as usize];
        stream.read_exact(&mut payload).await.unwrap();
        decode_packet(&payload).unwrap()
    }

    /// Server that accepts `password` and echoes commands back
    async fn fake_server(password: &'static str) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let login = read_request(&mut stream).await;
            let id = if login.body == password { login.id } else { -1 };
            stream
                .write_all(&encode_packet(id, TYPE_AUTH_RESPONSE, ""))
                .await
                .unwrap();
            loop {
                let Ok(length) = stream.read_i32_le().await else {
                    break;
                };
                let mut payload = vec![0u8; length as usize];
                stream.read_exact(&mut payload).await.unwrap();
                let request = decode_packet(&payload).unwrap();
                let reply = format!("ran: {}", request.body);
                stream
                    .write_all(&encode_packet(request.id, TYPE_RESPONSE, &reply))
                    .await
                    .unwrap();
            }
        });
        port
    }

    fn config(port: u16, password: &str) -> RconConfig {
        RconConfig {
            host: "127.0.0.1".into(),
            port,
            password: password.into(),
            ..RconConfig::default()
        }
    }

    #[tokio::test]
    async fn test_login_and_command() {
        let port = fake_server("hunter2").await;
        let mut client = RconClient::connect(&config(port, "hunter2")).await.unwrap();
        assert_eq!(client.command("time set day").await.unwrap(), "ran: time set day");
        assert_eq!(client.command("weather rain").await.unwrap(), "ran: weather rain");
    }

    #[tokio::test]
    async fn test_bad_password_is_rejected() {
        let port = fake_server("hunter2").await;
        let result = RconClient::connect(&config(port, "wrong")).await;
        assert!(matches!(result, Err(BbsError::IoError(_))));
    }

    #[tokio::test]
    async fn test_sink_connects_lazily() {
        let port = fake_server("pw").await;
        let mut sink = RconSink::new(config(port, "pw"));
        assert!(sink.client.is_none());
        assert_eq!(sink.execute("say hi").await.unwrap(), "ran: say hi");
        assert!(sink.client.is_some());
    }
}
