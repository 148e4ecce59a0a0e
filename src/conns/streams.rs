use std::sync::Arc;
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use crate::config::WireConfig;
use crate::conns::{framing, ConnError, MessageHeader, HEADER_SIZE};
use crate::logging::Logger;
use crate::messages::{Message, MessageRegistry, DEFAULT_REGISTRY};

#[async_trait]
pub trait StreamReader : Send + Sync {
    async fn read_exact(&mut self, buffer: &mut [u8]) -> Result<usize, ConnError>;
}

pub struct TcpReader {
    pub inner_reader: OwnedReadHalf
}

impl TcpReader {
    pub fn from_owned_read_half(reader: OwnedReadHalf) -> Self {
        TcpReader {
            inner_reader: reader
        }
    }
}

#[async_trait]
impl StreamReader for TcpReader {
    async fn read_exact(&mut self, buffer: &mut [u8]) -> Result<usize, ConnError> {
        self.inner_reader.read_exact(buffer).await.map_err(ConnError::IO)
    }
}

#[async_trait]
pub trait StreamWriter : Send + Sync {
    async fn write_all(&mut self, data: &[u8]) -> Result<(), ConnError>;
}

pub struct TcpWriter {
    pub inner_writer: OwnedWriteHalf
}

impl TcpWriter {
    pub fn from_owned_write_half(writer: OwnedWriteHalf) -> Self {
        TcpWriter {
            inner_writer: writer
        }
    }
}

#[async_trait]
impl StreamWriter for TcpWriter {
    async fn write_all(&mut self, data: &[u8]) -> Result<(), ConnError> {
        self.inner_writer.write_all(data).await.map_err(ConnError::IO)
    }
}

/// Reads and writes whole framed messages over a pair of stream halves.
///
/// A frame is buffered completely before decoding, so the message codec
/// itself stays synchronous. After any read error the stream position is
/// unknown and the `MessageStream` should be dropped.
pub struct MessageStream {
    reader: Box<dyn StreamReader>,
    writer: Box<dyn StreamWriter>,
    config: Arc<WireConfig>,
    registry: Arc<MessageRegistry>,
    logger: Arc<dyn Logger>
}

impl MessageStream {
    pub fn new(reader: Box<dyn StreamReader>,
               writer: Box<dyn StreamWriter>,
               config: Arc<WireConfig>,
               logger: Arc<dyn Logger>) -> Self {
        MessageStream {
            reader,
            writer,
            config,
            registry: Arc::clone(&*DEFAULT_REGISTRY),
            logger
        }
    }

    pub fn from_tcp(stream: TcpStream, config: Arc<WireConfig>, logger: Arc<dyn Logger>) -> Self {
        let (reader, writer) = stream.into_split();
        Self::new(Box::new(TcpReader::from_owned_read_half(reader)),
                  Box::new(TcpWriter::from_owned_write_half(writer)),
                  config,
                  logger)
    }

    /// Replaces the default registry, e.g. to accept commands registered by the caller.
    pub fn with_registry(mut self, registry: Arc<MessageRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub async fn write_message(&mut self, msg: &dyn Message) -> Result<usize, ConnError> {
        let frame = framing::frame_message(msg, self.config.protocol_version,
                                           self.config.network_magic)?;
        self.writer.write_all(&frame).await?;
        Ok(frame.len())
    }

    pub async fn read_message(&mut self) -> Result<Box<dyn Message>, ConnError> {
        let result = self.read_frame().await;
        if let Err(err) = &result {
            if is_rejection(err) {
                self.logger.log(format!("Rejected incoming frame: {}", err));
            }
        }
        result
    }

    async fn read_frame(&mut self) -> Result<Box<dyn Message>, ConnError> {
        let mut header_bytes = [0u8; HEADER_SIZE];
        self.reader.read_exact(&mut header_bytes).await?;
        let header = MessageHeader::from_bytes(&header_bytes)?;

        let pver = self.config.protocol_version;
        let msg = framing::check_header(&header, pver, self.config.network_magic,
                                        self.config.payload_ceiling(), &self.registry)?;

        let mut payload = vec![0u8; header.length as usize];
        self.reader.read_exact(&mut payload).await?;
        framing::decode_payload(&header, msg, &payload, pver)
    }
}

fn is_rejection(err: &ConnError) -> bool {
    !matches!(err, ConnError::IO(_) | ConnError::ReadError(_) | ConnError::WriteError(_))
}

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;
    use std::sync::Mutex;
    use tokio::net::TcpListener;
    use super::*;
    use crate::config::TEST_NET_MAGIC;
    use crate::crypto::sha256;
    use crate::messages::{AckType, MsgAcknowledgement};

    #[derive(Default)]
    struct RecordingLogger {
        entries: Mutex<Vec<String>>
    }

    impl Logger for RecordingLogger {
        fn log(&self, message: String) {
            self.entries.lock().unwrap().push(message);
        }
    }

    async fn tcp_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = tokio::spawn(async move { TcpStream::connect(addr).await.unwrap() });
        let (server, _) = listener.accept().await.unwrap();
        (server, client.await.unwrap())
    }

    #[tokio::test]
    async fn acknowledgement_crosses_a_tcp_connection() {
        let (server, client) = tcp_pair().await;
        let config = Arc::new(WireConfig::default());
        let logger = Arc::new(RecordingLogger::default());
        let mut sender = MessageStream::from_tcp(client, config.clone(), logger.clone());
        let mut receiver = MessageStream::from_tcp(server, config, logger.clone());

        let mut ack = MsgAcknowledgement::new(
            100, 3, sha256(b"x"), AckType::EndMinute2 as u8);
        ack.signature = [0x7F; 64];
        let written = sender.write_message(&ack).await.unwrap();
        let msg = receiver.read_message().await.unwrap();

        assert_eq!(written, HEADER_SIZE + 172);
        let decoded = msg.as_any().downcast_ref::<MsgAcknowledgement>().unwrap();
        assert_eq!(decoded.height, 100);
        assert_eq!(decoded.index, 3);
        assert_eq!(decoded.affirmation, sha256(b"x"));
        assert_eq!(decoded.signature, [0x7F; 64]);
        assert!(logger.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn frame_from_other_network_is_rejected_and_logged() {
        let (server, client) = tcp_pair().await;
        let logger = Arc::new(RecordingLogger::default());
        let mut sender = MessageStream::from_tcp(
            client, Arc::new(WireConfig::for_test_net()), logger.clone());
        let mut receiver = MessageStream::from_tcp(
            server, Arc::new(WireConfig::default()), logger.clone());

        sender.write_message(&MsgAcknowledgement::default()).await.unwrap();
        let result = receiver.read_message().await;

        assert!(matches!(result, Err(ConnError::WrongNetwork { actual: TEST_NET_MAGIC, .. })));
        let entries = logger.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].starts_with("Rejected incoming frame"));
    }

    #[tokio::test]
    async fn closed_connection_returns_io_error_without_logging() {
        let (server, client) = tcp_pair().await;
        let logger = Arc::new(RecordingLogger::default());
        let mut receiver = MessageStream::from_tcp(
            server, Arc::new(WireConfig::default()), logger.clone());
        drop(client);

        let result = receiver.read_message().await;

        assert!(matches!(result, Err(ConnError::IO(_))));
        assert!(logger.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn write_after_shutdown_keeps_the_io_error_kind() {
        let (_server, client) = tcp_pair().await;
        let (_reader, mut writer) = client.into_split();
        writer.shutdown().await.unwrap();
        let mut writer = TcpWriter::from_owned_write_half(writer);

        let result = writer.write_all(b"x").await;

        assert!(matches!(result, Err(ConnError::IO(ref e)) if e.kind() == ErrorKind::BrokenPipe));
    }

    #[tokio::test]
    async fn write_message_on_shut_down_stream_returns_io_error() {
        let (_server, client) = tcp_pair().await;
        let (reader, mut writer) = client.into_split();
        writer.shutdown().await.unwrap();
        let mut sender = MessageStream::new(
            Box::new(TcpReader::from_owned_read_half(reader)),
            Box::new(TcpWriter::from_owned_write_half(writer)),
            Arc::new(WireConfig::default()),
            Arc::new(RecordingLogger::default()));

        let result = sender.write_message(&MsgAcknowledgement::default()).await;

        assert!(matches!(result, Err(ConnError::IO(ref e)) if e.kind() == ErrorKind::BrokenPipe));
    }

    #[tokio::test]
    async fn custom_registry_without_acknowledgements_rejects_them() {
        let (server, client) = tcp_pair().await;
        let logger = Arc::new(RecordingLogger::default());
        let config = Arc::new(WireConfig::default());
        let mut sender = MessageStream::from_tcp(client, config.clone(), logger.clone());
        let mut receiver = MessageStream::from_tcp(server, config, logger.clone())
            .with_registry(Arc::new(MessageRegistry::new()));

        sender.write_message(&MsgAcknowledgement::default()).await.unwrap();
        let result = receiver.read_message().await;

        assert!(matches!(result, Err(ConnError::UnknownCommand(cmd)) if cmd == "ack"));
        assert_eq!(logger.entries.lock().unwrap().len(), 1);
    }
}
