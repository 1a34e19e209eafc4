use std::io::{BufWriter, Write};
use std::net::TcpStream;
use std::time::Duration;

use gaze_wire::FrameHeader;
use parking_lot::Mutex;

use crate::transmit::error::Result;
use crate::transmit::transport::{GazePayload, Transport};

const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Streams framed payloads to a TCP peer.
///
/// Connects on first use. Any error drops the connection so the next send
/// reconnects.
pub struct TcpTransport {
    addr: String,
    stream: Mutex<Option<TcpStream>>,
}

impl TcpTransport {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            stream: Mutex::new(None),
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn is_connected(&self) -> bool {
        self.stream.lock().is_some()
    }

    fn connect(&self) -> Result<TcpStream> {
        let stream = TcpStream::connect(&self.addr)?;
        stream.set_nodelay(true)?;
        stream.set_write_timeout(Some(WRITE_TIMEOUT))?;
        tracing::info!("connected to {}", self.addr);
        Ok(stream)
    }
}

impl Transport for TcpTransport {
    fn send(&self, payload: &GazePayload) -> Result<()> {
        let mut slot = self.stream.lock();
        let stream = match slot.take() {
            Some(stream) => stream,
            None => self.connect()?,
        };

        let header = FrameHeader::for_rgb(
            payload.width(),
            payload.height(),
            payload.point.x,
            payload.point.y,
        );
        let mut writer = BufWriter::new(&stream);
        let result: Result<()> = gaze_wire::write_frame(&mut writer, &header, payload.image.as_raw())
            .map_err(Into::into)
            .and_then(|()| writer.flush().map_err(Into::into));
        drop(writer);

        match result {
            Ok(()) => {
                *slot = Some(stream);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("send to {} failed, dropping connection: {e}", self.addr);
                Err(e)
            }
        }
    }
}
