//! MIDI input via midir.
//!
//! Device discovery plus a single open connection. The driver callback
//! forwards raw messages over a channel; parsing and all state live in the
//! engine on the consumer side.

use clavitype_core::{Error, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use midir::{Ignore, MidiInput, MidiInputConnection};

/// A raw MIDI message as delivered by the driver callback.
#[derive(Debug, Clone, Copy)]
pub struct RawMessage {
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
    /// Driver timestamp in microseconds.
    pub timestamp_us: u64,
}

impl RawMessage {
    /// Split raw bytes into status and data. Short messages are padded with
    /// zeros; the engine decides what to do with them.
    fn from_bytes(bytes: &[u8], timestamp_us: u64) -> Option<Self> {
        let (&status, rest) = bytes.split_first()?;
        Some(Self {
            status,
            data1: rest.first().copied().unwrap_or(0),
            data2: rest.get(1).copied().unwrap_or(0),
            timestamp_us,
        })
    }
}

/// Information about an available MIDI input port
#[derive(Debug, Clone)]
pub struct PortInfo {
    pub index: usize,
    pub name: String,
}

/// MIDI input manager.
///
/// Holds the channel sender and keeps the active connection alive; dropping
/// the manager closes the port.
pub struct MidiSource {
    message_tx: Sender<RawMessage>,
    connection: Option<MidiInputConnection<()>>,
    port_name: Option<String>,
    client_name: String,
}

impl MidiSource {
    /// Create a new MIDI source and the receiving end of its message channel.
    pub fn new(client_name: &str) -> (Self, Receiver<RawMessage>) {
        let (tx, rx) = unbounded();
        (
            Self {
                message_tx: tx,
                connection: None,
                port_name: None,
                client_name: client_name.to_string(),
            },
            rx,
        )
    }

    /// List available MIDI input ports.
    pub fn list_ports(client_name: &str) -> Result<Vec<PortInfo>> {
        let midi_in = probe(client_name)?;
        let ports = midi_in.ports();
        let mut infos = Vec::new();

        for (index, port) in ports.iter().enumerate() {
            let name = midi_in
                .port_name(port)
                .unwrap_or_else(|_| format!("Unknown Device {}", index));
            infos.push(PortInfo { index, name });
        }

        Ok(infos)
    }

    /// Open the port whose name contains `name` (case-insensitive).
    pub fn open_by_name(&mut self, name: &str) -> Result<String> {
        let needle = name.to_lowercase();
        let port = Self::list_ports(&self.client_name)?
            .into_iter()
            .find(|p| p.name.to_lowercase().contains(&needle))
            .ok_or_else(|| Error::Midi(format!("no MIDI input port matching '{}'", name)))?;

        self.open_by_index(port.index)
    }

    /// Open the first available port.
    pub fn open_first(&mut self) -> Result<String> {
        let ports = Self::list_ports(&self.client_name)?;
        let first = ports
            .first()
            .ok_or_else(|| Error::Midi("no MIDI input ports available".to_string()))?;

        self.open_by_index(first.index)
    }

    /// Open a port by index.
    pub fn open_by_index(&mut self, index: usize) -> Result<String> {
        self.close();

        let midi_in = probe(&self.client_name)?;
        let ports = midi_in.ports();
        let port = ports
            .get(index)
            .ok_or_else(|| Error::Midi(format!("invalid MIDI port index: {}", index)))?;

        let name = midi_in
            .port_name(port)
            .unwrap_or_else(|_| format!("Unknown Device {}", index));

        let tx = self.message_tx.clone();
        let connection = midi_in
            .connect(
                port,
                "clavitype-input",
                move |timestamp, bytes, _| {
                    log::trace!("raw midi t={} bytes={:?}", timestamp, bytes);
                    if let Some(msg) = RawMessage::from_bytes(bytes, timestamp) {
                        let _ = tx.send(msg);
                    }
                },
                (),
            )
            .map_err(|e| Error::Midi(format!("failed to connect to MIDI device: {}", e)))?;

        self.connection = Some(connection);
        self.port_name = Some(name.clone());
        log::info!("connected to MIDI input: {}", name);

        Ok(name)
    }

    /// Name of the connected port, if any.
    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    /// Close the connection. Safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close();
        }
        self.port_name = None;
    }
}

impl Drop for MidiSource {
    fn drop(&mut self) {
        self.close();
    }
}

/// Create a MIDI input handle with sysex, timing and active sensing ignored.
fn probe(client_name: &str) -> Result<MidiInput> {
    let mut midi_in = MidiInput::new(client_name)
        .map_err(|e| Error::Midi(format!("failed to create MIDI input: {}", e)))?;
    midi_in.ignore(Ignore::All);
    Ok(midi_in)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_message_from_bytes() {
        let msg = RawMessage::from_bytes(&[0x90, 60, 100], 7).unwrap();
        assert_eq!(msg.status, 0x90);
        assert_eq!(msg.data1, 60);
        assert_eq!(msg.data2, 100);
        assert_eq!(msg.timestamp_us, 7);
    }

    #[test]
    fn test_short_messages_are_zero_padded() {
        let msg = RawMessage::from_bytes(&[0xC0, 5], 0).unwrap();
        assert_eq!(msg.data1, 5);
        assert_eq!(msg.data2, 0);

        let msg = RawMessage::from_bytes(&[0xF8], 0).unwrap();
        assert_eq!(msg.data1, 0);
        assert_eq!(msg.data2, 0);
    }

    #[test]
    fn test_empty_message_returns_none() {
        assert!(RawMessage::from_bytes(&[], 0).is_none());
    }
}
