//! Child receipt decoding.
//!
//! A receipt is `[status, cumulativeGasUsed, logsBloom, logs]`, optionally
//! prefixed by a one-byte transaction type (typed envelope). Each log is
//! `[address, topics, data]`.

use rlp::{DecoderError, Rlp};

/// A single log emitted by a child contract
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub address: [u8; 20],
    pub topics: Vec<[u8; 32]>,
    pub data: Vec<u8>,
}

impl LogEntry {
    pub fn topic(&self, index: usize) -> Option<&[u8; 32]> {
        self.topics.get(index)
    }

    /// 32-byte ABI word `index` of the non-indexed data
    pub fn word(&self, index: usize) -> Option<&[u8]> {
        self.data.get(index * 32..(index + 1) * 32)
    }
}

/// Decoded receipt
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    /// False only for an explicit failure status
    pub success: bool,
    pub logs: Vec<LogEntry>,
}

/// Strip the typed-envelope byte if present
pub fn strip_envelope(raw: &[u8]) -> &[u8] {
    match raw.first() {
        Some(first) if *first <= 0x7f => &raw[1..],
        _ => raw,
    }
}

pub fn decode_receipt(raw: &[u8]) -> Result<Receipt, DecoderError> {
    let rlp = Rlp::new(strip_envelope(raw));
    if rlp.item_count()? != 4 {
        return Err(DecoderError::RlpIncorrectListLen);
    }

    // Pre-Byzantium receipts carry a 32-byte state root instead of a status
    let status = rlp.at(0)?.data()?;
    let success = match status.len() {
        0 => false,
        1 => status[0] == 1,
        32 => true,
        _ => return Err(DecoderError::Custom("invalid receipt status")),
    };

    let logs = rlp
        .at(3)?
        .iter()
        .map(|log| decode_log(&log))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Receipt { success, logs })
}

fn decode_log(rlp: &Rlp) -> Result<LogEntry, DecoderError> {
    if rlp.item_count()? != 3 {
        return Err(DecoderError::RlpIncorrectListLen);
    }
    let address = fixed::<20>(rlp.at(0)?.data()?)?;
    let topics = rlp
        .at(1)?
        .iter()
        .map(|topic| topic.data().and_then(fixed::<32>))
        .collect::<Result<Vec<_>, _>>()?;
    let data = rlp.at(2)?.data()?.to_vec();
    Ok(LogEntry {
        address,
        topics,
        data,
    })
}

fn fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N], DecoderError> {
    bytes
        .try_into()
        .map_err(|_| DecoderError::Custom("unexpected field length"))
}
