//! LXMF field-map encode/decode for the meshweb wire format.
//!
//! LXMF messages carry a field map keyed by small integer tags. We decode
//! with the `rmpv`/`rmp-serde` combination: fields are read as a loose
//! `rmpv::Value` map rather than a rigid `#[derive(Deserialize)]` struct,
//! because field maps are sparse and peer-supplied — a strict struct would
//! reject any payload that omits an optional field.

use rmpv::Value;
use std::collections::BTreeMap;

use crate::constants::{FIELD_FILE_ATTACHMENTS, FIELD_HTML_CONTENT, FIELD_HTML_REQUEST};

#[derive(Debug, thiserror::Error)]
pub enum FieldCodecError {
    #[error("field map did not decode as a msgpack map")]
    NotAMap,
    #[error("msgpack decode failed: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("msgpack encode failed: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("field {0} had an unexpected shape")]
    MalformedField(u8),
}

/// A single file attachment: `(filename, bytes)`, matching the server's
/// `[filename, data]` pair encoding.
pub type FileAttachment = (String, Vec<u8>);

/// The decoded meaning of an inbound LXMF payload's field map, collapsed
/// into the three shapes meshweb actually cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundPayload {
    /// Field 10 present: a rendered HTML page body from a server.
    HtmlPage { body: String },
    /// Field 2 present: one or more file attachments from a server.
    Files { files: Vec<FileAttachment> },
    /// Field 11 present: a page-name request from a client.
    PageRequest { name: String },
    /// No recognized field present; callers fall back to the plaintext
    /// message content.
    Empty,
}

/// Parses a raw msgpack-encoded field map (the LXMF `fields` blob) into an
/// [`InboundPayload`]. Unrecognized tags are ignored, not rejected — LXMF
/// field maps may carry fields this protocol does not use.
pub fn decode_fields(raw: &[u8]) -> Result<InboundPayload, FieldCodecError> {
    if raw.is_empty() {
        return Ok(InboundPayload::Empty);
    }
    let value: Value = rmp_serde::from_slice(raw)?;
    let map = match value {
        Value::Map(pairs) => pairs,
        _ => return Err(FieldCodecError::NotAMap),
    };

    // HTML content takes priority over file attachments, which take
    // priority over a page request, matching the server/client's
    // field-inspection order.
    if let Some(body) = find_field(&map, FIELD_HTML_CONTENT).and_then(as_str) {
        return Ok(InboundPayload::HtmlPage { body });
    }
    if let Some(files_value) = find_field(&map, FIELD_FILE_ATTACHMENTS) {
        let files = decode_files(files_value)
            .ok_or(FieldCodecError::MalformedField(FIELD_FILE_ATTACHMENTS))?;
        return Ok(InboundPayload::Files { files });
    }
    if let Some(name) = find_field(&map, FIELD_HTML_REQUEST).and_then(as_str) {
        return Ok(InboundPayload::PageRequest { name });
    }
    Ok(InboundPayload::Empty)
}

/// Encodes a single HTML page body under field 10.
pub fn encode_html_content(body: &str) -> Result<Vec<u8>, FieldCodecError> {
    encode_single_field(FIELD_HTML_CONTENT, Value::String(body.into()))
}

/// Encodes a page-name request under field 11.
pub fn encode_page_request(name: &str) -> Result<Vec<u8>, FieldCodecError> {
    encode_single_field(FIELD_HTML_REQUEST, Value::String(name.into()))
}

/// Encodes file attachments under field 2 as `[[name, bytes], ...]`.
pub fn encode_file_attachments(files: &[FileAttachment]) -> Result<Vec<u8>, FieldCodecError> {
    let entries = files
        .iter()
        .map(|(name, bytes)| {
            Value::Array(vec![
                Value::String(name.clone().into()),
                Value::Binary(bytes.clone()),
            ])
        })
        .collect();
    encode_single_field(FIELD_FILE_ATTACHMENTS, Value::Array(entries))
}

fn encode_single_field(tag: u8, value: Value) -> Result<Vec<u8>, FieldCodecError> {
    let map = Value::Map(vec![(Value::Integer(tag.into()), value)]);
    let mut buf = Vec::new();
    rmp_serde::encode::write(&mut buf, &map)?;
    Ok(buf)
}

fn find_field(map: &[(Value, Value)], tag: u8) -> Option<Value> {
    map.iter().find_map(|(key, value)| {
        let matches = match key {
            Value::Integer(i) => i.as_u64() == Some(tag as u64),
            _ => false,
        };
        matches.then(|| value.clone())
    })
}

fn as_str(value: Value) -> Option<String> {
    match value {
        Value::String(s) => s.into_str(),
        _ => None,
    }
}

fn decode_files(value: Value) -> Option<Vec<FileAttachment>> {
    let entries = match value {
        Value::Array(entries) => entries,
        _ => return None,
    };
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let pair = entry.as_array()?;
        let name = pair.first()?.as_str()?.to_string();
        let bytes = match pair.get(1)? {
            Value::Binary(b) => b.clone(),
            Value::String(s) => s.as_bytes().to_vec(),
            _ => return None,
        };
        out.push((name, bytes));
    }
    Some(out)
}

/// Persisted-to-JSON sibling of a field map, used by the client cache when
/// serializing cached artifacts alongside regular JSON state. Kept separate
/// from the wire codec above because cache persistence uses `serde_json`,
/// not msgpack.
pub fn files_to_json_map(files: &[FileAttachment]) -> BTreeMap<String, Vec<u8>> {
    files.iter().cloned().collect()
}
