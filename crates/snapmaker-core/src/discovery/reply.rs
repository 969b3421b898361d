//! Discovery reply parsing.
//!
//! Replies look like `IP@192.168.1.100|Model:Snapmaker A350|Status:IDLE`.

use thiserror::Error;

use crate::types::DiscoveryRecord;

const FIELD_SEPARATOR: char = '|';
const IP_SEPARATOR: char = '@';
const VALUE_SEPARATOR: char = ':';
const MIN_FIELDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplyError {
    #[error("reply is not valid UTF-8")]
    NotUtf8,

    #[error("expected at least 3 fields, got {0}")]
    TooFewFields(usize),

    #[error("{field} field has no '{separator}' separator")]
    MissingSeparator {
        field: &'static str,
        separator: char,
    },

    #[error("{0} field is empty")]
    EmptyValue(&'static str),
}

/// Parse one discovery datagram.
pub fn parse_reply(bytes: &[u8]) -> Result<DiscoveryRecord, ReplyError> {
    let text = std::str::from_utf8(bytes).map_err(|_| ReplyError::NotUtf8)?;
    let fields: Vec<&str> = text.trim().split(FIELD_SEPARATOR).collect();

    if fields.len() < MIN_FIELDS {
        return Err(ReplyError::TooFewFields(fields.len()));
    }

    let host = field_value(fields[0], "ip", IP_SEPARATOR)?;
    let model = field_value(fields[1], "model", VALUE_SEPARATOR)?;
    let status = field_value(fields[2], "status", VALUE_SEPARATOR)?;

    if host.is_empty() {
        return Err(ReplyError::EmptyValue("ip"));
    }

    Ok(DiscoveryRecord {
        host: host.to_string(),
        model: model.to_string(),
        status: status.to_string(),
    })
}

fn field_value<'a>(
    field: &'a str,
    name: &'static str,
    separator: char,
) -> Result<&'a str, ReplyError> {
    field
        .split_once(separator)
        .map(|(_, value)| value.trim())
        .ok_or(ReplyError::MissingSeparator {
            field: name,
            separator,
        })
}
