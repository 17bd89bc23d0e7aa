//! Read rendered artifacts back into bytes, for verifying generated headers.

use crate::error::{PipelineError, Result};
use std::collections::HashMap;

const LEN_PREFIX: &str = "const unsigned int ";
const ARRAY_MARKER: &str = " const uint8_t ";

/// Every `(symbol, bytes)` in declaration order, each trimmed to its `_len` constant.
pub fn parse_artifacts(text: &str) -> Result<Vec<(String, Vec<u8>)>> {
    let mut lengths: HashMap<String, usize> = HashMap::new();
    let mut arrays: Vec<(String, Vec<u8>)> = Vec::new();
    let mut open: Option<(String, Vec<u8>)> = None;

    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if let Some((name, bytes)) = open.as_mut() {
            if line == "};" {
                arrays.push((std::mem::take(name), std::mem::take(bytes)));
                open = None;
                continue;
            }
            for token in line.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                let hex = token.strip_prefix("0x").ok_or_else(|| {
                    PipelineError::ArtifactParse(format!("line {}: `{}` is not hex", lineno + 1, token))
                })?;
                let byte = u8::from_str_radix(hex, 16).map_err(|e| {
                    PipelineError::ArtifactParse(format!("line {}: `{}`: {}", lineno + 1, token, e))
                })?;
                bytes.push(byte);
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix(LEN_PREFIX) {
            let (name, value) = rest
                .strip_suffix(';')
                .and_then(|r| r.split_once(" = "))
                .ok_or_else(|| {
                    PipelineError::ArtifactParse(format!("line {}: bad length constant", lineno + 1))
                })?;
            let symbol = name.strip_suffix("_len").unwrap_or(name).to_string();
            let len = value.parse::<usize>().map_err(|e| {
                PipelineError::ArtifactParse(format!("line {}: {}", lineno + 1, e))
            })?;
            lengths.insert(symbol, len);
        } else if let Some(at) = line.find(ARRAY_MARKER) {
            let name = line[at + ARRAY_MARKER.len()..]
                .strip_suffix("[] = {")
                .ok_or_else(|| {
                    PipelineError::ArtifactParse(format!("line {}: bad array declaration", lineno + 1))
                })?;
            open = Some((name.to_string(), Vec::new()));
        }
    }
    if let Some((name, _)) = open {
        return Err(PipelineError::ArtifactParse(format!("array `{}` is not closed", name)));
    }

    arrays
        .into_iter()
        .map(|(name, mut bytes)| {
            let len = *lengths.get(&name).ok_or_else(|| {
                PipelineError::ArtifactParse(format!("array `{}` has no length constant", name))
            })?;
            if len > bytes.len() {
                return Err(PipelineError::ArtifactParse(format!(
                    "`{}` declares {} bytes but lists {}",
                    name,
                    len,
                    bytes.len()
                )));
            }
            bytes.truncate(len);
            Ok((name, bytes))
        })
        .collect()
}

/// Bytes of the first array in a rendered artifact.
pub fn parse_artifact(text: &str) -> Result<Vec<u8>> {
    parse_artifacts(text)?
        .into_iter()
        .next()
        .map(|(_, bytes)| bytes)
        .ok_or_else(|| PipelineError::ArtifactParse("no byte array found".into()))
}
