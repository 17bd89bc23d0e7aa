//! Embeddable artifacts: byte buffers rendered as C/C++ byte-array sources for firmware
//! without a dynamic loader. Output is byte-identical for identical input.

mod parse;

pub use parse::{parse_artifact, parse_artifacts};

use crate::error::{PipelineError, Result};
use sha2::{Digest, Sha256};
use tracing::debug;

pub const DEFAULT_BYTES_PER_LINE: usize = 16;
pub const DEFAULT_ALIGNMENT: usize = 16;
/// Filler emitted for an empty placeholder; C has no zero-length arrays
const PLACEHOLDER_FILL: u8 = 0x00;
const INDENT: &str = "    ";

/// Named byte buffer to embed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddableArtifact {
    name: String,
    bytes: Vec<u8>,
    placeholder: bool,
}

impl EmbeddableArtifact {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            placeholder: false,
        }
    }

    /// Explicit stand-in for an artifact that is not available yet; may be empty.
    pub fn placeholder(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            placeholder: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn sha256_hex(&self) -> String {
        format!("{:x}", Sha256::digest(&self.bytes))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactEncoder {
    bytes_per_line: usize,
    alignment: usize,
}

impl Default for ArtifactEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_BYTES_PER_LINE, DEFAULT_ALIGNMENT)
    }
}

impl ArtifactEncoder {
    pub fn new(bytes_per_line: usize, alignment: usize) -> Self {
        Self {
            bytes_per_line: bytes_per_line.max(1),
            alignment: alignment.max(1),
        }
    }

    pub fn bytes_per_line(&self) -> usize {
        self.bytes_per_line
    }

    /// Single artifact: banner, length constant, aligned byte array.
    pub fn encode(&self, artifact: &EmbeddableArtifact) -> Result<String> {
        check(artifact)?;
        let mut out = banner(&format!(
            "{}: {} bytes, sha256 {}",
            artifact.name,
            artifact.len(),
            artifact.sha256_hex()
        ));
        out.push('\n');
        self.push_array(&mut out, artifact);
        debug!(symbol = %artifact.name, bytes = artifact.len(), "artifact rendered");
        Ok(out)
    }

    /// One array per artifact plus a `{data, length}` lookup table in declaration order.
    /// The count macro is derived from `sizeof`, never a literal.
    pub fn encode_table(&self, table: &str, artifacts: &[EmbeddableArtifact]) -> Result<String> {
        check_symbol(table)?;
        if artifacts.is_empty() {
            return Err(PipelineError::EmptyInput(table.to_string()));
        }
        for artifact in artifacts {
            check(artifact)?;
        }

        let total: usize = artifacts.iter().map(EmbeddableArtifact::len).sum();
        let mut out = banner(&format!(
            "{}: {} artifacts, {} bytes",
            table,
            artifacts.len(),
            total
        ));
        for artifact in artifacts {
            out.push('\n');
            out.push_str(&format!(
                "// {}: {} bytes, sha256 {}\n",
                artifact.name,
                artifact.len(),
                artifact.sha256_hex()
            ));
            self.push_array(&mut out, artifact);
        }

        let entry = format!("{}_entry", table);
        out.push('\n');
        out.push_str(&format!("struct {} {{\n", entry));
        out.push_str(&format!("{}const uint8_t* data;\n", INDENT));
        out.push_str(&format!("{}size_t length;\n", INDENT));
        out.push_str("};\n\n");
        out.push_str(&format!("const struct {} {}[] = {{\n", entry, table));
        for artifact in artifacts {
            out.push_str(&format!(
                "{}{{{}, {}_len}},\n",
                INDENT, artifact.name, artifact.name
            ));
        }
        out.push_str("};\n\n");
        out.push_str(&format!(
            "#define {}_COUNT (sizeof({}) / sizeof(struct {}))\n",
            table.to_ascii_uppercase(),
            table,
            entry
        ));
        debug!(table, entries = artifacts.len(), bytes = total, "artifact table rendered");
        Ok(out)
    }

    fn push_array(&self, out: &mut String, artifact: &EmbeddableArtifact) {
        let fill = [PLACEHOLDER_FILL];
        let body: &[u8] = if artifact.is_empty() {
            &fill
        } else {
            artifact.bytes()
        };

        out.push_str(&format!(
            "const unsigned int {}_len = {};\n",
            artifact.name,
            artifact.len()
        ));
        out.push_str(&format!(
            "alignas({}) const uint8_t {}[] = {{\n",
            self.alignment, artifact.name
        ));
        out.push_str(&hex_lines(body, self.bytes_per_line));
        out.push_str("};\n");
    }
}

/// `0x%02x` values, `per_line` per line; every line but the last ends with a comma.
pub fn hex_lines(bytes: &[u8], per_line: usize) -> String {
    let lines: Vec<String> = bytes
        .chunks(per_line.max(1))
        .map(|chunk| {
            let values: Vec<String> = chunk.iter().map(|b| format!("0x{:02x}", b)).collect();
            format!("{}{}", INDENT, values.join(", "))
        })
        .collect();
    let mut out = lines.join(",\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn banner(summary: &str) -> String {
    format!(
        "// Generated by threatpack. Do not edit.\n\
         // {}\n\
         \n\
         #pragma once\n\
         \n\
         #include <stddef.h>\n\
         #include <stdint.h>\n",
        summary
    )
}

fn check(artifact: &EmbeddableArtifact) -> Result<()> {
    check_symbol(&artifact.name)?;
    if artifact.is_empty() && !artifact.is_placeholder() {
        return Err(PipelineError::EmptyInput(artifact.name.clone()));
    }
    Ok(())
}

fn check_symbol(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let head_ok = chars
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_');
    if head_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(PipelineError::InvalidSymbol(name.to_string()))
    }
}
