// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
framelink command-line tool

Encodes frames, decodes captured byte streams and computes checksums using
the settings from `framelink.toml` (plus environment and `--set` overrides).

Usage:
  framelink encode --command 0x10 --payload 0203
  framelink decode AA55 0003 1002 03 9FB2 55AA
  framelink decode --file capture.bin --json
  framelink checksum 313233343536373839
  framelink config

Per-crate debug output: `--debug-framelink-proto`, `--debug-all`, or
`FRAMELINK_DEBUG=framelink-proto,framelink-hal`.
*/

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use serde_json::json;

use framelink::config::{load_config_or_default, parse_magic, LinkConfig};
use framelink::observability::{debug_flags_help, init_logging, parse_debug_flags, LogFormat};
use framelink::proto::{
    crc16_ccitt, FrameDecoder, FrameEncoder, Packet, PacketCollector, FRAME_OVERHEAD,
};
use framelink::session::logging_options;

/// Largest payload the tool can handle, whatever the configuration says
const TOOL_MAX_PAYLOAD: usize = 4096;
const TOOL_MAX_FRAME_LEN: usize = TOOL_MAX_PAYLOAD + FRAME_OVERHEAD;

/// framelink - framed byte-stream protocol tool
#[derive(Parser, Debug)]
#[command(name = "framelink", version, author, long_about = None)]
struct Cli {
    /// Path to framelink.toml (searched for when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Configuration override, e.g. `--set protocol.checksum_enabled=false`
    #[arg(long = "set", value_name = "KEY=VALUE", global = true)]
    overrides: Vec<String>,

    /// Log level (overrides logging.level)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log format: text or json (overrides logging.format)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode one frame and print it as hex
    Encode {
        /// Command byte, decimal or 0x-prefixed hex
        #[arg(long, value_parser = parse_byte)]
        command: u8,

        /// Payload as hex
        #[arg(long, default_value = "")]
        payload: String,

        /// Omit the CRC field
        #[arg(long)]
        no_checksum: bool,
    },

    /// Decode a byte stream and print every frame found
    Decode {
        /// Stream as hex (whitespace allowed)
        #[arg(conflicts_with = "file", required_unless_present = "file")]
        hex: Vec<String>,

        /// Read the raw stream from a file instead
        #[arg(long)]
        file: Option<PathBuf>,

        /// Emit one JSON document instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the CRC-16/CCITT of some bytes
    Checksum {
        /// Bytes as hex (whitespace allowed)
        #[arg(required = true)]
        hex: Vec<String>,
    },

    /// Print the effective configuration as JSON
    Config,
}

fn main() -> Result<()> {
    let debug_flags = parse_debug_flags();

    // Debug flags are open-ended (`--debug-<crate>`), keep them away from clap.
    let args = env::args().filter(|arg| !arg.starts_with("--debug-"));
    let matches = Cli::command()
        .after_help(debug_flags_help())
        .get_matches_from(args);
    let cli = Cli::from_arg_matches(&matches)?;

    let overrides = parse_overrides(&cli.overrides)?;
    let config = load_config_or_default(cli.config.as_deref(), Some(&overrides))
        .context("Failed to load configuration")?;

    let mut options = logging_options(&config)?;
    if let Some(level) = cli.log_level {
        options.level = level;
    }
    if let Some(format) = cli.log_format {
        options.format = format;
    }
    init_logging(&debug_flags, &options)?;

    let output = match cli.command {
        Command::Encode {
            command,
            payload,
            no_checksum,
        } => encode_hex(&config, command, &payload, no_checksum)?,
        Command::Decode { hex, file, json } => {
            let stream = match file {
                Some(path) => fs::read(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => parse_hex(&hex)?,
            };
            decode_report(&config, &stream, json)?
        }
        Command::Checksum { hex } => format!("0x{:04X}", crc16_ccitt(&parse_hex(&hex)?)),
        Command::Config => config_json(&config)?,
    };
    println!("{}", output);
    Ok(())
}

/// Encode one frame and render it as uppercase hex.
fn encode_hex(config: &LinkConfig, command: u8, payload_hex: &str, no_checksum: bool) -> Result<String> {
    let payload = hex::decode(strip_whitespace(payload_hex)).context("Payload is not valid hex")?;

    let mut frame_config = config.frame_config();
    if no_checksum {
        frame_config = frame_config.with_checksum(false);
    }

    let mut encoder: FrameEncoder<TOOL_MAX_FRAME_LEN> = FrameEncoder::new(frame_config)?;
    let frame = encoder.encode(command, &payload)?;
    tracing::debug!(command, payload_len = payload.len(), frame_len = frame.len(), "encoded frame");
    Ok(hex::encode_upper(frame))
}

/// Decode a stream and render every frame plus the decoder counters.
fn decode_report(config: &LinkConfig, stream: &[u8], as_json: bool) -> Result<String> {
    let mut decoder: FrameDecoder<PacketCollector, TOOL_MAX_PAYLOAD> =
        FrameDecoder::new(config.frame_config(), PacketCollector::new())?;
    decoder.feed_slice(stream);

    if !decoder.is_idle() {
        tracing::warn!(state = decoder.state().name(), "stream ends inside a frame");
    }

    let stats = *decoder.stats();
    let packets = decoder.into_consumer().take();

    if as_json {
        let frames: Vec<_> = packets.iter().map(packet_json).collect();
        let report = json!({
            "frames": frames,
            "stats": {
                "bytes_fed": stats.bytes_fed,
                "frames_delivered": stats.frames_delivered,
                "header_rejects": stats.header_rejects,
                "length_rejects": stats.length_rejects,
                "checksum_rejects": stats.checksum_rejects,
                "trailer_rejects": stats.trailer_rejects,
                "overflow_rejects": stats.overflow_rejects,
            },
        });
        return Ok(serde_json::to_string_pretty(&report)?);
    }

    let mut lines: Vec<String> = packets.iter().map(packet_line).collect();
    lines.push(format!(
        "{} frame(s) from {} byte(s), {} rejected",
        stats.frames_delivered,
        stats.bytes_fed,
        stats.total_rejects()
    ));
    Ok(lines.join("\n"))
}

fn packet_line(packet: &Packet) -> String {
    format!(
        "cmd=0x{:02X} len={} payload={}",
        packet.command,
        packet.payload.len(),
        hex::encode_upper(&packet.payload)
    )
}

/// Effective configuration as JSON, magics written as hex like in the TOML file.
fn config_json(config: &LinkConfig) -> Result<String> {
    let mut value = serde_json::to_value(config)?;
    if let Some(protocol) = value.get_mut("protocol").and_then(|p| p.as_object_mut()) {
        protocol.insert(
            "header_magic".to_string(),
            json!(format!("0x{:04X}", config.protocol.header_magic)),
        );
        protocol.insert(
            "trailer_magic".to_string(),
            json!(format!("0x{:04X}", config.protocol.trailer_magic)),
        );
    }
    Ok(serde_json::to_string_pretty(&value)?)
}

fn packet_json(packet: &Packet) -> serde_json::Value {
    json!({
        "command": packet.command,
        "payload": hex::encode_upper(&packet.payload),
    })
}

fn parse_byte(value: &str) -> Result<u8, String> {
    let value = value.trim();
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(digits) => u8::from_str_radix(digits, 16),
        None => value.parse(),
    };
    parsed.map_err(|_| format!("'{}' is not a byte (0-255 or 0x00-0xFF)", value))
}

fn parse_hex(parts: &[String]) -> Result<Vec<u8>> {
    let joined = strip_whitespace(&parts.concat());
    hex::decode(&joined).with_context(|| format!("'{}' is not valid hex", joined))
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

fn parse_overrides(raw: &[String]) -> Result<HashMap<String, String>> {
    let mut overrides = HashMap::new();
    for entry in raw {
        let Some((key, value)) = entry.split_once('=') else {
            bail!("Override '{}' must look like key=value", entry);
        };
        let key = key.trim();
        if key.ends_with("_magic") && parse_magic(value).is_none() {
            bail!("Override '{}' is not a 16-bit value", entry);
        }
        overrides.insert(key.to_string(), value.trim().to_string());
    }
    Ok(overrides)
}
