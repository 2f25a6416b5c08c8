// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Glue between a loaded [`LinkConfig`] and the runtime pieces

use anyhow::{Context, Result};

use crate::config::LinkConfig;
use crate::hal::{FrameLink, SerialIO, StdClock};
use crate::observability::{LogFormat, LoggingOptions};
use crate::proto::{ConfigError as ProtoConfigError, PacketConsumer};

/// Link driven by the wall clock
pub type StdFrameLink<S, C> = FrameLink<S, C, StdClock>;

/// Build a link from the `[protocol]` and `[link]` sections.
///
/// # Errors
///
/// Fails if the protocol section does not fit the default decoder and
/// encoder capacities.
pub fn open_link<S, C>(
    config: &LinkConfig,
    serial: S,
    consumer: C,
) -> Result<StdFrameLink<S, C>, ProtoConfigError>
where
    S: SerialIO,
    C: PacketConsumer,
{
    let link: FrameLink<S, C> = FrameLink::new(serial, config.frame_config(), consumer)?;
    let link = link
        .with_rx_timeout(StdClock::new(), config.rx_timeout_us())
        .with_read_chunk(config.link.read_chunk_size);
    tracing::debug!(
        read_chunk = link.read_chunk(),
        rx_timeout_us = link.rx_timeout_us(),
        checksum = config.protocol.checksum_enabled,
        "link opened"
    );
    Ok(link)
}

/// Logging options from the `[logging]` section.
pub fn logging_options(config: &LinkConfig) -> Result<LoggingOptions> {
    let format: LogFormat = config
        .logging
        .format
        .parse()
        .with_context(|| format!("logging.format = {}", config.logging.format))?;
    Ok(LoggingOptions {
        level: config.logging.level.clone(),
        format,
    })
}
