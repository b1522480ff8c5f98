//! Drives a full match against the engine over a pair of byte streams.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use colony_fleet_system_turn::TurnController;
use colony_fleet_world::{query, World};
use log::{debug, info};

use crate::protocol::{self, MatchHeader, ProtocolError};

/// Plays a match until the engine closes its stream and reports how many
/// turns were answered.
///
/// The session is fail-stop: the first line that cannot be decoded or
/// validated ends the match with an error, and no command line is written for
/// that turn.
pub(crate) fn run<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    name: &str,
    controller: &mut TurnController,
) -> Result<u64> {
    let header = handshake(&mut input)?;
    info!(
        "playing as {} on a {}x{} arena",
        header.me, header.width, header.height
    );

    let initial = read_line(&mut input)?
        .ok_or(ProtocolError::UnexpectedEof("initial map"))
        .context("handshake incomplete")?;
    let initial = protocol::decode_map(&initial, header).context("invalid initial map")?;
    let initial = World::from_snapshot(initial).context("initial map rejected")?;
    debug!(
        "initial map holds {} units and {} resources",
        query::units(&initial).len(),
        query::resources(&initial).len()
    );

    writeln!(output, "{name}").context("failed to send bot name")?;
    output.flush().context("failed to flush bot name")?;

    let mut turn = 0;
    while let Some(line) = read_line(&mut input)? {
        turn += 1;
        let snapshot = protocol::decode_map(&line, header)
            .with_context(|| format!("turn {turn}: invalid map line"))?;
        let world = World::from_snapshot(snapshot)
            .with_context(|| format!("turn {turn}: snapshot rejected"))?;

        let orders = controller.handle(&world);
        let commands = protocol::encode_commands(&orders.commands);
        writeln!(output, "{commands}")
            .with_context(|| format!("turn {turn}: failed to send commands"))?;
        output
            .flush()
            .with_context(|| format!("turn {turn}: failed to flush commands"))?;
        debug!("turn {turn}: sent {} commands", orders.commands.len());
    }

    Ok(turn)
}

fn handshake<R: BufRead>(input: &mut R) -> Result<MatchHeader> {
    let me = read_line(input)?
        .ok_or(ProtocolError::UnexpectedEof("player id"))
        .context("handshake incomplete")?;
    let me = protocol::decode_player_id(&me).context("invalid player id line")?;

    let dimensions = read_line(input)?
        .ok_or(ProtocolError::UnexpectedEof("arena dimensions"))
        .context("handshake incomplete")?;
    let (width, height) =
        protocol::decode_dimensions(&dimensions).context("invalid dimensions line")?;

    Ok(MatchHeader { me, width, height })
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("failed to read from engine")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}
