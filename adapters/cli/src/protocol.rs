//! Line protocol spoken with the match engine.
//!
//! The engine opens with the controlled player id, the arena dimensions and
//! an initial map, then sends one map line per turn and expects one command
//! line back. Every line is a flat list of whitespace separated tokens.

use std::str::{FromStr, SplitWhitespace};

use colony_fleet_core::{
    Command, DockingStatus, PlayerId, Position, ResourceId, ResourceSnapshot, TurnSnapshot,
    UnitId, UnitSnapshot, UNIT_RADIUS,
};
use thiserror::Error;

/// Errors that can occur while decoding engine lines.
#[derive(Debug, Error, PartialEq)]
pub(crate) enum ProtocolError {
    /// The line ended before the named field.
    #[error("line ended before {field}")]
    MissingToken {
        /// Field that was expected next.
        field: &'static str,
    },
    /// A token could not be parsed as the named field.
    #[error("could not parse {field} from '{token}'")]
    InvalidToken {
        /// Field being decoded.
        field: &'static str,
        /// Offending token.
        token: String,
    },
    /// A unit reported a docking status outside `0..=3`.
    #[error("unit {unit} reports unknown docking status {status}")]
    UnknownDockingStatus {
        /// Offending unit.
        unit: UnitId,
        /// Reported status code.
        status: u32,
    },
    /// A line carried tokens after its last expected field.
    #[error("line carries {0} unexpected trailing tokens")]
    TrailingTokens(usize),
    /// The engine closed the stream during the handshake.
    #[error("engine closed the stream while sending the {0}")]
    UnexpectedEof(&'static str),
}

/// Identity and arena size announced during the handshake.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct MatchHeader {
    /// Player controlled by this engine.
    pub(crate) me: PlayerId,
    /// Arena width.
    pub(crate) width: f64,
    /// Arena height.
    pub(crate) height: f64,
}

/// Parses the handshake line announcing the controlled player.
pub(crate) fn decode_player_id(line: &str) -> Result<PlayerId, ProtocolError> {
    let mut tokens = Tokens::new(line);
    let me = tokens.parse("player id")?;
    tokens.finish()?;
    Ok(PlayerId::new(me))
}

/// Parses the handshake line announcing the arena dimensions.
pub(crate) fn decode_dimensions(line: &str) -> Result<(f64, f64), ProtocolError> {
    let mut tokens = Tokens::new(line);
    let width = tokens.parse("arena width")?;
    let height = tokens.parse("arena height")?;
    tokens.finish()?;
    Ok((width, height))
}

/// Decodes a map line into the snapshot of a turn.
///
/// Values are taken as sent; range checks are left to world validation.
pub(crate) fn decode_map(line: &str, header: MatchHeader) -> Result<TurnSnapshot, ProtocolError> {
    let mut tokens = Tokens::new(line);

    let player_count: usize = tokens.parse("player count")?;
    let mut players = Vec::with_capacity(player_count);
    let mut units = Vec::new();
    for _ in 0..player_count {
        let owner = PlayerId::new(tokens.parse("player id")?);
        players.push(owner);
        let unit_count: usize = tokens.parse("unit count")?;
        for _ in 0..unit_count {
            units.push(decode_unit(&mut tokens, owner)?);
        }
    }

    let resource_count: usize = tokens.parse("resource count")?;
    let mut resources = Vec::with_capacity(resource_count);
    for _ in 0..resource_count {
        resources.push(decode_resource(&mut tokens)?);
    }
    tokens.finish()?;

    Ok(TurnSnapshot {
        me: header.me,
        width: header.width,
        height: header.height,
        players,
        units,
        resources,
    })
}

fn decode_unit(tokens: &mut Tokens<'_>, owner: PlayerId) -> Result<UnitSnapshot, ProtocolError> {
    let id = UnitId::new(tokens.parse("unit id")?);
    let position = Position::new(tokens.parse("unit x")?, tokens.parse("unit y")?);
    let health = tokens.parse("unit health")?;
    let _velocity: (f64, f64) = (tokens.parse("unit vx")?, tokens.parse("unit vy")?);
    let status: u32 = tokens.parse("docking status")?;
    let docked_to = ResourceId::new(tokens.parse("docked resource")?);
    let _progress: u32 = tokens.parse("docking progress")?;
    let _cooldown: u32 = tokens.parse("weapon cooldown")?;

    let docking = match status {
        0 => DockingStatus::Undocked,
        1 => DockingStatus::Docking,
        2 => DockingStatus::Docked,
        3 => DockingStatus::Undocking,
        status => return Err(ProtocolError::UnknownDockingStatus { unit: id, status }),
    };

    Ok(UnitSnapshot {
        id,
        owner,
        position,
        radius: UNIT_RADIUS,
        health,
        docking,
        docked_resource: (!docking.is_undocked()).then_some(docked_to),
    })
}

fn decode_resource(tokens: &mut Tokens<'_>) -> Result<ResourceSnapshot, ProtocolError> {
    let id = ResourceId::new(tokens.parse("resource id")?);
    let position = Position::new(tokens.parse("resource x")?, tokens.parse("resource y")?);
    let health = tokens.parse("resource health")?;
    let radius = tokens.parse("resource radius")?;
    let docking_spots = tokens.parse("docking spots")?;
    let _production: u32 = tokens.parse("current production")?;
    let _remaining: u32 = tokens.parse("remaining production")?;
    let owned: u32 = tokens.parse("owned flag")?;
    let owner = PlayerId::new(tokens.parse("resource owner")?);
    let docked_count: usize = tokens.parse("docked unit count")?;
    let mut docked_units = Vec::with_capacity(docked_count);
    for _ in 0..docked_count {
        docked_units.push(UnitId::new(tokens.parse("docked unit id")?));
    }

    Ok(ResourceSnapshot {
        id,
        position,
        radius,
        health,
        owner: (owned == 1).then_some(owner),
        docking_spots,
        docked_units,
    })
}

/// Encodes the commands of a turn as a single engine line.
///
/// Speeds are truncated and bearings rounded to whole degrees, as the engine
/// only accepts integers.
#[must_use]
pub(crate) fn encode_commands(commands: &[Command]) -> String {
    commands
        .iter()
        .map(|command| match *command {
            Command::Thrust {
                unit,
                speed,
                bearing,
            } => {
                let degrees = (bearing.round() as i64).rem_euclid(360);
                format!("t {unit} {} {degrees}", speed.trunc() as i64)
            }
            Command::Dock { unit, resource } => format!("d {unit} {resource}"),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            inner: line.split_whitespace(),
        }
    }

    fn parse<T: FromStr>(&mut self, field: &'static str) -> Result<T, ProtocolError> {
        let token = self
            .inner
            .next()
            .ok_or(ProtocolError::MissingToken { field })?;
        token.parse().map_err(|_| ProtocolError::InvalidToken {
            field,
            token: token.to_owned(),
        })
    }

    fn finish(self) -> Result<(), ProtocolError> {
        match self.inner.count() {
            0 => Ok(()),
            extra => Err(ProtocolError::TrailingTokens(extra)),
        }
    }
}
