//! Operator console for a running session.
//!
//! One command per stdin line. View changes go straight to the session;
//! link and sensor commands are handled by the `run` command.

use navmap::position::SensorFix;
use navmap::session::ViewCommand;
use navmap::view::{DisplayGeometry, ImageType, MapType, ResolutionMode};

/// Console help text.
pub const HELP: &str = "\
Commands:
  + | zoom in              zoom in one level
  - | zoom out             zoom out one level
  map <type>               map type by code or name (e.g. 5, nautical)
  image <type>             image type by code or name
  res <auto|WIDTHxHEIGHT>  image resolution
  flip <on|off>            swap width and height of a fixed resolution
  screen <W> <H> [RATIO [IW IH]]
                           screen size, pixel ratio and window size
                           (auto resolution and orientation)
  connect [IP PORT]        connect to the sentence stream
  disconnect               close the stream and stop reconnecting
  sensor on [LAT LON [HDG]]  use the location sensor
  sensor off               return to the sentence stream
  status                   show the current state
  log                      show the full transport log
  quit                     stop the session";

/// A parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    View(ViewCommand),
    Connect { endpoint: Option<(String, u16)> },
    Disconnect,
    SensorOn { fix: Option<SensorFix> },
    SensorOff,
    Status,
    Log,
    Help,
    Quit,
}

/// Parse one console line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&verb, args)) = words.split_first() else {
        return Ok(None);
    };

    let command = match (verb.to_lowercase().as_str(), args) {
        ("+", []) | ("zoom", ["in"]) => ConsoleCommand::View(ViewCommand::ZoomIn),
        ("-", []) | ("zoom", ["out"]) => ConsoleCommand::View(ViewCommand::ZoomOut),
        ("map", [value]) => {
            let map_type: MapType = value.parse().map_err(|e| format!("{}", e))?;
            ConsoleCommand::View(ViewCommand::SetMapType(map_type))
        }
        ("image", [value]) => {
            let image_type: ImageType = value.parse().map_err(|e| format!("{}", e))?;
            ConsoleCommand::View(ViewCommand::SetImageType(image_type))
        }
        ("res", [value]) => {
            let mode: ResolutionMode = value.parse().map_err(|e| format!("{}", e))?;
            ConsoleCommand::View(ViewCommand::SetResolution(mode))
        }
        ("flip", [value]) => ConsoleCommand::View(ViewCommand::SetFlip(parse_switch(value)?)),
        ("screen", [width, height, rest @ ..]) => {
            ConsoleCommand::View(ViewCommand::Resize(parse_screen(width, height, rest)?))
        }
        ("connect", []) => ConsoleCommand::Connect { endpoint: None },
        ("connect", [ip, port]) => ConsoleCommand::Connect {
            endpoint: Some((ip.to_string(), parse_number::<u16>("port", port)?)),
        },
        ("disconnect", []) => ConsoleCommand::Disconnect,
        ("sensor", ["off"]) => ConsoleCommand::SensorOff,
        ("sensor", ["on", rest @ ..]) => ConsoleCommand::SensorOn {
            fix: parse_fix(rest)?,
        },
        ("status", []) => ConsoleCommand::Status,
        ("log", []) => ConsoleCommand::Log,
        ("help", []) | ("?", []) => ConsoleCommand::Help,
        ("quit", []) | ("exit", []) => ConsoleCommand::Quit,
        _ => return Err(format!("unrecognized command '{}', type 'help'", line.trim())),
    };

    Ok(Some(command))
}

fn parse_switch(value: &str) -> Result<bool, String> {
    match value.to_lowercase().as_str() {
        "on" | "1" | "true" => Ok(true),
        "off" | "0" | "false" => Ok(false),
        _ => Err(format!("expected on or off, got '{}'", value)),
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("invalid {} '{}'", name, value))
}

fn parse_screen(width: &str, height: &str, rest: &[&str]) -> Result<DisplayGeometry, String> {
    let width = parse_number::<u32>("width", width)?;
    let height = parse_number::<u32>("height", height)?;
    let (ratio, inner) = match rest {
        [] => (1.0, None),
        [ratio] => (parse_number::<f64>("pixel ratio", ratio)?, None),
        [ratio, inner_width, inner_height] => (
            parse_number::<f64>("pixel ratio", ratio)?,
            Some((
                parse_number::<u32>("window width", inner_width)?,
                parse_number::<u32>("window height", inner_height)?,
            )),
        ),
        _ => return Err("usage: screen W H [RATIO [IW IH]]".to_string()),
    };
    let (inner_width, inner_height) = inner.unwrap_or((width, height));
    if width == 0 || height == 0 || inner_width == 0 || inner_height == 0 || ratio <= 0.0 {
        return Err("screen size, window size and pixel ratio must be positive".to_string());
    }

    Ok(DisplayGeometry::new(width, height, ratio).with_inner(inner_width, inner_height))
}

fn parse_fix(args: &[&str]) -> Result<Option<SensorFix>, String> {
    let (lat, lon, heading) = match args {
        [] => return Ok(None),
        [lat, lon] => (lat, lon, None),
        [lat, lon, heading] => (lat, lon, Some(heading)),
        _ => return Err("usage: sensor on [LAT LON [HDG]]".to_string()),
    };

    let lat = parse_number::<f64>("latitude", lat)?;
    let lon = parse_number::<f64>("longitude", lon)?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(format!("coordinates out of range: {}, {}", lat, lon));
    }

    let fix = SensorFix::new(lat, lon);
    Ok(Some(match heading {
        Some(heading) => {
            let heading = parse_number::<f64>("heading", heading)?;
            if !heading.is_finite() {
                return Err(format!("invalid heading '{}'", heading));
            }
            fix.with_heading(heading)
        }
        None => fix,
    }))
}
