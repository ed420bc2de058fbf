//! Timeline command handlers.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use climate_core::timeline::{Location, PlaybackState, Statistic, TimelineSnapshot};
use climate_core::{Config, TimelineController};

#[derive(clap::Args, Debug)]
pub struct PlayArgs {
    /// Year to start from (default: first available year)
    #[arg(long, value_name = "YEAR")]
    from: Option<i32>,

    /// Milliseconds between steps (overrides config)
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,

    /// Location to display alongside the timeline: "name,country,lat,lng"
    #[arg(long, value_name = "LOCATION", value_parser = parse_location)]
    location: Option<Location>,
}

pub fn years(config: &Config, list: bool) -> Result<()> {
    let timeline = config.timeline()?;
    let years = timeline.available_years();
    if list {
        let mut out = std::io::stdout().lock();
        for year in years.iter() {
            writeln!(out, "{year}")?;
        }
    } else {
        println!("{}..={} ({} years)", years.first(), years.last(), years.len());
    }
    Ok(())
}

pub fn stats() {
    for stat in Statistic::all() {
        println!("{stat}");
    }
}

/// Plays the timeline until it reaches the last year or Ctrl+C is pressed.
pub async fn play(config: &Config, args: PlayArgs) -> Result<()> {
    let interval = match args.interval_ms {
        Some(ms) if ms > 0 => Duration::from_millis(ms),
        _ => config.playback_interval(),
    };
    let timeline = TimelineController::through_current_year(config.start_year, interval)?;

    match args.from {
        Some(year) => timeline.set_year(year)?,
        None => timeline.seek_to_start(),
    }
    if let Some(location) = args.location {
        timeline.set_selected_location(location)?;
    }

    let mut updates = timeline.subscribe();
    let mut renderer = FrameRenderer::default();
    renderer.render(&updates.borrow_and_update())?;

    timeline.toggle_playback();
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                renderer.render(&snapshot)?;
                if snapshot.playback == PlaybackState::Stopped {
                    break;
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("listen for Ctrl+C")?;
                timeline.shutdown();
                break;
            }
        }
    }

    match timeline.position() {
        Some(year) => println!("Stopped at {year}"),
        None => println!("Stopped"),
    }
    Ok(())
}

/// Prints one line per distinct rendered year.
#[derive(Default)]
struct FrameRenderer {
    last_year: Option<i32>,
    location_shown: bool,
}

impl FrameRenderer {
    fn render(&mut self, snapshot: &TimelineSnapshot) -> Result<()> {
        let mut out = std::io::stdout().lock();
        if !self.location_shown
            && let Some(location) = &snapshot.selected_location
        {
            writeln!(out, "Location: {location}")?;
            self.location_shown = true;
        }
        if let Some(year) = snapshot.position
            && self.last_year != Some(year)
        {
            writeln!(out, "{year}")?;
            self.last_year = Some(year);
        }
        out.flush()?;
        Ok(())
    }
}

fn parse_location(raw: &str) -> Result<Location> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let [name, country, lat, lng] = parts.as_slice() else {
        bail!("expected \"name,country,lat,lng\", got {raw:?}");
    };
    let lat: f64 = lat.parse().with_context(|| format!("invalid latitude {lat:?}"))?;
    let lng: f64 = lng.parse().with_context(|| format!("invalid longitude {lng:?}"))?;
    Ok(Location::new(*name, *country, lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location() {
        let location = parse_location("Lisbon, Portugal, 38.72, -9.14").unwrap();
        assert_eq!(location.name, "Lisbon");
        assert_eq!(location.country, "Portugal");
        assert!((location.lat - 38.72).abs() < f64::EPSILON);
        assert!((location.lng + 9.14).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_location_wrong_arity() {
        let err = parse_location("Lisbon,38.72,-9.14").unwrap_err();
        assert!(err.to_string().contains("name,country,lat,lng"));
    }

    #[test]
    fn test_parse_location_bad_number() {
        let err = parse_location("Lisbon,Portugal,north,-9.14").unwrap_err();
        assert!(err.to_string().contains("invalid latitude"));
    }

    #[test]
    fn test_renderer_skips_repeated_years() {
        let mut renderer = FrameRenderer::default();
        let snapshot = TimelineSnapshot {
            position: Some(2000),
            playback: PlaybackState::Playing,
            selected_location: None,
            last_update_date: None,
        };
        renderer.render(&snapshot).unwrap();
        renderer.render(&snapshot).unwrap();
        assert_eq!(renderer.last_year, Some(2000));
    }
}
