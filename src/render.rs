//! Renderer boundary.
//!
//! The core never draws. Each tick it hands a renderer an immutable
//! [`FrameSnapshot`] holding everything a display needs: the orbit curve,
//! the body, the wedge polygons with color weights and the info-panel
//! numbers. Renderers here are headless; a graphical front-end implements
//! [`Renderer`] the same way.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use crate::engine::clock::RunState;
use crate::engine::jidoka::JidokaStatus;
use crate::error::KeplerResult;
use crate::orbit::elements::OrbitParameters;
use crate::orbit::state::OrbitState;
use crate::orbit::vec2::Vec2;
use crate::orbit::wedges::{WedgeAreaStats, WedgePolygon};

/// Derived orbit quantities shown next to the plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitSummary {
    /// `2π√(a³)` with GM = 1.
    pub period: f64,
    /// `a(1 - e)`.
    pub perihelion: f64,
    /// `a(1 + e)`.
    pub aphelion: f64,
    /// Current speed.
    pub speed: f64,
    /// Current distance from the focus.
    pub distance: f64,
    /// Newest wedge area, if any wedge exists.
    pub latest_area: Option<f64>,
}

impl OrbitSummary {
    #[must_use]
    pub fn new(params: &OrbitParameters, body: &OrbitState, latest_area: Option<f64>) -> Self {
        Self {
            period: params.period(),
            perihelion: params.perihelion(),
            aphelion: params.aphelion(),
            speed: body.speed(),
            distance: body.radius,
            latest_area,
        }
    }
}

/// Everything a display needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// Ticks that advanced the clock since the last reset.
    pub tick: u64,
    pub mean_anomaly: f64,
    pub run_state: RunState,
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub time_step: f64,
    pub speed_multiplier: f64,
    /// Current body state.
    pub body: OrbitState,
    /// Closed orbit curve, shared until the eccentricity changes.
    pub curve: Arc<[Vec2]>,
    /// Wedges, oldest first.
    pub wedges: Vec<WedgePolygon>,
    /// Area statistics; `None` until two points are recorded.
    pub stats: Option<WedgeAreaStats>,
    pub summary: OrbitSummary,
    pub guard: JidokaStatus,
}

impl FrameSnapshot {
    /// Info-panel view of this frame.
    #[must_use]
    pub const fn report(&self) -> OrbitReport<'_> {
        OrbitReport { frame: self }
    }
}

/// Info-panel text for a frame.
///
/// ```text
/// Eccentricity e = 0.35
/// Time step Δt = 0.080
/// Orbital period T = 6.28 (scaled units)
/// ...
/// ```
#[derive(Debug, Clone, Copy)]
pub struct OrbitReport<'a> {
    frame: &'a FrameSnapshot,
}

impl fmt::Display for OrbitReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = self.frame;
        let summary = &frame.summary;
        writeln!(f, "Eccentricity e = {:.2}", frame.eccentricity)?;
        writeln!(f, "Time step Δt = {:.3}", frame.time_step)?;
        writeln!(f, "Orbital period T = {:.2} (scaled units)", summary.period)?;
        writeln!(f, "Perihelion: {:.3} AU", summary.perihelion)?;
        writeln!(f, "Aphelion: {:.3} AU", summary.aphelion)?;
        writeln!(f, "Current speed: {:.3}", summary.speed)?;
        writeln!(f, "Current distance: {:.3} AU", summary.distance)?;
        write!(f, "Kepler's 2nd Law: wedges should have similar area")?;
        if let Some(area) = summary.latest_area {
            write!(f, "\nLatest wedge area: {area:.6}")?;
        }
        if let Some(stats) = &frame.stats {
            write!(
                f,
                "\nArea statistics ({} wedges):\n  Mean: {:.6}\n  Std dev: {:.6}\n\
                 \x20 CV: {:.2}% (lower = more equal)",
                stats.count(),
                stats.mean,
                stats.std,
                stats.cv
            )?;
        }
        Ok(())
    }
}

/// Receives one snapshot per tick.
pub trait Renderer {
    /// Present a frame.
    ///
    /// # Errors
    ///
    /// Returns error if the frame cannot be written out.
    fn present(&mut self, frame: &FrameSnapshot) -> KeplerResult<()>;

    /// Called once after the last frame.
    ///
    /// # Errors
    ///
    /// Returns error if buffered output cannot be flushed.
    fn finish(&mut self) -> KeplerResult<()> {
        Ok(())
    }
}

/// Discards every frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn present(&mut self, _frame: &FrameSnapshot) -> KeplerResult<()> {
        Ok(())
    }
}

/// Keeps every frame in memory.
#[derive(Debug, Clone, Default)]
pub struct FrameRecorder {
    pub frames: Vec<FrameSnapshot>,
}

impl Renderer for FrameRecorder {
    fn present(&mut self, frame: &FrameSnapshot) -> KeplerResult<()> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

/// One JSON line per frame.
#[derive(Serialize)]
struct FrameRecord<'a> {
    tick: u64,
    mean_anomaly: f64,
    run_state: RunState,
    eccentricity: f64,
    time_step: f64,
    position: Vec2,
    velocity: Vec2,
    radius: f64,
    summary: &'a OrbitSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    cv: Option<f64>,
    wedges: &'a [WedgePolygon],
    #[serde(skip_serializing_if = "Option::is_none")]
    curve: Option<&'a [Vec2]>,
}

/// Writes frames as JSON lines.
///
/// The orbit curve is emitted on the first frame and again only when it
/// changes.
#[derive(Debug)]
pub struct JsonLinesRenderer<W: Write> {
    writer: W,
    last_curve: Option<Arc<[Vec2]>>,
}

impl<W: Write> JsonLinesRenderer<W> {
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            last_curve: None,
        }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Renderer for JsonLinesRenderer<W> {
    fn present(&mut self, frame: &FrameSnapshot) -> KeplerResult<()> {
        let curve_changed = self
            .last_curve
            .as_ref()
            .map_or(true, |last| !Arc::ptr_eq(last, &frame.curve));

        let record = FrameRecord {
            tick: frame.tick,
            mean_anomaly: frame.mean_anomaly,
            run_state: frame.run_state,
            eccentricity: frame.eccentricity,
            time_step: frame.time_step,
            position: frame.body.position,
            velocity: frame.body.velocity,
            radius: frame.body.radius,
            summary: &frame.summary,
            cv: frame.stats.as_ref().map(|s| s.cv),
            wedges: &frame.wedges,
            curve: curve_changed.then(|| &frame.curve[..]),
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        writeln!(self.writer)?;

        if curve_changed {
            self.last_curve = Some(Arc::clone(&frame.curve));
        }
        Ok(())
    }

    fn finish(&mut self) -> KeplerResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes the info panel every `every` frames, and once more at the end.
#[derive(Debug)]
pub struct ReportRenderer<W: Write> {
    writer: W,
    every: u64,
    presented: u64,
    last: Option<FrameSnapshot>,
}

impl<W: Write> ReportRenderer<W> {
    /// `every = 0` prints only the final frame.
    pub const fn new(writer: W, every: u64) -> Self {
        Self {
            writer,
            every,
            presented: 0,
            last: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_frame(&mut self, frame: &FrameSnapshot) -> KeplerResult<()> {
        writeln!(self.writer, "--- tick {} ({:?}) ---", frame.tick, frame.run_state)?;
        writeln!(self.writer, "{}", frame.report())?;
        Ok(())
    }
}

impl<W: Write> Renderer for ReportRenderer<W> {
    fn present(&mut self, frame: &FrameSnapshot) -> KeplerResult<()> {
        self.presented += 1;
        if self.every > 0 && self.presented % self.every == 0 {
            self.write_frame(frame)?;
            self.last = None;
        } else {
            self.last = Some(frame.clone());
        }
        Ok(())
    }

    fn finish(&mut self) -> KeplerResult<()> {
        if let Some(frame) = self.last.take() {
            self.write_frame(&frame)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
