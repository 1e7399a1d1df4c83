//! Event reader, tracker task and draw list writer

use anyhow::Context;
use face_tracking::{DetectorEvent, FaceTracker};
use metrics::{counter, gauge};
use overlay::{FaceDrawList, GraphicOverlay, ViewTransform};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::settings::AppConfig;

/// Event tagged with the input line it came from
type Sequenced = (u64, DetectorEvent);

/// One output line: everything visible after an event that requested a redraw
#[derive(Debug, Serialize)]
pub struct FrameOutput {
    pub sequence: u64,
    pub faces: Vec<FaceDrawList>,
}

/// Replay totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplayStats {
    /// Input lines read
    pub lines: u64,
    /// Lines that failed to parse
    pub malformed: u64,
    /// Events applied to the tracker
    pub events: u64,
    /// Events the tracker refused
    pub rejected: u64,
    /// Output lines written
    pub frames_written: u64,
}

#[derive(Debug, Default)]
struct ReadStats {
    lines: u64,
    malformed: u64,
}

/// Parse one input line; blank lines carry no event
pub fn parse_event(line: &str) -> Result<Option<DetectorEvent>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

/// Replay a detector event stream and write one draw list per redraw.
///
/// The reader runs as its own task and hands immutable events to the tracker
/// over a bounded channel.
pub async fn run<R, W>(config: &AppConfig, reader: R, writer: W) -> anyhow::Result<ReplayStats>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    let transform = ViewTransform::new(&config.view)?;
    let mut tracker = FaceTracker::new(config.tracking.clone(), GraphicOverlay::new(transform))?;

    let (tx, mut rx) = mpsc::channel::<Sequenced>(config.channel_capacity);
    let reader_task = tokio::spawn(read_events(reader, tx));

    let mut writer = BufWriter::new(writer);
    let mut stats = ReplayStats::default();

    while let Some((sequence, event)) = rx.recv().await {
        if let Err(e) = tracker.handle(&event) {
            warn!(sequence, error = %e, "Event rejected");
            stats.rejected += 1;
            continue;
        }
        stats.events += 1;
        counter!("face_overlay_events_total").increment(1);
        gauge!("face_overlay_tracked_faces").set(tracker.tracked_faces() as f64);

        if !tracker.sink_mut().take_redraw() {
            continue;
        }

        let faces = tracker.sink().draw();
        counter!("face_overlay_faces_drawn_total").increment(faces.len() as u64);
        debug!(sequence, faces = faces.len(), "Redraw");

        let line = serde_json::to_string(&FrameOutput { sequence, faces })
            .context("serializing draw list")?;
        writer.write_all(line.as_bytes()).await.context("writing draw list")?;
        writer.write_all(b"\n").await.context("writing draw list")?;
        stats.frames_written += 1;
    }

    writer.flush().await.context("flushing output")?;

    let read = reader_task.await.context("event reader task failed")??;
    stats.lines = read.lines;
    stats.malformed = read.malformed;

    Ok(stats)
}

async fn read_events<R>(reader: R, tx: mpsc::Sender<Sequenced>) -> anyhow::Result<ReadStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut stats = ReadStats::default();

    while let Some(line) = lines.next_line().await.context("reading detector events")? {
        stats.lines += 1;
        match parse_event(&line) {
            Ok(Some(event)) => {
                if tx.send((stats.lines, event)).await.is_err() {
                    debug!("Tracker stopped, ending read");
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(line = stats.lines, error = %e, "Skipping malformed event");
                counter!("face_overlay_malformed_lines_total").increment(1);
                stats.malformed += 1;
            }
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const FACE: &str = r#""position":{"x":0.0,"y":0.0},"width":100.0,"height":100.0,
        "left_eye_open_probability":0.9,"right_eye_open_probability":0.9,
        "smiling_probability":0.1"#;

    fn update(face_id: u32, with_nose: bool, timestamp_ms: u64) -> String {
        let mut landmarks = vec![
            r#"{"id":"LEFT_EYE","position":{"x":30.0,"y":35.0}}"#,
            r#"{"id":"RIGHT_EYE","position":{"x":70.0,"y":35.0}}"#,
            r#"{"id":"LEFT_MOUTH","position":{"x":35.0,"y":75.0}}"#,
            r#"{"id":"BOTTOM_MOUTH","position":{"x":50.0,"y":85.0}}"#,
            r#"{"id":"RIGHT_MOUTH","position":{"x":65.0,"y":75.0}}"#,
        ];
        if with_nose {
            landmarks.push(r#"{"id":"NOSE_BASE","position":{"x":50.0,"y":60.0}}"#);
        }
        format!(
            r#"{{"event":"update","face_id":{},"face":{{{},"timestamp_ms":{},"landmarks":[{}]}}}}"#,
            face_id,
            FACE,
            timestamp_ms,
            landmarks.join(",")
        )
        .replace('\n', "")
    }

    async fn replay(input: String) -> (ReplayStats, Vec<serde_json::Value>) {
        let mut out = Vec::new();
        let stats = run(&AppConfig::default(), Cursor::new(input.into_bytes()), &mut out)
            .await
            .unwrap();
        let frames = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        (stats, frames)
    }

    #[test]
    fn test_parse_event() {
        assert!(parse_event("   ").unwrap().is_none());
        assert!(parse_event("{not json").is_err());
        let event = parse_event(r#"{"event":"missing","face_id":2}"#).unwrap().unwrap();
        assert_eq!(event.face_id().0, 2);
    }

    #[tokio::test]
    async fn test_replay_lifecycle() {
        let input = [
            r#"{"event":"first_seen","face_id":7}"#.to_string(),
            update(7, true, 1000),
            String::new(),
            r#"{"event":"missing","face_id":7}"#.to_string(),
            "garbage".to_string(),
            update(7, false, 1100),
            r#"{"event":"gone","face_id":7}"#.to_string(),
        ]
        .join("\n");

        let (stats, frames) = replay(input).await;

        assert_eq!(
            stats,
            ReplayStats {
                lines: 7,
                malformed: 1,
                events: 5,
                rejected: 0,
                frames_written: 4,
            }
        );

        // update, missing, rebound update, gone
        let visible: Vec<usize> = frames
            .iter()
            .map(|f| f["faces"].as_array().unwrap().len())
            .collect();
        assert_eq!(visible, vec![1, 0, 1, 0]);
        assert_eq!(frames[0]["sequence"], 2);
        assert_eq!(frames[0]["faces"][0]["face_id"], 7);
        assert!(!frames[2]["faces"][0]["primitives"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_renderable_face_not_drawn() {
        let (stats, frames) = replay(update(1, false, 0)).await;
        assert_eq!(stats.frames_written, 1);
        assert!(frames[0]["faces"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_input() {
        let (stats, frames) = replay(String::new()).await;
        assert_eq!(stats, ReplayStats::default());
        assert!(frames.is_empty());
    }
}
