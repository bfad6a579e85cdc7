//! Landmark frame sources.
//!
//! An external detector writes one JSON document per line: an array of 21
//! points (either `[x, y, ...]` or `{"x": .., "y": ..}`), or `null` / `[]`
//! when no hand is visible. Each decoded line is forwarded to the engine.

use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::arena::landmarks::{HandFrame, Landmark};

/// `None` means the detector saw no hand in that frame.
pub type FrameInput = Option<HandFrame>;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Seq(Vec<f32>),
    Object { x: f32, y: f32 },
}

impl RawPoint {
    fn into_landmark(self, index: usize) -> Result<Landmark> {
        match self {
            RawPoint::Object { x, y } => Ok(Landmark::new(x, y)),
            RawPoint::Seq(coords) => match coords.as_slice() {
                [x, y, ..] => Ok(Landmark::new(*x, *y)),
                _ => anyhow::bail!("landmark {} needs at least two coordinates", index),
            },
        }
    }
}

/// Decodes one line of detector output.
pub fn parse_frame_line(line: &str) -> Result<FrameInput> {
    let raw: Option<Vec<RawPoint>> =
        serde_json::from_str(line).context("landmark frame is not valid JSON")?;
    let points = match raw {
        None => return Ok(None),
        Some(points) if points.is_empty() => return Ok(None),
        Some(points) => points,
    };

    let landmarks = points
        .into_iter()
        .enumerate()
        .map(|(index, point)| point.into_landmark(index))
        .collect::<Result<Vec<_>>>()?;
    HandFrame::try_from(landmarks).map(Some)
}

/// Decodes one line and sends it on. Returns false once the receiver is gone.
fn forward_line(line_no: usize, line: &str, tx: &mpsc::UnboundedSender<FrameInput>) -> bool {
    if line.trim().is_empty() {
        return true;
    }
    match parse_frame_line(line) {
        Ok(frame) => {
            if tx.send(frame).is_err() {
                debug!("frame receiver dropped");
                return false;
            }
        }
        Err(e) => warn!(line = line_no, error = %format!("{e:#}"), "skipping landmark frame"),
    }
    true
}

/// Forwards every decodable line to `tx`. Malformed lines are logged and
/// skipped; the stream ends at EOF or when the receiver goes away.
pub async fn forward_frames<R>(reader: R, tx: mpsc::UnboundedSender<FrameInput>) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_no = 0usize;
    while let Some(line) = lines.next_line().await.context("failed to read landmark stream")? {
        line_no += 1;
        if !forward_line(line_no, &line, &tx) {
            break;
        }
    }
    debug!(lines = line_no, "landmark stream finished");
    Ok(())
}

/// Blocking twin of [`forward_frames`] for readers that cannot be cancelled.
pub fn forward_frames_blocking<R: BufRead>(
    reader: R,
    tx: mpsc::UnboundedSender<FrameInput>,
) -> Result<()> {
    let mut line_no = 0usize;
    for line in BufRead::lines(reader) {
        let line = line.context("failed to read landmark stream")?;
        line_no += 1;
        if !forward_line(line_no, &line, &tx) {
            break;
        }
    }
    debug!(lines = line_no, "landmark stream finished");
    Ok(())
}

/// A running reader. Stdin is read on a detached thread so a quiet pipe
/// never holds up runtime shutdown.
pub enum FrameSource {
    File(JoinHandle<Result<()>>),
    Stdin,
}

impl FrameSource {
    /// Stops a file reader and reports how it ended. The stdin thread is left
    /// to die with the process.
    pub async fn stop(self) -> Result<()> {
        match self {
            FrameSource::File(task) => {
                task.abort();
                match task.await {
                    Ok(result) => result,
                    Err(e) if e.is_cancelled() => Ok(()),
                    Err(e) => Err(e).context("landmark reader panicked"),
                }
            }
            FrameSource::Stdin => Ok(()),
        }
    }
}

/// Starts a reader for `path`, or standard input when `path` is `-`.
pub async fn spawn_frame_source(
    path: &str,
    tx: mpsc::UnboundedSender<FrameInput>,
) -> Result<FrameSource> {
    if path == "-" {
        std::thread::Builder::new()
            .name("landmark-stdin".into())
            .spawn(move || {
                if let Err(e) = forward_frames_blocking(std::io::stdin().lock(), tx) {
                    warn!(error = %format!("{e:#}"), "landmark source failed");
                }
            })
            .context("failed to start stdin reader")?;
        return Ok(FrameSource::Stdin);
    }

    let file = tokio::fs::File::open(Path::new(path))
        .await
        .with_context(|| format!("failed to open landmark stream {path}"))?;
    Ok(FrameSource::File(tokio::spawn(forward_frames(BufReader::new(file), tx))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::gesture::{canonical_extents, classify, GestureLabel};
    use crate::arena::landmarks::LANDMARK_COUNT;

    fn frame_json(frame: &HandFrame) -> String {
        let points: Vec<[f32; 3]> = frame.landmarks().iter().map(|p| [p.x, p.y, 0.0]).collect();
        serde_json::to_string(&points).unwrap()
    }

    #[test]
    fn parses_both_point_shapes() {
        let pairs: Vec<[f32; 2]> = vec![[0.5, 0.5]; LANDMARK_COUNT];
        let frame = parse_frame_line(&serde_json::to_string(&pairs).unwrap()).unwrap();
        assert!(frame.is_some());

        let objects: Vec<Landmark> = vec![Landmark::new(0.4, 0.6); LANDMARK_COUNT];
        let frame = parse_frame_line(&serde_json::to_string(&objects).unwrap()).unwrap().unwrap();
        assert_eq!(frame.wrist(), Landmark::new(0.4, 0.6));
    }

    #[test]
    fn empty_frames_mean_no_hand() {
        assert!(parse_frame_line("null").unwrap().is_none());
        assert!(parse_frame_line("[]").unwrap().is_none());
    }

    #[test]
    fn short_or_broken_frames_fail() {
        assert!(parse_frame_line("[[0.1, 0.2]]").is_err());
        assert!(parse_frame_line("not json").is_err());
        let mut points = vec![vec![0.5f32, 0.5]; LANDMARK_COUNT];
        points[3] = vec![0.5];
        assert!(parse_frame_line(&serde_json::to_string(&points).unwrap()).is_err());
    }

    #[tokio::test]
    async fn forwards_good_lines_and_skips_bad_ones() {
        let fist = HandFrame::from_finger_extents(canonical_extents(GestureLabel::Fist).unwrap());
        let input = format!("{}\n\ngarbage\nnull\n{}\n", frame_json(&fist), "[[0.1,0.1]]");

        let (tx, mut rx) = mpsc::unbounded_channel();
        forward_frames(BufReader::new(input.as_bytes()), tx).await.unwrap();

        let first = rx.recv().await.unwrap().unwrap();
        assert_eq!(classify(&first), GestureLabel::Fist);
        assert!(rx.recv().await.unwrap().is_none());
        // sender dropped after EOF
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn blocking_reader_matches_async_reader() {
        let palm = HandFrame::from_finger_extents(canonical_extents(GestureLabel::Palm).unwrap());
        let input = format!("[]\n{{oops\n{}\n", frame_json(&palm));

        let (tx, mut rx) = mpsc::unbounded_channel();
        forward_frames_blocking(input.as_bytes(), tx).unwrap();

        assert!(rx.try_recv().unwrap().is_none());
        assert_eq!(classify(&rx.try_recv().unwrap().unwrap()), GestureLabel::Palm);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn blocking_reader_stops_when_receiver_drops() {
        let input = "null\nnull\nnull\n";
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        assert!(forward_frames_blocking(input.as_bytes(), tx).is_ok());
    }

    #[tokio::test]
    async fn file_source_reports_missing_path_and_stops_cleanly() {
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(spawn_frame_source("/nonexistent/landmarks.jsonl", tx).await.is_err());

        let (tx, _rx) = mpsc::unbounded_channel();
        let (_keep, reader) = tokio::io::duplex(64);
        let source = FrameSource::File(tokio::spawn(forward_frames(BufReader::new(reader), tx)));
        source.stop().await.unwrap();
    }
}
