use crate::decoder::{ChannelValues, decode_frame};
use crate::gain::GainSource;
use crate::handoff::FrameReceiver;
use std::fmt;
use std::io;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerReport {
    pub decoded: u64,
    pub rejected: u64,
    /// The sink failed and the loop stopped before end-of-stream.
    pub sink_failed: bool,
}

impl fmt::Display for ConsumerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} frames decoded, {} rejected", self.decoded, self.rejected)?;
        if self.sink_failed {
            f.write_str(", output failed")?;
        }
        Ok(())
    }
}

/// Decode frames until the producer closes the channel and the backlog is
/// drained.
///
/// The gain is read once per frame, so an update applies from the next frame
/// on. A frame that fails to decode is logged and skipped. An error from
/// `sink` stops the loop and drops the receiver, which the producer sees as
/// its consumer being gone.
pub async fn run_consumer<G, F>(mut rx: FrameReceiver, gain: G, mut sink: F) -> ConsumerReport
where
    G: GainSource,
    F: FnMut(ChannelValues) -> io::Result<()>,
{
    let mut report = ConsumerReport::default();

    while let Some(frame) = rx.recv().await {
        match decode_frame(&frame, gain.current_gain()) {
            Ok(values) => {
                report.decoded += 1;
                if let Err(e) = sink(values) {
                    error!("Failed to write decoded frame: {}", e);
                    report.sink_failed = true;
                    break;
                }
            }
            Err(e) => {
                report.rejected += 1;
                warn!("Dropping undecodable frame: {}", e);
            }
        }
    }

    info!("Data stream closed, {}", report);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CHANNELS;
    use crate::frame::Frame;
    use crate::handoff;

    #[tokio::test]
    async fn test_undecodable_frames_do_not_stop_the_loop() {
        let (tx, rx) = handoff::channel(8).unwrap();
        for _ in 0..3 {
            tx.send(Frame::from_samples(&[7; CHANNELS]));
        }
        drop(tx);

        let mut seen = 0;
        let report = run_consumer(rx, 0.0, |_| {
            seen += 1;
            Ok(())
        })
        .await;

        assert_eq!(report.rejected, 3);
        assert_eq!(report.decoded, 0);
        assert!(!report.sink_failed);
        assert_eq!(seen, 0);
    }

    #[tokio::test]
    async fn test_sink_error_stops_the_loop() {
        let (tx, rx) = handoff::channel(8).unwrap();
        for _ in 0..5 {
            tx.send(Frame::from_samples(&[0; CHANNELS]));
        }

        let mut calls = 0;
        let report = run_consumer(rx, 1.0, |_| {
            calls += 1;
            if calls == 2 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"));
            }
            Ok(())
        })
        .await;

        assert!(report.sink_failed);
        assert_eq!(report.decoded, 2);
        assert_eq!(calls, 2);
        // The receiver went away with the loop
        assert!(tx.is_closed());
    }
}
