//! Session table and lifecycle management
//!
//! Each streaming session is keyed by an opaque identifier supplied by the
//! caller and moves Pending → Active → Stopped. A Pending record holds the
//! negotiated SRTP parameters; an Active record owns the transcoding
//! process. Stop is idempotent from any state.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use device_client::DeviceClient;

use crate::error::{Result, StreamError};
use crate::session::{
    AudioParameters, NegotiatedLeg, NegotiatedSession, PrepareRequest, VideoParameters,
};
use crate::transcoder::{Transcoder, TranscoderConfig};

/// Lifecycle stage of a tracked session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStage {
    /// SRTP parameters negotiated, no process running
    Pending,
    /// Transcoding process running
    Active,
}

enum SessionRecord {
    Pending(NegotiatedSession),
    Active(Transcoder),
}

/// Manager for SRTP streaming sessions
///
/// Each entry in the session table is only ever touched by the
/// prepare/start/stop sequence for its identifier; the table mutex provides
/// the intra-key sequencing.
pub struct StreamSessionManager {
    client: Arc<DeviceClient>,
    config: TranscoderConfig,
    sessions: Mutex<HashMap<String, SessionRecord>>,
}

impl StreamSessionManager {
    /// Create a manager over an existing device client
    pub fn new(client: Arc<DeviceClient>, config: TranscoderConfig) -> Self {
        Self {
            client,
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Current stage of a session, if tracked
    pub async fn session_stage(&self, session_id: &str) -> Option<SessionStage> {
        self.sessions
            .lock()
            .await
            .get(session_id)
            .map(|record| match record {
                SessionRecord::Pending(_) => SessionStage::Pending,
                SessionRecord::Active(_) => SessionStage::Active,
            })
    }

    /// Negotiate transport parameters for a new session
    ///
    /// Assigns fresh synchronization sources for video and, when requested,
    /// audio, stores a Pending record, and returns the parameters the caller
    /// relays to the remote peer. Re-preparing a Pending session replaces
    /// it; preparing over an Active session is an error.
    pub async fn prepare(
        &self,
        session_id: &str,
        request: PrepareRequest,
    ) -> Result<NegotiatedSession> {
        let negotiated = NegotiatedSession {
            peer_address: request.peer_address,
            video: NegotiatedLeg {
                port: request.video.port,
                ssrc: generate_ssrc(),
                crypto_suite: request.video.crypto_suite,
                key_material: request.video.key_material,
            },
            audio: request.audio.map(|leg| NegotiatedLeg {
                port: leg.port,
                ssrc: generate_ssrc(),
                crypto_suite: leg.crypto_suite,
                key_material: leg.key_material,
            }),
        };

        let mut sessions = self.sessions.lock().await;
        if matches!(sessions.get(session_id), Some(SessionRecord::Active(_))) {
            return Err(StreamError::SessionActive(session_id.to_string()));
        }

        sessions.insert(
            session_id.to_string(),
            SessionRecord::Pending(negotiated.clone()),
        );
        tracing::debug!(
            session = %session_id,
            peer = %negotiated.peer_address,
            audio = negotiated.audio.is_some(),
            "session prepared"
        );

        Ok(negotiated)
    }

    /// Start streaming a prepared session
    ///
    /// Requires a matching Pending record. Spawns the transcoding process
    /// against the device's RTSP pull URL; a spawn failure is logged and the
    /// session is dropped rather than surfaced, and the caller recovers by
    /// re-preparing, never by automatic retry.
    pub async fn start(
        &self,
        session_id: &str,
        video: VideoParameters,
        audio: Option<AudioParameters>,
    ) -> Result<()> {
        let mut sessions = self.sessions.lock().await;

        let negotiated = match sessions.remove(session_id) {
            Some(SessionRecord::Pending(negotiated)) => negotiated,
            Some(SessionRecord::Active(transcoder)) => {
                sessions.insert(session_id.to_string(), SessionRecord::Active(transcoder));
                return Err(StreamError::SessionActive(session_id.to_string()));
            }
            None => return Err(StreamError::NoSessionInfo(session_id.to_string())),
        };

        if audio.is_some() {
            // The device's pull stream is MJPEG, video-only; the audio leg
            // stays negotiated but carries nothing
            tracing::debug!(session = %session_id, "audio requested on video-only source");
        }

        let rtsp_url = self.client.rtsp_pull_url();
        match Transcoder::spawn(
            &self.config,
            session_id,
            &rtsp_url,
            &negotiated.peer_address,
            &negotiated.video,
            &video,
        ) {
            Ok(transcoder) => {
                tracing::info!(
                    session = %session_id,
                    width = video.width,
                    height = video.height,
                    fps = video.fps,
                    bitrate_kbps = video.max_bitrate_kbps,
                    "stream started"
                );
                sessions.insert(session_id.to_string(), SessionRecord::Active(transcoder));
            }
            Err(error) => {
                tracing::error!(session = %session_id, error = %error, "failed to spawn transcoder");
            }
        }

        Ok(())
    }

    /// Stop a session from any lifecycle stage
    ///
    /// Idempotent: terminates the process of an Active session, releases a
    /// Pending record, and is a no-op for unknown identifiers.
    pub async fn stop(&self, session_id: &str) {
        let record = self.sessions.lock().await.remove(session_id);

        match record {
            Some(SessionRecord::Active(transcoder)) => {
                transcoder.teardown().await;
                tracing::info!(session = %session_id, "stream stopped");
            }
            Some(SessionRecord::Pending(_)) => {
                tracing::debug!(session = %session_id, "pending session released");
            }
            None => {
                tracing::debug!(session = %session_id, "stop on unknown session");
            }
        }
    }

    /// Stop every tracked session
    pub async fn stop_all(&self) {
        let ids: Vec<String> = self.sessions.lock().await.keys().cloned().collect();
        for id in ids {
            self.stop(&id).await;
        }
    }

    /// Fetch a still snapshot from the device camera
    ///
    /// Not session-scoped; delegates to the device client's binary fetch.
    pub async fn snapshot(&self, width: u32, height: u32) -> Result<Vec<u8>> {
        Ok(self.client.snapshot(width, height).await?)
    }
}

/// Fresh random synchronization source
///
/// Kept in the positive 31-bit range so every downstream consumer that
/// parses the value as a signed integer accepts it.
fn generate_ssrc() -> u32 {
    loop {
        let ssrc = rand::random::<u32>() & 0x7fff_ffff;
        if ssrc != 0 {
            return ssrc;
        }
    }
}
