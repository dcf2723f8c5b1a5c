pub mod chime;

use chime::Chime;

use rodio::{OutputStream, Sink};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::thread;

use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

/// Where the countdown-expiry bell goes. Implementations never fail outward.
pub trait ChimeSink: Send + Sync {
    fn play_chime(&self);
}

/// Headless hosts and tests.
pub struct SilentChime;

impl ChimeSink for SilentChime {
    fn play_chime(&self) {}
}

enum AudioCommand {
    PlayChime,
    Stop,
}

/// Owns a dedicated audio thread; rodio output streams are not `Send`.
pub struct AudioEngineHandle {
    tx: Arc<Mutex<Option<Sender<AudioCommand>>>>,
    enabled: Arc<AtomicBool>,
}

impl AudioEngineHandle {
    pub fn new(enabled: bool) -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn ensure_thread(&self) -> Result<Sender<AudioCommand>, String> {
        if let Some(tx) = self.tx.lock().map_err(|e| e.to_string())?.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();

        thread::Builder::new()
            .name("audio-engine".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;

                fn ensure_sink(
                    stream: &mut Option<OutputStream>,
                    sink: &mut Option<Sink>,
                ) -> Result<(), String> {
                    if sink.is_none() {
                        let (s, handle) = OutputStream::try_default()
                            .map_err(|e| format!("Failed to create audio output stream: {}", e))?;
                        let new_sink = Sink::try_new(&handle)
                            .map_err(|e| format!("Failed to create audio sink: {}", e))?;
                        *stream = Some(s);
                        *sink = Some(new_sink);
                    }
                    Ok(())
                }

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        AudioCommand::PlayChime => {
                            if let Err(err) = ensure_sink(&mut _stream, &mut sink) {
                                log_warn!("Chime skipped: {}", err);
                                continue;
                            }
                            if let Some(ref s) = sink {
                                s.append(Chime::new());
                                s.play();
                            }
                        }
                        AudioCommand::Stop => {
                            if let Some(s_old) = sink.take() {
                                s_old.stop();
                            }
                            _stream = None;
                        }
                    }
                }
                log_info!("Audio thread shutting down");
            })
            .map_err(|e| e.to_string())?;

        let tx_clone = tx.clone();
        *self.tx.lock().map_err(|e| e.to_string())? = Some(tx);
        Ok(tx_clone)
    }

    pub fn stop(&self) -> Result<(), String> {
        if let Ok(Some(tx)) = self.tx.lock().map(|g| g.clone()) {
            let _ = tx.send(AudioCommand::Stop);
        }
        Ok(())
    }
}

impl ChimeSink for AudioEngineHandle {
    fn play_chime(&self) {
        if !self.is_enabled() {
            return;
        }
        let sent = self
            .ensure_thread()
            .and_then(|tx| tx.send(AudioCommand::PlayChime).map_err(|e| e.to_string()));
        if let Err(err) = sent {
            log_warn!("Audio unavailable, chime dropped: {}", err);
        }
    }
}
