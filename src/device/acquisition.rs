// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Running scans off the UI thread.
//!
//! A scan blocks for as long as the hardware takes, so it runs on a worker
//! thread. The outcome comes back as a [`ScanEvent`] which the UI polls for
//! once per frame and hands to its [`ScanEventHandler`].

use super::ScanSource;
use crate::models::scan::ScanResult;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::{Arc, Mutex};

/// An open scanner shared between the UI and scan threads.
pub type SharedSource = Arc<Mutex<Box<dyn ScanSource>>>;

pub fn share(source: Box<dyn ScanSource>) -> SharedSource {
    Arc::new(Mutex::new(source))
}

/// Outcome of a scan.
#[derive(Debug)]
pub enum ScanEvent {
    /// A full scan finished and should be saved.
    ImageReady(ScanResult),
    /// A preview scan finished.
    PreviewReady(ScanResult),
    /// The scan failed; carries the message shown to the user.
    Failed(String),
}

/// Receiver of scan outcomes.
pub trait ScanEventHandler {
    fn image_ready(&mut self, scan: ScanResult);
    fn preview_ready(&mut self, scan: ScanResult);
    fn scan_failed(&mut self, message: String);
}

impl ScanEvent {
    pub fn dispatch(self, handler: &mut dyn ScanEventHandler) {
        match self {
            ScanEvent::ImageReady(scan) => handler.image_ready(scan),
            ScanEvent::PreviewReady(scan) => handler.preview_ready(scan),
            ScanEvent::Failed(message) => handler.scan_failed(message),
        }
    }
}

/// At most one scan in flight.
#[derive(Default)]
pub struct Acquisition {
    receiver: Option<Receiver<ScanEvent>>,
}

impl Acquisition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.receiver.is_some()
    }

    /// Start a scan on a background thread. Ignored while one is running.
    pub fn start(&mut self, source: SharedSource, preview: bool) {
        if self.is_running() {
            log::warn!("Scan requested while another is running");
            return;
        }

        let (sender, receiver) = channel();
        self.receiver = Some(receiver);

        std::thread::spawn(move || {
            let result = match source.lock() {
                Ok(mut source) => source.acquire(preview),
                Err(_) => Err(anyhow::anyhow!("The scanner is unavailable after an earlier failure")),
            };

            let event = match result {
                Ok(scan) if preview => ScanEvent::PreviewReady(scan),
                Ok(scan) => ScanEvent::ImageReady(scan),
                Err(e) => {
                    log::error!("Scan failed: {:#}", e);
                    ScanEvent::Failed(format!("{:#}", e))
                }
            };

            let _ = sender.send(event);
        });
    }

    /// Take the finished scan's event, if there is one.
    pub fn poll(&mut self) -> Option<ScanEvent> {
        let receiver = self.receiver.as_ref()?;
        match receiver.try_recv() {
            Ok(event) => {
                self.receiver = None;
                Some(event)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.receiver = None;
                Some(ScanEvent::Failed("The scan ended unexpectedly".to_string()))
            }
        }
    }
}
