use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};

/// Event handler for terminal events
pub struct EventHandler {
    /// Poll timeout while the stack is at rest
    idle_rate: Duration,
    /// Poll timeout while an animation needs frames
    frame_rate: Duration,
}

impl EventHandler {
    pub fn new(idle_rate_ms: u64, frame_rate_fps: u32) -> Self {
        let fps = frame_rate_fps.max(1);
        Self {
            idle_rate: Duration::from_millis(idle_rate_ms),
            frame_rate: Duration::from_micros(1_000_000 / u64::from(fps)),
        }
    }

    /// Poll for the next event, waking up at the idle rate
    pub fn next(&self) -> Result<Option<AppEvent>> {
        self.poll(self.idle_rate)
    }

    /// Poll for the next event, waking up in time for the next frame
    pub fn next_frame(&self) -> Result<Option<AppEvent>> {
        self.poll(self.frame_rate)
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_rate
    }

    fn poll(&self, timeout: Duration) -> Result<Option<AppEvent>> {
        if !event::poll(timeout)? {
            return Ok(Some(AppEvent::Tick));
        }
        match event::read()? {
            Event::Key(key) => {
                // Some terminals also report releases
                if key.kind == KeyEventKind::Press {
                    Ok(Some(AppEvent::Key(key)))
                } else {
                    Ok(None)
                }
            }
            Event::Mouse(mouse) => match mouse.kind {
                // Hover reports would wake the loop for nothing
                MouseEventKind::Moved => Ok(None),
                _ => Ok(Some(AppEvent::Mouse(mouse))),
            },
            Event::Resize(w, h) => Ok(Some(AppEvent::Resize(w, h))),
            _ => Ok(None),
        }
    }
}

/// Application events
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    /// Button, drag or wheel report
    Mouse(MouseEvent),
    Resize(u16, u16),
    /// Nothing arrived before the timeout
    Tick,
}
