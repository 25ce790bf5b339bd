use std::collections::VecDeque;

use super::types::InputEvent;

/// Something the driver can drain once per frame.
pub trait InputSource {
    /// Returns every event that arrived since the previous call, in arrival order.
    fn poll(&mut self) -> Vec<InputEvent>;
}

/// FIFO of pending events.
///
/// The window runtime pushes translated platform events as they arrive; the
/// driver drains the whole queue at the start of each frame.
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: VecDeque<InputEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ev: InputEvent) {
        self.pending.push_back(ev);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl InputSource for EventQueue {
    fn poll(&mut self) -> Vec<InputEvent> {
        self.pending.drain(..).collect()
    }
}

/// Replays a fixed script of per-frame event batches.
///
/// Each `poll` yields the next batch. When the script runs out, `poll`
/// returns nothing, or a single `Quit` if built with [`ScriptedInput::quit_when_done`].
#[derive(Debug, Default)]
pub struct ScriptedInput {
    frames: VecDeque<Vec<InputEvent>>,
    quit_when_done: bool,
}

impl ScriptedInput {
    pub fn new<I>(frames: I) -> Self
    where
        I: IntoIterator<Item = Vec<InputEvent>>,
    {
        Self {
            frames: frames.into_iter().collect(),
            quit_when_done: false,
        }
    }

    /// A script of `n` empty frames.
    pub fn idle(n: usize) -> Self {
        Self::new(std::iter::repeat_with(Vec::new).take(n))
    }

    pub fn quit_when_done(mut self) -> Self {
        self.quit_when_done = true;
        self
    }

    /// Frames left in the script.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Vec<InputEvent> {
        match self.frames.pop_front() {
            Some(batch) => batch,
            None if self.quit_when_done => vec![InputEvent::Quit],
            None => Vec::new(),
        }
    }
}
