// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The submission collaborator: keeps submitted command buffers, and the
//! resources they reference, alive until the GPU reports completion.

use std::collections::VecDeque;
use vesta_core::renderer::{CommandBuffer, RenderError};

/// Settings of a [`SubmissionQueue`].
#[derive(Debug, Clone)]
pub struct QueueSettings {
    /// Soft budget of command buffers in flight. Exceeding it logs a warning.
    pub max_in_flight: usize,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self { max_in_flight: 3 }
    }
}

/// Position of a submission in the queue. Increases by one per non-empty submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubmissionIndex(pub u64);

/// Reports finished submissions to a [`SubmissionQueue`].
///
/// Cloneable and `Send`, so a GPU completion callback on another thread can hold one.
#[derive(Debug, Clone)]
pub struct CompletionSignal {
    sender: flume::Sender<SubmissionIndex>,
}

impl CompletionSignal {
    /// Reports that the GPU finished `index`, and everything submitted before it.
    ///
    /// Returns `false` if the queue no longer exists.
    pub fn signal(&self, index: SubmissionIndex) -> bool {
        self.sender.send(index).is_ok()
    }
}

/// A single, in-order execution queue.
#[derive(Debug)]
pub struct SubmissionQueue {
    settings: QueueSettings,
    next_index: u64,
    in_flight: VecDeque<(SubmissionIndex, CommandBuffer)>,
    last_completed: Option<SubmissionIndex>,
    completion_tx: flume::Sender<SubmissionIndex>,
    completion_rx: flume::Receiver<SubmissionIndex>,
}

impl SubmissionQueue {
    /// Creates an empty queue.
    pub fn new(settings: QueueSettings) -> Self {
        let (completion_tx, completion_rx) = flume::unbounded();
        Self {
            settings,
            next_index: 0,
            in_flight: VecDeque::new(),
            last_completed: None,
            completion_tx,
            completion_rx,
        }
    }

    /// Seals `command_buffer` and keeps it in flight until its completion is signaled.
    ///
    /// A buffer without recorded work is not submitted. Its resources are
    /// released at once and `Ok(None)` is returned.
    ///
    /// # Errors
    /// - [`RenderError::InvalidCommandBuffer`] if a protocol violation invalidated the buffer.
    /// - [`RenderError::UnterminatedRenderPass`] if a render pass is still active.
    /// - Any error the backend reports while sealing, e.g. [`RenderError::DeviceLost`].
    ///
    /// A rejected buffer is dropped, which releases its resources.
    pub fn submit(
        &mut self,
        mut command_buffer: CommandBuffer,
    ) -> Result<Option<SubmissionIndex>, RenderError> {
        if command_buffer.is_invalid() {
            log::error!(
                "Refusing to submit invalid command buffer '{}'",
                command_buffer.label()
            );
            return Err(RenderError::InvalidCommandBuffer);
        }
        if command_buffer.is_recording_pass() {
            log::error!(
                "Refusing to submit command buffer '{}' with an active render pass",
                command_buffer.label()
            );
            return Err(RenderError::UnterminatedRenderPass);
        }
        if !command_buffer.has_work() {
            let released = command_buffer.release_resources();
            log::debug!(
                "Skipping empty command buffer '{}' ({released} resources released)",
                command_buffer.label()
            );
            return Ok(None);
        }

        command_buffer.backend_mut().finish()?;

        let index = SubmissionIndex(self.next_index);
        self.next_index += 1;
        log::debug!(
            "Submitted command buffer '{}' as {:?}",
            command_buffer.label(),
            index
        );
        self.in_flight.push_back((index, command_buffer));

        if self.in_flight.len() > self.settings.max_in_flight {
            log::warn!(
                "{} command buffers in flight, budget is {}",
                self.in_flight.len(),
                self.settings.max_in_flight
            );
        }
        Ok(Some(index))
    }

    /// A handle the GPU side uses to report finished submissions.
    pub fn completion_signal(&self) -> CompletionSignal {
        CompletionSignal {
            sender: self.completion_tx.clone(),
        }
    }

    /// Retires every submission the GPU reported complete and returns how many
    /// command buffers were torn down. Never blocks.
    ///
    /// Execution is in order, so a signal for index `k` retires every in-flight
    /// submission up to and including `k`.
    ///
    /// Signals for indices that were never issued are ignored.
    pub fn poll(&mut self) -> usize {
        let issued = SubmissionIndex(self.next_index);
        let completed = self
            .completion_rx
            .try_iter()
            .filter(|&index| {
                if index >= issued {
                    log::warn!("Ignoring completion of {:?}, which was never submitted", index);
                    false
                } else {
                    true
                }
            })
            .max();
        let Some(completed) = completed else {
            return 0;
        };
        self.last_completed = self.last_completed.max(Some(completed));
        self.retire_while(|index| index <= completed)
    }

    /// Tears down every in-flight submission without waiting for completion.
    ///
    /// Use this once the device is lost or idle; no signal will arrive for
    /// these submissions.
    pub fn retire_all(&mut self) -> usize {
        self.retire_while(|_| true)
    }

    /// Number of submissions waiting for completion.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// The highest index reported complete so far.
    pub fn last_completed(&self) -> Option<SubmissionIndex> {
        self.last_completed
    }

    /// The in-flight command buffer submitted as `index`.
    pub fn get(&self, index: SubmissionIndex) -> Option<&CommandBuffer> {
        self.in_flight
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, command_buffer)| command_buffer)
    }

    fn retire_while(&mut self, mut done: impl FnMut(SubmissionIndex) -> bool) -> usize {
        let mut retired = 0;
        while let Some((index, _)) = self.in_flight.front() {
            if !done(*index) {
                break;
            }
            if let Some((index, mut command_buffer)) = self.in_flight.pop_front() {
                let released = command_buffer.release_resources();
                log::debug!(
                    "Retired {:?} ('{}'), released {released} resources",
                    index,
                    command_buffer.label()
                );
                retired += 1;
            }
        }
        retired
    }
}

impl Default for SubmissionQueue {
    fn default() -> Self {
        Self::new(QueueSettings::default())
    }
}
