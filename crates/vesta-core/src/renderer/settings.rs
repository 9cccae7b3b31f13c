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

//! Settings for command recording.

/// How a command buffer reacts to a protocol violation.
///
/// In both modes the violation is logged and the command buffer becomes invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Panic on the spot.
    Fatal,
    /// Return the violation to the caller.
    Report,
}

impl Default for ValidationMode {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            ValidationMode::Fatal
        } else {
            ValidationMode::Report
        }
    }
}

/// Settings applied to a single command buffer when it is created.
#[derive(Debug, Clone, Default)]
pub struct RecorderSettings {
    /// The reaction to protocol violations.
    pub validation: ValidationMode,
    /// An optional debug label, used in log output.
    pub label: Option<String>,
}

impl RecorderSettings {
    /// Settings that report violations instead of panicking.
    pub fn reporting() -> Self {
        Self {
            validation: ValidationMode::Report,
            label: None,
        }
    }

    /// Sets the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
