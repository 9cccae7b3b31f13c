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

//! Backend-agnostic command recording.
//!
//! This module is the contract between rendering code and a GPU backend. Callers
//! record work into a [`CommandBuffer`] using shared resource handles from
//! [`api`]. The buffer enforces the render pass protocol and keeps every
//! referenced resource alive, then forwards each operation to a
//! [`BackendEncoder`] that a concrete backend in `vesta-infra` implements.

pub mod api;
pub mod command;
pub mod error;
pub mod settings;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::command::{
    CommandBuffer, PassState, RecordResult, RenderPassEncoder, ResourceTracker, TrackedResource,
};
pub use self::error::{ProtocolViolation, RenderError};
pub use self::settings::{RecorderSettings, ValidationMode};
pub use self::traits::BackendEncoder;
