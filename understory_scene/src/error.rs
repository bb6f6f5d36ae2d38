// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors for fallible scene mutations.

use crate::types::NodeId;

/// Error returned by structural scene edits.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneError {
    /// The node id does not refer to a live node.
    #[error("node {0:?} is not alive")]
    StaleNode(NodeId),

    /// Attaching `node` under `parent` would make `node` its own ancestor.
    #[error("attaching {node:?} under {parent:?} would create a cycle")]
    Cycle {
        /// Node being attached.
        node: NodeId,
        /// Requested parent, which is `node` itself or one of its descendants.
        parent: NodeId,
    },
}
