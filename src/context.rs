//! Render Context
//!
//! A stack of scope frames. Lookups walk from the innermost frame outwards.
//! The bottom frame always holds the render-wide globals.

use crate::scope::Scope;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Request-scoped data, visible everywhere
    Globals,
    /// Bindings computed for a component (or the data of a top-level render)
    Component,
    /// One loop iteration, or bindings restored from a capture
    Loop,
    /// A `with` block
    With,
    /// Slot data, default-content bindings and flattened caller scopes
    Block,
}

#[derive(Debug, Clone)]
struct Frame {
    kind: FrameKind,
    scope: Scope,
}

#[derive(Debug, Clone)]
pub struct Context {
    frames: Vec<Frame>,
}

impl Context {
    pub fn new(globals: Scope) -> Self {
        Self {
            frames: vec![Frame {
                kind: FrameKind::Globals,
                scope: globals,
            }],
        }
    }

    pub fn push(&mut self, kind: FrameKind, scope: Scope) {
        self.frames.push(Frame { kind, scope });
    }

    /// Pops the innermost frame. The globals frame is never popped.
    pub fn pop(&mut self) -> Option<Scope> {
        if self.frames.len() <= 1 {
            return None;
        }
        self.frames.pop().map(|f| f.scope)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|f| f.scope.get(name))
    }

    /// Flattened bindings of every frame pushed at or above `depth`.
    pub fn snapshot_since(&self, depth: usize) -> Scope {
        let mut snapshot = Scope::new();
        for frame in self.frames.iter().skip(depth) {
            if frame.kind != FrameKind::Globals {
                snapshot.merge(&frame.scope);
            }
        }
        snapshot
    }

    /// Where a fill snapshot taken at `depth` starts: the first loop frame
    /// above the innermost component frame, if it lies below `depth`.
    /// Frames nested inside that loop come along; a `with` outside any
    /// loop does not.
    pub fn capture_start(&self, depth: usize) -> usize {
        let component = self
            .frames
            .iter()
            .rposition(|f| f.kind == FrameKind::Component)
            .unwrap_or(0);
        self.frames
            .iter()
            .enumerate()
            .skip(component + 1)
            .find(|(_, f)| f.kind == FrameKind::Loop)
            .map_or(depth, |(index, _)| index.min(depth))
    }

    /// Flattened bindings of the whole chain above the globals.
    pub fn ambient(&self) -> Scope {
        self.snapshot_since(1)
    }
}
