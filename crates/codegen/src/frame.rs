//! Simulated operand-stack state of the code being generated.

use rustc_hash::FxHashMap;
use talon_ast::{StmtId, VarId};

/// The compiler's model of the current activation.
///
/// `height` is the number of bytes pushed onto the operand stack since the frame was entered
/// (after the saved receiver, for methods). A variable at static offset `off` lives at
/// `height + off` bytes above the runtime stack pointer.
///
/// The stack grows downward and every push or pop the generated code performs must be mirrored
/// here, otherwise every later offset is wrong.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    height: i32,
    /// Static offsets of the locals declared so far.
    locals: FxHashMap<VarId, i32>,
    /// Stack height at the exit of each enclosing `while`.
    loop_exits: FxHashMap<StmtId, i32>,
}

impl Frame {
    /// Creates a frame with nothing pushed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current stack height in bytes.
    #[inline]
    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Records a push of `bytes`.
    #[inline]
    pub fn push(&mut self, bytes: i32) {
        self.height += bytes;
    }

    /// Records a pop of `bytes`.
    #[inline]
    #[track_caller]
    pub fn pop(&mut self, bytes: i32) {
        self.height -= bytes;
        if self.height < 0 {
            bug!("operand stack underflow by {} bytes", -self.height);
        }
    }

    /// Resets the height to a previously observed value, returning how many bytes were dropped.
    #[track_caller]
    pub fn restore(&mut self, height: i32) -> i32 {
        let dropped = self.height - height;
        if dropped < 0 {
            bug!("cannot restore stack height {height} from lower height {}", self.height);
        }
        self.height = height;
        dropped
    }

    /// Declares `var` as occupying the value just pushed and returns its static offset.
    pub fn declare_local(&mut self, var: VarId) -> i32 {
        let offset = -self.height;
        if self.locals.insert(var, offset).is_some() {
            bug!("local {var} declared twice");
        }
        offset
    }

    /// Returns the static offset of a local declared earlier in this frame.
    #[track_caller]
    pub fn local_offset(&self, var: VarId) -> i32 {
        match self.locals.get(&var) {
            Some(&offset) => offset,
            None => bug!("local {var} used before its declaration"),
        }
    }

    /// Records the current height as the exit height of loop `stmt`.
    pub fn enter_loop(&mut self, stmt: StmtId) {
        self.loop_exits.insert(stmt, self.height);
    }

    /// Returns the exit height recorded for loop `stmt`.
    #[track_caller]
    pub fn loop_exit(&self, stmt: StmtId) -> i32 {
        match self.loop_exits.get(&stmt) {
            Some(&height) => height,
            None => bug!("`break` outside of loop {stmt}"),
        }
    }
}
