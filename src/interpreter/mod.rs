//! Tree-walking, single-steppable evaluator.
//!
//! The step-engine is a plain enum-and-match state machine with no
//! hidden transitions: `Idle/Ready/Running/Paused/Finished`, driven by
//! explicit `run()`/`step()`/`pause()` calls rather than an implicit
//! run loop.
//!
//! True mid-statement pause/resume across an arbitrary call chain would
//! need a continuation-passing evaluator; that's out of scope. Instead,
//! the currently-driven function (always `main`, since `initialize`
//! starts there) executes through an explicit [`ExecFrame`] stack so
//! `step()`/`run()` can suspend and resume it one statement at a time —
//! including inside nested blocks, `if`/`switch` branches, and loops.
//! Any *other* function reached through a call runs to completion inside
//! one step via [`Self::call_user_function`] (a plain recursive
//! evaluator) — a "step over calls" policy, same default most debuggers
//! ship with.

mod library;
mod rng;

use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{Ast, AssignOp, BinOp, Declarator, IncDecOp, NodeId, NodeKind, StorageClass, TypeName, UnaryOp};
use crate::error::{RuntimeErrorKind, SemanticErrorKind, SourceError};
use crate::io::IoSimulator;
use crate::memory::{byte_size_of, MemResult, MemoryManager, MemorySnapshot, Value};
use crate::options::Options;
use crate::recorder::{ExecutionReport, ExecutionState, ExecutionSummary, InstructionKind, Recorder};
use rng::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum RunState {
    Idle,
    Ready,
    Running,
    Paused,
    Finished,
}

#[derive(Debug)]
pub enum StepResult {
    Paused,
    NeedsInput,
    BreakpointHit,
    Finished(ExecutionReport),
    Errored(SourceError),
}

/// Internal control-flow error channel. `Runtime` carries a bare
/// `RuntimeErrorKind` (library calls have no `NodeId` to stamp a line/col
/// onto); [`Interpreter::finalize_eval_error`] promotes it to `Source` as
/// soon as the call site is known. `NeedsInput` and `Exit` aren't errors
/// at all — they're control signals that unwind through the same `?`
/// plumbing as real errors.
#[derive(Debug)]
enum EvalError {
    Source(SourceError),
    Runtime(RuntimeErrorKind),
    NeedsInput,
    Exit(i32),
}

impl From<SourceError> for EvalError {
    fn from(e: SourceError) -> Self {
        EvalError::Source(e)
    }
}

enum StepSignal {
    Normal,
    Break,
    Continue,
    Return(Value),
}

enum StmtOutcome {
    Normal,
    Break,
    Continue,
    Return(Value),
}

enum ForPhase {
    CheckCond,
    RunInc,
}

enum ExecFrame {
    Seq { stmts: Vec<NodeId>, index: usize, pop_block: bool, is_switch: bool },
    While { cond: NodeId, body: NodeId },
    DoWhile { cond: NodeId, body: NodeId, entered: bool },
    For { cond: NodeId, inc: NodeId, body: NodeId, phase: ForPhase },
}

fn now_ms() -> u64 {
    std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

pub struct Interpreter {
    ast: Ast,
    options: Options,
    file: Rc<str>,
    pub(crate) memory: MemoryManager,
    pub(crate) io: IoSimulator,
    pub(crate) rng: Rng,
    recorder: Recorder,
    state: RunState,
    step_count: u64,
    functions: HashMap<String, NodeId>,
    struct_layouts: HashMap<String, Vec<(String, TypeName)>>,
    exec_stack: Vec<ExecFrame>,
    paused_requested: bool,
    pending_output: String,
    listeners: Vec<Box<dyn FnMut(&ExecutionState)>>,
}

impl Interpreter {
    pub fn new(ast: Ast, options: Options, file: Rc<str>) -> Self {
        let mut interp = Interpreter {
            ast,
            file,
            memory: MemoryManager::new(),
            io: IoSimulator::new(),
            rng: Rng::default(),
            recorder: Recorder::new(options.max_history),
            state: RunState::Idle,
            step_count: 0,
            functions: HashMap::new(),
            struct_layouts: HashMap::new(),
            exec_stack: Vec::new(),
            paused_requested: false,
            pending_output: String::new(),
            options,
        };
        interp.initialize();
        interp
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn on_state(&mut self, listener: impl FnMut(&ExecutionState) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn add_breakpoint(&mut self, line: u32) {
        self.recorder.add_breakpoint(line);
    }

    pub fn remove_breakpoint(&mut self, line: u32) {
        self.recorder.remove_breakpoint(line);
    }

    pub fn has_breakpoint(&self, line: u32) -> bool {
        self.recorder.has_breakpoint(line)
    }

    pub fn provide_input(&mut self, text: &str) {
        self.io.provide_input(text);
    }

    /// Drains output produced since the last call — the live-UI-facing
    /// counterpart of the recorder's per-state `last_output_delta`.
    pub fn consume_output(&mut self) -> String {
        std::mem::take(&mut self.pending_output)
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        self.memory.snapshot()
    }

    pub fn rewind(&mut self) -> Option<&ExecutionState> {
        self.recorder.rewind()
    }

    pub fn step_forward(&mut self) -> Option<&ExecutionState> {
        self.recorder.advance()
    }

    pub fn has_previous(&self) -> bool {
        self.recorder.has_previous()
    }

    pub fn has_next(&self) -> bool {
        self.recorder.has_next()
    }

    pub fn pause(&mut self) {
        self.paused_requested = true;
    }

    /// Re-runs `initialize` against the same AST. There is no separate
    /// `Idle` phase reachable from here — this interpreter only ever
    /// holds one AST, set once in `new`, so "re-initialize with a new
    /// program" isn't a distinct operation from "start over".
    pub fn reset(&mut self) {
        self.initialize();
    }

    fn initialize(&mut self) {
        self.struct_layouts.clear();
        self.functions.clear();
        self.memory = MemoryManager::new();
        self.io = IoSimulator::new();
        self.exec_stack.clear();
        self.step_count = 0;
        self.pending_output.clear();
        self.recorder.start_execution(now_ms());

        for i in 0..self.ast.len() {
            let id = NodeId(i as u32);
            let kind = self.ast.kind(id).clone();
            if let NodeKind::StructSpecifier { tag: Some(tag), members } | NodeKind::UnionSpecifier { tag: Some(tag), members } = kind {
                let mut fields = Vec::new();
                for m in members {
                    if let NodeKind::StructMemberDecl { members: fs } = self.ast.kind(m).clone() {
                        for f in fs {
                            if let NodeKind::StructMember { name, ty, .. } = self.ast.kind(f).clone() {
                                fields.push((name, ty));
                            }
                        }
                    }
                }
                // Usage sites re-mention a tag with no member list
                // (`struct Point p;` after the type is already defined);
                // only overwrite a previously captured layout when this
                // occurrence actually carries fields.
                if !fields.is_empty() || !self.struct_layouts.contains_key(&tag) {
                    self.struct_layouts.insert(tag, fields);
                }
            }
        }

        let decls = match self.ast.kind(self.ast.root()).clone() {
            NodeKind::TranslationUnit { decls } => decls,
            _ => vec![],
        };
        for &id in &decls {
            match self.ast.kind(id).clone() {
                NodeKind::FunctionDef { name, .. } => {
                    self.functions.insert(name, id);
                }
                NodeKind::VarDecl { declarator, storage, init, .. } => self.declare_global_decl(&declarator, storage, init),
                NodeKind::MultiVarDecl { decls: inner } => {
                    for d in inner {
                        if let NodeKind::VarDecl { declarator, storage, init, .. } = self.ast.kind(d).clone() {
                            self.declare_global_decl(&declarator, storage, init);
                        }
                    }
                }
                NodeKind::EnumSpecifier { enumerators, .. } => self.declare_enumerators(&enumerators),
                _ => {}
            }
        }

        self.state = RunState::Ready;
    }

    fn declare_global_decl(&mut self, decl: &Declarator, storage: Option<StorageClass>, init: Option<NodeId>) {
        let cells = self.cells_for(&decl.ty);
        let addr = if matches!(storage, Some(StorageClass::Static)) {
            self.memory.declare_static_sized(&decl.name, "<file>", &decl.ty, cells)
        } else {
            self.memory.declare_global_sized(&decl.name, &decl.ty, cells)
        };
        if let Some(init_id) = init {
            let _ = self.init_cells(addr, &decl.ty, init_id);
        }
    }

    fn declare_enumerators(&mut self, enumerators: &[NodeId]) {
        let mut next = 0i64;
        let int_ty = TypeName { base: "int".into(), pointer_depth: 0, dimensions: vec![] };
        for &e in enumerators {
            if let NodeKind::Enumerator { name, value } = self.ast.kind(e).clone() {
                let v = match value {
                    Some(expr) => self.eval_expr(expr).map(|v| v.as_i64()).unwrap_or(next),
                    None => next,
                };
                let addr = self.memory.declare_global(&name, &int_ty);
                let _ = self.memory.write(addr, 0, Value::Int(v));
                next = v + 1;
            }
        }
    }

    // --- Step engine ----------------------------------------------------

    pub fn run(&mut self) -> StepResult {
        if self.exec_stack.is_empty() && matches!(self.state, RunState::Ready) {
            if let Some(err) = self.begin_main() {
                return err;
            }
        }
        self.state = RunState::Running;
        self.paused_requested = false;
        let mut first = true;
        loop {
            if !first {
                if let Some(line) = self.peek_next_line() {
                    if self.recorder.has_breakpoint(line) {
                        self.state = RunState::Paused;
                        return StepResult::BreakpointHit;
                    }
                }
            }
            first = false;
            if self.paused_requested {
                self.state = RunState::Paused;
                return StepResult::Paused;
            }
            match self.advance_one() {
                StepResult::Paused => continue,
                other => return other,
            }
        }
    }

    pub fn step(&mut self) -> StepResult {
        if self.exec_stack.is_empty() && matches!(self.state, RunState::Ready) {
            if let Some(err) = self.begin_main() {
                return err;
            }
        }
        self.state = RunState::Running;
        let result = self.advance_one();
        if matches!(result, StepResult::Paused | StepResult::NeedsInput) {
            self.state = RunState::Paused;
        }
        result
    }

    fn begin_main(&mut self) -> Option<StepResult> {
        let Some(&main_id) = self.functions.get("main") else {
            self.state = RunState::Finished;
            return Some(StepResult::Errored(SourceError::new(
                SemanticErrorKind::UnknownIdentifier,
                "no 'main' function defined",
                0,
                0,
                &self.file,
            )));
        };
        if let NodeKind::FunctionDef { body, .. } = self.ast.kind(main_id).clone() {
            self.memory.push_frame("main", None);
            let stmts = match self.ast.kind(body).clone() {
                NodeKind::CompoundStmt { stmts } => stmts,
                _ => vec![body],
            };
            self.exec_stack.push(ExecFrame::Seq { stmts, index: 0, pop_block: false, is_switch: false });
        }
        None
    }

    fn peek_next_line(&self) -> Option<u32> {
        match self.exec_stack.last()? {
            ExecFrame::Seq { stmts, index, .. } => stmts.get(*index).map(|&id| self.ast.get(id).line),
            ExecFrame::While { cond, .. } | ExecFrame::DoWhile { cond, .. } => Some(self.ast.get(*cond).line),
            ExecFrame::For { cond, inc, phase, .. } => {
                Some(self.ast.get(if matches!(phase, ForPhase::RunInc) { *inc } else { *cond }).line)
            }
        }
    }

    fn advance_one(&mut self) -> StepResult {
        loop {
            if self.step_count >= self.options.max_steps {
                return self.fail(RuntimeErrorKind::StepLimit, "maximum step count exceeded");
            }
            let Some(top) = self.exec_stack.len().checked_sub(1) else {
                self.memory.pop_frame().ok();
                return self.finish(0, false, None);
            };
            match &mut self.exec_stack[top] {
                ExecFrame::Seq { stmts, index, pop_block, .. } => {
                    if *index >= stmts.len() {
                        let pop_block = *pop_block;
                        self.exec_stack.pop();
                        if pop_block {
                            self.memory.pop_frame().ok();
                        }
                        continue;
                    }
                    let id = stmts[*index];
                    *index += 1;
                    return self.dispatch_and_record(id);
                }
                ExecFrame::While { cond, body } => {
                    let (cond, body) = (*cond, *body);
                    return self.check_loop_condition(cond, body);
                }
                ExecFrame::DoWhile { cond, body, entered } => {
                    if !*entered {
                        *entered = true;
                        let body = *body;
                        self.exec_stack.push(ExecFrame::Seq { stmts: vec![body], index: 0, pop_block: false, is_switch: false });
                        continue;
                    }
                    let (cond, body) = (*cond, *body);
                    return self.check_loop_condition(cond, body);
                }
                ExecFrame::For { cond, inc, body, phase } => match phase {
                    ForPhase::CheckCond => {
                        let (cond, body) = (*cond, *body);
                        return self.check_loop_condition(cond, body);
                    }
                    ForPhase::RunInc => {
                        let inc = *inc;
                        return self.eval_and_record(inc);
                    }
                },
            }
        }
    }

    fn check_loop_condition(&mut self, cond: NodeId, body: NodeId) -> StepResult {
        match self.eval_expr(cond) {
            Ok(v) => {
                if v.is_truthy() {
                    self.exec_stack.push(ExecFrame::Seq { stmts: vec![body], index: 0, pop_block: false, is_switch: false });
                } else {
                    self.exec_stack.pop();
                }
                self.record_state(cond, InstructionKind::ControlFlow);
                StepResult::Paused
            }
            // The `While`/`DoWhile`/`For`-condition frame is still on top of
            // `exec_stack`, untouched — the next `step()` re-enters it and
            // re-evaluates `cond` from scratch once input is provided.
            Err(EvalError::NeedsInput) => {
                self.state = RunState::Paused;
                StepResult::NeedsInput
            }
            Err(EvalError::Exit(code)) => self.finish(code, false, None),
            Err(e) => self.error_result(e),
        }
    }

    fn eval_and_record(&mut self, expr: NodeId) -> StepResult {
        match self.eval_expr(expr) {
            Ok(_) => {
                if let Some(ExecFrame::For { phase, .. }) = self.exec_stack.last_mut() {
                    *phase = ForPhase::CheckCond;
                }
                self.record_state(expr, InstructionKind::Expression);
                StepResult::Paused
            }
            // Leave the `For` frame's phase at `RunInc` so the next `step()`
            // re-evaluates the increment expression rather than skipping
            // straight to the condition.
            Err(EvalError::NeedsInput) => {
                self.state = RunState::Paused;
                StepResult::NeedsInput
            }
            Err(EvalError::Exit(code)) => self.finish(code, false, None),
            Err(e) => self.error_result(e),
        }
    }

    fn dispatch_and_record(&mut self, id: NodeId) -> StepResult {
        match self.dispatch_stmt(id) {
            Ok(StepSignal::Normal) => {
                let kind = self.instruction_kind_of(id);
                self.record_state(id, kind);
                StepResult::Paused
            }
            Ok(StepSignal::Break) => {
                self.unwind_break();
                self.record_state(id, InstructionKind::ControlFlow);
                StepResult::Paused
            }
            Ok(StepSignal::Continue) => {
                self.unwind_continue();
                self.record_state(id, InstructionKind::ControlFlow);
                StepResult::Paused
            }
            Ok(StepSignal::Return(v)) => {
                self.unwind_return();
                self.record_state(id, InstructionKind::Return);
                self.finish(v.as_i64() as i32, false, None)
            }
            Err(EvalError::NeedsInput) => {
                if let Some(ExecFrame::Seq { index, .. }) = self.exec_stack.last_mut() {
                    *index -= 1;
                }
                self.state = RunState::Paused;
                StepResult::NeedsInput
            }
            Err(EvalError::Exit(code)) => self.finish(code, false, None),
            Err(e) => self.error_result(e),
        }
    }

    fn instruction_kind_of(&self, id: NodeId) -> InstructionKind {
        match self.ast.kind(id) {
            NodeKind::VarDecl { .. } | NodeKind::MultiVarDecl { .. } | NodeKind::TypedefDecl { .. } => InstructionKind::Declaration,
            NodeKind::ReturnStmt { .. } => InstructionKind::Return,
            NodeKind::IfStmt { .. }
            | NodeKind::SwitchStmt { .. }
            | NodeKind::WhileStmt { .. }
            | NodeKind::DoWhileStmt { .. }
            | NodeKind::ForStmt { .. }
            | NodeKind::CompoundStmt { .. }
            | NodeKind::BreakStmt
            | NodeKind::ContinueStmt
            | NodeKind::GotoStmt { .. }
            | NodeKind::LabeledStmt { .. } => InstructionKind::ControlFlow,
            NodeKind::ExprStmt { expr } => match self.ast.kind(*expr) {
                NodeKind::CallExpr { .. } => InstructionKind::Call,
                _ => InstructionKind::Expression,
            },
            _ => InstructionKind::Expression,
        }
    }

    fn record_state(&mut self, id: NodeId, kind: InstructionKind) {
        self.step_count += 1;
        let node = self.ast.get(id);
        let scope = self.memory.current_function_name().unwrap_or("<global>").to_string();
        let snapshot = self.memory.snapshot();
        let delta = self.io.consume_output();
        let state = ExecutionState::new(self.step_count, node.line, node.column, scope, kind, &snapshot, delta.clone(), now_ms());
        for listener in self.listeners.iter_mut() {
            listener(&state);
        }
        self.recorder.record(state);
        self.pending_output.push_str(&delta);
    }

    fn finish(&mut self, exit_code: i32, errored: bool, message: Option<String>) -> StepResult {
        self.state = RunState::Finished;
        let report = self.recorder.end_execution(ExecutionSummary { exit_code, errored }, message, now_ms());
        StepResult::Finished(report)
    }

    fn fail(&mut self, kind: RuntimeErrorKind, message: &str) -> StepResult {
        self.state = RunState::Finished;
        let err = SourceError::new(kind, message, 0, 0, &self.file);
        self.recorder.end_execution(ExecutionSummary { exit_code: 1, errored: true }, Some(err.to_string()), now_ms());
        StepResult::Errored(err)
    }

    fn error_result(&mut self, e: EvalError) -> StepResult {
        let err = match e {
            EvalError::Source(s) => s,
            EvalError::Runtime(k) => SourceError::new(k, format!("{k:?}"), 0, 0, &self.file),
            EvalError::NeedsInput | EvalError::Exit(_) => unreachable!("handled before reaching error_result"),
        };
        self.state = RunState::Finished;
        self.recorder.end_execution(ExecutionSummary { exit_code: 1, errored: true }, Some(err.to_string()), now_ms());
        StepResult::Errored(err)
    }

    // --- Control-flow dispatch (the stepped function's own statements) --

    fn dispatch_stmt(&mut self, id: NodeId) -> Result<StepSignal, EvalError> {
        let kind = self.ast.kind(id).clone();
        match kind {
            NodeKind::CompoundStmt { stmts } => {
                let scope = self.memory.current_function_name().map(str::to_string);
                self.memory.push_frame("", scope);
                self.exec_stack.push(ExecFrame::Seq { stmts, index: 0, pop_block: true, is_switch: false });
                Ok(StepSignal::Normal)
            }
            NodeKind::IfStmt { cond, then_branch, else_branch } => {
                let v = self.eval_expr(cond)?;
                let chosen = if v.is_truthy() { Some(then_branch) } else { else_branch };
                if let Some(c) = chosen {
                    self.exec_stack.push(ExecFrame::Seq { stmts: vec![c], index: 0, pop_block: false, is_switch: false });
                }
                Ok(StepSignal::Normal)
            }
            NodeKind::WhileStmt { cond, body } => {
                self.exec_stack.push(ExecFrame::While { cond, body });
                Ok(StepSignal::Normal)
            }
            NodeKind::DoWhileStmt { body, cond } => {
                self.exec_stack.push(ExecFrame::DoWhile { cond, body, entered: false });
                Ok(StepSignal::Normal)
            }
            NodeKind::ForStmt { init, cond, inc, body } => {
                self.dispatch_stmt(init)?;
                self.exec_stack.push(ExecFrame::For { cond, inc, body, phase: ForPhase::CheckCond });
                Ok(StepSignal::Normal)
            }
            NodeKind::SwitchStmt { cond, body } => {
                let v = self.eval_expr(cond)?;
                self.begin_switch(v, body)?;
                Ok(StepSignal::Normal)
            }
            NodeKind::LabeledStmt { stmt, .. } => {
                self.exec_stack.push(ExecFrame::Seq { stmts: vec![stmt], index: 0, pop_block: false, is_switch: false });
                Ok(StepSignal::Normal)
            }
            NodeKind::CaseStmt { .. } | NodeKind::DefaultStmt { .. } => {
                Err(self.semantic_err(SemanticErrorKind::CaseOutsideSwitch, id, "case/default outside of a switch"))
            }
            NodeKind::GotoStmt { ref label } => self.perform_goto(label, id),
            other => self.exec_leaf(other, id),
        }
    }

    /// Finds a `LabeledStmt` with a matching name among the sibling
    /// statements of the block currently executing, and jumps there.
    /// Labels outside the immediately enclosing block aren't found —
    /// deliberately partial, per-function-scope `goto` without a full CFG.
    fn perform_goto(&mut self, label: &str, id: NodeId) -> Result<StepSignal, EvalError> {
        if let Some(ExecFrame::Seq { stmts, index, .. }) = self.exec_stack.last_mut() {
            if let Some(pos) = stmts.iter().position(|&sid| matches!(self.ast.kind(sid), NodeKind::LabeledStmt { label: l, .. } if l == label))
            {
                *index = pos;
                return Ok(StepSignal::Normal);
            }
        }
        Err(self.runtime_err(RuntimeErrorKind::UnresolvedGoto, id, &format!("label '{label}' could not be resolved")))
    }

    fn begin_switch(&mut self, val: Value, body: NodeId) -> Result<(), EvalError> {
        let stmts = match self.ast.kind(body).clone() {
            NodeKind::CompoundStmt { stmts } => stmts,
            _ => vec![body],
        };
        let mut start = None;
        for (i, &id) in stmts.iter().enumerate() {
            if let NodeKind::CaseStmt { value, .. } = self.ast.kind(id).clone() {
                if self.eval_expr(value)?.as_i64() == val.as_i64() {
                    start = Some(i);
                    break;
                }
            }
        }
        if start.is_none() {
            start = stmts.iter().position(|&id| matches!(self.ast.kind(id), NodeKind::DefaultStmt { .. }));
        }
        let scope = self.memory.current_function_name().map(str::to_string);
        let flattened: Vec<NodeId> = match start {
            Some(start) => stmts[start..]
                .iter()
                .map(|&id| match self.ast.kind(id) {
                    NodeKind::CaseStmt { stmt, .. } => *stmt,
                    NodeKind::DefaultStmt { stmt } => *stmt,
                    _ => id,
                })
                .collect(),
            None => vec![],
        };
        self.memory.push_frame("", scope);
        self.exec_stack.push(ExecFrame::Seq { stmts: flattened, index: 0, pop_block: true, is_switch: true });
        Ok(())
    }

    fn unwind_break(&mut self) {
        while let Some(frame) = self.exec_stack.pop() {
            if let ExecFrame::Seq { pop_block: true, .. } = &frame {
                self.memory.pop_frame().ok();
            }
            match frame {
                ExecFrame::Seq { is_switch: true, .. } | ExecFrame::While { .. } | ExecFrame::DoWhile { .. } | ExecFrame::For { .. } => {
                    return
                }
                _ => continue,
            }
        }
    }

    fn unwind_continue(&mut self) {
        loop {
            match self.exec_stack.last() {
                Some(ExecFrame::While { .. }) | Some(ExecFrame::DoWhile { .. }) => return,
                Some(ExecFrame::For { .. }) => {
                    if let Some(ExecFrame::For { phase, .. }) = self.exec_stack.last_mut() {
                        *phase = ForPhase::RunInc;
                    }
                    return;
                }
                Some(ExecFrame::Seq { .. }) => {
                    if let Some(ExecFrame::Seq { pop_block, .. }) = self.exec_stack.pop() {
                        if pop_block {
                            self.memory.pop_frame().ok();
                        }
                    }
                }
                None => return,
            }
        }
    }

    fn unwind_return(&mut self) {
        while let Some(frame) = self.exec_stack.pop() {
            if let ExecFrame::Seq { pop_block: true, .. } = frame {
                self.memory.pop_frame().ok();
            }
        }
    }

    fn exec_leaf(&mut self, kind: NodeKind, id: NodeId) -> Result<StepSignal, EvalError> {
        match kind {
            NodeKind::ExprStmt { expr } => {
                self.eval_expr(expr)?;
                Ok(StepSignal::Normal)
            }
            NodeKind::EmptyStmt | NodeKind::EmptyDeclaration => Ok(StepSignal::Normal),
            NodeKind::TypedefDecl { .. } | NodeKind::FunctionDecl { .. } => Ok(StepSignal::Normal),
            NodeKind::StructSpecifier { .. } | NodeKind::UnionSpecifier { .. } | NodeKind::EnumSpecifier { .. } => Ok(StepSignal::Normal),
            NodeKind::VarDecl { declarator, storage, init, .. } => {
                self.declare_and_init(id, &declarator, storage, init)?;
                Ok(StepSignal::Normal)
            }
            NodeKind::MultiVarDecl { decls } => {
                for d in decls {
                    let k = self.ast.kind(d).clone();
                    self.exec_leaf(k, d)?;
                }
                Ok(StepSignal::Normal)
            }
            NodeKind::ReturnStmt { value } => {
                let v = match value {
                    Some(e) => self.eval_expr(e)?,
                    None => Value::Int(0),
                };
                Ok(StepSignal::Return(v))
            }
            NodeKind::BreakStmt => Ok(StepSignal::Break),
            NodeKind::ContinueStmt => Ok(StepSignal::Continue),
            other => Err(self.semantic_err(SemanticErrorKind::UnknownIdentifier, id, &format!("cannot execute {other:?} as a statement"))),
        }
    }

    // --- Eager evaluator, used for any call to a function other than the
    //     one currently being stepped ("step over") --------------------

    fn call_user_function(&mut self, func_id: NodeId, args: &[Value], call_id: NodeId) -> Result<Value, EvalError> {
        let (name, params, body) = match self.ast.kind(func_id).clone() {
            NodeKind::FunctionDef { name, params, body, .. } => (name, params, body),
            _ => return Err(self.semantic_err(SemanticErrorKind::CallTargetMissing, call_id, "call target is not a function")),
        };
        self.memory.push_frame(&name, None);
        for (i, &p) in params.iter().enumerate() {
            if let NodeKind::Parameter { name: Some(pname), ty } = self.ast.kind(p).clone() {
                let v = self.cast_value(&ty, args.get(i).copied().unwrap_or(Value::Int(0)));
                self.wrap_mem(self.memory.add_parameter(&pname, &ty, v), call_id)?;
            }
        }
        let body_stmts = match self.ast.kind(body).clone() {
            NodeKind::CompoundStmt { stmts } => stmts,
            _ => vec![body],
        };
        let outcome = self.exec_block_eager(&body_stmts);
        self.memory.pop_frame().ok();
        match outcome? {
            StmtOutcome::Return(v) => Ok(v),
            _ => Ok(Value::Int(0)),
        }
    }

    fn exec_block_eager(&mut self, stmts: &[NodeId]) -> Result<StmtOutcome, EvalError> {
        for &id in stmts {
            match self.exec_stmt_eager(id)? {
                StmtOutcome::Normal => continue,
                other => return Ok(other),
            }
        }
        Ok(StmtOutcome::Normal)
    }

    fn exec_stmt_eager(&mut self, id: NodeId) -> Result<StmtOutcome, EvalError> {
        let kind = self.ast.kind(id).clone();
        match kind {
            NodeKind::CompoundStmt { stmts } => {
                let scope = self.memory.current_function_name().map(str::to_string);
                self.memory.push_frame("", scope);
                let outcome = self.exec_block_eager(&stmts);
                self.memory.pop_frame().ok();
                outcome
            }
            NodeKind::IfStmt { cond, then_branch, else_branch } => {
                if self.eval_expr(cond)?.is_truthy() {
                    self.exec_stmt_eager(then_branch)
                } else if let Some(e) = else_branch {
                    self.exec_stmt_eager(e)
                } else {
                    Ok(StmtOutcome::Normal)
                }
            }
            NodeKind::WhileStmt { cond, body } => {
                while self.eval_expr(cond)?.is_truthy() {
                    match self.exec_stmt_eager(body)? {
                        StmtOutcome::Break => break,
                        StmtOutcome::Continue | StmtOutcome::Normal => {}
                        r @ StmtOutcome::Return(_) => return Ok(r),
                    }
                }
                Ok(StmtOutcome::Normal)
            }
            NodeKind::DoWhileStmt { body, cond } => {
                loop {
                    match self.exec_stmt_eager(body)? {
                        StmtOutcome::Break => break,
                        StmtOutcome::Continue | StmtOutcome::Normal => {}
                        r @ StmtOutcome::Return(_) => return Ok(r),
                    }
                    if !self.eval_expr(cond)?.is_truthy() {
                        break;
                    }
                }
                Ok(StmtOutcome::Normal)
            }
            NodeKind::ForStmt { init, cond, inc, body } => {
                self.exec_stmt_eager(init)?;
                loop {
                    if !self.eval_expr(cond)?.is_truthy() {
                        break;
                    }
                    match self.exec_stmt_eager(body)? {
                        StmtOutcome::Break => break,
                        StmtOutcome::Continue | StmtOutcome::Normal => {}
                        r @ StmtOutcome::Return(_) => return Ok(r),
                    }
                    self.eval_expr(inc)?;
                }
                Ok(StmtOutcome::Normal)
            }
            NodeKind::SwitchStmt { cond, body } => self.exec_switch_eager(cond, body),
            NodeKind::LabeledStmt { stmt, .. } => self.exec_stmt_eager(stmt),
            NodeKind::CaseStmt { .. } | NodeKind::DefaultStmt { .. } => {
                Err(self.semantic_err(SemanticErrorKind::CaseOutsideSwitch, id, "case/default outside of a switch"))
            }
            NodeKind::GotoStmt { label } => {
                Err(self.runtime_err(RuntimeErrorKind::UnresolvedGoto, id, &format!("goto '{label}' not supported in a called function")))
            }
            other => self.exec_leaf(other, id).map(|s| match s {
                StepSignal::Normal => StmtOutcome::Normal,
                StepSignal::Break => StmtOutcome::Break,
                StepSignal::Continue => StmtOutcome::Continue,
                StepSignal::Return(v) => StmtOutcome::Return(v),
            }),
        }
    }

    fn exec_switch_eager(&mut self, cond: NodeId, body: NodeId) -> Result<StmtOutcome, EvalError> {
        let val = self.eval_expr(cond)?;
        let stmts = match self.ast.kind(body).clone() {
            NodeKind::CompoundStmt { stmts } => stmts,
            _ => vec![body],
        };
        let mut start = None;
        for (i, &id) in stmts.iter().enumerate() {
            if let NodeKind::CaseStmt { value, .. } = self.ast.kind(id).clone() {
                if self.eval_expr(value)?.as_i64() == val.as_i64() {
                    start = Some(i);
                    break;
                }
            }
        }
        if start.is_none() {
            start = stmts.iter().position(|&id| matches!(self.ast.kind(id), NodeKind::DefaultStmt { .. }));
        }
        let Some(start) = start else { return Ok(StmtOutcome::Normal) };
        let scope = self.memory.current_function_name().map(str::to_string);
        self.memory.push_frame("", scope);
        let mut result = StmtOutcome::Normal;
        for &id in &stmts[start..] {
            let inner = match self.ast.kind(id) {
                NodeKind::CaseStmt { stmt, .. } => *stmt,
                NodeKind::DefaultStmt { stmt } => *stmt,
                _ => id,
            };
            match self.exec_stmt_eager(inner)? {
                StmtOutcome::Break => break,
                StmtOutcome::Normal => {}
                other => {
                    result = other;
                    break;
                }
            }
        }
        self.memory.pop_frame().ok();
        Ok(result)
    }

    // --- Declarations -----------------------------------------------------

    fn declare_and_init(&mut self, id: NodeId, decl: &Declarator, storage: Option<StorageClass>, init: Option<NodeId>) -> Result<(), EvalError> {
        let cells = self.cells_for(&decl.ty);
        let addr = if matches!(storage, Some(StorageClass::Static)) {
            let scope = self.memory.current_function_name().unwrap_or("<global>").to_string();
            self.memory.declare_static_sized(&decl.name, &scope, &decl.ty, cells)
        } else {
            self.wrap_mem(self.memory.declare_local_sized(&decl.name, &decl.ty, cells), id)?
        };
        if let Some(init_id) = init {
            self.init_cells(addr, &decl.ty, init_id)?;
        }
        Ok(())
    }

    fn init_cells(&mut self, addr: usize, ty: &TypeName, init_id: NodeId) -> Result<(), EvalError> {
        match self.ast.kind(init_id).clone() {
            NodeKind::InitializerList { elements } => {
                let mut pos = 0usize;
                for el in elements {
                    let value_node = match self.ast.kind(el).clone() {
                        NodeKind::DesignatedInit { designators, value } => {
                            if let Some(&d) = designators.first() {
                                match self.ast.kind(d).clone() {
                                    NodeKind::ArrayDesignator { index } => pos = self.eval_expr(index)?.as_usize(),
                                    NodeKind::MemberDesignator { member } => pos = self.member_offset(&ty.base, &member, init_id)?,
                                    _ => {}
                                }
                            }
                            value
                        }
                        _ => el,
                    };
                    let v = self.eval_expr(value_node)?;
                    self.wrap_mem(self.memory.write(addr, pos, v), init_id)?;
                    pos += 1;
                }
                Ok(())
            }
            _ => {
                let v = self.eval_expr(init_id)?;
                self.wrap_mem(self.memory.write(addr, 0, v), init_id)
            }
        }
    }

    fn struct_unit(&self, base: &str) -> usize {
        let key = base.strip_prefix("struct ").or_else(|| base.strip_prefix("union ")).unwrap_or(base);
        self.struct_layouts.get(key).map(|m| m.len().max(1)).unwrap_or(1)
    }

    fn cells_for(&self, ty: &TypeName) -> usize {
        if ty.is_pointer() {
            return 1;
        }
        let unit = self.struct_unit(&ty.base);
        if ty.is_array() {
            let len: i64 = ty.dimensions.iter().map(|d| d.unwrap_or(1).max(1)).product();
            (len.max(1) as usize) * unit
        } else {
            unit
        }
    }

    fn member_offset(&self, tag: &str, member: &str, id: NodeId) -> Result<usize, EvalError> {
        let key = tag.strip_prefix("struct ").or_else(|| tag.strip_prefix("union ")).unwrap_or(tag);
        self.struct_layouts
            .get(key)
            .and_then(|members| members.iter().position(|(n, _)| n == member))
            .ok_or_else(|| self.semantic_err(SemanticErrorKind::UnknownIdentifier, id, &format!("'{tag}' has no member named '{member}'")))
    }

    fn type_tag_of_expr(&self, id: NodeId) -> Option<String> {
        match self.ast.kind(id) {
            NodeKind::IdentifierExpr { name } => self.memory.lookup(name).map(|v| v.type_name),
            NodeKind::MemberExpr { object, member } | NodeKind::ArrowExpr { object, member } => {
                let parent = self.type_tag_of_expr(*object)?;
                let key = parent.strip_prefix("struct ").or_else(|| parent.strip_prefix("union ")).unwrap_or(&parent);
                self.struct_layouts.get(key)?.iter().find(|(n, _)| n == member).map(|(_, ty)| ty.base.clone())
            }
            NodeKind::UnaryExpr { op: UnaryOp::Deref, expr } => self.type_tag_of_expr(*expr),
            _ => None,
        }
    }

    // --- Expressions --------------------------------------------------

    fn eval_expr(&mut self, id: NodeId) -> Result<Value, EvalError> {
        let kind = self.ast.kind(id).clone();
        match kind {
            NodeKind::IntLiteral { value } => Ok(Value::Int(value)),
            NodeKind::FloatLiteral { value } => Ok(Value::Float(value)),
            NodeKind::CharLiteral { value } | NodeKind::Utf8CharLiteral { value } => Ok(Value::Char(value as u8)),
            NodeKind::BoolLiteral { value } => Ok(Value::Int(value as i64)),
            NodeKind::NullptrLiteral => Ok(Value::Pointer(0)),
            NodeKind::StringLiteral { value } | NodeKind::Utf8StringLiteral { value } => {
                Ok(Value::Pointer(self.memory.intern_string_literal(&value)))
            }
            NodeKind::IdentifierExpr { name } => self.read_identifier(&name, id),
            NodeKind::AssignExpr { op, target, value } => self.eval_assign(op, target, value),
            NodeKind::ConditionalExpr { cond, then_expr, else_expr } => {
                if self.eval_expr(cond)?.is_truthy() {
                    self.eval_expr(then_expr)
                } else {
                    self.eval_expr(else_expr)
                }
            }
            NodeKind::BinaryExpr { op, lhs, rhs } => self.eval_binary_expr(op, lhs, rhs, id),
            NodeKind::CastExpr { ty, expr } => {
                let v = self.eval_expr(expr)?;
                Ok(self.cast_value(&ty, v))
            }
            NodeKind::UnaryExpr { op, expr } => self.eval_unary(op, expr, id),
            NodeKind::PrefixExpr { op, expr } => self.eval_incdec(op, expr, true, id),
            NodeKind::PostfixExpr { op, expr } => self.eval_incdec(op, expr, false, id),
            NodeKind::SizeofExpr { expr } => Ok(Value::Int(self.sizeof_expr(expr) as i64)),
            NodeKind::SizeofType { ty } => Ok(Value::Int(byte_size_of(&ty) as i64)),
            NodeKind::AlignofExpr { ty } => Ok(Value::Int(byte_size_of(&ty) as i64)),
            NodeKind::CallExpr { callee, args } => self.eval_call(callee, args, id),
            NodeKind::ArraySubscriptExpr { .. } | NodeKind::MemberExpr { .. } | NodeKind::ArrowExpr { .. } => {
                let addr = self.eval_lvalue(id)?;
                self.wrap_mem(self.memory.read(addr, 0), id)
            }
            NodeKind::CommaExpr { exprs } => {
                let mut last = Value::Int(0);
                for e in exprs {
                    last = self.eval_expr(e)?;
                }
                Ok(last)
            }
            NodeKind::GenericSelection { controlling, associations } => self.eval_generic(controlling, associations),
            other => Err(self.semantic_err(SemanticErrorKind::UnknownIdentifier, id, &format!("not an expression: {other:?}"))),
        }
    }

    fn read_identifier(&mut self, name: &str, id: NodeId) -> Result<Value, EvalError> {
        let var = self
            .memory
            .lookup(name)
            .ok_or_else(|| self.semantic_err(SemanticErrorKind::UnknownIdentifier, id, &format!("use of undeclared identifier '{name}'")))?;
        if var.is_array {
            Ok(Value::Pointer(var.address))
        } else {
            self.wrap_mem(self.memory.read(var.address, 0), id)
        }
    }

    fn eval_lvalue(&mut self, id: NodeId) -> Result<usize, EvalError> {
        match self.ast.kind(id).clone() {
            NodeKind::IdentifierExpr { name } => Ok(self
                .memory
                .lookup(&name)
                .ok_or_else(|| self.semantic_err(SemanticErrorKind::UnknownIdentifier, id, &format!("use of undeclared identifier '{name}'")))?
                .address),
            NodeKind::UnaryExpr { op: UnaryOp::Deref, expr } => match self.eval_expr(expr)? {
                Value::Pointer(a) => Ok(a),
                _ => Err(self.runtime_err(RuntimeErrorKind::InvalidPointerDereference, id, "dereference of a non-pointer value")),
            },
            NodeKind::ArraySubscriptExpr { array, index } => {
                let base = self.eval_expr(array)?.as_usize();
                let idx = self.eval_expr(index)?.as_i64();
                Ok((base as i64 + idx) as usize)
            }
            NodeKind::MemberExpr { object, member } => {
                let base = self.eval_lvalue(object)?;
                let tag = self.type_tag_of_expr(object).unwrap_or_default();
                Ok(base + self.member_offset(&tag, &member, id)?)
            }
            NodeKind::ArrowExpr { object, member } => {
                let ptr = self.eval_expr(object)?.as_usize();
                let tag = self.type_tag_of_expr(object).unwrap_or_default();
                Ok(ptr + self.member_offset(&tag, &member, id)?)
            }
            other => Err(self.semantic_err(SemanticErrorKind::UnknownIdentifier, id, &format!("not an lvalue: {other:?}"))),
        }
    }

    fn eval_assign(&mut self, op: AssignOp, target: NodeId, value: NodeId) -> Result<Value, EvalError> {
        let new_val = if matches!(op, AssignOp::Assign) {
            self.eval_expr(value)?
        } else {
            let cur = self.eval_expr(target)?;
            let rhs = self.eval_expr(value)?;
            self.eval_binary_values(assign_op_to_binop(op), cur, rhs, target)?
        };
        let addr = self.eval_lvalue(target)?;
        self.wrap_mem(self.memory.write(addr, 0, new_val), target)?;
        Ok(new_val)
    }

    fn eval_binary_expr(&mut self, op: BinOp, lhs: NodeId, rhs: NodeId, id: NodeId) -> Result<Value, EvalError> {
        match op {
            BinOp::LogicalAnd => {
                if !self.eval_expr(lhs)?.is_truthy() {
                    return Ok(Value::Int(0));
                }
                Ok(Value::Int(self.eval_expr(rhs)?.is_truthy() as i64))
            }
            BinOp::LogicalOr => {
                if self.eval_expr(lhs)?.is_truthy() {
                    return Ok(Value::Int(1));
                }
                Ok(Value::Int(self.eval_expr(rhs)?.is_truthy() as i64))
            }
            _ => {
                let l = self.eval_expr(lhs)?;
                let r = self.eval_expr(rhs)?;
                self.eval_binary_values(op, l, r, id)
            }
        }
    }

    fn eval_binary_values(&self, op: BinOp, l: Value, r: Value, id: NodeId) -> Result<Value, EvalError> {
        use BinOp::*;
        if let Value::Pointer(p) = l {
            match op {
                Add => return Ok(Value::Pointer((p as i64 + r.as_i64()) as usize)),
                Sub => {
                    return Ok(match r {
                        Value::Pointer(q) => Value::Int(p as i64 - q as i64),
                        other => Value::Pointer((p as i64 - other.as_i64()) as usize),
                    })
                }
                Eq => return Ok(Value::Int((p == r.as_usize()) as i64)),
                Ne => return Ok(Value::Int((p != r.as_usize()) as i64)),
                _ => {}
            }
        }
        if let (other, Value::Pointer(p)) = (l, r) {
            if matches!(op, Add) {
                return Ok(Value::Pointer((p as i64 + other.as_i64()) as usize));
            }
        }
        let is_float = matches!(l, Value::Float(_)) || matches!(r, Value::Float(_));
        if is_float && matches!(op, Add | Sub | Mul | Div | Eq | Ne | Lt | Gt | Le | Ge) {
            let (a, b) = (l.as_f64(), r.as_f64());
            return Ok(match op {
                Add => Value::Float(a + b),
                Sub => Value::Float(a - b),
                Mul => Value::Float(a * b),
                Div => Value::Float(a / b),
                Eq => Value::Int((a == b) as i64),
                Ne => Value::Int((a != b) as i64),
                Lt => Value::Int((a < b) as i64),
                Gt => Value::Int((a > b) as i64),
                Le => Value::Int((a <= b) as i64),
                Ge => Value::Int((a >= b) as i64),
                _ => unreachable!(),
            });
        }
        let (a, b) = (l.as_i64(), r.as_i64());
        Ok(match op {
            Add => Value::Int(a + b),
            Sub => Value::Int(a - b),
            Mul => Value::Int(a * b),
            Div => {
                if b == 0 {
                    return Err(self.runtime_err(RuntimeErrorKind::DivByZero, id, "division by zero"));
                }
                Value::Int(a / b)
            }
            Mod => {
                if b == 0 {
                    return Err(self.runtime_err(RuntimeErrorKind::ModByZero, id, "modulo by zero"));
                }
                Value::Int(a % b)
            }
            BitOr => Value::Int(a | b),
            BitXor => Value::Int(a ^ b),
            BitAnd => Value::Int(a & b),
            Shl => Value::Int(a << b),
            Shr => Value::Int(a >> b),
            Eq => Value::Int((a == b) as i64),
            Ne => Value::Int((a != b) as i64),
            Lt => Value::Int((a < b) as i64),
            Gt => Value::Int((a > b) as i64),
            Le => Value::Int((a <= b) as i64),
            Ge => Value::Int((a >= b) as i64),
            LogicalAnd | LogicalOr => unreachable!("handled in eval_binary_expr"),
        })
    }

    fn eval_unary(&mut self, op: UnaryOp, expr: NodeId, id: NodeId) -> Result<Value, EvalError> {
        match op {
            UnaryOp::AddrOf => Ok(Value::Pointer(self.eval_lvalue(expr)?)),
            UnaryOp::Deref => {
                let addr = match self.eval_expr(expr)? {
                    Value::Pointer(a) => a,
                    _ => return Err(self.runtime_err(RuntimeErrorKind::InvalidPointerDereference, id, "dereference of a non-pointer value")),
                };
                self.wrap_mem(self.memory.read(addr, 0), id)
            }
            UnaryOp::Plus => self.eval_expr(expr),
            UnaryOp::Neg => Ok(match self.eval_expr(expr)? {
                Value::Float(f) => Value::Float(-f),
                v => Value::Int(-v.as_i64()),
            }),
            UnaryOp::Not => Ok(Value::Int(!self.eval_expr(expr)?.is_truthy() as i64)),
            UnaryOp::BitNot => Ok(Value::Int(!self.eval_expr(expr)?.as_i64())),
        }
    }

    fn eval_incdec(&mut self, op: IncDecOp, expr: NodeId, prefix: bool, id: NodeId) -> Result<Value, EvalError> {
        let addr = self.eval_lvalue(expr)?;
        let old = self.wrap_mem(self.memory.read(addr, 0), id)?;
        let delta = if matches!(op, IncDecOp::Inc) { 1 } else { -1 };
        let new = match old {
            Value::Float(f) => Value::Float(f + delta as f64),
            Value::Pointer(p) => Value::Pointer((p as i64 + delta) as usize),
            Value::Char(c) => Value::Char((c as i64 + delta) as u8),
            Value::Int(n) => Value::Int(n + delta),
        };
        self.wrap_mem(self.memory.write(addr, 0, new), id)?;
        Ok(if prefix { new } else { old })
    }

    fn cast_value(&self, ty: &TypeName, v: Value) -> Value {
        if ty.is_pointer() {
            return Value::Pointer(v.as_usize());
        }
        match ty.base.as_str() {
            "float" | "double" | "long double" => Value::Float(v.as_f64()),
            "char" | "signed char" | "unsigned char" => Value::Char(v.as_i64() as u8),
            "void" => Value::Int(0),
            _ => Value::Int(v.as_i64()),
        }
    }

    /// `sizeof` over an expression is evaluated as if over its static
    /// type. We only actually know that type for a bare identifier, so
    /// anything else falls back to `int`'s size — a documented
    /// simplification consistent with the simplified type system.
    fn sizeof_expr(&self, expr: NodeId) -> usize {
        if let NodeKind::IdentifierExpr { name } = self.ast.kind(expr) {
            if let Some(var) = self.memory.lookup(name) {
                let ty = TypeName {
                    base: var.type_name.clone(),
                    pointer_depth: var.pointer_depth,
                    dimensions: var.dimensions.iter().map(|d| Some(d.size as i64)).collect(),
                };
                return byte_size_of(&ty);
            }
        }
        4
    }

    fn eval_generic(&mut self, controlling: NodeId, associations: Vec<NodeId>) -> Result<Value, EvalError> {
        let v = self.eval_expr(controlling)?;
        let tag = match v {
            Value::Float(_) => "double",
            Value::Pointer(_) => "pointer",
            Value::Char(_) => "char",
            Value::Int(_) => "int",
        };
        let mut default_expr = None;
        for assoc in associations {
            match self.ast.kind(assoc).clone() {
                NodeKind::GenericAssociation { ty, expr } => {
                    let is_match = if ty.is_pointer() { tag == "pointer" } else { ty.base == tag };
                    if is_match {
                        return self.eval_expr(expr);
                    }
                }
                NodeKind::GenericDefault { expr } => default_expr = Some(expr),
                _ => {}
            }
        }
        match default_expr {
            Some(e) => self.eval_expr(e),
            None => Err(self.semantic_err(SemanticErrorKind::TypeMismatchInCast, controlling, "no matching _Generic association")),
        }
    }

    fn eval_call(&mut self, callee: NodeId, args: Vec<NodeId>, call_id: NodeId) -> Result<Value, EvalError> {
        let name = match self.ast.kind(callee) {
            NodeKind::IdentifierExpr { name } => name.clone(),
            _ => return Err(self.semantic_err(SemanticErrorKind::CallTargetMissing, call_id, "call target must be a named function")),
        };
        let mut values = Vec::with_capacity(args.len());
        for a in args {
            values.push(self.eval_expr(a)?);
        }
        if let Some(result) = library::dispatch(self, &name, &values) {
            return result.map_err(|e| self.finalize_eval_error(e, call_id));
        }
        if let Some(&func_id) = self.functions.get(&name) {
            return self.call_user_function(func_id, &values, call_id);
        }
        Err(self.library_err(crate::error::LibraryErrorKind::UnknownFunction, call_id, &format!("call to undefined function '{name}'")))
    }

    // --- Error helpers --------------------------------------------------

    fn semantic_err(&self, kind: SemanticErrorKind, id: NodeId, msg: &str) -> EvalError {
        let node = self.ast.get(id);
        EvalError::Source(SourceError::new(kind, msg, node.line, node.column, &self.file))
    }

    fn runtime_err(&self, kind: RuntimeErrorKind, id: NodeId, msg: &str) -> EvalError {
        let node = self.ast.get(id);
        EvalError::Source(SourceError::new(kind, msg, node.line, node.column, &self.file))
    }

    fn library_err(&self, kind: crate::error::LibraryErrorKind, id: NodeId, msg: &str) -> EvalError {
        let node = self.ast.get(id);
        EvalError::Source(SourceError::new(kind, msg, node.line, node.column, &self.file))
    }

    fn wrap_mem<T>(&self, r: MemResult<T>, id: NodeId) -> Result<T, EvalError> {
        r.map_err(|k| self.runtime_err(k, id, &format!("{k:?}")))
    }

    fn finalize_eval_error(&self, e: EvalError, id: NodeId) -> EvalError {
        match e {
            EvalError::Runtime(k) => self.runtime_err(k, id, &format!("{k:?}")),
            other => other,
        }
    }
}

fn assign_op_to_binop(op: AssignOp) -> BinOp {
    match op {
        AssignOp::Add => BinOp::Add,
        AssignOp::Sub => BinOp::Sub,
        AssignOp::Mul => BinOp::Mul,
        AssignOp::Div => BinOp::Div,
        AssignOp::Mod => BinOp::Mod,
        AssignOp::BitOr => BinOp::BitOr,
        AssignOp::BitXor => BinOp::BitXor,
        AssignOp::BitAnd => BinOp::BitAnd,
        AssignOp::Shl => BinOp::Shl,
        AssignOp::Shr => BinOp::Shr,
        AssignOp::Assign => unreachable!("compound-assign path only"),
    }
}

#[cfg(test)]
mod tests;
