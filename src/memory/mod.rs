//! Simulated memory manager.
//!
//! Addresses are cells, not bytes: every scalar slot (and every array
//! element) occupies exactly one [`Value`] cell rather than a
//! `sizeof`-width byte range. `sizeof`/`alignof` still report a fixed C
//! byte-size table to the interpreted program; that table lives in
//! [`byte_size_of`] and is entirely separate from cell counting.
//!
//! A region (one global, one local, one heap block, one interned string)
//! is a contiguous run of cells starting at some base address. Looking up
//! an arbitrary address scans regions for the one whose range contains it
//! — fine at the scale an educational interpreter runs at, and simpler
//! than maintaining a sorted index. The heap allocator is the one region
//! pool that reuses freed address ranges (best-fit).

use std::collections::HashMap;

use serde::Serialize;

use crate::ast::TypeName;
use crate::error::RuntimeErrorKind;

pub type MemResult<T> = Result<T, RuntimeErrorKind>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Value {
    Int(i64),
    Float(f64),
    Pointer(usize),
    Char(u8),
}

impl Default for Value {
    fn default() -> Self {
        Value::Int(0)
    }
}

impl Value {
    pub fn as_i64(&self) -> i64 {
        match *self {
            Value::Int(n) => n,
            Value::Float(f) => f as i64,
            Value::Pointer(p) => p as i64,
            Value::Char(c) => c as i64,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Int(n) => n as f64,
            Value::Float(f) => f,
            Value::Pointer(p) => p as f64,
            Value::Char(c) => c as f64,
        }
    }

    pub fn as_usize(&self) -> usize {
        self.as_i64().max(0) as usize
    }

    pub fn is_truthy(&self) -> bool {
        match *self {
            Value::Int(n) => n != 0,
            Value::Float(f) => f != 0.0,
            Value::Pointer(p) => p != 0,
            Value::Char(c) => c != 0,
        }
    }
}

/// Returns the `sizeof`/`_Alignof` byte size for a base type name from a
/// fixed table (no target-dependent layout). Struct and union tags fall
/// back to a flat 8 — byte-level member layout is never modelled.
pub fn byte_size_of_base(base: &str) -> usize {
    match base {
        "void" => 0,
        "char" | "signed char" | "unsigned char" | "_Bool" | "bool" => 1,
        "short" | "short int" | "unsigned short" | "unsigned short int" => 2,
        "float" => 4,
        "int" | "unsigned int" | "unsigned" | "signed" | "signed int" => 4,
        "long" | "unsigned long" | "long int" | "double" => 8,
        "long long" | "unsigned long long" | "long long int" => 8,
        "long double" => 8,
        _ => 8, // struct/union/enum tags and unknown typedef targets
    }
}

pub fn byte_size_of(ty: &TypeName) -> usize {
    if ty.is_pointer() {
        return 8;
    }
    if ty.is_array() {
        let elems: i64 = ty.dimensions.iter().map(|d| d.unwrap_or(0)).product();
        return (elems.max(0) as usize) * byte_size_of_base(&ty.base);
    }
    byte_size_of_base(&ty.base)
}

/// Number of `Value` cells a declarator occupies. Always 1 for a scalar or
/// pointer; `product(dimensions)` for an array (minimum 1 so a
/// zero-or-unknown dimension still reserves a cell).
pub fn cell_count(ty: &TypeName) -> usize {
    if ty.is_array() {
        let elems: i64 = ty.dimensions.iter().map(|d| d.unwrap_or(1).max(1)).product();
        elems.max(1) as usize
    } else {
        1
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArrayDimension {
    pub size: usize,
    pub size_expr: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VarInfo {
    pub name: String,
    pub type_name: String,
    pub is_pointer: bool,
    pub pointer_depth: u32,
    pub is_array: bool,
    pub dimensions: Vec<ArrayDimension>,
    pub is_static: bool,
    pub is_extern: bool,
    pub is_parameter: bool,
    pub address: usize,
    pub value: Value,
}

impl VarInfo {
    pub fn scalar(name: &str, ty: &TypeName, address: usize) -> Self {
        VarInfo {
            name: name.to_string(),
            type_name: ty.base.clone(),
            is_pointer: ty.is_pointer(),
            pointer_depth: ty.pointer_depth,
            is_array: ty.is_array(),
            dimensions: ty
                .dimensions
                .iter()
                .map(|d| ArrayDimension { size: d.unwrap_or(0).max(0) as usize, size_expr: None })
                .collect(),
            is_static: false,
            is_extern: false,
            is_parameter: false,
            address,
            value: Value::Int(0),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub name: String,
    pub parent_scope_name: Option<String>,
    pub parameters: Vec<VarInfo>,
    pub variables: HashMap<String, VarInfo>,
}

impl Frame {
    fn new(name: &str, parent_scope_name: Option<String>) -> Self {
        Frame { name: name.to_string(), parent_scope_name, parameters: Vec::new(), variables: HashMap::new() }
    }

    fn find(&self, name: &str) -> Option<&VarInfo> {
        self.variables.get(name).or_else(|| self.parameters.iter().find(|p| p.name == name))
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut VarInfo> {
        if let Some(v) = self.variables.get_mut(name) {
            return Some(v);
        }
        self.parameters.iter_mut().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HeapOrigin {
    Malloc,
    Calloc,
    Realloc,
}

#[derive(Debug, Clone, Serialize)]
pub struct Block {
    pub address: usize,
    pub size: usize,
    pub allocated_at: u64,
    pub origin: HeapOrigin,
    pub freed: bool,
    pub zeroed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
enum RegionKind {
    Global,
    Static,
    Local,
    Heap,
    StringLiteral,
}

#[derive(Debug, Clone, Serialize)]
struct Region {
    kind: RegionKind,
    cells: Vec<Value>,
    freed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeapSnapshot {
    pub blocks: Vec<Block>,
    pub used: usize,
    pub total: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemorySnapshot {
    pub globals: Vec<VarInfo>,
    pub stack: Vec<Frame>,
    pub heap: HeapSnapshot,
}

/// Total simulated heap capacity in cells, used only to report a
/// utilisation percentage in `snapshot()` — not an enforced limit.
const SIMULATED_HEAP_CAPACITY_CELLS: usize = 1 << 20;

#[derive(Debug, Default)]
pub struct MemoryManager {
    regions: HashMap<usize, Region>,
    next_address: usize,
    heap_free_list: Vec<(usize, usize)>,
    heap_next_address: usize,
    heap_blocks: HashMap<usize, Block>,
    globals: HashMap<String, VarInfo>,
    statics: HashMap<String, VarInfo>,
    string_pool: HashMap<String, usize>,
    stack: Vec<Frame>,
    current_step: u64,
}

impl MemoryManager {
    pub fn new() -> Self {
        let mut mgr = MemoryManager::default();
        mgr.next_address = 1;
        mgr.heap_next_address = 1 << 16; // keep heap addresses visibly separate from globals/locals
        mgr
    }

    pub fn set_step(&mut self, step: u64) {
        self.current_step = step;
    }

    fn bump_region(&mut self, kind: RegionKind, cells: usize) -> usize {
        let base = self.next_address;
        self.next_address += cells.max(1);
        self.regions.insert(base, Region { kind, cells: vec![Value::Int(0); cells.max(1)], freed: false });
        base
    }

    pub fn declare_global(&mut self, name: &str, ty: &TypeName) -> usize {
        self.declare_global_sized(name, ty, cell_count(ty))
    }

    /// Like [`Self::declare_global`] but with an explicit cell count, for
    /// callers (the interpreter) that know the real layout of a struct or
    /// union base type the bare `TypeName` can't express on its own.
    pub fn declare_global_sized(&mut self, name: &str, ty: &TypeName, cells: usize) -> usize {
        let addr = self.bump_region(RegionKind::Global, cells);
        self.globals.insert(name.to_string(), VarInfo::scalar(name, ty, addr));
        addr
    }

    pub fn declare_static(&mut self, name: &str, scope: &str, ty: &TypeName) -> usize {
        self.declare_static_sized(name, scope, ty, cell_count(ty))
    }

    pub fn declare_static_sized(&mut self, name: &str, scope: &str, ty: &TypeName, cells: usize) -> usize {
        let key = format!("{scope}::{name}");
        if let Some(existing) = self.statics.get(&key) {
            return existing.address;
        }
        let addr = self.bump_region(RegionKind::Static, cells);
        let mut info = VarInfo::scalar(name, ty, addr);
        info.is_static = true;
        self.statics.insert(key, info);
        addr
    }

    pub fn declare_local(&mut self, name: &str, ty: &TypeName) -> MemResult<usize> {
        self.declare_local_sized(name, ty, cell_count(ty))
    }

    pub fn declare_local_sized(&mut self, name: &str, ty: &TypeName, cells: usize) -> MemResult<usize> {
        let addr = self.bump_region(RegionKind::Local, cells);
        let info = VarInfo::scalar(name, ty, addr);
        let frame = self.stack.last_mut().ok_or(RuntimeErrorKind::StackUnderflow)?;
        frame.variables.insert(name.to_string(), info);
        Ok(addr)
    }

    pub fn add_parameter(&mut self, name: &str, ty: &TypeName, value: Value) -> MemResult<usize> {
        let addr = self.bump_region(RegionKind::Local, cell_count(ty));
        self.regions.get_mut(&addr).unwrap().cells[0] = value;
        let mut info = VarInfo::scalar(name, ty, addr);
        info.is_parameter = true;
        info.value = value;
        let frame = self.stack.last_mut().ok_or(RuntimeErrorKind::StackUnderflow)?;
        frame.parameters.push(info);
        Ok(addr)
    }

    pub fn push_frame(&mut self, name: &str, parent_scope_name: Option<String>) {
        self.stack.push(Frame::new(name, parent_scope_name));
    }

    pub fn pop_frame(&mut self) -> MemResult<Frame> {
        self.stack.pop().ok_or(RuntimeErrorKind::StackUnderflow)
    }

    pub fn current_function_name(&self) -> Option<&str> {
        self.stack.iter().rev().map(|f| f.name.as_str()).find(|n| !n.is_empty())
    }

    /// Searches the live call/block-frame stack top-down, then globals and
    /// file-scope statics — the same unified stack doubles as both the C
    /// call stack and the lexical block-scope chain, since block frames
    /// are pushed/popped exactly like call frames on entry/exit of every
    /// compound statement.
    pub fn lookup(&self, name: &str) -> Option<VarInfo> {
        for frame in self.stack.iter().rev() {
            if let Some(v) = frame.find(name) {
                return Some(v.clone());
            }
        }
        if let Some(v) = self.globals.get(name) {
            return Some(v.clone());
        }
        self.statics.values().find(|v| v.name == name).cloned()
    }

    fn find_region(&self, addr: usize) -> Option<(usize, &Region)> {
        self.regions.iter().find(|(base, r)| addr >= **base && addr < **base + r.cells.len()).map(|(b, r)| (*b, r))
    }

    fn find_region_mut(&mut self, addr: usize) -> Option<(usize, &mut Region)> {
        self.regions.iter_mut().find(|(base, r)| addr >= **base && addr < **base + r.cells.len()).map(|(b, r)| (*b, r))
    }

    pub fn read(&self, address: usize, offset: usize) -> MemResult<Value> {
        if address == 0 {
            return Err(RuntimeErrorKind::NullPointerDereference);
        }
        let target = address + offset;
        let (base, region) = self.find_region(address).ok_or(RuntimeErrorKind::InvalidPointerDereference)?;
        if region.freed {
            return Err(RuntimeErrorKind::UseAfterFree);
        }
        let idx = target - base;
        region.cells.get(idx).copied().ok_or(RuntimeErrorKind::OutOfBoundsAccess)
    }

    pub fn write(&mut self, address: usize, offset: usize, value: Value) -> MemResult<()> {
        if address == 0 {
            return Err(RuntimeErrorKind::NullPointerDereference);
        }
        let target = address + offset;
        let (base, region) = self.find_region_mut(address).ok_or(RuntimeErrorKind::InvalidPointerDereference)?;
        if region.freed {
            return Err(RuntimeErrorKind::UseAfterFree);
        }
        let idx = target - base;
        if idx >= region.cells.len() {
            return Err(RuntimeErrorKind::OutOfBoundsAccess);
        }
        region.cells[idx] = value;
        Ok(())
    }

    pub fn write_by_name(&mut self, name: &str, value: Value) -> MemResult<()> {
        let addr = self.lookup(name).ok_or(RuntimeErrorKind::InvalidPointerDereference)?.address;
        self.write(addr, 0, value)
    }

    /// Best-fit allocation: reuse the smallest freed block whose capacity
    /// covers the request before growing the bump pointer, so freed space
    /// is recycled and repeated `malloc`/`free` cycles don't grow the
    /// heap without bound.
    pub fn allocate(&mut self, size: usize, zero: bool, origin: HeapOrigin) -> usize {
        let cells = (size + 7) / 8;
        let cells = cells.max(1);
        let best = self
            .heap_free_list
            .iter()
            .enumerate()
            .filter(|(_, (_, cap))| *cap >= cells)
            .min_by_key(|(_, (_, cap))| *cap)
            .map(|(i, _)| i);

        let base = if let Some(i) = best {
            let (addr, cap) = self.heap_free_list.remove(i);
            if cap > cells {
                self.heap_free_list.push((addr + cells, cap - cells));
            }
            addr
        } else {
            let addr = self.heap_next_address;
            self.heap_next_address += cells;
            addr
        };

        let init = if zero { Value::Int(0) } else { Value::Int(0) };
        self.regions.insert(base, Region { kind: RegionKind::Heap, cells: vec![init; cells], freed: false });
        self.heap_blocks.insert(
            base,
            Block { address: base, size, allocated_at: self.current_step, origin, freed: false, zeroed: zero },
        );
        base
    }

    pub fn reallocate(&mut self, addr: usize, new_size: usize, origin: HeapOrigin) -> MemResult<usize> {
        if addr == 0 {
            return Ok(self.allocate(new_size, false, origin));
        }
        let old_cells = self.regions.get(&addr).ok_or(RuntimeErrorKind::InvalidPointerDereference)?.cells.clone();
        self.free(addr)?;
        let new_addr = self.allocate(new_size, false, origin);
        let region = self.regions.get_mut(&new_addr).unwrap();
        for (i, v) in old_cells.into_iter().enumerate().take(region.cells.len()) {
            region.cells[i] = v;
        }
        Ok(new_addr)
    }

    pub fn free(&mut self, addr: usize) -> MemResult<()> {
        if addr == 0 {
            return Ok(());
        }
        let block = self.heap_blocks.get_mut(&addr).ok_or(RuntimeErrorKind::InvalidPointerDereference)?;
        if block.freed {
            return Err(RuntimeErrorKind::DoubleFree);
        }
        block.freed = true;
        let cells = ((block.size + 7) / 8).max(1);
        if let Some(region) = self.regions.get_mut(&addr) {
            region.freed = true;
        }
        self.heap_free_list.push((addr, cells));
        Ok(())
    }

    /// Interns a C string literal, deduping by content as real linkers
    /// often merge identical literals, and storing it as one `Char` cell
    /// per byte plus a trailing NUL so `%s`/`strlen`/`strcpy` can walk it
    /// with the same cell-based `read`/`write` every other region uses.
    pub fn intern_string_literal(&mut self, s: &str) -> usize {
        if let Some(&addr) = self.string_pool.get(s) {
            return addr;
        }
        let mut cells: Vec<Value> = s.bytes().map(Value::Char).collect();
        cells.push(Value::Char(0));
        let base = self.next_address;
        self.next_address += cells.len().max(1);
        self.regions.insert(base, Region { kind: RegionKind::StringLiteral, cells, freed: false });
        self.string_pool.insert(s.to_string(), base);
        base
    }

    /// Reads a NUL-terminated run of `Char` cells starting at `address`.
    pub fn read_cstring(&self, address: usize) -> MemResult<String> {
        let mut bytes = Vec::new();
        let mut offset = 0usize;
        loop {
            let v = self.read(address, offset)?;
            match v {
                Value::Char(0) => break,
                Value::Char(b) => bytes.push(b),
                other => bytes.push(other.as_i64() as u8),
            }
            offset += 1;
            if offset > 1 << 20 {
                return Err(RuntimeErrorKind::OutOfBoundsAccess);
            }
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Writes `s` plus a trailing NUL into the cells starting at
    /// `address`, for `gets`/`scanf("%s", ...)`/`strcpy` targets.
    pub fn write_cstring(&mut self, address: usize, s: &str) -> MemResult<()> {
        for (i, b) in s.bytes().enumerate() {
            self.write(address, i, Value::Char(b))?;
        }
        self.write(address, s.len(), Value::Char(0))
    }

    /// `VarInfo.value` is only populated at declaration time (and for
    /// parameters, at call time) — writes through [`Self::write`] only
    /// touch the backing region, not this cached copy. Re-read it here so
    /// a snapshot reflects what the variable actually holds right now.
    fn materialize(&self, info: &VarInfo) -> VarInfo {
        let mut info = info.clone();
        if !info.is_array {
            if let Ok(v) = self.read(info.address, 0) {
                info.value = v;
            }
        }
        info
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        let mut globals: Vec<VarInfo> = self.globals.values().map(|v| self.materialize(v)).collect();
        globals.extend(self.statics.values().map(|v| self.materialize(v)));
        globals.sort_by(|a, b| a.name.cmp(&b.name));

        let used: usize = self.heap_blocks.values().filter(|b| !b.freed).map(|b| b.size).sum();
        let mut blocks: Vec<Block> = self.heap_blocks.values().cloned().collect();
        blocks.sort_by_key(|b| b.address);

        let stack = self
            .stack
            .iter()
            .map(|frame| Frame {
                name: frame.name.clone(),
                parent_scope_name: frame.parent_scope_name.clone(),
                parameters: frame.parameters.iter().map(|v| self.materialize(v)).collect(),
                variables: frame
                    .variables
                    .iter()
                    .map(|(k, v)| (k.clone(), self.materialize(v)))
                    .collect(),
            })
            .collect();

        MemorySnapshot {
            globals,
            stack,
            heap: HeapSnapshot {
                blocks,
                used,
                total: SIMULATED_HEAP_CAPACITY_CELLS * 8,
                percent: used as f64 / (SIMULATED_HEAP_CAPACITY_CELLS * 8) as f64 * 100.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_ty() -> TypeName {
        TypeName { base: "int".into(), pointer_depth: 0, dimensions: vec![] }
    }

    #[test]
    fn globals_are_isolated_from_locals() {
        let mut mem = MemoryManager::new();
        let g = mem.declare_global("x", &int_ty());
        mem.write(g, 0, Value::Int(7)).unwrap();
        mem.push_frame("main", None);
        let l = mem.declare_local("x", &int_ty()).unwrap();
        mem.write(l, 0, Value::Int(99)).unwrap();
        assert_eq!(mem.lookup("x").unwrap().address, l);
        assert_eq!(mem.read(l, 0).unwrap(), Value::Int(99));
        mem.pop_frame().unwrap();
        assert_eq!(mem.lookup("x").unwrap().address, g);
        assert_eq!(mem.read(g, 0).unwrap(), Value::Int(7));
    }

    #[test]
    fn stack_discipline_rejects_underflow() {
        let mut mem = MemoryManager::new();
        assert_eq!(mem.pop_frame().unwrap_err(), RuntimeErrorKind::StackUnderflow);
    }

    #[test]
    fn malloc_then_free_restores_used() {
        let mut mem = MemoryManager::new();
        let before = mem.snapshot().heap.used;
        let p = mem.allocate(16, false, HeapOrigin::Malloc);
        assert!(mem.snapshot().heap.used > before);
        mem.free(p).unwrap();
        assert_eq!(mem.snapshot().heap.used, before);
    }

    #[test]
    fn double_free_is_an_error() {
        let mut mem = MemoryManager::new();
        let p = mem.allocate(8, false, HeapOrigin::Malloc);
        mem.free(p).unwrap();
        assert_eq!(mem.free(p).unwrap_err(), RuntimeErrorKind::DoubleFree);
    }

    #[test]
    fn use_after_free_is_an_error() {
        let mut mem = MemoryManager::new();
        let p = mem.allocate(8, false, HeapOrigin::Malloc);
        mem.free(p).unwrap();
        assert_eq!(mem.read(p, 0).unwrap_err(), RuntimeErrorKind::UseAfterFree);
    }

    #[test]
    fn freed_heap_space_is_reused_best_fit() {
        let mut mem = MemoryManager::new();
        let a = mem.allocate(64, false, HeapOrigin::Malloc);
        let b = mem.allocate(8, false, HeapOrigin::Malloc);
        mem.free(a).unwrap();
        let c = mem.allocate(16, false, HeapOrigin::Malloc);
        assert_eq!(c, a, "best fit should reuse the freed 64-byte block's address");
        assert_ne!(b, c);
    }

    #[test]
    fn string_literals_are_deduplicated() {
        let mut mem = MemoryManager::new();
        let a = mem.intern_string_literal("hi");
        let b = mem.intern_string_literal("hi");
        assert_eq!(a, b);
        assert_eq!(mem.read_cstring(a).unwrap(), "hi");
    }

    #[test]
    fn reallocate_preserves_contents() {
        let mut mem = MemoryManager::new();
        let p = mem.allocate(8, false, HeapOrigin::Malloc);
        mem.write(p, 0, Value::Int(42)).unwrap();
        let q = mem.reallocate(p, 64, HeapOrigin::Realloc).unwrap();
        assert_eq!(mem.read(q, 0).unwrap(), Value::Int(42));
    }
}
