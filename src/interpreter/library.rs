//! Library call dispatch table.
//!
//! Covers the standard `printf`/`scanf`/string/memory/math family plus
//! `memcpy`/`memset`/`memmove`/`memcmp`/`abs`/`labs`/`atoi`/`atof`/
//! `assert`. A plain `match` on the callee name is enough — the set of
//! names is closed and small, so there's no need for indirection
//! through real function pointers.

use crate::error::{LibraryErrorKind, RuntimeErrorKind};
use crate::io::IoOutcome;
use crate::memory::{HeapOrigin, Value};

use super::{EvalError, Interpreter};

/// Dispatches a call to `name` if it names a recognised library function.
/// Returns `None` for anything else, so the caller falls through to
/// user-defined function lookup.
pub fn dispatch(interp: &mut Interpreter, name: &str, args: &[Value]) -> Option<Result<Value, EvalError>> {
    let result = match name {
        "printf" => printf(interp, args),
        "scanf" => scanf(interp, args),
        "puts" => Ok(Value::Int(interp.io.puts(&arg_string(interp, args, 0)))),
        "putchar" => Ok(Value::Int(interp.io.putchar(arg(args, 0).as_i64() as u8))),
        "getchar" => match interp.io.getchar() {
            IoOutcome::Ready(c) => Ok(Value::Int(c)),
            IoOutcome::NeedsInput => Err(EvalError::NeedsInput),
        },
        "gets" => gets(interp, args),
        "malloc" => Ok(Value::Pointer(interp.memory.allocate(arg(args, 0).as_usize(), false, HeapOrigin::Malloc))),
        "calloc" => {
            let count = arg(args, 0).as_usize();
            let size = arg(args, 1).as_usize();
            Ok(Value::Pointer(interp.memory.allocate(count * size, true, HeapOrigin::Calloc)))
        }
        "realloc" => interp
            .memory
            .reallocate(arg(args, 0).as_usize(), arg(args, 1).as_usize(), HeapOrigin::Realloc)
            .map(Value::Pointer)
            .map_err(EvalError::Runtime),
        "free" => interp.memory.free(arg(args, 0).as_usize()).map(|_| Value::Int(0)).map_err(EvalError::Runtime),
        "exit" => return Some(Err(EvalError::Exit(arg(args, 0).as_i64() as i32))),
        "rand" => Ok(Value::Int(interp.rng.rand())),
        "srand" => {
            interp.rng.srand(arg(args, 0).as_i64() as u32);
            Ok(Value::Int(0))
        }
        "strlen" => Ok(Value::Int(arg_string(interp, args, 0).len() as i64)),
        "strcpy" => {
            let s = arg_string(interp, args, 1);
            interp.memory.write_cstring(arg(args, 0).as_usize(), &s).map(|_| arg(args, 0)).map_err(EvalError::Runtime)
        }
        "strncpy" => {
            let s = arg_string(interp, args, 1);
            let n = arg(args, 2).as_usize();
            let truncated: String = s.chars().take(n).collect();
            interp.memory.write_cstring(arg(args, 0).as_usize(), &truncated).map(|_| arg(args, 0)).map_err(EvalError::Runtime)
        }
        "strcat" => {
            let a = arg_string(interp, args, 0);
            let b = arg_string(interp, args, 1);
            interp.memory.write_cstring(arg(args, 0).as_usize(), &(a + &b)).map(|_| arg(args, 0)).map_err(EvalError::Runtime)
        }
        "strncat" => {
            let a = arg_string(interp, args, 0);
            let b = arg_string(interp, args, 1);
            let n = arg(args, 2).as_usize();
            let truncated: String = b.chars().take(n).collect();
            interp.memory.write_cstring(arg(args, 0).as_usize(), &(a + &truncated)).map(|_| arg(args, 0)).map_err(EvalError::Runtime)
        }
        "strcmp" => {
            let a = arg_string(interp, args, 0);
            let b = arg_string(interp, args, 1);
            Ok(Value::Int(a.cmp(&b) as i64))
        }
        "strncmp" => {
            let a: String = arg_string(interp, args, 0).chars().take(arg(args, 2).as_usize()).collect();
            let b: String = arg_string(interp, args, 1).chars().take(arg(args, 2).as_usize()).collect();
            Ok(Value::Int(a.cmp(&b) as i64))
        }
        "pow" => Ok(Value::Float(arg(args, 0).as_f64().powf(arg(args, 1).as_f64()))),
        "sqrt" => Ok(Value::Float(arg(args, 0).as_f64().sqrt())),
        "floor" => Ok(Value::Float(arg(args, 0).as_f64().floor())),
        "ceil" => Ok(Value::Float(arg(args, 0).as_f64().ceil())),
        "fabs" => Ok(Value::Float(arg(args, 0).as_f64().abs())),
        "abs" => Ok(Value::Int(arg(args, 0).as_i64().abs())),
        "labs" => Ok(Value::Int(arg(args, 0).as_i64().abs())),
        "atoi" => Ok(Value::Int(arg_string(interp, args, 0).trim().parse::<i64>().unwrap_or(0))),
        "atof" => Ok(Value::Float(arg_string(interp, args, 0).trim().parse::<f64>().unwrap_or(0.0))),
        "assert" => {
            if arg(args, 0).is_truthy() {
                Ok(Value::Int(0))
            } else {
                Err(EvalError::Runtime(RuntimeErrorKind::AssertionFailed))
            }
        }
        "memcpy" | "memmove" => mem_copy(interp, args),
        "memset" => {
            let dst = arg(args, 0).as_usize();
            let byte = arg(args, 1).as_i64() as u8;
            let n = arg(args, 2).as_usize();
            (|| {
                for i in 0..n {
                    interp.memory.write(dst, i, Value::Char(byte))?;
                }
                Ok(Value::Pointer(dst))
            })()
            .map_err(EvalError::Runtime)
        }
        "memcmp" => {
            let a = arg(args, 0).as_usize();
            let b = arg(args, 1).as_usize();
            let n = arg(args, 2).as_usize();
            (|| {
                for i in 0..n {
                    let x = interp.memory.read(a, i)?.as_i64();
                    let y = interp.memory.read(b, i)?.as_i64();
                    if x != y {
                        return Ok(Value::Int((x - y).signum()));
                    }
                }
                Ok(Value::Int(0))
            })()
            .map_err(EvalError::Runtime)
        }
        _ => return None,
    };
    Some(result)
}

fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).copied().unwrap_or(Value::Int(0))
}

fn arg_string(interp: &Interpreter, args: &[Value], i: usize) -> String {
    match arg(args, i) {
        Value::Pointer(addr) => interp.memory.read_cstring(addr).unwrap_or_default(),
        _ => String::new(),
    }
}

fn printf(interp: &mut Interpreter, args: &[Value]) -> Result<Value, EvalError> {
    let fmt = arg_string(interp, args, 0);
    interp.io.printf(&mut interp.memory, &fmt, &args[1.min(args.len())..]).map(Value::Int).map_err(EvalError::Runtime)
}

fn scanf(interp: &mut Interpreter, args: &[Value]) -> Result<Value, EvalError> {
    let fmt = arg_string(interp, args, 0);
    let addrs: Vec<usize> = args[1.min(args.len())..].iter().map(|v| v.as_usize()).collect();
    match interp.io.scanf(&mut interp.memory, &fmt, &addrs).map_err(EvalError::Runtime)? {
        IoOutcome::Ready(n) => Ok(Value::Int(n)),
        IoOutcome::NeedsInput => Err(EvalError::NeedsInput),
    }
}

fn gets(interp: &mut Interpreter, args: &[Value]) -> Result<Value, EvalError> {
    let addr = arg(args, 0).as_usize();
    match interp.io.gets(&mut interp.memory, addr).map_err(EvalError::Runtime)? {
        IoOutcome::Ready(()) => Ok(Value::Pointer(addr)),
        IoOutcome::NeedsInput => Err(EvalError::NeedsInput),
    }
}

fn mem_copy(interp: &mut Interpreter, args: &[Value]) -> Result<Value, EvalError> {
    let dst = arg(args, 0).as_usize();
    let src = arg(args, 1).as_usize();
    let n = arg(args, 2).as_usize();
    let mut buf = Vec::with_capacity(n);
    for i in 0..n {
        buf.push(interp.memory.read(src, i).map_err(EvalError::Runtime)?);
    }
    for (i, v) in buf.into_iter().enumerate() {
        interp.memory.write(dst, i, v).map_err(EvalError::Runtime)?;
    }
    Ok(Value::Pointer(dst))
}

/// Surfaces an unknown library-looking call (one that isn't in the
/// dispatch table above and has no matching `FunctionDef`) as a library
/// error rather than a bare "undefined identifier".
pub fn unknown_function_error() -> LibraryErrorKind {
    LibraryErrorKind::UnknownFunction
}
