/*! Calling finalized native code.
 *
 * This is the only module that turns raw entry addresses into callable
 * function pointers. A `NativeFunction` borrows the `CompiledFunction` that
 * owns the code memory, and is only handed out after the declared Rust
 * signature's scalar tags matched the tags the code was compiled for.
 */

use cranelift_jit::JITModule;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};

use crate::{types::ScalarType, CompileError, Result};

/// A JIT module whose code pages are released when this value drops.
pub struct CodeMemory {
    module: ManuallyDrop<JITModule>,
}

impl CodeMemory {
    pub fn new(module: JITModule) -> Self {
        Self {
            module: ManuallyDrop::new(module),
        }
    }
}

impl Deref for CodeMemory {
    type Target = JITModule;

    fn deref(&self) -> &JITModule {
        &self.module
    }
}

impl DerefMut for CodeMemory {
    fn deref_mut(&mut self) -> &mut JITModule {
        &mut self.module
    }
}

impl Drop for CodeMemory {
    fn drop(&mut self) {
        // SAFETY: the module is never touched again after this. Pointers into
        // its code only escape through `NativeFunction`, which borrows the
        // `CompiledFunction` owning this value, so none can still be live.
        unsafe {
            let module = ManuallyDrop::take(&mut self.module);
            module.free_memory();
        }
    }
}

/// Inlining mark carried by a compiled function for callers that link it
/// into larger code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InlineHint {
    /// Leave the decision to the caller's inliner.
    Default,
    Always,
}

mod sealed {
    pub trait Sealed {}
}

/// A Rust scalar that crosses the native boundary as the given tag.
pub trait NativeScalar: Copy + sealed::Sealed {
    const TYPE: ScalarType;
}

macro_rules! native_scalar {
    ($($ty:ty => $tag:expr),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}
            impl NativeScalar for $ty {
                const TYPE: ScalarType = $tag;
            }
        )*
    };
}

native_scalar! {
    i8 => ScalarType::I8,
    i16 => ScalarType::I16,
    i32 => ScalarType::I32,
    i64 => ScalarType::I64,
    f32 => ScalarType::F32,
    f64 => ScalarType::F64,
}

/// An `extern "C"` function pointer type whose scalar tags are known
/// statically.
///
/// # Safety
///
/// `from_entry` may only be given the address of code compiled for exactly
/// `params()` and `result()` under the platform C calling convention.
pub unsafe trait NativeSignature: Copy + sealed::Sealed {
    fn params() -> Vec<ScalarType>;
    fn result() -> ScalarType;

    /// # Safety
    ///
    /// See the trait documentation.
    unsafe fn from_entry(entry: *const u8) -> Self;
}

/// A typed handle on native code, valid while the owning artifact lives.
pub struct NativeFunction<'a, F> {
    func: F,
    _owner: PhantomData<&'a CompiledFunction>,
}

macro_rules! native_signature {
    ($($arg:ident: $ty:ident),*) => {
        impl<R: NativeScalar, $($ty: NativeScalar),*> sealed::Sealed
            for extern "C" fn($($ty),*) -> R {}

        unsafe impl<R: NativeScalar, $($ty: NativeScalar),*> NativeSignature
            for extern "C" fn($($ty),*) -> R
        {
            fn params() -> Vec<ScalarType> {
                vec![$(<$ty as NativeScalar>::TYPE),*]
            }

            fn result() -> ScalarType {
                R::TYPE
            }

            unsafe fn from_entry(entry: *const u8) -> Self {
                std::mem::transmute_copy::<*const u8, Self>(&entry)
            }
        }

        impl<'a, R: NativeScalar, $($ty: NativeScalar),*> NativeFunction<'a, extern "C" fn($($ty),*) -> R> {
            pub fn call(&self, $($arg: $ty),*) -> R {
                (self.func)($($arg),*)
            }
        }
    };
}

native_signature!();
native_signature!(a0: A0);
native_signature!(a0: A0, a1: A1);
native_signature!(a0: A0, a1: A1, a2: A2);
native_signature!(a0: A0, a1: A1, a2: A2, a3: A3);
native_signature!(a0: A0, a1: A1, a2: A2, a3: A3, a4: A4);
native_signature!(a0: A0, a1: A1, a2: A2, a3: A3, a4: A4, a5: A5);

/// Native code produced by one successful compilation.
pub struct CompiledFunction {
    _memory: CodeMemory,
    entry: *const u8,
    name: String,
    params: Vec<ScalarType>,
    result: ScalarType,
    inline: InlineHint,
    clif: Option<String>,
}

impl CompiledFunction {
    pub(crate) fn new(
        memory: CodeMemory,
        entry: *const u8,
        name: String,
        params: Vec<ScalarType>,
        result: ScalarType,
        inline: InlineHint,
        clif: Option<String>,
    ) -> Self {
        Self {
            _memory: memory,
            entry,
            name,
            params,
            result,
            inline,
            clif,
        }
    }

    /// Returns the entry point typed as `F`, after checking that `F` was
    /// declared with the tags this function was compiled for.
    pub fn entry<F: NativeSignature>(&self) -> Result<NativeFunction<'_, F>> {
        let declared = F::params();
        if declared != self.params || F::result() != self.result {
            return Err(CompileError::SignatureMismatch(format!(
                "declared {}, compiled {}",
                render_signature(&declared, F::result()),
                render_signature(&self.params, self.result)
            )));
        }

        // SAFETY: the tags were checked above and the module was built with
        // the host's default calling convention, which is `extern "C"`.
        let func = unsafe { F::from_entry(self.entry) };
        Ok(NativeFunction {
            func,
            _owner: PhantomData,
        })
    }

    /// Calls an all-`i64` function with a runtime argument list.
    pub fn invoke_i64(&self, args: &[i64]) -> Result<i64> {
        type W = i64;
        match args {
            [] => Ok(self.entry::<extern "C" fn() -> W>()?.call()),
            &[a] => Ok(self.entry::<extern "C" fn(W) -> W>()?.call(a)),
            &[a, b] => Ok(self.entry::<extern "C" fn(W, W) -> W>()?.call(a, b)),
            &[a, b, c] => Ok(self.entry::<extern "C" fn(W, W, W) -> W>()?.call(a, b, c)),
            &[a, b, c, d] => Ok(self
                .entry::<extern "C" fn(W, W, W, W) -> W>()?
                .call(a, b, c, d)),
            &[a, b, c, d, e] => Ok(self
                .entry::<extern "C" fn(W, W, W, W, W) -> W>()?
                .call(a, b, c, d, e)),
            &[a, b, c, d, e, f] => Ok(self
                .entry::<extern "C" fn(W, W, W, W, W, W) -> W>()?
                .call(a, b, c, d, e, f)),
            _ => Err(CompileError::SignatureMismatch(format!(
                "{} arguments exceed the dynamic invoker's arity",
                args.len()
            ))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ScalarType] {
        &self.params
    }

    pub fn result(&self) -> ScalarType {
        self.result
    }

    pub fn inline_hint(&self) -> InlineHint {
        self.inline
    }

    /// Cranelift IR text, when the compilation was configured to keep it.
    pub fn clif(&self) -> Option<&str> {
        self.clif.as_deref()
    }

    pub fn entry_address(&self) -> *const u8 {
        self.entry
    }
}

impl fmt::Debug for CompiledFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledFunction")
            .field("name", &self.name)
            .field("signature", &render_signature(&self.params, self.result))
            .field("entry", &self.entry)
            .field("inline", &self.inline)
            .finish()
    }
}

fn render_signature(params: &[ScalarType], result: ScalarType) -> String {
    let params: Vec<String> = params.iter().map(|p| p.to_string()).collect();
    format!("({}) -> {}", params.join(", "), result)
}
