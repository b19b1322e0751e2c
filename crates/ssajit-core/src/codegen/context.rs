use cranelift_codegen::ir::{AbiParam, Signature};
use cranelift_codegen::settings::{self, Configurable};
use cranelift_jit::{JITBuilder, JITModule};
use cranelift_module::Module;

use crate::{
    config::CodegenConfig, invoke::CodeMemory, ir::CompiledIR, types::TypeMapper, CompileError,
    Result,
};

/// Backend objects for exactly one compilation.
///
/// Nothing here is shared between compilations. Dropping the context
/// releases the module and any code it already allocated.
pub struct CodegenContext {
    pub module: CodeMemory,
    pub types: TypeMapper,
    pub config: CodegenConfig,
}

impl CodegenContext {
    pub fn new(config: &CodegenConfig) -> Result<Self> {
        let mut flag_builder = settings::builder();
        flag_builder
            .set("opt_level", config.opt_level.as_flag())
            .map_err(|e| CompileError::Backend(format!("Failed to set opt_level: {}", e)))?;

        let isa_builder = cranelift_native::builder()
            .map_err(|e| CompileError::Backend(format!("Native ISA not available: {}", e)))?;
        let isa = isa_builder
            .finish(settings::Flags::new(flag_builder))
            .map_err(|e| CompileError::Backend(format!("Failed to create ISA: {}", e)))?;

        let builder = JITBuilder::with_isa(isa, cranelift_module::default_libcall_names());

        Ok(Self {
            module: CodeMemory::new(JITModule::new(builder)),
            types: TypeMapper::new(),
            config: config.clone(),
        })
    }

    /// Backend signature for the IR's declared parameter and result tags.
    pub fn signature(&self, ir: &CompiledIR) -> Result<Signature> {
        Self::signature_for(&self.module, &self.types, ir)
    }

    pub fn signature_for(
        module: &JITModule,
        types: &TypeMapper,
        ir: &CompiledIR,
    ) -> Result<Signature> {
        let mut sig = module.make_signature();
        for tag in &ir.params {
            sig.params.push(AbiParam::new(types.resolve(*tag)?));
        }
        sig.returns.push(AbiParam::new(types.resolve(ir.result)?));
        Ok(sig)
    }
}
