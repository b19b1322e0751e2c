use cranelift_frontend::{FunctionBuilder, FunctionBuilderContext};
use cranelift_module::{Linkage, Module};
use tracing::debug;

use crate::{
    codegen::context::CodegenContext,
    codegen::lowering::LoweringEngine,
    config::CodegenConfig,
    invoke::CompiledFunction,
    ir::CompiledIR,
    CompileError, Result,
};

/// Builds, lowers and finalizes one native function.
pub struct ModuleBuilder {
    ctx: CodegenContext,
}

impl ModuleBuilder {
    pub fn new() -> Result<Self> {
        Self::with_config(&CodegenConfig::default())
    }

    pub fn with_config(config: &CodegenConfig) -> Result<Self> {
        Ok(Self {
            ctx: CodegenContext::new(config)?,
        })
    }

    /// Consumes the builder. On failure every backend object is dropped and
    /// nothing callable is produced.
    pub fn compile(self, ir: &CompiledIR) -> Result<CompiledFunction> {
        debug!(
            name = %ir.name,
            params = ir.params.len(),
            statements = ir.statements.len(),
            "compiling"
        );
        self.compile_inner(ir).inspect_err(|e| {
            debug!(name = %ir.name, error = %e, "compilation aborted");
        })
    }

    fn compile_inner(self, ir: &CompiledIR) -> Result<CompiledFunction> {
        let CodegenContext {
            mut module,
            types,
            config,
        } = self.ctx;

        let sig = CodegenContext::signature_for(&module, &types, ir)?;
        let func_id = module
            .declare_function(&ir.name, Linkage::Export, &sig)
            .map_err(|e| CompileError::Backend(format!("Failed to declare function: {}", e)))?;

        let mut context = module.make_context();
        context.func.signature = sig;
        let mut builder_context = FunctionBuilderContext::new();

        // The builder is the insertion cursor; it goes out of scope here on
        // every path, finalized only when lowering succeeded.
        let defined = {
            let mut builder = FunctionBuilder::new(&mut context.func, &mut builder_context);
            let entry = builder.create_block();
            builder.append_block_params_for_function_params(entry);
            builder.switch_to_block(entry);
            builder.seal_block(entry);

            let params = builder.block_params(entry).to_vec();
            let outcome = LoweringEngine::new(&mut builder, &types, params).lower(&ir.statements);
            if outcome.is_ok() {
                builder.finalize();
            }
            outcome
        }?;

        let clif = config
            .capture_clif
            .then(|| context.func.display().to_string());

        if config.verify {
            cranelift_codegen::verify_function(&context.func, module.isa())
                .map_err(|e| CompileError::Backend(format!("Verifier rejected function: {}", e)))?;
        }

        module
            .define_function(func_id, &mut context)
            .map_err(|e| CompileError::Backend(format!("Failed to define function: {}", e)))?;
        module.clear_context(&mut context);
        module
            .finalize_definitions()
            .map_err(|e| CompileError::Backend(format!("Failed to finalize: {}", e)))?;

        let entry = module.get_finalized_function(func_id);
        debug!(name = %ir.name, values = defined, "finalized");

        Ok(CompiledFunction::new(
            module,
            entry,
            ir.name.clone(),
            ir.params.clone(),
            ir.result,
            config.inline,
            clif,
        ))
    }
}

/// Compiles `ir` with the default configuration.
pub fn compile(ir: &CompiledIR) -> Result<CompiledFunction> {
    ModuleBuilder::new()?.compile(ir)
}

pub fn compile_with(ir: &CompiledIR, config: &CodegenConfig) -> Result<CompiledFunction> {
    ModuleBuilder::with_config(config)?.compile(ir)
}
