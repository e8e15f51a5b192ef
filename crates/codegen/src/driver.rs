use crate::{CodeBuffer, CodeSink, Codegen, CompileError, Layout};
use rayon::prelude::*;
use talon_ast::{MethodId, Program};
use talon_config::Opts;

/// Compiles `program` into `sink` and returns its layout.
///
/// Emits the `.data` section, then, unless `opts` stops after layout, the entry point followed by
/// every method of the compiled program, class by class in pre-order and each class's methods in
/// declaration order. Methods are generated in parallel when more than one thread is requested,
/// but always reach `sink` in that order.
#[instrument(name = "compile", level = "debug", skip_all)]
pub fn compile(
    program: &Program,
    opts: &Opts,
    sink: &mut (impl CodeSink + ?Sized),
) -> Result<Layout, CompileError> {
    let layout = Layout::compute(program, sink);

    if opts.run_codegen() {
        Codegen::new(program, &layout, sink).gen_entry();

        let methods = user_methods(program);
        debug!(methods = methods.len(), "generating methods");
        if opts.threads().get() == 1 || opts.unstable.sequential {
            let mut cg = Codegen::new(program, &layout, sink);
            for &method in &methods {
                cg.gen_method(method);
            }
        } else {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(opts.threads().get()).build()?;
            let buffers = pool.install(|| {
                methods
                    .par_iter()
                    .map(|&method| {
                        let mut buf = CodeBuffer::new();
                        Codegen::new(program, &layout, &mut buf).gen_method(method);
                        buf
                    })
                    .collect::<Vec<_>>()
            });
            for mut buf in buffers {
                buf.drain_into(sink);
            }
        }
    }

    sink.flush()?;
    Ok(layout)
}

/// Returns the methods defined by the compiled program, in emission order.
fn user_methods(program: &Program) -> Vec<MethodId> {
    let Some(root) = program.root_class() else { return Vec::new() };
    program
        .preorder(root)
        .into_iter()
        .flat_map(|class| program.class(class).methods.values().copied())
        .filter(|&method| program.method(method).origin.is_user())
        .collect()
}
