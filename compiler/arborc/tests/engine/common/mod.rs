//! Shared setup for engine tests.

use arbor_engine::{Context, HostConfig, Plugin};
use arbor_ir::visitor::rewrite_kind;
use arbor_ir::NodeKind;
use arborc::{LocalService, MemorySources};

pub type MemoryContext = Context<LocalService<MemorySources>>;

/// Context over in-memory files; the first file is the main program.
pub fn memory_context(files: &[(&str, &str)]) -> MemoryContext {
    arborc::init_tracing();
    let sources = files
        .iter()
        .fold(MemorySources::new(), |sources, &(path, text)| {
            sources.with(path, text)
        });
    let config = HostConfig::new(files[0].0);
    Context::create(LocalService::new(sources), config).unwrap()
}

/// Rename every identifier spelled `from`, in every program.
pub fn rename(from: &'static str, to: &'static str) -> Plugin {
    Plugin::new(format!("rename-{from}"), move |edit, _options, _cx| {
        edit.rewrite(&mut rewrite_kind(NodeKind::Identifier, |cx, node| {
            if cx.node(node)?.text() == Some(from) {
                Ok(cx.arena_mut().identifier(to))
            } else {
                Ok(node)
            }
        }))?;
        Ok(None)
    })
}
