pub mod threaded_emit_dispatcher;
