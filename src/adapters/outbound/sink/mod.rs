mod console_sink;

pub use console_sink::ConsoleSink;
