//! Forward `tracing` events from the editing engine to the browser console

use std::fmt::{self, Write};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;
use wasm_bindgen::JsValue;

/// Collects an event's message and its structured fields
#[derive(Debug, Default)]
struct EventFields {
    message: String,
    fields: String,
}

impl Visit for EventFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

fn format_line(level: &Level, target: &str, fields: &EventFields) -> String {
    format!("{} {}: {}{}", level, target, fields.message, fields.fields)
}

/// Writes each event to the console method matching its level
struct ConsoleLayer;

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = EventFields::default();
        event.record(&mut fields);
        let meta = event.metadata();
        let line = JsValue::from_str(&format_line(meta.level(), meta.target(), &fields));

        match *meta.level() {
            Level::ERROR => web_sys::console::error_1(&line),
            Level::WARN => web_sys::console::warn_1(&line),
            Level::INFO => web_sys::console::info_1(&line),
            _ => web_sys::console::debug_1(&line),
        }
    }
}

/// Install the console subscriber. Later calls are no-ops.
pub fn init(level: LevelFilter) {
    let _ = tracing_subscriber::registry()
        .with(ConsoleLayer.with_filter(level))
        .try_init();
}
