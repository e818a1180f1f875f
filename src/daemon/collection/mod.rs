//! Producers feeding the host's event queue: extension input and the weekly alarm.

pub mod alarm;
pub mod reader;
pub mod tabs;
