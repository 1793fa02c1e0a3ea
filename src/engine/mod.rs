// engine module: owns all network I/O on its own thread

mod interface;
pub mod server;
pub mod stub;

pub use interface::{Endpoint, Engine, EngineHandle, Event, Request};
pub use server::ServerEngine;
pub use stub::StubEngine;
